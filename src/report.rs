//! Results file output.
//!
//! Entries are appended and flushed one at a time, so work completed
//! before a fatal error is still on disk.

use crate::error::HarvestError;
use crate::pipeline::CaptchaInstance;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const DIVIDER_WIDTH: usize = 50;

pub struct ReportWriter {
    file: File,
}

impl ReportWriter {
    /// Create (truncating) the report file before processing starts.
    pub fn create(path: &Path) -> Result<Self, HarvestError> {
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append one entry and flush immediately.
    pub fn append(&mut self, instance: &CaptchaInstance) -> Result<(), HarvestError> {
        writeln!(self.file, "Image: {}", instance.raw_path.display())?;
        writeln!(self.file, "URL: {}", instance.source_url)?;
        writeln!(self.file, "OCR Raw: {}", instance.raw_text)?;
        writeln!(self.file, "Cleaned: {}", instance.cleaned_text)?;
        writeln!(self.file, "{}", "-".repeat(DIVIDER_WIDTH))?;
        self.file.flush()?;
        Ok(())
    }
}

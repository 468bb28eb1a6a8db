//! Product price scraper.
//!
//! Product cards carry their name and price in a query-string-encoded
//! `data-item` attribute, so this never touches the card's rendered
//! markup. Cards without the attribute are skipped.

use crate::error::HarvestError;
use scraper::{Html, Selector};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

const LISTING_PAGE: &str =
    "https://www.elgiganten.se/datorer-kontor/datorer/laptop?redirectquery=laptop";

#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    #[serde(rename = "Product Name")]
    pub name: String,
    #[serde(rename = "Price")]
    pub price: String,
}

pub async fn run(output: &Path) -> Result<(), HarvestError> {
    let client = super::http_client(Duration::from_secs(10))?;

    let response = client
        .get(LISTING_PAGE)
        .send()
        .await
        .map_err(|e| HarvestError::RequestError(format!("GET {} failed: {}", LISTING_PAGE, e)))?;
    let html = response
        .text()
        .await
        .map_err(|e| HarvestError::RequestError(format!("Reading listing failed: {}", e)))?;

    let products = parse_products(&html);

    let mut writer = csv::Writer::from_path(output)
        .map_err(|e| HarvestError::Csv(format!("Cannot open {}: {}", output.display(), e)))?;
    for product in &products {
        writer
            .serialize(product)
            .map_err(|e| HarvestError::Csv(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| HarvestError::Csv(e.to_string()))?;

    tracing::info!(count = products.len(), path = %output.display(), "Price report written");
    Ok(())
}

/// Extract product records from the listing page's cards.
pub fn parse_products(html: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"a[data-testid="product-card"]"#).unwrap();

    document
        .select(&selector)
        .filter_map(|card| {
            let data_item = card.value().attr("data-item")?;
            if data_item.is_empty() {
                return None;
            }

            let mut name = None;
            let mut price = None;
            for (key, value) in url::form_urlencoded::parse(data_item.as_bytes()) {
                match key.as_ref() {
                    "item_name" => name = Some(value.into_owned()),
                    "price" => price = Some(value.into_owned()),
                    _ => {}
                }
            }

            Some(ProductRecord {
                name: name.unwrap_or_else(|| "No name".to_string()),
                price: price.unwrap_or_else(|| "No price".to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_products_decodes_data_item() {
        let html = r#"
            <a data-testid="product-card"
               data-item="item_name=Apple+MacBook+Air&price=9990&item_id=123"></a>
            <a data-testid="product-card"
               data-item="item_name=Lenovo+IdeaPad&price=5490"></a>
        "#;

        let products = parse_products(html);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Apple MacBook Air");
        assert_eq!(products[0].price, "9990");
        assert_eq!(products[1].name, "Lenovo IdeaPad");
    }

    #[test]
    fn test_parse_products_skips_cards_without_data_item() {
        let html = r#"
            <a data-testid="product-card"></a>
            <a data-testid="product-card" data-item=""></a>
            <a data-testid="product-card" data-item="item_name=Asus&price=7990"></a>
        "#;

        let products = parse_products(html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Asus");
    }

    #[test]
    fn test_parse_products_defaults_missing_fields() {
        let html = r#"<a data-testid="product-card" data-item="item_id=9"></a>"#;

        let products = parse_products(html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "No name");
        assert_eq!(products[0].price, "No price");
    }
}

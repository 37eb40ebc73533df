use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A product extracted from the marketplace's discovery feed, with its
/// customer reviews attached by the review pipeline.
///
/// Every field is concrete; absent values in the source payload are filled
/// with the empty string, zero, or `false` at extraction time, so downstream
/// code never branches on presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    /// Marketplace numeric product ID, stored as a string to avoid precision loss.
    pub product_id: String,
    /// Normalized category path, e.g. `"elektronik|smartphones"`.
    pub category: String,
    pub name: String,
    pub count_sold: u64,
    /// Discounted price as a plain numeric string, e.g. `"50000"`.
    pub discounted_price: String,
    pub preorder: bool,
    /// List price as a plain numeric string, e.g. `"100000"`.
    pub price: String,
    pub stock: u32,
    pub gold_merchant: bool,
    pub is_official: bool,
    pub is_topads: bool,
    /// Average rating exactly as the feed displays it, e.g. `"4.8"`.
    pub rating_average: String,
    /// Marketplace numeric shop ID, stored as a string.
    pub shop_id: String,
    pub shop_location: String,
    /// Marketplace numeric warehouse ID, stored as a string.
    pub warehouse_id: String,
    /// Canonical desktop product URL.
    pub url: String,
    /// Reviews attached by the pipeline; empty until a fetch run succeeds.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Returns the number of attached reviews.
    #[must_use]
    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    /// Returns `true` if at least one review has been attached.
    #[must_use]
    pub fn has_reviews(&self) -> bool {
        !self.reviews.is_empty()
    }
}

/// One customer review, flattened from the review service's nested wire shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub review_id: String,
    /// Purchased variant label, e.g. `"Color: Red"`.
    pub variant_name: String,
    pub message: String,
    /// Star rating 1–5; `0` when the service omits it.
    pub rating: u8,
    /// Human-readable relative time, e.g. `"1 Bulan yang lalu"`.
    pub review_time: String,
    /// Creation time as a Unix epoch in seconds.
    pub review_timestamp: i64,
    /// Seller's reply text; empty when the seller has not responded.
    pub review_response: String,
    #[serde(rename = "like_dislike")]
    pub like_count: u32,
    /// Structured complaint for low ratings; empty when not given.
    pub bad_rating_reason: String,
}

/// Load a product list from a JSON file and validate it as pipeline input.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails the
/// input contract ([`validate_products`]).
pub fn load_products(path: &Path) -> Result<Vec<Product>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProductsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let products: Vec<Product> = serde_json::from_str(&content)?;

    validate_products(&products)?;

    Ok(products)
}

/// Check the pipeline input contract: every `product_id` non-empty and
/// unique across the list.
///
/// # Errors
///
/// Returns `ConfigError::Validation` naming the first offending product.
pub fn validate_products(products: &[Product]) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for product in products {
        if product.product_id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has an empty product_id",
                product.name
            )));
        }

        if !seen_ids.insert(product.product_id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product_id: '{}'",
                product.product_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn make_review(id: &str, rating: u8) -> Review {
        Review {
            review_id: id.to_string(),
            variant_name: "Color: Red".to_string(),
            message: "Great product!".to_string(),
            rating,
            review_time: "1 Bulan yang lalu".to_string(),
            review_timestamp: 1_704_067_200,
            review_response: String::new(),
            like_count: 10,
            bad_rating_reason: String::new(),
        }
    }

    fn make_product(id: &str, reviews: Vec<Review>) -> Product {
        Product {
            product_id: id.to_string(),
            category: "buku|fiction".to_string(),
            name: "Test Book".to_string(),
            count_sold: 50,
            discounted_price: "50000".to_string(),
            preorder: false,
            price: "100000".to_string(),
            stock: 10,
            gold_merchant: true,
            is_official: false,
            is_topads: false,
            rating_average: "4.8".to_string(),
            shop_id: "123456".to_string(),
            shop_location: "Jakarta".to_string(),
            warehouse_id: "12345".to_string(),
            url: "https://example.com/book".to_string(),
            reviews,
        }
    }

    #[test]
    fn review_count_zero_when_no_reviews() {
        let product = make_product("1", vec![]);
        assert_eq!(product.review_count(), 0);
        assert!(!product.has_reviews());
    }

    #[test]
    fn review_count_matches_reviews_len() {
        let product = make_product("1", vec![make_review("r1", 5), make_review("r2", 4)]);
        assert_eq!(product.review_count(), 2);
        assert!(product.has_reviews());
    }

    #[test]
    fn validate_accepts_unique_non_empty_ids() {
        let products = vec![make_product("1", vec![]), make_product("2", vec![])];
        assert!(validate_products(&products).is_ok());
    }

    #[test]
    fn validate_rejects_empty_product_id() {
        let products = vec![make_product("  ", vec![])];
        let err = validate_products(&products).unwrap_err();
        assert!(err.to_string().contains("empty product_id"));
    }

    #[test]
    fn validate_rejects_duplicate_product_id() {
        let products = vec![make_product("42", vec![]), make_product("42", vec![])];
        let err = validate_products(&products).unwrap_err();
        assert!(err.to_string().contains("duplicate product_id"));
    }

    #[test]
    fn serde_roundtrip_product_with_reviews() {
        let product = make_product("123", vec![make_review("rev001", 5)]);
        let json = serde_json::to_string(&product).expect("serialization failed");
        let decoded: Product = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded, product);
    }

    #[test]
    fn like_count_serializes_under_legacy_key() {
        let review = make_review("rev001", 5);
        let json = serde_json::to_value(&review).expect("serialization failed");
        assert_eq!(json["like_dislike"], 10);
        assert!(json.get("like_count").is_none());
    }

    #[test]
    fn missing_reviews_field_defaults_to_empty() {
        let json = r#"{"product_id": "123", "name": "Test Book"}"#;
        let product: Product = serde_json::from_str(json).expect("deserialization failed");
        assert_eq!(product.product_id, "123");
        assert_eq!(product.name, "Test Book");
        assert!(product.reviews.is_empty());
        assert_eq!(product.stock, 0);
        assert!(!product.preorder);
    }

    #[test]
    fn load_products_reads_and_validates_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let products = vec![make_product("1", vec![]), make_product("2", vec![])];
        let json = serde_json::to_string(&products).expect("serialization failed");
        file.write_all(json.as_bytes()).expect("write failed");

        let loaded = load_products(file.path()).expect("load failed");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].product_id, "1");
    }

    #[test]
    fn load_products_rejects_duplicate_ids_in_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let products = vec![make_product("1", vec![]), make_product("1", vec![])];
        let json = serde_json::to_string(&products).expect("serialization failed");
        file.write_all(json.as_bytes()).expect("write failed");

        let err = load_products(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn load_products_missing_file_is_io_error() {
        let err = load_products(Path::new("/nonexistent/products.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ProductsFileIo { .. }));
    }

    #[test]
    fn load_products_bad_json_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"not json").expect("write failed");

        let err = load_products(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ProductsFileParse(_)));
    }
}

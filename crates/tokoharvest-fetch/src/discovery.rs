//! Product extraction from captured discovery payloads.
//!
//! Category listing pages answer a batched GraphQL request whose product
//! entries sit at `[].data.componentInfo.data.component.data[]`. The capture
//! files this module reads are those raw response bodies, saved as-is. Ids
//! and counters arrive as JSON numbers or strings depending on the component
//! version, so parsing accepts both.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tokoharvest_core::products::Product;

use crate::error::FetchError;

/// Matches the category slug and numeric id inside a `source_module` value,
/// e.g. `clp_books_984` yields `books`.
static CATEGORY_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"clp_([a-zA-Z0-9_]+?)_([0-9]+)").expect("valid category regex"));

/// Extracts products from captured discovery response bodies.
///
/// Entries are deduplicated by product id across all bodies, keeping the
/// first occurrence; category pages repeat products in promo rails. Entries
/// without a product id, and entries whose fields do not parse, are skipped
/// with a warning. Bodies whose envelope does not reach the product array
/// contribute nothing.
///
/// # Errors
///
/// Returns [`FetchError::Deserialize`] if a body is not valid JSON at all.
pub fn extract_products(bodies: &[String]) -> Result<Vec<Product>, FetchError> {
    let mut products: Vec<Product> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for body in bodies {
        let root: Value = serde_json::from_str(body).map_err(|e| FetchError::Deserialize {
            context: "discovery capture body".to_string(),
            source: e,
        })?;

        let Some(items) = root.as_array() else {
            continue;
        };

        for item in items {
            let Some(entries) = item
                .pointer("/data/componentInfo/data/component/data")
                .and_then(Value::as_array)
            else {
                continue;
            };

            for entry in entries {
                let listing: RawListing = match serde_json::from_value(entry.clone()) {
                    Ok(listing) => listing,
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unreadable discovery entry");
                        continue;
                    }
                };
                let Some(product) = listing_to_product(listing) else {
                    continue;
                };
                if seen_ids.insert(product.product_id.clone()) {
                    products.push(product);
                }
            }
        }
    }

    Ok(products)
}

/// Strips the currency marker and thousands separators from a price string,
/// e.g. `Rp1.000.000` becomes `1000000`.
#[must_use]
pub fn normalize_price(raw: &str) -> String {
    raw.replace("Rp", "").replace('.', "").trim().to_string()
}

/// Derives a `slug|section` category label from a `source_module` value.
///
/// The value splits on `_outer_` and only the first two segments are read:
/// the first carries a `clp_<slug>_<id>` marker, the second a section name
/// with a `_module`-style suffix of seven characters. Either segment may
/// fail to yield anything, in which case its side of the label is left
/// empty.
#[must_use]
pub fn normalize_category(source_module: &str) -> String {
    let mut parts = source_module.split("_outer_");
    let first = parts.next().unwrap_or("");
    let second = parts.next().unwrap_or("");

    let slug = CATEGORY_RULE
        .captures(first)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str());

    let section_len = second.chars().count();
    let section: String = if section_len >= 7 {
        second.chars().take(section_len - 7).collect()
    } else {
        second.to_string()
    };

    format!("{slug}|{section}")
}

/// One product entry as served by the discovery component.
#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(default)]
    product_id: Option<NumOrStr>,
    #[serde(default)]
    source_module: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    count_sold: Option<NumOrStr>,
    #[serde(default)]
    discounted_price: Option<String>,
    #[serde(default)]
    preorder: Option<bool>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    stock: Option<NumOrStr>,
    #[serde(default)]
    gold_merchant: Option<bool>,
    #[serde(default)]
    is_official: Option<bool>,
    #[serde(default)]
    is_topads: Option<bool>,
    #[serde(default)]
    rating_average: Option<NumOrStr>,
    #[serde(default)]
    shop_id: Option<NumOrStr>,
    #[serde(default)]
    shop_location: Option<String>,
    #[serde(default)]
    warehouse_id: Option<NumOrStr>,
    #[serde(default)]
    url_desktop: Option<String>,
}

/// Ids, counters and ratings arrive as JSON numbers or strings depending on
/// the component version. Ids and ratings are carried as strings downstream;
/// counters parse back to integers, with unparseable values read as zero.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Int(i64),
    Float(f64),
    Str(String),
}

impl NumOrStr {
    fn into_string(self) -> String {
        match self {
            NumOrStr::Int(n) => n.to_string(),
            NumOrStr::Float(x) => x.to_string(),
            NumOrStr::Str(s) => s,
        }
    }
}

fn listing_to_product(listing: RawListing) -> Option<Product> {
    let product_id = listing.product_id.map(NumOrStr::into_string)?;
    if product_id.trim().is_empty() {
        tracing::warn!("skipping discovery entry with a blank product id");
        return None;
    }

    Some(Product {
        product_id,
        category: normalize_category(listing.source_module.as_deref().unwrap_or("")),
        name: listing.name.unwrap_or_default(),
        count_sold: listing
            .count_sold
            .map_or(0, |n| n.into_string().trim().parse().unwrap_or(0)),
        discounted_price: normalize_price(listing.discounted_price.as_deref().unwrap_or("")),
        preorder: listing.preorder.unwrap_or(false),
        price: normalize_price(listing.price.as_deref().unwrap_or("")),
        stock: listing
            .stock
            .map_or(0, |n| n.into_string().trim().parse().unwrap_or(0)),
        gold_merchant: listing.gold_merchant.unwrap_or(false),
        is_official: listing.is_official.unwrap_or(false),
        is_topads: listing.is_topads.unwrap_or(false),
        rating_average: listing
            .rating_average
            .map_or_else(|| "0.0".to_string(), NumOrStr::into_string),
        shop_id: listing.shop_id.map(NumOrStr::into_string).unwrap_or_default(),
        shop_location: listing.shop_location.unwrap_or_default(),
        warehouse_id: listing
            .warehouse_id
            .map(NumOrStr::into_string)
            .unwrap_or_default(),
        url: listing.url_desktop.unwrap_or_default(),
        reviews: Vec::new(),
    })
}

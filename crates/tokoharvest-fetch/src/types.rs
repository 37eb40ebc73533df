//! Wire types for the review listing endpoint.
//!
//! The endpoint answers a batched GraphQL request with a one-element array
//! mirroring the request. The page payload lives at
//! `[0].data.productrevGetProductReviewList` and carries the review entries,
//! a `hasNext` continuation flag and a `totalReviews` count. Every field on a
//! review entry has been observed missing or null in the wild, so the raw
//! structs treat everything as optional and normalization applies defaults.

use serde::Deserialize;

use crate::error::FetchError;

/// One parsed page of reviews plus the continuation signal.
#[derive(Debug)]
pub struct ReviewPage {
    /// Raw review entries in server order.
    pub reviews: Vec<RawReview>,
    /// `true` when the server reports further pages after this one.
    pub has_next: bool,
    /// Total review count the server claims for the product.
    pub total_reviews: u64,
}

impl ReviewPage {
    /// An empty terminal page, used when the response carries no review
    /// payload at all.
    #[must_use]
    pub fn end_of_data() -> Self {
        ReviewPage {
            reviews: Vec::new(),
            has_next: false,
            total_reviews: 0,
        }
    }
}

/// The `productrevGetProductReviewList` object inside a page response.
#[derive(Debug, Deserialize)]
pub struct RawReviewList {
    #[serde(default)]
    pub list: Vec<RawReview>,
    #[serde(rename = "hasNext", default)]
    pub has_next: bool,
    #[serde(rename = "totalReviews", default)]
    pub total_reviews: u64,
}

/// One review entry as served. Field names follow the GraphQL aliases, e.g.
/// `id` is the server's `feedbackID`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    /// Review identifier, e.g. `"742"`.
    #[serde(default)]
    pub id: Option<String>,
    /// Purchased variant, e.g. `"Hardcover"`.
    #[serde(default)]
    pub variant_name: Option<String>,
    /// Free-text review body.
    #[serde(default)]
    pub message: Option<String>,
    /// Star rating 1..=5.
    #[serde(default)]
    pub product_rating: Option<u8>,
    /// Human-readable age, e.g. `"1 Bulan yang lalu"`.
    #[serde(default)]
    pub review_create_time: Option<String>,
    /// Unix timestamp of the review, e.g. `1704067200`.
    #[serde(default)]
    pub review_create_timestamp: Option<i64>,
    /// Seller reply, if any.
    #[serde(default)]
    pub review_response: Option<RawReviewResponse>,
    /// Like counters for the review.
    #[serde(default)]
    pub like_dislike: Option<RawLikeDislike>,
    /// Formatted complaint reason on low ratings.
    #[serde(rename = "badRatingReasonFmt", default)]
    pub bad_rating_reason: Option<String>,
}

/// Seller reply attached to a review.
#[derive(Debug, Default, Deserialize)]
pub struct RawReviewResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Like counters attached to a review.
#[derive(Debug, Default, Deserialize)]
pub struct RawLikeDislike {
    #[serde(rename = "totalLike", default)]
    pub total_like: u32,
}

/// Parses one response body into a [`ReviewPage`].
///
/// A body that is not JSON at all is a [`FetchError::Deserialize`]. A JSON
/// body that never reaches the review-list object (wrong root shape, missing
/// `data`, null payload) is an end-of-data page, not an error; erroring there
/// would turn every delisted product into a permanent failure. A review-list
/// object that is present but fails the schema is again a
/// [`FetchError::Deserialize`].
pub fn parse_review_page(body: &str, product_id: &str) -> Result<ReviewPage, FetchError> {
    let root: serde_json::Value =
        serde_json::from_str(body).map_err(|e| FetchError::Deserialize {
            context: format!("review page body for product {product_id}"),
            source: e,
        })?;

    let Some(list_value) = root
        .get(0)
        .and_then(|entry| entry.get("data"))
        .and_then(|data| data.get("productrevGetProductReviewList"))
        .filter(|value| !value.is_null())
    else {
        return Ok(ReviewPage::end_of_data());
    };

    let raw: RawReviewList =
        serde_json::from_value(list_value.clone()).map_err(|e| FetchError::Deserialize {
            context: format!("review list for product {product_id}"),
            source: e,
        })?;

    Ok(ReviewPage {
        reviews: raw.list,
        has_next: raw.has_next,
        total_reviews: raw.total_reviews,
    })
}

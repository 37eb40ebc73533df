//! Review harvesting for Tokopedia product listings.
//!
//! The crate covers the whole fetch path: extracting products from captured
//! discovery payloads, paging through the review listing endpoint with
//! retry and backoff, normalizing wire reviews, and running batched
//! concurrent fetches across a product set.

pub mod batch;
pub mod client;
pub mod discovery;
pub mod error;
pub mod normalize;
mod retry;
pub mod types;

pub use batch::{attach_reviews, FetchFailure, FetchReport};
pub use client::{ReviewClient, REVIEW_ENDPOINT};
pub use discovery::extract_products;
pub use error::{FailureCategory, FetchError};
pub use normalize::normalize_review;
pub use types::ReviewPage;

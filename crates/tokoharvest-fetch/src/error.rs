//! Error types for the fetch crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server statuses worth retrying. Everything else in the 4xx/5xx range is
/// treated as a permanent answer for the request that produced it.
pub(crate) const RETRIABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Errors that can occur while fetching or parsing review data.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, DNS, etc).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Server returned 429; the caller should back off before retrying.
    #[error("rate limited fetching reviews for product {product_id}, retry after {retry_after_secs}s")]
    RateLimited {
        product_id: String,
        retry_after_secs: u64,
    },

    /// Server returned a status we have no specific handling for.
    #[error("unexpected HTTP status {status} for product {product_id}")]
    UnexpectedStatus { status: u16, product_id: String },

    /// The run was cancelled before this product finished fetching.
    #[error("fetch cancelled for product {product_id}")]
    Cancelled { product_id: String },
}

impl FetchError {
    /// Classifies this error for the per-product failure report.
    #[must_use]
    pub fn category(&self) -> FailureCategory {
        match self {
            FetchError::Http(_) | FetchError::RateLimited { .. } => FailureCategory::ExhaustedRetries,
            FetchError::UnexpectedStatus { status, .. } if RETRIABLE_STATUSES.contains(status) => {
                FailureCategory::ExhaustedRetries
            }
            FetchError::UnexpectedStatus { .. } => FailureCategory::HttpStatus,
            FetchError::Deserialize { .. } => FailureCategory::MalformedResponse,
            FetchError::Cancelled { .. } => FailureCategory::Cancelled,
        }
    }
}

/// Failure classes recorded per product so a later run can decide what is
/// worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// A transient network or server problem that survived every retry.
    ExhaustedRetries,
    /// The server answered 2xx with a body that fails the expected schema.
    MalformedResponse,
    /// A non-retriable HTTP status, such as a 404 or 403.
    HttpStatus,
    /// The run was cancelled before the product completed.
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("not json").unwrap_err()
    }

    #[test]
    fn retriable_statuses_map_to_exhausted_retries() {
        for status in RETRIABLE_STATUSES {
            let err = FetchError::UnexpectedStatus {
                status,
                product_id: "123".to_string(),
            };
            assert_eq!(err.category(), FailureCategory::ExhaustedRetries, "status {status}");
        }
    }

    #[test]
    fn client_errors_map_to_http_status() {
        let err = FetchError::UnexpectedStatus {
            status: 404,
            product_id: "123".to_string(),
        };
        assert_eq!(err.category(), FailureCategory::HttpStatus);
    }

    #[test]
    fn rate_limit_maps_to_exhausted_retries() {
        let err = FetchError::RateLimited {
            product_id: "123".to_string(),
            retry_after_secs: 60,
        };
        assert_eq!(err.category(), FailureCategory::ExhaustedRetries);
    }

    #[test]
    fn deserialize_maps_to_malformed_response() {
        let err = FetchError::Deserialize {
            context: "review page".to_string(),
            source: json_error(),
        };
        assert_eq!(err.category(), FailureCategory::MalformedResponse);
    }

    #[test]
    fn cancelled_maps_to_cancelled() {
        let err = FetchError::Cancelled {
            product_id: "123".to_string(),
        };
        assert_eq!(err.category(), FailureCategory::Cancelled);
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&FailureCategory::ExhaustedRetries).unwrap();
        assert_eq!(json, "\"exhausted_retries\"");
        let json = serde_json::to_string(&FailureCategory::MalformedResponse).unwrap();
        assert_eq!(json, "\"malformed_response\"");
    }
}

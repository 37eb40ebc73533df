//! HTTP client for the marketplace's review listing GraphQL endpoint.

mod fetch_all;

use std::time::Duration;

use reqwest::Client;
use tokoharvest_core::fetch_config::FetchConfig;

use crate::error::FetchError;
use crate::retry::retry_with_backoff;
use crate::types::{self, ReviewPage};

/// Production review listing endpoint.
pub const REVIEW_ENDPOINT: &str = "https://gql.tokopedia.com/graphql/productReviewList";

/// GraphQL document sent with every review page request. The field aliases
/// (`id: feedbackID`) are part of the observed wire contract and must not
/// change.
const REVIEW_LIST_QUERY: &str = r"
query productReviewList($productID: String!, $page: Int!, $limit: Int!, $sortBy: String, $filterBy: String) {
  productrevGetProductReviewList(productID: $productID, page: $page, limit: $limit, sortBy: $sortBy, filterBy: $filterBy) {
    productID
    list {
      id: feedbackID
      variantName
      message
      productRating
      reviewCreateTime
      reviewCreateTimestamp
      isReportable
      isAnonymous
      imageAttachments { attachmentID imageThumbnailUrl imageUrl __typename }
      videoAttachments { attachmentID videoUrl __typename }
      reviewResponse { message createTime __typename }
      user { userID fullName image url __typename }
      likeDislike { totalLike likeStatus __typename }
      stats { key formatted count __typename }
      badRatingReasonFmt
      __typename
    }
    shop { shopID name url image __typename }
    hasNext
    totalReviews
    __typename
  }
}
";

/// HTTP client for the review listing endpoint.
///
/// Sends the batched GraphQL POST the product page itself issues and parses
/// the one-element response array. Rate limiting (429), retriable server
/// statuses (500, 502, 503, 504) and network failures are automatically
/// retried with exponential backoff up to `max_retries` additional attempts.
pub struct ReviewClient {
    pub(super) client: Client,
    /// Full endpoint URL; overridable so tests can point at a local server.
    pub(super) endpoint: String,
    /// Reviews requested per page.
    pub(super) page_size: u32,
    /// Maximum number of retry attempts after the first failure.
    pub(super) max_retries: u32,
    /// Base delay for exponential backoff: `backoff_base * 2^attempt`.
    pub(super) backoff_base: Duration,
}

impl ReviewClient {
    /// Creates a `ReviewClient` for `endpoint` with the timeout, `User-Agent`,
    /// connection pool and retry policy from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(endpoint: &str, config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(config.pool_max_size)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
            page_size: config.page_size,
            max_retries: config.retry_total,
            backoff_base: config.backoff_base(),
        })
    }

    /// Fetches one page of reviews for `product_id`, with automatic retry on
    /// transient errors. Pages are 1-based.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`FetchError::UnexpectedStatus`]: any other non-2xx status
    ///   (500/502/503/504 retried, the rest not).
    /// - [`FetchError::Http`]: network or TLS failure after all retries exhausted.
    /// - [`FetchError::Deserialize`]: response body is not valid JSON (not retried).
    pub async fn fetch_review_page(
        &self,
        product_id: &str,
        page: u32,
    ) -> Result<ReviewPage, FetchError> {
        let payload = review_payload(product_id, page, self.page_size);

        retry_with_backoff(self.max_retries, self.backoff_base, || {
            let payload = payload.clone();
            let product_id = product_id.to_owned();
            async move {
                let response = self.client.post(&self.endpoint).json(&payload).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);

                    return Err(FetchError::RateLimited {
                        product_id,
                        retry_after_secs,
                    });
                }

                if !status.is_success() {
                    return Err(FetchError::UnexpectedStatus {
                        status: status.as_u16(),
                        product_id,
                    });
                }

                let body = response.text().await?;
                types::parse_review_page(&body, &product_id)
            }
        })
        .await
    }
}

/// Builds the batched GraphQL payload for one review page request. The
/// endpoint expects a one-element array even for a single operation.
fn review_payload(product_id: &str, page: u32, limit: u32) -> serde_json::Value {
    serde_json::json!([
        {
            "operationName": "productReviewList",
            "variables": {
                "productID": product_id,
                "page": page,
                "limit": limit,
                "sortBy": "create_time desc",
                "filterBy": "",
            },
            "query": REVIEW_LIST_QUERY,
        }
    ])
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;

//! Full pagination loop for a single product's reviews.

use std::collections::HashSet;

use tokoharvest_core::products::Review;

use super::ReviewClient;
use crate::error::FetchError;
use crate::normalize::normalize_review;

impl ReviewClient {
    /// Fetches every review page for `product_id` in order, starting at page
    /// 1, and returns the normalized collection.
    ///
    /// Pagination stops when the server stops reporting `hasNext`, when the
    /// response carries no review payload at all, or when `max_pages` is
    /// reached. Hitting the page cap is not an error: the reviews collected
    /// so far are returned and a warning is logged. `None` means paginate
    /// until the server says stop.
    ///
    /// Duplicate review ids across pages keep the first occurrence; the page
    /// windows the server serves can overlap when reviews land mid-fetch.
    ///
    /// All-or-nothing: if any page fails after retries, reviews from earlier
    /// pages are discarded and the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates the first [`FetchError`] from [`Self::fetch_review_page`].
    pub async fn fetch_all_reviews(
        &self,
        product_id: &str,
        max_pages: Option<u32>,
    ) -> Result<Vec<Review>, FetchError> {
        let mut all_reviews: Vec<Review> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut page: u32 = 1;

        loop {
            let fetched = self.fetch_review_page(product_id, page).await?;

            for raw in fetched.reviews {
                let review = normalize_review(raw);
                if seen_ids.insert(review.review_id.clone()) {
                    all_reviews.push(review);
                }
            }

            if !fetched.has_next {
                tracing::debug!(
                    product_id,
                    pages = page,
                    reviews = all_reviews.len(),
                    server_total = fetched.total_reviews,
                    "review pagination complete"
                );
                break;
            }

            if let Some(cap) = max_pages {
                if page >= cap {
                    tracing::warn!(
                        product_id,
                        cap,
                        reviews = all_reviews.len(),
                        "page cap reached with more pages available, returning partial collection"
                    );
                    break;
                }
            }

            page += 1;
        }

        Ok(all_reviews)
    }
}

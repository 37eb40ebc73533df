//! Batched, bounded-concurrency review fetching across a product set.
//!
//! Products are processed in fixed-size batches. Within a batch, up to
//! `max_workers` fetches run concurrently; batches themselves run one after
//! another with a configurable pause between them, so the worker bound holds
//! for the whole run. One product failing never aborts the run: the product
//! keeps an empty review list and the failure is recorded in the report.

use std::collections::BTreeMap;
use std::future::Future;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tokoharvest_core::fetch_config::FetchConfig;
use tokoharvest_core::products::{Product, Review};

use crate::client::ReviewClient;
use crate::error::{FailureCategory, FetchError};

/// Per-product failure entry surfaced in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub category: FailureCategory,
    pub message: String,
}

/// Summary of one review-attachment run.
///
/// Every product lands on exactly one side: `products_succeeded` counts
/// products whose reviews were fully fetched, `failures` holds the rest
/// keyed by product id, so `products_succeeded + failures.len()` always
/// equals `products_total`.
#[derive(Debug, Default, Serialize)]
pub struct FetchReport {
    pub products_total: usize,
    pub products_succeeded: usize,
    /// Reviews attached across all successful products.
    pub reviews_fetched: usize,
    /// Failures keyed by product id; a BTreeMap keeps report output stable.
    pub failures: BTreeMap<String, FetchFailure>,
}

/// Fetches reviews for every product in `products` and attaches them in
/// place, replacing whatever review list a product carried before.
///
/// Failed products end up with an empty review list and an entry in the
/// report's failure map. Cancelling `cancel` stops new work: in-flight
/// fetches wind down, and every product that has not completed is reported
/// as a [`FailureCategory::Cancelled`] failure rather than silently dropped.
pub async fn attach_reviews(
    products: &mut [Product],
    config: &FetchConfig,
    client: &ReviewClient,
    cancel: &CancellationToken,
) -> FetchReport {
    run_batches(products, config, cancel, |product_id| async move {
        client.fetch_all_reviews(&product_id, config.max_pages).await
    })
    .await
}

/// Batch orchestration skeleton behind [`attach_reviews`]. `fetch_product`
/// receives a product id and returns that product's full review collection.
async fn run_batches<F, Fut>(
    products: &mut [Product],
    config: &FetchConfig,
    cancel: &CancellationToken,
    fetch_product: F,
) -> FetchReport
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<Review>, FetchError>>,
{
    let mut report = FetchReport {
        products_total: products.len(),
        ..FetchReport::default()
    };

    let batch_size = config.batch_size.max(1);
    let max_workers = config.max_workers.max(1);
    let total = products.len();
    let batch_count = total.div_ceil(batch_size);

    tracing::info!(
        products = total,
        batches = batch_count,
        batch_size,
        max_workers,
        "starting review fetch run"
    );

    let mut start = 0usize;
    while start < total {
        let end = (start + batch_size).min(total);

        if cancel.is_cancelled() {
            tracing::warn!(
                remaining = total - start,
                "cancellation requested, not dispatching further batches"
            );
            for product in &mut products[start..] {
                product.reviews = Vec::new();
                report.failures.insert(
                    product.product_id.clone(),
                    FetchFailure {
                        category: FailureCategory::Cancelled,
                        message: format!(
                            "fetch cancelled for product {} before dispatch",
                            product.product_id
                        ),
                    },
                );
            }
            break;
        }

        let batch_no = start / batch_size + 1;
        tracing::debug!(
            batch = batch_no,
            batches = batch_count,
            size = end - start,
            "dispatching batch"
        );

        let ids: Vec<(usize, String)> = (start..end)
            .map(|idx| (idx, products[idx].product_id.clone()))
            .collect();

        let results: Vec<(usize, Result<Vec<Review>, FetchError>)> = stream::iter(ids)
            .map(|(idx, product_id)| {
                let fut = fetch_product(product_id.clone());
                async move {
                    let outcome = tokio::select! {
                        () = cancel.cancelled() => Err(FetchError::Cancelled { product_id }),
                        result = fut => result,
                    };
                    (idx, outcome)
                }
            })
            .buffer_unordered(max_workers)
            .collect()
            .await;

        for (idx, outcome) in results {
            match outcome {
                Ok(reviews) => {
                    report.products_succeeded += 1;
                    report.reviews_fetched += reviews.len();
                    products[idx].reviews = reviews;
                }
                Err(err) => {
                    tracing::warn!(
                        product_id = %products[idx].product_id,
                        error = %err,
                        "review fetch failed for product"
                    );
                    products[idx].reviews = Vec::new();
                    report.failures.insert(
                        products[idx].product_id.clone(),
                        FetchFailure {
                            category: err.category(),
                            message: err.to_string(),
                        },
                    );
                }
            }
        }

        start = end;

        // Pause between batches, but not after the last one. A cancellation
        // during the pause cuts it short.
        if start < total && !config.batch_delay().is_zero() {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(config.batch_delay()) => {}
            }
        }
    }

    if report.failures.is_empty() {
        tracing::info!(
            products = report.products_succeeded,
            reviews = report.reviews_fetched,
            "review fetch run complete"
        );
    } else {
        tracing::warn!(
            succeeded = report.products_succeeded,
            failed = report.failures.len(),
            reviews = report.reviews_fetched,
            "review fetch run complete with failures"
        );
    }

    report
}

//! `reviews` command handler.
//!
//! Loads a product list, fetches customer reviews for every product, and
//! writes the merged list back out. Per-product fetch failures are recorded
//! in the run report and do not abort the run; the command only fails when
//! the configuration or an input/output file is unusable, or when every
//! single product failed.

use std::fs;
use std::path::Path;

use tokio_util::sync::CancellationToken;

use tokoharvest_core::env::load_fetch_config;
use tokoharvest_core::fetch_config::FetchConfig;
use tokoharvest_core::products::load_products;
use tokoharvest_fetch::{
    attach_reviews, FailureCategory, FetchReport, ReviewClient, REVIEW_ENDPOINT,
};

/// Run review fetching for the given product list.
///
/// A Ctrl-C during the run cancels remaining work; whatever was fetched up
/// to that point is still written to `out`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the product list cannot
/// be loaded, the review client cannot be constructed, an output file cannot
/// be written, or every product failed.
pub(crate) async fn run(
    products_path: &Path,
    out: &Path,
    report_path: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });
    run_with_endpoint(products_path, out, report_path, dry_run, REVIEW_ENDPOINT, &cancel).await
}

/// [`run`] against a caller-chosen endpoint and cancellation token.
async fn run_with_endpoint(
    products_path: &Path,
    out: &Path,
    report_path: Option<&Path>,
    dry_run: bool,
    endpoint: &str,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let config = load_fetch_config()?;
    let mut products = load_products(products_path)?;

    if products.is_empty() {
        println!("no products in {}; nothing to fetch", products_path.display());
        return Ok(());
    }

    if dry_run {
        println!(
            "dry-run: would fetch reviews for {} products in batches of {} with {} workers",
            products.len(),
            config.batch_size,
            config.max_workers
        );
        let rendered = serde_json::to_string_pretty(&config)
            .map_err(|e| anyhow::anyhow!("failed to render configuration: {e}"))?;
        println!("{rendered}");
        return Ok(());
    }

    let client = build_review_client(endpoint, &config)?;

    let report = attach_reviews(&mut products, &config, &client, cancel).await;

    let json = serde_json::to_string_pretty(&products)
        .map_err(|e| anyhow::anyhow!("failed to serialize product list: {e}"))?;
    fs::write(out, json)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", out.display()))?;

    if let Some(report_path) = report_path {
        write_failure_report(report_path, &report)?;
    }

    println!(
        "attached {} reviews across {} of {} products into {}",
        report.reviews_fetched,
        report.products_succeeded,
        report.products_total,
        out.display()
    );

    if cancel.is_cancelled() {
        let pending = report
            .failures
            .values()
            .filter(|f| f.category == FailureCategory::Cancelled)
            .count();
        println!("run cancelled: {pending} products were still pending");
        return Ok(());
    }

    if !report.failures.is_empty() {
        tracing::warn!(
            failed = report.failures.len(),
            total = report.products_total,
            "some products failed review fetching"
        );
    }

    if report.products_succeeded == 0 {
        anyhow::bail!(
            "all {} products failed review fetching",
            report.products_total
        );
    }

    Ok(())
}

fn build_review_client(endpoint: &str, config: &FetchConfig) -> anyhow::Result<ReviewClient> {
    ReviewClient::new(endpoint, config)
        .map_err(|e| anyhow::anyhow!("failed to build review client: {e}"))
}

/// Resolves when the process receives Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::warn!("received shutdown signal, cancelling remaining products");
}

/// Write the per-product failure report as JSON.
///
/// The report repeats the run totals and stamps the generation time so
/// successive attempts can be told apart.
fn write_failure_report(path: &Path, report: &FetchReport) -> anyhow::Result<()> {
    let doc = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "products_total": report.products_total,
        "products_succeeded": report.products_succeeded,
        "reviews_fetched": report.reviews_fetched,
        "failures": report.failures,
    });
    let json = serde_json::to_string_pretty(&doc)
        .map_err(|e| anyhow::anyhow!("failed to serialize failure report: {e}"))?;
    fs::write(path, json)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    println!("failure report written to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;

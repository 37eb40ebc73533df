//! `extract` command handler.
//!
//! Reads captured discovery response bodies from disk, extracts the product
//! entries they contain, and writes the deduplicated list as JSON. Captures
//! that parse but hold no product component contribute nothing; a capture
//! that is not JSON at all aborts the command.

use std::fs;
use std::path::{Path, PathBuf};

use tokoharvest_fetch::extract_products;

/// Run product extraction over the given capture files.
///
/// # Errors
///
/// Returns an error if a capture file cannot be read, a body is not valid
/// JSON, or the output file cannot be written.
pub(crate) fn run(captures: &[PathBuf], out: &Path) -> anyhow::Result<()> {
    let mut bodies = Vec::with_capacity(captures.len());
    for path in captures {
        let body = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read capture file {}: {e}", path.display()))?;
        bodies.push(body);
    }

    let products = extract_products(&bodies)
        .map_err(|e| anyhow::anyhow!("failed to extract products from captures: {e}"))?;

    let json = serde_json::to_string_pretty(&products)
        .map_err(|e| anyhow::anyhow!("failed to serialize product list: {e}"))?;
    fs::write(out, json)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", out.display()))?;

    println!(
        "extracted {} products from {} captures into {}",
        products.len(),
        captures.len(),
        out.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;

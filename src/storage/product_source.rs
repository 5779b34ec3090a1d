use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{Product, Schema, scalar_text};

/// Where product documents come from.
#[async_trait]
pub trait ProductSource: Send + Sync {
    fn name(&self) -> &str;

    /// Every product document of a collection.
    async fn load_collection(&self, collection: &str) -> Result<Vec<Product>>;

    /// Products of the schema's collection that belong to its category.
    async fn products_for(&self, schema: &Schema) -> Result<Vec<Product>> {
        let products = self
            .load_collection(&schema.collection)
            .await
            .with_context(|| format!("Failed to load collection {}", schema.collection))?;
        let total = products.len();

        let matching: Vec<Product> = products
            .into_iter()
            .filter(|product| product.belongs_to(&schema.category_key))
            .collect();

        info!(
            "{} of {} products in '{}' belong to '{}'",
            matching.len(),
            total,
            schema.collection,
            schema.category_key
        );
        Ok(matching)
    }
}

/// Parses a collection export: either a JSON array or JSON Lines (one
/// document per line).
pub fn parse_documents(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("Failed to parse JSON array export");
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Failed to parse document on line {}", index + 1))
        })
        .collect()
}

/// Turns raw documents into products. Only documents that are not JSON
/// objects are skipped; loosely typed fields inside an object never drop it.
pub fn documents_to_products(documents: Vec<Value>) -> Vec<Product> {
    let total = documents.len();
    let mut products = Vec::with_capacity(total);
    let mut failed_count = 0;

    for (index, document) in documents.into_iter().enumerate() {
        if !document.is_object() {
            failed_count += 1;
            warn!("Skipping document at index {}: not a JSON object", index);
            continue;
        }

        let sku = document.get("sku").and_then(scalar_text);
        match serde_json::from_value::<Product>(document) {
            Ok(product) => products.push(product),
            Err(e) => {
                failed_count += 1;
                warn!(
                    "Skipping document at index {} (sku: {}): {}",
                    index,
                    sku.as_deref().unwrap_or("-"),
                    e
                );
            }
        }
    }

    info!(
        "Document parsing summary: {} successful, {} failed out of {} total",
        products.len(),
        failed_count,
        total
    );
    products
}

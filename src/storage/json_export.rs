use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::product_source::{ProductSource, documents_to_products, parse_documents};
use crate::models::Product;

/// Reads collections exported from the document store as
/// `<export_dir>/<collection>.json` (array) or `.jsonl` (one document per line).
pub struct JsonExportSource {
    export_dir: PathBuf,
}

impl JsonExportSource {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        JsonExportSource {
            export_dir: export_dir.into(),
        }
    }

    fn export_path(&self, collection: &str) -> Option<PathBuf> {
        ["json", "jsonl"]
            .iter()
            .map(|ext| self.export_dir.join(format!("{}.{}", collection, ext)))
            .find(|path| path.is_file())
    }
}

#[async_trait]
impl ProductSource for JsonExportSource {
    fn name(&self) -> &str {
        "json-export"
    }

    async fn load_collection(&self, collection: &str) -> Result<Vec<Product>> {
        let path = self.export_path(collection).ok_or_else(|| {
            anyhow!(
                "No export found for collection '{}' in {}",
                collection,
                self.export_dir.display()
            )
        })?;

        info!("Loading collection '{}' from {}", collection, path.display());
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read export file: {}", path.display()))?;

        Ok(documents_to_products(parse_documents(&content)?))
    }
}

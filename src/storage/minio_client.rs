use anyhow::{Result, anyhow};
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use tracing::info;

use super::product_source::{ProductSource, documents_to_products, parse_documents};
use crate::config::MinioConfig;
use crate::models::Product;

/// Reads collection exports stored in a MinIO / S3 bucket under
/// `<prefix>/<collection>/`. The most recent object wins.
pub struct MinioProductSource {
    bucket: Bucket,
    prefix: String,
}

impl MinioProductSource {
    pub fn from_config(config: &MinioConfig) -> Result<Self> {
        // Validate configuration
        config.validate()?;

        // Create custom region for MinIO endpoint
        let region = Region::Custom {
            region: config.get_region().to_owned(),
            endpoint: config.endpoint.clone(),
        };

        let credentials = Credentials::new(
            Some(config.get_access_key()?),
            Some(config.get_secret_key()?),
            None, // security_token
            None, // session_token
            None, // expiration
        )?;

        let bucket = Bucket::new(&config.bucket_name, region, credentials)?;

        let bucket = if config.is_path_style() {
            *bucket.with_path_style()
        } else {
            *bucket
        };

        Ok(MinioProductSource {
            bucket,
            prefix: config.get_prefix().trim_end_matches('/').to_string(),
        })
    }

    pub fn get_bucket_name(&self) -> &str {
        &self.bucket.name
    }

    pub async fn list_export_files(&self, collection: &str) -> Result<Vec<String>> {
        let folder = collection_folder(&self.prefix, collection);
        let list = self.bucket.list(folder.clone(), None).await?;

        let keys: Vec<String> = list
            .into_iter()
            .flat_map(|result| result.contents.into_iter().map(|object| object.key))
            .collect();

        Ok(export_keys(keys, &folder))
    }

    pub async fn get_object(&self, object_name: &str) -> Result<Vec<u8>> {
        let response = self.bucket.get_object(object_name).await?;

        if response.status_code() == 200 {
            Ok(response.bytes().to_vec())
        } else {
            Err(anyhow!(
                "Failed to get object: HTTP {}",
                response.status_code()
            ))
        }
    }
}

#[async_trait]
impl ProductSource for MinioProductSource {
    fn name(&self) -> &str {
        "minio"
    }

    async fn load_collection(&self, collection: &str) -> Result<Vec<Product>> {
        let latest = self
            .list_export_files(collection)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No export files found for collection: {}", collection))?;

        info!(
            "Loading collection '{}' from: {}/{}",
            collection,
            self.get_bucket_name(),
            latest
        );
        let bytes = self.get_object(&latest).await?;
        let content = String::from_utf8(bytes)
            .map_err(|e| anyhow!("Failed to parse export as UTF-8: {}", e))?;

        Ok(documents_to_products(parse_documents(&content)?))
    }
}

fn collection_folder(prefix: &str, collection: &str) -> String {
    if prefix.is_empty() {
        format!("{}/", collection)
    } else {
        format!("{}/{}/", prefix, collection)
    }
}

/// Export objects directly or indirectly under `folder`, newest first.
/// Keys are expected to carry a sortable timestamp.
fn export_keys(keys: Vec<String>, folder: &str) -> Vec<String> {
    let mut exports: Vec<String> = keys
        .into_iter()
        .filter(|key| key.starts_with(folder))
        .filter(|key| key.ends_with(".json") || key.ends_with(".jsonl"))
        .collect();
    exports.sort_by(|a, b| b.cmp(a));
    exports
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// `[minio]` section of `naming.toml`. Credentials never live in the file;
/// they are read from the environment (or `.env`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinioSection {
    pub endpoint: String,
    pub bucket_name: String,
    pub region: Option<String>,
    pub path_style: Option<bool>,
    /// Key prefix under which collection exports are stored.
    pub prefix: Option<String>,
    // Optional environment variable names for customization
    pub env_access_key: Option<String>,
    pub env_secret_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MinioConfig {
    pub endpoint: String,
    pub bucket_name: String,
    pub region: Option<String>,
    pub path_style: Option<bool>,
    pub prefix: Option<String>,
    // These fields will be loaded from environment variables
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub env_access_key: Option<String>,
    pub env_secret_key: Option<String>,
}

impl MinioConfig {
    /// Builds the config from its TOML section and loads the credentials.
    pub fn from_section(section: &MinioSection) -> Result<Self> {
        let mut config = Self {
            endpoint: section.endpoint.clone(),
            bucket_name: section.bucket_name.clone(),
            region: section.region.clone(),
            path_style: section.path_style,
            prefix: section.prefix.clone(),
            access_key: None,
            secret_key: None,
            env_access_key: section.env_access_key.clone(),
            env_secret_key: section.env_secret_key.clone(),
        };
        config.load_credentials()?;
        Ok(config)
    }

    pub fn load_credentials(&mut self) -> Result<()> {
        // Default environment variable names
        let access_key_var = self.env_access_key.as_deref().unwrap_or("MINIO_ACCESS_KEY");
        let secret_key_var = self.env_secret_key.as_deref().unwrap_or("MINIO_SECRET_KEY");

        self.access_key = env::var(access_key_var)
            .with_context(|| format!("Missing environment variable: {}", access_key_var))?
            .into();

        self.secret_key = env::var(secret_key_var)
            .with_context(|| format!("Missing environment variable: {}", secret_key_var))?
            .into();

        Ok(())
    }

    pub fn get_access_key(&self) -> Result<&str> {
        self.access_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Access key not loaded"))
    }

    pub fn get_secret_key(&self) -> Result<&str> {
        self.secret_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Secret key not loaded"))
    }

    pub fn is_path_style(&self) -> bool {
        self.path_style.unwrap_or(true)
    }

    pub fn get_region(&self) -> &str {
        self.region.as_deref().unwrap_or("us-east-1")
    }

    pub fn get_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("raw")
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(anyhow::anyhow!("MinIO endpoint cannot be empty"));
        }

        if self.bucket_name.is_empty() {
            return Err(anyhow::anyhow!("MinIO bucket name cannot be empty"));
        }

        if self.access_key.is_none() {
            return Err(anyhow::anyhow!("MinIO access key not loaded"));
        }

        if self.secret_key.is_none() {
            return Err(anyhow::anyhow!("MinIO secret key not loaded"));
        }

        Ok(())
    }
}

impl Default for MinioConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".to_string(),
            bucket_name: "catalog".to_string(),
            region: Some("us-east-1".to_string()),
            path_style: Some(true),
            prefix: None,
            access_key: None,
            secret_key: None,
            env_access_key: None,
            env_secret_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = MinioConfig::default();
        assert_eq!(config.endpoint, "http://localhost:9000");
        assert_eq!(config.get_region(), "us-east-1");
        assert_eq!(config.get_prefix(), "raw");
        assert!(config.is_path_style());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_section_loads_credentials() {
        unsafe {
            env::set_var("TEST_NAMING_ACCESS_KEY", "test_access");
            env::set_var("TEST_NAMING_SECRET_KEY", "test_secret");
        }

        let section = MinioSection {
            endpoint: "http://localhost:9000".to_string(),
            bucket_name: "catalog".to_string(),
            region: None,
            path_style: Some(false),
            prefix: Some("exports".to_string()),
            env_access_key: Some("TEST_NAMING_ACCESS_KEY".to_string()),
            env_secret_key: Some("TEST_NAMING_SECRET_KEY".to_string()),
        };

        let config = MinioConfig::from_section(&section).unwrap();
        assert_eq!(config.get_access_key().unwrap(), "test_access");
        assert_eq!(config.get_secret_key().unwrap(), "test_secret");
        assert_eq!(config.get_prefix(), "exports");
        assert!(!config.is_path_style());
        assert!(config.validate().is_ok());

        // Clean up
        unsafe {
            env::remove_var("TEST_NAMING_ACCESS_KEY");
            env::remove_var("TEST_NAMING_SECRET_KEY");
        }
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = MinioConfig::default();
        config.env_access_key = Some("TEST_NAMING_UNSET_ACCESS".to_string());
        config.env_secret_key = Some("TEST_NAMING_UNSET_SECRET".to_string());
        assert!(config.load_credentials().is_err());
    }
}

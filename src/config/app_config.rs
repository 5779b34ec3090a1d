use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::minio_config::MinioSection;

/// Run configuration, read once at start-up from `naming.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub schemas: SchemaSection,
    #[serde(default)]
    pub output: OutputSection,
    pub minio: Option<MinioSection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Json,
    Minio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    #[serde(default = "default_kind")]
    pub kind: SourceKind,
    /// Directory with `<collection>.json` exports, used by the `json` source.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSection {
    #[serde(default = "default_schema_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One styled spreadsheet with a tab per schema.
    Xlsx,
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_workbook")]
    pub workbook: String,
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

fn default_kind() -> SourceKind {
    SourceKind::Json
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_workbook() -> String {
    "productos_output".to_string()
}

fn default_format() -> OutputFormat {
    OutputFormat::Xlsx
}

fn default_true() -> bool {
    true
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            export_dir: default_export_dir(),
        }
    }
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            dir: default_schema_dir(),
            strict: default_true(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            workbook: default_workbook(),
            format: default_format(),
        }
    }
}

impl NamingConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: NamingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.kind == SourceKind::Minio && self.minio.is_none() {
            return Err(anyhow!("source.kind = \"minio\" requires a [minio] section"));
        }

        if self.output.workbook.trim().is_empty() {
            return Err(anyhow!("output.workbook cannot be empty"));
        }

        Ok(())
    }
}

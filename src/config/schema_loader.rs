use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::models::{Schema, SchemaError};

/// Loads naming schemas from JSON files that may carry `//` line comments.
pub struct SchemaLoader {
    strict: bool,
}

/// A schema together with the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub file_name: String,
    pub schema: Schema,
}

impl SchemaLoader {
    pub fn new(strict: bool) -> Self {
        SchemaLoader { strict }
    }

    pub fn parse(&self, content: &str) -> Result<Schema, SchemaError> {
        let value: serde_json::Value = serde_json::from_str(&strip_line_comments(content))?;
        Schema::from_value(&value, self.strict)
    }

    pub fn load_file(&self, path: &Path) -> Result<Schema> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
        self.parse(&content)
            .with_context(|| format!("Invalid schema: {}", path.display()))
    }

    /// Loads every `*.json` schema of `dir` in file-name order. Files that
    /// fail to load are logged and skipped.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<LoadedSchema>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read schema directory: {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut schemas = Vec::with_capacity(paths.len());
        for path in paths {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            match self.load_file(&path) {
                Ok(schema) => {
                    info!("Loaded schema: {} (tipo: {})", file_name, schema.category_key);
                    schemas.push(LoadedSchema { file_name, schema });
                }
                Err(e) => {
                    error!("Skipping schema {}: {:#}", file_name, e);
                }
            }
        }

        if schemas.is_empty() {
            warn!("No valid schemas found in {}", dir.display());
        }

        Ok(schemas)
    }
}

/// Removes `//` comments that sit outside JSON string literals.
pub fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let mut in_string = false;
            let mut escaped = false;
            let mut prev_slash = false;

            for (i, c) in line.char_indices() {
                if in_string {
                    match c {
                        _ if escaped => escaped = false,
                        '\\' => escaped = true,
                        '"' => in_string = false,
                        _ => {}
                    }
                    continue;
                }
                match c {
                    '"' => {
                        in_string = true;
                        prev_slash = false;
                    }
                    '/' if prev_slash => return &line[..i - 1],
                    '/' => prev_slash = true,
                    _ => prev_slash = false,
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

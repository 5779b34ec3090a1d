use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use super::sheet::{Sheet, Workbook};
use super::xlsx_writer::write_xlsx;
use crate::config::OutputFormat;

/// Writes a workbook under `dir`. `xlsx` produces one styled
/// `<workbook>.xlsx`; `csv` and `parquet` produce one data file per sheet in
/// `<workbook>/`, each with a `.layout.json` sidecar holding its styling.
pub struct SheetWriter {
    dir: PathBuf,
    workbook: String,
    format: OutputFormat,
}

impl SheetWriter {
    pub fn new(dir: impl Into<PathBuf>, workbook: impl Into<String>, format: OutputFormat) -> Self {
        SheetWriter {
            dir: dir.into(),
            workbook: workbook.into(),
            format,
        }
    }

    /// Where the workbook lands: the `.xlsx` file or the per-sheet directory.
    pub fn target(&self) -> PathBuf {
        match self.format {
            OutputFormat::Xlsx => self
                .dir
                .join(format!("{}.{}", self.workbook, self.format.extension())),
            OutputFormat::Csv | OutputFormat::Parquet => self.dir.join(&self.workbook),
        }
    }

    pub fn write_workbook(&self, workbook: &Workbook) -> Result<Vec<PathBuf>> {
        let target = self.target();

        if self.format == OutputFormat::Xlsx {
            std::fs::create_dir_all(&self.dir).with_context(|| {
                format!("Failed to create output directory: {}", self.dir.display())
            })?;
            write_xlsx(workbook, &target)?;
            info!("Wrote {} sheets to {}", workbook.sheets().len(), target.display());
            return Ok(vec![target]);
        }

        std::fs::create_dir_all(&target)
            .with_context(|| format!("Failed to create output directory: {}", target.display()))?;

        let mut written = Vec::new();
        for sheet in workbook.sheets() {
            written.extend(self.write_sheet(&target, sheet)?);
        }
        Ok(written)
    }

    fn write_sheet(&self, dir: &Path, sheet: &Sheet) -> Result<Vec<PathBuf>> {
        let mut df = sheet_to_dataframe(sheet)?;

        let data_path = dir.join(format!("{}.{}", sheet.name, self.format.extension()));
        let create = || {
            File::create(&data_path)
                .with_context(|| format!("Failed to create {}", data_path.display()))
        };
        match self.format {
            OutputFormat::Csv => {
                CsvWriter::new(&mut create()?)
                    .include_header(true)
                    .finish(&mut df)?;
            }
            OutputFormat::Parquet => {
                ParquetWriter::new(&mut create()?).finish(&mut df)?;
            }
            OutputFormat::Xlsx => {
                return Err(anyhow!("xlsx workbooks are written as a whole, not per sheet"));
            }
        }
        info!("Wrote sheet '{}' ({} rows) to {}", sheet.name, df.height(), data_path.display());

        let layout_path = dir.join(format!("{}.layout.json", sheet.name));
        let layout = serde_json::to_string_pretty(&sheet.layout(Utc::now()))?;
        std::fs::write(&layout_path, layout)
            .with_context(|| format!("Failed to write {}", layout_path.display()))?;

        Ok(vec![data_path, layout_path])
    }
}

/// One string column per sheet column.
pub fn sheet_to_dataframe(sheet: &Sheet) -> Result<DataFrame> {
    let columns: Vec<Column> = unique_column_names(&sheet.headers)
        .into_iter()
        .enumerate()
        .map(|(index, name)| Series::new(name.into(), sheet.column_values(index)).into())
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Frames need distinct column names; repeated headers (two category levels,
/// for instance) get a numeric suffix.
fn unique_column_names(headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    headers
        .iter()
        .map(|header| {
            let count = seen.entry(header.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                header.clone()
            } else {
                format!("{}_{}", header, count)
            }
        })
        .collect()
}

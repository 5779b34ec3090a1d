use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::models::{ComposedName, Product};
use crate::processor::NameComposer;

pub const MAX_SHEET_NAME_LEN: usize = 31;
pub const MAX_COLUMN_WIDTH: usize = 50;
const DEFAULT_SHEET_NAME: &str = "Productos";

/// Fill colors (RGB hex) used to highlight naming gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub header_fill: &'static str,
    pub header_font: &'static str,
    pub complete_fill: &'static str,
    pub incomplete_fill: &'static str,
    pub missing_fill: &'static str,
}

pub const PALETTE: Palette = Palette {
    header_fill: "4CAF50",
    header_font: "FFFFFF",
    complete_fill: "D4EDDA",
    incomplete_fill: "FFF3CD",
    missing_fill: "FFC107",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Complete,
    Incomplete,
}

impl RowStatus {
    pub fn fill(&self) -> &'static str {
        match self {
            RowStatus::Complete => PALETTE.complete_fill,
            RowStatus::Incomplete => PALETTE.incomplete_fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    /// Row-colored cell.
    Row(RowStatus),
    /// Bold cell highlighting a field that could not be resolved.
    MissingField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub status: RowStatus,
    pub cells: Vec<Cell>,
}

/// One workbook tab: a header row and one row per product.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        let mut headers = vec!["SKU".to_string(), "Nombre Completo".to_string()];
        headers.extend(columns);
        Sheet {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Composes every product's name and lays the results out as rows.
    pub fn for_products(name: impl Into<String>, composer: &NameComposer, products: &[Product]) -> Self {
        let mut sheet = Sheet::new(name, composer.column_headers());
        for product in products {
            sheet.push_row(product.sku.as_deref(), &composer.compose(product));
        }
        sheet
    }

    pub fn push_row(&mut self, sku: Option<&str>, composed: &ComposedName) {
        let status = if composed.any_missing {
            RowStatus::Incomplete
        } else {
            RowStatus::Complete
        };

        let mut cells = Vec::with_capacity(self.headers.len());
        cells.push(Cell {
            value: sku.unwrap_or_default().to_string(),
            style: CellStyle::Row(status),
        });
        cells.push(Cell {
            value: composed.full_name.clone(),
            style: CellStyle::Row(status),
        });
        cells.extend(composed.parts.iter().map(|part| Cell {
            value: part.value.clone(),
            style: if part.missing {
                CellStyle::MissingField
            } else {
                CellStyle::Row(status)
            },
        }));

        self.rows.push(SheetRow { status, cells });
    }

    /// Values of one column, header excluded.
    pub fn column_values(&self, index: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.cells.get(index).map(|c| c.value.clone()).unwrap_or_default())
            .collect()
    }

    /// Width per column: longest text (header included) plus two, capped.
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.cells.get(index))
                    .map(|cell| cell.value.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0);
                (longest + 2).min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    pub fn incomplete_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status == RowStatus::Incomplete)
            .count()
    }

    pub fn layout(&self, generated_at: DateTime<Utc>) -> SheetLayout {
        SheetLayout {
            sheet: self.name.clone(),
            generated_at,
            palette: PALETTE,
            headers: self.headers.clone(),
            column_widths: self.column_widths(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .map(|(index, row)| RowLayout {
                    // Spreadsheet rows are 1-based and row 1 holds the headers.
                    row: index + 2,
                    status: row.status,
                    fill: row.status.fill(),
                    missing_columns: row
                        .cells
                        .iter()
                        .enumerate()
                        .filter(|(_, cell)| cell.style == CellStyle::MissingField)
                        .map(|(column, _)| column + 1)
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Presentation details of a sheet for renderers that support styling.
#[derive(Debug, Clone, Serialize)]
pub struct SheetLayout {
    pub sheet: String,
    pub generated_at: DateTime<Utc>,
    pub palette: Palette,
    pub headers: Vec<String>,
    pub column_widths: Vec<usize>,
    pub rows: Vec<RowLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowLayout {
    pub row: usize,
    pub status: RowStatus,
    pub fill: &'static str,
    /// 1-based columns rendered with the missing-field style.
    pub missing_columns: Vec<usize>,
}

/// Makes a spreadsheet-safe tab name: no `\ / ? * [ ]`, at most 31 characters.
pub fn sanitize_sheet_name(name: &str) -> Result<String> {
    let forbidden = Regex::new(r"[\\/?*\[\]]")?;
    let cleaned: String = forbidden
        .replace_all(name, "")
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect();

    if cleaned.is_empty() {
        Ok(DEFAULT_SHEET_NAME.to_string())
    } else {
        Ok(cleaned)
    }
}

/// Ordered collection of sheets with unique names.
#[derive(Debug, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet, renaming it with a numeric suffix if its name is taken.
    pub fn add_sheet(&mut self, mut sheet: Sheet) -> &Sheet {
        let base = sheet.name.clone();
        let mut counter = 2;
        while self.contains(&sheet.name) {
            let suffix = format!("_{}", counter);
            let stem: String = base
                .chars()
                .take(MAX_SHEET_NAME_LEN - suffix.chars().count())
                .collect();
            sheet.name = format!("{}{}", stem, suffix);
            counter += 1;
        }

        self.sheets.push(sheet);
        &self.sheets[self.sheets.len() - 1]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheets.iter().any(|sheet| sheet.name == name)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

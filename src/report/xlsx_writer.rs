use anyhow::{Result, anyhow};
use std::path::Path;
use tracing::info;
use umya_spreadsheet::{HorizontalAlignmentValues, Spreadsheet, VerticalAlignmentValues, Worksheet};

use super::sheet::{CellStyle, PALETTE, Sheet, Workbook};

/// Writes the whole workbook as one `.xlsx` file, one tab per sheet, with
/// header, row and missing-field styling applied to the cells.
pub fn write_xlsx(workbook: &Workbook, path: &Path) -> Result<()> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();

    for sheet in workbook.sheets() {
        let worksheet = book
            .new_sheet(sheet.name.clone())
            .map_err(|e| anyhow!("Failed to add sheet '{}': {}", sheet.name, e))?;
        render_sheet(sheet, worksheet);
        info!("Rendered sheet '{}' ({} rows)", sheet.name, sheet.rows.len());
    }

    save(&book, path)
}

fn save(book: &Spreadsheet, path: &Path) -> Result<()> {
    umya_spreadsheet::writer::xlsx::write(book, path)
        .map_err(|e| anyhow!("Failed to write workbook {}: {:?}", path.display(), e))
}

fn render_sheet(sheet: &Sheet, worksheet: &mut Worksheet) {
    for (index, header) in sheet.headers.iter().enumerate() {
        let coordinate = (column_number(index), 1);
        worksheet.get_cell_mut(coordinate).set_value(header.clone());

        let style = worksheet.get_style_mut(coordinate);
        style.set_background_color(argb(PALETTE.header_fill));
        let font = style.get_font_mut();
        font.set_bold(true);
        font.get_color_mut().set_argb(argb(PALETTE.header_font));
        let alignment = style.get_alignment_mut();
        alignment.set_horizontal(HorizontalAlignmentValues::Center);
        alignment.set_vertical(VerticalAlignmentValues::Center);
    }

    for (row_index, row) in sheet.rows.iter().enumerate() {
        // Row 1 holds the headers.
        let row_number = row_number(row_index);
        for (index, cell) in row.cells.iter().enumerate() {
            let coordinate = (column_number(index), row_number);
            worksheet.get_cell_mut(coordinate).set_value(cell.value.clone());

            let style = worksheet.get_style_mut(coordinate);
            match cell.style {
                CellStyle::Row(status) => {
                    style.set_background_color(argb(status.fill()));
                }
                CellStyle::MissingField => {
                    style.set_background_color(argb(PALETTE.missing_fill));
                    style.get_font_mut().set_bold(true);
                }
            }
        }
    }

    for (index, width) in sheet.column_widths().into_iter().enumerate() {
        worksheet
            .get_column_dimension_mut(&column_letter(index))
            .set_width(width as f64);
    }
}

/// Opaque ARGB form of an RGB hex color.
fn argb(rgb: &str) -> String {
    format!("FF{}", rgb)
}

fn column_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

fn row_number(index: usize) -> u32 {
    u32::try_from(index + 2).unwrap_or(u32::MAX)
}

/// Spreadsheet column letters for a 0-based index: 0 → A, 25 → Z, 26 → AA.
fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComposedName, NamePart};

    fn workbook() -> Workbook {
        let mut sheet = Sheet::new("laptops", vec!["marca".to_string(), "nombreProducto".to_string()]);
        sheet.push_row(
            Some("LAP-1"),
            &ComposedName {
                full_name: "HP Victus 15".to_string(),
                parts: vec![
                    NamePart {
                        name: "marca".to_string(),
                        value: "HP".to_string(),
                        missing: false,
                    },
                    NamePart {
                        name: "nombreProducto".to_string(),
                        value: "Victus 15".to_string(),
                        missing: false,
                    },
                ],
                any_missing: false,
            },
        );
        sheet.push_row(
            Some("LAP-2"),
            &ComposedName {
                full_name: "[MARCA] X200".to_string(),
                parts: vec![
                    NamePart {
                        name: "marca".to_string(),
                        value: "[MARCA]".to_string(),
                        missing: true,
                    },
                    NamePart {
                        name: "nombreProducto".to_string(),
                        value: "X200".to_string(),
                        missing: false,
                    },
                ],
                any_missing: true,
            },
        );

        let mut workbook = Workbook::new();
        workbook.add_sheet(sheet);
        workbook.add_sheet(Sheet::new("celulares", vec!["marca".to_string()]));
        workbook
    }

    fn fill(worksheet: &Worksheet, coordinate: (u32, u32)) -> String {
        worksheet
            .get_cell(coordinate)
            .unwrap()
            .get_style()
            .get_background_color()
            .unwrap()
            .get_argb()
            .to_string()
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_written_workbook_keeps_values_and_fills() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("productos_output.xlsx");
        write_xlsx(&workbook(), &path).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        let names: Vec<_> = book
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["laptops", "celulares"]);
        let laptops = book.get_sheet_by_name("laptops").unwrap();

        assert_eq!(laptops.get_value((1, 1)), "SKU");
        assert_eq!(laptops.get_value((2, 2)), "HP Victus 15");
        assert_eq!(laptops.get_value((3, 3)), "[MARCA]");

        assert_eq!(fill(laptops, (1, 1)), "FF4CAF50");
        assert_eq!(fill(laptops, (3, 2)), "FFD4EDDA");
        assert_eq!(fill(laptops, (1, 3)), "FFFFF3CD");
        assert_eq!(fill(laptops, (3, 3)), "FFFFC107");
        assert_eq!(fill(laptops, (4, 3)), "FFFFF3CD");
    }
}

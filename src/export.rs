//! Tabular export of the invoice: CSV or XLSX, chosen by the destination
//! extension. The footer mirrors the print document's summary exactly; both
//! are derived from the same `compute_summary` call chain.

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, XlsxError};
use tracing::warn;

use crate::error::ExportError;
use crate::invoice::InvoiceState;
use crate::models::format_amount;

pub const COLUMNS: [&str; 5] = ["#", "Item", "Quantity", "Unit Price", "Total"];

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub index: u32,
    pub item: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

/// Display-table columns plus a computed per-row total, and the three
/// summary footer rows as label/value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub rows: Vec<ExportRow>,
    pub footer: Vec<(String, f64)>,
}

pub fn build_export_rows(state: &InvoiceState) -> Result<ExportTable, ExportError> {
    if state.is_empty() {
        return Err(ExportError::NoItems);
    }

    let summary = state.compute_summary();
    let rows = state
        .line_items()
        .iter()
        .map(|item| ExportRow {
            index: item.index,
            item: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total: item.line_total(),
        })
        .collect();

    Ok(ExportTable {
        rows,
        footer: vec![
            ("Subtotal".to_string(), summary.subtotal),
            (state.tax_label(), summary.tax_amount),
            ("Total".to_string(), summary.total),
        ],
    })
}

/// Write the table to `path`. A `.csv` destination writes delimited text;
/// anything else writes a styled workbook. A workbook failure degrades to a
/// CSV written beside the requested path. Returns the path actually written.
pub fn write_export(table: &ExportTable, path: &Path) -> Result<PathBuf, ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let wants_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if wants_csv {
        write_csv(table, path)?;
        return Ok(path.to_path_buf());
    }

    match write_xlsx(table, path) {
        Ok(()) => Ok(path.to_path_buf()),
        Err(err) => {
            let fallback = path.with_extension("csv");
            warn!(%err, fallback = %fallback.display(), "xlsx export failed, falling back to csv");
            write_csv(table, &fallback)?;
            Ok(fallback)
        }
    }
}

fn write_csv(table: &ExportTable, path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for row in &table.rows {
        writer.write_record([
            row.index.to_string(),
            row.item.clone(),
            format_amount(row.quantity),
            format_amount(row.unit_price),
            format_amount(row.total),
        ])?;
    }
    // Blank separator, then summary rows: label in the Item column, value
    // in the Total column, same shape as the print document.
    writer.write_record(["", "", "", "", ""])?;
    for (label, value) in &table.footer {
        let amount = format_amount(*value);
        writer.write_record(["", label.as_str(), "", "", amount.as_str()])?;
    }
    writer.flush().map_err(ExportError::Io)?;
    Ok(())
}

fn write_xlsx(table: &ExportTable, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Invoice")?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x2C3E50))
        .set_align(FormatAlign::Center);
    let money = Format::new().set_num_format("#,##0.00");
    let bold = Format::new().set_bold();
    let bold_money = Format::new().set_bold().set_num_format("#,##0.00");

    for (col, title) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    let mut row_idx: u32 = 1;
    for row in &table.rows {
        worksheet.write_number(row_idx, 0, row.index as f64)?;
        worksheet.write_string(row_idx, 1, &row.item)?;
        worksheet.write_number(row_idx, 2, row.quantity)?;
        worksheet.write_number_with_format(row_idx, 3, row.unit_price, &money)?;
        worksheet.write_number_with_format(row_idx, 4, row.total, &money)?;
        row_idx += 1;
    }

    row_idx += 1; // blank separator row
    for (label, value) in &table.footer {
        worksheet.write_string_with_format(row_idx, 1, label, &bold)?;
        worksheet.write_number_with_format(row_idx, 4, *value, &bold_money)?;
        row_idx += 1;
    }

    // Presentation niceties, not contracts: readable column widths.
    let item_width = table
        .rows
        .iter()
        .map(|r| r.item.len())
        .chain(table.footer.iter().map(|(label, _)| label.len()))
        .max()
        .unwrap_or(4)
        .max(4) as f64;
    worksheet.set_column_width(0, 6.0)?;
    worksheet.set_column_width(1, (item_width + 2.0).min(30.0))?;
    for col in 2..=4 {
        worksheet.set_column_width(col, 12.0)?;
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    fn sample_state() -> InvoiceState {
        let mut state = InvoiceState::new(Currency::Usd);
        state.tax_rate_percent = 10.0;
        state.add_line_item("Widget", "2", "10.00").unwrap();
        state.add_line_item("Gadget", "1", "5.00").unwrap();
        state
    }

    #[test]
    fn empty_collection_exports_nothing() {
        let state = InvoiceState::new(Currency::Usd);
        assert!(matches!(
            build_export_rows(&state).unwrap_err(),
            ExportError::NoItems
        ));
    }

    #[test]
    fn footer_mirrors_the_print_summary() {
        let state = sample_state();
        let table = build_export_rows(&state).unwrap();
        let doc =
            crate::document::build_document(&state, &crate::models::CompanyProfile::default())
                .unwrap();

        assert_eq!(table.footer.len(), doc.items.summary.len());
        for ((label, value), (doc_label, doc_value)) in table.footer.iter().zip(&doc.items.summary)
        {
            assert!(doc_label.starts_with(label.as_str()));
            assert_eq!(&format_amount(*value), doc_value);
        }
    }

    #[test]
    fn rows_carry_per_item_totals() {
        let table = build_export_rows(&sample_state()).unwrap();
        assert_eq!(table.rows[0].total, 20.0);
        assert_eq!(table.rows[1].total, 5.0);
        assert_eq!(table.rows[0].index, 1);
    }

    #[test]
    fn csv_destination_writes_delimited_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.csv");
        let table = build_export_rows(&sample_state()).unwrap();

        let written = write_export(&table, &path).unwrap();
        assert_eq!(written, path);

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "#,Item,Quantity,Unit Price,Total");
        assert_eq!(lines.next().unwrap(), "1,Widget,2.00,10.00,20.00");
        assert!(text.contains(",Subtotal,,,25.00"));
        assert!(text.contains(",Tax (10%),,,2.50"));
        assert!(text.contains(",Total,,,27.50"));
    }

    #[test]
    fn other_extensions_write_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.xlsx");
        let table = build_export_rows(&sample_state()).unwrap();

        let written = write_export(&table, &path).unwrap();
        assert_eq!(written, path);

        // XLSX is a zip container.
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}

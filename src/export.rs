//! Excel export of the ranked pivot.
//!
//! One sheet, flattened headers in pivot column order:
//!
//! ```text
//! | Client | January 2024 - Rank | January 2024 - Amount | ... |
//! |--------|---------------------|-----------------------|-----|
//! | B      |                     |                       | ... |
//! | A      | 1                   | 1 000                 | ... |
//! ```

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};

use crate::data::model::DepositDataset;
use crate::data::month::{MonthLabeler, PivotWindow};
use crate::data::pivot::{build_ranked_pivot, RankedPivot};

pub const SHEET_NAME: &str = "Rank_Amount";
pub const DEFAULT_FILE_NAME: &str = "client_rank_amount.xlsx";

/// Serialize a pivot to an in-memory xlsx workbook.
pub fn pivot_to_xlsx(pivot: &RankedPivot) -> Result<Vec<u8>> {
    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(0xEEEEEE)
        .set_border(FormatBorder::Thin);
    let amount = Format::new().set_num_format("#,##0");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).context("naming export sheet")?;

    for (col, name) in pivot.column_names().iter().enumerate() {
        let col = column_index(col)?;
        sheet
            .write_string_with_format(0, col, name, &header)
            .context("writing export header")?;
        sheet
            .set_column_width(col, if col == 0 { 16 } else { 22 })
            .context("sizing export column")?;
    }
    sheet.set_freeze_panes(1, 1).context("freezing header row")?;

    for (i, row) in pivot.rows.iter().enumerate() {
        let r = u32::try_from(i + 1).context("too many rows for a worksheet")?;
        sheet
            .write_string(r, 0, &row.client)
            .context("writing client cell")?;

        for (m, cell) in row.cells.iter().enumerate() {
            let Some(cell) = cell else {
                continue;
            };
            let rank_col = column_index(1 + 2 * m)?;
            sheet
                .write_number(r, rank_col, cell.rank as f64)
                .context("writing rank cell")?;
            sheet
                .write_number_with_format(r, rank_col + 1, cell.amount, &amount)
                .context("writing amount cell")?;
        }
    }

    workbook
        .save_to_buffer()
        .context("serializing export workbook")
}

/// Build the pivot for the current (agency, type) and serialize it.
///
/// `Ok(None)` means there is nothing to export; no file should be written.
pub fn export_pivot(
    dataset: &DepositDataset,
    agency: &str,
    deposit_type: &str,
    window: &PivotWindow,
    labeler: &MonthLabeler,
) -> Result<Option<Vec<u8>>> {
    let Some(pivot) = build_ranked_pivot(dataset, agency, deposit_type, window, labeler) else {
        log::info!("export skipped: no pivot rows for {deposit_type} / {agency}");
        return Ok(None);
    };
    let bytes = pivot_to_xlsx(&pivot)?;
    log::info!(
        "exported {} clients x {} months ({} bytes)",
        pivot.len(),
        pivot.months.len(),
        bytes.len()
    );
    Ok(Some(bytes))
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).context("too many columns for a worksheet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    #[test]
    fn empty_pivot_exports_nothing() {
        let ds = DepositDataset::from_records(vec![record("A", "X", "Savings", 2020, 1, 5.0)]);
        let out = export_pivot(&ds, "X", "Savings", &PivotWindow::default(), &MonthLabeler::default())
            .expect("export");
        assert!(out.is_none());
    }

    #[test]
    fn export_produces_xlsx_bytes() {
        let ds = DepositDataset::from_records(vec![
            record("A", "X", "Savings", 2024, 1, 1000.0),
            record("B", "X", "Savings", 2025, 4, 1500.0),
        ]);
        let bytes = export_pivot(&ds, "X", "Savings", &PivotWindow::default(), &MonthLabeler::default())
            .expect("export")
            .expect("non-empty pivot");
        // xlsx is a zip container.
        assert_eq!(&bytes[..2], b"PK");
    }
}

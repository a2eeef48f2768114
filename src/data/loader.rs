use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{CellValue, DepositDataset, DepositRecord};

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

pub const COL_CLIENT: &str = "Client";
pub const COL_ACCOUNT: &str = "Compte";
pub const COL_TYPE: &str = "Types de Dépôts";
pub const COL_YEAR: &str = "Année";
pub const COL_MONTH: &str = "Mois";
pub const COL_AMOUNT: &str = "Dépôts";
/// Branch name column, renamed to `Agence` once loaded.
pub const COL_AGENCY: &str = "Désignation";

static NULL_CELL: CellValue = CellValue::Null;

const REQUIRED_COLUMNS: [&str; 7] = [
    COL_CLIENT,
    COL_ACCOUNT,
    COL_TYPE,
    COL_YEAR,
    COL_MONTH,
    COL_AMOUNT,
    COL_AGENCY,
];

/// Header row plus untyped cells, as read from any supported format.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean a deposit dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – workbook, one sheet (first by default)
/// * `.csv`     – header row, one record per line
/// * `.parquet` – flat columns named like the workbook headers
/// * `.json`    – `[{ "Client": ..., "Dépôts": ..., ... }, ...]`
pub fn load_file(path: &Path, sheet: Option<&str>) -> Result<DepositDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_workbook(path, sheet)?,
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    };

    log::debug!("read {} raw rows from {}", raw.rows.len(), path.display());
    Ok(clean(raw)?)
}

// ---------------------------------------------------------------------------
// Cleaning pass
// ---------------------------------------------------------------------------

/// Turn a raw table into validated records.
///
/// Rows missing any required field, with an unparseable or non-positive
/// amount, or with an out-of-range month are dropped.
pub fn clean(raw: RawTable) -> Result<DepositDataset, LoadError> {
    let position = |name: &str| raw.headers.iter().position(|h| h.trim() == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| position(**name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let idx: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|name| position(*name))
        .collect();
    let [client_i, account_i, type_i, year_i, month_i, amount_i, agency_i] = idx[..] else {
        return Err(LoadError::MissingColumns(Vec::new()));
    };

    let total_rows = raw.rows.len();
    let mut numeric_amounts = 0usize;
    let mut records = Vec::with_capacity(total_rows);

    for row in &raw.rows {
        let cell = |i: usize| row.get(i).unwrap_or(&NULL_CELL);

        let amount = cell(amount_i).as_f64();
        if amount.is_some() {
            numeric_amounts += 1;
        }

        let Some(record) = build_record(
            cell(client_i),
            cell(account_i),
            cell(type_i),
            cell(year_i),
            cell(month_i),
            amount,
            cell(agency_i),
        ) else {
            continue;
        };
        records.push(record);
    }

    if total_rows > 0 && numeric_amounts == 0 {
        return Err(LoadError::NonNumericAmounts(COL_AMOUNT));
    }

    let dropped = total_rows - records.len();
    if dropped > 0 {
        log::warn!("dropped {dropped} of {total_rows} rows during cleaning");
    }

    Ok(DepositDataset::from_records(records))
}

fn build_record(
    client: &CellValue,
    account: &CellValue,
    deposit_type: &CellValue,
    year: &CellValue,
    month: &CellValue,
    amount: Option<f64>,
    agency: &CellValue,
) -> Option<DepositRecord> {
    let amount = amount.filter(|a| a.is_finite() && *a > 0.0)?;
    let year = i32::try_from(year.as_i64()?).ok()?;
    let month = u32::try_from(month.as_i64()?)
        .ok()
        .filter(|m| (1..=12).contains(m))?;

    Some(DepositRecord {
        client: client.as_text()?,
        account: account.as_text()?,
        deposit_type: deposit_type.as_text()?,
        year,
        month,
        amount,
        agency: agency.as_text()?,
    })
}

// ---------------------------------------------------------------------------
// Workbook loader
// ---------------------------------------------------------------------------

/// First row is the header; every following row is data.
fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook: {}", path.display()))?;

    let sheet_name = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(LoadError::MissingSheet(name.to_string()).into());
            }
            name.to_string()
        }
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoadError::EmptyWorkbook)?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|r| {
            r.iter()
                .map(|c| workbook_cell(c).as_text().unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let rows = rows.map(|r| r.iter().map(workbook_cell).collect()).collect();

    Ok(RawTable { headers, rows })
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(v) => CellValue::String(v.clone()),
        Data::Float(v) => CellValue::Float(*v),
        Data::Int(v) => CellValue::Integer(*v),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::DateTime(v) => CellValue::Date(v.to_string()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => CellValue::Date(v.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Cells stay textual so identifiers keep their leading zeros; numeric
/// columns are parsed during cleaning.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.trim().is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::String(v.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: BTreeSet<String> = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        headers.extend(obj.keys().cloned());
    }
    let headers: Vec<String> = headers.into_iter().collect();

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Flat Parquet file, one column per workbook header.
///
/// Dictionary-encoded (categorical) columns are decoded, and any other
/// column type is read through its text form.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns: Vec<ArrayRef> = batch.columns().iter().map(normalize_column).collect();
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| extract_cell(col, row)).collect());
        }
    }

    Ok(RawTable { headers, rows })
}

/// Cast a column into one of the types [`extract_cell`] reads.
///
/// Dictionaries become their value type; everything else unsupported
/// becomes Utf8.  A column that cannot be cast is kept as is and reads as
/// null.
fn normalize_column(col: &ArrayRef) -> ArrayRef {
    let target = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => return Arc::clone(col),
        DataType::Dictionary(_, values) => values.as_ref().clone(),
        _ => DataType::Utf8,
    };
    match cast(col, &target) {
        Ok(converted) if converted.data_type() != col.data_type() => normalize_column(&converted),
        Ok(_) => Arc::clone(col),
        Err(e) => {
            log::warn!(
                "cannot read parquet column of type {:?}, its cells are null: {e}",
                col.data_type()
            );
            Arc::clone(col)
        }
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // Reported once per column by `normalize_column`.
        _ => CellValue::Null,
    }
}

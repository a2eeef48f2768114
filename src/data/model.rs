use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single raw cell read from a source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what spreadsheet, CSV, Parquet and JSON
/// readers hand back before the cleaning pass turns rows into records.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Spreadsheet date/time kept as text.
    Date(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Whether the cell counts as missing (null, NaN or blank text).
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            CellValue::String(s) | CellValue::Date(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Try to interpret the value as an `f64`.
    ///
    /// Text is accepted when it parses after dropping spaces (thousands
    /// separators) and reading `,` as a decimal separator.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| if c == ',' { '.' } else { c })
                    .collect();
                cleaned.parse::<f64>().ok()
            }
            _ => None,
        }
    }

    /// Interpret the value as a whole number; fractional floats are rejected.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            CellValue::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Text form used for identifier and category columns.
    pub fn as_text(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        Some(self.to_string().trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// DepositRecord – one cleaned row of the source sheet
// ---------------------------------------------------------------------------

/// A client's deposit for one account, type, branch and month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositRecord {
    pub client: String,
    /// Account identifier (`Compte`).
    pub account: String,
    /// Deposit category (`Types de Dépôts`).
    pub deposit_type: String,
    pub year: i32,
    /// 1..=12
    pub month: u32,
    /// Always strictly positive after cleaning.
    pub amount: f64,
    /// Branch name (`Agence`).
    pub agency: String,
}

// ---------------------------------------------------------------------------
// IdKey – grouping order for client and account identifiers
// ---------------------------------------------------------------------------

/// Sort key for an identifier string.
///
/// Integral identifiers (`"9"`, `"10"`) order numerically and come before
/// every other identifier; the rest order as text.  Leading zeros break
/// numeric ties, so `"007"` and `"7"` stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdKey<'a> {
    Numeric(i64, &'a str),
    Text(&'a str),
}

impl<'a> IdKey<'a> {
    pub fn new(id: &'a str) -> Self {
        match id.parse::<i64>() {
            Ok(n) => IdKey::Numeric(n, id),
            Err(_) => IdKey::Text(id),
        }
    }

    pub fn as_str(&self) -> &'a str {
        match *self {
            IdKey::Numeric(_, id) | IdKey::Text(id) => id,
        }
    }
}

// ---------------------------------------------------------------------------
// DepositDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The cleaned dataset plus the distinct values used as filter domains.
///
/// Built once at startup and shared read-only behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct DepositDataset {
    pub records: Vec<DepositRecord>,
    pub deposit_types: BTreeSet<String>,
    pub agencies: BTreeSet<String>,
    pub years: BTreeSet<i32>,
    pub months: BTreeSet<u32>,
}

impl DepositDataset {
    /// Build the filter domains from the cleaned records.
    pub fn from_records(records: Vec<DepositRecord>) -> Self {
        let mut deposit_types = BTreeSet::new();
        let mut agencies = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut months = BTreeSet::new();

        for rec in &records {
            deposit_types.insert(rec.deposit_type.clone());
            agencies.insert(rec.agency.clone());
            years.insert(rec.year);
            months.insert(rec.month);
        }

        DepositDataset {
            records,
            deposit_types,
            agencies,
            years,
            months,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn record(
    client: &str,
    agency: &str,
    deposit_type: &str,
    year: i32,
    month: u32,
    amount: f64,
) -> DepositRecord {
    DepositRecord {
        client: client.to_string(),
        account: format!("{client}-01"),
        deposit_type: deposit_type.to_string(),
        year,
        month,
        amount,
        agency: agency.to_string(),
    }
}

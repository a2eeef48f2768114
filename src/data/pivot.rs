use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::model::{DepositDataset, IdKey};
use super::month::{MonthLabeler, PivotWindow, YearMonth};
use super::ranking::rank_descending_first;

// ---------------------------------------------------------------------------
// RankedPivot – one row per client, a (rank, amount) pair per month
// ---------------------------------------------------------------------------

/// Rank and summed amount of a client within one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PivotCell {
    pub rank: usize,
    pub amount: f64,
}

/// A month that has at least one matching record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotMonth {
    pub period: YearMonth,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub client: String,
    /// Parallel to [`RankedPivot::months`]; `None` where the client has no
    /// deposit that month.
    pub cells: Vec<Option<PivotCell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPivot {
    pub agency: String,
    pub deposit_type: String,
    /// Months present in the data, oldest first.
    pub months: Vec<PivotMonth>,
    pub rows: Vec<PivotRow>,
    /// Whether rows are ordered by the latest window month's rank (as
    /// opposed to client order only).
    pub sorted_by_latest: bool,
}

impl RankedPivot {
    /// Flattened header: `Client`, then `<label> - Rank`, `<label> - Amount`
    /// for each month.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(1 + 2 * self.months.len());
        names.push("Client".to_string());
        for m in &self.months {
            names.push(format!("{} - Rank", m.label));
            names.push(format!("{} - Amount", m.label));
        }
        names
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the cross-month ranking for one agency and deposit type.
///
/// Only months inside `window` contribute; months without any matching
/// record produce no columns.  Returns `None` when nothing survives the
/// filters.
pub fn build_ranked_pivot(
    dataset: &DepositDataset,
    agency: &str,
    deposit_type: &str,
    window: &PivotWindow,
    labeler: &MonthLabeler,
) -> Option<RankedPivot> {
    let mut by_month: BTreeMap<YearMonth, BTreeMap<IdKey, f64>> = BTreeMap::new();
    for rec in &dataset.records {
        if rec.agency != agency || rec.deposit_type != deposit_type {
            continue;
        }
        if rec.year < window.start.year {
            continue;
        }
        let period = YearMonth::new(rec.year, rec.month);
        if period > window.end {
            continue;
        }
        *by_month
            .entry(period)
            .or_default()
            .entry(IdKey::new(&rec.client))
            .or_default() += rec.amount;
    }

    // Per-month slices: client -> (rank, amount).
    let mut months = Vec::new();
    let mut slices: Vec<BTreeMap<IdKey, PivotCell>> = Vec::new();
    for period in window.months() {
        let Some(sums) = by_month.get(&period) else {
            continue;
        };
        let amounts: Vec<f64> = sums.values().copied().collect();
        let ranks = rank_descending_first(&amounts);
        let slice = sums
            .iter()
            .zip(ranks)
            .map(|((&client, &amount), rank)| (client, PivotCell { rank, amount }))
            .collect();

        months.push(PivotMonth {
            period,
            label: labeler.label(period),
        });
        slices.push(slice);
    }

    if months.is_empty() {
        return None;
    }

    // Outer join on client, in client order.
    let clients: BTreeSet<IdKey> = slices.iter().flat_map(|s| s.keys().copied()).collect();
    let mut rows: Vec<PivotRow> = clients
        .into_iter()
        .map(|client| PivotRow {
            client: client.as_str().to_string(),
            cells: slices.iter().map(|s| s.get(&client).copied()).collect(),
        })
        .collect();

    let latest = months.iter().position(|m| m.period == window.latest());
    if let Some(col) = latest {
        // Stable: clients absent from the latest month keep client order, last.
        rows.sort_by_key(|row| match row.cells[col] {
            Some(cell) => (false, cell.rank),
            None => (true, 0),
        });
    }

    Some(RankedPivot {
        agency: agency.to_string(),
        deposit_type: deposit_type.to_string(),
        months,
        rows,
        sorted_by_latest: latest.is_some(),
    })
}

use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::{filtered_records, FilterSelection};
use super::model::{DepositDataset, IdKey};

pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 100;
pub const TOP_N_DEFAULT: usize = 25;

/// Percentile used for the exposure split.
pub const EXPOSURE_PERCENTILE: f64 = 0.80;

// ---------------------------------------------------------------------------
// Ranked rows
// ---------------------------------------------------------------------------

/// One (client, account) group for the selected period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedClient {
    pub client: String,
    pub account: String,
    pub amount: f64,
    /// 1-based, descending by amount; ties keep group order.
    pub rank: usize,
}

/// Top-N ranking for one (type, agency, year, month) selection.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub selection: FilterSelection,
    /// Sorted by rank, at most `top_n` rows, never empty.
    pub rows: Vec<RankedClient>,
    pub stats: ExposureStats,
}

impl Ranking {
    /// Chart title, e.g. `Savings - Atar (4/2025)`.
    pub fn title(&self) -> String {
        let s = &self.selection;
        format!("{} - {} ({}/{})", s.deposit_type, s.agency, s.month, s.year)
    }
}

/// Clamp a requested row count into the supported range.
pub fn clamp_top_n(top_n: usize) -> usize {
    top_n.clamp(TOP_N_MIN, TOP_N_MAX)
}

/// Filter, group by (client, account), rank and keep the top `top_n`.
///
/// Returns `None` when no record matches the selection.
pub fn rank_clients(
    dataset: &DepositDataset,
    selection: &FilterSelection,
    top_n: usize,
) -> Option<Ranking> {
    let matching = filtered_records(dataset, selection);
    if matching.is_empty() {
        return None;
    }

    let mut grouped: BTreeMap<(IdKey, IdKey), f64> = BTreeMap::new();
    for rec in matching {
        *grouped
            .entry((IdKey::new(&rec.client), IdKey::new(&rec.account)))
            .or_default() += rec.amount;
    }

    let sums: Vec<f64> = grouped.values().copied().collect();
    let ranks = rank_descending_first(&sums);

    let mut rows: Vec<RankedClient> = grouped
        .into_iter()
        .zip(ranks)
        .map(|(((client, account), amount), rank)| RankedClient {
            client: client.as_str().to_string(),
            account: account.as_str().to_string(),
            amount,
            rank,
        })
        .collect();
    rows.sort_by_key(|r| r.rank);
    rows.truncate(clamp_top_n(top_n));

    let amounts: Vec<f64> = rows.iter().map(|r| r.amount).collect();
    let stats = ExposureStats::compute(&amounts);

    Some(Ranking {
        selection: selection.clone(),
        rows,
        stats,
    })
}

/// Ordinal ranks (1-based) of `values` sorted descending.  Equal values are
/// ranked in the order they appear.
pub fn rank_descending_first(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // `sort_by` is stable, so ties keep their original position.
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut ranks = vec![0; values.len()];
    for (pos, idx) in order.into_iter().enumerate() {
        ranks[idx] = pos + 1;
    }
    ranks
}

// ---------------------------------------------------------------------------
// Exposure statistics
// ---------------------------------------------------------------------------

/// Linear-interpolated percentile (`p` in [0, 1]) of an unsorted sample.
///
/// Position is `p * (n - 1)`; the two bracketing sorted values are blended
/// by the fractional part.  Returns `None` for an empty sample.
pub fn percentile_linear(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Concentration of the ranked amounts above the 80th percentile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureStats {
    pub threshold: f64,
    pub total_clients: usize,
    pub total_amount: f64,
    pub above_count: usize,
    pub above_amount: f64,
    pub below_count: usize,
    pub below_amount: f64,
    /// Share of `total_amount` at or above the threshold, in percent.
    pub exposure_pct: f64,
}

impl ExposureStats {
    pub fn compute(amounts: &[f64]) -> Self {
        let threshold = percentile_linear(amounts, EXPOSURE_PERCENTILE).unwrap_or(0.0);

        let (above, below): (Vec<f64>, Vec<f64>) =
            amounts.iter().partition(|&&a| a >= threshold);
        let total_amount: f64 = amounts.iter().sum();
        let above_amount: f64 = above.iter().sum();
        let below_amount: f64 = below.iter().sum();

        let exposure_pct = if total_amount > 0.0 {
            (above_amount / total_amount * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        ExposureStats {
            threshold,
            total_clients: amounts.len(),
            total_amount,
            above_count: above.len(),
            above_amount,
            below_count: below.len(),
            below_amount,
            exposure_pct,
        }
    }

    /// The fixed indicator/value rows shown under the chart.
    pub fn indicator_rows(&self) -> [(&'static str, String); 7] {
        [
            ("Total clients", self.total_clients.to_string()),
            ("Total amount", format_amount(self.total_amount)),
            ("Clients ≥ 80th percentile", self.above_count.to_string()),
            ("Amount ≥ 80th percentile", format_amount(self.above_amount)),
            ("Clients < 80th percentile", self.below_count.to_string()),
            ("Amount < 80th percentile", format_amount(self.below_amount)),
            ("Exposure (≥ 80th percentile)", format!("{:.2}%", self.exposure_pct)),
        ]
    }
}

/// Whole units with a space as thousands separator: `1234567.8` → `1 234 568`.
pub fn format_amount(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    format!("{sign}{out}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{record, DepositRecord};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn selection() -> FilterSelection {
        FilterSelection {
            deposit_type: "Savings".into(),
            agency: "Atar".into(),
            year: 2024,
            month: 3,
        }
    }

    #[test]
    fn percentile_matches_linear_interpolation() {
        let p = percentile_linear(&[500.0, 100.0, 300.0, 200.0, 400.0], 0.8).unwrap();
        assert!((p - 420.0).abs() < 1e-9);
        assert_eq!(percentile_linear(&[7.0], 0.8), Some(7.0));
        assert_eq!(percentile_linear(&[], 0.8), None);
    }

    #[test]
    fn ties_are_ranked_by_position() {
        assert_eq!(rank_descending_first(&[10.0, 30.0, 10.0, 20.0]), vec![3, 1, 4, 2]);
    }

    #[test]
    fn groups_by_client_and_account() {
        let mut second_account = record("A", "Atar", "Savings", 2024, 3, 50.0);
        second_account.account = "A-02".into();
        let ds = DepositDataset::from_records(vec![
            record("A", "Atar", "Savings", 2024, 3, 100.0),
            record("A", "Atar", "Savings", 2024, 3, 25.0),
            second_account,
            record("B", "Atar", "Savings", 2024, 3, 110.0),
            record("C", "Atar", "Savings", 2024, 4, 999.0),
        ]);

        let ranking = rank_clients(&ds, &selection(), 25).expect("data");
        let rows: Vec<(&str, &str, f64, usize)> = ranking
            .rows
            .iter()
            .map(|r| (r.client.as_str(), r.account.as_str(), r.amount, r.rank))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("A", "A-01", 125.0, 1),
                ("B", "B-01", 110.0, 2),
                ("A", "A-02", 50.0, 3),
            ]
        );
        assert_eq!(ranking.title(), "Savings - Atar (3/2024)");
    }

    #[test]
    fn numeric_client_ids_break_ties_by_value() {
        let ds = DepositDataset::from_records(vec![
            record("10", "Atar", "Savings", 2024, 3, 100.0),
            record("9", "Atar", "Savings", 2024, 3, 100.0),
            record("100", "Atar", "Savings", 2024, 3, 100.0),
        ]);
        let ranking = rank_clients(&ds, &selection(), 25).expect("data");
        let ranked: Vec<(&str, usize)> = ranking
            .rows
            .iter()
            .map(|r| (r.client.as_str(), r.rank))
            .collect();
        assert_eq!(ranked, vec![("9", 1), ("10", 2), ("100", 3)]);
    }

    #[test]
    fn no_matching_rows_means_no_data() {
        let ds = DepositDataset::from_records(vec![record("A", "Kiffa", "Savings", 2024, 3, 1.0)]);
        assert!(rank_clients(&ds, &selection(), 25).is_none());
    }

    #[test]
    fn truncates_to_clamped_top_n() {
        let records: Vec<DepositRecord> = (0..12)
            .map(|i| record(&format!("C{i:02}"), "Atar", "Savings", 2024, 3, 100.0 + i as f64))
            .collect();
        let ds = DepositDataset::from_records(records);

        let ranking = rank_clients(&ds, &selection(), 1).expect("data");
        assert_eq!(ranking.rows.len(), TOP_N_MIN);
        assert_eq!(ranking.rows[0].client, "C11");
        assert_eq!(ranking.stats.total_clients, TOP_N_MIN);
    }

    #[test]
    fn exposure_splits_at_threshold() {
        let stats = ExposureStats::compute(&[100.0, 200.0, 300.0, 400.0, 500.0]);
        assert!((stats.threshold - 420.0).abs() < 1e-9);
        assert_eq!(stats.above_count, 1);
        assert_eq!(stats.below_count, 4);
        assert_eq!(stats.above_amount, 500.0);
        assert_eq!(stats.below_amount, 1000.0);
        assert!((stats.exposure_pct - 100.0 / 3.0).abs() < 1e-9);

        let rows = stats.indicator_rows();
        assert_eq!(rows[1].1, "1 500");
        assert_eq!(rows[6].1, "33.33%");
    }

    #[test]
    fn exposure_is_zero_without_amounts() {
        let stats = ExposureStats::compute(&[]);
        assert_eq!(stats.exposure_pct, 0.0);
        assert_eq!(stats.total_clients, 0);
    }

    #[test]
    fn amounts_use_space_separators() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(999.4), "999");
        assert_eq!(format_amount(1000.0), "1 000");
        assert_eq!(format_amount(1234567.8), "1 234 568");
        assert_eq!(format_amount(-45210.0), "-45 210");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn ranks_form_gapless_permutation(amounts in proptest::collection::vec(1u32..500, 1..60), top_n in 0usize..150) {
            let records: Vec<DepositRecord> = amounts
                .iter()
                .enumerate()
                .map(|(i, a)| record(&format!("C{i:03}"), "Atar", "Savings", 2024, 3, *a as f64))
                .collect();
            let ds = DepositDataset::from_records(records);
            let ranking = rank_clients(&ds, &selection(), top_n).expect("data");

            let expected_len = amounts.len().min(clamp_top_n(top_n));
            prop_assert_eq!(ranking.rows.len(), expected_len);
            for (i, row) in ranking.rows.iter().enumerate() {
                prop_assert_eq!(row.rank, i + 1);
            }
            for pair in ranking.rows.windows(2) {
                prop_assert!(pair[0].amount >= pair[1].amount);
                if pair[0].amount == pair[1].amount {
                    prop_assert!(pair[0].client < pair[1].client);
                }
            }
        }

        #[test]
        fn exposure_stays_in_percent_range(amounts in proptest::collection::vec(0.0f64..1e9, 0..80)) {
            let stats = ExposureStats::compute(&amounts);
            prop_assert!((0.0..=100.0).contains(&stats.exposure_pct));
            prop_assert_eq!(stats.above_count + stats.below_count, amounts.len());
        }
    }
}

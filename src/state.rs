use std::sync::Arc;

use deposit_ranker::data::filter::FilterSelection;
use deposit_ranker::data::model::DepositDataset;
use deposit_ranker::data::month::{MonthLabeler, PivotWindow};
use deposit_ranker::data::pivot::{build_ranked_pivot, RankedPivot};
use deposit_ranker::data::ranking::{clamp_top_n, rank_clients, Ranking};
use deposit_ranker::export;

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Message shown in the top bar after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    /// Outcome worth mentioning that is not a failure, e.g. an empty export.
    Info(String),
    Error(String),
}

impl StatusMessage {
    pub fn text(&self) -> &str {
        match self {
            StatusMessage::Info(msg) | StatusMessage::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StatusMessage::Error(_))
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Dataset loaded at startup; shared, never mutated.
    pub dataset: Arc<DepositDataset>,

    pub window: PivotWindow,
    pub labeler: MonthLabeler,

    /// Dropdown selection (None only when the dataset is empty).
    pub selection: Option<FilterSelection>,

    /// Slider value, always within [5, 100].
    pub top_n: usize,

    /// Ranking for the current selection; None renders the "no data" state.
    pub ranking: Option<Ranking>,

    /// Pivot for the current agency and type; None renders "nothing to display".
    pub pivot: Option<RankedPivot>,

    /// Status / error message shown in the UI.
    pub status_message: Option<StatusMessage>,
}

impl AppState {
    pub fn new(
        dataset: Arc<DepositDataset>,
        window: PivotWindow,
        labeler: MonthLabeler,
        top_n: usize,
    ) -> Self {
        let selection = FilterSelection::initial(&dataset);
        let mut state = Self {
            dataset,
            window,
            labeler,
            selection,
            top_n: clamp_top_n(top_n),
            ranking: None,
            pivot: None,
            status_message: None,
        };
        state.recompute();
        state
    }

    /// Rebuild the ranking and the pivot from scratch.
    pub fn recompute(&mut self) {
        let Some(sel) = &self.selection else {
            self.ranking = None;
            self.pivot = None;
            return;
        };
        log::debug!("recomputing for {sel:?}, top {}", self.top_n);

        self.ranking = rank_clients(&self.dataset, sel, self.top_n);
        self.pivot = build_ranked_pivot(
            &self.dataset,
            &sel.agency,
            &sel.deposit_type,
            &self.window,
            &self.labeler,
        );
    }

    /// Apply an edited selection; recompute only if something changed.
    pub fn set_selection(&mut self, selection: FilterSelection) {
        if self.selection.as_ref() != Some(&selection) {
            self.selection = Some(selection);
            self.recompute();
        }
    }

    pub fn set_top_n(&mut self, top_n: usize) {
        let top_n = clamp_top_n(top_n);
        if top_n != self.top_n {
            self.top_n = top_n;
            self.recompute();
        }
    }

    /// Serialize the pivot for the current agency and type.
    ///
    /// `None` when there is nothing to export or serialization failed; the
    /// status message says which.
    pub fn export_bytes(&mut self) -> Option<Vec<u8>> {
        let sel = self.selection.as_ref()?;
        match export::export_pivot(
            &self.dataset,
            &sel.agency,
            &sel.deposit_type,
            &self.window,
            &self.labeler,
        ) {
            Ok(Some(bytes)) => Some(bytes),
            Ok(None) => {
                self.status_message = Some(StatusMessage::Info(
                    "Nothing to export for this selection".to_string(),
                ));
                None
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(StatusMessage::Error(format!("Error: {e:#}")));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deposit_ranker::data::model::DepositRecord;

    fn rec(client: &str, year: i32, month: u32, amount: f64) -> DepositRecord {
        DepositRecord {
            client: client.into(),
            account: format!("{client}-01"),
            deposit_type: "Savings".into(),
            year,
            month,
            amount,
            agency: "X".into(),
        }
    }

    fn state() -> AppState {
        let ds = DepositDataset::from_records(vec![
            rec("A", 2025, 4, 500.0),
            rec("B", 2025, 4, 1500.0),
            rec("A", 2024, 1, 1000.0),
        ]);
        AppState::new(Arc::new(ds), PivotWindow::default(), MonthLabeler::default(), 3)
    }

    #[test]
    fn starts_on_first_record_and_clamps_top_n() {
        let st = state();
        assert_eq!(st.top_n, 5);
        let sel = st.selection.as_ref().unwrap();
        assert_eq!((sel.year, sel.month), (2025, 4));
        assert_eq!(st.ranking.as_ref().unwrap().rows[0].client, "B");
        assert_eq!(st.pivot.as_ref().unwrap().rows[0].client, "B");
    }

    #[test]
    fn empty_selection_clears_ranking_but_keeps_pivot() {
        let mut st = state();
        let mut sel = st.selection.clone().unwrap();
        sel.month = 7;
        st.set_selection(sel);
        assert!(st.ranking.is_none());
        assert!(st.pivot.is_some());
    }

    #[test]
    fn export_of_unknown_agency_is_a_noop() {
        let mut st = state();
        let mut sel = st.selection.clone().unwrap();
        sel.agency = "Nowhere".into();
        st.set_selection(sel);
        assert!(st.export_bytes().is_none());
        let status = st.status_message.as_ref().expect("status");
        assert!(matches!(status, StatusMessage::Info(_)));
        assert!(!status.is_error());
        assert!(status.text().contains("Nothing to export"));
    }

    #[test]
    fn empty_dataset_has_no_views() {
        let st = AppState::new(
            Arc::new(DepositDataset::default()),
            PivotWindow::default(),
            MonthLabeler::default(),
            25,
        );
        assert!(st.selection.is_none());
        assert!(st.ranking.is_none() && st.pivot.is_none());
    }
}

use serde::Serialize;

use crate::data::filter::FilterSelection;
use crate::data::model::DepositDataset;
use crate::data::month::{MonthLabeler, PivotWindow};
use crate::data::pivot::{build_ranked_pivot, RankedPivot};
use crate::data::ranking::{rank_clients, Ranking};

/// Everything the dashboard shows for one selection, in serializable form.
/// `null` members mean "no data" for that view.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub selection: FilterSelection,
    pub top_n: usize,
    pub ranking: Option<Ranking>,
    pub pivot: Option<RankedPivot>,
}

impl Report {
    pub fn build(
        dataset: &DepositDataset,
        selection: FilterSelection,
        top_n: usize,
        window: &PivotWindow,
        labeler: &MonthLabeler,
    ) -> Self {
        let ranking = rank_clients(dataset, &selection, top_n);
        let pivot = build_ranked_pivot(
            dataset,
            &selection.agency,
            &selection.deposit_type,
            window,
            labeler,
        );
        Report {
            selection,
            top_n,
            ranking,
            pivot,
        }
    }
}

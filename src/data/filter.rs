use serde::{Deserialize, Serialize};

use super::model::{DepositDataset, DepositRecord};

// ---------------------------------------------------------------------------
// Filter predicate: one selected value per dimension
// ---------------------------------------------------------------------------

/// Current dropdown selection.  Every field must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub deposit_type: String,
    pub agency: String,
    pub year: i32,
    pub month: u32,
}

impl FilterSelection {
    /// Initial selection: the values of the first record in the dataset.
    pub fn initial(dataset: &DepositDataset) -> Option<Self> {
        dataset.records.first().map(|rec| FilterSelection {
            deposit_type: rec.deposit_type.clone(),
            agency: rec.agency.clone(),
            year: rec.year,
            month: rec.month,
        })
    }

    /// Whether a record passes all four filters.
    pub fn matches(&self, rec: &DepositRecord) -> bool {
        rec.deposit_type == self.deposit_type
            && rec.agency == self.agency
            && rec.year == self.year
            && rec.month == self.month
    }
}

/// Return the records that pass the selection, in dataset order.
pub fn filtered_records<'a>(
    dataset: &'a DepositDataset,
    selection: &FilterSelection,
) -> Vec<&'a DepositRecord> {
    dataset
        .records
        .iter()
        .filter(|rec| selection.matches(rec))
        .collect()
}

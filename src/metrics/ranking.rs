use serde::Serialize;

use super::asymmetry::{subject_asymmetry, Rounding};
use super::round4;
use crate::data::model::Dataset;

/// How many subjects the pipeline reports by default.
pub const DEFAULT_TOP_K: usize = 5;

/// One subject and its summed asymmetry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub subject: String,
    pub total: f64,
}

/// The `k` subjects with the lowest total asymmetry, ascending.
///
/// Every subject in the dataset is scored from unrounded offsets; the sum is
/// rounded once. Subjects without a profile are left out entirely. Ties keep
/// dataset order.
pub fn lowest_asymmetries(dataset: &Dataset, k: usize) -> Vec<RankingEntry> {
    let mut totals: Vec<RankingEntry> = dataset
        .iter()
        .filter_map(|(id, record)| {
            subject_asymmetry(record, Rounding::Full).map(|profile| RankingEntry {
                subject: id.to_string(),
                total: round4(profile.total()),
            })
        })
        .collect();

    totals.sort_by(|a, b| a.total.total_cmp(&b.total));
    totals.truncate(k);
    totals
}

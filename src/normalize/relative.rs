//! Relative frequency normalization for cell-count tables.
//!
//! Converts per-sample population counts into percentages of each sample's
//! total count, reshaping the wide input into one row per (sample,
//! population) pair.

use crate::config::PopulationSet;
use crate::data::{FrequencyRecord, FrequencyTable, SampleTable};
use rayon::prelude::*;

/// Convert a wide-format sample table into a long-format frequency table.
///
/// Each input row yields one output row per configured population, carrying
/// all sample metadata unchanged plus `count`, `total_count`, and
/// `percentage` (`100 * count / total_count`). Populations absent from a
/// sample's count map contribute zero to the total and appear with a zero
/// count.
///
/// Zero-total policy: a sample whose populations sum to zero keeps its rows,
/// with `percentage` set to NaN. Downstream consumers drop NaN values before
/// statistics, so such samples are visible in the long table but never reach
/// a test. An empty input table yields an empty output table.
///
/// Output order is deterministic: input sample order, then population-set
/// order within each sample.
pub fn normalize(table: &SampleTable, populations: &PopulationSet) -> FrequencyTable {
    let records: Vec<FrequencyRecord> = table
        .records()
        .par_iter()
        .flat_map_iter(|sample| {
            let total_count = sample.total_count(populations);
            populations
                .iter()
                .map(move |population| FrequencyRecord::from_sample(sample, population, total_count))
        })
        .collect();

    FrequencyTable::new(records)
}

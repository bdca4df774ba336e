//! Cohort selection, responder comparison, and baseline breakdowns.

mod baseline;
mod compare;
mod filter;

pub use baseline::aggregate_baseline;
pub use compare::{compare_cohort, MIN_GROUP_SIZE, SIGNIFICANCE_ALPHA};
pub use filter::CohortFilter;

use crate::config::PopulationSet;
use crate::data::{CohortComparison, FrequencyTable, SampleTable};
use crate::error::Result;
use crate::normalize::normalize;

/// Normalize a wide table and compare the cohort's response groups in one step.
///
/// Returns the full long table alongside the comparison so callers can reuse
/// the normalized data for other cohorts without recomputing it.
pub fn run_response_analysis(
    table: &SampleTable,
    filter: &CohortFilter,
    populations: &PopulationSet,
) -> Result<(FrequencyTable, CohortComparison)> {
    let frequencies = normalize(table, populations);
    let comparison = compare_cohort(&frequencies, filter, populations)?;
    Ok((frequencies, comparison))
}

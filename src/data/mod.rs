//! Data structures for cell-population frequency analysis.

mod frequency;
mod result;
mod sample;

pub use frequency::{FrequencyRecord, FrequencyTable};
pub use result::{
    BaselineBreakdown, CohortComparison, GroupCount, PopulationResult, PopulationTest,
};
pub use sample::{Response, SampleRecord, SampleTable, REQUIRED_COLUMNS};

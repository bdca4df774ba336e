//! Cell-Population Frequency Analysis Library
//!
//! This library provides pure, composable primitives for analyzing
//! flow-cytometry cell-count tables: relative frequency normalization,
//! responder vs. non-responder cohort comparison, and baseline cohort
//! breakdowns.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (SampleTable, FrequencyTable, results)
//! - **config**: Population sets and analysis configuration
//! - **normalize**: Relative frequency normalization (wide to long format)
//! - **stats**: Hypothesis testing (Mann-Whitney U)
//! - **cohort**: Cohort filtering, response comparison, baseline breakdowns
//! - **plot**: Boxplot rendering for response comparisons
//!
//! Every analysis entry point is a pure function over an already-materialized
//! table snapshot; nothing is cached between invocations and fixed inputs
//! give exactly reproducible outputs.
//!
//! # Example
//!
//! ```no_run
//! use cytofreq::prelude::*;
//!
//! // Load the wide-format cell-count table
//! let populations = PopulationSet::default();
//! let samples = SampleTable::from_csv("cell-count.csv", &populations).unwrap();
//!
//! // Normalize counts into relative frequencies
//! let frequencies = normalize(&samples, &populations);
//!
//! // Compare responders vs. non-responders within a cohort
//! let cohort = CohortFilter::new("melanoma", "tr1", "PBMC");
//! let comparison = compare_cohort(&frequencies, &cohort, &populations).unwrap();
//! for name in comparison.significant_populations() {
//!     println!("{} differs between response groups", name);
//! }
//!
//! // Tally the baseline subset
//! let breakdown = aggregate_baseline(&samples, &cohort);
//! ```

pub mod cohort;
pub mod config;
pub mod data;
pub mod error;
pub mod normalize;
pub mod plot;
pub mod stats;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::cohort::{
        aggregate_baseline, compare_cohort, run_response_analysis, CohortFilter, MIN_GROUP_SIZE,
        SIGNIFICANCE_ALPHA,
    };
    pub use crate::config::{AnalysisConfig, PopulationSet, DEFAULT_POPULATIONS};
    pub use crate::data::{
        BaselineBreakdown, CohortComparison, FrequencyRecord, FrequencyTable, GroupCount,
        PopulationResult, PopulationTest, Response, SampleRecord, SampleTable,
    };
    pub use crate::error::{CytoError, Result};
    pub use crate::normalize::normalize;
    pub use crate::plot::render_response_boxplots;
    pub use crate::stats::{mann_whitney_u, MannWhitneyTest};
}

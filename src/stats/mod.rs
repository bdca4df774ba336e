//! Statistical tests for cohort comparison.

pub mod mann_whitney;

pub use mann_whitney::{mann_whitney_u, MannWhitneyTest};

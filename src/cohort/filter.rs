//! Cohort definition as a conjunction of exact-match predicates.

use crate::data::{FrequencyRecord, SampleRecord};
use serde::{Deserialize, Serialize};

/// Selects samples by condition, treatment, and sample type.
///
/// The baseline restriction (`time_from_treatment_start == 0`) and the
/// defined-response restriction (`response` in {y, n}) are conjoined by the
/// operations that need them, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortFilter {
    /// Disease condition to match (e.g. melanoma).
    pub condition: String,
    /// Treatment to match (e.g. tr1).
    pub treatment: String,
    /// Sample material to match (e.g. PBMC).
    pub sample_type: String,
}

impl CohortFilter {
    /// Create a filter from its three predicates.
    pub fn new<S: Into<String>>(condition: S, treatment: S, sample_type: S) -> Self {
        Self {
            condition: condition.into(),
            treatment: treatment.into(),
            sample_type: sample_type.into(),
        }
    }

    /// Check a wide-table record against the filter.
    pub fn matches_sample(&self, record: &SampleRecord) -> bool {
        record.condition == self.condition
            && record.treatment == self.treatment
            && record.sample_type == self.sample_type
    }

    /// Check a long-table record against the filter.
    pub fn matches_frequency(&self, record: &FrequencyRecord) -> bool {
        record.condition == self.condition
            && record.treatment == self.treatment
            && record.sample_type == self.sample_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Response;
    use std::collections::HashMap;

    fn record(condition: &str, treatment: &str, sample_type: &str) -> SampleRecord {
        SampleRecord {
            sample_id: "s1".to_string(),
            subject_id: "sbj1".to_string(),
            project_id: "prj1".to_string(),
            condition: condition.to_string(),
            treatment: treatment.to_string(),
            response: Response::Responder,
            sample_type: sample_type.to_string(),
            time_from_treatment_start: 0,
            age: None,
            sex: "F".to_string(),
            counts: HashMap::new(),
        }
    }

    #[test]
    fn test_matches_all_predicates() {
        let filter = CohortFilter::new("melanoma", "tr1", "PBMC");
        assert!(filter.matches_sample(&record("melanoma", "tr1", "PBMC")));
        assert!(!filter.matches_sample(&record("lung", "tr1", "PBMC")));
        assert!(!filter.matches_sample(&record("melanoma", "tr2", "PBMC")));
        assert!(!filter.matches_sample(&record("melanoma", "tr1", "tumor")));
    }
}

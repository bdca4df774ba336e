//! Analysis configuration: the population list and cohort definition.
//!
//! The set of population columns is a closed list known in advance, but it is
//! supplied by the caller rather than hard-coded inside the normalizer and
//! comparator, so analyses can run against synthetic population sets.

use crate::cohort::CohortFilter;
use crate::error::{CytoError, Result};
use serde::{Deserialize, Serialize};

/// The default population columns of a cell-count table.
pub const DEFAULT_POPULATIONS: [&str; 5] =
    ["b_cell", "cd8_t_cell", "cd4_t_cell", "nk_cell", "monocyte"];

/// An ordered, closed set of population column names.
///
/// Order is preserved: normalized output and test results follow the order
/// populations were declared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopulationSet {
    names: Vec<String>,
}

impl PopulationSet {
    /// Create a population set from a list of column names.
    ///
    /// Rejects empty lists and duplicate names.
    pub fn new<S: Into<String>>(names: Vec<S>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(CytoError::InvalidParameter(
                "Population set must name at least one population".to_string(),
            ));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(CytoError::InvalidParameter(format!(
                    "Duplicate population '{}' in population set",
                    name
                )));
            }
        }
        Ok(Self { names })
    }

    /// Population names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of populations.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the set is empty (never true for a constructed set).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check membership.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Iterate over population names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for PopulationSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_POPULATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A complete analysis configuration, loadable from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Population columns to analyze.
    #[serde(default)]
    pub populations: PopulationSet,
    /// Cohort definition for comparison and baseline breakdowns.
    pub cohort: CohortFilter,
}

impl AnalysisConfig {
    /// Load from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(CytoError::from)
    }

    /// Save to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(CytoError::from)
    }

    /// An example configuration matching the shipped demo dataset.
    pub fn example() -> Self {
        Self {
            name: "melanoma-tr1-pbmc".to_string(),
            description: Some(
                "Responder vs non-responder comparison for melanoma PBMC samples under tr1"
                    .to_string(),
            ),
            populations: PopulationSet::default(),
            cohort: CohortFilter::new("melanoma", "tr1", "PBMC"),
        }
    }
}

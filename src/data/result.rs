//! Result types for cohort comparison and baseline breakdowns.

use crate::data::frequency::FrequencyTable;
use crate::data::sample::SampleTable;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Outcome of the two-group test for a single population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PopulationTest {
    /// The test ran; `significant` is `p_value < SIGNIFICANCE_ALPHA`.
    Tested {
        /// Mann-Whitney U statistic of the responder group.
        statistic: f64,
        /// Two-sided p-value.
        p_value: f64,
        /// Whether the p-value clears the significance threshold.
        significant: bool,
    },
    /// Either group had fewer observations than the test requires.
    InsufficientData {
        n_responders: usize,
        n_non_responders: usize,
    },
}

impl PopulationTest {
    /// Whether this population showed a significant difference.
    ///
    /// Insufficient-data populations are never significant.
    pub fn is_significant(&self) -> bool {
        matches!(
            self,
            PopulationTest::Tested {
                significant: true,
                ..
            }
        )
    }

    /// The p-value, when the test ran.
    pub fn p_value(&self) -> Option<f64> {
        match self {
            PopulationTest::Tested { p_value, .. } => Some(*p_value),
            PopulationTest::InsufficientData { .. } => None,
        }
    }

    /// The U statistic, when the test ran.
    pub fn statistic(&self) -> Option<f64> {
        match self {
            PopulationTest::Tested { statistic, .. } => Some(*statistic),
            PopulationTest::InsufficientData { .. } => None,
        }
    }
}

/// Test outcome for one named population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationResult {
    /// Population name.
    pub population: String,
    /// Test outcome.
    pub test: PopulationTest,
}

/// Result of a responder vs. non-responder cohort comparison.
///
/// Holds the filtered long table (for downstream plotting) and one test
/// outcome per configured population, in population-set order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortComparison {
    /// Rows matching the cohort filter with a defined response.
    #[serde(skip)]
    pub filtered: FrequencyTable,
    /// Per-population test outcomes.
    pub results: Vec<PopulationResult>,
}

impl CohortComparison {
    /// Look up the outcome for a population.
    pub fn get(&self, population: &str) -> Option<&PopulationTest> {
        self.results
            .iter()
            .find(|r| r.population == population)
            .map(|r| &r.test)
    }

    /// Names of populations with a significant difference.
    ///
    /// Insufficient-data populations are excluded from this tally.
    pub fn significant_populations(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.test.is_significant())
            .map(|r| r.population.as_str())
            .collect()
    }

    /// Number of significant populations.
    pub fn n_significant(&self) -> usize {
        self.significant_populations().len()
    }

    /// Number of populations the test could not run for.
    pub fn n_insufficient(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.test, PopulationTest::InsufficientData { .. }))
            .count()
    }

    /// Write the per-population outcomes as TSV.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "population\tstatus\tstatistic\tp_value\tsignificant")?;
        for r in &self.results {
            match &r.test {
                PopulationTest::Tested {
                    statistic,
                    p_value,
                    significant,
                } => writeln!(
                    writer,
                    "{}\ttested\t{}\t{}\t{}",
                    r.population, statistic, p_value, significant
                )?,
                PopulationTest::InsufficientData { .. } => {
                    writeln!(writer, "{}\tinsufficient_data\t\t\tfalse", r.population)?
                }
            }
        }

        Ok(())
    }
}

/// One key of a tally table with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    /// Grouping key (project id, response code, or sex).
    pub key: String,
    /// Number of samples or subjects in the group.
    pub count: usize,
}

/// Result of the baseline aggregation: three independent tally tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineBreakdown {
    /// Baseline samples matching the cohort filter.
    #[serde(skip)]
    pub baseline: SampleTable,
    /// Distinct samples per project, over the full baseline set.
    pub samples_per_project: Vec<GroupCount>,
    /// Distinct subjects per response code, responders and non-responders only.
    pub subjects_by_response: Vec<GroupCount>,
    /// Distinct subjects per sex, no response restriction.
    pub subjects_by_sex: Vec<GroupCount>,
}

impl BaselineBreakdown {
    /// Whether the baseline subset was empty.
    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }

    /// Write the three tallies as a tidy TSV (`table`, `key`, `count`).
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "table\tkey\tcount")?;
        for entry in &self.samples_per_project {
            writeln!(writer, "samples_per_project\t{}\t{}", entry.key, entry.count)?;
        }
        for entry in &self.subjects_by_response {
            writeln!(writer, "subjects_by_response\t{}\t{}", entry.key, entry.count)?;
        }
        for entry in &self.subjects_by_sex {
            writeln!(writer, "subjects_by_sex\t{}\t{}", entry.key, entry.count)?;
        }

        Ok(())
    }
}

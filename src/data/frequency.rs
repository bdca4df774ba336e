//! Long-format frequency table: one row per (sample, population) pair.

use crate::data::sample::{Response, SampleRecord};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One row of the long-format table produced by normalization.
///
/// Carries every metadata field of the source sample alongside the derived
/// `count`, `total_count`, and `percentage` columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyRecord {
    pub sample_id: String,
    pub subject_id: String,
    pub project_id: String,
    pub condition: String,
    pub treatment: String,
    pub response: Response,
    pub sample_type: String,
    pub time_from_treatment_start: i64,
    pub age: Option<u32>,
    pub sex: String,
    /// Population this row describes.
    pub population: String,
    /// Raw count for the population.
    pub count: u64,
    /// Sum of all population counts for the sample.
    pub total_count: u64,
    /// `100 * count / total_count`; NaN when the sample total is zero.
    pub percentage: f64,
}

impl FrequencyRecord {
    /// Build a row from a sample record and one of its populations.
    pub fn from_sample(sample: &SampleRecord, population: &str, total_count: u64) -> Self {
        let count = sample.count(population);
        let percentage = if total_count > 0 {
            100.0 * count as f64 / total_count as f64
        } else {
            f64::NAN
        };
        Self {
            sample_id: sample.sample_id.clone(),
            subject_id: sample.subject_id.clone(),
            project_id: sample.project_id.clone(),
            condition: sample.condition.clone(),
            treatment: sample.treatment.clone(),
            response: sample.response,
            sample_type: sample.sample_type.clone(),
            time_from_treatment_start: sample.time_from_treatment_start,
            age: sample.age,
            sex: sample.sex.clone(),
            population: population.to_string(),
            count,
            total_count,
            percentage,
        }
    }
}

/// The long-format output of the frequency normalizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrequencyTable {
    records: Vec<FrequencyRecord>,
}

impl FrequencyTable {
    /// Create a table from rows.
    pub fn new(records: Vec<FrequencyRecord>) -> Self {
        Self { records }
    }

    /// Rows in table order.
    pub fn records(&self) -> &[FrequencyRecord] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &FrequencyRecord> {
        self.records.iter()
    }

    /// Keep the rows matching a predicate, preserving order.
    pub fn filter<F: Fn(&FrequencyRecord) -> bool>(&self, predicate: F) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    /// Percentage values for one population, restricted to one response group.
    ///
    /// NaN percentages (zero-total samples) are dropped so they never reach a
    /// statistical test.
    pub fn percentages(&self, population: &str, response: Response) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.population == population && r.response == response)
            .map(|r| r.percentage)
            .filter(|p| !p.is_nan())
            .collect()
    }

    /// Write the table as TSV.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "sample_id\ttotal_count\tpopulation\tcount\tpercentage\tsubject_id\tproject_id\t\
             condition\ttreatment\tresponse\tsample_type\ttime_from_treatment_start\tage\tsex"
        )?;
        for r in &self.records {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.sample_id,
                r.total_count,
                r.population,
                r.count,
                r.percentage,
                r.subject_id,
                r.project_id,
                r.condition,
                r.treatment,
                r.response.code(),
                r.sample_type,
                r.time_from_treatment_start,
                r.age.map(|a| a.to_string()).unwrap_or_default(),
                r.sex,
            )?;
        }

        Ok(())
    }
}

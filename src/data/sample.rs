//! Wide-format sample table: one row per sample with per-population counts.

use crate::config::PopulationSet;
use crate::error::{CytoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Metadata columns required in every wide-format CSV.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "sample",
    "subject",
    "project",
    "condition",
    "treatment",
    "response",
    "sample_type",
    "time_from_treatment_start",
    "age",
    "sex",
];

/// Treatment response of a subject's sample.
///
/// Only `y`, `n`, or an absent value are valid; anything else is rejected at
/// parse time so malformed codes can never leak into a cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Response {
    /// Responder (`y`).
    #[serde(rename = "y")]
    Responder,
    /// Non-responder (`n`).
    #[serde(rename = "n")]
    NonResponder,
    /// No response recorded.
    #[serde(rename = "missing")]
    Missing,
}

impl Response {
    /// Parse a response code. Empty and `NA` variants map to `Missing`.
    pub fn parse(raw: &str, sample_id: &str) -> Result<Self> {
        match raw.trim() {
            "y" => Ok(Response::Responder),
            "n" => Ok(Response::NonResponder),
            "" | "NA" | "na" => Ok(Response::Missing),
            other => Err(CytoError::InvalidResponse {
                value: other.to_string(),
                sample_id: sample_id.to_string(),
            }),
        }
    }

    /// Check whether a response was recorded.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Response::Missing)
    }

    /// The wire code for this response (`y`, `n`, or empty).
    pub fn code(&self) -> &'static str {
        match self {
            Response::Responder => "y",
            Response::NonResponder => "n",
            Response::Missing => "",
        }
    }
}

/// One row of the wide-format sample table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Sample identifier, unique within a table.
    pub sample_id: String,
    /// Subject the sample was drawn from.
    pub subject_id: String,
    /// Project the subject belongs to.
    pub project_id: String,
    /// Disease condition (e.g. melanoma).
    pub condition: String,
    /// Treatment administered (e.g. tr1).
    pub treatment: String,
    /// Treatment response.
    pub response: Response,
    /// Sample material (e.g. PBMC).
    pub sample_type: String,
    /// Days relative to treatment start; 0 is baseline.
    pub time_from_treatment_start: i64,
    /// Subject age in years, when recorded.
    pub age: Option<u32>,
    /// Subject sex.
    pub sex: String,
    /// Cell counts per population. Populations absent from the map count as zero.
    pub counts: HashMap<String, u64>,
}

impl SampleRecord {
    /// Count for a population, zero if absent.
    pub fn count(&self, population: &str) -> u64 {
        self.counts.get(population).copied().unwrap_or(0)
    }

    /// Sum of counts across the given populations.
    pub fn total_count(&self, populations: &PopulationSet) -> u64 {
        populations.iter().map(|p| self.count(p)).sum()
    }

    /// Whether the sample was drawn at treatment start.
    pub fn is_baseline(&self) -> bool {
        self.time_from_treatment_start == 0
    }
}

/// An ordered collection of sample records, unique by sample id.
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    records: Vec<SampleRecord>,
}

impl SampleTable {
    /// Create a table from records, rejecting duplicate sample ids.
    pub fn new(records: Vec<SampleRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.sample_id.clone()) {
                return Err(CytoError::DuplicateSample(record.sample_id.clone()));
            }
        }
        Ok(Self { records })
    }

    /// Load a wide-format cell-count CSV.
    ///
    /// Expected columns: the metadata columns in [`REQUIRED_COLUMNS`] plus one
    /// count column per configured population. A missing column fails fast;
    /// extra columns are ignored. Empty count cells read as zero.
    pub fn from_csv<P: AsRef<Path>>(path: P, populations: &PopulationSet) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut index = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.as_str()).or_insert(i);
        }
        for required in REQUIRED_COLUMNS {
            if !index.contains_key(required) {
                return Err(CytoError::MissingColumn(required.to_string()));
            }
        }
        for population in populations.iter() {
            if !index.contains_key(population) {
                return Err(CytoError::MissingColumn(population.to_string()));
            }
        }

        let field = |row: &csv::StringRecord, name: &str| -> String {
            index
                .get(name)
                .and_then(|&i| row.get(i))
                .unwrap_or("")
                .trim()
                .to_string()
        };

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let sample_id = field(&row, "sample");

            let mut counts = HashMap::with_capacity(populations.len());
            for population in populations.iter() {
                let raw = field(&row, population);
                let count = if raw.is_empty() {
                    0
                } else {
                    raw.parse::<u64>().map_err(|_| CytoError::InvalidCount {
                        value: raw.clone(),
                        population: population.to_string(),
                        sample_id: sample_id.clone(),
                    })?
                };
                counts.insert(population.to_string(), count);
            }

            let response = Response::parse(&field(&row, "response"), &sample_id)?;
            let time_raw = field(&row, "time_from_treatment_start");
            let time_from_treatment_start = time_raw.parse::<i64>().map_err(|_| {
                CytoError::InvalidParameter(format!(
                    "Invalid time_from_treatment_start '{}' in sample '{}'",
                    time_raw, sample_id
                ))
            })?;
            let age_raw = field(&row, "age");
            let age = if age_raw.is_empty() {
                None
            } else {
                Some(age_raw.parse::<u32>().map_err(|_| {
                    CytoError::InvalidParameter(format!(
                        "Invalid age '{}' in sample '{}'",
                        age_raw, sample_id
                    ))
                })?)
            };

            records.push(SampleRecord {
                sample_id,
                subject_id: field(&row, "subject"),
                project_id: field(&row, "project"),
                condition: field(&row, "condition"),
                treatment: field(&row, "treatment"),
                response,
                sample_type: field(&row, "sample_type"),
                time_from_treatment_start,
                age,
                sex: field(&row, "sex"),
                counts,
            });
        }

        Self::new(records)
    }

    /// Write the table back out as CSV with the given population columns.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P, populations: &PopulationSet) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "{}", REQUIRED_COLUMNS.join(","))?;
        for population in populations.iter() {
            write!(writer, ",{}", population)?;
        }
        writeln!(writer)?;

        for r in &self.records {
            write!(
                writer,
                "{},{},{},{},{},{},{},{},{},{}",
                r.sample_id,
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
            for population in populations.iter() {
                write!(writer, ",{}", r.count(population))?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }

    /// Records in table order.
    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.records.len()
    }

    /// Check if the table has no samples.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records.
    pub fn iter(&self) -> impl Iterator<Item = &SampleRecord> {
        self.records.iter()
    }

    /// Look up a record by sample id.
    pub fn get(&self, sample_id: &str) -> Option<&SampleRecord> {
        self.records.iter().find(|r| r.sample_id == sample_id)
    }

    /// Keep the records matching a predicate, preserving order.
    pub fn filter<F: Fn(&SampleRecord) -> bool>(&self, predicate: F) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    /// Distinct subject ids, in first-occurrence order.
    pub fn subject_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.subject_id.as_str()))
            .map(|r| r.subject_id.as_str())
            .collect()
    }

    /// One record per subject, keeping the first occurrence in table order.
    pub fn dedup_subjects(&self) -> Self {
        let mut seen = HashSet::new();
        Self {
            records: self
                .records
                .iter()
                .filter(|r| seen.insert(r.subject_id.clone()))
                .cloned()
                .collect(),
        }
    }
}

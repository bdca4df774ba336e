//! Baseline-cohort breakdowns by project, response, and sex.

use crate::cohort::filter::CohortFilter;
use crate::data::{BaselineBreakdown, GroupCount, SampleTable};
use std::collections::BTreeMap;

/// Tally the baseline subset of a sample table.
///
/// The subset is the rows matching the cohort filter drawn at
/// `time_from_treatment_start == 0`. Three independent tallies are produced:
///
/// - `samples_per_project`: distinct samples per project over the full
///   baseline subset (a subject with two baseline samples contributes both);
/// - `subjects_by_response`: distinct subjects per response code, restricted
///   to defined responses (`y`/`n`);
/// - `subjects_by_sex`: distinct subjects per sex, with no response
///   restriction.
///
/// Subject-level tallies deduplicate to one row per `subject_id`, keeping the
/// first occurrence in table order. An empty baseline subset yields three
/// empty tallies. Tally rows are sorted by key.
pub fn aggregate_baseline(table: &SampleTable, filter: &CohortFilter) -> BaselineBreakdown {
    let baseline = table.filter(|r| filter.matches_sample(r) && r.is_baseline());

    // Sample ids are unique within a table, so each record is one distinct sample.
    let mut per_project: BTreeMap<String, usize> = BTreeMap::new();
    for record in baseline.iter() {
        *per_project.entry(record.project_id.clone()).or_insert(0) += 1;
    }

    let subjects = baseline.dedup_subjects();

    let mut by_response: BTreeMap<String, usize> = BTreeMap::new();
    for record in subjects.iter().filter(|r| r.response.is_defined()) {
        *by_response
            .entry(record.response.code().to_string())
            .or_insert(0) += 1;
    }

    let mut by_sex: BTreeMap<String, usize> = BTreeMap::new();
    for record in subjects.iter() {
        *by_sex.entry(record.sex.clone()).or_insert(0) += 1;
    }

    let tally = |map: BTreeMap<String, usize>| -> Vec<GroupCount> {
        map.into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect()
    };

    BaselineBreakdown {
        baseline,
        samples_per_project: tally(per_project),
        subjects_by_response: tally(by_response),
        subjects_by_sex: tally(by_sex),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Response, SampleRecord};
    use std::collections::HashMap;

    fn sample(
        id: &str,
        subject: &str,
        project: &str,
        response: Response,
        sex: &str,
        time: i64,
    ) -> SampleRecord {
        SampleRecord {
            sample_id: id.to_string(),
            subject_id: subject.to_string(),
            project_id: project.to_string(),
            condition: "melanoma".to_string(),
            treatment: "tr1".to_string(),
            response,
            sample_type: "PBMC".to_string(),
            time_from_treatment_start: time,
            age: Some(48),
            sex: sex.to_string(),
            counts: HashMap::new(),
        }
    }

    fn filter() -> CohortFilter {
        CohortFilter::new("melanoma", "tr1", "PBMC")
    }

    #[test]
    fn test_baseline_restriction() {
        // 4 samples from 2 subjects, two at baseline and two at day 5.
        let table = SampleTable::new(vec![
            sample("s1", "p1", "prj1", Response::Responder, "M", 0),
            sample("s2", "p1", "prj1", Response::Responder, "M", 5),
            sample("s3", "p2", "prj1", Response::NonResponder, "F", 0),
            sample("s4", "p2", "prj1", Response::NonResponder, "F", 5),
        ])
        .unwrap();

        let breakdown = aggregate_baseline(&table, &filter());
        assert_eq!(breakdown.baseline.n_samples(), 2);
        assert_eq!(
            breakdown.baseline.subject_ids(),
            vec!["p1", "p2"]
        );
        let total_subjects: usize = breakdown
            .subjects_by_sex
            .iter()
            .map(|g| g.count)
            .sum();
        assert_eq!(total_subjects, 2);
    }

    #[test]
    fn test_subject_dedup_vs_sample_tally() {
        // One subject contributes two baseline samples: both count as samples,
        // the subject counts once.
        let table = SampleTable::new(vec![
            sample("s1", "p1", "prj1", Response::Responder, "M", 0),
            sample("s2", "p1", "prj2", Response::Responder, "M", 0),
            sample("s3", "p2", "prj1", Response::NonResponder, "F", 0),
        ])
        .unwrap();

        let breakdown = aggregate_baseline(&table, &filter());
        assert_eq!(
            breakdown.samples_per_project,
            vec![
                GroupCount {
                    key: "prj1".to_string(),
                    count: 2
                },
                GroupCount {
                    key: "prj2".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(
            breakdown.subjects_by_response,
            vec![
                GroupCount {
                    key: "n".to_string(),
                    count: 1
                },
                GroupCount {
                    key: "y".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(
            breakdown.subjects_by_sex,
            vec![
                GroupCount {
                    key: "F".to_string(),
                    count: 1
                },
                GroupCount {
                    key: "M".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_missing_response_excluded_from_response_tally_only() {
        let table = SampleTable::new(vec![
            sample("s1", "p1", "prj1", Response::Missing, "F", 0),
            sample("s2", "p2", "prj1", Response::Responder, "F", 0),
        ])
        .unwrap();

        let breakdown = aggregate_baseline(&table, &filter());
        // p1 is absent from the response tally...
        assert_eq!(
            breakdown.subjects_by_response,
            vec![GroupCount {
                key: "y".to_string(),
                count: 1
            }]
        );
        // ...but still counted by sex and by project.
        assert_eq!(
            breakdown.subjects_by_sex,
            vec![GroupCount {
                key: "F".to_string(),
                count: 2
            }]
        );
        assert_eq!(breakdown.samples_per_project[0].count, 2);
    }

    #[test]
    fn test_empty_baseline_yields_empty_tallies() {
        let table = SampleTable::new(vec![sample(
            "s1",
            "p1",
            "prj1",
            Response::Responder,
            "M",
            7,
        )])
        .unwrap();

        let breakdown = aggregate_baseline(&table, &filter());
        assert!(breakdown.is_empty());
        assert!(breakdown.samples_per_project.is_empty());
        assert!(breakdown.subjects_by_response.is_empty());
        assert!(breakdown.subjects_by_sex.is_empty());
    }

    #[test]
    fn test_filter_predicates_conjoined() {
        let mut other = sample("s2", "p2", "prj1", Response::Responder, "F", 0);
        other.condition = "lung".to_string();
        let table = SampleTable::new(vec![
            sample("s1", "p1", "prj1", Response::Responder, "M", 0),
            other,
        ])
        .unwrap();

        let breakdown = aggregate_baseline(&table, &filter());
        assert_eq!(breakdown.baseline.n_samples(), 1);
        assert_eq!(breakdown.baseline.records()[0].sample_id, "s1");
    }
}

//! Responder vs. non-responder comparison over a cohort.

use crate::cohort::filter::CohortFilter;
use crate::config::PopulationSet;
use crate::data::{CohortComparison, FrequencyTable, PopulationResult, PopulationTest, Response};
use crate::error::Result;
use crate::stats::mann_whitney_u;
use rayon::prelude::*;

/// Significance threshold for the per-population test.
pub const SIGNIFICANCE_ALPHA: f64 = 0.05;

/// Minimum observations per response group for the test to run.
pub const MIN_GROUP_SIZE: usize = 2;

/// Compare responder and non-responder frequency distributions per population.
///
/// The working subset is the rows matching the cohort filter whose response
/// is defined (`y` or `n`). For each configured population the two groups'
/// percentage values are compared with a two-sided Mann-Whitney U test;
/// a group with fewer than [`MIN_GROUP_SIZE`] observations yields an
/// [`PopulationTest::InsufficientData`] marker instead of a test result.
///
/// A filter matching zero rows is not an error: the returned comparison has
/// an empty filtered table and an insufficient-data marker per population.
/// Results depend only on the multiset of values per group, so they are
/// invariant under row-order permutation of the input.
pub fn compare_cohort(
    frequencies: &FrequencyTable,
    filter: &CohortFilter,
    populations: &PopulationSet,
) -> Result<CohortComparison> {
    let filtered =
        frequencies.filter(|r| filter.matches_frequency(r) && r.response.is_defined());

    let results: Vec<PopulationResult> = populations
        .names()
        .par_iter()
        .map(|population| {
            let responders = filtered.percentages(population, Response::Responder);
            let non_responders = filtered.percentages(population, Response::NonResponder);

            let test = if responders.len() < MIN_GROUP_SIZE
                || non_responders.len() < MIN_GROUP_SIZE
            {
                PopulationTest::InsufficientData {
                    n_responders: responders.len(),
                    n_non_responders: non_responders.len(),
                }
            } else {
                let outcome = mann_whitney_u(&responders, &non_responders)?;
                PopulationTest::Tested {
                    statistic: outcome.statistic,
                    p_value: outcome.p_value,
                    significant: outcome.p_value < SIGNIFICANCE_ALPHA,
                }
            };

            Ok(PopulationResult {
                population: population.clone(),
                test,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CohortComparison { filtered, results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FrequencyRecord, SampleRecord, SampleTable};
    use crate::normalize::normalize;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn sample(
        id: &str,
        subject: &str,
        response: Response,
        counts: &[(&str, u64)],
    ) -> SampleRecord {
        SampleRecord {
            sample_id: id.to_string(),
            subject_id: subject.to_string(),
            project_id: "prj1".to_string(),
            condition: "melanoma".to_string(),
            treatment: "tr1".to_string(),
            response,
            sample_type: "PBMC".to_string(),
            time_from_treatment_start: 0,
            age: Some(60),
            sex: "F".to_string(),
            counts: counts
                .iter()
                .map(|(p, c)| (p.to_string(), *c))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn pops() -> PopulationSet {
        PopulationSet::new(vec!["b_cell", "nk_cell"]).unwrap()
    }

    fn filter() -> CohortFilter {
        CohortFilter::new("melanoma", "tr1", "PBMC")
    }

    /// Three responders around 10% b_cell, three non-responders around 50%.
    fn separated_table() -> FrequencyTable {
        let table = SampleTable::new(vec![
            sample("s1", "p1", Response::Responder, &[("b_cell", 10), ("nk_cell", 90)]),
            sample("s2", "p2", Response::Responder, &[("b_cell", 12), ("nk_cell", 88)]),
            sample("s3", "p3", Response::Responder, &[("b_cell", 11), ("nk_cell", 89)]),
            sample("s4", "p4", Response::NonResponder, &[("b_cell", 50), ("nk_cell", 50)]),
            sample("s5", "p5", Response::NonResponder, &[("b_cell", 52), ("nk_cell", 48)]),
            sample("s6", "p6", Response::NonResponder, &[("b_cell", 49), ("nk_cell", 51)]),
        ])
        .unwrap();
        normalize(&table, &pops())
    }

    #[test]
    fn test_separated_groups_significant() {
        let comparison = compare_cohort(&separated_table(), &filter(), &pops()).unwrap();

        let b_cell = comparison.get("b_cell").unwrap();
        assert!(b_cell.is_significant());
        assert!(b_cell.p_value().unwrap() < SIGNIFICANCE_ALPHA);
        assert_relative_eq!(b_cell.statistic().unwrap(), 0.0, epsilon = 1e-12);

        // nk_cell percentages are the mirror image, equally separated.
        assert!(comparison.get("nk_cell").unwrap().is_significant());
        assert_eq!(comparison.n_significant(), 2);
    }

    #[test]
    fn test_insufficient_group_marked() {
        let table = SampleTable::new(vec![
            sample("s1", "p1", Response::Responder, &[("b_cell", 10), ("nk_cell", 90)]),
            sample("s2", "p2", Response::Responder, &[("b_cell", 11), ("nk_cell", 89)]),
            sample("s3", "p3", Response::NonResponder, &[("b_cell", 10), ("nk_cell", 90)]),
        ])
        .unwrap();
        let long = normalize(&table, &pops());

        let comparison = compare_cohort(&long, &filter(), &pops()).unwrap();
        assert_eq!(
            comparison.get("b_cell"),
            Some(&PopulationTest::InsufficientData {
                n_responders: 2,
                n_non_responders: 1,
            })
        );
        assert_eq!(comparison.n_significant(), 0);
    }

    #[test]
    fn test_zero_row_cohort_is_empty_not_error() {
        let comparison = compare_cohort(
            &separated_table(),
            &CohortFilter::new("lung", "tr9", "tumor"),
            &pops(),
        )
        .unwrap();

        assert!(comparison.filtered.is_empty());
        assert_eq!(comparison.results.len(), 2);
        assert!(comparison
            .results
            .iter()
            .all(|r| matches!(r.test, PopulationTest::InsufficientData { .. })));
    }

    #[test]
    fn test_missing_response_excluded() {
        let table = SampleTable::new(vec![
            sample("s1", "p1", Response::Responder, &[("b_cell", 10), ("nk_cell", 90)]),
            sample("s2", "p2", Response::Responder, &[("b_cell", 12), ("nk_cell", 88)]),
            sample("s3", "p3", Response::Missing, &[("b_cell", 99), ("nk_cell", 1)]),
            sample("s4", "p4", Response::NonResponder, &[("b_cell", 50), ("nk_cell", 50)]),
            sample("s5", "p5", Response::NonResponder, &[("b_cell", 52), ("nk_cell", 48)]),
        ])
        .unwrap();
        let long = normalize(&table, &pops());

        let comparison = compare_cohort(&long, &filter(), &pops()).unwrap();
        // 4 samples with defined response, 2 populations each.
        assert_eq!(comparison.filtered.len(), 8);
        assert!(comparison
            .filtered
            .iter()
            .all(|r| r.response.is_defined()));
    }

    #[test]
    fn test_row_order_permutation_invariance() {
        let long = separated_table();
        let mut reversed: Vec<FrequencyRecord> = long.records().to_vec();
        reversed.reverse();
        let reversed = FrequencyTable::new(reversed);

        let a = compare_cohort(&long, &filter(), &pops()).unwrap();
        let b = compare_cohort(&reversed, &filter(), &pops()).unwrap();

        for (ra, rb) in a.results.iter().zip(b.results.iter()) {
            assert_eq!(ra.population, rb.population);
            assert_eq!(ra.test, rb.test);
        }
    }

    #[test]
    fn test_nan_percentages_never_reach_test() {
        // A zero-total responder sample must not poison the test input.
        let table = SampleTable::new(vec![
            sample("s1", "p1", Response::Responder, &[("b_cell", 10), ("nk_cell", 90)]),
            sample("s2", "p2", Response::Responder, &[("b_cell", 12), ("nk_cell", 88)]),
            sample("s3", "p3", Response::Responder, &[]),
            sample("s4", "p4", Response::NonResponder, &[("b_cell", 50), ("nk_cell", 50)]),
            sample("s5", "p5", Response::NonResponder, &[("b_cell", 52), ("nk_cell", 48)]),
        ])
        .unwrap();
        let long = normalize(&table, &pops());

        let comparison = compare_cohort(&long, &filter(), &pops()).unwrap();
        let b_cell = comparison.get("b_cell").unwrap();
        assert!(matches!(b_cell, PopulationTest::Tested { .. }));
        assert!(!b_cell.p_value().unwrap().is_nan());
    }
}

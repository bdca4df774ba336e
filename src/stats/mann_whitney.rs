//! Two-sided Mann-Whitney U test for two independent samples.

use crate::error::{CytoError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Outcome of a Mann-Whitney U test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MannWhitneyTest {
    /// U statistic of the first sample.
    pub statistic: f64,
    /// Two-sided p-value from the tie-corrected normal approximation.
    pub p_value: f64,
}

/// Run a two-sided Mann-Whitney U test comparing two unpaired samples.
///
/// Ranks are mid-ranks, so tied observations share their average rank. The
/// statistic is `U1 = R1 - n1(n1+1)/2`, the U of the first sample, matching
/// the usual reference convention. The p-value comes from the normal
/// approximation with tie-corrected variance and no continuity correction;
/// for fixed inputs the result is exactly reproducible.
///
/// When every observation across both samples is identical the variance
/// degenerates to zero and the p-value is 1.0.
pub fn mann_whitney_u(first: &[f64], second: &[f64]) -> Result<MannWhitneyTest> {
    if first.is_empty() || second.is_empty() {
        return Err(CytoError::InvalidParameter(
            "Mann-Whitney U requires at least one observation per group".to_string(),
        ));
    }
    if first.iter().chain(second).any(|v| v.is_nan()) {
        return Err(CytoError::Numerical(
            "Mann-Whitney U input contains NaN".to_string(),
        ));
    }

    let n1 = first.len() as f64;
    let n2 = second.len() as f64;
    let n = n1 + n2;

    // Pool the observations, tagging membership in the first sample.
    let mut pooled: Vec<(f64, bool)> = first
        .iter()
        .map(|&v| (v, true))
        .chain(second.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Assign mid-ranks, accumulating the rank sum of the first sample and the
    // tie term sum(t^3 - t) for the variance correction.
    let mut rank_sum_first = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < pooled.len() {
        let mut j = i;
        while j < pooled.len() && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        let tied = (j - i) as f64;
        let mid_rank = (i + 1 + j) as f64 / 2.0;
        if tied > 1.0 {
            tie_term += tied * tied * tied - tied;
        }
        for entry in &pooled[i..j] {
            if entry.1 {
                rank_sum_first += mid_rank;
            }
        }
        i = j;
    }

    let statistic = rank_sum_first - n1 * (n1 + 1.0) / 2.0;

    let mean = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    let p_value = if variance <= 0.0 {
        1.0
    } else {
        let z = (statistic - mean) / variance.sqrt();
        let normal = Normal::new(0.0, 1.0).unwrap();
        (2.0 * (1.0 - normal.cdf(z.abs()))).min(1.0)
    };

    Ok(MannWhitneyTest { statistic, p_value })
}

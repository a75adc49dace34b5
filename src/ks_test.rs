//! A one-sample Kolmogorov–Smirnov test of a sample against a reference CDF, used
//! to compare sampler output with a closed-form posterior.
//!
//! MCMC draws are autocorrelated, which makes the p-value optimistic about
//! rejection; thin the chain before testing.

use std::cmp::Ordering;

use crate::error::SamplerError;

/// Result of a KS test: the statistic, its p-value and whether the null hypothesis
/// (the sample follows the reference distribution) is rejected at `level`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    pub is_rejected: bool,
    pub statistic: f64,
    pub p_value: f64,
    pub level: f64,
}

/// Tests `sample` against the distribution with cumulative distribution function `cdf`.
pub fn ks_test<F>(sample: &[f64], cdf: F, level: f64) -> Result<TestResult, SamplerError>
where
    F: Fn(f64) -> f64,
{
    let statistic = ks_statistic(sample, cdf)?;
    let en = (sample.len() as f64).sqrt();
    // Stephens' small-sample correction, as in Numerical Recipes.
    let p_value = qks((en + 0.12 + 0.11 / en) * statistic)?;
    Ok(TestResult {
        is_rejected: p_value < level,
        statistic,
        p_value,
        level,
    })
}

/// Largest distance between the empirical CDF of `sample` and `cdf`.
fn ks_statistic<F>(sample: &[f64], cdf: F) -> Result<f64, SamplerError>
where
    F: Fn(f64) -> f64,
{
    if sample.is_empty() {
        return Err(SamplerError::EmptySample);
    }
    if sample.iter().any(|x| x.is_nan()) {
        return Err(SamplerError::Statistics("sample contains NaN".into()));
    }
    let mut sorted = sample.to_vec();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n = sorted.len() as f64;
    let d = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let f = cdf(x);
            let below = f - i as f64 / n;
            let above = (i + 1) as f64 / n - f;
            below.max(above)
        })
        .fold(0.0, f64::max);
    Ok(d)
}

/// CDF of the Kolmogorov–Smirnov distribution.
/// Uses the series from *Numerical Recipes* (Third Edition).
fn pks(z: f64) -> Result<f64, SamplerError> {
    if z.is_nan() || z < 0. {
        return Err(SamplerError::Statistics(format!(
            "bad z = {z} for KS distribution function"
        )));
    }
    if z == 0. {
        return Ok(0.);
    }
    if z < 1.18 {
        let y = (-1.233_700_550_136_169_7 / z.powi(2)).exp();
        return Ok(2.256_758_334_191_025
            * (-y.ln()).sqrt()
            * (y + y.powf(9.) + y.powf(25.) + y.powf(49.)));
    }
    let x = (-2. * z.powi(2)).exp();
    Ok(1. - 2. * (x - x.powf(4.) + x.powf(9.)))
}

/// Complementary CDF of the Kolmogorov–Smirnov distribution.
fn qks(z: f64) -> Result<f64, SamplerError> {
    if z.is_nan() || z < 0. {
        return Err(SamplerError::Statistics(format!(
            "bad z = {z} for KS distribution function"
        )));
    }
    if z == 0. {
        return Ok(1.);
    }
    if z < 1.18 {
        return Ok(1. - pks(z)?);
    }
    let x = (-2. * z.powi(2)).exp();
    Ok(2. * (x - x.powf(4.) + x.powf(9.)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rand_distr::Distribution;
    use statrs::distribution::{Beta, ContinuousCDF};

    fn beta_draws(n: usize, shift: f64) -> Vec<f64> {
        let beta = rand_distr::Beta::new(75.0, 43.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        (0..n).map(|_| beta.sample(&mut rng) + shift).collect()
    }

    fn uniform_cdf(x: f64) -> f64 {
        x.clamp(0.0, 1.0)
    }

    #[test]
    fn statistic_of_evenly_spread_points() {
        // Points at the midpoints of n equal bins sit 1/(2n) from the uniform CDF.
        let sample = [0.125, 0.375, 0.625, 0.875];
        let d = ks_statistic(&sample, uniform_cdf).unwrap();
        assert!((d - 0.125).abs() < 1e-12, "Expected D = 1/8, got {d}.");
    }

    #[test]
    fn statistic_is_one_for_disjoint_support() {
        let d = ks_statistic(&[5.0, 6.0, 7.0], uniform_cdf).unwrap();
        assert_eq!(d, 1.0);
    }

    #[test]
    fn accepts_draws_from_the_reference() {
        let beta = Beta::new(75.0, 43.0).unwrap();
        let sample = beta_draws(2_000, 0.0);
        let result = ks_test(&sample, |x| beta.cdf(x), 0.001).unwrap();
        assert!(!result.is_rejected, "Unexpected rejection: {result:?}");
    }

    #[test]
    fn rejects_a_shifted_sample() {
        let beta = Beta::new(75.0, 43.0).unwrap();
        let sample = beta_draws(2_000, -0.05);
        let result = ks_test(&sample, |x| beta.cdf(x), 0.01).unwrap();
        assert!(result.is_rejected, "Expected rejection: {result:?}");
        assert!(result.p_value < 1e-6);
    }

    #[test]
    fn empty_sample_errors() {
        assert_eq!(
            ks_test(&[], uniform_cdf, 0.05).unwrap_err(),
            SamplerError::EmptySample
        );
    }

    #[test]
    fn test_bad_z_for_pks() {
        let res = pks(-1.0);
        assert!(
            res.is_err(),
            "Expected pks(-1.0) to return an error, got {:?}.",
            res
        );
    }

    #[test]
    fn test_pks_known_values() {
        assert_eq!(pks(0.0).unwrap(), 0.0);
        assert!((pks(1.23).unwrap() - 0.9029731024047791).abs() < 1e-8);
        assert!((pks(2.34).unwrap() - 0.9999649260833611).abs() < 1e-8);
        assert_eq!(qks(0.0).unwrap(), 1.0);
        assert!((qks(0.5).unwrap() + pks(0.5).unwrap() - 1.0).abs() < 1e-12);
    }
}

//! Summaries of a single post-burn-in sample: moments, quantiles and a
//! single-chain effective sample size.

use std::fmt;

use ndarray::{Array1, ArrayView1};
use ndarray_stats::interpolate::Linear;
use ndarray_stats::{Quantile1dExt, QuantileExt};
use noisy_float::types::{n64, N64};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::SamplerError;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSummary {
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator); zero for a single draw.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q05: f64,
    pub median: f64,
    pub q95: f64,
    pub ess: f64,
}

impl SampleSummary {
    pub fn from_sample(sample: &[f64]) -> Result<Self, SamplerError> {
        if sample.is_empty() {
            return Err(SamplerError::EmptySample);
        }
        if sample.iter().any(|x| x.is_nan()) {
            return Err(SamplerError::Statistics("sample contains NaN".into()));
        }
        let view = ArrayView1::from(sample);
        let n = sample.len();
        let mean = view.mean().ok_or(SamplerError::EmptySample)?;
        let std = if n > 1 { view.std(1.0) } else { 0.0 };
        let min = *view
            .min()
            .map_err(|e| SamplerError::Statistics(e.to_string()))?;
        let max = *view
            .max()
            .map_err(|e| SamplerError::Statistics(e.to_string()))?;

        // NaN was rejected above, so every draw converts.
        let mut ordered: Array1<N64> = view.mapv(n64);
        let mut quantile = |q: f64| -> Result<f64, SamplerError> {
            ordered
                .quantile_mut(n64(q), &Linear)
                .map(N64::raw)
                .map_err(|e| SamplerError::Statistics(e.to_string()))
        };
        let q05 = quantile(0.05)?;
        let median = quantile(0.5)?;
        let q95 = quantile(0.95)?;

        Ok(Self {
            n,
            mean,
            std,
            min,
            max,
            q05,
            median,
            q95,
            ess: effective_sample_size(sample),
        })
    }
}

impl fmt::Display for SampleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "n      = {}", self.n)?;
        writeln!(f, "mean   = {:.4}", self.mean)?;
        writeln!(f, "std    = {:.4}", self.std)?;
        writeln!(f, "range  = [{:.4}, {:.4}]", self.min, self.max)?;
        writeln!(
            f,
            "q05/q50/q95 = {:.4} / {:.4} / {:.4}",
            self.q05, self.median, self.q95
        )?;
        write!(f, "ess    = {:.1}", self.ess)
    }
}

/// Lag-`lag` autocorrelation of a scalar chain; zero when undefined.
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    if series.is_empty() || lag >= series.len() {
        return 0.0;
    }
    let view = ArrayView1::from(series);
    let mean = view.mean().unwrap_or(0.0);
    let centered = view.mapv(|x| x - mean);
    let denominator = centered.dot(&centered);
    if denominator <= 0.0 {
        return 0.0;
    }
    let n = series.len() - lag;
    let numerator = centered
        .slice(ndarray::s![..n])
        .dot(&centered.slice(ndarray::s![lag..]));
    numerator / denominator
}

/// Effective sample size of one chain.
///
/// Sums autocorrelations until the first non-positive lag, then returns
/// `n / (1 + 2 * sum)`, never more than `n`.
pub fn effective_sample_size(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return n as f64;
    }
    let rho_sum: f64 = autocorrelations(series)
        .into_iter()
        .skip(1)
        .take_while(|&rho| rho > 0.0)
        .sum();
    n as f64 / (1.0 + 2.0 * rho_sum).max(1.0)
}

/// Autocorrelations of `series` at every lag `0..n`, from one FFT of the centered
/// series zero-padded to avoid wrap-around. All zeros for a constant series.
fn autocorrelations(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return Vec::new();
    }
    let mean = ArrayView1::from(series).mean().unwrap_or(0.0);
    let len = (2 * n).next_power_of_two();
    let mut buffer: Vec<Complex<f64>> = series
        .iter()
        .map(|&x| Complex::new(x - mean, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(len)
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(len).process(&mut buffer);
    for c in buffer.iter_mut() {
        *c = Complex::new(c.norm_sqr(), 0.0);
    }
    planner.plan_fft_inverse(len).process(&mut buffer);

    // rustfft leaves both transforms unnormalized; the factor cancels in the ratio.
    let variance = buffer[0].re;
    if variance <= 0.0 {
        return vec![0.0; n];
    }
    buffer[..n].iter().map(|c| c.re / variance).collect()
}

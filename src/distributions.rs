/*!
Traits for the two halves of a model adapter, plus the symmetric random-walk kernel
most scalar models use as their proposal.

The sampler applies no Hastings correction, so every [`Proposal`] must be symmetric:
the density of moving from `x` to `y` equals the density of moving from `y` to `x`.

# Examples

```rust
use metro_mcmc::distributions::{GaussianRandomWalk, Proposal};
use rand::rngs::SmallRng;
use rand::SeedableRng;

let walk = GaussianRandomWalk::new(0.3_f64).unwrap();
let mut rng = SmallRng::seed_from_u64(42);
let candidate = walk.propose(0.5, &mut rng);
assert!(candidate.is_finite());
```
*/

use num_traits::Float;
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};

use crate::error::SamplerError;

/// Generates a candidate state from the current one.
///
/// Implementations draw all their randomness from `rng` and may return any value;
/// restricting the domain is the target's job.
pub trait Proposal<T: Float> {
    fn propose<R: Rng + ?Sized>(&self, current: T, rng: &mut R) -> T;
}

/// An unnormalized density over the parameter.
pub trait Target<T: Float> {
    /// Returns a value proportional to the posterior density at `theta`.
    ///
    /// Must be deterministic, non-negative, and exactly zero outside the support.
    fn density(&self, theta: T) -> T;
}

/**
Adds zero-mean Gaussian noise with standard deviation `step_size` to the current state.

# Examples

```rust
use metro_mcmc::distributions::GaussianRandomWalk;

assert!(GaussianRandomWalk::new(0.0).is_err());
assert!(GaussianRandomWalk::new(f64::NAN).is_err());
assert_eq!(GaussianRandomWalk::new(0.3).unwrap().step_size(), 0.3);
```
*/
#[derive(Debug, Clone, Copy)]
pub struct GaussianRandomWalk<T>
where
    T: Float,
    StandardNormal: Distribution<T>,
{
    step_size: T,
    noise: Normal<T>,
}

impl<T> GaussianRandomWalk<T>
where
    T: Float,
    StandardNormal: Distribution<T>,
{
    pub fn new(step_size: T) -> Result<Self, SamplerError> {
        let invalid = || SamplerError::InvalidStepSize(step_size.to_f64().unwrap_or(f64::NAN));
        if !step_size.is_finite() || step_size <= T::zero() {
            return Err(invalid());
        }
        let noise = Normal::new(T::zero(), step_size).map_err(|_| invalid())?;
        Ok(Self { step_size, noise })
    }

    pub fn step_size(&self) -> T {
        self.step_size
    }
}

impl<T> Proposal<T> for GaussianRandomWalk<T>
where
    T: Float,
    StandardNormal: Distribution<T>,
{
    fn propose<R: Rng + ?Sized>(&self, current: T, rng: &mut R) -> T {
        current + self.noise.sample(rng)
    }
}

#[cfg(test)]
mod distributions_tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn rejects_bad_step_sizes() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(
                GaussianRandomWalk::new(bad).is_err(),
                "Expected step size {bad} to be rejected."
            );
        }
    }

    #[test]
    fn increments_are_zero_mean_with_requested_spread() {
        let walk = GaussianRandomWalk::new(0.5).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let n = 50_000;
        let deltas: Vec<f64> = (0..n).map(|_| walk.propose(2.0, &mut rng) - 2.0).collect();
        let mean = deltas.iter().sum::<f64>() / n as f64;
        let var = deltas.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert!(mean.abs() < 0.01, "Expected mean ~0, got {mean}.");
        assert!((var.sqrt() - 0.5).abs() < 0.01, "Expected std ~0.5, got {}.", var.sqrt());
    }

    #[test]
    fn walk_is_copy_and_debug() {
        let walk = GaussianRandomWalk::new(0.25_f64).unwrap();
        let copy = walk;
        assert_eq!(copy.step_size(), walk.step_size());
        assert!(format!("{walk:?}").starts_with("GaussianRandomWalk"));
    }

    #[test]
    fn same_seed_same_proposals() {
        let walk = GaussianRandomWalk::new(1.0f32).unwrap();
        let mut a = SmallRng::seed_from_u64(7);
        let mut b = SmallRng::seed_from_u64(7);
        for _ in 0..10 {
            assert_eq!(walk.propose(0.0, &mut a), walk.propose(0.0, &mut b));
        }
    }
}

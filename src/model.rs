/*!
Model adapters: the bridge between a concrete inference problem and the sampler.

An adapter owns the observed data and fixed hyperparameters and exposes two
functions to the engine: a stochastic `propose` and a deterministic `target`. The
engine never sees anything else, and the adapter never sees the engine's iteration
bookkeeping.

# Examples

```rust
use metro_mcmc::model::{CoinBias, Model};

let coin = CoinBias::default();
assert_eq!(coin.target(-0.1), 0.0);
assert_eq!(coin.target(1.1), 0.0);
assert!(coin.target(0.65) > 0.0);
```
*/

use num_traits::Float;
use rand::Rng;
use statrs::distribution::{Beta, Binomial, Continuous, Discrete};

use crate::distributions::{GaussianRandomWalk, Proposal, Target};
use crate::error::SamplerError;

/// The capability contract the sampler consumes.
///
/// Every type that is both a [`Proposal`] and a [`Target`] is a `Model`, so an adapter
/// that lacks either half is rejected by the compiler.
pub trait Model<T: Float> {
    fn propose<R: Rng + ?Sized>(&self, current: T, rng: &mut R) -> T;
    fn target(&self, theta: T) -> T;
}

impl<T, M> Model<T> for M
where
    T: Float,
    M: Proposal<T> + Target<T>,
{
    fn propose<R: Rng + ?Sized>(&self, current: T, rng: &mut R) -> T {
        Proposal::propose(self, current, rng)
    }

    fn target(&self, theta: T) -> T {
        self.density(theta)
    }
}

/// Binds an arbitrary target density to an arbitrary proposal.
#[derive(Debug, Clone)]
pub struct Adapter<D, Q> {
    pub target: D,
    pub proposal: Q,
}

impl<D, Q> Adapter<D, Q> {
    pub fn new(target: D, proposal: Q) -> Self {
        Self { target, proposal }
    }
}

impl<T: Float, D, Q: Proposal<T>> Proposal<T> for Adapter<D, Q> {
    fn propose<R: Rng + ?Sized>(&self, current: T, rng: &mut R) -> T {
        Proposal::propose(&self.proposal, current, rng)
    }
}

impl<T: Float, D: Target<T>, Q> Target<T> for Adapter<D, Q> {
    fn density(&self, theta: T) -> T {
        self.target.density(theta)
    }
}

/**
Estimates the bias of a coin from `heads` successes in `trials` tosses under a
`Beta(alpha, beta)` prior.

The unnormalized posterior is `Binomial(trials, θ).pmf(heads) * Beta(alpha, beta).pdf(θ)`
on `[0, 1]` and zero elsewhere. Proposals are a Gaussian random walk, so they can leave
the unit interval; such candidates have zero density and are always rejected.

The prior is conjugate, so the exact posterior `Beta(heads + alpha, trials - heads + beta)`
is available through [`CoinBias::reference_posterior`] for checking sampler output.

# Examples

```rust
use metro_mcmc::model::CoinBias;

let coin = CoinBias::new(100, 65, 10.0, 8.0, 0.3).unwrap();
assert!((coin.posterior_mean() - 75.0 / 118.0).abs() < 1e-12);
assert!(CoinBias::new(10, 11, 1.0, 1.0, 0.3).is_err());
```
*/
#[derive(Debug, Clone)]
pub struct CoinBias {
    trials: u64,
    heads: u64,
    alpha: f64,
    beta: f64,
    prior: Beta,
    walk: GaussianRandomWalk<f64>,
}

impl CoinBias {
    pub fn new(
        trials: u64,
        heads: u64,
        alpha: f64,
        beta: f64,
        step_size: f64,
    ) -> Result<Self, SamplerError> {
        if heads > trials {
            return Err(SamplerError::InvalidModel(format!(
                "observed {heads} heads in only {trials} trials"
            )));
        }
        let prior = Beta::new(alpha, beta).map_err(|e| {
            SamplerError::InvalidModel(format!("bad prior Beta({alpha}, {beta}): {e}"))
        })?;
        let walk = GaussianRandomWalk::new(step_size)?;
        Ok(Self {
            trials,
            heads,
            alpha,
            beta,
            prior,
            walk,
        })
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn heads(&self) -> u64 {
        self.heads
    }

    pub fn step_size(&self) -> f64 {
        self.walk.step_size()
    }

    /// Sampling distribution of the head count for a coin with bias `theta`.
    ///
    /// Returns `None` when `theta` is not a probability.
    pub fn likelihood(&self, theta: f64) -> Option<Binomial> {
        Binomial::new(theta, self.trials).ok()
    }

    pub fn prior(&self) -> &Beta {
        &self.prior
    }

    /// The closed-form posterior, used only to validate sampler output.
    pub fn reference_posterior(&self) -> Result<Beta, SamplerError> {
        let a = self.heads as f64 + self.alpha;
        let b = (self.trials - self.heads) as f64 + self.beta;
        Beta::new(a, b).map_err(|e| SamplerError::Statistics(e.to_string()))
    }

    pub fn posterior_mean(&self) -> f64 {
        (self.heads as f64 + self.alpha) / (self.trials as f64 + self.alpha + self.beta)
    }
}

impl Default for CoinBias {
    /// 65 heads out of 100 tosses, `Beta(10, 8)` prior, step size 0.3.
    fn default() -> Self {
        Self {
            trials: 100,
            heads: 65,
            alpha: 10.0,
            beta: 8.0,
            prior: Beta::new(10.0, 8.0).expect("Beta(10, 8) is a valid distribution"),
            walk: GaussianRandomWalk::new(0.3).expect("0.3 is a valid step size"),
        }
    }
}

impl Proposal<f64> for CoinBias {
    fn propose<R: Rng + ?Sized>(&self, current: f64, rng: &mut R) -> f64 {
        Proposal::propose(&self.walk, current, rng)
    }
}

impl Target<f64> for CoinBias {
    fn density(&self, theta: f64) -> f64 {
        if !(0.0..=1.0).contains(&theta) {
            return 0.0;
        }
        match self.likelihood(theta) {
            Some(likelihood) => likelihood.pmf(self.heads) * self.prior.pdf(theta),
            None => 0.0,
        }
    }
}

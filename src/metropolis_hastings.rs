/*!
# Metropolis–Hastings Sampler

This module implements a random-walk Metropolis–Hastings sampler over a scalar
parameter. It works with any model `M` implementing [`Model`]: a symmetric proposal
and an unnormalized target density. Because the proposal is symmetric the
acceptance probability reduces to the density ratio, capped at one.

## Overview

- **Model (`M`)**: proposes candidates and evaluates the unnormalized target density.
- **Chain ([`MHMarkovChain`])**: the random walk itself. Owns the current value and
  the random number generator; each step makes the proposal's draw and one uniform draw.
- **Sampler ([`MetropolisHastings`])**: configuration (initial value, iteration count,
  seed) plus the bookkeeping of the most recent run. The first fifth of every run is
  burn-in and is dropped from the returned sample and from the acceptance count.
- **Reproducibility**: `set_seed` reseeds the generator, so two samplers with the same
  configuration and seed produce identical trajectories.

## Example Usage

```rust
use metro_mcmc::metropolis_hastings::MetropolisHastings;
use metro_mcmc::model::CoinBias;

let mut mh = MetropolisHastings::new(CoinBias::default(), 0.1, 500)
    .unwrap()
    .set_seed(42);
let sample = mh.run().unwrap();

// 500 iterations keep 501 states, the first 100 of which are burn-in.
assert_eq!(sample.len(), 401);
assert!(mh.accepted() <= 400);
```
*/

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, trace, warn};
use num_traits::Float;
use rand::prelude::*;
use rand_distr::Standard;

use crate::core::{run_chain, run_chain_with_progress, ChainState, MarkovChain, Step};
use crate::error::SamplerError;
use crate::model::Model;

/// Iteration count used when none is configured.
pub const DEFAULT_ITERATIONS: usize = 1_000;

/**
Probability of moving from a state with density `current_density` to one with
density `proposed_density`: `min(proposed / current, 1)`.

A candidate with zero (or `NaN`) density is never accepted. A zero current density
can only arise from an invalid starting point; the ratio is then unbounded and is
clamped to one so the chain can escape.

# Examples

```rust
use metro_mcmc::metropolis_hastings::acceptance_ratio;

assert_eq!(acceptance_ratio(2.0, 1.0), 0.5);
assert_eq!(acceptance_ratio(1.0, 1e300), 1.0);
assert_eq!(acceptance_ratio(1.0, 0.0), 0.0);
assert_eq!(acceptance_ratio(0.0, 1.0), 1.0);
```
*/
pub fn acceptance_ratio<T: Float>(current_density: T, proposed_density: T) -> T {
    if proposed_density.is_nan() || proposed_density <= T::zero() {
        return T::zero();
    }
    if current_density <= T::zero() {
        warn!("current state has zero target density; accepting proposal unconditionally");
        return T::one();
    }
    let ratio = proposed_density / current_density;
    if ratio.is_nan() {
        // inf / inf
        T::one()
    } else {
        ratio.min(T::one())
    }
}

/// Checks that `initial_state` is a point the chain may start from.
fn validate_initial_state<T, M>(model: &M, initial_state: T) -> Result<(), SamplerError>
where
    T: Float,
    M: Model<T>,
{
    let density = model.target(initial_state);
    if density.is_finite() && density > T::zero() {
        Ok(())
    } else {
        Err(SamplerError::InvalidInitialState {
            value: initial_state.to_f64().unwrap_or(f64::NAN),
            density: density.to_f64().unwrap_or(f64::NAN),
        })
    }
}

/// Configuration of a sampling run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig<T> {
    pub iterations: usize,
    pub initial_state: T,
    /// `None` seeds the generator from system entropy.
    pub seed: Option<u64>,
}

impl<T: Float> Default for SamplerConfig<T> {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            initial_state: T::one(),
            seed: None,
        }
    }
}

/// A single random-walk Metropolis–Hastings chain.
#[derive(Debug, Clone)]
pub struct MHMarkovChain<T, M> {
    /// The model supplying proposals and target densities.
    pub model: M,
    current_state: T,
    current_density: T,
    /// The chain-specific random seed.
    pub seed: u64,
    /// The random number generator shared by proposals and accept/reject draws.
    pub rng: SmallRng,
}

impl<T, M> MHMarkovChain<T, M>
where
    T: Float,
    M: Model<T>,
{
    /// Creates a chain at `initial_state` with a generator seeded from entropy.
    pub fn new(model: M, initial_state: T) -> Self {
        let seed = thread_rng().gen::<u64>();
        let current_density = model.target(initial_state);
        Self {
            model,
            current_state: initial_state,
            current_density,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
    }

    /// Moves the chain to `state` without touching the generator.
    pub fn reset(&mut self, state: T) {
        self.current_density = self.model.target(state);
        self.current_state = state;
    }
}

impl<T, M> MarkovChain<T> for MHMarkovChain<T, M>
where
    T: Float + std::fmt::Debug,
    M: Model<T>,
    Standard: Distribution<T>,
{
    /// Performs one Metropolis–Hastings update: propose, then accept with probability
    /// `min(p(proposed) / p(current), 1)` using a uniform draw from `[0, 1)`.
    fn step(&mut self) -> Step<T> {
        let proposed = self.model.propose(self.current_state, &mut self.rng);
        let proposed_density = self.model.target(proposed);
        let ratio = acceptance_ratio(self.current_density, proposed_density);
        let u: T = self.rng.gen();
        let accepted = u < ratio;
        if accepted {
            self.current_state = proposed;
            self.current_density = proposed_density;
        }
        trace!("proposed {proposed:?}, ratio {ratio:?}, accepted {accepted}");
        Step {
            state: self.current_state,
            accepted,
        }
    }

    fn current_state(&self) -> T {
        self.current_state
    }
}

/**
The Metropolis–Hastings sampler.

Holds the run configuration and a single [`MHMarkovChain`]. Every call to
[`run`](Self::run) restarts the chain from the configured initial state; the random
number generator carries on from where the previous run left it.

# Examples

```rust
use metro_mcmc::metropolis_hastings::MetropolisHastings;
use metro_mcmc::model::CoinBias;

// A starting point outside the support is rejected up front.
assert!(MetropolisHastings::new(CoinBias::default(), 1.5, 100).is_err());
// So is an empty run.
assert!(MetropolisHastings::new(CoinBias::default(), 0.5, 0).is_err());
```
*/
#[derive(Debug, Clone)]
pub struct MetropolisHastings<T, M> {
    /// The chain driven by this sampler.
    pub chain: MHMarkovChain<T, M>,
    initial_state: T,
    iterations: usize,
    last_run: Option<ChainState<T>>,
}

impl<T, M> MetropolisHastings<T, M>
where
    T: Float + std::fmt::Debug,
    M: Model<T>,
    Standard: Distribution<T>,
{
    /**
    Constructs a sampler that runs `iterations` rounds starting from `initial_state`.

    # Errors

    [`SamplerError::InvalidIterations`] if `iterations` is zero and
    [`SamplerError::InvalidInitialState`] if the model's target density at
    `initial_state` is not finite and positive.
    */
    pub fn new(model: M, initial_state: T, iterations: usize) -> Result<Self, SamplerError> {
        if iterations == 0 {
            return Err(SamplerError::InvalidIterations);
        }
        validate_initial_state(&model, initial_state)?;
        Ok(Self {
            chain: MHMarkovChain::new(model, initial_state),
            initial_state,
            iterations,
            last_run: None,
        })
    }

    pub fn from_config(model: M, config: &SamplerConfig<T>) -> Result<Self, SamplerError> {
        let mh = Self::new(model, config.initial_state, config.iterations)?;
        Ok(match config.seed {
            Some(seed) => mh.set_seed(seed),
            None => mh,
        })
    }

    /**
    Sets a new seed for the generator.

    # Examples

    ```rust
    use metro_mcmc::metropolis_hastings::MetropolisHastings;
    use metro_mcmc::model::CoinBias;

    let mh = MetropolisHastings::new(CoinBias::default(), 0.5, 100)
        .unwrap()
        .set_seed(42);
    assert_eq!(mh.chain.seed, 42);
    ```
    */
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.chain.set_seed(seed);
        self
    }

    pub fn model(&self) -> &M {
        &self.chain.model
    }

    pub fn initial_state(&self) -> T {
        self.initial_state
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn burn_in(&self) -> usize {
        crate::core::burn_in_for(self.iterations)
    }

    /**
    Runs the chain for the configured number of iterations and returns the
    post-burn-in sample, `iterations + 1 - burn_in` values long.

    # Errors

    [`SamplerError::InvalidInitialState`] if the initial state has no target density.
    The check happens before any iteration runs.
    */
    pub fn run(&mut self) -> Result<Vec<T>, SamplerError> {
        self.restart()?;
        let state = run_chain(&mut self.chain, self.iterations);
        Ok(self.finish(state))
    }

    /// Same as [`run`](Self::run), displaying a progress bar while sampling.
    pub fn run_with_progress(&mut self) -> Result<Vec<T>, SamplerError> {
        self.restart()?;
        let pb = ProgressBar::new(self.iterations as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb.set_prefix("Chain");
        let state = run_chain_with_progress(&mut self.chain, self.iterations, &pb);
        pb.finish_with_message("Done!");
        Ok(self.finish(state))
    }

    fn restart(&mut self) -> Result<(), SamplerError> {
        validate_initial_state(&self.chain.model, self.initial_state)?;
        self.chain.reset(self.initial_state);
        debug!(
            "starting run: {} iterations from {:?}, burn-in {}, seed {}",
            self.iterations,
            self.initial_state,
            self.burn_in(),
            self.chain.seed
        );
        Ok(())
    }

    fn finish(&mut self, state: ChainState<T>) -> Vec<T> {
        debug!(
            "finished run: {} of {} post-burn-in proposals accepted ({:.3})",
            state.accepted(),
            state.iterations() - state.burn_in(),
            state.acceptance_rate()
        );
        let sample = state.sample().to_vec();
        self.last_run = Some(state);
        sample
    }

    /// Proposals accepted after burn-in in the most recent run, `0` before any run.
    pub fn accepted(&self) -> usize {
        self.last_run.as_ref().map_or(0, ChainState::accepted)
    }

    pub fn acceptance_rate(&self) -> f64 {
        self.last_run.as_ref().map_or(0.0, ChainState::acceptance_rate)
    }

    /// The full trajectory of the most recent run, burn-in included.
    pub fn trajectory(&self) -> &[T] {
        self.last_run
            .as_ref()
            .map(ChainState::trajectory)
            .unwrap_or(&[])
    }

    pub fn last_run(&self) -> Option<&ChainState<T>> {
        self.last_run.as_ref()
    }
}

//! Chain bookkeeping shared by every sampler in the crate.
//!
//! A [`MarkovChain`] only knows how to take one step. [`ChainState`] records what the
//! steps produced: the full trajectory, the burn-in threshold and how many proposals
//! were accepted after burn-in. Burn-in affects only this bookkeeping, never the
//! dynamics of the chain.

use indicatif::ProgressBar;

/// The outcome of a single proposal / accept-reject round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step<T> {
    /// The chain's state after the round (the prior value if the proposal was rejected).
    pub state: T,
    /// Whether the proposal was accepted.
    pub accepted: bool,
}

pub trait MarkovChain<T> {
    /// Does one iteration of the chain, returning the new current state.
    fn step(&mut self) -> Step<T>;

    /// Get the current state without stepping.
    fn current_state(&self) -> T;
}

/// Number of leading iterations treated as burn-in: one fifth of the run, rounded down.
pub fn burn_in_for(iterations: usize) -> usize {
    iterations / 5
}

/// Record of a single sampling run.
///
/// `trajectory` starts with the initial value and gains exactly one entry per
/// iteration, so a finished run holds `iterations + 1` values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainState<T> {
    trajectory: Vec<T>,
    iterations: usize,
    burn_in: usize,
    accepted: usize,
}

impl<T: Copy> ChainState<T> {
    pub fn new(initial_state: T, iterations: usize) -> Self {
        let mut trajectory = Vec::with_capacity(iterations + 1);
        trajectory.push(initial_state);
        Self {
            trajectory,
            iterations,
            burn_in: burn_in_for(iterations),
            accepted: 0,
        }
    }

    /// Appends the outcome of iteration `i` (zero based).
    ///
    /// Accept events only count once `i` has reached the burn-in threshold.
    pub fn record(&mut self, i: usize, step: Step<T>) {
        if step.accepted && i >= self.burn_in {
            self.accepted += 1;
        }
        self.trajectory.push(step.state);
    }

    pub fn current(&self) -> T {
        // `new` seeds the trajectory and nothing ever removes from it.
        self.trajectory[self.trajectory.len() - 1]
    }

    pub fn trajectory(&self) -> &[T] {
        &self.trajectory
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn burn_in(&self) -> usize {
        self.burn_in
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// The post-burn-in part of the trajectory.
    pub fn sample(&self) -> &[T] {
        &self.trajectory[self.burn_in.min(self.trajectory.len())..]
    }

    pub fn into_sample(mut self) -> Vec<T> {
        let start = self.burn_in.min(self.trajectory.len());
        self.trajectory.split_off(start)
    }

    /// Fraction of post-burn-in proposals that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        let counted = self.iterations - self.burn_in;
        if counted == 0 {
            0.0
        } else {
            self.accepted as f64 / counted as f64
        }
    }
}

/// Runs `chain` for `iterations` rounds, recording every step.
pub fn run_chain<T, M>(chain: &mut M, iterations: usize) -> ChainState<T>
where
    M: MarkovChain<T>,
    T: Copy,
{
    let mut state = ChainState::new(chain.current_state(), iterations);
    for i in 0..iterations {
        let step = chain.step();
        state.record(i, step);
    }
    state
}

pub fn run_chain_with_progress<T, M>(
    chain: &mut M,
    iterations: usize,
    pb: &ProgressBar,
) -> ChainState<T>
where
    M: MarkovChain<T>,
    T: Copy,
{
    let mut state = ChainState::new(chain.current_state(), iterations);
    pb.set_length(iterations as u64);

    for i in 0..iterations {
        let step = chain.step();
        state.record(i, step);

        // Update progress bar
        pb.inc(1);
    }

    state
}

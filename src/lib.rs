//! Scalar Metropolis–Hastings sampling with pluggable model adapters.
//!
//! The sampler in [`metropolis_hastings`] is model-agnostic: it consumes a
//! [`model::Model`], which proposes candidate values and evaluates an unnormalized
//! target density. [`model::CoinBias`] is a ready-made adapter for estimating a coin's
//! bias under a Beta prior.

pub mod core;
pub mod distributions;
pub mod error;
pub mod ks_test;
pub mod metropolis_hastings;
pub mod model;
pub mod stats;

pub use error::SamplerError;

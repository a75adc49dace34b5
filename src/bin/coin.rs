//! Estimates the bias of a coin with Metropolis–Hastings and compares the draw with the
//! exact Beta posterior.

use std::error::Error;

use clap::Parser;
use log::info;
use statrs::distribution::ContinuousCDF;

use metro_mcmc::ks_test::ks_test;
use metro_mcmc::metropolis_hastings::{MetropolisHastings, SamplerConfig};
use metro_mcmc::model::CoinBias;
use metro_mcmc::stats::SampleSummary;

/// Thinning interval applied before the KS comparison.
const KS_THIN: usize = 25;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// number of Metropolis-Hastings iterations
    #[arg(short, long, default_value_t = 500)]
    iterations: usize,

    /// starting value of the coin bias
    #[arg(long, default_value_t = 0.1)]
    initial: f64,

    /// standard deviation of the random-walk proposal
    #[arg(long, default_value_t = 0.3)]
    sigma: f64,

    /// number of coin tosses
    #[arg(short = 'n', long, default_value_t = 100)]
    trials: u64,

    /// number of heads observed
    #[arg(short = 'k', long, default_value_t = 65)]
    heads: u64,

    /// first shape parameter of the Beta prior
    #[arg(short, long, default_value_t = 10.0)]
    alpha: f64,

    /// second shape parameter of the Beta prior
    #[arg(short, long, default_value_t = 8.0)]
    beta: f64,

    /// seed for the random number generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// show a progress bar while sampling
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let coin = CoinBias::new(args.trials, args.heads, args.alpha, args.beta, args.sigma)?;
    let posterior = coin.reference_posterior()?;
    let posterior_mean = coin.posterior_mean();

    let config = SamplerConfig {
        iterations: args.iterations,
        initial_state: args.initial,
        seed: args.seed,
    };
    info!("sampling with {config:?}");
    let mut mh = MetropolisHastings::from_config(coin, &config)?;
    let samples = if args.progress {
        mh.run_with_progress()?
    } else {
        mh.run()?
    };

    println!("{:?}", &samples[..samples.len().min(10)]);
    println!("Efficiency = {}", mh.accepted());
    println!("Acceptance rate = {:.3}", mh.acceptance_rate());

    let summary = SampleSummary::from_sample(&samples)?;
    println!("{summary}");
    println!("True posterior mean = {posterior_mean:.4}");

    let thinned: Vec<f64> = samples.iter().step_by(KS_THIN).copied().collect();
    let ks = ks_test(&thinned, |x| posterior.cdf(x), 0.05)?;
    println!(
        "KS vs Beta({}, {}): D = {:.4}, p = {:.4}{}",
        args.heads as f64 + args.alpha,
        (args.trials - args.heads) as f64 + args.beta,
        ks.statistic,
        ks.p_value,
        if ks.is_rejected { " (rejected)" } else { "" }
    );

    Ok(())
}

//! Black-box check of the uniformity guarantee.
//!
//! Runs 100,000 independent samplings of the stream 0..100 with k = 10 and
//! prints the theoretical vs. empirical analysis plus a per-element text bar
//! chart of the empirical selection frequencies.
//!
//! Run with `RUST_LOG=cistern=debug` to watch harness progress.

use cistern::VerifyConfig;
use tracing_subscriber::EnvFilter;

const N_STREAM: u64 = 100;
const K_RESERVOIR: usize = 10;
const T_RUNS: u64 = 100_000;

const BAR_WIDTH: usize = 40;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cistern=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("Start test: {T_RUNS} runs...");
    let config = VerifyConfig::new(N_STREAM, K_RESERVOIR).with_runs(T_RUNS);
    let report = cistern::verify::run(&config)?;
    println!("End test.");
    println!();

    let theoretical = report.theoretical_probability();
    println!("--- Theoretical and Experimental Analysis ---");
    println!(
        "Theoretical probability: {theoretical} ({:.2}%)",
        theoretical * 100.0
    );
    println!(
        "Theoretical number of appearances: {}",
        T_RUNS as f64 * theoretical
    );
    println!(
        "Experimental average appearances:  {:.2}",
        report.mean_appearances()
    );
    println!(
        "Experimental std dev of appearances: {:.2}",
        report.std_dev_appearances()
    );
    println!(
        "Max |empirical - theoretical|: {:.5} ({:.2} standard errors)",
        report.max_abs_deviation(),
        report.max_abs_deviation() / report.standard_error()
    );
    println!();

    // The bar marks each element's empirical frequency; `|` marks where the
    // theoretical probability falls on the same scale.
    let scale = 2.0 * theoretical;
    let marker = (theoretical / scale * BAR_WIDTH as f64).round() as usize;
    println!("Empirical probability per stream element (| = theoretical):");
    for element in 0..N_STREAM {
        let p = report.empirical_probability(element);
        let filled = ((p / scale) * BAR_WIDTH as f64).round() as usize;
        let mut bar: Vec<char> = (0..BAR_WIDTH)
            .map(|c| if c < filled { '#' } else { ' ' })
            .collect();
        if marker < bar.len() {
            bar[marker] = '|';
        }
        let bar: String = bar.into_iter().collect();
        println!("{element:>3} [{bar}] {p:.4}");
    }

    Ok(())
}

//! Exact policy evaluation and exhaustive search for finite-horizon Dec-POMDPs.
//!
//! The crate is organized bottom-up:
//!
//! - `model`: the discrete decision process queried by everything else
//! - `history`: dense indexing of individual and joint observation histories
//! - `policy`: pure joint policies as mixed-radix odometers
//! - `value`: exact recursive evaluation and Monte Carlo simulation
//! - `search`: brute-force and alternating best-response planners
//! - `problems`: benchmark problems and random model generation

pub mod history;
pub mod model;
pub mod policy;
pub mod problems;
pub mod search;
pub mod value;

pub use history::*;
pub use model::*;
pub use policy::*;
pub use problems::*;
pub use search::*;
pub use value::*;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Transition, observation, and initial-state probabilities.
pub type Probability = f64;
/// Rewards and expected returns.
pub type Utility = f64;
/// Index of an agent, 0-based.
pub type Agent = usize;
/// Decision stage, 0 at the root. A horizon-h problem has stages 0..h.
pub type Stage = usize;

// ============================================================================
// NUMERIC TOLERANCES
// ============================================================================
/// Minimum improvement before a search driver replaces its incumbent.
/// Guards best-response loops against floating-point near-ties.
pub const EPSILON: Utility = 1e-9;
/// Allowed deviation from 1 when validating stochastic rows.
pub const PROBABILITY_TOLERANCE: Probability = 1e-6;

// ============================================================================
// SEARCH LIMITS
// ============================================================================
/// Hard cap on best-response rounds in JESP-style planners.
pub const MAX_ITERATIONS: usize = 1000;
/// Largest |S| x |JOH| value table allocated by the cached evaluator.
/// Beyond this, `Mode::recommended` falls back to uncached evaluation.
pub const CACHE_LIMIT: usize = 1 << 26;
/// Monte Carlo episodes per simulation when the caller does not choose.
pub const SIMULATION_RUNS: usize = 10_000;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Interval between progress log messages during long searches.
pub const LOG_INTERVAL: std::time::Duration = std::time::Duration::from_secs(10);

/// Initialize dual logging (terminal + file), one file per run named
/// `logs/<run>-<unix time>.log`. DEBUG goes to the file, INFO to the terminal.
#[cfg(feature = "cli")]
pub fn log(run: &str) {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(logfile(run, time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

#[cfg(feature = "cli")]
fn logfile(run: &str, time: u64) -> String {
    let run = run
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect::<String>();
    format!("logs/{}-{}.log", run, time)
}

/// Register graceful interrupt handler. Type "Q" + Enter to stop the
/// running search after its current evaluation.
#[cfg(feature = "cli")]
pub fn brb(cancel: Cancel) {
    std::thread::spawn(move || {
        loop {
            let ref mut buffer = String::new();
            match std::io::stdin().read_line(buffer) {
                Ok(0) | Err(_) => break,
                Ok(_) if buffer.trim().to_uppercase() == "Q" => {
                    log::warn!("graceful interrupt requested, finishing current evaluation...");
                    cancel.cancel();
                    break;
                }
                Ok(_) => continue,
            }
        }
    });
}

use crate::*;
use std::time::Duration;
use std::time::Instant;

/// Unified progress reporting across planners.
///
/// # Required Methods
///
/// - `evaluations()`: joint policies evaluated
/// - `improvements()`: times the incumbent was replaced
/// - `visits()`: (state, history) nodes expanded by the evaluator
/// - `elapsed()`: wall-clock duration of the search
///
/// # Provided Methods
///
/// - `format()`: tabular stats with E/sec throughput
/// - `summary()`: final output with "search stopped" prefix
pub trait Progress {
    fn evaluations(&self) -> usize;
    fn improvements(&self) -> usize;
    fn visits(&self) -> usize;
    fn elapsed(&self) -> Duration;
    fn format(&self) -> String {
        let rate = self.evaluations() as f64 / self.elapsed().as_secs_f64().max(1e-3);
        row(self.evaluations(), self.improvements(), self.visits(), rate)
    }
    fn summary(&self) -> String {
        format!("search stopped\n{}", self.format())
    }
}

fn row(evaluations: usize, improvements: usize, visits: usize, rate: f64) -> String {
    format!(
        "{:<20}{:<20}{:<20}{:<20}",
        format!("evals {}", evaluations),
        format!("bests {}", improvements),
        format!("nodes {}", visits),
        format!("E/sec {:.1}", rate),
    )
}

/// Counters a planner accumulates while searching.
#[derive(Debug, Clone)]
pub struct Tally {
    evaluations: usize,
    improvements: usize,
    visits: usize,
    start: Instant,
    prior: (Instant, usize),
}

impl Default for Tally {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            evaluations: 0,
            improvements: 0,
            visits: 0,
            start: now,
            prior: (now, 0),
        }
    }
}

impl Tally {
    /// one more policy evaluated, expanding `visits` nodes
    pub fn evaluated(&mut self, visits: usize) {
        self.evaluations += 1;
        self.visits += visits;
    }
    pub fn improved(&mut self) {
        self.improvements += 1;
    }
    /// fold in counts gathered elsewhere, e.g. by parallel workers
    pub fn absorb(&mut self, evaluations: usize, visits: usize) {
        self.evaluations += evaluations;
        self.visits += visits;
    }

    /// Returns stats only if the log interval has elapsed.
    /// Reports interval rate (E/sec since last checkpoint) rather than cumulative.
    pub fn checkpoint(&mut self) -> Option<String> {
        if self.prior.0.elapsed() >= LOG_INTERVAL {
            let secs = self.prior.0.elapsed().as_secs().max(1) as f64;
            let rate = (self.evaluations - self.prior.1) as f64 / secs;
            self.prior = (Instant::now(), self.evaluations);
            Some(row(self.evaluations, self.improvements, self.visits, rate))
        } else {
            None
        }
    }
}

impl Progress for Tally {
    fn evaluations(&self) -> usize {
        self.evaluations
    }
    fn improvements(&self) -> usize {
        self.improvements
    }
    fn visits(&self) -> usize {
        self.visits
    }
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

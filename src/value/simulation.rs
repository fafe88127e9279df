use crate::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;

/// Monte Carlo estimate of a joint policy's discounted return.
///
/// Each run samples an initial state, then alternates policy actions with
/// sampled transitions and joint observations until the horizon. The RNG
/// is owned by the run and seeded explicitly, so reports are reproducible.
#[derive(Debug, Clone, Copy)]
pub struct Simulation {
    runs: usize,
    seed: u64,
}

/// Summary statistics over simulated returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Report {
    pub runs: usize,
    pub mean: Utility,
    /// sample standard deviation of one run's return
    pub deviation: Utility,
    /// standard error of the mean
    pub error: Utility,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SIMULATION_RUNS, 0)
    }
}

impl Simulation {
    pub fn new(runs: usize, seed: u64) -> Self {
        assert!(runs > 0, "simulation needs at least one run");
        Self { runs, seed }
    }

    pub fn run<M: DecisionProcess>(&self, model: &M, indexer: &Indexer, policy: &JointPolicy) -> anyhow::Result<Report> {
        let actions = policy.joint_actions(model, indexer)?;
        let ref mut rng = SmallRng::seed_from_u64(self.seed);
        let returns = (0..self.runs)
            .map(|_| self.episode(model, indexer, &actions, rng))
            .collect::<Vec<Utility>>();
        let n = returns.len() as Utility;
        let mean = returns.iter().sum::<Utility>() / n;
        let variance = if returns.len() > 1 {
            returns.iter().map(|r| (r - mean).powi(2)).sum::<Utility>() / (n - 1.)
        } else {
            0.
        };
        let report = Report {
            runs: self.runs,
            mean,
            deviation: variance.sqrt(),
            error: (variance / n).sqrt(),
        };
        log::debug!("{:<32}{}", "simulated policy", report);
        Ok(report)
    }

    fn episode<M: DecisionProcess>(&self, model: &M, indexer: &Indexer, actions: &[usize], rng: &mut SmallRng) -> Utility {
        let mut s = model.sample_initial(rng);
        let mut joh = indexer.root();
        let mut total = 0.;
        let mut weight = 1.;
        for stage in 0..indexer.horizon() {
            let ja = actions[joh];
            total += weight * model.reward(s, ja);
            weight *= model.discount();
            if stage + 1 < indexer.horizon() {
                let next = model.sample_successor(s, ja, rng);
                let jo = model.sample_observation(s, ja, next, rng);
                joh = indexer.successor(stage, joh, jo);
                s = next;
            }
        }
        total
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.4} ± {:.4} (σ {:.4}, {} runs)",
            self.mean, self.error, self.deviation, self.runs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agrees_with_exact_value() {
        let model = dectiger(Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 3).unwrap();
        let ref mut rng = SmallRng::seed_from_u64(9);
        let mut policy = JointPolicy::new(&model, &indexer);
        for _ in 0..3 {
            policy.randomize(rng);
            let exact = evaluate(&model, &indexer, &policy, Mode::Cached).unwrap();
            let report = Simulation::new(20_000, 1).run(&model, &indexer, &policy).unwrap();
            assert!((report.mean - exact).abs() < 5. * report.error + 1e-9);
        }
    }

    #[test]
    fn deterministic_returns_have_no_spread() {
        let model = dectiger(Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 4).unwrap();
        // always listening costs exactly 2 per stage
        let policy = JointPolicy::new(&model, &indexer);
        let report = Simulation::new(100, 0).run(&model, &indexer, &policy).unwrap();
        assert!(report.mean == -8.);
        assert!(report.deviation == 0.);
    }

    #[test]
    fn same_seed_same_report() {
        let model = dectiger(Storage::Sparse).unwrap();
        let indexer = Indexer::new(&model, 3).unwrap();
        let ref mut rng = SmallRng::seed_from_u64(2);
        let mut policy = JointPolicy::new(&model, &indexer);
        policy.randomize(rng);
        let a = Simulation::new(500, 77).run(&model, &indexer, &policy).unwrap();
        let b = Simulation::new(500, 77).run(&model, &indexer, &policy).unwrap();
        assert!(a == b);
    }
}

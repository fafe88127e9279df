use crate::*;

/// Exhaustive search over every pure joint policy.
///
/// Starting from the all-zero policy, each policy is evaluated exactly and
/// cloned into the incumbent when strictly better, until the enumeration
/// wraps around. The result is a global optimum, the first one in counting
/// order when several tie.
#[derive(Debug)]
pub struct BruteForce<'a, M: DecisionProcess> {
    model: &'a M,
    indexer: &'a Indexer,
    mode: Mode,
    cancel: Cancel,
    tally: Tally,
    best: Option<JointPolicy>,
    value: Utility,
}

impl<'a, M: DecisionProcess> BruteForce<'a, M> {
    pub fn new(model: &'a M, indexer: &'a Indexer) -> Self {
        Self {
            model,
            indexer,
            mode: Mode::recommended(model.states(), indexer.total()),
            cancel: Cancel::default(),
            tally: Tally::default(),
            best: None,
            value: Utility::NEG_INFINITY,
        }
    }
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
    pub fn with_cancel(mut self, cancel: Cancel) -> Self {
        self.cancel = cancel;
        self
    }

    fn start(&mut self) {
        self.tally = Tally::default();
        self.best = None;
        self.value = Utility::NEG_INFINITY;
        log::info!(
            "{:<32}{} joint policies, {} evaluation",
            "brute force",
            JointPolicy::new(self.model, self.indexer)
                .size()
                .map_or("too many".to_string(), |n| n.to_string()),
            self.mode
        );
    }

    fn finish(&self) {
        if self.cancel.is_cancelled() {
            log::warn!("brute force cancelled before exhausting the policy space");
        }
        log::info!("{}", self.tally.summary());
        log::info!("{:<32}{:.6}", "best value", self.value);
    }
}

impl<'a, M: DecisionProcess> Planner for BruteForce<'a, M> {
    fn plan(&mut self) -> anyhow::Result<()> {
        self.start();
        let mut evaluator = Evaluator::new(self.model, self.indexer, self.mode);
        let mut policy = JointPolicy::new(self.model, self.indexer);
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let value = evaluator.evaluate(&policy)?;
            self.tally.evaluated(evaluator.visits());
            if value > self.value {
                log::debug!("{:<32}{:.6}", "new incumbent", value);
                self.value = value;
                self.best = Some(policy.clone());
                self.tally.improved();
            }
            if let Some(line) = self.tally.checkpoint() {
                log::info!("{}", line);
            }
            if policy.increment() {
                break;
            }
        }
        self.finish();
        Ok(())
    }
    fn expected_reward(&self) -> Utility {
        self.value
    }
    fn joint_policy(&self) -> Option<&JointPolicy> {
        self.best.as_ref()
    }
    fn tally(&self) -> &Tally {
        &self.tally
    }
}

#[cfg(feature = "parallel")]
impl<'a, M: DecisionProcess + Sync> BruteForce<'a, M> {
    /// Same search as `plan()`, with the policy index range split across
    /// rayon workers. Each worker owns its policy and evaluator. Ties go to
    /// the lowest index, so the result matches the sequential search.
    pub fn plan_parallel(&mut self) -> anyhow::Result<()> {
        use rayon::prelude::*;
        self.start();
        let template = JointPolicy::new(self.model, self.indexer);
        let size = template
            .size()
            .ok_or_else(|| anyhow::anyhow!("joint policy space too large to enumerate"))?;
        let chunks = (rayon::current_num_threads() as u128 * 4).min(size);
        let (model, indexer, mode) = (self.model, self.indexer, self.mode);
        let cancel = &self.cancel;
        let template = &template;
        let results = (0..chunks as usize)
            .into_par_iter()
            .map(|chunk| -> anyhow::Result<Shard> {
                let chunk = chunk as u128;
                let start = chunk * (size / chunks) + chunk.min(size % chunks);
                let end = start + size / chunks + (chunk < size % chunks) as u128;
                let mut policy = template.clone();
                policy.set_index(start);
                let mut evaluator = Evaluator::new(model, indexer, mode);
                let mut shard = Shard::default();
                for index in start..end {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let value = evaluator.evaluate(&policy)?;
                    shard.evaluations += 1;
                    shard.visits += evaluator.visits();
                    if value > shard.value {
                        shard.value = value;
                        shard.index = Some(index);
                    }
                    policy.increment();
                }
                Ok(shard)
            })
            .collect::<anyhow::Result<Vec<Shard>>>()?;
        for shard in results {
            self.tally.absorb(shard.evaluations, shard.visits);
            if let Some(index) = shard.index.filter(|_| shard.value > self.value) {
                let mut policy = template.clone();
                policy.set_index(index);
                self.value = shard.value;
                self.best = Some(policy);
                self.tally.improved();
            }
        }
        self.finish();
        Ok(())
    }
}

/// best policy of one parallel worker
#[cfg(feature = "parallel")]
struct Shard {
    value: Utility,
    index: Option<u128>,
    evaluations: usize,
    visits: usize,
}

#[cfg(feature = "parallel")]
impl Default for Shard {
    fn default() -> Self {
        Self {
            value: Utility::NEG_INFINITY,
            index: None,
            evaluations: 0,
            visits: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn dectiger_horizon_two() {
        let model = dectiger(Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 2).unwrap();
        let mut planner = BruteForce::new(&model, &indexer);
        planner.plan().unwrap();
        assert!((planner.expected_reward() + 4.).abs() < 1e-9);
        assert!(planner.tally().evaluations() == 729);
        let policy = planner.joint_policy().unwrap();
        let value = evaluate(&model, &indexer, policy, Mode::Uncached).unwrap();
        assert!((value - planner.expected_reward()).abs() < 1e-12);
    }

    /// listen twice, then open the door opposite a side heard twice
    fn listen_then_open(model: &DecPomdp, indexer: &Indexer) -> JointPolicy {
        let mut policy = JointPolicy::new(model, indexer);
        for agent in 0..2 {
            let local = indexer.local(agent);
            for oh in 0..local.total() {
                let action = match local.sequence(oh).as_slice() {
                    [0, 0] => 2,
                    [1, 1] => 1,
                    _ => 0,
                };
                policy.set(agent, oh, action);
            }
        }
        policy
    }

    #[test]
    fn dectiger_horizon_three_optimum_value() {
        let model = dectiger(Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 3).unwrap();
        let policy = listen_then_open(&model, &indexer);
        let value = evaluate(&model, &indexer, &policy, Mode::Cached).unwrap();
        assert!((value - 5.1908125).abs() < 1e-9);
    }

    #[test]
    #[cfg_attr(debug_assertions, ignore = "enumerates 3^14 joint policies, run with --release")]
    fn dectiger_horizon_three() {
        let model = dectiger(Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 3).unwrap();
        let mut planner = BruteForce::new(&model, &indexer);
        #[cfg(feature = "parallel")]
        planner.plan_parallel().unwrap();
        #[cfg(not(feature = "parallel"))]
        planner.plan().unwrap();
        assert!((planner.expected_reward() - 5.1908125).abs() < 1e-9);
        let optimum = listen_then_open(&model, &indexer);
        let value = evaluate(&model, &indexer, &optimum, Mode::Cached).unwrap();
        assert!((planner.expected_reward() - value).abs() < 1e-9);
    }

    #[test]
    fn optimum_dominates_random_policies() {
        let ref mut rng = SmallRng::seed_from_u64(17);
        let shape = Shape {
            states: 2,
            actions: 2,
            observations: 2,
            ..Shape::default()
        };
        let model = random(rng, &shape, Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 2).unwrap();
        let mut planner = BruteForce::new(&model, &indexer).with_mode(Mode::Uncached);
        planner.plan().unwrap();
        let mut policy = JointPolicy::new(&model, &indexer);
        for _ in 0..50 {
            policy.randomize(rng);
            let value = evaluate(&model, &indexer, &policy, Mode::Cached).unwrap();
            assert!(value <= planner.expected_reward() + 1e-9);
        }
    }

    #[test]
    fn cancelled_search_keeps_nothing() {
        let model = dectiger(Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 2).unwrap();
        let cancel = Cancel::new();
        cancel.cancel();
        let mut planner = BruteForce::new(&model, &indexer).with_cancel(cancel);
        planner.plan().unwrap();
        assert!(planner.joint_policy().is_none());
        assert!(planner.expected_reward() == Utility::NEG_INFINITY);
        assert!(planner.tally().evaluations() == 0);
    }

    #[test]
    #[cfg(feature = "parallel")]
    fn parallel_matches_sequential() {
        let ref mut rng = SmallRng::seed_from_u64(23);
        let model = random(rng, &Shape::default(), Storage::Sparse).unwrap();
        let indexer = Indexer::new(&model, 2).unwrap();
        let mut sequential = BruteForce::new(&model, &indexer);
        let mut parallel = BruteForce::new(&model, &indexer);
        sequential.plan().unwrap();
        parallel.plan_parallel().unwrap();
        assert!(sequential.expected_reward() == parallel.expected_reward());
        assert!(sequential.joint_policy() == parallel.joint_policy());
        assert!(sequential.tally().evaluations() == parallel.tally().evaluations());
    }
}

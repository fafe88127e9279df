use crate::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// How one agent's best response is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Response {
    /// enumerate every policy of the agent
    Exhaustive,
    /// dynamic programming over augmented beliefs
    Dynamic,
}

/// Joint Equilibrium-based Search for Policies.
///
/// From a random joint policy, agents take turns replacing their policy by
/// a best response to the others. The incumbent only changes when a best
/// response beats it by more than `EPSILON`, so the value never decreases
/// and the search stops at a Nash equilibrium: once every agent in a row
/// failed to improve, or after `MAX_ITERATIONS` best responses.
#[derive(Debug)]
pub struct Jesp<'a, M: DecisionProcess> {
    pub(super) model: &'a M,
    pub(super) indexer: &'a Indexer,
    pub(super) mode: Mode,
    pub(super) cancel: Cancel,
    pub(super) tally: Tally,
    pub(super) response: Response,
    seed: u64,
    best: Option<JointPolicy>,
    value: Utility,
    trace: Vec<Utility>,
}

impl<'a, M: DecisionProcess> Jesp<'a, M> {
    pub fn new(model: &'a M, indexer: &'a Indexer, seed: u64) -> Self {
        Self {
            model,
            indexer,
            mode: Mode::recommended(model.states(), indexer.total()),
            cancel: Cancel::default(),
            tally: Tally::default(),
            response: Response::Exhaustive,
            seed,
            best: None,
            value: Utility::NEG_INFINITY,
            trace: Vec::new(),
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

    /// incumbent value after each best response
    pub fn trace(&self) -> &[Utility] {
        &self.trace
    }

    /// consecutive non-improving best responses that prove an equilibrium.
    /// a dynamic best response is exact, so the agent that last improved
    /// needs no second look.
    fn patience(&self) -> usize {
        match self.response {
            Response::Exhaustive => self.model.agents(),
            Response::Dynamic => self.model.agents().saturating_sub(1).max(1),
        }
    }

    /// Exhaustive best response of `agent` against the rest of `policy`.
    ///
    /// Enumerates the agent's policies from zero and keeps a candidate only
    /// when it beats the previous one by more than `EPSILON`.
    pub(super) fn exhaustive(
        &mut self,
        evaluator: &mut Evaluator<'a, M>,
        policy: &JointPolicy,
        agent: Agent,
    ) -> anyhow::Result<(JointPolicy, Utility)> {
        let mut candidate = policy.clone();
        candidate.zero(agent);
        let mut best = (candidate.clone(), Utility::NEG_INFINITY);
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let value = evaluator.evaluate(&candidate)?;
            self.tally.evaluated(evaluator.visits());
            if value > best.1 + EPSILON {
                best = (candidate.clone(), value);
            }
            if let Some(line) = self.tally.checkpoint() {
                log::info!("{}", line);
            }
            if candidate.increment_agent(agent) {
                break;
            }
        }
        Ok(best)
    }
}

impl<'a, M: DecisionProcess> Planner for Jesp<'a, M> {
    fn plan(&mut self) -> anyhow::Result<()> {
        self.tally = Tally::default();
        self.trace.clear();
        let ref mut rng = SmallRng::seed_from_u64(self.seed);
        let mut evaluator = Evaluator::new(self.model, self.indexer, self.mode);
        let mut policy = JointPolicy::new(self.model, self.indexer);
        policy.randomize(rng);
        let mut value = evaluator.evaluate(&policy)?;
        self.tally.evaluated(evaluator.visits());
        log::info!(
            "{:<32}seed {}, {:?} best responses, initial value {:.6}",
            "jesp",
            self.seed,
            self.response,
            value
        );
        let agents = self.model.agents();
        let patience = self.patience();
        let mut stale = 0;
        for iteration in 0..MAX_ITERATIONS {
            if self.cancel.is_cancelled() {
                log::warn!("jesp cancelled after {} best responses", iteration);
                break;
            }
            let agent = iteration % agents;
            let (candidate, v) = match self.response {
                Response::Exhaustive => self.exhaustive(&mut evaluator, &policy, agent)?,
                Response::Dynamic => self.dynamic(&mut evaluator, &policy, agent)?,
            };
            if v > value + EPSILON {
                log::debug!("{:<32}agent {} improves to {:.6}", "best response", agent, v);
                value = v;
                policy = candidate;
                stale = 0;
                self.tally.improved();
            } else {
                stale += 1;
            }
            self.trace.push(value);
            if stale >= patience && iteration + 1 >= agents {
                log::debug!("{:<32}after {} best responses", "equilibrium", iteration + 1);
                break;
            }
        }
        self.best = Some(policy);
        self.value = value;
        log::info!("{}", self.tally.summary());
        log::info!("{:<32}{:.6}", "best value", self.value);
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

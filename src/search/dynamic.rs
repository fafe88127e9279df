use super::jesp::Response;
use crate::*;

/// JESP with best responses by dynamic programming.
///
/// With the other agents fixed, the state together with their histories
/// is a hidden state the responding agent tracks as a [`Belief`]. The best
/// response maximizes over actions at each of its own histories and sums
/// over its own observations, which visits the agent's history tree once
/// per action instead of enumerating all of its policies.
#[derive(Debug)]
pub struct JespDp<'a, M: DecisionProcess>(Jesp<'a, M>);

impl<'a, M: DecisionProcess> JespDp<'a, M> {
    pub fn new(model: &'a M, indexer: &'a Indexer, seed: u64) -> Self {
        let mut jesp = Jesp::new(model, indexer, seed);
        jesp.response = Response::Dynamic;
        Self(jesp)
    }
    pub fn with_mode(self, mode: Mode) -> Self {
        Self(self.0.with_mode(mode))
    }
    pub fn with_cancel(self, cancel: Cancel) -> Self {
        Self(self.0.with_cancel(cancel))
    }
    pub fn trace(&self) -> &[Utility] {
        self.0.trace()
    }
}

impl<'a, M: DecisionProcess> Planner for JespDp<'a, M> {
    fn plan(&mut self) -> anyhow::Result<()> {
        self.0.plan()
    }
    fn expected_reward(&self) -> Utility {
        self.0.expected_reward()
    }
    fn joint_policy(&self) -> Option<&JointPolicy> {
        self.0.joint_policy()
    }
    fn tally(&self) -> &Tally {
        self.0.tally()
    }
}

impl<'a, M: DecisionProcess> Jesp<'a, M> {
    /// Best response of `agent` by belief-space DP, written into a copy of
    /// `policy`. Histories the agent cannot reach keep their old action.
    /// The returned value is the exact evaluation of the new policy.
    pub(super) fn dynamic(
        &mut self,
        evaluator: &mut Evaluator<'a, M>,
        policy: &JointPolicy,
        agent: Agent,
    ) -> anyhow::Result<(JointPolicy, Utility)> {
        policy.check(self.model, self.indexer)?;
        let ref root = Belief::initial(self.model, agent);
        let mut plan = Vec::new();
        let estimate = self.respond(policy, root, 0, &mut plan);
        let mut candidate = policy.clone();
        for (oh, a) in plan {
            candidate.set(agent, oh, a);
        }
        let value = evaluator.evaluate(&candidate)?;
        self.tally.evaluated(evaluator.visits());
        log::debug!(
            "{:<32}agent {} dp {:.6} exact {:.6}",
            "dynamic best response",
            agent,
            estimate,
            value
        );
        Ok((candidate, value))
    }

    /// best value reachable from `belief` at the agent's history `oh`,
    /// appending the chosen (history, action) pairs of the subtree to `plan`
    fn respond(&self, policy: &JointPolicy, belief: &Belief, oh: usize, plan: &mut Vec<(usize, usize)>) -> Utility {
        let agent = belief.agent();
        let stage = belief.stage();
        let local = self.indexer.local(agent);
        let mut best = (Utility::NEG_INFINITY, Vec::new());
        for a in 0..self.model.n_actions(agent) {
            let mut value = belief.reward(self.model, policy, a);
            let mut subplan = vec![(oh, a)];
            if stage + 1 < self.indexer.horizon() {
                for (o, (p, next)) in belief
                    .branch(self.model, self.indexer, policy, a)
                    .into_iter()
                    .enumerate()
                {
                    if p > 0. {
                        let child = local.extend(stage, oh, o);
                        value += p * self.respond(policy, &next, child, &mut subplan);
                    }
                }
            }
            if value > best.0 {
                best = (value, subplan);
            }
        }
        plan.extend(best.1);
        best.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn matches_exhaustive_best_response() {
        let ref mut rng = SmallRng::seed_from_u64(31);
        let tiger = dectiger(Storage::Dense).unwrap();
        let other = random(rng, &Shape::default(), Storage::Sparse).unwrap();
        for model in [&tiger, &other] {
            let indexer = Indexer::new(model, 3).unwrap();
            let mut jesp = Jesp::new(model, &indexer, 0);
            let mut evaluator = Evaluator::new(model, &indexer, Mode::Cached);
            let mut policy = JointPolicy::new(model, &indexer);
            for _ in 0..4 {
                policy.randomize(rng);
                for agent in 0..2 {
                    let (_, exhaustive) = jesp.exhaustive(&mut evaluator, &policy, agent).unwrap();
                    let (_, dynamic) = jesp.dynamic(&mut evaluator, &policy, agent).unwrap();
                    assert!((exhaustive - dynamic).abs() < 1e-6);
                }
            }
        }
    }

    /// two agents guessing a hidden bit. each sees, with 90% accuracy,
    /// whether the bit flipped during the last step.
    fn flips() -> DecPomdp {
        let mut builder = DecPomdpBuilder::new("flips", 2, vec![2, 2], vec![2, 2])
            .initial(0, 0.7)
            .initial(1, 0.3)
            .event_driven(Storage::Sparse);
        let observations = builder.observations().clone();
        for s in 0..2 {
            for ja in 0..4 {
                let stay = if ja == 0 { 0.9 } else { 0.6 };
                builder.set_transition(s, ja, s, stay);
                builder.set_transition(s, ja, 1 - s, 1. - stay);
                let guesses = builder.actions().split(ja);
                let reward = guesses.iter().map(|g| if *g == s { 1. } else { -1. }).sum::<Utility>();
                builder.set_reward(s, ja, reward);
                for next in 0..2 {
                    let flipped = (s != next) as usize;
                    for jo in 0..observations.total() {
                        let p = observations
                            .split(jo)
                            .iter()
                            .map(|o| if *o == flipped { 0.9 } else { 0.1 })
                            .product::<Probability>();
                        builder.set_observation_event(s, ja, next, jo, p);
                    }
                }
            }
        }
        builder.build().unwrap()
    }

    #[test]
    fn event_driven_model() {
        let model = flips();
        let indexer = Indexer::new(&model, 3).unwrap();
        let ref mut rng = SmallRng::seed_from_u64(13);
        let mut jesp = Jesp::new(&model, &indexer, 0);
        let mut cached = Evaluator::new(&model, &indexer, Mode::Cached);
        let mut uncached = Evaluator::new(&model, &indexer, Mode::Uncached);
        let mut policy = JointPolicy::new(&model, &indexer);
        for _ in 0..4 {
            policy.randomize(rng);
            let exact = cached.evaluate(&policy).unwrap();
            assert!((exact - uncached.evaluate(&policy).unwrap()).abs() < 1e-9);
            let report = Simulation::new(20_000, 4).run(&model, &indexer, &policy).unwrap();
            assert!((report.mean - exact).abs() < 5. * report.error + 1e-9);
            for agent in 0..2 {
                let (_, exhaustive) = jesp.exhaustive(&mut cached, &policy, agent).unwrap();
                let (_, dynamic) = jesp.dynamic(&mut cached, &policy, agent).unwrap();
                assert!((exhaustive - dynamic).abs() < 1e-6);
            }
        }
        let mut optimum = BruteForce::new(&model, &indexer);
        optimum.plan().unwrap();
        let mut planner = JespDp::new(&model, &indexer, 1);
        planner.plan().unwrap();
        let policy = planner.joint_policy().unwrap();
        let exact = evaluate(&model, &indexer, policy, Mode::Uncached).unwrap();
        assert!((exact - planner.expected_reward()).abs() < 1e-9);
        assert!(planner.expected_reward() <= optimum.expected_reward() + 1e-9);
    }

    #[test]
    fn dp_estimate_is_exact() {
        let model = dectiger(Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 3).unwrap();
        let ref mut rng = SmallRng::seed_from_u64(8);
        let mut policy = JointPolicy::new(&model, &indexer);
        policy.randomize(rng);
        let jesp = Jesp::new(&model, &indexer, 0);
        let mut plan = Vec::new();
        let estimate = jesp.respond(&policy, &Belief::initial(&model, 1), 0, &mut plan);
        let mut candidate = policy.clone();
        plan.into_iter().for_each(|(oh, a)| candidate.set(1, oh, a));
        let exact = evaluate(&model, &indexer, &candidate, Mode::Cached).unwrap();
        assert!((estimate - exact).abs() < 1e-9);
    }

    #[test]
    fn settles_on_an_exactly_evaluated_policy() {
        let model = dectiger(Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 2).unwrap();
        for seed in 0..5 {
            let mut planner = JespDp::new(&model, &indexer, seed);
            planner.plan().unwrap();
            assert!(planner.trace().windows(2).all(|w| w[0] <= w[1]));
            let policy = planner.joint_policy().unwrap();
            let exact = evaluate(&model, &indexer, policy, Mode::Cached).unwrap();
            assert!((exact - planner.expected_reward()).abs() < 1e-9);
            assert!(planner.expected_reward() <= -4. + 1e-9);
        }
    }
}

use crate::*;
use std::collections::BTreeMap;

/// Augmented belief of one agent facing fixed policies of the others.
///
/// A distribution over pairs `(s, ohs)` where `ohs` holds the current
/// history of every other agent; the slot of the believing agent is kept at
/// zero. Given the others' policies these pairs make the problem a POMDP
/// for the believing agent, so its best response is a belief-space DP.
#[derive(Debug, Clone, PartialEq)]
pub struct Belief {
    agent: Agent,
    stage: Stage,
    mass: BTreeMap<(usize, Vec<usize>), Probability>,
}

impl Belief {
    /// b0 over states, every agent at its empty history
    pub fn initial<M: DecisionProcess>(model: &M, agent: Agent) -> Self {
        let mass = (0..model.states())
            .map(|s| (s, model.initial(s)))
            .filter(|(_, p)| *p > 0.)
            .map(|(s, p)| ((s, vec![0; model.agents()]), p))
            .collect();
        Self {
            agent,
            stage: 0,
            mass,
        }
    }

    pub fn agent(&self) -> Agent {
        self.agent
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    pub fn len(&self) -> usize {
        self.mass.len()
    }
    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }
    pub fn probability(&self, s: usize, ohs: &[usize]) -> Probability {
        self.mass
            .get(&(s, ohs.to_vec()))
            .copied()
            .unwrap_or_default()
    }
    pub fn total(&self) -> Probability {
        self.mass.values().sum()
    }

    /// expected immediate reward when the believing agent plays `a`
    pub fn reward<M: DecisionProcess>(&self, model: &M, policy: &JointPolicy, a: usize) -> Utility {
        self.mass
            .iter()
            .map(|((s, ohs), p)| p * model.reward(*s, self.joint_action(model, policy, a, ohs)))
            .sum()
    }

    /// Successor beliefs after playing `a`, one per own observation.
    ///
    /// B'(s', ohs') ∝ Σ B(s, ohs) T(s, ja, s') O(ja, s', jo) over the joint
    /// observations `jo` whose own component is `o`. Each entry carries
    /// P(o | B, a), the normalizer. Impossible observations come back with
    /// probability zero and an empty belief.
    pub fn branch<M: DecisionProcess>(
        &self,
        model: &M,
        indexer: &Indexer,
        policy: &JointPolicy,
        a: usize,
    ) -> Vec<(Probability, Belief)> {
        let space = model.observations();
        let mut next = (0..model.n_observations(self.agent))
            .map(|_| BTreeMap::<(usize, Vec<usize>), Probability>::new())
            .collect::<Vec<_>>();
        for ((s, ohs), p) in self.mass.iter() {
            let ja = self.joint_action(model, policy, a, ohs);
            for (succ, t) in model.successors(*s, ja) {
                for (jo, q) in model.emissions(*s, ja, succ) {
                    let os = space.split(jo);
                    let histories = ohs
                        .iter()
                        .zip(os.iter())
                        .enumerate()
                        .map(|(j, (oh, o))| {
                            if j == self.agent {
                                0
                            } else {
                                indexer.local(j).extend(self.stage, *oh, *o)
                            }
                        })
                        .collect::<Vec<_>>();
                    *next[os[self.agent]].entry((succ, histories)).or_default() += p * t * q;
                }
            }
        }
        next.into_iter()
            .map(|mass| {
                let total = mass.values().sum::<Probability>();
                let mass = if total > 0. {
                    mass.into_iter().map(|(k, p)| (k, p / total)).collect()
                } else {
                    BTreeMap::new()
                };
                let belief = Self {
                    agent: self.agent,
                    stage: self.stage + 1,
                    mass,
                };
                (total, belief)
            })
            .collect()
    }

    fn joint_action<M: DecisionProcess>(&self, model: &M, policy: &JointPolicy, a: usize, ohs: &[usize]) -> usize {
        let actions = ohs
            .iter()
            .enumerate()
            .map(|(j, oh)| if j == self.agent { a } else { policy.action(j, *oh) })
            .collect::<Vec<_>>();
        model.actions().joint(&actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listening_sharpens_the_tiger_belief() {
        let model = dectiger(Storage::Dense).unwrap();
        let indexer = Indexer::new(&model, 2).unwrap();
        let policy = JointPolicy::new(&model, &indexer);
        let belief = Belief::initial(&model, 0);
        assert!(belief.len() == 2);
        assert!(belief.reward(&model, &policy, 0) == -2.);
        let branches = belief.branch(&model, &indexer, &policy, 0);
        assert!(branches.len() == 2);
        let (p, heard) = &branches[0];
        assert!((p - 0.5).abs() < 1e-12);
        assert!((heard.total() - 1.).abs() < 1e-12);
        // hearing left puts 0.85 on the tiger being left
        let left = (0..2).map(|oh| heard.probability(0, &[0, 1 + oh])).sum::<Probability>();
        assert!((left - 0.85).abs() < 1e-12);
        assert!(heard.stage() == 1);
    }

    #[test]
    fn observation_probabilities_sum_to_one() {
        let model = dectiger(Storage::Sparse).unwrap();
        let indexer = Indexer::new(&model, 3).unwrap();
        let policy = JointPolicy::new(&model, &indexer);
        let belief = Belief::initial(&model, 1);
        for a in 0..3 {
            let total = belief
                .branch(&model, &indexer, &policy, a)
                .iter()
                .map(|(p, _)| p)
                .sum::<Probability>();
            assert!((total - 1.).abs() < 1e-12);
        }
    }
}

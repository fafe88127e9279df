use crate::*;
use rand::Rng;
use serde::Serialize;

/// Pure joint policy: one [`Individual`] per agent.
///
/// Enumeration order treats the agents as digits of one big odometer, the
/// last agent least significant, so `index()` counts `increment()` calls
/// from the all-zero policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JointPolicy {
    agents: Vec<Individual>,
    #[serde(skip)]
    histories: Vec<Local>,
}

impl JointPolicy {
    /// the all-zero joint policy for a model at the indexer's horizon
    pub fn new<M: DecisionProcess>(model: &M, indexer: &Indexer) -> Self {
        let histories = (0..indexer.agents())
            .map(|agent| indexer.local(agent).clone())
            .collect::<Vec<_>>();
        let agents = histories
            .iter()
            .enumerate()
            .map(|(agent, local)| Individual::new(model.n_actions(agent), local.total()))
            .collect();
        Self { agents, histories }
    }

    pub fn agents(&self) -> usize {
        self.agents.len()
    }
    pub fn individual(&self, agent: Agent) -> &Individual {
        &self.agents[agent]
    }

    pub fn action(&self, agent: Agent, oh: usize) -> usize {
        self.agents[agent].action(oh)
    }
    pub fn set(&mut self, agent: Agent, oh: usize, a: usize) {
        self.agents[agent].set(oh, a)
    }

    /// advance to the next joint policy. true exactly when every agent
    /// rolled back to its zero policy.
    pub fn increment(&mut self) -> bool {
        for policy in self.agents.iter_mut().rev() {
            if !policy.increment() {
                return false;
            }
        }
        true
    }
    /// advance one agent while the others stay fixed
    pub fn increment_agent(&mut self, agent: Agent) -> bool {
        self.agents[agent].increment()
    }

    pub fn zero(&mut self, agent: Agent) {
        self.agents[agent].zero()
    }
    pub fn zeros(&mut self) {
        self.agents.iter_mut().for_each(Individual::zero)
    }
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        self.agents.iter_mut().for_each(|policy| policy.randomize(rng))
    }
    pub fn randomize_agent(&mut self, agent: Agent, rng: &mut impl Rng) {
        self.agents[agent].randomize(rng)
    }

    /// number of joint policies, `None` past u128
    pub fn size(&self) -> Option<u128> {
        self.agents
            .iter()
            .try_fold(1u128, |size, policy| size.checked_mul(policy.size()?))
    }
    pub fn index(&self) -> Option<u128> {
        self.agents.iter().try_fold(0u128, |index, policy| {
            index.checked_mul(policy.size()?)?.checked_add(policy.index()?)
        })
    }
    pub fn set_index(&mut self, mut index: u128) {
        for policy in self.agents.iter_mut().rev() {
            let Some(size) = policy.size() else {
                panic!("joint policy space too large to index");
            };
            policy.set_index(index % size);
            index /= size;
        }
        assert!(index == 0, "joint policy index out of range");
    }

    /// Joint action prescribed at joint history `joh`.
    ///
    /// Fails when the policy was built for another model or horizon: a
    /// missing agent, an uncovered history, or an action the model does not
    /// have.
    pub fn joint_action<M: DecisionProcess>(&self, model: &M, indexer: &Indexer, joh: usize) -> anyhow::Result<usize> {
        if self.agents() != indexer.agents() || self.agents() != model.agents() {
            anyhow::bail!(
                "policy for {} agents used with a {}-agent model",
                self.agents(),
                model.agents()
            );
        }
        let mut actions = Vec::with_capacity(self.agents());
        for (agent, oh) in indexer.locals(joh).iter().enumerate() {
            let policy = &self.agents[agent];
            if *oh >= policy.histories() {
                anyhow::bail!(
                    "policy of agent {} covers {} histories, history {} is reachable",
                    agent,
                    policy.histories(),
                    oh
                );
            }
            let a = policy.action(*oh);
            if a >= model.n_actions(agent) {
                anyhow::bail!(
                    "policy of agent {} takes action {} but the model has {}",
                    agent,
                    a,
                    model.n_actions(agent)
                );
            }
            actions.push(a);
        }
        Ok(model.actions().joint(&actions))
    }

    /// joint action for every joint history of the indexer's horizon
    pub fn joint_actions<M: DecisionProcess>(&self, model: &M, indexer: &Indexer) -> anyhow::Result<Vec<usize>> {
        (0..indexer.total())
            .map(|joh| self.joint_action(model, indexer, joh))
            .collect()
    }

    /// verify that the policy covers every reachable history of the model
    pub fn check<M: DecisionProcess>(&self, model: &M, indexer: &Indexer) -> anyhow::Result<()> {
        if self.agents() != model.agents() {
            anyhow::bail!(
                "policy for {} agents used with a {}-agent model",
                self.agents(),
                model.agents()
            );
        }
        for (agent, policy) in self.agents.iter().enumerate() {
            let needed = indexer.local(agent).total();
            if policy.histories() < needed {
                anyhow::bail!(
                    "policy of agent {} covers {} histories, horizon {} needs {}",
                    agent,
                    policy.histories(),
                    indexer.horizon(),
                    needed
                );
            }
            if let Some(a) = policy.actions().iter().find(|a| **a >= model.n_actions(agent)) {
                anyhow::bail!(
                    "policy of agent {} takes action {} but the model has {}",
                    agent,
                    a,
                    model.n_actions(agent)
                );
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for JointPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (agent, (policy, local)) in self.agents.iter().zip(self.histories.iter()).enumerate() {
            writeln!(f, "agent {}", agent)?;
            for stage in 0..local.horizon() {
                let actions = (local.first(stage)..local.first(stage) + local.count(stage))
                    .map(|oh| policy.action(oh).to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                writeln!(f, "  stage {:<4}{}", stage, actions)?;
            }
        }
        Ok(())
    }
}

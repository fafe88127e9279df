use super::*;
use crate::*;

/// Joint observation history indexing for a model and horizon.
///
/// Joint histories use the same stage-major numbering as [`Local`] with
/// branching |JO|. Each joint history also carries the per-agent history
/// indices it decomposes into, precomputed once at construction so that
/// policy lookups during evaluation are a table read.
#[derive(Debug, Clone)]
pub struct Indexer {
    joint: Local,
    agents: Vec<Local>,
    observations: Space,
    locals: Vec<usize>,
}

impl Indexer {
    pub fn new<M: DecisionProcess>(model: &M, horizon: usize) -> anyhow::Result<Self> {
        let observations = model.observations().clone();
        let joint = Local::new(observations.total(), horizon)?;
        let agents = observations
            .sizes()
            .iter()
            .map(|n| Local::new(*n, horizon))
            .collect::<anyhow::Result<Vec<Local>>>()?;
        let n = agents.len();
        let size = joint.total().checked_mul(n).ok_or_else(|| {
            anyhow::anyhow!("history table overflows at horizon {}", horizon)
        })?;
        let mut locals = vec![0; size];
        for stage in 0..horizon - 1 {
            for joh in joint.first(stage)..joint.first(stage) + joint.count(stage) {
                for jo in 0..observations.total() {
                    let next = joint.extend(stage, joh, jo);
                    for (agent, local) in agents.iter().enumerate() {
                        let oh = locals[joh * n + agent];
                        let o = observations.component(jo, agent);
                        locals[next * n + agent] = local.extend(stage, oh, o);
                    }
                }
            }
        }
        log::debug!(
            "{:<32}{} joint, {:?} individual",
            "indexed histories",
            joint.total(),
            agents.iter().map(Local::total).collect::<Vec<_>>()
        );
        Ok(Self {
            joint,
            agents,
            observations,
            locals,
        })
    }

    pub fn horizon(&self) -> usize {
        self.joint.horizon()
    }
    pub fn agents(&self) -> usize {
        self.agents.len()
    }
    pub fn root(&self) -> usize {
        0
    }

    /// joint history reached from `joh` at `stage` after observing `jo`
    pub fn successor(&self, stage: Stage, joh: usize, jo: usize) -> usize {
        self.joint.extend(stage, joh, jo)
    }
    pub fn count(&self, stage: Stage) -> usize {
        self.joint.count(stage)
    }
    pub fn first(&self, stage: Stage) -> usize {
        self.joint.first(stage)
    }
    pub fn total(&self) -> usize {
        self.joint.total()
    }
    pub fn stage(&self, joh: usize) -> Stage {
        self.joint.stage(joh)
    }
    /// joint histories of length `stage`
    pub fn histories(&self, stage: Stage) -> std::ops::Range<usize> {
        self.first(stage)..self.first(stage) + self.count(stage)
    }

    /// per-agent history indices of `joh`
    pub fn locals(&self, joh: usize) -> &[usize] {
        assert!(joh < self.total(), "joint history {} out of range {}", joh, self.total());
        let n = self.agents();
        &self.locals[joh * n..(joh + 1) * n]
    }

    /// the joint history whose agents hold the histories `ohs`, all of
    /// length `stage`
    pub fn joint(&self, stage: Stage, ohs: &[usize]) -> usize {
        assert!(ohs.len() == self.agents(), "expected {} histories", self.agents());
        let sequences = ohs
            .iter()
            .zip(self.agents.iter())
            .map(|(oh, local)| {
                assert!(local.stage(*oh) == stage, "history {} is not at stage {}", oh, stage);
                local.sequence(*oh)
            })
            .collect::<Vec<_>>();
        let joint = (0..stage)
            .map(|k| {
                let os = sequences.iter().map(|seq| seq[k]).collect::<Vec<_>>();
                self.observations.joint(&os)
            })
            .collect::<Vec<_>>();
        self.joint.index(&joint)
    }

    pub fn local(&self, agent: Agent) -> &Local {
        &self.agents[agent]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiger(horizon: usize) -> Indexer {
        let model = dectiger(Storage::Dense).unwrap();
        Indexer::new(&model, horizon).unwrap()
    }

    #[test]
    fn joint_counts() {
        let indexer = tiger(3);
        assert!(indexer.count(0) == 1);
        assert!(indexer.count(1) == 4);
        assert!(indexer.count(2) == 16);
        assert!(indexer.total() == 21);
        assert!(indexer.histories(1) == (1..5));
    }

    #[test]
    fn successor_is_a_bijection_onto_the_next_stage() {
        let indexer = tiger(4);
        for stage in 0..3 {
            let mut children = indexer
                .histories(stage)
                .flat_map(|joh| (0..4).map(move |jo| (joh, jo)))
                .map(|(joh, jo)| indexer.successor(stage, joh, jo))
                .collect::<Vec<_>>();
            children.sort();
            assert!(children == indexer.histories(stage + 1).collect::<Vec<_>>());
        }
    }

    #[test]
    fn locals_follow_individual_observations() {
        let indexer = tiger(3);
        // jo = 1 is (hear-left, hear-right)
        let joh = indexer.successor(0, indexer.root(), 1);
        assert!(indexer.locals(joh).to_vec() == vec![indexer.local(0).successor(0, 0), indexer.local(1).successor(0, 1)]);
        let joh = indexer.successor(1, joh, 2);
        let first = indexer.local(0).successor(indexer.local(0).successor(0, 0), 1);
        let second = indexer.local(1).successor(indexer.local(1).successor(0, 1), 0);
        assert!(indexer.locals(joh).to_vec() == vec![first, second]);
    }

    #[test]
    fn joint_inverts_locals() {
        let indexer = tiger(3);
        for stage in 0..3 {
            for joh in indexer.histories(stage) {
                assert!(indexer.joint(stage, indexer.locals(joh)) == joh);
            }
        }
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let model = dectiger(Storage::Dense).unwrap();
        assert!(Indexer::new(&model, 0).is_err());
    }

    #[test]
    #[should_panic]
    fn successor_beyond_horizon() {
        let indexer = tiger(2);
        indexer.successor(1, 1, 0);
    }
}

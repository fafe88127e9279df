use crate::*;

/// Dense indexing of the observation histories of one agent, or of the
/// joint histories when the branching factor is |JO|.
///
/// Histories are numbered stage by stage. Stage `t` holds `n^t` histories
/// starting at `first(t)`; inside a stage the observation sequence
/// `(o_0, .., o_{t-1})` is read as a base-`n` number with the most recent
/// observation least significant. The empty history is index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Local {
    branching: usize,
    firsts: Vec<usize>,
}

impl Local {
    /// index the histories of stages `0..horizon`. fails when the number of
    /// histories does not fit in a `usize`.
    pub fn new(branching: usize, horizon: usize) -> anyhow::Result<Self> {
        if horizon == 0 {
            anyhow::bail!("horizon must be at least 1");
        }
        if branching == 0 {
            anyhow::bail!("an agent needs at least one observation");
        }
        let mut firsts = Vec::with_capacity(horizon + 1);
        let mut first = 0usize;
        let mut count = 1usize;
        for stage in 0..=horizon {
            firsts.push(first);
            if stage == horizon {
                break;
            }
            first = first.checked_add(count).ok_or_else(|| {
                anyhow::anyhow!("{} histories per stage overflow at horizon {}", branching, horizon)
            })?;
            if stage + 1 < horizon {
                count = count.checked_mul(branching).ok_or_else(|| {
                    anyhow::anyhow!("{} histories per stage overflow at horizon {}", branching, horizon)
                })?;
            }
        }
        Ok(Self { branching, firsts })
    }

    pub fn branching(&self) -> usize {
        self.branching
    }
    pub fn horizon(&self) -> usize {
        self.firsts.len() - 1
    }

    /// number of histories of length `stage`
    pub fn count(&self, stage: Stage) -> usize {
        self.check(stage);
        self.firsts[stage + 1] - self.firsts[stage]
    }
    /// index of the first history of length `stage`
    pub fn first(&self, stage: Stage) -> usize {
        self.check(stage);
        self.firsts[stage]
    }
    /// number of histories over all stages
    pub fn total(&self) -> usize {
        self.firsts[self.horizon()]
    }
    /// the stage of history `oh`
    pub fn stage(&self, oh: usize) -> Stage {
        assert!(oh < self.total(), "history {} out of range {}", oh, self.total());
        self.firsts.partition_point(|first| *first <= oh) - 1
    }

    /// history reached from `oh` after observing `o`
    pub fn successor(&self, oh: usize, o: usize) -> usize {
        self.extend(self.stage(oh), oh, o)
    }

    /// as `successor`, when the caller already knows the stage of `oh`
    pub fn extend(&self, stage: Stage, oh: usize, o: usize) -> usize {
        assert!(
            stage + 1 < self.horizon(),
            "history {} at stage {} has no successor within horizon {}",
            oh,
            stage,
            self.horizon()
        );
        assert!(o < self.branching, "observation {} out of range {}", o, self.branching);
        let first = self.firsts[stage];
        assert!(
            (first..self.firsts[stage + 1]).contains(&oh),
            "history {} is not at stage {}",
            oh,
            stage
        );
        self.firsts[stage + 1] + (oh - first) * self.branching + o
    }

    /// the observation sequence of history `oh`, oldest first
    pub fn sequence(&self, oh: usize) -> Vec<usize> {
        let stage = self.stage(oh);
        let mut local = oh - self.firsts[stage];
        let mut sequence = vec![0; stage];
        for o in sequence.iter_mut().rev() {
            *o = local % self.branching;
            local /= self.branching;
        }
        sequence
    }

    /// the history with the given observation sequence, oldest first
    pub fn index(&self, sequence: &[usize]) -> usize {
        let stage = sequence.len();
        self.check(stage);
        let local = sequence.iter().fold(0, |local, o| {
            assert!(*o < self.branching, "observation {} out of range {}", o, self.branching);
            local * self.branching + o
        });
        self.firsts[stage] + local
    }

    fn check(&self, stage: Stage) {
        assert!(
            stage < self.horizon(),
            "stage {} out of range {}",
            stage,
            self.horizon()
        );
    }
}

use crate::*;

/// Whether an [`Evaluator`] memoizes V(s, joh).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// keep an |S| x |JOH| table for the duration of one evaluation
    #[default]
    Cached,
    /// recompute every subtree, memory proportional to the horizon
    Uncached,
}

impl Mode {
    /// cached unless the value table would exceed `CACHE_LIMIT` entries
    pub fn recommended(states: usize, histories: usize) -> Self {
        match states.checked_mul(histories) {
            Some(n) if n <= CACHE_LIMIT => Self::Cached,
            _ => Self::Uncached,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::Uncached => write!(f, "uncached"),
        }
    }
}

/// Exact expected value of a pure joint policy.
///
/// V(s, joh) = R(s, ja) + Σ_{s'} Σ_{jo} T(s, ja, s') O(ja, s', jo) V(s', joh')
/// with `ja` the joint action the policy takes at `joh`, down to the last
/// stage where only the immediate reward remains. The policy value is
/// Σ_s b0(s) V(s, root). Rewards are summed without discounting.
///
/// One evaluator is reused across many policies. Its table, when cached,
/// is cleared at the start of every evaluation.
#[derive(Debug)]
pub struct Evaluator<'a, M: DecisionProcess> {
    model: &'a M,
    indexer: &'a Indexer,
    mode: Mode,
    table: ValueTable,
    actions: Vec<usize>,
    visits: usize,
}

impl<'a, M: DecisionProcess> Evaluator<'a, M> {
    pub fn new(model: &'a M, indexer: &'a Indexer, mode: Mode) -> Self {
        let table = match mode {
            Mode::Cached => ValueTable::new(model.states(), indexer.total()),
            Mode::Uncached => ValueTable::default(),
        };
        Self {
            model,
            indexer,
            mode,
            table,
            actions: Vec::new(),
            visits: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
    /// (s, joh) nodes expanded during the last evaluation
    pub fn visits(&self) -> usize {
        self.visits
    }

    pub fn evaluate(&mut self, policy: &JointPolicy) -> anyhow::Result<Utility> {
        self.actions = policy.joint_actions(self.model, self.indexer)?;
        self.table.clear();
        self.visits = 0;
        let model = self.model;
        let root = self.indexer.root();
        let mut value = 0.;
        for s in 0..model.states() {
            let p = model.initial(s);
            if p > 0. {
                value += p * self.value_from(s, root, 0);
            }
        }
        Ok(value)
    }

    /// V(s, joh) for a history `joh` at `stage`
    fn value_from(&mut self, s: usize, joh: usize, stage: Stage) -> Utility {
        if self.mode == Mode::Cached {
            if let Some(value) = self.table.get(s, joh) {
                return value;
            }
        }
        self.visits += 1;
        let model = self.model;
        let indexer = self.indexer;
        let ja = self.actions[joh];
        let mut value = model.reward(s, ja);
        if stage + 1 < indexer.horizon() {
            for (next, p) in model.successors(s, ja) {
                for (jo, q) in model.emissions(s, ja, next) {
                    let child = indexer.successor(stage, joh, jo);
                    value += p * q * self.value_from(next, child, stage + 1);
                }
            }
        }
        if self.mode == Mode::Cached {
            self.table.set(s, joh, value);
        }
        value
    }
}

/// one-shot evaluation of `policy`
pub fn evaluate<M: DecisionProcess>(model: &M, indexer: &Indexer, policy: &JointPolicy, mode: Mode) -> anyhow::Result<Utility> {
    Evaluator::new(model, indexer, mode).evaluate(policy)
}

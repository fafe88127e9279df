use super::*;
use crate::*;
use anyhow::Context;

/// In-memory discrete Dec-POMDP.
///
/// Transition rows are flattened as `s * |JA| + ja`, rewards as
/// `s * |JA| + ja`. Observation rows depend on the [`Observations`] form.
/// Built through [`DecPomdpBuilder`], which validates before handing out
/// the model.
#[derive(Debug)]
pub struct DecPomdp {
    pub(super) name: String,
    pub(super) states: usize,
    pub(super) actions: Space,
    pub(super) observations: Space,
    pub(super) transitions: Box<dyn Kernel>,
    pub(super) emissions: Observations,
    pub(super) rewards: Vec<Utility>,
    pub(super) initial: Vec<Probability>,
    pub(super) discount: Probability,
}

impl DecPomdp {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_event_driven(&self) -> bool {
        self.emissions.is_event_driven()
    }

    fn transition_row(&self, s: usize, ja: usize) -> usize {
        assert!(s < self.states, "state {} out of range {}", s, self.states);
        assert!(ja < self.actions.total(), "joint action {} out of range {}", ja, self.actions.total());
        s * self.actions.total() + ja
    }

    fn emission_row(&self, s: usize, ja: usize, next: usize) -> usize {
        assert!(next < self.states, "state {} out of range {}", next, self.states);
        self.emissions
            .row(self.states, self.actions.total(), s, ja, next)
    }

    /// Checks every stochastic invariant of the model.
    ///
    /// - Σ_{s'} T(s, ja, s') = 1 for every (s, ja)
    /// - Σ_{jo} O(.., s', jo) = 1 for every observation context
    /// - Σ_s b0(s) = 1, every probability within [0, 1]
    /// - γ ∈ [0, 1]
    pub fn validate(&self) -> anyhow::Result<()> {
        let ja = self.actions.total();
        let states = self.states;
        if !(0. ..=1.).contains(&self.discount) {
            anyhow::bail!("discount {} outside [0, 1]", self.discount);
        }
        stochastic("initial state distribution", self.initial.iter().copied())?;
        for s in 0..states {
            for a in 0..ja {
                let row = self.transition_row(s, a);
                stochastic(
                    "transition row",
                    (0..states).map(|next| self.transitions.get(row, next)),
                )
                .with_context(|| format!("T(. | s={}, ja={})", s, a))?;
            }
        }
        let origins = if self.is_event_driven() { states } else { 1 };
        for s in 0..origins {
            for a in 0..ja {
                for next in 0..states {
                    let row = self.emission_row(s, a, next);
                    let kernel = self.emissions.kernel();
                    stochastic(
                        "observation row",
                        (0..kernel.cols()).map(|jo| kernel.get(row, jo)),
                    )
                    .with_context(|| format!("O(. | s={}, ja={}, s'={})", s, a, next))?;
                }
            }
        }
        Ok(())
    }
}

fn stochastic(what: &str, row: impl Iterator<Item = Probability>) -> anyhow::Result<()> {
    let mut mass = 0.;
    for p in row {
        if !(0. ..=1.).contains(&p) {
            anyhow::bail!("{} holds probability {} outside [0, 1]", what, p);
        }
        mass += p;
    }
    if (mass - 1.).abs() > PROBABILITY_TOLERANCE {
        anyhow::bail!("{} sums to {} instead of 1", what, mass);
    }
    Ok(())
}

impl DecisionProcess for DecPomdp {
    fn states(&self) -> usize {
        self.states
    }
    fn actions(&self) -> &Space {
        &self.actions
    }
    fn observations(&self) -> &Space {
        &self.observations
    }
    fn transition(&self, s: usize, ja: usize, next: usize) -> Probability {
        self.transitions.get(self.transition_row(s, ja), next)
    }
    /// event-driven models answer with the mixture over originating states
    /// weighted by T(s, ja, s'), or the plain average when no state leads
    /// to s'
    fn observation(&self, ja: usize, next: usize, jo: usize) -> Probability {
        if !self.is_event_driven() {
            return self.emissions.kernel().get(self.emission_row(0, ja, next), jo);
        }
        let weights = (0..self.states)
            .map(|s| self.transition(s, ja, next))
            .collect::<Vec<_>>();
        let total = weights.iter().sum::<Probability>();
        let weights = if total > 0. {
            weights.iter().map(|w| w / total).collect::<Vec<_>>()
        } else {
            vec![1. / self.states as Probability; self.states]
        };
        weights
            .iter()
            .enumerate()
            .map(|(s, w)| w * self.observation_event(s, ja, next, jo))
            .sum()
    }
    fn observation_event(&self, s: usize, ja: usize, next: usize, jo: usize) -> Probability {
        self.emissions.kernel().get(self.emission_row(s, ja, next), jo)
    }
    fn reward(&self, s: usize, ja: usize) -> Utility {
        self.rewards[self.transition_row(s, ja)]
    }
    fn initial(&self, s: usize) -> Probability {
        self.initial[s]
    }
    fn discount(&self) -> Probability {
        self.discount
    }
    fn successors(&self, s: usize, ja: usize) -> Box<dyn Iterator<Item = (usize, Probability)> + '_> {
        self.transitions.row(self.transition_row(s, ja))
    }
    fn emissions(&self, s: usize, ja: usize, next: usize) -> Box<dyn Iterator<Item = (usize, Probability)> + '_> {
        self.emissions.kernel().row(self.emission_row(s, ja, next))
    }
}

impl std::fmt::Display for DecPomdp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (|S|={} agents={} |A|={:?} |O|={:?} γ={})",
            self.name,
            self.states,
            self.actions.agents(),
            self.actions.sizes(),
            self.observations.sizes(),
            self.discount
        )
    }
}

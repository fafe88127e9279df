use super::*;
use crate::*;
use rand::Rng;

/// Read-only query surface of a discrete Dec-POMDP.
///
/// Evaluators and planners only ever see a model through this trait, so any
/// storage scheme works as long as it answers these queries consistently.
/// Joint actions and joint observations are indexed through [`Space`].
///
/// # Required Methods
///
/// - `states()`: number of states
/// - `actions()`, `observations()`: per-agent index spaces
/// - `transition()`: P(s' | s, ja)
/// - `observation()`: P(jo | ja, s'), a mixture over s for event-driven models
/// - `reward()`: R(s, ja)
/// - `initial()`: b0(s)
/// - `discount()`: γ
///
/// # Provided Methods
///
/// Event-driven observation lookups, non-zero support iterators, and
/// sampling. Implementations with sparse storage should override
/// `successors()` and `emissions()` to avoid scanning zero entries.
pub trait DecisionProcess {
    fn states(&self) -> usize;
    fn actions(&self) -> &Space;
    fn observations(&self) -> &Space;
    fn transition(&self, s: usize, ja: usize, next: usize) -> Probability;
    fn observation(&self, ja: usize, next: usize, jo: usize) -> Probability;
    fn reward(&self, s: usize, ja: usize) -> Utility;
    fn initial(&self, s: usize) -> Probability;
    fn discount(&self) -> Probability;

    /// P(jo | s, ja, s'). models whose observations do not depend on the
    /// originating state answer with the standard form.
    fn observation_event(&self, s: usize, ja: usize, next: usize, jo: usize) -> Probability {
        let _ = s;
        self.observation(ja, next, jo)
    }

    fn agents(&self) -> usize {
        self.actions().agents()
    }
    fn n_actions(&self, agent: Agent) -> usize {
        self.actions().size(agent)
    }
    fn n_observations(&self, agent: Agent) -> usize {
        self.observations().size(agent)
    }
    fn n_joint_actions(&self) -> usize {
        self.actions().total()
    }
    fn n_joint_observations(&self) -> usize {
        self.observations().total()
    }

    /// successor states reachable with non-zero probability
    fn successors(&self, s: usize, ja: usize) -> Box<dyn Iterator<Item = (usize, Probability)> + '_> {
        Box::new(
            (0..self.states())
                .map(move |next| (next, self.transition(s, ja, next)))
                .filter(|(_, p)| *p > 0.),
        )
    }

    /// joint observations emitted with non-zero probability on (s, ja, s')
    fn emissions(&self, s: usize, ja: usize, next: usize) -> Box<dyn Iterator<Item = (usize, Probability)> + '_> {
        Box::new(
            (0..self.n_joint_observations())
                .map(move |jo| (jo, self.observation_event(s, ja, next, jo)))
                .filter(|(_, p)| *p > 0.),
        )
    }

    fn sample_initial(&self, rng: &mut impl Rng) -> usize {
        draw(
            (0..self.states()).map(|s| (s, self.initial(s))),
            rng.random::<Probability>(),
        )
    }
    fn sample_successor(&self, s: usize, ja: usize, rng: &mut impl Rng) -> usize {
        draw(self.successors(s, ja), rng.random::<Probability>())
    }
    fn sample_observation(&self, s: usize, ja: usize, next: usize, rng: &mut impl Rng) -> usize {
        draw(self.emissions(s, ja, next), rng.random::<Probability>())
    }
}

/// inverse-CDF draw from a discrete distribution. rounding slack at the top
/// of the unit interval falls on the last outcome with positive mass.
fn draw(support: impl Iterator<Item = (usize, Probability)>, u: Probability) -> usize {
    let mut cumulative = 0.;
    let mut last = None;
    for (i, p) in support.filter(|(_, p)| *p > 0.) {
        cumulative += p;
        last = Some(i);
        if u < cumulative {
            return i;
        }
    }
    last.expect("sampling from a distribution without support")
}

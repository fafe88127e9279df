use super::*;
use crate::*;

/// Incremental construction of a [`DecPomdp`].
///
/// Tables start at zero; callers fill the non-zero cells and `build()`
/// validates every stochastic invariant before returning the model.
///
/// ```ignore
/// let model = DecPomdpBuilder::new("toy", 2, vec![2, 2], vec![2, 2])
///     .uniform_initial()
///     .transition(0, 0, 1, 1.0)
///     ...
///     .build()?;
/// ```
#[derive(Debug)]
pub struct DecPomdpBuilder {
    model: DecPomdp,
}

impl DecPomdpBuilder {
    pub fn new(name: &str, states: usize, actions: Vec<usize>, observations: Vec<usize>) -> Self {
        Self::with_storage(name, states, actions, observations, Storage::default())
    }

    pub fn with_storage(
        name: &str,
        states: usize,
        actions: Vec<usize>,
        observations: Vec<usize>,
        storage: Storage,
    ) -> Self {
        assert!(states > 0, "a model needs at least one state");
        assert!(actions.len() == observations.len(), "agent count mismatch");
        let actions = Space::from(actions);
        let observations = Space::from(observations);
        let ja = actions.total();
        let jo = observations.total();
        Self {
            model: DecPomdp {
                name: name.to_string(),
                states,
                transitions: storage.kernel(states * ja, states),
                emissions: Observations::standard(storage, states, ja, jo),
                rewards: vec![0.; states * ja],
                initial: vec![0.; states],
                discount: 1.,
                actions,
                observations,
            },
        }
    }

    /// switch to observations conditioned on (s, ja, s'). must be called
    /// before any observation probability is set.
    pub fn event_driven(mut self, storage: Storage) -> Self {
        let states = self.model.states;
        let ja = self.model.actions.total();
        let jo = self.model.observations.total();
        self.model.emissions = Observations::event(storage, states, ja, jo);
        self
    }

    pub fn discount(mut self, discount: Probability) -> Self {
        self.model.discount = discount;
        self
    }

    pub fn initial(mut self, s: usize, p: Probability) -> Self {
        self.model.initial[s] = p;
        self
    }

    pub fn uniform_initial(mut self) -> Self {
        let n = self.model.states;
        self.model.initial = vec![1. / n as Probability; n];
        self
    }

    pub fn transition(mut self, s: usize, ja: usize, next: usize, p: Probability) -> Self {
        self.set_transition(s, ja, next, p);
        self
    }

    pub fn set_transition(&mut self, s: usize, ja: usize, next: usize, p: Probability) {
        let m = &mut self.model;
        assert!(ja < m.actions.total(), "joint action {} out of range", ja);
        let row = s * m.actions.total() + ja;
        m.transitions.set(row, next, p);
    }

    pub fn observation(mut self, ja: usize, next: usize, jo: usize, p: Probability) -> Self {
        self.set_observation(ja, next, jo, p);
        self
    }

    pub fn set_observation(&mut self, ja: usize, next: usize, jo: usize, p: Probability) {
        assert!(
            !self.model.emissions.is_event_driven(),
            "event-driven model needs the originating state"
        );
        self.set_observation_event(0, ja, next, jo, p);
    }

    pub fn set_observation_event(&mut self, s: usize, ja: usize, next: usize, jo: usize, p: Probability) {
        let m = &mut self.model;
        assert!(ja < m.actions.total(), "joint action {} out of range", ja);
        assert!(next < m.states, "state {} out of range", next);
        let row = m.emissions.row(m.states, m.actions.total(), s, ja, next);
        m.emissions.kernel_mut().set(row, jo, p);
    }

    pub fn reward(mut self, s: usize, ja: usize, r: Utility) -> Self {
        self.set_reward(s, ja, r);
        self
    }

    pub fn set_reward(&mut self, s: usize, ja: usize, r: Utility) {
        let m = &mut self.model;
        assert!(s < m.states, "state {} out of range", s);
        assert!(ja < m.actions.total(), "joint action {} out of range", ja);
        m.rewards[s * m.actions.total() + ja] = r;
    }

    /// index spaces, for callers that address joint elements by components
    pub fn actions(&self) -> &Space {
        &self.model.actions
    }
    pub fn observations(&self) -> &Space {
        &self.model.observations
    }

    pub fn build(self) -> anyhow::Result<DecPomdp> {
        self.model.validate()?;
        log::debug!("{:<32}{}", "built model", self.model);
        Ok(self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(storage: Storage) -> DecPomdpBuilder {
        let mut builder = DecPomdpBuilder::with_storage("coin", 2, vec![1, 1], vec![2, 1], storage)
            .uniform_initial();
        for s in 0..2 {
            builder.set_transition(s, 0, 0, 0.5);
            builder.set_transition(s, 0, 1, 0.5);
            builder.set_observation(0, s, s, 1.0);
            builder.set_reward(s, 0, s as Utility);
        }
        builder
    }

    #[test]
    fn valid_model_builds() {
        for storage in [Storage::Dense, Storage::Sparse] {
            let model = coin(storage).build().unwrap();
            assert!(model.states() == 2);
            assert!(model.n_joint_observations() == 2);
            assert!(model.successors(0, 0).count() == 2);
            assert!(model.emissions(0, 0, 1).collect::<Vec<_>>() == vec![(1, 1.0)]);
            assert!(model.reward(1, 0) == 1.);
        }
    }

    #[test]
    fn broken_transition_row_is_rejected() {
        let builder = coin(Storage::Dense).transition(1, 0, 1, 0.2);
        let error = builder.build().unwrap_err();
        assert!(format!("{:#}", error).contains("T(. | s=1, ja=0)"));
    }

    #[test]
    fn broken_initial_distribution_is_rejected() {
        assert!(coin(Storage::Sparse).initial(0, 0.9).build().is_err());
    }

    #[test]
    fn discount_outside_unit_interval_is_rejected() {
        assert!(coin(Storage::Dense).discount(1.5).build().is_err());
    }

    #[test]
    fn event_driven_observations() {
        let mut builder = DecPomdpBuilder::new("event", 2, vec![1], vec![2])
            .uniform_initial()
            .event_driven(Storage::Sparse);
        for s in 0..2 {
            for next in 0..2 {
                builder.set_transition(s, 0, next, 0.5);
                // observe whether the state changed
                builder.set_observation_event(s, 0, next, (s != next) as usize, 1.0);
            }
        }
        let model = builder.build().unwrap();
        assert!(model.is_event_driven());
        assert!(model.observation_event(0, 0, 1, 1) == 1.);
        assert!(model.observation_event(1, 0, 1, 1) == 0.);
        // half the mass reaching state 1 changed state on the way
        assert!((model.observation(0, 1, 1) - 0.5).abs() < 1e-12);
        assert!((model.observation(0, 1, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn event_driven_marginal_follows_transitions() {
        let mut builder = DecPomdpBuilder::new("event", 2, vec![1], vec![2])
            .initial(0, 1.)
            .event_driven(Storage::Dense);
        // state 0 stays put, state 1 always falls back to 0
        builder.set_transition(0, 0, 0, 1.);
        builder.set_transition(1, 0, 0, 1.);
        for s in 0..2 {
            for next in 0..2 {
                builder.set_observation_event(s, 0, next, s, 1.0);
            }
        }
        let model = builder.build().unwrap();
        assert!((model.observation(0, 0, 1) - 0.5).abs() < 1e-12);
        // nothing reaches state 1, so every origin counts equally
        assert!((model.observation(0, 1, 0) - 0.5).abs() < 1e-12);
    }
}

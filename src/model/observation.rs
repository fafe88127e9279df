use super::*;

/// Observation kernel in one of its two conditioning forms.
///
/// The standard form conditions on the joint action and the successor state,
/// P(jo | ja, s'). The event-driven form also conditions on the state the
/// transition started from, P(jo | s, ja, s').
#[derive(Debug)]
pub enum Observations {
    /// rows are `(ja, s')`
    Standard(Box<dyn Kernel>),
    /// rows are `(s, ja, s')`
    Event(Box<dyn Kernel>),
}

impl Observations {
    pub fn standard(storage: Storage, states: usize, joint_actions: usize, joint_observations: usize) -> Self {
        Self::Standard(storage.kernel(joint_actions * states, joint_observations))
    }
    pub fn event(storage: Storage, states: usize, joint_actions: usize, joint_observations: usize) -> Self {
        Self::Event(storage.kernel(states * joint_actions * states, joint_observations))
    }

    pub fn is_event_driven(&self) -> bool {
        matches!(self, Self::Event(_))
    }

    pub fn kernel(&self) -> &dyn Kernel {
        match self {
            Self::Standard(kernel) | Self::Event(kernel) => kernel.as_ref(),
        }
    }
    pub fn kernel_mut(&mut self) -> &mut dyn Kernel {
        match self {
            Self::Standard(kernel) | Self::Event(kernel) => kernel.as_mut(),
        }
    }

    /// flattened row for the context `(s, ja, s')`. the standard form
    /// ignores the originating state.
    pub fn row(&self, states: usize, joint_actions: usize, s: usize, ja: usize, next: usize) -> usize {
        match self {
            Self::Standard(_) => ja * states + next,
            Self::Event(_) => (s * joint_actions + ja) * states + next,
        }
    }
}

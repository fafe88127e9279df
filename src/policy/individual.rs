use crate::*;
use rand::Rng;
use serde::Serialize;

/// Deterministic policy of one agent: an action for every observation
/// history of stages `0..h`, indexed like [`Local`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Individual {
    actions: Vec<usize>,
    #[serde(skip)]
    odometer: Odometer,
}

impl Individual {
    /// the all-zero policy over `histories` histories with `actions` choices
    pub fn new(actions: usize, histories: usize) -> Self {
        Self {
            actions: vec![0; histories],
            odometer: Odometer::uniform(actions, histories),
        }
    }

    /// number of actions available at every history
    pub fn choices(&self) -> usize {
        self.odometer.radix().first().copied().unwrap_or(1)
    }
    /// number of observation histories covered
    pub fn histories(&self) -> usize {
        self.actions.len()
    }
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    pub fn action(&self, oh: usize) -> usize {
        assert!(oh < self.actions.len(), "history {} out of range {}", oh, self.actions.len());
        self.actions[oh]
    }
    pub fn set(&mut self, oh: usize, a: usize) {
        assert!(oh < self.actions.len(), "history {} out of range {}", oh, self.actions.len());
        assert!(a < self.choices(), "action {} out of range {}", a, self.choices());
        self.actions[oh] = a;
    }

    /// next policy in counting order with the last history least
    /// significant. true when the policy wrapped back to all zeros.
    pub fn increment(&mut self) -> bool {
        self.odometer.advance(&mut self.actions)
    }
    pub fn zero(&mut self) {
        self.actions.iter_mut().for_each(|a| *a = 0);
    }
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        let n = self.choices();
        self.actions.iter_mut().for_each(|a| *a = rng.random_range(0..n));
    }

    /// number of distinct policies
    pub fn size(&self) -> Option<u128> {
        self.odometer.size()
    }
    pub fn index(&self) -> Option<u128> {
        self.odometer.rank(&self.actions)
    }
    pub fn set_index(&mut self, index: u128) {
        self.actions = self.odometer.unrank(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn increment_carries_from_the_last_history() {
        let mut policy = Individual::new(2, 3);
        assert!(!policy.increment());
        assert!(policy.actions().to_vec() == vec![0, 0, 1]);
        assert!(!policy.increment());
        assert!(policy.actions().to_vec() == vec![0, 1, 0]);
    }

    #[test]
    fn enumeration_is_complete() {
        let mut policy = Individual::new(3, 3);
        let mut count = 1;
        while !policy.increment() {
            count += 1;
        }
        assert!(count == 27);
        assert!(policy.size() == Some(27));
        assert!(policy.actions().to_vec() == vec![0, 0, 0]);
    }

    #[test]
    fn randomize_stays_in_range() {
        let ref mut rng = SmallRng::seed_from_u64(7);
        let mut policy = Individual::new(3, 21);
        policy.randomize(rng);
        assert!(policy.actions().iter().all(|a| *a < 3));
        let index = policy.index().unwrap();
        let mut other = Individual::new(3, 21);
        other.set_index(index);
        assert!(other == policy);
    }

    #[test]
    #[should_panic]
    fn action_out_of_range() {
        Individual::new(2, 3).set(0, 2);
    }
}

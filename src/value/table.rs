use crate::*;

/// Memo of V(s, joh) for one policy, flattened as `joh * |S| + s`.
#[derive(Debug, Clone, Default)]
pub struct ValueTable {
    states: usize,
    values: Vec<Option<Utility>>,
}

impl ValueTable {
    pub fn new(states: usize, histories: usize) -> Self {
        Self {
            states,
            values: vec![None; states * histories],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, s: usize, joh: usize) -> Option<Utility> {
        self.values[self.offset(s, joh)]
    }
    pub fn set(&mut self, s: usize, joh: usize, value: Utility) {
        let i = self.offset(s, joh);
        self.values[i] = Some(value);
    }

    /// forget every stored value, keeping the allocation
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
    }

    fn offset(&self, s: usize, joh: usize) -> usize {
        assert!(s < self.states, "state {} out of range {}", s, self.states);
        let i = joh * self.states + s;
        assert!(i < self.values.len(), "joint history {} out of range", joh);
        i
    }
}

use serde::Serialize;

/// A product of per-agent index ranges.
///
/// Joint actions and joint observations are tuples with one component per
/// agent. We encode them densely in mixed radix with the last agent as the
/// least significant digit, so for sizes `[3, 2]` the tuple `(a0, a1)` maps
/// to `a0 * 2 + a1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Space {
    sizes: Vec<usize>,
    strides: Vec<usize>,
    total: usize,
}

impl Space {
    /// number of agents spanning this space
    pub fn agents(&self) -> usize {
        self.sizes.len()
    }
    /// number of individual elements for one agent
    pub fn size(&self, agent: usize) -> usize {
        self.sizes[agent]
    }
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }
    /// number of joint elements
    pub fn total(&self) -> usize {
        self.total
    }

    /// individual indices -> joint index
    pub fn joint(&self, individual: &[usize]) -> usize {
        assert!(
            individual.len() == self.agents(),
            "expected {} components, got {}",
            self.agents(),
            individual.len()
        );
        individual
            .iter()
            .zip(self.sizes.iter())
            .zip(self.strides.iter())
            .inspect(|((i, n), _)| assert!(*i < *n, "component {} out of range {}", i, n))
            .map(|((i, _), stride)| i * stride)
            .sum()
    }

    /// joint index -> individual indices
    pub fn split(&self, joint: usize) -> Vec<usize> {
        (0..self.agents())
            .map(|agent| self.component(joint, agent))
            .collect()
    }

    /// one agent's component of a joint index, without allocating
    pub fn component(&self, joint: usize, agent: usize) -> usize {
        assert!(joint < self.total, "joint index {} out of range {}", joint, self.total);
        (joint / self.strides[agent]) % self.sizes[agent]
    }
}

impl From<Vec<usize>> for Space {
    fn from(sizes: Vec<usize>) -> Self {
        assert!(sizes.iter().all(|n| *n > 0), "every agent needs at least one element");
        let mut strides = vec![1; sizes.len()];
        for i in (0..sizes.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * sizes[i + 1];
        }
        let total = sizes.iter().product();
        Self {
            sizes,
            strides,
            total,
        }
    }
}

impl From<&[usize]> for Space {
    fn from(sizes: &[usize]) -> Self {
        Self::from(sizes.to_vec())
    }
}

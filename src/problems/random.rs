use crate::*;
use rand::Rng;

/// Dimensions of a randomly generated model. Every agent gets the same
/// number of actions and observations.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub states: usize,
    pub agents: usize,
    pub actions: usize,
    pub observations: usize,
    /// chance that an entry of a distribution is forced to zero
    pub sparsity: Probability,
}

impl Default for Shape {
    fn default() -> Self {
        Self {
            states: 3,
            agents: 2,
            actions: 2,
            observations: 2,
            sparsity: 0.25,
        }
    }
}

/// Random well-formed Dec-POMDP.
///
/// Every distribution is drawn uniformly, thinned by `sparsity` while
/// keeping at least one outcome, and normalized. Rewards are uniform in
/// [-10, 10), the discount is 1.
pub fn random(rng: &mut impl Rng, shape: &Shape, storage: Storage) -> anyhow::Result<DecPomdp> {
    if shape.agents == 0 {
        anyhow::bail!("a model needs at least one agent");
    }
    if shape.states == 0 || shape.actions == 0 || shape.observations == 0 {
        anyhow::bail!("model dimensions must be positive: {:?}", shape);
    }
    if !(0. ..1.).contains(&shape.sparsity) {
        anyhow::bail!("sparsity {} outside [0, 1)", shape.sparsity);
    }
    let mut builder = DecPomdpBuilder::with_storage(
        "random",
        shape.states,
        vec![shape.actions; shape.agents],
        vec![shape.observations; shape.agents],
        storage,
    );
    let joint = builder.actions().total();
    let joint_observations = builder.observations().total();
    for (s, p) in distribution(rng, shape.states, shape.sparsity).into_iter().enumerate() {
        builder = builder.initial(s, p);
    }
    for s in 0..shape.states {
        for ja in 0..joint {
            for (next, p) in distribution(rng, shape.states, shape.sparsity).into_iter().enumerate() {
                builder.set_transition(s, ja, next, p);
            }
            builder.set_reward(s, ja, rng.random_range(-10.0..10.0));
        }
    }
    for ja in 0..joint {
        for next in 0..shape.states {
            for (jo, p) in distribution(rng, joint_observations, shape.sparsity).into_iter().enumerate() {
                builder.set_observation(ja, next, jo, p);
            }
        }
    }
    builder.build()
}

/// random distribution over `n` outcomes with at least one in the support
fn distribution(rng: &mut impl Rng, n: usize, sparsity: Probability) -> Vec<Probability> {
    let mut weights = (0..n)
        .map(|_| {
            let w = rng.random::<Probability>();
            if rng.random::<Probability>() < sparsity { 0. } else { w }
        })
        .collect::<Vec<_>>();
    if weights.iter().all(|w| *w == 0.) {
        weights[rng.random_range(0..n)] = 1.;
    }
    let total = weights.iter().sum::<Probability>();
    weights.iter_mut().for_each(|w| *w /= total);
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn generated_models_validate() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        for storage in [Storage::Dense, Storage::Sparse] {
            for _ in 0..10 {
                let model = random(rng, &Shape::default(), storage).unwrap();
                assert!(model.validate().is_ok());
                assert!(model.n_joint_actions() == 4);
            }
        }
    }

    #[test]
    fn sparsity_removes_entries() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let shape = Shape {
            states: 20,
            sparsity: 0.9,
            ..Shape::default()
        };
        let model = random(rng, &shape, Storage::Sparse).unwrap();
        let support = (0..20).map(|s| model.successors(s, 0).count()).sum::<usize>();
        assert!(support < 20 * 20 / 2);
        assert!((0..20).all(|s| model.successors(s, 0).count() > 0));
    }

    #[test]
    fn bad_shapes_are_rejected() {
        let ref mut rng = SmallRng::seed_from_u64(2);
        let empty = Shape {
            agents: 0,
            ..Shape::default()
        };
        let dense = Shape {
            sparsity: 1.,
            ..Shape::default()
        };
        assert!(random(rng, &empty, Storage::Dense).is_err());
        assert!(random(rng, &dense, Storage::Dense).is_err());
    }
}

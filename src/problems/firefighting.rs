use crate::*;

const FLAMES: usize = 0;

/// Size of a fire fighting instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brigade {
    pub agents: usize,
    pub houses: usize,
    /// fire levels per house, level 0 meaning not burning
    pub levels: usize,
}

impl Default for Brigade {
    fn default() -> Self {
        Self {
            agents: 2,
            houses: 3,
            levels: 3,
        }
    }
}

/// Fire fighting on a row of houses.
///
/// A state is the fire level of every house. Each agent picks a house to
/// fight at. Fire spreads from burning neighbours, one firefighter lowers
/// the level, two or more put it out. Afterwards each agent sees flames at
/// its house with a chance growing with the fire level. The reward is
/// minus the expected sum of fire levels after the transition.
pub fn firefighting(brigade: &Brigade, storage: Storage) -> anyhow::Result<DecPomdp> {
    let Brigade { agents, houses, levels } = *brigade;
    if agents == 0 || houses == 0 || levels == 0 {
        anyhow::bail!("fire fighting dimensions must be positive: {:?}", brigade);
    }
    let fires = Space::from(vec![levels; houses]);
    let name = format!("firefighting_{}_{}_{}", agents, houses, levels);
    let mut builder = DecPomdpBuilder::with_storage(&name, fires.total(), vec![houses; agents], vec![2; agents], storage)
        .uniform_initial()
        .discount(1.);
    let actions = builder.actions().clone();
    let observations = builder.observations().clone();
    for s in 0..fires.total() {
        let now = fires.split(s);
        for ja in 0..actions.total() {
            let targets = actions.split(ja);
            let mut cost = 0.;
            for next in 0..fires.total() {
                let after = fires.split(next);
                let p = (0..houses)
                    .map(|h| spread(&now, &targets, h, after[h], levels))
                    .product::<Probability>();
                if p > 0. {
                    builder.set_transition(s, ja, next, p);
                    cost += p * after.iter().sum::<usize>() as Utility;
                }
            }
            builder.set_reward(s, ja, -cost);
        }
    }
    for ja in 0..actions.total() {
        let targets = actions.split(ja);
        for next in 0..fires.total() {
            let after = fires.split(next);
            for jo in 0..observations.total() {
                let p = observations
                    .split(jo)
                    .iter()
                    .zip(targets.iter())
                    .map(|(o, h)| sighting(after[*h], *o))
                    .product::<Probability>();
                builder.set_observation(ja, next, jo, p);
            }
        }
    }
    builder.build()
}

/// P(house `h` goes to level `next` | fire levels `now`, agent targets)
fn spread(now: &[usize], targets: &[usize], h: usize, next: usize, levels: usize) -> Probability {
    let level = now[h];
    let higher = (level + 1).min(levels - 1);
    let lower = level.saturating_sub(1);
    let fighters = targets.iter().filter(|t| **t == h).count();
    let neighbour = (h > 0 && now[h - 1] > 0) || (h + 1 < now.len() && now[h + 1] > 0);
    // `stay` and `moved` add up when the level is pinned at a bound
    let shift = |stay: Probability, moved: usize, p: Probability| -> Probability {
        let mut q = 0.;
        if next == level {
            q += stay;
        }
        if next == moved {
            q += p;
        }
        q
    };
    let extinguished = if next == 0 { 1. } else { 0. };
    match fighters {
        0 if neighbour => shift(0.2, higher, 0.8),
        1 if neighbour => shift(0.4, lower, 0.6),
        0 | 1 if level == 0 => extinguished,
        0 => shift(0.6, higher, 0.4),
        1 => shift(0., lower, 1.),
        _ => extinguished,
    }
}

fn sighting(level: usize, o: usize) -> Probability {
    let flames = match level {
        0 => 0.2,
        1 => 0.5,
        _ => 0.8,
    };
    if o == FLAMES { flames } else { 1. - flames }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town() -> Space {
        Space::from(vec![3; 3])
    }

    #[test]
    fn shape() {
        let model = firefighting(&Brigade::default(), Storage::Dense).unwrap();
        assert!(model.states() == 27);
        assert!(model.agents() == 2);
        assert!(model.n_joint_actions() == 9);
        assert!(model.n_joint_observations() == 4);
        assert!(model.name() == "firefighting_2_3_3");
    }

    #[test]
    fn quiet_town_stays_quiet() {
        let model = firefighting(&Brigade::default(), Storage::Sparse).unwrap();
        let quiet = town().joint(&[0, 0, 0]);
        for ja in 0..9 {
            assert!(model.successors(quiet, ja).collect::<Vec<_>>() == vec![(quiet, 1.)]);
            assert!(model.reward(quiet, ja) == 0.);
        }
    }

    #[test]
    fn two_firefighters_put_a_fire_out() {
        let model = firefighting(&Brigade::default(), Storage::Sparse).unwrap();
        let ablaze = town().joint(&[2, 2, 2]);
        let both_first = model.actions().joint(&[0, 0]);
        // the other houses sit at the top level next to a burning house
        let after = town().joint(&[0, 2, 2]);
        assert!(model.transition(ablaze, both_first, after) == 1.);
        assert!(model.reward(ablaze, both_first) == -4.);
    }

    #[test]
    fn flames_are_seen_at_the_chosen_house() {
        let model = firefighting(&Brigade::default(), Storage::Dense).unwrap();
        let ja = model.actions().joint(&[0, 2]);
        let next = town().joint(&[2, 0, 1]);
        let both = model.observations().joint(&[FLAMES, FLAMES]);
        assert!((model.observation(ja, next, both) - 0.8 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_sizes_are_rejected() {
        let brigade = Brigade {
            houses: 0,
            ..Brigade::default()
        };
        assert!(firefighting(&brigade, Storage::Dense).is_err());
    }

    #[test]
    fn horizon_two_optimum() {
        let model = firefighting(&Brigade::default(), Storage::Sparse).unwrap();
        let indexer = Indexer::new(&model, 2).unwrap();
        let mut exhaustive = BruteForce::new(&model, &indexer);
        exhaustive.plan().unwrap();
        assert!((exhaustive.expected_reward() + 4.383579259).abs() < 1e-6);
        let mut dynamic = JespDp::new(&model, &indexer, 3);
        dynamic.plan().unwrap();
        assert!(dynamic.expected_reward() <= exhaustive.expected_reward() + 1e-9);
    }
}

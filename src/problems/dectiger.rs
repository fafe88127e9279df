use crate::*;

const SLEFT: usize = 0;
const SRIGHT: usize = 1;

const LISTEN: usize = 0;
const OPENLEFT: usize = 1;
const OPENRIGHT: usize = 2;

const HEARLEFT: usize = 0;
const HEARRIGHT: usize = 1;

/// probability that a listening agent hears the tiger's true side
const ACCURACY: Probability = 0.85;

/// Decentralized tiger problem.
///
/// Two agents stand before two doors, one hiding a tiger and the other a
/// treasure. They may listen, which reveals the tiger's side with 85%
/// accuracy to each agent independently, or open a door. Opening any door
/// resets the tiger uniformly. Listening costs 2 in total, opening the
/// treasure door pays, and waking the tiger hurts most when only one agent
/// does it.
pub fn dectiger(storage: Storage) -> anyhow::Result<DecPomdp> {
    let mut builder = DecPomdpBuilder::with_storage("dectiger", 2, vec![3, 3], vec![2, 2], storage)
        .uniform_initial()
        .discount(1.);
    let listen = builder.actions().joint(&[LISTEN, LISTEN]);
    let joint = builder.actions().total();
    let observations = builder.observations().clone();
    for ja in 0..joint {
        for s in [SLEFT, SRIGHT] {
            if ja == listen {
                builder.set_transition(s, ja, s, 1.);
            } else {
                builder.set_transition(s, ja, SLEFT, 0.5);
                builder.set_transition(s, ja, SRIGHT, 0.5);
            }
        }
        for next in [SLEFT, SRIGHT] {
            for jo in 0..observations.total() {
                let p: Probability = if ja == listen {
                    observations
                        .split(jo)
                        .iter()
                        .map(|o| hearing(next, *o))
                        .product::<Probability>()
                } else {
                    0.25
                };
                builder.set_observation(ja, next, jo, p);
            }
        }
    }
    #[rustfmt::skip]
    let rewards = [
        // (a0, a1)                 tiger left  tiger right
        ((LISTEN,    LISTEN),    (   -2.,        -2.)),
        ((LISTEN,    OPENLEFT),  ( -101.,         9.)),
        ((LISTEN,    OPENRIGHT), (    9.,      -101.)),
        ((OPENLEFT,  LISTEN),    ( -101.,         9.)),
        ((OPENLEFT,  OPENLEFT),  (  -50.,        20.)),
        ((OPENLEFT,  OPENRIGHT), ( -100.,      -100.)),
        ((OPENRIGHT, LISTEN),    (    9.,      -101.)),
        ((OPENRIGHT, OPENLEFT),  ( -100.,      -100.)),
        ((OPENRIGHT, OPENRIGHT), (   20.,       -50.)),
    ];
    for ((a0, a1), (left, right)) in rewards {
        let ja = builder.actions().joint(&[a0, a1]);
        builder.set_reward(SLEFT, ja, left);
        builder.set_reward(SRIGHT, ja, right);
    }
    builder.build()
}

fn hearing(tiger: usize, o: usize) -> Probability {
    match (tiger, o) {
        (SLEFT, HEARLEFT) | (SRIGHT, HEARRIGHT) => ACCURACY,
        _ => 1. - ACCURACY,
    }
}

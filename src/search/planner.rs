use crate::*;

/// A search over pure joint policies.
///
/// `plan()` runs the search to completion or until cancelled, after which
/// `expected_reward()` and `joint_policy()` describe the best policy found.
/// Before a successful `plan()` the reward is −∞ and there is no policy.
pub trait Planner {
    fn plan(&mut self) -> anyhow::Result<()>;
    fn expected_reward(&self) -> Utility;
    fn joint_policy(&self) -> Option<&JointPolicy>;
    fn tally(&self) -> &Tally;
}

//! The policy capability consumed by the driver
//!
//! Learning algorithms live outside of this crate. A [`Learner`] is anything that can
//! predict actions, be run against an environment for a number of timesteps, and be
//! saved to and restored from a file. The built-in learners are baselines that do
//! not fit a model: they exist so the environment and the driver can be exercised
//! end to end.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{env::Environment, gym::DroneNavigation, Result};

mod heuristic;
mod random;

pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;

/// Maps observations to actions
pub trait Policy<E: Environment> {
    fn predict(&mut self, observation: &E::Observation) -> E::Action;
}

/// A [`Policy`] that can be trained and persisted
pub trait Learner<E: Environment>: Policy<E> {
    fn algorithm(&self) -> Algorithm;

    /// Total environment steps this learner has been run for
    fn timesteps(&self) -> u64;

    /// Run the learner in `env` for `timesteps` steps, resetting whenever an episode ends
    fn learn(&mut self, env: &mut E, timesteps: u64) -> LearnSummary;

    fn save(&self, path: &Path) -> Result<()>;

    /// Restore the state written by [`Learner::save`]
    fn load(&mut self, path: &Path) -> Result<()>;
}

/// The learners available from the command line
#[derive(
    EnumIter,
    Display,
    clap::ValueEnum,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Uniformly random actions
    Random,
    /// Epsilon-greedy steps along the longer axis towards the target
    Heuristic,
}

impl Algorithm {
    /// Construct a fresh learner for a `grid_size` x `grid_size` environment
    pub fn build(self, grid_size: usize, seed: Option<u64>) -> Box<dyn Learner<DroneNavigation>> {
        match self {
            Algorithm::Random => Box::new(RandomPolicy::new(grid_size, seed)),
            Algorithm::Heuristic => Box::new(HeuristicPolicy::new(grid_size, seed)),
        }
    }
}

/// Statistics collected while a learner was run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LearnSummary {
    pub timesteps: u64,
    /// Episodes that finished during the run
    pub episodes: u64,
    pub mean_reward: f64,
    /// Fraction of finished episodes that reached the target
    pub success_rate: f64,
}

/// Drive `env` for exactly `timesteps` steps with actions from `act`
///
/// The episode in progress when the budget runs out is not counted.
pub fn rollout<E, F>(env: &mut E, timesteps: u64, mut act: F) -> LearnSummary
where
    E: Environment,
    F: FnMut(&E::Observation) -> E::Action,
{
    let mut obs = env.reset(None).0;
    let mut episodes = 0;
    let mut successes = 0;
    let mut total_reward = 0.0;
    let mut episode_reward = 0.0;

    for _ in 0..timesteps {
        let step = env.step(act(&obs));
        episode_reward += step.reward;
        obs = step.observation.clone();

        if step.is_done() {
            episodes += 1;
            if step.terminated {
                successes += 1;
            }
            total_reward += episode_reward;
            episode_reward = 0.0;
            obs = env.reset(None).0;
        }
    }

    let (mean_reward, success_rate) = if episodes > 0 {
        (
            total_reward / episodes as f64,
            successes as f64 / episodes as f64,
        )
    } else {
        (0.0, 0.0)
    };

    LearnSummary {
        timesteps,
        episodes,
        mean_reward,
        success_rate,
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::{
        config::EnvConfig,
        gym::{Action, GridPosition},
    };

    #[test]
    fn build_matches_algorithm() {
        for algorithm in Algorithm::iter() {
            let learner = algorithm.build(4, Some(0));
            assert_eq!(learner.algorithm(), algorithm);
            assert_eq!(learner.timesteps(), 0, "Fresh learners are untrained");
        }
    }

    #[test]
    fn algorithm_names() {
        assert_eq!(Algorithm::Random.to_string(), "random");
        assert_eq!(Algorithm::Heuristic.to_string(), "heuristic");
    }

    #[test]
    fn rollout_counts_finished_episodes() {
        let config = EnvConfig::new(3)
            .with_agent_start(GridPosition::new(0, 0))
            .with_target_start(GridPosition::new(1, 0));
        let mut env = DroneNavigation::new(config).unwrap();

        // every step reaches the target
        let summary = rollout(&mut env, 5, |_| Action::Right);
        assert_eq!(summary.episodes, 5);
        assert_eq!(summary.success_rate, 1.0);
        assert_eq!(summary.mean_reward, 9.0);

        // every step hits the wall
        let summary = rollout(&mut env, 4, |_| Action::Up);
        assert_eq!(summary.episodes, 4);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.mean_reward, -9.0);
    }

    #[test]
    fn rollout_ignores_unfinished_episode() {
        let config = EnvConfig::new(8)
            .with_agent_start(GridPosition::new(0, 0))
            .with_target_start(GridPosition::new(7, 7));
        let mut env = DroneNavigation::new(config).unwrap();

        let summary = rollout(&mut env, 3, |_| Action::Right);
        assert_eq!(summary.timesteps, 3);
        assert_eq!(summary.episodes, 0);
        assert_eq!(summary.mean_reward, 0.0);
    }
}

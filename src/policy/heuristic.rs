use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use strum::VariantArray;

use super::{rollout, Algorithm, LearnSummary, Learner, Policy};
use crate::{
    decay::Exponential,
    exploration::{Choice, EpsilonGreedy},
    gym::{Action, DroneNavigation, Observation},
    persistence::{read_json, write_json, ModelRecord},
    Result,
};

/// Moves along the axis with the larger remaining distance to the target
///
/// Exploration is epsilon greedy, with epsilon decaying over the timesteps the policy
/// has been run for. Nothing else changes with experience.
pub struct HeuristicPolicy {
    grid_size: usize,
    timesteps: u64,
    episodes: u64,
    exploration: EpsilonGreedy<Exponential>,
    rng: StdRng,
}

impl HeuristicPolicy {
    pub fn new(grid_size: usize, seed: Option<u64>) -> Self {
        Self::with_exploration(grid_size, seed, Self::default_exploration())
    }

    pub fn with_exploration(
        grid_size: usize,
        seed: Option<u64>,
        exploration: EpsilonGreedy<Exponential>,
    ) -> Self {
        Self {
            grid_size,
            timesteps: 0,
            episodes: 0,
            exploration,
            rng: seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
        }
    }

    fn default_exploration() -> EpsilonGreedy<Exponential> {
        Exponential::new(1e-4, 1.0, 0.05)
            .and_then(EpsilonGreedy::new)
            .expect("1.0 decays to 0.05 inside [0, 1]")
    }

    /// The current exploration rate
    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon(self.timesteps)
    }

    /// The action that closes the larger gap to the target, preferring the x axis on ties
    pub fn greedy(observation: &Observation) -> Action {
        let agent = observation.agent();
        let target = observation.target();
        let dx = target.x as isize - agent.x as isize;
        let dy = target.y as isize - agent.y as isize;

        if dx.abs() >= dy.abs() {
            if dx >= 0 {
                Action::Right
            } else {
                Action::Left
            }
        } else if dy > 0 {
            Action::Down
        } else {
            Action::Up
        }
    }
}

impl Policy<DroneNavigation> for HeuristicPolicy {
    fn predict(&mut self, observation: &Observation) -> Action {
        match self.exploration.choose(self.timesteps, &mut self.rng) {
            Choice::Explore => *Action::VARIANTS
                .choose(&mut self.rng)
                .expect("action space is not empty"),
            Choice::Exploit => Self::greedy(observation),
        }
    }
}

impl Learner<DroneNavigation> for HeuristicPolicy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Heuristic
    }

    fn timesteps(&self) -> u64 {
        self.timesteps
    }

    fn learn(&mut self, env: &mut DroneNavigation, timesteps: u64) -> LearnSummary {
        let summary = rollout(env, timesteps, |obs| {
            let action = self.predict(obs);
            self.timesteps += 1;
            action
        });
        self.episodes += summary.episodes;
        log::debug!(
            "heuristic policy epsilon {:.3} after {} timesteps",
            self.epsilon(),
            self.timesteps
        );
        summary
    }

    fn save(&self, path: &Path) -> Result<()> {
        let record = ModelRecord::new(
            Algorithm::Heuristic,
            self.grid_size,
            self.timesteps,
            self.episodes,
            self.exploration.decay(),
        );
        write_json(path, &record)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let record: ModelRecord<Exponential> = read_json(path)?;
        record.check(Algorithm::Heuristic, self.grid_size)?;
        self.exploration = EpsilonGreedy::new(record.params)?;
        self.timesteps = record.timesteps;
        self.episodes = record.episodes;
        Ok(())
    }
}

use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use strum::VariantArray;

use super::{rollout, Algorithm, LearnSummary, Learner, Policy};
use crate::{
    gym::{Action, DroneNavigation, Observation},
    persistence::{read_json, write_json, ModelRecord},
    Result,
};

/// Picks every action uniformly at random
pub struct RandomPolicy {
    grid_size: usize,
    timesteps: u64,
    episodes: u64,
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(grid_size: usize, seed: Option<u64>) -> Self {
        Self {
            grid_size,
            timesteps: 0,
            episodes: 0,
            rng: seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
        }
    }
}

impl Policy<DroneNavigation> for RandomPolicy {
    fn predict(&mut self, _observation: &Observation) -> Action {
        *Action::VARIANTS
            .choose(&mut self.rng)
            .expect("action space is not empty")
    }
}

impl Learner<DroneNavigation> for RandomPolicy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Random
    }

    fn timesteps(&self) -> u64 {
        self.timesteps
    }

    fn learn(&mut self, env: &mut DroneNavigation, timesteps: u64) -> LearnSummary {
        let summary = rollout(env, timesteps, |obs| self.predict(obs));
        self.timesteps += summary.timesteps;
        self.episodes += summary.episodes;
        summary
    }

    fn save(&self, path: &Path) -> Result<()> {
        let record = ModelRecord::new(
            Algorithm::Random,
            self.grid_size,
            self.timesteps,
            self.episodes,
            (),
        );
        write_json(path, &record)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let record: ModelRecord<()> = read_json(path)?;
        record.check(Algorithm::Random, self.grid_size)?;
        self.timesteps = record.timesteps;
        self.episodes = record.episodes;
        Ok(())
    }
}

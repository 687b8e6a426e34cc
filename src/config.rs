use strum::IntoEnumIterator;

use crate::{
    gym::GridPosition,
    policy::Algorithm,
    Error, Result,
};

/// Default edge length of the grid
pub const DEFAULT_SIZE: usize = 10;

/// Episodes are truncated after `MAX_STEPS_PER_CELL * size` steps unless configured otherwise
pub const MAX_STEPS_PER_CELL: usize = 5;

/// Configuration for the [`DroneNavigation`](crate::gym::DroneNavigation) environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Edge length of the square grid, must be at least 2
    pub size: usize,
    /// Step limit per episode, defaults to `5 * size`
    pub max_steps: Option<usize>,
    /// Pin the agent's starting cell instead of sampling it on every reset
    pub agent_start: Option<GridPosition>,
    /// Pin the target's cell instead of sampling it on every reset
    pub target_start: Option<GridPosition>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}

impl EnvConfig {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            max_steps: None,
            agent_start: None,
            target_start: None,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_agent_start(mut self, pos: GridPosition) -> Self {
        self.agent_start = Some(pos);
        self
    }

    pub fn with_target_start(mut self, pos: GridPosition) -> Self {
        self.target_start = Some(pos);
        self
    }

    /// The effective step limit
    pub fn max_steps(&self) -> usize {
        self.max_steps.unwrap_or(MAX_STEPS_PER_CELL * self.size)
    }

    /// Check that the configuration describes a playable grid
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(Error::DegenerateGrid { size: self.size });
        }
        if self.max_steps() == 0 {
            return Err(Error::InvalidConfig(
                "max_steps must be at least 1".to_string(),
            ));
        }

        for (name, pos) in [("agent", self.agent_start), ("target", self.target_start)] {
            if let Some(pos) = pos {
                if !pos.in_bounds(self.size) {
                    return Err(Error::InvalidConfig(format!(
                        "{name} start {pos} is outside of the {0}x{0} grid",
                        self.size
                    )));
                }
            }
        }

        if let (Some(agent), Some(target)) = (self.agent_start, self.target_start) {
            if agent == target {
                return Err(Error::InvalidConfig(format!(
                    "agent and target cannot both start at {agent}"
                )));
            }
        }

        Ok(())
    }
}

/// Configuration for the [`Trainer`](crate::driver::Trainer)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainConfig {
    /// Number of train iterations; models are saved after each one
    pub iterations: u32,
    /// Environment steps per algorithm per iteration
    pub timesteps: u64,
    pub algorithms: Vec<Algorithm>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            timesteps: 10240,
            algorithms: Algorithm::iter().collect(),
        }
    }
}

/// Configuration for rendering rollouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Height of the grid viewport in terminal rows
    pub window_size: u16,
    /// Frame rate cap
    pub fps: u32,
    /// Episodes to play out per algorithm
    pub episodes: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_size: 32,
            fps: 3,
            episodes: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_max_steps_scales_with_size() {
        assert_eq!(EnvConfig::new(4).max_steps(), 20, "5 steps per cell");
        assert_eq!(
            EnvConfig::new(4).with_max_steps(7).max_steps(),
            7,
            "Explicit step limit wins"
        );
    }

    #[test]
    fn validate_rejects_bad_grids() {
        assert!(matches!(
            EnvConfig::new(1).validate(),
            Err(Error::DegenerateGrid { size: 1 })
        ));
        assert!(matches!(
            EnvConfig::new(3).with_max_steps(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            EnvConfig::new(3)
                .with_agent_start(GridPosition::new(3, 0))
                .validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            EnvConfig::new(3)
                .with_agent_start(GridPosition::new(1, 1))
                .with_target_start(GridPosition::new(1, 1))
                .validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(EnvConfig::new(2).validate().is_ok(), "2x2 grid is playable");
    }

    #[test]
    fn train_config_defaults_to_every_algorithm() {
        let config = TrainConfig::default();
        assert_eq!(config.algorithms.len(), Algorithm::iter().count());
        assert_eq!(config.iterations, 10);
        assert_eq!(config.timesteps, 10240);
    }
}

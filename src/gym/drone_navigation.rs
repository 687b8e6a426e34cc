use std::{fmt, str::FromStr};

use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{Display, EnumIter, FromRepr, VariantArray};

use crate::{
    config::EnvConfig,
    env::{DiscreteActionSpace, Environment, Report, Step},
    Error, Result,
};

/// A cell on the grid, `(0, 0)` being the top left corner
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct GridPosition {
    pub x: usize,
    pub y: usize,
}

impl GridPosition {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(&self, size: usize) -> bool {
        self.x < size && self.y < size
    }

    /// L1 (taxicab) distance
    pub fn distance(&self, other: &Self) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Apply the displacement of `action`, clamping each component to the grid
    pub fn moved(self, action: Action, size: usize) -> Self {
        let (dx, dy) = action.displacement();
        let max = size as isize - 1;
        Self {
            x: (self.x as isize + dx).clamp(0, max) as usize,
            y: (self.y as isize + dy).clamp(0, max) as usize,
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Self {
        Self {
            x: rng.gen_range(0..size),
            y: rng.gen_range(0..size),
        }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Parses `x,y`, optionally wrapped in brackets or parentheses
impl FromStr for GridPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidConfig(format!("`{s}` is not a grid position, expected x,y"));
        let inner = s
            .trim()
            .trim_start_matches(['[', '('])
            .trim_end_matches([']', ')']);
        let (x, y) = inner.split_once(',').ok_or_else(invalid)?;
        Ok(Self {
            x: x.trim().parse().map_err(|_| invalid())?,
            y: y.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Movements available to the drone, index-encoded `0..4`
#[derive(FromRepr, EnumIter, VariantArray, Display, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

impl Action {
    /// Unit displacement `(dx, dy)` of this action
    pub const fn displacement(self) -> (isize, isize) {
        match self {
            Action::Right => (1, 0),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Up => (0, -1),
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self> {
        Self::from_repr(index).ok_or(Error::InvalidAction(index))
    }
}

/// The agent's and the target's positions concatenated: `[agent.x, agent.y, target.x, target.y]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Observation([usize; 4]);

impl Observation {
    pub fn new(agent: GridPosition, target: GridPosition) -> Self {
        Self([agent.x, agent.y, target.x, target.y])
    }

    pub fn agent(&self) -> GridPosition {
        GridPosition::new(self.0[0], self.0[1])
    }

    pub fn target(&self) -> GridPosition {
        GridPosition::new(self.0[2], self.0[3])
    }

    pub fn as_array(&self) -> [usize; 4] {
        self.0
    }
}

/// Diagnostics for the current state
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StepInfo {
    pub agent: GridPosition,
    pub target: GridPosition,
    /// L1 distance between the agent and the target
    pub distance: usize,
    /// The last move was clamped at the edge of the grid
    pub wall_collision: bool,
}

pub type DroneStep = Step<Observation, StepInfo>;

/// A drone flying over a square grid towards a target cell
///
/// The episode terminates when the drone reaches the target and is truncated when the
/// step limit is hit or when the drone flies into the edge of the grid. Rewards are
/// `size²` for reaching the target, `-size²` for a wall collision, and otherwise a
/// penalty proportional to the remaining distance that grows as the episode goes on.
///
/// Grids smaller than 2x2 are rejected because the target must start on a different
/// cell than the agent.
pub struct DroneNavigation {
    size: usize,
    max_steps: usize,
    agent: GridPosition,
    target: GridPosition,
    agent_start: Option<GridPosition>,
    target_start: Option<GridPosition>,
    episode_step: usize,
    // fixed for the episode, depends on the starting distance so that short episodes are still punished
    movement_cost: f64,
    rng: StdRng,
    pub report: Report,
}

impl DroneNavigation {
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.validate()?;
        let mut env = Self {
            size: config.size,
            max_steps: config.max_steps(),
            agent: GridPosition::default(),
            target: GridPosition::default(),
            agent_start: config.agent_start,
            target_start: config.target_start,
            episode_step: 0,
            movement_cost: 1.0,
            rng: StdRng::from_entropy(),
            report: Report::new(&["reward", "steps"]),
        };
        env.place();

        Ok(env)
    }

    /// Reseed the environment's random source
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn agent(&self) -> GridPosition {
        self.agent
    }

    pub fn target(&self) -> GridPosition {
        self.target
    }

    /// Steps taken in the current episode
    pub fn episode_step(&self) -> usize {
        self.episode_step
    }

    pub fn movement_cost(&self) -> f64 {
        self.movement_cost
    }

    pub fn distance(&self) -> usize {
        self.agent.distance(&self.target)
    }

    /// Step with an index-encoded action
    ///
    /// **Errors** with [`Error::InvalidAction`] before touching any state if `index` is not in `0..4`
    pub fn step_index(&mut self, index: usize) -> Result<DroneStep> {
        let action = Action::try_from(index)?;
        Ok(self.step(action))
    }

    /// Choose the agent and target cells for a new episode and derive the movement cost
    fn place(&mut self) {
        self.agent = match self.agent_start {
            Some(pos) => pos,
            None => self.sample_cell(self.target_start),
        };
        self.target = match self.target_start {
            Some(pos) => pos,
            None => self.sample_cell(Some(self.agent)),
        };
        self.movement_cost = 1.0 + 1.0 / self.distance() as f64;
    }

    /// Rejection-sample a cell uniformly, skipping `excluded`
    fn sample_cell(&mut self, excluded: Option<GridPosition>) -> GridPosition {
        loop {
            let pos = GridPosition::random(&mut self.rng, self.size);
            if Some(pos) != excluded {
                return pos;
            }
        }
    }

    fn info(&self, wall_collision: bool) -> StepInfo {
        StepInfo {
            agent: self.agent,
            target: self.target,
            distance: self.distance(),
            wall_collision,
        }
    }

    fn reward(&self, terminated: bool, wall_collision: bool) -> f64 {
        let area = (self.size * self.size) as f64;
        if terminated {
            return area;
        }
        if wall_collision {
            return -area;
        }

        let progress = self.episode_step as f64 / self.max_steps as f64;
        -(progress * self.movement_cost) * self.distance() as f64
    }
}

impl Environment for DroneNavigation {
    type Observation = Observation;
    type Action = Action;
    type Info = StepInfo;

    fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        if let Some(seed) = seed {
            self.seed(seed);
        }
        self.episode_step = 0;
        self.report.clear();
        self.place();
        log::trace!(
            "reset: agent {} target {} movement cost {:.3}",
            self.agent,
            self.target,
            self.movement_cost
        );

        (self.observation(), self.info(false))
    }

    fn step(&mut self, action: Action) -> DroneStep {
        self.episode_step += 1;

        let prev = self.agent;
        self.agent = prev.moved(action, self.size);

        let terminated = self.agent == self.target;
        // clamping is silent, an unchanged position is the only sign of hitting the edge
        let wall_collision = self.agent == prev;
        let truncated = self.episode_step == self.max_steps || wall_collision;
        let reward = self.reward(terminated, wall_collision);

        self.report.entry("steps").and_modify(|x| *x += 1.0);
        self.report.entry("reward").and_modify(|x| *x += reward);

        Step {
            observation: self.observation(),
            reward,
            terminated,
            truncated,
            info: self.info(wall_collision),
        }
    }

    fn observation(&self) -> Observation {
        Observation::new(self.agent, self.target)
    }
}

impl DiscreteActionSpace for DroneNavigation {
    fn actions(&self) -> Vec<Action> {
        Action::VARIANTS.to_vec()
    }
}

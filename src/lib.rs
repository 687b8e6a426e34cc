//! A grid-world drone navigation testbed for reinforcement learning
//!
//! A drone moves on a square grid toward a target. [`gym::DroneNavigation`] implements the
//! environment, [`policy`] holds the learners that act in it, and [`driver::Trainer`] trains,
//! saves, loads and plays them back on any [`render::Render`] surface.

/// Environment, episode and action space contracts
pub mod env;

/// Environment, training and rendering settings
pub mod config;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Training and playback loops
pub mod driver;

mod error;

/// Exploration policies
pub mod exploration;

/// Testing environments
pub mod gym;

/// Model files and training metrics
pub mod persistence;

/// Policies and learners
pub mod policy;

/// Rendering capability
pub mod render;

/// Terminal viewer
#[cfg(feature = "viz")]
pub mod viz;

mod util;

pub use error::{Error, Result};

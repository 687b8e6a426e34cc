pub mod drone_navigation;

pub use drone_navigation::{Action, DroneNavigation, DroneStep, GridPosition, Observation, StepInfo};

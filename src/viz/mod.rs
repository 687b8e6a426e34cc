//! Terminal visualization of rollouts
//!
//! The [`Viewer`] draws the grid with the target as a filled red square and the drone as a
//! filled blue circle, next to the log pane and a status bar. Press `q` or `Esc` to stop.

mod app;
mod components;
mod util;

pub use app::Viewer;

mod grid;
mod log;
mod status;

pub use grid::GridView;
pub use log::Logs;
pub use status::StatusBar;

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors produced by the environment, the policies and model persistence
#[derive(Error, Debug)]
pub enum Error {
    /// An index-encoded action outside of `0..4`
    #[error("invalid action {0}, expected an index in 0..4")]
    InvalidAction(usize),

    /// A grid too small to hold an agent and a distinct target
    #[error("grid size {size} is unsupported, at least 2 is required")]
    DegenerateGrid { size: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no saved models found in {}", .dir.display())]
    NoSavedModels { dir: PathBuf },

    /// A model trained on one grid size loaded into an environment of another
    #[error("model was saved for a {found}x{found} grid, environment is {expected}x{expected}")]
    GridMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

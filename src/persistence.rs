//! Model files and training metrics on disk
//!
//! Models are stored as `<models>/<size>/<algorithm>/<timesteps>.json`, training
//! metrics are appended to `<logs>/<size>/<algorithm>.csv`.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufReader, BufWriter},
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    policy::{Algorithm, LearnSummary},
    Error, Result,
};

const MODEL_EXTENSION: &str = "json";

/// The on-disk form of a [`Learner`](crate::policy::Learner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord<P> {
    pub algorithm: Algorithm,
    pub grid_size: usize,
    pub timesteps: u64,
    pub episodes: u64,
    /// Crate version that wrote the record
    pub version: String,
    /// Algorithm-specific parameters
    pub params: P,
}

impl<P> ModelRecord<P> {
    pub fn new(algorithm: Algorithm, grid_size: usize, timesteps: u64, episodes: u64, params: P) -> Self {
        Self {
            algorithm,
            grid_size,
            timesteps,
            episodes,
            version: env!("CARGO_PKG_VERSION").to_string(),
            params,
        }
    }

    /// Check that the record was written by `algorithm` for a grid of `grid_size`
    pub fn check(&self, algorithm: Algorithm, grid_size: usize) -> Result<()> {
        if self.algorithm != algorithm {
            return Err(Error::InvalidConfig(format!(
                "model was trained with {}, expected {algorithm}",
                self.algorithm
            )));
        }
        if self.grid_size != grid_size {
            return Err(Error::GridMismatch {
                expected: grid_size,
                found: self.grid_size,
            });
        }
        Ok(())
    }
}

/// Serialize `value` as pretty JSON, creating parent directories as needed
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// One row of the training metrics log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    pub iteration: u32,
    /// The learner's total timesteps after this iteration
    pub timesteps: u64,
    pub episodes: u64,
    pub mean_reward: f64,
    pub success_rate: f64,
}

impl MetricsRow {
    pub fn new(iteration: u32, total_timesteps: u64, summary: &LearnSummary) -> Self {
        Self {
            iteration,
            timesteps: total_timesteps,
            episodes: summary.episodes,
            mean_reward: summary.mean_reward,
            success_rate: summary.success_rate,
        }
    }
}

/// Directory layout for the models and logs of one grid size
#[derive(Debug, Clone)]
pub struct ModelStore {
    models_dir: PathBuf,
    logs_dir: PathBuf,
}

impl ModelStore {
    pub fn new(models_root: impl AsRef<Path>, logs_root: impl AsRef<Path>, grid_size: usize) -> Self {
        let size = grid_size.to_string();
        Self {
            models_dir: models_root.as_ref().join(&size),
            logs_dir: logs_root.as_ref().join(size),
        }
    }

    /// Create the model and log directories for `algorithms` if they do not exist
    pub fn create_dirs(&self, algorithms: &[Algorithm]) -> Result<()> {
        fs::create_dir_all(&self.logs_dir)?;
        for algorithm in algorithms {
            fs::create_dir_all(self.model_dir(*algorithm))?;
        }
        Ok(())
    }

    pub fn model_dir(&self, algorithm: Algorithm) -> PathBuf {
        self.models_dir.join(algorithm.to_string())
    }

    pub fn model_path(&self, algorithm: Algorithm, timesteps: u64) -> PathBuf {
        self.model_dir(algorithm)
            .join(format!("{timesteps}.{MODEL_EXTENSION}"))
    }

    /// Saved timestep counts for `algorithm`, ascending
    pub fn versions(&self, algorithm: Algorithm) -> Result<Vec<u64>> {
        let dir = self.model_dir(algorithm);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(MODEL_EXTENSION) {
                continue;
            }
            if let Some(version) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse().ok())
            {
                versions.push(version);
            }
        }
        versions.sort_unstable();

        Ok(versions)
    }

    /// The model file to load: `version` if given, the most trained one otherwise
    pub fn resolve(&self, algorithm: Algorithm, version: Option<u64>) -> Result<PathBuf> {
        let version = match version {
            Some(version) => version,
            None => *self
                .versions(algorithm)?
                .last()
                .ok_or_else(|| Error::NoSavedModels {
                    dir: self.model_dir(algorithm),
                })?,
        };
        Ok(self.model_path(algorithm, version))
    }

    pub fn metrics_path(&self, algorithm: Algorithm) -> PathBuf {
        self.logs_dir.join(format!("{algorithm}.csv"))
    }

    /// Append a row to the metrics log of `algorithm`, writing the header for a new file
    pub fn append_metrics(&self, algorithm: Algorithm, row: &MetricsRow) -> Result<()> {
        let path = self.metrics_path(algorithm);
        let is_new = !path.exists();

        fs::create_dir_all(&self.logs_dir)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        wtr.serialize(row)?;
        wtr.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn layout_keyed_by_size_and_algorithm() {
        let store = ModelStore::new("models", "logs", 6);
        assert_eq!(
            store.model_path(Algorithm::Heuristic, 2048),
            Path::new("models/6/heuristic/2048.json")
        );
        assert_eq!(
            store.metrics_path(Algorithm::Random),
            Path::new("logs/6/random.csv")
        );
    }

    #[test]
    fn resolve_picks_most_trained_model() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"), dir.path().join("logs"), 4);
        store.create_dirs(&[Algorithm::Random]).unwrap();

        for version in [512, 10240, 2048] {
            fs::write(store.model_path(Algorithm::Random, version), "{}").unwrap();
        }
        fs::write(store.model_dir(Algorithm::Random).join("notes.txt"), "").unwrap();
        fs::write(store.model_dir(Algorithm::Random).join("best.json"), "{}").unwrap();

        assert_eq!(
            store.versions(Algorithm::Random).unwrap(),
            [512, 2048, 10240],
            "Only numbered model files count"
        );
        assert_eq!(
            store.resolve(Algorithm::Random, None).unwrap(),
            store.model_path(Algorithm::Random, 10240)
        );
        assert_eq!(
            store.resolve(Algorithm::Random, Some(512)).unwrap(),
            store.model_path(Algorithm::Random, 512),
            "Explicit version wins"
        );
    }

    #[test]
    fn resolve_without_models_fails() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"), dir.path().join("logs"), 4);

        assert!(matches!(
            store.resolve(Algorithm::Heuristic, None),
            Err(Error::NoSavedModels { .. })
        ));
    }

    #[test]
    fn metrics_header_written_once() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"), dir.path().join("logs"), 3);
        let summary = LearnSummary {
            timesteps: 100,
            episodes: 10,
            mean_reward: -1.5,
            success_rate: 0.5,
        };

        store
            .append_metrics(Algorithm::Random, &MetricsRow::new(1, 100, &summary))
            .unwrap();
        store
            .append_metrics(Algorithm::Random, &MetricsRow::new(2, 200, &summary))
            .unwrap();

        let contents = fs::read_to_string(store.metrics_path(Algorithm::Random)).unwrap();
        let lines = contents.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3, "Header plus two rows");
        assert_eq!(lines[0], "iteration,timesteps,episodes,mean_reward,success_rate");
        assert!(lines[2].starts_with("2,200,10,"), "Rows appended in order");
    }

    #[test]
    fn record_check() {
        let record = ModelRecord::new(Algorithm::Random, 5, 10, 2, ());
        assert!(record.check(Algorithm::Random, 5).is_ok());
        assert!(matches!(
            record.check(Algorithm::Random, 6),
            Err(Error::GridMismatch { expected: 6, found: 5 })
        ));
        assert!(matches!(
            record.check(Algorithm::Heuristic, 5),
            Err(Error::InvalidConfig(_))
        ));
    }
}

//! Training and playback of learners in the [`DroneNavigation`] environment

use std::{collections::BTreeMap, path::PathBuf};

use crate::{
    config::TrainConfig,
    env::Environment,
    gym::DroneNavigation,
    persistence::{MetricsRow, ModelStore},
    policy::{Algorithm, Learner, Policy},
    render::{Frame, Progress, Render, Signal},
    Error, Result,
};

/// How a played out episode ended
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeOutcome {
    pub episode: u32,
    pub reward: f64,
    pub steps: usize,
    pub reached_target: bool,
}

/// Play one episode of `policy` in `env`, drawing every state on `renderer`
///
/// **Returns** `None` if the renderer asked to stop before the episode finished
pub fn run_episode<P>(
    env: &mut DroneNavigation,
    policy: &mut P,
    renderer: &mut dyn Render,
    algorithm: Algorithm,
    episode: u32,
) -> Result<Option<EpisodeOutcome>>
where
    P: Policy<DroneNavigation> + ?Sized,
{
    let (mut obs, _) = env.reset(None);

    let frame = |env: &DroneNavigation| Frame {
        agent: env.agent(),
        target: env.target(),
        grid_size: env.size(),
        algorithm,
        episode,
        step: env.episode_step(),
        reward: env.report["reward"],
    };

    if renderer.draw_frame(&frame(&*env))? == Signal::Quit {
        return Ok(None);
    }

    loop {
        let step = env.step(policy.predict(&obs));
        obs = step.observation;

        if renderer.draw_frame(&frame(&*env))? == Signal::Quit {
            return Ok(None);
        }

        if step.is_done() {
            let report = env.report.take();
            return Ok(Some(EpisodeOutcome {
                episode,
                reward: report["reward"],
                steps: report["steps"] as usize,
                reached_target: step.terminated,
            }));
        }
    }
}

/// Trains, saves, loads and plays back a set of learners on one environment
pub struct Trainer {
    env: DroneNavigation,
    store: ModelStore,
    config: TrainConfig,
    learners: BTreeMap<Algorithm, Box<dyn Learner<DroneNavigation>>>,
}

impl Trainer {
    /// Build a fresh learner per configured algorithm and create the model and log directories
    pub fn new(
        env: DroneNavigation,
        store: ModelStore,
        config: TrainConfig,
        seed: Option<u64>,
    ) -> Result<Self> {
        store.create_dirs(&config.algorithms)?;
        let learners = config
            .algorithms
            .iter()
            .map(|&algorithm| (algorithm, algorithm.build(env.size(), seed)))
            .collect();

        Ok(Self {
            env,
            store,
            config,
            learners,
        })
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.config.algorithms
    }

    pub fn learner(&self, algorithm: Algorithm) -> Option<&dyn Learner<DroneNavigation>> {
        self.learners.get(&algorithm).map(|learner| &**learner)
    }

    fn learner_mut(&mut self, algorithm: Algorithm) -> Result<&mut Box<dyn Learner<DroneNavigation>>> {
        self.learners.get_mut(&algorithm).ok_or_else(|| {
            Error::InvalidConfig(format!("{algorithm} was not selected for this run"))
        })
    }

    /// Run every learner for `timesteps` steps per iteration, logging metrics after each
    ///
    /// With `save`, each learner is written to the model store after every iteration,
    /// keyed by its total timesteps.
    pub fn train(&mut self, save: bool, renderer: &mut dyn Render) -> Result<()> {
        let TrainConfig {
            iterations,
            timesteps,
            ..
        } = self.config;

        for iteration in 1..=iterations {
            log::info!("Iteration no. {iteration}/{iterations}");

            for (&algorithm, learner) in self.learners.iter_mut() {
                let summary = learner.learn(&mut self.env, timesteps);
                log::info!(
                    "{algorithm}: {} episodes, mean reward {:.2}, reached target {:.1}%",
                    summary.episodes,
                    summary.mean_reward,
                    summary.success_rate * 100.0
                );

                let row = MetricsRow::new(iteration, learner.timesteps(), &summary);
                self.store.append_metrics(algorithm, &row)?;

                if save {
                    let path = self.store.model_path(algorithm, learner.timesteps());
                    learner.save(&path)?;
                    log::debug!("saved {algorithm} to {}", path.display());
                }

                let progress = Progress {
                    algorithm,
                    iteration,
                    iterations,
                    summary,
                };
                if renderer.draw_progress(&progress)? == Signal::Quit {
                    log::warn!("training interrupted at iteration {iteration}");
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    /// Restore `algorithm` from the store, the most trained model unless `version` is given
    pub fn load(&mut self, algorithm: Algorithm, version: Option<u64>) -> Result<PathBuf> {
        let path = self.store.resolve(algorithm, version)?;
        self.learner_mut(algorithm)?.load(&path)?;
        log::info!("loaded {algorithm} from {}", path.display());
        Ok(path)
    }

    /// Play `episodes` episodes of `algorithm`, stopping early if the renderer asks to
    pub fn render_results(
        &mut self,
        algorithm: Algorithm,
        episodes: u32,
        renderer: &mut dyn Render,
    ) -> Result<Vec<EpisodeOutcome>> {
        log::info!("Episodes for algorithm {algorithm}");

        let learner = self.learners.get_mut(&algorithm).ok_or_else(|| {
            Error::InvalidConfig(format!("{algorithm} was not selected for this run"))
        })?;

        let mut outcomes = Vec::with_capacity(episodes as usize);
        for episode in 1..=episodes {
            let Some(outcome) =
                run_episode(&mut self.env, &mut **learner, renderer, algorithm, episode)?
            else {
                break;
            };

            log::info!(
                "Finished episode {episode} with reward {:.2} and {}",
                outcome.reward,
                if outcome.reached_target {
                    "reached the target"
                } else {
                    "did not reach the target"
                }
            );
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use tempfile::tempdir;

    use super::*;
    use crate::{
        config::EnvConfig,
        gym::{Action, GridPosition, Observation},
        render::Headless,
    };

    /// Records what it is asked to draw, asking to quit after `quit_after` frames
    #[derive(Default)]
    struct Recorder {
        frames: Vec<Frame>,
        progress: Vec<Progress>,
        quit_after: Option<usize>,
    }

    impl Render for Recorder {
        fn initialize(&mut self, _window_size: u16) -> io::Result<()> {
            Ok(())
        }

        fn draw_frame(&mut self, frame: &Frame) -> io::Result<Signal> {
            self.frames.push(frame.clone());
            match self.quit_after {
                Some(n) if self.frames.len() >= n => Ok(Signal::Quit),
                _ => Ok(Signal::Continue),
            }
        }

        fn draw_progress(&mut self, progress: &Progress) -> io::Result<Signal> {
            self.progress.push(progress.clone());
            Ok(Signal::Continue)
        }

        fn close(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Fixed(Action);

    impl Policy<DroneNavigation> for Fixed {
        fn predict(&mut self, _observation: &Observation) -> Action {
            self.0
        }
    }

    fn pinned_env() -> DroneNavigation {
        let config = EnvConfig::new(4)
            .with_agent_start(GridPosition::new(0, 1))
            .with_target_start(GridPosition::new(3, 1));
        DroneNavigation::new(config).unwrap()
    }

    #[test]
    fn episode_reaches_target() {
        let mut env = pinned_env();
        let mut recorder = Recorder::default();

        let outcome = run_episode(
            &mut env,
            &mut Fixed(Action::Right),
            &mut recorder,
            Algorithm::Heuristic,
            1,
        )
        .unwrap()
        .expect("not interrupted");

        assert!(outcome.reached_target);
        assert_eq!(outcome.steps, 3);
        assert_eq!(recorder.frames.len(), 4, "Initial state plus one frame per step");
        assert_eq!(recorder.frames[0].step, 0);
        assert_eq!(recorder.frames[3].agent, GridPosition::new(3, 1));
        assert_eq!(recorder.frames[3].reward, outcome.reward, "Frames carry the running reward");
    }

    #[test]
    fn episode_ends_on_wall() {
        let mut env = pinned_env();
        let outcome = run_episode(&mut env, &mut Fixed(Action::Left), &mut Headless, Algorithm::Random, 1)
            .unwrap()
            .unwrap();

        assert!(!outcome.reached_target);
        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.reward, -16.0);
    }

    #[test]
    fn renderer_can_interrupt() {
        let mut env = pinned_env();
        let mut recorder = Recorder {
            quit_after: Some(2),
            ..Default::default()
        };

        let outcome = run_episode(
            &mut env,
            &mut Fixed(Action::Right),
            &mut recorder,
            Algorithm::Random,
            1,
        )
        .unwrap();
        assert!(outcome.is_none(), "Quit stops the episode");
        assert_eq!(recorder.frames.len(), 2);
    }

    #[test]
    fn train_saves_every_iteration() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"), dir.path().join("logs"), 4);
        let config = TrainConfig {
            iterations: 3,
            timesteps: 100,
            algorithms: vec![Algorithm::Random, Algorithm::Heuristic],
        };
        let env = DroneNavigation::new(EnvConfig::new(4)).unwrap();
        let mut trainer = Trainer::new(env, store.clone(), config, Some(5)).unwrap();
        let mut recorder = Recorder::default();

        trainer.train(true, &mut recorder).unwrap();

        for algorithm in [Algorithm::Random, Algorithm::Heuristic] {
            assert_eq!(store.versions(algorithm).unwrap(), [100, 200, 300]);
            assert_eq!(trainer.learner(algorithm).unwrap().timesteps(), 300);
            assert!(store.metrics_path(algorithm).exists(), "Metrics logged");
        }
        assert_eq!(recorder.progress.len(), 6, "Progress per iteration per algorithm");
        assert_eq!(recorder.progress[5].iteration, 3);
    }

    #[test]
    fn train_without_save_writes_no_models() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"), dir.path().join("logs"), 3);
        let config = TrainConfig {
            iterations: 2,
            timesteps: 10,
            algorithms: vec![Algorithm::Random],
        };
        let env = DroneNavigation::new(EnvConfig::new(3)).unwrap();
        let mut trainer = Trainer::new(env, store.clone(), config, None).unwrap();

        trainer.train(false, &mut Headless).unwrap();
        assert!(store.versions(Algorithm::Random).unwrap().is_empty());
        assert!(store.model_dir(Algorithm::Random).is_dir(), "Directories still created");
    }

    #[test]
    fn load_and_render_latest() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models"), dir.path().join("logs"), 5);
        let config = TrainConfig {
            iterations: 2,
            timesteps: 50,
            algorithms: vec![Algorithm::Heuristic],
        };

        let env = DroneNavigation::new(EnvConfig::new(5)).unwrap();
        let mut trainer = Trainer::new(env, store.clone(), config.clone(), Some(1)).unwrap();
        trainer.train(true, &mut Headless).unwrap();

        let env = DroneNavigation::new(EnvConfig::new(5)).unwrap();
        let mut fresh = Trainer::new(env, store.clone(), config, Some(1)).unwrap();
        let path = fresh.load(Algorithm::Heuristic, None).unwrap();
        assert_eq!(path, store.model_path(Algorithm::Heuristic, 100));
        assert_eq!(fresh.learner(Algorithm::Heuristic).unwrap().timesteps(), 100);

        let outcomes = fresh.render_results(Algorithm::Heuristic, 4, &mut Headless).unwrap();
        assert_eq!(outcomes.len(), 4);
        assert_eq!(
            outcomes.iter().map(|o| o.episode).collect::<Vec<_>>(),
            [1, 2, 3, 4]
        );

        assert!(matches!(
            fresh.load(Algorithm::Random, None),
            Err(Error::NoSavedModels { .. })
        ));
    }
}

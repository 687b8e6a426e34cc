use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use drone_nav::{
    config::{EnvConfig, RenderConfig, TrainConfig},
    driver::{EpisodeOutcome, Trainer},
    gym::{DroneNavigation, GridPosition},
    persistence::ModelStore,
    policy::Algorithm,
    render::{Headless, Render},
    viz::Viewer,
};
use strum::IntoEnumIterator;

#[derive(Parser)]
#[command(name = "drone-nav")]
#[command(version, about = "Train and watch agents fly a drone to its target on a grid")]
struct Cli {
    /// What to run
    #[arg(long, value_enum)]
    action: Command,

    /// Grid edge length
    #[arg(long)]
    size: usize,

    /// Steps before an episode is truncated [default: 5 x size]
    #[arg(long)]
    max_steps: Option<usize>,

    /// Start every episode with the drone at X,Y
    #[arg(long)]
    agent_location: Option<GridPosition>,

    /// Start every episode with the target at X,Y
    #[arg(long)]
    target_location: Option<GridPosition>,

    /// Training iterations, models are saved after each one
    #[arg(long, default_value_t = TrainConfig::default().iterations)]
    iterations: u32,

    /// Environment steps per algorithm per iteration
    #[arg(long, default_value_t = TrainConfig::default().timesteps)]
    timesteps: u64,

    /// Comma separated algorithms to train or load [default: all]
    #[arg(long, value_enum, value_delimiter = ',')]
    algorithms: Vec<Algorithm>,

    /// Timesteps of the saved model to load [default: the most trained]
    #[arg(long)]
    model_version: Option<u64>,

    /// Episodes to play out per algorithm
    #[arg(long, default_value_t = RenderConfig::default().episodes)]
    render_episodes: u32,

    /// Seed for the environment and the learners
    #[arg(long)]
    seed: Option<u64>,

    /// Frame rate cap while rendering, 0 for none
    #[arg(long, default_value_t = RenderConfig::default().fps)]
    fps: u32,

    /// Height of the grid viewport in terminal rows
    #[arg(long, default_value_t = RenderConfig::default().window_size)]
    window_size: u16,

    #[arg(long, default_value = "models")]
    models_dir: PathBuf,

    #[arg(long, default_value = "logs")]
    logs_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Command {
    /// Load the saved models and play them back
    #[value(name = "load_and_render")]
    LoadAndRender,
    /// Train and save a model after every iteration
    #[value(name = "train_and_save")]
    TrainAndSave,
    /// Train without saving, then play the trained policies back
    #[value(name = "train_and_render")]
    TrainAndRender,
}

impl Cli {
    fn env_config(&self) -> EnvConfig {
        let mut config = EnvConfig::new(self.size);
        config.max_steps = self.max_steps;
        config.agent_start = self.agent_location;
        config.target_start = self.target_location;
        config
    }

    fn train_config(&self) -> TrainConfig {
        let algorithms = if self.algorithms.is_empty() {
            Algorithm::iter().collect()
        } else {
            let mut algorithms = self.algorithms.clone();
            algorithms.sort_unstable();
            algorithms.dedup();
            algorithms
        };

        TrainConfig {
            iterations: self.iterations,
            timesteps: self.timesteps,
            algorithms,
        }
    }

    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_size: self.window_size,
            fps: self.fps,
            episodes: self.render_episodes,
        }
    }
}

fn init_logging(command: Command) -> Result<()> {
    match command {
        Command::TrainAndSave => tracing_subscriber::fmt()
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to install the log subscriber"),
        Command::LoadAndRender | Command::TrainAndRender => {
            tui_logger::init_logger(log::LevelFilter::Debug)
                .context("Failed to install the log pane")?;
            tui_logger::set_default_level(log::LevelFilter::Info);
            Ok(())
        }
    }
}

fn run(cli: &Cli, trainer: &mut Trainer, viewer: &mut Viewer) -> Result<Vec<(Algorithm, Vec<EpisodeOutcome>)>> {
    let render = cli.render_config();
    let mut results = Vec::new();

    match cli.action {
        Command::TrainAndSave => {
            trainer.train(true, &mut Headless)?;
        }
        Command::TrainAndRender => {
            viewer.initialize(render.window_size)?;
            trainer.train(false, viewer)?;
            for algorithm in trainer.algorithms().to_vec() {
                let outcomes = trainer.render_results(algorithm, render.episodes, viewer)?;
                results.push((algorithm, outcomes));
            }
        }
        Command::LoadAndRender => {
            for algorithm in trainer.algorithms().to_vec() {
                trainer
                    .load(algorithm, cli.model_version)
                    .with_context(|| format!("Failed to load a saved {algorithm} model"))?;
            }
            viewer.initialize(render.window_size)?;
            for algorithm in trainer.algorithms().to_vec() {
                let outcomes = trainer.render_results(algorithm, render.episodes, viewer)?;
                results.push((algorithm, outcomes));
            }
        }
    }

    Ok(results)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.action)?;

    let mut env = DroneNavigation::new(cli.env_config()).context("Invalid environment")?;
    if let Some(seed) = cli.seed {
        env.seed(seed);
    }
    let store = ModelStore::new(&cli.models_dir, &cli.logs_dir, cli.size);
    let mut trainer = Trainer::new(env, store, cli.train_config(), cli.seed)
        .context("Failed to set up the model and log directories")?;

    let mut viewer = Viewer::new(cli.fps);
    let results = run(&cli, &mut trainer, &mut viewer);
    viewer.close()?;

    for (algorithm, outcomes) in results? {
        let reached = outcomes.iter().filter(|o| o.reached_target).count();
        let mean_reward =
            outcomes.iter().map(|o| o.reward).sum::<f64>() / outcomes.len().max(1) as f64;
        println!(
            "{algorithm}: reached the target in {reached}/{} episodes, mean reward {mean_reward:.2}",
            outcomes.len()
        );
    }

    Ok(())
}

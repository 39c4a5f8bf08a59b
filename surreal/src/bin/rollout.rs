use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use surreal::rollout::{
    restore_agent, restore_config, restore_env, restore_model, run_episode, Rendering,
};
use surreal_core::{
    render::{RenderContext, RenderOptions},
    Env, SurrealError,
};

/// Replays the latest checkpoint of an experiment.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Folder of the experiment, with `checkpoint/` and `config.yml`
    folder: PathBuf,

    /// Number of episodes, runs until interrupted if not given
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Maximum number of steps in an episode
    #[arg(short, long, default_value_t = 200)]
    steps: usize,

    /// Saves rendered frames as PNG files in this directory
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Renders without opening a window
    #[arg(long, default_value_t = false)]
    headless: bool,
}

#[cfg(feature = "window")]
fn render_context(headless: bool) -> RenderContext {
    match headless {
        true => RenderContext::headless(),
        false => RenderContext::window("rollout"),
    }
}

#[cfg(not(feature = "window"))]
fn render_context(headless: bool) -> RenderContext {
    if !headless {
        warn!("Built without feature `window`, rendering headless");
    }
    RenderContext::headless()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Loading policy located at {:?}", args.folder);
    let model = restore_model(args.folder.join("checkpoint"))?;
    let configs = restore_config(args.folder.join("config.yml"))?;
    let (mut env, _) = restore_env(&configs.env_config)?;
    let mut agent = restore_agent(&configs.learner_config, model);
    info!("Successfully loaded agent and model");

    let mut rendering = Rendering::new(
        render_context(args.headless),
        RenderOptions::default(),
        args.frames_dir.clone(),
    )?;

    let mut episode = 0;
    while args.episodes.map_or(true, |n| episode < n) {
        match run_episode(&mut env, &mut agent, args.steps, Some(&mut rendering)) {
            Ok(ret) => info!("Episode {}, return: {}", episode, ret),
            Err(e) => match e.downcast_ref::<SurrealError>() {
                Some(SurrealError::WindowClosed) => {
                    info!("Window closed");
                    break;
                }
                _ => return Err(e),
            },
        }
        episode += 1;
    }

    rendering.close();
    env.close()?;
    Ok(())
}

//! Replaying a trained policy.
use crate::SessionConfig;
use anyhow::Result;
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};
use surreal_core::{
    render::{save_png, RenderContext, RenderOptions},
    Env, Policy,
};
use surreal_env::{make_env, EnvConfig, EnvMode, Pipeline};
use surreal_policy::{AgentConfig, Mlp, MlpAgent};

pub use surreal_policy::restore_model;

/// Configuration of the learner.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct LearnerConfig {
    /// Agent acting with the trained model.
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Configurations saved with an experiment, usually as `config.yml`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Configs {
    pub session_config: SessionConfig,
    pub learner_config: LearnerConfig,
    pub env_config: EnvConfig,
}

impl Configs {
    /// Saves [`Configs`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Loads the configurations of an experiment.
pub fn restore_config(path: impl AsRef<Path>) -> Result<Configs> {
    let file = File::open(path)?;
    let rdr = BufReader::new(file);
    let configs = serde_yaml::from_reader(rdr)?;
    Ok(configs)
}

/// Builds the evaluation environment, with rendering enabled.
///
/// Returns the environment and the configuration it was built from.
pub fn restore_env(env_config: &EnvConfig) -> Result<(Pipeline, EnvConfig)> {
    let env_config = env_config.clone().render_in_eval(true);
    let env = make_env(&env_config, EnvMode::Eval)?;
    Ok((env, env_config))
}

/// Constructs the agent acting with `model`.
pub fn restore_agent(learner_config: &LearnerConfig, model: Mlp) -> MlpAgent {
    MlpAgent::new(model, learner_config.agent.clone())
}

/// Renders frames and optionally saves them as PNG files.
pub struct Rendering {
    ctx: RenderContext,
    opts: RenderOptions,
    frames_dir: Option<PathBuf>,
    n_frames: usize,
}

impl Rendering {
    /// `frames_dir` is created if it does not exist.
    pub fn new(ctx: RenderContext, opts: RenderOptions, frames_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = &frames_dir {
            fs::create_dir_all(dir)?;
        }
        Ok(Self {
            ctx,
            opts,
            frames_dir,
            n_frames: 0,
        })
    }

    /// Number of frames rendered so far.
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    fn render(&mut self, env: &mut dyn Env) -> Result<()> {
        if let Some(frame) = env.render(&mut self.ctx, &self.opts)? {
            if let Some(dir) = &self.frames_dir {
                save_png(&frame, dir.join(format!("frame_{:06}.png", self.n_frames)))?;
            }
            self.n_frames += 1;
        }
        Ok(())
    }

    /// Releases the surface.
    pub fn close(&mut self) {
        self.ctx.close();
    }
}

/// Runs an episode of at most `max_steps` steps and returns its return.
pub fn run_episode(
    env: &mut dyn Env,
    agent: &mut impl Policy,
    max_steps: usize,
    mut rendering: Option<&mut Rendering>,
) -> Result<f32> {
    let (mut obs, _) = env.reset()?;
    let mut ret = 0.0;
    for _ in 0..max_steps {
        let a = agent.act(&obs)?;
        let step = env.step(&a)?;
        trace!("reward = {}", step.reward);
        if let Some(rendering) = rendering.as_deref_mut() {
            rendering.render(env)?;
        }
        ret += step.reward;
        if step.is_done() {
            break;
        }
        obs = step.obs;
    }
    info!("return: {}", ret);
    Ok(ret)
}

//! Configuration of environments and assembly of their pipelines.
use crate::{
    adapter::{DmControlAdapter, DmControlSpecOnly, GymAdapter},
    classic::Pendulum,
    FrameStack, Grayscale, MaxStep, ObservationConcatenation, Pipeline,
};
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use surreal_core::{Env, SurrealError};

/// Name of the environment providing only the specs of a pixel physics environment.
pub const DM_CONTROL_DUMMY: &str = "dm_control_dummy";

/// What an environment is built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvMode {
    /// Sampling transitions for the learner.
    Training,

    /// Evaluating or replaying a policy.
    Eval,
}

/// Settings applied in [`EnvMode::Eval`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct EvalModeConfig {
    /// Renders the environment at every step.
    #[serde(default)]
    pub render: bool,
}

/// Configuration of an environment.
///
/// `env_name` is `<backend>:<id>`, e.g. `gym:Pendulum-v1` or `dm_control:cheetah-run`.
/// `dm_control_dummy` builds a pixel environment that has specs but cannot be stepped.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EnvConfig {
    /// Name of the environment.
    pub env_name: String,

    /// Observations include pixels.
    #[serde(default)]
    pub pixel_input: bool,

    /// Converts pixels to a single channel.
    #[serde(default)]
    pub grayscale: bool,

    /// Number of stacked frames, 1 disables stacking.
    #[serde(default = "default_frame_stacks")]
    pub frame_stacks: usize,

    /// Truncates episodes after this number of steps.
    #[serde(default)]
    pub max_steps: Option<usize>,

    /// Seed of the random initial state.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Settings applied in [`EnvMode::Eval`].
    #[serde(default)]
    pub eval_mode: EvalModeConfig,
}

fn default_frame_stacks() -> usize {
    1
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            env_name: format!("gym:{}", Pendulum::NAME),
            pixel_input: false,
            grayscale: false,
            frame_stacks: 1,
            max_steps: None,
            seed: None,
            eval_mode: EvalModeConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Sets the name of the environment.
    pub fn env_name(mut self, v: impl Into<String>) -> Self {
        self.env_name = v.into();
        self
    }

    /// Sets if observations include pixels.
    pub fn pixel_input(mut self, v: bool) -> Self {
        self.pixel_input = v;
        self
    }

    /// Sets if pixels are converted to a single channel.
    pub fn grayscale(mut self, v: bool) -> Self {
        self.grayscale = v;
        self
    }

    /// Sets the number of stacked frames.
    pub fn frame_stacks(mut self, v: usize) -> Self {
        self.frame_stacks = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the seed.
    pub fn seed(mut self, v: Option<u64>) -> Self {
        self.seed = v;
        self
    }

    /// Sets if the environment is rendered in [`EnvMode::Eval`].
    pub fn render_in_eval(mut self, v: bool) -> Self {
        self.eval_mode.render = v;
        self
    }

    /// Returns `true` if the environment should be rendered in the given mode.
    pub fn renders(&self, mode: EnvMode) -> bool {
        mode == EnvMode::Eval && self.eval_mode.render
    }

    /// Constructs [`EnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    fn backend(&self) -> (&str, &str) {
        match self.env_name.split_once(':') {
            Some((backend, id)) => (backend, id),
            None => (self.env_name.as_str(), ""),
        }
    }
}

fn config_error(msg: String) -> anyhow::Error {
    SurrealError::Config(msg).into()
}

/// Builds the pipeline described by `config`.
///
/// Pixel environments get, in order, observation concatenation, grayscale conversion if
/// enabled, frame stacking if `frame_stacks > 1` and the step limit if any. Classic-control
/// environments only get the step limit.
pub fn make_env(config: &EnvConfig, mode: EnvMode) -> Result<Pipeline> {
    info!("Make environment {} in {:?} mode", config.env_name, mode);

    let env = match config.backend() {
        ("gym", id) => make_gym(config, id)?,
        ("dm_control", id) => {
            let base = dm_control_base(config, id)?;
            with_pixel_stages(config, base)?
        }
        (DM_CONTROL_DUMMY, "") => {
            let base = Box::new(DmControlAdapter::new(DmControlSpecOnly::new()));
            with_pixel_stages(config, base)?
        }
        _ => {
            return Err(config_error(format!(
                "unknown environment {}",
                config.env_name
            )))
        }
    };

    let env = match config.max_steps {
        Some(n) => env.with(MaxStep::new(n)?)?,
        None => env,
    };
    info!("Environment {}", env);
    Ok(env)
}

fn make_gym(config: &EnvConfig, id: &str) -> Result<Pipeline> {
    if config.pixel_input || config.grayscale || config.frame_stacks > 1 {
        return Err(config_error(format!(
            "{} does not provide pixel observations",
            config.env_name
        )));
    }

    let base: Box<dyn Env> = if id == Pendulum::NAME {
        Box::new(GymAdapter::new(Pendulum::new(config.seed)))
    } else {
        py_gym(config, id)?
    };
    Ok(Pipeline::new(base))
}

#[cfg(feature = "py")]
fn py_gym(config: &EnvConfig, id: &str) -> Result<Box<dyn Env>> {
    let backend = crate::py::PyGymBackend::new(id, config.seed)?;
    Ok(Box::new(GymAdapter::new(backend)))
}

#[cfg(not(feature = "py"))]
fn py_gym(_config: &EnvConfig, id: &str) -> Result<Box<dyn Env>> {
    Err(config_error(format!(
        "{} is not a native environment, enable feature `py`",
        id
    )))
}

#[cfg(feature = "py")]
fn dm_control_base(config: &EnvConfig, id: &str) -> Result<Box<dyn Env>> {
    let (domain, task) = id.split_once('-').ok_or_else(|| {
        config_error(format!("expected dm_control:<domain>-<task>, got {}", id))
    })?;
    let backend = crate::py::PyDmControlBackend::new(domain, task, config.seed)?;
    Ok(Box::new(DmControlAdapter::new(backend)))
}

#[cfg(not(feature = "py"))]
fn dm_control_base(_config: &EnvConfig, id: &str) -> Result<Box<dyn Env>> {
    Err(config_error(format!(
        "dm_control:{} requires feature `py`",
        id
    )))
}

fn with_pixel_stages(config: &EnvConfig, base: Box<dyn Env>) -> Result<Pipeline> {
    if !config.pixel_input {
        return Err(config_error(format!(
            "{} only provides pixel observations",
            config.env_name
        )));
    }

    let mut env = Pipeline::new(base).with(ObservationConcatenation)?;
    if config.grayscale {
        env = env.with(Grayscale)?;
    }
    if config.frame_stacks > 1 {
        env = env.with(FrameStack::new(config.frame_stacks)?)?;
    }
    Ok(env)
}

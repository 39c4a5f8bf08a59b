//! Configuration of a training session.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};
use surreal_core::SurrealError;
use surreal_tensorplex::TensorplexConfig;

/// Defaults filling the keys missing in a session configuration.
pub const BASE_SESSION_CONFIG: &str = r#"{
    "tensorplex": {
        "agent_bin_size": 8,
        "max_processes": 4
    },
    "checkpoint": {
        "restore": false,
        "restore_folder": null
    }
}"#;

/// Restoring a session from a checkpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CheckpointConfig {
    /// Restores the latest checkpoint at start.
    pub restore: bool,

    /// Folder of checkpoints to restore from.
    pub restore_folder: Option<PathBuf>,
}

/// Configuration of a training session.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SessionConfig {
    /// Folder of the session, where metrics and checkpoints are written.
    pub folder: PathBuf,

    /// Metrics server.
    pub tensorplex: TensorplexConfig,

    /// Restoring from a checkpoint.
    pub checkpoint: CheckpointConfig,
}

/// Recursively adds the keys of `base` missing in `config`.
///
/// Values present in `config` are kept, objects are merged key by key.
pub fn extend(config: &mut Value, base: &Value) {
    if let (Value::Object(config), Value::Object(base)) = (config, base) {
        for (k, v) in base {
            match config.get_mut(k) {
                Some(c) => extend(c, v),
                None => {
                    config.insert(k.clone(), v.clone());
                }
            }
        }
    }
}

impl SessionConfig {
    /// Parses a JSON session configuration, filling missing keys from
    /// [`BASE_SESSION_CONFIG`].
    pub fn from_json_with_defaults(json: &str) -> Result<Self> {
        let config_error = |e: serde_json::Error| SurrealError::Config(e.to_string());
        let mut config: Value = serde_json::from_str(json).map_err(config_error)?;
        let base: Value = serde_json::from_str(BASE_SESSION_CONFIG).map_err(config_error)?;
        extend(&mut config, &base);
        Ok(serde_json::from_value(config).map_err(config_error)?)
    }

    /// Constructs [`SessionConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SessionConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

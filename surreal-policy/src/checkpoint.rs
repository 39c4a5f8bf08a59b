//! Checkpoint files of trained models.
//!
//! A checkpoint is named `<name>.<iteration>.ckpt`. The iteration is the second
//! dot-delimited segment of the file name.
use crate::Mlp;
use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};
use surreal_core::SurrealError;

/// Extension of checkpoint files.
pub const EXTENSION: &str = "ckpt";

/// Content of a checkpoint file.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Checkpoint {
    /// Parameters of the model.
    pub model: Mlp,
}

fn iteration(path: &Path) -> Result<u64> {
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name
        .split('.')
        .nth(1)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| SurrealError::InvalidCheckpointName(file_name.clone()).into())
}

/// Returns the checkpoint file in `folder` with the largest iteration.
pub fn latest_checkpoint(folder: impl AsRef<Path>) -> Result<PathBuf> {
    let folder = folder.as_ref();
    let no_checkpoint = || SurrealError::NoCheckpoint(folder.to_path_buf());
    let entries = fs::read_dir(folder).map_err(|_| no_checkpoint())?;

    let mut latest: Option<(u64, PathBuf)> = None;
    for entry in entries {
        let path = entry?.path();
        if path.extension().map_or(true, |e| e != EXTENSION) {
            continue;
        }
        let iter = iteration(&path)?;
        debug!("Found checkpoint {:?}", path);
        if latest.as_ref().map_or(true, |(max, _)| iter > *max) {
            latest = Some((iter, path));
        }
    }

    latest.map(|(_, path)| path).ok_or_else(|| no_checkpoint().into())
}

/// Loads the model of the latest checkpoint in `folder`.
pub fn restore_model(folder: impl AsRef<Path>) -> Result<Mlp> {
    let path = latest_checkpoint(folder)?;
    info!("Load checkpoint {:?}", path);
    let rdr = BufReader::new(File::open(&path)?);
    let checkpoint: Checkpoint = bincode::deserialize_from(rdr)?;
    Ok(checkpoint.model)
}

/// Saves `model` as `<folder>/<name>.<iteration>.ckpt` and returns the path of the file.
pub fn save_checkpoint(
    folder: impl AsRef<Path>,
    name: &str,
    iteration: u64,
    model: &Mlp,
) -> Result<PathBuf> {
    if name.contains('.') {
        return Err(SurrealError::InvalidCheckpointName(name.to_string()).into());
    }
    fs::create_dir_all(folder.as_ref())?;
    let path = folder
        .as_ref()
        .join(format!("{}.{}.{}", name, iteration, EXTENSION));
    let wtr = BufWriter::new(File::create(&path)?);
    bincode::serialize_into(
        wtr,
        &Checkpoint {
            model: model.clone(),
        },
    )?;
    info!("Save checkpoint {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mat;
    use tempdir::TempDir;

    #[test]
    fn test_latest_checkpoint_wins() -> Result<()> {
        let dir = TempDir::new("checkpoint")?;
        for i in [2, 10, 9] {
            save_checkpoint(dir.path(), "learner", i, &Mlp::random(&[2, 1], i)?)?;
        }
        fs::write(dir.path().join("config.yml"), "")?;

        let path = latest_checkpoint(dir.path())?;
        assert_eq!(path.file_name().unwrap(), "learner.10.ckpt");
        assert_eq!(restore_model(dir.path())?, Mlp::random(&[2, 1], 10)?);
        Ok(())
    }

    #[test]
    fn test_no_checkpoint() -> Result<()> {
        let dir = TempDir::new("checkpoint")?;
        let err = latest_checkpoint(dir.path()).unwrap_err();
        assert!(err.to_string().contains(&dir.path().display().to_string()));

        let err = latest_checkpoint(dir.path().join("missing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SurrealError>(),
            Some(SurrealError::NoCheckpoint(_))
        ));
        Ok(())
    }

    #[test]
    fn test_malformed_checkpoint() -> Result<()> {
        #[derive(Serialize)]
        struct Params {
            ws: Vec<Mat>,
            bs: Vec<Mat>,
        }

        let dir = TempDir::new("checkpoint")?;
        let path = dir.path().join("learner.1.ckpt");

        // No layers
        fs::write(&path, [0u8; 16])?;
        let err = restore_model(dir.path()).unwrap_err();
        assert!(err.to_string().contains("0 weights"), "{}", err);

        // Data does not fit the shape
        let params = Params {
            ws: vec![Mat {
                data: vec![1.0],
                shape: vec![2, 2],
            }],
            bs: vec![Mat::zeros(2, 1)],
        };
        fs::write(&path, bincode::serialize(&params)?)?;
        assert!(restore_model(dir.path()).is_err());

        // Truncated file
        let bytes = fs::read(save_checkpoint(dir.path(), "learner", 1, &Mlp::random(&[3, 2], 0)?)?)?;
        fs::write(&path, &bytes[..bytes.len() / 2])?;
        assert!(restore_model(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_invalid_name() -> Result<()> {
        let dir = TempDir::new("checkpoint")?;
        fs::write(dir.path().join("learner.final.ckpt"), "")?;
        let err = latest_checkpoint(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SurrealError>(),
            Some(SurrealError::InvalidCheckpointName(_))
        ));
        assert!(save_checkpoint(dir.path(), "a.b", 0, &Mlp::random(&[1, 1], 0)?).is_err());
        Ok(())
    }
}

//! Policies of Surreal that run without a deep learning backend.
//!
//! A trained model is an [`Mlp`] stored as a checkpoint file named
//! `<name>.<iteration>.ckpt`. [`restore_model`] loads the latest one in a directory and
//! [`MlpAgent`] acts with it on the observations of a pipeline.
mod agent;
mod checkpoint;
mod mat;
mod mlp;
pub use agent::{AgentConfig, MlpAgent};
pub use checkpoint::{latest_checkpoint, restore_model, save_checkpoint, Checkpoint};
pub use mat::Mat;
pub use mlp::Mlp;

//! Surreal is an environment adaptation layer for distributed reinforcement learning.
//!
//! It consists of the following crates:
//!
//! * [surreal-core](surreal_core) provides the stepping contract
//!   ([Env](surreal_core::Env), [Policy](surreal_core::Policy)), observations and their
//!   specs, and the render context.
//! * [surreal-env](surreal_env) adapts classic-control and pixel physics backends, and
//!   composes them with observation transform stages into a
//!   [Pipeline](surreal_env::Pipeline).
//! * [surreal-policy](surreal_policy) has a backend-free MLP policy and its checkpoints.
//! * [surreal-tensorplex](surreal_tensorplex) is a server aggregating metrics of
//!   distributed processes into tensorboard runs.
//!
//! This crate has the session configuration and the helpers of the `rollout` and
//! `tensorplex_server` binaries.
pub mod rollout;
mod session;
pub use session::{extend, CheckpointConfig, SessionConfig, BASE_SESSION_CONFIG};

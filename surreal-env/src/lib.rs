#![warn(missing_docs)]
//! Environments of Surreal.
//!
//! Native backends are normalized into [`Env`](surreal_core::Env) by the adapters in
//! [`adapter`]. A [`Pipeline`] then composes an adapter with an ordered list of
//! [`Stage`]s, each applying one observation transform and recomputing the specs
//! consistently:
//!
//! * [`ObservationConcatenation`] splits named arrays into a visual and a flat component,
//! * [`Grayscale`] averages the channels of the visual component,
//! * [`FrameStack`] stacks the visual components of the last `n` observations,
//! * [`MaxStep`] truncates episodes after a number of steps.
//!
//! [`make_env`] assembles the pipeline described by an [`EnvConfig`].
pub mod adapter;
pub mod classic;
mod config;
mod pipeline;
#[cfg(feature = "py")]
pub mod py;
pub mod stage;
pub use config::{make_env, EnvConfig, EnvMode, EvalModeConfig};
pub use pipeline::Pipeline;
pub use stage::{
    FrameStack, Grayscale, MaxStep, ObservationConcatenation, Stage, StageKind,
};

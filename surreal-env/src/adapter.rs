//! Adapters normalizing native backends into [`Env`](surreal_core::Env).
//!
//! There are two native APIs. Classic-control backends ([`GymBackend`]) return
//! `(observation, reward, done, info)` tuples and describe their spaces as boxes.
//! Physics backends ([`DmControlBackend`]) return [`TimeStep`]s carrying a step type
//! and an optional reward, and render pixels on request.
mod dm_control;
mod gym;
pub use dm_control::{
    DmControlAdapter, DmControlBackend, DmControlSpecOnly, StepType, TimeStep, PIXELS_KEY,
    PIXEL_SIZE,
};
pub use gym::{GymAdapter, GymBackend, Space};

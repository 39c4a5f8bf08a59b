#![warn(missing_docs)]
//! Core traits and data model shared by the Surreal environment crates.
//!
//! An environment is anything implementing [`Env`]: a native backend behind an adapter,
//! or a [`Pipeline`] of transform stages around such an adapter. Every environment emits
//! [`Observation`]s, described by an [`ObservationSpec`], and consumes continuous
//! [`Action`]s, described by an [`ActionSpec`].
//!
//! [`Pipeline`]: https://docs.rs/surreal-env
pub mod error;
pub mod record;
pub mod render;

mod array;
mod base;
mod obs;
mod spec;

pub use array::Array;
pub use base::{Action, Env, Info, Policy, StageKind, Step};
pub use error::SurrealError;
pub use obs::{Observation, SplitObs};
pub use spec::{
    ActionSpec, ArraySpec, BoundedArraySpec, DType, Dim, EnvSpec, ObservationSpec, SpecFormat,
    SpecType,
};

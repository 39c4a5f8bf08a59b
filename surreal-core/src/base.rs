//! Core functionalities.
mod env;
mod policy;
mod step;
pub use env::{Action, Env, StageKind};
pub use policy::Policy;
pub use step::{Info, Step};

//! A server aggregating scalar metrics of distributed processes into tensorboard runs.
//!
//! Processes send one JSON object per line over TCP:
//!
//! ```json
//! {"group": "agent", "index": 3, "step": 100, "values": {"reward": 1.5}}
//! ```
//!
//! Metrics of a *normal* group are written to run `<group>/<id>`. Metrics of an *indexed*
//! group are bucketed by index: with bin size 8, index 3 goes to run `<group>/0-7` under
//! tag `<tag>/3`.
mod client;
mod config;
mod error;
mod message;
mod routing;
mod server;
mod sink;
pub use client::TensorplexClient;
pub use config::TensorplexConfig;
pub use error::TensorplexError;
pub use message::Metric;
pub use routing::{Groups, ScalarEvent};
pub use server::{Listening, TensorplexServer};
pub use sink::{MemorySink, MetricSink, TensorboardSink};

/// Name of the group of non-agent processes, e.g. learner and evaluators.
pub const NONAGENT_GROUP_NAME: &str = "nonagent";

/// Name of the group of agents, indexed by agent id.
pub const AGENT_GROUP_NAME: &str = "agent";

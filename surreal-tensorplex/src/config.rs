use serde::{Deserialize, Serialize};

/// Configuration of the metrics server.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TensorplexConfig {
    /// Host to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Number of agents sharing a run.
    #[serde(default = "default_agent_bin_size")]
    pub agent_bin_size: usize,

    /// Number of writer processes of multi-process servers. Accepted so that their
    /// session configurations load; this server writes from a single thread.
    #[serde(default = "default_max_processes")]
    pub max_processes: usize,
}

fn default_agent_bin_size() -> usize {
    8
}

fn default_max_processes() -> usize {
    4
}

impl TensorplexConfig {
    /// Constructs a configuration with the default bin size.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            agent_bin_size: default_agent_bin_size(),
            max_processes: default_max_processes(),
        }
    }

    /// Sets the number of agents sharing a run.
    pub fn agent_bin_size(mut self, v: usize) -> Self {
        self.agent_bin_size = v;
        self
    }

    /// Sets the number of writer processes.
    pub fn max_processes(mut self, v: usize) -> Self {
        self.max_processes = v;
        self
    }
}

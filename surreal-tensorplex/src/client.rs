use crate::Metric;
use anyhow::Result;
use std::{
    io::{BufWriter, Write},
    net::{TcpStream, ToSocketAddrs},
};

/// Sends metrics to a [`TensorplexServer`](crate::TensorplexServer).
pub struct TensorplexClient {
    wtr: BufWriter<TcpStream>,
}

impl TensorplexClient {
    /// Connects to a server.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Ok(Self {
            wtr: BufWriter::new(stream),
        })
    }

    /// Sends a metric.
    pub fn send(&mut self, metric: &Metric) -> Result<()> {
        serde_json::to_writer(&mut self.wtr, metric)?;
        self.wtr.write_all(b"\n")?;
        self.wtr.flush()?;
        Ok(())
    }
}

//! The metrics server.
use crate::{Groups, Metric, MetricSink, ScalarEvent, TensorboardSink};
use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};
use std::{
    io::{BufRead, BufReader},
    net::{SocketAddr, TcpListener, TcpStream},
    path::Path,
    sync::Arc,
    thread::{self, JoinHandle},
};

/// Aggregates metrics received over TCP into a [`MetricSink`].
pub struct TensorplexServer<S: MetricSink> {
    groups: Arc<Groups>,
    sink: S,
}

impl TensorplexServer<TensorboardSink> {
    /// Constructs a server writing tensorboard runs under `folder`.
    ///
    /// `index_bin_sizes[i]` is the number of indices sharing a run in `indexed_groups[i]`.
    pub fn new<P: AsRef<Path>>(
        folder: P,
        normal_groups: &[&str],
        indexed_groups: &[&str],
        index_bin_sizes: &[usize],
    ) -> Result<Self> {
        let groups = Groups::new(normal_groups, indexed_groups, index_bin_sizes)?;
        Ok(Self::with_sink(groups, TensorboardSink::new(folder)))
    }
}

impl<S: MetricSink> TensorplexServer<S> {
    /// Constructs a server writing into `sink`.
    pub fn with_sink(groups: Groups, sink: S) -> Self {
        Self {
            groups: Arc::new(groups),
            sink,
        }
    }

    /// Binds the server to an address. Port 0 picks a free port.
    pub fn bind(self, host: &str, port: u16) -> Result<Listening<S>> {
        let listener = TcpListener::bind((host, port))?;
        info!("Tensorplex server listening on {}", listener.local_addr()?);
        Ok(Listening {
            listener,
            groups: self.groups,
            sink: self.sink,
        })
    }
}

/// A server bound to an address.
pub struct Listening<S: MetricSink> {
    listener: TcpListener,
    groups: Arc<Groups>,
    sink: S,
}

impl<S: MetricSink> Listening<S> {
    /// Address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until the process is terminated.
    pub fn serve(self) -> Result<()> {
        self.serve_connections(None)?;
        Ok(())
    }

    /// Serves `n` connections, then returns the sink once all of them are closed.
    pub fn serve_n(self, n: usize) -> Result<S> {
        self.serve_connections(Some(n))
    }

    fn serve_connections(self, n: Option<usize>) -> Result<S> {
        let Self {
            listener,
            groups,
            mut sink,
        } = self;
        let (s, r) = unbounded();
        let acceptor = spawn_acceptor(listener, groups, s, n);

        // Runs until every connection and the acceptor have dropped their senders
        write_loop(&r, &mut sink);

        match acceptor.join() {
            Ok(res) => res?,
            Err(_) => warn!("Acceptor thread panicked"),
        }
        Ok(sink)
    }
}

fn write_loop<S: MetricSink>(r: &Receiver<ScalarEvent>, sink: &mut S) {
    for event in r.iter() {
        sink.write(event);
        if r.is_empty() {
            sink.flush();
        }
    }
    sink.flush();
}

fn spawn_acceptor(
    listener: TcpListener,
    groups: Arc<Groups>,
    s: Sender<ScalarEvent>,
    n: Option<usize>,
) -> JoinHandle<Result<()>> {
    thread::spawn(move || {
        let mut readers: Vec<JoinHandle<()>> = vec![];
        let mut accepted = 0;
        if n == Some(0) {
            return Ok(());
        }

        for stream in listener.incoming() {
            // A failed connection does not stop the server
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            let peer = stream.peer_addr().ok();
            debug!("Accept connection from {:?}", peer);
            let (groups, s) = (groups.clone(), s.clone());
            readers.retain(|h| !h.is_finished());
            readers.push(thread::spawn(move || {
                read_metrics(stream, &groups, &s);
                debug!("Connection from {:?} closed", peer);
            }));

            accepted += 1;
            if n.map_or(false, |n| accepted >= n) {
                break;
            }
        }

        for h in readers {
            if h.join().is_err() {
                warn!("Reader thread panicked");
            }
        }
        Ok(())
    })
}

/// Reads metrics from a connection until it is closed.
fn read_metrics(stream: TcpStream, groups: &Groups, s: &Sender<ScalarEvent>) {
    for line in BufReader::new(stream).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read from connection: {}", e);
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let events = serde_json::from_str::<Metric>(&line)
            .map_err(anyhow::Error::from)
            .and_then(|m| groups.route(m));
        match events {
            Ok(events) => {
                for event in events {
                    if s.send(event).is_err() {
                        return;
                    }
                }
            }
            Err(e) => warn!("Rejected metric {}: {}", line, e),
        }
    }
}

//! Destinations of scalar events.
use crate::ScalarEvent;
use log::info;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tensorboard_rs::summary_writer::SummaryWriter;

/// Writes scalar events.
pub trait MetricSink {
    /// Writes a scalar event.
    fn write(&mut self, event: ScalarEvent);

    /// Flushes buffered events.
    fn flush(&mut self) {}
}

/// Writes each run as a tensorboard log directory under a folder.
pub struct TensorboardSink {
    folder: PathBuf,
    writers: HashMap<String, SummaryWriter>,
}

impl TensorboardSink {
    /// Runs will be stored in `folder`.
    pub fn new<P: AsRef<Path>>(folder: P) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
            writers: HashMap::new(),
        }
    }
}

impl MetricSink for TensorboardSink {
    fn write(&mut self, event: ScalarEvent) {
        let folder = &self.folder;
        let writer = self.writers.entry(event.run).or_insert_with_key(|run| {
            info!("Create run {}", run);
            SummaryWriter::new(folder.join(run))
        });
        writer.add_scalar(&event.tag, event.value, event.step);
    }

    fn flush(&mut self) {
        for writer in self.writers.values_mut() {
            writer.flush();
        }
    }
}

/// Keeps scalar events in memory.
///
/// Clones share the same events, so a clone can be inspected while the server owns
/// the other.
#[derive(Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<ScalarEvent>>>,
}

impl MemorySink {
    /// Events written so far.
    pub fn events(&self) -> Vec<ScalarEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl MetricSink for MemorySink {
    fn write(&mut self, event: ScalarEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

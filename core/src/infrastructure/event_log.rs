// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Structured Event Persistence
//
// Append-only JSON-lines sink. Each verdict becomes one self-contained line;
// there is no cross-call ordering requirement, so concurrent appends only
// rely on the OS append guarantee.

use crate::domain::events::{EventSink, InvocationEvent};
use anyhow::Context;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Writes one JSON line per event to a file, creating parent directories on
/// first use.
pub struct JsonlEventSink {
    path: PathBuf,
}

impl JsonlEventSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl EventSink for JsonlEventSink {
    fn record(&self, event: &InvocationEvent) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating event log directory {parent:?}"))?;
            }
        }

        let line = serde_json::to_string(event).context("serializing invocation event")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening event log {:?}", self.path))?;
        writeln!(file, "{line}").context("appending invocation event")?;

        info!(
            "Event logged: trace={:?} blocked={} blocked_by={:?}",
            event.trace_id, event.blocked, event.blocked_by
        );
        Ok(())
    }
}

/// In-memory sink for tests and embedded setups.
#[derive(Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<InvocationEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<InvocationEvent> {
        self.events.lock().expect("event sink lock poisoned").clone()
    }
}

impl EventSink for MemoryEventSink {
    fn record(&self, event: &InvocationEvent) -> anyhow::Result<()> {
        self.events
            .lock()
            .expect("event sink lock poisoned")
            .push(event.clone());
        Ok(())
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status registry: materializes the active-builds view.
//!
//! A long-lived observer consumes `BuildInfo` records: `Running` upserts
//! the entry, a terminal record removes it. Every update publishes a
//! fresh snapshot on a watch channel.

use jetty_core::{BuildId, BuildInfo};
use std::collections::HashMap;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Snapshot of currently running builds.
pub type StatusSnapshot = HashMap<BuildId, BuildInfo>;

/// Handle to a running registry task.
pub struct StatusRegistry {
    input: mpsc::Sender<BuildInfo>,
    snapshots: watch::Receiver<StatusSnapshot>,
    done: CancellationToken,
    handle: JoinHandle<()>,
}

impl StatusRegistry {
    /// Spawn the observer task.
    pub fn spawn() -> Self {
        let (input_tx, mut input_rx) = mpsc::channel::<BuildInfo>(32);
        let (snapshot_tx, snapshot_rx) = watch::channel(StatusSnapshot::new());
        let done = CancellationToken::new();
        let stop = done.clone();

        let handle = tokio::spawn(async move {
            let mut active = StatusSnapshot::new();
            loop {
                tokio::select! {
                    record = input_rx.recv() => match record {
                        Some(record) => {
                            if record.status.is_terminal() {
                                active.remove(&record.id);
                            } else {
                                active.insert(record.id.clone(), record);
                            }
                            let _ = snapshot_tx.send(active.clone());
                        }
                        None => break,
                    },
                    _ = stop.cancelled() => break,
                }
            }
        });

        Self { input: input_tx, snapshots: snapshot_rx, done, handle }
    }

    /// Sender for feeding lifecycle records into the registry.
    pub fn input(&self) -> mpsc::Sender<BuildInfo> {
        self.input.clone()
    }

    /// Receiver of published snapshots, for callers that want to watch.
    pub fn snapshots(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshots.clone()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Signal done and wait for the observer to exit.
    pub async fn shutdown(self) {
        self.done.cancel();
        let _ = self.handle.await;
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-size pool of long-lived build workers.
//!
//! Each worker owns a capacity-1 job queue and processes one job at a
//! time. Dispatch is a min-queue load balancer: the job goes to the
//! worker with the fewest queued jobs, lowest id on ties. The process
//! holds one global pool, initialized exactly once.

use crate::config::EngineConfig;
use crate::job::Job;
use crate::runner::run_build_with_timeout;
use jetty_core::WorkerId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

static GLOBAL_POOL: OnceLock<WorkerPool> = OnceLock::new();

/// The process-global pool, created on first access.
///
/// `config` only takes effect on the initializing call; later callers
/// get the already-built pool.
pub fn global(config: Arc<EngineConfig>) -> &'static WorkerPool {
    GLOBAL_POOL.get_or_init(|| WorkerPool::new(config))
}

struct WorkerNode {
    id: WorkerId,
    queue: mpsc::Sender<Job>,
    /// Jobs sent to this worker and not yet finished.
    pending: Arc<AtomicUsize>,
    quit: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// Fixed array of workers with exclusive ownership of their queues.
pub struct WorkerPool {
    workers: Vec<WorkerNode>,
}

impl WorkerPool {
    /// Spawn `config.workers` long-lived worker tasks.
    pub fn new(config: Arc<EngineConfig>) -> Self {
        let count = config.workers.max(1);
        let workers = (0..count)
            .map(|index| {
                let id = WorkerId::from_index(index);
                let (tx, rx) = mpsc::channel(1);
                let pending = Arc::new(AtomicUsize::new(0));
                let quit = CancellationToken::new();
                let handle = tokio::spawn(worker_loop(
                    id.clone(),
                    rx,
                    pending.clone(),
                    quit.clone(),
                    config.clone(),
                ));
                WorkerNode { id, queue: tx, pending, quit, handle: Mutex::new(Some(handle)) }
            })
            .collect();
        tracing::info!(workers = count, "worker pool initialized");
        Self { workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Assign a job to the least-loaded worker.
    ///
    /// If the job's cancel token fires before the queue accepts it, the
    /// job is dropped with a note on its result stream; dropping it
    /// closes its sinks.
    pub async fn assign(&self, mut job: Job) {
        let mut best = 0;
        let mut best_load = usize::MAX;
        for (index, worker) in self.workers.iter().enumerate() {
            let load = worker.pending.load(Ordering::SeqCst);
            if load < best_load {
                best = index;
                best_load = load;
            }
        }
        let worker = &self.workers[best];

        job.worker = worker.id.clone();
        let results = job.results.clone();
        let cancel = job.cancel.clone();
        worker.pending.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(build = %job.build_id, worker = %worker.id, "assigning job");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                worker.pending.fetch_sub(1, Ordering::SeqCst);
                let _ = results.send("Job cancelled before assignment".to_string()).await;
            }
            sent = worker.queue.send(job) => {
                if sent.is_err() {
                    worker.pending.fetch_sub(1, Ordering::SeqCst);
                    let _ = results.send("Worker queue closed; job dropped".to_string()).await;
                }
            }
        }
    }

    /// Signal every worker to quit after draining, then join them.
    pub async fn stop(&self) {
        for worker in &self.workers {
            worker.quit.cancel();
        }
        for worker in &self.workers {
            let handle = worker.handle.lock().take();
            if let Some(handle) = handle {
                let _ = handle.await;
            }
        }
        tracing::info!("worker pool stopped");
    }
}

/// One worker: drain the queue a job at a time until told to quit.
async fn worker_loop(
    id: WorkerId,
    mut queue: mpsc::Receiver<Job>,
    pending: Arc<AtomicUsize>,
    quit: CancellationToken,
    config: Arc<EngineConfig>,
) {
    loop {
        tokio::select! {
            job = queue.recv() => match job {
                Some(job) => {
                    tracing::info!(worker = %id, build = %job.build_id, "job picked up");
                    run_build_with_timeout(job, config.clone()).await;
                    pending.fetch_sub(1, Ordering::SeqCst);
                }
                None => break,
            },
            _ = quit.cancelled() => {
                // Drain whatever was already queued, then exit.
                while let Ok(job) = queue.try_recv() {
                    run_build_with_timeout(job, config.clone()).await;
                    pending.fetch_sub(1, Ordering::SeqCst);
                }
                break;
            }
        }
    }
    tracing::debug!(worker = %id, "worker exited");
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;

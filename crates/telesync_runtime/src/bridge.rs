//! RuntimeBridge: hands snapshot requests from the messaging runtime to the
//! directory runtime and waits, bounded, for the answer.
//!
//! ```text
//!  messaging runtime (B)                    directory runtime (A, own thread)
//!  ─────────────────────                    ─────────────────────────────────
//!  RuntimeBridge::request_snapshot ──mpsc──▶ DirectoryClient::run
//!        ▲                                        │ cache / re-sync
//!        └────────────── oneshot reply ◀──────────┘
//! ```
//!
//! A caller that times out simply drops its oneshot receiver; the directory
//! side finishes whatever it was doing and its reply is discarded.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use telesync_core::{DirectorySnapshot, SyncError};
use telesync_directory::{ClientConfig, DirectoryClient, DirectorySource, SnapshotRequest};
use telesync_observability::{bridge_span, record_duration, record_error};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Instrument};

use crate::error::{Result, RuntimeError};

/// Pending requests the directory runtime may queue before senders wait.
const REQUEST_QUEUE: usize = 64;

/// Messaging-side handle for obtaining directory snapshots.
#[derive(Clone)]
pub struct RuntimeBridge {
    requests: mpsc::Sender<SnapshotRequest>,
    ready: watch::Receiver<bool>,
}

impl RuntimeBridge {
    pub fn new(requests: mpsc::Sender<SnapshotRequest>, ready: watch::Receiver<bool>) -> Self {
        Self { requests, ready }
    }

    /// Whether the directory client has completed its first sync.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Wait until the directory client is ready, at most `timeout`.
    pub async fn wait_ready(&self, timeout: Duration) -> telesync_core::Result<()> {
        let mut ready = self.ready.clone();
        // Bound to a local so the borrowed `watch::Ref` is dropped before `ready`.
        let outcome = match tokio::time::timeout(timeout, ready.wait_for(|ready| *ready)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(SyncError::unavailable("directory runtime stopped")),
            Err(_) => Err(SyncError::NotReady),
        };
        outcome
    }

    /// Ask the directory runtime for its current snapshot.
    ///
    /// Fails with `NotReady` when the client has not finished its first sync
    /// within `timeout`, `Timeout` when a ready client did not answer in time,
    /// and `Unavailable` when the directory runtime is gone.
    pub async fn request_snapshot(
        &self,
        timeout: Duration,
    ) -> telesync_core::Result<Arc<DirectorySnapshot>> {
        let span = bridge_span!(timeout.as_millis() as u64);
        async move {
            let started = Instant::now();
            let (request, reply) = SnapshotRequest::new();

            let exchange = async {
                self.requests
                    .send(request)
                    .await
                    .map_err(|_| SyncError::unavailable("directory runtime stopped"))?;
                reply
                    .await
                    .map_err(|_| SyncError::unavailable("directory runtime dropped the request"))?
            };

            let result = match tokio::time::timeout(timeout, exchange).await {
                Ok(result) => result,
                Err(_) if self.is_ready() => Err(SyncError::Timeout(timeout)),
                Err(_) => Err(SyncError::NotReady),
            };

            record_duration("duration_ms", started.elapsed());
            match &result {
                Ok(snapshot) => debug!(categories = snapshot.categories.len(), "Snapshot received"),
                Err(e) => record_error(e),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Owner of the directory runtime thread.
///
/// Dropping it cancels the client; [`DirectoryRuntime::shutdown`] also waits
/// for the thread to finish.
pub struct DirectoryRuntime {
    shutdown: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl DirectoryRuntime {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.shutdown.cancel();
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        let joined = tokio::task::spawn_blocking(move || thread.join())
            .await
            .map_err(|e| RuntimeError::TaskFailed(format!("directory runtime join: {}", e)))?;
        joined.map_err(|_| RuntimeError::TaskFailed("directory runtime panicked".into()))?;
        info!("Directory runtime stopped");
        Ok(())
    }
}

impl Drop for DirectoryRuntime {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Start the directory client on a dedicated thread with its own
/// current-thread tokio runtime, and return the bridge into it.
pub fn spawn_directory_runtime(
    source: Arc<dyn DirectorySource>,
    config: ClientConfig,
) -> Result<(RuntimeBridge, DirectoryRuntime)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .thread_name("telesync-directory")
        .build()?;

    let (requests_tx, requests_rx) = mpsc::channel(REQUEST_QUEUE);
    let (client, ready_rx) = DirectoryClient::new(source, config);
    let shutdown = CancellationToken::new();

    let token = shutdown.clone();
    let thread = std::thread::Builder::new()
        .name("telesync-directory".into())
        .spawn(move || runtime.block_on(client.run(requests_rx, token)))?;

    Ok((
        RuntimeBridge::new(requests_tx, ready_rx),
        DirectoryRuntime {
            shutdown,
            thread: Some(thread),
        },
    ))
}

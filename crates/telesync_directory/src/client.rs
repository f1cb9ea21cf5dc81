//! Directory-side client: owns the cached snapshot and answers snapshot requests.
//!
//! The client runs as a single task inside the directory runtime. It keeps the
//! cache fresh with a periodic sync and serves [`SnapshotRequest`]s one at a
//! time, so the cache is never touched from outside this task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use telesync_constant::defaults;
use telesync_core::{DirectorySnapshot, Result, SyncError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::source::DirectorySource;

/// Reply type carried back across the runtime boundary.
pub type SnapshotReply = Result<Arc<DirectorySnapshot>>;

/// Minimum gap between two sync attempts while the first sync keeps failing.
const NOT_READY_RETRY: Duration = Duration::from_secs(5);

/// Shortest accepted re-sync period; `tokio::time::interval` rejects zero.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_millis(10);

/// Directory client tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Period of the background re-sync.
    pub sync_interval: Duration,
    /// A cached snapshot older than this is re-fetched before being served.
    pub max_staleness: Duration,
    /// Park requests until the first sync succeeds instead of answering `NotReady`.
    pub wait_for_ready: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(defaults::SYNC_INTERVAL_SECS),
            max_staleness: Duration::from_secs(defaults::MAX_STALENESS_SECS),
            wait_for_ready: true,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamped to [`MIN_SYNC_INTERVAL`].
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval.max(MIN_SYNC_INTERVAL);
        self
    }

    pub fn with_max_staleness(mut self, staleness: Duration) -> Self {
        self.max_staleness = staleness;
        self
    }

    pub fn with_wait_for_ready(mut self, wait: bool) -> Self {
        self.wait_for_ready = wait;
        self
    }

    /// Load from `TELESYNC_SYNC_INTERVAL_SECS`, `TELESYNC_MAX_STALENESS_SECS`
    /// and `TELESYNC_WAIT_FOR_READY`; unset or unparsable values keep defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(raw) = std::env::var("TELESYNC_SYNC_INTERVAL_SECS") {
            if let Ok(secs) = raw.trim().parse::<u64>() {
                config.sync_interval = Duration::from_secs(secs.max(1));
            }
        }

        if let Ok(raw) = std::env::var("TELESYNC_MAX_STALENESS_SECS") {
            if let Ok(secs) = raw.trim().parse::<u64>() {
                config.max_staleness = Duration::from_secs(secs);
            }
        }

        if let Ok(raw) = std::env::var("TELESYNC_WAIT_FOR_READY") {
            match raw.trim().to_lowercase().as_str() {
                "0" | "false" | "no" | "off" => config.wait_for_ready = false,
                "1" | "true" | "yes" | "on" => config.wait_for_ready = true,
                _ => {}
            }
        }

        config
    }
}

/// A request for the current snapshot plus the channel to answer on.
#[derive(Debug)]
pub struct SnapshotRequest {
    reply: oneshot::Sender<SnapshotReply>,
}

impl SnapshotRequest {
    pub fn new() -> (Self, oneshot::Receiver<SnapshotReply>) {
        let (reply, rx) = oneshot::channel();
        (Self { reply }, rx)
    }

    /// The requester stopped waiting (timed out or dropped).
    pub fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }

    /// Deliver the answer; a requester that already gave up simply misses it.
    pub fn respond(self, reply: SnapshotReply) {
        if self.reply.send(reply).is_err() {
            debug!("Snapshot requester gone, reply discarded");
        }
    }
}

/// Cached directory state with a thin read accessor.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    snapshot: Option<Arc<DirectorySnapshot>>,
    synced_at: Option<Instant>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, or `NotReady` before the first successful sync.
    pub fn read(&self) -> SnapshotReply {
        self.snapshot.clone().ok_or(SyncError::NotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Age of the cached snapshot; `None` before the first sync.
    pub fn age(&self) -> Option<Duration> {
        self.synced_at.map(|at| at.elapsed())
    }

    pub fn store(&mut self, snapshot: DirectorySnapshot) {
        self.snapshot = Some(Arc::new(snapshot));
        self.synced_at = Some(Instant::now());
    }
}

/// Caching directory client, run inside the directory runtime.
pub struct DirectoryClient {
    source: Arc<dyn DirectorySource>,
    config: ClientConfig,
    cache: SnapshotCache,
    ready_tx: watch::Sender<bool>,
    parked: Vec<SnapshotRequest>,
    last_attempt: Option<Instant>,
}

impl DirectoryClient {
    /// Create a client and the receiver that observes its readiness.
    pub fn new(
        source: Arc<dyn DirectorySource>,
        config: ClientConfig,
    ) -> (Self, watch::Receiver<bool>) {
        let (ready_tx, ready_rx) = watch::channel(false);
        let client = Self {
            source,
            config,
            cache: SnapshotCache::new(),
            ready_tx,
            parked: Vec::new(),
            last_attempt: None,
        };
        (client, ready_rx)
    }

    /// Run until `shutdown` fires or every request sender is dropped.
    pub async fn run(
        mut self,
        mut requests: mpsc::Receiver<SnapshotRequest>,
        shutdown: CancellationToken,
    ) {
        info!(source = self.source.source_id(), "Directory client starting");
        self.sync().await;

        let mut ticker = tokio::time::interval(self.config.sync_interval.max(MIN_SYNC_INTERVAL));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sync().await;
                }
                request = requests.recv() => match request {
                    Some(request) => self.serve(request).await,
                    None => break,
                },
            }
        }

        for request in self.parked.drain(..) {
            request.respond(Err(SyncError::unavailable("directory client stopped")));
        }
        info!(source = self.source.source_id(), "Directory client stopped");
    }

    /// Fetch from the source into the cache. Failures keep the previous snapshot.
    async fn sync(&mut self) -> bool {
        self.last_attempt = Some(Instant::now());
        match self.source.fetch_snapshot().await {
            Ok(snapshot) => {
                let first = !self.cache.is_ready();
                debug!(
                    categories = snapshot.categories.len(),
                    channels = snapshot.channel_count(),
                    "Directory synced"
                );
                self.cache.store(snapshot);
                if first {
                    info!(source = self.source.source_id(), "Directory ready");
                    self.ready_tx.send_replace(true);
                    self.release_parked();
                }
                true
            }
            Err(e) if self.cache.is_ready() => {
                warn!(error = %e, "Directory sync failed, keeping last snapshot");
                false
            }
            Err(e) => {
                warn!(error = %e, "Initial directory sync failed");
                false
            }
        }
    }

    async fn serve(&mut self, request: SnapshotRequest) {
        if request.is_abandoned() {
            debug!("Dropping abandoned snapshot request");
            return;
        }

        if !self.cache.is_ready() {
            let due = self
                .last_attempt
                .is_none_or(|at| at.elapsed() >= NOT_READY_RETRY);
            if !(due && self.sync().await) {
                if self.config.wait_for_ready {
                    self.parked.retain(|r| !r.is_abandoned());
                    self.parked.push(request);
                } else {
                    request.respond(Err(SyncError::NotReady));
                }
                return;
            }
        }

        let stale = self
            .cache
            .age()
            .is_some_and(|age| age > self.config.max_staleness);
        if stale {
            self.sync().await;
        }

        request.respond(self.cache.read());
    }

    fn release_parked(&mut self) {
        let snapshot = self.cache.read();
        for request in self.parked.drain(..) {
            request.respond(snapshot.clone());
        }
    }
}

//! RefreshCoordinator: one refresh cycle for one conversation.
//!
//! ```text
//! AcquireGate → RetireOld → PostPlaceholder → FetchSnapshot → Format → Paginate
//!             → PostChunks → PostFooter → CommitSession → Done
//!                     (any step after AcquireGate) ──────────────▶ Failed
//! ```
//!
//! The gate is a scoped guard, so it is released on every exit path. Posted
//! messages are written into it one by one, which makes CommitSession hold
//! even for a cycle that panics after PostPlaceholder.

use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use telesync_constant::texts;
use telesync_core::{
    format_roster, paginate, ConversationId, CycleId, MessageId, RefreshOutcome, RefreshReport,
    SyncError,
};
use telesync_messaging::{MessagingSink, OutgoingMessage};
use telesync_observability::{record_duration, record_error, refresh_span};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn, Instrument, Span};

use crate::bridge::RuntimeBridge;
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::footer::footer_message;
use crate::session_store::{ChatSessionStore, SessionGate};

pub struct RefreshCoordinator {
    sessions: Arc<ChatSessionStore>,
    bridge: RuntimeBridge,
    sink: Arc<dyn MessagingSink>,
    config: RuntimeConfig,
    page_limit: NonZeroUsize,
    admission: Option<Arc<Semaphore>>,
}

impl RefreshCoordinator {
    /// Fails if `config` does not validate.
    pub fn new(
        config: RuntimeConfig,
        sessions: Arc<ChatSessionStore>,
        bridge: RuntimeBridge,
        sink: Arc<dyn MessagingSink>,
    ) -> Result<Self> {
        config.validate()?;
        let page_limit = config.page_limit()?;
        let admission = config
            .max_concurrent_refreshes
            .map(|max| Arc::new(Semaphore::new(max.get())));

        Ok(Self {
            sessions,
            bridge,
            sink,
            config,
            page_limit,
            admission,
        })
    }

    pub async fn refresh(&self, conversation: ConversationId) -> RefreshReport {
        self.refresh_cycle(conversation, CycleId::new()).await
    }

    /// Run one cycle under a caller-chosen id.
    pub async fn refresh_cycle(&self, conversation: ConversationId, cycle: CycleId) -> RefreshReport {
        let span = refresh_span!(conversation.0, cycle.as_str());
        self.run_cycle(conversation, cycle).instrument(span).await
    }

    async fn run_cycle(&self, conversation: ConversationId, cycle: CycleId) -> RefreshReport {
        let started = Instant::now();

        // AcquireGate
        let session = self.sessions.get_or_create(conversation).await;
        let mut gate = session.lock().await;
        debug!("Gate acquired");

        // RetireOld. The old ids stay tracked until every delete was tried, so
        // an interrupted retirement is repeated by the next cycle.
        let previous = gate.current().to_vec();
        let retire_failures = self.retire(conversation, &previous).await;
        gate.replace(Vec::new());

        // Every later post is tracked as soon as it exists, so the gate matches
        // the chat even when a stage panics halfway.
        let outcome = match AssertUnwindSafe(self.publish(conversation, &mut gate))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(%reason, live = gate.current().len(), "Refresh cycle panicked");
                RefreshOutcome::failed(format!("refresh panicked: {}", reason))
            }
        };
        record_duration("duration_ms", started.elapsed());

        // CommitSession: the gate already holds exactly what is shown.
        RefreshReport {
            cycle,
            conversation,
            outcome,
            live_messages: gate.current().to_vec(),
            retire_failures,
        }
    }

    /// PostPlaceholder through PostFooter. Posted ids go straight into `gate`.
    async fn publish(&self, conversation: ConversationId, gate: &mut SessionGate<'_>) -> RefreshOutcome {
        // PostPlaceholder
        let placeholder = match self
            .sink
            .send_message(conversation, &OutgoingMessage::plain(texts::LOADING))
            .await
        {
            Ok(id) => {
                gate.track(id);
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, "Placeholder not delivered, continuing without it");
                None
            }
        };

        // Limits platform traffic only; never taken before the gate.
        let _permit = match &self.admission {
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        };

        // FetchSnapshot
        let snapshot = match self.bridge.request_snapshot(self.config.snapshot_timeout).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                record_error(&e);
                self.post_failure(conversation, placeholder, &e, gate).await;
                return RefreshOutcome::failed(e.to_string());
            }
        };

        // Format + Paginate
        let document = format_roster(&snapshot, &self.config.allow_list);
        let pages: Vec<OutgoingMessage> = if document.is_no_matches() {
            vec![OutgoingMessage::plain(texts::NO_MATCHES)]
        } else {
            paginate(&document, self.page_limit)
                .into_iter()
                .map(|chunk| OutgoingMessage::preformatted(chunk.text()))
                .collect()
        };
        Span::current().record("pages", pages.len());

        // PostChunks
        let mut posted = 0;
        let mut pages_failed = 0;
        for (index, page) in pages.iter().enumerate() {
            match self.sink.send_message(conversation, page).await {
                Ok(id) => {
                    gate.track(id);
                    posted += 1;
                }
                Err(e) => {
                    pages_failed += 1;
                    warn!(page = index + 1, total = pages.len(), error = %e, "Roster page not delivered");
                }
            }
        }
        let pages_delivered = pages.len() - pages_failed;

        if pages_failed > 0 {
            let notice = format!("{} ({} of {}).", texts::PARTIAL_FAILURE, pages_failed, pages.len());
            match self.sink.send_message(conversation, &OutgoingMessage::plain(notice)).await {
                Ok(id) => {
                    gate.track(id);
                    posted += 1;
                }
                Err(e) => warn!(error = %e, "Partial-failure notice not delivered"),
            }
        }

        // PostFooter
        let footer = footer_message(Utc::now(), &self.config.upgrade_url);
        match self.sink.send_message(conversation, &footer).await {
            Ok(id) => {
                gate.track(id);
                posted += 1;
            }
            Err(e) => warn!(error = %e, "Footer not delivered"),
        }

        // The placeholder is superseded once real content is visible.
        if let Some(id) = placeholder {
            if posted > 0 && self.sink.delete_message(conversation, id).await.is_ok() {
                gate.forget(id);
            }
        }

        if pages_delivered == 0 {
            warn!(pages = pages.len(), "No roster page delivered");
            return RefreshOutcome::failed("no roster page could be delivered");
        }

        info!(
            platform = self.sink.platform(),
            pages = pages_delivered,
            failed = pages_failed,
            live = gate.current().len(),
            "Refresh complete"
        );
        RefreshOutcome::Done {
            pages_delivered,
            pages_failed,
        }
    }

    /// Ids currently shown in `conversation`, waiting for any running cycle.
    pub async fn live_messages(&self, conversation: ConversationId) -> Vec<MessageId> {
        self.sessions.current_live_messages(conversation).await
    }

    /// Best-effort delete of the previous listing. Returns how many deletes failed.
    async fn retire(&self, conversation: ConversationId, ids: &[MessageId]) -> usize {
        let mut failures = 0;
        for &id in ids {
            if let Err(e) = self.sink.delete_message(conversation, id).await {
                failures += 1;
                debug!(message_id = %id, error = %e, "Could not retire message");
            }
        }
        if !ids.is_empty() {
            debug!(retired = ids.len() - failures, failures, "Previous listing retired");
        }
        failures
    }

    /// Show the fetch failure, preferably by rewriting the (already tracked)
    /// placeholder, otherwise as a new tracked message.
    async fn post_failure(
        &self,
        conversation: ConversationId,
        placeholder: Option<MessageId>,
        error: &SyncError,
        gate: &mut SessionGate<'_>,
    ) {
        let notice = OutgoingMessage::plain(failure_text(error));

        if let Some(id) = placeholder {
            match self.sink.edit_message(conversation, id, &notice).await {
                Ok(()) => return,
                Err(e) => debug!(error = %e, "Could not rewrite placeholder, sending a new message"),
            }
        }

        match self.sink.send_message(conversation, &notice).await {
            Ok(id) => gate.track(id),
            Err(e) => warn!(error = %e, "Failure notice not delivered"),
        }
    }
}

/// Text carried by a caught panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn failure_text(error: &SyncError) -> &'static str {
    match error {
        SyncError::NotReady => texts::NOT_READY,
        SyncError::Timeout(_) => texts::TIMEOUT,
        _ => texts::UNAVAILABLE,
    }
}

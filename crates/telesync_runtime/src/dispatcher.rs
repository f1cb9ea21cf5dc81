//! Inbound events → tracked refresh tasks.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use telesync_constant::{defaults, texts};
use telesync_core::{ConversationId, CycleId, InboundEvent, InboundKind, RefreshOutcome, RefreshReport, SyncError};
use telesync_messaging::{MessagingSink, OutgoingMessage};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use crate::refresh::{panic_message, RefreshCoordinator};

/// Routes inbound events: refresh commands and buttons start a refresh,
/// other text gets the help prompt, anything else is ignored.
pub struct Dispatcher {
    coordinator: Arc<RefreshCoordinator>,
    sink: Arc<dyn MessagingSink>,
    tracker: TaskTracker,
}

impl Dispatcher {
    pub fn new(coordinator: Arc<RefreshCoordinator>, sink: Arc<dyn MessagingSink>) -> Self {
        Self {
            coordinator,
            sink,
            tracker: TaskTracker::new(),
        }
    }

    /// Handle one event. Returns the refresh task when one was started.
    pub async fn dispatch(&self, event: InboundEvent) -> Option<JoinHandle<RefreshReport>> {
        let conversation = event.conversation;
        match event.kind {
            InboundKind::Command { name } if is_refresh_command(&name) => {
                Some(self.spawn_refresh(conversation))
            }
            InboundKind::Command { name } => {
                debug!(conversation = %conversation, command = %name, "Ignoring unknown command");
                None
            }
            InboundKind::Button { callback_id, data } if data == defaults::REFRESH_CALLBACK => {
                self.acknowledge_refresh(conversation, &callback_id).await;
                Some(self.spawn_refresh(conversation))
            }
            InboundKind::Button { callback_id, data } => {
                debug!(conversation = %conversation, %data, "Ignoring unknown button");
                if let Err(e) = self.sink.acknowledge(&callback_id).await {
                    debug!(error = %e, "Could not acknowledge unknown button");
                }
                None
            }
            InboundKind::Text { .. } => {
                let prompt = OutgoingMessage::plain(texts::HELP_PROMPT);
                if let Err(e) = self.sink.send_message(conversation, &prompt).await {
                    warn!(conversation = %conversation, error = %e, "Help prompt not delivered");
                }
                None
            }
        }
    }

    /// Start a refresh in a tracked task. The coordinator contains panics in
    /// its posting stages; one escaping it (e.g. from retirement) is still
    /// reported as a failed cycle instead of tearing the task down.
    pub fn spawn_refresh(&self, conversation: ConversationId) -> JoinHandle<RefreshReport> {
        let coordinator = Arc::clone(&self.coordinator);
        let cycle = CycleId::new();

        self.tracker.spawn(async move {
            let run = AssertUnwindSafe(coordinator.refresh_cycle(conversation, cycle.clone()));
            match run.catch_unwind().await {
                Ok(report) => report,
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    error!(conversation = %conversation, cycle = %cycle.as_str(), %reason, "Refresh cycle panicked");
                    RefreshReport {
                        cycle,
                        conversation,
                        outcome: RefreshOutcome::failed(format!("refresh panicked: {}", reason)),
                        live_messages: coordinator.live_messages(conversation).await,
                        retire_failures: 0,
                    }
                }
            }
        })
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting work and wait for in-flight refreshes.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    async fn acknowledge_refresh(&self, conversation: ConversationId, callback_id: &str) {
        match self.sink.acknowledge(callback_id).await {
            Ok(()) => {}
            Err(e) => {
                match &e {
                    SyncError::AcknowledgmentExpired(_) => {
                        debug!(conversation = %conversation, "Button press expired, sending instructions")
                    }
                    _ => warn!(conversation = %conversation, error = %e, "Button acknowledgment failed"),
                }
                let fallback = OutgoingMessage::plain(texts::ACK_FALLBACK);
                if let Err(e) = self.sink.send_message(conversation, &fallback).await {
                    warn!(conversation = %conversation, error = %e, "Fallback instructions not delivered");
                }
            }
        }
    }
}

fn is_refresh_command(name: &str) -> bool {
    defaults::REFRESH_COMMANDS.contains(&name)
}

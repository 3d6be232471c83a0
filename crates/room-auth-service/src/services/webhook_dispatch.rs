//! Routing of verified webhook events to handlers by event kind.
//!
//! Handlers are registered per kind string. Kinds with no registered handler
//! are ignored; the sender may add new kinds at any time and this service
//! must keep accepting them.

use crate::models::{EventKind, WebhookEvent};
use std::collections::HashMap;
use std::sync::Arc;

/// Reaction to one kind of verified webhook event.
pub trait WebhookHandler: Send + Sync {
    fn handle(&self, event: &WebhookEvent);
}

/// Result of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// This many handlers ran.
    Handled(usize),
    /// No handler is registered for the event's kind.
    Ignored,
}

/// Logs participant lifecycle events and does nothing else.
///
/// Registered for `participant_joined`/`participant_left` until those events
/// drive real state changes.
#[derive(Debug, Default)]
pub struct ParticipantLifecycleLogger;

impl WebhookHandler for ParticipantLifecycleLogger {
    fn handle(&self, event: &WebhookEvent) {
        tracing::debug!(
            target: "room_auth.webhook",
            event = %event.event,
            room = event.room_name().unwrap_or_default(),
            "Participant lifecycle event received"
        );
    }
}

#[derive(Clone, Default)]
pub struct WebhookDispatcher {
    handlers: HashMap<String, Vec<Arc<dyn WebhookHandler>>>,
}

impl WebhookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the participant lifecycle kinds wired to
    /// [`ParticipantLifecycleLogger`].
    pub fn with_default_handlers() -> Self {
        let logger: Arc<dyn WebhookHandler> = Arc::new(ParticipantLifecycleLogger);
        let mut dispatcher = Self::new();
        dispatcher.register(EventKind::ParticipantJoined, Arc::clone(&logger));
        dispatcher.register(EventKind::ParticipantLeft, logger);
        dispatcher
    }

    /// Add `handler` for `kind`. Handlers for one kind run in registration order.
    pub fn register(&mut self, kind: impl Into<EventKind>, handler: Arc<dyn WebhookHandler>) {
        let kind: EventKind = kind.into();
        self.handlers
            .entry(kind.as_str().to_string())
            .or_default()
            .push(handler);
    }

    pub fn dispatch(&self, event: &WebhookEvent) -> DispatchOutcome {
        match self.handlers.get(event.event.as_str()) {
            Some(handlers) if !handlers.is_empty() => {
                for handler in handlers {
                    handler.handle(event);
                }
                DispatchOutcome::Handled(handlers.len())
            }
            _ => {
                tracing::debug!(
                    target: "room_auth.webhook",
                    event = %event.event,
                    "No handler registered for webhook event kind"
                );
                DispatchOutcome::Ignored
            }
        }
    }
}

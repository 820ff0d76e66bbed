//! Priority-ordered synchronous event dispatch.
//!
//! # Responsibility
//! - Hold the per-kind listener tables built by explicit registration.
//! - Run listeners of one event kind in descending priority order.
//!
//! # Invariants
//! - Equal priorities keep registration order.
//! - The first failing listener stops dispatch; its error reaches the caller
//!   wrapped once in `DocumentManagerError::Listener`.
//! - Dispatch is synchronous and never retries.

use crate::error::{DocumentManagerError, DocumentResult};
use crate::event::{DocumentEvent, EventKind, FindEvent};
use crate::node::NodeStore;
use log::{debug, error, trace};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Priority used when a subscriber has no ordering requirement.
pub const DEFAULT_PRIORITY: i32 = 0;

/// One (event kind, priority) interest declared by a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub kind: EventKind,
    pub priority: i32,
}

impl Subscription {
    pub fn new(kind: EventKind, priority: i32) -> Self {
        Self { kind, priority }
    }

    pub fn default_priority(kind: EventKind) -> Self {
        Self::new(kind, DEFAULT_PRIORITY)
    }
}

/// Store and dispatcher handles available to find listeners.
pub struct FindContext<'s> {
    pub store: &'s mut dyn NodeStore,
    pub dispatcher: &'s EventDispatcher,
}

/// Listener bound to one or more event kinds.
///
/// Handlers default to no-ops, so a subscriber only implements the kinds it
/// declares in `subscriptions`.
pub trait Subscriber: Send + Sync {
    /// Stable name used in logs and listener errors.
    fn name(&self) -> &'static str;

    fn subscriptions(&self) -> Vec<Subscription>;

    fn on_find(&self, _event: &mut FindEvent, _context: &mut FindContext<'_>) -> DocumentResult<()> {
        Ok(())
    }

    fn on_hydrate(&self, _event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        Ok(())
    }

    fn on_persist(&self, _event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        Ok(())
    }

    fn on_publish(&self, _event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        Ok(())
    }

    fn on_restore(&self, _event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        Ok(())
    }
}

/// Registered listener snapshot for introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerInfo {
    pub name: &'static str,
    pub priority: i32,
}

struct ListenerEntry {
    subscriber: Arc<dyn Subscriber>,
    priority: i32,
}

/// Per-kind listener table.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: BTreeMap<EventKind, Vec<ListenerEntry>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every subscription of `subscriber` to the listener tables.
    pub fn register(&mut self, subscriber: Arc<dyn Subscriber>) {
        for subscription in subscriber.subscriptions() {
            let entries = self.listeners.entry(subscription.kind).or_default();
            let position = entries
                .iter()
                .position(|entry| entry.priority < subscription.priority)
                .unwrap_or(entries.len());
            entries.insert(
                position,
                ListenerEntry {
                    subscriber: Arc::clone(&subscriber),
                    priority: subscription.priority,
                },
            );
            debug!(
                "event=listener_register module=dispatch status=ok kind={} listener={} priority={}",
                subscription.kind,
                subscriber.name(),
                subscription.priority
            );
        }
    }

    /// Removes every listener registered under `name`; returns how many.
    pub fn unregister(&mut self, name: &str) -> usize {
        let mut removed = 0;
        for entries in self.listeners.values_mut() {
            let before = entries.len();
            entries.retain(|entry| entry.subscriber.name() != name);
            removed += before - entries.len();
        }
        removed
    }

    /// Listeners for `kind` in execution order.
    pub fn listeners(&self, kind: EventKind) -> Vec<ListenerInfo> {
        self.listeners
            .get(&kind)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| ListenerInfo {
                        name: entry.subscriber.name(),
                        priority: entry.priority,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs find listeners against `store`.
    pub fn dispatch_find(
        &self,
        event: &mut FindEvent,
        store: &mut dyn NodeStore,
    ) -> DocumentResult<()> {
        let entries = self.entries(EventKind::Find);
        debug!(
            "event=dispatch module=dispatch status=start kind=find listeners={} {}",
            entries.len(),
            event.debug_message()
        );

        for entry in entries {
            let mut context = FindContext {
                store: &mut *store,
                dispatcher: self,
            };
            let result = entry.subscriber.on_find(event, &mut context);
            self.check(EventKind::Find, entry, result)?;
        }

        debug!(
            "event=dispatch module=dispatch status=ok kind=find {}",
            event.debug_message()
        );
        Ok(())
    }

    /// Runs the listeners for the kind carried by `event`.
    pub fn dispatch(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let kind = event.kind();
        let entries = self.entries(kind);
        debug!(
            "event=dispatch module=dispatch status=start kind={} listeners={} {}",
            kind,
            entries.len(),
            event.debug_message()
        );

        for entry in entries {
            let result = match kind {
                EventKind::Hydrate => entry.subscriber.on_hydrate(event),
                EventKind::Persist => entry.subscriber.on_persist(event),
                EventKind::Publish => entry.subscriber.on_publish(event),
                EventKind::Restore => entry.subscriber.on_restore(event),
                EventKind::Find => Ok(()),
            };
            self.check(kind, entry, result)?;
        }

        debug!(
            "event=dispatch module=dispatch status=ok kind={} {}",
            kind,
            event.debug_message()
        );
        Ok(())
    }

    fn entries(&self, kind: EventKind) -> &[ListenerEntry] {
        self.listeners
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn check(
        &self,
        kind: EventKind,
        entry: &ListenerEntry,
        result: DocumentResult<()>,
    ) -> DocumentResult<()> {
        match result {
            Ok(()) => {
                trace!(
                    "event=listener module=dispatch status=ok kind={} listener={}",
                    kind,
                    entry.subscriber.name()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=listener module=dispatch status=error kind={} listener={} priority={} error={}",
                    kind,
                    entry.subscriber.name(),
                    entry.priority,
                    err
                );
                Err(DocumentManagerError::Listener {
                    listener: entry.subscriber.name(),
                    event: kind,
                    source: Box::new(err),
                })
            }
        }
    }
}

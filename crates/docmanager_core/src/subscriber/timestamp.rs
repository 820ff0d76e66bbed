//! Created/changed timestamps.

use crate::dispatch::{Subscriber, Subscription};
use crate::encoding::encoder::PropertyEncoder;
use crate::error::DocumentResult;
use crate::event::{DocumentEvent, EventKind};
use crate::model::document::fields::{CHANGED, CREATED};
use crate::model::metadata::BehaviorScope;
use crate::model::value::PropertyValue;
use crate::subscriber::{encode_for_event, system_clock_ms, system_role, LATE_RESTORE_PRIORITY};
use std::sync::Arc;

const BEHAVIOR: &str = "timestamp";

/// Source of the current time in Unix epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Maintains `created` (set once) and `changed` (set on every write).
pub struct TimestampSubscriber {
    encoder: PropertyEncoder,
    clock: Clock,
}

impl TimestampSubscriber {
    pub fn new(encoder: PropertyEncoder) -> Self {
        Self::with_clock(encoder, Arc::new(system_clock_ms))
    }

    pub fn with_clock(encoder: PropertyEncoder, clock: Clock) -> Self {
        Self { encoder, clock }
    }

    fn key(&self, event: &DocumentEvent<'_>, scope: BehaviorScope, name: &str) -> DocumentResult<String> {
        encode_for_event(&self.encoder, event, system_role(scope), name, BEHAVIOR)
    }

    fn write(
        &self,
        event: &mut DocumentEvent<'_>,
        scope: BehaviorScope,
        changed: i64,
    ) -> DocumentResult<()> {
        let created_key = self.key(event, scope, CREATED)?;
        let changed_key = self.key(event, scope, CHANGED)?;

        if !event.node().has_property(&created_key) {
            let created = PropertyValue::Integer(event.document().created().unwrap_or(changed));
            event.accessor().set(CREATED, Some(created.clone()));
            event.node_mut().set_property(&created_key, created);
        }

        event.accessor().set(CHANGED, Some(PropertyValue::Integer(changed)));
        event
            .node_mut()
            .set_property(&changed_key, PropertyValue::Integer(changed));
        Ok(())
    }
}

impl Subscriber for TimestampSubscriber {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        vec![
            Subscription::default_priority(EventKind::Hydrate),
            Subscription::default_priority(EventKind::Persist),
            Subscription::default_priority(EventKind::Publish),
            Subscription::new(EventKind::Restore, LATE_RESTORE_PRIORITY),
        ]
    }

    fn on_hydrate(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let Some(scope) = event.document().behaviors().timestamp else {
            return Ok(());
        };
        let created = event
            .node()
            .get_property_value_with_default(&self.key(event, scope, CREATED)?, None);
        let changed = event
            .node()
            .get_property_value_with_default(&self.key(event, scope, CHANGED)?, None);

        let mut accessor = event.accessor();
        accessor.set(CREATED, created);
        accessor.set(CHANGED, changed);
        Ok(())
    }

    fn on_persist(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let Some(scope) = event.document().behaviors().timestamp else {
            return Ok(());
        };
        let now = (self.clock)();
        self.write(event, scope, now)
    }

    /// Publishing copies the draft's change time instead of taking a new one.
    fn on_publish(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let Some(scope) = event.document().behaviors().timestamp else {
            return Ok(());
        };
        let changed = match event.document().changed() {
            Some(changed) => changed,
            None => (self.clock)(),
        };
        self.write(event, scope, changed)
    }

    fn on_restore(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let Some(scope) = event.document().behaviors().timestamp else {
            return Ok(());
        };
        let changed_key = self.key(event, scope, CHANGED)?;
        let now = (self.clock)();
        event
            .node_mut()
            .set_property(&changed_key, PropertyValue::Integer(now));
        Ok(())
    }
}

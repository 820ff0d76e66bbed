//! Creator/changer tracking.
//!
//! # Invariants
//! - Creator is written once per (node, encoding scope) and never replaced.
//! - Changer is rewritten on every persist, publish and restore.
//! - Restore runs late (`LATE_RESTORE_PRIORITY`) so other restore listeners
//!   see the changer as it was before the restore.

use crate::dispatch::{Subscriber, Subscription};
use crate::encoding::encoder::PropertyEncoder;
use crate::error::DocumentResult;
use crate::event::{DocumentEvent, EventKind};
use crate::model::document::fields::{CHANGER, CREATOR};
use crate::model::metadata::BehaviorScope;
use crate::model::value::{PropertyValue, UserId};
use crate::subscriber::{encode_for_event, system_role, LATE_RESTORE_PRIORITY};
use log::trace;

const BEHAVIOR: &str = "blame";

/// Records which user created a document and who changed it last.
#[derive(Debug, Clone)]
pub struct BlameSubscriber {
    encoder: PropertyEncoder,
}

impl BlameSubscriber {
    pub fn new(encoder: PropertyEncoder) -> Self {
        Self { encoder }
    }

    fn key(&self, event: &DocumentEvent<'_>, scope: BehaviorScope, name: &str) -> DocumentResult<String> {
        encode_for_event(&self.encoder, event, system_role(scope), name, BEHAVIOR)
    }

    fn set_blames_on_node(
        &self,
        event: &mut DocumentEvent<'_>,
        scope: BehaviorScope,
        user: Option<UserId>,
    ) -> DocumentResult<()> {
        let creator_key = self.key(event, scope, CREATOR)?;
        let changer_key = self.key(event, scope, CHANGER)?;

        if !event.node().has_property(&creator_key) {
            let creator = event.document().creator().or(user).map(PropertyValue::Integer);
            trace!(
                "event=blame_creator module=subscriber document={} key={}",
                event.document().uuid(),
                creator_key
            );
            event.accessor().set(CREATOR, creator.clone());
            event.node_mut().set_or_remove_property(&creator_key, creator);
        }

        let changer = user.map(PropertyValue::Integer);
        event.accessor().set(CHANGER, changer.clone());
        event.node_mut().set_or_remove_property(&changer_key, changer);
        Ok(())
    }
}

impl Subscriber for BlameSubscriber {
    fn name(&self) -> &'static str {
        "blame"
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
        let Some(scope) = event.document().behaviors().blame else {
            return Ok(());
        };

        let changer_key = self.key(event, scope, CHANGER)?;
        let creator_key = self.key(event, scope, CREATOR)?;
        let changer = event.node().get_property_value_with_default(&changer_key, None);
        let creator = event.node().get_property_value_with_default(&creator_key, None);

        let mut accessor = event.accessor();
        accessor.set(CHANGER, changer);
        accessor.set(CREATOR, creator);
        Ok(())
    }

    fn on_persist(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let Some(scope) = event.document().behaviors().blame else {
            return Ok(());
        };
        let user = event.options().user();
        self.set_blames_on_node(event, scope, user)
    }

    /// Publishing reuses the changer recorded by the last persist.
    fn on_publish(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let Some(scope) = event.document().behaviors().blame else {
            return Ok(());
        };
        let user = event.document().changer();
        self.set_blames_on_node(event, scope, user)
    }

    fn on_restore(&self, event: &mut DocumentEvent<'_>) -> DocumentResult<()> {
        let Some(scope) = event.document().behaviors().blame else {
            return Ok(());
        };
        let changer_key = self.key(event, scope, CHANGER)?;
        let user = event.options().user().map(PropertyValue::Integer);
        event.node_mut().set_or_remove_property(&changer_key, user);
        Ok(())
    }
}

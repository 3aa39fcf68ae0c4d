//! Webhook routing - decode an inbound payload into a canonical event
//!
//! With a source hint the named instance is authoritative: if it is not
//! registered (or is not of the expected type) the result is `None` and no
//! other instance is tried. Without a hint every instance of the expected
//! type is tried in configuration order and the first decoded event wins.

use mediagate_core::{BackendError, WebhookEvent, WebhookPayload};
use tracing::{debug, trace};

use crate::instance::ServerInstance;
use crate::registry::InstanceRegistry;

/// Routes webhook payloads to the instance that can decode them
pub struct WebhookRouter<'a> {
    registry: &'a InstanceRegistry,
}

impl<'a> WebhookRouter<'a> {
    pub fn new(registry: &'a InstanceRegistry) -> Self {
        Self { registry }
    }

    /// Decode `payload` sent by a backend of type `server_type`
    pub fn decode(
        &self,
        server_type: &str,
        payload: &WebhookPayload,
        source: Option<&str>,
    ) -> Option<WebhookEvent> {
        if let Some(source) = source {
            let Some(instance) = self.registry.get_typed(source, server_type) else {
                debug!(source, server_type, "Webhook source is not a registered instance");
                return None;
            };
            return decode_with(&instance, payload);
        }

        self.registry
            .list_all()
            .iter()
            .filter(|instance| instance.server_type() == server_type)
            .find_map(|instance| decode_with(instance, payload))
    }
}

fn decode_with(instance: &ServerInstance, payload: &WebhookPayload) -> Option<WebhookEvent> {
    match instance.backend().decode_webhook(payload) {
        Ok(Some(mut event)) => {
            event.server = instance.name().to_string();
            debug!(server = %instance.name(), event = %event.event, "Webhook decoded");
            Some(event)
        }
        Ok(None) => None,
        Err(BackendError::Parse(reason)) => {
            trace!(server = %instance.name(), %reason, "Webhook payload not recognised");
            None
        }
        Err(e) => {
            debug!(server = %instance.name(), error = %e, "Webhook decoding failed");
            None
        }
    }
}

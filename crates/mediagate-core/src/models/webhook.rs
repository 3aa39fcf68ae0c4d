//! Webhook payloads and the canonical event they decode into

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw inbound webhook request as received by the HTTP layer
#[derive(Debug, Clone, Default)]
pub struct WebhookPayload {
    /// Request body
    pub body: Bytes,
    /// Form fields (multipart or urlencoded)
    pub form: HashMap<String, String>,
    /// Query-string arguments
    pub args: HashMap<String, String>,
}

impl WebhookPayload {
    /// Payload carrying only a body
    pub fn from_body(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    /// Add a query-string argument
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Add a form field
    pub fn with_form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    /// Instance hint passed as `?source=<name>`
    pub fn source(&self) -> Option<&str> {
        self.args
            .get("source")
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Kind of notification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WebhookEventKind {
    PlaybackStart,
    PlaybackPause,
    PlaybackStop,
    LibraryNew,
    Login,
    /// Backend-specific event name passed through unchanged
    Other(String),
}

impl fmt::Display for WebhookEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WebhookEventKind::PlaybackStart => "playback.start",
            WebhookEventKind::PlaybackPause => "playback.pause",
            WebhookEventKind::PlaybackStop => "playback.stop",
            WebhookEventKind::LibraryNew => "library.new",
            WebhookEventKind::Login => "user.login",
            WebhookEventKind::Other(name) => name,
        };
        f.write_str(s)
    }
}

impl From<&str> for WebhookEventKind {
    fn from(s: &str) -> Self {
        match s {
            "playback.start" | "media.play" | "media.resume" => WebhookEventKind::PlaybackStart,
            "playback.pause" | "media.pause" => WebhookEventKind::PlaybackPause,
            "playback.stop" | "media.stop" => WebhookEventKind::PlaybackStop,
            "library.new" | "item.added" => WebhookEventKind::LibraryNew,
            "user.login" | "admin.login" => WebhookEventKind::Login,
            other => WebhookEventKind::Other(other.to_string()),
        }
    }
}

impl From<String> for WebhookEventKind {
    fn from(s: String) -> Self {
        WebhookEventKind::from(s.as_str())
    }
}

impl From<WebhookEventKind> for String {
    fn from(kind: WebhookEventKind) -> Self {
        kind.to_string()
    }
}

/// Backend-agnostic representation of a decoded webhook notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: WebhookEventKind,
    /// Backend type that produced the event
    pub channel: String,
    /// Instance that decoded the event (stamped by the router)
    #[serde(default)]
    pub server: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl WebhookEvent {
    pub fn new(event: WebhookEventKind, channel: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            event,
            channel: channel.into(),
            server: String::new(),
            title: title.into(),
            text: None,
            image: None,
            item_type: None,
            item_name: None,
            item_id: None,
            user_name: None,
            device_name: None,
            client: None,
            received_at: Utc::now(),
        }
    }
}

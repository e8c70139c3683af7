//! Typed event envelope shared by the WebSocket layer and the client.
//!
//! Every frame on the wire is a JSON object with a mandatory `type` tag and
//! optional `message`, `data` and `channel` fields. The tag is modelled as
//! [`EventKind`], a closed enum of known tags plus a catch-all variant so
//! unknown event types survive a round-trip instead of failing to parse.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::Value;

use super::timestamp::Timestamp;

/// Wire tag of an event envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Welcome frame sent once per accepted connection
    Connection,
    /// A CCTV camera reported a detection
    CctvDetection,
    /// A new CCTV camera was registered
    CctvAdded,
    /// A batch analysis of scraped results finished
    AnalysisComplete,
    /// Snapshot of dashboard counters, sent on request
    StatusUpdate,
    /// Server reflection of an unclassified client frame
    Echo,
    /// Liveness probe from a client
    Ping,
    /// Liveness reply
    Pong,
    /// Channel subscription request
    Subscribe,
    /// Channel unsubscription request
    Unsubscribe,
    /// Ack for a subscribe
    SubscriptionConfirmed,
    /// Ack for an unsubscribe
    UnsubscriptionConfirmed,
    /// Client asking for a status_update
    RequestStatus,
    /// Something went wrong handling a client frame
    Error,
    /// Any tag this build does not know about
    Other(String),
}

impl EventKind {
    /// Returns the wire representation of this tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connection => "connection",
            Self::CctvDetection => "cctv_detection",
            Self::CctvAdded => "cctv_added",
            Self::AnalysisComplete => "analysis_complete",
            Self::StatusUpdate => "status_update",
            Self::Echo => "echo",
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::SubscriptionConfirmed => "subscription_confirmed",
            Self::UnsubscriptionConfirmed => "unsubscription_confirmed",
            Self::RequestStatus => "request_status",
            Self::Error => "error",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for EventKind {
    fn from(tag: &str) -> Self {
        match tag {
            "connection" => Self::Connection,
            "cctv_detection" => Self::CctvDetection,
            "cctv_added" => Self::CctvAdded,
            "analysis_complete" => Self::AnalysisComplete,
            "status_update" => Self::StatusUpdate,
            "echo" => Self::Echo,
            "ping" => Self::Ping,
            "pong" => Self::Pong,
            "subscribe" => Self::Subscribe,
            "unsubscribe" => Self::Unsubscribe,
            "subscription_confirmed" => Self::SubscriptionConfirmed,
            "unsubscription_confirmed" => Self::UnsubscriptionConfirmed,
            "request_status" => Self::RequestStatus,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(EventKind::from(tag.as_str()))
    }
}

/// A single frame on the real-time channel, either direction.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Envelope {
    /// Event tag
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Human-readable message, when the event carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Structured payload, shape depends on `kind`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Channel the event was routed through, set by channel broadcasts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Stamped by the sending side at send time; defaults to receipt time
    /// when an inbound frame omits it
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl Envelope {
    /// Creates an envelope with just a kind, stamped now.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            message: None,
            data: None,
            channel: None,
            timestamp: Timestamp::now(),
        }
    }

    /// Attaches a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches a structured payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attaches a channel name.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Welcome frame sent to every freshly accepted session.
    pub fn connection() -> Self {
        Self::new(EventKind::Connection).with_message("Connected to Sentinel Dashboard WebSocket")
    }

    /// Liveness reply to a `ping`.
    pub fn pong() -> Self {
        Self::new(EventKind::Pong)
    }

    /// Error frame delivered to the offending sender only.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventKind::Error).with_message(message)
    }

    /// Reflection of an unclassified client frame, broadcast to everyone.
    pub fn echo(original: Value) -> Self {
        Self::new(EventKind::Echo).with_data(serde_json::json!({ "original_message": original }))
    }

    /// Ack confirming a channel subscription.
    pub fn subscription_confirmed(channel: &str) -> Self {
        Self::new(EventKind::SubscriptionConfirmed)
            .with_message(format!("Subscribed to {channel}"))
            .with_channel(channel)
    }

    /// Ack confirming a channel unsubscription.
    pub fn unsubscription_confirmed(channel: &str) -> Self {
        Self::new(EventKind::UnsubscriptionConfirmed)
            .with_message(format!("Unsubscribed from {channel}"))
            .with_channel(channel)
    }

    /// Serializes to the JSON text that goes on the wire.
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_kind_roundtrips_known_tags() {
        for tag in [
            "connection",
            "cctv_detection",
            "cctv_added",
            "analysis_complete",
            "status_update",
            "echo",
            "ping",
            "pong",
            "subscribe",
            "unsubscribe",
            "subscription_confirmed",
            "unsubscription_confirmed",
            "request_status",
            "error",
        ] {
            let kind = EventKind::from(tag);
            assert!(!matches!(kind, EventKind::Other(_)), "unexpected Other for {tag}");
            assert_eq!(kind.as_str(), tag);
        }
    }

    #[test]
    fn event_kind_preserves_unknown_tags() {
        let kind = EventKind::from("telemetry_blob");
        assert_eq!(kind, EventKind::Other("telemetry_blob".to_string()));
        assert_eq!(kind.as_str(), "telemetry_blob");

        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"telemetry_blob\"");

        let back: EventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn envelope_serializes_with_type_tag() {
        let envelope = Envelope::new(EventKind::CctvDetection)
            .with_data(json!({ "cctv_id": 7 }))
            .with_channel("cctv_detection");

        let value: Value = serde_json::from_str(&envelope.to_wire().unwrap()).unwrap();
        assert_eq!(value["type"], "cctv_detection");
        assert_eq!(value["channel"], "cctv_detection");
        assert_eq!(value["data"]["cctv_id"], 7);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn envelope_omits_absent_optional_fields() {
        let value: Value = serde_json::from_str(&Envelope::pong().to_wire().unwrap()).unwrap();
        assert_eq!(value["type"], "pong");
        assert!(value.get("message").is_none());
        assert!(value.get("data").is_none());
        assert!(value.get("channel").is_none());
    }

    #[test]
    fn connection_envelope_carries_welcome_message() {
        let envelope = Envelope::connection();
        assert_eq!(envelope.kind, EventKind::Connection);
        assert_eq!(
            envelope.message.as_deref(),
            Some("Connected to Sentinel Dashboard WebSocket")
        );
    }

    #[test]
    fn echo_envelope_wraps_original_message() {
        let original = json!({ "type": "test", "payload": 42 });
        let envelope = Envelope::echo(original.clone());

        assert_eq!(envelope.kind, EventKind::Echo);
        let data = envelope.data.unwrap();
        assert_eq!(data["original_message"], original);
    }

    #[test]
    fn subscription_acks_name_the_channel() {
        let sub = Envelope::subscription_confirmed("system_status");
        assert_eq!(sub.kind, EventKind::SubscriptionConfirmed);
        assert_eq!(sub.channel.as_deref(), Some("system_status"));
        assert_eq!(sub.message.as_deref(), Some("Subscribed to system_status"));

        let unsub = Envelope::unsubscription_confirmed("system_status");
        assert_eq!(unsub.kind, EventKind::UnsubscriptionConfirmed);
        assert_eq!(unsub.channel.as_deref(), Some("system_status"));
    }

    #[test]
    fn envelope_deserializes_inbound_frames() {
        let frame = r#"{"type":"subscribe","channel":"cctv_detection","timestamp":"2024-01-15T10:30:00Z"}"#;
        let envelope: Envelope = serde_json::from_str(frame).unwrap();
        assert_eq!(envelope.kind, EventKind::Subscribe);
        assert_eq!(envelope.channel.as_deref(), Some("cctv_detection"));
    }

    #[test]
    fn envelope_defaults_missing_timestamp_to_receipt_time() {
        let before = Timestamp::now();
        let envelope: Envelope = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(envelope.kind, EventKind::Ping);
        assert!(!envelope.timestamp.is_before(&before));
    }
}

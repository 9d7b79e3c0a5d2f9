//! Intermediate representation produced by the protocol parsers.
//!
//! A `ParsedMessage` is the family-specific decode of one raw message. Field
//! naming is uniform across families: a bus slot is a `module_address`, a
//! module serial is a `module_id`, and an RFID slot is a `position`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::common::{TopicParts, hex_upper};
use crate::DEFAULT_TIMESTAMP;

/// Format a timestamp as RFC 3339, falling back to the Unix epoch.
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339)
        .unwrap_or_else(|_| DEFAULT_TIMESTAMP.to_string())
}

/// One message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub received_at: OffsetDateTime,
}

impl RawMessage {
    /// Build a message stamped with the current time.
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self::at(topic, payload, OffsetDateTime::now_utc())
    }

    pub fn at(
        topic: impl Into<String>,
        payload: impl Into<Vec<u8>>,
        received_at: OffsetDateTime,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            received_at,
        }
    }
}

/// Device families understood by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceFamily {
    /// Binary, fixed-offset protocol.
    #[serde(rename = "V5008")]
    V5008,
    /// JSON protocol dispatched on `msg_type`.
    #[serde(rename = "V6800")]
    V6800,
    /// Families without a defined layout, captured as-is.
    #[serde(rename = "generic")]
    Generic,
}

impl DeviceFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceFamily::V5008 => "V5008",
            DeviceFamily::V6800 => "V6800",
            DeviceFamily::Generic => "generic",
        }
    }

    fn is_binary(self) -> bool {
        matches!(self, DeviceFamily::V5008)
    }
}

impl std::fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured decode of one raw message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedMessage {
    pub device_id: String,
    pub family: DeviceFamily,
    pub message_class: String,
    pub msg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_address: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    pub body: MessageBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<u64>,
    /// Upper-case hex for binary families, text for JSON families.
    pub raw_payload: String,
    /// RFC 3339 time the message reached the core.
    pub timestamp: String,
    /// Time reported by the device itself, when the payload carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_time: Option<String>,
}

impl ParsedMessage {
    pub(crate) fn new(
        parts: TopicParts<'_>,
        family: DeviceFamily,
        msg_type: impl Into<String>,
        body: MessageBody,
        raw: &RawMessage,
    ) -> Self {
        let raw_payload = if family.is_binary() {
            hex_upper(&raw.payload)
        } else {
            String::from_utf8_lossy(&raw.payload).into_owned()
        };
        let (module_address, module_id) = match body.single_module() {
            Some((address, id)) => (Some(address), id),
            None => (None, None),
        };
        Self {
            device_id: parts.device_id.to_string(),
            family,
            message_class: parts.message_class.to_string(),
            msg_type: msg_type.into(),
            module_address,
            module_id,
            body,
            message_id: None,
            raw_payload,
            timestamp: format_timestamp(raw.received_at),
            device_time: None,
        }
    }

    pub(crate) fn with_message_id(mut self, message_id: Option<u64>) -> Self {
        self.message_id = message_id;
        self
    }

    pub(crate) fn with_device_time(mut self, device_time: Option<String>) -> Self {
        self.device_time = device_time;
        self
    }
}

/// Decoded content, one variant per message type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    Heartbeat(Heartbeat),
    DoorState { doors: Vec<DoorReading> },
    RfidSnapshot { modules: Vec<RfidModuleSnapshot> },
    RfidEvents { modules: Vec<RfidModuleEvents> },
    TemperatureHumidity { modules: Vec<ClimateModule> },
    Noise { modules: Vec<NoiseModule> },
    DeviceInfo {
        device: DeviceProfile,
        modules: Vec<ModuleProfile>,
    },
    ModuleInfo { modules: Vec<ModuleProfile> },
    CommandAck(CommandAck),
    /// Well-formed payload of a type the family parser does not know.
    Unknown { payload: Value },
    /// Payload that could not be decoded as JSON.
    Raw { text: String },
    /// Payload from a family without a defined layout.
    Capture { payload: Value },
}

impl MessageBody {
    /// The module this message is about, when it concerns exactly one.
    fn single_module(&self) -> Option<(u8, Option<String>)> {
        let mut modules: Vec<(u8, Option<&String>)> = match self {
            MessageBody::Heartbeat(hb) => hb
                .modules
                .iter()
                .map(|m| (m.module_address, m.module_id.as_ref()))
                .collect(),
            MessageBody::DoorState { doors } => doors
                .iter()
                .map(|d| (d.module_address, d.module_id.as_ref()))
                .collect(),
            MessageBody::RfidSnapshot { modules } => modules
                .iter()
                .map(|m| (m.module_address, m.module_id.as_ref()))
                .collect(),
            MessageBody::RfidEvents { modules } => modules
                .iter()
                .map(|m| (m.module_address, m.module_id.as_ref()))
                .collect(),
            MessageBody::TemperatureHumidity { modules } => modules
                .iter()
                .map(|m| (m.module_address, m.module_id.as_ref()))
                .collect(),
            MessageBody::Noise { modules } => modules
                .iter()
                .map(|m| (m.module_address, m.module_id.as_ref()))
                .collect(),
            MessageBody::ModuleInfo { modules } => modules
                .iter()
                .map(|m| (m.module_address, m.module_id.as_ref()))
                .collect(),
            MessageBody::CommandAck(ack) => ack
                .modules
                .iter()
                .map(|m| (m.module_address, None))
                .collect(),
            MessageBody::DeviceInfo { .. }
            | MessageBody::Unknown { .. }
            | MessageBody::Raw { .. }
            | MessageBody::Capture { .. } => Vec::new(),
        };
        if modules.len() != 1 {
            return None;
        }
        modules
            .pop()
            .map(|(address, id)| (address, id.cloned()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heartbeat {
    pub modules: Vec<ModulePresence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModulePresence {
    pub module_address: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u_total: Option<u8>,
}

/// Bus electrical readings and supply flags reported with a heartbeat.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PowerStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_current: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_power: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_power: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoorReading {
    pub module_address: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    pub state: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagReading {
    pub position: u8,
    pub tag_id: String,
    pub alarm: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfidModuleSnapshot {
    pub module_address: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u_total: Option<u8>,
    pub tags: Vec<TagReading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagAction {
    Attach,
    Detach,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagEvent {
    pub position: u8,
    pub tag_id: String,
    pub alarm: u8,
    pub action: TagAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfidModuleEvents {
    pub module_address: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    pub events: Vec<TagEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateReading {
    pub sensor_address: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateModule {
    pub module_address: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    pub sensors: Vec<ClimateReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiseReading {
    pub sensor_address: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiseModule {
    pub module_address: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    pub sensors: Vec<NoiseReading>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleProfile {
    pub module_address: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u_total: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AckCommand {
    ColorSet,
    AlarmClear,
    ColorQuery,
}

impl AckCommand {
    /// Record key used for this command's result.
    pub fn data_key(self) -> &'static str {
        match self {
            AckCommand::ColorSet => "color_set_result",
            AckCommand::AlarmClear => "alarm_clear_result",
            AckCommand::ColorQuery => "color_query_result",
        }
    }
}

/// Classification of an acknowledgement's result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AckOutcome {
    Success,
    Failure,
}

impl AckOutcome {
    /// Exactly one code means success; every other code is a failure.
    pub fn from_code(code: i64, success_code: i64) -> Self {
        if code == success_code {
            AckOutcome::Success
        } else {
            AckOutcome::Failure
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AckOutcome::Success => "Success",
            AckOutcome::Failure => "Failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AckSlot {
    pub position: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AckModule {
    pub module_address: u8,
    pub slots: Vec<AckSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandAck {
    pub command: AckCommand,
    pub result_code: i64,
    pub outcome: AckOutcome,
    pub modules: Vec<AckModule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_outcome_only_matches_exact_code() {
        assert_eq!(AckOutcome::from_code(0xA1, 0xA1), AckOutcome::Success);
        assert_eq!(AckOutcome::from_code(0xA0, 0xA1), AckOutcome::Failure);
        assert_eq!(AckOutcome::from_code(1, 0xA1), AckOutcome::Failure);
    }

    #[test]
    fn single_module_is_lifted_to_the_message() {
        let raw = RawMessage::at("V5008Upload/1/OpeAck", vec![0xBA], OffsetDateTime::UNIX_EPOCH);
        let parts = TopicParts::parse(&raw.topic).unwrap();
        let body = MessageBody::DoorState {
            doors: vec![DoorReading {
                module_address: 3,
                module_id: Some("42".to_string()),
                state: 1,
            }],
        };
        let parsed = ParsedMessage::new(parts, DeviceFamily::V5008, "door_state", body, &raw);
        assert_eq!(parsed.module_address, Some(3));
        assert_eq!(parsed.module_id.as_deref(), Some("42"));
        assert_eq!(parsed.raw_payload, "BA");
        assert_eq!(parsed.timestamp, "1970-01-01T00:00:00Z");
    }

    #[test]
    fn body_serializes_with_kind_tag() {
        let body = MessageBody::Raw {
            text: "not json".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["kind"], "raw");
        assert_eq!(value["text"], "not json");
    }
}

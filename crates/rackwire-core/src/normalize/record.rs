use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::protocols::message::{DeviceFamily, ParsedMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordClass {
    Telemetry,
    Event,
    State,
    Lifecycle,
    DeviceInfo,
}

impl RecordClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordClass::Telemetry => "TELEMETRY",
            RecordClass::Event => "EVENT",
            RecordClass::State => "STATE",
            RecordClass::Lifecycle => "LIFECYCLE",
            RecordClass::DeviceInfo => "DEVICE_INFO",
        }
    }
}

impl std::fmt::Display for RecordClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIdentity {
    pub device_id: String,
    pub device_family: DeviceFamily,
    pub module_address: u8,
    pub sensor_address: u8,
}

/// One normalized fact about a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub uuid: Uuid,
    /// Device-reported time when the message carried one, else the parse time.
    pub ts: String,
    pub received_at: String,
    pub identity: RecordIdentity,
    pub record_class: RecordClass,
    pub data_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub str_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_value: Option<Value>,
    /// `{device_id}/M{module_address}/S{sensor_address}`
    pub path: String,
}

impl NormalizedRecord {
    pub fn with_num(mut self, value: f64) -> Self {
        self.num_value = Some(value);
        self
    }

    pub fn with_str(mut self, value: impl Into<String>) -> Self {
        self.str_value = Some(value.into());
        self
    }

    pub fn with_json(mut self, value: Value) -> Self {
        self.json_value = Some(value);
        self
    }
}

pub fn record_path(device_id: &str, module_address: u8, sensor_address: u8) -> String {
    format!("{device_id}/M{module_address}/S{sensor_address}")
}

/// Fields shared by every record built from one parsed message.
pub(crate) struct RecordContext<'a> {
    message: &'a ParsedMessage,
}

impl<'a> RecordContext<'a> {
    pub(crate) fn new(message: &'a ParsedMessage) -> Self {
        Self { message }
    }

    pub(crate) fn message(&self) -> &'a ParsedMessage {
        self.message
    }

    pub(crate) fn record(
        &self,
        record_class: RecordClass,
        data_key: &str,
        module_address: u8,
        sensor_address: u8,
    ) -> NormalizedRecord {
        let message = self.message;
        NormalizedRecord {
            uuid: Uuid::new_v4(),
            ts: message
                .device_time
                .clone()
                .unwrap_or_else(|| message.timestamp.clone()),
            received_at: message.timestamp.clone(),
            identity: RecordIdentity {
                device_id: message.device_id.clone(),
                device_family: message.family,
                module_address,
                sensor_address,
            },
            record_class,
            data_key: data_key.to_string(),
            num_value: None,
            str_value: None,
            json_value: None,
            path: record_path(&message.device_id, module_address, sensor_address),
        }
    }

    /// Record for the message's own module, or module 0 when it has none.
    pub(crate) fn device_record(&self, record_class: RecordClass, data_key: &str) -> NormalizedRecord {
        self.record(
            record_class,
            data_key,
            self.message.module_address.unwrap_or(0),
            0,
        )
    }
}

/// Serialize a payload fragment, logging and degrading to `null` on failure.
pub(crate) fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|err| {
        warn!(error = %err, "failed to serialize record payload");
        Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::{RecordClass, record_path};

    #[test]
    fn path_defaults_to_module_and_sensor_zero() {
        assert_eq!(record_path("2437871205", 0, 0), "2437871205/M0/S0");
        assert_eq!(record_path("dev", 3, 11), "dev/M3/S11");
    }

    #[test]
    fn record_class_uses_upper_case_names() {
        let value = serde_json::to_value(RecordClass::DeviceInfo).unwrap();
        assert_eq!(value, "DEVICE_INFO");
        let parsed: RecordClass = serde_json::from_str("\"TELEMETRY\"").unwrap();
        assert_eq!(parsed, RecordClass::Telemetry);
    }
}

//! Wire shapes of the V6800 JSON messages.
//!
//! Only the fields the parser reads are declared; anything else in the
//! payload is ignored. Devices are inconsistent about quoting numbers, so
//! numeric fields that have been seen both ways use [`NumberOrText`].

use serde::Deserialize;

pub const NAMESPACE: &str = "V6800Upload";

pub const MSG_TYPE_FIELD: &str = "msg_type";
pub const MESSAGE_ID_FIELD: &str = "uuid_number";
pub const DEVICE_TIME_FIELD: &str = "time_stamp";

pub const ACK_SUCCESS_CODE: i64 = 200;

pub const EVENT_ATTACH: u8 = 1;
pub const EVENT_DETACH: u8 = 0;

/// A JSON scalar that may arrive as a number or as a quoted number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrText {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrText::Number(n) => n.as_f64(),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrText::Number(n) => n.as_i64(),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            NumberOrText::Number(n) => n.as_u64(),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatReq {
    #[serde(rename = "bus_V", default)]
    pub bus_voltage: Option<NumberOrText>,
    #[serde(rename = "bus_I", default)]
    pub bus_current: Option<NumberOrText>,
    #[serde(default)]
    pub main_power: Option<NumberOrText>,
    #[serde(default)]
    pub backup_power: Option<NumberOrText>,
    #[serde(default)]
    pub data: Vec<HeartbeatModule>,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatModule {
    pub module_index: u8,
    #[serde(default)]
    pub module_sn: Option<NumberOrText>,
    #[serde(default)]
    pub module_u_num: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct DoorStateEvent {
    pub data: Vec<DoorModule>,
}

#[derive(Debug, Deserialize)]
pub struct DoorModule {
    pub module_index: u8,
    #[serde(default)]
    pub module_sn: Option<NumberOrText>,
    pub new_state: u8,
}

#[derive(Debug, Deserialize)]
pub struct UStateResp {
    pub data: Vec<UStateModule>,
}

#[derive(Debug, Deserialize)]
pub struct UStateModule {
    pub module_index: u8,
    #[serde(default)]
    pub module_sn: Option<NumberOrText>,
    #[serde(default)]
    pub module_u_num: Option<u8>,
    #[serde(default)]
    pub data: Vec<USlot>,
}

#[derive(Debug, Deserialize)]
pub struct USlot {
    pub u_index: u8,
    #[serde(default)]
    pub tag_code: String,
    #[serde(default)]
    pub warning: u8,
}

#[derive(Debug, Deserialize)]
pub struct UStateChangedEvent {
    pub data: Vec<UChangeModule>,
}

#[derive(Debug, Deserialize)]
pub struct UChangeModule {
    pub module_index: u8,
    #[serde(default)]
    pub module_sn: Option<NumberOrText>,
    #[serde(default)]
    pub data: Vec<UChange>,
}

#[derive(Debug, Deserialize)]
pub struct UChange {
    pub u_index: u8,
    #[serde(default)]
    pub tag_code: String,
    #[serde(default)]
    pub warning: u8,
    pub new_state: u8,
}

#[derive(Debug, Deserialize)]
pub struct TemperHumidityResp {
    pub data: Vec<TemperHumidityModule>,
}

#[derive(Debug, Deserialize)]
pub struct TemperHumidityModule {
    pub module_index: u8,
    #[serde(default)]
    pub module_sn: Option<NumberOrText>,
    #[serde(default)]
    pub data: Vec<TemperHumiditySlot>,
}

#[derive(Debug, Deserialize)]
pub struct TemperHumiditySlot {
    pub temper_position: u8,
    #[serde(default)]
    pub temper_swot: Option<NumberOrText>,
    #[serde(default)]
    pub hygrometer_swot: Option<NumberOrText>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceInitReq {
    #[serde(default)]
    pub gateway_model: Option<NumberOrText>,
    #[serde(default)]
    pub gateway_sw_version: Option<NumberOrText>,
    #[serde(default)]
    pub gateway_ip: Option<String>,
    #[serde(default)]
    pub gateway_mask: Option<String>,
    #[serde(default)]
    pub gateway_gw: Option<String>,
    #[serde(default)]
    pub gateway_mac: Option<String>,
    #[serde(default)]
    pub data: Vec<DeviceInitModule>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceInitModule {
    pub module_index: u8,
    #[serde(default)]
    pub module_sn: Option<NumberOrText>,
    #[serde(default)]
    pub module_sw_version: Option<NumberOrText>,
    #[serde(default)]
    pub module_u_num: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct CommandResp {
    pub code: NumberOrText,
    #[serde(default)]
    pub data: Vec<CommandRespModule>,
}

#[derive(Debug, Deserialize)]
pub struct CommandRespModule {
    pub module_index: u8,
    #[serde(default)]
    pub data: Vec<CommandRespSlot>,
}

#[derive(Debug, Deserialize)]
pub struct CommandRespSlot {
    pub u_index: u8,
    #[serde(default)]
    pub color: Option<u8>,
}

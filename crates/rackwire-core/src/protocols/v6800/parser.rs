use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::protocols::common::{TopicParts, topic_in_namespace};
use crate::protocols::error::ParseError;
use crate::protocols::message::{
    AckCommand, AckModule, AckOutcome, AckSlot, ClimateModule, ClimateReading, CommandAck,
    DeviceFamily, DeviceProfile, DoorReading, Heartbeat, MessageBody, ModulePresence,
    ModuleProfile, ParsedMessage, PowerStatus, RawMessage, RfidModuleEvents, RfidModuleSnapshot,
    TagAction, TagEvent, TagReading,
};
use crate::protocols::router::ProtocolParser;

use super::schema::{self, NumberOrText};

type Decoder = fn(&str, &Value) -> Result<MessageBody, ParseError>;

/// Device `msg_type` → (normalized message type, decoder).
const MSG_TYPE_DECODERS: &[(&str, &str, Decoder)] = &[
    ("heart_beat_req", "heartbeat", decode_heartbeat),
    ("door_state_changed_event", "door_state", decode_door_state),
    ("u_state_resp", "rfid_snapshot", decode_u_state),
    (
        "u_state_changed_notify_event",
        "rfid_events",
        decode_u_state_changed,
    ),
    (
        "temper_humidity_resp",
        "temperature_humidity",
        decode_temper_humidity,
    ),
    (
        "temper_humidity_exception_nofity_event",
        "temperature_humidity",
        decode_temper_humidity,
    ),
    ("devies_init_req", "device_info", decode_device_init),
    ("u_color_set_resp", "color_set_ack", decode_color_set_resp),
    ("clear_u_warning_resp", "alarm_clear_ack", decode_alarm_clear_resp),
];

/// Parser for the JSON V6800 family.
#[derive(Debug, Clone)]
pub struct V6800Parser {
    namespace: String,
}

impl V6800Parser {
    pub fn new() -> Self {
        Self::with_namespace(schema::NAMESPACE)
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl Default for V6800Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolParser for V6800Parser {
    fn name(&self) -> &'static str {
        "v6800"
    }

    fn family(&self) -> DeviceFamily {
        DeviceFamily::V6800
    }

    fn can_handle(&self, topic: &str) -> bool {
        topic_in_namespace(topic, &self.namespace)
    }

    fn parse(&self, raw: &RawMessage) -> Result<ParsedMessage, ParseError> {
        let parts = TopicParts::parse(&raw.topic)?;

        let value: Value = match serde_json::from_slice(&raw.payload) {
            Ok(value) => value,
            Err(err) => {
                debug!(device_id = parts.device_id, error = %err, "payload is not JSON");
                let body = MessageBody::Raw {
                    text: String::from_utf8_lossy(&raw.payload).into_owned(),
                };
                return Ok(ParsedMessage::new(parts, DeviceFamily::V6800, "raw", body, raw));
            }
        };

        let message_id = value
            .get(schema::MESSAGE_ID_FIELD)
            .and_then(|v| NumberOrText::deserialize(v).ok())
            .and_then(|id| id.as_u64());
        let device_time = value
            .get(schema::DEVICE_TIME_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);
        let device_msg_type = value
            .get(schema::MSG_TYPE_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);

        let entry = device_msg_type.as_deref().and_then(|msg_type| {
            MSG_TYPE_DECODERS
                .iter()
                .find(|(device_type, _, _)| *device_type == msg_type)
        });

        let (msg_type, body) = match entry {
            Some((device_type, msg_type, decoder)) => {
                (msg_type.to_string(), decoder(device_type, &value)?)
            }
            None => {
                debug!(
                    device_id = parts.device_id,
                    msg_type = device_msg_type.as_deref().unwrap_or("<missing>"),
                    "unrecognised V6800 msg_type"
                );
                (
                    device_msg_type.unwrap_or_else(|| "unknown".to_string()),
                    MessageBody::Unknown { payload: value },
                )
            }
        };

        Ok(ParsedMessage::new(parts, DeviceFamily::V6800, msg_type, body, raw)
            .with_message_id(message_id)
            .with_device_time(device_time))
    }
}

fn decode<T: DeserializeOwned>(msg_type: &str, value: &Value) -> Result<T, ParseError> {
    T::deserialize(value).map_err(|err| ParseError::InvalidPayload {
        msg_type: msg_type.to_string(),
        reason: err.to_string(),
    })
}

fn text(value: &Option<NumberOrText>) -> Option<String> {
    value.as_ref().map(NumberOrText::to_text)
}

fn metric(value: &Option<NumberOrText>) -> Option<f64> {
    value.as_ref().and_then(NumberOrText::as_f64)
}

fn flag(value: &Option<NumberOrText>) -> Option<bool> {
    value.as_ref().and_then(NumberOrText::as_i64).map(|v| v != 0)
}

fn decode_heartbeat(msg_type: &str, value: &Value) -> Result<MessageBody, ParseError> {
    let req: schema::HeartbeatReq = decode(msg_type, value)?;
    let power = PowerStatus {
        bus_voltage: metric(&req.bus_voltage),
        bus_current: metric(&req.bus_current),
        main_power: flag(&req.main_power),
        backup_power: flag(&req.backup_power),
    };
    let modules = req
        .data
        .iter()
        .map(|m| ModulePresence {
            module_address: m.module_index,
            module_id: text(&m.module_sn),
            u_total: m.module_u_num,
        })
        .collect();
    Ok(MessageBody::Heartbeat(Heartbeat {
        modules,
        power: (power != PowerStatus::default()).then_some(power),
    }))
}

fn decode_door_state(msg_type: &str, value: &Value) -> Result<MessageBody, ParseError> {
    let event: schema::DoorStateEvent = decode(msg_type, value)?;
    let doors = event
        .data
        .iter()
        .map(|d| DoorReading {
            module_address: d.module_index,
            module_id: text(&d.module_sn),
            state: d.new_state,
        })
        .collect();
    Ok(MessageBody::DoorState { doors })
}

fn decode_u_state(msg_type: &str, value: &Value) -> Result<MessageBody, ParseError> {
    let resp: schema::UStateResp = decode(msg_type, value)?;
    let modules = resp
        .data
        .into_iter()
        .map(|m| RfidModuleSnapshot {
            module_address: m.module_index,
            module_id: text(&m.module_sn),
            u_total: m.module_u_num,
            tags: m
                .data
                .into_iter()
                .filter(|slot| !slot.tag_code.is_empty())
                .map(|slot| TagReading {
                    position: slot.u_index,
                    tag_id: slot.tag_code.to_uppercase(),
                    alarm: slot.warning,
                })
                .collect(),
        })
        .collect();
    Ok(MessageBody::RfidSnapshot { modules })
}

fn decode_u_state_changed(msg_type: &str, value: &Value) -> Result<MessageBody, ParseError> {
    let notify: schema::UStateChangedEvent = decode(msg_type, value)?;
    let mut modules = Vec::with_capacity(notify.data.len());
    for module in notify.data {
        let mut events = Vec::with_capacity(module.data.len());
        for change in module.data {
            let action = match change.new_state {
                schema::EVENT_ATTACH => TagAction::Attach,
                schema::EVENT_DETACH => TagAction::Detach,
                other => {
                    return Err(ParseError::InvalidPayload {
                        msg_type: msg_type.to_string(),
                        reason: format!("new_state must be 0 or 1, got {other}"),
                    });
                }
            };
            events.push(TagEvent {
                position: change.u_index,
                tag_id: change.tag_code.to_uppercase(),
                alarm: change.warning,
                action,
            });
        }
        modules.push(RfidModuleEvents {
            module_address: module.module_index,
            module_id: text(&module.module_sn),
            events,
        });
    }
    Ok(MessageBody::RfidEvents { modules })
}

fn decode_temper_humidity(msg_type: &str, value: &Value) -> Result<MessageBody, ParseError> {
    let resp: schema::TemperHumidityResp = decode(msg_type, value)?;
    let modules = resp
        .data
        .iter()
        .map(|m| ClimateModule {
            module_address: m.module_index,
            module_id: text(&m.module_sn),
            sensors: m
                .data
                .iter()
                .filter(|slot| slot.temper_position != 0)
                .map(|slot| ClimateReading {
                    sensor_address: slot.temper_position,
                    temperature: metric(&slot.temper_swot),
                    humidity: metric(&slot.hygrometer_swot),
                })
                .collect(),
        })
        .collect();
    Ok(MessageBody::TemperatureHumidity { modules })
}

fn decode_device_init(msg_type: &str, value: &Value) -> Result<MessageBody, ParseError> {
    let req: schema::DeviceInitReq = decode(msg_type, value)?;
    let device = DeviceProfile {
        model: text(&req.gateway_model),
        firmware: text(&req.gateway_sw_version),
        ip: req.gateway_ip,
        mask: req.gateway_mask,
        gateway: req.gateway_gw,
        mac: req.gateway_mac.map(|mac| mac.to_uppercase()),
    };
    let modules = req
        .data
        .iter()
        .map(|m| ModuleProfile {
            module_address: m.module_index,
            module_id: text(&m.module_sn),
            firmware: text(&m.module_sw_version),
            u_total: m.module_u_num,
        })
        .collect();
    Ok(MessageBody::DeviceInfo { device, modules })
}

fn decode_color_set_resp(msg_type: &str, value: &Value) -> Result<MessageBody, ParseError> {
    decode_command_resp(msg_type, value, AckCommand::ColorSet)
}

fn decode_alarm_clear_resp(msg_type: &str, value: &Value) -> Result<MessageBody, ParseError> {
    decode_command_resp(msg_type, value, AckCommand::AlarmClear)
}

fn decode_command_resp(
    msg_type: &str,
    value: &Value,
    command: AckCommand,
) -> Result<MessageBody, ParseError> {
    let resp: schema::CommandResp = decode(msg_type, value)?;
    let result_code = resp
        .code
        .as_i64()
        .ok_or_else(|| ParseError::InvalidPayload {
            msg_type: msg_type.to_string(),
            reason: format!("code '{}' is not an integer", resp.code.to_text()),
        })?;
    let modules = resp
        .data
        .iter()
        .map(|m| AckModule {
            module_address: m.module_index,
            slots: m
                .data
                .iter()
                .map(|slot| AckSlot {
                    position: slot.u_index,
                    color: slot.color,
                })
                .collect(),
        })
        .collect();
    Ok(MessageBody::CommandAck(CommandAck {
        command,
        result_code,
        outcome: AckOutcome::from_code(result_code, schema::ACK_SUCCESS_CODE),
        modules,
    }))
}

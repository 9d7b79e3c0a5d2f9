use tracing::debug;

use crate::protocols::common::{TopicParts, ip_to_string, mac_address, topic_in_namespace};
use crate::protocols::error::ParseError;
use crate::protocols::message::{
    AckCommand, AckModule, AckOutcome, AckSlot, ClimateModule, ClimateReading, CommandAck,
    DeviceFamily, DeviceProfile, DoorReading, Heartbeat, MessageBody, ModulePresence,
    ModuleProfile, NoiseModule, NoiseReading, ParsedMessage, RawMessage, RfidModuleSnapshot,
    TagReading,
};
use crate::protocols::router::ProtocolParser;

use super::layout;
use super::reader::V5008Reader;

/// Result of one layout decoder: the message type name and its body.
pub(crate) struct Decoded {
    pub msg_type: &'static str,
    pub body: MessageBody,
}

type Decoder = fn(&V5008Reader<'_>) -> Result<Decoded, ParseError>;

/// First dispatch level: the message class segment of the topic.
const CLASS_DECODERS: &[(&str, Decoder)] = &[
    (layout::CLASS_OPE_ACK, decode_ope_ack),
    (layout::CLASS_LABEL_STATE, decode_label_state),
    (layout::CLASS_TEM_HUM, decode_tem_hum),
    (layout::CLASS_NOISE, decode_noise),
];

/// Second dispatch level for `OpeAck`: the leading header bytes.
const OPE_ACK_DECODERS: &[(&[u8], Decoder)] = &[
    (&[layout::HEARTBEAT_HEADER], decode_heartbeat),
    (&[layout::HEARTBEAT_ALT_HEADER], decode_heartbeat),
    (&[layout::DOOR_HEADER], decode_door),
    (
        &[layout::INFO_HEADER, layout::DEVICE_INFO_SUBHEADER],
        decode_device_info,
    ),
    (
        &[layout::INFO_HEADER, layout::MODULE_INFO_SUBHEADER],
        decode_module_info,
    ),
    (&[layout::ACK_HEADER], decode_command_ack),
];

/// Parser for the binary V5008 family.
#[derive(Debug, Clone)]
pub struct V5008Parser {
    namespace: String,
}

impl V5008Parser {
    pub fn new() -> Self {
        Self::with_namespace(layout::NAMESPACE)
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl Default for V5008Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolParser for V5008Parser {
    fn name(&self) -> &'static str {
        "v5008"
    }

    fn family(&self) -> DeviceFamily {
        DeviceFamily::V5008
    }

    fn can_handle(&self, topic: &str) -> bool {
        topic_in_namespace(topic, &self.namespace)
    }

    fn parse(&self, raw: &RawMessage) -> Result<ParsedMessage, ParseError> {
        let parts = TopicParts::parse(&raw.topic)?;
        let decoder = CLASS_DECODERS
            .iter()
            .find(|(class, _)| *class == parts.message_class)
            .map(|(_, decoder)| *decoder)
            .ok_or_else(|| ParseError::UnknownMessageClass {
                class: parts.message_class.to_string(),
            })?;

        let reader = V5008Reader::new(&raw.payload);
        let decoded = decoder(&reader)?;
        let message_id = reader.message_id()?;
        debug!(
            device_id = parts.device_id,
            msg_type = decoded.msg_type,
            message_id,
            "decoded V5008 frame"
        );

        Ok(
            ParsedMessage::new(parts, DeviceFamily::V5008, decoded.msg_type, decoded.body, raw)
                .with_message_id(Some(message_id as u64)),
        )
    }
}

fn decode_ope_ack(reader: &V5008Reader<'_>) -> Result<Decoded, ParseError> {
    reader.require_len(1)?;
    let payload = reader.payload();
    let decoder = OPE_ACK_DECODERS
        .iter()
        .find(|(prefix, _)| payload.starts_with(prefix))
        .map(|(_, decoder)| *decoder)
        .ok_or_else(|| ParseError::UnknownHeader {
            header: header_hex(payload),
        })?;
    decoder(reader)
}

fn header_hex(payload: &[u8]) -> String {
    let len = if payload.first() == Some(&layout::INFO_HEADER) {
        2
    } else {
        1
    };
    crate::protocols::common::hex_upper(&payload[..len.min(payload.len())])
}

fn decode_heartbeat(reader: &V5008Reader<'_>) -> Result<Decoded, ParseError> {
    reader.require_len(layout::HEARTBEAT_GROUPS_OFFSET + layout::MESSAGE_ID_LEN)?;
    let end = reader.body_end()?;

    let mut modules = Vec::new();
    let mut offset = layout::HEARTBEAT_GROUPS_OFFSET;
    while modules.len() < layout::HEARTBEAT_MAX_MODULES
        && offset + layout::HEARTBEAT_GROUP_LEN <= end
    {
        let module_address = reader.read_byte(offset)?;
        if module_address == 0 {
            break;
        }
        modules.push(ModulePresence {
            module_address,
            module_id: Some(reader.module_id(offset + 1)?),
            u_total: Some(reader.read_byte(offset + layout::HEARTBEAT_U_TOTAL)?),
        });
        offset += layout::HEARTBEAT_GROUP_LEN;
    }

    Ok(Decoded {
        msg_type: "heartbeat",
        body: MessageBody::Heartbeat(Heartbeat {
            modules,
            power: None,
        }),
    })
}

fn decode_door(reader: &V5008Reader<'_>) -> Result<Decoded, ParseError> {
    reader.require_len(layout::DOOR_LEN)?;
    let door = DoorReading {
        module_address: reader.read_byte(layout::DOOR_MODULE_ADDR_OFFSET)?,
        module_id: Some(reader.module_id(layout::DOOR_MODULE_ID_OFFSET)?),
        state: reader.read_byte(layout::DOOR_STATE_OFFSET)?,
    };
    Ok(Decoded {
        msg_type: "door_state",
        body: MessageBody::DoorState { doors: vec![door] },
    })
}

fn decode_device_info(reader: &V5008Reader<'_>) -> Result<Decoded, ParseError> {
    reader.require_len(layout::DEVICE_INFO_LEN)?;
    let device = DeviceProfile {
        model: Some(format!(
            "{:04X}",
            reader.read_word(layout::DEVICE_MODEL_OFFSET)?
        )),
        firmware: Some(reader.read_dword(layout::DEVICE_FIRMWARE_OFFSET)?.to_string()),
        ip: Some(ip_to_string(reader.read_dword(layout::DEVICE_IP_OFFSET)?)),
        mask: Some(ip_to_string(reader.read_dword(layout::DEVICE_MASK_OFFSET)?)),
        gateway: Some(ip_to_string(
            reader.read_dword(layout::DEVICE_GATEWAY_OFFSET)?,
        )),
        mac: Some(mac_address(
            reader.read_slice(layout::DEVICE_MAC_RANGE.clone())?,
        )),
    };
    Ok(Decoded {
        msg_type: "device_info",
        body: MessageBody::DeviceInfo {
            device,
            modules: Vec::new(),
        },
    })
}

fn decode_module_info(reader: &V5008Reader<'_>) -> Result<Decoded, ParseError> {
    reader.require_len(layout::MODULE_INFO_GROUPS_OFFSET + layout::MESSAGE_ID_LEN)?;
    let count = reader.read_byte(layout::MODULE_INFO_COUNT_OFFSET)? as usize;
    reader.require_len(
        layout::MODULE_INFO_GROUPS_OFFSET
            + count * layout::MODULE_INFO_GROUP_LEN
            + layout::MESSAGE_ID_LEN,
    )?;

    let mut modules = Vec::with_capacity(count);
    for index in 0..count {
        let offset = layout::MODULE_INFO_GROUPS_OFFSET + index * layout::MODULE_INFO_GROUP_LEN;
        modules.push(ModuleProfile {
            module_address: reader.read_byte(offset)?,
            module_id: None,
            firmware: Some(reader.read_dword(offset + 1)?.to_string()),
            u_total: None,
        });
    }
    Ok(Decoded {
        msg_type: "module_info",
        body: MessageBody::ModuleInfo { modules },
    })
}

fn decode_command_ack(reader: &V5008Reader<'_>) -> Result<Decoded, ParseError> {
    reader.require_len(layout::ACK_MIN_LEN)?;
    let result = reader.read_byte(layout::ACK_RESULT_OFFSET)?;
    let command = reader.read_byte(layout::ACK_COMMAND_OFFSET)?;
    let module_address = reader.read_byte(layout::ACK_MODULE_ADDR_OFFSET)?;
    let body = reader.read_slice(layout::ACK_BODY_OFFSET..reader.body_end()?)?;

    let (msg_type, command, slots) = match command {
        layout::CMD_COLOR_SET => {
            if body.len() % 2 != 0 {
                return Err(ParseError::InvalidLayout {
                    reason: format!("color set body has odd length {}", body.len()),
                });
            }
            let slots = body
                .chunks_exact(2)
                .map(|pair| AckSlot {
                    position: pair[0],
                    color: Some(pair[1]),
                })
                .collect();
            ("color_set_ack", AckCommand::ColorSet, slots)
        }
        layout::CMD_ALARM_CLEAR => {
            let slots = body
                .iter()
                .map(|&position| AckSlot {
                    position,
                    color: None,
                })
                .collect();
            ("alarm_clear_ack", AckCommand::AlarmClear, slots)
        }
        layout::CMD_COLOR_QUERY => {
            let mut slots = Vec::with_capacity(body.len());
            for (index, &color) in body.iter().enumerate() {
                let position = u8::try_from(index + 1).map_err(|_| ParseError::InvalidLayout {
                    reason: format!("color query lists {} positions", body.len()),
                })?;
                slots.push(AckSlot {
                    position,
                    color: Some(color),
                });
            }
            ("color_query_ack", AckCommand::ColorQuery, slots)
        }
        other => return Err(ParseError::UnknownSubcommand { command: other }),
    };

    Ok(Decoded {
        msg_type,
        body: MessageBody::CommandAck(CommandAck {
            command,
            result_code: result as i64,
            outcome: AckOutcome::from_code(result as i64, layout::ACK_RESULT_SUCCESS as i64),
            modules: vec![AckModule {
                module_address,
                slots,
            }],
        }),
    })
}

fn decode_label_state(reader: &V5008Reader<'_>) -> Result<Decoded, ParseError> {
    reader.require_len(layout::LABEL_TAGS_OFFSET + layout::MESSAGE_ID_LEN)?;
    let header = reader.read_byte(0)?;
    if header != layout::LABEL_STATE_HEADER {
        return Err(ParseError::UnknownHeader {
            header: format!("{header:02X}"),
        });
    }

    let count = reader.read_byte(layout::LABEL_COUNT_OFFSET)? as usize;
    reader.require_len(
        layout::LABEL_TAGS_OFFSET + count * layout::LABEL_TAG_LEN + layout::MESSAGE_ID_LEN,
    )?;

    let mut tags = Vec::with_capacity(count);
    for index in 0..count {
        let offset = layout::LABEL_TAGS_OFFSET + index * layout::LABEL_TAG_LEN;
        tags.push(TagReading {
            position: reader.read_byte(offset)?,
            alarm: reader.read_byte(offset + layout::LABEL_TAG_ALARM)?,
            tag_id: reader.tag_id(offset + layout::LABEL_TAG_ID)?,
        });
    }

    Ok(Decoded {
        msg_type: "rfid_snapshot",
        body: MessageBody::RfidSnapshot {
            modules: vec![RfidModuleSnapshot {
                module_address: reader.read_byte(layout::LABEL_MODULE_ADDR_OFFSET)?,
                module_id: Some(reader.module_id(layout::LABEL_MODULE_ID_OFFSET)?),
                u_total: Some(reader.read_byte(layout::LABEL_U_TOTAL_OFFSET)?),
                tags,
            }],
        },
    })
}

fn decode_tem_hum(reader: &V5008Reader<'_>) -> Result<Decoded, ParseError> {
    reader.require_len(layout::TEMHUM_LEN)?;
    let mut sensors = Vec::new();
    for slot in 0..layout::TEMHUM_SLOT_COUNT {
        let offset = layout::TEMHUM_SLOTS_OFFSET + slot * layout::TEMHUM_SLOT_LEN;
        let sensor_address = reader.read_byte(offset)?;
        if sensor_address == 0 {
            continue;
        }
        sensors.push(ClimateReading {
            sensor_address,
            temperature: reader.signed_metric(offset + layout::TEMHUM_TEMPERATURE)?,
            humidity: reader.unsigned_metric(offset + layout::TEMHUM_HUMIDITY)?,
        });
    }

    Ok(Decoded {
        msg_type: "temperature_humidity",
        body: MessageBody::TemperatureHumidity {
            modules: vec![ClimateModule {
                module_address: reader.read_byte(layout::SENSOR_MODULE_ADDR_OFFSET)?,
                module_id: Some(reader.module_id(layout::SENSOR_MODULE_ID_OFFSET)?),
                sensors,
            }],
        },
    })
}

fn decode_noise(reader: &V5008Reader<'_>) -> Result<Decoded, ParseError> {
    reader.require_len(layout::NOISE_LEN)?;
    let mut sensors = Vec::new();
    for slot in 0..layout::NOISE_SLOT_COUNT {
        let offset = layout::NOISE_SLOTS_OFFSET + slot * layout::NOISE_SLOT_LEN;
        let sensor_address = reader.read_byte(offset)?;
        if sensor_address == 0 {
            continue;
        }
        sensors.push(NoiseReading {
            sensor_address,
            noise: reader.signed_metric(offset + 1)?,
        });
    }

    Ok(Decoded {
        msg_type: "noise",
        body: MessageBody::Noise {
            modules: vec![NoiseModule {
                module_address: reader.read_byte(layout::SENSOR_MODULE_ADDR_OFFSET)?,
                module_id: Some(reader.module_id(layout::SENSOR_MODULE_ID_OFFSET)?),
                sensors,
            }],
        },
    })
}

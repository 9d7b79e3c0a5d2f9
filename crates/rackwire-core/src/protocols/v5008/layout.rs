pub const NAMESPACE: &str = "V5008Upload";

pub const CLASS_OPE_ACK: &str = "OpeAck";
pub const CLASS_LABEL_STATE: &str = "LabelState";
pub const CLASS_TEM_HUM: &str = "TemHum";
pub const CLASS_NOISE: &str = "Noise";

/// Every frame ends with a big-endian message id.
pub const MESSAGE_ID_LEN: usize = 4;

/// A fixed-point pair with both bytes set marks the metric unavailable.
pub const UNAVAILABLE_PAIR: [u8; 2] = [0xFF, 0xFF];

// LabelState: BB, modAddr, modId(4), reserved, uTotal, count, tags..., msgId(4)
pub const LABEL_STATE_HEADER: u8 = 0xBB;
pub const LABEL_MODULE_ADDR_OFFSET: usize = 1;
pub const LABEL_MODULE_ID_OFFSET: usize = 2;
pub const LABEL_U_TOTAL_OFFSET: usize = 7;
pub const LABEL_COUNT_OFFSET: usize = 8;
pub const LABEL_TAGS_OFFSET: usize = 9;
pub const LABEL_TAG_LEN: usize = 6;
pub const LABEL_TAG_ALARM: usize = 1;
pub const LABEL_TAG_ID: usize = 2;

// TemHum: modAddr, modId(4), 6 x (sensorAddr, tInt, tFrac, hInt, hFrac), msgId(4)
pub const TEMHUM_SLOTS_OFFSET: usize = 5;
pub const TEMHUM_SLOT_LEN: usize = 5;
pub const TEMHUM_SLOT_COUNT: usize = 6;
pub const TEMHUM_TEMPERATURE: usize = 1;
pub const TEMHUM_HUMIDITY: usize = 3;
pub const TEMHUM_LEN: usize =
    TEMHUM_SLOTS_OFFSET + TEMHUM_SLOT_LEN * TEMHUM_SLOT_COUNT + MESSAGE_ID_LEN;

// Noise: modAddr, modId(4), 3 x (sensorAddr, nInt, nFrac), msgId(4)
pub const NOISE_SLOTS_OFFSET: usize = 5;
pub const NOISE_SLOT_LEN: usize = 3;
pub const NOISE_SLOT_COUNT: usize = 3;
pub const NOISE_LEN: usize = NOISE_SLOTS_OFFSET + NOISE_SLOT_LEN * NOISE_SLOT_COUNT + MESSAGE_ID_LEN;

// Shared by the sensor classes.
pub const SENSOR_MODULE_ADDR_OFFSET: usize = 0;
pub const SENSOR_MODULE_ID_OFFSET: usize = 1;

// Heartbeat: CC|CB, up to 10 x (modAddr, modId(4), uTotal), msgId(4)
pub const HEARTBEAT_HEADER: u8 = 0xCC;
pub const HEARTBEAT_ALT_HEADER: u8 = 0xCB;
pub const HEARTBEAT_GROUPS_OFFSET: usize = 1;
pub const HEARTBEAT_GROUP_LEN: usize = 6;
pub const HEARTBEAT_U_TOTAL: usize = 5;
pub const HEARTBEAT_MAX_MODULES: usize = 10;

// Door: BA, modAddr, modId(4), state, msgId(4)
pub const DOOR_HEADER: u8 = 0xBA;
pub const DOOR_MODULE_ADDR_OFFSET: usize = 1;
pub const DOOR_MODULE_ID_OFFSET: usize = 2;
pub const DOOR_STATE_OFFSET: usize = 6;
pub const DOOR_LEN: usize = 7 + MESSAGE_ID_LEN;

// Device info: EF 01, model(2), fw(4), ip(4), mask(4), gateway(4), mac(6), msgId(4)
pub const INFO_HEADER: u8 = 0xEF;
pub const DEVICE_INFO_SUBHEADER: u8 = 0x01;
pub const MODULE_INFO_SUBHEADER: u8 = 0x02;
pub const DEVICE_MODEL_OFFSET: usize = 2;
pub const DEVICE_FIRMWARE_OFFSET: usize = 4;
pub const DEVICE_IP_OFFSET: usize = 8;
pub const DEVICE_MASK_OFFSET: usize = 12;
pub const DEVICE_GATEWAY_OFFSET: usize = 16;
pub const DEVICE_MAC_RANGE: std::ops::Range<usize> = 20..26;
pub const DEVICE_INFO_LEN: usize = 26 + MESSAGE_ID_LEN;

// Module info: EF 02, count, count x (modAddr, fw(4)), msgId(4)
pub const MODULE_INFO_COUNT_OFFSET: usize = 2;
pub const MODULE_INFO_GROUPS_OFFSET: usize = 3;
pub const MODULE_INFO_GROUP_LEN: usize = 5;

// Command ack: AA, deviceRef(4), result, cmd, modAddr, body..., msgId(4)
pub const ACK_HEADER: u8 = 0xAA;
pub const ACK_RESULT_OFFSET: usize = 5;
pub const ACK_COMMAND_OFFSET: usize = 6;
pub const ACK_MODULE_ADDR_OFFSET: usize = 7;
pub const ACK_BODY_OFFSET: usize = 8;
pub const ACK_MIN_LEN: usize = ACK_BODY_OFFSET + MESSAGE_ID_LEN;
pub const ACK_RESULT_SUCCESS: u8 = 0xA1;

pub const CMD_COLOR_SET: u8 = 0xE1;
pub const CMD_ALARM_CLEAR: u8 = 0xE2;
pub const CMD_COLOR_QUERY: u8 = 0xE4;

use serde_json::{Value, json};

use super::record::{NormalizedRecord, RecordClass, RecordContext, to_json};
use crate::protocols::message::{CommandAck, DeviceProfile, DoorReading, ModuleProfile};

pub(crate) fn door_state(ctx: &RecordContext<'_>, doors: &[DoorReading]) -> Vec<NormalizedRecord> {
    doors
        .iter()
        .map(|door| {
            ctx.record(RecordClass::State, "door_state", door.module_address, 0)
                .with_num(door.state as f64)
                .with_json(to_json(door))
        })
        .collect()
}

/// One `EVENT` per acknowledged module; an ack naming no module still
/// produces a single record on module 0.
pub(crate) fn command_ack(ctx: &RecordContext<'_>, ack: &CommandAck) -> Vec<NormalizedRecord> {
    let payload = |slots: Value| {
        json!({
            "command": to_json(&ack.command),
            "result_code": ack.result_code,
            "outcome": ack.outcome.as_str(),
            "slots": slots,
        })
    };

    if ack.modules.is_empty() {
        return vec![
            ctx.record(RecordClass::Event, ack.command.data_key(), 0, 0)
                .with_str(ack.outcome.as_str())
                .with_json(payload(json!([]))),
        ];
    }

    ack.modules
        .iter()
        .map(|module| {
            ctx.record(
                RecordClass::Event,
                ack.command.data_key(),
                module.module_address,
                0,
            )
            .with_str(ack.outcome.as_str())
            .with_json(payload(to_json(&module.slots)))
        })
        .collect()
}

pub(crate) fn device_info(
    ctx: &RecordContext<'_>,
    device: &DeviceProfile,
    modules: &[ModuleProfile],
) -> Vec<NormalizedRecord> {
    let mut records = Vec::with_capacity(modules.len() + 1);
    let mut record = ctx
        .record(RecordClass::DeviceInfo, "device_info", 0, 0)
        .with_json(to_json(device));
    if let Some(model) = &device.model {
        record = record.with_str(model.clone());
    }
    records.push(record);
    records.extend(module_info(ctx, modules));
    records
}

pub(crate) fn module_info(ctx: &RecordContext<'_>, modules: &[ModuleProfile]) -> Vec<NormalizedRecord> {
    modules
        .iter()
        .map(|module| {
            let record = ctx
                .record(RecordClass::DeviceInfo, "module_info", module.module_address, 0)
                .with_json(to_json(module));
            match &module.firmware {
                Some(firmware) => record.with_str(firmware.clone()),
                None => record,
            }
        })
        .collect()
}

pub(crate) fn unknown(ctx: &RecordContext<'_>, payload: &Value) -> NormalizedRecord {
    ctx.device_record(RecordClass::Event, "unknown_message")
        .with_str(ctx.message().msg_type.clone())
        .with_json(payload.clone())
}

pub(crate) fn raw_payload(ctx: &RecordContext<'_>, text: &str) -> NormalizedRecord {
    ctx.device_record(RecordClass::Event, "raw_payload")
        .with_str(text)
}

pub(crate) fn capture(ctx: &RecordContext<'_>, payload: &Value) -> NormalizedRecord {
    ctx.device_record(RecordClass::Event, "capture")
        .with_str(ctx.message().message_class.clone())
        .with_json(payload.clone())
}

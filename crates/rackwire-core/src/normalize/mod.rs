//! Normalization of parsed messages into flat records.
//!
//! Every message kind maps to a fixed set of records (see the builders in
//! `telemetry`, `events` and `rfid`). RFID snapshots are stateful: the
//! previous snapshot for the same `(device_id, module_address)` comes from
//! the shared [`DeviceStateStore`] and the diff yields attach, detach and
//! alarm change events.
//!
//! Normalization never fails. A payload fragment that cannot be serialized
//! degrades to `null` with a warning.

use std::sync::Arc;

use tracing::debug;

use crate::protocols::message::{MessageBody, ParsedMessage};

pub mod diff;
mod events;
pub mod record;
mod rfid;
pub mod state;
mod telemetry;

pub use diff::{ChangeAction, TagChange, apply_events, diff_snapshots};
pub use record::{NormalizedRecord, RecordClass, RecordIdentity, record_path};
pub use state::{DeviceStateStore, StateKey, StateKind, TagSnapshot, TagState};

use record::RecordContext;

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    store: Arc<DeviceStateStore>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Arc<DeviceStateStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<DeviceStateStore> {
        &self.store
    }

    pub fn normalize(&self, message: &ParsedMessage) -> Vec<NormalizedRecord> {
        let ctx = RecordContext::new(message);
        let records = match &message.body {
            MessageBody::Heartbeat(heartbeat) => telemetry::heartbeat(&ctx, heartbeat),
            MessageBody::TemperatureHumidity { modules } => telemetry::climate(&ctx, modules),
            MessageBody::Noise { modules } => telemetry::noise(&ctx, modules),
            MessageBody::DoorState { doors } => events::door_state(&ctx, doors),
            MessageBody::CommandAck(ack) => events::command_ack(&ctx, ack),
            MessageBody::DeviceInfo { device, modules } => {
                events::device_info(&ctx, device, modules)
            }
            MessageBody::ModuleInfo { modules } => events::module_info(&ctx, modules),
            MessageBody::RfidSnapshot { modules } => rfid::snapshot(&ctx, &self.store, modules),
            MessageBody::RfidEvents { modules } => rfid::events(&ctx, &self.store, modules),
            MessageBody::Unknown { payload } => vec![events::unknown(&ctx, payload)],
            MessageBody::Raw { text } => vec![events::raw_payload(&ctx, text)],
            MessageBody::Capture { payload } => vec![events::capture(&ctx, payload)],
        };
        debug!(
            device_id = message.device_id.as_str(),
            msg_type = message.msg_type.as_str(),
            records = records.len(),
            "normalized message"
        );
        records
    }
}

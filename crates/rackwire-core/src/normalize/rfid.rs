use serde_json::{Value, json};
use tracing::debug;

use super::diff::{TagChange, apply_events, diff_snapshots};
use super::record::{NormalizedRecord, RecordClass, RecordContext, to_json};
use super::state::{DeviceStateStore, StateKey, TagSnapshot, TagState};
use crate::protocols::message::{RfidModuleEvents, RfidModuleSnapshot};

/// Diff each module's snapshot against the stored one and replace it.
pub(crate) fn snapshot(
    ctx: &RecordContext<'_>,
    store: &DeviceStateStore,
    modules: &[RfidModuleSnapshot],
) -> Vec<NormalizedRecord> {
    let device_id = &ctx.message().device_id;
    let mut records = Vec::new();
    for module in modules {
        let current: TagSnapshot = module
            .tags
            .iter()
            .map(|tag| {
                (
                    tag.position,
                    TagState {
                        tag_id: tag.tag_id.clone(),
                        alarm: tag.alarm,
                    },
                )
            })
            .collect();

        let key = StateKey::rfid(device_id.as_str(), module.module_address);
        let changes = store.with_entry(&key, |stored| {
            let changes = diff_snapshots(stored, &current);
            *stored = current.clone();
            changes
        });
        debug!(
            device_id = device_id.as_str(),
            module_address = module.module_address,
            changes = changes.len(),
            tags = current.len(),
            "diffed rfid snapshot"
        );

        records.extend(change_records(ctx, module.module_address, &changes));
        records.push(snapshot_record(
            ctx,
            module.module_address,
            &current,
            module.u_total,
        ));
    }
    records
}

/// Apply reported attach/detach events to the stored snapshot.
pub(crate) fn events(
    ctx: &RecordContext<'_>,
    store: &DeviceStateStore,
    modules: &[RfidModuleEvents],
) -> Vec<NormalizedRecord> {
    let device_id = &ctx.message().device_id;
    let mut records = Vec::new();
    for module in modules {
        let key = StateKey::rfid(device_id.as_str(), module.module_address);
        let (changes, updated) = store.with_entry(&key, |stored| {
            let changes = apply_events(stored, &module.events);
            (changes, stored.clone())
        });

        records.extend(change_records(ctx, module.module_address, &changes));
        records.push(snapshot_record(ctx, module.module_address, &updated, None));
    }
    records
}

fn change_records<'a>(
    ctx: &'a RecordContext<'_>,
    module_address: u8,
    changes: &'a [TagChange],
) -> impl Iterator<Item = NormalizedRecord> + 'a {
    changes.iter().map(move |change| {
        ctx.record(
            RecordClass::Event,
            "rfid_event",
            module_address,
            change.position,
        )
        .with_str(change.tag_id.clone())
        .with_json(to_json(change))
    })
}

fn snapshot_record(
    ctx: &RecordContext<'_>,
    module_address: u8,
    snapshot: &TagSnapshot,
    u_total: Option<u8>,
) -> NormalizedRecord {
    let tags: Vec<Value> = snapshot
        .iter()
        .map(|(position, tag)| {
            json!({
                "position": position,
                "tag_id": tag.tag_id,
                "alarm": tag.alarm,
            })
        })
        .collect();
    let mut payload = json!({ "tags": tags });
    if let Some(u_total) = u_total {
        payload["u_total"] = json!(u_total);
    }
    ctx.record(RecordClass::State, "rfid_snapshot", module_address, 0)
        .with_num(snapshot.len() as f64)
        .with_json(payload)
}

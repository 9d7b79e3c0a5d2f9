use serde_json::json;

use super::record::{NormalizedRecord, RecordClass, RecordContext, to_json};
use crate::protocols::message::{ClimateModule, Heartbeat, NoiseModule};

/// One `TELEMETRY` record per present metric; absent metrics emit nothing.
pub(crate) fn climate(ctx: &RecordContext<'_>, modules: &[ClimateModule]) -> Vec<NormalizedRecord> {
    let mut records = Vec::new();
    for module in modules {
        for sensor in &module.sensors {
            let metrics = [
                ("temperature", sensor.temperature),
                ("humidity", sensor.humidity),
            ];
            for (key, value) in metrics {
                if let Some(value) = value {
                    records.push(
                        ctx.record(
                            RecordClass::Telemetry,
                            key,
                            module.module_address,
                            sensor.sensor_address,
                        )
                        .with_num(value),
                    );
                }
            }
        }
    }
    records
}

pub(crate) fn noise(ctx: &RecordContext<'_>, modules: &[NoiseModule]) -> Vec<NormalizedRecord> {
    modules
        .iter()
        .flat_map(|module| {
            module.sensors.iter().filter_map(move |sensor| {
                sensor.noise.map(|value| {
                    ctx.record(
                        RecordClass::Telemetry,
                        "noise",
                        module.module_address,
                        sensor.sensor_address,
                    )
                    .with_num(value)
                })
            })
        })
        .collect()
}

pub(crate) fn heartbeat(ctx: &RecordContext<'_>, heartbeat: &Heartbeat) -> Vec<NormalizedRecord> {
    // Device-level summary: pinned to M0 whatever the module count.
    let mut records = vec![
        ctx.record(RecordClass::Lifecycle, "heartbeat", 0, 0)
            .with_num(heartbeat.modules.len() as f64)
            .with_json(json!({
                "modules": to_json(&heartbeat.modules),
                "power": to_json(&heartbeat.power),
            })),
    ];

    if let Some(power) = &heartbeat.power {
        let metrics = [
            ("bus_voltage", power.bus_voltage),
            ("bus_current", power.bus_current),
        ];
        for (key, value) in metrics {
            if let Some(value) = value {
                records.push(ctx.record(RecordClass::Telemetry, key, 0, 0).with_num(value));
            }
        }
    }
    records
}

use std::sync::Arc;

use rackwire_core::{
    DeviceFamily, MemorySink, MessageBody, NormalizedRecord, ParserKind, ParserRouter, Pipeline,
    PipelineConfig, RawMessage, StateKey, ip_to_string, parse_ip,
};
use serde_json::json;
use time::OffsetDateTime;
use time::macros::datetime;

const DEVICE: &str = "2437871205";

fn pipeline() -> (Pipeline, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (
        Pipeline::from_config(&PipelineConfig::default(), sink.clone()),
        sink,
    )
}

fn label_state(device: &str, module: u8, tags: &[(u8, u8, u32)], message_id: u32) -> RawMessage {
    let mut payload = vec![0xBB, module, 0xEC, 0x37, 0x1B, 0xBF, 0x00, 0x06, tags.len() as u8];
    for &(position, alarm, tag) in tags {
        payload.push(position);
        payload.push(alarm);
        payload.extend_from_slice(&tag.to_be_bytes());
    }
    payload.extend_from_slice(&message_id.to_be_bytes());
    RawMessage::at(
        format!("V5008Upload/{device}/LabelState"),
        payload,
        datetime!(2025-03-01 08:00:00 UTC),
    )
}

fn tem_hum_all_present() -> RawMessage {
    let mut payload = vec![0x01, 0xEC, 0x37, 0x1B, 0xBF];
    for sensor in 0..6u8 {
        payload.extend_from_slice(&[0x0A + sensor, 0x18 + sensor, 0x10, 0x30 + sensor, 0x05]);
    }
    payload.extend_from_slice(&[0, 0, 0, 9]);
    RawMessage::at(
        format!("V5008Upload/{DEVICE}/TemHum"),
        payload,
        datetime!(2025-03-01 08:00:00 UTC),
    )
}

fn actions(records: &[NormalizedRecord]) -> Vec<(String, u8)> {
    records
        .iter()
        .filter(|record| record.data_key == "rfid_event")
        .map(|record| {
            let change = record.json_value.as_ref().unwrap();
            (
                change["action"].as_str().unwrap().to_string(),
                record.identity.sensor_address,
            )
        })
        .collect()
}

#[test]
fn parsing_is_deterministic() {
    let router = ParserRouter::with_defaults();
    let raw = tem_hum_all_present();
    let parser = router.route(&raw.topic).unwrap();
    let first = parser.parse(&raw).unwrap();
    let second = parser.parse(&raw).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.family, DeviceFamily::V5008);
    assert!(matches!(first.body, MessageBody::TemperatureHumidity { .. }));
}

#[test]
fn six_climate_slots_fan_out_to_twelve_records() {
    let (pipeline, sink) = pipeline();
    let count = pipeline.dispatch(&tem_hum_all_present()).unwrap();
    assert_eq!(count, 12);

    let records = sink.records();
    assert!(
        records
            .iter()
            .all(|record| record.record_class.as_str() == "TELEMETRY")
    );
    let paths: Vec<&str> = records.iter().map(|record| record.path.as_str()).collect();
    assert_eq!(paths[0], "2437871205/M1/S10");
    assert_eq!(paths[11], "2437871205/M1/S15");
    assert_eq!(records[0].data_key, "temperature");
    assert_eq!(records[0].num_value, Some(24.16));
    assert_eq!(records[1].data_key, "humidity");
    assert_eq!(records[1].num_value, Some(48.05));
}

#[test]
fn rfid_first_sight_churn_and_alarm_change() {
    let (pipeline, sink) = pipeline();

    pipeline
        .dispatch(&label_state(DEVICE, 1, &[(10, 0, 0xDD34_4A44)], 1))
        .unwrap();
    assert_eq!(actions(&sink.take_records()), vec![("attach".to_string(), 10)]);

    pipeline
        .dispatch(&label_state(DEVICE, 1, &[(10, 1, 0xDD34_4A44), (12, 0, 0xDD3C_E9C4)], 2))
        .unwrap();
    assert_eq!(
        actions(&sink.take_records()),
        vec![("alarm_change".to_string(), 10), ("attach".to_string(), 12)]
    );

    pipeline
        .dispatch(&label_state(DEVICE, 1, &[(12, 0, 0xDD3C_E9C4)], 3))
        .unwrap();
    let records = sink.take_records();
    assert_eq!(actions(&records), vec![("detach".to_string(), 10)]);
    let snapshot = records.last().unwrap();
    assert_eq!(snapshot.data_key, "rfid_snapshot");
    assert_eq!(snapshot.num_value, Some(1.0));

    let stored = pipeline
        .normalizer()
        .store()
        .snapshot(&StateKey::rfid(DEVICE, 1))
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[&12].tag_id, "DD3CE9C4");
}

#[test]
fn rfid_new_tag_emits_one_attach_and_one_snapshot() {
    let (pipeline, sink) = pipeline();
    let count = pipeline
        .dispatch(&label_state(DEVICE, 1, &[(10, 0, 0xDD34_4A44)], 1))
        .unwrap();
    assert_eq!(count, 2);

    let records = sink.take_records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].data_key, "rfid_event");
    assert_eq!(records[0].path, "2437871205/M1/S10");
    assert_eq!(records[0].str_value.as_deref(), Some("DD344A44"));
    assert_eq!(records[1].data_key, "rfid_snapshot");

    let stored = pipeline
        .normalizer()
        .store()
        .snapshot(&StateKey::rfid(DEVICE, 1))
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[&10].tag_id, "DD344A44");
    assert_eq!(stored[&10].alarm, 0);
}

#[test]
fn rfid_churn_detaches_missing_and_attaches_new() {
    let (pipeline, sink) = pipeline();
    pipeline
        .dispatch(&label_state(DEVICE, 1, &[(10, 0, 0xAAAA_0001), (11, 0, 0xBBBB_0002)], 1))
        .unwrap();
    sink.take_records();

    pipeline
        .dispatch(&label_state(DEVICE, 1, &[(10, 0, 0xAAAA_0001), (12, 0, 0xCCCC_0003)], 2))
        .unwrap();
    let records = sink.take_records();
    assert_eq!(records.len(), 3);
    assert_eq!(
        actions(&records),
        vec![("attach".to_string(), 12), ("detach".to_string(), 11)]
    );
    assert_eq!(records[1].str_value.as_deref(), Some("BBBB0002"));

    let snapshot = &records[2];
    assert_eq!(snapshot.data_key, "rfid_snapshot");
    let positions: Vec<u64> = snapshot.json_value.as_ref().unwrap()["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["position"].as_u64().unwrap())
        .collect();
    assert_eq!(positions, vec![10, 12]);
}

#[test]
fn v6800_change_events_update_the_stored_snapshot() {
    let (pipeline, sink) = pipeline();
    pipeline
        .dispatch_parts(
            "V6800Upload/2123456789/LabelState",
            br#"{"msg_type":"u_state_resp","data":[{"module_index":2,"data":[{"u_index":3,"tag_code":"aa000001","warning":0}]}]}"#.to_vec(),
        )
        .unwrap();
    sink.take_records();

    let count = pipeline
        .dispatch_parts(
            "V6800Upload/2123456789/LabelState",
            br#"{"msg_type":"u_state_changed_notify_event","data":[{"module_index":2,"data":[{"u_index":3,"tag_code":"aa000001","new_state":0},{"u_index":5,"tag_code":"bb000002","new_state":1}]}]}"#.to_vec(),
        )
        .unwrap();
    assert_eq!(count, 3);

    let records = sink.take_records();
    let summary: Vec<(&str, &str)> = records
        .iter()
        .map(|record| (record.data_key.as_str(), record.path.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("rfid_event", "2123456789/M2/S3"),
            ("rfid_event", "2123456789/M2/S5"),
            ("rfid_snapshot", "2123456789/M2/S0"),
        ]
    );
    assert_eq!(actions(&records), vec![("detach".to_string(), 3), ("attach".to_string(), 5)]);
    assert_eq!(records[1].str_value.as_deref(), Some("BB000002"));
    assert_eq!(
        records[2].json_value,
        Some(json!({"tags": [{"position": 5, "tag_id": "BB000002", "alarm": 0}]}))
    );

    let stored = pipeline
        .normalizer()
        .store()
        .snapshot(&StateKey::rfid("2123456789", 2))
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[&5].tag_id, "BB000002");
}

#[test]
fn heartbeat_summary_path_does_not_depend_on_module_count() {
    let (pipeline, sink) = pipeline();
    let one_module = vec![
        0xCC, 0x01, 0x00, 0x00, 0x00, 0x01, 0x06, // module 1
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // terminator
        0x00, 0x00, 0x00, 0x01,
    ];
    let two_modules = vec![
        0xCC, 0x01, 0x00, 0x00, 0x00, 0x01, 0x06, // module 1
        0x02, 0x00, 0x00, 0x00, 0x02, 0x0C, // module 2
        0x00, 0x00, 0x00, 0x02,
    ];

    for payload in [one_module, two_modules] {
        pipeline
            .dispatch_parts(format!("V5008Upload/{DEVICE}/OpeAck"), payload)
            .unwrap();
    }

    let paths: Vec<String> = sink
        .records()
        .into_iter()
        .filter(|record| record.data_key == "heartbeat")
        .map(|record| record.path)
        .collect();
    assert_eq!(paths, vec!["2437871205/M0/S0", "2437871205/M0/S0"]);
}

#[test]
fn unknown_v6800_message_falls_back_to_one_event() {
    let (pipeline, sink) = pipeline();
    let count = pipeline
        .dispatch_parts(
            "V6800Upload/2123456789/Status",
            br#"{"msg_type":"firmware_progress","pct":40}"#.to_vec(),
        )
        .unwrap();
    assert_eq!(count, 1);

    let record = &sink.records()[0];
    assert_eq!(record.data_key, "unknown_message");
    assert_eq!(record.str_value.as_deref(), Some("firmware_progress"));
    assert_eq!(
        record.json_value,
        Some(json!({"msg_type": "firmware_progress", "pct": 40}))
    );
}

#[test]
fn unroutable_topic_emits_nothing() {
    let (pipeline, sink) = pipeline();
    let err = pipeline
        .dispatch_parts("X9000Upload/77/Status", b"{}".to_vec())
        .unwrap_err();
    assert_eq!(err.to_string(), "no parser owns topic 'X9000Upload/77/Status'");
    assert!(sink.records().is_empty());
    assert_eq!(sink.rejections().len(), 1);
}

#[test]
fn failing_message_does_not_disturb_the_next() {
    let (pipeline, sink) = pipeline();
    let truncated = RawMessage::at(
        format!("V5008Upload/{DEVICE}/OpeAck"),
        vec![0xBA, 0x03],
        OffsetDateTime::UNIX_EPOCH,
    );
    assert!(pipeline.dispatch(&truncated).is_err());
    assert_eq!(pipeline.dispatch(&tem_hum_all_present()).unwrap(), 12);
    assert_eq!(sink.records().len(), 12);
}

#[test]
fn concurrent_dispatch_keeps_each_module_consistent() {
    let (pipeline, sink) = pipeline();
    let modules: Vec<u8> = (1..=8).collect();

    std::thread::scope(|scope| {
        for &module in &modules {
            let pipeline = &pipeline;
            scope.spawn(move || {
                for round in 0..50u32 {
                    let tags: &[(u8, u8, u32)] = if round % 2 == 0 {
                        &[(1, 0, 0xAABB_CC01)]
                    } else {
                        &[]
                    };
                    pipeline
                        .dispatch(&label_state(DEVICE, module, tags, round))
                        .unwrap();
                }
            });
        }
    });

    let records = sink.records();
    for module in modules {
        let module_actions: Vec<String> = records
            .iter()
            .filter(|record| {
                record.identity.module_address == module && record.data_key == "rfid_event"
            })
            .map(|record| record.json_value.as_ref().unwrap()["action"].to_string())
            .collect();
        assert_eq!(module_actions.len(), 50);
        for pair in module_actions.chunks(2) {
            assert_eq!(pair[0], "\"attach\"");
            assert_eq!(pair[1], "\"detach\"");
        }
    }
    assert_eq!(pipeline.stats().messages_processed, 400);
    assert_eq!(pipeline.normalizer().store().len(), 8);
}

#[test]
fn capture_parser_is_distinguishable() {
    let router = ParserRouter::with_defaults();
    let parser = router.route("G6000Upload/gw-1/Status").unwrap();
    assert_eq!(parser.kind(), ParserKind::Capture);
    assert_eq!(parser.family(), DeviceFamily::Generic);

    let specified = router.route("V5008Upload/1/TemHum").unwrap();
    assert_eq!(specified.kind(), ParserKind::Specified);

    let without_capture = ParserRouter::from_config(&PipelineConfig {
        capture_namespaces: Vec::new(),
        ..PipelineConfig::default()
    });
    assert!(without_capture.route("G6000Upload/gw-1/Status").is_err());
}

#[test]
fn ip_text_round_trips() {
    for value in [0u32, 0x0A00_0001, 0xC0A8_00D3, u32::MAX] {
        assert_eq!(parse_ip(&ip_to_string(value)).unwrap(), value);
    }
    assert_eq!(ip_to_string(0xC0A8_00D3), "192.168.0.211");
}

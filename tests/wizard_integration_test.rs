//! Integration tests for the measurement wizard workflow
//!
//! These tests validate the complete flow across the library:
//! - Serial number, point selection, and measurement entry
//! - Verdict computation on the worked examples
//! - Record persistence through the key-value port
//! - Corruption recovery, clearing, and CSV export

use std::time::Duration;

use poverka::notify::{Notice, NotificationHub, Severity};
use poverka::records::{KeyValueStore, LoadedRecords, RECORDS_KEY};
use poverka::{
    build_csv, AppConfig, BackOutcome, DeviceContext, FileStore, MemoryStore, RecordStore, Stage,
    Verdict, WizardManager,
};

fn manager_with_memory_store() -> (WizardManager, NotificationHub) {
    let config = AppConfig::default();
    let device = DeviceContext::new("thermometer", "Термометры").unwrap();
    let hub = NotificationHub::new(64, 64);
    let manager = WizardManager::new(
        device,
        RecordStore::new(Box::new(MemoryStore::new())),
        hub.clone(),
        &config.wizard,
    );
    (manager, hub)
}

fn drive_run(manager: &WizardManager, serial: &str, point: &str, measurements: [&str; 3]) {
    manager.submit_serial(serial).unwrap();
    manager.select_point(point).unwrap();
    for raw in measurements {
        manager.submit_measurement(raw).unwrap();
    }
}

/// The worked pass example: serial "SN1", point 32.3 °C with correction
/// -4.0 and limits [32.0, 32.6], measurements 36.1 / 36.3 / 36.2.
#[test]
fn test_end_to_end_pass() {
    let (manager, hub) = manager_with_memory_store();
    drive_run(&manager, "SN1", "32.3", ["36.1", "36.3", "36.2"]);

    let records = manager.store().load_all().unwrap().records;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.serial_number, "SN1");
    assert!((record.average_measurement - 36.20).abs() < 1e-9);
    assert!((record.corrected_average_measurement - 32.20).abs() < 1e-9);
    assert_eq!(record.result, Verdict::Pass);
    assert_eq!(record.measurements.len(), 3);

    let verdicts: Vec<_> = hub
        .snapshot()
        .recent
        .iter()
        .filter(|n| matches!(n, Notice::Verdict { .. }))
        .cloned()
        .collect();
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].severity(), Severity::Success);
}

/// The worked fail example: same point, 37.0 three times.
#[test]
fn test_end_to_end_fail() {
    let (manager, hub) = manager_with_memory_store();
    drive_run(&manager, "SN1", "32.3", ["37.0", "37.0", "37.0"]);

    let records = manager.store().load_all().unwrap().records;
    let record = &records[0];
    assert!((record.average_measurement - 37.00).abs() < 1e-9);
    assert!((record.corrected_average_measurement - 33.00).abs() < 1e-9);
    assert_eq!(record.result, Verdict::Fail);

    let verdict = hub
        .snapshot()
        .recent
        .iter()
        .find(|n| matches!(n, Notice::Verdict { .. }))
        .cloned()
        .unwrap();
    assert_eq!(verdict.severity(), Severity::Error);
}

#[test]
fn test_empty_serial_never_advances_or_records() {
    let (manager, _hub) = manager_with_memory_store();

    for raw in ["", "   ", "\t"] {
        assert!(manager.submit_serial(raw).is_err());
        assert_eq!(manager.stage().unwrap(), Stage::Identify);
    }
    assert!(manager.store().load_all().unwrap().records.is_empty());
}

#[test]
fn test_fewer_than_three_measurements_record_nothing() {
    let (manager, _hub) = manager_with_memory_store();
    manager.submit_serial("SN1").unwrap();
    manager.select_point("34.8").unwrap();
    manager.submit_measurement("36.9").unwrap();
    manager.submit_measurement("37.1").unwrap();

    assert_eq!(manager.stage().unwrap(), Stage::EnterMeasurement);
    assert!(manager.store().load_all().unwrap().records.is_empty());
}

#[test]
fn test_rejected_measurement_keeps_count() {
    let (manager, _hub) = manager_with_memory_store();
    manager.submit_serial("SN1").unwrap();
    manager.select_point("37.0").unwrap();
    manager.submit_measurement("37.1").unwrap();

    assert!(manager.submit_measurement("not a number").is_err());
    assert_eq!(manager.snapshot().unwrap().collected, 1);
    assert!(manager.store().load_all().unwrap().records.is_empty());
}

#[test]
fn test_back_navigation_keeps_serial_and_restarts_set() {
    let (manager, _hub) = manager_with_memory_store();
    manager.submit_serial("SN42").unwrap();
    manager.select_point("32.3").unwrap();
    manager.submit_measurement("36.1").unwrap();

    assert_eq!(
        manager.go_back().unwrap(),
        BackOutcome::MovedTo(Stage::SelectPoint)
    );
    manager.select_point("32.3").unwrap();
    assert_eq!(manager.snapshot().unwrap().collected, 0);
    assert_eq!(manager.snapshot().unwrap().serial_number, "SN42");
}

#[test]
fn test_file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default();
    let device = DeviceContext::new("alcotest", "Алкотестер е-200").unwrap();

    {
        let manager = WizardManager::new(
            device.clone(),
            RecordStore::new(Box::new(FileStore::new(dir.path()))),
            NotificationHub::new(16, 16),
            &config.wizard,
        );
        drive_run(&manager, "A-1", "34.8", ["37.0", "37.0", "37.0"]);
    }

    // A fresh store over the same directory sees the record
    let store = RecordStore::new(Box::new(FileStore::new(dir.path())));
    let records = store.load_all().unwrap().records;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].device_type, "alcotest");
    assert_eq!(records[0].result, Verdict::Pass);
}

#[test]
fn test_corrupted_store_recovers_and_keeps_working() {
    let dir = tempfile::tempdir().unwrap();
    let kv = FileStore::new(dir.path());
    kv.put(RECORDS_KEY, "[{\"broken\": ").unwrap();

    let store = RecordStore::new(Box::new(kv));
    let LoadedRecords { records, recovered } = store.load_all().unwrap();
    assert!(records.is_empty());
    assert!(recovered);

    // The wizard still completes and rebuilds the collection
    let config = AppConfig::default();
    let device = DeviceContext::new("thermometer", "Термометры").unwrap();
    let manager = WizardManager::new(device, store, NotificationHub::new(16, 16), &config.wizard);
    drive_run(&manager, "SN1", "32.3", ["36.1", "36.3", "36.2"]);

    let loaded = manager.store().load_all().unwrap();
    assert_eq!(loaded.records.len(), 1);
    assert!(!loaded.recovered);
}

#[test]
fn test_clear_then_export_signals_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::default();
    let device = DeviceContext::new("thermometer", "Термометры").unwrap();

    // Two units, one wizard run each, sharing the same data dir
    for (serial, point) in [("SN1", "32.3"), ("SN2", "34.8")] {
        let manager = WizardManager::new(
            device.clone(),
            RecordStore::new(Box::new(FileStore::new(dir.path()))),
            NotificationHub::new(16, 16),
            &config.wizard,
        );
        drive_run(&manager, serial, point, ["36.9", "37.0", "37.1"]);
    }

    let store = RecordStore::new(Box::new(FileStore::new(dir.path())));
    assert_eq!(store.load_all().unwrap().records.len(), 2);

    store.clear().unwrap();
    let records = store.load_all().unwrap().records;
    assert!(records.is_empty());
    assert!(build_csv(&records, 3).is_err());
}

#[test]
fn test_export_csv_worked_example() {
    let (manager, _hub) = manager_with_memory_store();
    drive_run(&manager, "SN1", "32.3", ["36.1", "36.3", "36.2"]);

    let records = manager.store().load_all().unwrap().records;
    let csv = build_csv(&records, 3).unwrap();

    assert!(csv.starts_with('\u{FEFF}'));
    let row = csv.lines().nth(1).unwrap();
    assert!(row.contains("\"SN1\""));
    assert!(row.contains("36,1,36,3,36,2"));
    assert!(row.contains("36,20,32,20"));
    assert!(row.ends_with("ГОДЕН"));
}

#[test]
fn test_persisted_json_wire_format() {
    let (manager, _hub) = manager_with_memory_store();
    drive_run(&manager, "SN1", "32.3", ["36.1", "36.3", "36.2"]);

    let records = manager.store().load_all().unwrap().records;
    let json = serde_json::to_string(&records).unwrap();
    assert!(json.contains("\"serialNumber\":\"SN1\""));
    assert!(json.contains("\"selectedPointLabel\":\"32.3 °C\""));
    assert!(json.contains("\"result\":\"ГОДЕН\""));
}

#[tokio::test]
async fn test_auto_reset_returns_wizard_to_identify() {
    let device = DeviceContext::new("thermometer", "Термометры").unwrap();
    let config = poverka::WizardConfig {
        measurements_per_point: 3,
        auto_reset_secs: 0,
    };
    let manager = WizardManager::new(
        device,
        RecordStore::new(Box::new(MemoryStore::new())),
        NotificationHub::new(16, 16),
        &config,
    );
    drive_run(&manager, "SN1", "32.3", ["36.1", "36.3", "36.2"]);
    assert_eq!(manager.stage().unwrap(), Stage::Completed);
    assert_eq!(manager.go_back().unwrap(), BackOutcome::Blocked);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let snapshot = manager.snapshot().unwrap();
    assert_eq!(snapshot.stage, Stage::Identify);
    assert!(snapshot.serial_number.is_empty());

    // The next unit flows through the reset wizard
    drive_run(&manager, "SN2", "37.0", ["40.8", "40.7", "40.6"]);
    assert_eq!(manager.store().load_all().unwrap().records.len(), 2);
}

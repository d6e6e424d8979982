// Records module - persisted measurement records
//
// A record is created exactly once, at the moment the last measurement
// of a run is submitted; it is never updated; it is destroyed only by
// clearing the whole collection. Field names serialize in camelCase to
// stay wire-compatible with collections written by earlier builds.

pub mod export;
pub mod store;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WizardError;
use crate::wizard::{CompletedRun, Verdict};

pub use export::{build_csv, export_file_name};
pub use store::{FileStore, KeyValueStore, LoadedRecords, MemoryStore, RecordStore, RECORDS_KEY};

/// One persisted calibration measurement record
///
/// The reference point is denormalized at save time (label, value,
/// correction, limits), so later changes to the point catalog never
/// retroactively alter history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    /// Unique id: creation millis + serial number + point value
    pub id: String,
    /// Creation instant, ISO 8601
    pub timestamp: String,
    pub serial_number: String,
    pub device_name: String,
    pub device_type: String,
    pub selected_point_label: String,
    pub selected_point_value: String,
    pub correction: f64,
    /// Raw readings, exactly as entered, in entry order
    pub measurements: Vec<f64>,
    /// Mean of the readings, rounded to 2 decimals
    pub average_measurement: f64,
    /// Mean plus correction, rounded to 2 decimals
    pub corrected_average_measurement: f64,
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub result: Verdict,
}

impl MeasurementRecord {
    /// Build a record from a completed wizard run
    ///
    /// # Arguments
    /// * `run` - The completed run carrying inputs and evaluation
    /// * `expected_measurements` - The configured set size to enforce
    /// * `timestamp` - Creation instant (injected for testability)
    ///
    /// # Errors
    /// * `WizardError::WrongMeasurementCount` if the run does not carry
    ///   the expected number of measurements
    pub fn from_run(
        run: &CompletedRun,
        expected_measurements: usize,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, WizardError> {
        if run.measurements.len() != expected_measurements {
            return Err(WizardError::WrongMeasurementCount {
                required: expected_measurements,
                collected: run.measurements.len(),
            });
        }

        Ok(Self {
            id: format!(
                "{}-{}-{}",
                timestamp.timestamp_millis(),
                run.serial_number,
                run.point.value
            ),
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            serial_number: run.serial_number.clone(),
            device_name: run.device.device_name.clone(),
            device_type: run.device.device_type.clone(),
            selected_point_label: run.point.label.clone(),
            selected_point_value: run.point.value.clone(),
            correction: run.point.correction,
            measurements: run.measurements.clone(),
            average_measurement: run.evaluation.average,
            corrected_average_measurement: run.evaluation.corrected_average,
            lower_limit: run.point.lower_limit,
            upper_limit: run.point.upper_limit,
            result: run.evaluation.verdict,
        })
    }
}

/// Order records newest first by creation timestamp
///
/// RFC 3339 timestamps with a fixed UTC offset sort lexicographically,
/// so no parsing is needed here.
pub fn sort_newest_first(records: &mut [MeasurementRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

// WizardSession - the measurement wizard state machine
//
// This module drives a single device run through the data-entry flow:
// 1. Submit the serial number of the unit under test
// 2. Select one reference point
// 3. Enter the configured number of measurements
// The Nth accepted measurement completes the run and yields the
// evaluated result. Side effects (persistence, notification, the
// auto-reset timer) belong to the caller; the session only mutates its
// own state and never on a rejected event.

use crate::devices::DeviceContext;
use crate::error::WizardError;
use crate::points::ReferencePoint;
use crate::wizard::evaluate::Evaluation;
use crate::wizard::input::parse_measurement;
use crate::wizard::stage::{BackOutcome, Stage};

/// Progress information for the measurement-entry stage
#[derive(Debug, Clone, Copy)]
pub struct MeasurementProgress {
    /// Number of measurements accepted so far
    pub collected: usize,
    /// Total measurements needed for the selected point
    pub needed: usize,
}

impl MeasurementProgress {
    /// Check if the measurement set is complete
    pub fn is_complete(&self) -> bool {
        self.collected >= self.needed
    }
}

/// Outcome of an accepted measurement submission
#[derive(Debug, Clone)]
pub enum MeasurementOutcome {
    /// Measurement stored; more are needed
    Accepted(MeasurementProgress),
    /// The set is full; the run is evaluated and the wizard is Completed
    RunComplete(Box<CompletedRun>),
}

/// Everything a completed run carries out of the state machine
///
/// The caller turns this into a persisted record and user-facing
/// notices; the session keeps no claim on it.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub device: DeviceContext,
    pub serial_number: String,
    pub point: ReferencePoint,
    pub measurements: Vec<f64>,
    pub evaluation: Evaluation,
}

/// Read-only snapshot of the session for rendering
#[derive(Debug, Clone)]
pub struct WizardSnapshot {
    pub stage: Stage,
    pub serial_number: String,
    pub point: Option<ReferencePoint>,
    pub collected: usize,
    pub needed: usize,
}

/// WizardSession manages one device run of the data-entry flow
#[derive(Debug, Clone)]
pub struct WizardSession {
    device: DeviceContext,
    stage: Stage,
    serial_number: String,
    selected_point: Option<ReferencePoint>,
    measurements: Vec<f64>,
    measurements_needed: usize,
}

impl WizardSession {
    /// Create a session for a device context
    ///
    /// # Arguments
    /// * `device` - The device context the run records data for
    /// * `measurements_needed` - Measurements to collect per point
    pub fn new(device: DeviceContext, measurements_needed: usize) -> Self {
        Self {
            device,
            stage: Stage::Identify,
            serial_number: String::new(),
            selected_point: None,
            measurements: Vec::new(),
            measurements_needed,
        }
    }

    /// Submit the serial number of the unit under test
    ///
    /// Rejects empty or whitespace-only input without a state change.
    /// On acceptance the wizard advances to point selection.
    pub fn submit_serial(&mut self, raw: &str) -> Result<(), WizardError> {
        if self.stage != Stage::Identify {
            return Err(WizardError::OutOfSequence { stage: self.stage });
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WizardError::EmptySerialNumber);
        }
        self.serial_number = trimmed.to_string();
        self.stage = Stage::SelectPoint;
        Ok(())
    }

    /// Select the reference point to verify against
    ///
    /// Resets the measurement accumulator to empty, so re-entering the
    /// measurement stage always starts a fresh set.
    pub fn select_point(&mut self, point: ReferencePoint) -> Result<(), WizardError> {
        if self.stage != Stage::SelectPoint {
            return Err(WizardError::OutOfSequence { stage: self.stage });
        }
        self.selected_point = Some(point);
        self.measurements.clear();
        self.stage = Stage::EnterMeasurement;
        Ok(())
    }

    /// Submit one raw measurement
    ///
    /// Input that does not parse as a finite number is rejected in
    /// place. The Nth accepted value evaluates the run, moves the
    /// wizard to `Completed`, and returns the `CompletedRun`.
    pub fn submit_measurement(&mut self, raw: &str) -> Result<MeasurementOutcome, WizardError> {
        if self.stage != Stage::EnterMeasurement {
            return Err(WizardError::OutOfSequence { stage: self.stage });
        }
        let value = parse_measurement(raw)?;

        self.measurements.push(value);
        if self.measurements.len() < self.measurements_needed {
            return Ok(MeasurementOutcome::Accepted(self.progress()));
        }

        // Selected point is guaranteed by the EnterMeasurement stage
        let point = self
            .selected_point
            .clone()
            .ok_or(WizardError::OutOfSequence { stage: self.stage })?;
        let evaluation = Evaluation::of(&self.measurements, &point);
        self.stage = Stage::Completed;

        Ok(MeasurementOutcome::RunComplete(Box::new(CompletedRun {
            device: self.device.clone(),
            serial_number: self.serial_number.clone(),
            point,
            measurements: self.measurements.clone(),
            evaluation,
        })))
    }

    /// Navigate one step backward
    ///
    /// Keeps the serial number; a later point re-selection resets the
    /// accumulator. Blocked while the completed screen auto-advances.
    pub fn go_back(&mut self) -> BackOutcome {
        let outcome = self.stage.back();
        if let BackOutcome::MovedTo(stage) = outcome {
            self.stage = stage;
        }
        outcome
    }

    /// Clear all per-run state and return to identification
    ///
    /// The device context is preserved; everything else is dropped.
    pub fn reset_run(&mut self) {
        self.serial_number.clear();
        self.selected_point = None;
        self.measurements.clear();
        self.stage = Stage::Identify;
    }

    /// Current stage of the run
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Device context the run is bound to
    pub fn device(&self) -> &DeviceContext {
        &self.device
    }

    /// Progress through the measurement-entry stage
    pub fn progress(&self) -> MeasurementProgress {
        MeasurementProgress {
            collected: self.measurements.len(),
            needed: self.measurements_needed,
        }
    }

    /// Read-only snapshot for rendering
    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            stage: self.stage,
            serial_number: self.serial_number.clone(),
            point: self.selected_point.clone(),
            collected: self.measurements.len(),
            needed: self.measurements_needed,
        }
    }
}

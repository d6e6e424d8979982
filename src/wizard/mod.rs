// Wizard module - measurement data-entry flow and result calculation
//
// This module provides the core of the data-entry wizard:
// 1. Stage: the four-stage flow for one device run
// 2. WizardSession: the state machine collecting serial number, point,
//    and measurements
// 3. Evaluation: the pure average/offset/range verdict calculator
// 4. Input shaping for the measurement entry field
//
// The wizard flow:
// 1. Submit a serial number
// 2. Select one of the fixed reference points
// 3. Enter measurements until the set is full; the run completes with
//    an evaluated result

pub mod evaluate;
pub mod input;
pub mod session;
pub mod stage;

pub use evaluate::{round2, Evaluation, Verdict};
pub use input::{parse_measurement, sanitize_measurement_input};
pub use session::{
    CompletedRun, MeasurementOutcome, MeasurementProgress, WizardSession, WizardSnapshot,
};
pub use stage::{BackOutcome, Stage};

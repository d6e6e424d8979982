// Stage sequencing for the measurement wizard
//
// The wizard walks one device run through a fixed four-stage flow:
// identify the unit, pick a reference point, collect the measurements,
// show the verdict. Forward movement is event-driven; backward movement
// is user-driven and blocked only inside the completed screen's
// auto-advance window.

use serde::{Deserialize, Serialize};

/// Wizard stage for a single device run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Step 1: Scan or type the serial number of the unit under test
    Identify,
    /// Step 2: Choose the reference point to verify against
    SelectPoint,
    /// Step 3: Enter the raw measurements one by one
    EnterMeasurement,
    /// Step 4: Verdict shown; run auto-resets shortly
    Completed,
}

/// Outcome of a backward-navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    /// Moved to an earlier stage within the run
    MovedTo(Stage),
    /// Left the wizard toward the device-selection context
    ExitToDeviceSelection,
    /// Back navigation is disabled while the completed screen auto-advances
    Blocked,
}

impl Stage {
    /// Get the next stage in the forward sequence
    ///
    /// # Returns
    /// * `Some(Stage)` - Next stage of the run
    /// * `None` - Run is complete
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Identify => Some(Stage::SelectPoint),
            Stage::SelectPoint => Some(Stage::EnterMeasurement),
            Stage::EnterMeasurement => Some(Stage::Completed),
            Stage::Completed => None,
        }
    }

    /// Resolve a backward-navigation request from this stage
    ///
    /// Backing out of measurement entry returns to point selection; backing
    /// out of point selection returns to identification (the serial number
    /// is kept). From identification the user leaves the wizard entirely.
    /// The completed screen does not accept manual navigation; its timer
    /// resets the run instead.
    pub fn back(&self) -> BackOutcome {
        match self {
            Stage::EnterMeasurement => BackOutcome::MovedTo(Stage::SelectPoint),
            Stage::SelectPoint => BackOutcome::MovedTo(Stage::Identify),
            Stage::Identify => BackOutcome::ExitToDeviceSelection,
            Stage::Completed => BackOutcome::Blocked,
        }
    }

    /// Get human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Identify => "Сканирование QR / Ввод S/N",
            Stage::SelectPoint => "Выбор точки поверки",
            Stage::EnterMeasurement => "Ввод измерений",
            Stage::Completed => "Комплект данных обработан",
        }
    }
}

// Wizard error types and constants

use crate::error::ErrorCode;
use crate::wizard::Stage;
use log::error;
use std::fmt;

/// Wizard error code constants
///
/// These constants provide a single source of truth for error codes
/// shared between the library, the CLI, and log output.
///
/// Error code range: 1001-1006
pub struct WizardErrorCodes {}

impl WizardErrorCodes {
    /// Serial number was empty or whitespace-only
    pub const EMPTY_SERIAL_NUMBER: i32 = 1001;

    /// Measurement input did not parse as a finite number
    pub const INVALID_MEASUREMENT: i32 = 1002;

    /// Event received in a stage that does not accept it
    pub const OUT_OF_SEQUENCE: i32 = 1003;

    /// Record construction with the wrong number of measurements
    pub const WRONG_MEASUREMENT_COUNT: i32 = 1004;

    /// Device context missing or blank (fatal precondition)
    pub const MISSING_DEVICE_CONTEXT: i32 = 1005;

    /// Wizard state lock was poisoned
    pub const STATE_POISONED: i32 = 1006;

    /// Selected reference point is not in the catalog
    pub const UNKNOWN_POINT: i32 = 1007;
}

/// Log a wizard error with structured context
///
/// Logs wizard errors with the numeric code, the component, and a
/// human-readable message. Non-blocking; never panics.
pub fn log_wizard_error(err: &WizardError, context: &str) {
    error!(
        "Wizard error in {}: code={}, component=WizardSession, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Wizard-related errors
///
/// These errors cover the measurement wizard state machine: input
/// validation, stage sequencing, and record construction.
///
/// Error code range: 1001-1006
#[derive(Debug, Clone, PartialEq)]
pub enum WizardError {
    /// Serial number was empty or whitespace-only
    EmptySerialNumber,

    /// Measurement input did not parse as a finite number
    InvalidMeasurement { input: String },

    /// Event received in a stage that does not accept it
    OutOfSequence { stage: Stage },

    /// Record construction with the wrong number of measurements
    WrongMeasurementCount { required: usize, collected: usize },

    /// Device context missing or blank (fatal precondition)
    MissingDeviceContext,

    /// Wizard state lock was poisoned
    StatePoisoned,

    /// Selected reference point is not in the catalog
    UnknownPoint { value: String },
}

impl ErrorCode for WizardError {
    fn code(&self) -> i32 {
        match self {
            WizardError::EmptySerialNumber => WizardErrorCodes::EMPTY_SERIAL_NUMBER,
            WizardError::InvalidMeasurement { .. } => WizardErrorCodes::INVALID_MEASUREMENT,
            WizardError::OutOfSequence { .. } => WizardErrorCodes::OUT_OF_SEQUENCE,
            WizardError::WrongMeasurementCount { .. } => {
                WizardErrorCodes::WRONG_MEASUREMENT_COUNT
            }
            WizardError::MissingDeviceContext => WizardErrorCodes::MISSING_DEVICE_CONTEXT,
            WizardError::StatePoisoned => WizardErrorCodes::STATE_POISONED,
            WizardError::UnknownPoint { .. } => WizardErrorCodes::UNKNOWN_POINT,
        }
    }

    fn message(&self) -> String {
        match self {
            WizardError::EmptySerialNumber => "Serial number cannot be empty".to_string(),
            WizardError::InvalidMeasurement { input } => {
                format!("Measurement input {:?} is not a valid number", input)
            }
            WizardError::OutOfSequence { stage } => {
                format!("Operation not allowed in stage {:?}", stage)
            }
            WizardError::WrongMeasurementCount {
                required,
                collected,
            } => {
                format!("Wrong measurement count: need {}, got {}", required, collected)
            }
            WizardError::MissingDeviceContext => {
                "Device context not supplied (type and name are required)".to_string()
            }
            WizardError::StatePoisoned => "Wizard state lock poisoned".to_string(),
            WizardError::UnknownPoint { value } => {
                format!("Reference point {:?} is not in the catalog", value)
            }
        }
    }
}

impl fmt::Display for WizardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WizardError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for WizardError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wizard_error_codes() {
        assert_eq!(
            WizardError::EmptySerialNumber.code(),
            WizardErrorCodes::EMPTY_SERIAL_NUMBER
        );
        assert_eq!(
            WizardError::InvalidMeasurement {
                input: "abc".to_string()
            }
            .code(),
            WizardErrorCodes::INVALID_MEASUREMENT
        );
        assert_eq!(
            WizardError::OutOfSequence {
                stage: Stage::Identify
            }
            .code(),
            WizardErrorCodes::OUT_OF_SEQUENCE
        );
        assert_eq!(
            WizardError::WrongMeasurementCount {
                required: 3,
                collected: 2
            }
            .code(),
            WizardErrorCodes::WRONG_MEASUREMENT_COUNT
        );
        assert_eq!(
            WizardError::MissingDeviceContext.code(),
            WizardErrorCodes::MISSING_DEVICE_CONTEXT
        );
        assert_eq!(
            WizardError::StatePoisoned.code(),
            WizardErrorCodes::STATE_POISONED
        );
    }

    #[test]
    fn test_wizard_error_messages() {
        let err = WizardError::WrongMeasurementCount {
            required: 3,
            collected: 1,
        };
        assert_eq!(err.message(), "Wrong measurement count: need 3, got 1");

        let err = WizardError::EmptySerialNumber;
        assert!(err.message().contains("empty"));

        let err = WizardError::InvalidMeasurement {
            input: "1.2.3".to_string(),
        };
        assert!(err.message().contains("1.2.3"));

        let err = WizardError::MissingDeviceContext;
        assert!(err.message().contains("Device context"));
    }

    #[test]
    fn test_wizard_error_display() {
        let err = WizardError::StatePoisoned;
        let display = format!("{}", err);
        assert!(display.contains("WizardError"));
        assert!(display.contains(&err.code().to_string()));
    }
}

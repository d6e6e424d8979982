// Device context and the device catalog
//
// A wizard run is always bound to a device context (type key + display
// name) supplied by the caller before the wizard starts. A missing or
// blank context is a fatal precondition for the flow; callers redirect
// to device selection instead of starting the wizard.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// The device category a wizard run records measurements for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceContext {
    /// Machine-readable device type key (e.g. "thermometer")
    pub device_type: String,
    /// Human-readable device name shown in notices and records
    pub device_name: String,
}

impl DeviceContext {
    /// Create a device context, rejecting blank type or name
    pub fn new(device_type: &str, device_name: &str) -> Result<Self, WizardError> {
        if device_type.trim().is_empty() || device_name.trim().is_empty() {
            return Err(WizardError::MissingDeviceContext);
        }
        Ok(Self {
            device_type: device_type.to_string(),
            device_name: device_name.to_string(),
        })
    }
}

/// A selectable entry in the device catalog
#[derive(Debug, Clone, Copy)]
pub struct DeviceOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Devices this installation records data for
pub const DEVICE_OPTIONS: [DeviceOption; 2] = [
    DeviceOption {
        id: "thermometer",
        name: "Термометры",
        description: "Ввод данных для термометров.",
    },
    DeviceOption {
        id: "alcotest",
        name: "Алкотестер е-200",
        description: "Ввод данных для алкотестеров.",
    },
];

/// Resolve a catalog entry into a device context
pub fn find_device(id: &str) -> Option<DeviceContext> {
    DEVICE_OPTIONS
        .iter()
        .find(|option| option.id == id)
        .map(|option| DeviceContext {
            device_type: option.id.to_string(),
            device_name: option.name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_blank_fields() {
        assert_eq!(
            DeviceContext::new("", "Термометры").unwrap_err(),
            WizardError::MissingDeviceContext
        );
        assert_eq!(
            DeviceContext::new("thermometer", "   ").unwrap_err(),
            WizardError::MissingDeviceContext
        );
    }

    #[test]
    fn test_new_accepts_valid_context() {
        let ctx = DeviceContext::new("thermometer", "Термометры").unwrap();
        assert_eq!(ctx.device_type, "thermometer");
        assert_eq!(ctx.device_name, "Термометры");
    }

    #[test]
    fn test_find_device_known() {
        let ctx = find_device("alcotest").unwrap();
        assert_eq!(ctx.device_name, "Алкотестер е-200");
    }

    #[test]
    fn test_find_device_unknown() {
        assert!(find_device("barometer").is_none());
    }
}

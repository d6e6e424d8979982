// Reference point catalog for calibration runs
//
// Reference points are immutable and statically enumerated. Each point
// carries the correction offset and the acceptance range for the corrected
// average. Records denormalize the point at save time, so editing this
// table never rewrites history.

use serde::{Deserialize, Serialize};

/// A fixed calibration target with correction and acceptance limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Identifier, the nominal value as text (e.g. "32.3")
    pub value: String,
    /// Human-readable label (e.g. "32.3 °C")
    pub label: String,
    /// Additive offset applied to the raw average
    pub correction: f64,
    /// Inclusive lower bound for the corrected average
    pub lower_limit: f64,
    /// Inclusive upper bound for the corrected average
    pub upper_limit: f64,
}

impl ReferencePoint {
    fn new(value: &str, label: &str, correction: f64, lower_limit: f64, upper_limit: f64) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            correction,
            lower_limit,
            upper_limit,
        }
    }
}

/// The verification points offered by the wizard
///
/// Three fixed thermometry points. Values, corrections, and limits match
/// the laboratory work instruction.
pub fn reference_points() -> Vec<ReferencePoint> {
    vec![
        ReferencePoint::new("32.3", "32.3 °C", -4.0, 32.0, 32.6),
        ReferencePoint::new("34.8", "34.8 °C", -2.2, 34.5, 35.1),
        ReferencePoint::new("37.0", "37.0 °C", -3.7, 36.7, 37.3),
    ]
}

/// Look up a reference point by its `value` identifier
pub fn find_point(value: &str) -> Option<ReferencePoint> {
    reference_points().into_iter().find(|p| p.value == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_three_points() {
        let points = reference_points();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_find_point_by_value() {
        let point = find_point("32.3").unwrap();
        assert_eq!(point.label, "32.3 °C");
        assert!((point.correction - (-4.0)).abs() < f64::EPSILON);
        assert!((point.lower_limit - 32.0).abs() < f64::EPSILON);
        assert!((point.upper_limit - 32.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_find_point_unknown_value() {
        assert!(find_point("99.9").is_none());
    }

    #[test]
    fn test_limits_bracket_nominal_value() {
        for point in reference_points() {
            let nominal: f64 = point.value.parse().unwrap();
            assert!(point.lower_limit <= nominal && nominal <= point.upper_limit);
        }
    }
}

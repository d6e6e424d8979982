// Result calculation for a completed measurement set
//
// Pure arithmetic, no I/O: persistence and notification stay with the
// caller. The verdict is computed on the UNROUNDED corrected average;
// the 2-decimal values exist only for storage and display. Rounding
// first would flip verdicts on boundary values, so the order here is a
// hard contract.

use serde::{Deserialize, Serialize};

use crate::points::ReferencePoint;

/// Pass/fail classification of a completed measurement set
///
/// Serialized with the work-instruction labels so persisted records and
/// CSV exports match the paper forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "ГОДЕН")]
    Pass,
    #[serde(rename = "БРАК")]
    Fail,
}

impl Verdict {
    /// The label printed on records and exports
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "ГОДЕН",
            Verdict::Fail => "БРАК",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Evaluation of one measurement set against a reference point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Arithmetic mean of the raw measurements, rounded to 2 decimals
    pub average: f64,
    /// Mean plus the point correction, rounded to 2 decimals
    pub corrected_average: f64,
    /// Verdict, decided on the unrounded corrected average
    pub verdict: Verdict,
}

/// Round to 2 decimal places for storage and display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Evaluation {
    /// Evaluate a measurement set against a reference point
    ///
    /// # Arguments
    /// * `measurements` - The raw readings, in entry order
    /// * `point` - The reference point supplying correction and limits
    ///
    /// # Algorithm
    /// 1. `average = sum / count` (plain mean, no outlier rejection)
    /// 2. `corrected = average + correction`
    /// 3. `Pass` iff `lower_limit <= corrected <= upper_limit`, both ends
    ///    inclusive, compared before any rounding
    /// 4. round both values to 2 decimals for the record
    pub fn of(measurements: &[f64], point: &ReferencePoint) -> Self {
        let sum: f64 = measurements.iter().sum();
        let average = sum / measurements.len() as f64;
        let corrected = average + point.correction;

        let verdict = if corrected >= point.lower_limit && corrected <= point.upper_limit {
            Verdict::Pass
        } else {
            Verdict::Fail
        };

        Self {
            average: round2(average),
            corrected_average: round2(corrected),
            verdict,
        }
    }
}

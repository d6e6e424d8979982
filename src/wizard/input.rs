// Measurement input sanitization and submit-time parsing
//
// The sanitizer shapes keystroke-level text into the fixed-width "XX.Y"
// entry convention used for temperature-like values: only digits and a
// single decimal point survive, and while the user is extending the
// input a point is inserted after the first two integer digits. Final
// validation happens independently at submit time.

use crate::error::WizardError;

/// Sanitize raw measurement input against its previous value
///
/// # Arguments
/// * `previous` - The field content before this edit
/// * `raw` - The field content after the edit, unfiltered
///
/// # Returns
/// The shaped text to put back into the field.
///
/// # Rules
/// * Every character that is not `0`-`9` or the first `.` is dropped
/// * While the user is extending the input (result longer than
///   `previous`) and no point exists yet: two digits gain a trailing
///   point, and any further digits are pushed behind an inserted point
pub fn sanitize_measurement_input(previous: &str, raw: &str) -> String {
    let mut sanitized = String::with_capacity(raw.len());
    let mut has_decimal = false;
    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            sanitized.push(ch);
        } else if ch == '.' && !has_decimal {
            sanitized.push(ch);
            has_decimal = true;
        }
    }

    let is_typing = sanitized.chars().count() > previous.chars().count();
    if is_typing && !has_decimal {
        let digits = sanitized.len();
        if digits == 2 {
            // Input was "1", user types "2" -> "12", becomes "12."
            sanitized.push('.');
        } else if digits > 2 {
            // User pastes "123" or types a third digit in one edit
            sanitized.insert(2, '.');
        }
    }

    sanitized
}

/// Parse sanitized text as a finite measurement value
///
/// Submit-time validation, independent of the sanitizer: the text must
/// parse as a finite number. A trailing decimal point (e.g. "12.") is
/// accepted the way the entry field produced it.
pub fn parse_measurement(text: &str) -> Result<f64, WizardError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| WizardError::InvalidMeasurement {
            input: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_digit_gains_trailing_point() {
        // Typing "1" then "2": the edit arrives as previous="1", raw="12"
        assert_eq!(sanitize_measurement_input("1", "12"), "12.");
    }

    #[test]
    fn test_digit_after_point_is_kept() {
        assert_eq!(sanitize_measurement_input("12.", "12.3"), "12.3");
    }

    #[test]
    fn test_second_point_is_dropped() {
        assert_eq!(sanitize_measurement_input("12.3", "12.3."), "12.3");
    }

    #[test]
    fn test_pasted_digits_get_point_inserted() {
        assert_eq!(sanitize_measurement_input("", "363"), "36.3");
    }

    #[test]
    fn test_letters_and_symbols_are_stripped() {
        assert_eq!(sanitize_measurement_input("", "3a6,b3"), "36.3");
    }

    #[test]
    fn test_no_auto_point_when_deleting() {
        // Shrinking edits must not re-insert the point
        assert_eq!(sanitize_measurement_input("12.", "12"), "12");
    }

    #[test]
    fn test_single_digit_untouched() {
        assert_eq!(sanitize_measurement_input("", "3"), "3");
    }

    #[test]
    fn test_parse_accepts_trailing_point() {
        assert!((parse_measurement("12.").unwrap() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_accepts_decimal() {
        assert!((parse_measurement("36.3").unwrap() - 36.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            parse_measurement(""),
            Err(WizardError::InvalidMeasurement { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_lone_point() {
        assert!(parse_measurement(".").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_measurement("abc").is_err());
    }
}

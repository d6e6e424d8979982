// CSV export of the record collection
//
// The exported text follows the laboratory's spreadsheet conventions:
// decimal comma in every numeric field, quoted text columns with ""
// escaping, local date-times, and a UTF-8 BOM so Excel picks the right
// encoding. Missing measurement slots render as empty cells, not
// placeholder values. An empty collection produces no file at all.

use chrono::{DateTime, Local};

use crate::error::ExportError;
use crate::records::MeasurementRecord;

/// Column headers, in the fixed schema order
fn headers(measurement_columns: usize) -> Vec<String> {
    let mut headers = vec![
        "Дата и время".to_string(),
        "Тип устройства".to_string(),
        "Имя устройства".to_string(),
        "Серийный номер".to_string(),
        "Точка поверки".to_string(),
        "Значение точки".to_string(),
        "Поправка".to_string(),
    ];
    for i in 0..measurement_columns {
        headers.push(format!("Измерение {}", i + 1));
    }
    headers.extend([
        "Среднее изм.".to_string(),
        "Скорр. среднее".to_string(),
        "Ниж. предел".to_string(),
        "Верх. предел".to_string(),
        "Результат (Вывод)".to_string(),
    ]);
    headers
}

/// Numeric cell in minimal form, decimal comma
fn decimal_cell(value: f64) -> String {
    format!("{}", value).replace('.', ",")
}

/// Numeric cell fixed to 2 decimals, decimal comma
fn fixed2_cell(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

/// Text cell, quoted with "" escaping
fn text_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Stored RFC 3339 timestamp rendered as a local date-time
///
/// Foreign data with an unparseable timestamp keeps the raw string
/// rather than failing the whole export.
fn timestamp_cell(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed
            .with_timezone(&Local)
            .format("%d.%m.%Y %H:%M:%S")
            .to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Render one record as a CSV row
fn record_row(record: &MeasurementRecord, measurement_columns: usize) -> String {
    let mut cells = vec![
        timestamp_cell(&record.timestamp),
        text_cell(&record.device_type),
        text_cell(&record.device_name),
        text_cell(&record.serial_number),
        text_cell(&record.selected_point_label),
        record.selected_point_value.replace('.', ","),
        decimal_cell(record.correction),
    ];
    for i in 0..measurement_columns {
        cells.push(match record.measurements.get(i) {
            Some(value) => decimal_cell(*value),
            None => String::new(),
        });
    }
    cells.extend([
        fixed2_cell(record.average_measurement),
        fixed2_cell(record.corrected_average_measurement),
        decimal_cell(record.lower_limit),
        decimal_cell(record.upper_limit),
        record.result.label().to_string(),
    ]);
    cells.join(",")
}

/// Build the CSV text for a record collection
///
/// # Arguments
/// * `records` - Records in the order they should appear
/// * `measurement_columns` - Fixed number of measurement columns
///
/// # Returns
/// * `Ok(String)` - CSV text prefixed with a UTF-8 BOM
/// * `Err(ExportError::NoRecords)` - Nothing to export, no file
pub fn build_csv(
    records: &[MeasurementRecord],
    measurement_columns: usize,
) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoRecords);
    }

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(headers(measurement_columns).join(","));
    for record in records {
        rows.push(record_row(record, measurement_columns));
    }

    Ok(format!("\u{FEFF}{}", rows.join("\n")))
}

/// Default export file name for a given instant
pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("records_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

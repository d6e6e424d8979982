// Poverka Core - calibration measurement wizard
// Staged data-entry flow with pass/fail evaluation and local record keeping

// Module declarations
pub mod config;
pub mod devices;
pub mod error;
pub mod manager;
pub mod notify;
pub mod points;
pub mod records;
pub mod wizard;

// Re-exports for convenience
pub use config::{AppConfig, StorageConfig, WizardConfig};
pub use devices::{find_device, DeviceContext, DEVICE_OPTIONS};
pub use manager::WizardManager;
pub use points::{find_point, reference_points, ReferencePoint};
pub use records::{
    build_csv, export_file_name, FileStore, KeyValueStore, MeasurementRecord, MemoryStore,
    RecordStore,
};
pub use wizard::{
    BackOutcome, CompletedRun, Evaluation, MeasurementOutcome, Stage, Verdict, WizardSession,
};

/// Initialize logging from the `RUST_LOG` environment variable
///
/// Defaults to `info` when the variable is unset. Safe to call once per
/// process; intended for binaries and integration harnesses.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

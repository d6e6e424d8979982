// WizardManager: orchestration of the wizard flow
//
// Single Responsibility: drive one WizardSession and perform the side
// effects the session itself stays free of: publishing notices,
// persisting the completed record, and scheduling the auto-reset.
//
// The auto-reset is the one deferred element in an otherwise
// synchronous flow. Every scheduled reset captures the current run
// generation; every manual event bumps the generation and aborts the
// pending task, and the task re-checks generation and stage under the
// lock before touching the session. A stale timer therefore can never
// clobber a newer run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::config::WizardConfig;
use crate::devices::DeviceContext;
use crate::error::{log_storage_error, log_wizard_error, WizardError};
use crate::notify::{Notice, NotificationHub};
use crate::points::{find_point, ReferencePoint};
use crate::records::{MeasurementRecord, RecordStore};
use crate::wizard::{
    BackOutcome, MeasurementOutcome, Stage, WizardSession, WizardSnapshot,
};

struct ManagerState {
    session: Mutex<WizardSession>,
    generation: AtomicU64,
    reset_task: Mutex<Option<JoinHandle<()>>>,
    store: RecordStore,
    hub: NotificationHub,
}

/// Manages the wizard lifecycle for one device context
///
/// This manager handles:
/// - Forwarding user events to the session
/// - Publishing notices for accepted and rejected input
/// - Persisting the record when a run completes (a storage failure is
///   surfaced as its own warning and never blocks the verdict)
/// - Scheduling and cancelling the completed-screen auto-reset
pub struct WizardManager {
    state: Arc<ManagerState>,
    measurements_needed: usize,
    auto_reset: Duration,
}

impl WizardManager {
    /// Create a manager for a device context
    ///
    /// The device context is the flow's precondition; callers that fail
    /// to build one redirect to device selection instead.
    pub fn new(
        device: DeviceContext,
        store: RecordStore,
        hub: NotificationHub,
        config: &WizardConfig,
    ) -> Self {
        let session = WizardSession::new(device, config.measurements_per_point);
        Self {
            state: Arc::new(ManagerState {
                session: Mutex::new(session),
                generation: AtomicU64::new(0),
                reset_task: Mutex::new(None),
                store,
                hub,
            }),
            measurements_needed: config.measurements_per_point,
            auto_reset: Duration::from_secs(config.auto_reset_secs),
        }
    }

    /// Submit the serial number of the unit under test
    pub fn submit_serial(&self, raw: &str) -> Result<(), WizardError> {
        let mut session = self.lock_session()?;
        match session.submit_serial(raw) {
            Ok(()) => {
                let serial = session.snapshot().serial_number;
                drop(session);
                self.bump_generation();
                self.state.hub.publish(Notice::SerialAccepted {
                    serial_number: serial,
                });
                Ok(())
            }
            Err(err) => {
                drop(session);
                self.reject(&err, "submit_serial");
                Err(err)
            }
        }
    }

    /// Select a reference point from the catalog by its value
    pub fn select_point(&self, value: &str) -> Result<ReferencePoint, WizardError> {
        let point = find_point(value).ok_or_else(|| WizardError::UnknownPoint {
            value: value.to_string(),
        })?;

        let mut session = self.lock_session()?;
        match session.select_point(point.clone()) {
            Ok(()) => {
                drop(session);
                self.bump_generation();
                self.state.hub.publish(Notice::PointSelected {
                    label: point.label.clone(),
                });
                Ok(point)
            }
            Err(err) => {
                drop(session);
                self.reject(&err, "select_point");
                Err(err)
            }
        }
    }

    /// Submit one raw measurement
    ///
    /// The Nth accepted value completes the run: the record is built
    /// and persisted, the verdict notice goes out, and the auto-reset
    /// is scheduled.
    pub fn submit_measurement(&self, raw: &str) -> Result<MeasurementOutcome, WizardError> {
        let mut session = self.lock_session()?;
        let outcome = match session.submit_measurement(raw) {
            Ok(outcome) => outcome,
            Err(err) => {
                drop(session);
                self.reject(&err, "submit_measurement");
                return Err(err);
            }
        };
        drop(session);
        let generation = self.bump_generation();

        match &outcome {
            MeasurementOutcome::Accepted(progress) => {
                self.state.hub.publish(Notice::MeasurementAccepted {
                    collected: progress.collected,
                    needed: progress.needed,
                });
            }
            MeasurementOutcome::RunComplete(run) => {
                let record =
                    MeasurementRecord::from_run(run, self.measurements_needed, Utc::now())?;

                match self.state.store.append(&record) {
                    Ok(recovered) => {
                        if recovered {
                            self.state.hub.publish(Notice::StorageRecovered);
                        }
                        self.state.hub.publish(Notice::RecordSaved {
                            serial_number: record.serial_number.clone(),
                            point_label: record.selected_point_label.clone(),
                        });
                    }
                    Err(err) => {
                        // The verdict still stands; persistence failure is
                        // its own warning, not a flow error
                        log_storage_error(&err, "submit_measurement");
                        self.state.hub.publish(Notice::SaveFailed {
                            reason: err.to_string(),
                        });
                    }
                }

                self.state.hub.publish(Notice::Verdict {
                    verdict: run.evaluation.verdict,
                    serial_number: run.serial_number.clone(),
                    point_label: run.point.label.clone(),
                    average: run.evaluation.average,
                    corrected_average: run.evaluation.corrected_average,
                    lower_limit: run.point.lower_limit,
                    upper_limit: run.point.upper_limit,
                });

                self.schedule_auto_reset(generation);
            }
        }

        Ok(outcome)
    }

    /// Navigate one step backward
    ///
    /// Blocked inside the completed screen's auto-advance window; a
    /// blocked request leaves the pending reset untouched.
    pub fn go_back(&self) -> Result<BackOutcome, WizardError> {
        let mut session = self.lock_session()?;
        let outcome = session.go_back();
        drop(session);
        if outcome != BackOutcome::Blocked {
            self.bump_generation();
        }
        Ok(outcome)
    }

    /// Current stage of the run
    pub fn stage(&self) -> Result<Stage, WizardError> {
        Ok(self.lock_session()?.stage())
    }

    /// Read-only snapshot for rendering
    pub fn snapshot(&self) -> Result<WizardSnapshot, WizardError> {
        Ok(self.lock_session()?.snapshot())
    }

    /// The record store this manager persists into
    pub fn store(&self) -> &RecordStore {
        &self.state.store
    }

    // ========================================================================
    // HELPER METHODS - Lock management, notices, auto-reset
    // ========================================================================

    /// Safely acquire the session lock
    fn lock_session(&self) -> Result<MutexGuard<'_, WizardSession>, WizardError> {
        self.state
            .session
            .lock()
            .map_err(|_| WizardError::StatePoisoned)
    }

    /// Log a rejected event and publish its validation notice, if any
    fn reject(&self, err: &WizardError, context: &str) {
        log_wizard_error(err, context);
        if let Some(reason) = validation_reason(err) {
            self.state
                .hub
                .publish(Notice::ValidationRejected { reason });
        }
    }

    /// Advance the run generation and abort any pending reset
    ///
    /// Called on every successful manual event, so a previously
    /// scheduled reset can neither fire nor target the new run.
    fn bump_generation(&self) -> u64 {
        if let Ok(mut task) = self.state.reset_task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
        self.state.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Schedule the completed-screen auto-reset for one run generation
    ///
    /// Degrades to a logged warning when no tokio runtime is available
    /// (e.g. purely synchronous callers); the wizard then stays on the
    /// completed screen until the next manual event.
    fn schedule_auto_reset(&self, generation: u64) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!(
                    "[WizardManager] No async runtime; auto-reset disabled for this run"
                );
                return;
            }
        };

        let state = Arc::clone(&self.state);
        let delay = self.auto_reset;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let Ok(mut session) = state.session.lock() else {
                return;
            };
            // Only the run that scheduled this reset may be cleared
            if state.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            if session.stage() != Stage::Completed {
                return;
            }
            session.reset_run();
            tracing::info!(generation, "wizard run auto-reset to identification");
        });

        if let Ok(mut task) = self.state.reset_task.lock() {
            if let Some(previous) = task.replace(handle) {
                previous.abort();
            }
        }
    }
}

impl Drop for WizardManager {
    fn drop(&mut self) {
        // Teardown cancels the deferred reset; the task must not
        // outlive the flow that scheduled it
        if let Ok(mut task) = self.state.reset_task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

/// User-facing reason for a rejected input, if the error is one the
/// operator can fix by retyping
fn validation_reason(err: &WizardError) -> Option<String> {
    match err {
        WizardError::EmptySerialNumber => {
            Some("Серийный номер не может быть пустым.".to_string())
        }
        WizardError::InvalidMeasurement { .. } => {
            Some("Пожалуйста, введите действительное число.".to_string())
        }
        _ => None,
    }
}

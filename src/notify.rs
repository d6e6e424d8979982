//! Notification collaborator for the wizard.
//!
//! Fire-and-forget user-facing notices multiplexed into a bounded
//! history plus an async broadcast stream. Publishing never fails: a
//! missing subscriber only means nobody is rendering toasts right now.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::wizard::Verdict;

/// Global notification hub shared across the crate.
static HUB: Lazy<NotificationHub> = Lazy::new(NotificationHub::default);

/// Access the global notification hub.
pub fn hub() -> &'static NotificationHub {
    &HUB
}

/// Rendering weight of a notice; pass and fail verdicts differ on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// User-facing notices emitted by the wizard flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Notice {
    /// Input rejected by validation; no stage change happened
    ValidationRejected { reason: String },
    /// Serial number accepted, moving to point selection
    SerialAccepted { serial_number: String },
    /// Reference point selected, moving to measurement entry
    PointSelected { label: String },
    /// One measurement accepted; more are needed
    MeasurementAccepted { collected: usize, needed: usize },
    /// Completed record persisted
    RecordSaved {
        serial_number: String,
        point_label: String,
    },
    /// Persisting the record failed; the verdict still stands
    SaveFailed { reason: String },
    /// Final verdict of a completed run
    Verdict {
        verdict: Verdict,
        serial_number: String,
        point_label: String,
        average: f64,
        corrected_average: f64,
        lower_limit: f64,
        upper_limit: f64,
    },
    /// The stored collection was unreadable and recovered as empty
    StorageRecovered,
    /// All records were cleared
    RecordsCleared,
    /// Export requested on an empty collection
    NothingToExport,
}

impl Notice {
    /// Rendering weight for this notice
    pub fn severity(&self) -> Severity {
        match self {
            Notice::ValidationRejected { .. } => Severity::Error,
            Notice::SerialAccepted { .. } => Severity::Info,
            Notice::PointSelected { .. } => Severity::Info,
            Notice::MeasurementAccepted { .. } => Severity::Info,
            Notice::RecordSaved { .. } => Severity::Success,
            Notice::SaveFailed { .. } => Severity::Warning,
            Notice::Verdict { verdict, .. } => match verdict {
                Verdict::Pass => Severity::Success,
                Verdict::Fail => Severity::Error,
            },
            Notice::StorageRecovered => Severity::Warning,
            Notice::RecordsCleared => Severity::Info,
            Notice::NothingToExport => Severity::Info,
        }
    }

    /// Short toast title
    pub fn title(&self) -> String {
        match self {
            Notice::ValidationRejected { .. } => "Ошибка".to_string(),
            Notice::SerialAccepted { .. } => "Серийный номер принят".to_string(),
            Notice::PointSelected { .. } => "Точка поверки выбрана".to_string(),
            Notice::MeasurementAccepted { .. } => "Измерение добавлено".to_string(),
            Notice::RecordSaved { .. } => "Запись сохранена локально".to_string(),
            Notice::SaveFailed { .. } => "Ошибка сохранения".to_string(),
            Notice::Verdict { verdict, .. } => format!("Результат: {}", verdict),
            Notice::StorageRecovered => "Ошибка загрузки записей".to_string(),
            Notice::RecordsCleared => "Записи удалены".to_string(),
            Notice::NothingToExport => "Нет данных".to_string(),
        }
    }

    /// Toast body text
    pub fn message(&self) -> String {
        match self {
            Notice::ValidationRejected { reason } => reason.clone(),
            Notice::SerialAccepted { serial_number } => format!("S/N: {}", serial_number),
            Notice::PointSelected { label } => format!("Точка: {}", label),
            Notice::MeasurementAccepted { collected, needed } => {
                format!("Измерение {}/{} принято.", collected, needed)
            }
            Notice::RecordSaved {
                serial_number,
                point_label,
            } => format!(
                "Данные для S/N {} по точке {} сохранены.",
                serial_number, point_label
            ),
            Notice::SaveFailed { .. } => "Не удалось сохранить запись локально.".to_string(),
            Notice::Verdict {
                serial_number,
                point_label,
                average,
                corrected_average,
                lower_limit,
                upper_limit,
                ..
            } => format!(
                "S/N {}, {}. Ср.изм: {:.2}, Скорр.ср: {:.2}°C. Пределы: {}-{}°C.",
                serial_number, point_label, average, corrected_average, lower_limit, upper_limit
            ),
            Notice::StorageRecovered => "Не удалось прочитать сохраненные данные.".to_string(),
            Notice::RecordsCleared => "Все локальные записи были стерты.".to_string(),
            Notice::NothingToExport => "Нет записей для скачивания.".to_string(),
        }
    }
}

/// Snapshot of hub state for CLI reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeSnapshot {
    pub recent: Vec<Notice>,
    pub total_notices: u64,
}

/// Broadcast-based hub retaining a bounded history of notices.
///
/// Cheap to clone; clones share the same channel and history.
#[derive(Clone)]
pub struct NotificationHub {
    inner: std::sync::Arc<HubInner>,
}

struct HubInner {
    tx: broadcast::Sender<Notice>,
    history: Mutex<VecDeque<Notice>>,
    history_capacity: usize,
    total_notices: AtomicU64,
}

impl NotificationHub {
    pub fn new(buffer: usize, history_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self {
            inner: std::sync::Arc::new(HubInner {
                tx,
                history: Mutex::new(VecDeque::with_capacity(history_capacity)),
                history_capacity,
                total_notices: AtomicU64::new(0),
            }),
        }
    }

    /// Publish a notice to subscribers and the history buffer.
    pub fn publish(&self, notice: Notice) {
        self.inner.total_notices.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut history) = self.inner.history.lock() {
            if history.len() == self.inner.history_capacity {
                history.pop_front();
            }
            history.push_back(notice.clone());
        }
        // Fire-and-forget: no subscriber is not an error
        let _ = self.inner.tx.send(notice);
    }

    /// Subscribe to live notices.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.inner.tx.subscribe()
    }

    /// Subscribe as an async stream.
    pub fn subscribe_stream(&self) -> BroadcastStream<Notice> {
        BroadcastStream::new(self.inner.tx.subscribe())
    }

    /// Snapshot the retained history.
    pub fn snapshot(&self) -> NoticeSnapshot {
        let recent = self
            .inner
            .history
            .lock()
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default();
        NoticeSnapshot {
            recent,
            total_notices: self.inner.total_notices.load(Ordering::Relaxed),
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(128, 64)
    }
}

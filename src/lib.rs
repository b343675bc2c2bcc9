pub mod activity_store;
pub mod aggregation;
pub mod clock;
pub mod config;
pub mod errors;
pub mod models;
pub mod notification_store;
pub mod reminder;
pub mod samples;
pub mod tracker;

pub use crate::activity_store::{ActivitySnapshot, ActivityStore};
pub use crate::aggregation::aggregate;
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::TrackerSettings;
pub use crate::errors::{AppError, AppResult};
pub use crate::notification_store::{NotificationSnapshot, NotificationStore};
pub use crate::reminder::{ReminderScheduler, ReminderState};
pub use crate::tracker::CarbonTracker;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn init_tracing(log_dir: &Path, level: &str) -> AppResult<()> {
    let log_dir = log_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "tracker.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))?;

    let _ = LOG_GUARD.set(guard);
    Ok(())
}

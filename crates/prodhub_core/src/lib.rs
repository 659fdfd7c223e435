//! Core logic for the Productivity Hub: capture log, task list and
//! work/break timer.
//! This crate is the single source of truth for list invariants.

pub mod capture;
pub mod config;
pub mod db;
pub mod logging;
pub mod message;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod timer;

pub use capture::page_agent::{CaptureTrigger, PageCaptureAgent, PageContext, TriggerOutcome};
pub use capture::poller::{
    spawn_poller, ClipboardPoller, ClipboardProbe, ClipboardSample, PageClipboard, PollOutcome,
    PollerHandle, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};
pub use capture::{CaptureCandidate, CaptureError, CaptureSink};
pub use config::{ConfigError, HubConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use message::{decode_request, encode_response, Request, Response, ServiceError};
pub use model::capture::{CaptureEntry, EntryId};
pub use model::task::{Priority, Task, TaskFilter, TaskId, TaskValidationError};
pub use notify::{LogNotifier, Notifier, NotifyError, NOTIFICATION_TITLE};
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use service::background::{BackgroundHandle, BackgroundService, DEFAULT_CHANNEL_CAPACITY};
pub use service::capture_log::{CaptureLogStore, CAPTURE_LOG_CAPACITY};
pub use service::store_error::{StoreError, StoreResult};
pub use service::task_list::TaskListStore;
pub use timer::{
    spawn_timer, Phase, PomodoroTimer, TickOutcome, TimerHandle, TimerSettings, TimerStatus,
    MIN_TICK_UNIT,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

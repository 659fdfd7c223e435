//! User notification delivery.
//!
//! Notifications are best-effort: callers log failures and move on.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Title attached to every notification.
pub const NOTIFICATION_TITLE: &str = "Productivity Hub";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The user has not granted notification permission.
    PermissionDenied,
    /// Delivery channel is gone or refused the message.
    Unavailable(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "notification permission denied"),
            Self::Unavailable(reason) => write!(f, "notification channel unavailable: {reason}"),
        }
    }
}

impl Error for NotifyError {}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        (**self).notify(message)
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        (**self).notify(message)
    }
}

/// Writes notifications to the log; used when no desktop channel exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        info!(
            "event=notification module=notify status=ok title=\"{NOTIFICATION_TITLE}\" message_len={}",
            message.len()
        );
        Ok(())
    }
}

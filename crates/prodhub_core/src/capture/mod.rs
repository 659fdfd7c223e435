//! Capture sources: page-level trigger handling and the clipboard poller.
//!
//! # Responsibility
//! - Turn copy triggers and clipboard samples into capture candidates.
//! - Forward candidates to a [`CaptureSink`] without blocking the caller.
//!
//! # Invariants
//! - Read failures (permission denied, missing page) are swallowed and logged.
//! - Sources never dedup against the log; the store owns dedup.

use crate::repo::kv_repo::KvRepository;
use crate::service::capture_log::CaptureLogStore;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

pub mod page_agent;
pub mod poller;

/// Capture-path failure. Never surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Clipboard or selection access was refused.
    PermissionDenied,
    /// No readable page or clipboard right now.
    Unavailable(String),
    /// The candidate could not be handed to the store.
    SinkRejected(String),
}

impl Display for CaptureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "clipboard access denied"),
            Self::Unavailable(reason) => write!(f, "capture source unavailable: {reason}"),
            Self::SinkRejected(reason) => write!(f, "capture sink rejected candidate: {reason}"),
        }
    }
}

impl Error for CaptureError {}

/// Candidate snippet with the page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureCandidate {
    pub content: String,
    pub url: String,
    pub title: String,
}

/// Destination for capture candidates.
///
/// Implementations must not block for long; capture runs on the user's
/// interaction path.
pub trait CaptureSink {
    fn submit(&self, candidate: CaptureCandidate) -> Result<(), CaptureError>;
}

impl<S: CaptureSink + ?Sized> CaptureSink for &S {
    fn submit(&self, candidate: CaptureCandidate) -> Result<(), CaptureError> {
        (**self).submit(candidate)
    }
}

impl<S: CaptureSink + ?Sized> CaptureSink for Arc<S> {
    fn submit(&self, candidate: CaptureCandidate) -> Result<(), CaptureError> {
        (**self).submit(candidate)
    }
}

/// In-process sink for single-context setups without the background actor.
impl<R: KvRepository> CaptureSink for Mutex<CaptureLogStore<R>> {
    fn submit(&self, candidate: CaptureCandidate) -> Result<(), CaptureError> {
        let mut store = self
            .lock()
            .map_err(|_| CaptureError::SinkRejected("capture log lock poisoned".to_string()))?;
        store
            .submit(&candidate.content, &candidate.url, &candidate.title)
            .map(|_| ())
            .map_err(|err| CaptureError::SinkRejected(err.to_string()))
    }
}

//! Periodic clipboard poller.
//!
//! Fallback for pages where event capture is unavailable: every tick samples
//! the clipboard and forwards content the poller has not seen before.

use super::page_agent::PageContext;
use super::{CaptureCandidate, CaptureError, CaptureSink};
use crate::model::capture::normalize_content;
use log::{debug, info};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default tick interval of the background poller.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Shortest accepted tick interval; shorter requests are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Clipboard text together with the active page it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSample {
    pub text: String,
    pub url: String,
    pub title: String,
}

/// Source of clipboard samples.
///
/// `Ok(None)` means there is no active page or nothing readable.
pub trait ClipboardProbe {
    fn sample(&self) -> Result<Option<ClipboardSample>, CaptureError>;
}

/// Adapts a page context so the poller can sample it from inside the page.
pub struct PageClipboard<P: PageContext>(pub P);

impl<P: PageContext> ClipboardProbe for PageClipboard<P> {
    fn sample(&self) -> Result<Option<ClipboardSample>, CaptureError> {
        let text = self.0.read_clipboard()?;
        Ok(Some(ClipboardSample {
            text,
            url: self.0.url(),
            title: self.0.title(),
        }))
    }
}

/// Result of one poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Submitted,
    Unchanged,
    Empty,
    /// Read failed; the tick was skipped.
    Skipped,
    /// New content was seen but the sink refused it.
    Dropped,
}

/// Poller state: the last clipboard value it observed.
#[derive(Debug, Default)]
pub struct ClipboardPoller {
    last_observed: Option<String>,
}

impl ClipboardPoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_observed(&self) -> Option<&str> {
        self.last_observed.as_deref()
    }

    /// Runs one tick against `probe`, forwarding new content to `sink`.
    pub fn poll_once(
        &mut self,
        probe: &impl ClipboardProbe,
        sink: &impl CaptureSink,
    ) -> PollOutcome {
        let sample = match probe.sample() {
            Ok(Some(sample)) => sample,
            Ok(None) => return PollOutcome::Empty,
            Err(err) => {
                debug!("event=clipboard_poll module=capture status=skipped error={err}");
                return PollOutcome::Skipped;
            }
        };
        let Some(text) = normalize_content(&sample.text) else {
            return PollOutcome::Empty;
        };
        if self.last_observed.as_deref() == Some(text.as_str()) {
            return PollOutcome::Unchanged;
        }

        self.last_observed = Some(text.clone());
        let candidate = CaptureCandidate {
            content: text,
            url: sample.url,
            title: sample.title,
        };
        match sink.submit(candidate) {
            Ok(()) => PollOutcome::Submitted,
            Err(err) => {
                debug!("event=clipboard_poll module=capture status=dropped error={err}");
                PollOutcome::Dropped
            }
        }
    }
}

/// Running poller task. Dropping the handle leaves the task running.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Cancels future ticks. An in-flight tick is not interrupted mid-step.
    pub fn stop(self) {
        self.task.abort();
        info!("event=clipboard_poller module=capture status=stopped");
    }
}

/// Spawns the poller on the current tokio runtime.
pub fn spawn_poller<P, S>(interval: Duration, probe: P, sink: S) -> PollerHandle
where
    P: ClipboardProbe + Send + 'static,
    S: CaptureSink + Send + 'static,
{
    let interval = interval.max(MIN_POLL_INTERVAL);
    info!(
        "event=clipboard_poller module=capture status=start interval_ms={}",
        interval.as_millis()
    );
    let task = tokio::spawn(async move {
        let mut poller = ClipboardPoller::new();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            poller.poll_once(&probe, &sink);
        }
    });
    PollerHandle { task }
}

//! Page capture agent.
//!
//! One agent runs per page context. It reacts to copy triggers by reading the
//! selection (or clipboard) and forwarding a candidate with the page address
//! and title.

use super::{CaptureCandidate, CaptureError, CaptureSink};
use crate::message::{Request, Response, ServiceError};
use crate::model::capture::normalize_content;
use log::debug;

/// Read access to one page's selection, clipboard and identity.
pub trait PageContext {
    fn selected_text(&self) -> Result<String, CaptureError>;
    fn read_clipboard(&self) -> Result<String, CaptureError>;
    fn url(&self) -> String;
    fn title(&self) -> String;
}

/// User action observed in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTrigger {
    /// Native copy event.
    Copy,
    /// Ctrl+C / Cmd+C, delivered after the copy settled.
    KeyboardShortcut,
    /// Copy chosen from the context menu, delivered after the copy settled.
    ContextMenuCopy,
    /// Script wrote this text to the clipboard.
    ProgrammaticWrite(String),
    /// Selection changed; remembered but not submitted.
    SelectionChange,
    /// Text selected inside an input or textarea; remembered only.
    InputSelection(String),
}

/// What the agent did with a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Submitted,
    /// Nothing to capture (blank text, mismatch, or remember-only trigger).
    Ignored,
    MonitoringDisabled,
    /// Reading or forwarding failed; swallowed.
    Failed,
}

/// Capture agent for one page context.
pub struct PageCaptureAgent<P: PageContext, S: CaptureSink> {
    page: P,
    sink: S,
    monitoring: bool,
    last_selected_text: String,
}

impl<P: PageContext, S: CaptureSink> PageCaptureAgent<P, S> {
    /// Creates an agent with monitoring enabled.
    pub fn new(page: P, sink: S) -> Self {
        Self {
            page,
            sink,
            monitoring: true,
            last_selected_text: String::new(),
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    pub fn set_monitoring(&mut self, enabled: bool) {
        self.monitoring = enabled;
    }

    /// Most recent non-blank selection observed by any trigger.
    pub fn last_selected_text(&self) -> &str {
        &self.last_selected_text
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Handles one trigger; failures never propagate.
    pub fn handle_trigger(&mut self, trigger: CaptureTrigger) -> TriggerOutcome {
        if !self.monitoring {
            return TriggerOutcome::MonitoringDisabled;
        }

        match trigger {
            CaptureTrigger::Copy | CaptureTrigger::KeyboardShortcut => {
                match self.read_selection() {
                    Ok(Some(text)) => self.forward(text),
                    Ok(None) => TriggerOutcome::Ignored,
                    Err(err) => self.swallow("selection", &err),
                }
            }
            CaptureTrigger::ContextMenuCopy => self.capture_context_menu_copy(),
            CaptureTrigger::ProgrammaticWrite(text) => match normalize_content(&text) {
                Some(text) => self.forward(text),
                None => TriggerOutcome::Ignored,
            },
            CaptureTrigger::SelectionChange => match self.read_selection() {
                Ok(_) => TriggerOutcome::Ignored,
                Err(err) => self.swallow("selection", &err),
            },
            CaptureTrigger::InputSelection(text) => {
                if let Some(text) = normalize_content(&text) {
                    self.last_selected_text = text;
                }
                TriggerOutcome::Ignored
            }
        }
    }

    /// Serves page-targeted requests (`getSelectedText`, `toggleMonitoring`).
    pub fn handle_message(&mut self, request: &Request) -> Result<Response, ServiceError> {
        match request {
            Request::GetSelectedText => {
                let selected_text = self
                    .page
                    .selected_text()
                    .map(|text| text.trim().to_string())
                    .unwrap_or_default();
                Ok(Response::SelectedText { selected_text })
            }
            Request::ToggleMonitoring { enabled } => {
                self.monitoring = *enabled;
                debug!("event=monitoring_toggle module=capture status=ok enabled={enabled}");
                Ok(Response::success(true))
            }
            other => Err(ServiceError::UnsupportedAction {
                action: other.action(),
                context: "page",
            }),
        }
    }

    fn capture_context_menu_copy(&mut self) -> TriggerOutcome {
        let selection = match self.read_selection() {
            Ok(Some(text)) => text,
            Ok(None) => return TriggerOutcome::Ignored,
            Err(err) => return self.swallow("selection", &err),
        };
        let clipboard = match self.page.read_clipboard() {
            Ok(text) => text,
            Err(err) => return self.swallow("clipboard", &err),
        };
        match normalize_content(&clipboard) {
            Some(text) if text == selection => self.forward(text),
            _ => TriggerOutcome::Ignored,
        }
    }

    fn read_selection(&mut self) -> Result<Option<String>, CaptureError> {
        let selection = normalize_content(&self.page.selected_text()?);
        if let Some(text) = &selection {
            self.last_selected_text.clone_from(text);
        }
        Ok(selection)
    }

    fn forward(&self, content: String) -> TriggerOutcome {
        let candidate = CaptureCandidate {
            content,
            url: self.page.url(),
            title: self.page.title(),
        };
        match self.sink.submit(candidate) {
            Ok(()) => TriggerOutcome::Submitted,
            Err(err) => self.swallow("sink", &err),
        }
    }

    fn swallow(&self, stage: &str, err: &CaptureError) -> TriggerOutcome {
        debug!("event=capture_trigger module=capture status=skipped stage={stage} error={err}");
        TriggerOutcome::Failed
    }
}

//! Background service actor.
//!
//! # Responsibility
//! - Own the capture log and serve the message protocol.
//! - Process one request at a time on a dedicated worker thread.
//!
//! # Invariants
//! - Only the worker thread touches the capture log after `spawn`.
//! - Posting never blocks the sender; a full or closed queue drops the post.

use crate::capture::{CaptureCandidate, CaptureError, CaptureSink};
use crate::message::{Request, Response, ServiceError};
use crate::notify::{Notifier, NotifyError};
use crate::repo::kv_repo::KvRepository;
use crate::service::capture_log::CaptureLogStore;
use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};

/// Queue depth between callers and the worker.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

type Reply = oneshot::Sender<Result<Response, ServiceError>>;

struct Envelope {
    request: Request,
    reply: Option<Reply>,
}

/// Background context: capture log owner plus notification delivery.
pub struct BackgroundService<R: KvRepository, N: Notifier> {
    capture: CaptureLogStore<R>,
    notifier: N,
}

impl<R: KvRepository, N: Notifier> BackgroundService<R, N> {
    pub fn new(capture: CaptureLogStore<R>, notifier: N) -> Self {
        Self { capture, notifier }
    }

    pub fn capture(&self) -> &CaptureLogStore<R> {
        &self.capture
    }

    /// Serves one request synchronously.
    ///
    /// Storage failures are reported as `success: false`, matching the
    /// extension's response shape.
    pub fn handle(&mut self, request: Request) -> Result<Response, ServiceError> {
        let action = request.action();
        debug!("event=message_received module=background action={action}");
        let response = match request {
            Request::GetClipboardData => Response::Items {
                items: self.capture.entries().to_vec(),
            },
            Request::AddClipboardItem {
                content,
                url,
                title,
            } => Response::success(report(
                action,
                self.capture.submit(&content, &url, &title),
            )),
            Request::ClearClipboard => {
                Response::success(report(action, self.capture.clear()))
            }
            Request::ShowNotification { message } => {
                Response::success(report(action, self.notifier.notify(&message)))
            }
            Request::GetSelectedText | Request::ToggleMonitoring { .. } => {
                return Err(ServiceError::UnsupportedAction {
                    action,
                    context: "background",
                });
            }
        };
        Ok(response)
    }
}

fn report<T, E: std::fmt::Display>(action: &str, result: Result<T, E>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            warn!("event=message_failed module=background action={action} error={err}");
            false
        }
    }
}

impl<R, N> BackgroundService<R, N>
where
    R: KvRepository + Send + 'static,
    N: Notifier + 'static,
{
    /// Moves the service onto a worker thread and returns a caller handle.
    ///
    /// The worker exits once every handle is dropped.
    pub fn spawn(self, capacity: usize) -> Result<BackgroundHandle, ServiceError> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        std::thread::Builder::new()
            .name("prodhub-background".to_string())
            .spawn(move || self.run(rx))
            .map_err(ServiceError::Spawn)?;
        info!("event=background_start module=background status=ok capacity={capacity}");
        Ok(BackgroundHandle { tx })
    }

    fn run(mut self, mut rx: mpsc::Receiver<Envelope>) {
        while let Some(envelope) = rx.blocking_recv() {
            let result = self.handle(envelope.request);
            if let Some(reply) = envelope.reply {
                // Caller may have given up waiting.
                let _ = reply.send(result);
            }
        }
        info!("event=background_stop module=background status=ok");
    }
}

/// Cloneable sender side of the background service.
#[derive(Clone)]
pub struct BackgroundHandle {
    tx: mpsc::Sender<Envelope>,
}

impl BackgroundHandle {
    /// Sends a request and waits for its response.
    pub async fn request(&self, request: Request) -> Result<Response, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Envelope {
                request,
                reply: Some(reply),
            })
            .await
            .map_err(|_| ServiceError::Unavailable)?;
        response.await.map_err(|_| ServiceError::Unavailable)?
    }

    /// Queues a request without waiting; the response is discarded.
    pub fn post(&self, request: Request) -> Result<(), ServiceError> {
        self.tx
            .try_send(Envelope {
                request,
                reply: None,
            })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => ServiceError::Busy,
                mpsc::error::TrySendError::Closed(_) => ServiceError::Unavailable,
            })
    }
}

impl CaptureSink for BackgroundHandle {
    fn submit(&self, candidate: CaptureCandidate) -> Result<(), CaptureError> {
        self.post(Request::AddClipboardItem {
            content: candidate.content,
            url: candidate.url,
            title: candidate.title,
        })
        .map_err(|err| CaptureError::SinkRejected(err.to_string()))
    }
}

impl Notifier for BackgroundHandle {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.post(Request::ShowNotification {
            message: message.to_string(),
        })
        .map_err(|err| NotifyError::Unavailable(err.to_string()))
    }
}

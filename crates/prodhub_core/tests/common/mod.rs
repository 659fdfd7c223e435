#![allow(dead_code)]

use prodhub_core::db::open_db_in_memory;
use prodhub_core::{
    CaptureCandidate, CaptureError, CaptureSink, KvRepository, Notifier, NotifyError,
    PageContext, RepoError, RepoResult, SqliteKvRepository,
};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier, Mutex};

pub fn memory_repo() -> SqliteKvRepository {
    SqliteKvRepository::new(open_db_in_memory().unwrap())
}

/// Repository whose writes can be switched to fail.
pub struct FlakyRepo {
    inner: SqliteKvRepository,
    pub fail_writes: Arc<AtomicBool>,
}

impl FlakyRepo {
    pub fn new() -> Self {
        Self {
            inner: memory_repo(),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl KvRepository for FlakyRepo {
    fn get_value(&self, key: &str) -> RepoResult<Option<String>> {
        self.inner.get_value(key)
    }

    fn put_value(&self, key: &str, value: &str) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::InvalidData {
                key: key.to_string(),
                message: "disk full".to_string(),
            });
        }
        self.inner.put_value(key, value)
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub struct DeniedNotifier;

impl Notifier for DeniedNotifier {
    fn notify(&self, _message: &str) -> Result<(), NotifyError> {
        Err(NotifyError::PermissionDenied)
    }
}

/// Notifier that holds the caller until the test releases it.
#[derive(Clone)]
pub struct GatedNotifier {
    pub entered: Arc<Barrier>,
    pub release: Arc<Barrier>,
}

impl GatedNotifier {
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Barrier::new(2)),
            release: Arc::new(Barrier::new(2)),
        }
    }
}

impl Notifier for GatedNotifier {
    fn notify(&self, _message: &str) -> Result<(), NotifyError> {
        self.entered.wait();
        self.release.wait();
        Ok(())
    }
}

/// Notifier that takes down the thread calling it.
pub struct PanickingNotifier;

impl Notifier for PanickingNotifier {
    fn notify(&self, _message: &str) -> Result<(), NotifyError> {
        panic!("notifier crashed");
    }
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    candidates: Arc<Mutex<Vec<CaptureCandidate>>>,
}

impl RecordingSink {
    pub fn candidates(&self) -> Vec<CaptureCandidate> {
        self.candidates.lock().unwrap().clone()
    }

    pub fn contents(&self) -> Vec<String> {
        self.candidates()
            .into_iter()
            .map(|candidate| candidate.content)
            .collect()
    }
}

impl CaptureSink for RecordingSink {
    fn submit(&self, candidate: CaptureCandidate) -> Result<(), CaptureError> {
        self.candidates.lock().unwrap().push(candidate);
        Ok(())
    }
}

/// Page with scripted selection and clipboard contents.
pub struct FakePage {
    pub url: String,
    pub title: String,
    pub selection: RefCell<Result<String, CaptureError>>,
    pub clipboard: RefCell<Result<String, CaptureError>>,
}

impl FakePage {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            selection: RefCell::new(Ok(String::new())),
            clipboard: RefCell::new(Err(CaptureError::PermissionDenied)),
        }
    }

    pub fn select(&self, text: &str) {
        *self.selection.borrow_mut() = Ok(text.to_string());
    }

    pub fn set_clipboard(&self, result: Result<&str, CaptureError>) {
        *self.clipboard.borrow_mut() = result.map(str::to_string);
    }
}

impl PageContext for FakePage {
    fn selected_text(&self) -> Result<String, CaptureError> {
        self.selection.borrow().clone()
    }

    fn read_clipboard(&self) -> Result<String, CaptureError> {
        self.clipboard.borrow().clone()
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}

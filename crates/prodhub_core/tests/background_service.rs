mod common;

use common::{
    memory_repo, DeniedNotifier, FakePage, FlakyRepo, GatedNotifier, PanickingNotifier,
    RecordingNotifier,
};
use prodhub_core::{
    decode_request, encode_response, BackgroundService, CaptureCandidate, CaptureError,
    CaptureLogStore, CaptureSink, CaptureTrigger, Notifier, NotifyError, PageCaptureAgent,
    PomodoroTimer, Request, Response, ServiceError, TimerSettings, TriggerOutcome,
    DEFAULT_CHANNEL_CAPACITY,
};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

fn add(content: &str, url: &str) -> Request {
    Request::AddClipboardItem {
        content: content.to_string(),
        url: url.to_string(),
        title: "Title".to_string(),
    }
}

fn items(response: Response) -> Vec<String> {
    match response {
        Response::Items { items } => items.into_iter().map(|item| item.content).collect(),
        other => panic!("expected items, got {other:?}"),
    }
}

#[test]
fn handle_serves_clipboard_actions() {
    let store = CaptureLogStore::load(memory_repo()).unwrap();
    let mut service = BackgroundService::new(store, RecordingNotifier::default());

    assert_eq!(
        service.handle(add("hello world", "https://a.com")).unwrap(),
        Response::success(true)
    );
    // Duplicates are processed without error.
    assert_eq!(
        service.handle(add("hello world", "https://a.com")).unwrap(),
        Response::success(true)
    );
    assert_eq!(
        items(service.handle(Request::GetClipboardData).unwrap()),
        vec!["hello world"]
    );

    assert_eq!(
        service.handle(Request::ClearClipboard).unwrap(),
        Response::success(true)
    );
    assert!(service.capture().is_empty());
}

#[test]
fn handle_reports_storage_failure_as_unsuccessful() {
    let repo = FlakyRepo::new();
    let fail_writes = repo.fail_writes.clone();
    let store = CaptureLogStore::load(repo).unwrap();
    let mut service = BackgroundService::new(store, RecordingNotifier::default());

    fail_writes.store(true, Ordering::SeqCst);
    assert_eq!(
        service.handle(add("text", "")).unwrap(),
        Response::success(false)
    );
    assert!(service.capture().is_empty());
}

#[test]
fn show_notification_uses_notifier() {
    let notifier = RecordingNotifier::default();
    let store = CaptureLogStore::load(memory_repo()).unwrap();
    let mut service = BackgroundService::new(store, notifier.clone());

    let response = service
        .handle(Request::ShowNotification {
            message: "Break completed! Time to work.".to_string(),
        })
        .unwrap();
    assert_eq!(response, Response::success(true));
    assert_eq!(notifier.messages(), vec!["Break completed! Time to work."]);

    let store = CaptureLogStore::load(memory_repo()).unwrap();
    let mut denied = BackgroundService::new(store, DeniedNotifier);
    let response = denied
        .handle(Request::ShowNotification {
            message: "hi".to_string(),
        })
        .unwrap();
    assert_eq!(response, Response::success(false));
}

#[test]
fn page_actions_are_unsupported_in_background() {
    let store = CaptureLogStore::load(memory_repo()).unwrap();
    let mut service = BackgroundService::new(store, RecordingNotifier::default());

    let err = service.handle(Request::GetSelectedText).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::UnsupportedAction {
            action: "getSelectedText",
            context: "background"
        }
    ));
}

#[test]
fn wire_messages_round_trip_through_handle() {
    let store = CaptureLogStore::load(memory_repo()).unwrap();
    let mut service = BackgroundService::new(store, RecordingNotifier::default());

    let request = decode_request(
        r#"{"action":"addClipboardItem","content":"hello","url":"https://a.com","title":"A"}"#,
    )
    .unwrap();
    let reply = encode_response(&service.handle(request).unwrap()).unwrap();
    assert_eq!(reply, r#"{"success":true}"#);

    let request = decode_request(r#"{"action":"getClipboardData"}"#).unwrap();
    let reply = encode_response(&service.handle(request).unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(value["items"][0]["content"], "hello");
    assert_eq!(value["items"][0]["url"], "https://a.com");
    assert_eq!(value["items"][0]["title"], "A");
    assert!(value["items"][0]["timestamp"].is_string());
}

#[tokio::test]
async fn spawned_service_answers_requests_in_order() {
    let store = CaptureLogStore::load(memory_repo()).unwrap();
    let handle = BackgroundService::new(store, RecordingNotifier::default())
        .spawn(DEFAULT_CHANNEL_CAPACITY)
        .unwrap();

    for content in ["one", "two", "three"] {
        handle.request(add(content, "https://a.com")).await.unwrap();
    }
    handle.request(add("two", "https://a.com")).await.unwrap();

    let contents = items(handle.request(Request::GetClipboardData).await.unwrap());
    assert_eq!(contents, vec!["three", "two", "one"]);
}

#[tokio::test]
async fn page_agent_and_timer_post_through_handle() {
    let notifier = RecordingNotifier::default();
    let store = CaptureLogStore::load(memory_repo()).unwrap();
    let handle = BackgroundService::new(store, notifier.clone())
        .spawn(DEFAULT_CHANNEL_CAPACITY)
        .unwrap();

    let page = FakePage::new("https://a.com", "A");
    page.select("captured via agent");
    let mut agent = PageCaptureAgent::new(page, handle.clone());
    assert_eq!(agent.handle_trigger(CaptureTrigger::Copy), TriggerOutcome::Submitted);
    assert_eq!(
        agent.handle_trigger(CaptureTrigger::KeyboardShortcut),
        TriggerOutcome::Submitted
    );

    let settings = TimerSettings {
        work_secs: 1,
        break_secs: 1,
        auto_start_next_phase: false,
    };
    let mut timer = PomodoroTimer::new(settings, handle.clone());
    timer.start();
    timer.tick();

    // Requests are served in order, so earlier posts are visible here.
    let contents = items(handle.request(Request::GetClipboardData).await.unwrap());
    assert_eq!(contents, vec!["captured via agent"]);
    assert_eq!(
        notifier.messages(),
        vec!["Work session completed! Take a break."]
    );
}

#[test]
fn posts_to_a_full_queue_are_dropped_as_busy() {
    let gate = GatedNotifier::new();
    let store = CaptureLogStore::load(memory_repo()).unwrap();
    let handle = BackgroundService::new(store, gate.clone()).spawn(1).unwrap();

    handle
        .post(Request::ShowNotification {
            message: "hold".to_string(),
        })
        .unwrap();
    // Worker is now parked inside the notifier with an empty queue.
    gate.entered.wait();

    handle.post(Request::GetClipboardData).unwrap();
    assert!(matches!(
        handle.post(Request::GetClipboardData),
        Err(ServiceError::Busy)
    ));
    let candidate = CaptureCandidate {
        content: "dropped".to_string(),
        url: String::new(),
        title: String::new(),
    };
    assert!(matches!(
        handle.submit(candidate),
        Err(CaptureError::SinkRejected(_))
    ));
    assert!(matches!(
        handle.notify("dropped"),
        Err(NotifyError::Unavailable(_))
    ));

    gate.release.wait();
}

#[test]
fn posts_after_worker_exit_report_unavailable() {
    let store = CaptureLogStore::load(memory_repo()).unwrap();
    let handle = BackgroundService::new(store, PanickingNotifier)
        .spawn(DEFAULT_CHANNEL_CAPACITY)
        .unwrap();

    handle
        .post(Request::ShowNotification {
            message: "crash".to_string(),
        })
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match handle.post(Request::GetClipboardData) {
            Err(ServiceError::Unavailable) => break,
            Ok(()) | Err(ServiceError::Busy) => {
                assert!(Instant::now() < deadline, "worker never exited");
                std::thread::sleep(Duration::from_millis(2));
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}

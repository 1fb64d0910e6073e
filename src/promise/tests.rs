use crate::base::neterror::{FailureCause, NetError};
use crate::base::state::PromiseState;
use crate::promise::{promise, Callbacks, CompletionFuture, CompletionHandler};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every callback it receives.
#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
    tag: &'static str,
}

impl Recorder {
    fn tagged(events: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Self {
        Self { events: events.clone(), tag }
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl CompletionHandler<String> for Recorder {
    fn completed(&mut self, value: &String) {
        self.events.lock().unwrap().push(format!("{}:completed:{}", self.tag, value));
    }

    fn failed(&mut self, cause: &FailureCause) {
        self.events.lock().unwrap().push(format!("{}:failed:{}", self.tag, cause));
    }

    fn cancelled(&mut self, force: bool) {
        self.events.lock().unwrap().push(format!("{}:cancelled:{}", self.tag, force));
    }
}

fn bad_doggie() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "Bad doggie!")
}

#[test]
fn test_handler_registered_after_resolve_fires_synchronously() {
    let (sink, future) = promise::<String>();
    sink.resolve("World!".to_string()).unwrap();

    let recorder = Recorder::default();
    future.on_complete(recorder.clone());
    // Already delivered by the time on_complete returned
    assert_eq!(recorder.events(), vec![":completed:World!"]);
}

#[test]
fn test_pending_handlers_fire_in_registration_order() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let (sink, future) = promise::<String>();
    future.on_complete(Recorder::tagged(&events, "a"));
    future.on_complete(Recorder::tagged(&events, "b"));
    future.on_complete(Recorder::tagged(&events, "c"));
    assert!(events.lock().unwrap().is_empty());

    sink.resolve("x".to_string()).unwrap();
    assert_eq!(*events.lock().unwrap(), vec!["a:completed:x", "b:completed:x", "c:completed:x"]);
}

#[test]
fn test_second_resolve_is_rejected() {
    let (sink, future) = promise::<String>();
    let recorder = Recorder::default();
    future.on_complete(recorder.clone());

    assert!(sink.resolve("first".to_string()).is_ok());
    assert_eq!(sink.resolve("second".to_string()), Err(NetError::AlreadyCompleted));
    assert_eq!(sink.fail(bad_doggie()), Err(NetError::AlreadyCompleted));
    assert_eq!(sink.cancel(true), Err(NetError::AlreadyCompleted));

    assert_eq!(recorder.events(), vec![":completed:first"]);
    assert_eq!(future.try_result(), Some(Ok("first".to_string())));
}

#[test]
fn test_failure_fans_out_same_cause() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let (sink, future) = promise::<String>();
    future.on_complete(Recorder::tagged(&events, "a"));
    future.on_complete(Recorder::tagged(&events, "b"));

    let cause: FailureCause = Arc::new(bad_doggie());
    sink.fail_with(cause.clone()).unwrap();

    assert_eq!(*events.lock().unwrap(), vec!["a:failed:Bad doggie!", "b:failed:Bad doggie!"]);
    let err = future.wait_timeout(Duration::ZERO).unwrap_err();
    assert!(Arc::ptr_eq(err.cause().unwrap(), &cause));
    assert_eq!(future.state(), PromiseState::Failed);
}

#[test]
fn test_cancel_wins_over_later_resolve() {
    let (sink, future) = promise::<String>();
    future.cancel(true).unwrap();
    assert!(future.is_cancelled());
    assert_eq!(sink.resolve("late".to_string()), Err(NetError::AlreadyCompleted));
    assert_eq!(future.wait(), Err(NetError::Cancelled { force: true }));
}

#[test]
fn test_resolved_future_cannot_be_cancelled() {
    let (sink, future) = promise::<String>();
    sink.resolve("done".to_string()).unwrap();
    assert_eq!(future.cancel(false), Err(NetError::AlreadyCompleted));
    assert_eq!(future.state(), PromiseState::Resolved);
}

#[test]
fn test_zero_timeout_leaves_promise_pending() {
    let (sink, future) = promise::<String>();
    assert_eq!(future.wait_timeout(Duration::ZERO), Err(NetError::TimedOut));
    assert_eq!(future.state(), PromiseState::Pending);

    let recorder = Recorder::default();
    future.on_complete(recorder.clone());
    assert!(sink.resolve("x".to_string()).is_ok());
    assert_eq!(recorder.events(), vec![":completed:x"]);
}

#[test]
fn test_dropped_sink_cancels() {
    let (sink, future) = promise::<String>();
    let recorder = Recorder::default();
    future.on_complete(recorder.clone());
    drop(sink);
    assert_eq!(recorder.events(), vec![":cancelled:false"]);
    assert_eq!(future.wait(), Err(NetError::Cancelled { force: false }));
}

#[test]
fn test_dropped_sink_after_resolve_keeps_value() {
    let (sink, future) = promise::<String>();
    sink.resolve("kept".to_string()).unwrap();
    drop(sink);
    assert_eq!(future.wait(), Ok("kept".to_string()));
}

#[test]
fn test_handler_may_register_from_within_dispatch() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let (sink, future) = promise::<String>();

    let inner_future = future.clone();
    let inner_events = events.clone();
    future.on_complete(Callbacks::new().on_completed(move |v: &String| {
        inner_events.lock().unwrap().push(format!("outer:{v}"));
        inner_future.on_complete(Recorder::tagged(&inner_events, "inner"));
    }));

    sink.resolve("v".to_string()).unwrap();
    assert_eq!(*events.lock().unwrap(), vec!["outer:v", "inner:completed:v"]);
}

#[test]
fn test_map_passes_value_and_failure() {
    let (sink, future) = promise::<String>();
    let len = future.map(|s: &String| s.len());
    sink.resolve("Hello".to_string()).unwrap();
    assert_eq!(len.wait(), Ok(5));

    let (sink, future) = promise::<String>();
    let len = future.map(|s: &String| s.len());
    sink.fail(bad_doggie()).unwrap();
    assert!(matches!(len.wait(), Err(NetError::UpstreamFailure(_))));
}

#[test]
fn test_ready_constructors() {
    let future = CompletionFuture::resolved(7u8);
    assert!(future.is_done());
    assert_eq!(future.wait_timeout(Duration::ZERO), Ok(7));

    let failed: CompletionFuture<u8> = CompletionFuture::failed(Arc::new(bad_doggie()));
    assert_eq!(failed.state(), PromiseState::Failed);
}

#[test]
fn test_blocking_wait_across_threads() {
    let (sink, future) = promise::<String>();
    let producer = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        sink.resolve("Hello World!".to_string())
    });
    assert_eq!(future.wait_timeout(Duration::from_secs(5)), Ok("Hello World!".to_string()));
    assert!(producer.join().unwrap().is_ok());
}

#[tokio::test]
async fn test_async_wait() {
    let (sink, future) = promise::<String>();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let _ = sink.resolve("async".to_string());
    });
    assert_eq!(future.wait_async(Duration::from_secs(5)).await, Ok("async".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_async_wait_times_out() {
    let (sink, future) = promise::<String>();
    assert_eq!(future.wait_async(Duration::from_millis(50)).await, Err(NetError::TimedOut));
    assert!(!future.is_done());
    sink.resolve("later".to_string()).unwrap();
    assert_eq!(future.wait_async(Duration::from_millis(50)).await, Ok("later".to_string()));
}

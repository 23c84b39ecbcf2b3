//! Publish/subscribe fan-out for run events.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::result::{
    ParsedResult, TestConfiguration, TestCount, TestResult, TestResultKind, TestResultSummary,
    TestRuntime, TestVersion, TimeAndMemory,
};
use crate::runner::events::{Event, EventKind};

/// An object interested in some subset of run events.
///
/// Every method defaults to a no-op; implement the ones you care about.
/// Methods take `&self`, so observers that record state need interior
/// mutability.
pub trait TestRunnerObserver: Send + Sync {
    fn run(&self, _command: &str) {}
    fn line(&self, _line: &str) {}
    fn result(&self, _result: &ParsedResult) {}
    fn output(&self, _output: &str) {}
    fn error(&self, _error: &str) {}
    fn close(&self, _code: Option<i32>) {}

    fn test_suite_started(&self, _result: &TestResult) {}
    fn test_suite_finished(&self, _result: &TestResult) {}
    fn test_started(&self, _result: &TestResult) {}
    fn test_finished(&self, _result: &TestResult) {}
    fn test_failed(&self, _result: &TestResult) {}
    fn test_ignored(&self, _result: &TestResult) {}

    fn test_version(&self, _result: &TestVersion) {}
    fn test_runtime(&self, _result: &TestRuntime) {}
    fn test_configuration(&self, _result: &TestConfiguration) {}
    fn test_count(&self, _result: &TestCount) {}
    fn test_result_summary(&self, _result: &TestResultSummary) {}
    fn time_and_memory(&self, _result: &TimeAndMemory) {}
}

impl Event<'_> {
    /// Call the observer method matching this event.
    pub fn deliver(&self, observer: &dyn TestRunnerObserver) {
        match *self {
            Event::Run(command) => observer.run(command),
            Event::Line(line) => observer.line(line),
            Event::Result(result) => observer.result(result),
            Event::Output(output) => observer.output(output),
            Event::Error(error) => observer.error(error),
            Event::Close(code) => observer.close(code),
            Event::Test(result) => match result.kind {
                TestResultKind::TestSuiteStarted => observer.test_suite_started(result),
                TestResultKind::TestSuiteFinished => observer.test_suite_finished(result),
                TestResultKind::TestStarted => observer.test_started(result),
                TestResultKind::TestFinished => observer.test_finished(result),
                TestResultKind::TestFailed => observer.test_failed(result),
                TestResultKind::TestIgnored => observer.test_ignored(result),
            },
            Event::Version(r) => observer.test_version(r),
            Event::Runtime(r) => observer.test_runtime(r),
            Event::Configuration(r) => observer.test_configuration(r),
            Event::Count(r) => observer.test_count(r),
            Event::Summary(r) => observer.test_result_summary(r),
            Event::TimeAndMemory(r) => observer.time_and_memory(r),
        }
    }
}

type Handler = Box<dyn Fn(&Event<'_>) + Send + Sync>;

/// Ordered subscriber lists keyed by event kind.
///
/// Structural observers and single-event handlers share the same lists, so
/// delivery order is registration order across both.
#[derive(Default)]
pub struct ObserverRegistry {
    subscribers: HashMap<EventKind, Vec<Handler>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer to every event kind.
    pub fn observe(&mut self, observer: Arc<dyn TestRunnerObserver>) {
        for kind in EventKind::ALL {
            let observer = Arc::clone(&observer);
            self.subscribe(
                kind,
                Box::new(move |event: &Event<'_>| event.deliver(observer.as_ref())),
            );
        }
    }

    /// Subscribe a handler to one event kind.
    pub fn on<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        self.subscribe(kind, Box::new(handler));
    }

    /// Deliver an event to its kind's subscribers, in registration order.
    pub fn emit(&self, event: Event<'_>) {
        if let Some(handlers) = self.subscribers.get(&event.kind()) {
            for handler in handlers {
                handler(&event);
            }
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    fn subscribe(&mut self, kind: EventKind, handler: Handler) {
        self.subscribers.entry(kind).or_default().push(handler);
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .subscribers
            .iter()
            .map(|(kind, handlers)| (kind.as_str(), handlers.len()))
            .collect();
        f.debug_struct("ObserverRegistry")
            .field("subscribers", &counts)
            .finish()
    }
}

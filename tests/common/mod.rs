//! Shared test utilities: recording observers and a toy classifier.

#![allow(dead_code, unused_imports)]

pub mod fake_phpunit;

use parking_lot::Mutex;
use phpunit_driver::result::{ParsedResult, TestCount, TestResult, TestResultKind};
use phpunit_driver::runner::{Event, EventKind, TestRunner, TestRunnerObserver};
use std::sync::Arc;

pub use fake_phpunit::{FakePhpunit, BANNER};

/// Every event as `(kind, payload)`, in delivery order.
pub type EventLog = Arc<Mutex<Vec<(EventKind, String)>>>;

/// Subscribe to every event kind through `on` and log what arrives.
pub fn record_all(runner: &mut TestRunner) -> EventLog {
    let log: EventLog = Arc::default();
    for kind in EventKind::ALL {
        let log = Arc::clone(&log);
        runner.on(kind, move |event| log.lock().push((kind, describe(event))));
    }
    log
}

fn describe(event: &Event<'_>) -> String {
    match event {
        Event::Close(code) => format!("{code:?}"),
        Event::Test(result) => result.name.clone(),
        Event::Result(result) => serde_json::to_string(result).expect("Failed to serialize result"),
        other => other
            .as_text()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{other:?}")),
    }
}

pub fn kinds(log: &EventLog) -> Vec<EventKind> {
    log.lock().iter().map(|(kind, _)| *kind).collect()
}

pub fn payloads(log: &EventLog, kind: EventKind) -> Vec<String> {
    log.lock()
        .iter()
        .filter(|(k, _)| *k == kind)
        .map(|(_, payload)| payload.clone())
        .collect()
}

/// Structural observer keeping what a typical editor integration cares about.
#[derive(Default)]
pub struct RecordingObserver {
    pub started: Mutex<Vec<TestResult>>,
    pub failed: Mutex<Vec<TestResult>>,
    pub counts: Mutex<Vec<u32>>,
    pub closes: Mutex<Vec<Option<i32>>>,
}

impl TestRunnerObserver for RecordingObserver {
    fn test_started(&self, result: &TestResult) {
        self.started.lock().push(result.clone());
    }

    fn test_failed(&self, result: &TestResult) {
        self.failed.lock().push(result.clone());
    }

    fn test_count(&self, result: &TestCount) {
        self.counts.lock().push(result.count);
    }

    fn close(&self, code: Option<i32>) {
        self.closes.lock().push(code);
    }
}

/// Recognises just enough of `##teamcity[...]` to exercise dispatch.
pub fn teamcity_classifier(line: &str) -> Option<ParsedResult> {
    let body = line.strip_prefix("##teamcity[")?.strip_suffix(']')?;
    let (name, attrs) = body.split_once(' ').unwrap_or((body, ""));
    let attr = |key: &str| {
        let needle = format!("{key}='");
        let start = attrs.find(&needle)? + needle.len();
        let end = attrs[start..].find('\'')? + start;
        Some(attrs[start..end].to_string())
    };

    let kind = match name {
        "testSuiteStarted" => TestResultKind::TestSuiteStarted,
        "testSuiteFinished" => TestResultKind::TestSuiteFinished,
        "testStarted" => TestResultKind::TestStarted,
        "testFinished" => TestResultKind::TestFinished,
        "testFailed" => TestResultKind::TestFailed,
        "testIgnored" => TestResultKind::TestIgnored,
        "testCount" => {
            return Some(ParsedResult::Count(TestCount {
                count: attr("count")?.parse().ok()?,
                flow_id: None,
                text: line.to_string(),
            }))
        }
        _ => return None,
    };

    let mut result = TestResult::new(kind, attr("name").unwrap_or_default());
    result.location_hint = attr("locationHint");
    result.file = attr("file");
    result.message = attr("message");
    Some(result.into())
}

//! The closed set of events a test run publishes.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::result::{
    ParsedResult, TestConfiguration, TestCount, TestResult, TestResultKind, TestResultSummary,
    TestRuntime, TestVersion, TimeAndMemory,
};

/// Every event name observers can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Run,
    Line,
    Result,
    Output,
    Error,
    Close,
    TestSuiteStarted,
    TestSuiteFinished,
    TestStarted,
    TestFinished,
    TestFailed,
    TestIgnored,
    TestVersion,
    TestRuntime,
    TestConfiguration,
    TestCount,
    TestResultSummary,
    TimeAndMemory,
}

impl EventKind {
    pub const ALL: [EventKind; 18] = [
        Self::Run,
        Self::Line,
        Self::Result,
        Self::Output,
        Self::Error,
        Self::Close,
        Self::TestSuiteStarted,
        Self::TestSuiteFinished,
        Self::TestStarted,
        Self::TestFinished,
        Self::TestFailed,
        Self::TestIgnored,
        Self::TestVersion,
        Self::TestRuntime,
        Self::TestConfiguration,
        Self::TestCount,
        Self::TestResultSummary,
        Self::TimeAndMemory,
    ];

    /// Stable event name, as used by editor integrations.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Line => "line",
            Self::Result => "result",
            Self::Output => "output",
            Self::Error => "error",
            Self::Close => "close",
            Self::TestSuiteStarted => "testSuiteStarted",
            Self::TestSuiteFinished => "testSuiteFinished",
            Self::TestStarted => "testStarted",
            Self::TestFinished => "testFinished",
            Self::TestFailed => "testFailed",
            Self::TestIgnored => "testIgnored",
            Self::TestVersion => "testVersion",
            Self::TestRuntime => "testRuntime",
            Self::TestConfiguration => "testConfiguration",
            Self::TestCount => "testCount",
            Self::TestResultSummary => "testResultSummary",
            Self::TimeAndMemory => "timeAndMemory",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event name outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event '{0}'")]
pub struct UnknownEvent(pub String);

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

impl From<TestResultKind> for EventKind {
    fn from(kind: TestResultKind) -> Self {
        match kind {
            TestResultKind::TestSuiteStarted => Self::TestSuiteStarted,
            TestResultKind::TestSuiteFinished => Self::TestSuiteFinished,
            TestResultKind::TestStarted => Self::TestStarted,
            TestResultKind::TestFinished => Self::TestFinished,
            TestResultKind::TestFailed => Self::TestFailed,
            TestResultKind::TestIgnored => Self::TestIgnored,
        }
    }
}

/// One published event, borrowing its payload from the run.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Run(&'a str),
    Line(&'a str),
    Result(&'a ParsedResult),
    Output(&'a str),
    Error(&'a str),
    Close(Option<i32>),
    /// Per-kind event; the kind comes from the result.
    Test(&'a TestResult),
    Version(&'a TestVersion),
    Runtime(&'a TestRuntime),
    Configuration(&'a TestConfiguration),
    Count(&'a TestCount),
    Summary(&'a TestResultSummary),
    TimeAndMemory(&'a TimeAndMemory),
}

impl<'a> Event<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Run(_) => EventKind::Run,
            Self::Line(_) => EventKind::Line,
            Self::Result(_) => EventKind::Result,
            Self::Output(_) => EventKind::Output,
            Self::Error(_) => EventKind::Error,
            Self::Close(_) => EventKind::Close,
            Self::Test(result) => result.kind.into(),
            Self::Version(_) => EventKind::TestVersion,
            Self::Runtime(_) => EventKind::TestRuntime,
            Self::Configuration(_) => EventKind::TestConfiguration,
            Self::Count(_) => EventKind::TestCount,
            Self::Summary(_) => EventKind::TestResultSummary,
            Self::TimeAndMemory(_) => EventKind::TimeAndMemory,
        }
    }

    /// The named event for a classified result: its kind for lifecycle
    /// results, its fixed name for summaries.
    pub fn named(result: &'a ParsedResult) -> Self {
        match result {
            ParsedResult::Test(r) => Self::Test(r),
            ParsedResult::Version(r) => Self::Version(r),
            ParsedResult::Runtime(r) => Self::Runtime(r),
            ParsedResult::Configuration(r) => Self::Configuration(r),
            ParsedResult::Count(r) => Self::Count(r),
            ParsedResult::Summary(r) => Self::Summary(r),
            ParsedResult::TimeAndMemory(r) => Self::TimeAndMemory(r),
        }
    }

    /// Text payload for `run`, `line`, `output` and `error`.
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            Self::Run(s) | Self::Line(s) | Self::Output(s) | Self::Error(s) => Some(s),
            _ => None,
        }
    }
}

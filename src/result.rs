//! Structured results classified from PHPUnit's TeamCity output.
//!
//! The line grammar itself lives behind [`LineClassifier`]; this module only
//! defines what a classified line looks like.

use serde::Serialize;

/// Lifecycle stage of a test or suite; also its per-kind event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TestResultKind {
    TestSuiteStarted,
    TestSuiteFinished,
    TestStarted,
    TestFinished,
    TestFailed,
    TestIgnored,
}

impl TestResultKind {
    pub const ALL: [TestResultKind; 6] = [
        Self::TestSuiteStarted,
        Self::TestSuiteFinished,
        Self::TestStarted,
        Self::TestFinished,
        Self::TestFailed,
        Self::TestIgnored,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TestSuiteStarted => "testSuiteStarted",
            Self::TestSuiteFinished => "testSuiteFinished",
            Self::TestStarted => "testStarted",
            Self::TestFinished => "testFinished",
            Self::TestFailed => "testFailed",
            Self::TestIgnored => "testIgnored",
        }
    }
}

/// One frame of a failure trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestDetail {
    pub file: String,
    pub line: u32,
}

/// A test or suite lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub kind: TestResultKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<TestDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl TestResult {
    /// A result carrying only its kind and name.
    pub fn new(kind: TestResultKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            id: None,
            flow_id: None,
            location_hint: None,
            file: None,
            details: None,
            message: None,
            duration: None,
            expected: None,
            actual: None,
        }
    }
}

/// `PHPUnit 10.5.0 by Sebastian Bergmann and contributors.`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestVersion {
    pub phpunit: String,
    pub text: String,
}

/// `Runtime:       PHP 8.3.0`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRuntime {
    pub runtime: String,
    pub text: String,
}

/// `Configuration: /app/phpunit.xml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestConfiguration {
    pub configuration: String,
    pub text: String,
}

/// `##teamcity[testCount count='12' flowId='1']`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCount {
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<u32>,
    pub text: String,
}

/// `Tests: 12, Assertions: 30, Failures: 1.`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestResultSummary {
    pub tests: Option<u32>,
    pub assertions: Option<u32>,
    pub errors: Option<u32>,
    pub failures: Option<u32>,
    pub warnings: Option<u32>,
    pub skipped: Option<u32>,
    pub incomplete: Option<u32>,
    pub risky: Option<u32>,
    pub text: String,
}

/// `Time: 00:00.031, Memory: 6.00 MB`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeAndMemory {
    pub time: String,
    pub memory: String,
    pub text: String,
}

/// Everything a classifier can recognise in one line of output.
///
/// Only [`ParsedResult::Test`] carries a [`TestResultKind`]; the summary
/// variants are routed by their fixed event names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedResult {
    Test(TestResult),
    Version(TestVersion),
    Runtime(TestRuntime),
    Configuration(TestConfiguration),
    Count(TestCount),
    Summary(TestResultSummary),
    TimeAndMemory(TimeAndMemory),
}

impl ParsedResult {
    /// The lifecycle kind, for kind-bearing results only.
    pub fn kind(&self) -> Option<TestResultKind> {
        match self {
            Self::Test(result) => Some(result.kind),
            _ => None,
        }
    }
}

impl From<TestResult> for ParsedResult {
    fn from(result: TestResult) -> Self {
        Self::Test(result)
    }
}

/// Turns one line of process output into a structured result.
///
/// Implementations own the protocol grammar. Returning `None` means the line
/// is plain output; it still reaches observers as a raw line.
pub trait LineClassifier: Send + Sync {
    fn parse(&self, line: &str) -> Option<ParsedResult>;
}

impl<F> LineClassifier for F
where
    F: Fn(&str) -> Option<ParsedResult> + Send + Sync,
{
    fn parse(&self, line: &str) -> Option<ParsedResult> {
        self(line)
    }
}

//! One child process per run: spawn, segment, classify, publish.

use std::io;
use std::process::Stdio;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::Instrument;

use crate::command::{CommandSpec, TestCommand};
use crate::result::LineClassifier;
use crate::runner::events::{Event, EventKind};
use crate::runner::lines::LineSegmenter;
use crate::runner::observer::{ObserverRegistry, TestRunnerObserver};

/// Exit code reported on `close` when the process never started.
pub const SPAWN_FAILURE_CODE: i32 = 2;

const READ_CHUNK: usize = 8 * 1024;

static VERSION_BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PHPUnit\s+[\d.]+").expect("version banner pattern"));

static PROTOCOL_OPENING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##teamcity\[").expect("protocol marker pattern"));

/// Failures inside a session. They are published as events, never returned.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {stream}: {source}")]
    Read {
        stream: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for process: {0}")]
    Wait(#[source] io::Error),
}

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Closed { code: Option<i32> },
    SpawnFailed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed { .. } | Self::SpawnFailed)
    }
}

/// Patterns a transcript must contain for the run to count as having
/// actually executed the test framework.
#[derive(Debug, Clone)]
pub struct CompletionMarkers {
    version: Regex,
    protocol: Regex,
}

impl Default for CompletionMarkers {
    fn default() -> Self {
        Self::new(VERSION_BANNER.clone(), PROTOCOL_OPENING.clone())
    }
}

impl CompletionMarkers {
    pub fn new(version: Regex, protocol: Regex) -> Self {
        Self { version, protocol }
    }

    /// Both the version banner and a protocol opening marker are present.
    pub fn matches(&self, transcript: &str) -> bool {
        self.version.is_match(transcript) && self.protocol.is_match(transcript)
    }
}

/// Drives test runs and publishes what they print.
///
/// Observers are registered up front and persist across runs. `run` takes
/// `&self`, so one runner can drive several commands concurrently; all
/// buffering state lives inside each call.
pub struct TestRunner {
    registry: ObserverRegistry,
    classifier: Box<dyn LineClassifier>,
    markers: CompletionMarkers,
}

impl TestRunner {
    pub fn new(classifier: impl LineClassifier + 'static) -> Self {
        Self {
            registry: ObserverRegistry::new(),
            classifier: Box::new(classifier),
            markers: CompletionMarkers::default(),
        }
    }

    pub fn with_markers(mut self, markers: CompletionMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn observe(&mut self, observer: Arc<dyn TestRunnerObserver>) -> &mut Self {
        self.registry.observe(observer);
        self
    }

    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> &mut Self
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        self.registry.on(kind, handler);
        self
    }

    pub fn registry(&self) -> &ObserverRegistry {
        &self.registry
    }

    /// Run the command to completion and return the terminal state.
    ///
    /// Events, in order: `run`, then per line the named event, `result` and
    /// `line`, then `output` or `error` with the full transcript, then
    /// `close`. A spawn failure skips straight to `error` and `close(2)`.
    pub async fn run(&self, command: &TestCommand) -> SessionState {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("test_run", %run_id);
        self.drive(command).instrument(span).await
    }

    async fn drive(&self, command: &TestCommand) -> SessionState {
        let resolved = command.apply();
        let command_line = resolved.command_line();
        let mut state = SessionState::Idle;

        self.registry.emit(Event::Run(&command_line));

        let mut child = match spawn(&resolved) {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(error = %err, "spawn failed");
                let message = err.to_string();
                self.registry.emit(Event::Error(&message));
                self.registry.emit(Event::Close(Some(SPAWN_FAILURE_CODE)));
                transition(&mut state, SessionState::SpawnFailed);
                return state;
            }
        };
        transition(&mut state, SessionState::Running);
        tracing::info!(pid = ?child.id(), command = %command_line, "process spawned");

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let mut out_buf = vec![0u8; READ_CHUNK];
        let mut err_buf = vec![0u8; READ_CHUNK];
        let mut transcript: Vec<u8> = Vec::new();
        let mut segmenter = LineSegmenter::new();

        loop {
            let chunk: &[u8] = tokio::select! {
                read = read_pipe(stdout.as_mut(), &mut out_buf), if stdout.is_some() => {
                    match settle(read, "stdout") {
                        Some(n) => &out_buf[..n],
                        None => {
                            stdout = None;
                            continue;
                        }
                    }
                }
                read = read_pipe(stderr.as_mut(), &mut err_buf), if stderr.is_some() => {
                    match settle(read, "stderr") {
                        Some(n) => &err_buf[..n],
                        None => {
                            stderr = None;
                            continue;
                        }
                    }
                }
                else => break,
            };

            transcript.extend_from_slice(chunk);
            for line in segmenter.push(chunk) {
                self.process_line(command, &line);
            }
        }

        if let Some(tail) = segmenter.finish() {
            self.process_line(command, &tail);
        }

        let code = match child.wait().await {
            Ok(status) => status.code(),
            Err(source) => {
                let err = SessionError::Wait(source);
                tracing::warn!(error = %err, "exit status unavailable");
                None
            }
        };
        tracing::info!(?code, bytes = transcript.len(), "process exited");

        let transcript = String::from_utf8_lossy(&transcript);
        if self.markers.matches(&transcript) {
            self.registry.emit(Event::Output(&transcript));
        } else {
            tracing::debug!("transcript lacks completion markers");
            self.registry.emit(Event::Error(&transcript));
        }
        self.registry.emit(Event::Close(code));

        transition(&mut state, SessionState::Closed { code });
        state
    }

    /// Classify, map and publish one line. Unclassified lines only reach
    /// `line` subscribers.
    fn process_line(&self, command: &TestCommand, line: &str) {
        if let Some(result) = self.classifier.parse(line) {
            let result = command.mapping(result);
            self.registry.emit(Event::named(&result));
            self.registry.emit(Event::Result(&result));
        }
        self.registry.emit(Event::Line(line));
    }
}

impl std::fmt::Debug for TestRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRunner")
            .field("registry", &self.registry)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

fn spawn(resolved: &CommandSpec) -> Result<Child, SessionError> {
    let mut cmd = Command::new(&resolved.executable);
    cmd.args(&resolved.arguments)
        .envs(&resolved.options.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = &resolved.options.cwd {
        cmd.current_dir(cwd);
    }
    cmd.spawn().map_err(|source| SessionError::Spawn {
        command: resolved.command_line(),
        source,
    })
}

/// Read from a pipe that may already be closed. A closed pipe never
/// resolves; its `select!` branch is disabled anyway.
async fn read_pipe<R>(pipe: Option<&mut R>, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match pipe {
        Some(pipe) => pipe.read(buf).await,
        None => std::future::pending().await,
    }
}

/// Bytes read, or `None` once the stream has ended or failed.
fn settle(read: io::Result<usize>, stream: &'static str) -> Option<usize> {
    match read {
        Ok(0) => None,
        Ok(n) => Some(n),
        Err(source) => {
            let err = SessionError::Read { stream, source };
            tracing::warn!(error = %err, "pipe closed after read error");
            None
        }
    }
}

fn transition(state: &mut SessionState, next: SessionState) {
    tracing::debug!(from = ?state, to = ?next, "session state");
    *state = next;
}

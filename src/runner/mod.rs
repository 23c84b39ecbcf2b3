//! Spawning a test run and publishing its output as events.

mod events;
mod lines;
mod observer;
mod session;

pub use events::{Event, EventKind, UnknownEvent};
pub use lines::{CompleteLines, LineSegmenter};
pub use observer::{ObserverRegistry, TestRunnerObserver};
pub use session::{
    CompletionMarkers, SessionError, SessionState, TestRunner, SPAWN_FAILURE_CODE,
};

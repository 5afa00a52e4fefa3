//! Run coordination: store sessions, shared state, progress

mod orchestrator;
mod progress;

pub use orchestrator::{Orchestrator, SessionReport};
pub use progress::{spawn_reporter, ProgressCounters};

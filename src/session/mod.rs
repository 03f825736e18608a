//! Session lifecycle: live recording and finalized summaries

pub mod recorder;
pub mod summary;

pub use recorder::{SessionRecorder, SessionStats};
pub use summary::{SessionRecord, SessionSummary};

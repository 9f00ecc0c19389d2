use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock instant used for build stamps and sync bookkeeping
pub type Timestamp = DateTime<Utc>;

/// Refresh lifecycle bookkeeping
///
/// `finished` only moves forward, and only when a rebuilt snapshot is published.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub started: Option<Timestamp>,
    pub finished: Option<Timestamp>,
}

impl SyncRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a rebuild
    pub fn begin(self, started: Timestamp) -> Self {
        Self {
            started: Some(started),
            ..self
        }
    }

    /// Record a successful publication; never moves `finished` backwards
    pub fn complete(self, finished: Timestamp) -> Self {
        let finished = match self.finished {
            Some(previous) if previous > finished => previous,
            _ => finished,
        };
        Self {
            started: self.started,
            finished: Some(finished),
        }
    }
}

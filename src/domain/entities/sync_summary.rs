use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushSummary {
    pub succeeded: u32,
    pub failed: u32,
}

impl PushSummary {
    pub fn new(succeeded: u32, failed: u32) -> Self {
        Self { succeeded, failed }
    }

    pub fn attempted(&self) -> u32 {
        self.succeeded + self.failed
    }

    pub fn merge(self, other: PushSummary) -> Self {
        Self {
            succeeded: self.succeeded + other.succeeded,
            failed: self.failed + other.failed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullSummary {
    pub inserted: u32,
    pub updated: u32,
    pub unchanged: u32,
    /// Dirty rows the conflict policy left alone (pending deletes, preserved edits).
    pub deferred: u32,
    /// Remote documents that could not be decoded at all.
    pub skipped: u32,
    /// Enum-like fields recovered with their declared default.
    pub fallbacks: u32,
}

impl PullSummary {
    pub fn mutated(&self) -> u32 {
        self.inserted + self.updated
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncReport {
    pub pushed: PushSummary,
    pub deleted: PushSummary,
    pub pulled: PullSummary,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.pushed.attempted() == 0
            && self.deleted.attempted() == 0
            && self.pulled.mutated() == 0
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a pulled remote record is merged into a local row that is still dirty.
///
/// Both variants are last-writer-wins by commit order: pushes run before the pull, so
/// whichever device completed its push most recently owns the remote value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The remote copy becomes the local basis; a dirty row keeps its dirty flag.
    #[default]
    RemoteWins,
    /// Dirty local rows are left untouched until their own push succeeds.
    PreserveDirtyLocal,
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::RemoteWins => "remote_wins",
            ConflictPolicy::PreserveDirtyLocal => "preserve_dirty_local",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote_wins" => Ok(ConflictPolicy::RemoteWins),
            "preserve_dirty_local" => Ok(ConflictPolicy::PreserveDirtyLocal),
            other => Err(format!("Unknown conflict policy: {other}")),
        }
    }
}

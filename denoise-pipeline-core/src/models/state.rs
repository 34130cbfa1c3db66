use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline state machine.
///
/// State transitions:
/// ```text
/// idle → running → stopping → idle
/// ```
///
/// Created `Idle`; `start()` moves to `Running`, `stop()` passes through
/// `Stopping` while the cycle thread drains, then back to `Idle`. A fatal
/// cycle error also returns the state to `Idle`; the error itself is
/// reported separately (`last_error` / delegate), not as a state variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Idle,
    Running,
    Stopping,
}

impl PipelineState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_stopping(&self) -> bool {
        matches!(self, Self::Stopping)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

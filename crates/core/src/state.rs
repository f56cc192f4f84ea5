//! Instance lifecycle states and operations
//!
//! ## Lifecycle
//!
//! ```text
//!            launch
//!              |
//!              v
//!  Stopped -> Pending -> Running -> Stopping -> Stopped
//!     \          \         |          /
//!      \          \        v         /
//!       +---------> ShuttingDown <--+
//!                          |
//!                          v
//!                     Terminated
//! ```
//!
//! `Terminated` is terminal. The edges above are the only moves a background
//! transition may apply; [`InstanceState::can_transition_to`] encodes them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a simulated instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    /// Booting, either freshly launched or restarting from `Stopped`
    Pending,
    /// Up and running
    Running,
    /// Shutting down towards `Stopped`
    Stopping,
    /// Stopped, can be started again
    Stopped,
    /// Shutting down towards `Terminated`
    ShuttingDown,
    /// Gone for good; remains visible to queries
    Terminated,
}

impl InstanceState {
    /// All states, in declaration order
    pub const ALL: [InstanceState; 6] = [
        InstanceState::Pending,
        InstanceState::Running,
        InstanceState::Stopping,
        InstanceState::Stopped,
        InstanceState::ShuttingDown,
        InstanceState::Terminated,
    ];

    /// Provider name, as used by the `instance-state-name` filter
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Pending => "pending",
            InstanceState::Running => "running",
            InstanceState::Stopping => "stopping",
            InstanceState::Stopped => "stopped",
            InstanceState::ShuttingDown => "shutting-down",
            InstanceState::Terminated => "terminated",
        }
    }

    /// Provider numeric state code
    pub fn code(&self) -> u16 {
        match self {
            InstanceState::Pending => 0,
            InstanceState::Running => 16,
            InstanceState::ShuttingDown => 32,
            InstanceState::Terminated => 48,
            InstanceState::Stopping => 64,
            InstanceState::Stopped => 80,
        }
    }

    /// Check if no further transition can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstanceState::Terminated)
    }

    /// Check if the state is an intermediate (in-flight) state
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            InstanceState::Pending | InstanceState::Stopping | InstanceState::ShuttingDown
        )
    }

    /// Check if `next` is a legal single-step move from this state
    pub fn can_transition_to(&self, next: InstanceState) -> bool {
        use InstanceState::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Running, Stopping)
                | (Stopping, Stopped)
                | (Stopped, Pending)
                | (Pending | Running | Stopping | Stopped, ShuttingDown)
                | (ShuttingDown, Terminated)
        )
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceState {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstanceState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| crate::Error::InvalidParameter(format!("unknown instance state: {}", s)))
    }
}

/// Lifecycle-changing operation requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Start a stopped (or still pending) instance
    Start,
    /// Stop a running instance
    Stop,
    /// Terminate an instance
    Terminate,
}

impl Operation {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Terminate => "terminate",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

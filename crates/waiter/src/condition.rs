//! Wait conditions

use cloudsim_core::{DescribeInstancesOutput, InstanceState};
use std::fmt;

/// Predicate evaluated against each query result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// Some matching instance is in this state
    InstanceInState(InstanceState),
    /// At least one instance matches
    InstanceExists,
}

impl WaitCondition {
    /// Check the condition against one query result
    pub fn is_satisfied(&self, output: &DescribeInstancesOutput) -> bool {
        match self {
            WaitCondition::InstanceInState(state) => {
                output.instances.iter().any(|i| i.state == *state)
            }
            WaitCondition::InstanceExists => !output.is_empty(),
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::InstanceInState(state) => write!(f, "instance-{}", state),
            WaitCondition::InstanceExists => write!(f, "instance-exists"),
        }
    }
}

/// Successful wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Polls issued, the satisfying one included
    pub attempts: u32,
}

//! Waiters for cloudsim
//!
//! A [`Waiter`] polls an [`InstanceSource`] with a fixed delay until a
//! [`WaitCondition`] holds, the attempt budget runs out, or the caller's
//! cancellation token fires.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod condition;
pub mod source;
pub mod waiter;

pub use condition::{WaitCondition, WaitOutcome};
pub use source::InstanceSource;
pub use waiter::Waiter;

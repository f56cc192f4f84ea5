//! Simulator operations, grouped by resource.
//!
//! Each module adds an `impl Simulator` block:
//! - [`instances`]: launch, describe, start, stop, terminate
//! - [`tags`]: tag creation
//! - [`images`]: image catalog
//! - [`waiters`]: polling waiters

pub mod images;
pub mod instances;
pub mod tags;
pub mod waiters;

//! Core identity types for the simulator
//!
//! This module defines the identifiers and small value types shared by every
//! layer:
//! - [`InstanceId`]: Unique identifier for a simulated instance
//! - [`ReservationId`]: Identifier for the batch created by one launch
//! - [`Tag`]: Key/value label attached to an instance

use serde::{Deserialize, Serialize};

/// Unique identifier for a simulated instance
///
/// Ids are allocated from a monotonic counter owned by the registry and
/// rendered as `i-` followed by 17 hex digits, the same shape the provider
/// uses. An id is never reused for the life of a registry.
///
/// # Examples
///
/// ```
/// use cloudsim_core::types::InstanceId;
///
/// let id = InstanceId::from_sequence(26);
/// assert_eq!(id.as_str(), "i-0000000000000001a");
/// assert_eq!(id.sequence(), Some(26));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Prefix shared by all instance ids
    pub const PREFIX: &'static str = "i-";

    /// Wrap a caller-supplied id
    ///
    /// The string is not validated: callers may reference ids that were
    /// never allocated, and lookups will report them as missing.
    pub fn new(id: impl Into<String>) -> Self {
        InstanceId(id.into())
    }

    /// Render the id allocated for counter value `sequence`
    pub fn from_sequence(sequence: u64) -> Self {
        InstanceId(format!("{}{:017x}", Self::PREFIX, sequence))
    }

    /// Counter value this id was allocated from, if it has the allocated shape
    pub fn sequence(&self) -> Option<u64> {
        let hex = self.0.strip_prefix(Self::PREFIX)?;
        if hex.len() != 17 {
            return None;
        }
        u64::from_str_radix(hex, 16).ok()
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        InstanceId::new(s)
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        InstanceId(s)
    }
}

/// Identifier for a reservation (one launch request)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(String);

impl ReservationId {
    /// Prefix shared by all reservation ids
    pub const PREFIX: &'static str = "r-";

    /// Render the id allocated for counter value `sequence`
    pub fn from_sequence(sequence: u64) -> Self {
        ReservationId(format!("{}{:017x}", Self::PREFIX, sequence))
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key/value label attached to an instance
///
/// Keys are not unique: an instance may carry several tags with the same key,
/// and they are kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Tag key
    pub key: String,
    /// Tag value
    pub value: String,
}

impl Tag {
    /// Create a new tag
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Tag {
            key: key.into(),
            value: value.into(),
        }
    }
}

//! Query filters and the instance query descriptor
//!
//! Filters follow the provider convention: a filter category that is absent
//! imposes no constraint, values inside one filter are alternatives (OR), and
//! separate filters must all hold (AND).

use crate::error::{Error, Result};
use crate::state::InstanceState;
use crate::types::{InstanceId, Tag};
use serde::{Deserialize, Serialize};

/// Filter name selecting on the instance state
pub const INSTANCE_STATE_NAME_FILTER: &str = "instance-state-name";

/// Prefix of filter names selecting on a tag key
pub const TAG_FILTER_PREFIX: &str = "tag:";

/// Caller-supplied predicate over instance state or tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// `instance-state-name` is one of the listed states
    StateName(Vec<InstanceState>),
    /// The instance carries tag `key` with one of the listed values
    Tag {
        /// Tag key to look for
        key: String,
        /// Accepted values
        values: Vec<String>,
    },
}

impl Filter {
    /// Filter on instance state
    pub fn state(states: impl IntoIterator<Item = InstanceState>) -> Self {
        Filter::StateName(states.into_iter().collect())
    }

    /// Filter on a tag key and its accepted values
    pub fn tag<V: Into<String>>(key: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Filter::Tag {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a filter from a provider filter name and its values
    ///
    /// Accepts `instance-state-name` and `tag:<key>`.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter`: unknown filter name, empty tag key, unknown
    ///   state name, or empty value list
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudsim_core::filter::Filter;
    /// use cloudsim_core::state::InstanceState;
    ///
    /// let filter = Filter::parse("instance-state-name", ["running"]).unwrap();
    /// assert_eq!(filter, Filter::state([InstanceState::Running]));
    ///
    /// let filter = Filter::parse("tag:env", ["prod", "staging"]).unwrap();
    /// assert_eq!(filter, Filter::tag("env", ["prod", "staging"]));
    /// ```
    pub fn parse<V: AsRef<str>>(name: &str, values: impl IntoIterator<Item = V>) -> Result<Self> {
        let values: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        if values.is_empty() {
            return Err(Error::InvalidParameter(format!(
                "filter {} has no values",
                name
            )));
        }

        if name == INSTANCE_STATE_NAME_FILTER {
            let states = values
                .iter()
                .map(|v| v.parse::<InstanceState>())
                .collect::<Result<Vec<_>>>()?;
            return Ok(Filter::StateName(states));
        }

        match name.strip_prefix(TAG_FILTER_PREFIX) {
            Some("") => Err(Error::InvalidParameter("tag filter has an empty key".into())),
            Some(key) => Ok(Filter::Tag {
                key: key.to_string(),
                values,
            }),
            None => Err(Error::InvalidParameter(format!("unknown filter: {}", name))),
        }
    }

    /// Provider filter name
    pub fn name(&self) -> String {
        match self {
            Filter::StateName(_) => INSTANCE_STATE_NAME_FILTER.to_string(),
            Filter::Tag { key, .. } => format!("{}{}", TAG_FILTER_PREFIX, key),
        }
    }

    /// Check whether an instance with this state and these tags passes
    pub fn matches(&self, state: InstanceState, tags: &[Tag]) -> bool {
        match self {
            Filter::StateName(states) => states.contains(&state),
            Filter::Tag { key, values } => tags
                .iter()
                .any(|tag| &tag.key == key && values.iter().any(|v| v == &tag.value)),
        }
    }
}

/// Point-in-time query over the registry
///
/// An empty id list selects every instance.
///
/// # Examples
///
/// ```
/// use cloudsim_core::filter::{Filter, InstanceQuery};
/// use cloudsim_core::state::InstanceState;
///
/// let query = InstanceQuery::new()
///     .filter(Filter::state([InstanceState::Running]))
///     .filter(Filter::tag("role", ["web"]));
/// assert_eq!(query.filters().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceQuery {
    instance_ids: Vec<InstanceId>,
    filters: Vec<Filter>,
}

impl InstanceQuery {
    /// Query matching every instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Query restricted to the given ids
    pub fn for_ids(ids: impl IntoIterator<Item = InstanceId>) -> Self {
        Self::new().instance_ids(ids)
    }

    /// Restrict to the given ids (appends to any ids already set)
    pub fn instance_ids(mut self, ids: impl IntoIterator<Item = InstanceId>) -> Self {
        self.instance_ids.extend(ids);
        self
    }

    /// Add a filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Ids this query is restricted to (empty = all)
    pub fn ids(&self) -> &[InstanceId] {
        &self.instance_ids
    }

    /// Filters of this query
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Check the filter part of the query (ids are checked by the caller,
    /// which can index them)
    pub fn filters_match(&self, state: InstanceState, tags: &[Tag]) -> bool {
        self.filters.iter().all(|f| f.matches(state, tags))
    }
}

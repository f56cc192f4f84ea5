//! Tag operations.

use crate::simulator::Simulator;
use cloudsim_core::{InstanceId, Result, Tag};

impl Simulator {
    /// Append tags to an instance.
    ///
    /// Tags accumulate in call order; an existing key is not overwritten, so
    /// a key can carry several values.
    ///
    /// # Errors
    ///
    /// - `NoInstanceFound`: the id is unknown; nothing is mutated
    pub fn create_tags(
        &self,
        id: &InstanceId,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Result<()> {
        let tags: Vec<Tag> = tags.into_iter().collect();
        self.registry.create_tags(id, &tags)
    }
}

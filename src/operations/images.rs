//! Image operations.

use crate::simulator::Simulator;
use cloudsim_core::{Image, Result};

impl Simulator {
    /// Describe the image catalog, after the query latency.
    ///
    /// # Errors
    ///
    /// - `QueryFailed`: an injected fault was consumed
    pub async fn describe_images(&self) -> Result<Vec<Image>> {
        self.queries.describe_images().await
    }
}

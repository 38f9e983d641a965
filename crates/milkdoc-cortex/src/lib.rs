//! Adapters binding the pipeline ports to the Snowflake Cortex REST API.
//!
//! - [`CortexSearch`]: Cortex Search service query (retrieval).
//! - [`CortexComplete`]: Cortex inference complete (reformulation and answer).
//! - [`CortexCategories`]: SQL statements API (category enumeration).
//!
//! All three share one [`CortexClient`] carrying the account URL and
//! credentials. Requests are sent once; failures are returned to the caller.

pub mod categories;
pub mod client;
pub mod complete;
pub mod search;

pub use categories::CortexCategories;
pub use client::CortexClient;
pub use complete::CortexComplete;
pub use search::CortexSearch;

use std::sync::Arc;

use milkdoc_core::config::CortexConfig;
use milkdoc_core::Result;

/// The three adapters built over one shared client.
pub struct CortexBackends {
    pub search: Arc<CortexSearch>,
    pub complete: Arc<CortexComplete>,
    pub categories: Arc<CortexCategories>,
}

impl CortexBackends {
    /// Build all adapters from configuration, reading the token from the
    /// environment.
    pub fn from_config(config: &CortexConfig) -> Result<Self> {
        let client = CortexClient::from_config(config)?;
        Ok(Self {
            search: Arc::new(CortexSearch::new(client.clone(), config)),
            complete: Arc::new(CortexComplete::new(client.clone())),
            categories: Arc::new(CortexCategories::new(client, config)?),
        })
    }
}

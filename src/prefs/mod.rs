pub mod memory;

pub use memory::InMemoryPreferences;

use async_trait::async_trait;

use crate::domain::{FilterSet, UserId};

/// Read-only view of per-user saved filters. The surrounding application
/// owns the records; the engine never writes through this trait.
#[async_trait]
pub trait PreferenceResolver {
    /// The user's saved filters, or `None` when nothing is configured.
    async fn resolve(&self, user: &UserId) -> Option<FilterSet>;
}

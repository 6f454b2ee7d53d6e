//! Small client-side key/value persistence used to carry project start times
//! across reloads.

mod memory;

pub use memory::MemoryStore;

use anyhow::Result;

#[allow(async_fn_in_trait)]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`, returning what it held.
    async fn remove(&self, key: &str) -> Result<Option<String>>;
}

//! Source registry abstract Trait

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use zonesync_provider::SourceProvider;

/// Source Registry Trait
///
/// Manages all registered source instances, indexed by `account_id`.
/// Provides a default memory implementation `InMemorySourceRegistry`.
#[async_trait]
pub trait SourceRegistry: Send + Sync {
    /// Register a source instance
    ///
    /// # Arguments
    /// * `account_id` - Account ID
    /// * `source` - Source instance
    async fn register(&self, account_id: String, source: Arc<dyn SourceProvider>);

    /// Remove a source
    async fn unregister(&self, account_id: &str);

    /// Get source instance
    async fn get(&self, account_id: &str) -> Option<Arc<dyn SourceProvider>>;

    /// List all registered `account_id`s, sorted
    async fn list_account_ids(&self) -> Vec<String>;
}

/// In-memory source registry
#[derive(Clone, Default)]
pub struct InMemorySourceRegistry {
    sources: Arc<RwLock<BTreeMap<String, Arc<dyn SourceProvider>>>>,
}

impl InMemorySourceRegistry {
    /// Create a new memory registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SourceRegistry for InMemorySourceRegistry {
    async fn register(&self, account_id: String, source: Arc<dyn SourceProvider>) {
        self.sources.write().await.insert(account_id, source);
    }

    async fn unregister(&self, account_id: &str) {
        self.sources.write().await.remove(account_id);
    }

    async fn get(&self, account_id: &str) -> Option<Arc<dyn SourceProvider>> {
        self.sources.read().await.get(account_id).cloned()
    }

    async fn list_account_ids(&self) -> Vec<String> {
        self.sources.read().await.keys().cloned().collect()
    }
}

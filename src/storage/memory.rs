use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::RwLock;

use super::KeyValueStore;

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.write().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(store.get("balance").await?, None);

        store
            .set_many(&[("balance", "10".into()), ("transactions", "[]".into())])
            .await?;
        assert_eq!(store.get("balance").await?.as_deref(), Some("10"));

        store.remove_many(&["balance", "transactions", "absent"]).await?;
        assert_eq!(store.get("balance").await?, None);
        assert_eq!(store.get("transactions").await?, None);
        Ok(())
    }
}

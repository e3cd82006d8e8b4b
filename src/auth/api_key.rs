//! API key validation for dashboard clients.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A dashboard client identified by its key.
#[derive(Debug, Clone)]
pub struct ApiKeyInfo {
    pub key_id: String,
    pub name: String,
    pub client_id: String,
}

/// Holds hashed keys; plaintext keys never outlive construction.
#[derive(Clone, Default)]
pub struct ApiKeyValidator {
    keys: Arc<RwLock<HashMap<String, ApiKeyInfo>>>,
}

impl ApiKeyValidator {
    pub fn new(configured_keys: Vec<ConfiguredApiKey>) -> Self {
        let keys = configured_keys
            .into_iter()
            .map(|key| {
                (
                    Self::hash_key(&key.key),
                    ApiKeyInfo {
                        key_id: key.id,
                        name: key.name,
                        client_id: key.client_id,
                    },
                )
            })
            .collect();

        Self {
            keys: Arc::new(RwLock::new(keys)),
        }
    }

    /// SHA-256, hex encoded.
    pub fn hash_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Look up a configured key.
    pub async fn validate(&self, key: &str) -> Option<ApiKeyInfo> {
        let hashed = Self::hash_key(key);
        self.keys.read().await.get(&hashed).cloned()
    }

    pub async fn key_count(&self) -> usize {
        self.keys.read().await.len()
    }
}

/// API key entry as written in the `auth.api_keys` config list.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ConfiguredApiKey {
    pub id: String,
    pub key: String,
    pub name: String,
    pub client_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard_key(id: &str, key: &str) -> ConfiguredApiKey {
        ConfiguredApiKey {
            id: id.to_string(),
            key: key.to_string(),
            name: "Ops dashboard".to_string(),
            client_id: "dashboard-ops".to_string(),
        }
    }

    #[tokio::test]
    async fn test_api_key_validation() {
        let validator = ApiKeyValidator::new(vec![dashboard_key("key-1", "sp-live-0001")]);

        let info = validator.validate("sp-live-0001").await.unwrap();
        assert_eq!(info.client_id, "dashboard-ops");
        assert!(validator.validate("sp-live-0002").await.is_none());
    }

    #[tokio::test]
    async fn test_key_count() {
        let validator = ApiKeyValidator::new(vec![
            dashboard_key("key-1", "sp-live-0001"),
            dashboard_key("key-2", "sp-live-0002"),
        ]);
        assert_eq!(validator.key_count().await, 2);
        assert_eq!(ApiKeyValidator::default().key_count().await, 0);
    }

    #[test]
    fn test_hash_is_stable_hex() {
        let hash = ApiKeyValidator::hash_key("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, ApiKeyValidator::hash_key("abc"));
    }
}

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use super::storage::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage};
use crate::config::{Config, TokenStorageKind};
use super::token;

/// Storage key holding the raw bearer token
pub const TOKEN_KEY: &str = "access_token";

/// Holder of the bearer token.
///
/// Clone is cheap; clones share the same backing storage. The token is read
/// from storage on every access rather than cached, so a token cleared by one
/// holder (say, the HTTP wrapper after a 401) is gone for all of them.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Session backed by the storage selected in the config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage: Arc<dyn TokenStorage> = match config.token_storage {
            TokenStorageKind::File => Arc::new(FileStorage::new(config.cache_dir()?)),
            TokenStorageKind::Keyring => Arc::new(KeyringStorage),
        };
        Ok(Self::new(storage))
    }

    /// A session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// The stored token, if any. Storage failures read as "no token".
    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    /// Store a freshly issued token, replacing any previous one.
    pub fn store(&self, token: &str) -> Result<()> {
        self.storage.set(TOKEN_KEY, token)?;
        info!("Session token stored");
        Ok(())
    }

    /// Forget the token. Safe to call when nothing is stored.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            warn!(error = %e, "Failed to remove session token");
        } else {
            info!("Session token cleared");
        }
    }

    /// Present and not expired according to its own payload.
    ///
    /// This is the client's belief only; the server remains authoritative.
    pub fn is_valid(&self) -> bool {
        self.token()
            .map(|t| !token::is_token_expired(&t))
            .unwrap_or(false)
    }

    /// Subject claim of the stored token, typically the user id.
    pub fn subject(&self) -> Option<String> {
        let token = self.token()?;
        token::decode_payload(&token)?.sub().map(str::to_string)
    }

    /// Numeric user id carried in the subject claim.
    pub fn user_id(&self) -> Option<i64> {
        self.subject()?.parse().ok()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}

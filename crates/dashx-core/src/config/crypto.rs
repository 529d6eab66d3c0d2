//! Symmetric encryption keys.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Keys used to encrypt data at rest.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CryptoConfig {
    /// AES-256 key for broker credentials, 64 hex characters.
    #[serde(default)]
    pub brokers_aes_key: String,
}

impl CryptoConfig {
    /// Decode the broker key into raw bytes.
    pub fn brokers_key(&self) -> Result<[u8; 32], AppError> {
        let bytes = hex::decode(self.brokers_aes_key.trim()).map_err(|e| {
            AppError::configuration(format!("crypto.brokers_aes_key is not valid hex: {e}"))
        })?;

        bytes.try_into().map_err(|_| {
            AppError::configuration("crypto.brokers_aes_key must decode to 32 bytes")
        })
    }
}

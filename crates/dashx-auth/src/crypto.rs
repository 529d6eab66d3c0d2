//! AES-256-GCM encryption of broker credentials at rest.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use dashx_core::error::AppError;

const NONCE_SIZE: usize = 12;

/// Encrypts short secrets into `base64(nonce || ciphertext)`.
#[derive(Clone)]
pub struct CryptoService {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CryptoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoService").finish_non_exhaustive()
    }
}

impl CryptoService {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| AppError::internal("Encryption failed"))?;

        let mut combined = nonce.to_vec();
        combined.extend(ciphertext);
        Ok(BASE64.encode(combined))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, AppError> {
        let combined = BASE64
            .decode(encoded)
            .map_err(|e| AppError::internal(format!("Ciphertext is not valid base64: {e}")))?;

        if combined.len() < NONCE_SIZE {
            return Err(AppError::internal("Ciphertext too short"));
        }
        let (nonce, ciphertext) = combined.split_at(NONCE_SIZE);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AppError::internal("Decryption failed"))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::internal(format!("Decrypted value is not UTF-8: {e}")))
    }
}

//! Credential primitives consumed by the services.
//!
//! Both are traits so the services never depend on a concrete algorithm:
//! `SecretCipher` protects stored asset passwords, `PasswordHasher` protects
//! account passwords.

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::Aead,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const SALT_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption key must be 32 bytes of base64")]
    InvalidKey,
    #[error("ciphertext is malformed")]
    MalformedCiphertext,
    #[error("cipher operation failed")]
    Cipher,
    #[error("password hashing failed: {0}")]
    Hash(#[from] argon2::Error),
}

/// Opaque symmetric encryption of short secrets.
pub trait SecretCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError>;
    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError>;
}

/// One-way hashing of account passwords.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CryptoError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CryptoError>;
}

/// AES-256-GCM with a fresh random nonce per message.
///
/// Output is `base64(nonce || ciphertext)`.
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey);
        }
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self { cipher })
    }

    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let key = BASE64
            .decode(encoded.trim())
            .map_err(|_| CryptoError::InvalidKey)?;
        Self::new(&key)
    }

    /// A cipher with a new random key, and that key in base64.
    pub fn generate() -> Result<(Self, String), CryptoError> {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Ok((Self::new(&key)?, BASE64.encode(key)))
    }
}

impl SecretCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| CryptoError::Cipher)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(sealed))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let sealed = BASE64
            .decode(ciphertext.as_bytes())
            .map_err(|_| CryptoError::MalformedCiphertext)?;
        if sealed.len() <= NONCE_LEN {
            return Err(CryptoError::MalformedCiphertext);
        }
        let (nonce, body) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| CryptoError::Cipher)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::MalformedCiphertext)
    }
}

/// Argon2 encoded hashes (`$argon2id$...`) with a random salt.
pub struct Argon2Hasher {
    config: argon2::Config<'static>,
}

impl Argon2Hasher {
    pub fn new(config: argon2::Config<'static>) -> Self {
        Self { config }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(argon2::Config::default())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Ok(argon2::hash_encoded(
            password.as_bytes(),
            &salt,
            &self.config,
        )?)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CryptoError> {
        Ok(argon2::verify_encoded(hash, password.as_bytes())?)
    }
}

/// Reversible stand-in for tests, where argon2 cost would dominate.
#[cfg(test)]
pub struct PlainHasher;

#[cfg(test)]
impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, CryptoError> {
        Ok(format!("plain${}", password))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CryptoError> {
        Ok(hash == format!("plain${}", password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cipher_round_trips_and_uses_fresh_nonces() {
        let (cipher, key) = AesGcmCipher::generate().unwrap();
        let a = cipher.encrypt("hunter2").unwrap();
        let b = cipher.encrypt("hunter2").unwrap();
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a).unwrap(), "hunter2");

        let same_key = AesGcmCipher::from_base64(&key).unwrap();
        assert_eq!(same_key.decrypt(&b).unwrap(), "hunter2");
    }

    #[test]
    fn cipher_rejects_tampering_and_bad_keys() {
        let (cipher, _) = AesGcmCipher::generate().unwrap();
        let (other, _) = AesGcmCipher::generate().unwrap();
        let sealed = cipher.encrypt("secret").unwrap();
        assert!(matches!(other.decrypt(&sealed), Err(CryptoError::Cipher)));
        assert!(matches!(
            cipher.decrypt("AAAA"),
            Err(CryptoError::MalformedCiphertext)
        ));
        assert!(matches!(
            AesGcmCipher::from_base64("c2hvcnQ="),
            Err(CryptoError::InvalidKey)
        ));
    }

    #[test]
    fn argon2_hash_verifies_only_the_original_password() {
        let hasher = Argon2Hasher::new(argon2::Config {
            mem_cost: 64,
            time_cost: 1,
            ..argon2::Config::default()
        });
        let hash = hasher.hash("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }
}

//! Keystore files holding an account address and its signing material.
//!
//! A keystore is a JSON file carrying the public address in the clear and
//! the 32-byte Ed25519 secret key either in plain hex (hotkeys that were
//! saved unprotected) or encrypted with a user-chosen passphrase:
//! 1. Argon2id derives a 32-byte encryption key from passphrase + random salt
//! 2. AES-256-GCM encrypts the secret key with a random nonce
//! 3. All parameters needed for decryption are stored alongside

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::Zeroizing;

use crate::error::WalletError;

use sweep_types::AccountAddress;

/// Argon2id parameters: 64 MB memory, 3 iterations, 1 lane of parallelism.
const ARGON2_MEMORY_KIB: u32 = 65536;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;
const ARGON2_OUTPUT_LEN: usize = 32;

const SALT_LEN: usize = 32;
/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

/// The top-level keystore file structure, serializable to/from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub version: u32,
    /// Public address, stored in the clear so it can be read without
    /// unlocking the secret.
    pub address: AccountAddress,
    pub secret: SecretSection,
}

/// How the secret key is stored at rest.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SecretSection {
    /// Hex-encoded secret key, unprotected.
    Plain { key: String },
    /// Passphrase-protected secret key.
    Encrypted { crypto: KeystoreCrypto },
}

/// Encryption parameters for a protected secret.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeystoreCrypto {
    pub cipher: String,
    pub kdf: String,
    pub kdf_params: KdfParams,
    /// Hex-encoded salt.
    pub salt: String,
    /// Hex-encoded nonce.
    pub nonce: String,
    /// Hex-encoded ciphertext.
    pub ciphertext: String,
}

/// KDF parameters for Argon2id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl KeystoreFile {
    /// Build an unprotected keystore around a raw secret key.
    pub fn plain(address: AccountAddress, secret_key: &[u8; 32]) -> Self {
        Self {
            version: 1,
            address,
            secret: SecretSection::Plain {
                key: hex::encode(secret_key),
            },
        }
    }

    /// Build a passphrase-protected keystore (Argon2id + AES-256-GCM).
    pub fn encrypted(
        address: AccountAddress,
        secret_key: &[u8; 32],
        passphrase: &str,
    ) -> Result<Self, WalletError> {
        let mut rng = rand::thread_rng();

        let mut salt = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt);

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut nonce_bytes);

        let derived_key = derive_key(passphrase, &salt)?;

        let cipher = Aes256Gcm::new_from_slice(&derived_key)
            .map_err(|e| WalletError::Keystore(format!("AES key init failed: {e}")))?;

        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, secret_key.as_ref())
            .map_err(|e| WalletError::Keystore(format!("encryption failed: {e}")))?;

        Ok(Self {
            version: 1,
            address,
            secret: SecretSection::Encrypted {
                crypto: KeystoreCrypto {
                    cipher: "aes-256-gcm".to_string(),
                    kdf: "argon2id".to_string(),
                    kdf_params: KdfParams {
                        memory: ARGON2_MEMORY_KIB,
                        iterations: ARGON2_ITERATIONS,
                        parallelism: ARGON2_PARALLELISM,
                    },
                    salt: hex::encode(salt),
                    nonce: hex::encode(nonce_bytes),
                    ciphertext: hex::encode(&ciphertext),
                },
            },
        })
    }

    /// Whether the secret key is passphrase-protected at rest.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.secret, SecretSection::Encrypted { .. })
    }

    /// Recover the 32-byte secret key.
    ///
    /// For an encrypted keystore a passphrase is required; `None` yields
    /// `CredentialLocked`. The returned key is zeroized on drop.
    pub fn decrypt(&self, passphrase: Option<&str>) -> Result<Zeroizing<[u8; 32]>, WalletError> {
        if self.version != 1 {
            return Err(WalletError::Keystore(format!(
                "unsupported keystore version: {}",
                self.version
            )));
        }

        match &self.secret {
            SecretSection::Plain { key } => {
                let bytes = hex::decode(key)
                    .map_err(|e| WalletError::Keystore(format!("invalid key hex: {e}")))?;
                key_from_slice(&bytes)
            }
            SecretSection::Encrypted { crypto } => {
                let passphrase = passphrase.ok_or(WalletError::CredentialLocked)?;

                let salt = hex::decode(&crypto.salt)
                    .map_err(|e| WalletError::Keystore(format!("invalid salt hex: {e}")))?;
                let nonce_bytes = hex::decode(&crypto.nonce)
                    .map_err(|e| WalletError::Keystore(format!("invalid nonce hex: {e}")))?;
                let ciphertext = hex::decode(&crypto.ciphertext)
                    .map_err(|e| WalletError::Keystore(format!("invalid ciphertext hex: {e}")))?;

                if nonce_bytes.len() != NONCE_LEN {
                    return Err(WalletError::Keystore(format!(
                        "invalid nonce length: expected {NONCE_LEN}, got {}",
                        nonce_bytes.len()
                    )));
                }

                let derived_key = derive_key(passphrase, &salt)?;

                let cipher = Aes256Gcm::new_from_slice(&derived_key)
                    .map_err(|e| WalletError::Keystore(format!("AES key init failed: {e}")))?;

                let nonce = Nonce::from_slice(&nonce_bytes);
                let plaintext = cipher
                    .decrypt(nonce, ciphertext.as_ref())
                    .map_err(|_| WalletError::CredentialLocked)?;

                key_from_slice(&plaintext)
            }
        }
    }
}

fn key_from_slice(bytes: &[u8]) -> Result<Zeroizing<[u8; 32]>, WalletError> {
    if bytes.len() != 32 {
        return Err(WalletError::Keystore(format!(
            "secret key has wrong length: expected 32, got {}",
            bytes.len()
        )));
    }
    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(bytes);
    Ok(key)
}

/// Save a keystore to a JSON file.
pub fn save_keystore(keystore: &KeystoreFile, path: &Path) -> Result<(), WalletError> {
    let json = serde_json::to_string_pretty(keystore)
        .map_err(|e| WalletError::Keystore(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| WalletError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Load a keystore from a JSON file.
pub fn load_keystore(path: &Path) -> Result<KeystoreFile, WalletError> {
    let json = std::fs::read_to_string(path).map_err(|e| WalletError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let keystore: KeystoreFile = serde_json::from_str(&json)
        .map_err(|e| WalletError::Keystore(format!("invalid keystore JSON: {e}")))?;
    Ok(keystore)
}

/// Derive a 32-byte key from a passphrase and salt using Argon2id.
fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; 32], WalletError> {
    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        Some(ARGON2_OUTPUT_LEN),
    )
    .map_err(|e| WalletError::Keystore(format!("Argon2 params error: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut output)
        .map_err(|e| WalletError::Keystore(format!("Argon2 hashing failed: {e}")))?;

    Ok(output)
}

//! Encrypted Secret Store
//!
//! Provider credentials (API keys) encrypted at rest in a single file
//! (`secrets.enc` in the stash directory). Values are sealed with
//! AES-256-GCM under a key derived from a passphrase via PBKDF2-HMAC-SHA256;
//! the per-file salt and per-entry nonces travel with the ciphertext.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{ensure_stash_dir, secrets_path};

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const PBKDF2_ROUNDS: u32 = 100_000;

/// On-disk layout of the secrets file
#[derive(Debug, Default, Serialize, Deserialize)]
struct SecretsFile {
    /// Base64 PBKDF2 salt
    salt: String,
    /// Provider name → base64(nonce || ciphertext)
    entries: BTreeMap<String, String>,
}

/// Encrypted credential storage keyed by provider name
pub struct SecretStore {
    path: PathBuf,
    passphrase: String,
}

impl SecretStore {
    /// Create a secret store backed by the given file.
    pub fn new(path: PathBuf, passphrase: impl Into<String>) -> Self {
        Self {
            path,
            passphrase: passphrase.into(),
        }
    }

    /// Create a secret store over the default stash location.
    pub fn open_default(passphrase: impl Into<String>) -> AppResult<Self> {
        ensure_stash_dir()?;
        Ok(Self::new(secrets_path()?, passphrase))
    }

    /// Store a secret for `provider`, replacing any previous value.
    pub fn set(&self, provider: &str, secret: &str) -> AppResult<()> {
        let mut file = self.read_file()?;
        let key = self.derive_key(&file)?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), secret.as_bytes())
            .map_err(|e| AppError::secrets(format!("Failed to encrypt secret: {}", e)))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend_from_slice(&ciphertext);
        file.entries
            .insert(provider.to_string(), BASE64.encode(sealed));

        self.write_file(&file)?;
        debug!(provider, "Stored secret");
        Ok(())
    }

    /// Retrieve the secret for `provider`, if one is stored.
    pub fn get(&self, provider: &str) -> AppResult<Option<String>> {
        let file = self.read_file()?;
        let Some(encoded) = file.entries.get(provider) else {
            return Ok(None);
        };
        let key = self.derive_key(&file)?;

        let sealed = BASE64
            .decode(encoded)
            .map_err(|e| AppError::secrets(format!("Corrupt secret entry: {}", e)))?;
        if sealed.len() < NONCE_LEN {
            return Err(AppError::secrets("Corrupt secret entry: too short"));
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| AppError::secrets("Failed to decrypt secret (wrong passphrase?)"))?;

        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|e| AppError::secrets(format!("Secret is not valid UTF-8: {}", e)))
    }

    /// Remove the secret for `provider`. Returns whether one existed.
    pub fn delete(&self, provider: &str) -> AppResult<bool> {
        let mut file = self.read_file()?;
        let existed = file.entries.remove(provider).is_some();
        if existed {
            self.write_file(&file)?;
        }
        Ok(existed)
    }

    /// Whether a secret is stored for `provider`.
    pub fn has(&self, provider: &str) -> bool {
        self.read_file()
            .map(|file| file.entries.contains_key(provider))
            .unwrap_or(false)
    }

    fn read_file(&self) -> AppResult<SecretsFile> {
        if !self.path.exists() {
            let mut salt = [0u8; SALT_LEN];
            rand::thread_rng().fill_bytes(&mut salt);
            return Ok(SecretsFile {
                salt: BASE64.encode(salt),
                entries: BTreeMap::new(),
            });
        }
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::secrets(format!("Corrupt secrets file: {}", e)))
    }

    fn write_file(&self, file: &SecretsFile) -> AppResult<()> {
        let content = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn derive_key(&self, file: &SecretsFile) -> AppResult<[u8; 32]> {
        let salt = BASE64
            .decode(&file.salt)
            .map_err(|e| AppError::secrets(format!("Corrupt secrets salt: {}", e)))?;
        let mut key = [0u8; 32];
        pbkdf2_hmac::<Sha256>(self.passphrase.as_bytes(), &salt, PBKDF2_ROUNDS, &mut key);
        Ok(key)
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed credential store with AES-256-GCM encryption at rest.
//!
//! One file per key. The store key name is bound in as associated data, so a
//! file copied over another key's file fails to decrypt instead of being read
//! as the wrong secret.

use super::CredentialStore;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hkdf::Hkdf;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use serde_json::Value;
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const HKDF_SALT: &[u8] = b"app-session/credential-store";
const HKDF_INFO: &[u8] = b"aes-256-gcm v1";
const FILE_EXTENSION: &str = "enc";

/// Encrypted on-disk credential store.
#[derive(Clone)]
pub struct EncryptedFileStore {
    dir: PathBuf,
    key: Arc<LessSafeKey>,
    rng: SystemRandom,
}

impl EncryptedFileStore {
    /// Open (creating if needed) a store in `dir`, keyed by `device_secret`.
    pub async fn open(dir: impl Into<PathBuf>, device_secret: &[u8]) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::StorageUnavailable(format!("cannot create {}: {e}", dir.display()))
        })?;

        let mut okm = [0u8; 32];
        Hkdf::<Sha256>::new(Some(HKDF_SALT), device_secret)
            .expand(HKDF_INFO, &mut okm)
            .map_err(|e| AppError::Crypto(format!("store key derivation failed: {e}")))?;

        let unbound = UnboundKey::new(&AES_256_GCM, &okm)
            .map_err(|_| AppError::Crypto("invalid store key".to_string()))?;

        tracing::debug!(dir = %dir.display(), "Opened encrypted credential store");

        Ok(Self {
            dir,
            key: Arc::new(LessSafeKey::new(unbound)),
            rng: SystemRandom::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`. Hex-encoding keeps arbitrary key names path-safe.
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{FILE_EXTENSION}", hex::encode(key.as_bytes())))
    }

    /// Seal plaintext; returns base64(nonce || ciphertext || tag).
    fn seal(&self, key: &str, plaintext: &[u8]) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| AppError::Crypto("nonce generation failed".to_string()))?;

        let mut in_out = plaintext.to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(key.as_bytes()),
                &mut in_out,
            )
            .map_err(|_| AppError::Crypto("encryption failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(BASE64.encode(sealed))
    }

    /// Reverse of [`seal`](Self::seal).
    fn open_sealed(&self, key: &str, encoded: &str) -> Result<Vec<u8>> {
        let sealed = BASE64
            .decode(encoded.trim())
            .map_err(|e| AppError::StorageUnavailable(format!("corrupt entry {key}: {e}")))?;
        if sealed.len() < NONCE_LEN {
            return Err(AppError::StorageUnavailable(format!(
                "corrupt entry {key}: truncated"
            )));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| AppError::StorageUnavailable(format!("corrupt entry {key}: nonce")))?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(key.as_bytes()), &mut in_out)
            .map_err(|_| {
                AppError::StorageUnavailable(format!("entry {key} failed authentication"))
            })?;
        Ok(plaintext.to_vec())
    }
}

#[async_trait]
impl CredentialStore for EncryptedFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        let encoded = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::StorageUnavailable(format!(
                    "read {}: {e}",
                    path.display()
                )))
            }
        };

        let plaintext = self.open_sealed(key, &encoded)?;
        serde_json::from_slice(&plaintext)
            .map(Some)
            .map_err(|e| AppError::StorageUnavailable(format!("malformed entry {key}: {e}")))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let plaintext = serde_json::to_vec(&value)
            .map_err(|e| AppError::StorageWrite(format!("serialize {key}: {e}")))?;
        let sealed = self
            .seal(key, &plaintext)
            .map_err(|e| AppError::StorageWrite(e.to_string()))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, sealed)
            .await
            .map_err(|e| AppError::StorageWrite(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| AppError::StorageWrite(format!("rename {}: {e}", path.display())))?;

        tracing::debug!(key, "Credential entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageWrite(format!(
                "remove {}: {e}",
                path.display()
            ))),
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Secure credential store.

pub mod encrypted_file;
pub mod memory;

pub use encrypted_file::EncryptedFileStore;
pub use memory::MemoryStore;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Store key names as constants.
pub mod keys {
    pub const PRIVATE_KEY: &str = "privKey";
    pub const PUBLIC_KEY: &str = "pubKey";
    pub const AUTH_CREDENTIALS: &str = "auth-credentials";
    pub const USER_SETTINGS: &str = "user-settings";

    /// Every key the session layer owns.
    pub const ALL: [&str; 4] = [PRIVATE_KEY, PUBLIC_KEY, AUTH_CREDENTIALS, USER_SETTINGS];
}

/// Key-value store for secrets, encrypted at rest by the implementation.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read and deserialize a typed value.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn CredentialStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::StorageUnavailable(format!("malformed value at {key}: {e}"))),
        None => Ok(None),
    }
}

/// Serialize and write a typed value.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn CredentialStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let value = serde_json::to_value(value)
        .map_err(|e| AppError::StorageWrite(format!("serialize {key}: {e}")))?;
    store.set(key, value).await
}

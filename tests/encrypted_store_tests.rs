// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Encrypted file store persistence and tamper tests.

use app_session::error::AppError;
use app_session::storage::{keys, CredentialStore, EncryptedFileStore};
use serde_json::json;

const SECRET: &[u8] = b"device-secret-for-tests";

#[tokio::test]
async fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let store = EncryptedFileStore::open(dir.path(), SECRET).await.unwrap();
    store
        .set(keys::AUTH_CREDENTIALS, json!({ "accessToken": "tok1" }))
        .await
        .unwrap();
    drop(store);

    let reopened = EncryptedFileStore::open(dir.path(), SECRET).await.unwrap();
    let value = reopened.get(keys::AUTH_CREDENTIALS).await.unwrap();
    assert_eq!(value, Some(json!({ "accessToken": "tok1" })));
    assert_eq!(reopened.get(keys::USER_SETTINGS).await.unwrap(), None);
}

#[tokio::test]
async fn test_plaintext_not_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = EncryptedFileStore::open(dir.path(), SECRET).await.unwrap();
    store
        .set(keys::PRIVATE_KEY, json!("very-secret-seed"))
        .await
        .unwrap();

    let mut entries = std::fs::read_dir(dir.path()).unwrap();
    let entry = entries.next().unwrap().unwrap();
    let contents = std::fs::read_to_string(entry.path()).unwrap();
    assert!(!contents.contains("very-secret-seed"));
    assert!(entries.next().is_none(), "temp files must be renamed away");
}

#[tokio::test]
async fn test_wrong_secret_cannot_read() {
    let dir = tempfile::tempdir().unwrap();
    let store = EncryptedFileStore::open(dir.path(), SECRET).await.unwrap();
    store.set(keys::PUBLIC_KEY, json!("pk1")).await.unwrap();

    let other = EncryptedFileStore::open(dir.path(), b"another-device-secret")
        .await
        .unwrap();
    let result = other.get(keys::PUBLIC_KEY).await;
    assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
}

#[tokio::test]
async fn test_swapped_entry_fails_authentication() {
    let dir = tempfile::tempdir().unwrap();
    let store = EncryptedFileStore::open(dir.path(), SECRET).await.unwrap();
    store.set(keys::PUBLIC_KEY, json!("pk1")).await.unwrap();
    store.set(keys::PRIVATE_KEY, json!("sk1")).await.unwrap();

    let file_for = |key: &str| dir.path().join(format!("{}.enc", hex::encode(key)));
    std::fs::copy(file_for(keys::PUBLIC_KEY), file_for(keys::PRIVATE_KEY)).unwrap();

    assert!(store.get(keys::PRIVATE_KEY).await.is_err());
    assert_eq!(store.get(keys::PUBLIC_KEY).await.unwrap(), Some(json!("pk1")));
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = EncryptedFileStore::open(dir.path(), SECRET).await.unwrap();
    store.set(keys::USER_SETTINGS, json!({})).await.unwrap();

    store.remove(keys::USER_SETTINGS).await.unwrap();
    store.remove(keys::USER_SETTINGS).await.unwrap();
    assert_eq!(store.get(keys::USER_SETTINGS).await.unwrap(), None);
}

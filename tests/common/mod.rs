// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use app_session::config::Config;
use app_session::error::{AppError, Result};
use app_session::models::{AccessTokenDto, KeyMaterial};
use app_session::services::{ChallengeMode, ChallengeSequence, SessionBootstrapper, TokenSink};
use app_session::storage::{keys, CredentialStore, MemoryStore};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the fake authority answers.
#[allow(dead_code)]
#[derive(Clone)]
pub enum Reply {
    Accept(AccessTokenDto),
    /// Decline silent attempts, accept the user-initiated one.
    AcceptInteractive(AccessTokenDto),
    Decline,
    Fail,
    Hang,
    Panic,
}

/// Challenge sequence with a canned answer that records its calls.
pub struct ScriptedChallenge {
    reply: Reply,
    calls: AtomicUsize,
    modes: Mutex<Vec<ChallengeMode>>,
    public_keys: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedChallenge {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            modes: Mutex::new(Vec::new()),
            public_keys: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn modes(&self) -> Vec<ChallengeMode> {
        self.modes.lock().unwrap().clone()
    }

    pub fn public_keys(&self) -> Vec<String> {
        self.public_keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChallengeSequence for ScriptedChallenge {
    async fn start_challenge_sequence(
        &self,
        keys: &KeyMaterial,
        mode: ChallengeMode,
    ) -> Result<Option<AccessTokenDto>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.modes.lock().unwrap().push(mode);
        self.public_keys
            .lock()
            .unwrap()
            .push(keys.public_key.clone());

        match &self.reply {
            Reply::Accept(dto) => Ok(Some(dto.clone())),
            Reply::AcceptInteractive(dto) if mode == ChallengeMode::Interactive => {
                Ok(Some(dto.clone()))
            }
            Reply::AcceptInteractive(_) => Ok(None),
            Reply::Decline if mode == ChallengeMode::Interactive => {
                Err(AppError::ChallengeRejected)
            }
            Reply::Decline => Ok(None),
            Reply::Fail => Err(AppError::ChallengeTransport("connection reset".to_string())),
            Reply::Hang => std::future::pending().await,
            Reply::Panic => panic!("authority client crashed"),
        }
    }
}

/// Token sink that remembers every call.
#[derive(Default)]
pub struct RecordingSink {
    tokens: Mutex<Vec<String>>,
    clears: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl TokenSink for RecordingSink {
    fn set_authorization_token(&self, token: &str) {
        self.tokens.lock().unwrap().push(token.to_string());
    }

    fn clear_authorization_token(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Memory store that can be told to fail reads or writes.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

#[async_trait]
impl CredentialStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        if self.fail_reads {
            return Err(AppError::StorageUnavailable("keystore locked".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        if self.fail_writes {
            return Err(AppError::StorageWrite("disk full".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await
    }
}

/// Store holding device keys `pk1` / `sk1`.
#[allow(dead_code)]
pub fn store_with_keys() -> MemoryStore {
    MemoryStore::with_entries([
        (keys::PUBLIC_KEY, json!("pk1")),
        (keys::PRIVATE_KEY, json!("sk1")),
    ])
}

#[allow(dead_code)]
pub fn dto(token: &str, username: &str, profile_type: &str, id: &str) -> AccessTokenDto {
    AccessTokenDto {
        access_token: token.to_string(),
        username: username.to_string(),
        profile_type: profile_type.to_string(),
        id: id.to_string(),
        hourly_rate: None,
        expires_at: None,
    }
}

/// Config with a short challenge timeout for tests.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        challenge_timeout: Duration::from_millis(200),
        ..Config::default()
    }
}

#[allow(dead_code)]
pub fn bootstrapper(
    store: Arc<dyn CredentialStore>,
    challenge: Arc<ScriptedChallenge>,
    sink: Arc<RecordingSink>,
) -> SessionBootstrapper {
    SessionBootstrapper::new(&test_config(), store, challenge, sink)
}

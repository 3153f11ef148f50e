// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session bootstrap: decide once per mount whether the user is signed in.
//!
//! The bootstrap is fail-closed. Storage errors, transport errors, timeouts
//! and malformed authority payloads all end in the unauthorized state, and
//! `is_auth_loaded` is always reached.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{AuthState, KeyMaterial, SessionCredentials};
use crate::services::challenge::{ChallengeMode, ChallengeSequence};
use crate::services::request_context::TokenSink;
use crate::storage::{get_json, keys, set_json, CredentialStore};
use crate::time_utils::{format_utc_rfc3339, is_still_valid};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Result of one resolution pass, before any side effect is applied.
struct Outcome {
    state: AuthState,
    token: Option<String>,
}

impl Outcome {
    fn unauthorized() -> Self {
        Self {
            state: AuthState::unauthorized(),
            token: None,
        }
    }

    fn authorized(credentials: SessionCredentials, settings: Option<Value>) -> Self {
        Self {
            state: AuthState::authorized(credentials.user_summary(settings)),
            token: Some(credentials.access_token),
        }
    }
}

/// Everything read from the store at startup.
struct StoredSession {
    cached: Option<Value>,
    keys: Option<KeyMaterial>,
    settings: Option<Value>,
}

/// Resumes or re-establishes the session at application start.
///
/// Every state it settles on (bootstrap, interactive login, forgetting the
/// device) is published to the receivers handed out by [`mount`](Self::mount).
pub struct SessionBootstrapper {
    store: Arc<dyn CredentialStore>,
    challenge: Arc<dyn ChallengeSequence>,
    token_sink: Arc<dyn TokenSink>,
    state: watch::Sender<AuthState>,
    challenge_timeout: Duration,
    clock_skew_secs: i64,
}

impl SessionBootstrapper {
    pub fn new(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        challenge: Arc<dyn ChallengeSequence>,
        token_sink: Arc<dyn TokenSink>,
    ) -> Self {
        Self {
            store,
            challenge,
            token_sink,
            state: watch::channel(AuthState::loading()).0,
            challenge_timeout: config.challenge_timeout,
            clock_skew_secs: config.clock_skew_secs,
        }
    }

    /// Run the bootstrap to completion and return the terminal state.
    ///
    /// Never fails: errors are logged and resolve to unauthorized.
    pub async fn bootstrap(&self) -> AuthState {
        let outcome = self.resolve().await;
        self.apply(outcome)
    }

    /// Like [`bootstrap`](Self::bootstrap), but gives up without touching
    /// the token sink once `lifetime` is cancelled.
    pub async fn bootstrap_until(&self, lifetime: &LifetimeToken) -> Option<AuthState> {
        let outcome = tokio::select! {
            _ = lifetime.cancelled() => {
                tracing::debug!("Session bootstrap cancelled before completion");
                return None;
            }
            outcome = self.resolve() => outcome,
        };

        if lifetime.is_cancelled() {
            return None;
        }
        Some(self.apply(outcome))
    }

    /// Spawn the bootstrap for a freshly mounted app and return its handle.
    ///
    /// The bootstrap runs in its own task. If that task dies (a panic in a
    /// collaborator), the mount still settles on unauthorized.
    pub fn mount(self: Arc<Self>) -> AppLogin {
        self.state.send_replace(AuthState::loading());
        let state = self.state.subscribe();
        let (lifetime, token) = Lifetime::new();

        tokio::spawn(async move {
            let worker = Arc::clone(&self);
            let worker_token = token.clone();
            let run = tokio::spawn(async move { worker.bootstrap_until(&worker_token).await });

            if let Err(e) = run.await {
                tracing::error!(error = %e, "Session bootstrap task died, continuing signed out");
                if !token.is_cancelled() {
                    self.apply(Outcome::unauthorized());
                }
            }
        });

        AppLogin {
            state,
            _lifetime: lifetime,
        }
    }

    /// User-initiated login with the device key.
    ///
    /// Unlike the bootstrap, failures are returned so the login screen can
    /// show them. A successful login is also published to mounted handles.
    pub async fn login(&self) -> Result<AuthState> {
        let stored = self.read_stored().await?;
        let keys = stored.keys.ok_or(AppError::Unauthorized)?;

        let credentials = self
            .run_challenge(&keys, ChallengeMode::Interactive)
            .await?
            .ok_or(AppError::ChallengeRejected)?;

        self.persist(&credentials).await;
        Ok(self.apply(Outcome::authorized(credentials, stored.settings)))
    }

    /// Remove every secret this device holds and drop the bearer token.
    pub async fn forget_device(&self) -> Result<()> {
        self.apply(Outcome::unauthorized());
        for key in keys::ALL {
            self.store.remove(key).await?;
        }
        tracing::info!("Device credentials removed");
        Ok(())
    }

    async fn resolve(&self) -> Outcome {
        match self.try_resolve().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    transient = e.is_transient(),
                    "Session bootstrap failed, continuing signed out"
                );
                Outcome::unauthorized()
            }
        }
    }

    async fn try_resolve(&self) -> Result<Outcome> {
        let stored = self.read_stored().await?;

        let Some(keys) = stored.keys else {
            tracing::debug!("No device keys, starting signed out");
            return Ok(Outcome::unauthorized());
        };

        if let Some(credentials) = self.resumable(stored.cached) {
            tracing::info!(
                user_id = %credentials.id,
                expires_at = ?credentials.expires_at.map(format_utc_rfc3339),
                "Resuming cached session"
            );
            return Ok(Outcome::authorized(credentials, stored.settings));
        }

        match self.run_challenge(&keys, ChallengeMode::Silent).await? {
            Some(credentials) => {
                self.persist(&credentials).await;
                tracing::info!(user_id = %credentials.id, "Silent re-authentication succeeded");
                Ok(Outcome::authorized(credentials, stored.settings))
            }
            None => {
                tracing::info!("Silent re-authentication declined");
                Ok(Outcome::unauthorized())
            }
        }
    }

    async fn read_stored(&self) -> Result<StoredSession> {
        let store = self.store.as_ref();

        let cached = store.get(keys::AUTH_CREDENTIALS).await?;
        let private_key: Option<String> = get_json(store, keys::PRIVATE_KEY).await?;
        let public_key: Option<String> = get_json(store, keys::PUBLIC_KEY).await?;
        let settings = store.get(keys::USER_SETTINGS).await?;

        let keys = match (private_key, public_key) {
            (Some(private_key), Some(public_key))
                if !private_key.is_empty() && !public_key.is_empty() =>
            {
                Some(KeyMaterial {
                    private_key,
                    public_key,
                })
            }
            _ => None,
        };

        Ok(StoredSession {
            cached,
            keys,
            settings,
        })
    }

    /// Cached credentials worth resuming: well-formed and not about to expire.
    fn resumable(&self, cached: Option<Value>) -> Option<SessionCredentials> {
        let credentials: SessionCredentials = match serde_json::from_value(cached?) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable cached credentials");
                return None;
            }
        };

        if credentials.access_token.is_empty() {
            return None;
        }
        if !is_still_valid(credentials.expires_at, Utc::now(), self.clock_skew_secs) {
            tracing::debug!(
                expires_at = ?credentials.expires_at.map(format_utc_rfc3339),
                "Cached session expired or has no expiry"
            );
            return None;
        }
        Some(credentials)
    }

    async fn run_challenge(
        &self,
        keys: &KeyMaterial,
        mode: ChallengeMode,
    ) -> Result<Option<SessionCredentials>> {
        let exchange = self.challenge.start_challenge_sequence(keys, mode);
        let dto = tokio::time::timeout(self.challenge_timeout, exchange)
            .await
            .map_err(|_| AppError::ChallengeTimeout(self.challenge_timeout))??;

        dto.map(SessionCredentials::try_from).transpose()
    }

    /// Write refreshed credentials. A failed write is logged and otherwise
    /// ignored; the in-memory session stays valid.
    async fn persist(&self, credentials: &SessionCredentials) {
        if let Err(e) = set_json(self.store.as_ref(), keys::AUTH_CREDENTIALS, credentials).await {
            tracing::warn!(error = %e, "Failed to persist session credentials");
        }
    }

    fn apply(&self, outcome: Outcome) -> AuthState {
        match &outcome.token {
            Some(token) => self.token_sink.set_authorization_token(token),
            None => self.token_sink.clear_authorization_token(),
        }
        self.state.send_replace(outcome.state.clone());
        outcome.state
    }
}

/// Owner side of a mount lifetime. Cancels on drop.
pub struct Lifetime {
    tx: watch::Sender<bool>,
}

/// Observer side of a mount lifetime.
#[derive(Clone)]
pub struct LifetimeToken {
    rx: watch::Receiver<bool>,
}

impl Lifetime {
    pub fn new() -> (Self, LifetimeToken) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, LifetimeToken { rx })
    }
}

impl Drop for Lifetime {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

impl LifetimeToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the owner cancels or goes away.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Handle returned by [`SessionBootstrapper::mount`].
///
/// Dropping it is the unmount: the bootstrap task stops and publishes nothing.
/// Later interactive logins on the same bootstrapper still reach subscribers.
pub struct AppLogin {
    state: watch::Receiver<AuthState>,
    _lifetime: Lifetime,
}

impl AppLogin {
    /// Current snapshot (`Loading` until the bootstrap finishes).
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Wait until `is_auth_loaded` and return that state.
    pub async fn loaded(&mut self) -> AuthState {
        let loaded = self
            .state
            .wait_for(|state| state.is_auth_loaded())
            .await
            .map(|state| state.clone())
            .ok();
        loaded.unwrap_or_else(|| self.state.borrow().clone())
    }

    /// Receiver for components that want to follow changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    pub fn unmount(self) {}
}

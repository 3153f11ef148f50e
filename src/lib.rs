// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! app-session: session layer for the booking client
//!
//! This crate resumes or re-establishes the user's session at app start
//! using device keys kept in an encrypted credential store, and exposes
//! the resulting authorization state to the UI.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use services::{AccountClient, HttpChallengeClient, RequestContext, SessionBootstrapper};
use std::sync::Arc;
use storage::CredentialStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn CredentialStore>,
    pub request_context: RequestContext,
    pub bootstrapper: Arc<SessionBootstrapper>,
    pub account: AccountClient,
}

impl AppState {
    /// Wire the HTTP authority clients around `store`.
    pub fn new(config: Config, store: Arc<dyn CredentialStore>) -> error::Result<Self> {
        let request_context = RequestContext::new();
        let challenge = Arc::new(HttpChallengeClient::new(&config.api_url)?);
        let bootstrapper = Arc::new(SessionBootstrapper::new(
            &config,
            store.clone(),
            challenge,
            Arc::new(request_context.clone()),
        ));
        let account = AccountClient::new(&config.api_url, request_context.clone())?;

        Ok(Self {
            config,
            store,
            request_context,
            bootstrapper,
            account,
        })
    }
}

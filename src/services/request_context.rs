// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token carried by outbound requests.
//!
//! Passed explicitly to every client that talks to the authority instead of
//! living in a process-wide global.

use std::sync::{Arc, RwLock};

/// Receives the bearer token once a session is established.
pub trait TokenSink: Send + Sync {
    fn set_authorization_token(&self, token: &str);
    fn clear_authorization_token(&self);
}

/// Shared, cloneable request context.
#[derive(Clone, Default)]
pub struct RequestContext {
    token: Arc<RwLock<Option<String>>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Attach the bearer token to a request, if one is set.
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl TokenSink for RequestContext {
    fn set_authorization_token(&self, token: &str) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
    }

    fn clear_authorization_token(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

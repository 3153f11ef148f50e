// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge-response login against the remote authority.
//!
//! Handles:
//! - Nonce request for the device public key
//! - Signing the nonce with the device key
//! - Exchanging the signature for an access token
//! - Mapping rejections separately from transport failures

use crate::error::{AppError, Result};
use crate::models::{AccessTokenDto, KeyMaterial};
use crate::services::signer::DeviceSigner;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Whether the user is present to see a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeMode {
    /// Startup re-authentication; a rejection is an expected outcome.
    Silent,
    /// User pressed "log in"; a rejection is an error to show.
    Interactive,
}

impl ChallengeMode {
    pub fn is_interactive(&self) -> bool {
        matches!(self, ChallengeMode::Interactive)
    }
}

/// Proves control of the device key to the authority.
#[async_trait]
pub trait ChallengeSequence: Send + Sync {
    /// Run one challenge exchange.
    ///
    /// `Ok(None)` means the authority declined a silent attempt. Interactive
    /// attempts report a decline as [`AppError::ChallengeRejected`].
    async fn start_challenge_sequence(
        &self,
        keys: &KeyMaterial,
        mode: ChallengeMode,
    ) -> Result<Option<AccessTokenDto>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChallengeRequest<'a> {
    public_key: &'a str,
}

/// Nonce issued by the authority.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub challenge_id: String,
    /// Base64 nonce bytes to sign
    pub challenge: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    public_key: &'a str,
    challenge_id: &'a str,
    signature: String,
    interactive: bool,
}

/// HTTP implementation of the challenge sequence.
#[derive(Clone)]
pub struct HttpChallengeClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpChallengeClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the authority for a nonce bound to `public_key`.
    async fn request_challenge(&self, public_key: &str) -> Result<Option<ChallengeResponse>> {
        let response = self
            .http
            .post(format!("{}/auth/challenge", self.base_url))
            .json(&ChallengeRequest { public_key })
            .send()
            .await
            .map_err(|e| AppError::ChallengeTransport(format!("challenge request failed: {e}")))?;

        self.check_response_json(response).await
    }

    /// Submit the signed nonce.
    async fn verify(&self, body: &VerifyRequest<'_>) -> Result<Option<AccessTokenDto>> {
        let response = self
            .http
            .post(format!("{}/auth/verify", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::ChallengeTransport(format!("verify request failed: {e}")))?;

        self.check_response_json(response).await
    }

    /// Parse a success body; `None` for statuses meaning "not you".
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>> {
        let status = response.status();

        if is_rejection(status) {
            tracing::debug!(status = status.as_u16(), "Authority declined challenge");
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ChallengeTransport(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| AppError::InvalidPayload(format!("JSON parse error: {e}")))
    }
}

fn is_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
    )
}

#[async_trait]
impl ChallengeSequence for HttpChallengeClient {
    async fn start_challenge_sequence(
        &self,
        keys: &KeyMaterial,
        mode: ChallengeMode,
    ) -> Result<Option<AccessTokenDto>> {
        let signer = DeviceSigner::from_key_material(keys)?;
        let public_key = signer.public_key_base64();

        let outcome = match self.request_challenge(&public_key).await? {
            Some(challenge) => {
                let nonce = BASE64.decode(challenge.challenge.trim()).map_err(|e| {
                    AppError::InvalidPayload(format!("challenge decode failed: {e}"))
                })?;

                let body = VerifyRequest {
                    public_key: &public_key,
                    challenge_id: &challenge.challenge_id,
                    signature: signer.sign(&nonce),
                    interactive: mode.is_interactive(),
                };
                self.verify(&body).await?
            }
            None => None,
        };

        match (outcome, mode) {
            (Some(dto), _) => {
                tracing::info!(user_id = %dto.id, "Challenge accepted");
                Ok(Some(dto))
            }
            (None, ChallengeMode::Interactive) => Err(AppError::ChallengeRejected),
            (None, ChallengeMode::Silent) => Ok(None),
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account API client and the profile update flow built on it.

use crate::error::{AppError, Result};
use crate::models::{AccountUpdate, ProfileState, UpdateUserResponse};
use crate::services::request_context::RequestContext;
use serde::Deserialize;
use std::time::Duration;
use validator::Validate;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// What the account screen shows after an update attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub message: String,
    pub status: u16,
    pub updated: bool,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the authenticated account endpoints.
#[derive(Clone)]
pub struct AccountClient {
    http: reqwest::Client,
    base_url: String,
    context: RequestContext,
}

impl AccountClient {
    pub fn new(base_url: &str, context: RequestContext) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            context,
        })
    }

    /// `PUT /users/{id}` with the current bearer token.
    pub async fn update_user(&self, id: &str, values: &AccountUpdate) -> Result<UpdateUserResponse> {
        if !self.context.is_authenticated() {
            return Err(AppError::Unauthorized);
        }
        values.validate()?;

        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(id));
        let response = self
            .context
            .authorize(self.http.put(&url))
            .json(values)
            .send()
            .await
            .map_err(|e| AppError::Api {
                status: 503,
                message: format!("account request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or(body);

            if status.as_u16() == 401 {
                tracing::warn!("Account update rejected, token no longer valid");
                return Err(AppError::Unauthorized);
            }
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::InvalidPayload(format!("JSON parse error: {e}")))
    }

    /// Update the account and fold the server's record into `profile`.
    ///
    /// Failures are reported in the outcome with [`AppError::status_code`];
    /// `profile` is left untouched on failure.
    pub async fn update_account_info(
        &self,
        profile: &mut ProfileState,
        values: &AccountUpdate,
        id: &str,
    ) -> UpdateOutcome {
        match self.update_user(id, values).await {
            Ok(response) => match response.record {
                Some(record) => {
                    profile.apply_record(&record);
                    tracing::info!(user_id = %record.id, "Account updated");
                    UpdateOutcome {
                        message: response.message,
                        status: response.status,
                        updated: true,
                    }
                }
                None => UpdateOutcome {
                    message: response.message,
                    status: response.status,
                    updated: false,
                },
            },
            Err(e) => {
                tracing::warn!(error = %e, "Account update failed");
                UpdateOutcome {
                    message: e.to_string(),
                    status: e.status_code(),
                    updated: false,
                }
            }
        }
    }
}

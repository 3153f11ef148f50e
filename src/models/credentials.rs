// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session credentials, device key material and the raw authority payload.

use crate::error::AppError;
use crate::models::user::{ProfileType, UserProfile, UserSummary};
use crate::time_utils::from_unix_secs;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Device keypair (base64 Ed25519 seed and public key).
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub private_key: String,
    pub public_key: String,
}

// Keep the seed out of logs.
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Access token payload exactly as the authority returns it.
///
/// Untrusted: convert with [`SessionCredentials::try_from`] before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenDto {
    pub access_token: String,
    pub username: String,
    pub profile_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    /// RFC 3339; optional on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Validated session credentials, persisted under `auth-credentials`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub username: String,
    pub profile_type: ProfileType,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("username", &self.username)
            .field("profile_type", &self.profile_type)
            .field("id", &self.id)
            .field("hourly_rate", &self.hourly_rate)
            .finish()
    }
}

impl SessionCredentials {
    /// Build the user summary these credentials describe.
    pub fn user_summary(&self, settings: Option<serde_json::Value>) -> UserSummary {
        let profile = match self.profile_type {
            ProfileType::Attendee => UserProfile::Attendee,
            ProfileType::Organizer => UserProfile::Organizer {
                hourly_rate: self.hourly_rate,
            },
        };

        UserSummary {
            username: self.username.clone(),
            id: self.id.clone(),
            profile,
            settings,
        }
    }
}

impl TryFrom<AccessTokenDto> for SessionCredentials {
    type Error = AppError;

    fn try_from(dto: AccessTokenDto) -> Result<Self, Self::Error> {
        if dto.access_token.trim().is_empty() {
            return Err(AppError::InvalidPayload("empty access token".to_string()));
        }
        if dto.id.trim().is_empty() {
            return Err(AppError::InvalidPayload("empty user id".to_string()));
        }
        let profile_type: ProfileType = dto
            .profile_type
            .parse()
            .map_err(AppError::InvalidPayload)?;

        let expires_at = match dto.expires_at.as_deref() {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| AppError::InvalidPayload(format!("bad expiresAt {raw:?}: {e}")))?
                    .with_timezone(&Utc),
            ),
            None => jwt_expiry(&dto.access_token),
        };

        Ok(Self {
            access_token: dto.access_token,
            expires_at,
            username: dto.username,
            profile_type,
            id: dto.id,
            hourly_rate: dto.hourly_rate,
        })
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT access token without verifying it.
///
/// The authority verifies its own tokens; the client only uses `exp` to decide
/// whether a cached session is worth resuming. Opaque tokens yield `None`.
pub fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims.exp.and_then(from_unix_secs)
}

//! Signed-in user summary and the authorization state exposed to the UI.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Profile kind as sent by the authority (`"attendee"` / `"organizer"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "src/lib/generated/")
)]
pub enum ProfileType {
    Attendee,
    Organizer,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Attendee => "attendee",
            ProfileType::Organizer => "organizer",
        }
    }
}

impl std::str::FromStr for ProfileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attendee" => Ok(ProfileType::Attendee),
            "organizer" => Ok(ProfileType::Organizer),
            other => Err(format!("unknown profile type: {other:?}")),
        }
    }
}

/// Profile-specific part of a user summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "profileType", rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "src/lib/generated/")
)]
pub enum UserProfile {
    Attendee,
    Organizer {
        #[serde(
            rename = "hourlyRate",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        hourly_rate: Option<f64>,
    },
}

/// Summary of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "src/lib/generated/")
)]
pub struct UserSummary {
    pub username: String,
    pub id: String,
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Cached user settings blob, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub settings: Option<serde_json::Value>,
}

impl UserSummary {
    pub fn profile_type(&self) -> ProfileType {
        match self.profile {
            UserProfile::Attendee => ProfileType::Attendee,
            UserProfile::Organizer { .. } => ProfileType::Organizer,
        }
    }

    pub fn hourly_rate(&self) -> Option<f64> {
        match self.profile {
            UserProfile::Attendee => None,
            UserProfile::Organizer { hourly_rate } => hourly_rate,
        }
    }
}

/// Where the bootstrap currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    NotStarted,
    Loading,
    Authorized,
    Unauthorized,
}

/// Authorization state published to the rest of the application.
///
/// Fields are private so `is_authorized` can never be set without a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "src/lib/generated/")
)]
pub struct AuthState {
    is_authorized: bool,
    is_auth_loaded: bool,
    user: Option<UserSummary>,
    #[serde(skip)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    started: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            is_authorized: false,
            is_auth_loaded: false,
            user: None,
            started: false,
        }
    }
}

impl AuthState {
    /// Bootstrap task is running.
    pub fn loading() -> Self {
        Self {
            started: true,
            ..Self::default()
        }
    }

    pub fn authorized(user: UserSummary) -> Self {
        Self {
            is_authorized: true,
            is_auth_loaded: true,
            user: Some(user),
            started: true,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            is_authorized: false,
            is_auth_loaded: true,
            user: None,
            started: true,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.is_authorized
    }

    pub fn is_auth_loaded(&self) -> bool {
        self.is_auth_loaded
    }

    pub fn user(&self) -> Option<&UserSummary> {
        self.user.as_ref()
    }

    pub fn phase(&self) -> AuthPhase {
        match (self.started, self.is_auth_loaded, self.is_authorized) {
            (false, _, _) => AuthPhase::NotStarted,
            (true, false, _) => AuthPhase::Loading,
            (true, true, true) => AuthPhase::Authorized,
            (true, true, false) => AuthPhase::Unauthorized,
        }
    }
}

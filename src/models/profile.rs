//! Local profile state and the account update payloads.

use crate::models::user::ProfileType;
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Profile data shown on the profile and settings screens.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "src/lib/generated/")
)]
pub struct ProfileState {
    pub username: String,
    pub name: String,
    pub id: String,
    pub public_key: String,
    pub bio: Option<String>,
    pub profession: Option<String>,
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<String>,
    pub hourly_rate: Option<f64>,
    pub profile_type: Option<ProfileType>,
}

impl ProfileState {
    /// Back to the signed-out defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold an updated user record from the server into local state.
    ///
    /// Attendee records only carry identity fields; organizer records also
    /// carry the public profile.
    pub fn apply_record(&mut self, record: &UserRecord) {
        self.name = record.name.clone();
        self.username = record.username.clone();
        self.id = record.id.clone();

        if record.profile_type == ProfileType::Organizer {
            self.bio = record.bio.clone();
            self.skills = record.skills.clone();
            self.job_title = record.job_title.clone();
            self.profession = record.profession.clone();
            self.hourly_rate = record.hourly_rate;
        }
        self.profile_type = Some(record.profile_type);
    }
}

/// User record returned by the account API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: String,
    pub profile_type: ProfileType,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
}

/// Fields a user may change on their account.
///
/// Organizer-only fields are ignored by the server for attendees.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub hourly_rate: Option<f64>,
}

/// Response body of `PUT /users/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub record: Option<UserRecord>,
}

fn default_status() -> u16 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(profile_type: ProfileType) -> UserRecord {
        UserRecord {
            id: "u1".to_string(),
            username: "alice".to_string(),
            name: "Alice".to_string(),
            profile_type,
            bio: Some("Climber".to_string()),
            skills: Some("rust".to_string()),
            job_title: Some("Guide".to_string()),
            profession: Some("Outdoors".to_string()),
            hourly_rate: Some(80.0),
        }
    }

    #[test]
    fn test_apply_attendee_record_keeps_identity_only() {
        let mut state = ProfileState::default();
        state.apply_record(&record(ProfileType::Attendee));

        assert_eq!(state.username, "alice");
        assert_eq!(state.name, "Alice");
        assert_eq!(state.profile_type, Some(ProfileType::Attendee));
        assert_eq!(state.bio, None);
        assert_eq!(state.hourly_rate, None);
    }

    #[test]
    fn test_apply_organizer_record_sets_public_profile() {
        let mut state = ProfileState::default();
        state.apply_record(&record(ProfileType::Organizer));

        assert_eq!(state.bio.as_deref(), Some("Climber"));
        assert_eq!(state.job_title.as_deref(), Some("Guide"));
        assert_eq!(state.hourly_rate, Some(80.0));

        state.reset();
        assert_eq!(state, ProfileState::default());
    }

    #[test]
    fn test_account_update_validation() {
        let ok = AccountUpdate {
            username: Some("alice".to_string()),
            hourly_rate: Some(10.0),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let short = AccountUpdate {
            username: Some("al".to_string()),
            ..Default::default()
        };
        assert!(short.validate().is_err());

        let negative = AccountUpdate {
            hourly_rate: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_account_update_skips_unset_fields() {
        let update = AccountUpdate {
            job_title: Some("Guide".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "jobTitle": "Guide" }));
    }
}

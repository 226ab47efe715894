//! `GarminConnect` trait and reqwest-based client for the Garmin Connect API.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod auth;
pub mod config;
pub mod http_client;
pub mod resilient;
pub mod session;

#[derive(Debug, Error)]
pub enum GarminError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

impl GarminError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => GarminError::Auth(body),
            404 => GarminError::NotFound(body),
            422 => GarminError::InvalidInput(body),
            _ => GarminError::Status { status, body },
        }
    }
}

/// Opaque authentication state issued by the Garmin SSO exchange.
///
/// Only `access_token` is interpreted locally; everything else the service
/// returns is carried through `extra` and persisted verbatim, so the stored
/// session survives token-format changes on the service side.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Social profile of the signed-in user. `display_name` doubles as the
/// path key for several per-user endpoints.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub profile_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(n.to_string().into()),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Read-only view of the Garmin Connect API.
///
/// Per-day endpoints take an ISO-8601 `YYYY-MM-DD` date string; range
/// endpoints take an inclusive start/end pair. Payloads are returned as raw
/// JSON because the service schema is undocumented and shifts between
/// firmware generations.
#[async_trait]
pub trait GarminConnect: Send + Sync + 'static {
    // === Profile & devices ===

    async fn get_user_profile(&self) -> Result<UserProfile, GarminError>;
    async fn get_user_settings(&self) -> Result<Value, GarminError>;
    async fn get_devices(&self) -> Result<Value, GarminError>;
    async fn get_device_last_used(&self) -> Result<Value, GarminError>;

    // === Per-day wellness ===

    async fn get_daily_stats(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_sleep(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_heart_rate(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_hrv(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_stress(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_body_battery(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_respiration(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_spo2(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_steps(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_floors(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_intensity_minutes(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_hydration(&self, date: &str) -> Result<Value, GarminError>;

    // === Body & range endpoints ===

    async fn get_weigh_ins(&self, start: &str, end: &str) -> Result<Value, GarminError>;
    async fn get_body_composition(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_blood_pressure(&self, start: &str, end: &str) -> Result<Value, GarminError>;

    // === Activities ===

    async fn get_activities(&self, start: u32, limit: u32) -> Result<Value, GarminError>;
    async fn get_activity_types(&self) -> Result<Value, GarminError>;

    // === Training metrics ===

    async fn get_training_status(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_training_readiness(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_max_metrics(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_fitness_age(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_endurance_score(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_hill_score(&self, date: &str) -> Result<Value, GarminError>;
    async fn get_race_predictions(&self) -> Result<Value, GarminError>;
    async fn get_lactate_threshold(&self) -> Result<Value, GarminError>;

    // === Records, goals, badges, gear, workouts ===

    async fn get_personal_records(&self) -> Result<Value, GarminError>;
    async fn get_goals(&self, status: &str) -> Result<Value, GarminError>;
    async fn get_earned_badges(&self) -> Result<Value, GarminError>;
    async fn get_badge_challenges(&self) -> Result<Value, GarminError>;
    async fn get_gear(&self) -> Result<Value, GarminError>;
    async fn get_workouts(&self) -> Result<Value, GarminError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn user_profile_deserializes_numeric_profile_id() {
        let payload = json!({"displayName": "abc-123", "profileId": 991, "fullName": "Test User"});
        let p: super::UserProfile = serde_json::from_value(payload).expect("deserialize profile");
        assert_eq!(p.profile_id.unwrap(), "991");
        assert_eq!(p.display_name, "abc-123");
    }

    #[test]
    fn user_profile_rejects_structured_profile_id() {
        let payload = json!({"displayName": "abc-123", "profileId": {"nested": true}});
        let res: Result<super::UserProfile, _> = serde_json::from_value(payload);
        assert!(res.is_err());
    }

    #[test]
    fn user_profile_keeps_unknown_fields() {
        let payload = json!({"displayName": "abc-123", "garminGuid": "g-1"});
        let p: super::UserProfile = serde_json::from_value(payload).expect("deserialize profile");
        assert_eq!(p.extra.get("garminGuid").and_then(|v| v.as_str()), Some("g-1"));
    }

    #[test]
    fn session_token_round_trips_opaque_fields() {
        let payload = json!({
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "oauth_consumer": {"key": "k"},
            "expires_in": 3600
        });
        let token: super::SessionToken = serde_json::from_value(payload.clone()).expect("token");
        let back = serde_json::to_value(&token).expect("serialize token");
        assert_eq!(back, payload);
    }
}

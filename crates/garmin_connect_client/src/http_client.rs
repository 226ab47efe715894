//! HTTP client implementation for the Garmin Connect API.
//!
//! This module provides a reqwest-based implementation of the
//! [`GarminConnect`](crate::GarminConnect) trait. Endpoints live on the
//! per-service routes of the Connect backend (usersummary-service,
//! wellness-service, metrics-service, ...); several of them key the URL on
//! the signed-in user's display name, which is resolved lazily from the
//! social profile and cached for the lifetime of the client.

use crate::{GarminConnect, GarminError, SessionToken, UserProfile};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Client for the Garmin Connect API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestGarminClient {
    base_url: String,
    token: SessionToken,
    display_name: Arc<OnceCell<String>>,
    client: reqwest::Client,
}

impl ReqwestGarminClient {
    /// Create a client from an already-issued session token.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Connect API (e.g., "https://connectapi.garmin.com")
    /// * `token` - Session token from [`login`](Self::login) or the session store
    pub fn new(base_url: &str, token: SessionToken) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            display_name: Arc::new(OnceCell::new()),
            client,
        }
    }

    /// Exchange account credentials for a fresh session token.
    ///
    /// This is the unconditional fallback when no stored session is usable;
    /// a failure here (bad credentials, unreachable service) is fatal to the
    /// run.
    pub async fn login(
        base_url: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<SessionToken, GarminError> {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        let url = format!("{}/sso/signin", base_url.trim_end_matches('/'));
        let resp = client
            .post(&url)
            .json(&serde_json::json!({
                "username": email,
                "password": password.expose_secret(),
            }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body_snippet: String = body.chars().take(256).collect();
            return Err(GarminError::from_status(status.as_u16(), body_snippet));
        }
        Ok(resp.json::<SessionToken>().await?)
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url).bearer_auth(&self.token.access_token)
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GarminError> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(resp: reqwest::Response) -> GarminError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();
        GarminError::from_status(status, body_snippet)
    }

    /// Resolve and cache the display name used as a path key by several
    /// per-user endpoints.
    async fn display_name(&self) -> Result<String, GarminError> {
        let name = self
            .display_name
            .get_or_try_init(|| async {
                let profile = self.get_user_profile().await?;
                Ok::<_, GarminError>(profile.display_name)
            })
            .await?;
        Ok(name.clone())
    }
}

#[async_trait]
impl GarminConnect for ReqwestGarminClient {
    async fn get_user_profile(&self) -> Result<UserProfile, GarminError> {
        let url = format!("{}/userprofile-service/socialProfile", self.base_url);
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_user_settings(&self) -> Result<Value, GarminError> {
        let url = format!(
            "{}/userprofile-service/userprofile/user-settings",
            self.base_url
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_devices(&self) -> Result<Value, GarminError> {
        let url = format!(
            "{}/device-service/deviceregistration/devices",
            self.base_url
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_device_last_used(&self) -> Result<Value, GarminError> {
        let url = format!("{}/device-service/deviceservice/mylastused", self.base_url);
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_daily_stats(&self, date: &str) -> Result<Value, GarminError> {
        let display_name = self.display_name().await?;
        let url = format!(
            "{}/usersummary-service/usersummary/daily/{}",
            self.base_url, display_name
        );
        self.execute_json(self.get_request(&url).query(&[("calendarDate", date)]))
            .await
    }

    async fn get_sleep(&self, date: &str) -> Result<Value, GarminError> {
        let display_name = self.display_name().await?;
        let url = format!(
            "{}/wellness-service/wellness/dailySleepData/{}",
            self.base_url, display_name
        );
        self.execute_json(
            self.get_request(&url)
                .query(&[("date", date), ("nonSleepBufferMinutes", "60")]),
        )
        .await
    }

    async fn get_heart_rate(&self, date: &str) -> Result<Value, GarminError> {
        let display_name = self.display_name().await?;
        let url = format!(
            "{}/wellness-service/wellness/dailyHeartRate/{}",
            self.base_url, display_name
        );
        self.execute_json(self.get_request(&url).query(&[("date", date)]))
            .await
    }

    async fn get_hrv(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!("{}/hrv-service/hrv/{}", self.base_url, date);
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_stress(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/wellness-service/wellness/dailyStress/{}",
            self.base_url, date
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_body_battery(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/wellness-service/wellness/bodyBattery/reports/daily",
            self.base_url
        );
        self.execute_json(
            self.get_request(&url)
                .query(&[("startDate", date), ("endDate", date)]),
        )
        .await
    }

    async fn get_respiration(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/wellness-service/wellness/daily/respiration/{}",
            self.base_url, date
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_spo2(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/wellness-service/wellness/daily/spo2/{}",
            self.base_url, date
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_steps(&self, date: &str) -> Result<Value, GarminError> {
        let display_name = self.display_name().await?;
        let url = format!(
            "{}/wellness-service/wellness/dailySummaryChart/{}",
            self.base_url, display_name
        );
        self.execute_json(self.get_request(&url).query(&[("date", date)]))
            .await
    }

    async fn get_floors(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/wellness-service/wellness/floorsChartData/daily/{}",
            self.base_url, date
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_intensity_minutes(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/wellness-service/wellness/daily/im/{}",
            self.base_url, date
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_hydration(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/usersummary-service/usersummary/hydration/allData/{}",
            self.base_url, date
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_weigh_ins(&self, start: &str, end: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/weight-service/weight/range/{}/{}",
            self.base_url, start, end
        );
        self.execute_json(self.get_request(&url).query(&[("includeAll", "true")]))
            .await
    }

    async fn get_body_composition(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!("{}/weight-service/weight/dateRange", self.base_url);
        self.execute_json(
            self.get_request(&url)
                .query(&[("startDate", date), ("endDate", date)]),
        )
        .await
    }

    async fn get_blood_pressure(&self, start: &str, end: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/bloodpressure-service/bloodpressure/range/{}/{}",
            self.base_url, start, end
        );
        self.execute_json(self.get_request(&url).query(&[("includeAll", "true")]))
            .await
    }

    async fn get_activities(&self, start: u32, limit: u32) -> Result<Value, GarminError> {
        let url = format!(
            "{}/activitylist-service/activities/search/activities",
            self.base_url
        );
        let pairs = [("start", start.to_string()), ("limit", limit.to_string())];
        self.execute_json(self.get_request(&url).query(&pairs)).await
    }

    async fn get_activity_types(&self) -> Result<Value, GarminError> {
        let url = format!("{}/activity-service/activity/activityTypes", self.base_url);
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_training_status(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/metrics-service/metrics/trainingstatus/aggregated/{}",
            self.base_url, date
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_training_readiness(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/metrics-service/metrics/trainingreadiness/{}",
            self.base_url, date
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_max_metrics(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!(
            "{}/metrics-service/metrics/maxmet/daily/{}/{}",
            self.base_url, date, date
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_fitness_age(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!("{}/fitnessage-service/fitnessage/{}", self.base_url, date);
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_endurance_score(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!("{}/metrics-service/metrics/endurancescore", self.base_url);
        self.execute_json(self.get_request(&url).query(&[("calendarDate", date)]))
            .await
    }

    async fn get_hill_score(&self, date: &str) -> Result<Value, GarminError> {
        let url = format!("{}/metrics-service/metrics/hillscore", self.base_url);
        self.execute_json(self.get_request(&url).query(&[("calendarDate", date)]))
            .await
    }

    async fn get_race_predictions(&self) -> Result<Value, GarminError> {
        let display_name = self.display_name().await?;
        let url = format!(
            "{}/metrics-service/metrics/racepredictions/latest/{}",
            self.base_url, display_name
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_lactate_threshold(&self) -> Result<Value, GarminError> {
        let display_name = self.display_name().await?;
        let url = format!(
            "{}/biometric-service/biometric/latest/{}",
            self.base_url, display_name
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_personal_records(&self) -> Result<Value, GarminError> {
        let display_name = self.display_name().await?;
        let url = format!(
            "{}/personalrecord-service/personalrecord/prs/{}",
            self.base_url, display_name
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_goals(&self, status: &str) -> Result<Value, GarminError> {
        let url = format!("{}/goal-service/goal/goals", self.base_url);
        self.execute_json(self.get_request(&url).query(&[
            ("status", status),
            ("start", "1"),
            ("limit", "100"),
        ]))
        .await
    }

    async fn get_earned_badges(&self) -> Result<Value, GarminError> {
        let url = format!("{}/badge-service/badge/earned", self.base_url);
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_badge_challenges(&self) -> Result<Value, GarminError> {
        let url = format!(
            "{}/badgechallenge-service/badgeChallenge/available",
            self.base_url
        );
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_gear(&self) -> Result<Value, GarminError> {
        let url = format!("{}/gear-service/gear/filterGear", self.base_url);
        self.execute_json(self.get_request(&url)).await
    }

    async fn get_workouts(&self) -> Result<Value, GarminError> {
        let url = format!("{}/workout-service/workouts", self.base_url);
        self.execute_json(self.get_request(&url)).await
    }
}

//! Shared mock `GarminConnect` implementation used by unit tests.
//!
//! Keep this module `#[cfg(test)]`-only. Responses are keyed by
//! `<operation>` for single-shot calls, `<operation>:<date>` for per-day
//! calls and `<operation>:<start>:<end>` for range calls; unset keys
//! answer with an empty object, which the fetcher treats as "no data".
#![cfg(test)]

use crate::aggregate::{AggregateRecord, export_all};
use crate::history::FetchPool;
use async_trait::async_trait;
use chrono::NaiveDate;
use garmin_connect_client::resilient::ResilientPolicy;
use garmin_connect_client::{GarminConnect, GarminError, UserProfile};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct MockGarmin {
    responses: HashMap<String, Value>,
    failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockGarmin {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            failures: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.responses.insert(key.to_string(), value);
        self
    }

    /// Make every call for `key` fail with an opaque server error.
    pub fn failing(mut self, key: &str) -> Self {
        self.failures.insert(key.to_string());
        self
    }

    pub fn call_count(&self, key: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|k| k.as_str() == key)
            .count()
    }

    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Fixture mock covering the sections the output formatters render.
    pub fn sample() -> Self {
        Self::new()
            .with(
                "user_profile",
                json!({"displayName": "dn-1", "userName": "user@example.com"}),
            )
            .with(
                "daily_stats:2025-03-10",
                json!({"totalSteps": 8211, "totalDistanceMeters": 6327.0, "totalKilocalories": 2180}),
            )
            .with(
                "daily_stats:2025-03-09",
                json!({"totalSteps": 10450, "totalDistanceMeters": 8120.0}),
            )
            .with(
                "sleep_history:2025-03-10",
                json!({
                    "dailySleepDTO": {
                        "sleepTimeSeconds": 27000,
                        "deepSleepSeconds": 5400,
                        "lightSleepSeconds": 14400,
                        "remSleepSeconds": 5400,
                        "awakeSleepSeconds": 1800,
                        "sleepScores": {"overall": {"value": 82}}
                    },
                    "sleepLevels": [{"stage": "deep"}]
                }),
            )
            .with(
                "hrv_history:2025-03-10",
                json!({"hrvSummary": {"lastNight": 52, "weeklyAvg": 49, "status": "BALANCED"}}),
            )
            .with(
                "training_status:2025-03-10",
                json!({"vo2MaxPreciseValue": 51.2, "acuteTrainingLoad": 312, "recoveryTimeInMinutes": 240}),
            )
            .with(
                "activities:0:100",
                json!([
                    {
                        "activityId": 1,
                        "activityName": "Morning Run",
                        "activityType": {"typeKey": "running"},
                        "startTimeLocal": "2025-03-10 07:01:00",
                        "duration": 1805.0,
                        "distance": 6210.0,
                        "calories": 402,
                        "averageHR": 148,
                        "maxHR": 171
                    },
                    {
                        "activityId": 2,
                        "activityName": "Evening Ride",
                        "activityType": {"typeKey": "cycling"},
                        "startTimeLocal": "2025-03-09 18:30:00",
                        "duration": 3600.0,
                        "distance": 24000.0,
                        "calories": 640,
                        "averageHR": 132,
                        "maxHR": 158
                    }
                ]),
            )
            .with(
                "weigh_ins:2025-03-09:2025-03-10",
                json!([{"weight": 71500, "date": "2025-03-09"}]),
            )
            .with("gear", json!([{"uuid": "g-1", "displayName": "Shoes"}]))
    }

    fn respond(&self, key: String) -> Result<Value, GarminError> {
        self.calls.lock().expect("calls lock").push(key.clone());
        if self.failures.contains(&key) {
            return Err(GarminError::Status {
                status: 500,
                body: "mock failure".into(),
            });
        }
        Ok(self.responses.get(&key).cloned().unwrap_or_else(|| json!({})))
    }
}

#[async_trait]
impl GarminConnect for MockGarmin {
    async fn get_user_profile(&self) -> Result<UserProfile, GarminError> {
        let raw = self.respond("user_profile".into())?;
        if raw.as_object().is_some_and(|o| !o.is_empty()) {
            return serde_json::from_value(raw).map_err(|e| GarminError::Config(e.to_string()));
        }
        Ok(UserProfile {
            display_name: "mock-user".into(),
            full_name: Some("Mock User".into()),
            user_name: Some("mock@example.com".into()),
            profile_id: None,
            extra: serde_json::Map::new(),
        })
    }

    async fn get_user_settings(&self) -> Result<Value, GarminError> {
        self.respond("user_settings".into())
    }

    async fn get_devices(&self) -> Result<Value, GarminError> {
        self.respond("devices".into())
    }

    async fn get_device_last_used(&self) -> Result<Value, GarminError> {
        self.respond("device_last_used".into())
    }

    async fn get_daily_stats(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("daily_stats:{date}"))
    }

    async fn get_sleep(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("sleep_history:{date}"))
    }

    async fn get_heart_rate(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("heart_rate_history:{date}"))
    }

    async fn get_hrv(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("hrv_history:{date}"))
    }

    async fn get_stress(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("stress_history:{date}"))
    }

    async fn get_body_battery(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("body_battery_history:{date}"))
    }

    async fn get_respiration(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("respiration_history:{date}"))
    }

    async fn get_spo2(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("spo2_history:{date}"))
    }

    async fn get_steps(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("steps_history:{date}"))
    }

    async fn get_floors(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("floors_history:{date}"))
    }

    async fn get_intensity_minutes(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("intensity_minutes_history:{date}"))
    }

    async fn get_hydration(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("hydration_history:{date}"))
    }

    async fn get_weigh_ins(&self, start: &str, end: &str) -> Result<Value, GarminError> {
        self.respond(format!("weigh_ins:{start}:{end}"))
    }

    async fn get_body_composition(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("body_composition:{date}"))
    }

    async fn get_blood_pressure(&self, start: &str, end: &str) -> Result<Value, GarminError> {
        self.respond(format!("blood_pressure:{start}:{end}"))
    }

    async fn get_activities(&self, start: u32, limit: u32) -> Result<Value, GarminError> {
        self.respond(format!("activities:{start}:{limit}"))
    }

    async fn get_activity_types(&self) -> Result<Value, GarminError> {
        self.respond("activity_types".into())
    }

    async fn get_training_status(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("training_status:{date}"))
    }

    async fn get_training_readiness(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("training_readiness:{date}"))
    }

    async fn get_max_metrics(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("max_metrics:{date}"))
    }

    async fn get_fitness_age(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("fitness_age:{date}"))
    }

    async fn get_endurance_score(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("endurance_score:{date}"))
    }

    async fn get_hill_score(&self, date: &str) -> Result<Value, GarminError> {
        self.respond(format!("hill_score:{date}"))
    }

    async fn get_race_predictions(&self) -> Result<Value, GarminError> {
        self.respond("race_predictions".into())
    }

    async fn get_lactate_threshold(&self) -> Result<Value, GarminError> {
        self.respond("lactate_threshold".into())
    }

    async fn get_personal_records(&self) -> Result<Value, GarminError> {
        self.respond("personal_records".into())
    }

    async fn get_goals(&self, status: &str) -> Result<Value, GarminError> {
        self.respond(format!("goals:{status}"))
    }

    async fn get_earned_badges(&self) -> Result<Value, GarminError> {
        self.respond("earned_badges".into())
    }

    async fn get_badge_challenges(&self) -> Result<Value, GarminError> {
        self.respond("badge_challenges".into())
    }

    async fn get_gear(&self) -> Result<Value, GarminError> {
        self.respond("gear".into())
    }

    async fn get_workouts(&self) -> Result<Value, GarminError> {
        self.respond("workouts".into())
    }
}

/// One-day aggregate built from [`MockGarmin::sample`] with a pinned clock.
pub async fn sample_record() -> AggregateRecord {
    let pool = FetchPool {
        workers: 2,
        request_delay: Duration::ZERO,
        policy: ResilientPolicy::attempts(1, Duration::ZERO),
    };
    let now = NaiveDate::from_ymd_opt(2025, 3, 10)
        .expect("date")
        .and_hms_opt(8, 30, 0)
        .expect("datetime");
    export_all(Arc::new(MockGarmin::sample()), 1, &pool, now).await
}

//! Aggregation driver: one run of the full data-export catalogue.

use crate::history::{Category, FetchPool};
use chrono::{Days, NaiveDate, NaiveDateTime};
use garmin_connect_client::resilient::ResilientPolicy;
use garmin_connect_client::{GarminConnect, GarminError};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
    pub days: u32,
}

/// Everything retrieved in one run, keyed the way the output artifacts
/// expect it. List-valued categories hold at most one entry per requested
/// date, newest first; a missing date means the remote call failed after
/// exhausting its attempts.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AggregateRecord {
    pub fetched_at: String,
    pub date_range: DateRange,
    pub user_profile: Value,
    pub user_settings: Value,
    pub devices: Value,
    pub device_last_used: Value,
    pub daily_stats: Vec<Value>,
    pub sleep_history: Vec<Value>,
    pub heart_rate_history: Vec<Value>,
    pub hrv_history: Vec<Value>,
    pub stress_history: Vec<Value>,
    pub body_battery_history: Vec<Value>,
    pub respiration_history: Vec<Value>,
    pub spo2_history: Vec<Value>,
    pub steps_history: Vec<Value>,
    pub floors_history: Vec<Value>,
    pub intensity_minutes_history: Vec<Value>,
    pub hydration_history: Vec<Value>,
    pub weight_history: Value,
    pub body_composition: Value,
    pub blood_pressure: Value,
    pub activities: Value,
    pub activity_types: Value,
    pub training_status: Value,
    pub training_readiness: Value,
    pub max_metrics: Value,
    pub fitness_age: Value,
    pub endurance_score: Value,
    pub hill_score: Value,
    pub race_predictions: Value,
    pub lactate_threshold: Value,
    pub personal_records: Value,
    pub goals: Value,
    pub earned_badges: Value,
    pub badge_challenges: Value,
    pub gear: Value,
    pub workouts: Value,
}

impl AggregateRecord {
    pub fn history(&self, category: Category) -> &[Value] {
        match category {
            Category::DailyStats => &self.daily_stats,
            Category::Sleep => &self.sleep_history,
            Category::HeartRate => &self.heart_rate_history,
            Category::Hrv => &self.hrv_history,
            Category::Stress => &self.stress_history,
            Category::BodyBattery => &self.body_battery_history,
            Category::Respiration => &self.respiration_history,
            Category::Spo2 => &self.spo2_history,
            Category::Steps => &self.steps_history,
            Category::Floors => &self.floors_history,
            Category::IntensityMinutes => &self.intensity_minutes_history,
            Category::Hydration => &self.hydration_history,
        }
    }
}

/// Dates covered by a run: today through `today - days`, inclusive, so a
/// zero-day run still fetches today.
pub fn history_dates(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..=u64::from(days))
        .filter_map(|i| today.checked_sub_days(Days::new(i)))
        .collect()
}

async fn single_shot<F, Fut>(
    client: &Arc<dyn GarminConnect>,
    operation: &str,
    default: Value,
    call: F,
) -> Value
where
    F: Fn(Arc<dyn GarminConnect>) -> Fut,
    Fut: Future<Output = Result<Value, GarminError>>,
{
    ResilientPolicy::single()
        .call_or_default(operation, default, || call(client.clone()))
        .await
}

/// Run the whole catalogue: authenticate is assumed done, single-shot and
/// range calls go through the resilient wrapper directly, per-day
/// categories go through the worker pool one category at a time.
pub async fn export_all(
    client: Arc<dyn GarminConnect>,
    days: u32,
    pool: &FetchPool,
    now: NaiveDateTime,
) -> AggregateRecord {
    let today = now.date();
    let start = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(today);
    let today_str = today.to_string();
    let start_str = start.to_string();

    tracing::info!(start = %start_str, end = %today_str, days, "fetching Garmin data");

    let user_profile = single_shot(&client, "user_profile", json!({}), |c| async move {
        let profile = c.get_user_profile().await?;
        Ok(serde_json::to_value(profile).unwrap_or_default())
    })
    .await;
    let user_settings = single_shot(&client, "user_settings", json!({}), |c| async move {
        c.get_user_settings().await
    })
    .await;
    let devices =
        single_shot(&client, "devices", json!([]), |c| async move { c.get_devices().await }).await;
    let device_last_used = single_shot(&client, "device_last_used", json!({}), |c| async move {
        c.get_device_last_used().await
    })
    .await;

    let dates = history_dates(today, days);
    let mut histories: HashMap<Category, Vec<Value>> = HashMap::new();
    for category in Category::ALL {
        let records = pool.fetch_history(client.clone(), &dates, category).await;
        tracing::info!(
            category = category.key(),
            days = records.len(),
            requested = dates.len(),
            "history fetched"
        );
        histories.insert(
            category,
            records.into_iter().map(|r| r.payload).collect(),
        );
    }

    let weight_history = single_shot(&client, "weight_history", json!([]), |c| {
        let start = start_str.clone();
        let end = today_str.clone();
        async move { c.get_weigh_ins(&start, &end).await }
    })
    .await;
    let body_composition = single_shot(&client, "body_composition", json!({}), |c| {
        let date = today_str.clone();
        async move { c.get_body_composition(&date).await }
    })
    .await;
    let blood_pressure = single_shot(&client, "blood_pressure", json!([]), |c| {
        let start = start_str.clone();
        let end = today_str.clone();
        async move { c.get_blood_pressure(&start, &end).await }
    })
    .await;

    let activities = single_shot(&client, "activities", json!([]), |c| async move {
        c.get_activities(0, 100).await
    })
    .await;
    let activity_types = single_shot(&client, "activity_types", json!([]), |c| async move {
        c.get_activity_types().await
    })
    .await;

    let training_status = single_shot(&client, "training_status", json!({}), |c| {
        let date = today_str.clone();
        async move { c.get_training_status(&date).await }
    })
    .await;
    let training_readiness = single_shot(&client, "training_readiness", json!({}), |c| {
        let date = today_str.clone();
        async move { c.get_training_readiness(&date).await }
    })
    .await;
    let max_metrics = single_shot(&client, "max_metrics", json!({}), |c| {
        let date = today_str.clone();
        async move { c.get_max_metrics(&date).await }
    })
    .await;
    let fitness_age = single_shot(&client, "fitness_age", json!({}), |c| {
        let date = today_str.clone();
        async move { c.get_fitness_age(&date).await }
    })
    .await;
    let endurance_score = single_shot(&client, "endurance_score", json!({}), |c| {
        let date = today_str.clone();
        async move { c.get_endurance_score(&date).await }
    })
    .await;
    let hill_score = single_shot(&client, "hill_score", json!({}), |c| {
        let date = today_str.clone();
        async move { c.get_hill_score(&date).await }
    })
    .await;
    let race_predictions = single_shot(&client, "race_predictions", json!({}), |c| async move {
        c.get_race_predictions().await
    })
    .await;
    let lactate_threshold = single_shot(&client, "lactate_threshold", json!({}), |c| async move {
        c.get_lactate_threshold().await
    })
    .await;

    let personal_records = single_shot(&client, "personal_records", json!({}), |c| async move {
        c.get_personal_records().await
    })
    .await;
    let goals =
        single_shot(&client, "goals", json!({}), |c| async move { c.get_goals("all").await })
            .await;
    let earned_badges = single_shot(&client, "earned_badges", json!([]), |c| async move {
        c.get_earned_badges().await
    })
    .await;
    let badge_challenges = single_shot(&client, "badge_challenges", json!([]), |c| async move {
        c.get_badge_challenges().await
    })
    .await;
    let gear =
        single_shot(&client, "gear", json!([]), |c| async move { c.get_gear().await }).await;
    let workouts =
        single_shot(&client, "workouts", json!([]), |c| async move { c.get_workouts().await })
            .await;

    let mut take = |category: Category| histories.remove(&category).unwrap_or_default();
    AggregateRecord {
        fetched_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        date_range: DateRange {
            start: start_str,
            end: today_str,
            days,
        },
        user_profile,
        user_settings,
        devices,
        device_last_used,
        daily_stats: take(Category::DailyStats),
        sleep_history: take(Category::Sleep),
        heart_rate_history: take(Category::HeartRate),
        hrv_history: take(Category::Hrv),
        stress_history: take(Category::Stress),
        body_battery_history: take(Category::BodyBattery),
        respiration_history: take(Category::Respiration),
        spo2_history: take(Category::Spo2),
        steps_history: take(Category::Steps),
        floors_history: take(Category::Floors),
        intensity_minutes_history: take(Category::IntensityMinutes),
        hydration_history: take(Category::Hydration),
        weight_history,
        body_composition,
        blood_pressure,
        activities,
        activity_types,
        training_status,
        training_readiness,
        max_metrics,
        fitness_age,
        endurance_score,
        hill_score,
        race_predictions,
        lactate_threshold,
        personal_records,
        goals,
        earned_badges,
        badge_challenges,
        gear,
        workouts,
    }
}

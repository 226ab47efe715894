//! Compact summary JSON with rounded and derived fields.

use crate::aggregate::AggregateRecord;
use crate::history::Category;
use serde_json::{Map, Value, json};

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn field(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

fn f64_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn scaled(value: &Value, key: &str, divisor: f64, round: fn(f64) -> f64) -> Value {
    f64_field(value, key)
        .map(|x| json!(round(x / divisor)))
        .unwrap_or(Value::Null)
}

fn count(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}

fn compact_daily_stats(stats: &Value) -> Value {
    json!({
        "steps": field(stats, "totalSteps"),
        "distance_km": scaled(stats, "totalDistanceMeters", 1000.0, round2),
        "calories": field(stats, "totalKilocalories"),
        "active_calories": field(stats, "activeKilocalories"),
        "resting_heart_rate": field(stats, "restingHeartRate"),
        "min_heart_rate": field(stats, "minHeartRate"),
        "max_heart_rate": field(stats, "maxHeartRate"),
        "stress_level": field(stats, "averageStressLevel"),
        "body_battery_high": field(stats, "bodyBatteryChargedValue"),
        "body_battery_low": field(stats, "bodyBatteryDrainedValue"),
        "floors_climbed": field(stats, "floorsAscended"),
    })
}

fn compact_sleep(sleep: &Value) -> Value {
    json!({
        "duration_hours": scaled(sleep, "sleepTimeSeconds", 3600.0, round1),
        "deep_sleep_hours": scaled(sleep, "deepSleepSeconds", 3600.0, round1),
        "light_sleep_hours": scaled(sleep, "lightSleepSeconds", 3600.0, round1),
        "rem_sleep_hours": scaled(sleep, "remSleepSeconds", 3600.0, round1),
        "awake_hours": scaled(sleep, "awakeSleepSeconds", 3600.0, round1),
        "sleep_score": sleep
            .pointer("/sleepScores/overall/value")
            .cloned()
            .unwrap_or(Value::Null),
    })
}

fn compact_hrv(hrv: &Value) -> Value {
    let summary = hrv.get("hrvSummary").cloned().unwrap_or_else(|| json!({}));
    json!({
        "last_night": field(&summary, "lastNight"),
        "weekly_average": field(&summary, "weeklyAvg"),
        "status": field(&summary, "status"),
    })
}

fn compact_training(status: &Value) -> Value {
    json!({
        "vo2_max": field(status, "vo2MaxPreciseValue"),
        "training_load": field(status, "acuteTrainingLoad"),
        "recovery_hours": scaled(status, "recoveryTimeInMinutes", 60.0, |x| x.round()),
    })
}

fn compact_activity(activity: &Value) -> Value {
    let date = activity
        .get("startTimeLocal")
        .and_then(Value::as_str)
        .map(|s| s.chars().take(10).collect::<String>())
        .map(Value::String)
        .unwrap_or(Value::Null);
    json!({
        "name": field(activity, "activityName"),
        "type": activity
            .pointer("/activityType/typeKey")
            .cloned()
            .unwrap_or(Value::Null),
        "date": date,
        "duration_min": scaled(activity, "duration", 60.0, round1),
        "distance_km": scaled(activity, "distance", 1000.0, round2),
        "calories": field(activity, "calories"),
        "avg_hr": field(activity, "averageHR"),
        "max_hr": field(activity, "maxHR"),
    })
}

fn availability(record: &AggregateRecord) -> Value {
    let mut counts = Map::new();
    for category in Category::ALL {
        counts.insert(
            category.key().to_string(),
            json!(record.history(category).len()),
        );
    }
    counts.insert("activities".into(), json!(count(&record.activities)));
    counts.insert(
        "weight_entries".into(),
        json!(count(&record.weight_history)),
    );
    counts.insert(
        "blood_pressure_entries".into(),
        json!(count(&record.blood_pressure)),
    );
    Value::Object(counts)
}

/// Build the compact summary: today's headline numbers plus per-category
/// counts. The counts are the only place a degraded run is visible.
pub fn build_summary(record: &AggregateRecord) -> Value {
    let mut out = Map::new();
    out.insert("fetched_at".into(), json!(record.fetched_at));
    out.insert(
        "date_range".into(),
        serde_json::to_value(&record.date_range).unwrap_or_default(),
    );

    if let Some(stats) = record.daily_stats.first() {
        out.insert("today".into(), compact_daily_stats(stats));
    }
    if let Some(sleep) = record.sleep_history.first() {
        out.insert("sleep".into(), compact_sleep(sleep));
    }
    if let Some(hrv) = record.hrv_history.first() {
        out.insert("hrv".into(), compact_hrv(hrv));
    }
    if record.training_status.as_object().is_some_and(|o| !o.is_empty()) {
        out.insert("training".into(), compact_training(&record.training_status));
    }
    if let Some(activities) = record.activities.as_array() {
        let recent: Vec<Value> = activities.iter().take(5).map(compact_activity).collect();
        if !recent.is_empty() {
            out.insert("recent_activities".into(), Value::Array(recent));
        }
    }
    out.insert("data_availability".into(), availability(record));
    Value::Object(out)
}

//! Human-readable Markdown digest of one aggregate record.

use crate::aggregate::AggregateRecord;
use serde_json::Value;

fn field_text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "N/A".into(),
    }
}

fn hours(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|secs| format!("{:.1}", secs / 3600.0))
        .unwrap_or_else(|| "N/A".into())
}

fn km(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|meters| format!("{:.2}", meters / 1000.0))
        .unwrap_or_else(|| "N/A".into())
}

pub fn render_digest(record: &AggregateRecord) -> String {
    let mut lines: Vec<String> = vec![
        "# Garmin Health Data Summary".into(),
        String::new(),
        format!("**Data fetched:** {}", record.fetched_at.replace('T', " ")),
        format!(
            "**Date range:** {} to {} ({} days)",
            record.date_range.start, record.date_range.end, record.date_range.days
        ),
        String::new(),
    ];

    let profile = &record.user_profile;
    if profile.as_object().is_some_and(|o| !o.is_empty()) {
        lines.extend([
            "## User Profile".into(),
            format!("- **Name:** {}", field_text(profile, "displayName")),
            format!("- **Email:** {}", field_text(profile, "userName")),
            String::new(),
        ]);
    }

    if let Some(stats) = record.daily_stats.first() {
        lines.extend([
            "## Today's Stats".into(),
            format!("- **Steps:** {}", field_text(stats, "totalSteps")),
            format!("- **Distance:** {} km", km(stats, "totalDistanceMeters")),
            format!("- **Calories:** {}", field_text(stats, "totalKilocalories")),
            format!(
                "- **Active Calories:** {}",
                field_text(stats, "activeKilocalories")
            ),
            format!(
                "- **Resting HR:** {} bpm",
                field_text(stats, "restingHeartRate")
            ),
            format!(
                "- **Min/Max HR:** {}/{} bpm",
                field_text(stats, "minHeartRate"),
                field_text(stats, "maxHeartRate")
            ),
            format!(
                "- **Stress Level:** {}",
                field_text(stats, "averageStressLevel")
            ),
            format!(
                "- **Body Battery:** {} - {}",
                field_text(stats, "bodyBatteryDrainedValue"),
                field_text(stats, "bodyBatteryChargedValue")
            ),
            format!(
                "- **Floors Climbed:** {}",
                field_text(stats, "floorsAscended")
            ),
            String::new(),
        ]);
    }

    if let Some(sleep) = record.sleep_history.first() {
        let score = sleep
            .pointer("/sleepScores/overall/value")
            .map(|v| match v {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                _ => "N/A".into(),
            })
            .unwrap_or_else(|| "N/A".into());
        lines.extend([
            "## Last Night's Sleep".into(),
            format!("- **Total Sleep:** {} hours", hours(sleep, "sleepTimeSeconds")),
            format!("- **Deep Sleep:** {} hours", hours(sleep, "deepSleepSeconds")),
            format!("- **Light Sleep:** {} hours", hours(sleep, "lightSleepSeconds")),
            format!("- **REM Sleep:** {} hours", hours(sleep, "remSleepSeconds")),
            format!("- **Awake Time:** {} hours", hours(sleep, "awakeSleepSeconds")),
            format!("- **Sleep Score:** {score}"),
            String::new(),
        ]);
    }

    if let Some(hrv) = record.hrv_history.first() {
        let summary = hrv.get("hrvSummary").cloned().unwrap_or_default();
        lines.extend([
            "## Heart Rate Variability (HRV)".into(),
            format!("- **Last Night:** {} ms", field_text(&summary, "lastNight")),
            format!(
                "- **Weekly Average:** {} ms",
                field_text(&summary, "weeklyAvg")
            ),
            format!("- **Status:** {}", field_text(&summary, "status")),
            String::new(),
        ]);
    }

    let training = &record.training_status;
    if training.as_object().is_some_and(|o| !o.is_empty()) {
        let recovery = training
            .get("recoveryTimeInMinutes")
            .and_then(Value::as_f64)
            .map(|mins| format!("{:.0}", mins / 60.0))
            .unwrap_or_else(|| "N/A".into());
        lines.extend([
            "## Training Status".into(),
            format!(
                "- **VO2 Max:** {}",
                field_text(training, "vo2MaxPreciseValue")
            ),
            format!(
                "- **Training Load:** {}",
                field_text(training, "acuteTrainingLoad")
            ),
            format!("- **Recovery Time:** {recovery} hours"),
            String::new(),
        ]);
    }

    if let Some(activities) = record.activities.as_array()
        && !activities.is_empty()
    {
        lines.extend(["## Recent Activities".into(), String::new()]);
        for activity in activities.iter().take(10) {
            let date = activity
                .get("startTimeLocal")
                .and_then(Value::as_str)
                .map(|s| s.chars().take(10).collect::<String>())
                .unwrap_or_default();
            let name = field_text(activity, "activityName");
            let kind = activity
                .pointer("/activityType/typeKey")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let duration_min = activity
                .get("duration")
                .and_then(Value::as_f64)
                .map(|secs| format!("{:.0}", secs / 60.0))
                .unwrap_or_else(|| "N/A".into());
            lines.push(format!(
                "- **{} {}** ({}): {} min, {} km, {} kcal, HR {}/{}",
                date,
                name,
                kind,
                duration_min,
                km(activity, "distance"),
                field_text(activity, "calories"),
                field_text(activity, "averageHR"),
                field_text(activity, "maxHR")
            ));
        }
        lines.push(String::new());
    }

    lines.extend([
        "## Data Availability".into(),
        format!("- Daily Stats: {} days", record.daily_stats.len()),
        format!("- Sleep Data: {} nights", record.sleep_history.len()),
        format!("- Heart Rate: {} days", record.heart_rate_history.len()),
        format!("- HRV: {} days", record.hrv_history.len()),
        format!("- Stress: {} days", record.stress_history.len()),
        format!("- Body Battery: {} days", record.body_battery_history.len()),
        format!("- SpO2: {} days", record.spo2_history.len()),
        format!("- Respiration: {} days", record.respiration_history.len()),
        format!("- Steps Charts: {} days", record.steps_history.len()),
        format!("- Floors: {} days", record.floors_history.len()),
        format!(
            "- Intensity Minutes: {} days",
            record.intensity_minutes_history.len()
        ),
        format!("- Hydration: {} days", record.hydration_history.len()),
        format!(
            "- Activities: {} activities",
            record.activities.as_array().map_or(0, Vec::len)
        ),
        format!(
            "- Weight: {} entries",
            record.weight_history.as_array().map_or(0, Vec::len)
        ),
        format!(
            "- Blood Pressure: {} entries",
            record.blood_pressure.as_array().map_or(0, Vec::len)
        ),
        String::new(),
    ]);

    lines.join("\n")
}

//! Bounded parallel retrieval of per-day history categories.

use chrono::NaiveDate;
use garmin_connect_client::resilient::ResilientPolicy;
use garmin_connect_client::{GarminConnect, GarminError};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// One named class of per-day health data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    DailyStats,
    Sleep,
    HeartRate,
    Hrv,
    Stress,
    BodyBattery,
    Respiration,
    Spo2,
    Steps,
    Floors,
    IntensityMinutes,
    Hydration,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::DailyStats,
        Category::Sleep,
        Category::HeartRate,
        Category::Hrv,
        Category::Stress,
        Category::BodyBattery,
        Category::Respiration,
        Category::Spo2,
        Category::Steps,
        Category::Floors,
        Category::IntensityMinutes,
        Category::Hydration,
    ];

    /// Key of this category in the aggregate record and split files.
    pub fn key(self) -> &'static str {
        match self {
            Category::DailyStats => "daily_stats",
            Category::Sleep => "sleep_history",
            Category::HeartRate => "heart_rate_history",
            Category::Hrv => "hrv_history",
            Category::Stress => "stress_history",
            Category::BodyBattery => "body_battery_history",
            Category::Respiration => "respiration_history",
            Category::Spo2 => "spo2_history",
            Category::Steps => "steps_history",
            Category::Floors => "floors_history",
            Category::IntensityMinutes => "intensity_minutes_history",
            Category::Hydration => "hydration_history",
        }
    }

    pub async fn fetch(
        self,
        client: &dyn GarminConnect,
        date: &str,
    ) -> Result<Value, GarminError> {
        match self {
            Category::DailyStats => client.get_daily_stats(date).await,
            Category::Sleep => client.get_sleep(date).await,
            Category::HeartRate => client.get_heart_rate(date).await,
            Category::Hrv => client.get_hrv(date).await,
            Category::Stress => client.get_stress(date).await,
            Category::BodyBattery => client.get_body_battery(date).await,
            Category::Respiration => client.get_respiration(date).await,
            Category::Spo2 => client.get_spo2(date).await,
            Category::Steps => client.get_steps(date).await,
            Category::Floors => client.get_floors(date).await,
            Category::IntensityMinutes => client.get_intensity_minutes(date).await,
            Category::Hydration => client.get_hydration(date).await,
        }
    }
}

/// One successfully fetched day of a category.
#[derive(Clone, Debug, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub payload: Value,
}

/// Fixed-size worker pool for per-day fetch tasks.
///
/// Worker count is static configuration, not adaptive. Each worker sleeps
/// `request_delay` independently immediately before its call; there is no
/// global request budget, so effective throughput scales with worker count.
#[derive(Clone, Copy, Debug)]
pub struct FetchPool {
    pub workers: usize,
    pub request_delay: Duration,
    pub policy: ResilientPolicy,
}

impl Default for FetchPool {
    fn default() -> Self {
        Self {
            workers: 4,
            request_delay: Duration::from_millis(250),
            policy: ResilientPolicy::default(),
        }
    }
}

impl FetchPool {
    /// Fetch one category for every date in `dates`, newest first.
    ///
    /// A single task's failure never aborts the batch and the batch itself
    /// cannot fail: whatever succeeded is returned, possibly empty. Failed
    /// or empty days are dropped with no record of which dates are missing.
    pub async fn fetch_history(
        &self,
        client: Arc<dyn GarminConnect>,
        dates: &[NaiveDate],
        category: Category,
    ) -> Vec<DayRecord> {
        let semaphore = Arc::new(Semaphore::new(self.workers.max(1)));
        let mut tasks = JoinSet::new();

        for &date in dates {
            let client = client.clone();
            let semaphore = semaphore.clone();
            let policy = self.policy;
            let request_delay = self.request_delay;
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                tokio::time::sleep(request_delay).await;
                let date_str = date.to_string();
                let payload = policy
                    .call_or_default(category.key(), Value::Null, || {
                        let client = client.clone();
                        let date_str = date_str.clone();
                        async move { category.fetch(client.as_ref(), &date_str).await }
                    })
                    .await;
                normalize(category, date, payload).map(|payload| DayRecord { date, payload })
            });
        }

        // Completion order is arbitrary; the sort below is the only
        // ordering guarantee.
        let mut records = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            if let Ok(Some(record)) = joined {
                records.push(record);
            }
        }
        records.sort_by(|a, b| b.date.cmp(&a.date));

        metrics::counter!("garmin_history_records_total", "category" => category.key())
            .increment(records.len() as u64);
        records
    }
}

/// Reshape a raw category payload into one flat per-day entry tagged with
/// its source date. Empty payloads collapse to `None` and are dropped.
fn normalize(category: Category, date: NaiveDate, payload: Value) -> Option<Value> {
    if is_empty(&payload) {
        return None;
    }
    let date_str = date.to_string();
    match category {
        // The sleep response nests its payload under `dailySleepDTO`;
        // unwrap it and keep the stage sequence alongside.
        Category::Sleep => {
            let mut obj = payload.get("dailySleepDTO")?.as_object()?.clone();
            if obj.is_empty() {
                return None;
            }
            obj.insert("date".into(), Value::String(date_str));
            obj.insert(
                "sleep_levels".into(),
                payload.get("sleepLevels").cloned().unwrap_or_else(|| json!([])),
            );
            Some(Value::Object(obj))
        }
        _ => match payload {
            Value::Object(mut obj) => {
                obj.insert("date".into(), Value::String(date_str));
                Some(Value::Object(obj))
            }
            // List-shaped categories (body battery, steps, floors) keep
            // their payload under a `data` key.
            other => Some(json!({ "date": date_str, "data": other })),
        },
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

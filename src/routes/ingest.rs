//! Real-data ingestion from the World Air Quality Index (WAQI) city feed.
//!
//! `POST /ingest/waqi` fetches the configured feed once, maps the individual
//! readings the network tracks onto catalog codes and pushes each through
//! the validator, attributed to the configured virtual sensor. Readings are
//! stamped with the ingestion time.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, response::Response, routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::detail_response;
use crate::{validator, Config, PgStore, Reading};

// ---

/// WAQI `iaqi` keys and the catalog codes they are stored under.
const WAQI_KEYS: [(&str, &str); 3] = [("pm25", "PM2.5"), ("t", "TEMP"), ("h", "HUM")];

pub fn router() -> Router<(PgStore, Config)> {
    // ---
    Router::new().route("/ingest/waqi", post(handler))
}

#[derive(Debug, Serialize)]
struct Rejection {
    variable_code: &'static str,
    value: f64,
    detail: String,
}

#[derive(Debug, Serialize)]
struct IngestSummary {
    admitted: Vec<Reading>,
    rejected: Vec<Rejection>,
}

async fn handler(State((store, config)): State<(PgStore, Config)>) -> Response {
    // ---
    info!("POST /ingest/waqi - Starting ingestion");

    let (Some(feed_url), Some(sensor_id)) = (config.waqi_feed_url.as_deref(), config.waqi_sensor_id)
    else {
        return detail_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "WAQI ingestion is not configured (WAQI_FEED_URL, WAQI_SENSOR_ID)",
        );
    };

    // Step 1: Fetch the feed
    let feed = match fetch_feed(feed_url).await {
        Ok(feed) => feed,
        Err(e) => {
            error!("Failed to fetch WAQI feed: {}", e);
            return detail_response(StatusCode::BAD_GATEWAY, "Failed to fetch WAQI feed");
        }
    };

    // Step 2: Map and admit
    let now = Utc::now();
    let mut summary = IngestSummary {
        admitted: Vec::new(),
        rejected: Vec::new(),
    };
    for (code, value) in extract_readings(&feed) {
        match validator::validate_and_admit(&store, sensor_id, code, value, now).await {
            Ok(reading) => summary.admitted.push(reading),
            Err(e) => {
                warn!("WAQI reading {}={} not stored: {}", code, value, e);
                summary.rejected.push(Rejection {
                    variable_code: code,
                    value,
                    detail: e.to_string(),
                });
            }
        }
    }

    info!(
        "Ingestion complete: {} admitted, {} rejected",
        summary.admitted.len(),
        summary.rejected.len()
    );
    (StatusCode::OK, Json(summary)).into_response()
}

/// Fetch the WAQI feed, failing unless it reports `"status": "ok"`.
async fn fetch_feed(url: &str) -> anyhow::Result<Value> {
    // ---
    let response: Value = reqwest::Client::new()
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    debug!("WAQI raw response: {}", response);

    match response.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(response),
        other => Err(anyhow::anyhow!(
            "WAQI feed returned status {:?}: {}",
            other,
            response.get("data").unwrap_or(&Value::Null)
        )),
    }
}

/// Pull the tracked `data.iaqi.<key>.v` values out of a feed response.
fn extract_readings(feed: &Value) -> Vec<(&'static str, f64)> {
    // ---
    let Some(iaqi) = feed.pointer("/data/iaqi") else {
        debug!("WAQI response missing 'data.iaqi'");
        return Vec::new();
    };

    WAQI_KEYS
        .iter()
        .filter_map(|(key, code)| {
            iaqi.get(*key)
                .and_then(|entry| entry.get("v"))
                .and_then(Value::as_f64)
                .map(|v| (*code, v))
        })
        .collect()
}

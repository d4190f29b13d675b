use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, response::Response,
    routing::get, routing::post, Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{detail_response, error_response};
use crate::{aqi, Config, PgStore, Scope};

// ---

pub fn router() -> Router<(PgStore, Config)> {
    // ---
    Router::new()
        .route("/aqi", get(current))
        .route("/aqi/backfill", post(backfill))
}

/// Query parameters of `GET /aqi`. Without `station_id` the whole network
/// is consolidated; without `as_of` the current time is used.
#[derive(Debug, Deserialize)]
pub struct AqiQuery {
    station_id: Option<i32>,
    as_of: Option<DateTime<Utc>>,
}

async fn current(
    State((store, _config)): State<(PgStore, Config)>,
    params: Result<Query<AqiQuery>, QueryRejection>,
) -> Response {
    // ---
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return detail_response(rejection.status(), rejection.body_text()),
    };
    let scope = Scope::from_station(params.station_id);
    let as_of = params.as_of.unwrap_or_else(Utc::now);
    info!("GET /aqi - {} as of {}", scope, as_of);

    match aqi::calculate(&store, scope, as_of).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Body of `POST /aqi/backfill`.
#[derive(Debug, Deserialize)]
pub struct BackfillRequest {
    station_id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default = "default_interval_minutes")]
    interval_minutes: i64,
}

fn default_interval_minutes() -> i64 {
    60
}

#[derive(Debug, Serialize)]
struct BackfillResponse {
    station_id: i32,
    created: usize,
}

async fn backfill(
    State((store, config)): State<(PgStore, Config)>,
    body: Result<Json<BackfillRequest>, JsonRejection>,
) -> Response {
    // ---
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return detail_response(rejection.status(), rejection.body_text()),
    };
    info!(
        "POST /aqi/backfill - station {} from {} to {}",
        body.station_id, body.start, body.end
    );

    if body.start > body.end {
        return detail_response(StatusCode::BAD_REQUEST, "start must not be after end");
    }

    let Some(interval) = Duration::try_minutes(body.interval_minutes) else {
        return detail_response(StatusCode::BAD_REQUEST, "interval_minutes is out of range");
    };
    match aqi::backfill(
        &store,
        body.station_id,
        body.start,
        body.end,
        interval,
        config.backfill_batch_size,
    )
    .await
    {
        Ok(created) => (
            StatusCode::OK,
            Json(BackfillResponse {
                station_id: body.station_id,
                created,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

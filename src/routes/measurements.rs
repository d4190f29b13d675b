use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, response::Response,
    routing::get, routing::post, Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use super::{detail_response, error_response};
use crate::{validator, Config, MeasurementStore, PgStore};

// ---

pub fn router() -> Router<(PgStore, Config)> {
    // ---
    Router::new()
        .route("/measurements", post(create))
        .route("/measurements/history", get(history))
}

/// Body of `POST /measurements`.
#[derive(Debug, Deserialize)]
pub struct CreateMeasurement {
    sensor_id: i32,
    variable_code: String,
    value: f64,
    measure_date: DateTime<Utc>,
}

async fn create(
    State((store, _config)): State<(PgStore, Config)>,
    body: Result<Json<CreateMeasurement>, JsonRejection>,
) -> Response {
    // ---
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return detail_response(rejection.status(), rejection.body_text()),
    };
    info!(
        "POST /measurements - sensor {} {}={}",
        body.sensor_id, body.variable_code, body.value
    );

    match validator::validate_and_admit(
        &store,
        body.sensor_id,
        &body.variable_code,
        body.value,
        body.measure_date,
    )
    .await
    {
        Ok(reading) => (StatusCode::CREATED, Json(reading)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Query parameters of `GET /measurements/history`; dates cover whole days.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    station_id: i32,
    variable_code: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

async fn history(
    State((store, _config)): State<(PgStore, Config)>,
    params: Result<Query<HistoryQuery>, QueryRejection>,
) -> Response {
    // ---
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return detail_response(rejection.status(), rejection.body_text()),
    };
    debug!("GET /measurements/history - {:?}", params);

    if params.start_date > params.end_date {
        return detail_response(StatusCode::BAD_REQUEST, "start_date must not be after end_date");
    }
    let Some(day_after_end) = params.end_date.succ_opt() else {
        return detail_response(StatusCode::BAD_REQUEST, "end_date is out of range");
    };

    let from = params.start_date.and_time(NaiveTime::MIN).and_utc();
    let to = day_after_end.and_time(NaiveTime::MIN).and_utc();

    match store
        .station_history(params.station_id, &params.variable_code, from, to)
        .await
    {
        Ok(samples) => {
            debug!("Returning {} samples", samples.len());
            (StatusCode::OK, Json(samples)).into_response()
        }
        Err(e) => error_response(e),
    }
}

//! Error kinds surfaced by the measurement validator and the AQI calculator.
//!
//! Every fallible core operation returns [`Result<T>`]. Nothing here is
//! retried internally; the HTTP layer (`routes`) decides how each kind maps
//! onto a response.

use thiserror::Error;

use crate::models::{Scope, SensorStatus};

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    // ---
    /// Reading rejected because the originating sensor is not `ACTIVE`.
    #[error("sensor {sensor_id} is not active (status: {status})")]
    SensorNotActive { sensor_id: i32, status: SensorStatus },

    /// Reading rejected because it falls outside the catalog's plausible bounds.
    #[error("value {value} for {code} is outside the allowed range [{min}, {max}]")]
    ValueOutOfRange {
        code: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// No breakpoint table exists for the code.
    #[error("pollutant '{0}' has no AQI breakpoint table")]
    UnsupportedPollutant(String),

    /// Nothing in the trailing window for any supported pollutant.
    #[error("insufficient data to compute AQI for {scope}")]
    InsufficientData { scope: Scope },

    /// Backfill needs an active sensor to attribute synthetic readings to.
    #[error("station {station_id} has no active sensor")]
    NoActiveSensor { station_id: i32 },

    #[error("sensor {0} does not exist")]
    UnknownSensor(i32),

    #[error("variable '{0}' is not in the catalog")]
    UnknownVariable(String),

    #[error("backfill interval must be positive, got {0}")]
    InvalidInterval(chrono::Duration),

    #[error("sensor state '{0}' is not recognised")]
    InvalidSensorState(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

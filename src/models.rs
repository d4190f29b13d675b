//! Data models shared by the validator, the AQI calculator and the store.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

// ---

/// Reserved variable code for AQI values persisted as readings.
pub const AQI_CODE: &str = "AQI";

/// Operational state of a sensor device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorStatus {
    Active,
    Inactive,
    Maintenance,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Active => "ACTIVE",
            SensorStatus::Inactive => "INACTIVE",
            SensorStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorStatus {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(SensorStatus::Active),
            "INACTIVE" => Ok(SensorStatus::Inactive),
            "MAINTENANCE" => Ok(SensorStatus::Maintenance),
            other => Err(ServiceError::InvalidSensorState(other.to_string())),
        }
    }
}

/// A physical sensor device and the station it is installed at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    // ---
    pub sensor_id: i32,
    pub station_id: Option<i32>,
    pub serial_number: String,
    pub status: SensorStatus,
}

impl Sensor {
    pub fn is_active(&self) -> bool {
        self.status == SensorStatus::Active
    }
}

/// Row shape of the `sensor` table; `status` is stored as text.
#[derive(Debug, sqlx::FromRow)]
pub struct SensorRow {
    pub sensor_id: i32,
    pub station_id: Option<i32>,
    pub serial_number: String,
    pub status: String,
}

impl TryFrom<SensorRow> for Sensor {
    type Error = ServiceError;

    fn try_from(row: SensorRow) -> Result<Self, Self::Error> {
        Ok(Sensor {
            sensor_id: row.sensor_id,
            station_id: row.station_id,
            serial_number: row.serial_number,
            status: row.status.parse()?,
        })
    }
}

/// Catalog entry describing a measurable variable and its plausible range.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CatalogEntry {
    // ---
    pub code: String,
    pub name: String,
    pub unit: String,
    pub min_expected: f64,
    pub max_expected: f64,
}

/// Default variable catalog: (code, name, unit, min, max).
///
/// Gaseous pollutant ceilings sit at the top of their EPA breakpoint tables
/// so every band can be reached by a validated reading.
pub const DEFAULT_CATALOG: [(&str, &str, &str, f64, f64); 9] = [
    ("PM2.5", "Particulate matter 2.5", "µg/m³", 0.0, 500.0),
    ("PM10", "Particulate matter 10", "µg/m³", 0.0, 600.0),
    ("CO", "Carbon monoxide", "ppm", 0.0, 50.4),
    ("NO2", "Nitrogen dioxide", "ppb", 0.0, 2049.0),
    ("SO2", "Sulfur dioxide", "ppb", 0.0, 1004.0),
    ("O3", "Tropospheric ozone", "ppb", 0.0, 300.0),
    ("TEMP", "Temperature", "°C", -10.0, 50.0),
    ("HUM", "Relative humidity", "%", 0.0, 100.0),
    (AQI_CODE, "Air Quality Index", "AQI", 0.0, 500.0),
];

/// Build the default catalog as owned entries.
pub fn default_catalog() -> Vec<CatalogEntry> {
    DEFAULT_CATALOG
        .iter()
        .map(|(code, name, unit, min, max)| CatalogEntry {
            code: code.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            min_expected: *min,
            max_expected: *max,
        })
        .collect()
}

/// A persisted time-series reading.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Reading {
    // ---
    pub measurement_id: i64,
    pub sensor_id: i32,
    pub variable_code: String,
    pub value: f64,
    pub measure_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A reading that has passed validation but is not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub sensor_id: i32,
    pub variable_code: String,
    pub value: f64,
    pub measure_date: DateTime<Utc>,
}

/// Timestamp/value pair returned by time-series reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::FromRow)]
pub struct Sample {
    pub measure_date: DateTime<Utc>,
    pub value: f64,
}

/// Aggregation scope: one monitoring station or the whole network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "station_id", rename_all = "snake_case")]
pub enum Scope {
    Station(i32),
    Network,
}

impl Scope {
    pub fn from_station(station_id: Option<i32>) -> Self {
        station_id.map_or(Scope::Network, Scope::Station)
    }

    pub fn station_id(&self) -> Option<i32> {
        match self {
            Scope::Station(id) => Some(*id),
            Scope::Network => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Station(id) => write!(f, "station {id}"),
            Scope::Network => f.write_str("the network"),
        }
    }
}

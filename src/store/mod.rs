//! Storage boundary for sensors, the variable catalog and the time series.
//!
//! The validator and the AQI calculator only talk to [`MeasurementStore`];
//! `PgStore` backs the running service and `MemoryStore` backs the unit
//! tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{CatalogEntry, NewReading, Reading, Sample, Scope, Sensor};

#[cfg(test)]
mod memory;
mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

// ---

#[async_trait]
pub trait MeasurementStore: Send + Sync {
    // ---
    async fn sensor(&self, sensor_id: i32) -> Result<Option<Sensor>>;

    async fn catalog_entry(&self, code: &str) -> Result<Option<CatalogEntry>>;

    /// Readings of `code` with `from <= measure_date <= to`, restricted to
    /// sensors that are currently `ACTIVE` and to the station when scoped.
    async fn window_readings(
        &self,
        code: &str,
        scope: Scope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Sample>>;

    /// Readings of `code` at a station with `from <= measure_date < to`,
    /// regardless of sensor state, oldest first.
    async fn station_history(
        &self,
        station_id: i32,
        code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Sample>>;

    /// Persist a single reading atomically.
    async fn insert_reading(&self, reading: &NewReading) -> Result<Reading>;

    /// Persist a batch; returns how many rows were actually created.
    async fn insert_batch(&self, readings: &[NewReading]) -> Result<u64>;

    /// Lowest-numbered active sensor installed at the station.
    async fn first_active_sensor(&self, station_id: i32) -> Result<Option<Sensor>>;

    async fn reading_exists(&self, sensor_id: i32, code: &str, at: DateTime<Utc>) -> Result<bool>;
}

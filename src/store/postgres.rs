//! PostgreSQL implementation of [`MeasurementStore`] on top of `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::MeasurementStore;
use crate::error::Result;
use crate::models::{CatalogEntry, NewReading, Reading, Sample, Scope, Sensor, SensorRow};

// ---

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MeasurementStore for PgStore {
    // ---
    async fn sensor(&self, sensor_id: i32) -> Result<Option<Sensor>> {
        // ---
        let row = sqlx::query_as::<_, SensorRow>(
            r#"
            SELECT sensor_id, station_id, serial_number, status
            FROM sensor
            WHERE sensor_id = $1
            "#,
        )
        .bind(sensor_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Sensor::try_from).transpose()
    }

    async fn catalog_entry(&self, code: &str) -> Result<Option<CatalogEntry>> {
        // ---
        let entry = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT code, name, unit,
                   min_expected_value AS min_expected,
                   max_expected_value AS max_expected
            FROM variable_catalog
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn window_readings(
        &self,
        code: &str,
        scope: Scope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Sample>> {
        // ---
        let samples = sqlx::query_as::<_, Sample>(
            r#"
            SELECT m.measure_date, m.value
            FROM measurement m
            JOIN sensor s ON s.sensor_id = m.sensor_id
            WHERE m.variable_code = $1
              AND m.measure_date BETWEEN $2 AND $3
              AND s.status = 'ACTIVE'
              AND ($4::INTEGER IS NULL OR s.station_id = $4)
            "#,
        )
        .bind(code)
        .bind(from)
        .bind(to)
        .bind(scope.station_id())
        .fetch_all(&self.pool)
        .await?;

        Ok(samples)
    }

    async fn station_history(
        &self,
        station_id: i32,
        code: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Sample>> {
        // ---
        let samples = sqlx::query_as::<_, Sample>(
            r#"
            SELECT m.measure_date, m.value
            FROM measurement m
            JOIN sensor s ON s.sensor_id = m.sensor_id
            WHERE s.station_id = $1
              AND m.variable_code = $2
              AND m.measure_date >= $3
              AND m.measure_date < $4
            ORDER BY m.measure_date
            "#,
        )
        .bind(station_id)
        .bind(code)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(samples)
    }

    async fn insert_reading(&self, reading: &NewReading) -> Result<Reading> {
        // ---
        let created = sqlx::query_as::<_, Reading>(
            r#"
            INSERT INTO measurement (sensor_id, variable_code, value, measure_date)
            VALUES ($1, $2, $3, $4)
            RETURNING measurement_id, sensor_id, variable_code, value, measure_date, created_at
            "#,
        )
        .bind(reading.sensor_id)
        .bind(&reading.variable_code)
        .bind(reading.value)
        .bind(reading.measure_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn insert_batch(&self, readings: &[NewReading]) -> Result<u64> {
        // ---
        if readings.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO measurement (sensor_id, variable_code, value, measure_date) ",
        );
        builder.push_values(readings, |mut row, r| {
            row.push_bind(r.sensor_id)
                .push_bind(&r.variable_code)
                .push_bind(r.value)
                .push_bind(r.measure_date);
        });
        // The partial unique index on AQI rows turns a concurrent duplicate into a no-op.
        builder.push(" ON CONFLICT DO NOTHING");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn first_active_sensor(&self, station_id: i32) -> Result<Option<Sensor>> {
        // ---
        let row = sqlx::query_as::<_, SensorRow>(
            r#"
            SELECT sensor_id, station_id, serial_number, status
            FROM sensor
            WHERE station_id = $1 AND status = 'ACTIVE'
            ORDER BY sensor_id
            LIMIT 1
            "#,
        )
        .bind(station_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Sensor::try_from).transpose()
    }

    async fn reading_exists(&self, sensor_id: i32, code: &str, at: DateTime<Utc>) -> Result<bool> {
        // ---
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM measurement
                WHERE sensor_id = $1 AND variable_code = $2 AND measure_date = $3
            )
            "#,
        )
        .bind(sensor_id)
        .bind(code)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

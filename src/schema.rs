//! Database schema management for `vrisa-aqi`.
//!
//! Ensures required tables, indexes and the variable catalog exist before
//! serving requests. Applied once on startup from `main.rs` (EMBP: single
//! gateway call).

use anyhow::Result;
use sqlx::PgPool;

use crate::models::DEFAULT_CATALOG;

// ---

/// Create or update the database schema (idempotent).
///
/// Stations and sensors are owned by the institution/station management
/// service; the tables are created here only so the measurement foreign keys
/// resolve on a fresh database. Safe to call on every startup.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monitoring_station (
            station_id        SERIAL PRIMARY KEY,
            station_name      TEXT NOT NULL UNIQUE,
            operative_status  TEXT NOT NULL DEFAULT 'INACTIVE'
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensor (
            sensor_id         SERIAL PRIMARY KEY,
            station_id        INTEGER REFERENCES monitoring_station (station_id) ON DELETE CASCADE,
            serial_number     TEXT NOT NULL UNIQUE,
            status            TEXT NOT NULL DEFAULT 'ACTIVE'
                              CHECK (status IN ('ACTIVE', 'INACTIVE', 'MAINTENANCE'))
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS variable_catalog (
            code                TEXT PRIMARY KEY,
            name                TEXT NOT NULL,
            unit                TEXT NOT NULL,
            min_expected_value  DOUBLE PRECISION NOT NULL DEFAULT 0,
            max_expected_value  DOUBLE PRECISION NOT NULL DEFAULT 1000
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Time series of every admitted reading, plus backfilled AQI values
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS measurement (
            measurement_id    BIGSERIAL PRIMARY KEY,
            sensor_id         INTEGER NOT NULL REFERENCES sensor (sensor_id) ON DELETE CASCADE,
            variable_code     TEXT NOT NULL REFERENCES variable_catalog (code),
            value             DOUBLE PRECISION NOT NULL,
            measure_date      TIMESTAMPTZ NOT NULL,
            created_at        TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_measurement_sensor_date
            ON measurement (sensor_id, measure_date);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_measurement_variable_date
            ON measurement (variable_code, measure_date);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // At most one AQI row per sensor and instant
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uq_measurement_aqi_sensor_date
            ON measurement (sensor_id, measure_date)
            WHERE variable_code = 'AQI';
        "#,
    )
    .execute(&mut *tx)
    .await?;

    for (code, name, unit, min, max) in DEFAULT_CATALOG {
        sqlx::query(
            r#"
            INSERT INTO variable_catalog (code, name, unit, min_expected_value, max_expected_value)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(code)
        .bind(name)
        .bind(unit)
        .bind(min)
        .bind(max)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

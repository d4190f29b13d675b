//! Retroactive AQI computation persisted as `AQI`-coded readings.
//!
//! The station-level index is attributed to the station's lowest-numbered
//! active sensor, because the time series only stores sensor readings.
//! Re-running over the same range creates nothing new: instants that
//! already hold an `AQI` reading for that sensor are skipped.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::calculator::calculate;
use crate::error::{Result, ServiceError};
use crate::models::{NewReading, Scope, AQI_CODE};
use crate::store::MeasurementStore;

// ---

/// Compute AQI every `interval` from `start` through `end` (inclusive) for a
/// station and store each value. Returns the number of rows created.
pub async fn backfill<S>(
    store: &S,
    station_id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
    batch_size: usize,
) -> Result<usize>
where
    S: MeasurementStore + ?Sized,
{
    // ---
    let run_id = Uuid::new_v4();
    let span = info_span!("backfill", %run_id, station_id);
    run(store, station_id, start, end, interval, batch_size.max(1))
        .instrument(span)
        .await
}

async fn run<S>(
    store: &S,
    station_id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
    batch_size: usize,
) -> Result<usize>
where
    S: MeasurementStore + ?Sized,
{
    // ---
    if interval <= Duration::zero() {
        return Err(ServiceError::InvalidInterval(interval));
    }

    let sensor = store
        .first_active_sensor(station_id)
        .await?
        .ok_or(ServiceError::NoActiveSensor { station_id })?;

    info!(
        sensor_id = sensor.sensor_id,
        "Backfilling AQI from {} to {} every {}s",
        start,
        end,
        interval.num_seconds()
    );

    let scope = Scope::Station(station_id);
    let mut staged: Vec<NewReading> = Vec::with_capacity(batch_size);
    let mut created: u64 = 0;
    let mut skipped_no_data = 0usize;
    let mut skipped_existing = 0usize;

    let mut current = start;
    while current <= end {
        match calculate(store, scope, current).await {
            Ok(result) => {
                if store
                    .reading_exists(sensor.sensor_id, AQI_CODE, current)
                    .await?
                {
                    skipped_existing += 1;
                } else {
                    staged.push(NewReading {
                        sensor_id: sensor.sensor_id,
                        variable_code: AQI_CODE.to_string(),
                        value: result.index,
                        measure_date: current,
                    });
                }
            }
            Err(ServiceError::InsufficientData { .. }) => {
                skipped_no_data += 1;
            }
            Err(e) => return Err(e),
        }

        if staged.len() >= batch_size {
            created += store.insert_batch(&staged).await?;
            debug!("Flushed {} AQI readings ({} so far)", staged.len(), created);
            staged.clear();
        }

        // Stepping past the representable date range ends the sweep.
        match current.checked_add_signed(interval) {
            Some(next) => current = next,
            None => break,
        }
    }

    if !staged.is_empty() {
        created += store.insert_batch(&staged).await?;
    }

    info!(
        created,
        skipped_existing, skipped_no_data, "AQI backfill complete"
    );
    Ok(created as usize)
}

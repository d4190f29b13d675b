//! Accept/reject gate applied to every incoming reading before it is stored.
//!
//! Policy: the sensor must be `ACTIVE` and the value must lie inside the
//! catalog's `[min_expected, max_expected]` range, both ends inclusive.
//! Liveness is checked first, so a sensor under maintenance is rejected no
//! matter what it reports. Timestamps are not checked for staleness.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{Result, ServiceError};
use crate::models::{CatalogEntry, NewReading, Reading, Sensor};
use crate::store::MeasurementStore;

// ---

/// Reject readings from sensors that are not `ACTIVE`.
pub fn check_liveness(sensor: &Sensor) -> Result<()> {
    if sensor.is_active() {
        Ok(())
    } else {
        Err(ServiceError::SensorNotActive {
            sensor_id: sensor.sensor_id,
            status: sensor.status,
        })
    }
}

/// Reject values outside the catalog range. NaN never falls inside a range.
pub fn check_range(entry: &CatalogEntry, value: f64) -> Result<()> {
    if (entry.min_expected..=entry.max_expected).contains(&value) {
        Ok(())
    } else {
        Err(ServiceError::ValueOutOfRange {
            code: entry.code.clone(),
            value,
            min: entry.min_expected,
            max: entry.max_expected,
        })
    }
}

/// Validate one reading and persist it as a single atomic write.
pub async fn validate_and_admit<S>(
    store: &S,
    sensor_id: i32,
    code: &str,
    value: f64,
    measure_date: DateTime<Utc>,
) -> Result<Reading>
where
    S: MeasurementStore + ?Sized,
{
    // ---
    let sensor = store
        .sensor(sensor_id)
        .await?
        .ok_or(ServiceError::UnknownSensor(sensor_id))?;

    if let Err(e) = check_liveness(&sensor) {
        warn!(sensor_id, %code, "Rejected reading: {}", e);
        return Err(e);
    }

    let entry = store
        .catalog_entry(code)
        .await?
        .ok_or_else(|| ServiceError::UnknownVariable(code.to_string()))?;

    if let Err(e) = check_range(&entry, value) {
        warn!(sensor_id, %code, "Rejected reading: {}", e);
        return Err(e);
    }

    let reading = store
        .insert_reading(&NewReading {
            sensor_id,
            variable_code: entry.code,
            value,
            measure_date,
        })
        .await?;

    debug!(
        measurement_id = reading.measurement_id,
        sensor_id, %code, value, "Admitted reading"
    );
    Ok(reading)
}

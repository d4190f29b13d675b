//! In-memory [`MeasurementStore`] used by unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::MeasurementStore;
use crate::error::Result;
use crate::models::{
    default_catalog, CatalogEntry, NewReading, Reading, Sample, Scope, Sensor, SensorStatus,
    AQI_CODE,
};

// ---

#[derive(Default)]
struct Inner {
    sensors: HashMap<i32, Sensor>,
    catalog: HashMap<String, CatalogEntry>,
    readings: Vec<Reading>,
    next_id: i64,
}

impl Inner {
    fn push(&mut self, reading: &NewReading) -> Reading {
        self.next_id += 1;
        let created = Reading {
            measurement_id: self.next_id,
            sensor_id: reading.sensor_id,
            variable_code: reading.variable_code.clone(),
            value: reading.value,
            measure_date: reading.measure_date,
            created_at: Utc::now(),
        };
        self.readings.push(created.clone());
        created
    }

    /// Same rule as the partial unique index on `AQI` rows in PostgreSQL.
    fn conflicts(&self, reading: &NewReading) -> bool {
        reading.variable_code == AQI_CODE
            && self.readings.iter().any(|r| {
                r.variable_code == AQI_CODE
                    && r.sensor_id == reading.sensor_id
                    && r.measure_date == reading.measure_date
            })
    }

    fn station_of(&self, sensor_id: i32) -> Option<i32> {
        self.sensors.get(&sensor_id).and_then(|s| s.station_id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    batch_calls: Mutex<usize>,
}

impl MemoryStore {
    /// Empty store seeded with the default variable catalog.
    pub fn with_default_catalog() -> Self {
        let inner = Inner {
            catalog: default_catalog()
                .into_iter()
                .map(|e| (e.code.clone(), e))
                .collect(),
            ..Inner::default()
        };
        Self {
            inner: Mutex::new(inner),
            batch_calls: Mutex::new(0),
        }
    }

    pub async fn add_sensor(&self, sensor_id: i32, station_id: Option<i32>, status: SensorStatus) {
        let sensor = Sensor {
            sensor_id,
            station_id,
            serial_number: format!("SN-TEST-{sensor_id:03}"),
            status,
        };
        self.inner.lock().await.sensors.insert(sensor_id, sensor);
    }

    pub async fn set_status(&self, sensor_id: i32, status: SensorStatus) {
        if let Some(sensor) = self.inner.lock().await.sensors.get_mut(&sensor_id) {
            sensor.status = status;
        }
    }

    /// Store a reading directly, skipping validation.
    pub async fn seed_reading(&self, sensor_id: i32, code: &str, value: f64, at: DateTime<Utc>) {
        let reading = NewReading {
            sensor_id,
            variable_code: code.to_string(),
            value,
            measure_date: at,
        };
        self.inner.lock().await.push(&reading);
    }

    pub async fn readings_with_code(&self, code: &str) -> Vec<Reading> {
        self.inner
            .lock()
            .await
            .readings
            .iter()
            .filter(|r| r.variable_code == code)
            .cloned()
            .collect()
    }

    pub async fn batch_calls(&self) -> usize {
        *self.batch_calls.lock().await
    }
}

#[async_trait]
impl MeasurementStore for MemoryStore {
    // ---
    async fn sensor(&self, sensor_id: i32) -> Result<Option<Sensor>> {
        Ok(self.inner.lock().await.sensors.get(&sensor_id).cloned())
    }

    async fn catalog_entry(&self, code: &str) -> Result<Option<CatalogEntry>> {
        Ok(self.inner.lock().await.catalog.get(code).cloned())
    }

    async fn window_readings(
        &self,
        code: &str,
        scope: Scope,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Sample>> {
        // ---
        let inner = self.inner.lock().await;
        let samples = inner
            .readings
            .iter()
            .filter(|r| r.variable_code == code)
            .filter(|r| r.measure_date >= from && r.measure_date <= to)
            .filter(|r| inner.sensors.get(&r.sensor_id).is_some_and(Sensor::is_active))
            .filter(|r| match scope {
                Scope::Station(id) => inner.station_of(r.sensor_id) == Some(id),
                Scope::Network => true,
            })
            .map(|r| Sample {
                measure_date: r.measure_date,
                value: r.value,
            })
            .collect();
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
        let inner = self.inner.lock().await;
        let mut samples: Vec<Sample> = inner
            .readings
            .iter()
            .filter(|r| r.variable_code == code)
            .filter(|r| inner.station_of(r.sensor_id) == Some(station_id))
            .filter(|r| r.measure_date >= from && r.measure_date < to)
            .map(|r| Sample {
                measure_date: r.measure_date,
                value: r.value,
            })
            .collect();
        samples.sort_by_key(|s| s.measure_date);
        Ok(samples)
    }

    async fn insert_reading(&self, reading: &NewReading) -> Result<Reading> {
        Ok(self.inner.lock().await.push(reading))
    }

    async fn insert_batch(&self, readings: &[NewReading]) -> Result<u64> {
        // ---
        *self.batch_calls.lock().await += 1;
        let mut inner = self.inner.lock().await;
        let mut created = 0;
        for reading in readings {
            if !inner.conflicts(reading) {
                inner.push(reading);
                created += 1;
            }
        }
        Ok(created)
    }

    async fn first_active_sensor(&self, station_id: i32) -> Result<Option<Sensor>> {
        // ---
        let inner = self.inner.lock().await;
        let sensor = inner
            .sensors
            .values()
            .filter(|s| s.station_id == Some(station_id) && s.is_active())
            .min_by_key(|s| s.sensor_id)
            .cloned();
        Ok(sensor)
    }

    async fn reading_exists(&self, sensor_id: i32, code: &str, at: DateTime<Utc>) -> Result<bool> {
        // ---
        let inner = self.inner.lock().await;
        Ok(inner
            .readings
            .iter()
            .any(|r| r.sensor_id == sensor_id && r.variable_code == code && r.measure_date == at))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn row(code: &str, hour: u32) -> NewReading {
        NewReading {
            sensor_id: 1,
            variable_code: code.to_string(),
            value: 42.0,
            measure_date: Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_batch_skips_duplicate_aqi_rows() {
        // ---
        let store = MemoryStore::with_default_catalog();
        let batch = vec![row(AQI_CODE, 0), row(AQI_CODE, 1), row(AQI_CODE, 1)];

        assert_eq!(store.insert_batch(&batch).await.unwrap(), 2);
        assert_eq!(store.insert_batch(&batch).await.unwrap(), 0);
        assert_eq!(store.readings_with_code(AQI_CODE).await.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_keeps_repeated_non_aqi_rows() {
        // ---
        let store = MemoryStore::with_default_catalog();
        let batch = vec![row("PM2.5", 0), row("PM2.5", 0)];

        assert_eq!(store.insert_batch(&batch).await.unwrap(), 2);
        assert_eq!(store.readings_with_code("PM2.5").await.len(), 2);
    }
}

//! Point-in-time AQI for one station or the whole network.
//!
//! For every supported pollutant the concentrations reported by active
//! sensors over the trailing 24 hours are averaged and turned into a
//! sub-index. The overall index is the worst sub-index, and its pollutant is
//! reported as dominant.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use super::breakpoints::{mean, round2, sub_index, Pollutant};
use super::category::{classify, Category};
use crate::error::{Result, ServiceError};
use crate::models::Scope;
use crate::store::MeasurementStore;

// ---

/// Length of the averaging window ending at the evaluation instant.
pub const WINDOW_HOURS: i64 = 24;

/// Consolidated AQI reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqiResult {
    pub index: f64,
    pub category: &'static Category,
    pub dominant_pollutant: Pollutant,
    pub sub_indices: BTreeMap<Pollutant, f64>,
    pub timestamp: DateTime<Utc>,
    pub scope: Scope,
}

/// Combine per-pollutant sub-indices into a result.
///
/// `sub_indices` is expected in [`Pollutant::ALL`] order; on a tie the
/// earlier entry stays dominant.
pub fn aggregate(
    scope: Scope,
    timestamp: DateTime<Utc>,
    sub_indices: &[(Pollutant, f64)],
) -> Result<AqiResult> {
    // ---
    let mut dominant: Option<(Pollutant, f64)> = None;
    for &(pollutant, value) in sub_indices {
        match dominant {
            Some((_, best)) if value <= best => {}
            _ => dominant = Some((pollutant, value)),
        }
    }

    let (dominant_pollutant, index) = dominant.ok_or(ServiceError::InsufficientData { scope })?;
    let index = round2(index);

    Ok(AqiResult {
        index,
        category: classify(index),
        dominant_pollutant,
        sub_indices: sub_indices.iter().copied().collect(),
        timestamp,
        scope,
    })
}

/// AQI for `scope` as of `as_of`, from the trailing [`WINDOW_HOURS`] mean.
pub async fn calculate<S>(store: &S, scope: Scope, as_of: DateTime<Utc>) -> Result<AqiResult>
where
    S: MeasurementStore + ?Sized,
{
    // ---
    // Near the earliest representable instant the window is clipped.
    let from = as_of
        .checked_sub_signed(Duration::hours(WINDOW_HOURS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut sub_indices = Vec::with_capacity(Pollutant::ALL.len());
    for pollutant in Pollutant::ALL {
        let samples = store
            .window_readings(pollutant.code(), scope, from, as_of)
            .await?;
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();

        if let Some(avg) = mean(&values) {
            let value = sub_index(pollutant, avg);
            debug!(
                %pollutant, samples = values.len(), mean = avg, sub_index = value,
                "Computed sub-index for {}", scope
            );
            sub_indices.push((pollutant, value));
        }
    }

    aggregate(scope, as_of, &sub_indices)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::SensorStatus;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use tokio_test::{assert_err, assert_ok};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_dominant_pollutant_is_worst() {
        // ---
        let subs = [
            (Pollutant::Pm25, 80.0),
            (Pollutant::O3, 120.0),
            (Pollutant::Co, 45.0),
        ];
        let result = aggregate(Scope::Station(1), t0(), &subs).unwrap();

        assert_eq!(result.index, 120.0);
        assert_eq!(result.dominant_pollutant, Pollutant::O3);
        assert_eq!(result.category.label, "Unhealthy for Sensitive Groups");
        assert_eq!(result.sub_indices.len(), 3);
        assert_eq!(result.sub_indices[&Pollutant::Co], 45.0);
    }

    #[test]
    fn test_tie_goes_to_earlier_pollutant() {
        // ---
        let subs = [(Pollutant::Pm10, 75.0), (Pollutant::No2, 75.0)];
        let result = aggregate(Scope::Network, t0(), &subs).unwrap();
        assert_eq!(result.dominant_pollutant, Pollutant::Pm10);
    }

    #[test]
    fn test_aggregate_without_sub_indices() {
        // ---
        let err = aggregate(Scope::Station(4), t0(), &[]).unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientData { scope: Scope::Station(4) }));
    }

    #[test]
    fn test_result_serialization_shape() {
        // ---
        let subs = [(Pollutant::Pm25, 112.08)];
        let result = aggregate(Scope::Station(1), t0(), &subs).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["index"], 112.08);
        assert_eq!(json["dominant_pollutant"], "PM2.5");
        assert_eq!(json["sub_indices"]["PM2.5"], 112.08);
        assert_eq!(json["category"]["color"], "#FF7E00");
        assert_eq!(json["scope"]["station_id"], 1);
    }

    #[tokio::test]
    async fn test_no_readings_is_insufficient_data() {
        // ---
        let store = MemoryStore::with_default_catalog();
        store.add_sensor(1, Some(1), SensorStatus::Active).await;
        store.seed_reading(1, "TEMP", 24.0, t0()).await;

        let err = assert_err!(calculate(&store, Scope::Station(1), t0()).await);
        assert!(matches!(err, ServiceError::InsufficientData { .. }));
    }

    #[tokio::test]
    async fn test_single_pm25_reading_round_trip() {
        // ---
        let store = MemoryStore::with_default_catalog();
        store.add_sensor(1, Some(1), SensorStatus::Active).await;
        crate::validator::validate_and_admit(&store, 1, "PM2.5", 40.0, t0())
            .await
            .unwrap();

        let as_of = t0() + Duration::minutes(1);
        let result = assert_ok!(calculate(&store, Scope::Station(1), as_of).await);

        assert_eq!(result.index, 112.08);
        assert!(result.index > 100.0 && result.index < 150.0);
        assert_eq!(result.dominant_pollutant, Pollutant::Pm25);
        assert_eq!(result.timestamp, as_of);
    }

    #[tokio::test]
    async fn test_window_mean_and_filters() {
        // ---
        let store = MemoryStore::with_default_catalog();
        store.add_sensor(1, Some(1), SensorStatus::Active).await;
        store.add_sensor(2, Some(1), SensorStatus::Maintenance).await;
        store.add_sensor(3, Some(2), SensorStatus::Active).await;

        // Mean of 6 and 18 is 12.0 -> exactly 50.
        store.seed_reading(1, "PM2.5", 6.0, t0() - Duration::hours(2)).await;
        store.seed_reading(1, "PM2.5", 18.0, t0() - Duration::hours(24)).await;
        // Outside the window.
        store.seed_reading(1, "PM2.5", 300.0, t0() - Duration::hours(25)).await;
        store.seed_reading(1, "PM2.5", 300.0, t0() + Duration::seconds(1)).await;
        // Sensor not active.
        store.seed_reading(2, "PM2.5", 300.0, t0()).await;
        // Other station.
        store.seed_reading(3, "PM2.5", 300.0, t0()).await;

        let result = assert_ok!(calculate(&store, Scope::Station(1), t0()).await);
        assert_eq!(result.index, 50.0);
        assert_eq!(result.category.label, "Good");
        assert_eq!(result.sub_indices.len(), 1);
    }

    #[tokio::test]
    async fn test_network_scope_spans_stations() {
        // ---
        let store = MemoryStore::with_default_catalog();
        store.add_sensor(1, Some(1), SensorStatus::Active).await;
        store.add_sensor(2, Some(2), SensorStatus::Active).await;

        store.seed_reading(1, "CO", 2.2, t0()).await;
        store.seed_reading(2, "O3", 62.0, t0()).await;

        let result = assert_ok!(calculate(&store, Scope::Network, t0()).await);
        assert_eq!(result.scope, Scope::Network);
        assert_eq!(result.dominant_pollutant, Pollutant::O3);
        assert_eq!(result.index, 73.87);
        assert_eq!(result.sub_indices[&Pollutant::Co], 25.0);

        let station_one = assert_ok!(calculate(&store, Scope::Station(1), t0()).await);
        assert_eq!(station_one.dominant_pollutant, Pollutant::Co);
    }

    #[tokio::test]
    async fn test_window_clipped_at_earliest_instant() {
        // ---
        let store = MemoryStore::with_default_catalog();
        store.add_sensor(1, Some(1), SensorStatus::Active).await;

        let as_of = DateTime::<Utc>::MIN_UTC + Duration::hours(1);
        store.seed_reading(1, "PM2.5", 12.0, DateTime::<Utc>::MIN_UTC).await;

        let result = assert_ok!(calculate(&store, Scope::Station(1), as_of).await);
        assert_eq!(result.index, 50.0);
    }
}

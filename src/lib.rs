//! Measurement validation and Air Quality Index core for the VriSA
//! monitoring network.
//!
//! - `validator` gates every incoming reading (sensor liveness, catalog range)
//! - `aqi` turns time-series windows into EPA sub-indices, categories and
//!   consolidated station/network readings, and backfills history
//! - `store` is the boundary to the time-series database
//! - `routes`, `config` and `schema` make up the HTTP service in `main.rs`
//!
//! Modules expose their public surface through their `mod.rs` gateway
//! (EMBP); siblings import from the crate root re-exports below.

pub mod aqi;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::{Result, ServiceError};
pub use models::{CatalogEntry, NewReading, Reading, Sample, Scope, Sensor, SensorStatus};
pub use store::{MeasurementStore, PgStore};

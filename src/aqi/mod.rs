//! Air Quality Index engine.
//!
//! Gateway for the AQI submodules (EMBP): breakpoint interpolation,
//! category classification, point-in-time aggregation and historical
//! backfill. Callers outside this directory import from here only.

mod backfill;
mod breakpoints;
mod calculator;
mod category;

pub use backfill::backfill;
pub use breakpoints::{mean, sub_index, sub_index_for_code, Pollutant};
pub use calculator::{aggregate, calculate, AqiResult, WINDOW_HOURS};
pub use category::{classify, Category, CATEGORIES};

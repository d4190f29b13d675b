//! EPA breakpoint tables and the piecewise-linear sub-index formula.
//!
//! Each supported pollutant maps its concentration onto the 0–500 index
//! scale through a table of contiguous bands. Inside a band the index is
//!
//! ```text
//! I = (I_hi - I_lo) / (C_hi - C_lo) * (C - C_lo) + I_lo
//! ```
//!
//! rounded to two decimals. Concentrations above the last band are
//! extrapolated with that band's coefficients, so the result is not bounded
//! by 500.
//!
//! Units follow the EPA technical assistance document: particulates in
//! µg/m³, CO in ppm, O3/NO2/SO2 in ppb.

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use crate::error::{Result, ServiceError};

// ---

/// One band of a breakpoint table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub conc_low: f64,
    pub conc_high: f64,
    pub index_low: f64,
    pub index_high: f64,
}

impl Breakpoint {
    const fn new(conc_low: f64, conc_high: f64, index_low: f64, index_high: f64) -> Self {
        Self {
            conc_low,
            conc_high,
            index_low,
            index_high,
        }
    }

    fn slope(&self) -> f64 {
        (self.index_high - self.index_low) / (self.conc_high - self.conc_low)
    }

    fn interpolate(&self, concentration: f64) -> f64 {
        self.slope() * (concentration - self.conc_low) + self.index_low
    }
}

const PM25_TABLE: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 12.0, 0.0, 50.0),
    Breakpoint::new(12.1, 35.4, 51.0, 100.0),
    Breakpoint::new(35.5, 55.4, 101.0, 150.0),
    Breakpoint::new(55.5, 150.4, 151.0, 200.0),
    Breakpoint::new(150.5, 250.4, 201.0, 300.0),
    Breakpoint::new(250.5, 350.4, 301.0, 400.0),
    Breakpoint::new(350.5, 500.4, 401.0, 500.0),
];

const PM10_TABLE: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 54.0, 0.0, 50.0),
    Breakpoint::new(55.0, 154.0, 51.0, 100.0),
    Breakpoint::new(155.0, 254.0, 101.0, 150.0),
    Breakpoint::new(255.0, 354.0, 151.0, 200.0),
    Breakpoint::new(355.0, 424.0, 201.0, 300.0),
    Breakpoint::new(425.0, 504.0, 301.0, 400.0),
    Breakpoint::new(505.0, 604.0, 401.0, 500.0),
];

// 8-hour ozone. The EPA switches to 1-hour averages above 200 ppb; those
// bands are not contiguous with these, so the last band is extrapolated.
const O3_TABLE: [Breakpoint; 5] = [
    Breakpoint::new(0.0, 54.0, 0.0, 50.0),
    Breakpoint::new(55.0, 70.0, 51.0, 100.0),
    Breakpoint::new(71.0, 85.0, 101.0, 150.0),
    Breakpoint::new(86.0, 105.0, 151.0, 200.0),
    Breakpoint::new(106.0, 200.0, 201.0, 300.0),
];

const CO_TABLE: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 4.4, 0.0, 50.0),
    Breakpoint::new(4.5, 9.4, 51.0, 100.0),
    Breakpoint::new(9.5, 12.4, 101.0, 150.0),
    Breakpoint::new(12.5, 15.4, 151.0, 200.0),
    Breakpoint::new(15.5, 30.4, 201.0, 300.0),
    Breakpoint::new(30.5, 40.4, 301.0, 400.0),
    Breakpoint::new(40.5, 50.4, 401.0, 500.0),
];

const NO2_TABLE: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 53.0, 0.0, 50.0),
    Breakpoint::new(54.0, 100.0, 51.0, 100.0),
    Breakpoint::new(101.0, 360.0, 101.0, 150.0),
    Breakpoint::new(361.0, 649.0, 151.0, 200.0),
    Breakpoint::new(650.0, 1249.0, 201.0, 300.0),
    Breakpoint::new(1250.0, 1649.0, 301.0, 400.0),
    Breakpoint::new(1650.0, 2049.0, 401.0, 500.0),
];

const SO2_TABLE: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 35.0, 0.0, 50.0),
    Breakpoint::new(36.0, 75.0, 51.0, 100.0),
    Breakpoint::new(76.0, 185.0, 101.0, 150.0),
    Breakpoint::new(186.0, 304.0, 151.0, 200.0),
    Breakpoint::new(305.0, 604.0, 201.0, 300.0),
    Breakpoint::new(605.0, 804.0, 301.0, 400.0),
    Breakpoint::new(805.0, 1004.0, 401.0, 500.0),
];

/// The six pollutants with an AQI breakpoint table.
///
/// Declaration order is the fixed evaluation order; it also decides ties
/// when two pollutants share the maximum sub-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    O3,
    Co,
    No2,
    So2,
}

impl Pollutant {
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::O3,
        Pollutant::Co,
        Pollutant::No2,
        Pollutant::So2,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::O3 => "O3",
            Pollutant::Co => "CO",
            Pollutant::No2 => "NO2",
            Pollutant::So2 => "SO2",
        }
    }

    pub fn breakpoints(&self) -> &'static [Breakpoint] {
        match self {
            Pollutant::Pm25 => &PM25_TABLE,
            Pollutant::Pm10 => &PM10_TABLE,
            Pollutant::O3 => &O3_TABLE,
            Pollutant::Co => &CO_TABLE,
            Pollutant::No2 => &NO2_TABLE,
            Pollutant::So2 => &SO2_TABLE,
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Pollutant {
    type Err = ServiceError;

    fn from_str(code: &str) -> Result<Self> {
        Pollutant::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| ServiceError::UnsupportedPollutant(code.to_string()))
    }
}

// Serialized by code so it can key JSON maps ("PM2.5": 112.08).
impl Serialize for Pollutant {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sub-index of a single pollutant concentration.
///
/// Negative concentrations clamp to 0. A concentration in the gap between
/// two published bands (e.g. PM2.5 12.05) is scored at the lower edge of the
/// next band.
pub fn sub_index(pollutant: Pollutant, concentration: f64) -> f64 {
    // ---
    if concentration < 0.0 {
        return 0.0;
    }

    let table = pollutant.breakpoints();
    let raw = match table.iter().find(|bp| concentration <= bp.conc_high) {
        Some(bp) => bp.interpolate(concentration.max(bp.conc_low)),
        None => table[table.len() - 1].interpolate(concentration),
    };

    round2(raw)
}

/// String-keyed form of [`sub_index`].
pub fn sub_index_for_code(code: &str, concentration: f64) -> Result<f64> {
    let pollutant: Pollutant = code.parse()?;
    Ok(sub_index(pollutant, concentration))
}

/// Arithmetic mean of a window of concentrations; `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

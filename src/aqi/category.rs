//! AQI category table (label, color, health message) and classification.

use serde::Serialize;

// ---

#[derive(Debug, PartialEq, Serialize)]
pub struct Category {
    pub label: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub low: f64,
    pub high: f64,
}

pub static CATEGORIES: [Category; 6] = [
    Category {
        label: "Good",
        color: "#00E400",
        description: "Air quality is satisfactory, and air pollution poses little or no risk.",
        low: 0.0,
        high: 50.0,
    },
    Category {
        label: "Moderate",
        color: "#FFFF00",
        description: "Air quality is acceptable. However, there may be a risk for some people, \
                      particularly those who are unusually sensitive to air pollution.",
        low: 51.0,
        high: 100.0,
    },
    Category {
        label: "Unhealthy for Sensitive Groups",
        color: "#FF7E00",
        description: "Members of sensitive groups may experience health effects. \
                      The general public is less likely to be affected.",
        low: 101.0,
        high: 150.0,
    },
    Category {
        label: "Unhealthy",
        color: "#FF0000",
        description: "Some members of the general public may experience health effects; \
                      members of sensitive groups may experience more serious health effects.",
        low: 151.0,
        high: 200.0,
    },
    Category {
        label: "Very Unhealthy",
        color: "#8F3F97",
        description: "Health alert: the risk of health effects is increased for everyone.",
        low: 201.0,
        high: 300.0,
    },
    Category {
        label: "Hazardous",
        color: "#7E0023",
        description: "Health warning of emergency conditions: everyone is more likely to be affected.",
        low: 301.0,
        high: 500.0,
    },
];

pub static HAZARDOUS: &Category = &CATEGORIES[5];

/// Category for an index value.
///
/// Ranges are inclusive on both ends. Fractional values between two ranges
/// (e.g. 50.5) belong to the upper one, and anything above 500 saturates to
/// Hazardous.
pub fn classify(index: f64) -> &'static Category {
    CATEGORIES
        .iter()
        .find(|c| index <= c.high)
        .unwrap_or(HAZARDOUS)
}

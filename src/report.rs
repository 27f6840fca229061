//! Raw METAR reports, as returned by the aviationweather.gov data API.
//!
//! Numeric fields are decoded leniently: the API occasionally reports
//! strings (or nothing) where a number is expected, and a single odd field
//! must not discard the rest of the response.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One observation for one station.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    /// ICAO station identifier, e.g. `KSFO`.
    #[serde(rename = "icaoId")]
    pub station: String,

    /// The undecoded observation text.
    #[serde(rename = "rawOb", default)]
    pub raw_text: Option<String>,

    /// Sustained wind, knots.
    #[serde(rename = "wspd", default, deserialize_with = "lenient_number")]
    pub wind_speed: Option<f64>,

    /// Gusts, knots.
    #[serde(rename = "wgst", default, deserialize_with = "lenient_number")]
    pub gust_speed: Option<f64>,

    #[serde(rename = "visib", default, deserialize_with = "lenient_visibility")]
    pub visibility: Option<RawVisibility>,

    #[serde(default)]
    pub clouds: Option<Vec<RawCloud>>,

    /// Flight category computed by the provider, if it did so.
    #[serde(rename = "fltCat", default)]
    pub flight_category: Option<String>,
}

/// Visibility in statute miles, either numeric or textual (`"10+"`, `"1/2"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawVisibility {
    Number(f64),
    Text(String),
}

#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawCloud {
    #[serde(default)]
    pub cover: Option<String>,

    /// Feet above ground level.
    #[serde(default, deserialize_with = "lenient_number")]
    pub base: Option<f64>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_visibility<'de, D>(deserializer: D) -> Result<Option<RawVisibility>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Number(n)) => n.as_f64().map(RawVisibility::Number),
        Some(Value::String(s)) => Some(RawVisibility::Text(s)),
        _ => None,
    })
}

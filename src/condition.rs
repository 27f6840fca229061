//! Per-airport conditions, extracted from one raw report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::category::{classify, CloudLayer, Cover, FlightCategory};
use crate::report::{RawCloud, RawReport};
use crate::visibility::parse_visibility;

/// Marks a report whose thunderstorm sensor is out of service.
const LIGHTNING_UNAVAILABLE: &str = "TSNO";

/// Length of the station identifier that opens a raw report.
const STATION_PREFIX: usize = 4;

/// Normalized conditions at one airport for one fetch cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub category: FlightCategory,
    /// Knots.
    pub wind_speed: f64,
    /// Knots.
    pub gust_speed: f64,
    pub gusty: bool,
    pub lightning: bool,
}

impl Condition {
    /// Conditions with no wind or weather, in the given category.
    pub fn calm(category: FlightCategory) -> Self {
        Condition {
            category,
            wind_speed: 0.0,
            gust_speed: 0.0,
            gusty: false,
            lightning: false,
        }
    }
}

/// Thresholds that affect extraction.
#[derive(Clone, Copy, Debug)]
pub struct ExtractSettings {
    /// Gusts above this speed (knots) animate.
    pub gust_threshold: f64,
    /// Animate on any gust at all.
    pub always_animate_gusts: bool,
}

/// Build a [Condition] from a raw report.
pub fn extract(report: &RawReport, settings: &ExtractSettings) -> Condition {
    let wind_speed = non_negative(report.wind_speed);
    let gust_speed = non_negative(report.gust_speed);
    let gusty = (settings.always_animate_gusts && gust_speed > 0.0)
        || gust_speed > settings.gust_threshold;
    let lightning = report.raw_text.as_deref().is_some_and(has_lightning);

    let category = match report
        .flight_category
        .as_deref()
        .and_then(FlightCategory::from_code)
    {
        Some(c) => c,
        None => {
            let layers = cloud_layers(report.clouds.as_deref().unwrap_or_default());
            classify(parse_visibility(report.visibility.as_ref()), &layers)
        }
    };

    Condition {
        category,
        wind_speed,
        gust_speed,
        gusty,
        lightning,
    }
}

/// Whether an observation reports lightning or a thunderstorm.
///
/// The station identifier is skipped (e.g. `KTSM` would otherwise match);
/// `TSNO` anywhere forces false.
pub fn has_lightning(raw: &str) -> bool {
    if raw.contains(LIGHTNING_UNAVAILABLE) {
        return false;
    }
    let body = match raw.char_indices().nth(STATION_PREFIX) {
        Some((i, _)) => &raw[i..],
        None => "",
    };
    body.contains("LTG") || body.contains("TS")
}

fn non_negative(v: Option<f64>) -> f64 {
    v.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}

fn cloud_layers(raw: &[RawCloud]) -> Vec<CloudLayer> {
    raw.iter()
        .filter_map(|c| {
            let cover = Cover::from_code(c.cover.as_deref()?)?;
            let base = c
                .base
                .filter(|b| b.is_finite() && *b >= 0.0)
                .map(|b| b.round() as u32);
            Some(CloudLayer::new(cover, base))
        })
        .collect()
}

/// The condition set for one fetch cycle: station to condition and raw text.
///
/// A snapshot is built once from a fetch and never modified; a new fetch
/// produces a new snapshot that replaces the old one whole.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    entries: HashMap<String, Entry>,
}

#[derive(Clone, Debug)]
struct Entry {
    condition: Condition,
    raw_text: Option<String>,
}

impl Snapshot {
    /// Build from reports. When a station appears more than once the first
    /// (most recent) report wins.
    pub fn from_reports(reports: &[RawReport], settings: &ExtractSettings) -> Self {
        let mut entries = HashMap::with_capacity(reports.len());
        for report in reports {
            let station = report.station.trim().to_ascii_uppercase();
            if station.is_empty() || entries.contains_key(&station) {
                continue;
            }
            let condition = extract(report, settings);
            tracing::debug!(
                "{station}: {} wind {}kt gust {}kt{}{}",
                condition.category,
                condition.wind_speed,
                condition.gust_speed,
                if condition.gusty { " gusty" } else { "" },
                if condition.lightning { " lightning" } else { "" },
            );
            entries.insert(
                station,
                Entry {
                    condition,
                    raw_text: report.raw_text.clone(),
                },
            );
        }
        Snapshot { entries }
    }

    /// Conditions for a station, if it reported.
    pub fn condition(&self, station: &str) -> Option<&Condition> {
        self.entries
            .get(&station.to_ascii_uppercase())
            .map(|e| &e.condition)
    }

    pub fn raw_text(&self, station: &str) -> Option<&str> {
        self.entries
            .get(&station.to_ascii_uppercase())
            .and_then(|e| e.raw_text.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Condition)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (String, Condition)>>(iter: T) -> Self {
        let entries = iter
            .into_iter()
            .map(|(station, condition)| {
                let entry = Entry {
                    condition,
                    raw_text: None,
                };
                (station.to_ascii_uppercase(), entry)
            })
            .collect();
        Snapshot { entries }
    }
}

//! Static configuration, loaded from a JSON file and validated at startup.

use std::{collections::HashSet, path::Path, path::PathBuf, time::Duration};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::{
    category::FlightCategory,
    color::Color,
    condition::ExtractSettings,
    error::{Error, Result},
    legend::LEGEND_LEN,
};

pub const DEFAULT_ENDPOINT: &str = "https://aviationweather.gov/api/data/metar";

/// Top-level configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Number of pixels on the strip.
    pub led_count: usize,

    /// Station for each pixel, in strip order. `null` leaves a pixel unused.
    pub airports: Vec<Option<String>>,

    #[serde(default)]
    pub brightness: BrightnessSettings,

    #[serde(default)]
    pub palette: Palette,

    #[serde(default)]
    pub wind: WindSettings,

    #[serde(default)]
    pub lightning: LightningSettings,

    #[serde(default)]
    pub timing: TimingSettings,

    #[serde(default)]
    pub legend: LegendSettings,

    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

/// Normal and faded variants of one category's color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shades {
    pub normal: Color,
    pub faded: Color,
}

/// The complete color key.
///
/// Every entry is required when a palette is given; there is no fallback
/// for a missing entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Palette {
    pub vfr: Shades,
    pub mvfr: Shades,
    pub ifr: Shades,
    pub lifr: Shades,
    /// "Off": no data, or the dark half of a blink.
    pub clear: Color,
    pub lightning: Color,
    pub high_wind: Color,
}

impl Palette {
    /// Colors for a category; `None` only for `Unknown`, which has no swatch.
    pub fn shades(&self, category: FlightCategory) -> Option<&Shades> {
        match category {
            FlightCategory::Vfr => Some(&self.vfr),
            FlightCategory::Mvfr => Some(&self.mvfr),
            FlightCategory::Ifr => Some(&self.ifr),
            FlightCategory::Lifr => Some(&self.lifr),
            FlightCategory::Unknown => None,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            vfr: Shades {
                normal: Color::new(0, 255, 0),
                faded: Color::new(0, 125, 0),
            },
            mvfr: Shades {
                normal: Color::new(0, 0, 255),
                faded: Color::new(0, 0, 125),
            },
            ifr: Shades {
                normal: Color::new(255, 0, 0),
                faded: Color::new(125, 0, 0),
            },
            lifr: Shades {
                normal: Color::new(125, 0, 125),
                faded: Color::new(75, 0, 75),
            },
            clear: Color::OFF,
            lightning: Color::new(255, 255, 255),
            high_wind: Color::new(255, 255, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindSettings {
    /// Animate windy airports.
    pub enabled: bool,
    /// Sustained wind (knots) at or above which an airport animates.
    /// Gusts above this also animate.
    pub blink_threshold: f64,
    /// Wind or gusts (knots) at or above which the high-wind color shows.
    /// `null` disables the high-wind color.
    pub high_wind_threshold: Option<f64>,
    /// Animate on any reported gust.
    pub always_blink_for_gusts: bool,
    /// Fade to the dim variant instead of blinking off.
    pub fade: bool,
}

impl Default for WindSettings {
    fn default() -> Self {
        WindSettings {
            enabled: true,
            blink_threshold: 15.0,
            high_wind_threshold: Some(25.0),
            always_blink_for_gusts: false,
            fade: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightningSettings {
    pub enabled: bool,
}

impl Default for LightningSettings {
    fn default() -> Self {
        LightningSettings { enabled: true }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingSettings {
    /// Length of one animation phase.
    pub cycle_secs: f64,
    /// Total run time of a bounded run.
    pub total_secs: f64,
    /// Time between fetches in continuous mode.
    pub refresh_secs: f64,
    /// Wait after a failed fetch in continuous mode.
    pub retry_secs: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            cycle_secs: 1.0,
            total_secs: 300.0,
            refresh_secs: 300.0,
            retry_secs: 60.0,
        }
    }
}

impl TimingSettings {
    pub fn cycle(&self) -> Duration {
        Duration::from_secs_f64(self.cycle_secs)
    }

    pub fn total(&self) -> Duration {
        Duration::from_secs_f64(self.total_secs)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_secs)
    }

    pub fn retry(&self) -> Duration {
        Duration::from_secs_f64(self.retry_secs)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegendSettings {
    pub enabled: bool,
    /// Pixels skipped between the last airport and the first legend pixel.
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrightnessSettings {
    /// Normal brightness, 0.0 to 1.0.
    pub level: f32,
    /// Brightness while dimmed, 0.0 to 1.0.
    pub dim_level: f32,
    pub dimming: Option<Dimming>,
}

impl Default for BrightnessSettings {
    fn default() -> Self {
        BrightnessSettings {
            level: 0.5,
            dim_level: 0.1,
            dimming: None,
        }
    }
}

/// When to switch to the dim level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimming {
    /// Bright between two local times of day (`HH:MM`).
    Fixed { bright_from: String, dim_from: String },
    /// Bright between sunrise and sunset at a location.
    Solar { latitude: f64, longitude: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSettings {
    pub endpoint: String,
    pub timeout_secs: f64,
    /// How many hours of reports to request.
    pub hours: u32,
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout_secs: 10.0,
            hours: 5,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    /// Latest state document, rewritten every fetch.
    pub state: Option<PathBuf>,
    /// JSON-lines history, appended every fetch.
    pub history: Option<PathBuf>,
}

/// Parse an `HH:MM` time of day.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| Error::Config(format!("invalid time of day {s:?}: {e}")))
}

impl Config {
    /// A configuration with default settings for the given strip.
    pub fn new(led_count: usize, airports: Vec<Option<String>>) -> Self {
        Config {
            led_count,
            airports,
            brightness: Default::default(),
            palette: Default::default(),
            wind: Default::default(),
            lightning: Default::default(),
            timing: Default::default(),
            legend: Default::default(),
            source: Default::default(),
            export: Default::default(),
        }
    }

    /// Read, parse, and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("could not read {}: {e}", path.display())))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(data).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every setting the driver relies on.
    pub fn validate(&self) -> Result<()> {
        if self.led_count == 0 {
            return Err(Error::Config("led_count must be positive".into()));
        }
        if self.airports.iter().flatten().any(|a| a.trim().is_empty()) {
            return Err(Error::Config(
                "airport identifiers must not be blank; use null for an unused pixel".into(),
            ));
        }

        check_threshold("wind.blink_threshold", self.wind.blink_threshold)?;
        if let Some(t) = self.wind.high_wind_threshold {
            check_threshold("wind.high_wind_threshold", t)?;
            if t <= self.wind.blink_threshold {
                return Err(Error::Config(format!(
                    "wind.high_wind_threshold ({t}) must be above wind.blink_threshold ({})",
                    self.wind.blink_threshold
                )));
            }
        }

        let t = &self.timing;
        for (name, v) in [
            ("timing.cycle_secs", t.cycle_secs),
            ("timing.total_secs", t.total_secs),
            ("timing.refresh_secs", t.refresh_secs),
            ("timing.retry_secs", t.retry_secs),
            ("source.timeout_secs", self.source.timeout_secs),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::Config(format!("{name} must be positive, got {v}")));
            }
        }

        let b = &self.brightness;
        for (name, v) in [("brightness.level", b.level), ("brightness.dim_level", b.dim_level)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::Config(format!("{name} must be in 0..=1, got {v}")));
            }
        }
        match &b.dimming {
            Some(Dimming::Fixed {
                bright_from,
                dim_from,
            }) => {
                parse_time_of_day(bright_from)?;
                parse_time_of_day(dim_from)?;
            }
            Some(Dimming::Solar {
                latitude,
                longitude,
            }) => {
                if !(-90.0..=90.0).contains(latitude) || !(-180.0..=180.0).contains(longitude) {
                    return Err(Error::Config(format!(
                        "invalid location {latitude},{longitude}"
                    )));
                }
            }
            None => {}
        }

        if self.source.endpoint.trim().is_empty() {
            return Err(Error::Config("source.endpoint must not be empty".into()));
        }

        if let Some(overrun) = self.overrun() {
            tracing::warn!(
                "{} pixels needed but led_count is {}; the extra pixels will not be shown",
                overrun,
                self.led_count
            );
        }
        Ok(())
    }

    /// Pixels needed for airports and legend, if more than the strip has.
    pub fn overrun(&self) -> Option<usize> {
        let needed = if self.legend.enabled {
            self.legend_start() + LEGEND_LEN
        } else {
            self.airports.len()
        };
        (needed > self.led_count).then_some(needed)
    }

    /// Distinct station identifiers, uppercase, in strip order.
    pub fn stations(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.airports
            .iter()
            .flatten()
            .map(|a| a.trim().to_ascii_uppercase())
            .filter(|a| seen.insert(a.clone()))
            .collect()
    }

    pub fn extract_settings(&self) -> ExtractSettings {
        ExtractSettings {
            gust_threshold: self.wind.blink_threshold,
            always_animate_gusts: self.wind.always_blink_for_gusts,
        }
    }

    /// Whether anything on the map changes between phases.
    pub fn animated(&self) -> bool {
        self.wind.enabled || self.lightning.enabled
    }

    /// Pixel index of the first legend entry.
    pub fn legend_start(&self) -> usize {
        self.airports.len() + self.legend.offset
    }
}

fn check_threshold(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{name} must be a non-negative number of knots, got {v}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{"led_count": 4, "airports": ["KSFO", null, "koak", "KSFO"]}"#;

    #[test]
    fn defaults_fill_in() {
        let c = Config::from_json(MINIMAL).unwrap();
        assert_eq!(c.palette, Palette::default());
        assert_eq!(c.wind.high_wind_threshold, Some(25.0));
        assert_eq!(c.stations(), vec!["KSFO".to_owned(), "KOAK".to_owned()]);
        assert_eq!(c.legend_start(), 4);
        assert!(c.animated());
    }

    #[test]
    fn null_disables_high_wind() {
        let c = Config::from_json(
            r#"{"led_count": 1, "airports": ["KSFO"], "wind": {"high_wind_threshold": null}}"#,
        )
        .unwrap();
        assert_eq!(c.wind.high_wind_threshold, None);
        assert!(c.wind.enabled);
    }

    #[test]
    fn negative_sentinel_is_rejected() {
        let e = Config::from_json(
            r#"{"led_count": 1, "airports": ["KSFO"], "wind": {"high_wind_threshold": -1}}"#,
        );
        assert!(matches!(e, Err(Error::Config(_))));
    }

    #[test]
    fn high_wind_must_exceed_blink() {
        for high in ["10", "15"] {
            let e = Config::from_json(&format!(
                r#"{{"led_count": 1, "airports": ["KSFO"],
                    "wind": {{"blink_threshold": 15, "high_wind_threshold": {high}}}}}"#
            ));
            assert!(matches!(e, Err(Error::Config(_))), "accepted high {high}");
        }
    }

    #[test]
    fn partial_palette_is_rejected() {
        let e = Config::from_json(
            r#"{"led_count": 1, "airports": ["KSFO"],
                "palette": {"vfr": {"normal": {"r": 0, "g": 255, "b": 0},
                                    "faded": {"r": 0, "g": 100, "b": 0}}}}"#,
        );
        assert!(matches!(e, Err(Error::Config(_))));
    }

    #[test]
    fn bad_values_are_rejected() {
        for bad in [
            r#"{"led_count": 0, "airports": []}"#,
            r#"{"led_count": 1, "airports": [" "]}"#,
            r#"{"led_count": 1, "airports": [], "timing": {"cycle_secs": 0}}"#,
            r#"{"led_count": 1, "airports": [], "brightness": {"level": 1.5}}"#,
            r#"{"led_count": 1, "airports": [], "brightness": {"dimming": {"fixed": {"bright_from": "7am", "dim_from": "19:00"}}}}"#,
            r#"{"led_count": 1, "airports": [], "brightness": {"dimming": {"solar": {"latitude": 91, "longitude": 0}}}}"#,
            r#"{"led_count": 1, "airports": [], "source": {"timeout_secs": -1}}"#,
            r#"{"led_count": 1, "airports": [], "colour": true}"#,
        ] {
            assert!(
                matches!(Config::from_json(bad), Err(Error::Config(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn overrun_is_reported_not_rejected() {
        let mut c = Config::from_json(MINIMAL).unwrap();
        assert_eq!(c.overrun(), None);
        c.legend.enabled = true;
        c.legend.offset = 1;
        assert_eq!(c.overrun(), Some(12));
        assert!(c.validate().is_ok());
        c.led_count = 12;
        assert_eq!(c.overrun(), None);
    }

    #[test]
    fn dimming_variants_parse() {
        let c = Config::from_json(
            r#"{"led_count": 1, "airports": [],
                "brightness": {"level": 1, "dim_level": 0.2,
                               "dimming": {"fixed": {"bright_from": "07:00", "dim_from": "19:30"}}}}"#,
        )
        .unwrap();
        assert!(matches!(c.brightness.dimming, Some(Dimming::Fixed { .. })));
        assert_eq!(
            parse_time_of_day("19:30").unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap()
        );
    }

    #[test]
    fn every_known_category_has_shades() {
        let p = Palette::default();
        for c in [
            FlightCategory::Vfr,
            FlightCategory::Mvfr,
            FlightCategory::Ifr,
            FlightCategory::Lifr,
        ] {
            assert!(p.shades(c).is_some());
        }
        assert!(p.shades(FlightCategory::Unknown).is_none());
    }
}

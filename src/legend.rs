//! The legend: a fixed run of pixels explaining the color key.
//!
//! Animated legend entries are resolved exactly like an airport in the
//! matching conditions, so they always blink in step with the map.

use crate::{
    category::FlightCategory,
    color::Color,
    condition::Condition,
    config::Config,
    resolve::{resolve, Phase},
};

pub const LEGEND_LEN: usize = 7;

/// Legend entries, in strip order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendEntry {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
    Lightning,
    Wind,
    HighWind,
}

impl LegendEntry {
    pub const ALL: [LegendEntry; LEGEND_LEN] = [
        LegendEntry::Vfr,
        LegendEntry::Mvfr,
        LegendEntry::Ifr,
        LegendEntry::Lifr,
        LegendEntry::Lightning,
        LegendEntry::Wind,
        LegendEntry::HighWind,
    ];

    /// The conditions this entry illustrates.
    pub fn example(&self, config: &Config) -> Condition {
        let wind = &config.wind;
        match self {
            LegendEntry::Vfr => Condition::calm(FlightCategory::Vfr),
            LegendEntry::Mvfr => Condition::calm(FlightCategory::Mvfr),
            LegendEntry::Ifr => Condition::calm(FlightCategory::Ifr),
            LegendEntry::Lifr => Condition::calm(FlightCategory::Lifr),
            LegendEntry::Lightning => Condition {
                lightning: true,
                ..Condition::calm(FlightCategory::Vfr)
            },
            LegendEntry::Wind => Condition {
                wind_speed: wind.blink_threshold,
                ..Condition::calm(FlightCategory::Vfr)
            },
            LegendEntry::HighWind => match wind.high_wind_threshold {
                Some(t) => Condition {
                    wind_speed: t.max(wind.blink_threshold),
                    ..Condition::calm(FlightCategory::Vfr)
                },
                None => Condition::calm(FlightCategory::Vfr),
            },
        }
    }
}

/// Legend colors for a phase.
pub fn legend(phase: Phase, config: &Config) -> [Color; LEGEND_LEN] {
    LegendEntry::ALL.map(|entry| resolve(Some(&entry.example(config)), phase, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(10, vec![Some("KSFO".into())])
    }

    #[test]
    fn swatches_are_static() {
        let c = config();
        for phase in [Phase::Off, Phase::On] {
            let l = legend(phase, &c);
            assert_eq!(l[0], c.palette.vfr.normal);
            assert_eq!(l[1], c.palette.mvfr.normal);
            assert_eq!(l[2], c.palette.ifr.normal);
            assert_eq!(l[3], c.palette.lifr.normal);
        }
    }

    #[test]
    fn indicators_alternate() {
        let c = config();
        let off = legend(Phase::Off, &c);
        let on = legend(Phase::On, &c);
        let p = &c.palette;
        assert_eq!(off[4], p.lightning);
        assert_eq!(on[4], p.vfr.normal);
        assert_eq!(off[5], p.vfr.normal);
        assert_eq!(on[5], p.clear);
        assert_eq!(off[6], p.vfr.normal);
        assert_eq!(on[6], p.high_wind);
    }

    #[test]
    fn wind_indicator_fades() {
        let mut c = config();
        c.wind.fade = true;
        assert_eq!(legend(Phase::On, &c)[5], c.palette.vfr.faded);
    }

    #[test]
    fn disabled_features_hold_still() {
        let mut c = config();
        c.wind.enabled = false;
        c.lightning.enabled = false;
        for phase in [Phase::Off, Phase::On] {
            let l = legend(phase, &c);
            assert!(l[4..].iter().all(|px| *px == c.palette.vfr.normal));
        }
    }

    #[test]
    fn disabled_high_wind_holds_still() {
        let mut c = config();
        c.wind.high_wind_threshold = None;
        let off = legend(Phase::Off, &c);
        let on = legend(Phase::On, &c);
        assert_eq!(off[6], c.palette.vfr.normal);
        assert_eq!(on[6], c.palette.vfr.normal);
        // The plain wind indicator still blinks.
        assert_eq!(on[5], c.palette.clear);
    }

    #[test]
    fn agrees_with_a_windy_airport() {
        let mut c = config();
        for fade in [false, true] {
            c.wind.fade = fade;
            let airport = Condition {
                wind_speed: 20.0,
                ..Condition::calm(FlightCategory::Vfr)
            };
            for phase in [Phase::Off, Phase::On] {
                assert_eq!(legend(phase, &c)[5], resolve(Some(&airport), phase, &c));
            }
        }
    }
}

//! Turns an airport's conditions into the color shown for one phase.

use crate::{
    color::Color,
    condition::{Condition, Snapshot},
    config::Config,
};

/// Which half of the animation cycle is showing.
///
/// Wind effects show on `On`; lightning shows on `Off`. Every airport and
/// the legend share one phase per paint, so the two effects alternate
/// rather than collide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Off,
    On,
}

impl Phase {
    pub fn flipped(self) -> Self {
        match self {
            Phase::Off => Phase::On,
            Phase::On => Phase::Off,
        }
    }
}

/// Resolve the color for one airport.
///
/// Rules are tried in order and the first match wins:
/// 1. no data, or an unknown category: clear
/// 2. lightning, on the off-phase: lightning
/// 3. windy and over the high-wind threshold, on the on-phase: high wind
/// 4. windy, on the on-phase: faded category color, or clear
/// 5. the category color
pub fn resolve(condition: Option<&Condition>, phase: Phase, config: &Config) -> Color {
    let palette = &config.palette;
    let Some(condition) = condition else {
        return palette.clear;
    };
    let Some(shades) = palette.shades(condition.category) else {
        return palette.clear;
    };

    if config.lightning.enabled && phase == Phase::Off && condition.lightning {
        return palette.lightning;
    }

    let wind = &config.wind;
    let windy = condition.wind_speed >= wind.blink_threshold || condition.gusty;
    if wind.enabled && phase == Phase::On && windy {
        let high = wind.high_wind_threshold.is_some_and(|t| {
            condition.wind_speed >= t || condition.gust_speed >= t
        });
        if high {
            return palette.high_wind;
        }
        return if wind.fade { shades.faded } else { palette.clear };
    }

    shades.normal
}

/// Resolve every airport on the strip, in strip order.
/// Unused pixels (`null` airports) resolve to `None`.
pub fn resolve_airports<'a>(
    config: &'a Config,
    snapshot: &'a Snapshot,
    phase: Phase,
) -> impl Iterator<Item = Option<Color>> + 'a {
    config.airports.iter().map(move |a| {
        a.as_deref()
            .map(|station| resolve(snapshot.condition(station.trim()), phase, config))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::FlightCategory::{self, *};

    fn config() -> Config {
        Config::new(4, vec![Some("KSFO".into())])
    }

    fn windy(category: FlightCategory, wind: f64, gust: f64) -> Condition {
        Condition {
            wind_speed: wind,
            gust_speed: gust,
            gusty: gust > 15.0,
            ..Condition::calm(category)
        }
    }

    #[test]
    fn missing_or_unknown_is_clear() {
        let mut c = config();
        c.palette.clear = Color::new(1, 2, 3);
        let stormy = Condition {
            lightning: true,
            ..windy(Unknown, 40.0, 50.0)
        };
        for phase in [Phase::Off, Phase::On] {
            assert_eq!(resolve(None, phase, &c), c.palette.clear);
            assert_eq!(resolve(Some(&stormy), phase, &c), c.palette.clear);
        }
    }

    #[test]
    fn lightning_beats_high_wind() {
        let c = config();
        let cond = Condition {
            lightning: true,
            ..windy(Ifr, 30.0, 40.0)
        };
        assert_eq!(resolve(Some(&cond), Phase::Off, &c), c.palette.lightning);
        assert_eq!(resolve(Some(&cond), Phase::On, &c), c.palette.high_wind);
    }

    #[test]
    fn lightning_can_be_disabled() {
        let mut c = config();
        c.lightning.enabled = false;
        let cond = Condition {
            lightning: true,
            ..Condition::calm(Vfr)
        };
        assert_eq!(resolve(Some(&cond), Phase::Off, &c), c.palette.vfr.normal);
    }

    #[test]
    fn calm_airport_is_steady() {
        let c = config();
        let cond = windy(Vfr, 5.0, 0.0);
        assert_eq!(resolve(Some(&cond), Phase::On, &c), c.palette.vfr.normal);
        assert_eq!(resolve(Some(&cond), Phase::Off, &c), c.palette.vfr.normal);
    }

    #[test]
    fn gust_over_high_wind_threshold() {
        let c = config();
        let cond = windy(Mvfr, 10.0, 30.0);
        assert_eq!(resolve(Some(&cond), Phase::On, &c), c.palette.high_wind);
        assert_eq!(resolve(Some(&cond), Phase::Off, &c), c.palette.mvfr.normal);
    }

    #[test]
    fn blink_or_fade() {
        let mut c = config();
        let cond = windy(Ifr, 18.0, 0.0);
        assert_eq!(resolve(Some(&cond), Phase::On, &c), c.palette.clear);
        c.wind.fade = true;
        assert_eq!(resolve(Some(&cond), Phase::On, &c), c.palette.ifr.faded);
        assert_eq!(resolve(Some(&cond), Phase::Off, &c), c.palette.ifr.normal);
    }

    #[test]
    fn high_wind_requires_blink_condition() {
        // Gusts at the high-wind threshold don't count unless the airport
        // is also windy enough to animate.
        let mut c = config();
        c.wind.blink_threshold = 30.0;
        let cond = Condition {
            gusty: false,
            ..windy(Vfr, 10.0, 26.0)
        };
        assert_eq!(resolve(Some(&cond), Phase::On, &c), c.palette.vfr.normal);
    }

    #[test]
    fn high_wind_can_be_disabled() {
        let mut c = config();
        c.wind.high_wind_threshold = None;
        let cond = windy(Lifr, 40.0, 50.0);
        assert_eq!(resolve(Some(&cond), Phase::On, &c), c.palette.clear);
    }

    #[test]
    fn wind_can_be_disabled() {
        let mut c = config();
        c.wind.enabled = false;
        let cond = windy(Lifr, 40.0, 50.0);
        assert_eq!(resolve(Some(&cond), Phase::On, &c), c.palette.lifr.normal);
    }

    #[test]
    fn airports_in_strip_order() {
        let c = Config::new(3, vec![Some("KSFO".into()), None, Some("KOAK".into())]);
        let snapshot: Snapshot = [("KSFO".to_owned(), Condition::calm(Mvfr))]
            .into_iter()
            .collect();
        let got: Vec<_> = resolve_airports(&c, &snapshot, Phase::Off).collect();
        assert_eq!(
            got,
            vec![Some(c.palette.mvfr.normal), None, Some(c.palette.clear)]
        );
    }

    #[test]
    fn phase_flips() {
        assert_eq!(Phase::default(), Phase::Off);
        assert_eq!(Phase::Off.flipped(), Phase::On);
        assert_eq!(Phase::On.flipped(), Phase::Off);
    }
}

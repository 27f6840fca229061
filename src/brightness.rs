//! Brightness schedule: normal level by day, dim level by night.
//!
//! Sunrise and sunset come from the NOAA solar equations; see the
//! [NOAA calculation details](https://gml.noaa.gov/grad/solcalc/calcdetails.html).
//! Like the NOAA spreadsheet, rise and set are computed as offsets from
//! solar noon.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::config::{parse_time_of_day, BrightnessSettings, Dimming};

/// Zenith of the sun at rise/set, accounting for refraction.
const ZENITH_DEGREES: f64 = 90.833;

/// Brightness to use at `now`.
pub fn brightness_at<Tz: TimeZone>(settings: &BrightnessSettings, now: DateTime<Tz>) -> f32 {
    let bright = match &settings.dimming {
        None => true,
        Some(Dimming::Fixed {
            bright_from,
            dim_from,
        }) => match (parse_time_of_day(bright_from), parse_time_of_day(dim_from)) {
            (Ok(from), Ok(to)) => in_window(now.naive_local().time(), from, to),
            // Validated at load; stay bright if it somehow isn't.
            _ => true,
        },
        Some(Dimming::Solar {
            latitude,
            longitude,
        }) => {
            let utc = now.with_timezone(&Utc);
            match daylight(utc.date_naive(), *latitude, *longitude) {
                Some((rise, set)) => {
                    // Check yesterday's window too: with a western longitude,
                    // the evening's sunset falls on the next UTC date.
                    let yesterday = utc
                        .date_naive()
                        .pred_opt()
                        .and_then(|d| daylight(d, *latitude, *longitude));
                    (rise..set).contains(&utc)
                        || yesterday.is_some_and(|(r, s)| (r..s).contains(&utc))
                }
                None => true,
            }
        }
    };
    let level = if bright {
        settings.level
    } else {
        settings.dim_level
    };
    tracing::debug!("brightness {level:.2} ({})", if bright { "day" } else { "night" });
    level
}

/// Whether `t` falls in [from, to), where the window may wrap midnight.
fn in_window(t: NaiveTime, from: NaiveTime, to: NaiveTime) -> bool {
    if from <= to {
        from <= t && t < to
    } else {
        t >= from || t < to
    }
}

/// Sunrise and sunset (UTC) for the given UTC date.
///
/// Returns `None` when the sun doesn't rise or set that day (polar day or night).
pub fn daylight(
    date: NaiveDate,
    latitude: f64,
    longitude: f64,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let days = if date.leap_year() { 366.0 } else { 365.0 };

    // Fractional year, in radians, at noon of the date.
    let gamma = 2.0 * PI / days * (date.ordinal0() as f64);

    // Equation of time, in minutes.
    let eqtime = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());

    // Solar declination, in radians.
    let decl = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    let lat = latitude.to_radians();
    let cos_ha =
        ZENITH_DEGREES.to_radians().cos() / (lat.cos() * decl.cos()) - lat.tan() * decl.tan();
    if !(-1.0..=1.0).contains(&cos_ha) {
        return None;
    }
    let ha = cos_ha.acos().to_degrees();

    // Minutes past UTC midnight.
    let noon = 720.0 - 4.0 * longitude - eqtime;
    let rise = noon - 4.0 * ha;
    let set = noon + 4.0 * ha;

    let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    let [rise, set] = [rise, set].map(|m| midnight + Duration::seconds((m * 60.0).round() as i64));
    Some((rise, set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn settings(dimming: Option<Dimming>) -> BrightnessSettings {
        BrightnessSettings {
            level: 0.8,
            dim_level: 0.2,
            dimming,
        }
    }

    fn fixed(from: &str, to: &str) -> Option<Dimming> {
        Some(Dimming::Fixed {
            bright_from: from.into(),
            dim_from: to.into(),
        })
    }

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 21, h, m, 0)
            .unwrap()
    }

    #[test]
    fn no_dimming_is_always_bright() {
        assert_eq!(brightness_at(&settings(None), at(3, 0)), 0.8);
    }

    #[test]
    fn fixed_window() {
        let s = settings(fixed("07:00", "19:00"));
        assert_eq!(brightness_at(&s, at(6, 59)), 0.2);
        assert_eq!(brightness_at(&s, at(7, 0)), 0.8);
        assert_eq!(brightness_at(&s, at(18, 59)), 0.8);
        assert_eq!(brightness_at(&s, at(19, 0)), 0.2);
    }

    #[test]
    fn fixed_window_wraps_midnight() {
        let s = settings(fixed("20:00", "04:00"));
        assert_eq!(brightness_at(&s, at(23, 0)), 0.8);
        assert_eq!(brightness_at(&s, at(1, 0)), 0.8);
        assert_eq!(brightness_at(&s, at(12, 0)), 0.2);
    }

    #[test]
    fn midsummer_in_delaware() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let (rise, set) = daylight(date, 39.7447, -75.539787).unwrap();
        assert_eq!(rise.hour(), 9);
        let hours = (set - rise).num_minutes() as f64 / 60.0;
        assert!((14.5..15.5).contains(&hours), "day length {hours}");
    }

    #[test]
    fn polar_night() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        assert_eq!(daylight(date, 80.0, 15.0), None);
    }

    #[test]
    fn solar_dimming() {
        let s = settings(Some(Dimming::Solar {
            latitude: 39.7447,
            longitude: -75.539787,
        }));
        // 7pm local is past midnight UTC, but still before sunset.
        assert_eq!(brightness_at(&s, at(12, 0)), 0.8);
        assert_eq!(brightness_at(&s, at(19, 0)), 0.8);
        assert_eq!(brightness_at(&s, at(2, 0)), 0.2);
        assert_eq!(brightness_at(&s, at(22, 30)), 0.2);
    }
}

//! Normalizes reported visibility to statute miles.

use crate::report::RawVisibility;

/// Visibility in statute miles, or `None` when it is missing or unusable.
///
/// Accepts plain numbers, numeric strings, and the "greater than" form
/// (`"10+"`). Negative values are treated as unknown.
pub fn parse_visibility(raw: Option<&RawVisibility>) -> Option<f64> {
    let v = match raw? {
        RawVisibility::Number(n) => *n,
        RawVisibility::Text(s) => {
            let s = s.strip_suffix('+').unwrap_or(s).trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
    };
    (v.is_finite() && v >= 0.0).then_some(v)
}

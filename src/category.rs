//! FAA flight categories, derived from ceiling and visibility.

use serde::{Deserialize, Serialize};

/// Flight category, most to least permissive.
///
/// `Unknown` means there was not enough data to classify; it is displayed as
/// "no signal" rather than treated as an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
    Unknown,
}

impl FlightCategory {
    /// Parse a provider-supplied category code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "VFR" => Some(Self::Vfr),
            "MVFR" => Some(Self::Mvfr),
            "IFR" => Some(Self::Ifr),
            "LIFR" => Some(Self::Lifr),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Vfr => "VFR",
            Self::Mvfr => "MVFR",
            Self::Ifr => "IFR",
            Self::Lifr => "LIFR",
            Self::Unknown => "UNKNOWN",
        }
    }

    fn from_ceiling(feet: u32) -> Self {
        match feet {
            f if f < 500 => Self::Lifr,
            f if f < 1000 => Self::Ifr,
            f if f < 3000 => Self::Mvfr,
            _ => Self::Vfr,
        }
    }

    fn from_visibility(miles: f64) -> Self {
        match miles {
            v if v < 1.0 => Self::Lifr,
            v if v < 3.0 => Self::Ifr,
            v if v < 5.0 => Self::Mvfr,
            _ => Self::Vfr,
        }
    }
}

impl std::fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Sky cover of a cloud layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cover {
    Clear,
    Few,
    Scattered,
    Broken,
    Overcast,
    Obscured,
}

impl Cover {
    /// Parse a METAR sky-cover code. Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "SKC" | "CLR" | "NSC" | "NCD" | "CAVOK" => Some(Self::Clear),
            "FEW" => Some(Self::Few),
            "SCT" => Some(Self::Scattered),
            "BKN" => Some(Self::Broken),
            "OVC" => Some(Self::Overcast),
            "OVX" | "VV" => Some(Self::Obscured),
            _ => None,
        }
    }

    /// Whether a layer of this cover forms a ceiling.
    pub fn is_ceiling(&self) -> bool {
        matches!(self, Self::Broken | Self::Overcast | Self::Obscured)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CloudLayer {
    pub cover: Cover,
    /// Feet above ground level.
    pub base: Option<u32>,
}

impl CloudLayer {
    pub fn new(cover: Cover, base: Option<u32>) -> Self {
        CloudLayer { cover, base }
    }
}

/// Height of the lowest broken, overcast, or obscured layer.
/// A ceiling layer without a base counts as being at the surface.
pub fn ceiling(layers: &[CloudLayer]) -> Option<u32> {
    layers
        .iter()
        .filter(|l| l.cover.is_ceiling())
        .map(|l| l.base.unwrap_or(0))
        .min()
}

/// Classify conditions from visibility (statute miles) and cloud layers.
///
/// Missing or non-positive visibility yields `Unknown` regardless of clouds.
/// With no ceiling layer the category depends on visibility alone.
/// Thresholds are exclusive: a 3000 ft ceiling is VFR.
pub fn classify(visibility: Option<f64>, layers: &[CloudLayer]) -> FlightCategory {
    let Some(visibility) = visibility.filter(|v| *v > 0.0) else {
        return FlightCategory::Unknown;
    };
    let by_visibility = FlightCategory::from_visibility(visibility);
    match ceiling(layers) {
        Some(c) => by_visibility.max(FlightCategory::from_ceiling(c)),
        None => by_visibility,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FlightCategory::*;

    fn ovc(base: u32) -> CloudLayer {
        CloudLayer::new(Cover::Overcast, Some(base))
    }

    #[test]
    fn unknown_without_visibility() {
        assert_eq!(classify(None, &[]), Unknown);
        assert_eq!(classify(None, &[ovc(200)]), Unknown);
        assert_eq!(classify(Some(0.0), &[]), Unknown);
        assert_eq!(classify(Some(-2.0), &[ovc(5000)]), Unknown);
    }

    #[test]
    fn ceiling_boundaries_are_exclusive() {
        assert_eq!(classify(Some(10.0), &[]), Vfr);
        assert_eq!(classify(Some(10.0), &[ovc(3000)]), Vfr);
        assert_eq!(classify(Some(10.0), &[ovc(2999)]), Mvfr);
        assert_eq!(classify(Some(10.0), &[ovc(1000)]), Mvfr);
        assert_eq!(classify(Some(10.0), &[ovc(999)]), Ifr);
        assert_eq!(classify(Some(10.0), &[ovc(500)]), Ifr);
        assert_eq!(classify(Some(10.0), &[ovc(499)]), Lifr);
    }

    #[test]
    fn visibility_boundaries_are_exclusive() {
        assert_eq!(classify(Some(5.0), &[]), Vfr);
        assert_eq!(classify(Some(4.99), &[]), Mvfr);
        assert_eq!(classify(Some(3.0), &[]), Mvfr);
        assert_eq!(classify(Some(2.5), &[]), Ifr);
        assert_eq!(classify(Some(1.0), &[]), Ifr);
        assert_eq!(classify(Some(0.9), &[]), Lifr);
    }

    #[test]
    fn worse_of_the_two_wins() {
        let clear = CloudLayer::new(Cover::Clear, None);
        assert_eq!(classify(Some(0.9), &[clear]), Lifr);
        assert_eq!(classify(Some(4.0), &[ovc(800)]), Ifr);
        assert_eq!(classify(Some(2.0), &[ovc(2500)]), Ifr);
    }

    #[test]
    fn only_ceiling_layers_count() {
        let layers = [
            CloudLayer::new(Cover::Few, Some(200)),
            CloudLayer::new(Cover::Scattered, Some(400)),
            CloudLayer::new(Cover::Broken, Some(1500)),
            CloudLayer::new(Cover::Overcast, Some(900)),
        ];
        assert_eq!(ceiling(&layers), Some(900));
        assert_eq!(classify(Some(10.0), &layers), Ifr);
        assert_eq!(classify(Some(10.0), &layers[..2]), Vfr);
    }

    #[test]
    fn baseless_ceiling_is_at_surface() {
        let vv = CloudLayer::new(Cover::Obscured, None);
        assert_eq!(ceiling(&[vv]), Some(0));
        assert_eq!(classify(Some(10.0), &[vv]), Lifr);
    }

    #[test]
    fn codes() {
        assert_eq!(FlightCategory::from_code("mvfr"), Some(Mvfr));
        assert_eq!(FlightCategory::from_code(""), None);
        assert_eq!(Cover::from_code("VV"), Some(Cover::Obscured));
        assert_eq!(Cover::from_code("CAVOK"), Some(Cover::Clear));
        assert_eq!(Cover::from_code("CB"), None);
        assert_eq!(Lifr.to_string(), "LIFR");
    }

    #[test]
    fn severity_order() {
        assert!(Vfr < Mvfr && Mvfr < Ifr && Ifr < Lifr);
    }
}

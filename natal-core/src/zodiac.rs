//! Vocabulary of the chart: signs, bodies and aspect kinds.
//!
//! Names here are stable identifiers (used in config, JSON and logs).
//! Display names in the chart's language live in [`crate::i18n`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if r >= 360.0 { 0.0 } else { r }
}

/// Signed shortest difference `to - from`, in `(-180, 180]`.
pub fn signed_delta(from: f64, to: f64) -> f64 {
    let d = normalize_degrees(to - from);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Unsigned angular separation, in `[0, 180]`.
pub fn separation(a: f64, b: f64) -> f64 {
    signed_delta(a, b).abs()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Sign {
    pub const fn all() -> &'static [Sign] {
        &[
            Sign::Aries,
            Sign::Taurus,
            Sign::Gemini,
            Sign::Cancer,
            Sign::Leo,
            Sign::Virgo,
            Sign::Libra,
            Sign::Scorpio,
            Sign::Sagittarius,
            Sign::Capricorn,
            Sign::Aquarius,
            Sign::Pisces,
        ]
    }

    /// 0 = Aries, 30 = Taurus, etc.
    pub fn from_longitude(longitude: f64) -> Sign {
        let index = (normalize_degrees(longitude) / 30.0).floor() as usize;
        Sign::all()[index.min(11)]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Ecliptic longitude where the sign begins.
    pub fn start(self) -> f64 {
        self.index() as f64 * 30.0
    }

    pub fn element(self) -> Element {
        match self.index() % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Sign::Aries => "♈",
            Sign::Taurus => "♉",
            Sign::Gemini => "♊",
            Sign::Cancer => "♋",
            Sign::Leo => "♌",
            Sign::Virgo => "♍",
            Sign::Libra => "♎",
            Sign::Scorpio => "♏",
            Sign::Sagittarius => "♐",
            Sign::Capricorn => "♑",
            Sign::Aquarius => "♒",
            Sign::Pisces => "♓",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sign::Aries => "aries",
            Sign::Taurus => "taurus",
            Sign::Gemini => "gemini",
            Sign::Cancer => "cancer",
            Sign::Leo => "leo",
            Sign::Virgo => "virgo",
            Sign::Libra => "libra",
            Sign::Scorpio => "scorpio",
            Sign::Sagittarius => "sagittarius",
            Sign::Capricorn => "capricorn",
            Sign::Aquarius => "aquarius",
            Sign::Pisces => "pisces",
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bodies placed on the chart, in traditional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    pub const fn all() -> &'static [Body] {
        &[
            Body::Sun,
            Body::Moon,
            Body::Mercury,
            Body::Venus,
            Body::Mars,
            Body::Jupiter,
            Body::Saturn,
            Body::Uranus,
            Body::Neptune,
            Body::Pluto,
        ]
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Body::Sun => "☉",
            Body::Moon => "☽",
            Body::Mercury => "☿",
            Body::Venus => "♀",
            Body::Mars => "♂",
            Body::Jupiter => "♃",
            Body::Saturn => "♄",
            Body::Uranus => "♅",
            Body::Neptune => "♆",
            Body::Pluto => "♇",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
            Body::Uranus => "uranus",
            Body::Neptune => "neptune",
            Body::Pluto => "pluto",
        }
    }

    /// Sun and Moon never station.
    pub fn can_retrograde(self) -> bool {
        !matches!(self, Body::Sun | Body::Moon)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectKind {
    pub const fn all() -> &'static [AspectKind] {
        &[
            AspectKind::Conjunction,
            AspectKind::Opposition,
            AspectKind::Trine,
            AspectKind::Square,
            AspectKind::Sextile,
        ]
    }

    /// Exact angle in degrees.
    pub fn angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Opposition => 180.0,
        }
    }

    /// Maximum allowed deviation from the exact angle.
    pub fn orb(self) -> f64 {
        match self {
            AspectKind::Sextile => 6.0,
            _ => 8.0,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "☌",
            AspectKind::Opposition => "☍",
            AspectKind::Trine => "△",
            AspectKind::Square => "□",
            AspectKind::Sextile => "⚹",
        }
    }

    /// Squares and oppositions are drawn as tension lines.
    pub fn is_hard(self) -> bool {
        matches!(self, AspectKind::Square | AspectKind::Opposition)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Sextile => "sextile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Opposition => "opposition",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_both_directions() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-30.0), 330.0);
        assert_eq!(normalize_degrees(-1e-18), 0.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn signed_delta_takes_the_short_way() {
        assert!((signed_delta(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((signed_delta(10.0, 350.0) + 20.0).abs() < 1e-9);
        assert!((separation(0.0, 180.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn sign_from_longitude_boundaries() {
        assert_eq!(Sign::from_longitude(0.0), Sign::Aries);
        assert_eq!(Sign::from_longitude(29.999), Sign::Aries);
        assert_eq!(Sign::from_longitude(30.0), Sign::Taurus);
        assert_eq!(Sign::from_longitude(359.9), Sign::Pisces);
        assert_eq!(Sign::from_longitude(-10.0), Sign::Pisces);
    }

    #[test]
    fn elements_cycle_every_four_signs() {
        assert_eq!(Sign::Aries.element(), Element::Fire);
        assert_eq!(Sign::Taurus.element(), Element::Earth);
        assert_eq!(Sign::Gemini.element(), Element::Air);
        assert_eq!(Sign::Cancer.element(), Element::Water);
        assert_eq!(Sign::Sagittarius.element(), Element::Fire);
        assert_eq!(Sign::Pisces.element(), Element::Water);
    }

    #[test]
    fn luminaries_never_retrograde() {
        assert!(!Body::Sun.can_retrograde());
        assert!(!Body::Moon.can_retrograde());
        assert!(Body::Mercury.can_retrograde());
    }
}

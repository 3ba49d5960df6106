use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::houses::HouseSystem;
use crate::zodiac::{AspectKind, Body, Sign};

/// Raw birth data, as handed to [`crate::ChartEngine::build_subject`].
#[derive(Debug, Clone)]
pub struct BirthData {
    pub name: String,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA zone name, e.g. "America/Sao_Paulo".
    pub timezone: String,
    /// Resolve place and zone through a network lookup instead of the fields above.
    pub online: bool,
}

/// A validated birth moment and place.
#[derive(Debug, Clone, Serialize)]
pub struct Subject {
    pub name: String,
    pub local: NaiveDateTime,
    pub timezone: Tz,
    pub utc: DateTime<Utc>,
    pub julian_day: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyPosition {
    pub body: Body,
    /// Geocentric ecliptic longitude, `[0, 360)`.
    pub longitude: f64,
    pub latitude: f64,
    /// Degrees per day.
    pub speed: f64,
    pub retrograde: bool,
    pub sign: Sign,
    pub degree_in_sign: f64,
    pub house: u8,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Angles {
    pub ascendant: f64,
    pub midheaven: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HouseCusp {
    pub number: u8,
    pub longitude: f64,
    pub sign: Sign,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Aspect {
    pub first: Body,
    pub second: Body,
    pub kind: AspectKind,
    /// Actual angular separation, `[0, 180]`.
    pub separation: f64,
    /// Distance from exact.
    pub orb: f64,
}

/// Everything needed to draw a natal chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub subject: Subject,
    pub house_system: HouseSystem,
    pub bodies: Vec<BodyPosition>,
    pub angles: Angles,
    pub houses: Vec<HouseCusp>,
    pub aspects: Vec<Aspect>,
}

impl ChartData {
    pub fn body(&self, body: Body) -> Option<&BodyPosition> {
        self.bodies.iter().find(|p| p.body == body)
    }

    pub fn sun_sign(&self) -> Option<Sign> {
        self.body(Body::Sun).map(|p| p.sign)
    }
}

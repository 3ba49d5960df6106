use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

use crate::error::{ChartError, Result};
use crate::time::{J2000, centuries_since_j2000};
use crate::zodiac::{normalize_degrees, separation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HouseSystem {
    #[default]
    Placidus,
    Porphyry,
    Equal,
    WholeSign,
}

impl HouseSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            HouseSystem::Placidus => "placidus",
            HouseSystem::Porphyry => "porphyry",
            HouseSystem::Equal => "equal",
            HouseSystem::WholeSign => "whole-sign",
        }
    }

    pub const fn all() -> &'static [HouseSystem] {
        &[
            HouseSystem::Placidus,
            HouseSystem::Porphyry,
            HouseSystem::Equal,
            HouseSystem::WholeSign,
        ]
    }
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HouseSystem {
    type Error = ChartError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        HouseSystem::all()
            .iter()
            .copied()
            .find(|system| system.as_str() == lower)
            .ok_or_else(|| ChartError::UnknownOption {
                kind: "house system",
                value: value.to_string(),
                supported: "placidus, porphyry, equal, whole-sign".to_string(),
            })
    }
}

/// The chart's angles and twelve cusps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseFrame {
    /// System actually used; differs from the requested one after a polar fallback.
    pub system: HouseSystem,
    pub ascendant: f64,
    pub midheaven: f64,
    /// Local sidereal time in degrees.
    pub ramc: f64,
    pub obliquity: f64,
    pub cusps: [f64; 12],
}

impl HouseFrame {
    /// House (1..=12) containing `longitude`.
    pub fn house_of(&self, longitude: f64) -> u8 {
        for (i, &start) in self.cusps.iter().enumerate() {
            let end = self.cusps[(i + 1) % 12];
            let span = normalize_degrees(end - start);
            let offset = normalize_degrees(longitude - start);
            if offset < span {
                return i as u8 + 1;
            }
        }
        1
    }
}

fn sind(x: f64) -> f64 {
    x.to_radians().sin()
}

fn cosd(x: f64) -> f64 {
    x.to_radians().cos()
}

fn tand(x: f64) -> f64 {
    x.to_radians().tan()
}

fn atan2d(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

/// Mean obliquity of the ecliptic (degrees).
pub fn mean_obliquity(jd: f64) -> f64 {
    let t = centuries_since_j2000(jd);
    23.439_291_111 - (46.8150 * t + 0.00059 * t * t - 0.001813 * t * t * t) / 3600.0
}

/// Greenwich mean sidereal time in degrees (IAU 1982).
pub fn greenwich_sidereal_time(jd: f64) -> f64 {
    let t = centuries_since_j2000(jd);
    normalize_degrees(
        280.460_618_37 + 360.985_647_366_29 * (jd - J2000) + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

/// Ecliptic longitude of the point with right ascension `ra`.
fn ecliptic_from_right_ascension(ra: f64, obliquity: f64) -> f64 {
    normalize_degrees(atan2d(sind(ra), cosd(ra) * cosd(obliquity)))
}

pub fn midheaven(ramc: f64, obliquity: f64) -> f64 {
    ecliptic_from_right_ascension(ramc, obliquity)
}

pub fn ascendant(ramc: f64, obliquity: f64, latitude: f64) -> f64 {
    normalize_degrees(atan2d(
        cosd(ramc),
        -(sind(ramc) * cosd(obliquity) + tand(latitude) * sind(obliquity)),
    ))
}

/// One Placidus cusp by semi-arc trisection.
///
/// `fraction` is the part of the diurnal (above the horizon) or nocturnal
/// (below) semi-arc separating the cusp from the meridian.
fn placidus_cusp(ramc: f64, obliquity: f64, latitude: f64, fraction: f64, above: bool) -> Option<f64> {
    let mut ra = if above {
        ramc + fraction * 90.0
    } else {
        ramc + 180.0 - fraction * 90.0
    };
    let mut lambda = ecliptic_from_right_ascension(ra, obliquity);

    for _ in 0..100 {
        let declination = (sind(obliquity) * sind(lambda)).asin().to_degrees();
        let x = tand(latitude) * tand(declination);
        if x.abs() >= 1.0 {
            return None;
        }
        let ascensional_difference = x.asin().to_degrees();

        ra = if above {
            ramc + fraction * (90.0 + ascensional_difference)
        } else {
            ramc + 180.0 - fraction * (90.0 - ascensional_difference)
        };

        let next = ecliptic_from_right_ascension(ra, obliquity);
        let converged = separation(next, lambda) < 1e-9;
        lambda = next;
        if converged {
            break;
        }
    }

    Some(lambda)
}

fn with_opposites(asc: f64, c2: f64, c3: f64, mc: f64, c11: f64, c12: f64) -> [f64; 12] {
    let first_half = [asc, c2, c3];
    let top = [mc, c11, c12];
    let mut cusps = [0.0; 12];
    for i in 0..3 {
        cusps[i] = normalize_degrees(first_half[i]);
        cusps[i + 6] = normalize_degrees(first_half[i] + 180.0);
        cusps[i + 9] = normalize_degrees(top[i]);
        cusps[i + 3] = normalize_degrees(top[i] + 180.0);
    }
    cusps
}

fn porphyry_cusps(asc: f64, mc: f64) -> [f64; 12] {
    let ic = mc + 180.0;
    let lower = normalize_degrees(ic - asc) / 3.0;
    let upper = normalize_degrees(asc - mc) / 3.0;
    with_opposites(asc, asc + lower, asc + 2.0 * lower, mc, mc + upper, mc + 2.0 * upper)
}

fn placidus_cusps(ramc: f64, obliquity: f64, latitude: f64, asc: f64, mc: f64) -> Option<[f64; 12]> {
    let c11 = placidus_cusp(ramc, obliquity, latitude, 1.0 / 3.0, true)?;
    let c12 = placidus_cusp(ramc, obliquity, latitude, 2.0 / 3.0, true)?;
    let c2 = placidus_cusp(ramc, obliquity, latitude, 2.0 / 3.0, false)?;
    let c3 = placidus_cusp(ramc, obliquity, latitude, 1.0 / 3.0, false)?;
    Some(with_opposites(asc, c2, c3, mc, c11, c12))
}

fn equal_from(start: f64) -> [f64; 12] {
    let mut cusps = [0.0; 12];
    for (i, cusp) in cusps.iter_mut().enumerate() {
        *cusp = normalize_degrees(start + 30.0 * i as f64);
    }
    cusps
}

/// Angles and cusps for an observer at `latitude`/`longitude` (east positive).
pub fn compute(system: HouseSystem, jd: f64, latitude: f64, longitude: f64) -> Result<HouseFrame> {
    let obliquity = mean_obliquity(jd);
    let ramc = normalize_degrees(greenwich_sidereal_time(jd) + longitude);
    let asc = ascendant(ramc, obliquity, latitude);
    let mc = midheaven(ramc, obliquity);

    let (used, cusps) = match system {
        HouseSystem::Placidus => {
            let polar = latitude.abs() >= 90.0 - obliquity;
            match (!polar).then(|| placidus_cusps(ramc, obliquity, latitude, asc, mc)).flatten() {
                Some(cusps) => (HouseSystem::Placidus, cusps),
                None => {
                    tracing::debug!(latitude, "placidus undefined, falling back to porphyry");
                    (HouseSystem::Porphyry, porphyry_cusps(asc, mc))
                }
            }
        }
        HouseSystem::Porphyry => (HouseSystem::Porphyry, porphyry_cusps(asc, mc)),
        HouseSystem::Equal => (HouseSystem::Equal, equal_from(asc)),
        HouseSystem::WholeSign => (HouseSystem::WholeSign, equal_from((asc / 30.0).floor() * 30.0)),
    };

    if cusps.iter().any(|c| !c.is_finite()) {
        return Err(ChartError::PolarLatitude {
            system: used.as_str(),
            latitude,
        });
    }

    Ok(HouseFrame {
        system: used,
        ascendant: asc,
        midheaven: mc,
        ramc,
        obliquity,
        cusps,
    })
}

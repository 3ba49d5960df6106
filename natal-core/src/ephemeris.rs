//! Low-precision geocentric positions from mean orbital elements.
//!
//! Elements are referred to the mean equinox of date and are good to a few
//! arc-minutes for the Sun, Moon and inner planets between 1900 and 2100.
//! The outer planets carry the usual Jupiter/Saturn/Uranus perturbations;
//! Pluto uses a periodic series in place of elements.

use serde::Serialize;

use crate::time::elements_day;
use crate::zodiac::{Body, normalize_degrees, signed_delta};

/// Ecliptic coordinates in degrees; distance in AU (Earth radii for the Moon).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EclipticPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub distance: f64,
}

/// Position plus apparent daily motion in longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyState {
    pub position: EclipticPosition,
    /// Degrees per day, negative when retrograde.
    pub speed: f64,
}

#[derive(Debug, Clone, Copy)]
struct OrbitalElements {
    /// Longitude of the ascending node.
    node: f64,
    inclination: f64,
    /// Argument of perihelion.
    perihelion: f64,
    semi_major_axis: f64,
    eccentricity: f64,
    mean_anomaly: f64,
}

fn sind(x: f64) -> f64 {
    x.to_radians().sin()
}

fn cosd(x: f64) -> f64 {
    x.to_radians().cos()
}

fn atan2d(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

/// Bodies that follow a Keplerian orbit with slowly varying elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orbit {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Orbit {
    /// Pluto has no useful Keplerian fit; see `pluto_heliocentric`.
    fn of(body: Body) -> Option<Orbit> {
        match body {
            Body::Sun => Some(Orbit::Sun),
            Body::Moon => Some(Orbit::Moon),
            Body::Mercury => Some(Orbit::Mercury),
            Body::Venus => Some(Orbit::Venus),
            Body::Mars => Some(Orbit::Mars),
            Body::Jupiter => Some(Orbit::Jupiter),
            Body::Saturn => Some(Orbit::Saturn),
            Body::Uranus => Some(Orbit::Uranus),
            Body::Neptune => Some(Orbit::Neptune),
            Body::Pluto => None,
        }
    }
}

fn elements(orbit: Orbit, d: f64) -> OrbitalElements {
    let (node, inclination, perihelion, semi_major_axis, eccentricity, mean_anomaly) = match orbit {
        Orbit::Sun => (
            0.0,
            0.0,
            282.9404 + 4.70935e-5 * d,
            1.0,
            0.016709 - 1.151e-9 * d,
            356.0470 + 0.985_600_258_5 * d,
        ),
        Orbit::Moon => (
            125.1228 - 0.052_953_808_3 * d,
            5.1454,
            318.0634 + 0.164_357_322_3 * d,
            60.2666,
            0.054900,
            115.3654 + 13.064_992_950_9 * d,
        ),
        Orbit::Mercury => (
            48.3313 + 3.24587e-5 * d,
            7.0047 + 5.00e-8 * d,
            29.1241 + 1.01444e-5 * d,
            0.387098,
            0.205635 + 5.59e-10 * d,
            168.6562 + 4.092_334_436_8 * d,
        ),
        Orbit::Venus => (
            76.6799 + 2.46590e-5 * d,
            3.3946 + 2.75e-8 * d,
            54.8910 + 1.38374e-5 * d,
            0.723330,
            0.006773 - 1.302e-9 * d,
            48.0052 + 1.602_130_224_4 * d,
        ),
        Orbit::Mars => (
            49.5574 + 2.11081e-5 * d,
            1.8497 - 1.78e-8 * d,
            286.5016 + 2.92961e-5 * d,
            1.523688,
            0.093405 + 2.516e-9 * d,
            18.6021 + 0.524_020_776_6 * d,
        ),
        Orbit::Jupiter => (
            100.4542 + 2.76854e-5 * d,
            1.3030 - 1.557e-7 * d,
            273.8777 + 1.64505e-5 * d,
            5.20256,
            0.048498 + 4.469e-9 * d,
            19.8950 + 0.083_085_300_1 * d,
        ),
        Orbit::Saturn => (
            113.6634 + 2.38980e-5 * d,
            2.4886 - 1.081e-7 * d,
            339.3939 + 2.97661e-5 * d,
            9.55475,
            0.055546 - 9.499e-9 * d,
            316.9670 + 0.033_444_228_2 * d,
        ),
        Orbit::Uranus => (
            74.0005 + 1.3978e-5 * d,
            0.7733 + 1.9e-8 * d,
            96.6612 + 3.0565e-5 * d,
            19.18171 - 1.55e-8 * d,
            0.047318 + 7.45e-9 * d,
            142.5905 + 0.011_725_806 * d,
        ),
        Orbit::Neptune => (
            131.7806 + 3.0173e-5 * d,
            1.7700 - 2.55e-7 * d,
            272.8461 - 6.027e-6 * d,
            30.05826 + 3.313e-8 * d,
            0.008606 + 2.15e-9 * d,
            260.2471 + 0.005_995_147 * d,
        ),
    };

    OrbitalElements {
        node,
        inclination,
        perihelion,
        semi_major_axis,
        eccentricity,
        mean_anomaly: normalize_degrees(mean_anomaly),
    }
}

/// Solve Kepler's equation by Newton iteration; angles in degrees.
fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> f64 {
    let m = mean_anomaly.to_radians();
    let mut ecc = m + e * m.sin() * (1.0 + e * m.cos());
    for _ in 0..30 {
        let delta = (ecc - e * ecc.sin() - m) / (1.0 - e * ecc.cos());
        ecc -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ecc.to_degrees()
}

/// Position in the frame the elements are referred to: heliocentric for
/// planets, geocentric for the Sun's apparent orbit and the Moon.
fn orbital_position(el: &OrbitalElements) -> EclipticPosition {
    let ecc = eccentric_anomaly(el.mean_anomaly, el.eccentricity);
    let xv = el.semi_major_axis * (cosd(ecc) - el.eccentricity);
    let yv = el.semi_major_axis * (1.0 - el.eccentricity * el.eccentricity).sqrt() * sind(ecc);

    let true_anomaly = atan2d(yv, xv);
    let r = xv.hypot(yv);
    let arg = true_anomaly + el.perihelion;

    let xh = r * (cosd(el.node) * cosd(arg) - sind(el.node) * sind(arg) * cosd(el.inclination));
    let yh = r * (sind(el.node) * cosd(arg) + cosd(el.node) * sind(arg) * cosd(el.inclination));
    let zh = r * sind(arg) * sind(el.inclination);

    EclipticPosition {
        longitude: normalize_degrees(atan2d(yh, xh)),
        latitude: atan2d(zh, xh.hypot(yh)),
        distance: r,
    }
}

fn sun_position(d: f64) -> EclipticPosition {
    orbital_position(&elements(Orbit::Sun, d))
}

fn moon_position(d: f64) -> EclipticPosition {
    let sun = elements(Orbit::Sun, d);
    let moon = elements(Orbit::Moon, d);
    let base = orbital_position(&moon);

    let ms = sun.mean_anomaly;
    let mm = moon.mean_anomaly;
    let ls = sun.mean_anomaly + sun.perihelion;
    let lm = moon.mean_anomaly + moon.perihelion + moon.node;
    let elong = lm - ls;
    let f = lm - moon.node;

    let dlon = -1.274 * sind(mm - 2.0 * elong) // evection
        + 0.658 * sind(2.0 * elong) // variation
        - 0.186 * sind(ms) // yearly equation
        - 0.059 * sind(2.0 * mm - 2.0 * elong)
        - 0.057 * sind(mm - 2.0 * elong + ms)
        + 0.053 * sind(mm + 2.0 * elong)
        + 0.046 * sind(2.0 * elong - ms)
        + 0.041 * sind(mm - ms)
        - 0.035 * sind(elong) // parallactic equation
        - 0.031 * sind(mm + ms)
        - 0.015 * sind(2.0 * f - 2.0 * elong)
        + 0.011 * sind(mm - 4.0 * elong);

    let dlat = -0.173 * sind(f - 2.0 * elong)
        - 0.055 * sind(mm - f - 2.0 * elong)
        - 0.046 * sind(mm + f - 2.0 * elong)
        + 0.033 * sind(f + 2.0 * elong)
        + 0.017 * sind(2.0 * mm + f);

    let ddist = -0.58 * cosd(mm - 2.0 * elong) - 0.46 * cosd(2.0 * elong);

    EclipticPosition {
        longitude: normalize_degrees(base.longitude + dlon),
        latitude: base.latitude + dlat,
        distance: base.distance + ddist,
    }
}

/// Mutual perturbations of the gas giants, in degrees of longitude/latitude.
fn giant_perturbations(orbit: Orbit, d: f64) -> (f64, f64) {
    let mj = elements(Orbit::Jupiter, d).mean_anomaly;
    let ms = elements(Orbit::Saturn, d).mean_anomaly;
    let mu = elements(Orbit::Uranus, d).mean_anomaly;

    match orbit {
        Orbit::Jupiter => (
            -0.332 * sind(2.0 * mj - 5.0 * ms - 67.6)
                - 0.056 * sind(2.0 * mj - 2.0 * ms + 21.0)
                + 0.042 * sind(3.0 * mj - 5.0 * ms + 21.0)
                - 0.036 * sind(mj - 2.0 * ms)
                + 0.022 * cosd(mj - ms)
                + 0.023 * sind(2.0 * mj - 3.0 * ms + 52.0)
                - 0.016 * sind(mj - 5.0 * ms - 69.0),
            0.0,
        ),
        Orbit::Saturn => (
            0.812 * sind(2.0 * mj - 5.0 * ms - 67.6) - 0.229 * cosd(2.0 * mj - 4.0 * ms - 2.0)
                + 0.119 * sind(mj - 2.0 * ms - 3.0)
                + 0.046 * sind(2.0 * mj - 6.0 * ms - 69.0)
                + 0.014 * sind(mj - 3.0 * ms + 32.0),
            -0.020 * cosd(2.0 * mj - 4.0 * ms - 2.0) + 0.018 * sind(2.0 * mj - 6.0 * ms - 49.0),
        ),
        Orbit::Uranus => (
            0.040 * sind(ms - 2.0 * mu + 6.0) + 0.035 * sind(ms - 3.0 * mu + 33.0)
                - 0.015 * sind(mj - mu + 20.0),
            0.0,
        ),
        _ => (0.0, 0.0),
    }
}

fn pluto_heliocentric(d: f64) -> EclipticPosition {
    let s = 50.03 + 0.033_459_652 * d;
    let p = 238.95 + 0.003_968_789 * d;

    let longitude = 238.9508 + 0.004_007_03 * d - 19.799 * sind(p) + 19.848 * cosd(p)
        + 0.897 * sind(2.0 * p)
        - 4.956 * cosd(2.0 * p)
        + 0.610 * sind(3.0 * p)
        + 1.211 * cosd(3.0 * p)
        - 0.341 * sind(4.0 * p)
        - 0.190 * cosd(4.0 * p)
        + 0.128 * sind(5.0 * p)
        - 0.034 * cosd(5.0 * p)
        - 0.038 * sind(6.0 * p)
        + 0.031 * cosd(6.0 * p)
        + 0.020 * sind(s - p)
        - 0.010 * cosd(s - p);

    let latitude = -3.9082 - 5.453 * sind(p) - 14.975 * cosd(p) + 3.527 * sind(2.0 * p)
        + 1.673 * cosd(2.0 * p)
        - 1.051 * sind(3.0 * p)
        + 0.328 * cosd(3.0 * p)
        + 0.179 * sind(4.0 * p)
        - 0.292 * cosd(4.0 * p)
        + 0.019 * sind(5.0 * p)
        + 0.100 * cosd(5.0 * p)
        - 0.031 * sind(6.0 * p)
        - 0.026 * cosd(6.0 * p)
        + 0.011 * cosd(s - p);

    let distance = 40.72 + 6.68 * sind(p) + 6.90 * cosd(p) - 1.18 * sind(2.0 * p)
        - 0.03 * cosd(2.0 * p)
        + 0.15 * sind(3.0 * p)
        - 0.14 * cosd(3.0 * p);

    EclipticPosition {
        longitude: normalize_degrees(longitude),
        latitude,
        distance,
    }
}

fn heliocentric(body: Body, d: f64) -> EclipticPosition {
    let Some(orbit) = Orbit::of(body) else {
        return pluto_heliocentric(d);
    };

    let mut pos = orbital_position(&elements(orbit, d));
    let (dlon, dlat) = giant_perturbations(orbit, d);
    pos.longitude = normalize_degrees(pos.longitude + dlon);
    pos.latitude += dlat;
    pos
}

/// Geocentric ecliptic position at `d` days past the elements epoch.
fn geocentric_at(body: Body, d: f64) -> EclipticPosition {
    match body {
        Body::Sun => sun_position(d),
        Body::Moon => moon_position(d),
        _ => {
            let sun = sun_position(d);
            let helio = heliocentric(body, d);

            let xs = sun.distance * cosd(sun.longitude);
            let ys = sun.distance * sind(sun.longitude);

            let xh = helio.distance * cosd(helio.longitude) * cosd(helio.latitude);
            let yh = helio.distance * sind(helio.longitude) * cosd(helio.latitude);
            let zh = helio.distance * sind(helio.latitude);

            let (xg, yg, zg) = (xh + xs, yh + ys, zh);

            EclipticPosition {
                longitude: normalize_degrees(atan2d(yg, xg)),
                latitude: atan2d(zg, xg.hypot(yg)),
                distance: (xg * xg + yg * yg + zg * zg).sqrt(),
            }
        }
    }
}

/// Geocentric position of `body` at Julian day `jd`.
pub fn geocentric(body: Body, jd: f64) -> EclipticPosition {
    geocentric_at(body, elements_day(jd))
}

/// Position and daily motion, the latter from a one-day central difference.
pub fn body_state(body: Body, jd: f64) -> BodyState {
    let d = elements_day(jd);
    let before = geocentric_at(body, d - 0.5);
    let after = geocentric_at(body, d + 0.5);

    BodyState {
        position: geocentric_at(body, d),
        speed: signed_delta(before.longitude, after.longitude),
    }
}

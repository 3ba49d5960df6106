use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ChartError, Result};

/// Julian day of the Unix epoch.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian day of J2000.0 (2000-01-01 12:00 TT).
pub const J2000: f64 = 2_451_545.0;

/// Julian day of 1999-12-31 00:00 UT, the zero point of the orbital elements.
const ELEMENTS_EPOCH_JD: f64 = 2_451_543.5;

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ChartError::UnknownTimezone(name.to_string()))
}

/// Resolve a wall-clock time in `tz` to UT.
///
/// During a DST fall-back the earlier of the two instants wins; a time
/// skipped by a DST jump is an error, as is one whose UT instant chrono
/// cannot represent.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    let describe = || (local.format("%Y-%m-%d %H:%M").to_string(), tz.name().to_string());

    if let LocalResult::None = tz.offset_from_local_datetime(&local) {
        let (local, timezone) = describe();
        return Err(ChartError::NonexistentLocalTime { local, timezone });
    }

    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, latest) => {
            tracing::debug!(%local, %earliest, %latest, "ambiguous local time, using earliest");
            Ok(earliest.with_timezone(&Utc))
        }
        // an offset exists, so only the shift to UT can have failed
        LocalResult::None => {
            let (local, timezone) = describe();
            Err(ChartError::LocalTimeOutOfRange { local, timezone })
        }
    }
}

pub fn julian_day(utc: DateTime<Utc>) -> f64 {
    let seconds = utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) * 1e-9;
    seconds / 86_400.0 + UNIX_EPOCH_JD
}

/// Days since 1999-12-31 00:00 UT.
pub fn elements_day(jd: f64) -> f64 {
    jd - ELEMENTS_EPOCH_JD
}

/// Julian centuries since J2000.0.
pub fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000) / 36_525.0
}

use chrono::NaiveDate;
use std::fmt::Debug;

use crate::aspects::find_aspects;
use crate::config::Config;
use crate::ephemeris::body_state;
use crate::error::{ChartError, Result};
use crate::houses::{self, HouseSystem};
use crate::i18n::Language;
use crate::model::{Angles, BirthData, BodyPosition, ChartData, HouseCusp, Subject};
use crate::render::render_chart;
use crate::theme::Theme;
use crate::time::{julian_day, local_to_utc, parse_timezone};
use crate::zodiac::{Body, Sign};

/// The three-step charting pipeline: subject, chart data, SVG.
pub trait ChartEngine: Debug {
    fn build_subject(&self, birth: BirthData) -> Result<Subject>;

    fn derive_natal_chart_data(&self, subject: &Subject) -> Result<ChartData>;

    fn render_svg(&self, chart: &ChartData, theme: Theme, language: Language) -> Result<String>;
}

/// Offline engine: everything is computed locally from the supplied
/// coordinates and timezone.
#[derive(Debug, Clone, Default)]
pub struct LocalEngine {
    house_system: HouseSystem,
}

impl LocalEngine {
    pub fn new(house_system: HouseSystem) -> Self {
        Self { house_system }
    }

    pub fn house_system(&self) -> HouseSystem {
        self.house_system
    }
}

fn check_range(name: &'static str, value: f64, limit: f64) -> Result<()> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(ChartError::InvalidCoordinate {
            name,
            value,
            min: -limit,
            max: limit,
        })
    }
}

impl ChartEngine for LocalEngine {
    fn build_subject(&self, birth: BirthData) -> Result<Subject> {
        if birth.online {
            return Err(ChartError::OnlineUnsupported);
        }

        let invalid_date = || ChartError::InvalidDate {
            year: birth.year,
            month: birth.month,
            day: birth.day,
        };
        let month = u32::try_from(birth.month).map_err(|_| invalid_date())?;
        let day = u32::try_from(birth.day).map_err(|_| invalid_date())?;
        let date = NaiveDate::from_ymd_opt(birth.year, month, day).ok_or_else(invalid_date)?;

        let invalid_time = || ChartError::InvalidTime {
            hour: birth.hour,
            minute: birth.minute,
        };
        let hour = u32::try_from(birth.hour).map_err(|_| invalid_time())?;
        let minute = u32::try_from(birth.minute).map_err(|_| invalid_time())?;
        let local = date.and_hms_opt(hour, minute, 0).ok_or_else(invalid_time)?;

        check_range("latitude", birth.latitude, 90.0)?;
        check_range("longitude", birth.longitude, 180.0)?;

        let timezone = parse_timezone(&birth.timezone)?;
        let utc = local_to_utc(local, timezone)?;
        let jd = julian_day(utc);

        tracing::debug!(name = %birth.name, %local, %utc, jd, "built subject");

        Ok(Subject {
            name: birth.name,
            local,
            timezone,
            utc,
            julian_day: jd,
            latitude: birth.latitude,
            longitude: birth.longitude,
        })
    }

    fn derive_natal_chart_data(&self, subject: &Subject) -> Result<ChartData> {
        let frame = houses::compute(
            self.house_system,
            subject.julian_day,
            subject.latitude,
            subject.longitude,
        )?;

        let bodies: Vec<BodyPosition> = Body::all()
            .iter()
            .map(|&body| {
                let state = body_state(body, subject.julian_day);
                let longitude = state.position.longitude;
                let sign = Sign::from_longitude(longitude);
                BodyPosition {
                    body,
                    longitude,
                    latitude: state.position.latitude,
                    speed: state.speed,
                    retrograde: body.can_retrograde() && state.speed < 0.0,
                    sign,
                    degree_in_sign: longitude - sign.start(),
                    house: frame.house_of(longitude),
                }
            })
            .collect();

        let houses = frame
            .cusps
            .iter()
            .enumerate()
            .map(|(i, &longitude)| HouseCusp {
                number: i as u8 + 1,
                longitude,
                sign: Sign::from_longitude(longitude),
            })
            .collect();

        let aspects = find_aspects(&bodies);

        tracing::debug!(
            system = %frame.system,
            ascendant = frame.ascendant,
            midheaven = frame.midheaven,
            aspects = aspects.len(),
            "derived natal chart"
        );

        Ok(ChartData {
            subject: subject.clone(),
            house_system: frame.system,
            bodies,
            angles: Angles {
                ascendant: frame.ascendant,
                midheaven: frame.midheaven,
            },
            houses,
            aspects,
        })
    }

    fn render_svg(&self, chart: &ChartData, theme: Theme, language: Language) -> Result<String> {
        Ok(render_chart(chart, theme, language)?)
    }
}

/// Construct the engine described by `config`.
pub fn engine_from_config(config: &Config) -> anyhow::Result<Box<dyn ChartEngine>> {
    let house_system = config.house_system()?;
    Ok(Box::new(LocalEngine::new(house_system)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birth(year: i32, month: i32, day: i32, hour: i32, minute: i32) -> BirthData {
        BirthData {
            name: "Test".to_string(),
            year,
            month,
            day,
            hour,
            minute,
            latitude: -23.55,
            longitude: -46.63,
            timezone: "America/Sao_Paulo".to_string(),
            online: false,
        }
    }

    fn reference_chart() -> ChartData {
        let engine = LocalEngine::default();
        let subject = engine.build_subject(birth(1990, 5, 15, 14, 30)).unwrap();
        engine.derive_natal_chart_data(&subject).unwrap()
    }

    #[test]
    fn subject_converts_brt_to_utc() {
        let subject = LocalEngine::default().build_subject(birth(1990, 5, 15, 14, 30)).unwrap();
        assert_eq!(subject.utc.to_rfc3339(), "1990-05-15T17:30:00+00:00");
        assert_eq!(subject.timezone.name(), "America/Sao_Paulo");
    }

    #[test]
    fn invalid_calendar_dates_are_rejected() {
        let engine = LocalEngine::default();
        for (y, m, d) in [(1990, 13, 1), (1990, 5, 40), (1990, 2, 30), (1990, 0, 1), (1990, -1, 1)] {
            let err = engine.build_subject(birth(y, m, d, 12, 0)).unwrap_err();
            assert!(matches!(err, ChartError::InvalidDate { .. }), "{y}-{m}-{d}: {err}");
        }
    }

    #[test]
    fn invalid_times_are_rejected() {
        let engine = LocalEngine::default();
        for (h, min) in [(24, 0), (-1, 0), (12, 60), (12, -5)] {
            let err = engine.build_subject(birth(1990, 5, 15, h, min)).unwrap_err();
            assert!(matches!(err, ChartError::InvalidTime { .. }), "{h}:{min}: {err}");
        }
    }

    #[test]
    fn coordinates_out_of_range_are_rejected() {
        let engine = LocalEngine::default();
        let mut data = birth(1990, 5, 15, 14, 30);
        data.latitude = 91.0;
        assert!(matches!(
            engine.build_subject(data).unwrap_err(),
            ChartError::InvalidCoordinate { name: "latitude", .. }
        ));

        let mut data = birth(1990, 5, 15, 14, 30);
        data.longitude = f64::NAN;
        assert!(matches!(
            engine.build_subject(data).unwrap_err(),
            ChartError::InvalidCoordinate { name: "longitude", .. }
        ));
    }

    #[test]
    fn online_mode_is_refused() {
        let mut data = birth(1990, 5, 15, 14, 30);
        data.online = true;
        let err = LocalEngine::default().build_subject(data).unwrap_err();
        assert!(matches!(err, ChartError::OnlineUnsupported));
    }

    #[test]
    fn chart_has_all_bodies_and_twelve_houses() {
        let chart = reference_chart();
        assert_eq!(chart.bodies.len(), Body::all().len());
        assert_eq!(chart.houses.len(), 12);
        assert_eq!(chart.house_system, HouseSystem::Placidus);
        for (i, cusp) in chart.houses.iter().enumerate() {
            assert_eq!(cusp.number as usize, i + 1);
            assert!((0.0..360.0).contains(&cusp.longitude));
        }
        for body in &chart.bodies {
            assert!((1..=12).contains(&body.house));
            assert!((0.0..30.0).contains(&body.degree_in_sign));
        }
    }

    #[test]
    fn reference_chart_has_taurus_sun() {
        let chart = reference_chart();
        assert_eq!(chart.sun_sign(), Some(Sign::Taurus));
        let sun = chart.body(Body::Sun).unwrap();
        assert!(!sun.retrograde);
        assert!(sun.degree_in_sign > 24.0 && sun.degree_in_sign < 25.2);
    }

    #[test]
    fn chart_serializes_to_json() {
        let chart = reference_chart();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["bodies"][0]["body"], "Sun");
        assert_eq!(json["house_system"], "placidus");
        assert_eq!(json["subject"]["timezone"], "America/Sao_Paulo");
        assert_eq!(json["houses"].as_array().map(Vec::len), Some(12));
    }

    #[test]
    fn engine_from_default_config_uses_placidus() {
        let engine = engine_from_config(&Config::default()).unwrap();
        let subject = engine.build_subject(birth(1990, 5, 15, 14, 30)).unwrap();
        let chart = engine.derive_natal_chart_data(&subject).unwrap();
        assert_eq!(chart.house_system, HouseSystem::Placidus);
    }

    #[test]
    fn rendering_is_deterministic_and_localized() {
        let engine = LocalEngine::default();
        let chart = reference_chart();
        let first = engine.render_svg(&chart, Theme::Dark, Language::Pt).unwrap();
        let second = engine.render_svg(&chart, Theme::Dark, Language::Pt).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("<?xml"));
        assert!(first.trim_end().ends_with("</svg>"));
        assert!(first.contains("Touro"));
        assert!(first.contains("Ascendente"));
        assert!(first.contains("#0B1026"));

        let english = engine.render_svg(&chart, Theme::Light, Language::En).unwrap();
        assert!(english.contains("Taurus"));
        assert!(english.contains("theme-light"));
    }

    #[test]
    fn panel_lists_the_tightest_aspect_by_name() {
        let engine = LocalEngine::default();
        let chart = reference_chart();
        let tightest = chart
            .aspects
            .iter()
            .min_by(|a, b| a.orb.total_cmp(&b.orb))
            .expect("reference chart has aspects");
        let labels = Language::Pt.labels();
        let caption = format!(
            "{} {} {}",
            labels.body(tightest.first),
            labels.aspect(tightest.kind),
            labels.body(tightest.second)
        );

        let svg = engine.render_svg(&chart, Theme::Dark, Language::Pt).unwrap();
        assert!(svg.contains(&caption), "missing {caption}");
    }

    #[test]
    fn control_characters_in_names_are_replaced() {
        let engine = LocalEngine::default();
        let mut data = birth(1990, 5, 15, 14, 30);
        data.name = "a\u{1}b".to_string();
        let subject = engine.build_subject(data).unwrap();
        let chart = engine.derive_natal_chart_data(&subject).unwrap();
        let svg = engine.render_svg(&chart, Theme::Dark, Language::Pt).unwrap();
        assert!(!svg.contains('\u{1}'));
        assert!(svg.contains("a\u{fffd}b"));
    }

    #[test]
    fn rendered_names_are_escaped() {
        let engine = LocalEngine::default();
        let mut data = birth(1990, 5, 15, 14, 30);
        data.name = "<Ana & Bia>".to_string();
        let subject = engine.build_subject(data).unwrap();
        let chart = engine.derive_natal_chart_data(&subject).unwrap();
        let svg = engine.render_svg(&chart, Theme::Dark, Language::Pt).unwrap();
        assert!(svg.contains("&lt;Ana &amp; Bia&gt;"));
        assert!(!svg.contains("<Ana"));
    }
}

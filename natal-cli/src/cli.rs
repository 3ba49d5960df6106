use anyhow::Context;
use clap::Parser;
use natal_core::{BirthData, ChartEngine, Config, Language, Theme, engine_from_config};
use std::io::{self, Write};

/// Top-level CLI struct: nine positional arguments, no flags.
#[derive(Debug, Parser)]
#[command(
    name = "generate-chart",
    version,
    about = "Generate an astral chart SVG",
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Name shown on the chart.
    pub name: String,
    #[arg(value_parser = parse_int)]
    pub year: i32,
    #[arg(value_parser = parse_int)]
    pub month: i32,
    #[arg(value_parser = parse_int)]
    pub day: i32,
    /// Local hour, 0-23.
    #[arg(value_parser = parse_int)]
    pub hour: i32,
    #[arg(value_parser = parse_int)]
    pub minute: i32,
    /// Birth city. Accepted for compatibility; not used.
    pub city: String,
    /// Latitude in degrees, south negative.
    #[arg(value_parser = parse_float)]
    pub lat: f64,
    /// Longitude in degrees, west negative.
    #[arg(value_parser = parse_float)]
    pub lon: f64,
}

/// Strips surrounding whitespace and `_` separators placed between digits,
/// so ` 1_990` reads as `1990`.
fn normalize_number(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if *c != '_' {
            continue;
        }
        let between_digits = i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|next| next.is_ascii_digit());
        if !between_digits {
            return Err(format!("misplaced '_' in '{raw}'"));
        }
    }
    Ok(trimmed.replace('_', ""))
}

fn parse_int(raw: &str) -> Result<i32, String> {
    normalize_number(raw)?
        .parse()
        .map_err(|e| format!("'{raw}' is not an integer: {e}"))
}

fn parse_float(raw: &str) -> Result<f64, String> {
    normalize_number(raw)?
        .parse()
        .map_err(|e| format!("'{raw}' is not a number: {e}"))
}

/// Birth data as collected from the command line.
#[derive(Debug, Clone)]
pub struct BirthDataRequest {
    pub name: String,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

impl Cli {
    pub fn into_request(self, timezone: &str) -> BirthDataRequest {
        BirthDataRequest {
            name: self.name,
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            city: self.city,
            latitude: self.lat,
            longitude: self.lon,
            timezone: timezone.to_string(),
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let engine = engine_from_config(&config)?;
        let theme = config.theme()?;
        let language = config.language()?;

        let request = self.into_request(config.timezone());
        let svg = generate_chart(engine.as_ref(), request, theme, language)?;

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{svg}").context("Failed to write chart to stdout")?;
        stdout.flush().context("Failed to write chart to stdout")?;
        Ok(())
    }
}

/// Subject, chart data, SVG, in that order. The city is not forwarded.
pub fn generate_chart(
    engine: &dyn ChartEngine,
    request: BirthDataRequest,
    theme: Theme,
    language: Language,
) -> anyhow::Result<String> {
    let BirthDataRequest {
        name,
        year,
        month,
        day,
        hour,
        minute,
        city,
        latitude,
        longitude,
        timezone,
    } = request;
    tracing::trace!(%city, "city is not used for chart calculation");

    let subject = engine.build_subject(BirthData {
        name,
        year,
        month,
        day,
        hour,
        minute,
        latitude,
        longitude,
        timezone,
        online: false,
    })?;
    let chart = engine.derive_natal_chart_data(&subject)?;
    let svg = engine.render_svg(&chart, theme, language)?;

    tracing::debug!(bytes = svg.len(), "chart generated");
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use natal_core::{ChartData, ChartError, LocalEngine, Subject};
    use std::cell::RefCell;

    fn args(extra: &[&str]) -> Vec<String> {
        std::iter::once("generate-chart")
            .chain(extra.iter().copied())
            .map(String::from)
            .collect()
    }

    fn request() -> BirthDataRequest {
        Cli::try_parse_from(args(&[
            "Test", "1990", "5", "15", "14", "30", "Campinas", "-23.55", "-46.63",
        ]))
        .unwrap()
        .into_request("America/Sao_Paulo")
    }

    /// Records what the shim hands over, then delegates to the real engine.
    #[derive(Debug, Default)]
    struct Recording {
        inner: LocalEngine,
        calls: RefCell<Vec<&'static str>>,
        seen: RefCell<Option<BirthData>>,
    }

    impl ChartEngine for Recording {
        fn build_subject(&self, birth: BirthData) -> Result<Subject, ChartError> {
            self.calls.borrow_mut().push("build_subject");
            *self.seen.borrow_mut() = Some(birth.clone());
            self.inner.build_subject(birth)
        }

        fn derive_natal_chart_data(&self, subject: &Subject) -> Result<ChartData, ChartError> {
            self.calls.borrow_mut().push("derive_natal_chart_data");
            self.inner.derive_natal_chart_data(subject)
        }

        fn render_svg(
            &self,
            chart: &ChartData,
            theme: Theme,
            language: Language,
        ) -> Result<String, ChartError> {
            self.calls.borrow_mut().push("render_svg");
            self.inner.render_svg(chart, theme, language)
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nine_positionals_with_negative_coordinates() {
        let cli = Cli::try_parse_from(args(&[
            "Maria", "1985", "12", "1", "0", "5", "Rio", "-22.9", "-43.2",
        ]))
        .unwrap();
        assert_eq!(cli.name, "Maria");
        assert_eq!((cli.year, cli.month, cli.day), (1985, 12, 1));
        assert_eq!((cli.hour, cli.minute), (0, 5));
        assert_eq!(cli.city, "Rio");
        assert_eq!(cli.lat, -22.9);
        assert_eq!(cli.lon, -43.2);
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let err = Cli::try_parse_from(args(&[
            "Test", "1990", "abc", "15", "14", "30", "X", "-23.55", "-46.63",
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn numbers_allow_padding_and_digit_separators() {
        assert_eq!(parse_int(" 1_990 "), Ok(1990));
        assert_eq!(parse_int("+5"), Ok(5));
        assert_eq!(parse_float(" -23.55"), Ok(-23.55));
        assert_eq!(parse_float("1_000.5"), Ok(1000.5));
        assert!(parse_int("_1990").is_err());
        assert!(parse_int("19__90").is_err());
        assert!(parse_int("1990_").is_err());
        assert!(parse_int("abc").is_err());
        assert!(parse_float("").is_err());
    }

    #[test]
    fn rejects_missing_arguments() {
        let err = Cli::try_parse_from(args(&["Test", "1990", "5"])).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn pipeline_runs_in_order_offline_without_city() {
        let engine = Recording::default();
        let svg = generate_chart(&engine, request(), Theme::Dark, Language::Pt).unwrap();

        assert!(svg.starts_with("<?xml"));
        assert_eq!(
            *engine.calls.borrow(),
            ["build_subject", "derive_natal_chart_data", "render_svg"]
        );

        let seen = engine.seen.borrow().clone().unwrap();
        assert!(!seen.online);
        assert_eq!(seen.timezone, "America/Sao_Paulo");
        assert_eq!(seen.latitude, -23.55);
        assert!(!svg.contains("Campinas"));
    }

    #[test]
    fn library_errors_stop_the_pipeline() {
        let engine = Recording::default();
        let mut bad = request();
        bad.month = 13;
        bad.day = 40;

        let err = generate_chart(&engine, bad, Theme::Dark, Language::Pt).unwrap_err();
        assert!(err.to_string().contains("invalid date"));
        assert_eq!(*engine.calls.borrow(), ["build_subject"]);
    }
}

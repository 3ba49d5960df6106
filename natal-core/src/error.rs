use thiserror::Error;

/// Everything that can go wrong between raw birth data and a rendered chart.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: i32, day: i32 },

    #[error("invalid time {hour:02}:{minute:02}")]
    InvalidTime { hour: i32, minute: i32 },

    #[error("{name} {value} is out of range [{min}, {max}]")]
    InvalidCoordinate {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("'{0}' is not a valid IANA timezone (ex: 'America/Sao_Paulo')")]
    UnknownTimezone(String),

    #[error("local time {local} does not exist in timezone {timezone} (DST gap)")]
    NonexistentLocalTime { local: String, timezone: String },

    #[error("local time {local} in timezone {timezone} is outside the supported date range")]
    LocalTimeOutOfRange { local: String, timezone: String },

    #[error("online mode is not supported; supply coordinates and timezone")]
    OnlineUnsupported,

    #[error("house system {system} is undefined at latitude {latitude}")]
    PolarLatitude { system: &'static str, latitude: f64 },

    #[error("Unknown {kind} '{value}'. Supported values: {supported}.")]
    UnknownOption {
        kind: &'static str,
        value: String,
        supported: String,
    },

    #[error("failed to render chart")]
    Render(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, ChartError>;

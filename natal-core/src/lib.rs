//! Core library for the `generate-chart` CLI.
//!
//! This crate defines:
//! - The charting pipeline behind a narrow trait ([`ChartEngine`])
//! - Planetary positions, houses and aspects computed offline
//! - SVG rendering with themes and localized labels
//! - Optional persisted defaults
//!
//! It is used by `natal-cli`, but can also be reused by other binaries or services.

pub mod aspects;
pub mod config;
pub mod engine;
pub mod ephemeris;
pub mod error;
pub mod houses;
pub mod i18n;
pub mod model;
pub mod render;
pub mod theme;
pub mod time;
pub mod zodiac;

pub use config::{Config, DEFAULT_TIMEZONE};
pub use engine::{ChartEngine, LocalEngine, engine_from_config};
pub use error::ChartError;
pub use houses::HouseSystem;
pub use i18n::Language;
pub use model::{Angles, Aspect, BirthData, BodyPosition, ChartData, HouseCusp, Subject};
pub use theme::Theme;
pub use zodiac::{AspectKind, Body, Sign};

use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

use crate::error::ChartError;
use crate::zodiac::{AspectKind, Body, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub const fn all() -> &'static [Theme] {
        &[Theme::Light, Theme::Dark]
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: "#0B1026",
                foreground: "#E5E7EB",
                muted: "#6B7280",
                ring: "#151B3B",
                inner: "#0F1530",
                accent: "#FCD34D",
                fire: "#F97316",
                earth: "#4ADE80",
                air: "#FDE047",
                water: "#38BDF8",
                harmonious: "#38BDF8",
                tense: "#EF4444",
                conjunction: "#FCD34D",
            },
            Theme::Light => Palette {
                background: "#FFFFFF",
                foreground: "#1F2937",
                muted: "#9CA3AF",
                ring: "#F3F4F6",
                inner: "#FAFAFA",
                accent: "#B45309",
                fire: "#DC2626",
                earth: "#15803D",
                air: "#CA8A04",
                water: "#1D4ED8",
                harmonious: "#2563EB",
                tense: "#DC2626",
                conjunction: "#B45309",
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Theme {
    type Error = ChartError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ChartError::UnknownOption {
                kind: "theme",
                value: value.to_string(),
                supported: "light, dark".to_string(),
            }),
        }
    }
}

/// Colours for one theme, as SVG colour strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
    pub muted: &'static str,
    pub ring: &'static str,
    pub inner: &'static str,
    pub accent: &'static str,
    pub fire: &'static str,
    pub earth: &'static str,
    pub air: &'static str,
    pub water: &'static str,
    pub harmonious: &'static str,
    pub tense: &'static str,
    pub conjunction: &'static str,
}

impl Palette {
    pub fn element(&self, element: Element) -> &'static str {
        match element {
            Element::Fire => self.fire,
            Element::Earth => self.earth,
            Element::Air => self.air,
            Element::Water => self.water,
        }
    }

    pub fn aspect(&self, kind: AspectKind) -> &'static str {
        match kind {
            AspectKind::Conjunction => self.conjunction,
            k if k.is_hard() => self.tense,
            _ => self.harmonious,
        }
    }

    pub fn body(&self, body: Body) -> &'static str {
        match body {
            Body::Sun => self.accent,
            _ => self.foreground,
        }
    }
}

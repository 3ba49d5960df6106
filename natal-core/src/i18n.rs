//! Display languages for chart labels.

use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

use crate::error::ChartError;
use crate::houses::HouseSystem;
use crate::zodiac::{AspectKind, Body, Sign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    En,
    #[default]
    Pt,
    Es,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Pt => "PT",
            Language::Es => "ES",
        }
    }

    pub const fn all() -> &'static [Language] {
        &[Language::En, Language::Pt, Language::Es]
    }

    /// BCP 47 tag for the SVG `xml:lang` attribute.
    pub fn tag(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Pt => "pt-BR",
            Language::Es => "es",
        }
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Language::En => &EN,
            Language::Pt => &PT,
            Language::Es => &ES,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Language {
    type Error = ChartError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_uppercase().as_str() {
            "EN" => Ok(Language::En),
            "PT" => Ok(Language::Pt),
            "ES" => Ok(Language::Es),
            _ => Err(ChartError::UnknownOption {
                kind: "language",
                value: value.to_string(),
                supported: "EN, PT, ES".to_string(),
            }),
        }
    }
}

/// Label catalogue for one language.
#[derive(Debug)]
pub struct Labels {
    pub title: &'static str,
    pub ascendant: &'static str,
    pub midheaven: &'static str,
    pub planets: &'static str,
    pub houses: &'static str,
    pub aspects: &'static str,
    pub latitude: &'static str,
    pub longitude: &'static str,
    pub signs: [&'static str; 12],
    pub bodies: [&'static str; 10],
    /// Indexed like [`AspectKind::all`].
    pub aspect_kinds: [&'static str; 5],
    /// Indexed like [`HouseSystem::all`].
    pub house_systems: [&'static str; 4],
}

impl Labels {
    pub fn sign(&self, sign: Sign) -> &'static str {
        self.signs[sign.index()]
    }

    pub fn body(&self, body: Body) -> &'static str {
        let index = Body::all().iter().position(|b| *b == body).unwrap_or(0);
        self.bodies[index]
    }

    pub fn aspect(&self, kind: AspectKind) -> &'static str {
        let index = AspectKind::all().iter().position(|k| *k == kind).unwrap_or(0);
        self.aspect_kinds[index]
    }

    pub fn house_system(&self, system: HouseSystem) -> &'static str {
        let index = HouseSystem::all().iter().position(|s| *s == system).unwrap_or(0);
        self.house_systems[index]
    }
}

static EN: Labels = Labels {
    title: "Natal Chart",
    ascendant: "Ascendant",
    midheaven: "Midheaven",
    planets: "Planets",
    houses: "Houses",
    aspects: "Aspects",
    latitude: "Lat",
    longitude: "Lon",
    signs: [
        "Aries",
        "Taurus",
        "Gemini",
        "Cancer",
        "Leo",
        "Virgo",
        "Libra",
        "Scorpio",
        "Sagittarius",
        "Capricorn",
        "Aquarius",
        "Pisces",
    ],
    bodies: [
        "Sun", "Moon", "Mercury", "Venus", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune",
        "Pluto",
    ],
    aspect_kinds: ["Conjunction", "Opposition", "Trine", "Square", "Sextile"],
    house_systems: ["Placidus", "Porphyry", "Equal", "Whole Sign"],
};

static PT: Labels = Labels {
    title: "Mapa Natal",
    ascendant: "Ascendente",
    midheaven: "Meio do Céu",
    planets: "Planetas",
    houses: "Casas",
    aspects: "Aspectos",
    latitude: "Lat",
    longitude: "Lon",
    signs: [
        "Áries",
        "Touro",
        "Gêmeos",
        "Câncer",
        "Leão",
        "Virgem",
        "Libra",
        "Escorpião",
        "Sagitário",
        "Capricórnio",
        "Aquário",
        "Peixes",
    ],
    bodies: [
        "Sol", "Lua", "Mercúrio", "Vênus", "Marte", "Júpiter", "Saturno", "Urano", "Netuno",
        "Plutão",
    ],
    aspect_kinds: ["Conjunção", "Oposição", "Trígono", "Quadratura", "Sextil"],
    house_systems: ["Placidus", "Porfírio", "Igual", "Signos Inteiros"],
};

static ES: Labels = Labels {
    title: "Carta Natal",
    ascendant: "Ascendente",
    midheaven: "Medio Cielo",
    planets: "Planetas",
    houses: "Casas",
    aspects: "Aspectos",
    latitude: "Lat",
    longitude: "Lon",
    signs: [
        "Aries",
        "Tauro",
        "Géminis",
        "Cáncer",
        "Leo",
        "Virgo",
        "Libra",
        "Escorpio",
        "Sagitario",
        "Capricornio",
        "Acuario",
        "Piscis",
    ],
    bodies: [
        "Sol", "Luna", "Mercurio", "Venus", "Marte", "Júpiter", "Saturno", "Urano", "Neptuno",
        "Plutón",
    ],
    aspect_kinds: ["Conjunción", "Oposición", "Trígono", "Cuadratura", "Sextil"],
    house_systems: ["Placidus", "Porfirio", "Iguales", "Signos Enteros"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_roundtrip() {
        for lang in Language::all() {
            assert_eq!(Language::try_from(lang.as_str()).unwrap(), *lang);
        }
        assert_eq!(Language::try_from("pt").unwrap(), Language::Pt);
    }

    #[test]
    fn unknown_language_error() {
        let err = Language::try_from("FR").unwrap_err();
        assert!(err.to_string().contains("Supported values: EN, PT, ES"));
    }

    #[test]
    fn portuguese_labels() {
        let labels = Language::Pt.labels();
        assert_eq!(labels.sign(Sign::Taurus), "Touro");
        assert_eq!(labels.body(Body::Neptune), "Netuno");
        assert_eq!(labels.aspect(AspectKind::Square), "Quadratura");
        assert_eq!(labels.ascendant, "Ascendente");
    }

    #[test]
    fn catalogue_order_matches_enums() {
        let labels = Language::En.labels();
        for sign in Sign::all() {
            assert_eq!(labels.sign(*sign).to_lowercase(), sign.as_str());
        }
        for body in Body::all() {
            assert_eq!(labels.body(*body).to_lowercase(), body.as_str());
        }
        for kind in AspectKind::all() {
            assert_eq!(labels.aspect(*kind).to_lowercase(), kind.as_str());
        }
        assert_eq!(labels.house_system(HouseSystem::WholeSign), "Whole Sign");
    }
}

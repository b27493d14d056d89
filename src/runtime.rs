// Copyright (c) 2026 rezky_nightky

use std::str::FromStr;

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    #[value(name = "field")]
    Field,
    #[value(name = "rain")]
    Rain,
}

impl AnimationKind {
    pub fn next(self) -> Self {
        match self {
            AnimationKind::Field => AnimationKind::Rain,
            AnimationKind::Rain => AnimationKind::Field,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Green,
    Cyan,
    Amber,
    Purple,
    Red,
    Blue,
    Gray,
    Neon,
    Ocean,
    Fire,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 10] = [
        ColorScheme::Green,
        ColorScheme::Cyan,
        ColorScheme::Amber,
        ColorScheme::Purple,
        ColorScheme::Red,
        ColorScheme::Blue,
        ColorScheme::Gray,
        ColorScheme::Neon,
        ColorScheme::Ocean,
        ColorScheme::Fire,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::Green => "green",
            ColorScheme::Cyan => "cyan",
            ColorScheme::Amber => "amber",
            ColorScheme::Purple => "purple",
            ColorScheme::Red => "red",
            ColorScheme::Blue => "blue",
            ColorScheme::Gray => "gray",
            ColorScheme::Neon => "neon",
            ColorScheme::Ocean => "ocean",
            ColorScheme::Fire => "fire",
        }
    }
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" | "matrix" => Ok(ColorScheme::Green),
            "cyan" => Ok(ColorScheme::Cyan),
            "amber" | "gold" | "yellow" => Ok(ColorScheme::Amber),
            "purple" => Ok(ColorScheme::Purple),
            "red" => Ok(ColorScheme::Red),
            "blue" => Ok(ColorScheme::Blue),
            "gray" | "grey" => Ok(ColorScheme::Gray),
            "neon" | "synthwave" => Ok(ColorScheme::Neon),
            "ocean" | "deep-sea" | "deep_sea" | "deepsea" => Ok(ColorScheme::Ocean),
            "fire" | "inferno" => Ok(ColorScheme::Fire),
            _ => Err(format!("invalid color: {} (see --list-colors)", s)),
        }
    }
}

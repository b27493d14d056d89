// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::canvas::Rgb;
use crate::runtime::{ColorMode, ColorScheme};

#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    pub accents: Vec<Rgb>,
    pub dim: Rgb,
    pub body: Rgb,
    pub head: Rgb,
    pub background: Rgb,
}

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = (a.r as i32) - (b.r as i32);
    let dg = (a.g as i32) - (b.g as i32);
    let db = (a.b as i32) - (b.b as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(c: Rgb) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5) + 127) / 255;
    let (r6, g6, b6) = (level(c.r), level(c.g), level(c.b));
    let cube = Rgb::new(
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);

    let avg = ((c.r as u16 + c.g as u16 + c.b as u16) / 3) as u8;
    let (gray_idx, gray) = if avg < 8 {
        (16, Rgb::BLACK)
    } else if avg > 238 {
        (231, Rgb::WHITE)
    } else {
        let idx = 232 + ((avg - 8) / 10);
        let v = 8 + 10 * (idx - 232);
        (idx, Rgb::new(v, v, v))
    };

    if dist2(c, gray) < dist2(c, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(c: Rgb) -> Color {
    const TABLE: [(Color, Rgb); 16] = [
        (Color::Black, Rgb::new(0, 0, 0)),
        (Color::DarkGrey, Rgb::new(128, 128, 128)),
        (Color::Grey, Rgb::new(192, 192, 192)),
        (Color::White, Rgb::new(255, 255, 255)),
        (Color::DarkRed, Rgb::new(128, 0, 0)),
        (Color::Red, Rgb::new(255, 0, 0)),
        (Color::DarkGreen, Rgb::new(0, 128, 0)),
        (Color::Green, Rgb::new(0, 255, 0)),
        (Color::DarkBlue, Rgb::new(0, 0, 128)),
        (Color::Blue, Rgb::new(0, 0, 255)),
        (Color::DarkCyan, Rgb::new(0, 128, 128)),
        (Color::Cyan, Rgb::new(0, 255, 255)),
        (Color::DarkMagenta, Rgb::new(128, 0, 128)),
        (Color::Magenta, Rgb::new(255, 0, 255)),
        (Color::DarkYellow, Rgb::new(128, 128, 0)),
        (Color::Yellow, Rgb::new(255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, rgb)| dist2(c, *rgb))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

/// Quantize a composited color for the terminal. `None` means "leave the
/// terminal default", which is all mono mode ever emits.
pub fn term_color(c: Rgb, mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::Color16 => Some(rgb_to_color16(c)),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }),
    }
}

fn gradient_from_stops(stops: &[Rgb], steps: usize) -> Vec<Rgb> {
    if steps == 0 || stops.is_empty() {
        return Vec::new();
    }
    if stops.len() == 1 || steps == 1 {
        return vec![stops[0]; steps];
    }

    let segs = stops.len() - 1;
    (0..steps)
        .map(|i| {
            let pos = (i as f32) / ((steps - 1) as f32) * (segs as f32);
            let seg = (pos.floor() as usize).min(segs - 1);
            stops[seg].lerp(stops[seg + 1], pos - seg as f32)
        })
        .collect()
}

fn from_stops(stops: &[Rgb], head: Rgb, background: Rgb) -> Palette {
    let accents = gradient_from_stops(stops, 5);
    let dim = stops[0].lerp(background, 0.35);
    let body = stops[stops.len() / 2];
    Palette {
        accents,
        dim,
        body,
        head,
        background,
    }
}

pub fn build_palette(scheme: ColorScheme) -> Palette {
    let bg = Rgb::new(10, 10, 10);
    match scheme {
        ColorScheme::Green => from_stops(
            &[
                Rgb::new(0, 95, 0),
                Rgb::new(0, 175, 95),
                Rgb::new(0, 255, 65),
            ],
            Rgb::new(200, 255, 200),
            bg,
        ),
        ColorScheme::Cyan => from_stops(
            &[
                Rgb::new(0, 95, 135),
                Rgb::new(0, 175, 215),
                Rgb::new(135, 255, 255),
            ],
            Rgb::new(215, 255, 255),
            bg,
        ),
        ColorScheme::Amber => from_stops(
            &[
                Rgb::new(95, 60, 0),
                Rgb::new(215, 135, 0),
                Rgb::new(255, 215, 95),
            ],
            Rgb::new(255, 245, 215),
            bg,
        ),
        ColorScheme::Purple => from_stops(
            &[
                Rgb::new(60, 40, 120),
                Rgb::new(135, 95, 215),
                Rgb::new(215, 175, 255),
            ],
            Rgb::new(245, 225, 255),
            bg,
        ),
        ColorScheme::Red => from_stops(
            &[
                Rgb::new(95, 0, 0),
                Rgb::new(215, 0, 0),
                Rgb::new(255, 135, 135),
            ],
            Rgb::new(255, 215, 215),
            bg,
        ),
        ColorScheme::Blue => from_stops(
            &[
                Rgb::new(0, 0, 135),
                Rgb::new(0, 95, 255),
                Rgb::new(95, 175, 255),
            ],
            Rgb::new(215, 235, 255),
            bg,
        ),
        ColorScheme::Gray => from_stops(
            &[
                Rgb::new(78, 78, 78),
                Rgb::new(158, 158, 158),
                Rgb::new(228, 228, 228),
            ],
            Rgb::WHITE,
            bg,
        ),
        ColorScheme::Neon => from_stops(
            &[
                Rgb::new(95, 0, 215),
                Rgb::new(255, 0, 255),
                Rgb::new(0, 255, 255),
            ],
            Rgb::WHITE,
            Rgb::new(8, 0, 20),
        ),
        ColorScheme::Ocean => from_stops(
            &[
                Rgb::new(0, 40, 140),
                Rgb::new(0, 140, 255),
                Rgb::new(120, 255, 255),
            ],
            Rgb::new(240, 255, 255),
            Rgb::new(0, 8, 20),
        ),
        ColorScheme::Fire => from_stops(
            &[
                Rgb::new(135, 0, 0),
                Rgb::new(255, 95, 0),
                Rgb::new(255, 215, 0),
            ],
            Rgb::new(255, 255, 215),
            Rgb::new(20, 4, 0),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ansi256_maps_primaries_into_the_cube() {
        assert_eq!(rgb_to_ansi256(Rgb::new(255, 0, 0)), 196);
        assert_eq!(rgb_to_ansi256(Rgb::new(0, 255, 0)), 46);
        assert_eq!(rgb_to_ansi256(Rgb::BLACK), 16);
        assert_eq!(rgb_to_ansi256(Rgb::WHITE), 231);
    }

    #[test]
    fn ansi256_prefers_the_gray_ramp_for_grays() {
        assert_eq!(rgb_to_ansi256(Rgb::new(128, 128, 128)), 244);
    }

    #[test]
    fn color16_picks_nearest_entry() {
        assert_eq!(rgb_to_color16(Rgb::new(250, 10, 10)), Color::Red);
        assert_eq!(rgb_to_color16(Rgb::new(0, 120, 0)), Color::DarkGreen);
    }

    #[test]
    fn mono_leaves_terminal_default() {
        assert_eq!(term_color(Rgb::WHITE, ColorMode::Mono), None);
        assert_eq!(
            term_color(Rgb::new(1, 2, 3), ColorMode::TrueColor),
            Some(Color::Rgb { r: 1, g: 2, b: 3 })
        );
    }

    #[test]
    fn gradient_hits_both_endpoints() {
        let stops = [Rgb::BLACK, Rgb::WHITE];
        let g = gradient_from_stops(&stops, 3);
        assert_eq!(g, vec![Rgb::BLACK, Rgb::new(128, 128, 128), Rgb::WHITE]);
        assert!(gradient_from_stops(&stops, 0).is_empty());
    }

    #[test]
    fn every_scheme_has_five_accents() {
        for scheme in ColorScheme::ALL {
            let p = build_palette(scheme);
            assert_eq!(p.accents.len(), 5, "{:?}", scheme);
        }
    }
}

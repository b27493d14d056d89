// Copyright (c) 2026 rezky_nightky

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        Rgb::new(
            lerp_u8(self.r, other.r, t),
            lerp_u8(self.g, other.g, t),
            lerp_u8(self.b, other.b, t),
        )
    }

    pub fn from_hex(s: &str) -> Result<Rgb, String> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color: {} (expected #rrggbb)", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size::new(0.0, 0.0);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn intersects(&self, size: Size) -> bool {
        self.x + self.width >= 0.0
            && self.x <= size.width
            && self.y + self.height >= 0.0
            && self.y <= size.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub color: Rgb,
    pub alpha: f32,
    pub glow: f32,
}

impl TextStyle {
    pub fn new(color: Rgb, alpha: f32) -> Self {
        Self {
            color,
            alpha,
            glow: 0.0,
        }
    }

    pub fn with_glow(mut self, glow: f32) -> Self {
        self.glow = glow;
        self
    }
}

/// The 2D drawing context a host hands to the lifecycle manager.
///
/// Text is positioned by the top-left corner of its box. Alpha values are
/// composited over whatever the surface already holds.
pub trait Context2d {
    fn size(&self) -> Size;

    /// Reallocate the backing store to `size`. Contents are undefined
    /// afterwards; animations repaint fully every frame.
    fn resize_surface(&mut self, size: Size);

    fn clear(&mut self, color: Rgb);

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f32);

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb, alpha: f32);

    fn fill_text(&mut self, text: &str, at: Point, style: TextStyle);

    fn measure_text(&self, text: &str) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_accepts_leading_hash() {
        assert_eq!(Rgb::from_hex("#00ff41").unwrap(), Rgb::new(0, 255, 65));
        assert_eq!(Rgb::from_hex("0A0A0A").unwrap(), Rgb::new(10, 10, 10));
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#zz0000").is_err());
    }

    #[test]
    fn lerp_clamps_factor() {
        let a = Rgb::BLACK;
        let b = Rgb::WHITE;
        assert_eq!(a.lerp(b, 2.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
        assert_eq!(a.lerp(b, f32::NAN), a);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn zero_area_sizes_are_empty() {
        assert!(Size::ZERO.is_empty());
        assert!(Size::new(800.0, 0.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn rect_intersection_with_surface() {
        let s = Size::new(100.0, 50.0);
        assert!(Rect::new(-10.0, 10.0, 20.0, 5.0).intersects(s));
        assert!(!Rect::new(-30.0, 10.0, 20.0, 5.0).intersects(s));
        assert!(!Rect::new(10.0, 51.0, 20.0, 5.0).intersects(s));
    }
}

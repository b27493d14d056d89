// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    Rng, SeedableRng,
};
use serde::Deserialize;

use crate::canvas::{Context2d, Point, Rgb, Size, TextStyle};
use crate::charset::GlyphSet;
use crate::field::{finite_range, probability, proximity, sample};
use crate::lifecycle::{frame_steps, Animation};
use crate::palette::Palette;

const HEAD_GLOW: f32 = 10.0;
const MIN_FALL_SPEED: f32 = 0.1;
const POINTER_GLOW: f32 = 6.0;
const POINTER_BOOST: f32 = 0.5;
const POINTER_JITTER: f32 = 3.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RainConfig {
    pub column_spacing: f32,
    pub glyph_spacing: f32,
    pub trail_length: usize,
    pub speed_range: (f32, f32),
    // empty when a config file omits it; resolved to a glyph set later
    #[serde(default)]
    pub glyphs: String,
    pub interaction_radius: f32,
    pub medium_length: usize,
    pub medium_alpha: f32,
    pub dim_alpha: f32,
    pub head_color: Rgb,
    pub body_color: Rgb,
    pub background: Rgb,
    pub reroll_probability: f64,
    pub flicker_probability: f64,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            column_spacing: 20.0,
            glyph_spacing: 20.0,
            trail_length: 20,
            speed_range: (1.0, 3.0),
            glyphs: GlyphSet::Matrix.chars(),
            interaction_radius: 100.0,
            medium_length: 3,
            medium_alpha: 0.7,
            dim_alpha: 0.35,
            head_color: Rgb::new(200, 255, 200),
            body_color: Rgb::new(0, 255, 65),
            background: Rgb::BLACK,
            reroll_probability: 0.1,
            flicker_probability: 0.02,
        }
    }
}

impl RainConfig {
    pub fn with_palette(mut self, palette: &Palette) -> Self {
        self.head_color = palette.head;
        self.body_color = palette.body;
        self.background = palette.background;
        self
    }

    pub fn normalized(mut self) -> Self {
        let defaults = RainConfig::default();
        if self.column_spacing.is_nan() || self.column_spacing < 1.0 {
            self.column_spacing = defaults.column_spacing;
        }
        if self.glyph_spacing.is_nan() || self.glyph_spacing < 1.0 {
            self.glyph_spacing = defaults.glyph_spacing;
        }
        self.trail_length = self.trail_length.max(1);
        let (low, high) = finite_range(self.speed_range, defaults.speed_range);
        let low = low.max(MIN_FALL_SPEED);
        self.speed_range = (low, high.max(low));
        if self.glyphs.trim().is_empty() {
            self.glyphs = defaults.glyphs;
        }
        self.reroll_probability = probability(self.reroll_probability);
        self.flicker_probability = probability(self.flicker_probability);
        self.medium_alpha = self.medium_alpha.clamp(0.0, 1.0);
        self.dim_alpha = self.dim_alpha.clamp(0.0, 1.0);
        self
    }

    fn trail_px(&self) -> f32 {
        self.trail_length as f32 * self.glyph_spacing
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Head,
    Medium,
    Dim,
}

pub fn tier(index: usize, medium_length: usize) -> Tier {
    match index {
        0 => Tier::Head,
        j if j <= medium_length => Tier::Medium,
        _ => Tier::Dim,
    }
}

pub fn glyph_alpha(tier: Tier, weight: f32, cfg: &RainConfig) -> f32 {
    match tier {
        Tier::Head => 1.0,
        Tier::Medium => cfg.medium_alpha,
        Tier::Dim => cfg.dim_alpha * weight,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub weight: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub x: f32,
    /// y of the head glyph; the trail extends upwards from here.
    pub offset: f32,
    pub speed: f32,
    pub glyphs: Vec<Glyph>,
}

impl Column {
    pub fn tail_y(&self, glyph_spacing: f32) -> f32 {
        self.offset - self.glyphs.len().saturating_sub(1) as f32 * glyph_spacing
    }
}

pub struct MatrixRain<R = StdRng> {
    config: RainConfig,
    pool: Vec<char>,
    pick: Option<Uniform<usize>>,
    rng: R,
    size: Size,
    columns: Vec<Column>,
    mouse: Option<Point>,
    time: f32,
}

impl MatrixRain<StdRng> {
    pub fn new(config: RainConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MatrixRain<R> {
    pub fn with_rng(config: RainConfig, rng: R) -> Self {
        let config = config.normalized();
        let pool: Vec<char> = config.glyphs.chars().filter(|c| !c.is_whitespace()).collect();
        let pick = Uniform::new(0, pool.len()).ok();
        Self {
            config,
            pool,
            pick,
            rng,
            size: Size::ZERO,
            columns: Vec::new(),
            mouse: None,
            time: 0.0,
        }
    }

    #[allow(dead_code)]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn random_glyph(&mut self) -> char {
        let idx = match &self.pick {
            Some(pick) => pick.sample(&mut self.rng),
            None => 0,
        };
        self.pool.get(idx).copied().unwrap_or('0')
    }

    fn random_glyphs(&mut self) -> Vec<Glyph> {
        let len = self.config.trail_length;
        (0..len)
            .map(|j| Glyph {
                ch: self.random_glyph(),
                weight: 1.0 - j as f32 / len as f32,
            })
            .collect()
    }

    fn regenerate(&mut self, size: Size) {
        self.size = size;
        let count = if size.width > 0.0 {
            (size.width / self.config.column_spacing).floor() as usize
        } else {
            0
        };
        let trail_px = self.config.trail_px();
        self.columns.clear();
        for i in 0..count {
            let offset = sample(&mut self.rng, (-trail_px, size.height));
            let speed = sample(&mut self.rng, self.config.speed_range);
            let glyphs = self.random_glyphs();
            self.columns.push(Column {
                x: i as f32 * self.config.column_spacing,
                offset,
                speed,
                glyphs,
            });
        }
    }

    fn recycle(&mut self, i: usize) {
        let trail_px = self.config.trail_px();
        let offset = -sample(&mut self.rng, (0.0, trail_px));
        let speed = sample(&mut self.rng, self.config.speed_range);
        let reroll = self.rng.random_bool(self.config.reroll_probability);
        let glyphs = reroll.then(|| self.random_glyphs());

        let col = &mut self.columns[i];
        col.offset = offset;
        col.speed = speed;
        if let Some(glyphs) = glyphs {
            col.glyphs = glyphs;
        }
    }

    fn flicker(&mut self, i: usize) {
        let len = self.columns[i].glyphs.len();
        if len < 2 || !self.rng.random_bool(self.config.flicker_probability) {
            return;
        }
        let j = self.rng.random_range(1..len);
        let ch = self.random_glyph();
        self.columns[i].glyphs[j].ch = ch;
    }
}

impl<R: Rng> Animation for MatrixRain<R> {
    fn name(&self) -> &'static str {
        "rain"
    }

    fn on_initialize(&mut self, size: Size) {
        self.time = 0.0;
        self.mouse = None;
        self.regenerate(size);
    }

    fn on_resize(&mut self, size: Size) {
        self.regenerate(size);
    }

    fn on_mouse_move(&mut self, position: Point) {
        self.mouse = Some(position);
    }

    fn on_destroy(&mut self) {
        self.columns.clear();
        self.mouse = None;
    }

    fn update(&mut self, delta: Duration) {
        let steps = frame_steps(delta);
        self.time += delta.as_secs_f32();
        let spacing = self.config.glyph_spacing;

        for i in 0..self.columns.len() {
            let col = &mut self.columns[i];
            col.offset += col.speed * steps;
            if col.tail_y(spacing) > self.size.height {
                self.recycle(i);
            }
            self.flicker(i);
        }
    }

    fn render(&mut self, ctx: &mut dyn Context2d) {
        if self.size.is_empty() {
            return;
        }
        let cfg = &self.config;
        let height = self.size.height;
        ctx.clear(cfg.background);

        let mut buf = [0u8; 4];
        for col in &self.columns {
            for (j, glyph) in col.glyphs.iter().enumerate() {
                let y = col.offset - j as f32 * cfg.glyph_spacing;
                if y < -cfg.glyph_spacing || y > height + cfg.glyph_spacing {
                    continue;
                }
                let text = glyph.ch.encode_utf8(&mut buf);
                let tier = tier(j, cfg.medium_length);
                let base = glyph_alpha(tier, glyph.weight, cfg);

                if tier == Tier::Head {
                    let style = TextStyle::new(cfg.head_color, base).with_glow(HEAD_GLOW);
                    ctx.fill_text(text, Point::new(col.x, y), style);
                    continue;
                }

                let near = proximity(Point::new(col.x, y), self.mouse, cfg.interaction_radius);
                let alpha = (base + near * POINTER_BOOST).min(1.0).max(base);
                let jitter = (self.time * 8.0 + j as f32).sin() * near * POINTER_JITTER;
                let style = TextStyle::new(cfg.body_color, alpha).with_glow(near * POINTER_GLOW);
                ctx.fill_text(text, Point::new(col.x + jitter, y), style);
            }
        }
    }
}

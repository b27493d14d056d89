// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    seq::IndexedRandom,
    Rng, SeedableRng,
};
use serde::Deserialize;

use crate::canvas::{Context2d, Point, Rect, Rgb, Size, TextStyle};
use crate::charset::Vocabulary;
use crate::lifecycle::{frame_steps, Animation};
use crate::palette::Palette;

const POINTER_BOOST: f32 = 0.5;
const POINTER_JITTER: f32 = 2.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    pub row_spacing: f32,
    pub vocabulary: Vec<String>,
    pub palette: Vec<Rgb>,
    pub unsettled_color: Rgb,
    pub progress_color: Rgb,
    pub grid_color: Rgb,
    pub background: Rgb,
    pub margin: f32,
    pub interaction_radius: f32,
    pub opacity_range: (f32, f32),
    pub drift_range: (f32, f32),
    pub settle_speed_range: (f32, f32),
    pub settle_threshold: f32,
    pub opacity_cap: f32,
    pub opacity_rise: f32,
    pub reroll_probability: f64,
    pub reroll_opacity: f32,
    pub progress_rate: f32,
    pub grid_spacing: f32,
    pub grid_alpha: f32,
    pub progress_inset: f32,
    pub progress_height: f32,
    pub font_size: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            row_spacing: 20.0,
            vocabulary: Vocabulary::Rust.tokens(),
            palette: vec![
                Rgb::new(0, 255, 65),
                Rgb::new(0, 204, 255),
                Rgb::new(255, 204, 0),
                Rgb::new(255, 95, 135),
                Rgb::new(175, 135, 255),
            ],
            unsettled_color: Rgb::new(90, 90, 90),
            progress_color: Rgb::new(0, 255, 65),
            grid_color: Rgb::new(0, 255, 65),
            background: Rgb::new(10, 10, 10),
            margin: 50.0,
            interaction_radius: 150.0,
            opacity_range: (0.1, 0.3),
            drift_range: (-0.25, 0.25),
            settle_speed_range: (0.02, 0.05),
            settle_threshold: 1.0,
            opacity_cap: 0.8,
            opacity_rise: 0.01,
            reroll_probability: 0.001,
            reroll_opacity: 0.1,
            progress_rate: 0.001,
            grid_spacing: 40.0,
            grid_alpha: 0.03,
            progress_inset: 20.0,
            progress_height: 2.0,
            font_size: 14.0,
        }
    }
}

impl FieldConfig {
    pub fn with_palette(mut self, palette: &Palette) -> Self {
        self.palette = palette.accents.clone();
        self.unsettled_color = palette.dim;
        self.progress_color = palette.body;
        self.grid_color = palette.body;
        self.background = palette.background;
        self
    }

    pub fn normalized(mut self) -> Self {
        let defaults = FieldConfig::default();
        if self.row_spacing.is_nan() || self.row_spacing < 1.0 {
            self.row_spacing = defaults.row_spacing;
        }
        if self.vocabulary.iter().all(|t| t.is_empty()) {
            self.vocabulary = defaults.vocabulary;
        }
        self.vocabulary.retain(|t| !t.is_empty());
        if self.palette.is_empty() {
            self.palette = defaults.palette;
        }
        self.margin = self.margin.max(0.0);
        self.interaction_radius = self.interaction_radius.max(0.0);
        self.opacity_cap = self.opacity_cap.clamp(0.0, 1.0);
        self.reroll_probability = probability(self.reroll_probability);
        self.reroll_opacity = self.reroll_opacity.clamp(0.0, 1.0);
        self.progress_rate = self.progress_rate.max(0.0);
        let (low, high) = finite_range(self.opacity_range, defaults.opacity_range);
        self.opacity_range = (low.clamp(0.0, 1.0), high.clamp(0.0, 1.0));
        self.drift_range = finite_range(self.drift_range, defaults.drift_range);
        let (low, high) = finite_range(self.settle_speed_range, defaults.settle_speed_range);
        self.settle_speed_range = (low.clamp(0.0, 1.0), high.clamp(0.0, 1.0));
        if self.grid_spacing.is_nan() || self.grid_spacing < 1.0 {
            self.grid_spacing = defaults.grid_spacing;
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub target_y: f32,
    pub vx: f32,
    pub vy: f32,
    pub opacity: f32,
    pub settle_speed: f32,
    pub settled: bool,
    pub color: Rgb,
}

pub(crate) fn sample<R: Rng>(rng: &mut R, (low, high): (f32, f32)) -> f32 {
    match Uniform::new(low, high) {
        Ok(range) => range.sample(rng),
        Err(_) if low.is_finite() => low,
        Err(_) => 0.0,
    }
}

pub(crate) fn finite_range(range: (f32, f32), fallback: (f32, f32)) -> (f32, f32) {
    let (low, high) = range;
    if low.is_finite() && high.is_finite() && low <= high && (high - low).is_finite() {
        range
    } else {
        fallback
    }
}

pub(crate) fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Wrap `v` into `[-margin, extent + margin]` once it leaves that band.
pub(crate) fn wrap_axis(v: f32, extent: f32, margin: f32) -> f32 {
    let low = -margin;
    let high = extent + margin;
    if v >= low && v <= high {
        return v;
    }
    let span = high - low;
    if span <= 0.0 || !v.is_finite() {
        return low;
    }
    low + (v - low).rem_euclid(span)
}

pub(crate) fn proximity(at: Point, mouse: Option<Point>, radius: f32) -> f32 {
    let Some(mouse) = mouse else {
        return 0.0;
    };
    if radius <= 0.0 {
        return 0.0;
    }
    let d = at.distance(mouse);
    if d < radius {
        1.0 - d / radius
    } else {
        0.0
    }
}

pub fn rendered_alpha(opacity: f32, proximity: f32) -> f32 {
    (opacity + proximity * POINTER_BOOST).min(1.0).max(opacity)
}

pub fn progress_bar_width(progress: f32, surface_width: f32, inset: f32) -> f32 {
    (surface_width - 2.0 * inset).max(0.0) * progress.clamp(0.0, 1.0)
}

pub struct ParticleField<R = StdRng> {
    config: FieldConfig,
    rng: R,
    size: Size,
    particles: Vec<Particle>,
    mouse: Option<Point>,
    progress: f32,
    time: f32,
}

impl ParticleField<StdRng> {
    pub fn new(config: FieldConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ParticleField<R> {
    pub fn with_rng(config: FieldConfig, rng: R) -> Self {
        Self {
            config: config.normalized(),
            rng,
            size: Size::ZERO,
            particles: Vec::new(),
            mouse: None,
            progress: 0.0,
            time: 0.0,
        }
    }

    #[allow(dead_code)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[allow(dead_code)]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    fn random_text(&mut self) -> String {
        self.config
            .vocabulary
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }

    fn spawn(&mut self, index: usize) -> Particle {
        let text = self.random_text();
        let x = sample(&mut self.rng, (0.0, self.size.width));
        let y = sample(&mut self.rng, (0.0, self.size.height));
        let opacity = sample(&mut self.rng, self.config.opacity_range);
        let vx = sample(&mut self.rng, self.config.drift_range);
        let vy = sample(&mut self.rng, self.config.drift_range);
        let settle_speed = sample(&mut self.rng, self.config.settle_speed_range);
        let color = self
            .config
            .palette
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Rgb::WHITE);
        Particle {
            text,
            x,
            y,
            target_y: index as f32 * self.config.row_spacing + self.config.row_spacing / 2.0,
            vx,
            vy,
            opacity,
            settle_speed,
            settled: false,
            color,
        }
    }

    fn regenerate(&mut self, size: Size) {
        self.size = size;
        let rows = if size.height > 0.0 {
            (size.height / self.config.row_spacing).floor() as usize
        } else {
            0
        };
        self.particles.clear();
        for i in 0..rows {
            let p = self.spawn(i);
            self.particles.push(p);
        }
    }

    fn step_particle(&mut self, i: usize, steps: f32) {
        let cfg = &self.config;
        let size = self.size;
        let p = &mut self.particles[i];

        if !p.settled {
            let dy = p.target_y - p.y;
            if dy.abs() < cfg.settle_threshold {
                p.settled = true;
            } else {
                p.y += dy * (p.settle_speed * steps).min(1.0);
            }
        }
        if p.settled {
            p.opacity = (p.opacity + cfg.opacity_rise * steps).min(cfg.opacity_cap.max(p.opacity));
        }

        p.x = wrap_axis(p.x + p.vx * steps, size.width, cfg.margin);
        p.y = wrap_axis(p.y + p.vy * steps, size.height, cfg.margin);

        if self.rng.random_bool(cfg.reroll_probability) {
            let text = self.random_text();
            let p = &mut self.particles[i];
            p.text = text;
            p.settled = false;
            p.opacity = self.config.reroll_opacity;
        }
    }

    fn draw_progress(&self, ctx: &mut dyn Context2d) {
        let cfg = &self.config;
        let w = self.size.width;
        let y = self.size.height - cfg.progress_inset - cfg.progress_height;
        let track = (w - 2.0 * cfg.progress_inset).max(0.0);
        if track <= 0.0 {
            return;
        }
        ctx.fill_rect(
            Rect::new(cfg.progress_inset, y, track, cfg.progress_height),
            cfg.progress_color,
            0.1,
        );
        let fill = progress_bar_width(self.progress, w, cfg.progress_inset);
        if fill > 0.0 {
            ctx.fill_rect(
                Rect::new(cfg.progress_inset, y, fill, cfg.progress_height),
                cfg.progress_color,
                0.8,
            );
        }
    }

    fn draw_grid(&self, ctx: &mut dyn Context2d) {
        let cfg = &self.config;
        let Size { width, height } = self.size;
        let mut x = 0.0;
        while x < width {
            ctx.stroke_line(
                Point::new(x, 0.0),
                Point::new(x, height),
                cfg.grid_color,
                cfg.grid_alpha,
            );
            x += cfg.grid_spacing;
        }
        let mut y = 0.0;
        while y < height {
            ctx.stroke_line(
                Point::new(0.0, y),
                Point::new(width, y),
                cfg.grid_color,
                cfg.grid_alpha,
            );
            y += cfg.grid_spacing;
        }
    }
}

impl<R: Rng> Animation for ParticleField<R> {
    fn name(&self) -> &'static str {
        "field"
    }

    fn on_initialize(&mut self, size: Size) {
        self.progress = 0.0;
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
        self.particles.clear();
        self.mouse = None;
    }

    fn update(&mut self, delta: Duration) {
        let steps = frame_steps(delta);
        self.time += delta.as_secs_f32();

        for i in 0..self.particles.len() {
            self.step_particle(i, steps);
        }

        self.progress = (self.progress + self.config.progress_rate * steps).fract();
    }

    fn render(&mut self, ctx: &mut dyn Context2d) {
        if self.size.is_empty() {
            return;
        }
        let cfg = &self.config;
        ctx.clear(cfg.background);

        for (i, p) in self.particles.iter().enumerate() {
            let width = ctx.measure_text(&p.text);
            let bounds = Rect::new(p.x, p.y, width, cfg.font_size);
            if !bounds.intersects(self.size) {
                continue;
            }

            let near = proximity(Point::new(p.x, p.y), self.mouse, cfg.interaction_radius);
            let alpha = rendered_alpha(p.opacity, near);
            let jitter = (self.time * 10.0 + i as f32).sin() * near * POINTER_JITTER;
            let color = if p.settled {
                p.color
            } else {
                cfg.unsettled_color
            };
            ctx.fill_text(
                &p.text,
                Point::new(p.x + jitter, p.y),
                TextStyle::new(color, alpha),
            );
        }

        self.draw_progress(ctx);
        self.draw_grid(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{Lifecycle, NOMINAL_FRAME};
    use crate::testing::{DrawOp, RecordingContext, RecordingScheduler};

    fn field(seed: u64) -> ParticleField {
        ParticleField::new(FieldConfig::default(), seed)
    }

    fn started(width: f32, height: f32) -> ParticleField {
        let mut f = field(7);
        f.on_initialize(Size::new(width, height));
        f
    }

    #[test]
    fn particle_count_follows_surface_height() {
        let f = started(800.0, 600.0);
        assert_eq!(f.particles().len(), 30);
        let f = started(800.0, 619.0);
        assert_eq!(f.particles().len(), 30);
        let f = started(10.0, 620.0);
        assert_eq!(f.particles().len(), 31);
    }

    #[test]
    fn initialize_through_lifecycle_creates_thirty_particles() {
        let mut lc = Lifecycle::new(field(1), RecordingScheduler::default());
        lc.initialize(RecordingContext::new(Size::new(800.0, 600.0)));
        assert_eq!(lc.animation().particles().len(), 30);
    }

    #[test]
    fn particles_start_unsettled_with_row_targets() {
        let f = started(800.0, 600.0);
        let cfg = FieldConfig::default();
        for (i, p) in f.particles().iter().enumerate() {
            assert!(!p.settled);
            assert_eq!(p.target_y, i as f32 * 20.0 + 10.0);
            assert!(p.opacity >= cfg.opacity_range.0 && p.opacity < cfg.opacity_range.1);
            assert!(p.vx.abs() <= 0.25 && p.vy.abs() <= 0.25);
            assert!(cfg.palette.contains(&p.color));
            assert!(cfg.vocabulary.contains(&p.text));
        }
    }

    #[test]
    fn resize_regenerates_wholesale() {
        let mut f = started(800.0, 600.0);
        f.update(NOMINAL_FRAME);
        f.on_resize(Size::new(400.0, 200.0));
        assert_eq!(f.particles().len(), 10);
        assert!(f.particles().iter().all(|p| !p.settled));
        assert!(f.particles().iter().all(|p| p.x < 400.0 && p.y < 200.0));
    }

    #[test]
    fn same_seed_same_field() {
        let a = started(640.0, 480.0);
        let b = started(640.0, 480.0);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn zero_surface_has_no_particles_and_draws_nothing() {
        let mut lc = Lifecycle::new(field(3), RecordingScheduler::default());
        lc.initialize(RecordingContext::new(Size::ZERO));
        assert!(lc.animation().particles().is_empty());

        let handle = lc.pending_frame().unwrap();
        assert!(lc.on_animation_frame(handle, Duration::from_millis(16)));
        assert!(lc.context().unwrap().ops.is_empty());
    }

    #[test]
    fn resize_before_initialize_leaves_no_particles() {
        let mut lc: Lifecycle<ParticleField, RecordingContext, RecordingScheduler> =
            Lifecycle::new(field(3), RecordingScheduler::default());
        lc.resize(Size::new(800.0, 600.0));
        assert!(lc.animation().particles().is_empty());
        assert!(lc.size().is_none());
    }

    #[test]
    fn particles_ease_toward_target_and_settle() {
        let mut cfg = FieldConfig::default();
        cfg.reroll_probability = 0.0;
        cfg.drift_range = (0.0, 0.0);
        let mut f = ParticleField::new(cfg, 11);
        f.on_initialize(Size::new(800.0, 600.0));

        let before: Vec<f32> = f
            .particles()
            .iter()
            .map(|p| (p.target_y - p.y).abs())
            .collect();
        f.update(NOMINAL_FRAME);
        for (p, b) in f.particles().iter().zip(&before) {
            if !p.settled {
                assert!((p.target_y - p.y).abs() <= *b);
            }
        }

        for _ in 0..2000 {
            f.update(NOMINAL_FRAME);
        }
        for p in f.particles() {
            assert!(p.settled);
            assert!((p.target_y - p.y).abs() < 1.0);
            assert!((p.opacity - 0.8).abs() < 1e-4);
        }
    }

    #[test]
    fn settled_particles_keep_drifting() {
        let mut cfg = FieldConfig::default();
        cfg.reroll_probability = 0.0;
        cfg.drift_range = (0.2, 0.2001);
        let mut f = ParticleField::new(cfg, 5);
        f.on_initialize(Size::new(800.0, 600.0));
        for _ in 0..600 {
            f.update(NOMINAL_FRAME);
        }
        let xs: Vec<f32> = f.particles().iter().map(|p| p.x).collect();
        f.update(NOMINAL_FRAME);
        for (p, x) in f.particles().iter().zip(xs) {
            if p.x > x {
                assert!((p.x - x - 0.2).abs() < 0.01);
            }
        }
    }

    #[test]
    fn wrap_keeps_positions_inside_margin_band() {
        assert_eq!(wrap_axis(10.0, 100.0, 50.0), 10.0);
        assert_eq!(wrap_axis(150.0, 100.0, 50.0), 150.0);
        let w = wrap_axis(151.0, 100.0, 50.0);
        assert!((w - -49.0).abs() < 1e-4);
        let w = wrap_axis(-51.0, 100.0, 50.0);
        assert!((w - 149.0).abs() < 1e-4);
        let w = wrap_axis(10_000.5, 100.0, 50.0);
        assert!((-50.0..=150.0).contains(&w));
        assert_eq!(wrap_axis(5.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn particles_never_escape_the_wrap_band() {
        let mut cfg = FieldConfig::default();
        cfg.drift_range = (-40.0, 40.0);
        let mut f = ParticleField::new(cfg, 99);
        f.on_initialize(Size::new(300.0, 200.0));
        for frame in 0..500u64 {
            let delta = Duration::from_millis(frame % 7 * 40);
            f.update(delta);
            for p in f.particles() {
                assert!(p.x >= -50.0 && p.x <= 350.0, "x {}", p.x);
                assert!(p.y >= -50.0 && p.y <= 250.0, "y {}", p.y);
            }
        }
    }

    #[test]
    fn reroll_resets_to_unsettled_low_opacity() {
        let mut cfg = FieldConfig::default();
        cfg.reroll_probability = 1.0;
        cfg.settle_threshold = 10_000.0;
        let mut f = ParticleField::new(cfg, 2);
        f.on_initialize(Size::new(200.0, 100.0));
        f.update(NOMINAL_FRAME);
        for p in f.particles() {
            assert!(!p.settled);
            assert_eq!(p.opacity, 0.1);
        }
    }

    #[test]
    fn huge_delta_after_pause_is_capped() {
        let mut cfg = FieldConfig::default();
        cfg.reroll_probability = 0.0;
        let mut f = ParticleField::new(cfg, 4);
        f.on_initialize(Size::new(800.0, 600.0));
        f.update(Duration::from_secs(3600));
        assert!((f.progress() - 0.004).abs() < 1e-5);
    }

    #[test]
    fn progress_is_monotonic_modulo_wrap() {
        let mut cfg = FieldConfig::default();
        cfg.progress_rate = 0.07;
        let mut f = ParticleField::new(cfg, 4);
        f.on_initialize(Size::new(100.0, 100.0));
        let mut last = f.progress();
        let mut wraps = 0;
        for _ in 0..100 {
            f.update(NOMINAL_FRAME);
            let now = f.progress();
            assert!((0.0..1.0).contains(&now));
            if now < last {
                wraps += 1;
            }
            last = now;
        }
        assert!(wraps >= 6);
    }

    #[test]
    fn progress_bar_width_is_a_function_of_progress() {
        assert_eq!(progress_bar_width(0.0, 840.0, 20.0), 0.0);
        assert_eq!(progress_bar_width(0.5, 840.0, 20.0), 400.0);
        assert_eq!(progress_bar_width(1.0, 840.0, 20.0), 800.0);
        assert_eq!(progress_bar_width(0.5, 30.0, 20.0), 0.0);
    }

    #[test]
    fn rendered_progress_bar_matches_progress() {
        let mut cfg = FieldConfig::default();
        cfg.progress_rate = 0.1;
        let mut f = ParticleField::new(cfg, 8);
        f.on_initialize(Size::new(840.0, 600.0));
        f.update(NOMINAL_FRAME);
        let mut ctx = RecordingContext::new(Size::new(840.0, 600.0));
        f.render(&mut ctx);

        let rects = ctx.rects();
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].width, 800.0);
        let expected = progress_bar_width(f.progress(), 840.0, 20.0);
        assert!((rects[1].width - expected).abs() < 1e-3);
        assert_eq!(rects[1].y, 600.0 - 20.0 - 2.0);
    }

    #[test]
    fn render_clears_first_and_draws_grid() {
        let mut f = started(400.0, 200.0);
        let mut ctx = RecordingContext::new(Size::new(400.0, 200.0));
        f.render(&mut ctx);
        assert_eq!(ctx.ops.first(), Some(&DrawOp::Clear(Rgb::new(10, 10, 10))));
        assert_eq!(ctx.line_count(), 10 + 5);
    }

    #[test]
    fn pointer_never_dims_a_particle() {
        for opacity in [0.0, 0.1, 0.5, 0.8, 1.0] {
            for near in [0.0, 0.25, 0.5, 1.0] {
                assert!(rendered_alpha(opacity, near) >= opacity);
                assert!(rendered_alpha(opacity, near) <= 1.0);
            }
        }
    }

    #[test]
    fn particle_under_pointer_renders_brighter() {
        let mut f = started(800.0, 600.0);
        let target = f.particles()[3].clone();
        f.on_mouse_move(Point::new(target.x, target.y));

        let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));
        f.render(&mut ctx);
        let (_, _, style) = ctx
            .texts()
            .into_iter()
            .find(|(text, at, _)| *text == target.text && (at.y - target.y).abs() < 1e-6)
            .unwrap();
        assert!(style.alpha > target.opacity);
        assert!((style.alpha - rendered_alpha(target.opacity, 1.0)).abs() < 1e-6);
    }

    #[test]
    fn distant_pointer_leaves_opacity_untouched() {
        let mut f = started(800.0, 600.0);
        f.on_mouse_move(Point::new(-10_000.0, -10_000.0));
        let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));
        f.render(&mut ctx);
        let texts = ctx.texts();
        let visible = |p: &&Particle| {
            let width = ctx.measure_text(&p.text);
            Rect::new(p.x, p.y, width, 14.0).intersects(Size::new(800.0, 600.0))
        };
        let drawn: Vec<&Particle> = f.particles().iter().filter(visible).collect();
        assert_eq!(texts.len(), drawn.len());
        for ((_, at, style), p) in texts.iter().zip(drawn) {
            assert_eq!(style.alpha, p.opacity);
            assert_eq!(at.x, p.x);
        }
    }

    #[test]
    fn offscreen_particles_are_culled() {
        let mut cfg = FieldConfig::default();
        cfg.vocabulary = vec!["abc".to_string()];
        let mut f = ParticleField::new(cfg, 1);
        f.on_initialize(Size::new(100.0, 100.0));
        f.particles[0].x = -40.0;
        f.particles[1].x = 120.0;
        f.particles[2].x = 50.0;
        f.particles[2].y = 50.0;
        let mut ctx = RecordingContext::new(Size::new(100.0, 100.0));
        f.render(&mut ctx);
        let xs: Vec<f32> = ctx.texts().iter().map(|(_, at, _)| at.x).collect();
        assert!(!xs.contains(&-40.0));
        assert!(!xs.contains(&120.0));
        assert!(xs.contains(&50.0));
    }

    #[test]
    fn settled_particles_use_their_palette_color() {
        let mut f = started(200.0, 100.0);
        f.particles[0].settled = true;
        f.particles[0].x = 10.0;
        f.particles[0].y = 10.0;
        f.particles[1].settled = false;
        f.particles[1].x = 10.0;
        f.particles[1].y = 40.0;
        let settled_color = f.particles[0].color;

        let mut ctx = RecordingContext::new(Size::new(200.0, 100.0));
        f.render(&mut ctx);
        let texts = ctx.texts();
        let style_at = |y: f32| texts.iter().find(|(_, at, _)| at.y == y).unwrap().2;
        assert_eq!(style_at(10.0).color, settled_color);
        assert_eq!(style_at(40.0).color, f.config.unsettled_color);
    }

    #[test]
    fn unbounded_ranges_from_a_config_file_fall_back_to_defaults() {
        let cfg: FieldConfig = toml::from_str(
            "settle_speed_range = [0.0, inf]\ndrift_range = [-3e38, 3e38]\nopacity_range = [nan, 0.5]",
        )
        .unwrap();
        let mut f = ParticleField::new(cfg, 4);
        f.on_initialize(Size::new(800.0, 600.0));
        for _ in 0..10 {
            f.update(NOMINAL_FRAME);
        }

        let defaults = FieldConfig::default();
        assert_eq!(f.config.settle_speed_range, defaults.settle_speed_range);
        assert_eq!(f.config.drift_range, defaults.drift_range);
        assert_eq!(f.config.opacity_range, defaults.opacity_range);
        assert_eq!(f.particles.len(), 30);
        assert!(f
            .particles
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.opacity.is_finite()));
    }

    #[test]
    fn sample_tolerates_empty_and_infinite_ranges() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(sample(&mut rng, (5.0, 1.0)), 5.0);
        assert_eq!(sample(&mut rng, (0.5, f32::INFINITY)), 0.5);
        assert_eq!(sample(&mut rng, (f32::NEG_INFINITY, 1.0)), 0.0);
        let v = sample(&mut rng, (2.0, 3.0));
        assert!((2.0..3.0).contains(&v));
    }

    #[test]
    fn normalized_repairs_degenerate_config() {
        let cfg = FieldConfig {
            row_spacing: 0.0,
            vocabulary: vec![String::new()],
            palette: Vec::new(),
            grid_spacing: -1.0,
            ..FieldConfig::default()
        }
        .normalized();
        assert_eq!(cfg.row_spacing, 20.0);
        assert!(!cfg.vocabulary.is_empty());
        assert!(!cfg.palette.is_empty());
        assert_eq!(cfg.grid_spacing, 40.0);
    }
}

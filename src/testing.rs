// Copyright (c) 2026 rezky_nightky

use crate::canvas::{Context2d, Point, Rect, Rgb, Size, TextStyle};
use crate::scheduler::{FrameHandle, FrameScheduler};

pub const GLYPH_ADVANCE: f32 = 8.0;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear(Rgb),
    Rect {
        rect: Rect,
        color: Rgb,
        alpha: f32,
    },
    Line {
        from: Point,
        to: Point,
        alpha: f32,
    },
    Text {
        text: String,
        at: Point,
        style: TextStyle,
    },
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    size: Size,
    pub ops: Vec<DrawOp>,
    pub resizes: Vec<Size>,
}

impl RecordingContext {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
            resizes: Vec::new(),
        }
    }

    pub fn texts(&self) -> Vec<(&str, Point, TextStyle)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, at, style } => Some((text.as_str(), *at, *style)),
                _ => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn line_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count()
    }
}

impl Context2d for RecordingContext {
    fn size(&self) -> Size {
        self.size
    }

    fn resize_surface(&mut self, size: Size) {
        self.size = size;
        self.resizes.push(size);
    }

    fn clear(&mut self, color: Rgb) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f32) {
        self.ops.push(DrawOp::Rect { rect, color, alpha });
    }

    fn stroke_line(&mut self, from: Point, to: Point, _color: Rgb, alpha: f32) {
        self.ops.push(DrawOp::Line { from, to, alpha });
    }

    fn fill_text(&mut self, text: &str, at: Point, style: TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            style,
        });
    }

    fn measure_text(&self, text: &str) -> f32 {
        text.chars().count() as f32 * GLYPH_ADVANCE
    }
}

#[derive(Debug, Default)]
pub struct RecordingScheduler {
    next_id: u64,
    pub requested: Vec<FrameHandle>,
    pub cancelled: Vec<FrameHandle>,
}

impl FrameScheduler for RecordingScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle::new(self.next_id);
        self.requested.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.cancelled.push(handle);
    }
}

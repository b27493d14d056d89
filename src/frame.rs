// Copyright (c) 2026 rezky_nightky

use crate::canvas::{Context2d, Point, Rect, Rgb, Size, TextStyle};
use crate::cell::Cell;

pub const CELL_WIDTH_PX: f32 = 8.0;
pub const CELL_HEIGHT_PX: f32 = 16.0;

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Cell>,
    blank: Cell,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Rgb) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            blank,
        }
    }

    pub fn clear(&mut self, bg: Rgb) {
        self.blank = Cell::blank(bg);
        self.cells.fill(self.blank);
    }

    pub fn background(&self) -> Rgb {
        self.blank.bg
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    #[cfg(test)]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(c) = self.get_mut(x, y) {
            *c = cell;
        }
    }

    #[cfg(test)]
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y).map(|c| c.ch))
            .collect()
    }
}

fn cell_span(start_px: f32, len_px: f32, cell_px: f32, limit: u16) -> Option<(u16, u16)> {
    let first = (start_px / cell_px).floor().max(0.0);
    let end = ((start_px + len_px) / cell_px).ceil().min(limit as f32);
    if end.is_nan() || end <= first {
        return None;
    }
    Some((first as u16, end as u16))
}

/// Rasterises drawing calls onto a [`Frame`]: each cell covers
/// [`CELL_WIDTH_PX`] × [`CELL_HEIGHT_PX`] device pixels and alpha is
/// composited against the cell background.
#[derive(Clone, Debug)]
pub struct CellCanvas {
    frame: Frame,
}

impl CellCanvas {
    pub fn new(cols: u16, rows: u16, bg: Rgb) -> Self {
        Self {
            frame: Frame::new(cols, rows, bg),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn surface_size(cols: u16, rows: u16) -> Size {
        Size::new(cols as f32 * CELL_WIDTH_PX, rows as f32 * CELL_HEIGHT_PX)
    }

    pub fn cell_center(col: u16, row: u16) -> Point {
        Point::new(
            (col as f32 + 0.5) * CELL_WIDTH_PX,
            (row as f32 + 0.5) * CELL_HEIGHT_PX,
        )
    }

    fn cell_at(&self, p: Point) -> Option<(u16, u16)> {
        if !(p.x >= 0.0 && p.y >= 0.0) {
            return None;
        }
        let x = (p.x / CELL_WIDTH_PX).floor();
        let y = (p.y / CELL_HEIGHT_PX).floor();
        if x >= self.frame.width as f32 || y >= self.frame.height as f32 {
            return None;
        }
        Some((x as u16, y as u16))
    }

    fn plot_line(&mut self, x: u16, y: u16, glyph: char, color: Rgb, alpha: f32) {
        let Some(cell) = self.frame.get_mut(x, y) else {
            return;
        };
        let ch = match (cell.ch, glyph) {
            (' ', g) => g,
            ('─', '│') | ('│', '─') | ('┼', _) => '┼',
            (c, g) if c == g => g,
            _ => return,
        };
        cell.ch = ch;
        cell.fg = cell.bg.lerp(color, alpha);
        cell.bold = false;
    }
}

impl Context2d for CellCanvas {
    fn size(&self) -> Size {
        Self::surface_size(self.frame.width, self.frame.height)
    }

    fn resize_surface(&mut self, size: Size) {
        let cols = (size.width.max(0.0) / CELL_WIDTH_PX).floor().min(u16::MAX as f32) as u16;
        let rows = (size.height.max(0.0) / CELL_HEIGHT_PX).floor().min(u16::MAX as f32) as u16;
        self.frame = Frame::new(cols, rows, self.frame.background());
    }

    fn clear(&mut self, color: Rgb) {
        self.frame.clear(color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f32) {
        let Some((x0, x1)) = cell_span(rect.x, rect.width, CELL_WIDTH_PX, self.frame.width) else {
            return;
        };
        let Some((y0, y1)) = cell_span(rect.y, rect.height, CELL_HEIGHT_PX, self.frame.height)
        else {
            return;
        };

        // Sub-cell bars become box glyphs; anything bigger tints the background.
        let glyph = if rect.height < CELL_HEIGHT_PX {
            Some('▁')
        } else if rect.width < CELL_WIDTH_PX {
            Some('▏')
        } else {
            None
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let Some(cell) = self.frame.get_mut(x, y) else {
                    continue;
                };
                match glyph {
                    Some(g) => {
                        let base = if cell.ch == g { cell.fg } else { cell.bg };
                        cell.ch = g;
                        cell.fg = base.lerp(color, alpha);
                        cell.bold = false;
                    }
                    None => {
                        cell.bg = cell.bg.lerp(color, alpha);
                        if cell.is_blank() {
                            cell.fg = cell.bg;
                        }
                    }
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgb, alpha: f32) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let glyph = if dy == 0.0 {
            '─'
        } else if dx == 0.0 {
            '│'
        } else {
            '·'
        };

        let steps = (dx.abs() / CELL_WIDTH_PX)
            .max(dy.abs() / CELL_HEIGHT_PX)
            .ceil()
            .max(1.0) as usize;
        let mut last = None;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p = Point::new(from.x + dx * t, from.y + dy * t);
            let Some(cell) = self.cell_at(p) else {
                continue;
            };
            if last == Some(cell) {
                continue;
            }
            last = Some(cell);
            self.plot_line(cell.0, cell.1, glyph, color, alpha);
        }
    }

    fn fill_text(&mut self, text: &str, at: Point, style: TextStyle) {
        let row = (at.y / CELL_HEIGHT_PX).floor();
        if row < 0.0 || row >= self.frame.height as f32 {
            return;
        }
        let row = row as u16;
        let start = (at.x / CELL_WIDTH_PX).floor() as i64;

        for (i, ch) in text.chars().enumerate() {
            let col = start + i as i64;
            if col < 0 {
                continue;
            }
            let Ok(col) = u16::try_from(col) else {
                break;
            };
            let Some(cell) = self.frame.get_mut(col, row) else {
                break;
            };
            if ch == ' ' {
                continue;
            }
            cell.ch = ch;
            cell.fg = cell.bg.lerp(style.color, style.alpha);
            cell.bold = style.glow > 0.0;
        }
    }

    fn measure_text(&self, text: &str) -> f32 {
        text.chars().count() as f32 * CELL_WIDTH_PX
    }
}

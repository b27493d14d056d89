// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::Frame;
use crate::palette::term_color;
use crate::runtime::ColorMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Styled {
    ch: char,
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
}

impl Styled {
    const UNKNOWN: Styled = Styled {
        ch: '\0',
        fg: None,
        bg: None,
        bold: false,
    };
}

struct LastFrame {
    width: u16,
    height: u16,
    cells: Vec<Styled>,
}

impl LastFrame {
    fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Styled::UNKNOWN; len],
        }
    }
}

pub struct Terminal {
    stdout: Stdout,
    last: Option<LastFrame>,
    run_buf: String,
    mouse: bool,
}

impl Terminal {
    pub fn new(mouse: bool) -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            if mouse {
                out.execute(event::EnableMouseCapture)?;
            }
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore(&mut out, mouse);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: None,
            run_buf: String::with_capacity(64),
            mouse,
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &Frame, mode: ColorMode) -> Result<()> {
        let resized = self
            .last
            .as_ref()
            .map(|l| l.width != frame.width || l.height != frame.height)
            .unwrap_or(true);
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.last = Some(LastFrame::new(frame.width, frame.height));
        }
        let Some(last) = self.last.as_mut() else {
            return Ok(());
        };

        let mut cur_fg: Option<Option<Color>> = None;
        let mut cur_bg: Option<Option<Color>> = None;
        let mut cur_bold = false;
        let mut cur_pos: Option<(u16, u16)> = None;
        let width = frame.width as usize;

        let styled = |i: usize| {
            let c = frame.cells[i];
            Styled {
                ch: c.ch,
                fg: term_color(c.fg, mode),
                bg: term_color(c.bg, mode),
                bold: c.bold,
            }
        };

        for y in 0..frame.height {
            let row = y as usize * width;
            let mut x = 0usize;
            while x < width {
                let head = styled(row + x);
                if last.cells[row + x] == head {
                    x += 1;
                    continue;
                }

                self.run_buf.clear();
                self.run_buf.push(head.ch);
                last.cells[row + x] = head;
                let x0 = x as u16;
                x += 1;
                while x < width {
                    let next = styled(row + x);
                    if last.cells[row + x] == next
                        || next.fg != head.fg
                        || next.bg != head.bg
                        || next.bold != head.bold
                    {
                        break;
                    }
                    self.run_buf.push(next.ch);
                    last.cells[row + x] = next;
                    x += 1;
                }

                if cur_pos != Some((x0, y)) {
                    self.stdout.queue(cursor::MoveTo(x0, y))?;
                }
                if cur_fg != Some(head.fg) {
                    self.stdout
                        .queue(SetForegroundColor(head.fg.unwrap_or(Color::Reset)))?;
                    cur_fg = Some(head.fg);
                }
                if cur_bg != Some(head.bg) {
                    self.stdout
                        .queue(SetBackgroundColor(head.bg.unwrap_or(Color::Reset)))?;
                    cur_bg = Some(head.bg);
                }
                if head.bold != cur_bold {
                    self.stdout.queue(SetAttribute(if head.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    }))?;
                    cur_bold = head.bold;
                }

                self.stdout.queue(Print(self.run_buf.as_str()))?;
                cur_pos = if x < width {
                    Some((x as u16, y))
                } else {
                    None
                };
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore(&mut self.stdout, self.mouse);
    }
}

fn restore(out: &mut Stdout, mouse: bool) {
    if mouse {
        let _ = out.execute(event::DisableMouseCapture);
    }
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

pub fn restore_terminal_best_effort() {
    restore(&mut stdout(), true);
}

//! Terminal session and frame flushing for the board view.
//!
//! [`TerminalRenderer`] keeps the last frame it showed. A frame of a new size
//! (or the first one) clears the screen and repaints every row; otherwise only
//! the spans whose glyphs changed are rewritten. Mouse capture is on for the
//! whole session since the board is played with the pointer.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor, event, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal,
};

use crate::fb::{FrameBuffer, GlyphStyle, Rgb};

/// A run of changed glyphs on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub x: u16,
    pub y: u16,
    pub len: u16,
}

pub struct TerminalRenderer {
    stdout: io::Stdout,
    shown: Option<FrameBuffer>,
    bytes: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            shown: None,
            bytes: Vec::with_capacity(32 * 1024),
        }
    }

    /// Raw mode, alternate screen, mouse capture, hidden cursor.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.bytes.clear();
        queue!(
            self.bytes,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide,
            terminal::DisableLineWrap
        )?;
        self.write_out()
    }

    /// Undo everything [`enter`](Self::enter) did.
    pub fn exit(&mut self) -> Result<()> {
        self.bytes.clear();
        queue!(
            self.bytes,
            ResetColor,
            SetAttribute(Attribute::Reset),
            terminal::EnableLineWrap,
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )?;
        self.write_out()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Forget the shown frame so the next draw repaints everything.
    pub fn invalidate(&mut self) {
        self.shown = None;
    }

    /// Show `fb`, then hand the previously shown frame back through `fb` so
    /// the caller can draw the next frame into it without allocating.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.bytes.clear();
        encode_frame(self.shown.as_ref(), fb, &mut self.bytes)?;
        self.write_out()?;

        let recycled = match self.shown.take() {
            Some(prev) => prev,
            None => FrameBuffer::new(fb.width(), fb.height()),
        };
        self.shown = Some(std::mem::replace(fb, recycled));
        Ok(())
    }

    fn write_out(&mut self) -> Result<()> {
        self.stdout.write_all(&self.bytes)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode the commands that turn the screen showing `prev` into `next`.
///
/// Without a previous frame of the same size the screen is cleared and every
/// row is repainted.
pub fn encode_frame(prev: Option<&FrameBuffer>, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let spans = match prev {
        Some(prev) if prev.width() == next.width() && prev.height() == next.height() => {
            dirty_spans(prev, next)
        }
        _ => {
            queue!(out, terminal::Clear(terminal::ClearType::All))?;
            (0..next.height())
                .map(|y| Span {
                    x: 0,
                    y,
                    len: next.width(),
                })
                .collect()
        }
    };
    if spans.is_empty() {
        return Ok(());
    }

    let mut pen = Pen::default();
    for span in spans {
        queue!(out, cursor::MoveTo(span.x, span.y))?;
        for x in span.x..span.x + span.len {
            let glyph = next.get(x, span.y).unwrap_or_default();
            pen.switch(out, glyph.style)?;
            queue!(out, Print(glyph.ch))?;
        }
    }
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    Ok(())
}

/// Maximal runs of differing glyphs, row by row. Both frames share a size.
pub fn dirty_spans(prev: &FrameBuffer, next: &FrameBuffer) -> Vec<Span> {
    let mut spans = Vec::new();
    for y in 0..next.height() {
        let differs = |x: u16| prev.get(x, y) != next.get(x, y);
        let mut x = 0;
        while x < next.width() {
            if !differs(x) {
                x += 1;
                continue;
            }
            let start = x;
            while x < next.width() && differs(x) {
                x += 1;
            }
            spans.push(Span {
                x: start,
                y,
                len: x - start,
            });
        }
    }
    spans
}

/// Current terminal style, so only what changed gets emitted.
#[derive(Debug, Default)]
struct Pen {
    style: Option<GlyphStyle>,
}

impl Pen {
    fn switch(&mut self, out: &mut Vec<u8>, style: GlyphStyle) -> Result<()> {
        let attrs_changed = self
            .style
            .map_or(true, |s| (s.bold, s.dim) != (style.bold, style.dim));
        if attrs_changed {
            // SGR reset also drops both colors.
            queue!(out, SetAttribute(Attribute::Reset))?;
            if style.bold {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            if style.dim {
                queue!(out, SetAttribute(Attribute::Dim))?;
            }
            self.style = None;
        }
        if self.style.map(|s| s.fg) != Some(style.fg) {
            queue!(out, SetForegroundColor(color(style.fg)))?;
        }
        if self.style.map(|s| s.bg) != Some(style.bg) {
            queue!(out, SetBackgroundColor(color(style.bg)))?;
        }
        self.style = Some(style);
        Ok(())
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

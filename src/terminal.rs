// Copyright (c) 2026 tendrix contributors

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::Frame;

/// Raw-mode alternate-screen terminal that flushes frames by diffing the
/// dirty cells. All state restore paths are best-effort.
pub struct Terminal {
    stdout: Stdout,
    scratch: Vec<usize>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            scratch: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let mut cur_fg: Option<Option<Color>> = None;
        let mut cur_bold: Option<bool> = None;

        if frame.is_dirty_all() {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..frame.width {
                    let idx = y as usize * frame.width as usize + x as usize;
                    let g = frame.glyph_at_index(idx);
                    self.apply_style(g.fg, g.bold, &mut cur_fg, &mut cur_bold)?;
                    self.stdout.queue(Print(g.ch))?;
                }
            }
        } else {
            self.scratch.clear();
            self.scratch.extend_from_slice(frame.dirty_indices());
            self.scratch.sort_unstable();

            let width = frame.width as usize;
            let mut cur_pos: Option<(u16, u16)> = None;
            for i in 0..self.scratch.len() {
                let idx = self.scratch[i];
                let x = (idx % width) as u16;
                let y = (idx / width) as u16;
                if y >= frame.height {
                    continue;
                }
                if cur_pos != Some((x, y)) {
                    self.stdout.queue(cursor::MoveTo(x, y))?;
                }
                let g = frame.glyph_at_index(idx);
                self.apply_style(g.fg, g.bold, &mut cur_fg, &mut cur_bold)?;
                self.stdout.queue(Print(g.ch))?;
                cur_pos = if x + 1 < frame.width {
                    Some((x + 1, y))
                } else {
                    None
                };
            }
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn apply_style(
        &mut self,
        fg: Option<Color>,
        bold: bool,
        cur_fg: &mut Option<Option<Color>>,
        cur_bold: &mut Option<bool>,
    ) -> Result<()> {
        if *cur_fg != Some(fg) {
            self.stdout
                .queue(SetForegroundColor(fg.unwrap_or(Color::Reset)))?;
            *cur_fg = Some(fg);
        }
        if *cur_bold != Some(bold) {
            self.stdout.queue(SetAttribute(if bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            *cur_bold = Some(bold);
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

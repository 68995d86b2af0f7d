// Copyright (c) 2026 tendrix contributors

use crossterm::style::Color;

/// One styled character of terminal output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph {
        ch: ' ',
        fg: None,
        bold: false,
    };
}

/// A terminal-sized glyph buffer with dirty-cell tracking, so the drawer
/// only touches positions that actually changed since the last flush.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Glyph>,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Glyph::BLANK; len],
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    /// Blank every cell and schedule a full redraw.
    pub fn clear(&mut self) {
        self.cells.fill(Glyph::BLANK);
        self.mark_all_dirty();
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty_all = true;
        self.dirty.clear();
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_all = false;
            self.dirty_map.fill(false);
            self.dirty.clear();
            return;
        }
        for &i in &self.dirty {
            self.dirty_map[i] = false;
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Glyph> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn glyph_at_index(&self, i: usize) -> Glyph {
        self.cells[i]
    }

    /// Write one glyph; off-frame positions are ignored, unchanged glyphs
    /// do not dirty the cell.
    pub fn set(&mut self, x: u16, y: u16, glyph: Glyph) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i] == glyph {
            return;
        }
        self.cells[i] = glyph;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(ch: char) -> Glyph {
        Glyph {
            ch,
            fg: None,
            bold: false,
        }
    }

    #[test]
    fn set_tracks_dirty_cells_once() {
        let mut f = Frame::new(4, 2);
        f.clear_dirty();
        f.set(1, 0, glyph('a'));
        f.set(1, 0, glyph('a'));
        f.set(3, 1, glyph('b'));
        assert_eq!(f.dirty_indices(), &[1, 7]);
        f.clear_dirty();
        assert!(f.dirty_indices().is_empty());
    }

    #[test]
    fn off_frame_writes_are_ignored() {
        let mut f = Frame::new(2, 2);
        f.clear_dirty();
        f.set(2, 0, glyph('x'));
        f.set(0, 2, glyph('x'));
        assert!(f.dirty_indices().is_empty());
    }

    #[test]
    fn clear_blanks_cells_and_marks_everything_dirty() {
        let mut f = Frame::new(2, 2);
        f.clear_dirty();
        f.set(0, 0, glyph('x'));
        f.clear();
        assert!(f.is_dirty_all());
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn rewriting_the_same_glyph_after_flush_stays_clean() {
        let mut f = Frame::new(2, 1);
        f.set(0, 0, glyph('z'));
        f.clear_dirty();
        f.set(0, 0, glyph('z'));
        assert!(!f.is_dirty_all());
        assert!(f.dirty_indices().is_empty());
    }
}

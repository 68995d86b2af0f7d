// Copyright (c) 2026 tendrix contributors

use rand::Rng;

use crate::art::ArtSource;
use crate::glyphs;

/// How `display` is seeded at construction. The rain preset starts blank so
/// the figure is invisible until agents paint it; the tendrils-only preset
/// starts with faint noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedFill {
    Blank,
    Noise,
}

/// One character position of the art grid.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Character the art intends here; `' '` cells are never part of the
    /// figure and stay blank for the whole engine lifetime.
    pub original: char,
    /// Character currently shown; rewritten every tick by agents/effects.
    pub display: char,
    /// Permanently settled to `original`. Monotonic: never reverts.
    pub revealed: bool,
    /// Dwell counter toward the reveal threshold; pre-reveal only.
    pub reveal_score: u8,
    /// In the awakening flicker between threshold-crossing and settling.
    pub flickering: bool,
    /// `original` has a morph cycle (glyphs::morph_cycle).
    pub meta_active: bool,
    pub meta_cycle_index: usize,
    /// Row index, for the top-to-bottom stagger delay.
    pub line_index: usize,
    /// Rain trail fade, 0..1, decays each rain tick.
    pub rain_intensity: f32,
    /// A rain drop currently occupies this cell.
    pub is_rain_drop: bool,
    /// Reveal was caused by a rain drop rather than a tendril.
    pub rain_revealed: bool,
}

impl Cell {
    fn new(original: char, display: char, line_index: usize) -> Self {
        Self {
            original,
            display,
            revealed: false,
            reveal_score: 0,
            flickering: false,
            meta_active: glyphs::morph_cycle(original).is_some(),
            meta_cycle_index: 0,
            line_index,
            rain_intensity: 0.0,
            is_rain_drop: false,
            rain_revealed: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.original == ' '
    }
}

/// Fixed-size rectangular cell buffer. Built once per engine lifetime and
/// never resized; all access is bounds-checked and out-of-range lookups
/// resolve to `None` so agents can step past the edges freely.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    non_blank: usize,
}

impl Grid {
    pub fn from_art(art: &ArtSource, fill: SeedFill, rng: &mut impl Rng) -> Self {
        let width = art.width();
        let height = art.height();
        let mut cells = Vec::with_capacity(width * height);
        let mut non_blank = 0;

        for y in 0..height {
            for x in 0..width {
                let original = art.char_at(x, y);
                let display = if original == ' ' {
                    ' '
                } else {
                    non_blank += 1;
                    match fill {
                        SeedFill::Blank => ' ',
                        SeedFill::Noise => glyphs::pick(rng, glyphs::NOISE),
                    }
                };
                cells.push(Cell::new(original, display, y));
            }
        }

        Self {
            width,
            height,
            cells,
            non_blank,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn index(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn get(&self, x: isize, y: isize) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: isize, y: isize) -> Option<&mut Cell> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    /// Count of cells that belong to the figure.
    pub fn non_blank_total(&self) -> usize {
        self.non_blank
    }

    pub fn revealed_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| !c.is_blank() && c.revealed)
            .count()
    }

    /// Fraction of the figure that has settled, 0..1. A figure with no
    /// non-blank cells counts as fully formed.
    pub fn formation_progress(&self) -> f32 {
        if self.non_blank == 0 {
            return 1.0;
        }
        self.revealed_count() as f32 / self.non_blank as f32
    }

    pub fn all_revealed(&self) -> bool {
        self.cells.iter().all(|c| c.is_blank() || c.revealed)
    }

    /// Per-column weight in [0, 1], proportional to the column's non-blank
    /// count, normalized to sum to 1. An all-blank grid keeps the raw zero
    /// weights; `pick_weighted_column` falls back to the last column then.
    pub fn column_weights(&self) -> Vec<f32> {
        if self.is_degenerate() {
            return Vec::new();
        }
        let mut weights = vec![0.0f32; self.width];
        for (i, cell) in self.cells.iter().enumerate() {
            if !cell.is_blank() {
                weights[i % self.width] += 1.0;
            }
        }
        let total: f32 = weights.iter().sum();
        if total > 0.0 {
            for w in &mut weights {
                *w /= total;
            }
        }
        weights
    }

    /// Display characters, row-joined with newlines.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..self.width {
                out.push(self.cells[y * self.width + x].display);
            }
        }
        out
    }
}

/// Weighted random column selection; prefers columns with more symbols.
pub fn pick_weighted_column(weights: &[f32], rng: &mut impl Rng) -> usize {
    let roll: f32 = rng.random();
    let mut cumulative = 0.0f32;
    for (x, w) in weights.iter().enumerate() {
        cumulative += w;
        if roll <= cumulative {
            return x;
        }
    }
    weights.len().saturating_sub(1)
}

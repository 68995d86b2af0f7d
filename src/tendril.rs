// Copyright (c) 2026 tendrix contributors

use std::time::{Duration, Instant};

use rand::Rng;

use crate::engine::EngineConfig;
use crate::glyphs;
use crate::grid::Grid;

/// The 8 compass directions a tendril can travel.
const DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// A flicker completion scheduled for a later tick. The engine owns these;
/// dropping the engine discards them, so no completion can outlive the grid.
#[derive(Clone, Copy, Debug)]
pub struct PendingReveal {
    pub x: isize,
    pub y: isize,
    pub due: Instant,
}

/// A transient walker that reveals cells by dwelling on them. Spawned on a
/// random grid edge heading inward; clipped to bounds rather than removed
/// when it hits an edge, and retired when its life runs out.
#[derive(Clone, Debug)]
pub struct Tendril {
    pub x: isize,
    pub y: isize,
    dx: isize,
    dy: isize,
    pub life: i32,
    pub glyph: char,
    trail: Vec<(isize, isize)>,
}

impl Tendril {
    pub fn spawn(width: usize, height: usize, cfg: &EngineConfig, rng: &mut impl Rng) -> Self {
        let w = width as isize;
        let h = height as isize;

        let (x, y, mut dx, mut dy) = match rng.random_range(0..4u8) {
            0 => (
                rng.random_range(0..w as i64) as isize,
                0,
                rng.random_range(-1..=1i64) as isize,
                1,
            ),
            1 => (
                w - 1,
                rng.random_range(0..h as i64) as isize,
                -1,
                rng.random_range(-1..=1i64) as isize,
            ),
            2 => (
                rng.random_range(0..w as i64) as isize,
                h - 1,
                rng.random_range(-1..=1i64) as isize,
                -1,
            ),
            _ => (
                0,
                rng.random_range(0..h as i64) as isize,
                1,
                rng.random_range(-1..=1i64) as isize,
            ),
        };
        if dx == 0 && dy == 0 {
            dy = 1;
        }

        let (life_min, life_max) = cfg.tendril_life;
        Self {
            x: x.clamp(0, w - 1),
            y: y.clamp(0, h - 1),
            dx,
            dy,
            life: rng.random_range(life_min..=life_max),
            glyph: glyphs::pick(rng, glyphs::TENDRIL),
            trail: Vec::new(),
        }
    }

    pub fn expired(&self) -> bool {
        self.life <= 0
    }

    /// Advance one tick: move (or reroll direction and clamp), paint the
    /// current cell, bump its reveal score, and leave a probabilistic wake
    /// along the trail. `elapsed` is time since the reveal started and
    /// gates the per-row stagger.
    pub fn step(
        &mut self,
        grid: &mut Grid,
        elapsed: Duration,
        now: Instant,
        cfg: &EngineConfig,
        pending: &mut Vec<PendingReveal>,
        rng: &mut impl Rng,
    ) {
        let w = grid.width() as isize;
        let h = grid.height() as isize;
        let next_x = self.x + self.dx;
        let next_y = self.y + self.dy;
        self.life -= 1;

        let out = next_x < 0 || next_x >= w || next_y < 0 || next_y >= h;
        if out || rng.random::<f32>() < cfg.tendril_reroll_chance {
            let (dx, dy) = DIRECTIONS[rng.random_range(0..DIRECTIONS.len())];
            self.dx = dx;
            self.dy = dy;
            self.x = self.x.clamp(0, w - 1);
            self.y = self.y.clamp(0, h - 1);
        } else {
            self.x = next_x;
            self.y = next_y;
        }

        if rng.random::<f32>() < cfg.tendril_glyph_reroll {
            self.glyph = glyphs::pick(rng, glyphs::TENDRIL);
        }

        self.trail.push((self.x, self.y));
        if self.trail.len() > cfg.trail_len {
            self.trail.remove(0);
        }

        self.visit(grid, elapsed, now, cfg, pending, rng);
        self.wake(grid, cfg, rng);
    }

    fn visit(
        &self,
        grid: &mut Grid,
        elapsed: Duration,
        now: Instant,
        cfg: &EngineConfig,
        pending: &mut Vec<PendingReveal>,
        rng: &mut impl Rng,
    ) {
        let glyph = self.glyph;
        let flicker_glyph = glyphs::pick(rng, glyphs::AWAKENING);
        let Some(cell) = grid.get_mut(self.x, self.y) else {
            return;
        };
        if cell.is_blank() || cell.revealed {
            return;
        }

        let line_delay = cfg.stagger_delay * cell.line_index as u32;
        if elapsed <= line_delay {
            return;
        }

        cell.reveal_score = (cell.reveal_score + 1).min(cfg.reveal_threshold + 2);
        if !cell.flickering {
            cell.display = glyph;
        }

        if cell.reveal_score >= cfg.reveal_threshold && !cell.flickering {
            cell.flickering = true;
            cell.display = flicker_glyph;
            pending.push(PendingReveal {
                x: self.x,
                y: self.y,
                due: now + cfg.flicker_duration,
            });
        }
    }

    /// Cosmetic wake behind the head; never touches reveal state.
    fn wake(&self, grid: &mut Grid, cfg: &EngineConfig, rng: &mut impl Rng) {
        let len = self.trail.len();
        for (i, &(tx, ty)) in self.trail.iter().enumerate() {
            let intensity = (len - i) as f32 / len as f32;
            if rng.random::<f32>() >= intensity * cfg.trail_wake_chance {
                continue;
            }
            let glyph = glyphs::pick(rng, glyphs::TENDRIL);
            if let Some(cell) = grid.get_mut(tx, ty) {
                if !cell.is_blank() && !cell.revealed && !cell.flickering {
                    cell.display = glyph;
                }
            }
        }
    }
}

// Copyright (c) 2026 tendrix contributors

use rand::Rng;

use crate::engine::RainConfig;
use crate::glyphs;
use crate::grid::{pick_weighted_column, Grid};

/// A fast vertical agent that reveals cells by passing through them. Spawned
/// above the grid (negative row) in density-weighted columns so the rain
/// falls preferentially into the figure's mass.
#[derive(Clone, Debug)]
pub struct RainDrop {
    pub x: usize,
    pub y: isize,
    pub glyph: char,
    pub life: i32,
    trail: Vec<(usize, isize)>,
}

impl RainDrop {
    fn spawn(x: usize, y: isize, cfg: &RainConfig, rng: &mut impl Rng) -> Self {
        let (life_min, life_max) = cfg.drop_life;
        Self {
            x,
            y,
            glyph: glyphs::pick(rng, glyphs::RAIN),
            life: rng.random_range(life_min..=life_max),
            trail: Vec::new(),
        }
    }
}

/// The rain reveal phase: drop population, per-column weights, and the
/// modulo speed gate.
#[derive(Clone, Debug)]
pub struct RainSystem {
    drops: Vec<RainDrop>,
    weights: Vec<f32>,
    frame_counter: u64,
}

impl RainSystem {
    pub fn new(grid: &Grid) -> Self {
        Self {
            drops: Vec::new(),
            weights: grid.column_weights(),
            frame_counter: 0,
        }
    }

    pub fn drops(&self) -> &[RainDrop] {
        &self.drops
    }

    pub fn len(&self) -> usize {
        self.drops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    pub fn clear(&mut self) {
        self.drops.clear();
    }

    /// Glyph of the drop occupying (x, y), if any. Used by the render
    /// composition to overlay falling characters.
    pub fn glyph_at(&self, x: usize, y: isize) -> Option<char> {
        self.drops
            .iter()
            .find(|d| d.x == x && d.y == y)
            .map(|d| d.glyph)
    }

    /// Initial population: a density-derived number of weighted columns,
    /// each seeded with 2-3 drops at staggered heights above the grid.
    pub fn seed(&mut self, grid: &Grid, cfg: &RainConfig, rng: &mut impl Rng) {
        self.drops.clear();
        if grid.is_degenerate() {
            return;
        }

        let columns = (grid.width() as f32 * cfg.initial_density) as usize;
        let (per_min, per_max) = cfg.drops_per_column;
        for _ in 0..columns {
            let x = pick_weighted_column(&self.weights, rng);
            let per_column = rng.random_range(per_min..=per_max);
            for j in 0..per_column {
                let lo = 1 + j as i64 * 4;
                let hi = 6 + j as i64 * 4;
                let y = -rng.random_range(lo..=hi) as isize;
                self.drops.push(RainDrop::spawn(x, y, cfg, rng));
            }
        }
    }

    /// One rain tick: fade trails, advance drops (revealing cells they pass
    /// through), prune dead and off-grid drops, mark occupancy, and top the
    /// population up. `progress` is last tick's formation progress and
    /// controls the spawn taper.
    pub fn update(&mut self, grid: &mut Grid, cfg: &RainConfig, progress: f32, rng: &mut impl Rng) {
        self.frame_counter += 1;
        if cfg.speed_divisor > 1 && self.frame_counter % cfg.speed_divisor != 0 {
            return;
        }

        for cell in grid.cells_mut() {
            cell.is_rain_drop = false;
            cell.rain_intensity = (cell.rain_intensity - cfg.intensity_fade).max(0.0);
        }

        let height = grid.height() as isize;
        for drop in &mut self.drops {
            if drop.y >= 0 {
                drop.trail.push((drop.x, drop.y));
                if drop.trail.len() > cfg.trail_len {
                    drop.trail.remove(0);
                }
            }

            // Reveal everything the drop passes through on its way down.
            for step in 1..=cfg.drop_step {
                let check_y = drop.y + step as isize;
                if check_y < 0 || check_y >= height {
                    continue;
                }
                let reveal = rng.random::<f32>() < cfg.reveal_chance;
                if let Some(cell) = grid.get_mut(drop.x as isize, check_y) {
                    if !cell.is_blank() && !cell.revealed && reveal {
                        cell.revealed = true;
                        cell.rain_revealed = true;
                        cell.display = cell.original;
                    }
                }
            }

            drop.y += cfg.drop_step as isize;
            drop.life -= 1;

            if rng.random::<f32>() < cfg.glyph_reroll {
                drop.glyph = glyphs::pick(rng, glyphs::RAIN);
            }
        }

        let horizon = height + cfg.trail_len as isize;
        self.drops.retain(|d| d.life > 0 && d.y < horizon);

        for drop in &self.drops {
            let reveal = rng.random::<f32>() < cfg.reveal_chance;
            if let Some(cell) = grid.get_mut(drop.x as isize, drop.y) {
                cell.is_rain_drop = true;
                cell.rain_intensity = 1.0;
                if !cell.is_blank() && !cell.revealed && reveal {
                    cell.revealed = true;
                    cell.rain_revealed = true;
                    cell.display = cell.original;
                }
            }

            let len = drop.trail.len();
            for (i, &(tx, ty)) in drop.trail.iter().enumerate() {
                if let Some(cell) = grid.get_mut(tx as isize, ty) {
                    let intensity = (len - i) as f32 / len as f32 * 0.5;
                    cell.rain_intensity = cell.rain_intensity.max(intensity);
                }
            }
        }

        // Spawn harder while the figure is still mostly unformed.
        let early = progress < 0.6;
        let spawn_chance = if early { 0.6 } else { 0.3 };
        let cap = grid.width() as f32 * cfg.initial_density * if early { 3.5 } else { 2.0 };
        if rng.random::<f32>() < spawn_chance && (self.drops.len() as f32) < cap {
            let x = pick_weighted_column(&self.weights, rng);
            let y = -rng.random_range(1..=3i64) as isize;
            self.drops.push(RainDrop::spawn(x, y, cfg, rng));
        }
    }
}

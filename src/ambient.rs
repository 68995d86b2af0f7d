// Copyright (c) 2026 tendrix contributors

use std::time::Instant;

use rand::Rng;

use crate::engine::EngineConfig;
use crate::glyphs;
use crate::grid::Grid;

/// A circular wave of glyph perturbation emanating from a point. Lives for
/// a fixed duration from its start time.
#[derive(Clone, Copy, Debug)]
pub struct Ripple {
    pub x: usize,
    pub y: usize,
    pub started: Instant,
    pub max_radius: f32,
    pub strength: f32,
}

/// Post-reveal modulation of `display`: metamorphosis cycling, a sine
/// respiration wave, and ripples. Never touches `original` or `revealed`.
#[derive(Clone, Debug)]
pub struct AmbientLayer {
    respiration: f32,
    ripples: Vec<Ripple>,
}

impl AmbientLayer {
    pub fn new() -> Self {
        Self {
            respiration: 0.0,
            ripples: Vec::new(),
        }
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    pub fn update(&mut self, grid: &mut Grid, now: Instant, cfg: &EngineConfig, rng: &mut impl Rng) {
        if grid.is_degenerate() {
            return;
        }

        self.respiration += cfg.respiration_speed * cfg.speed;

        if rng.random::<f32>() < cfg.ripple_chance * cfg.speed && self.ripples.len() < cfg.ripple_max
        {
            self.ripples.push(Ripple {
                x: rng.random_range(0..grid.width()),
                y: rng.random_range(0..grid.height()),
                started: now,
                max_radius: grid.width().max(grid.height()) as f32 / 3.0,
                strength: 0.6 + rng.random::<f32>() * 0.4,
            });
        }
        self.ripples
            .retain(|r| now.duration_since(r.started) < cfg.ripple_duration);

        let width = grid.width();
        let height = grid.height();
        let ripple_duration = cfg.ripple_duration.as_secs_f32();

        for y in 0..height {
            for x in 0..width {
                // One RNG draw per position regardless of cell state, so a
                // run's sequence does not depend on what is revealed.
                let advance = rng.random::<f32>() < cfg.morph_chance;
                let ripple_glyph = glyphs::pick_ripple(rng);

                let respiration = self.respiration;
                let ripples = &self.ripples;
                let Some(cell) = grid.get_mut(x as isize, y as isize) else {
                    continue;
                };
                if cell.is_blank() {
                    continue;
                }

                let mut shown = cell.original;

                if cell.meta_active {
                    if let Some(cycle) = glyphs::morph_cycle(cell.original) {
                        if advance {
                            cell.meta_cycle_index = (cell.meta_cycle_index + 1) % cycle.len();
                        }
                        shown = cycle[cell.meta_cycle_index];
                    }
                }

                let wave = (respiration + y as f32 * 0.15 + x as f32 * 0.08).sin();
                if wave > 0.7 {
                    if let Some(cycle) =
                        glyphs::morph_cycle(shown).or_else(|| glyphs::morph_cycle(cell.original))
                    {
                        shown = cycle[1.min(cycle.len() - 1)];
                    }
                }

                for ripple in ripples {
                    let dx = x as f32 - ripple.x as f32;
                    let dy = y as f32 - ripple.y as f32;
                    let dist = (dx * dx + dy * dy).sqrt();
                    let progress =
                        now.duration_since(ripple.started).as_secs_f32() / ripple_duration;
                    let radius = progress * ripple.max_radius;
                    let band = 2.5 * ripple.strength;

                    if dist > radius - band && dist < radius + band {
                        let intensity = 1.0 - (dist - radius).abs() / band;
                        if intensity > 0.3 {
                            shown = ripple_glyph;
                        }
                        break;
                    }
                }

                cell.display = shown;
            }
        }
    }
}

impl Default for AmbientLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art::ArtSource;
    use crate::engine::EngineConfig;
    use crate::grid::SeedFill;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn revealed_grid(text: &str) -> (Grid, StdRng) {
        let mut rng = StdRng::seed_from_u64(31);
        let mut grid = Grid::from_art(&ArtSource::parse(text), SeedFill::Blank, &mut rng);
        for cell in grid.cells_mut() {
            if !cell.is_blank() {
                cell.revealed = true;
                cell.display = cell.original;
            }
        }
        (grid, rng)
    }

    #[test]
    fn never_mutates_original_or_revealed() {
        let (mut grid, mut rng) = revealed_grid(".+=:\n-><.");
        let originals: Vec<char> = grid.cells().map(|c| c.original).collect();
        let mut layer = AmbientLayer::new();
        let mut cfg = EngineConfig::two_phase();
        cfg.ripple_chance = 1.0;
        let start = Instant::now();
        for i in 0..200 {
            let now = start + Duration::from_millis(i * 40);
            layer.update(&mut grid, now, &cfg, &mut rng);
        }
        let after: Vec<char> = grid.cells().map(|c| c.original).collect();
        assert_eq!(originals, after);
        assert!(grid.cells().all(|c| c.is_blank() || c.revealed));
    }

    #[test]
    fn blank_cells_always_display_blank() {
        let (mut grid, mut rng) = revealed_grid(". .\n . ");
        let mut layer = AmbientLayer::new();
        let mut cfg = EngineConfig::two_phase();
        cfg.ripple_chance = 1.0;
        let start = Instant::now();
        for i in 0..100 {
            layer.update(
                &mut grid,
                start + Duration::from_millis(i * 40),
                &cfg,
                &mut rng,
            );
            for cell in grid.cells() {
                if cell.is_blank() {
                    assert_eq!(cell.display, ' ');
                }
            }
        }
    }

    #[test]
    fn ripples_spawn_capped_and_prune_after_duration() {
        let (mut grid, mut rng) = revealed_grid("....\n....\n....");
        let mut layer = AmbientLayer::new();
        let mut cfg = EngineConfig::two_phase();
        cfg.ripple_chance = 1.0;
        cfg.speed = 1.0;
        cfg.ripple_duration = Duration::from_millis(500);

        let start = Instant::now();
        layer.update(&mut grid, start, &cfg, &mut rng);
        assert_eq!(layer.ripples().len(), 1);
        let born = layer.ripples()[0].started;

        // More updates within the lifetime: capped at ripple_max.
        layer.update(&mut grid, start + Duration::from_millis(100), &cfg, &mut rng);
        layer.update(&mut grid, start + Duration::from_millis(200), &cfg, &mut rng);
        assert_eq!(layer.ripples().len(), cfg.ripple_max);
        assert!(layer.ripples().iter().any(|r| r.started == born));

        // At exactly start + duration the first ripple is pruned, not before.
        layer.update(&mut grid, start + Duration::from_millis(499), &cfg, &mut rng);
        assert!(layer.ripples().iter().any(|r| r.started == born));
        layer.update(&mut grid, start + Duration::from_millis(500), &cfg, &mut rng);
        assert!(!layer.ripples().iter().any(|r| r.started == born));
    }

    #[test]
    fn respiration_pulse_substitutes_near_start_cycle_position() {
        let (mut grid, mut rng) = revealed_grid(".");
        let mut layer = AmbientLayer::new();
        let mut cfg = EngineConfig::two_phase();
        cfg.ripple_chance = 0.0;
        cfg.morph_chance = 0.0;
        // sin(pi/2) = 1 > 0.7 for the cell at (0, 0).
        layer.respiration = std::f32::consts::FRAC_PI_2;
        cfg.respiration_speed = 0.0;
        layer.update(&mut grid, Instant::now(), &cfg, &mut rng);
        let cycle = glyphs::morph_cycle('.').unwrap();
        assert_eq!(grid.get(0, 0).unwrap().display, cycle[1]);
    }
}

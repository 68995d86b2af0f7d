// Copyright (c) 2026 tendrix contributors

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ambient::AmbientLayer;
use crate::art::ArtSource;
use crate::grid::{Grid, SeedFill};
use crate::rain::RainSystem;
use crate::tendril::{PendingReveal, Tendril};

/// Which reveal mechanism currently owns the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Matrix rain paints the bulk of the figure (two-phase preset only).
    Rain,
    /// Tendril walkers finish revealing the remainder.
    Revealing,
    /// Fully revealed; ambient effects run for the rest of the lifetime.
    Ambient,
}

/// Rain phase tunables.
#[derive(Clone, Copy, Debug)]
pub struct RainConfig {
    /// Fraction of columns seeded with drops at start.
    pub initial_density: f32,
    /// Rows a drop advances per update; every row passed gets a reveal roll.
    pub drop_step: usize,
    pub reveal_chance: f32,
    pub trail_len: usize,
    pub drop_life: (i32, i32),
    /// Formation progress at which the rain phase hands over to tendrils.
    pub completion_threshold: f32,
    /// Drops move only on frames divisible by this (1 = every frame).
    pub speed_divisor: u64,
    pub drops_per_column: (u32, u32),
    pub glyph_reroll: f32,
    pub intensity_fade: f32,
}

/// All engine tunables. The two presets correspond to the two historical
/// renditions of this effect: the avatar (rain + tendrils over an invisible
/// figure) and the emblem (tendrils crawling over noise).
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub seed_fill: SeedFill,
    pub rain: Option<RainConfig>,

    pub tendril_count: usize,
    pub tendril_life: (i32, i32),
    pub tendril_reroll_chance: f32,
    pub tendril_glyph_reroll: f32,
    pub trail_len: usize,
    pub trail_wake_chance: f32,

    pub reveal_threshold: u8,
    pub flicker_duration: Duration,
    pub stagger_delay: Duration,

    pub reveal_interval: Duration,
    pub ambient_interval: Duration,
    /// Divides the step intervals and scales ambient effect rates.
    pub speed: f32,

    pub morph_chance: f32,
    pub respiration_speed: f32,
    pub ripple_chance: f32,
    pub ripple_max: usize,
    pub ripple_duration: Duration,
}

impl EngineConfig {
    /// Rain phase first, then tendrils; the figure starts invisible.
    pub fn two_phase() -> Self {
        Self {
            seed_fill: SeedFill::Blank,
            rain: Some(RainConfig {
                initial_density: 0.7,
                drop_step: 2,
                reveal_chance: 0.95,
                trail_len: 3,
                drop_life: (20, 50),
                completion_threshold: 0.8,
                speed_divisor: 1,
                drops_per_column: (2, 3),
                glyph_reroll: 0.15,
                intensity_fade: 0.15,
            }),
            tendril_count: 3,
            tendril_life: (96, 120),
            tendril_reroll_chance: 0.12,
            tendril_glyph_reroll: 0.05,
            trail_len: 3,
            trail_wake_chance: 0.2,
            reveal_threshold: 2,
            flicker_duration: Duration::from_millis(80),
            stagger_delay: Duration::from_millis(80),
            reveal_interval: Duration::from_millis(60),
            ambient_interval: Duration::from_millis(150),
            speed: 4.0,
            morph_chance: 0.008,
            respiration_speed: 0.025,
            ripple_chance: 0.015,
            ripple_max: 2,
            ripple_duration: Duration::from_millis(1000),
        }
    }

    /// Tendrils crawl over a noise-seeded figure; no rain phase.
    pub fn tendrils_only() -> Self {
        Self {
            seed_fill: SeedFill::Noise,
            rain: None,
            tendril_count: 4,
            tendril_life: (120, 150),
            stagger_delay: Duration::from_millis(100),
            reveal_interval: Duration::from_millis(50),
            ambient_interval: Duration::from_millis(120),
            ripple_chance: 0.02,
            speed: 1.0,
            ..Self::two_phase()
        }
    }
}

/// The frame-driven reveal engine. Single-threaded: all mutation happens in
/// `tick`, which self-gates on a phase-dependent interval so the visual
/// update rate is decoupled from however often the host calls it.
pub struct Engine {
    grid: Grid,
    cfg: EngineConfig,
    phase: Phase,
    tendrils: Vec<Tendril>,
    rain: RainSystem,
    ambient: AmbientLayer,
    pending: Vec<PendingReveal>,
    started: Instant,
    last_update: Option<Instant>,
    formation_progress: f32,
    rng: StdRng,
}

impl Engine {
    pub fn new(art: &ArtSource, cfg: EngineConfig, seed: u64, now: Instant) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = Grid::from_art(art, cfg.seed_fill, &mut rng);

        let mut engine = Self {
            rain: RainSystem::new(&grid),
            grid,
            cfg,
            phase: Phase::Ambient,
            tendrils: Vec::new(),
            ambient: AmbientLayer::new(),
            pending: Vec::new(),
            started: now,
            last_update: None,
            formation_progress: 0.0,
            rng,
        };

        engine.formation_progress = engine.grid.formation_progress();

        // A figure with nothing to reveal is complete from the start and
        // never gets agents.
        if engine.grid.is_degenerate() || engine.grid.all_revealed() {
            return engine;
        }

        if let Some(rain_cfg) = engine.cfg.rain {
            engine.phase = Phase::Rain;
            engine.rain.seed(&engine.grid, &rain_cfg, &mut engine.rng);
        } else {
            engine.phase = Phase::Revealing;
            engine.spawn_tendrils();
        }
        engine
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn formation_progress(&self) -> f32 {
        self.formation_progress
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Ambient
    }

    pub fn tendril_count(&self) -> usize {
        self.tendrils.len()
    }

    pub fn rain_drop_count(&self) -> usize {
        self.rain.len()
    }

    /// Glyph to show at (x, y) instead of the cell's display: a rain drop
    /// passing over a not-yet-revealed cell. Render-only; never stored in
    /// the cell, so blank cells stay blank underneath.
    pub fn overlay_glyph(&self, x: usize, y: usize) -> Option<char> {
        if self.phase != Phase::Rain {
            return None;
        }
        let cell = self.grid.get(x as isize, y as isize)?;
        if cell.is_rain_drop && !cell.revealed {
            self.rain.glyph_at(x, y as isize)
        } else {
            None
        }
    }

    /// Current picture, row-joined, with the rain overlay applied.
    pub fn to_text(&self) -> String {
        let w = self.grid.width();
        let h = self.grid.height();
        let mut out = String::with_capacity((w + 1) * h);
        for y in 0..h {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..w {
                let shown = self
                    .overlay_glyph(x, y)
                    .or_else(|| self.grid.get(x as isize, y as isize).map(|c| c.display))
                    .unwrap_or(' ');
                out.push(shown);
            }
        }
        out
    }

    /// Advance the animation if the phase interval has elapsed. Returns
    /// true when state changed and a redraw is worthwhile. Skips all work
    /// while the host reports itself invisible.
    pub fn tick(&mut self, now: Instant, visible: bool) -> bool {
        if self.grid.is_degenerate() {
            return false;
        }

        let interval = self.step_interval();
        match self.last_update {
            None => {
                self.last_update = Some(now);
                return false;
            }
            Some(last) => {
                if now.saturating_duration_since(last) < interval {
                    return false;
                }
            }
        }
        self.last_update = Some(now);

        if !visible {
            return false;
        }

        self.complete_due_flickers(now);

        match self.phase {
            Phase::Rain => self.update_rain(),
            Phase::Revealing => self.update_revealing(now),
            Phase::Ambient => {
                self.ambient
                    .update(&mut self.grid, now, &self.cfg, &mut self.rng)
            }
        }
        true
    }

    fn step_interval(&self) -> Duration {
        let base = if self.phase == Phase::Ambient {
            self.cfg.ambient_interval
        } else {
            self.cfg.reveal_interval
        };
        base.div_f32(self.cfg.speed.max(0.001))
    }

    fn spawn_tendrils(&mut self) {
        while self.tendrils.len() < self.cfg.tendril_count {
            self.tendrils.push(Tendril::spawn(
                self.grid.width(),
                self.grid.height(),
                &self.cfg,
                &mut self.rng,
            ));
        }
    }

    /// Drain scheduled flicker completions whose time has come. Guarded by
    /// the cell lookup and idempotent against repeat visits, so each cell
    /// settles exactly once.
    fn complete_due_flickers(&mut self, now: Instant) {
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due > now {
                i += 1;
                continue;
            }
            let p = self.pending.swap_remove(i);
            if let Some(cell) = self.grid.get_mut(p.x, p.y) {
                if !cell.is_blank() {
                    cell.revealed = true;
                    cell.display = cell.original;
                    cell.flickering = false;
                }
            }
        }
    }

    fn update_rain(&mut self) {
        let Some(rain_cfg) = self.cfg.rain else {
            // No rain config means this phase cannot run; fall through.
            self.phase = Phase::Revealing;
            self.spawn_tendrils();
            return;
        };

        let progress = self.formation_progress;
        self.rain
            .update(&mut self.grid, &rain_cfg, progress, &mut self.rng);
        self.formation_progress = self.grid.formation_progress();

        if self.formation_progress >= rain_cfg.completion_threshold {
            self.rain.clear();
            self.phase = Phase::Revealing;
            self.spawn_tendrils();
        }
    }

    fn update_revealing(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.started);

        for t in &mut self.tendrils {
            t.step(
                &mut self.grid,
                elapsed,
                now,
                &self.cfg,
                &mut self.pending,
                &mut self.rng,
            );
        }
        self.tendrils.retain(|t| !t.expired());

        self.formation_progress = self.grid.formation_progress();
        if self.grid.all_revealed() && self.pending.is_empty() {
            self.phase = Phase::Ambient;
            self.tendrils.clear();
            return;
        }

        self.spawn_tendrils();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art::ArtSource;
    use std::time::Duration;

    const PLUS: &str = "  X  \n X X \n  X  ";

    fn run(engine: &mut Engine, start: Instant, ticks: u64, step_ms: u64) -> Instant {
        let mut now = start;
        for _ in 0..ticks {
            now += Duration::from_millis(step_ms);
            engine.tick(now, true);
        }
        now
    }

    fn fast_cfg() -> EngineConfig {
        let mut cfg = EngineConfig::tendrils_only();
        cfg.stagger_delay = Duration::ZERO;
        cfg.flicker_duration = Duration::from_millis(1);
        cfg
    }

    #[test]
    fn plus_shape_reveals_completely_with_a_single_tendril() {
        let start = Instant::now();
        let mut cfg = fast_cfg();
        cfg.tendril_count = 1;
        let mut engine = Engine::new(&ArtSource::parse(PLUS), cfg, 5, start);

        let mut ticks_needed = None;
        let mut now = start;
        for i in 0..50_000u64 {
            now += Duration::from_millis(60);
            engine.tick(now, true);
            if engine.is_complete() {
                ticks_needed = Some(i);
                break;
            }
        }
        assert!(ticks_needed.is_some(), "reveal never completed");
        assert!(engine.grid().all_revealed());
        for cell in engine.grid().cells() {
            if cell.is_blank() {
                assert_eq!(cell.display, ' ');
                assert!(!cell.revealed);
            } else {
                assert_eq!(cell.display, cell.original);
            }
        }
    }

    #[test]
    fn revealed_is_monotonic_across_the_whole_run() {
        let start = Instant::now();
        let mut engine = Engine::new(&ArtSource::parse(PLUS), fast_cfg(), 9, start);
        let mut seen = vec![false; 15];
        let mut now = start;
        for _ in 0..20_000u64 {
            now += Duration::from_millis(60);
            engine.tick(now, true);
            for (i, cell) in engine.grid().cells().enumerate() {
                if seen[i] {
                    assert!(cell.revealed, "cell {i} reverted");
                }
                seen[i] = cell.revealed;
            }
            if engine.is_complete() {
                break;
            }
        }
        assert!(engine.is_complete());
        // Stays complete through the ambient phase.
        run(&mut engine, now, 500, 150);
        assert!(engine.grid().all_revealed());
    }

    #[test]
    fn all_space_art_is_complete_at_construction_and_spawns_nothing() {
        let start = Instant::now();
        let art = ArtSource::parse("     \n     \n     ");
        let mut engine = Engine::new(&art, EngineConfig::two_phase(), 1, start);
        assert!(engine.is_complete());
        assert_eq!(engine.tendril_count(), 0);
        assert_eq!(engine.rain_drop_count(), 0);
        run(&mut engine, start, 200, 150);
        assert_eq!(engine.tendril_count(), 0);
        assert_eq!(engine.rain_drop_count(), 0);
    }

    #[test]
    fn empty_art_never_ticks() {
        let start = Instant::now();
        let art = ArtSource::parse("\n\n");
        let mut engine = Engine::new(&art, EngineConfig::two_phase(), 1, start);
        assert!(!engine.tick(start + Duration::from_secs(1), true));
    }

    #[test]
    fn rain_phase_hands_over_exactly_at_the_threshold() {
        let start = Instant::now();
        let mut cfg = EngineConfig::two_phase();
        cfg.stagger_delay = Duration::ZERO;
        cfg.flicker_duration = Duration::from_millis(1);
        let threshold = cfg.rain.unwrap().completion_threshold;

        let art = ArtSource::parse("@@@@@@@@\n@@@@@@@@\n@@@@@@@@\n@@@@@@@@");
        let mut engine = Engine::new(&art, cfg, 17, start);
        assert_eq!(engine.phase(), Phase::Rain);

        let mut now = start;
        let mut handover_progress = None;
        for _ in 0..100_000u64 {
            now += Duration::from_millis(15);
            let before = engine.phase();
            engine.tick(now, true);
            if before == Phase::Rain && engine.phase() != Phase::Rain {
                handover_progress = Some(engine.formation_progress());
                break;
            }
            // While the rain phase runs, progress stays below the threshold.
            if engine.phase() == Phase::Rain {
                assert!(engine.formation_progress() < threshold);
            }
        }
        let progress = handover_progress.expect("rain phase never completed");
        assert!(progress >= threshold);
        assert_eq!(engine.rain_drop_count(), 0);
        assert!(engine.tendril_count() > 0);

        // And the rest of the reveal completes under the tendrils.
        for _ in 0..100_000u64 {
            now += Duration::from_millis(15);
            engine.tick(now, true);
            if engine.is_complete() {
                break;
            }
        }
        assert!(engine.is_complete());
    }

    #[test]
    fn flicker_settles_exactly_once_despite_repeat_visits() {
        let start = Instant::now();
        let mut cfg = fast_cfg();
        cfg.flicker_duration = Duration::from_secs(3600);
        cfg.tendril_count = 2;
        // A 1x1 figure pins every tendril onto the same cell.
        let mut engine = Engine::new(&ArtSource::parse("X"), cfg, 2, start);

        let mut now = start;
        for _ in 0..200u64 {
            now += Duration::from_millis(60);
            engine.tick(now, true);
        }
        let cell = engine.grid().get(0, 0).unwrap();
        assert!(cell.flickering);
        assert!(!cell.revealed);
        assert_eq!(engine.pending.len(), 1);

        // Once the timer fires the cell settles and the engine completes.
        now += Duration::from_secs(7200);
        engine.tick(now, true);
        now += Duration::from_millis(200);
        engine.tick(now, true);
        assert!(engine.grid().get(0, 0).unwrap().revealed);
        assert!(engine.is_complete());
        assert!(engine.pending.is_empty());
    }

    #[test]
    fn invisible_host_freezes_the_animation() {
        let start = Instant::now();
        let mut engine = Engine::new(&ArtSource::parse(PLUS), fast_cfg(), 3, start);
        let mut now = start;
        for _ in 0..5_000u64 {
            now += Duration::from_millis(60);
            assert!(!engine.tick(now, false));
        }
        assert!(!engine.is_complete());
        assert_eq!(engine.grid().revealed_count(), 0);
    }

    #[test]
    fn ambient_phase_only_rewrites_display() {
        let start = Instant::now();
        let mut engine = Engine::new(&ArtSource::parse(".+=.\n-><:"), fast_cfg(), 13, start);
        let mut now = start;
        for _ in 0..50_000u64 {
            now += Duration::from_millis(60);
            engine.tick(now, true);
            if engine.is_complete() {
                break;
            }
        }
        assert!(engine.is_complete());
        let originals: Vec<char> = engine.grid().cells().map(|c| c.original).collect();
        run(&mut engine, now, 1_000, 150);
        let after: Vec<char> = engine.grid().cells().map(|c| c.original).collect();
        assert_eq!(originals, after);
        assert!(engine.grid().all_revealed());
    }

    #[test]
    fn to_text_has_grid_dimensions() {
        let start = Instant::now();
        let engine = Engine::new(&ArtSource::parse(PLUS), EngineConfig::two_phase(), 7, start);
        let text = engine.to_text();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.chars().count() == 5));
    }
}

// Copyright (c) 2026 tendrix contributors

mod ambient;
mod art;
mod config;
mod engine;
mod frame;
mod glyphs;
mod grid;
mod palette;
mod rain;
mod tendril;
mod terminal;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::art::ArtSource;
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_colors, print_list_presets,
    Args, Preset,
};
use crate::engine::{Engine, EngineConfig};
use crate::frame::{Frame, Glyph};
use crate::palette::{build_palette, cell_style, parse_color_scheme, ColorMode, Palette};
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn build_info() -> &'static str {
    env!("TENDRIX_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_f32_range(name: &str, v: f32, min: f32, max: f32) -> f32 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u64_range(name: &str, v: u64, min: u64, max: u64) -> u64 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            8 | 256 => ColorMode::Color256,
            24 | 32 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,8,24)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

/// Build the engine config for a preset, with CLI overrides applied.
fn engine_config(args: &Args) -> EngineConfig {
    let mut cfg = match args.preset {
        Preset::Avatar => EngineConfig::two_phase(),
        Preset::Emblem => EngineConfig::tendrils_only(),
    };

    if let Some(speed) = args.speed {
        cfg.speed = require_f32_range("--speed", speed, 0.1, 50.0);
    }
    if let Some(n) = args.tendrils {
        cfg.tendril_count = require_u64_range("--tendrils", n as u64, 1, 64) as usize;
    }
    if let Some(chance) = args.ripple_chance {
        cfg.ripple_chance = require_f32_range("--ripple-chance", chance, 0.0, 1.0);
    }
    if let Some(ms) = args.stagger_ms {
        cfg.stagger_delay = Duration::from_millis(require_u64_range("--stagger-ms", ms, 0, 5000));
    }
    if let Some(rain) = cfg.rain.as_mut() {
        if let Some(d) = args.rain_density {
            rain.initial_density = require_f32_range("--rain-density", d, 0.05, 1.0);
        }
        if let Some(t) = args.rain_threshold {
            rain.completion_threshold = require_f32_range("--rain-threshold", t, 0.1, 1.0);
        }
    } else if args.rain_density.is_some() || args.rain_threshold.is_some() {
        eprintln!("--rain-density/--rain-threshold only apply to the avatar preset");
        std::process::exit(1);
    }

    cfg
}

fn load_art(args: &Args) -> ArtSource {
    match &args.art {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => {
                let art = ArtSource::parse(&text);
                if art.is_empty() {
                    eprintln!("art file {} is empty or all blank", path.display());
                    std::process::exit(1);
                }
                art
            }
            Err(e) => {
                eprintln!("failed to read art file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => match args.preset {
            Preset::Avatar => ArtSource::parse(art::AVATAR),
            Preset::Emblem => ArtSource::parse(art::EMBLEM),
        },
    }
}

/// Paint the engine's grid centered in the frame. Unchanged cells are
/// no-ops in the frame, so only real changes reach the terminal.
fn compose(engine: &Engine, palette: &Palette, frame: &mut Frame) {
    let grid = engine.grid();
    let gw = grid.width() as u16;
    let gh = grid.height() as u16;
    let off_x = frame.width.saturating_sub(gw) / 2;
    let off_y = frame.height.saturating_sub(gh) / 2;

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let Some(cell) = grid.get(x as isize, y as isize) else {
                continue;
            };
            let ch = engine.overlay_glyph(x, y).unwrap_or(cell.display);
            let (fg, bold) = cell_style(cell, engine.phase(), palette);
            frame.set(
                off_x + x as u16,
                off_y + y as u16,
                Glyph { ch, fg, bold },
            );
        }
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches_from(env::args_os());
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.list_presets {
        print_list_presets();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let duration_s = args.duration.map(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        if s > 0.0 {
            return require_f64_range("--duration", s, 0.1, 86400.0);
        }
        s
    });

    let color_scheme = match parse_color_scheme(&args.color) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let color_mode = detect_color_mode(&args);
    let palette = build_palette(color_scheme, color_mode);

    let cfg = engine_config(&args);
    let art_source = load_art(&args);

    let mut seed = args.seed.unwrap_or_else(rand::random::<u64>);
    let start_time = Instant::now();
    let mut engine = Engine::new(&art_source, cfg, seed, start_time);

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h);

    let end_time = duration_s.and_then(|s| {
        if s <= 0.0 {
            return None;
        }
        Some(start_time + Duration::from_secs_f64(s))
    });

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut running = true;
    let mut visible = true;
    let mut paused = false;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;
        let mut restart = false;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::FocusGained => visible = true,
                    Event::FocusLost => visible = false,
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }
                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => running = false,
                            KeyCode::Char(' ') => restart = true,
                            KeyCode::Char('p') => paused = !paused,
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() || restart {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if restart {
            if args.seed.is_none() {
                seed = rand::random::<u64>();
            }
            engine = Engine::new(&art_source, cfg, seed, Instant::now());
            frame.clear();
        }

        if let Some((nw, nh)) = pending_resize {
            frame = Frame::new(nw, nh);
        }

        let changed = engine.tick(Instant::now(), visible && !paused);
        if changed || frame.is_dirty_all() {
            compose(&engine, &palette, &mut frame);
        }
        if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
            term.draw(&mut frame)?;
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    Ok(())
}

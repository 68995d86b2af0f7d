// Copyright (c) 2026 tendrix contributors

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  tendrix --preset avatar --color green --fps 60 --duration 0";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
            out.push_str(nl);
            continue;
        }

        if let Some(rest) = line.strip_prefix("  tendrix") {
            out.push_str("  \x1b[1;34mtendrix\x1b[0m");
            out.push_str(rest);
            out.push_str(nl);
            continue;
        }

        out.push_str(line);
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Invisible figure, matrix rain first, then tendril walkers.
    #[value(name = "avatar")]
    Avatar,
    /// Noise-filled figure, tendril walkers only.
    #[value(name = "emblem")]
    Emblem,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "tendrix", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        long = "art",
        value_name = "FILE",
        help_heading = "GENERAL",
        help = "ASCII art file to reveal (default: built-in art for the preset)"
    )]
    pub art: Option<PathBuf>,

    #[arg(
        short = 'p',
        long = "preset",
        default_value_t = Preset::Avatar,
        value_enum,
        help_heading = "GENERAL",
        help = "Animation preset (see --list-presets)"
    )]
    pub preset: Preset,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "RNG seed for a reproducible run (default: random)"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "green",
        help_heading = "APPEARANCE",
        help = "Color scheme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit (TERM=...256color)"
    )]
    pub colormode: Option<u16>,

    #[arg(
        short = 'S',
        long = "speed",
        help_heading = "PERFORMANCE",
        help = "Speed multiplier (min 0.1 max 50; default: preset value)"
    )]
    pub speed: Option<f32>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "tendrils",
        help_heading = "TUNING (ADVANCED)",
        help = "Concurrent tendril walkers (min 1 max 64; default: preset value)"
    )]
    pub tendrils: Option<usize>,

    #[arg(
        long = "rain-density",
        help_heading = "TUNING (ADVANCED)",
        help = "Fraction of columns seeded with rain drops (min 0.05 max 1.0; avatar preset only)"
    )]
    pub rain_density: Option<f32>,

    #[arg(
        long = "rain-threshold",
        help_heading = "TUNING (ADVANCED)",
        help = "Reveal fraction at which rain hands over to tendrils (min 0.1 max 1.0; avatar preset only)"
    )]
    pub rain_threshold: Option<f32>,

    #[arg(
        long = "ripple-chance",
        help_heading = "TUNING (ADVANCED)",
        help = "Per-step ripple spawn chance (min 0 max 1; default: preset value)"
    )]
    pub ripple_chance: Option<f32>,

    #[arg(
        long = "stagger-ms",
        help_heading = "TUNING (ADVANCED)",
        help = "Per-row reveal stagger in ms (min 0 max 5000; default: preset value)"
    )]
    pub stagger_ms: Option<u64>,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color schemes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "list-presets",
        help_heading = "HELP",
        help = "List available presets and exit"
    )]
    pub list_presets: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_list_presets() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE PRESETS:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --preset.\x1b[0m");
    } else {
        println!("AVAILABLE PRESETS:");
        println!("NOTE: Use only the VALUE (left side) with --preset.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("avatar       Invisible figure; matrix rain reveals most of it, tendrils finish");
    println!("emblem       Noise-filled figure; tendril walkers reveal it all");
}

pub fn print_list_colors() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE COLOR SCHEMES:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --color.\x1b[0m");
    } else {
        println!("AVAILABLE COLOR SCHEMES:");
        println!("NOTE: Use only the VALUE (left side) with --color.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("green        Green scheme");
    println!("cyan         Cyan scheme");
    println!("amber        Amber scheme (alias: gold)");
    println!("violet       Violet scheme (alias: purple)");
}

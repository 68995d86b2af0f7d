// Copyright (c) 2026 tendrix contributors

use crossterm::style::Color;

use crate::engine::Phase;
use crate::grid::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorScheme {
    Green,
    Cyan,
    Amber,
    Violet,
}

/// Resolved colors for the animation states. `rain_head` marks the falling
/// drop itself, `rain` a cell the rain revealed, `rain_faint` the fading
/// trail behind a drop.
#[derive(Clone, Debug)]
pub struct Palette {
    pub base: Option<Color>,
    pub dim: Option<Color>,
    pub bright: Option<Color>,
    pub rain_head: Option<Color>,
    pub rain: Option<Color>,
    pub rain_faint: Option<Color>,
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn resolve(mode: ColorMode, (r, g, b): (u8, u8, u8)) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
    }
}

pub fn build_palette(scheme: ColorScheme, mode: ColorMode) -> Palette {
    // (base, dim, bright) per scheme; the rain stays cyan everywhere,
    // matching the effect this animation imitates.
    let (base, dim, bright) = match scheme {
        ColorScheme::Green => ((0, 187, 0), (0, 95, 0), (180, 255, 180)),
        ColorScheme::Cyan => ((0, 187, 187), (0, 95, 95), (180, 255, 255)),
        ColorScheme::Amber => ((215, 155, 0), (115, 75, 0), (255, 230, 160)),
        ColorScheme::Violet => ((165, 95, 215), (85, 45, 115), (230, 190, 255)),
    };
    Palette {
        base: resolve(mode, base),
        dim: resolve(mode, dim),
        bright: resolve(mode, bright),
        rain_head: resolve(mode, (210, 255, 255)),
        rain: resolve(mode, (0, 200, 200)),
        rain_faint: resolve(mode, (0, 90, 90)),
    }
}

/// Foreground and bold for one cell in its current state.
pub fn cell_style(cell: &Cell, phase: Phase, palette: &Palette) -> (Option<Color>, bool) {
    if cell.flickering {
        return (palette.bright, true);
    }

    if phase == Phase::Rain {
        if cell.is_rain_drop && !cell.revealed {
            return (palette.rain_head, true);
        }
        if cell.revealed && cell.rain_revealed {
            return (palette.rain, false);
        }
        if cell.rain_intensity > 0.5 {
            return (palette.rain, false);
        }
        if cell.rain_intensity > 0.0 {
            return (palette.rain_faint, false);
        }
    }

    if cell.revealed {
        (palette.base, false)
    } else {
        (palette.dim, false)
    }
}

pub fn parse_color_scheme(s: &str) -> Result<ColorScheme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "green" => Ok(ColorScheme::Green),
        "cyan" => Ok(ColorScheme::Cyan),
        "amber" | "gold" => Ok(ColorScheme::Amber),
        "violet" | "purple" => Ok(ColorScheme::Violet),
        _ => Err(format!("invalid color: {} (see --list-colors)", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::art::ArtSource;
    use crate::grid::{Grid, SeedFill};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn one_cell() -> Cell {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = Grid::from_art(&ArtSource::parse("@"), SeedFill::Blank, &mut rng);
        grid.get(0, 0).unwrap().clone()
    }

    #[test]
    fn mono_mode_resolves_no_colors() {
        let p = build_palette(ColorScheme::Green, ColorMode::Mono);
        assert!(p.base.is_none() && p.rain_head.is_none());
    }

    #[test]
    fn flickering_cells_are_bright_and_bold() {
        let p = build_palette(ColorScheme::Green, ColorMode::TrueColor);
        let mut cell = one_cell();
        cell.flickering = true;
        assert_eq!(cell_style(&cell, Phase::Revealing, &p), (p.bright, true));
    }

    #[test]
    fn rain_drop_occupancy_wins_while_raining_only() {
        let p = build_palette(ColorScheme::Green, ColorMode::TrueColor);
        let mut cell = one_cell();
        cell.is_rain_drop = true;
        assert_eq!(cell_style(&cell, Phase::Rain, &p), (p.rain_head, true));
        assert_eq!(cell_style(&cell, Phase::Ambient, &p), (p.dim, false));
    }

    #[test]
    fn rain_revealed_cells_turn_base_colored_after_rain_ends() {
        let p = build_palette(ColorScheme::Green, ColorMode::TrueColor);
        let mut cell = one_cell();
        cell.revealed = true;
        cell.rain_revealed = true;
        assert_eq!(cell_style(&cell, Phase::Rain, &p), (p.rain, false));
        assert_eq!(cell_style(&cell, Phase::Ambient, &p), (p.base, false));
    }

    #[test]
    fn ansi256_endpoints() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
    }

    #[test]
    fn scheme_names_parse_with_aliases() {
        assert_eq!(parse_color_scheme("green").unwrap(), ColorScheme::Green);
        assert_eq!(parse_color_scheme("GOLD").unwrap(), ColorScheme::Amber);
        assert_eq!(parse_color_scheme("purple").unwrap(), ColorScheme::Violet);
        assert!(parse_color_scheme("plaid").is_err());
    }
}

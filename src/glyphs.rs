// Copyright (c) 2026 tendrix contributors

use rand::Rng;

/// Placeholder characters a cell may show before any agent has touched it.
pub const NOISE: &[char] = &['.', '`', '\'', ' ', '~', ','];

/// Characters painted by tendril walkers and their trails.
pub const TENDRIL: &[char] = &['*', '+', 'o', '·', '❖', '◊', '◈', '⧫'];

/// Characters shown during the brief awakening flicker before a cell settles.
pub const AWAKENING: &[char] = &['%', '&', '#', '?', '!', '▓', '▒', '█', '░', '▐'];

/// Characters carried by falling rain drops. Half-width katakana only:
/// the drawer advances one terminal column per printed glyph, so the pool
/// must never contain double-column characters.
pub const RAIN: &[char] = &[
    'ｱ', 'ｶ', 'ｻ', 'ﾀ', 'ﾅ', 'ﾊ', 'ﾏ', 'ﾔ', 'ﾗ', 'ﾜ', 'ｷ', 'ｼ', 'ﾂ', 'ﾈ', 'ﾎ',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Morph cycle for a character, if it belongs to a class that has one.
///
/// The cycle starts at the character itself; index 1 is the "near-start"
/// position used by the respiration pulse.
pub fn morph_cycle(ch: char) -> Option<&'static [char]> {
    match ch {
        '.' => Some(&['.', ':', 'o', 'O', '◯', '●', '○', 'o', ':']),
        '-' => Some(&['-', '/', '|', '\\', '—', '═', '─']),
        '+' => Some(&['+', 'x', '*', 'X', '✦', '✧', '⊕']),
        '=' => Some(&['=', '≈', '≡', '≈', '▬', '═']),
        ':' => Some(&[':', ';', '∴', ';', '⁝', '⁚']),
        '>' => Some(&['>', '}', ')', ']', '⟩', '❯']),
        '<' => Some(&['<', '{', '(', '[', '⟨', '❮']),
        _ => None,
    }
}

pub fn pick(rng: &mut impl Rng, pool: &[char]) -> char {
    if pool.is_empty() {
        return ' ';
    }
    pool[rng.random_range(0..pool.len())]
}

/// Random glyph from the combined tendril + awakening pool (ripple bands).
pub fn pick_ripple(rng: &mut impl Rng) -> char {
    let total = TENDRIL.len() + AWAKENING.len();
    let i = rng.random_range(0..total);
    if i < TENDRIL.len() {
        TENDRIL[i]
    } else {
        AWAKENING[i - TENDRIL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn morph_cycles_start_with_their_own_character() {
        for ch in ['.', '-', '+', '=', ':', '>', '<'] {
            let cycle = morph_cycle(ch).unwrap();
            assert_eq!(cycle[0], ch);
            assert!(cycle.len() >= 2);
        }
    }

    #[test]
    fn space_and_letters_have_no_cycle() {
        assert!(morph_cycle(' ').is_none());
        assert!(morph_cycle('@').is_none());
        assert!(morph_cycle('A').is_none());
    }

    #[test]
    fn rain_pool_is_single_column_only() {
        // The terminal drawer advances one column per printed glyph, so
        // full-width katakana (U+30A0..U+30FF) must never appear here;
        // only ASCII and half-width forms (U+FF61..U+FF9F) are allowed.
        for &ch in RAIN {
            let cp = ch as u32;
            assert!(
                ch.is_ascii() || (0xFF61..=0xFF9F).contains(&cp),
                "{ch:?} (U+{cp:04X}) is not a single-column glyph"
            );
        }
    }

    #[test]
    fn pick_draws_from_the_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            let ch = pick(&mut rng, TENDRIL);
            assert!(TENDRIL.contains(&ch));
        }
    }

    #[test]
    fn pick_ripple_draws_from_both_pools() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut saw_tendril = false;
        let mut saw_awakening = false;
        for _ in 0..512 {
            let ch = pick_ripple(&mut rng);
            saw_tendril |= TENDRIL.contains(&ch);
            saw_awakening |= AWAKENING.contains(&ch);
            assert!(TENDRIL.contains(&ch) || AWAKENING.contains(&ch));
        }
        assert!(saw_tendril && saw_awakening);
    }
}

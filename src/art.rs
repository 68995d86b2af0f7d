// Copyright (c) 2026 tendrix contributors

/// Default art for the two-phase (rain + tendril) preset.
pub const AVATAR: &str = include_str!("../assets/avatar.txt");

/// Smaller emblem used by the tendrils-only preset.
pub const EMBLEM: &str = include_str!("../assets/emblem.txt");

/// A block of text prepared for the engine: leading/trailing blank rows
/// trimmed, every row right-padded to the widest row.
#[derive(Clone, Debug)]
pub struct ArtSource {
    rows: Vec<Vec<char>>,
    width: usize,
    height: usize,
}

impl ArtSource {
    pub fn parse(text: &str) -> Self {
        let mut lines: Vec<&str> = text.split('\n').collect();

        while lines.first().is_some_and(|l| l.trim().is_empty()) {
            lines.remove(0);
        }
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }

        let rows: Vec<Vec<char>> = lines
            .iter()
            .map(|l| l.trim_end_matches('\r').chars().collect())
            .collect();
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let height = rows.len();

        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, ' ');
                r
            })
            .collect();

        Self {
            rows,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Character at (x, y); space for anything outside the block.
    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.rows
            .get(y)
            .and_then(|r| r.get(x))
            .copied()
            .unwrap_or(' ')
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_blank_rows_and_pads_to_max_width() {
        let art = ArtSource::parse("\n\n  X\nXXXXX\n X\n\n");
        assert_eq!(art.height(), 3);
        assert_eq!(art.width(), 5);
        for row in art.rows() {
            assert_eq!(row.len(), 5);
        }
        assert_eq!(art.char_at(2, 0), 'X');
        assert_eq!(art.char_at(4, 0), ' ');
    }

    #[test]
    fn all_blank_input_is_empty() {
        let art = ArtSource::parse("\n   \n\t\n");
        assert!(art.is_empty());
        assert_eq!(art.width(), 0);
        assert_eq!(art.height(), 0);
    }

    #[test]
    fn out_of_range_positions_read_as_space() {
        let art = ArtSource::parse("ab");
        assert_eq!(art.char_at(99, 0), ' ');
        assert_eq!(art.char_at(0, 99), ' ');
    }

    #[test]
    fn windows_line_endings_do_not_widen_rows() {
        let art = ArtSource::parse("ab\r\ncd\r\n");
        assert_eq!(art.width(), 2);
        assert_eq!(art.char_at(1, 1), 'd');
    }

    #[test]
    fn embedded_art_is_non_empty() {
        assert!(!ArtSource::parse(AVATAR).is_empty());
        assert!(!ArtSource::parse(EMBLEM).is_empty());
    }
}

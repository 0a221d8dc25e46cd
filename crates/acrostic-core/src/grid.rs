// Grid geometry: positions, the lazy write cursor, and rendered grids.
//
// Text is written row-major into rows of fixed width. The cursor is lazy:
// after the last cell of a row is written it stays at `col == width`, and
// the wrap to the next row happens only when another character is written.
// A slot flagged "newline" starts at column 0 of the next row unless the
// cursor already sits at column 0.

use serde::{Deserialize, Serialize};

/// A cell coordinate in the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The cell `offset` characters after this one, wrapping at `width`.
    ///
    /// `self.col` must be below `width`.
    pub fn advance(self, offset: usize, width: usize) -> Position {
        let abs = self.col + offset;
        Position {
            row: self.row + abs / width,
            col: abs % width,
        }
    }

    /// The cell directly below this one.
    pub fn below(self) -> Position {
        Position {
            row: self.row + 1,
            col: self.col,
        }
    }
}

/// The write cursor: where the next character would go.
///
/// `col` ranges over `0..=width`; `col == width` means the current row is
/// full and the next write wraps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Cell where a slot's first character lands.
    pub fn slot_start(self, newline: bool, width: usize) -> Position {
        if (newline && self.col != 0) || self.col >= width {
            Position::new(self.row + 1, 0)
        } else {
            Position::new(self.row, self.col)
        }
    }

    /// Cursor after writing `len` characters of a slot.
    pub fn after_slot(self, newline: bool, len: usize, width: usize) -> Cursor {
        if len == 0 {
            if newline && self.col != 0 {
                return Cursor::new(self.row + 1, 0);
            }
            return self;
        }
        let last = self.slot_start(newline, width).advance(len - 1, width);
        Cursor::new(last.row, last.col + 1)
    }
}

/// A rendered arrangement: rows of characters, each at most `width` long.
///
/// A row shorter than `width` ends either at an explicit line break or at
/// the end of the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: Vec<Vec<char>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `text` starting at `start`, wrapping at `width`.
    ///
    /// Writes must be sequential: `start` must be the cell right after the
    /// last written one, or column 0 of a later row. Empty text adds no row.
    pub fn write(&mut self, start: Position, text: &[char], width: usize) {
        if text.is_empty() {
            return;
        }
        let mut pos = start;
        while self.rows.len() <= pos.row {
            self.rows.push(Vec::with_capacity(width));
        }
        for &c in text {
            if pos.col == width {
                pos = Position::new(pos.row + 1, 0);
                if self.rows.len() <= pos.row {
                    self.rows.push(Vec::with_capacity(width));
                }
            }
            let row = &mut self.rows[pos.row];
            if row.len() <= pos.col {
                row.resize(pos.col, ' ');
                row.push(c);
            } else {
                row[pos.col] = c;
            }
            pos.col += 1;
        }
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Character at a cell, if written.
    pub fn get(&self, pos: Position) -> Option<char> {
        self.rows.get(pos.row)?.get(pos.col).copied()
    }

    /// Row `index` as a string.
    pub fn line(&self, index: usize) -> String {
        self.rows.get(index).map(|r| r.iter().collect()).unwrap_or_default()
    }

    /// All rows as strings.
    pub fn lines(&self) -> Vec<String> {
        (0..self.rows.len()).map(|i| self.line(i)).collect()
    }

    /// The characters of column `col` for rows `rows`.
    pub fn column(&self, col: usize, rows: std::ops::Range<usize>) -> Vec<Option<char>> {
        rows.map(|r| self.get(Position::new(r, col))).collect()
    }
}

impl Serialize for Grid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lines().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let lines = Vec::<String>::deserialize(deserializer)?;
        Ok(Self {
            rows: lines.into_iter().map(|l| l.chars().collect()).collect(),
        })
    }
}

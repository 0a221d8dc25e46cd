// Accepted arrangements and their provenance.

use serde::{Deserialize, Serialize};

use crate::grid::{Cursor, Grid, Position};

/// Which branch of the search placed a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// The slot supplied one or more keyword characters.
    Match,
    /// The slot was written without matching.
    Skip,
}

impl Branch {
    /// Numeric code used in rendered provenance (`0` match, `1` skip).
    pub fn code(self) -> u8 {
        match self {
            Branch::Match => 0,
            Branch::Skip => 1,
        }
    }
}

/// The variant chosen for one slot, and how it was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Choice {
    pub variant: usize,
    pub branch: Branch,
    /// Offset within the variant of the first keyword character it supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl Choice {
    pub fn matched(variant: usize, offset: usize) -> Self {
        Self {
            variant,
            branch: Branch::Match,
            offset: Some(offset),
        }
    }

    pub fn skipped(variant: usize) -> Self {
        Self {
            variant,
            branch: Branch::Skip,
            offset: None,
        }
    }
}

/// An accepted arrangement.
///
/// `choices[i]` is the choice made for slot `i` of the candidate, so the
/// choice stack identifies the result independently of discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrangeResult {
    /// Number of the candidate text sequence this result came from.
    pub candidate: usize,
    pub grid: Grid,
    /// Cursor after the last slot was written.
    pub cursor: Cursor,
    /// Cell of the last keyword character.
    pub anchor: Position,
    pub choices: Vec<Choice>,
}

impl ArrangeResult {
    /// Row holding the first keyword character.
    pub fn keyword_start_row(&self, keyword_len: usize) -> usize {
        (self.anchor.row + 1).saturating_sub(keyword_len)
    }

    /// Whether `pos` is one of the keyword cells.
    pub fn is_keyword_cell(&self, pos: Position, keyword_len: usize) -> bool {
        pos.col == self.anchor.col
            && pos.row >= self.keyword_start_row(keyword_len)
            && pos.row <= self.anchor.row
    }

    /// The characters read down the keyword column.
    pub fn vertical_reading(&self, keyword_len: usize) -> String {
        let start = self.keyword_start_row(keyword_len);
        self.grid
            .column(self.anchor.col, start..self.anchor.row + 1)
            .into_iter()
            .map(|c| c.unwrap_or(' '))
            .collect()
    }

    /// Variant indices in slot order.
    pub fn variant_stack(&self) -> Vec<usize> {
        self.choices.iter().map(|c| c.variant).collect()
    }

    /// Branch codes in slot order.
    pub fn branch_stack(&self) -> Vec<u8> {
        self.choices.iter().map(|c| c.branch.code()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ArrangeResult {
        let mut grid = Grid::new();
        let text: Vec<char> = "xCyzAwvTu".chars().collect();
        grid.write(Position::new(0, 0), &text, 3);
        ArrangeResult {
            candidate: 0,
            grid,
            cursor: Cursor::new(2, 3),
            anchor: Position::new(2, 1),
            choices: vec![Choice::matched(0, 1), Choice::skipped(2)],
        }
    }

    #[test]
    fn vertical_reading_follows_anchor_column() {
        let r = sample();
        assert_eq!(r.vertical_reading(3), "CAT");
        assert_eq!(r.keyword_start_row(3), 0);
        assert!(r.is_keyword_cell(Position::new(1, 1), 3));
        assert!(!r.is_keyword_cell(Position::new(1, 2), 3));
    }

    #[test]
    fn stacks_report_provenance() {
        let r = sample();
        assert_eq!(r.variant_stack(), vec![0, 2]);
        assert_eq!(r.branch_stack(), vec![0, 1]);
    }

    #[test]
    fn result_serializes_grid_as_lines() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["grid"][1], "zAw");
        assert_eq!(json["choices"][0]["branch"], "match");
        assert!(json["choices"][1].get("offset").is_none());
    }
}

// Subtree pruning applied before a node is expanded.

use acrostic_core::{Cursor, Position};

use super::state::{KeywordState, SearchNode};
use crate::candidate::CandidateSlot;

/// Why a node was cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prune {
    /// Too few grid rows reachable for the unmatched keyword characters.
    Capacity,
    /// Left row 0 without matching the first character.
    StartLine,
    /// Wrote past the cell the next keyword character needed.
    Overrun,
    /// No remaining slot order can supply the unmatched characters.
    Infeasible,
}

#[derive(Debug)]
pub(crate) struct Pruner {
    match_length: bool,
    keyword_len: usize,
    /// Rows reachable by writing slots `i..`: longest total text rounded up
    /// to whole rows, plus forced line breaks.
    reachable_rows: Vec<usize>,
    /// `holds[i][k]`: slot `i` has keyword character `k` in some variant.
    holds: Vec<Vec<bool>>,
}

impl Pruner {
    pub fn new(slots: &[CandidateSlot], keyword_len: usize, width: usize, match_length: bool) -> Self {
        let mut reachable_rows = vec![0; slots.len() + 1];
        let mut chars = 0;
        let mut breaks = 0;
        for i in (0..slots.len()).rev() {
            chars += slots[i].slot().max_len();
            breaks += usize::from(slots[i].newline());
            reachable_rows[i] = chars.div_ceil(width) + breaks;
        }
        let holds = slots
            .iter()
            .map(|s| (0..keyword_len).map(|k| s.slot().positions().contains(k)).collect())
            .collect();
        Self {
            match_length,
            keyword_len,
            reachable_rows,
            holds,
        }
    }

    pub fn check(&self, node: &SearchNode) -> Option<Prune> {
        let unmatched = node.state.unmatched(self.keyword_len);
        if unmatched.saturating_sub(1) > self.reachable_rows[node.slot] {
            return Some(Prune::Capacity);
        }
        match node.state {
            KeywordState::Idle if self.match_length && node.cursor.row > 0 => return Some(Prune::StartLine),
            KeywordState::Pending { anchor, .. } if passed_below(node.cursor, anchor) => {
                return Some(Prune::Overrun);
            }
            KeywordState::Finished { anchor } if self.match_length && passed_below(node.cursor, anchor) => {
                return Some(Prune::Overrun);
            }
            _ => {}
        }
        if let Some(next) = node.state.next_index() {
            if !self.feasible(node.slot, next) {
                return Some(Prune::Infeasible);
            }
        }
        None
    }

    /// Greedy check that characters `next..` can be assigned to slots
    /// `from..` in non-decreasing slot order.
    fn feasible(&self, from: usize, next: usize) -> bool {
        let mut slot = from;
        for k in next..self.keyword_len {
            while slot < self.holds.len() && !self.holds[slot][k] {
                slot += 1;
            }
            if slot == self.holds.len() {
                return false;
            }
        }
        true
    }
}

/// The cell below `anchor` lies behind `cursor`.
fn passed_below(cursor: Cursor, anchor: Position) -> bool {
    cursor.row > anchor.row + 1 || (cursor.row == anchor.row + 1 && cursor.col > anchor.col)
}

#[cfg(test)]
mod tests {
    use acrostic_core::{Keyword, PhraseSlot};

    use super::*;
    use crate::candidate::Candidate;

    fn candidate(keyword: &str, slots: &[(&[&str], bool)]) -> Candidate {
        let kw = Keyword::new(keyword).unwrap();
        Candidate::from_slots(
            1,
            slots
                .iter()
                .map(|(v, nl)| PhraseSlot::new(v, *nl, &kw).unwrap())
                .collect(),
        )
    }

    fn node(slot: usize, cursor: Cursor, state: KeywordState) -> SearchNode {
        SearchNode {
            slot,
            cursor,
            state,
            fragment: None,
            parallel_disabled: false,
        }
    }

    #[test]
    fn capacity_counts_rows_and_breaks() {
        let c = candidate("abcd", &[(&["xa"], false), (&["bcd", "b"], false), (&["d"], true)]);
        let p = Pruner::new(c.slots(), 4, 2, false);
        // Slots 1.. hold at most 4 characters (2 rows) and one break.
        assert_eq!(p.reachable_rows[1], 3);
        assert_eq!(p.reachable_rows[3], 0);
        let idle = node(3, Cursor::new(0, 0), KeywordState::Idle);
        assert_eq!(p.check(&idle), Some(Prune::Capacity));
    }

    #[test]
    fn start_line_only_with_length_matching() {
        let c = candidate("ab", &[(&["a"], false), (&["b"], false)]);
        let n = node(1, Cursor::new(1, 0), KeywordState::Idle);
        assert_eq!(Pruner::new(c.slots(), 2, 1, true).check(&n), Some(Prune::StartLine));
        // Without it the node is merely infeasible: slot 1 has no 'a'.
        assert_eq!(Pruner::new(c.slots(), 2, 1, false).check(&n), Some(Prune::Infeasible));
    }

    #[test]
    fn overrun_past_cell_below_anchor() {
        let c = candidate("ab", &[(&["a"], false), (&["xxb"], false), (&["b"], false)]);
        let p = Pruner::new(c.slots(), 2, 3, true);
        let anchor = Position::new(0, 1);
        let pending = KeywordState::Pending { anchor, next: 1 };
        assert_eq!(p.check(&node(2, Cursor::new(1, 1), pending)), None);
        assert_eq!(p.check(&node(2, Cursor::new(1, 2), pending)), Some(Prune::Overrun));
        assert_eq!(p.check(&node(2, Cursor::new(2, 0), pending)), Some(Prune::Overrun));
        // A full anchor row wraps only on the next write.
        assert_eq!(p.check(&node(2, Cursor::new(0, 3), pending)), None);
    }

    #[test]
    fn pending_overrun_without_length_matching() {
        let c = candidate("ab", &[(&["a"], false), (&["xxb"], false), (&["b"], false)]);
        let p = Pruner::new(c.slots(), 2, 3, false);
        let anchor = Position::new(1, 1);
        let pending = KeywordState::Pending { anchor, next: 1 };
        assert_eq!(p.check(&node(2, Cursor::new(2, 1), pending)), None);
        assert_eq!(p.check(&node(2, Cursor::new(2, 2), pending)), Some(Prune::Overrun));
        assert_eq!(p.check(&node(2, Cursor::new(3, 0), pending)), Some(Prune::Overrun));
        // A finished keyword may be followed by anything.
        let finished = KeywordState::Finished { anchor };
        assert_eq!(p.check(&node(2, Cursor::new(3, 0), finished)), None);
    }

    #[test]
    fn feasibility_allows_one_slot_to_supply_several_characters() {
        let c = candidate("abc", &[(&["ab"], false), (&["c"], false)]);
        let p = Pruner::new(c.slots(), 3, 10, false);
        assert!(p.feasible(0, 0));
        assert!(!p.feasible(1, 0));
        assert!(p.feasible(1, 2));
    }
}

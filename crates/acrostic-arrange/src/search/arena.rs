// Path arena: the text written along the current search path.
//
// Each placed slot adds one fragment pointing at its parent. Backtracking
// truncates the arena, so it never holds more than one fragment per slot
// of the path being explored. Grids are rebuilt from the fragment chain
// only when a result is accepted.

use acrostic_core::{Choice, Grid, Position};

use crate::ArrangeError;
use crate::candidate::CandidateSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fragment {
    parent: Option<usize>,
    slot: usize,
    choice: Choice,
    start: Position,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PathArena {
    fragments: Vec<Fragment>,
}

impl PathArena {
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Record that `slot` was written with `choice` starting at `start`.
    pub fn push(&mut self, parent: Option<usize>, slot: usize, choice: Choice, start: Position) -> usize {
        self.fragments.push(Fragment {
            parent,
            slot,
            choice,
            start,
        });
        self.fragments.len() - 1
    }

    pub fn truncate(&mut self, len: usize) {
        self.fragments.truncate(len);
    }

    /// Fragments from the root down to `id`.
    fn chain(&self, id: Option<usize>) -> Vec<&Fragment> {
        let mut out = Vec::new();
        let mut cur = id;
        while let Some(i) = cur {
            let f = &self.fragments[i];
            out.push(f);
            cur = f.parent;
        }
        out.reverse();
        out
    }

    pub fn choices(&self, id: Option<usize>) -> Vec<Choice> {
        self.chain(id).into_iter().map(|f| f.choice).collect()
    }

    pub fn variant_stack(&self, id: Option<usize>) -> Vec<usize> {
        self.chain(id).into_iter().map(|f| f.choice.variant).collect()
    }

    /// Rebuild the grid written along the path ending at `id`.
    pub fn grid(&self, id: Option<usize>, slots: &[CandidateSlot], width: usize) -> Result<Grid, ArrangeError> {
        let mut grid = Grid::new();
        for f in self.chain(id) {
            let text = slots[f.slot].slot().variant(f.choice.variant)?;
            grid.write(f.start, text, width);
        }
        Ok(grid)
    }
}

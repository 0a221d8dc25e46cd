// Keyword matching state carried by every search node.

use acrostic_core::{Cursor, Position};

/// How far the keyword has been matched along the current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordState {
    /// No keyword character matched yet.
    Idle,
    /// Characters `0..next` matched; the last one sits at `anchor`, so
    /// character `next` must land directly below it.
    Pending { anchor: Position, next: usize },
    /// The whole keyword matched; the last character sits at `anchor`.
    Finished { anchor: Position },
}

impl KeywordState {
    /// Index of the keyword character to match next.
    pub fn next_index(self) -> Option<usize> {
        match self {
            KeywordState::Idle => Some(0),
            KeywordState::Pending { next, .. } => Some(next),
            KeywordState::Finished { .. } => None,
        }
    }

    pub fn anchor(self) -> Option<Position> {
        match self {
            KeywordState::Idle => None,
            KeywordState::Pending { anchor, .. } | KeywordState::Finished { anchor } => Some(anchor),
        }
    }

    /// Keyword characters still to be matched.
    pub fn unmatched(self, keyword_len: usize) -> usize {
        match self {
            KeywordState::Idle => keyword_len,
            KeywordState::Pending { next, .. } => keyword_len.saturating_sub(next),
            KeywordState::Finished { .. } => 0,
        }
    }

    /// State after matching keyword characters up to `next` with the last
    /// at `anchor`.
    pub fn advanced(anchor: Position, next: usize, keyword_len: usize) -> Self {
        if next >= keyword_len {
            KeywordState::Finished { anchor }
        } else {
            KeywordState::Pending { anchor, next }
        }
    }
}

/// One node of the depth-first search.
///
/// Nodes are small copies; the text written along the path lives in the
/// path arena and is only turned into a grid on acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchNode {
    /// Index of the next slot to place.
    pub slot: usize,
    pub cursor: Cursor,
    pub state: KeywordState,
    /// Arena fragment written by the parent, `None` at the root.
    pub fragment: Option<usize>,
    /// Set once an ancestor has fanned out to the worker pool.
    pub parallel_disabled: bool,
}

impl SearchNode {
    pub fn root() -> Self {
        Self {
            slot: 0,
            cursor: Cursor::default(),
            state: KeywordState::Idle,
            fragment: None,
            parallel_disabled: false,
        }
    }

    pub fn child(self, cursor: Cursor, state: KeywordState, fragment: usize) -> Self {
        Self {
            slot: self.slot + 1,
            cursor,
            state,
            fragment: Some(fragment),
            parallel_disabled: self.parallel_disabled,
        }
    }
}

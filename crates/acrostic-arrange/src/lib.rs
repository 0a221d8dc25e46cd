//! Arrangement search engine for acrostic text.
//!
//! Given the phrase slots of one or more sentences, the constraints on how
//! those slots may be reordered, a keyword and a render width, the engine
//! finds every way to lay variant texts into the grid so that the keyword
//! reads down a single column.
//!
//! - [`ordering`] -- valid total orders of a sentence's slots
//! - [`candidate`] -- lazy enumeration of candidate slot sequences
//! - [`search`] -- depth-first matrix search over one candidate
//! - [`sink`] -- result buffering, eviction and output writers
//! - [`progress`] -- periodic progress reporting
//! - [`arrange`] -- the [`Arranger`] tying all of the above together

pub mod arrange;
pub mod candidate;
pub mod ordering;
pub mod progress;
pub mod search;
pub mod sink;

pub use arrange::{
    ArrangeOptions, ArrangeSummary, Arranger, CandidateSummary, SentenceInput, SlotInput,
};
pub use candidate::{
    Candidate, CandidateEnumerator, CandidateSlot, CandidateTexts, OrderingFilter,
    RejectOrderings, SentenceArrangements, SlotOwnership,
};
pub use ordering::{
    CoordinateGroup, DependencyGraph, GroupMember, OrderingGenerator, SlotOrdering,
    generate_orderings,
};
pub use progress::{ProgressMonitor, ProgressReporter, ProgressSnapshot, WorkerProgress};
pub use search::{KeywordState, MatrixSearch, SearchConfig};
pub use sink::{
    CandidateCounts, CandidateHeader, MemoryLog, MemoryWriter, NullWriter, ResultSink, ResultWriter,
};

use acrostic_core::CoreError;

/// Coarse classification of [`ArrangeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid width, keyword, or index. Fails fast.
    Configuration,
    /// The ordering constraints of a sentence cannot be satisfied.
    GraphInconsistency,
    /// The result writer or worker pool failed.
    Output,
}

/// Error type for ordering generation and arrangement search.
#[derive(Debug, thiserror::Error)]
pub enum ArrangeError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The reduced dependency graph has no node without a head.
    #[error("dependency graph has no terminal slot")]
    MissingTerminal,

    /// Route merging produced no complete order.
    #[error("no valid slot ordering could be built")]
    NoOrderings,

    /// A slot was revisited within one backward route.
    #[error("dependency cycle through slot {slot}")]
    CycleDetected { slot: usize },

    #[error("slot {slot} belongs to more than one coordinate group")]
    OverlappingGroup { slot: usize },

    #[error("slot index {slot} out of range for sentence with {len} slots")]
    SlotOutOfRange { slot: usize, len: usize },

    #[error("dependency matrix row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// The dependency graph and the sentence disagree on the slot count.
    #[error("dependency graph covers {graph} slots, sentence has {slots}")]
    SlotCountMismatch { graph: usize, slots: usize },

    #[error("ordering is not a permutation of 0..{len}")]
    NotPermutation { len: usize },

    /// Some keyword character occurs in no variant of any slot.
    #[error("keyword character '{ch}' (position {index}) appears in no phrase")]
    KeywordCharacterMissing { ch: char, index: usize },

    #[error("failed to write results: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl ArrangeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArrangeError::Core(_)
            | ArrangeError::SlotOutOfRange { .. }
            | ArrangeError::NotSquare { .. }
            | ArrangeError::SlotCountMismatch { .. }
            | ArrangeError::NotPermutation { .. }
            | ArrangeError::KeywordCharacterMissing { .. } => ErrorKind::Configuration,
            ArrangeError::MissingTerminal
            | ArrangeError::NoOrderings
            | ArrangeError::CycleDetected { .. }
            | ArrangeError::OverlappingGroup { .. } => ErrorKind::GraphInconsistency,
            ArrangeError::Write(_) | ArrangeError::ThreadPool(_) => ErrorKind::Output,
        }
    }
}

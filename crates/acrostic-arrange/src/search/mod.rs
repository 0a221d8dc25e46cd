// MatrixSearch: depth-first search for keyword arrangements of one
// candidate.
//
// Slots are placed one at a time. At every node each variant of the next
// slot is tried twice: once matching the next keyword character somewhere
// in the variant, once written without a match. The keyword state moves
// Idle -> Pending -> Finished as characters land one row apart in a single
// column. Results are accepted once every slot is placed with the keyword
// finished.

mod arena;
mod prune;
mod state;
mod trial;

pub use state::KeywordState;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use acrostic_core::{ArrangeResult, Choice, Cursor, Keyword, Position, check_width};
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::ArrangeError;
use crate::candidate::Candidate;
use crate::progress::ProgressMonitor;
use crate::sink::ResultSink;
use arena::PathArena;
use prune::Pruner;
use state::SearchNode;

/// A worker publishes its variant stack once every this many nodes.
const PUBLISH_EVERY: usize = 256;

/// A worker registered with the progress monitor.
#[derive(Debug)]
struct Ticket {
    id: usize,
    visits: usize,
}

/// Search parameters fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub width: usize,
    /// Keyword character `i` must sit on row `i` and the text must end on
    /// the keyword's last row.
    pub match_length: bool,
    /// Try only one variant per length while a keyword character is pending.
    pub skip_same_length: bool,
    /// Fan out to the worker pool at wide nodes.
    pub parallel: bool,
    /// Stop after the first accepted result.
    pub single_result: bool,
}

impl SearchConfig {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            match_length: true,
            skip_same_length: true,
            parallel: false,
            single_result: false,
        }
    }
}

/// Search over one candidate.
pub struct MatrixSearch<'a> {
    candidate: &'a Candidate,
    keyword: &'a Keyword,
    config: SearchConfig,
    sink: &'a ResultSink,
    pool: Option<&'a ThreadPool>,
    progress: Option<&'a ProgressMonitor>,
    pruner: Pruner,
    stopped: AtomicBool,
    found: AtomicUsize,
}

impl<'a> MatrixSearch<'a> {
    /// Fails when `config.width` is zero.
    pub fn new(
        candidate: &'a Candidate,
        keyword: &'a Keyword,
        config: SearchConfig,
        sink: &'a ResultSink,
    ) -> Result<Self, ArrangeError> {
        check_width(config.width)?;
        let pruner = Pruner::new(
            candidate.slots(),
            keyword.len(),
            config.width,
            config.match_length,
        );
        Ok(Self {
            candidate,
            keyword,
            config,
            sink,
            pool: None,
            progress: None,
            pruner,
            stopped: AtomicBool::new(false),
            found: AtomicUsize::new(0),
        })
    }

    /// Use `pool` for fan-out when parallel search is enabled.
    pub fn with_pool(mut self, pool: Option<&'a ThreadPool>) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_progress(mut self, progress: Option<&'a ProgressMonitor>) -> Self {
        self.progress = progress;
        self
    }

    /// Run the search, pushing every accepted result into the sink.
    ///
    /// Returns the number of results accepted.
    pub fn run(&self) -> Result<usize, ArrangeError> {
        let mut ticket = self.register(format!("candidate {}", self.candidate.number()));
        let mut arena = PathArena::default();
        let out = self.visit(SearchNode::root(), &mut arena, &mut ticket);
        self.unregister(ticket);
        out?;
        Ok(self.found.load(Ordering::Acquire))
    }

    fn register(&self, name: String) -> Option<Ticket> {
        self.progress.map(|p| Ticket {
            id: p.add(name),
            visits: 0,
        })
    }

    fn unregister(&self, ticket: Option<Ticket>) {
        if let (Some(p), Some(t)) = (self.progress, ticket) {
            p.remove(t.id);
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    fn visit(&self, node: SearchNode, arena: &mut PathArena, ticket: &mut Option<Ticket>) -> Result<(), ArrangeError> {
        if self.is_stopped() {
            return Ok(());
        }
        if let (Some(p), Some(t)) = (self.progress, ticket.as_mut()) {
            if t.visits % PUBLISH_EVERY == 0 {
                p.set(t.id, arena.variant_stack(node.fragment));
            }
            t.visits += 1;
        }
        let slots = self.candidate.slots();
        if node.slot == slots.len() {
            return self.accept(node, arena);
        }
        if self.pruner.check(&node).is_some() {
            return Ok(());
        }

        let slot = &slots[node.slot];
        let start = node.cursor.slot_start(slot.newline(), self.config.width);
        let trials = trial::trial_order(
            slot.slot(),
            node.state,
            start,
            self.config.width,
            self.config.skip_same_length,
        );

        if let Some(pool) = self.fan_out_pool(&node, trials.len()) {
            return self.fan_out(pool, node, arena, &trials);
        }
        for variant in trials {
            if self.is_stopped() {
                break;
            }
            self.expand(node, variant, arena, ticket)?;
        }
        Ok(())
    }

    /// The pool to fan `node` out to, if it is wide enough and idle.
    fn fan_out_pool(&self, node: &SearchNode, width: usize) -> Option<&'a ThreadPool> {
        let pool = self.pool?;
        let fans = self.config.parallel
            && !node.parallel_disabled
            && node.state == KeywordState::Idle
            && width >= pool.current_num_threads();
        fans.then_some(pool)
    }

    /// Explore each variant's subtree on the worker pool and join.
    ///
    /// Every worker gets its own copy of the path. The first error in
    /// variant order is returned once all workers are done.
    fn fan_out(
        &self,
        pool: &ThreadPool,
        node: SearchNode,
        arena: &PathArena,
        trials: &[usize],
    ) -> Result<(), ArrangeError> {
        let node = SearchNode {
            parallel_disabled: true,
            ..node
        };
        let outcomes: Vec<Result<(), ArrangeError>> = pool.install(|| {
            trials
                .par_iter()
                .map(|&variant| {
                    if self.is_stopped() {
                        return Ok(());
                    }
                    let mut arena = arena.clone();
                    let mut ticket =
                        self.register(format!("candidate {} variant {variant}", self.candidate.number()));
                    let out = self.expand(node, variant, &mut arena, &mut ticket);
                    self.unregister(ticket);
                    out
                })
                .collect()
        });
        outcomes.into_iter().collect()
    }

    /// Try one variant of the node's slot on both branches.
    fn expand(
        &self,
        node: SearchNode,
        variant: usize,
        arena: &mut PathArena,
        ticket: &mut Option<Ticket>,
    ) -> Result<(), ArrangeError> {
        let width = self.config.width;
        let slot = &self.candidate.slots()[node.slot];
        let text = slot.slot().variant(variant)?;
        let start = node.cursor.slot_start(slot.newline(), width);
        let cursor = node.cursor.after_slot(slot.newline(), text.len(), width);
        let mark = arena.len();

        if let Some(next) = node.state.next_index() {
            for (offset, state) in self.matches(node.state, next, text, start) {
                let id = arena.push(node.fragment, node.slot, Choice::matched(variant, offset), start);
                self.visit(node.child(cursor, state, id), arena, ticket)?;
                arena.truncate(mark);
                if self.is_stopped() {
                    return Ok(());
                }
            }
        }

        let id = arena.push(node.fragment, node.slot, Choice::skipped(variant), start);
        self.visit(node.child(cursor, node.state, id), arena, ticket)?;
        arena.truncate(mark);
        Ok(())
    }

    /// Every way `text`, starting at `start`, can supply keyword character
    /// `next`, as `(offset, state after the whole variant is written)`.
    fn matches(&self, state: KeywordState, next: usize, text: &[char], start: Position) -> Vec<(usize, KeywordState)> {
        let keyword = self.keyword.chars();
        let width = self.config.width;
        let mut out = Vec::new();
        for (offset, &c) in text.iter().enumerate() {
            if c != keyword[next] {
                continue;
            }
            let pos = start.advance(offset, width);
            match state {
                KeywordState::Pending { anchor, .. } => {
                    let target = anchor.below();
                    if pos > target {
                        break;
                    }
                    if pos != target {
                        continue;
                    }
                }
                KeywordState::Idle if self.config.match_length => {
                    if pos.row > next {
                        break;
                    }
                    if pos.row < next {
                        continue;
                    }
                }
                _ => {}
            }
            if let Some(after) = self.follow(text, offset, pos, next + 1, start) {
                out.push((offset, after));
            }
        }
        out
    }

    /// Continue writing `text` past a match at `offset`.
    ///
    /// Every character landing in the keyword column below the anchor must
    /// be the next keyword character; once the keyword is complete, a
    /// further character in that column spoils a length-matched result.
    fn follow(&self, text: &[char], offset: usize, anchor: Position, next: usize, start: Position) -> Option<KeywordState> {
        let keyword = self.keyword.chars();
        let mut anchor = anchor;
        let mut next = next;
        for (j, &c) in text.iter().enumerate().skip(offset + 1) {
            let pos = start.advance(j, self.config.width);
            if pos.col != anchor.col || pos.row <= anchor.row {
                continue;
            }
            if next < keyword.len() {
                if c != keyword[next] {
                    return None;
                }
                anchor = pos;
                next += 1;
            } else if self.config.match_length {
                return None;
            }
        }
        Some(KeywordState::advanced(anchor, next, keyword.len()))
    }

    fn accept(&self, node: SearchNode, arena: &PathArena) -> Result<(), ArrangeError> {
        let KeywordState::Finished { anchor } = node.state else {
            return Ok(());
        };
        if self.config.match_length && !ends_on_keyword_row(node.cursor, anchor) {
            return Ok(());
        }
        if self.config.single_result && self.stopped.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let result = ArrangeResult {
            candidate: self.candidate.number(),
            grid: arena.grid(node.fragment, self.candidate.slots(), self.config.width)?,
            cursor: node.cursor,
            anchor,
            choices: arena.choices(node.fragment),
        };
        self.sink.push(result)?;
        self.found.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

/// With length matching, the text must end on the last keyword row, or
/// spill into the next row without reaching the keyword column.
fn ends_on_keyword_row(cursor: Cursor, anchor: Position) -> bool {
    if cursor.col >= anchor.col {
        cursor.row == anchor.row
    } else {
        cursor.row == anchor.row + 1
    }
}

// CandidateEnumerator: lazy sequence of candidate slot sequences.
//
// A candidate is one concrete linear sequence of phrase slots: every
// sentence laid out under one of its valid orderings, the sentences
// themselves in input order (or, in swap mode, in one of their
// permutations). Candidates are produced one at a time on demand, so the
// product over sentences never has to be materialized.

use std::sync::Arc;

use acrostic_core::PhraseSlot;

use crate::ArrangeError;
use crate::ordering::{
    CoordinateGroup, DependencyGraph, Permutations, SlotOrdering, factorial, generate_orderings,
};

// ---------------------------------------------------------------------------
// Ordering filters
// ---------------------------------------------------------------------------

/// Predicate dropping orderings that violate constraints known upstream
/// (anaphora, case agreement and the like).
pub trait OrderingFilter: Send + Sync {
    /// Whether `ordering` may be used.
    fn accepts(&self, ordering: &SlotOrdering) -> bool;
}

impl<F> OrderingFilter for F
where
    F: Fn(&SlotOrdering) -> bool + Send + Sync,
{
    fn accepts(&self, ordering: &SlotOrdering) -> bool {
        self(ordering)
    }
}

/// Filter built from explicit rejected orderings and forbidden
/// "`a` before `b`" pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectOrderings {
    orders: Vec<SlotOrdering>,
    forbidden: Vec<(usize, usize)>,
}

impl RejectOrderings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject exactly this ordering.
    pub fn reject(mut self, ordering: impl Into<SlotOrdering>) -> Self {
        self.orders.push(ordering.into());
        self
    }

    /// Reject every ordering placing slot `a` before slot `b`.
    pub fn forbid_before(mut self, a: usize, b: usize) -> Self {
        self.forbidden.push((a, b));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.forbidden.is_empty()
    }
}

impl OrderingFilter for RejectOrderings {
    fn accepts(&self, ordering: &SlotOrdering) -> bool {
        !self.orders.contains(ordering)
            && !self
                .forbidden
                .iter()
                .any(|&(a, b)| ordering.precedes(a, b))
    }
}

// ---------------------------------------------------------------------------
// SentenceArrangements
// ---------------------------------------------------------------------------

/// The slots of one sentence and the orderings they may take.
#[derive(Debug, Clone)]
pub struct SentenceArrangements {
    slots: Vec<Arc<PhraseSlot>>,
    orderings: Vec<SlotOrdering>,
    /// Whether the sentence starts a new output line.
    newline: bool,
}

impl SentenceArrangements {
    /// A sentence with explicit orderings.
    ///
    /// Every ordering must be a permutation of the slot indices and at
    /// least one must be given. The literal input order, when present, is
    /// moved to the front.
    pub fn new(slots: Vec<PhraseSlot>, orderings: Vec<SlotOrdering>) -> Result<Self, ArrangeError> {
        let len = slots.len();
        for ordering in &orderings {
            check_permutation(ordering, len)?;
        }
        if orderings.is_empty() {
            return Err(ArrangeError::NoOrderings);
        }
        let mut orderings = orderings;
        if let Some(literal) = orderings.iter().position(SlotOrdering::is_identity) {
            let identity = orderings.remove(literal);
            orderings.insert(0, identity);
        }
        let newline = slots.iter().any(PhraseSlot::newline);
        Ok(Self {
            slots: slots.into_iter().map(Arc::new).collect(),
            orderings,
            newline,
        })
    }

    /// A sentence laid out only in its literal order.
    pub fn literal(slots: Vec<PhraseSlot>) -> Self {
        let ordering = SlotOrdering::identity(slots.len());
        let newline = slots.iter().any(PhraseSlot::newline);
        Self {
            slots: slots.into_iter().map(Arc::new).collect(),
            orderings: vec![ordering],
            newline,
        }
    }

    /// Generate orderings from the sentence's dependency structure.
    ///
    /// Orderings refused by `filter` are dropped; if none remain the
    /// sentence is inconsistent.
    pub fn build(
        slots: Vec<PhraseSlot>,
        graph: &DependencyGraph,
        groups: &[CoordinateGroup],
        filter: Option<&dyn OrderingFilter>,
    ) -> Result<Self, ArrangeError> {
        if graph.len() != slots.len() {
            return Err(ArrangeError::SlotCountMismatch {
                graph: graph.len(),
                slots: slots.len(),
            });
        }
        let mut orderings = generate_orderings(graph, groups)?;
        if let Some(filter) = filter {
            orderings.retain(|o| filter.accepts(o));
        }
        Self::new(slots, orderings)
    }

    pub fn slots(&self) -> &[Arc<PhraseSlot>] {
        &self.slots
    }

    pub fn orderings(&self) -> &[SlotOrdering] {
        &self.orderings
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn check_permutation(ordering: &SlotOrdering, len: usize) -> Result<(), ArrangeError> {
    if ordering.len() != len {
        return Err(ArrangeError::NotPermutation { len });
    }
    let mut seen = vec![false; len];
    for &slot in ordering.as_slice() {
        if slot >= len {
            return Err(ArrangeError::SlotOutOfRange { slot, len });
        }
        if std::mem::replace(&mut seen[slot], true) {
            return Err(ArrangeError::NotPermutation { len });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// How candidates hold their phrase slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotOwnership {
    /// Every candidate shares the sentence's slots through `Arc`.
    #[default]
    Shared,
    /// Every candidate owns a private copy of its slots.
    Cloned,
}

#[derive(Debug, Clone)]
enum SlotHandle {
    Shared(Arc<PhraseSlot>),
    Owned(Box<PhraseSlot>),
}

/// One position of a candidate sequence.
#[derive(Debug, Clone)]
pub struct CandidateSlot {
    handle: SlotHandle,
    sentence: usize,
    index: usize,
    newline: bool,
}

impl CandidateSlot {
    fn new(slot: &Arc<PhraseSlot>, ownership: SlotOwnership, sentence: usize, index: usize) -> Self {
        let handle = match ownership {
            SlotOwnership::Shared => SlotHandle::Shared(Arc::clone(slot)),
            SlotOwnership::Cloned => SlotHandle::Owned(Box::new(PhraseSlot::clone(slot))),
        };
        Self {
            handle,
            sentence,
            index,
            newline: false,
        }
    }

    pub fn slot(&self) -> &PhraseSlot {
        match &self.handle {
            SlotHandle::Shared(s) => s.as_ref(),
            SlotHandle::Owned(s) => s.as_ref(),
        }
    }

    /// Sentence this slot belongs to.
    pub fn sentence(&self) -> usize {
        self.sentence
    }

    /// Index of this slot within its sentence's input order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether this slot starts a new output line in the candidate.
    pub fn newline(&self) -> bool {
        self.newline
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.handle, SlotHandle::Shared(_))
    }
}

/// A concrete linear sequence of phrase slots to search.
#[derive(Debug, Clone)]
pub struct Candidate {
    number: usize,
    sentence_order: Vec<usize>,
    orderings: Vec<usize>,
    slots: Vec<CandidateSlot>,
}

impl Candidate {
    /// A single-sentence candidate over `slots` in the given order, each
    /// keeping its own newline flag.
    pub fn from_slots(number: usize, slots: Vec<PhraseSlot>) -> Self {
        let slots = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                let newline = slot.newline();
                CandidateSlot {
                    handle: SlotHandle::Shared(Arc::new(slot)),
                    sentence: 0,
                    index,
                    newline,
                }
            })
            .collect();
        Self {
            number,
            sentence_order: vec![0],
            orderings: vec![0],
            slots,
        }
    }

    /// Pull-order number, starting at 1.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Order in which the sentences are laid out.
    pub fn sentence_order(&self) -> &[usize] {
        &self.sentence_order
    }

    /// Index of the ordering used for each sentence, by sentence index.
    pub fn orderings(&self) -> &[usize] {
        &self.orderings
    }

    pub fn slots(&self) -> &[CandidateSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The literal surface of every slot, `\n` before slots starting a line.
    pub fn surface(&self) -> String {
        let mut out = String::new();
        for (i, s) in self.slots.iter().enumerate() {
            if s.newline && i > 0 {
                out.push('\n');
            }
            out.push_str(&s.slot().surface());
        }
        out
    }

    /// Number of variant combinations, saturating at `u128::MAX`.
    pub fn variant_product(&self) -> u128 {
        self.slots
            .iter()
            .fold(1u128, |acc, s| acc.saturating_mul(s.slot().len() as u128))
    }

    /// Every variant combination as text, lazily.
    pub fn texts(&self) -> CandidateTexts<'_> {
        CandidateTexts {
            candidate: self,
            indices: vec![0; self.slots.len()],
            done: false,
        }
    }
}

/// Iterator over the cartesian product of a candidate's variant texts.
#[derive(Debug)]
pub struct CandidateTexts<'a> {
    candidate: &'a Candidate,
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for CandidateTexts<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let slots = &self.candidate.slots;
        let mut text = String::new();
        for (i, (s, &vi)) in slots.iter().zip(&self.indices).enumerate() {
            if s.newline && i > 0 {
                text.push('\n');
            }
            text.extend(s.slot().variants().nth(vi).unwrap_or_default());
        }
        self.done = !advance_odometer(&mut self.indices, |i| slots[i].slot().len());
        Some(text)
    }
}

/// Step `indices` to the next combination, last position fastest.
///
/// Returns `false` once every combination has been visited.
fn advance_odometer(indices: &mut [usize], radix: impl Fn(usize) -> usize) -> bool {
    for i in (0..indices.len()).rev() {
        indices[i] += 1;
        if indices[i] < radix(i) {
            return true;
        }
        indices[i] = 0;
    }
    false
}

// ---------------------------------------------------------------------------
// CandidateEnumerator
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum SentenceOrders {
    Fixed(Option<Vec<usize>>),
    Swapped(Permutations),
}

impl Iterator for SentenceOrders {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        match self {
            SentenceOrders::Fixed(order) => order.take(),
            SentenceOrders::Swapped(perms) => perms.next(),
        }
    }
}

/// Pull-based producer of candidates.
///
/// For every sentence order (only the input order unless swapping), every
/// combination of per-sentence orderings is emitted, the last laid-out
/// sentence varying fastest.
#[derive(Debug)]
pub struct CandidateEnumerator {
    sentences: Vec<SentenceArrangements>,
    ownership: SlotOwnership,
    swap: bool,
    orders: SentenceOrders,
    current: Option<Vec<usize>>,
    odometer: Vec<usize>,
    next_number: usize,
}

impl CandidateEnumerator {
    pub fn new(sentences: Vec<SentenceArrangements>, swap: bool, ownership: SlotOwnership) -> Self {
        let n = sentences.len();
        let orders = if swap {
            SentenceOrders::Swapped(Permutations::new(n))
        } else {
            SentenceOrders::Fixed(Some((0..n).collect()))
        };
        Self {
            sentences,
            ownership,
            swap,
            orders,
            current: None,
            odometer: vec![0; n],
            next_number: 1,
        }
    }

    pub fn sentences(&self) -> &[SentenceArrangements] {
        &self.sentences
    }

    /// Total number of candidates, saturating at `u128::MAX`.
    pub fn total(&self) -> u128 {
        let per_order = self
            .sentences
            .iter()
            .fold(1u128, |acc, s| acc.saturating_mul(s.orderings.len() as u128));
        if self.swap {
            per_order.saturating_mul(factorial(self.sentences.len()))
        } else {
            per_order
        }
    }

    fn build(&self, sentence_order: &[usize]) -> Candidate {
        let mut slots = Vec::new();
        for &si in sentence_order {
            let sentence = &self.sentences[si];
            let ordering = &sentence.orderings[self.odometer[si]];
            for (k, &index) in ordering.as_slice().iter().enumerate() {
                let mut slot = CandidateSlot::new(&sentence.slots[index], self.ownership, si, index);
                slot.newline = k == 0 && sentence.newline;
                slots.push(slot);
            }
        }
        Candidate {
            number: self.next_number,
            sentence_order: sentence_order.to_vec(),
            orderings: self.odometer.clone(),
            slots,
        }
    }
}

impl Iterator for CandidateEnumerator {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        let order = match self.current.take() {
            Some(order) => order,
            None => {
                self.odometer.iter_mut().for_each(|i| *i = 0);
                self.orders.next()?
            }
        };
        let candidate = self.build(&order);
        self.next_number += 1;

        let sentences = &self.sentences;
        let mut odometer = std::mem::take(&mut self.odometer);
        let mut positions: Vec<usize> = order.iter().map(|&si| odometer[si]).collect();
        let more = advance_odometer(&mut positions, |i| sentences[order[i]].orderings.len());
        for (&si, &p) in order.iter().zip(&positions) {
            odometer[si] = p;
        }
        self.odometer = odometer;
        if more {
            self.current = Some(order);
        }
        Some(candidate)
    }
}

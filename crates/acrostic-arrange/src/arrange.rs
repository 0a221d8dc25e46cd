// Arranger: the top-level driver.
//
// Builds phrase slots for a keyword, enumerates candidates, searches each
// one and routes accepted results through the sink to the writer.

use std::sync::Arc;
use std::time::Duration;

use acrostic_core::{Keyword, PhraseSlot, check_width};

use crate::ArrangeError;
use crate::candidate::{Candidate, CandidateEnumerator, OrderingFilter, SentenceArrangements, SlotOwnership};
use crate::ordering::{CoordinateGroup, DependencyGraph};
use crate::progress::{ProgressMonitor, ProgressReporter};
use crate::search::{MatrixSearch, SearchConfig};
use crate::sink::{CandidateHeader, ResultSink, ResultWriter};

/// Options for an arrangement run.
#[derive(Debug, Clone)]
pub struct ArrangeOptions {
    /// Keyword character `i` on row `i`, text ending on the last keyword row.
    pub match_length: bool,
    /// Also try every permutation of the sentences.
    pub swap_sentences: bool,
    /// Stop at the first accepted result.
    pub single_result: bool,
    /// Fan wide search nodes out to a worker pool.
    pub parallel: bool,
    /// Flush buffered results once this many are held. `None` keeps all.
    pub eviction_threshold: Option<usize>,
    /// Try one variant per length while a keyword character is pending.
    pub skip_same_length: bool,
    /// Write results after every candidate instead of once at the end.
    pub output_each_candidate: bool,
    pub slot_ownership: SlotOwnership,
    /// Progress report interval; `None` disables reporting.
    pub progress: Option<Duration>,
    /// Worker pool size; defaults to the available parallelism.
    pub workers: Option<usize>,
}

impl Default for ArrangeOptions {
    fn default() -> Self {
        Self {
            match_length: true,
            swap_sentences: false,
            single_result: false,
            parallel: true,
            eviction_threshold: Some(1_000_000),
            skip_same_length: true,
            output_each_candidate: true,
            slot_ownership: SlotOwnership::Shared,
            progress: None,
            workers: None,
        }
    }
}

/// One slot as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInput {
    /// Surface variants; the first is the literal text.
    pub variants: Vec<String>,
    /// The slot starts a new output line.
    pub newline: bool,
}

impl SlotInput {
    pub fn new<S: Into<String>>(variants: impl IntoIterator<Item = S>, newline: bool) -> Self {
        Self {
            variants: variants.into_iter().map(Into::into).collect(),
            newline,
        }
    }
}

/// One sentence as supplied by the caller.
#[derive(Clone, Default)]
pub struct SentenceInput {
    pub slots: Vec<SlotInput>,
    /// Attachment edges; `None` keeps the literal order only.
    pub graph: Option<DependencyGraph>,
    pub groups: Vec<CoordinateGroup>,
    pub filter: Option<Arc<dyn OrderingFilter>>,
}

impl std::fmt::Debug for SentenceInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceInput")
            .field("slots", &self.slots)
            .field("graph", &self.graph)
            .field("groups", &self.groups)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl SentenceInput {
    /// A sentence kept in its literal order.
    pub fn literal(slots: Vec<SlotInput>) -> Self {
        Self {
            slots,
            ..Self::default()
        }
    }

    fn arrangements(&self, keyword: &Keyword) -> Result<SentenceArrangements, ArrangeError> {
        let slots = self
            .slots
            .iter()
            .map(|s| PhraseSlot::new(&s.variants, s.newline, keyword))
            .collect::<Result<Vec<_>, _>>()?;
        match &self.graph {
            Some(graph) => SentenceArrangements::build(slots, graph, &self.groups, self.filter.as_deref()),
            None => Ok(SentenceArrangements::literal(slots)),
        }
    }
}

/// Outcome for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSummary {
    pub number: usize,
    /// Results accepted, evicted ones included.
    pub found: usize,
    pub evicted: usize,
    /// Number of variant combinations of the candidate.
    pub variant_product: u128,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrangeSummary {
    pub candidates: Vec<CandidateSummary>,
    /// Results accepted over all candidates.
    pub total: usize,
    /// Results flushed early by eviction.
    pub evicted: usize,
}

impl ArrangeSummary {
    /// Whether any arrangement was found.
    pub fn discovered(&self) -> bool {
        self.total > 0
    }
}

/// Runs arrangement searches at a fixed width.
pub struct Arranger {
    width: usize,
    options: ArrangeOptions,
    keyword_number: usize,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl std::fmt::Debug for Arranger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arranger")
            .field("width", &self.width)
            .field("options", &self.options)
            .field("keyword_number", &self.keyword_number)
            .finish_non_exhaustive()
    }
}

impl Arranger {
    pub fn new(width: usize, options: ArrangeOptions) -> Result<Self, ArrangeError> {
        Ok(Self {
            width: check_width(width)?,
            options,
            keyword_number: 1,
            reporter: None,
        })
    }

    /// Number reported in candidate headers when several keywords are run.
    pub fn with_keyword_number(mut self, number: usize) -> Self {
        self.keyword_number = number;
        self
    }

    /// Receive progress snapshots at the configured interval.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn options(&self) -> &ArrangeOptions {
        &self.options
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Build the candidate enumerator for `keyword`.
    ///
    /// Fails early when some keyword character occurs in no slot at all.
    pub fn prepare(&self, keyword: &Keyword, sentences: &[SentenceInput]) -> Result<CandidateEnumerator, ArrangeError> {
        let arrangements = sentences
            .iter()
            .map(|s| s.arrangements(keyword))
            .collect::<Result<Vec<_>, _>>()?;
        for (index, &ch) in keyword.chars().iter().enumerate() {
            let present = arrangements
                .iter()
                .flat_map(|a| a.slots())
                .any(|s| s.positions().contains(index));
            if !present {
                return Err(ArrangeError::KeywordCharacterMissing { ch, index });
            }
        }
        Ok(CandidateEnumerator::new(
            arrangements,
            self.options.swap_sentences,
            self.options.slot_ownership,
        ))
    }

    /// Search every candidate of `sentences` for `keyword`.
    pub fn run(
        &self,
        keyword: &Keyword,
        sentences: &[SentenceInput],
        writer: Box<dyn ResultWriter>,
    ) -> Result<ArrangeSummary, ArrangeError> {
        let candidates = self.prepare(keyword, sentences)?;
        self.run_candidates(keyword, candidates, writer)
    }

    /// Search the given candidates in order.
    pub fn run_candidates(
        &self,
        keyword: &Keyword,
        candidates: impl IntoIterator<Item = Candidate>,
        writer: Box<dyn ResultWriter>,
    ) -> Result<ArrangeSummary, ArrangeError> {
        let opts = &self.options;
        let pool = if opts.parallel {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(n) = opts.workers {
                builder = builder.num_threads(n);
            }
            Some(builder.build().map_err(|e| ArrangeError::ThreadPool(e.to_string()))?)
        } else {
            None
        };
        let monitor = match (opts.progress, &self.reporter) {
            (Some(interval), Some(reporter)) => Some(ProgressMonitor::start(interval, Arc::clone(reporter))),
            _ => None,
        };
        let config = SearchConfig {
            width: self.width,
            match_length: opts.match_length,
            skip_same_length: opts.skip_same_length,
            parallel: opts.parallel,
            single_result: opts.single_result,
        };
        let sink = ResultSink::new(writer, opts.eviction_threshold);
        let mut summary = ArrangeSummary::default();

        for candidate in candidates {
            let header = CandidateHeader {
                keyword: self.keyword_number,
                candidate: candidate.number(),
                surface: candidate.surface(),
                width: self.width,
            };
            sink.begin_candidate(header, opts.output_each_candidate)?;
            if let Some(m) = &monitor {
                m.begin(candidate.slots().iter().map(|s| s.slot().len()).collect());
            }
            MatrixSearch::new(&candidate, keyword, config, &sink)?
                .with_pool(pool.as_ref())
                .with_progress(monitor.as_ref())
                .run()?;
            let counts = sink.end_candidate(opts.output_each_candidate)?;
            summary.candidates.push(CandidateSummary {
                number: candidate.number(),
                found: counts.found,
                evicted: counts.evicted,
                variant_product: candidate.variant_product(),
            });
            if opts.single_result && counts.found > 0 {
                break;
            }
        }

        if let Some(m) = &monitor {
            m.stop();
        }
        let (total, evicted) = sink.finish()?;
        summary.total = total;
        summary.evicted = evicted;
        Ok(summary)
    }
}

// ResultSink: accepted results, eviction, and the output writer.
//
// The buffer, the evicted count and the writer sit behind one mutex; they
// are the only state search workers share. When the buffer reaches the
// eviction threshold it is written out, cleared and its memory released.
// Counts reported afterwards are buffered + evicted, so they do not depend
// on when eviction happened.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use acrostic_core::ArrangeResult;

use crate::ArrangeError;

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Identifies one candidate in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateHeader {
    /// Number of the keyword being searched, starting at 1.
    pub keyword: usize,
    /// Candidate number in pull order, starting at 1.
    pub candidate: usize,
    /// Literal text of the candidate, `\n` before slots starting a line.
    pub surface: String,
    pub width: usize,
}

/// Destination for accepted results.
///
/// `number` is the 1-based index of the result within its candidate.
pub trait ResultWriter: Send {
    fn begin_candidate(&mut self, _header: &CandidateHeader) -> io::Result<()> {
        Ok(())
    }

    fn write_result(&mut self, number: usize, result: &ArrangeResult) -> io::Result<()>;

    fn end_candidate(&mut self, _header: &CandidateHeader, _found: usize) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, _total: usize) -> io::Result<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWriter;

impl ResultWriter for NullWriter {
    fn write_result(&mut self, _number: usize, _result: &ArrangeResult) -> io::Result<()> {
        Ok(())
    }
}

/// Everything a [`MemoryWriter`] received.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    pub headers: Vec<CandidateHeader>,
    pub results: Vec<(usize, ArrangeResult)>,
    /// `(candidate, found)` per finished candidate.
    pub footers: Vec<(usize, usize)>,
    pub total: Option<usize>,
}

/// Collects output in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    log: Arc<Mutex<MemoryLog>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MemoryLog {
        lock(&self.log).clone()
    }

    /// Results received so far, in arrival order.
    pub fn results(&self) -> Vec<ArrangeResult> {
        lock(&self.log).results.iter().map(|(_, r)| r.clone()).collect()
    }
}

impl ResultWriter for MemoryWriter {
    fn begin_candidate(&mut self, header: &CandidateHeader) -> io::Result<()> {
        lock(&self.log).headers.push(header.clone());
        Ok(())
    }

    fn write_result(&mut self, number: usize, result: &ArrangeResult) -> io::Result<()> {
        lock(&self.log).results.push((number, result.clone()));
        Ok(())
    }

    fn end_candidate(&mut self, header: &CandidateHeader, found: usize) -> io::Result<()> {
        lock(&self.log).footers.push((header.candidate, found));
        Ok(())
    }

    fn finish(&mut self, total: usize) -> io::Result<()> {
        lock(&self.log).total = Some(total);
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// ResultSink
// ---------------------------------------------------------------------------

/// Result counts for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateCounts {
    /// Results accepted, evicted ones included.
    pub found: usize,
    /// Results flushed early because the buffer was full.
    pub evicted: usize,
}

struct SinkState {
    buffer: Vec<(usize, ArrangeResult)>,
    writer: Box<dyn ResultWriter>,
    header: Option<CandidateHeader>,
    /// Results accepted for the current candidate.
    found: usize,
    /// Results evicted during the current candidate.
    evicted: usize,
    /// Results accepted over all candidates.
    total: usize,
    /// Results evicted over all candidates.
    total_evicted: usize,
}

impl SinkState {
    /// Write out the buffer, returning how many results left it.
    ///
    /// On a write error the results already written are dropped from the
    /// buffer and the rest stay for the next flush.
    fn write_buffer(&mut self) -> (usize, io::Result<()>) {
        let mut written = 0;
        let mut out = Ok(());
        for (number, result) in &self.buffer {
            if let Err(e) = self.writer.write_result(*number, result) {
                out = Err(e);
                break;
            }
            written += 1;
        }
        self.buffer.drain(..written);
        if out.is_ok() {
            self.buffer.shrink_to_fit();
        }
        (written, out)
    }
}

/// Shared collector for accepted results.
pub struct ResultSink {
    state: Mutex<SinkState>,
    threshold: Option<usize>,
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = lock(&self.state);
        f.debug_struct("ResultSink")
            .field("buffered", &s.buffer.len())
            .field("total", &s.total)
            .field("total_evicted", &s.total_evicted)
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl ResultSink {
    /// `threshold` of `None` (or zero) disables eviction.
    pub fn new(writer: Box<dyn ResultWriter>, threshold: Option<usize>) -> Self {
        Self {
            state: Mutex::new(SinkState {
                buffer: Vec::new(),
                writer,
                header: None,
                found: 0,
                evicted: 0,
                total: 0,
                total_evicted: 0,
            }),
            threshold: threshold.filter(|&t| t > 0),
        }
    }

    /// Start collecting for a new candidate, announcing it to the writer
    /// when `announce` is set.
    pub fn begin_candidate(&self, header: CandidateHeader, announce: bool) -> Result<(), ArrangeError> {
        let mut s = lock(&self.state);
        if announce {
            s.writer.begin_candidate(&header)?;
        }
        s.header = Some(header);
        s.found = 0;
        s.evicted = 0;
        Ok(())
    }

    /// Accept one result, evicting the buffer if it is full.
    ///
    /// Returns the result's number within its candidate.
    pub fn push(&self, result: ArrangeResult) -> Result<usize, ArrangeError> {
        let mut s = lock(&self.state);
        s.found += 1;
        s.total += 1;
        let number = s.found;
        s.buffer.push((number, result));
        if self.threshold.is_some_and(|t| s.buffer.len() >= t) {
            let (n, out) = s.write_buffer();
            s.evicted += n;
            s.total_evicted += n;
            out?;
        }
        Ok(number)
    }

    /// Finish the current candidate. With `flush` the buffered results and
    /// a footer are written; otherwise results stay buffered.
    pub fn end_candidate(&self, flush: bool) -> Result<CandidateCounts, ArrangeError> {
        let mut s = lock(&self.state);
        if flush {
            s.write_buffer().1?;
            let found = s.found;
            if let Some(header) = s.header.take() {
                s.writer.end_candidate(&header, found)?;
            }
        }
        Ok(CandidateCounts {
            found: s.found,
            evicted: s.evicted,
        })
    }

    /// Write whatever is still buffered and the final total.
    ///
    /// Returns `(total, evicted)` over all candidates.
    pub fn finish(&self) -> Result<(usize, usize), ArrangeError> {
        let mut s = lock(&self.state);
        s.write_buffer().1?;
        let total = s.total;
        s.writer.finish(total)?;
        Ok((total, s.total_evicted))
    }

    /// Number of results currently held in memory.
    pub fn buffered(&self) -> usize {
        lock(&self.state).buffer.len()
    }
}

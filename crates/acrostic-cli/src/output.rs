// Result writers for the command line: plain text and JSON lines.

use std::io::{self, Write};

use acrostic_arrange::{CandidateHeader, ProgressReporter, ProgressSnapshot, ResultWriter};
use acrostic_core::{ArrangeResult, Position};
use serde::Serialize;

const HIGHLIGHT: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

/// Writes results as annotated grids.
///
/// ```text
/// # 1-2: CA\nT (3)
/// # 1-2-1 stack:[0, 0, 0] branch:[0, 0, 0]
/// CA
/// T
/// # 1 results found
/// ```
#[derive(Debug)]
pub struct TextWriter<W> {
    out: W,
    keyword: usize,
    keyword_len: usize,
    color: bool,
}

impl<W: Write + Send> TextWriter<W> {
    /// `keyword` numbers the headers; `keyword_len` locates the keyword
    /// column for highlighting.
    pub fn new(out: W, keyword: usize, keyword_len: usize) -> Self {
        Self {
            out,
            keyword,
            keyword_len,
            color: false,
        }
    }

    /// Highlight the keyword column with ANSI escapes.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_row(&mut self, result: &ArrangeResult, row: usize, cells: &[char]) -> io::Result<()> {
        let mut line = String::with_capacity(cells.len() * 4);
        for (col, &c) in cells.iter().enumerate() {
            if self.color && result.is_keyword_cell(Position::new(row, col), self.keyword_len) {
                line.push_str(HIGHLIGHT);
                line.push(c);
                line.push_str(RESET);
            } else {
                line.push(c);
            }
        }
        writeln!(self.out, "{line}")
    }
}

impl<W: Write + Send> ResultWriter for TextWriter<W> {
    fn begin_candidate(&mut self, header: &CandidateHeader) -> io::Result<()> {
        writeln!(
            self.out,
            "# {}-{}: {} ({})",
            header.keyword,
            header.candidate,
            header.surface.replace('\n', "\\n"),
            header.width
        )
    }

    fn write_result(&mut self, number: usize, result: &ArrangeResult) -> io::Result<()> {
        writeln!(
            self.out,
            "# {}-{}-{} stack:{:?} branch:{:?}",
            self.keyword,
            result.candidate,
            number,
            result.variant_stack(),
            result.branch_stack()
        )?;
        for (row, cells) in result.grid.rows().iter().enumerate() {
            self.write_row(result, row, cells)?;
        }
        Ok(())
    }

    fn end_candidate(&mut self, _header: &CandidateHeader, found: usize) -> io::Result<()> {
        if found > 0 {
            writeln!(self.out, "# {found} results found")?;
        } else {
            writeln!(self.out, "# not found")?;
        }
        writeln!(self.out)
    }

    fn finish(&mut self, total: usize) -> io::Result<()> {
        writeln!(self.out, "# total: {total} results")?;
        self.out.flush()
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record<'a> {
    Candidate {
        keyword: usize,
        candidate: usize,
        surface: &'a str,
        width: usize,
    },
    Result {
        keyword: usize,
        number: usize,
        #[serde(flatten)]
        result: &'a ArrangeResult,
    },
    CandidateEnd {
        keyword: usize,
        candidate: usize,
        found: usize,
    },
    Total {
        keyword: usize,
        total: usize,
    },
}

/// Writes one JSON object per line, tagged by `type`.
#[derive(Debug)]
pub struct JsonWriter<W> {
    out: W,
    keyword: usize,
}

impl<W: Write + Send> JsonWriter<W> {
    pub fn new(out: W, keyword: usize) -> Self {
        Self { out, keyword }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn record(&mut self, record: &Record<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)
    }
}

impl<W: Write + Send> ResultWriter for JsonWriter<W> {
    fn begin_candidate(&mut self, header: &CandidateHeader) -> io::Result<()> {
        self.record(&Record::Candidate {
            keyword: header.keyword,
            candidate: header.candidate,
            surface: &header.surface,
            width: header.width,
        })
    }

    fn write_result(&mut self, number: usize, result: &ArrangeResult) -> io::Result<()> {
        let keyword = self.keyword;
        self.record(&Record::Result {
            keyword,
            number,
            result,
        })
    }

    fn end_candidate(&mut self, header: &CandidateHeader, found: usize) -> io::Result<()> {
        self.record(&Record::CandidateEnd {
            keyword: header.keyword,
            candidate: header.candidate,
            found,
        })
    }

    fn finish(&mut self, total: usize) -> io::Result<()> {
        let keyword = self.keyword;
        self.record(&Record::Total { keyword, total })?;
        self.out.flush()
    }
}

/// Prints progress snapshots to stderr, one line per worker.
#[derive(Debug, Default)]
pub struct StderrReporter;

impl ProgressReporter for StderrReporter {
    fn report(&self, snapshot: &ProgressSnapshot) {
        let stderr = io::stderr();
        let mut err = stderr.lock();
        for w in &snapshot.workers {
            let _ = writeln!(err, "progress: {}: {}", w.name, format_progress(&w.stack, &snapshot.max));
        }
    }
}

/// `[1/3, 0/2, -/4]`: the chosen variant of each placed slot over the
/// slot's variant count.
fn format_progress(stack: &[usize], max: &[usize]) -> String {
    let parts: Vec<String> = max
        .iter()
        .enumerate()
        .map(|(i, m)| match stack.get(i) {
            Some(v) => format!("{v}/{m}"),
            None => format!("-/{m}"),
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use acrostic_core::{Choice, Cursor, Grid};

    use super::*;

    fn sample() -> ArrangeResult {
        let mut grid = Grid::new();
        let text: Vec<char> = "CAT".chars().collect();
        grid.write(Position::new(0, 0), &text[..2], 2);
        grid.write(Position::new(1, 0), &text[2..], 2);
        ArrangeResult {
            candidate: 2,
            grid,
            cursor: Cursor::new(1, 1),
            anchor: Position::new(1, 0),
            choices: vec![Choice::matched(0, 0), Choice::skipped(1), Choice::matched(0, 0)],
        }
    }

    fn header() -> CandidateHeader {
        CandidateHeader {
            keyword: 1,
            candidate: 2,
            surface: "CA\nT".into(),
            width: 2,
        }
    }

    #[test]
    fn text_layout() {
        let mut w = TextWriter::new(Vec::new(), 1, 2);
        w.begin_candidate(&header()).unwrap();
        w.write_result(1, &sample()).unwrap();
        w.end_candidate(&header(), 1).unwrap();
        w.begin_candidate(&header()).unwrap();
        w.end_candidate(&header(), 0).unwrap();
        w.finish(1).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(
            text,
            "# 1-2: CA\\nT (2)\n\
             # 1-2-1 stack:[0, 1, 0] branch:[0, 1, 0]\n\
             CA\n\
             T\n\
             # 1 results found\n\
             \n\
             # 1-2: CA\\nT (2)\n\
             # not found\n\
             \n\
             # total: 1 results\n"
        );
    }

    #[test]
    fn color_marks_only_the_keyword_column() {
        let mut w = TextWriter::new(Vec::new(), 1, 2).with_color(true);
        w.write_result(1, &sample()).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], format!("{HIGHLIGHT}C{RESET}A"));
        assert_eq!(lines[2], format!("{HIGHLIGHT}T{RESET}"));
    }

    #[test]
    fn json_lines_are_tagged() {
        let mut w = JsonWriter::new(Vec::new(), 4);
        w.begin_candidate(&header()).unwrap();
        w.write_result(1, &sample()).unwrap();
        w.end_candidate(&header(), 1).unwrap();
        w.finish(1).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        let records: Vec<serde_json::Value> =
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0]["type"], "candidate");
        assert_eq!(records[0]["surface"], "CA\nT");
        assert_eq!(records[1]["type"], "result");
        assert_eq!(records[1]["keyword"], 4);
        assert_eq!(records[1]["candidate"], 2);
        assert_eq!(records[1]["grid"], serde_json::json!(["CA", "T"]));
        assert_eq!(records[1]["choices"][1]["branch"], "skip");
        assert_eq!(records[2]["type"], "candidate_end");
        assert_eq!(records[3], serde_json::json!({ "type": "total", "keyword": 4, "total": 1 }));
    }

    #[test]
    fn progress_line_marks_unplaced_slots() {
        assert_eq!(format_progress(&[1, 0], &[3, 2, 4]), "[1/3, 0/2, -/4]");
        assert_eq!(format_progress(&[], &[]), "[]");
    }
}

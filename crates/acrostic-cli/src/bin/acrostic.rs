// acrostic: Arrange sentences so that keywords read down a column.
//
// Reads a problem file (sentences, slot variants, ordering constraints)
// and searches every candidate arrangement for each keyword, writing the
// accepted grids as text or JSON lines.
//
// Usage:
//   acrostic [OPTIONS] PROBLEM.json

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use acrostic_arrange::{ArrangeError, ArrangeOptions, Arranger, ResultWriter, SlotOwnership};
use acrostic_cli::{JsonWriter, ProblemFile, StderrReporter, TextWriter, fatal, load_keywords, open_output};
use acrostic_core::Keyword;
use clap::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "acrostic", version, about = "Arrange sentences so that a keyword reads down a column")]
struct Cli {
    /// Problem file (JSON)
    #[arg(value_name = "PROBLEM")]
    problem: PathBuf,

    /// Characters per line; overrides the problem file
    #[arg(short, long)]
    width: Option<usize>,

    /// Keyword to search for; may be repeated
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// File with one keyword per line
    #[arg(long, value_name = "PATH")]
    keyword_file: Option<PathBuf>,

    /// Write results here instead of stdout (truncated once, then appended per keyword)
    #[arg(short, long, value_name = "PATH")]
    out: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Highlight the keyword column
    #[arg(long)]
    color: bool,

    /// Exit with status 1 when no keyword was found
    #[arg(long)]
    exit_code: bool,

    /// Print candidate counts and sizes to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Allow the keyword on any rows, not one character per row ending with the text
    #[arg(long)]
    no_match_length: bool,

    /// Also try every order of the sentences
    #[arg(long)]
    swap: bool,

    /// Stop at the first result
    #[arg(long)]
    single: bool,

    /// Search on the current thread only
    #[arg(long)]
    no_parallel: bool,

    /// Flush results once this many are buffered (0 keeps all)
    #[arg(long, value_name = "N", default_value_t = 1_000_000)]
    eviction: usize,

    /// Try every variant while a keyword character is pending, not one per length
    #[arg(long)]
    all_lengths: bool,

    /// Write all results once at the end instead of after each candidate
    #[arg(long)]
    batch: bool,

    /// Give each candidate its own copy of the slots
    #[arg(long)]
    cloned_slots: bool,

    /// Report worker progress to stderr every MS milliseconds
    #[arg(long, value_name = "MS")]
    progress: Option<u64>,

    /// Worker threads (default: available parallelism)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,
}

impl Cli {
    fn options(&self) -> ArrangeOptions {
        ArrangeOptions {
            match_length: !self.no_match_length,
            swap_sentences: self.swap,
            single_result: self.single,
            parallel: !self.no_parallel,
            eviction_threshold: Some(self.eviction),
            skip_same_length: !self.all_lengths,
            output_each_candidate: !self.batch,
            slot_ownership: if self.cloned_slots {
                SlotOwnership::Cloned
            } else {
                SlotOwnership::Shared
            },
            progress: self.progress.map(Duration::from_millis),
            workers: self.workers,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let problem = ProblemFile::load(&cli.problem).unwrap_or_else(|e| fatal(&e.to_string()));
    let inputs = problem.inputs().unwrap_or_else(|e| fatal(&e.to_string()));

    let width = cli
        .width
        .or(problem.width)
        .unwrap_or_else(|| fatal("no width given (use --width or \"width\" in the problem file)"));

    let mut keywords = cli.keywords.clone();
    if let Some(path) = &cli.keyword_file {
        keywords.extend(load_keywords(path).unwrap_or_else(|e| fatal(&e.to_string())));
    }
    if keywords.is_empty() {
        keywords = problem.keywords.clone();
    }
    if keywords.is_empty() {
        fatal("no keyword given (use --keyword, --keyword-file or \"keywords\" in the problem file)");
    }

    let options = cli.options();
    let mut found_any = false;

    for (i, text) in keywords.iter().enumerate() {
        let number = i + 1;
        let keyword = Keyword::new(text).unwrap_or_else(|e| fatal(&format!("keyword {number}: {e}")));

        let mut arranger = Arranger::new(width, options.clone())
            .unwrap_or_else(|e| fatal(&e.to_string()))
            .with_keyword_number(number);
        if options.progress.is_some() {
            arranger = arranger.with_reporter(Arc::new(StderrReporter));
        }

        let mut out = open_output(cli.out.as_deref(), i == 0).unwrap_or_else(|e| {
            let dest = cli.out.as_deref().map_or("stdout".into(), |p| p.display().to_string());
            fatal(&format!("failed to open {dest}: {e}"))
        });
        let header = match cli.format {
            Format::Text => writeln!(out, "# {number}: keyword: {text}"),
            Format::Json => writeln!(
                out,
                "{}",
                serde_json::json!({ "type": "keyword", "keyword": number, "text": text })
            ),
        };
        header.unwrap_or_else(|e| fatal(&format!("failed to write output: {e}")));

        let candidates = match arranger.prepare(&keyword, &inputs) {
            Ok(c) => c,
            Err(e @ ArrangeError::KeywordCharacterMissing { .. }) => {
                eprintln!("# {number}: {text}: {e}");
                continue;
            }
            Err(e) => fatal(&e.to_string()),
        };
        if cli.verbose {
            eprintln!("# {number}: {text}: {} candidates", candidates.total());
        }

        let writer: Box<dyn ResultWriter> = match cli.format {
            Format::Text => Box::new(TextWriter::new(out, number, keyword.len()).with_color(cli.color)),
            Format::Json => Box::new(JsonWriter::new(out, number)),
        };
        let summary = arranger
            .run_candidates(&keyword, candidates, writer)
            .unwrap_or_else(|e| fatal(&e.to_string()));

        if cli.verbose {
            for c in &summary.candidates {
                eprintln!(
                    "# {number}-{}: {} combinations, {} found, {} evicted",
                    c.number, c.variant_product, c.found, c.evicted
                );
            }
        }
        eprintln!("# {number}: {text}: {} results", summary.total);
        found_any |= summary.discovered();
    }

    if cli.exit_code && !found_any {
        std::process::exit(1);
    }
}

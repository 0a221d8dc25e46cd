// acrostic-cli: problem-file loading, result writers and shared helpers
// for the `acrostic` binary.

pub mod output;
pub mod problem;

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;

pub use output::{JsonWriter, StderrReporter, TextWriter};
pub use problem::{GroupSpec, LoadError, ProblemFile, SentenceSpec, SlotSpec, load_keywords};

/// Open the result destination: `path`, or stdout when `None`.
///
/// With `truncate` the file is emptied first; otherwise output is appended,
/// so one file can collect the runs for several keywords.
pub fn open_output(path: Option<&Path>, truncate: bool) -> io::Result<Box<dyn Write + Send>> {
    match path {
        Some(p) => {
            let file: File = if truncate {
                File::create(p)?
            } else {
                OpenOptions::new().create(true).append(true).open(p)?
            };
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

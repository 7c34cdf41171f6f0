use crate::constants::BYTES_PER_MIB;
use crate::error::{Result, ShrinkError};
use crate::worker::{shrink_percentage, ShrinkResult};
use std::io::{self, Write};

/// Aggregate sizes over the successful files of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub original_size: u64,
    pub new_size: u64,
}

impl Totals {
    pub fn add(&mut self, result: &ShrinkResult) {
        self.original_size += result.original_size();
        self.new_size += result.new_size();
    }

    pub fn shrink_percentage(&self) -> f64 {
        shrink_percentage(self.original_size, self.new_size)
    }
}

/// Renders the results of a batch.
///
/// `results` arrive sorted by path and only ever contain verified successes.
pub trait ShrinkReporter {
    fn report(&mut self, results: &[ShrinkResult], totals: &Totals) -> Result<()>;
}

/// Writes one line per file and a summary line.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_report(&mut self, results: &[ShrinkResult], totals: &Totals) -> io::Result<()> {
        for result in results {
            writeln!(
                self.out,
                "{}: {}",
                result.path().display(),
                format_sizes(result.original_size(), result.new_size())
            )?;
        }

        writeln!(
            self.out,
            "\nSummary: {}",
            format_sizes(totals.original_size, totals.new_size)
        )?;
        self.out.flush()
    }
}

impl<W: Write> ShrinkReporter for ConsoleReporter<W> {
    fn report(&mut self, results: &[ShrinkResult], totals: &Totals) -> Result<()> {
        self.write_report(results, totals).map_err(ShrinkError::Report)
    }
}

/// `<orig> MB → <new> MB (<pct>% smaller)`, sizes in MiB to two decimals.
pub fn format_sizes(original_size: u64, new_size: u64) -> String {
    format!(
        "{:.2} MB → {:.2} MB ({:.2}% smaller)",
        to_mib(original_size),
        to_mib(new_size),
        shrink_percentage(original_size, new_size)
    )
}

fn to_mib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MIB
}

use std::io::{self, Write};

use serde::Serialize;

use crate::app::SessionSummary;
use crate::domain::ResultRow;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

#[derive(Debug)]
pub struct RowOutput<W: Write> {
    out: W,
}

impl<W: Write> RowOutput<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn print_row(&mut self, row: &ResultRow) -> io::Result<()> {
        writeln!(self.out, "{}", row.to_line())?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl RowOutput<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

pub struct SummaryOutput;

impl SummaryOutput {
    pub fn print(summary: &SessionSummary, mode: OutputMode) -> io::Result<()> {
        match mode {
            OutputMode::Text => Self::print_text(summary),
            OutputMode::Json => Self::print_json(summary),
        }
    }

    fn print_text(summary: &SessionSummary) -> io::Result<()> {
        let mut stderr = io::stderr();
        writeln!(
            stderr,
            "processed {} line(s): {} appended, {} overwritten, {} duplicate(s) kept, {} rejected, {} failed",
            summary.processed,
            summary.appended,
            summary.overwritten,
            summary.declined,
            summary.rejected,
            summary.failed
        )
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stderr = io::stderr();
        stderr.write_all(json.as_bytes())?;
        stderr.write_all(b"\n")?;
        Ok(())
    }
}

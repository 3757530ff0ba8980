use std::io::{BufRead, Write};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::confirm::ConfirmationService;
use crate::domain::{ResultRow, RowKey, ScanRecord};
use crate::error::ScanError;
use crate::output::RowOutput;
use crate::season::Season;
use crate::store::MatchStore;
use crate::validate::{MatchRules, Rejection, TeamRoster, validate};
use crate::writer::append_row;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub processed: usize,
    pub appended: usize,
    pub overwritten: usize,
    pub declined: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl SessionSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

// Line errors are skipped unless `strict`; anything else ends the loop.
pub fn run_lines<R, F>(mut reader: R, strict: bool, mut handle: F) -> Result<SessionSummary, ScanError>
where
    R: BufRead,
    F: FnMut(&str, &mut SessionSummary) -> Result<(), ScanError>,
{
    let mut summary = SessionSummary::default();
    let mut buf = Vec::new();
    let mut number: usize = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|err| ScanError::Filesystem(format!("read input: {err}")))?;
        if read == 0 {
            break;
        }
        number += 1;

        let result = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim_end_matches(['\r', '\n']);
                if line.trim().is_empty() {
                    continue;
                }
                summary.processed += 1;
                handle(line, &mut summary)
            }
            Err(err) => {
                summary.processed += 1;
                Err(ScanError::MalformedLine(format!("invalid UTF-8: {err}")))
            }
        };
        match result {
            Ok(()) => {}
            Err(err) if err.is_line_error() && !strict => {
                warn!(line = number, error = %err, "skipping scan line");
                eprintln!("line {number}: {err}");
                summary.failed += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(summary)
}

pub struct ParseSession<W: Write> {
    season: Season,
    destination: Option<Utf8PathBuf>,
    output: RowOutput<W>,
}

impl<W: Write> ParseSession<W> {
    pub fn new(season: Season, destination: Option<Utf8PathBuf>, output: RowOutput<W>) -> Self {
        Self {
            season,
            destination,
            output,
        }
    }

    pub fn process_line(&mut self, line: &str) -> Result<ResultRow, ScanError> {
        let record = ScanRecord::parse_line(line)?;
        let row = self.season.map_record(&record)?;
        self.output
            .print_row(&row)
            .map_err(|err| ScanError::Filesystem(format!("write output: {err}")))?;
        if let Some(destination) = &self.destination {
            append_row(destination, &row)?;
            debug!(path = %destination, "appended row");
        }
        Ok(row)
    }

    pub fn run<R: BufRead>(&mut self, reader: R, strict: bool) -> Result<SessionSummary, ScanError> {
        let appends = self.destination.is_some();
        run_lines(reader, strict, |line, summary| {
            self.process_line(line)?;
            if appends {
                summary.appended += 1;
            }
            Ok(())
        })
    }

    pub fn into_output(self) -> RowOutput<W> {
        self.output
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Appended,
    Overwritten { index: usize },
    DuplicateDeclined { index: usize },
    Rejected {
        reasons: Vec<Rejection>,
        duplicate_of: Option<usize>,
    },
}

#[derive(Debug)]
pub struct MergeSession<C: ConfirmationService, W: Write> {
    season: Season,
    store: MatchStore,
    roster: TeamRoster,
    rules: MatchRules,
    confirm: C,
    output: RowOutput<W>,
}

impl<C: ConfirmationService, W: Write> MergeSession<C, W> {
    pub fn new(
        season: Season,
        store: MatchStore,
        roster: TeamRoster,
        rules: MatchRules,
        confirm: C,
        output: RowOutput<W>,
    ) -> Result<Self, ScanError> {
        season.ensure_keyed()?;
        if let Some(header) = store.header() {
            let columns = season.columns();
            if header != columns {
                return Err(ScanError::HeaderMismatch {
                    expected: header.join(","),
                    found: columns.join(","),
                });
            }
        }
        Ok(Self {
            season,
            store,
            roster,
            rules,
            confirm,
            output,
        })
    }

    pub fn store(&self) -> &MatchStore {
        &self.store
    }

    pub fn into_store(self) -> MatchStore {
        self.store
    }

    pub fn process_line(&mut self, line: &str) -> Result<MergeOutcome, ScanError> {
        let record = ScanRecord::parse_line(line)?;
        let row = self.season.map_record(&record)?;
        self.output
            .print_row(&row)
            .map_err(|err| ScanError::Filesystem(format!("write output: {err}")))?;
        self.merge_row(row)
    }

    pub fn merge_row(&mut self, row: ResultRow) -> Result<MergeOutcome, ScanError> {
        let key = row
            .key()
            .ok_or_else(|| ScanError::MissingKeyColumn(RowKey::COMPETITION.to_string()))?;
        let reasons = validate(&row, &self.roster, &self.rules);
        let duplicate_of = self.store.find_duplicate(&key);

        if !reasons.is_empty() {
            let mut message = reasons
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            if let Some(index) = duplicate_of {
                message.push_str(&format!("\nalso a duplicate of stored row {}", index + 1));
            }
            warn!(%key, "rejected scan: {}", message.replace('\n', "; "));
            self.confirm.notify_error(&message)?;
            return Ok(MergeOutcome::Rejected {
                reasons,
                duplicate_of,
            });
        }

        if let Some(index) = duplicate_of {
            let prompt = format!(
                "Data for {key} already exists (row {}).\nOverwrite it?",
                index + 1
            );
            if !self.confirm.confirm(&prompt)? {
                debug!(%key, "kept existing row");
                return Ok(MergeOutcome::DuplicateDeclined { index });
            }
            self.store.replace(index, row)?;
            self.store.persist()?;
            info!(%key, row = index + 1, "overwrote row");
            return Ok(MergeOutcome::Overwritten { index });
        }

        self.store.append(row)?;
        info!(%key, "appended row");
        Ok(MergeOutcome::Appended)
    }

    pub fn run<R: BufRead>(&mut self, reader: R, strict: bool) -> Result<SessionSummary, ScanError> {
        run_lines(reader, strict, |line, summary| {
            match self.process_line(line)? {
                MergeOutcome::Appended => summary.appended += 1,
                MergeOutcome::Overwritten { .. } => summary.overwritten += 1,
                MergeOutcome::DuplicateDeclined { .. } => summary.declined += 1,
                MergeOutcome::Rejected { .. } => summary.rejected += 1,
            }
            Ok(())
        })
    }
}

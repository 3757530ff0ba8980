use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};

use camino::Utf8Path;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::{debug, warn};

use crate::domain::ResultRow;
use crate::error::ScanError;

pub fn csv_writer<W: Write>(inner: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(inner)
}

pub fn append_row(path: &Utf8Path, row: &ResultRow) -> Result<(), ScanError> {
    let needs_header = match read_header_line(path)? {
        None => true,
        Some(existing) => {
            let expected = row.header_line();
            if existing != expected {
                return Err(ScanError::HeaderMismatch {
                    expected: existing,
                    found: expected,
                });
            }
            false
        }
    };

    warn_ambiguous(row);

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path.as_std_path())
        .map_err(|err| ScanError::Filesystem(format!("open {path}: {err}")))?;
    if !needs_header && !ends_with_newline(&mut file)? {
        debug!(path = %path, "terminating unfinished last line");
        file.write_all(b"\n")
            .map_err(|err| ScanError::Filesystem(format!("write {path}: {err}")))?;
    }
    let mut writer = csv_writer(file);
    if needs_header {
        debug!(path = %path, "writing header");
        writer
            .write_record(row.columns())
            .map_err(|err| ScanError::Csv(err.to_string()))?;
    }
    writer
        .write_record(row.values())
        .map_err(|err| ScanError::Csv(err.to_string()))?;
    writer
        .flush()
        .map_err(|err| ScanError::Filesystem(err.to_string()))?;
    Ok(())
}

pub fn read_header_line(path: &Utf8Path) -> Result<Option<String>, ScanError> {
    let file = match File::open(path.as_std_path()) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(ScanError::Filesystem(format!("open {path}: {err}"))),
    };
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|err| ScanError::Filesystem(format!("read {path}: {err}")))?;
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(line.to_string()))
}

fn ends_with_newline(file: &mut File) -> Result<bool, ScanError> {
    let len = file
        .metadata()
        .map_err(|err| ScanError::Filesystem(err.to_string()))?
        .len();
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))
        .and_then(|_| file.read_exact(&mut last))
        .map_err(|err| ScanError::Filesystem(err.to_string()))?;
    Ok(last[0] == b'\n')
}

// Separators inside a value cannot be told apart from column breaks once
// written, since values are never quoted.
fn warn_ambiguous(row: &ResultRow) {
    for (column, value) in row.columns().iter().zip(row.values()) {
        if value.contains([',', '"', '\n', '\r']) {
            warn!(column = %column, value = %value, "value contains a CSV separator and will not read back as one field");
        }
    }
}

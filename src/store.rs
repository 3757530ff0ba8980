use std::fs::{self, File};

use camino::{Utf8Path, Utf8PathBuf};
use csv::ReaderBuilder;
use tempfile::Builder;
use tracing::{debug, info};

use crate::domain::{ResultRow, RowKey};
use crate::error::ScanError;
use crate::writer::{append_row, csv_writer};

#[derive(Debug, Clone)]
pub struct MatchStore {
    path: Utf8PathBuf,
    header: Option<Vec<String>>,
    rows: Vec<ResultRow>,
}

impl MatchStore {
    pub fn load(path: &Utf8Path) -> Result<Self, ScanError> {
        let file = File::open(path.as_std_path())
            .map_err(|_| ScanError::StoreMissing(path.as_std_path().to_path_buf()))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .quoting(false)
            .from_reader(file);

        let header: Vec<String> = reader
            .headers()
            .map_err(|err| ScanError::Csv(format!("{path}: {err}")))?
            .iter()
            .map(str::to_string)
            .collect();
        if header.is_empty() {
            debug!(path = %path, "match data file is empty");
            return Ok(Self::empty(path.to_owned()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| ScanError::Csv(format!("{path}: {err}")))?;
            rows.push(ResultRow::from_cells(&header, record.iter())?);
        }
        info!(path = %path, rows = rows.len(), "loaded match data");

        Ok(Self {
            path: path.to_owned(),
            header: Some(header),
            rows,
        })
    }

    pub fn empty(path: Utf8PathBuf) -> Self {
        Self {
            path,
            header: None,
            rows: Vec::new(),
        }
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find_duplicate(&self, key: &RowKey) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.key().as_ref() == Some(key))
    }

    // In memory only; `persist` writes the change out.
    pub fn replace(&mut self, index: usize, row: ResultRow) -> Result<(), ScanError> {
        self.check_columns(&row)?;
        let len = self.rows.len();
        let slot = self
            .rows
            .get_mut(index)
            .ok_or_else(|| ScanError::Csv(format!("row {index} out of range for {len} rows")))?;
        *slot = row;
        Ok(())
    }

    pub fn append(&mut self, row: ResultRow) -> Result<(), ScanError> {
        self.check_columns(&row)?;
        append_row(&self.path, &row)?;
        if self.header.is_none() {
            self.header = Some(row.columns());
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn persist(&self) -> Result<(), ScanError> {
        let Some(header) = &self.header else {
            return Ok(());
        };
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let mut temp = Builder::new()
            .prefix(".scorescan")
            .suffix(".csv.tmp")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| ScanError::Filesystem(err.to_string()))?;

        {
            let mut writer = csv_writer(temp.as_file_mut());
            writer
                .write_record(header)
                .map_err(|err| ScanError::Csv(err.to_string()))?;
            for row in &self.rows {
                writer
                    .write_record(row.values())
                    .map_err(|err| ScanError::Csv(err.to_string()))?;
            }
            writer
                .flush()
                .map_err(|err| ScanError::Filesystem(err.to_string()))?;
        }
        if let Ok(metadata) = fs::metadata(self.path.as_std_path()) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|err| ScanError::Filesystem(err.to_string()))?;
        }
        temp.as_file_mut()
            .sync_all()
            .map_err(|err| ScanError::Filesystem(err.to_string()))?;

        temp.persist(self.path.as_std_path())
            .map_err(|err| ScanError::Filesystem(err.to_string()))?;
        info!(path = %self.path, rows = self.rows.len(), "rewrote match data");
        Ok(())
    }

    fn check_columns(&self, row: &ResultRow) -> Result<(), ScanError> {
        match &self.header {
            Some(header) if !row.has_columns(header) => Err(ScanError::HeaderMismatch {
                expected: header.join(","),
                found: row.header_line(),
            }),
            _ => Ok(()),
        }
    }
}


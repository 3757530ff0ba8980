use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::ScanError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanRecord {
    scores: Vec<(String, f64)>,
    labels: Vec<(String, String)>,
}

impl ScanRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_scores<K: Into<String>>(scores: impl IntoIterator<Item = (K, f64)>) -> Self {
        let mut record = Self::new();
        for (key, score) in scores {
            record.insert_score(key.into(), score);
        }
        record
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_label(key.into(), value.into());
        self
    }

    pub fn parse_line(line: &str) -> Result<Self, ScanError> {
        serde_json::from_str(line).map_err(|err| ScanError::MalformedLine(err.to_string()))
    }

    pub fn family<'a>(&'a self, prefix: &str) -> impl Iterator<Item = (&'a str, f64)> {
        self.scores.iter().filter_map(move |(key, score)| {
            key.strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('.'))
                .map(|suffix| (suffix, *score))
        })
    }

    pub fn score(&self, key: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, score)| *score)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    // A repeated key keeps its first position and takes the later value.
    fn insert_score(&mut self, key: String, score: f64) {
        match self.scores.iter_mut().find(|(candidate, _)| *candidate == key) {
            Some(entry) => entry.1 = score,
            None => self.scores.push((key, score)),
        }
    }

    fn insert_label(&mut self, key: String, value: String) {
        match self.labels.iter_mut().find(|(candidate, _)| *candidate == key) {
            Some(entry) => entry.1 = value,
            None => self.labels.push((key, value)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Score(f64),
    Label(String),
}

struct ScanRecordVisitor;

impl<'de> Visitor<'de> for ScanRecordVisitor {
    type Value = ScanRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object mapping option keys to confidence scores")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut record = ScanRecord::new();
        while let Some(key) = map.next_key::<String>()? {
            match map.next_value::<RawValue>() {
                Ok(RawValue::Score(score)) => record.insert_score(key, score),
                Ok(RawValue::Label(value)) => record.insert_label(key, value),
                Err(_) => {
                    return Err(de::Error::custom(format!(
                        "unsupported value for key {key}: expected a number or a string"
                    )));
                }
            }
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for ScanRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ScanRecordVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
}

impl FieldValue {
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => write!(f, "{value}"),
            FieldValue::Int(value) => write!(f, "{value}"),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => FieldValue::Int(value),
            Err(_) => FieldValue::Text(value.to_string()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRow {
    fields: Vec<(String, FieldValue)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((column.into(), value.into()));
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(column, value);
        self
    }

    pub fn from_cells<'a>(
        header: &[String],
        cells: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ScanError> {
        let cells: Vec<&str> = cells.into_iter().collect();
        if cells.len() != header.len() {
            return Err(ScanError::Csv(format!(
                "expected {} fields, found {}",
                header.len(),
                cells.len()
            )));
        }
        let fields = header
            .iter()
            .zip(cells)
            .map(|(column, cell)| (column.clone(), FieldValue::text(cell)))
            .collect();
        Ok(Self { fields })
    }

    pub fn columns(&self) -> Vec<String> {
        self.fields.iter().map(|(column, _)| column.clone()).collect()
    }

    pub fn values(&self) -> Vec<String> {
        self.fields.iter().map(|(_, value)| value.to_string()).collect()
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(candidate, _)| candidate == column)
            .map(|(_, value)| value)
    }

    pub fn header_line(&self) -> String {
        self.columns().join(",")
    }

    pub fn to_line(&self) -> String {
        self.values().join(",")
    }

    pub fn has_columns(&self, header: &[String]) -> bool {
        self.fields.len() == header.len()
            && self
                .fields
                .iter()
                .zip(header)
                .all(|((column, _), expected)| column == expected)
    }

    pub fn key(&self) -> Option<RowKey> {
        Some(RowKey {
            competition: self.get(RowKey::COMPETITION)?.to_string(),
            match_number: self.get(RowKey::MATCH)?.to_string(),
            team: self.get(RowKey::TEAM)?.to_string(),
        })
    }
}

// Compared on CSV text so decoded rows match rows loaded back from disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub competition: String,
    pub match_number: String,
    pub team: String,
}

impl RowKey {
    pub const COMPETITION: &'static str = "competition";
    pub const MATCH: &'static str = "match";
    pub const TEAM: &'static str = "team";
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "competition {} match {} team {}",
            self.competition, self.match_number, self.team
        )
    }
}

use std::collections::BTreeSet;
use std::fmt;
use std::fs;

use camino::Utf8Path;
use serde::Serialize;

use crate::domain::{ResultRow, RowKey};
use crate::error::ScanError;

#[derive(Debug, Clone, Default)]
pub struct TeamRoster {
    teams: BTreeSet<u32>,
}

impl TeamRoster {
    pub fn load(path: &Utf8Path) -> Result<Self, ScanError> {
        if !path.as_std_path().exists() {
            return Err(ScanError::RosterMissing(path.as_std_path().to_path_buf()));
        }
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| ScanError::Filesystem(format!("read {path}: {err}")))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ScanError> {
        let mut teams = BTreeSet::new();
        for (index, line) in content.lines().enumerate() {
            let value = line.trim();
            if value.is_empty() {
                continue;
            }
            let team = value.parse().map_err(|_| ScanError::InvalidRoster {
                line: index + 1,
                value: value.to_string(),
            })?;
            teams.insert(team);
        }
        Ok(Self { teams })
    }

    pub fn contains(&self, team: u32) -> bool {
        self.teams.contains(&team)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl FromIterator<u32> for TeamRoster {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            teams: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchRules {
    pub max_match: u32,
    pub practice_match: u32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            max_match: 200,
            practice_match: 999,
        }
    }
}

impl MatchRules {
    pub fn accepts(&self, match_number: u32) -> bool {
        match_number < self.max_match || match_number == self.practice_match
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum Rejection {
    UnknownTeam(String),
    InvalidMatch(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::UnknownTeam(team) => write!(f, "invalid team number: {team:?}"),
            Rejection::InvalidMatch(number) => write!(f, "invalid match number: {number:?}"),
        }
    }
}

pub fn validate(row: &ResultRow, roster: &TeamRoster, rules: &MatchRules) -> Vec<Rejection> {
    let mut rejections = Vec::new();

    let team = row.get(RowKey::TEAM).map(ToString::to_string).unwrap_or_default();
    let known = team.parse().map(|team| roster.contains(team)).unwrap_or(false);
    if !known {
        rejections.push(Rejection::UnknownTeam(team));
    }

    let number = row.get(RowKey::MATCH).map(ToString::to_string).unwrap_or_default();
    let accepted = number.parse().map(|number| rules.accepts(number)).unwrap_or(false);
    if !accepted {
        rejections.push(Rejection::InvalidMatch(number));
    }

    rejections
}

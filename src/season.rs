use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{FieldValue, ResultRow, RowKey, ScanRecord};
use crate::error::ScanError;
use crate::resolver::{
    resolve_boolean_vector, resolve_digits_or_default, resolve_int_or_default, resolve_or_default,
};

pub const COMPETITION_LABEL: &str = "qr_data";

const MATCH_DIGITS: &[&str] = &["match1", "match2", "match3"];
const TEAM_DIGITS: &[&str] = &["team1", "team2", "team3", "team4", "team5"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Season {
    RoverRuckus,
    RelicRecovery,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::RoverRuckus => write!(f, "rover-ruckus"),
            Season::RelicRecovery => write!(f, "relic-recovery"),
        }
    }
}

impl Season {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Season::RoverRuckus => ROVER_RUCKUS_COLUMNS,
            Season::RelicRecovery => RELIC_RECOVERY_COLUMNS,
        }
    }

    pub fn map_record(self, record: &ScanRecord) -> Result<ResultRow, ScanError> {
        match self {
            Season::RoverRuckus => map_rover_ruckus(record),
            Season::RelicRecovery => map_relic_recovery(record),
        }
    }

    pub fn ensure_keyed(self) -> Result<(), ScanError> {
        for column in [RowKey::COMPETITION, RowKey::MATCH, RowKey::TEAM] {
            if !self.columns().contains(&column) {
                return Err(ScanError::MissingKeyColumn(column.to_string()));
            }
        }
        Ok(())
    }
}

const ROVER_RUCKUS_COLUMNS: &[&str] = &[
    "competition",
    "match",
    "team",
    "matchtype",
    "color",
    "startingside",
    "landed",
    "sampled",
    "claimed",
    "parked",
    "lander",
    "depot",
    "hanging",
    "partincrater",
    "fullyincrater",
    "defense",
    "minor",
    "major",
    "goldhold",
    "silverhold",
    "disconnect",
];

// Single-choice questions answered 0 when left blank.
const ROVER_RUCKUS_FLAGS: &[&str] = &["landed", "sampled", "claimed", "parked"];
const ROVER_RUCKUS_ENDGAME: &[&str] = &[
    "hanging",
    "partincrater",
    "fullyincrater",
    "defense",
    "minor",
    "major",
    "goldhold",
    "silverhold",
    "disconnect",
];

fn map_rover_ruckus(record: &ScanRecord) -> Result<ResultRow, ScanError> {
    let competition = record
        .label(COMPETITION_LABEL)
        .ok_or_else(|| ScanError::MissingKey(COMPETITION_LABEL.to_string()))?;

    let mut row = ResultRow::new()
        .with("competition", competition)
        .with("match", resolve_digits_or_default(record, MATCH_DIGITS, FieldValue::empty())?)
        .with("team", resolve_digits_or_default(record, TEAM_DIGITS, FieldValue::empty())?)
        .with("matchtype", resolve_or_default(record, "matchtype", "Qual"))
        .with("color", resolve_or_default(record, "color", ""))
        .with("startingside", resolve_or_default(record, "side", ""));

    for flag in ROVER_RUCKUS_FLAGS {
        row.push(*flag, option_or_zero(record, flag));
    }
    row.push(
        "lander",
        resolve_digits_or_default(record, &["lander1", "lander2"], FieldValue::empty())?,
    );
    row.push(
        "depot",
        resolve_digits_or_default(record, &["depot1", "depot2"], FieldValue::empty())?,
    );
    for flag in ROVER_RUCKUS_ENDGAME {
        row.push(*flag, option_or_zero(record, flag));
    }
    Ok(row)
}

const RELIC_RECOVERY_COLUMNS: &[&str] = &[
    "match",
    "team",
    "color",
    "autoglyphs",
    "jewel",
    "key",
    "autopark",
    "cipher",
    "rows",
    "columns",
    "glyphs",
    "balanced",
    "zone1relics",
    "zone2relics",
    "zone3relics",
    "standingRelics",
];

fn map_relic_recovery(record: &ScanRecord) -> Result<ResultRow, ScanError> {
    let relic1 = resolve_int_or_default(record, "relic1", 0)?;
    let relic2 = resolve_int_or_default(record, "relic2", 0)?;

    let box1 = Cryptobox::from_record(record, "box1")?;
    let box2 = Cryptobox::from_record(record, "box2")?;

    let zone_count = |zone: i64| i64::from(relic1 == zone) + i64::from(relic2 == zone);

    let row = ResultRow::new()
        .with("match", resolve_digits_or_default(record, MATCH_DIGITS, FieldValue::empty())?)
        .with("team", resolve_digits_or_default(record, TEAM_DIGITS, FieldValue::empty())?)
        .with("color", resolve_or_default(record, "color", ""))
        .with("autoglyphs", option_or_zero(record, "autoglyphs"))
        .with("jewel", resolve_int_or_default(record, "jewel", 0)?)
        .with("key", resolve_int_or_default(record, "key", 0)?)
        .with("autopark", resolve_int_or_default(record, "autopark", 0)?)
        .with(
            "cipher",
            resolve_int_or_default(record, "cipher1", 0)?
                + resolve_int_or_default(record, "cipher2", 0)?,
        )
        .with("rows", (box1.rows() + box2.rows()) as i64)
        .with("columns", (box1.columns() + box2.columns()) as i64)
        .with("glyphs", (box1.glyphs() + box2.glyphs()) as i64)
        .with("balanced", resolve_int_or_default(record, "balanced", 0)?)
        .with("zone1relics", zone_count(1))
        .with("zone2relics", zone_count(2))
        .with("zone3relics", zone_count(3))
        .with(
            "standingRelics",
            resolve_int_or_default(record, "relic1standing", 0)?
                + resolve_int_or_default(record, "relic2standing", 0)?,
        );
    Ok(row)
}

fn option_or_zero(record: &ScanRecord, prefix: &str) -> FieldValue {
    match resolve_or_default(record, prefix, "") {
        "" => FieldValue::Int(0),
        suffix => FieldValue::text(suffix),
    }
}

const GRID_ROWS: usize = 4;
const GRID_COLUMNS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cryptobox([bool; GRID_ROWS * GRID_COLUMNS]);

impl Cryptobox {
    pub const COLUMNS: usize = GRID_COLUMNS;
    pub const CELLS: usize = GRID_ROWS * GRID_COLUMNS;

    pub fn new(cells: [bool; Self::CELLS]) -> Self {
        Self(cells)
    }

    pub fn from_record(record: &ScanRecord, prefix: &str) -> Result<Self, ScanError> {
        let keys: Vec<String> = (1..=Self::CELLS).map(|i| format!("{prefix}.{i}")).collect();
        let filled = resolve_boolean_vector(record, keys.as_slice())?;
        let mut cells = [false; Self::CELLS];
        cells.copy_from_slice(&filled);
        Ok(Self(cells))
    }

    pub fn rows(&self) -> usize {
        self.0
            .chunks(Self::COLUMNS)
            .filter(|row| row.iter().all(|&cell| cell))
            .count()
    }

    pub fn columns(&self) -> usize {
        (0..Self::COLUMNS)
            .filter(|&column| self.0.iter().skip(column).step_by(Self::COLUMNS).all(|&cell| cell))
            .count()
    }

    pub fn glyphs(&self) -> usize {
        self.0.iter().filter(|&&cell| cell).count()
    }
}

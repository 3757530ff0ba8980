use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use scorescan::domain::{FieldValue, ResultRow, RowKey};
use scorescan::error::ScanError;
use scorescan::store::MatchStore;
use scorescan::writer::append_row;

const MATCH_DATA: &str = "competition,match,team,color\nMIQ1,1,5064,red\nMIQ1,2,7129,blue\nMIQ1,3,5064,blue\n";

fn fixture(content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("matches.csv")).unwrap();
    fs::write(&path, content).unwrap();
    (dir, path)
}

fn row(competition: &str, number: i64, team: i64, color: &str) -> ResultRow {
    ResultRow::new()
        .with("competition", competition)
        .with("match", FieldValue::Int(number))
        .with("team", FieldValue::Int(team))
        .with("color", color)
}

#[test]
fn load_reads_every_row() {
    let (_dir, path) = fixture(MATCH_DATA);
    let store = MatchStore::load(&path).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(
        store.header().unwrap(),
        ["competition", "match", "team", "color"]
    );
    assert_eq!(store.rows()[1].to_line(), "MIQ1,2,7129,blue");
}

#[test]
fn load_requires_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("missing.csv")).unwrap();
    assert_matches!(MatchStore::load(&path), Err(ScanError::StoreMissing(_)));
}

#[test]
fn duplicate_lookup_uses_full_key() {
    let (_dir, path) = fixture(MATCH_DATA);
    let store = MatchStore::load(&path).unwrap();

    let key = row("MIQ1", 2, 7129, "red").key().unwrap();
    assert_eq!(store.find_duplicate(&key), Some(1));

    let other_event = RowKey {
        competition: "MIQ2".to_string(),
        ..key
    };
    assert_eq!(store.find_duplicate(&other_event), None);
}

#[test]
fn overwrite_round_trips() {
    let (_dir, path) = fixture(MATCH_DATA);
    let mut store = MatchStore::load(&path).unwrap();

    store.replace(1, row("MIQ1", 2, 7129, "red")).unwrap();
    store.persist().unwrap();
    assert_eq!(store.len(), 3);

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "competition,match,team,color\nMIQ1,1,5064,red\nMIQ1,2,7129,red\nMIQ1,3,5064,blue\n"
    );
    let reloaded = MatchStore::load(&path).unwrap();
    assert_eq!(reloaded.len(), 3);
    for (before, after) in store.rows().iter().zip(reloaded.rows()) {
        assert_eq!(before.to_line(), after.to_line());
    }

    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn append_extends_file_and_memory() {
    let (_dir, path) = fixture(MATCH_DATA);
    let mut store = MatchStore::load(&path).unwrap();

    store.append(row("MIQ1", 4, 7129, "red")).unwrap();
    assert_eq!(store.len(), 4);
    assert!(fs::read_to_string(&path).unwrap().ends_with("MIQ1,3,5064,blue\nMIQ1,4,7129,red\n"));

    let key = row("MIQ1", 4, 7129, "blue").key().unwrap();
    assert_eq!(store.find_duplicate(&key), Some(3));
}

#[test]
fn empty_file_takes_first_header() {
    let (_dir, path) = fixture("");
    let mut store = MatchStore::load(&path).unwrap();
    assert!(store.header().is_none());

    store.append(row("MIQ1", 1, 5064, "red")).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "competition,match,team,color\nMIQ1,1,5064,red\n"
    );
}

#[test]
fn rows_with_other_columns_are_refused() {
    let (_dir, path) = fixture(MATCH_DATA);
    let mut store = MatchStore::load(&path).unwrap();
    let narrow = ResultRow::new().with("competition", "MIQ1").with("match", "1");
    assert_matches!(store.append(narrow), Err(ScanError::HeaderMismatch { .. }));
    assert_eq!(store.len(), 3);
}

#[test]
fn writer_emits_one_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().join("fresh.csv")).unwrap();
    append_row(&path, &row("MIQ1", 1, 5064, "red")).unwrap();
    append_row(&path, &row("MIQ1", 2, 7129, "blue")).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(
        lines,
        vec!["competition,match,team,color", "MIQ1,1,5064,red", "MIQ1,2,7129,blue"]
    );
}

#[test]
fn append_after_unterminated_last_row() {
    let (_dir, path) = fixture(MATCH_DATA.trim_end_matches('\n'));
    let mut store = MatchStore::load(&path).unwrap();

    store.append(row("MIQ1", 4, 7129, "red")).unwrap();
    assert!(fs::read_to_string(&path).unwrap().ends_with("MIQ1,3,5064,blue\nMIQ1,4,7129,red\n"));

    let reloaded = MatchStore::load(&path).unwrap();
    assert_eq!(reloaded.rows().len(), 4);
    assert_eq!(reloaded.rows()[3].to_line(), "MIQ1,4,7129,red");
}

#[cfg(unix)]
#[test]
fn overwrite_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = fixture(MATCH_DATA);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    let mut store = MatchStore::load(&path).unwrap();

    store.replace(0, row("MIQ1", 1, 5064, "blue")).unwrap();
    store.persist().unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}

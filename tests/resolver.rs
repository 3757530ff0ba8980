use assert_matches::assert_matches;

use scorescan::domain::{FieldValue, ScanRecord};
use scorescan::error::ScanError;
use scorescan::resolver::{
    THRESHOLD, resolve, resolve_boolean_vector, resolve_digits_or_default, resolve_or_default,
};

#[test]
fn strict_maximum_above_threshold() {
    let record = ScanRecord::parse_line(
        r#"{"color.red": 0.31, "color.blue": 0.05, "side.depot": 0.3, "side.crater": 0.2}"#,
    )
    .unwrap();
    assert_eq!(resolve(&record, "color").unwrap(), Some("red"));
    assert_eq!(resolve(&record, "side").unwrap(), None);
    assert_eq!(THRESHOLD, 0.3);
}

#[test]
fn missing_family_fails_loudly() {
    let record = ScanRecord::parse_line(r#"{"color.red": 0.9}"#).unwrap();
    assert_matches!(resolve(&record, "parked"), Err(ScanError::EmptyFamily(_)));
    assert_eq!(resolve_or_default(&record, "parked", "0"), "0");
}

#[test]
fn default_when_below_threshold() {
    let record = ScanRecord::parse_line(r#"{"parked.1": 0.2, "parked.0": 0.1}"#).unwrap();
    assert_eq!(resolve_or_default(&record, "parked", "0"), "0");
}

#[test]
fn digits_example() {
    let record =
        ScanRecord::parse_line(r#"{"a.7": 0.9, "a.3": 0.3, "b.2": 0.5, "b.9": 0.1}"#).unwrap();
    let value = resolve_digits_or_default(&record, &["a", "b"], FieldValue::text("X")).unwrap();
    assert_eq!(value, FieldValue::Int(72));
}

#[test]
fn digits_default_when_unanswered() {
    let record = ScanRecord::parse_line(r#"{"a.7": 0.1, "b.2": 0.3}"#).unwrap();
    let value = resolve_digits_or_default(&record, &["a", "b", "c"], FieldValue::text("X")).unwrap();
    assert_eq!(value, FieldValue::text("X"));
}

#[test]
fn boolean_vector_in_key_order() {
    let record = ScanRecord::parse_line(r#"{"box1.2": 0.9, "box1.1": 0.1}"#).unwrap();
    assert_eq!(
        resolve_boolean_vector(&record, &["box1.1", "box1.2"]).unwrap(),
        vec![false, true]
    );
}

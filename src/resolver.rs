use crate::domain::ScanRecord;
use crate::error::ScanError;

pub const THRESHOLD: f64 = 0.3;

/// On equal top scores the option appearing first in the record wins.
pub fn resolve<'a>(record: &'a ScanRecord, prefix: &str) -> Result<Option<&'a str>, ScanError> {
    let mut best: Option<(&'a str, f64)> = None;
    for (suffix, score) in record.family(prefix) {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((suffix, score)),
        }
    }
    let (suffix, score) = best.ok_or_else(|| ScanError::EmptyFamily(prefix.to_string()))?;
    Ok((score > THRESHOLD).then_some(suffix))
}

pub fn resolve_or_default<'a>(record: &'a ScanRecord, prefix: &str, default: &'a str) -> &'a str {
    resolve(record, prefix).ok().flatten().unwrap_or(default)
}

pub fn resolve_int_or_default(
    record: &ScanRecord,
    prefix: &str,
    default: i64,
) -> Result<i64, ScanError> {
    match resolve_optional(record, prefix)? {
        Some(suffix) => suffix.parse().map_err(|_| ScanError::InvalidNumber {
            prefix: prefix.to_string(),
            value: suffix.to_string(),
        }),
        None => Ok(default),
    }
}

pub fn resolve_digits<S: AsRef<str>>(
    record: &ScanRecord,
    prefixes: &[S],
) -> Result<Option<u64>, ScanError> {
    let mut digits = String::new();
    for prefix in prefixes {
        let prefix = prefix.as_ref();
        let Some(suffix) = resolve_optional(record, prefix)? else {
            continue;
        };
        if suffix.is_empty() || !suffix.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ScanError::InvalidDigits {
                prefix: prefix.to_string(),
                value: suffix.to_string(),
            });
        }
        digits.push_str(suffix);
    }

    if digits.is_empty() {
        return Ok(None);
    }
    digits
        .parse()
        .map(Some)
        .map_err(|_| ScanError::InvalidDigits {
            prefix: prefixes
                .iter()
                .map(|prefix| prefix.as_ref())
                .collect::<Vec<_>>()
                .join("+"),
            value: digits.clone(),
        })
}

pub fn resolve_digits_or_default<S: AsRef<str>, T: From<u64>>(
    record: &ScanRecord,
    prefixes: &[S],
    default: T,
) -> Result<T, ScanError> {
    Ok(resolve_digits(record, prefixes)?.map_or(default, T::from))
}

pub fn resolve_boolean_vector<S: AsRef<str>>(
    record: &ScanRecord,
    keys: &[S],
) -> Result<Vec<bool>, ScanError> {
    keys.iter()
        .map(|key| {
            let key = key.as_ref();
            record
                .score(key)
                .map(|score| score > THRESHOLD)
                .ok_or_else(|| ScanError::MissingKey(key.to_string()))
        })
        .collect()
}

fn resolve_optional<'a>(record: &'a ScanRecord, prefix: &str) -> Result<Option<&'a str>, ScanError> {
    match resolve(record, prefix) {
        Err(ScanError::EmptyFamily(_)) => Ok(None),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::FieldValue;

    #[test]
    fn picks_highest_score() {
        let record = ScanRecord::from_scores([("color.red", 0.2), ("color.blue", 0.8)]);
        assert_eq!(resolve(&record, "color").unwrap(), Some("blue"));
    }

    #[test]
    fn threshold_is_exclusive() {
        let record = ScanRecord::from_scores([("parked.1", 0.3), ("parked.0", 0.1)]);
        assert_eq!(resolve(&record, "parked").unwrap(), None);

        let record = ScanRecord::from_scores([("parked.1", 0.30001)]);
        assert_eq!(resolve(&record, "parked").unwrap(), Some("1"));
    }

    #[test]
    fn tie_goes_to_first_option() {
        let record = ScanRecord::from_scores([("side.depot", 0.7), ("side.crater", 0.7)]);
        assert_eq!(resolve(&record, "side").unwrap(), Some("depot"));
    }

    #[test]
    fn empty_family_is_an_error() {
        let record = ScanRecord::from_scores([("color.red", 0.9)]);
        let err = resolve(&record, "side").unwrap_err();
        assert_matches!(err, ScanError::EmptyFamily(prefix) if prefix == "side");
    }

    #[test]
    fn default_covers_absent_and_blank() {
        let record = ScanRecord::from_scores([("color.red", 0.1)]);
        assert_eq!(resolve_or_default(&record, "color", "none"), "none");
        assert_eq!(resolve_or_default(&record, "matchtype", "Qual"), "Qual");
    }

    #[test]
    fn digits_concatenate_in_prefix_order() {
        let record = ScanRecord::from_scores([
            ("a.7", 0.9),
            ("a.1", 0.2),
            ("b.2", 0.5),
            ("b.3", 0.3),
        ]);
        let value = resolve_digits_or_default(&record, &["a", "b"], FieldValue::text("X")).unwrap();
        assert_eq!(value, FieldValue::Int(72));
    }

    #[test]
    fn digits_skip_blank_and_missing_places() {
        let record = ScanRecord::from_scores([("team1.0", 0.1), ("team2.4", 0.9), ("team3.2", 0.8)]);
        let value = resolve_digits(&record, &["team1", "team2", "team3", "team4"]).unwrap();
        assert_eq!(value, Some(42));
    }

    #[test]
    fn digits_default_when_nothing_filled() {
        let record = ScanRecord::from_scores([("match1.1", 0.2), ("match2.5", 0.1)]);
        let value =
            resolve_digits_or_default(&record, &["match1", "match2", "match3"], FieldValue::empty())
                .unwrap();
        assert_eq!(value, FieldValue::empty());
    }

    #[test]
    fn digits_reject_non_digit_suffix() {
        let record = ScanRecord::from_scores([("match1.x", 0.9)]);
        let err = resolve_digits(&record, &["match1"]).unwrap_err();
        assert_matches!(err, ScanError::InvalidDigits { .. });
    }

    #[test]
    fn int_option_parses_suffix() {
        let record = ScanRecord::from_scores([("jewel.1", 0.9), ("key.a", 0.9)]);
        assert_eq!(resolve_int_or_default(&record, "jewel", 0).unwrap(), 1);
        assert_eq!(resolve_int_or_default(&record, "autopark", 0).unwrap(), 0);
        assert_matches!(
            resolve_int_or_default(&record, "key", 0),
            Err(ScanError::InvalidNumber { .. })
        );
    }

    #[test]
    fn boolean_vector_requires_every_key() {
        let record = ScanRecord::from_scores([("box1.1", 0.9), ("box1.2", 0.3)]);
        assert_eq!(
            resolve_boolean_vector(&record, &["box1.1", "box1.2"]).unwrap(),
            vec![true, false]
        );
        let err = resolve_boolean_vector(&record, &["box1.3"]).unwrap_err();
        assert_matches!(err, ScanError::MissingKey(key) if key == "box1.3");
    }
}

//! Template-facing text helpers: Russian plural forms and substring removal.
//!
//! These are plain functions; whatever renders templates registers them under the
//! names it needs.

use std::fmt::Display;
use thiserror::Error;

/// Mistakes in how a template calls a pluralization helper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluralizeError {
    #[error("rupluralize: {0:?} is not an integer count")]
    InvalidCount(String),
    #[error("rupluralize: expected three comma-separated forms, got {0:?}")]
    MalformedEndings(String),
}

fn parse_count(value: &dyn Display) -> Result<i64, PluralizeError> {
    let raw = value.to_string();
    raw.trim()
        .parse::<i64>()
        .map_err(|_| PluralizeError::InvalidCount(raw))
}

fn split_endings(endings: &str) -> Result<[&str; 3], PluralizeError> {
    let forms: Vec<&str> = endings.split(',').map(str::trim).collect();
    match forms.as_slice() {
        [one, few, many] => Ok([*one, *few, *many]),
        _ => Err(PluralizeError::MalformedEndings(endings.to_string())),
    }
}

/// Picks the Russian plural form for `value` from `"one,few,many"`.
///
/// 1, 21, 101 take the first form; 2-4, 22-24 the second; everything else, including
/// 11-14, the third.
pub fn rupluralize(value: impl Display, endings: &str) -> Result<String, PluralizeError> {
    let n = parse_count(&value)?.unsigned_abs();
    let [one, few, many] = split_endings(endings)?;

    let (rem10, rem100) = (n % 10, n % 100);
    let teen = (11..=14).contains(&rem100);
    let form = if rem10 == 1 && !teen {
        one
    } else if (2..=4).contains(&rem10) && !teen {
        few
    } else {
        many
    };
    Ok(form.to_string())
}

/// Like [`rupluralize`] but looks at the last digit only, so 11-14 follow 1-4.
pub fn rupluralize_by_last_digit(
    value: impl Display,
    endings: &str,
) -> Result<String, PluralizeError> {
    let n = parse_count(&value)?.unsigned_abs();
    let [one, few, many] = split_endings(endings)?;

    let form = match n % 10 {
        1 => one,
        2..=4 => few,
        _ => many,
    };
    Ok(form.to_string())
}

/// Removes every occurrence of `arg` from `value`.
pub fn remove(value: &str, arg: &str) -> String {
    if arg.is_empty() {
        return value.to_string();
    }
    value.replace(arg, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use test_case::test_case;

    const GOODS: &str = "товар,товара,товаров";

    #[test_case(1, "товар")]
    #[test_case(2, "товара")]
    #[test_case(5, "товаров")]
    #[test_case(11, "товаров")]
    #[test_case(12, "товаров")]
    #[test_case(14, "товаров")]
    #[test_case(21, "товар")]
    #[test_case(22, "товара")]
    #[test_case(0, "товаров")]
    #[test_case(111, "товаров")]
    #[test_case(1001, "товар")]
    fn strict_forms(n: i64, expected: &str) {
        assert_eq!(rupluralize(n, GOODS).unwrap(), expected);
    }

    #[test_case(1, "товар")]
    #[test_case(3, "товара")]
    #[test_case(11, "товар")]
    #[test_case(12, "товара")]
    #[test_case(15, "товаров")]
    fn last_digit_forms(n: i64, expected: &str) {
        assert_eq!(rupluralize_by_last_digit(n, GOODS).unwrap(), expected);
    }

    #[test]
    fn helpers_disagree_on_teens() {
        assert_eq!(rupluralize(11, GOODS).unwrap(), "товаров");
        assert_eq!(rupluralize_by_last_digit(11, GOODS).unwrap(), "товар");
    }

    #[test]
    fn count_may_come_as_text() {
        assert_eq!(rupluralize(" 3 ", GOODS).unwrap(), "товара");
        assert_eq!(rupluralize("-21", GOODS).unwrap(), "товар");
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert_matches!(rupluralize("много", GOODS), Err(PluralizeError::InvalidCount(_)));
        assert_matches!(
            rupluralize(5, "товар,товара"),
            Err(PluralizeError::MalformedEndings(_))
        );
        assert_matches!(
            rupluralize_by_last_digit(5, "a,b,c,d"),
            Err(PluralizeError::MalformedEndings(_))
        );
    }

    #[test]
    fn remove_drops_every_occurrence() {
        assert_eq!(remove("hello world", "o"), "hell wrld");
        assert_eq!(remove("abc", "z"), "abc");
        assert_eq!(remove("abc", ""), "abc");
        assert_eq!(remove("8 (800) 555-35-35", "-"), "8 (800) 5553535");
    }

    proptest! {
        #[test]
        fn forms_agree_outside_teens(n in 0i64..100_000) {
            prop_assume!(!(11..=14).contains(&(n % 100)));
            prop_assert_eq!(
                rupluralize(n, GOODS).unwrap(),
                rupluralize_by_last_digit(n, GOODS).unwrap()
            );
        }

        #[test]
        fn single_char_removal_is_complete(s in "[a-c ]{0,24}", needle in "[a-c]") {
            let out = remove(&s, &needle);
            prop_assert!(!out.contains(&needle));
            prop_assert_eq!(out.len() + s.matches(&needle).count(), s.len());
        }
    }
}

//! Bus route labels and their natural ordering.
//!
//! Route short names mix digits and letters ("2", "10A", "N7"). Plain string
//! ordering puts "10" before "2"; riders expect the numeric parts to compare
//! as numbers.

use std::cmp::Ordering;

/// One run of a tokenized label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Text(&'a str),
}

/// Split a label into alternating digit and non-digit runs.
fn tokenize(label: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, c) in label.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                tokens.push(make_token(&label[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(prev) = in_digits {
        tokens.push(make_token(&label[start..], prev));
    }

    tokens
}

fn make_token(s: &str, digits: bool) -> Token<'_> {
    if digits {
        Token::Number(s)
    } else {
        Token::Text(s)
    }
}

/// Compare two digit runs by value without overflowing.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare text runs case-insensitively first, then by exact bytes.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// A digit run sorts before a text run at the same position.
fn compare_tokens(a: Token<'_>, b: Token<'_>) -> Ordering {
    match (a, b) {
        (Token::Number(x), Token::Number(y)) => compare_numeric(x, y),
        (Token::Text(x), Token::Text(y)) => compare_text(x, y),
        (Token::Number(_), Token::Text(_)) => Ordering::Less,
        (Token::Text(_), Token::Number(_)) => Ordering::Greater,
    }
}

/// Natural ordering of two route labels.
///
/// Tokens are compared position by position; the first difference decides.
/// When one label's tokens are a prefix of the other's, the shorter label
/// sorts first. Labels whose tokens compare equal ("02" and "2") fall back to
/// byte order so the result is a total order.
///
/// # Examples
///
/// ```
/// use bus_lookup::domain::compare_labels;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_labels("2", "10"), Ordering::Less);
/// assert_eq!(compare_labels("10", "10A"), Ordering::Less);
/// assert_eq!(compare_labels("10A", "9"), Ordering::Greater);
/// ```
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let a_tokens = tokenize(a);
    let b_tokens = tokenize(b);

    a_tokens
        .iter()
        .zip(&b_tokens)
        .map(|(x, y)| compare_tokens(*x, *y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a_tokens.len().cmp(&b_tokens.len()))
        .then_with(|| a.cmp(b))
}

/// Sort labels in natural order, in place.
///
/// # Examples
///
/// ```
/// use bus_lookup::domain::sort_labels;
///
/// let mut labels = vec!["9", "10", "2A", "2"];
/// sort_labels(&mut labels);
/// assert_eq!(labels, ["2", "2A", "9", "10"]);
/// ```
pub fn sort_labels<S: AsRef<str>>(labels: &mut [S]) {
    labels.sort_by(|a, b| compare_labels(a.as_ref(), b.as_ref()));
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn label() -> impl Strategy<Value = String> {
        "[0-9A-Za-z -]{0,6}"
    }

    proptest! {
        #[test]
        fn antisymmetric(a in label(), b in label()) {
            prop_assert_eq!(compare_labels(&a, &b), compare_labels(&b, &a).reverse());
        }

        #[test]
        fn equal_only_when_identical(a in label(), b in label()) {
            prop_assert_eq!(compare_labels(&a, &b) == Ordering::Equal, a == b);
        }

        #[test]
        fn transitive(a in label(), b in label(), c in label()) {
            if compare_labels(&a, &b).is_le() && compare_labels(&b, &c).is_le() {
                prop_assert!(compare_labels(&a, &c).is_le());
            }
        }

        #[test]
        fn pure_numbers_sort_by_value(x in 0u32..100_000, y in 0u32..100_000) {
            prop_assert_eq!(compare_labels(&x.to_string(), &y.to_string()), x.cmp(&y));
        }
    }
}

//! Text functions
//!
//! Positions and lengths count characters, not bytes. Fractional counts are
//! truncated and negative ones read as zero.

use regex::Regex;

fn count(n: f64) -> usize {
    n.max(0.0) as usize
}

/// The first `n` characters
pub fn left(text: &str, n: f64) -> String {
    text.chars().take(count(n)).collect()
}

/// The last `n` characters
pub fn right(text: &str, n: f64) -> String {
    let skip = text.chars().count().saturating_sub(count(n));
    text.chars().skip(skip).collect()
}

/// Characters from `start` up to, not including, `end`
pub fn substring(text: &str, start: f64, end: f64) -> String {
    let (start, end) = (count(start), count(end));
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// The `index`th field of `text` split on `delimiter`, or empty text
pub fn split(text: &str, delimiter: &str, index: f64) -> String {
    if index < 0.0 {
        return String::new();
    }
    if delimiter.is_empty() {
        return text.chars().nth(count(index)).map(String::from).unwrap_or_default();
    }
    text.split(delimiter)
        .nth(count(index))
        .unwrap_or_default()
        .to_string()
}

pub fn length(text: &str) -> usize {
    text.chars().count()
}

/// Whether every part occurs somewhere in `text`
pub fn contains_all(text: &str, parts: &[String]) -> bool {
    parts.iter().all(|part| text.contains(part.as_str()))
}

/// Whether every item is an entry of the comma separated `list`
pub fn contains_items(list: &str, items: &[String]) -> bool {
    let entries: Vec<&str> = list.split(',').map(str::trim).collect();
    items.iter().all(|item| entries.contains(&item.trim()))
}

/// Whether the whole of `text` matches `pattern`
pub fn matches_pattern(text: &str, pattern: &str) -> Result<bool, regex::Error> {
    let regex = Regex::new(&format!("^(?:{pattern})$"))?;
    Ok(regex.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("hello", 2.0, "he", "lo")]
    #[case("hello", 10.0, "hello", "hello")]
    #[case("hello", -1.0, "", "")]
    #[case("héllo", 2.0, "hé", "lo")]
    fn test_left_and_right(#[case] text: &str, #[case] n: f64, #[case] l: &str, #[case] r: &str) {
        assert_eq!(left(text, n), l);
        assert_eq!(right(text, n), r);
    }

    #[test]
    fn test_substring() {
        assert_eq!(substring("abcdef", 1.0, 4.0), "bcd");
        assert_eq!(substring("abcdef", 4.0, 1.0), "");
        assert_eq!(substring("abc", 1.0, 99.0), "bc");
    }

    #[test]
    fn test_split() {
        assert_eq!(split("a,b,c", ",", 1.0), "b");
        assert_eq!(split("a,b,c", ",", 5.0), "");
        assert_eq!(split("a,b,c", ",", -1.0), "");
    }

    #[test]
    fn test_contains() {
        assert!(contains_all("malaria case", &["mal".into(), "case".into()]));
        assert!(!contains_all("malaria", &["case".into()]));
        assert!(contains_items("a, bb,c", &["bb".into(), "a".into()]));
        assert!(!contains_items("a,bb,c", &["b".into()]));
    }

    #[test]
    fn test_pattern_matches_whole_text() {
        assert_eq!(matches_pattern("123", "[0-9]+"), Ok(true));
        assert_eq!(matches_pattern("123a", "[0-9]+"), Ok(false));
        assert!(matches_pattern("x", "(").is_err());
    }
}

//! `META-INF/spring.factories` reader.
//!
//! The file uses the Java properties format. Each value is a
//! comma-separated list of class names.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Key under which failure analyzers are registered.
pub const FAILURE_ANALYZER_KEY: &str = "org.springframework.boot.diagnostics.FailureAnalyzer";

/// Parsed contents of a `spring.factories` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpringFactories {
    entries: HashMap<String, Vec<String>>,
}

impl SpringFactories {
    /// Parse properties text. Later duplicates of a key replace earlier ones.
    pub fn parse(text: &str) -> Self {
        let entries = properties(text)
            .into_iter()
            .map(|(key, value)| (key, split_values(&value)))
            .collect();
        Self { entries }
    }

    /// Read and parse a file. A missing or unreadable file yields `None`.
    pub fn load(path: &Path) -> Option<Self> {
        if !path.is_file() {
            return None;
        }
        match fs::read_to_string(path) {
            Ok(text) => Some(Self::parse(&text)),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot read spring.factories");
                None
            }
        }
    }

    /// Values registered under `key`, in file order. Empty when absent.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.get(key).iter().any(|v| v == value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn split_values(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Key/value pairs of a properties document, in order.
fn properties(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }
        pairs.push(split_pair(&logical));
    }
    pairs
}

/// A line continues when it ends in an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_pair(line: &str) -> (String, String) {
    let mut key_end = line.len();
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = unescape(&line[..key_end]);
    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
        rest = stripped.trim_start();
    }
    (key, unescape(rest))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => out.push_str(&hex),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_empty() {
        let factories = SpringFactories::parse("a=b");
        assert!(factories.get("missing.key").is_empty());
    }

    #[test]
    fn test_values_are_trimmed_in_order() {
        let factories = SpringFactories::parse("k=a, b ,c");
        assert_eq!(factories.get("k"), ["a", "b", "c"]);
    }

    #[test]
    fn test_continuation_lines_and_comments() {
        let text = "# Failure analyzers\n\
                    org.springframework.boot.diagnostics.FailureAnalyzer=\\\n\
                    \x20\x20com.example.FirstFailureAnalyzer,\\\n\
                    \x20\x20com.example.Outer$SecondFailureAnalyzer\n\
                    ! another comment\n\
                    other : x\n";
        let factories = SpringFactories::parse(text);
        assert_eq!(
            factories.get(FAILURE_ANALYZER_KEY),
            [
                "com.example.FirstFailureAnalyzer",
                "com.example.Outer$SecondFailureAnalyzer"
            ]
        );
        assert_eq!(factories.get("other"), ["x"]);
        assert!(factories.contains("other", "x"));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let factories = SpringFactories::parse("k=a,a");
        assert_eq!(factories.get("k"), ["a", "a"]);
    }

    #[test]
    fn test_escapes_in_keys() {
        let factories = SpringFactories::parse("a\\:b=c\nspace\\ key value");
        assert_eq!(factories.get("a:b"), ["c"]);
        assert_eq!(factories.get("space key"), ["value"]);
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SpringFactories::load(&dir.path().join("spring.factories")).is_none());
    }
}

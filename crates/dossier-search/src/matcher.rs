//! Query compilation.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use dossier_core::{Error, Result};

/// A compiled query. Literal queries are escaped into a regex.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    /// Query words used for the verbatim-word bonus.
    words: Vec<String>,
    case_sensitive: bool,
}

/// How a query ended up being compiled.
#[derive(Debug)]
pub enum Compiled {
    /// Compiled as requested.
    Exact(Matcher),
    /// The pattern was invalid and is matched literally instead.
    Literal { matcher: Matcher, error: String },
}

impl Matcher {
    /// Compile `query`, falling back to a literal match when a regex
    /// pattern does not compile.
    pub fn compile(query: &str, use_regex: bool, case_sensitive: bool) -> Result<Compiled> {
        if !use_regex {
            return Self::literal(query, case_sensitive).map(Compiled::Exact);
        }
        match build(query, case_sensitive) {
            Ok(regex) => Ok(Compiled::Exact(Self::new(regex, query, case_sensitive))),
            Err(err) => Ok(Compiled::Literal {
                matcher: Self::literal(query, case_sensitive)?,
                error: err.to_string(),
            }),
        }
    }

    fn literal(query: &str, case_sensitive: bool) -> Result<Self> {
        build(&regex::escape(query), case_sensitive)
            .map(|regex| Self::new(regex, query, case_sensitive))
            .map_err(|e| Error::validation(format!("query cannot be searched: {e}")))
    }

    fn new(regex: Regex, query: &str, case_sensitive: bool) -> Self {
        let words = query
            .split_whitespace()
            .map(|w| {
                if case_sensitive {
                    w.to_string()
                } else {
                    w.to_lowercase()
                }
            })
            .collect();
        Self {
            regex,
            words,
            case_sensitive,
        }
    }

    /// Byte ranges of every non-empty match in `text`.
    pub fn find_all<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Range<usize>> + 'a {
        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| m.range())
    }

    /// Number of query words that occur verbatim in `text`.
    pub fn words_present(&self, text: &str) -> usize {
        if self.case_sensitive {
            self.words.iter().filter(|w| text.contains(w.as_str())).count()
        } else {
            let lowered = text.to_lowercase();
            self.words.iter().filter(|w| lowered.contains(w.as_str())).count()
        }
    }
}

fn build(pattern: &str, case_sensitive: bool) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(query: &str, use_regex: bool, case_sensitive: bool) -> Matcher {
        match Matcher::compile(query, use_regex, case_sensitive).unwrap() {
            Compiled::Exact(m) => m,
            Compiled::Literal { error, .. } => panic!("unexpected fallback: {error}"),
        }
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let m = exact("a.b", false, false);
        assert_eq!(m.find_all("a.b axb").count(), 1);
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let m = exact("rust", false, false);
        assert_eq!(m.find_all("Rust RUST rust").count(), 3);
        let m = exact("rust", false, true);
        assert_eq!(m.find_all("Rust RUST rust").count(), 1);
    }

    #[test]
    fn test_invalid_regex_falls_back() {
        match Matcher::compile("foo(", true, false).unwrap() {
            Compiled::Literal { matcher, .. } => {
                assert_eq!(matcher.find_all("call foo( here").count(), 1);
            }
            Compiled::Exact(_) => panic!("expected fallback"),
        }
    }

    #[test]
    fn test_empty_matches_are_ignored() {
        let m = exact("x*", true, false);
        assert_eq!(m.find_all("abc xx").count(), 1);
    }

    #[test]
    fn test_words_present() {
        let m = exact("Rust Tips", false, false);
        assert_eq!(m.words_present("some rust here"), 1);
        assert_eq!(m.words_present("RUST TIPS"), 2);
    }
}

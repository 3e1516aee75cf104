//! Pattern compilation for URL and content criteria
//!
//! A pattern source picks its matching strategy by shape:
//!
//! - `/body/` (longer than two characters): case-insensitive, multi-line regex
//! - anything containing `*`: anchored, case-insensitive wildcard where each
//!   run of `*` matches any text, newlines included
//! - everything else: case-sensitive substring
//!
//! # Examples
//!
//! ```
//! use cm_core::pattern::Pattern;
//!
//! let p = Pattern::compile("t*est").unwrap();
//! assert!(p.matches("T123EST"));
//! assert!(!p.matches("xtest"));
//! ```

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::{CoreError, CoreResult};

/// Matches any text, newlines included.
const ANY_TEXT: &str = "(?s:.*)";

/// Compiled matching strategy.
#[derive(Debug, Clone)]
enum Strategy {
    Substring,
    Wildcard(Regex),
    Regex(Regex),
}

/// Immutable compiled pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    strategy: Strategy,
}

impl Pattern {
    /// Compile a pattern source.
    ///
    /// Fails with [`CoreError::InvalidPattern`] on an empty source or when the
    /// regex body does not compile.
    pub fn compile(source: &str) -> CoreResult<Self> {
        if source.is_empty() {
            return Err(CoreError::invalid_pattern(source, "pattern cannot be empty"));
        }

        let strategy = if is_regex_shape(source) {
            let body = &source[1..source.len() - 1];
            let regex = RegexBuilder::new(body)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .map_err(|e| CoreError::invalid_pattern(source, e.to_string()))?;
            Strategy::Regex(regex)
        } else if source.contains('*') {
            let regex = RegexBuilder::new(&wildcard_to_regex(source))
                .case_insensitive(true)
                .build()
                .map_err(|e| CoreError::invalid_pattern(source, e.to_string()))?;
            Strategy::Wildcard(regex)
        } else {
            Strategy::Substring
        };

        Ok(Self {
            source: source.to_string(),
            strategy,
        })
    }

    /// Test the pattern against `text`.
    #[inline]
    pub fn matches(&self, text: &str) -> bool {
        match &self.strategy {
            Strategy::Substring => text.contains(self.source.as_str()),
            Strategy::Wildcard(re) | Strategy::Regex(re) => re.is_match(text),
        }
    }

    /// Original pattern source.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_regex(&self) -> bool {
        matches!(self.strategy, Strategy::Regex(_))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.strategy, Strategy::Wildcard(_))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// `/.../` with a non-empty body. A bare `//` is not a regex.
fn is_regex_shape(source: &str) -> bool {
    source.len() > 2 && source.starts_with('/') && source.ends_with('/')
}

/// Translate a wildcard source into an anchored regex, collapsing runs of `*`.
fn wildcard_to_regex(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 16);
    out.push('^');

    let mut literal = String::new();
    let mut prev_star = false;
    for ch in source.chars() {
        if ch == '*' {
            if !prev_star {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(ANY_TEXT);
            }
            prev_star = true;
        } else {
            literal.push(ch);
            prev_star = false;
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');

    out
}

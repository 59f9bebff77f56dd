//! Compiled pattern primitives used by both trust decision points.
//!
//! Patterns arrive as operator configuration. They are validated and
//! compiled once at load time; matching itself never fails.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    /// The configured regex does not parse. Fatal at load time.
    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Glob-style username pattern.
///
/// `*` matches zero or more characters; everything else is literal.
/// Matching is case-sensitive and anchored at both ends, so `h*s` matches
/// `hans` and `hs` but neither `hanswurst` nor `kleinerhans`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernamePattern {
    raw: String,
    segments: Vec<String>,
}

impl UsernamePattern {
    /// Compile a wildcard pattern.
    ///
    /// Infallible: every string is a valid pattern. A pattern without `*`
    /// is an exact-equality match.
    pub fn compile(pattern: &str) -> Self {
        Self {
            raw: pattern.to_string(),
            segments: pattern.split('*').map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whole-value match: both the leading and the trailing literal are
    /// binding, a candidate with extra characters on either end is rejected.
    pub fn matches(&self, candidate: &str) -> bool {
        match self.segments.as_slice() {
            [] => candidate.is_empty(),
            [exact] => candidate == exact,
            [first, middle @ .., last] => {
                let Some(mut rest) = candidate.strip_prefix(first.as_str()) else {
                    return false;
                };
                for segment in middle {
                    if segment.is_empty() {
                        continue;
                    }
                    match rest.find(segment.as_str()) {
                        Some(at) => rest = &rest[at + segment.len()..],
                        None => return false,
                    }
                }
                rest.ends_with(last.as_str())
            }
        }
    }
}

impl core::fmt::Display for UsernamePattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Attestation-attribute pattern backed by a regular expression.
///
/// Search semantics: the regex needs to match somewhere in the value, it is
/// not anchored to the whole string.
#[derive(Debug, Clone)]
pub struct AttributePattern {
    raw: String,
    regex: Regex,
}

impl AttributePattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern).map_err(|source| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl core::fmt::Display for AttributePattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.raw)
    }
}

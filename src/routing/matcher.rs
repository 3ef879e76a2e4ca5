//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix on whole path segments (case-sensitive)
//! - Strip the matched prefix from the forwarded path
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/weather` matches `/weather` and `/weather/...`, never `/weatherman`
//! - No regex to guarantee O(n) matching

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` is the prefix or lies below it.
    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }

    /// Remove the prefix once, returning the remaining path.
    ///
    /// The remainder is empty or starts with `/`.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

//! Paths whose CORS policy is open to any origin.
//!
//! Matching is case-insensitive. A pattern matches the identical path or any
//! path below it on a segment boundary: `/connect/token` matches
//! `/connect/token` and `/connect/token/x`, not `/connect/tokens`.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathPatternError {
    #[error("empty path pattern")]
    Empty,
    #[error("path pattern {pattern:?} would allow-list every path")]
    Root { pattern: String },
    #[error("path pattern {pattern:?} contains invalid character {ch:?}")]
    InvalidCharacter { pattern: String, ch: char },
    #[error("path pattern {pattern:?} contains an empty segment")]
    EmptySegment { pattern: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSource {
    /// Part of the startup configuration.
    Static,
    /// Added by a route-owning module while the application is assembled.
    Registered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    pattern: String,
    source: PatternSource,
}

impl PathPattern {
    /// Parse a pattern. A missing leading `/` is added and a trailing `/` is dropped.
    pub fn parse(raw: &str, source: PatternSource) -> Result<Self, PathPatternError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathPatternError::Empty);
        }

        if let Some(ch) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '?' | '#' | '*'))
        {
            return Err(PathPatternError::InvalidCharacter {
                pattern: raw.to_string(),
                ch,
            });
        }

        let body = trimmed.trim_start_matches('/');
        let body = body.strip_suffix('/').unwrap_or(body);
        if body.is_empty() {
            return Err(PathPatternError::Root {
                pattern: raw.to_string(),
            });
        }
        if body.split('/').any(str::is_empty) {
            return Err(PathPatternError::EmptySegment {
                pattern: raw.to_string(),
            });
        }

        Ok(Self {
            pattern: format!("/{}", body.to_ascii_lowercase()),
            source,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn source(&self) -> PatternSource {
        self.source
    }

    // `path` must already be lowercased.
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.pattern.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathAllowList {
    patterns: Vec<PathPattern>,
}

impl PathAllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_static<I, S>(paths: I) -> Result<Self, PathPatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for path in paths {
            list.push(PathPattern::parse(path.as_ref(), PatternSource::Static)?);
        }
        Ok(list)
    }

    /// Add a pattern. Only reachable while the list is still owned mutably,
    /// i.e. before it is shared with request handlers.
    pub fn register(&mut self, pattern: &str) -> Result<(), PathPatternError> {
        self.push(PathPattern::parse(pattern, PatternSource::Registered)?);
        Ok(())
    }

    fn push(&mut self, pattern: PathPattern) {
        if self.patterns.iter().all(|p| p.pattern != pattern.pattern) {
            self.patterns.push(pattern);
        }
    }

    pub fn is_allow_listed(&self, path: &str) -> bool {
        let path = path.to_ascii_lowercase();
        self.patterns.iter().any(|p| p.matches(&path))
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

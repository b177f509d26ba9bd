//! Ordered glob pattern to handler rules.
//!
//! Rules are built once through [`RulesBuilder`] and then frozen into a
//! [`PatternRules`] value. A load session clones the rules it is given, so
//! later changes to a builder never reach a load already in flight.

use std::fmt;
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};

use super::handlers::{ContentHandler, JsonHandler, MetadataHandler, RawTextHandler};
use crate::{Error, Result};

/// One glob pattern and the handler it selects.
#[derive(Clone)]
pub struct PatternRule {
    pattern: String,
    matcher: GlobMatcher,
    matches_hidden: bool,
    handler: Arc<dyn ContentHandler>,
}

impl PatternRule {
    /// Compile `pattern` and pair it with `handler`.
    ///
    /// `*` and `?` never cross a path separator; `**` follows the usual
    /// any-number-of-directories convention. Names starting with `.` only
    /// match when the pattern's last segment starts with a literal `.`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the glob does not compile.
    pub fn new(pattern: impl Into<String>, handler: Arc<dyn ContentHandler>) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(Error::invalid_pattern(pattern, "pattern is empty"));
        }

        let matcher = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::invalid_pattern(&pattern, e.kind()))?
            .compile_matcher();
        let matches_hidden = pattern
            .rsplit('/')
            .next()
            .is_some_and(|segment| segment.starts_with('.'));

        Ok(Self {
            pattern,
            matcher,
            matches_hidden,
            handler,
        })
    }

    /// The glob source text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The handler this rule dispatches to.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn ContentHandler> {
        &self.handler
    }

    /// Check whether a file's base name matches this rule.
    #[must_use]
    pub fn matches(&self, file_name: &std::ffi::OsStr) -> bool {
        if !self.matches_hidden && file_name.as_encoded_bytes().first() == Some(&b'.') {
            return false;
        }
        self.matcher.is_match(file_name)
    }
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRule")
            .field("pattern", &self.pattern)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Immutable, ordered rule list. The first matching rule wins.
#[derive(Debug, Clone)]
pub struct PatternRules {
    rules: Vec<PatternRule>,
}

impl PatternRules {
    /// Rules with nothing in them: every file is skipped.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// One rule per pattern, all dispatching to `handler`.
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern does not compile.
    pub fn uniform<I, S>(patterns: I, handler: &Arc<dyn ContentHandler>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rules = patterns
            .into_iter()
            .map(|p| PatternRule::new(p, Arc::clone(handler)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Metadata-only rules for a scan.
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern does not compile.
    pub fn scan(patterns: &Patterns) -> Result<Self> {
        let handler: Arc<dyn ContentHandler> = Arc::new(MetadataHandler);
        Self::uniform(patterns.iter().map(String::as_str), &handler)
    }

    /// Start a builder that appends after these rules.
    ///
    /// `self` is left untouched.
    #[must_use]
    pub fn extend_with(
        &self,
        pattern: impl Into<String>,
        handler: impl ContentHandler + 'static,
    ) -> RulesBuilder {
        RulesBuilder {
            rules: Ok(self.rules.clone()),
        }
        .handle(pattern, handler)
    }

    /// The first rule whose pattern matches `file_name`.
    #[must_use]
    pub fn first_match(&self, file_name: &std::ffi::OsStr) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.matches(file_name))
    }

    /// Iterate rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for PatternRules {
    /// `*.json` parsed as JSON, everything else loaded as UTF-8 text.
    fn default() -> Self {
        let json: Arc<dyn ContentHandler> = Arc::new(JsonHandler);
        let text: Arc<dyn ContentHandler> = Arc::new(RawTextHandler);
        // Both patterns are static and known to compile.
        let rules = [("*.json", json), ("*", text)]
            .into_iter()
            .filter_map(|(pattern, handler)| PatternRule::new(pattern, handler).ok())
            .collect();
        Self { rules }
    }
}

impl<'a> IntoIterator for &'a PatternRules {
    type Item = &'a PatternRule;
    type IntoIter = std::slice::Iter<'a, PatternRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Fluent rule-list builder.
///
/// A bad pattern is remembered and reported by [`RulesBuilder::build`], so
/// calls can be chained without checking each one.
#[derive(Debug)]
#[must_use]
pub struct RulesBuilder {
    rules: Result<Vec<PatternRule>>,
}

impl RulesBuilder {
    /// Start an empty builder.
    pub const fn new() -> Self {
        Self {
            rules: Ok(Vec::new()),
        }
    }

    /// Append a rule after the existing ones.
    pub fn handle(self, pattern: impl Into<String>, handler: impl ContentHandler + 'static) -> Self {
        self.handle_shared(pattern, Arc::new(handler))
    }

    /// Append a rule whose handler is already shared.
    pub fn handle_shared(
        mut self,
        pattern: impl Into<String>,
        handler: Arc<dyn ContentHandler>,
    ) -> Self {
        if let Ok(rules) = self.rules.as_mut() {
            match PatternRule::new(pattern, handler) {
                Ok(rule) => rules.push(rule),
                Err(e) => self.rules = Err(e),
            }
        }
        self
    }

    /// Freeze the rules.
    ///
    /// # Errors
    ///
    /// Returns the first pattern compile error seen while building.
    pub fn build(self) -> Result<PatternRules> {
        self.rules.map(|rules| PatternRules { rules })
    }
}

impl Default for RulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Start a rule list with one rule.
///
/// ```
/// use fileindex::{handle, JsonHandler, RawBytesHandler};
///
/// let rules = handle("*.json", JsonHandler)
///     .handle("*", RawBytesHandler)
///     .build()
///     .unwrap();
/// assert_eq!(rules.len(), 2);
/// ```
pub fn handle(pattern: impl Into<String>, handler: impl ContentHandler + 'static) -> RulesBuilder {
    RulesBuilder::new().handle(pattern, handler)
}

/// One or more glob patterns, as accepted by [`crate::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patterns(Vec<String>);

impl Patterns {
    /// Iterate the patterns.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self(vec!["*".to_string()])
    }
}

impl From<&str> for Patterns {
    fn from(pattern: &str) -> Self {
        Self(vec![pattern.to_string()])
    }
}

impl From<String> for Patterns {
    fn from(pattern: String) -> Self {
        Self(vec![pattern])
    }
}

impl<S: Into<String>> From<Vec<S>> for Patterns {
    fn from(patterns: Vec<S>) -> Self {
        Self(patterns.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for Patterns {
    fn from(patterns: &[&str]) -> Self {
        Self(patterns.iter().map(|p| (*p).to_string()).collect())
    }
}

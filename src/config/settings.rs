//! Configuration settings and validation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::index::{handlers, PatternRules, RulesBuilder};
use crate::{Error, Result};

/// Read bound used unless configured otherwise; keeps large trees under
/// typical open-file limits.
pub const DEFAULT_MAX_CONCURRENT_READS: usize = 256;

/// One `PATTERN=HANDLER` rule as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    /// Glob pattern matched against file names.
    pub pattern: String,
    /// Built-in handler name (see [`handlers::HANDLER_NAMES`]).
    pub handler: String,
}

impl FromStr for RuleSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (pattern, handler) = s
            .rsplit_once('=')
            .ok_or_else(|| Error::config(format!("rule '{s}' must look like PATTERN=HANDLER")))?;

        Ok(Self {
            pattern: pattern.trim().to_string(),
            handler: handler.trim().to_string(),
        })
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.pattern, self.handler)
    }
}

/// Main configuration for a fileindex run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Paths to walk.
    pub roots: Vec<PathBuf>,

    /// Rules in priority order. Empty means the default rules.
    pub rules: Vec<RuleSpec>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON.
    pub log_json: bool,

    /// Upper bound on handler invocations in flight. `None` is unbounded.
    pub max_concurrent_reads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            rules: Vec::new(),
            log_level: "info".to_string(),
            log_json: false,
            max_concurrent_reads: Some(DEFAULT_MAX_CONCURRENT_READS),
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            return Err(Error::invalid_argument("at least one path is required"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.max_concurrent_reads == Some(0) {
            return Err(Error::config("max_concurrent_reads cannot be 0"));
        }

        for rule in &self.rules {
            if rule.pattern.is_empty() {
                return Err(Error::config(format!("rule '{rule}' has an empty pattern")));
            }
            if handlers::by_name(&rule.handler).is_none() {
                return Err(Error::config(format!(
                    "unknown handler '{}', must be one of: {}",
                    rule.handler,
                    handlers::HANDLER_NAMES.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Compile the configured rules, or the defaults when none are set.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown handler or a pattern that does not compile.
    pub fn pattern_rules(&self) -> Result<PatternRules> {
        if self.rules.is_empty() {
            return Ok(PatternRules::default());
        }

        self.rules
            .iter()
            .try_fold(RulesBuilder::new(), |builder, rule| {
                let handler = handlers::by_name(&rule.handler)
                    .ok_or_else(|| Error::config(format!("unknown handler '{}'", rule.handler)))?;
                Ok::<_, Error>(builder.handle_shared(rule.pattern.clone(), handler))
            })?
            .build()
    }
}

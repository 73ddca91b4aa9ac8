//! Parser configuration: the MySQL `sql_mode` flags that change how text
//! is tokenized or how operators bind, plus the nesting limit.

use serde::{Deserialize, Serialize};

/// Default nesting limit for expressions, subqueries and parenthesized
/// table references.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Options for a single parse. The keyword and precedence tables are fixed;
/// only these dialect switches vary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Nesting depth at which parsing stops with `RecursionLimitExceeded`.
    pub max_depth: u32,
    /// `ANSI_QUOTES`: `"x"` is a quoted identifier rather than a string.
    pub ansi_quotes: bool,
    /// `NO_BACKSLASH_ESCAPES`: `\` is an ordinary character in strings.
    pub no_backslash_escapes: bool,
    /// `PIPES_AS_CONCAT`: `||` concatenates instead of meaning `OR`.
    pub pipes_as_concat: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            ansi_quotes: false,
            no_backslash_escapes: false,
            pipes_as_concat: false,
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_ansi_quotes(mut self, on: bool) -> Self {
        self.ansi_quotes = on;
        self
    }

    #[must_use]
    pub const fn with_no_backslash_escapes(mut self, on: bool) -> Self {
        self.no_backslash_escapes = on;
        self
    }

    #[must_use]
    pub const fn with_pipes_as_concat(mut self, on: bool) -> Self {
        self.pipes_as_concat = on;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ParserConfig::default();
        assert_eq!(cfg.max_depth, 64);
        assert!(!cfg.ansi_quotes);
        assert!(!cfg.no_backslash_escapes);
        assert!(!cfg.pipes_as_concat);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: ParserConfig = toml::from_str("ansi_quotes = true\n").expect("toml");
        assert!(cfg.ansi_quotes);
        assert_eq!(cfg.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_json_round_trip() {
        let cfg = ParserConfig::default()
            .with_max_depth(8)
            .with_pipes_as_concat(true);
        let json = serde_json::to_string(&cfg).expect("serialize");
        let back: ParserConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, cfg);
    }
}

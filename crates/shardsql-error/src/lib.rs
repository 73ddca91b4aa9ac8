//! Error taxonomy for the shardsql MySQL DML parser.
//!
//! Three failure families exist: lexical errors (an unrecognized character or
//! an unterminated literal), syntax errors (no grammar rule matched), and
//! recursion-limit trips (pathologically nested input). Every error carries a
//! [`Position`] pointing into the original SQL text.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A location in the SQL source text.
///
/// `offset` is a byte offset; `line` and `column` are 1-based, with the column
/// counted in characters so it lines up with what an editor shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// The first character of the input.
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        column: 1,
    };

    #[must_use]
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ---------------------------------------------------------------------------
// Lexical errors
// ---------------------------------------------------------------------------

/// What went wrong while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum LexErrorKind {
    /// A character that cannot start any token.
    UnexpectedChar(char),
    /// A string literal with no closing quote before end of input.
    UnterminatedString { quote: char },
    /// A quoted identifier with no closing quote before end of input.
    UnterminatedIdentifier { quote: char },
    /// A `/* ...` comment with no closing `*/`.
    UnterminatedComment,
    /// A numeric, hex or bit literal that is not well formed.
    MalformedNumber(String),
    /// Source longer than a `u32` byte offset can address.
    InputTooLarge { len: usize },
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar(ch) => write!(f, "unexpected character {ch:?}"),
            Self::UnterminatedString { quote } => {
                write!(f, "unterminated string literal (missing closing {quote})")
            }
            Self::UnterminatedIdentifier { quote } => {
                write!(f, "unterminated quoted identifier (missing closing {quote})")
            }
            Self::UnterminatedComment => f.write_str("unterminated block comment"),
            Self::MalformedNumber(text) => write!(f, "malformed numeric literal {text:?}"),
            Self::InputTooLarge { len } => {
                write!(f, "input of {len} bytes exceeds the {} byte limit", u32::MAX)
            }
        }
    }
}

/// A tokenizer failure. Fatal for the current parse.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{position}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

impl LexError {
    #[must_use]
    pub const fn new(kind: LexErrorKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// The offending character, when the failure is an unrecognized one.
    #[must_use]
    pub const fn unexpected_char(&self) -> Option<char> {
        match self.kind {
            LexErrorKind::UnexpectedChar(ch) => Some(ch),
            _ => None,
        }
    }

    /// Whether the input ended inside a literal, identifier or comment.
    #[must_use]
    pub const fn is_unterminated(&self) -> bool {
        matches!(
            self.kind,
            LexErrorKind::UnterminatedString { .. }
                | LexErrorKind::UnterminatedIdentifier { .. }
                | LexErrorKind::UnterminatedComment
        )
    }
}

// ---------------------------------------------------------------------------
// Syntax errors
// ---------------------------------------------------------------------------

/// A grammar rule could not match the token at `position`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{position}: expected {}, found {found}", describe_expected(.expected))]
pub struct SyntaxError {
    /// Sorted, de-duplicated descriptions of what would have been accepted.
    pub expected: Vec<String>,
    /// Description of the offending token.
    pub found: String,
    pub position: Position,
}

impl SyntaxError {
    #[must_use]
    pub fn new<I, S>(position: Position, expected: I, found: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut expected: Vec<String> = expected.into_iter().map(Into::into).collect();
        expected.sort();
        expected.dedup();
        Self {
            expected,
            found: found.into(),
            position,
        }
    }

    /// Combine two failures from competing alternatives.
    ///
    /// The one that got further into the input wins; at the same offset the
    /// expected sets are unioned.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match self.position.offset.cmp(&other.position.offset) {
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Equal => {
                let found = self.found;
                let position = self.position;
                Self::new(position, self.expected.into_iter().chain(other.expected), found)
            }
        }
    }
}

fn describe_expected(expected: &[String]) -> String {
    match expected {
        [] => "a valid token".to_owned(),
        [only] => only.clone(),
        [init @ .., last] => format!("one of {}, or {last}", init.join(", ")),
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Any failure produced while turning SQL text into an AST.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SqlError {
    #[error("lexical error at {0}")]
    Lex(#[from] LexError),

    #[error("syntax error at {0}")]
    Syntax(#[from] SyntaxError),

    /// Nesting went past the configured depth; reported instead of
    /// overflowing the call stack.
    #[error("statement too deeply nested at {position} (limit {limit})")]
    RecursionLimitExceeded { limit: u32, position: Position },
}

impl SqlError {
    /// Where in the source the failure was detected.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Lex(e) => e.position,
            Self::Syntax(e) => e.position,
            Self::RecursionLimitExceeded { position, .. } => *position,
        }
    }

    #[must_use]
    pub const fn is_lexical(&self) -> bool {
        matches!(self, Self::Lex(_))
    }

    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }

    /// Render the offending source line with a caret under the error column.
    #[must_use]
    pub fn render_snippet(&self, source: &str) -> String {
        let position = self.position();
        let line_index = position.line.saturating_sub(1) as usize;
        let text = source.lines().nth(line_index).unwrap_or("");
        let gutter = position.line.to_string();
        let pad = " ".repeat(gutter.len());
        let caret_col = position.column.saturating_sub(1) as usize;
        format!(
            "{self}\n{pad} |\n{gutter} | {text}\n{pad} | {}^",
            " ".repeat(caret_col)
        )
    }
}

/// Result alias used throughout the parser crates.
pub type Result<T> = std::result::Result<T, SqlError>;

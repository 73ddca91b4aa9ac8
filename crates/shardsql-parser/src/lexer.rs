// MySQL DML lexer.
//
// Converts SQL text into tokens. memchr drives the scans for quotes, line
// ends and comment terminators. Positions are tracked as a byte offset plus
// a 1-based line and character column.

use std::sync::atomic::{AtomicU64, Ordering};

use memchr::{memchr, memchr_iter, memchr2, memmem, memrchr};
use serde::Serialize;
use shardsql_ast::Span;
use shardsql_error::{LexError, LexErrorKind, Position};

use crate::config::ParserConfig;
use crate::token::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

static SHARDSQL_TOKENIZE_CALLS_TOTAL: AtomicU64 = AtomicU64::new(0);
static SHARDSQL_TOKENS_TOTAL: AtomicU64 = AtomicU64::new(0);
static SHARDSQL_TOKENIZE_ERRORS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Point-in-time view of the lexer counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TokenizeMetricsSnapshot {
    /// Lexers constructed (one per tokenize call or parse).
    pub calls: u64,
    /// Tokens produced, `Eof` included.
    pub tokens: u64,
    /// Lexical errors raised.
    pub errors: u64,
}

#[must_use]
pub fn tokenize_metrics_snapshot() -> TokenizeMetricsSnapshot {
    TokenizeMetricsSnapshot {
        calls: SHARDSQL_TOKENIZE_CALLS_TOTAL.load(Ordering::Relaxed),
        tokens: SHARDSQL_TOKENS_TOTAL.load(Ordering::Relaxed),
        errors: SHARDSQL_TOKENIZE_ERRORS_TOTAL.load(Ordering::Relaxed),
    }
}

pub fn reset_tokenize_metrics() {
    SHARDSQL_TOKENIZE_CALLS_TOTAL.store(0, Ordering::Relaxed);
    SHARDSQL_TOKENS_TOTAL.store(0, Ordering::Relaxed);
    SHARDSQL_TOKENIZE_ERRORS_TOTAL.store(0, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// Lazy tokenizer over one SQL string.
///
/// Iterating yields tokens in source order and stops after `Eof` or the first
/// error. A lexer is single-use.
pub struct Lexer<'a> {
    source: &'a str,
    src: &'a [u8],
    /// Current byte offset into `src`.
    pos: usize,
    /// Current line (1-based).
    line: u32,
    /// Current column in characters (1-based).
    col: u32,
    ansi_quotes: bool,
    no_backslash_escapes: bool,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Lexer for MySQL's default SQL mode.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self::with_config(source, &ParserConfig::default())
    }

    #[must_use]
    pub fn with_config(source: &'a str, config: &ParserConfig) -> Self {
        SHARDSQL_TOKENIZE_CALLS_TOTAL.fetch_add(1, Ordering::Relaxed);
        Self {
            source,
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            ansi_quotes: config.ansi_quotes,
            no_backslash_escapes: config.no_backslash_escapes,
            done: false,
        }
    }

    /// Where the lexer currently stands.
    #[must_use]
    pub fn current_position(&self) -> Position {
        Position::new(self.pos as u32, self.line, self.col)
    }

    /// Produce the next token, or the error that stops tokenization.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let result = self.scan_token();
        match &result {
            Ok(_) => SHARDSQL_TOKENS_TOTAL.fetch_add(1, Ordering::Relaxed),
            Err(_) => SHARDSQL_TOKENIZE_ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed),
        };
        result
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        check_source_len(self.src.len())?;
        self.skip_trivia()?;

        let start = self.pos;
        let at = self.current_position();
        let Some(&ch) = self.src.get(start) else {
            return Ok(self.token_from(TokenKind::Eof, start, at));
        };

        let kind = match ch {
            b'\'' => self.lex_string(b'\'', at)?,
            b'"' if self.ansi_quotes => self.lex_quoted_id(b'"', at)?,
            b'"' => self.lex_string(b'"', at)?,
            b'`' => self.lex_quoted_id(b'`', at)?,

            // X'1F', B'101', N'text'
            b'x' | b'X' if self.peek_at(1) == Some(b'\'') => self.lex_digit_string(16, at)?,
            b'b' | b'B' if self.peek_at(1) == Some(b'\'') => self.lex_digit_string(2, at)?,
            b'n' | b'N' if self.peek_at(1) == Some(b'\'') => {
                self.bump(1);
                self.lex_string(b'\'', at)?
            }

            b'0'..=b'9' => self.lex_number(at)?,
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number(at)?,
            c if is_ident_start(c) => self.lex_word(),

            b'?' => self.single(TokenKind::Question),
            b'+' => self.single(TokenKind::Plus),
            b'-' => self.single(TokenKind::Minus),
            b'*' => self.single(TokenKind::Star),
            b'/' => self.single(TokenKind::Slash),
            b'%' => self.single(TokenKind::Percent),
            b'^' => self.single(TokenKind::Caret),
            b'~' => self.single(TokenKind::Tilde),
            b'=' => self.single(TokenKind::Eq),
            b'.' => self.single(TokenKind::Dot),
            b',' => self.single(TokenKind::Comma),
            b';' => self.single(TokenKind::Semicolon),
            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b'{' => self.single(TokenKind::LeftBrace),
            b'}' => self.single(TokenKind::RightBrace),

            // Multi-character operators, longest match first.
            b'<' => match (self.peek_at(1), self.peek_at(2)) {
                (Some(b'='), Some(b'>')) => self.multi(3, TokenKind::NullSafeEq),
                (Some(b'='), _) => self.multi(2, TokenKind::Le),
                (Some(b'>'), _) => self.multi(2, TokenKind::LtGt),
                (Some(b'<'), _) => self.multi(2, TokenKind::ShiftLeft),
                _ => self.single(TokenKind::Lt),
            },
            b'>' => match self.peek_at(1) {
                Some(b'=') => self.multi(2, TokenKind::Ge),
                Some(b'>') => self.multi(2, TokenKind::ShiftRight),
                _ => self.single(TokenKind::Gt),
            },
            b'!' => match self.peek_at(1) {
                Some(b'=') => self.multi(2, TokenKind::Ne),
                _ => self.single(TokenKind::Bang),
            },
            b'|' => match self.peek_at(1) {
                Some(b'|') => self.multi(2, TokenKind::PipePipe),
                _ => self.single(TokenKind::Pipe),
            },
            b'&' => match self.peek_at(1) {
                Some(b'&') => self.multi(2, TokenKind::AmpAmp),
                _ => self.single(TokenKind::Ampersand),
            },

            _ => {
                let unexpected = self.source[start..].chars().next().unwrap_or('\u{FFFD}');
                return Err(LexError::new(LexErrorKind::UnexpectedChar(unexpected), at));
            }
        };

        Ok(self.token_from(kind, start, at))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn token_from(&self, kind: TokenKind, start: usize, at: Position) -> Token {
        Token {
            kind,
            span: Span::new(start as u32, self.pos as u32, at.line, at.column),
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    /// Skip `n` ASCII bytes that contain no line break.
    fn bump(&mut self, n: usize) {
        self.pos += n;
        self.col += n as u32;
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump(1);
        kind
    }

    fn multi(&mut self, n: usize, kind: TokenKind) -> TokenKind {
        self.bump(n);
        kind
    }

    /// Move to byte offset `end`, keeping line and column in step.
    fn advance_to(&mut self, end: usize) {
        let chunk = &self.src[self.pos..end];
        let newlines = memchr_iter(b'\n', chunk).count();
        if newlines == 0 {
            self.col += char_count(chunk);
        } else {
            self.line += newlines as u32;
            let tail = memrchr(b'\n', chunk).map_or(0, |i| i + 1);
            self.col = 1 + char_count(&chunk[tail..]);
        }
        self.pos = end;
    }

    fn scan_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        self.src[from..]
            .iter()
            .position(|&b| !pred(b))
            .map_or(self.src.len(), |i| from + i)
    }

    /// Skip whitespace, `#` and `-- ` line comments, and `/* */` block
    /// comments (including `/*! */`, which is treated as an ordinary comment).
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            let Some(&b) = self.src.get(self.pos) else {
                return Ok(());
            };
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C => {
                    let end = self.scan_while(self.pos, |c| {
                        matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C)
                    });
                    self.advance_to(end);
                }
                b'#' => self.skip_line(),
                b'-' if self.peek_at(1) == Some(b'-')
                    && self.peek_at(2).is_none_or(|c| c <= b' ') =>
                {
                    self.skip_line();
                }
                b'/' if self.peek_at(1) == Some(b'*') => {
                    let at = self.current_position();
                    match memmem::find(&self.src[self.pos + 2..], b"*/") {
                        Some(offset) => self.advance_to(self.pos + 2 + offset + 2),
                        None => {
                            self.advance_to(self.src.len());
                            return Err(LexError::new(LexErrorKind::UnterminatedComment, at));
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        let end = memchr(b'\n', &self.src[self.pos..]).map_or(self.src.len(), |i| self.pos + i + 1);
        self.advance_to(end);
    }

    // -----------------------------------------------------------------------
    // Literal tokenizers
    // -----------------------------------------------------------------------

    /// Lex a quoted string. Handles doubled quotes and, unless
    /// `NO_BACKSLASH_ESCAPES` is on, backslash escapes.
    fn lex_string(&mut self, quote: u8, at: Position) -> Result<TokenKind, LexError> {
        let unterminated = || {
            LexError::new(
                LexErrorKind::UnterminatedString {
                    quote: quote as char,
                },
                at,
            )
        };
        self.bump(1);

        let mut value = String::new();
        loop {
            let rest = &self.src[self.pos..];
            let hit = if self.no_backslash_escapes {
                memchr(quote, rest)
            } else {
                memchr2(quote, b'\\', rest)
            };
            let Some(offset) = hit else {
                self.advance_to(self.src.len());
                return Err(unterminated());
            };
            let stop = self.pos + offset;
            value.push_str(&self.source[self.pos..stop]);
            self.advance_to(stop);

            if self.src[stop] == b'\\' {
                let Some(escaped) = self.source[stop + 1..].chars().next() else {
                    self.advance_to(self.src.len());
                    return Err(unterminated());
                };
                match escaped {
                    '0' => value.push('\0'),
                    'b' => value.push('\u{8}'),
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    'Z' => value.push('\u{1A}'),
                    // LIKE wildcards keep their escape.
                    '%' | '_' => {
                        value.push('\\');
                        value.push(escaped);
                    }
                    other => value.push(other),
                }
                self.advance_to(stop + 1 + escaped.len_utf8());
            } else if self.src.get(stop + 1) == Some(&quote) {
                value.push(quote as char);
                self.bump(2);
            } else {
                self.bump(1);
                return Ok(TokenKind::String(value, quote as char));
            }
        }
    }

    /// Lex a backtick (or, under ANSI_QUOTES, double-quote) identifier.
    fn lex_quoted_id(&mut self, quote: u8, at: Position) -> Result<TokenKind, LexError> {
        self.bump(1);
        let mut value = String::new();
        loop {
            let Some(offset) = memchr(quote, &self.src[self.pos..]) else {
                self.advance_to(self.src.len());
                return Err(LexError::new(
                    LexErrorKind::UnterminatedIdentifier {
                        quote: quote as char,
                    },
                    at,
                ));
            };
            let stop = self.pos + offset;
            value.push_str(&self.source[self.pos..stop]);
            self.advance_to(stop);
            if self.src.get(stop + 1) == Some(&quote) {
                value.push(quote as char);
                self.bump(2);
            } else {
                self.bump(1);
                return Ok(TokenKind::QuotedId(value, quote as char));
            }
        }
    }

    /// Lex `X'...'` (radix 16) or `B'...'` (radix 2).
    fn lex_digit_string(&mut self, radix: u32, at: Position) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.bump(2);
        let Some(offset) = memchr(b'\'', &self.src[self.pos..]) else {
            self.advance_to(self.src.len());
            return Err(LexError::new(
                LexErrorKind::UnterminatedString { quote: '\'' },
                at,
            ));
        };
        let digits_end = self.pos + offset;
        let digits = &self.source[self.pos..digits_end];
        self.advance_to(digits_end + 1);

        let well_formed = digits.chars().all(|c| c.is_digit(radix))
            && (radix != 16 || digits.len() % 2 == 0);
        if !well_formed {
            return Err(LexError::new(
                LexErrorKind::MalformedNumber(self.source[start..self.pos].to_owned()),
                at,
            ));
        }
        Ok(if radix == 16 {
            TokenKind::Hex(digits.to_owned())
        } else {
            TokenKind::Bit(digits.to_owned())
        })
    }

    /// Lex a numeric literal: integer, decimal, exponent, `0x..` or `0b..`.
    fn lex_number(&mut self, at: Position) -> Result<TokenKind, LexError> {
        let start = self.pos;

        if self.src[start] == b'0' {
            let radix = match self.peek_at(1) {
                Some(b'x' | b'X') => Some(16),
                Some(b'b' | b'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                let end = self.scan_while(start + 2, |c| (c as char).is_digit(radix));
                if end > start + 2 {
                    return self.finish_number(start, end, at, |text| {
                        let digits = text[2..].to_owned();
                        if radix == 16 {
                            TokenKind::Hex(digits)
                        } else {
                            TokenKind::Bit(digits)
                        }
                    });
                }
            }
        }

        let mut end = self.scan_while(start, |c| c.is_ascii_digit());
        let mut exact = true;
        if self.src.get(end) == Some(&b'.') {
            exact = false;
            end = self.scan_while(end + 1, |c| c.is_ascii_digit());
        }
        if matches!(self.src.get(end), Some(b'e' | b'E')) {
            let mut digits_at = end + 1;
            if matches!(self.src.get(digits_at), Some(b'+' | b'-')) {
                digits_at += 1;
            }
            if self.src.get(digits_at).is_some_and(u8::is_ascii_digit) {
                exact = false;
                end = self.scan_while(digits_at, |c| c.is_ascii_digit());
            }
        }

        self.finish_number(start, end, at, |text| {
            if exact {
                text.parse::<i64>()
                    .map_or_else(|_| TokenKind::Number(text.to_owned()), TokenKind::Integer)
            } else {
                TokenKind::Number(text.to_owned())
            }
        })
    }

    /// Reject a number that runs straight into identifier characters
    /// (`123abc`, `0x1G`), otherwise build the token from its text.
    fn finish_number(
        &mut self,
        start: usize,
        end: usize,
        at: Position,
        build: impl FnOnce(&str) -> TokenKind,
    ) -> Result<TokenKind, LexError> {
        if self.src.get(end).copied().is_some_and(is_ident_continue) {
            let bad_end = self.scan_while(end, is_ident_continue);
            self.advance_to(bad_end);
            return Err(LexError::new(
                LexErrorKind::MalformedNumber(self.source[start..bad_end].to_owned()),
                at,
            ));
        }
        self.advance_to(end);
        Ok(build(&self.source[start..end]))
    }

    /// Lex an identifier or keyword.
    fn lex_word(&mut self) -> TokenKind {
        let start = self.pos;
        let end = self.scan_while(start, is_ident_continue);
        self.advance_to(end);
        let text = &self.source[start..end];
        TokenKind::lookup_keyword(text).unwrap_or_else(|| TokenKind::Id(text.to_owned()))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_token();
        self.done = !matches!(&item, Ok(tok) if tok.kind != TokenKind::Eof);
        Some(item)
    }
}

/// Spans and positions store byte offsets as `u32`.
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

fn check_source_len(len: usize) -> Result<(), LexError> {
    if len > MAX_SOURCE_LEN {
        return Err(LexError::new(
            LexErrorKind::InputTooLarge { len },
            Position::START,
        ));
    }
    Ok(())
}

const fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

const fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn char_count(bytes: &[u8]) -> u32 {
    bytes.iter().filter(|&&b| b & 0xC0 != 0x80).count() as u32
}

/// Tokenize `source` in MySQL's default SQL mode. The result ends with `Eof`.
///
/// Sources longer than [`MAX_SOURCE_LEN`] bytes fail with
/// `LexErrorKind::InputTooLarge`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    tokenize_with(source, &ParserConfig::default())
}

/// Tokenize `source` under `config`. The result ends with `Eof`.
pub fn tokenize_with(source: &str, config: &ParserConfig) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::with_config(source, config).collect::<Result<Vec<_>, _>>()?;
    tracing::trace!(
        target: "shardsql.lex",
        bytes = source.len(),
        tokens = tokens.len(),
        "tokenized"
    );
    Ok(tokens)
}

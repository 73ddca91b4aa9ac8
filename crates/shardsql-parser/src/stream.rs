// Token cursor with lookahead and backtracking checkpoints.
//
// Tokens are pulled from the lexer on demand and kept in a buffer so a
// tentative parse can rewind. A lexical error ends the stream: the error is
// parked and a synthetic Eof at the failure point takes its place, so the
// grammar rules only ever see tokens.

use shardsql_ast::Span;
use shardsql_error::LexError;

use crate::config::ParserConfig;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Opaque checkpoint returned by [`TokenStream::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    buffer: Vec<Token>,
    pos: usize,
    lex_error: Option<LexError>,
}

impl<'a> TokenStream<'a> {
    #[must_use]
    pub fn new(source: &'a str, config: &ParserConfig) -> Self {
        Self {
            lexer: Lexer::with_config(source, config),
            buffer: Vec::new(),
            pos: 0,
            lex_error: None,
        }
    }

    /// Whether the buffer already ends in Eof.
    fn exhausted(&self) -> bool {
        self.buffer
            .last()
            .is_some_and(|t| t.kind == TokenKind::Eof)
    }

    /// Make sure `buffer[index]` exists, or that the buffer ends in Eof.
    fn fill(&mut self, index: usize) {
        while self.buffer.len() <= index && !self.exhausted() {
            match self.lexer.next_token() {
                Ok(tok) => self.buffer.push(tok),
                Err(err) => {
                    let at = err.position;
                    self.buffer.push(Token {
                        kind: TokenKind::Eof,
                        span: Span::new(at.offset, at.offset, at.line, at.column),
                    });
                    self.lex_error = Some(err);
                }
            }
        }
    }

    /// The token `k` places ahead of the cursor. Looking past the end yields
    /// the final Eof.
    pub fn peek(&mut self, k: usize) -> &Token {
        let index = self.pos + k;
        self.fill(index);
        let last = self.buffer.len() - 1;
        &self.buffer[index.min(last)]
    }

    /// Consume and return the current token. The cursor never moves past Eof.
    pub fn advance(&mut self) -> Token {
        let tok = self.peek(0).clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    #[must_use]
    pub const fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    /// Rewind to a checkpoint taken earlier.
    pub fn reset(&mut self, mark: Mark) {
        debug_assert!(mark.0 <= self.pos, "reset may not move the cursor forward");
        self.pos = mark.0.min(self.pos);
    }

    /// Span of the most recently consumed token.
    #[must_use]
    pub fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.buffer.get(i))
            .map_or(Span::ZERO, |t| t.span)
    }

    /// Spans of every token consumed so far, in source order.
    #[must_use]
    pub fn consumed_spans(&self) -> Vec<Span> {
        self.buffer[..self.pos].iter().map(|t| t.span).collect()
    }

    /// Number of tokens consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.pos
    }

    /// The lexical error that ended the stream, if one did.
    pub fn take_lex_error(&mut self) -> Option<LexError> {
        self.lex_error.take()
    }
}

// Recursive-descent parser for MySQL DML. Expression parsing lives in expr.rs.
//
// One method per grammar rule. Ambiguous prefixes (derived tables, the DELETE
// forms, parenthesized subqueries) are settled by bounded lookahead, or by a
// tentative parse that rewinds the token stream when it fails.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use shardsql_ast::{
    Assignment, CompoundOp, Cte, DeleteFrom, DeleteStatement, Expr, Ident, IndexHint,
    IndexHintAction, IndexHintScope, InsertKind, InsertPriority, InsertSource, InsertStatement,
    JoinCondition, JoinType, LimitClause, Literal, LockMode, LockWait, LockingClause, NamedTable,
    OrderingTerm, QueryTerm, SelectBody, SelectCore, SelectItem, SelectModifiers,
    SelectStatement, SetQuantifier, SortDirection, Span, SqlCache, Statement, TableName,
    TableReference, UpdateStatement, WithClause,
};
use shardsql_error::{Position, Result, SqlError, SyntaxError};

use crate::config::ParserConfig;
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

static SHARDSQL_PARSE_STATEMENTS_TOTAL: AtomicU64 = AtomicU64::new(0);
static SHARDSQL_PARSE_FAILURES_TOTAL: AtomicU64 = AtomicU64::new(0);
static SHARDSQL_PARSE_BACKTRACKS_TOTAL: AtomicU64 = AtomicU64::new(0);
static SHARDSQL_PARSE_RECURSION_TRIPS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Point-in-time view of the parser counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ParseMetricsSnapshot {
    /// Statements (or standalone expressions) parsed successfully.
    pub statements: u64,
    /// Parses that ended in an error.
    pub failures: u64,
    /// Tentative alternatives that were rewound.
    pub backtracks: u64,
    /// Parses stopped by the nesting limit.
    pub recursion_limit_trips: u64,
}

#[must_use]
pub fn parse_metrics_snapshot() -> ParseMetricsSnapshot {
    ParseMetricsSnapshot {
        statements: SHARDSQL_PARSE_STATEMENTS_TOTAL.load(Ordering::Relaxed),
        failures: SHARDSQL_PARSE_FAILURES_TOTAL.load(Ordering::Relaxed),
        backtracks: SHARDSQL_PARSE_BACKTRACKS_TOTAL.load(Ordering::Relaxed),
        recursion_limit_trips: SHARDSQL_PARSE_RECURSION_TRIPS_TOTAL.load(Ordering::Relaxed),
    }
}

pub fn reset_parse_metrics() {
    SHARDSQL_PARSE_STATEMENTS_TOTAL.store(0, Ordering::Relaxed);
    SHARDSQL_PARSE_FAILURES_TOTAL.store(0, Ordering::Relaxed);
    SHARDSQL_PARSE_BACKTRACKS_TOTAL.store(0, Ordering::Relaxed);
    SHARDSQL_PARSE_RECURSION_TRIPS_TOTAL.store(0, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// A successfully parsed statement and the spans of the tokens it consumed,
/// in source order (the trailing Eof is not included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedStatement {
    pub statement: Statement,
    pub tokens: Vec<Span>,
}

pub struct Parser<'a> {
    source: &'a str,
    pub(crate) stream: TokenStream<'a>,
    pub(crate) config: ParserConfig,
    depth: u32,
    placeholders: u32,
    /// Deepest failure among rewound alternatives.
    furthest: Option<SyntaxError>,
    backtracks: u64,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(source: &'a str, config: &ParserConfig) -> Self {
        Self {
            source,
            stream: TokenStream::new(source, config),
            config: config.clone(),
            depth: 0,
            placeholders: 0,
            furthest: None,
            backtracks: 0,
        }
    }

    /// Parse exactly one DML statement, optionally followed by `;`.
    pub fn parse_statement(mut self) -> Result<ParsedStatement> {
        let span = tracing::debug_span!(
            target: "shardsql.parse",
            "parse_statement",
            kind = tracing::field::Empty,
            tokens = tracing::field::Empty,
            backtracks = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );
        let _guard = span.enter();

        let result = self.parse_statement_to_end();
        span.record("tokens", self.stream.consumed());
        span.record("backtracks", self.backtracks);
        match result {
            Ok(statement) => {
                SHARDSQL_PARSE_STATEMENTS_TOTAL.fetch_add(1, Ordering::Relaxed);
                span.record("kind", statement.kind_name());
                span.record("outcome", "ok");
                Ok(ParsedStatement {
                    statement,
                    tokens: self.stream.consumed_spans(),
                })
            }
            Err(err) => {
                SHARDSQL_PARSE_FAILURES_TOTAL.fetch_add(1, Ordering::Relaxed);
                span.record("outcome", "error");
                Err(self.finish_error(err))
            }
        }
    }

    /// Parse a standalone expression that must cover the whole input.
    pub fn parse_expression(mut self) -> Result<Expr> {
        let result = self.parse_expr().and_then(|expr| {
            self.expect_end()?;
            Ok(expr)
        });
        match result {
            Ok(expr) => {
                SHARDSQL_PARSE_STATEMENTS_TOTAL.fetch_add(1, Ordering::Relaxed);
                Ok(expr)
            }
            Err(err) => {
                SHARDSQL_PARSE_FAILURES_TOTAL.fetch_add(1, Ordering::Relaxed);
                Err(self.finish_error(err))
            }
        }
    }

    fn parse_statement_to_end(&mut self) -> Result<Statement> {
        let stmt = self.parse_dml()?;
        self.eat(&TokenKind::Semicolon);
        self.expect_end()?;
        Ok(stmt)
    }

    /// Require end of input. A lexical error ends the token stream early, so
    /// reaching Eof is only success when the lexer had nothing to report.
    fn expect_end(&mut self) -> Result<()> {
        if !self.check(&TokenKind::Eof) {
            return Err(self.err_expected("end of input"));
        }
        match self.stream.take_lex_error() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Pick the error to report: a lexical error wins, then the deepest
    /// syntax error seen on any branch.
    fn finish_error(&mut self, err: SqlError) -> SqlError {
        if let Some(lex) = self.stream.take_lex_error() {
            return SqlError::Lex(lex);
        }
        match err {
            SqlError::Syntax(syntax) => SqlError::Syntax(match self.furthest.take() {
                Some(furthest) => furthest.merge(syntax),
                None => syntax,
            }),
            other => other,
        }
    }

    // -----------------------------------------------------------------------
    // Token helpers
    // -----------------------------------------------------------------------

    pub(crate) fn peek(&mut self) -> &TokenKind {
        &self.stream.peek(0).kind
    }

    pub(crate) fn peek_nth(&mut self, n: usize) -> &TokenKind {
        &self.stream.peek(n).kind
    }

    pub(crate) fn current_span(&mut self) -> Span {
        self.stream.peek(0).span
    }

    pub(crate) fn prev_span(&self) -> Span {
        self.stream.prev_span()
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.stream.advance()
    }

    /// Same token variant, ignoring any payload.
    pub(crate) fn check(&mut self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    pub(crate) fn check_kw(&mut self, kw: &TokenKind) -> bool {
        self.peek() == kw
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_kw(&mut self, kw: &TokenKind) -> bool {
        if self.check_kw(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_kw(&mut self, kw: &TokenKind) -> Result<Span> {
        if self.check_kw(kw) {
            Ok(self.advance().span)
        } else {
            Err(self.err_expected(&kw.describe()))
        }
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind) -> Result<Span> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.err_expected(&kind.describe()))
        }
    }

    pub(crate) fn err_expected(&mut self, what: &str) -> SqlError {
        self.err_expected_any(&[what])
    }

    pub(crate) fn err_expected_any(&mut self, what: &[&str]) -> SqlError {
        let tok = self.stream.peek(0);
        let position = position_of(tok.span);
        SyntaxError::new(position, what.iter().copied(), tok.kind.describe()).into()
    }

    // -----------------------------------------------------------------------
    // Backtracking and nesting
    // -----------------------------------------------------------------------

    /// Run `f` as a tentative alternative. On a syntax error the stream is
    /// rewound, the error is remembered for reporting, and `None` is
    /// returned. Lexical and nesting errors are not recoverable and propagate.
    pub(crate) fn attempt<T>(
        &mut self,
        label: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        let mark = self.stream.mark();
        let depth = self.depth;
        let placeholders = self.placeholders;
        match f(self) {
            Ok(value) => Ok(Some(value)),
            Err(SqlError::Syntax(err)) => {
                self.stream.reset(mark);
                self.depth = depth;
                self.placeholders = placeholders;
                self.backtracks += 1;
                SHARDSQL_PARSE_BACKTRACKS_TOTAL.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    target: "shardsql.parse",
                    alternative = label,
                    offset = err.position.offset,
                    "rewinding rejected alternative"
                );
                self.furthest = Some(match self.furthest.take() {
                    Some(prev) => prev.merge(err),
                    None => err,
                });
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    /// Run `f` one nesting level deeper, failing cleanly at the configured
    /// limit instead of exhausting the call stack.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.config.max_depth {
            SHARDSQL_PARSE_RECURSION_TRIPS_TOTAL.fetch_add(1, Ordering::Relaxed);
            let position = position_of(self.current_span());
            tracing::warn!(
                target: "shardsql.parse",
                limit = self.config.max_depth,
                offset = position.offset,
                "nesting limit exceeded"
            );
            return Err(SqlError::RecursionLimitExceeded {
                limit: self.config.max_depth,
                position,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn next_placeholder(&mut self) -> u32 {
        let index = self.placeholders;
        self.placeholders += 1;
        index
    }

    // -----------------------------------------------------------------------
    // Identifiers
    // -----------------------------------------------------------------------

    /// Whether the token `n` ahead can be read as a plain identifier.
    pub(crate) fn is_ident_like(&mut self, n: usize) -> bool {
        let kind = self.peek_nth(n);
        matches!(kind, TokenKind::Id(_) | TokenKind::QuotedId(..)) || kind.is_nonreserved()
    }

    /// Whether the token `n` ahead can follow a `.` in a qualified name,
    /// where any keyword is an identifier.
    pub(crate) fn is_name_after_dot(&mut self, n: usize) -> bool {
        let kind = self.peek_nth(n);
        matches!(kind, TokenKind::Id(_) | TokenKind::QuotedId(..)) || kind.is_keyword()
    }

    /// Parse an identifier; non-reserved keywords are accepted as names.
    pub(crate) fn parse_identifier(&mut self) -> Result<Ident> {
        self.parse_name(false)
    }

    /// Parse the part of a qualified name after a `.`.
    pub(crate) fn parse_identifier_after_dot(&mut self) -> Result<Ident> {
        self.parse_name(true)
    }

    pub(crate) fn parse_name(&mut self, any_keyword: bool) -> Result<Ident> {
        let source = self.source;
        match ident_from_token(source, self.stream.peek(0), any_keyword) {
            Some(ident) => {
                self.advance();
                Ok(ident)
            }
            None => Err(self.err_expected("identifier")),
        }
    }

    /// `[schema.]table`
    pub(crate) fn parse_table_name(&mut self) -> Result<TableName> {
        let first = self.parse_identifier()?;
        if self.check(&TokenKind::Dot) && self.is_name_after_dot(1) {
            self.advance();
            let table = self.parse_identifier_after_dot()?;
            return Ok(TableName {
                span: first.span.merge(table.span),
                schema: Some(first),
                table,
            });
        }
        Ok(TableName {
            span: first.span,
            schema: None,
            table: first,
        })
    }

    /// `(a, b, ...)`
    pub(crate) fn parse_paren_ident_list(&mut self, allow_empty: bool) -> Result<Vec<Ident>> {
        self.expect_token(&TokenKind::LeftParen)?;
        let mut idents = Vec::new();
        if allow_empty && self.eat(&TokenKind::RightParen) {
            return Ok(idents);
        }
        loop {
            idents.push(self.parse_identifier()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(&TokenKind::RightParen)?;
        Ok(idents)
    }

    /// `[AS] alias`. String literals are accepted as aliases only where
    /// MySQL allows them (select items).
    fn parse_alias(&mut self, allow_string: bool) -> Result<Option<Ident>> {
        let explicit = self.eat_kw(&TokenKind::KwAs);
        if allow_string {
            let tok = self.stream.peek(0);
            if let TokenKind::String(value, quote) = &tok.kind {
                let alias = Ident {
                    value: value.clone(),
                    quote: Some(*quote),
                    span: tok.span,
                };
                self.advance();
                return Ok(Some(alias));
            }
        }
        if explicit || self.is_ident_like(0) {
            return self.parse_identifier().map(Some);
        }
        Ok(None)
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn parse_dml(&mut self) -> Result<Statement> {
        match self.peek() {
            TokenKind::KwSelect | TokenKind::KwWith | TokenKind::LeftParen => {
                Ok(Statement::Select(self.parse_select_statement()?))
            }
            TokenKind::KwInsert | TokenKind::KwReplace => Ok(Statement::Insert(self.parse_insert()?)),
            TokenKind::KwUpdate => Ok(Statement::Update(self.parse_update()?)),
            TokenKind::KwDelete => Ok(Statement::Delete(self.parse_delete()?)),
            _ => Err(self.err_expected_any(&[
                "SELECT", "WITH", "'('", "INSERT", "REPLACE", "UPDATE", "DELETE",
            ])),
        }
    }

    // -----------------------------------------------------------------------
    // SELECT
    // -----------------------------------------------------------------------

    /// `[WITH ...] term [UNION term]... [ORDER BY] [LIMIT] [locking]`
    pub(crate) fn parse_select_statement(&mut self) -> Result<SelectStatement> {
        self.nested(Self::parse_select_statement_inner)
    }

    fn parse_select_statement_inner(&mut self) -> Result<SelectStatement> {
        let start = self.current_span();
        let with = if self.check_kw(&TokenKind::KwWith) {
            Some(self.parse_with_clause()?)
        } else {
            None
        };
        let body = self.parse_select_body()?;
        let order_by = self.parse_order_by()?;
        let limit = if self.check_kw(&TokenKind::KwLimit) {
            Some(self.parse_limit(true)?)
        } else {
            None
        };
        let locking = self.parse_locking()?;
        Ok(SelectStatement {
            with,
            body,
            order_by,
            limit,
            locking,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_with_clause(&mut self) -> Result<WithClause> {
        let start = self.expect_kw(&TokenKind::KwWith)?;
        let recursive = self.eat_kw(&TokenKind::KwRecursive);
        let mut ctes = vec![self.parse_cte()?];
        while self.eat(&TokenKind::Comma) {
            ctes.push(self.parse_cte()?);
        }
        Ok(WithClause {
            recursive,
            ctes,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_cte(&mut self) -> Result<Cte> {
        let name = self.parse_identifier()?;
        let columns = if self.check(&TokenKind::LeftParen) {
            self.parse_paren_ident_list(false)?
        } else {
            Vec::new()
        };
        self.expect_kw(&TokenKind::KwAs)?;
        self.expect_token(&TokenKind::LeftParen)?;
        let query = self.parse_select_statement()?;
        let end = self.expect_token(&TokenKind::RightParen)?;
        Ok(Cte {
            span: name.span.merge(end),
            name,
            columns,
            query: Box::new(query),
        })
    }

    fn parse_select_body(&mut self) -> Result<SelectBody> {
        let start = self.current_span();
        let first = self.parse_query_term()?;
        let mut compounds = Vec::new();
        while self.eat_kw(&TokenKind::KwUnion) {
            let op = if self.eat_kw(&TokenKind::KwAll) {
                CompoundOp::UnionAll
            } else {
                self.eat_kw(&TokenKind::KwDistinct);
                CompoundOp::Union
            };
            compounds.push((op, self.parse_query_term()?));
        }
        Ok(SelectBody {
            first,
            compounds,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_query_term(&mut self) -> Result<QueryTerm> {
        match self.peek() {
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_select_statement()?;
                self.expect_token(&TokenKind::RightParen)?;
                Ok(QueryTerm::Nested(Box::new(inner)))
            }
            TokenKind::KwSelect => Ok(QueryTerm::Select(Box::new(self.parse_select_core()?))),
            _ => Err(self.err_expected_any(&["SELECT", "'('"])),
        }
    }

    fn parse_select_core(&mut self) -> Result<SelectCore> {
        let start = self.expect_kw(&TokenKind::KwSelect)?;
        let modifiers = self.parse_select_modifiers();
        let columns = self.parse_select_items()?;
        let from = if self.eat_kw(&TokenKind::KwFrom) {
            self.parse_table_references()?
        } else {
            Vec::new()
        };
        let where_clause = self.parse_where()?;

        let mut group_by = Vec::new();
        let mut with_rollup = false;
        if self.eat_kw(&TokenKind::KwGroup) {
            self.expect_kw(&TokenKind::KwBy)?;
            group_by = self.parse_ordering_terms()?;
            if self.check_kw(&TokenKind::KwWith) && self.peek_nth(1) == &TokenKind::KwRollup {
                self.advance();
                self.advance();
                with_rollup = true;
            }
        }
        let having = if self.eat_kw(&TokenKind::KwHaving) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(SelectCore {
            modifiers,
            columns,
            from,
            where_clause,
            group_by,
            with_rollup,
            having,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_select_modifiers(&mut self) -> SelectModifiers {
        let mut m = SelectModifiers::default();
        loop {
            match self.peek() {
                TokenKind::KwAll => m.quantifier = Some(SetQuantifier::All),
                TokenKind::KwDistinct => m.quantifier = Some(SetQuantifier::Distinct),
                TokenKind::KwDistinctrow => m.quantifier = Some(SetQuantifier::DistinctRow),
                TokenKind::KwHighPriority => m.high_priority = true,
                TokenKind::KwStraightJoin => m.straight_join = true,
                TokenKind::KwSqlSmallResult => m.small_result = true,
                TokenKind::KwSqlBigResult => m.big_result = true,
                TokenKind::KwSqlBufferResult => m.buffer_result = true,
                TokenKind::KwSqlCache => m.cache = Some(SqlCache::Cache),
                TokenKind::KwSqlNoCache => m.cache = Some(SqlCache::NoCache),
                TokenKind::KwSqlCalcFoundRows => m.calc_found_rows = true,
                _ => return m,
            }
            self.advance();
        }
    }

    fn parse_select_items(&mut self) -> Result<Vec<SelectItem>> {
        let mut items = vec![self.parse_select_item()?];
        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_select_item()?);
        }
        Ok(items)
    }

    fn parse_select_item(&mut self) -> Result<SelectItem> {
        if self.check(&TokenKind::Star) {
            return Ok(SelectItem::Wildcard(self.advance().span));
        }

        // t.* and db.t.*
        if self.is_ident_like(0) && self.peek_nth(1) == &TokenKind::Dot {
            if self.peek_nth(2) == &TokenKind::Star {
                let table = self.parse_identifier()?;
                self.advance();
                let star = self.advance().span;
                return Ok(SelectItem::QualifiedWildcard {
                    schema: None,
                    span: table.span.merge(star),
                    table,
                });
            }
            if self.is_name_after_dot(2)
                && self.peek_nth(3) == &TokenKind::Dot
                && self.peek_nth(4) == &TokenKind::Star
            {
                let schema = self.parse_identifier()?;
                self.advance();
                let table = self.parse_identifier_after_dot()?;
                self.advance();
                let star = self.advance().span;
                return Ok(SelectItem::QualifiedWildcard {
                    span: schema.span.merge(star),
                    schema: Some(schema),
                    table,
                });
            }
        }

        let expr = self.parse_expr()?;
        let alias = self.parse_alias(true)?;
        let span = alias
            .as_ref()
            .map_or(expr.span(), |a| expr.span().merge(a.span));
        Ok(SelectItem::Expr { expr, alias, span })
    }

    fn parse_where(&mut self) -> Result<Option<Expr>> {
        if self.eat_kw(&TokenKind::KwWhere) {
            Ok(Some(self.parse_expr()?))
        } else {
            Ok(None)
        }
    }

    fn parse_order_by(&mut self) -> Result<Vec<OrderingTerm>> {
        if self.eat_kw(&TokenKind::KwOrder) {
            self.expect_kw(&TokenKind::KwBy)?;
            self.parse_ordering_terms()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_ordering_terms(&mut self) -> Result<Vec<OrderingTerm>> {
        let mut terms = vec![self.parse_ordering_term()?];
        while self.eat(&TokenKind::Comma) {
            terms.push(self.parse_ordering_term()?);
        }
        Ok(terms)
    }

    fn parse_ordering_term(&mut self) -> Result<OrderingTerm> {
        let expr = self.parse_expr()?;
        let direction = if self.eat_kw(&TokenKind::KwAsc) {
            Some(SortDirection::Asc)
        } else if self.eat_kw(&TokenKind::KwDesc) {
            Some(SortDirection::Desc)
        } else {
            None
        };
        let span = if direction.is_some() {
            expr.span().merge(self.prev_span())
        } else {
            expr.span()
        };
        Ok(OrderingTerm {
            expr,
            direction,
            span,
        })
    }

    /// `LIMIT n`, and with `allow_offset` also `LIMIT offset, n` and
    /// `LIMIT n OFFSET offset`.
    fn parse_limit(&mut self, allow_offset: bool) -> Result<LimitClause> {
        let start = self.expect_kw(&TokenKind::KwLimit)?;
        let first = self.parse_limit_operand()?;
        let (limit, offset) = if allow_offset && self.eat(&TokenKind::Comma) {
            let count = self.parse_limit_operand()?;
            (count, Some(first))
        } else if allow_offset && self.eat_kw(&TokenKind::KwOffset) {
            (first, Some(self.parse_limit_operand()?))
        } else {
            (first, None)
        };
        Ok(LimitClause {
            limit,
            offset,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_limit_operand(&mut self) -> Result<Expr> {
        let tok = self.stream.peek(0);
        match tok.kind {
            TokenKind::Integer(n) => {
                let span = tok.span;
                self.advance();
                Ok(Expr::Literal(Literal::Integer(n), span))
            }
            TokenKind::Question => Ok(self.parse_placeholder()),
            _ => Err(self.err_expected_any(&["integer", "'?'"])),
        }
    }

    /// `FOR UPDATE|SHARE [OF t, ...] [NOWAIT|SKIP LOCKED]` or
    /// `LOCK IN SHARE MODE`.
    fn parse_locking(&mut self) -> Result<Option<LockingClause>> {
        let start = self.current_span();
        if self.eat_kw(&TokenKind::KwLock) {
            self.expect_kw(&TokenKind::KwIn)?;
            self.expect_kw(&TokenKind::KwShare)?;
            self.expect_kw(&TokenKind::KwMode)?;
            return Ok(Some(LockingClause {
                mode: LockMode::LockInShareMode,
                of: Vec::new(),
                wait: None,
                span: start.merge(self.prev_span()),
            }));
        }
        if !self.eat_kw(&TokenKind::KwFor) {
            return Ok(None);
        }

        let mode = if self.eat_kw(&TokenKind::KwUpdate) {
            LockMode::ForUpdate
        } else if self.eat_kw(&TokenKind::KwShare) {
            LockMode::ForShare
        } else {
            return Err(self.err_expected_any(&["UPDATE", "SHARE"]));
        };
        let mut of = Vec::new();
        if self.eat_kw(&TokenKind::KwOf) {
            of.push(self.parse_table_name()?);
            while self.eat(&TokenKind::Comma) {
                of.push(self.parse_table_name()?);
            }
        }
        let wait = if self.eat_kw(&TokenKind::KwNowait) {
            Some(LockWait::NoWait)
        } else if self.eat_kw(&TokenKind::KwSkip) {
            self.expect_kw(&TokenKind::KwLocked)?;
            Some(LockWait::SkipLocked)
        } else {
            None
        };
        Ok(Some(LockingClause {
            mode,
            of,
            wait,
            span: start.merge(self.prev_span()),
        }))
    }

    // -----------------------------------------------------------------------
    // Table references
    // -----------------------------------------------------------------------

    pub(crate) fn parse_table_references(&mut self) -> Result<Vec<TableReference>> {
        let mut refs = vec![self.parse_table_reference()?];
        while self.eat(&TokenKind::Comma) {
            refs.push(self.parse_table_reference()?);
        }
        Ok(refs)
    }

    /// A table factor followed by any number of joins, folded left-deep.
    fn parse_table_reference(&mut self) -> Result<TableReference> {
        let mut left = self.parse_table_factor()?;
        while let Some(join_type) = self.parse_join_type()? {
            let right = self.parse_table_factor()?;
            let condition = if join_type.forbids_condition() {
                None
            } else if join_type == JoinType::Straight {
                if self.eat_kw(&TokenKind::KwOn) {
                    Some(JoinCondition::On(self.parse_expr()?))
                } else {
                    None
                }
            } else {
                let condition = self.parse_join_condition()?;
                if condition.is_none() && join_type.requires_condition() {
                    return Err(self.err_expected_any(&["ON", "USING"]));
                }
                condition
            };
            let span = left.span().merge(self.prev_span());
            left = TableReference::Joined {
                left: Box::new(left),
                join_type,
                right: Box::new(right),
                condition,
                span,
            };
        }
        Ok(left)
    }

    fn parse_join_type(&mut self) -> Result<Option<JoinType>> {
        let join_type = match self.peek() {
            TokenKind::KwJoin => {
                self.advance();
                return Ok(Some(JoinType::Inner));
            }
            TokenKind::KwStraightJoin => {
                self.advance();
                return Ok(Some(JoinType::Straight));
            }
            TokenKind::KwInner => {
                self.advance();
                JoinType::Inner
            }
            TokenKind::KwCross => {
                self.advance();
                JoinType::Cross
            }
            TokenKind::KwLeft | TokenKind::KwRight => {
                let left = self.advance().kind == TokenKind::KwLeft;
                self.eat_kw(&TokenKind::KwOuter);
                if left { JoinType::Left } else { JoinType::Right }
            }
            TokenKind::KwNatural => {
                self.advance();
                if self.eat_kw(&TokenKind::KwLeft) {
                    self.eat_kw(&TokenKind::KwOuter);
                    JoinType::NaturalLeft
                } else if self.eat_kw(&TokenKind::KwRight) {
                    self.eat_kw(&TokenKind::KwOuter);
                    JoinType::NaturalRight
                } else {
                    self.eat_kw(&TokenKind::KwInner);
                    JoinType::Natural
                }
            }
            _ => return Ok(None),
        };
        self.expect_kw(&TokenKind::KwJoin)?;
        Ok(Some(join_type))
    }

    fn parse_join_condition(&mut self) -> Result<Option<JoinCondition>> {
        if self.eat_kw(&TokenKind::KwOn) {
            return Ok(Some(JoinCondition::On(self.parse_expr()?)));
        }
        if self.eat_kw(&TokenKind::KwUsing) {
            return Ok(Some(JoinCondition::Using(self.parse_paren_ident_list(false)?)));
        }
        Ok(None)
    }

    fn parse_table_factor(&mut self) -> Result<TableReference> {
        if self.check(&TokenKind::LeftParen) {
            return self.nested(Self::parse_parenthesized_factor);
        }
        Ok(TableReference::Named(self.parse_named_table()?))
    }

    /// `(query) [AS] alias` or `( table_references )`.
    fn parse_parenthesized_factor(&mut self) -> Result<TableReference> {
        let start = self.current_span();
        let maybe_query = matches!(
            self.peek_nth(1),
            TokenKind::KwSelect | TokenKind::KwWith | TokenKind::LeftParen
        );
        if maybe_query {
            let derived = self.attempt("derived table", |p| {
                p.expect_token(&TokenKind::LeftParen)?;
                let subquery = p.parse_select_statement()?;
                p.expect_token(&TokenKind::RightParen)?;
                let Some(alias) = p.parse_alias(false)? else {
                    return Err(p.err_expected("derived table alias"));
                };
                Ok(TableReference::Derived {
                    subquery: Box::new(subquery),
                    alias,
                    span: start.merge(p.prev_span()),
                })
            })?;
            if let Some(derived) = derived {
                return Ok(derived);
            }
        }

        self.expect_token(&TokenKind::LeftParen)?;
        let inner = self.parse_table_references()?;
        let end = self.expect_token(&TokenKind::RightParen)?;
        Ok(TableReference::Parenthesized {
            inner,
            span: start.merge(end),
        })
    }

    fn parse_named_table(&mut self) -> Result<NamedTable> {
        let name = self.parse_table_name()?;
        let partitions = self.parse_partitions()?;
        let alias = self.parse_alias(false)?;
        let index_hints = self.parse_index_hints()?;
        Ok(NamedTable {
            span: name.span.merge(self.prev_span()),
            name,
            partitions,
            alias,
            index_hints,
        })
    }

    fn parse_partitions(&mut self) -> Result<Vec<Ident>> {
        if self.eat_kw(&TokenKind::KwPartition) {
            self.parse_paren_ident_list(false)
        } else {
            Ok(Vec::new())
        }
    }

    /// `USE|IGNORE|FORCE INDEX|KEY [FOR JOIN|ORDER BY|GROUP BY] (names)`,
    /// optionally comma separated.
    fn parse_index_hints(&mut self) -> Result<Vec<IndexHint>> {
        let mut hints = Vec::new();
        loop {
            let action = match self.peek() {
                TokenKind::KwUse => IndexHintAction::Use,
                TokenKind::KwIgnore => IndexHintAction::Ignore,
                TokenKind::KwForce => IndexHintAction::Force,
                _ => break,
            };
            if !matches!(self.peek_nth(1), TokenKind::KwIndex | TokenKind::KwKey) {
                break;
            }
            let start = self.advance().span;
            self.advance();

            let scope = if self.eat_kw(&TokenKind::KwFor) {
                if self.eat_kw(&TokenKind::KwJoin) {
                    Some(IndexHintScope::Join)
                } else if self.eat_kw(&TokenKind::KwOrder) {
                    self.expect_kw(&TokenKind::KwBy)?;
                    Some(IndexHintScope::OrderBy)
                } else if self.eat_kw(&TokenKind::KwGroup) {
                    self.expect_kw(&TokenKind::KwBy)?;
                    Some(IndexHintScope::GroupBy)
                } else {
                    return Err(self.err_expected_any(&["JOIN", "ORDER", "GROUP"]));
                }
            } else {
                None
            };
            let indexes = self.parse_paren_ident_list(action == IndexHintAction::Use)?;
            hints.push(IndexHint {
                action,
                scope,
                indexes,
                span: start.merge(self.prev_span()),
            });

            if self.check(&TokenKind::Comma)
                && matches!(
                    self.peek_nth(1),
                    TokenKind::KwUse | TokenKind::KwIgnore | TokenKind::KwForce
                )
            {
                self.advance();
            }
        }
        Ok(hints)
    }

    // -----------------------------------------------------------------------
    // INSERT / REPLACE
    // -----------------------------------------------------------------------

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        let start = self.current_span();
        let kind = if self.eat_kw(&TokenKind::KwReplace) {
            InsertKind::Replace
        } else {
            self.expect_kw(&TokenKind::KwInsert)?;
            InsertKind::Insert
        };

        let priority = match self.peek() {
            TokenKind::KwLowPriority => Some(InsertPriority::LowPriority),
            TokenKind::KwDelayed => Some(InsertPriority::Delayed),
            TokenKind::KwHighPriority if kind == InsertKind::Insert => {
                Some(InsertPriority::HighPriority)
            }
            _ => None,
        };
        if priority.is_some() {
            self.advance();
        }
        let ignore = kind == InsertKind::Insert && self.eat_kw(&TokenKind::KwIgnore);
        self.eat_kw(&TokenKind::KwInto);
        let table = self.parse_table_name()?;
        let partitions = self.parse_partitions()?;

        let (columns, source) = if self.eat_kw(&TokenKind::KwSet) {
            (Vec::new(), InsertSource::Set(self.parse_assignments()?))
        } else {
            // `(` opens a column list unless it opens a query.
            let columns = if self.check(&TokenKind::LeftParen)
                && !matches!(
                    self.peek_nth(1),
                    TokenKind::KwSelect | TokenKind::KwWith | TokenKind::LeftParen
                ) {
                self.parse_paren_ident_list(true)?
            } else {
                Vec::new()
            };
            let source = match self.peek() {
                TokenKind::KwValues | TokenKind::KwValue => {
                    self.advance();
                    InsertSource::Values(self.parse_value_rows()?)
                }
                TokenKind::KwSelect | TokenKind::KwWith | TokenKind::LeftParen => {
                    InsertSource::Select(Box::new(self.parse_select_statement()?))
                }
                _ => {
                    return Err(self.err_expected_any(&["VALUES", "VALUE", "SELECT", "SET"]));
                }
            };
            (columns, source)
        };

        let on_duplicate = if kind == InsertKind::Insert && self.eat_kw(&TokenKind::KwOn) {
            self.expect_kw(&TokenKind::KwDuplicate)?;
            self.expect_kw(&TokenKind::KwKey)?;
            self.expect_kw(&TokenKind::KwUpdate)?;
            self.parse_assignments()?
        } else {
            Vec::new()
        };

        Ok(InsertStatement {
            kind,
            priority,
            ignore,
            table,
            partitions,
            columns,
            source,
            on_duplicate,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_value_rows(&mut self) -> Result<Vec<Vec<Expr>>> {
        let mut rows = vec![self.parse_value_row()?];
        while self.eat(&TokenKind::Comma) {
            rows.push(self.parse_value_row()?);
        }
        Ok(rows)
    }

    fn parse_value_row(&mut self) -> Result<Vec<Expr>> {
        self.expect_token(&TokenKind::LeftParen)?;
        if self.eat(&TokenKind::RightParen) {
            return Ok(Vec::new());
        }
        let row = self.parse_expr_list()?;
        self.expect_token(&TokenKind::RightParen)?;
        Ok(row)
    }

    fn parse_assignments(&mut self) -> Result<Vec<Assignment>> {
        let mut assignments = vec![self.parse_assignment()?];
        while self.eat(&TokenKind::Comma) {
            assignments.push(self.parse_assignment()?);
        }
        Ok(assignments)
    }

    fn parse_assignment(&mut self) -> Result<Assignment> {
        let column = self.parse_column_ref()?;
        self.expect_token(&TokenKind::Eq)?;
        let value = self.parse_expr()?;
        Ok(Assignment {
            span: column.span.merge(value.span()),
            column,
            value,
        })
    }

    // -----------------------------------------------------------------------
    // UPDATE
    // -----------------------------------------------------------------------

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        let start = self.expect_kw(&TokenKind::KwUpdate)?;
        let mut low_priority = false;
        let mut ignore = false;
        loop {
            if self.eat_kw(&TokenKind::KwLowPriority) {
                low_priority = true;
            } else if self.eat_kw(&TokenKind::KwIgnore) {
                ignore = true;
            } else {
                break;
            }
        }
        let tables = self.parse_table_references()?;
        self.expect_kw(&TokenKind::KwSet)?;
        let assignments = self.parse_assignments()?;
        let where_clause = self.parse_where()?;
        let order_by = self.parse_order_by()?;
        let limit = if self.check_kw(&TokenKind::KwLimit) {
            Some(self.parse_limit(false)?)
        } else {
            None
        };
        Ok(UpdateStatement {
            low_priority,
            ignore,
            tables,
            assignments,
            where_clause,
            order_by,
            limit,
            span: start.merge(self.prev_span()),
        })
    }

    // -----------------------------------------------------------------------
    // DELETE
    // -----------------------------------------------------------------------

    /// The three DELETE shapes share a prefix:
    ///
    /// - `DELETE FROM t [WHERE] [ORDER BY] [LIMIT]`
    /// - `DELETE t1[.*], ... FROM refs [WHERE]`
    /// - `DELETE FROM t1[.*], ... USING refs [WHERE]`
    ///
    /// After `FROM` the USING form is tried first and rewound if no `USING`
    /// follows the target list.
    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        let start = self.expect_kw(&TokenKind::KwDelete)?;
        let (mut low_priority, mut quick, mut ignore) = (false, false, false);
        loop {
            match self.peek() {
                TokenKind::KwLowPriority => low_priority = true,
                TokenKind::KwQuick => quick = true,
                TokenKind::KwIgnore => ignore = true,
                _ => break,
            }
            self.advance();
        }

        let (targets, from) = if self.eat_kw(&TokenKind::KwFrom) {
            let using_form = self.attempt("DELETE ... USING", |p| {
                let targets = p.parse_delete_targets()?;
                p.expect_kw(&TokenKind::KwUsing)?;
                let tables = p.parse_table_references()?;
                Ok((targets, DeleteFrom::Multi { tables, using: true }))
            })?;
            match using_form {
                Some(multi) => multi,
                None => (Vec::new(), DeleteFrom::Single(self.parse_delete_table()?)),
            }
        } else {
            let targets = self.parse_delete_targets()?;
            self.expect_kw(&TokenKind::KwFrom)?;
            let tables = self.parse_table_references()?;
            (targets, DeleteFrom::Multi { tables, using: false })
        };

        let where_clause = self.parse_where()?;
        let (order_by, limit) = if matches!(from, DeleteFrom::Single(_)) {
            let order_by = self.parse_order_by()?;
            let limit = if self.check_kw(&TokenKind::KwLimit) {
                Some(self.parse_limit(false)?)
            } else {
                None
            };
            (order_by, limit)
        } else {
            (Vec::new(), None)
        };

        Ok(DeleteStatement {
            low_priority,
            quick,
            ignore,
            targets,
            from,
            where_clause,
            order_by,
            limit,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_delete_targets(&mut self) -> Result<Vec<TableName>> {
        let mut targets = vec![self.parse_delete_target()?];
        while self.eat(&TokenKind::Comma) {
            targets.push(self.parse_delete_target()?);
        }
        Ok(targets)
    }

    /// `[schema.]table[.*]`
    fn parse_delete_target(&mut self) -> Result<TableName> {
        let name = self.parse_table_name()?;
        if self.check(&TokenKind::Dot) && self.peek_nth(1) == &TokenKind::Star {
            self.advance();
            self.advance();
        }
        Ok(name)
    }

    /// Single-table target: `t [[AS] alias] [PARTITION (...)]`. The
    /// partition list is also accepted before the alias.
    fn parse_delete_table(&mut self) -> Result<NamedTable> {
        let name = self.parse_table_name()?;
        let mut partitions = self.parse_partitions()?;
        let alias = self.parse_alias(false)?;
        if partitions.is_empty() {
            partitions = self.parse_partitions()?;
        }
        Ok(NamedTable {
            span: name.span.merge(self.prev_span()),
            name,
            partitions,
            alias,
            index_hints: Vec::new(),
        })
    }
}

pub(crate) const fn position_of(span: Span) -> Position {
    Position::new(span.start, span.line, span.column)
}

/// Read `tok` as an identifier. Keyword tokens keep their source spelling.
fn ident_from_token(source: &str, tok: &Token, any_keyword: bool) -> Option<Ident> {
    let (value, quote) = match &tok.kind {
        TokenKind::Id(value) => (value.clone(), None),
        TokenKind::QuotedId(value, quote) => (value.clone(), Some(*quote)),
        kind if kind.is_nonreserved() || (any_keyword && kind.is_keyword()) => {
            let text = tok
                .span
                .slice(source)
                .or_else(|| kind.keyword_text())?;
            (text.to_owned(), None)
        }
        _ => return None,
    };
    Some(Ident {
        value,
        quote,
        span: tok.span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Statement {
        Parser::new(sql, &ParserConfig::default())
            .parse_statement()
            .unwrap_or_else(|e| panic!("parse {sql:?}: {e}"))
            .statement
    }

    fn parse_err(sql: &str) -> SqlError {
        Parser::new(sql, &ParserConfig::default())
            .parse_statement()
            .expect_err("parse error")
    }

    fn select(sql: &str) -> SelectStatement {
        match parse(sql) {
            Statement::Select(s) => s,
            other => unreachable!("expected SELECT, got {other:?}"),
        }
    }

    fn delete(sql: &str) -> DeleteStatement {
        match parse(sql) {
            Statement::Delete(d) => d,
            other => unreachable!("expected DELETE, got {other:?}"),
        }
    }

    fn insert(sql: &str) -> InsertStatement {
        match parse(sql) {
            Statement::Insert(i) => i,
            other => unreachable!("expected INSERT, got {other:?}"),
        }
    }

    fn named(table: &TableReference) -> &NamedTable {
        match table {
            TableReference::Named(n) => n,
            other => unreachable!("expected named table, got {other:?}"),
        }
    }

    #[test]
    fn test_select_modifiers_in_any_order() {
        let s = select("SELECT SQL_NO_CACHE DISTINCT HIGH_PRIORITY SQL_CALC_FOUND_ROWS a FROM t");
        let m = s.first_core().modifiers;
        assert_eq!(m.quantifier, Some(SetQuantifier::Distinct));
        assert_eq!(m.cache, Some(SqlCache::NoCache));
        assert!(m.high_priority);
        assert!(m.calc_found_rows);
        assert!(!m.straight_join);
    }

    #[test]
    fn test_select_items_and_aliases() {
        let s = select("SELECT *, t.*, db.t.*, a AS x, b y, c 'z', d AS \"w\" FROM t");
        let cols = &s.first_core().columns;
        assert!(matches!(cols[0], SelectItem::Wildcard(_)));
        assert!(matches!(
            &cols[1],
            SelectItem::QualifiedWildcard { schema: None, table, .. } if table.value == "t"
        ));
        assert!(matches!(
            &cols[2],
            SelectItem::QualifiedWildcard { schema: Some(db), .. } if db.value == "db"
        ));
        let aliases: Vec<_> = cols[3..]
            .iter()
            .map(|item| match item {
                SelectItem::Expr { alias: Some(a), .. } => (a.value.as_str(), a.quote),
                other => unreachable!("expected aliased expression, got {other:?}"),
            })
            .collect();
        assert_eq!(
            aliases,
            vec![("x", None), ("y", None), ("z", Some('\'')), ("w", Some('"'))]
        );
    }

    #[test]
    fn test_nonreserved_keyword_as_column_and_alias() {
        let s = select("SELECT date, value offset FROM t");
        let cols = &s.first_core().columns;
        match &cols[0] {
            SelectItem::Expr {
                expr: Expr::Column(c),
                alias: None,
                ..
            } => assert_eq!(c.column.value, "date"),
            other => unreachable!("unexpected item {other:?}"),
        }
        match &cols[1] {
            SelectItem::Expr { alias: Some(a), .. } => assert_eq!(a.value, "offset"),
            other => unreachable!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn test_group_by_with_rollup_and_having() {
        let s = select("SELECT a, COUNT(*) FROM t GROUP BY a DESC WITH ROLLUP HAVING COUNT(*) > 1");
        let core = s.first_core();
        assert_eq!(core.group_by.len(), 1);
        assert_eq!(core.group_by[0].direction, Some(SortDirection::Desc));
        assert!(core.with_rollup);
        assert!(core.having.is_some());
    }

    #[test]
    fn test_limit_forms_normalize() {
        let a = select("SELECT a FROM t LIMIT 10, 20");
        let limit = a.limit.expect("limit");
        assert!(matches!(limit.limit, Expr::Literal(Literal::Integer(20), _)));
        assert!(matches!(limit.offset, Some(Expr::Literal(Literal::Integer(10), _))));

        let b = select("SELECT a FROM t LIMIT 20 OFFSET 10");
        let limit = b.limit.expect("limit");
        assert!(matches!(limit.limit, Expr::Literal(Literal::Integer(20), _)));
        assert!(matches!(limit.offset, Some(Expr::Literal(Literal::Integer(10), _))));

        let c = select("SELECT a FROM t LIMIT ?, ?");
        let limit = c.limit.expect("limit");
        assert!(matches!(limit.offset, Some(Expr::Placeholder { index: 0, .. })));
        assert!(matches!(limit.limit, Expr::Placeholder { index: 1, .. }));
    }

    #[test]
    fn test_limit_rejects_expressions() {
        assert!(parse_err("SELECT a FROM t LIMIT a").is_syntax());
        assert!(parse_err("UPDATE t SET a = 1 LIMIT 1, 2").is_syntax());
    }

    #[test]
    fn test_locking_clauses() {
        let s = select("SELECT a FROM t WHERE id = 1 FOR UPDATE OF t, u SKIP LOCKED");
        let lock = s.locking.expect("locking");
        assert_eq!(lock.mode, LockMode::ForUpdate);
        assert_eq!(lock.of.len(), 2);
        assert_eq!(lock.wait, Some(LockWait::SkipLocked));

        let s = select("SELECT a FROM t LOCK IN SHARE MODE");
        assert_eq!(
            s.locking.expect("locking").mode,
            LockMode::LockInShareMode
        );

        let s = select("SELECT a FROM t FOR SHARE NOWAIT");
        let lock = s.locking.expect("locking");
        assert_eq!(lock.mode, LockMode::ForShare);
        assert_eq!(lock.wait, Some(LockWait::NoWait));
    }

    #[test]
    fn test_union_with_trailing_order_and_limit() {
        let s = select("(SELECT a FROM t1) UNION ALL SELECT a FROM t2 UNION DISTINCT SELECT a FROM t3 ORDER BY a LIMIT 5");
        assert!(matches!(s.body.first, QueryTerm::Nested(_)));
        assert_eq!(s.body.compounds.len(), 2);
        assert_eq!(s.body.compounds[0].0, CompoundOp::UnionAll);
        assert_eq!(s.body.compounds[1].0, CompoundOp::Union);
        assert_eq!(s.order_by.len(), 1);
        assert!(s.limit.is_some());
    }

    #[test]
    fn test_select_body_span_covers_compound_terms() {
        let sql = "WITH c AS (SELECT 1) (SELECT a FROM t1) UNION SELECT a FROM t2 ORDER BY a";
        let s = select(sql);
        assert_eq!(
            s.body.span.slice(sql),
            Some("(SELECT a FROM t1) UNION SELECT a FROM t2")
        );
        assert_eq!(s.body.span.column, 22);
    }

    #[test]
    fn test_with_clause() {
        let s = select("WITH RECURSIVE c (n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM c), d AS (SELECT 2) SELECT n FROM c");
        let with = s.with.expect("with");
        assert!(with.recursive);
        assert_eq!(with.ctes.len(), 2);
        assert_eq!(with.ctes[0].columns.len(), 1);
        assert_eq!(with.ctes[1].name.value, "d");
    }

    #[test]
    fn test_join_chain_is_left_deep() {
        let s = select(
            "SELECT * FROM a JOIN b ON a.id = b.id LEFT OUTER JOIN c USING (id) NATURAL RIGHT JOIN d CROSS JOIN e STRAIGHT_JOIN f",
        );
        let from = &s.first_core().from;
        assert_eq!(from.len(), 1);
        let mut types = Vec::new();
        let mut current = &from[0];
        while let TableReference::Joined {
            left,
            join_type,
            right,
            ..
        } = current
        {
            assert!(matches!(right.as_ref(), TableReference::Named(_)));
            types.push(*join_type);
            current = left;
        }
        types.reverse();
        assert_eq!(
            types,
            vec![
                JoinType::Inner,
                JoinType::Left,
                JoinType::NaturalRight,
                JoinType::Cross,
                JoinType::Straight,
            ]
        );
    }

    #[test]
    fn test_left_join_requires_condition() {
        let err = parse_err("SELECT * FROM a LEFT JOIN b WHERE x");
        match err {
            SqlError::Syntax(e) => {
                assert!(e.expected.contains(&"ON".to_owned()));
                assert!(e.expected.contains(&"USING".to_owned()));
                assert_eq!(e.found, "WHERE");
            }
            other => unreachable!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_derived_table_and_parenthesized_refs() {
        let s = select("SELECT * FROM (SELECT id FROM t) AS d, (t1, t2 JOIN t3 ON t2.a = t3.a)");
        let from = &s.first_core().from;
        assert!(matches!(&from[0], TableReference::Derived { alias, .. } if alias.value == "d"));
        match &from[1] {
            TableReference::Parenthesized { inner, .. } => assert_eq!(inner.len(), 2),
            other => unreachable!("expected parenthesized refs, got {other:?}"),
        }
    }

    #[test]
    fn test_derived_table_requires_alias() {
        let err = parse_err("SELECT * FROM (SELECT 1)");
        assert!(err.is_syntax());
    }

    #[test]
    fn test_named_table_partitions_alias_hints() {
        let s = select(
            "SELECT * FROM sales.t_order PARTITION (p0, p1) AS o USE INDEX () , FORCE KEY FOR ORDER BY (idx_a) IGNORE INDEX FOR JOIN (idx_b)",
        );
        let t = named(&s.first_core().from[0]);
        assert_eq!(t.name.schema.as_ref().map(|s| s.value.as_str()), Some("sales"));
        assert_eq!(t.partitions.len(), 2);
        assert_eq!(t.alias.as_ref().map(|a| a.value.as_str()), Some("o"));
        assert_eq!(t.index_hints.len(), 3);
        assert!(t.index_hints[0].indexes.is_empty());
        assert_eq!(t.index_hints[1].action, IndexHintAction::Force);
        assert_eq!(t.index_hints[1].scope, Some(IndexHintScope::OrderBy));
        assert_eq!(t.index_hints[2].scope, Some(IndexHintScope::Join));
    }

    #[test]
    fn test_insert_forms() {
        let i = insert("INSERT LOW_PRIORITY IGNORE INTO t (a, b) VALUES (1, DEFAULT), ()");
        assert_eq!(i.priority, Some(InsertPriority::LowPriority));
        assert!(i.ignore);
        assert_eq!(i.columns.len(), 2);
        match &i.source {
            InsertSource::Values(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(matches!(rows[0][1], Expr::Default(_)));
                assert!(rows[1].is_empty());
            }
            other => unreachable!("expected VALUES, got {other:?}"),
        }

        let i = insert("INSERT t SET a = 1, b = b + 1 ON DUPLICATE KEY UPDATE a = VALUES(a)");
        assert!(matches!(i.source, InsertSource::Set(ref a) if a.len() == 2));
        assert_eq!(i.on_duplicate.len(), 1);

        let i = insert("INSERT INTO t (a) SELECT x FROM u");
        assert!(matches!(i.source, InsertSource::Select(_)));

        let i = insert("INSERT INTO t (SELECT x FROM u)");
        assert!(i.columns.is_empty());
        assert!(matches!(i.source, InsertSource::Select(_)));

        let i = insert("INSERT INTO t VALUE (1)");
        assert!(matches!(i.source, InsertSource::Values(_)));
    }

    #[test]
    fn test_replace_has_no_on_duplicate() {
        let i = insert("REPLACE DELAYED INTO t VALUES (1)");
        assert_eq!(i.kind, InsertKind::Replace);
        assert_eq!(i.priority, Some(InsertPriority::Delayed));
        assert!(parse_err("REPLACE INTO t VALUES (1) ON DUPLICATE KEY UPDATE a = 1").is_syntax());
        assert!(parse_err("REPLACE IGNORE INTO t VALUES (1)").is_syntax());
    }

    #[test]
    fn test_update_multi_table() {
        match parse("UPDATE LOW_PRIORITY IGNORE t1 JOIN t2 ON t1.id = t2.id SET t1.a = t2.a WHERE t2.b > 0") {
            Statement::Update(u) => {
                assert!(u.low_priority);
                assert!(u.ignore);
                assert_eq!(u.tables.len(), 1);
                assert_eq!(
                    u.assignments[0].column.table.as_ref().map(|t| t.value.as_str()),
                    Some("t1")
                );
            }
            other => unreachable!("expected UPDATE, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_single_table() {
        let d = delete("DELETE LOW_PRIORITY QUICK IGNORE FROM t AS x PARTITION (p1) WHERE id = 5 ORDER BY id LIMIT 1");
        assert!(d.low_priority && d.quick && d.ignore);
        assert!(d.targets.is_empty());
        match &d.from {
            DeleteFrom::Single(t) => {
                assert_eq!(t.name.table.value, "t");
                assert_eq!(t.alias.as_ref().map(|a| a.value.as_str()), Some("x"));
                assert_eq!(t.partitions.len(), 1);
            }
            other => unreachable!("expected single-table DELETE, got {other:?}"),
        }
        assert_eq!(d.order_by.len(), 1);
        assert!(d.limit.is_some());
    }

    #[test]
    fn test_delete_multi_forms() {
        let d = delete("DELETE t1, t2.* FROM t1 JOIN t2 ON t1.id = t2.id WHERE t1.x = 1");
        assert_eq!(d.targets.len(), 2);
        assert!(matches!(d.from, DeleteFrom::Multi { using: false, .. }));

        let d = delete("DELETE FROM t1.*, t2 USING t1, t2 WHERE t1.id = t2.id");
        assert_eq!(d.targets.len(), 2);
        assert!(matches!(d.from, DeleteFrom::Multi { using: true, ref tables } if tables.len() == 2));
    }

    #[test]
    fn test_delete_multi_rejects_order_by() {
        assert!(parse_err("DELETE t1 FROM t1 ORDER BY a").is_syntax());
    }

    #[test]
    fn test_trailing_semicolon_and_garbage() {
        parse("SELECT 1;");
        let err = parse_err("SELECT 1; SELECT 2");
        match err {
            SqlError::Syntax(e) => assert_eq!(e.expected, vec!["end of input".to_owned()]),
            other => unreachable!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_statement() {
        match parse_err("DROP TABLE t") {
            SqlError::Syntax(e) => {
                assert!(e.expected.contains(&"SELECT".to_owned()));
                assert_eq!(e.found, "identifier `DROP`");
                assert_eq!(e.position, Position::new(0, 1, 1));
            }
            other => unreachable!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_lex_error_beats_syntax_error() {
        // The string is unterminated; parsing stops where lexing failed.
        let err = parse_err("SELECT a FROM t WHERE b = 'x");
        assert!(err.is_lexical());
        assert_eq!(err.position().offset, 26);
    }

    #[test]
    fn test_lex_error_after_complete_statement() {
        assert!(parse_err("SELECT 1 @").is_lexical());
    }

    #[test]
    fn test_furthest_error_is_reported() {
        // The USING alternative gets further than the single-table reading.
        match parse_err("DELETE FROM t1, t2 WHERE x = 1") {
            SqlError::Syntax(e) => {
                assert_eq!(e.found, "WHERE");
                assert!(e.expected.contains(&"USING".to_owned()));
            }
            other => unreachable!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_token_spans_exclude_eof() {
        let parsed = Parser::new("SELECT a FROM t;", &ParserConfig::default())
            .parse_statement()
            .expect("parse");
        assert_eq!(parsed.tokens.len(), 5);
        assert_eq!(parsed.tokens.last().map(|s| (s.start, s.end)), Some((15, 16)));
    }

    #[test]
    fn test_metrics_count_backtracks() {
        let before = parse_metrics_snapshot();
        parse("DELETE FROM t WHERE id = 5");
        let _ = parse_err("SELECT FROM");
        let after = parse_metrics_snapshot();
        assert!(after.backtracks > before.backtracks);
        assert!(after.statements > before.statements);
        assert!(after.failures > before.failures);
    }
}

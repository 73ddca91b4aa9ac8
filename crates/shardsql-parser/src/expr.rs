// Expression parsing via precedence climbing (Pratt).
//
// MySQL operator precedence (lowest to highest):
//   OR, ||
//   XOR
//   AND, &&
//   NOT (prefix)
//   = <=> <> != < <= > >= IS IN BETWEEN LIKE REGEXP SOUNDS LIKE
//   |
//   &
//   << >>
//   + -
//   * / DIV % MOD
//   ^
//   || (PIPES_AS_CONCAT)
//   unary - + ~ ! BINARY
//   COLLATE (postfix)

use shardsql_ast::{
    BinaryOp, ColumnRef, Expr, FunctionArgs, Ident, InSet, IsValue, LikeOp, Literal, Quantifier,
    Span, TemporalKind, TypeName, UnaryOp,
};
use shardsql_error::Result;

use crate::parser::Parser;
use crate::token::{Token, TokenKind};

/// Binding powers: higher = tighter binding.
mod bp {
    pub const OR: (u8, u8) = (1, 2);
    pub const XOR: (u8, u8) = (3, 4);
    pub const AND: (u8, u8) = (5, 6);
    pub const NOT_PREFIX: u8 = 7;
    pub const COMPARISON: (u8, u8) = (9, 10);
    pub const BIT_OR: (u8, u8) = (11, 12);
    pub const BIT_AND: (u8, u8) = (13, 14);
    pub const SHIFT: (u8, u8) = (15, 16);
    pub const ADD: (u8, u8) = (17, 18);
    pub const MUL: (u8, u8) = (19, 20);
    pub const BIT_XOR: (u8, u8) = (21, 22);
    pub const CONCAT: (u8, u8) = (23, 24);
    pub const UNARY: u8 = 25;
    pub const COLLATE: u8 = 27;

    /// Operands of BETWEEN, LIKE and SOUNDS LIKE sit below the comparison
    /// level, so `a BETWEEN 1 AND 2` does not swallow the `AND`.
    pub const PREDICATE_OPERAND: u8 = BIT_OR.0;
}

/// Character sets accepted after the `_` of a charset introducer.
const CHARSETS: &[&str] = &[
    "armscii8", "ascii", "big5", "binary", "cp1250", "cp1251", "cp1256", "cp1257", "cp850",
    "cp852", "cp866", "cp932", "dec8", "eucjpms", "euckr", "gb18030", "gb2312", "gbk", "geostd8",
    "greek", "hebrew", "hp8", "keybcs2", "koi8r", "koi8u", "latin1", "latin2", "latin5", "latin7",
    "macce", "macroman", "sjis", "swe7", "tis620", "ucs2", "ujis", "utf16", "utf16le", "utf32",
    "utf8", "utf8mb3", "utf8mb4",
];

fn introducer_charset(word: &str) -> Option<&str> {
    let charset = word.strip_prefix('_')?;
    CHARSETS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(charset))
        .then_some(charset)
}

impl Parser<'_> {
    /// Parse a full expression.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut items = vec![self.parse_expr()?];
        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_expr()?);
        }
        Ok(items)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        self.nested(|p| p.parse_expr_bp_inner(min_bp))
    }

    fn parse_expr_bp_inner(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            if self.check_kw(&TokenKind::KwCollate) {
                if bp::COLLATE < min_bp {
                    break;
                }
                lhs = self.parse_collate(lhs)?;
                continue;
            }

            let Some((l_bp, r_bp)) = self.infix_bp() else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            lhs = self.parse_infix(lhs, r_bp)?;
        }

        Ok(lhs)
    }

    // ── Infix ──

    fn infix_bp(&mut self) -> Option<(u8, u8)> {
        let pipes_as_concat = self.config.pipes_as_concat;
        let bp = match self.peek() {
            TokenKind::KwOr => bp::OR,
            TokenKind::PipePipe if pipes_as_concat => bp::CONCAT,
            TokenKind::PipePipe => bp::OR,
            TokenKind::KwXor => bp::XOR,
            TokenKind::KwAnd | TokenKind::AmpAmp => bp::AND,
            TokenKind::Eq
            | TokenKind::NullSafeEq
            | TokenKind::Ne
            | TokenKind::LtGt
            | TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge
            | TokenKind::KwIs
            | TokenKind::KwIn
            | TokenKind::KwBetween
            | TokenKind::KwLike
            | TokenKind::KwRegexp
            | TokenKind::KwRlike => bp::COMPARISON,
            // NOT only continues an expression as NOT IN / NOT BETWEEN / ...
            TokenKind::KwNot => {
                if !matches!(
                    self.peek_nth(1),
                    TokenKind::KwIn
                        | TokenKind::KwBetween
                        | TokenKind::KwLike
                        | TokenKind::KwRegexp
                        | TokenKind::KwRlike
                ) {
                    return None;
                }
                bp::COMPARISON
            }
            TokenKind::KwSounds => {
                if self.peek_nth(1) != &TokenKind::KwLike {
                    return None;
                }
                bp::COMPARISON
            }
            TokenKind::Pipe => bp::BIT_OR,
            TokenKind::Ampersand => bp::BIT_AND,
            TokenKind::ShiftLeft | TokenKind::ShiftRight => bp::SHIFT,
            TokenKind::Plus | TokenKind::Minus => bp::ADD,
            TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::KwDiv
            | TokenKind::KwMod => bp::MUL,
            TokenKind::Caret => bp::BIT_XOR,
            _ => return None,
        };
        Some(bp)
    }

    fn parse_infix(&mut self, lhs: Expr, r_bp: u8) -> Result<Expr> {
        let op = match self.advance().kind {
            TokenKind::KwOr => BinaryOp::Or,
            TokenKind::PipePipe if self.config.pipes_as_concat => BinaryOp::Concat,
            TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::KwXor => BinaryOp::Xor,
            TokenKind::KwAnd | TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::Eq => return self.parse_comparison(lhs, BinaryOp::Eq, r_bp),
            TokenKind::NullSafeEq => return self.parse_comparison(lhs, BinaryOp::NullSafeEq, r_bp),
            TokenKind::Ne | TokenKind::LtGt => return self.parse_comparison(lhs, BinaryOp::Ne, r_bp),
            TokenKind::Lt => return self.parse_comparison(lhs, BinaryOp::Lt, r_bp),
            TokenKind::Le => return self.parse_comparison(lhs, BinaryOp::Le, r_bp),
            TokenKind::Gt => return self.parse_comparison(lhs, BinaryOp::Gt, r_bp),
            TokenKind::Ge => return self.parse_comparison(lhs, BinaryOp::Ge, r_bp),
            TokenKind::KwIs => return self.parse_is(lhs),
            TokenKind::KwIn => return self.parse_in(lhs, false),
            TokenKind::KwBetween => return self.parse_between(lhs, false),
            TokenKind::KwLike => return self.parse_like(lhs, LikeOp::Like, false),
            TokenKind::KwRegexp | TokenKind::KwRlike => {
                return self.parse_like(lhs, LikeOp::Regexp, false);
            }
            TokenKind::KwNot => {
                return match self.advance().kind {
                    TokenKind::KwIn => self.parse_in(lhs, true),
                    TokenKind::KwBetween => self.parse_between(lhs, true),
                    TokenKind::KwLike => self.parse_like(lhs, LikeOp::Like, true),
                    _ => self.parse_like(lhs, LikeOp::Regexp, true),
                };
            }
            TokenKind::KwSounds => {
                self.expect_kw(&TokenKind::KwLike)?;
                let pattern = self.parse_expr_bp(bp::PREDICATE_OPERAND)?;
                return Ok(Expr::SoundsLike {
                    span: lhs.span().merge(pattern.span()),
                    expr: Box::new(lhs),
                    pattern: Box::new(pattern),
                });
            }
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Ampersand => BinaryOp::BitAnd,
            TokenKind::ShiftLeft => BinaryOp::ShiftLeft,
            TokenKind::ShiftRight => BinaryOp::ShiftRight,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Subtract,
            TokenKind::Star => BinaryOp::Multiply,
            TokenKind::Slash => BinaryOp::Divide,
            TokenKind::KwDiv => BinaryOp::IntDivide,
            TokenKind::Percent | TokenKind::KwMod => BinaryOp::Modulo,
            TokenKind::Caret => BinaryOp::BitXor,
            _ => return Err(self.err_expected("operator")),
        };
        let rhs = self.parse_expr_bp(r_bp)?;
        Ok(Expr::binary(lhs, op, rhs))
    }

    /// Right side of a comparison operator: an operand, or
    /// `ALL|ANY|SOME (subquery)`.
    fn parse_comparison(&mut self, lhs: Expr, op: BinaryOp, r_bp: u8) -> Result<Expr> {
        let quantifier = match self.peek() {
            TokenKind::KwAll => Some(Quantifier::All),
            TokenKind::KwAny | TokenKind::KwSome => Some(Quantifier::Any),
            _ => None,
        };
        match quantifier {
            // ANY and SOME are also valid column names.
            Some(quantifier) if self.subquery_follows(1) => {
                self.advance();
                self.expect_token(&TokenKind::LeftParen)?;
                let subquery = self.parse_select_statement()?;
                let end = self.expect_token(&TokenKind::RightParen)?;
                Ok(Expr::QuantifiedComparison {
                    span: lhs.span().merge(end),
                    left: Box::new(lhs),
                    op,
                    quantifier,
                    subquery: Box::new(subquery),
                })
            }
            _ => {
                let rhs = self.parse_expr_bp(r_bp)?;
                Ok(Expr::binary(lhs, op, rhs))
            }
        }
    }

    /// Whether the token `n` ahead opens a parenthesized query.
    fn subquery_follows(&mut self, n: usize) -> bool {
        self.peek_nth(n) == &TokenKind::LeftParen
            && matches!(
                self.peek_nth(n + 1),
                TokenKind::KwSelect | TokenKind::KwWith | TokenKind::LeftParen
            )
    }

    fn parse_is(&mut self, lhs: Expr) -> Result<Expr> {
        let not = self.eat_kw(&TokenKind::KwNot);
        let value = match self.peek() {
            TokenKind::KwNull => IsValue::Null,
            TokenKind::KwTrue => IsValue::True,
            TokenKind::KwFalse => IsValue::False,
            TokenKind::KwUnknown => IsValue::Unknown,
            _ => return Err(self.err_expected_any(&["NULL", "TRUE", "FALSE", "UNKNOWN"])),
        };
        let end = self.advance().span;
        Ok(Expr::Is {
            span: lhs.span().merge(end),
            expr: Box::new(lhs),
            not,
            value,
        })
    }

    fn parse_in(&mut self, lhs: Expr, not: bool) -> Result<Expr> {
        self.expect_token(&TokenKind::LeftParen)?;
        let query = match self.peek() {
            TokenKind::KwSelect | TokenKind::KwWith => Some(self.parse_select_statement()?),
            // `((SELECT ...) UNION ...)`, or a list whose first item is
            // parenthesized.
            TokenKind::LeftParen => self.attempt("IN subquery", |p| {
                let query = p.parse_select_statement()?;
                if !p.check(&TokenKind::RightParen) {
                    return Err(p.err_expected("')'"));
                }
                Ok(query)
            })?,
            _ => None,
        };
        let set = match query {
            Some(query) => InSet::Subquery(Box::new(query)),
            None => InSet::List(self.parse_expr_list()?),
        };
        let end = self.expect_token(&TokenKind::RightParen)?;
        Ok(Expr::In {
            span: lhs.span().merge(end),
            expr: Box::new(lhs),
            set,
            not,
        })
    }

    fn parse_between(&mut self, lhs: Expr, not: bool) -> Result<Expr> {
        let low = self.parse_expr_bp(bp::PREDICATE_OPERAND)?;
        self.expect_kw(&TokenKind::KwAnd)?;
        let high = self.parse_expr_bp(bp::PREDICATE_OPERAND)?;
        Ok(Expr::Between {
            span: lhs.span().merge(high.span()),
            expr: Box::new(lhs),
            low: Box::new(low),
            high: Box::new(high),
            not,
        })
    }

    fn parse_like(&mut self, lhs: Expr, op: LikeOp, not: bool) -> Result<Expr> {
        let pattern = self.parse_expr_bp(bp::PREDICATE_OPERAND)?;
        let escape = if op == LikeOp::Like && self.eat_kw(&TokenKind::KwEscape) {
            Some(Box::new(self.parse_expr_bp(bp::PREDICATE_OPERAND)?))
        } else {
            None
        };
        let end = escape.as_ref().map_or(pattern.span(), |e| e.span());
        Ok(Expr::Like {
            span: lhs.span().merge(end),
            expr: Box::new(lhs),
            pattern: Box::new(pattern),
            escape,
            op,
            not,
        })
    }

    fn parse_collate(&mut self, lhs: Expr) -> Result<Expr> {
        self.expect_kw(&TokenKind::KwCollate)?;
        let collation = match self.peek() {
            TokenKind::String(..) => {
                let tok = self.advance();
                match tok.kind {
                    TokenKind::String(value, quote) => Ident {
                        value,
                        quote: Some(quote),
                        span: tok.span,
                    },
                    _ => return Err(self.err_expected("collation name")),
                }
            }
            // `COLLATE binary` is common enough that keywords are names here.
            _ => self.parse_name(true)?,
        };
        Ok(Expr::Collate {
            span: lhs.span().merge(collation.span),
            expr: Box::new(lhs),
            collation,
        })
    }

    // ── Prefix ──

    fn parse_prefix(&mut self) -> Result<Expr> {
        let Token { kind, span } = self.stream.peek(0).clone();
        match kind {
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Integer(n), span))
            }
            TokenKind::Number(text) => {
                self.advance();
                Ok(Expr::Literal(Literal::Number(text), span))
            }
            TokenKind::String(..) => {
                let (value, span) = self.parse_string_run();
                Ok(Expr::Literal(Literal::String(value), span))
            }
            TokenKind::Hex(digits) => {
                self.advance();
                Ok(Expr::Literal(Literal::Hex(digits), span))
            }
            TokenKind::Bit(digits) => {
                self.advance();
                Ok(Expr::Literal(Literal::Bit(digits), span))
            }
            TokenKind::KwNull => {
                self.advance();
                Ok(Expr::Literal(Literal::Null, span))
            }
            TokenKind::KwTrue => {
                self.advance();
                Ok(Expr::Literal(Literal::True, span))
            }
            TokenKind::KwFalse => {
                self.advance();
                Ok(Expr::Literal(Literal::False, span))
            }
            TokenKind::Question => Ok(self.parse_placeholder()),
            TokenKind::LeftBrace => self.parse_odbc_literal(),

            TokenKind::KwDate | TokenKind::KwTime | TokenKind::KwTimestamp
                if matches!(self.peek_nth(1), TokenKind::String(..)) =>
            {
                let kind = match kind {
                    TokenKind::KwDate => TemporalKind::Date,
                    TokenKind::KwTime => TemporalKind::Time,
                    _ => TemporalKind::Timestamp,
                };
                self.advance();
                let (value, end) = self.parse_string_run();
                Ok(Expr::Literal(Literal::Temporal { kind, value }, span.merge(end)))
            }
            TokenKind::KwCurrentTimestamp => self.parse_current_timestamp(),
            TokenKind::KwDefault if self.peek_nth(1) != &TokenKind::LeftParen => {
                self.advance();
                Ok(Expr::Default(span))
            }

            TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Tilde
            | TokenKind::Bang
            | TokenKind::KwBinary => {
                let op = match kind {
                    TokenKind::Minus => UnaryOp::Negate,
                    TokenKind::Plus => UnaryOp::Plus,
                    TokenKind::Tilde => UnaryOp::BitNot,
                    TokenKind::Bang => UnaryOp::Not,
                    _ => UnaryOp::Binary,
                };
                self.advance();
                let operand = self.parse_expr_bp(bp::UNARY)?;
                Ok(Expr::UnaryOp {
                    op,
                    span: span.merge(operand.span()),
                    expr: Box::new(operand),
                })
            }
            TokenKind::KwNot => {
                self.advance();
                let operand = self.parse_expr_bp(bp::NOT_PREFIX)?;
                Ok(Expr::UnaryOp {
                    op: UnaryOp::Not,
                    span: span.merge(operand.span()),
                    expr: Box::new(operand),
                })
            }
            TokenKind::KwExists => {
                self.advance();
                self.expect_token(&TokenKind::LeftParen)?;
                let subquery = self.parse_select_statement()?;
                let end = self.expect_token(&TokenKind::RightParen)?;
                Ok(Expr::Exists {
                    subquery: Box::new(subquery),
                    span: span.merge(end),
                })
            }
            TokenKind::KwCast => self.parse_cast(),
            TokenKind::KwCase => self.parse_case(),
            TokenKind::KwRow if self.peek_nth(1) == &TokenKind::LeftParen => {
                self.advance();
                self.expect_token(&TokenKind::LeftParen)?;
                let items = self.parse_expr_list()?;
                let end = self.expect_token(&TokenKind::RightParen)?;
                Ok(Expr::Row(items, span.merge(end)))
            }
            TokenKind::LeftParen => self.parse_paren_expr(),

            TokenKind::Id(ref word)
                if matches!(
                    self.peek_nth(1),
                    TokenKind::String(..) | TokenKind::Hex(_) | TokenKind::Bit(_)
                ) && introducer_charset(word).is_some() =>
            {
                let charset = introducer_charset(word).unwrap_or_default().to_owned();
                self.advance();
                self.parse_introduced(charset, span)
            }
            TokenKind::Id(_) | TokenKind::QuotedId(..) => self.parse_name_expr(),
            ref k if k.is_function_keyword() && self.peek_nth(1) == &TokenKind::LeftParen => {
                let name = self.parse_name(true)?;
                self.parse_function_call(name)
            }
            ref k if k.is_nonreserved() => self.parse_name_expr(),
            _ => Err(self.err_expected("expression")),
        }
    }

    /// One or more adjacent string literals, which MySQL concatenates.
    fn parse_string_run(&mut self) -> (String, Span) {
        let start = self.current_span();
        let mut value = String::new();
        while let TokenKind::String(part, _) = self.peek() {
            value.push_str(part);
            self.advance();
        }
        (value, start.merge(self.prev_span()))
    }

    pub(crate) fn parse_placeholder(&mut self) -> Expr {
        let span = self.advance().span;
        Expr::Placeholder {
            index: self.next_placeholder(),
            span,
        }
    }

    /// `_charset 'text'`, `_charset X'..'`, `_charset 0b..`
    fn parse_introduced(&mut self, charset: String, start: Span) -> Result<Expr> {
        let tok = self.stream.peek(0).clone();
        let value = match tok.kind {
            TokenKind::String(..) => {
                let (value, _) = self.parse_string_run();
                Literal::String(value)
            }
            TokenKind::Hex(digits) => {
                self.advance();
                Literal::Hex(digits)
            }
            TokenKind::Bit(digits) => {
                self.advance();
                Literal::Bit(digits)
            }
            _ => return Err(self.err_expected("string literal")),
        };
        Ok(Expr::Literal(
            Literal::Introduced {
                charset,
                value: Box::new(value),
            },
            start.merge(self.prev_span()),
        ))
    }

    /// `{d '...'}`, `{t '...'}`, `{ts '...'}`
    fn parse_odbc_literal(&mut self) -> Result<Expr> {
        let start = self.expect_token(&TokenKind::LeftBrace)?;
        let kind = self.parse_identifier()?.value;
        if !matches!(self.peek(), TokenKind::String(..)) {
            return Err(self.err_expected("string literal"));
        }
        let (value, _) = self.parse_string_run();
        let end = self.expect_token(&TokenKind::RightBrace)?;
        Ok(Expr::Literal(Literal::Odbc { kind, value }, start.merge(end)))
    }

    /// `CURRENT_TIMESTAMP` and `CURRENT_TIMESTAMP()` are the literal; with
    /// an argument (fractional precision) it is an ordinary call.
    fn parse_current_timestamp(&mut self) -> Result<Expr> {
        if self.peek_nth(1) == &TokenKind::LeftParen && self.peek_nth(2) != &TokenKind::RightParen {
            let name = self.parse_name(true)?;
            return self.parse_function_call(name);
        }
        let start = self.advance().span;
        if self.eat(&TokenKind::LeftParen) {
            self.expect_token(&TokenKind::RightParen)?;
        }
        Ok(Expr::Literal(
            Literal::CurrentTimestamp,
            start.merge(self.prev_span()),
        ))
    }

    /// `(subquery)`, `(expr)` or `(expr, expr, ...)`.
    fn parse_paren_expr(&mut self) -> Result<Expr> {
        match self.peek_nth(1) {
            TokenKind::KwSelect | TokenKind::KwWith => return self.parse_subquery_expr(),
            // `((SELECT ...) UNION ...)` or just a nested expression.
            TokenKind::LeftParen => {
                if let Some(subquery) =
                    self.attempt("parenthesized query", Self::parse_subquery_expr)?
                {
                    return Ok(subquery);
                }
            }
            _ => {}
        }

        let start = self.expect_token(&TokenKind::LeftParen)?;
        let first = self.parse_expr()?;
        if !self.eat(&TokenKind::Comma) {
            self.expect_token(&TokenKind::RightParen)?;
            return Ok(first);
        }
        let mut items = vec![first];
        items.extend(self.parse_expr_list()?);
        let end = self.expect_token(&TokenKind::RightParen)?;
        Ok(Expr::Row(items, start.merge(end)))
    }

    fn parse_subquery_expr(&mut self) -> Result<Expr> {
        let start = self.expect_token(&TokenKind::LeftParen)?;
        let query = self.parse_select_statement()?;
        let end = self.expect_token(&TokenKind::RightParen)?;
        Ok(Expr::Subquery(Box::new(query), start.merge(end)))
    }

    /// An identifier-led expression: a function call or a column reference.
    fn parse_name_expr(&mut self) -> Result<Expr> {
        if self.peek_nth(1) == &TokenKind::LeftParen {
            let name = self.parse_identifier()?;
            return self.parse_function_call(name);
        }
        Ok(Expr::Column(self.parse_column_ref()?))
    }

    /// `[[schema.]table.]column`
    pub(crate) fn parse_column_ref(&mut self) -> Result<ColumnRef> {
        let first = self.parse_identifier()?;
        if !(self.check(&TokenKind::Dot) && self.is_name_after_dot(1)) {
            return Ok(ColumnRef {
                schema: None,
                table: None,
                span: first.span,
                column: first,
            });
        }
        self.advance();
        let second = self.parse_identifier_after_dot()?;
        if !(self.check(&TokenKind::Dot) && self.is_name_after_dot(1)) {
            return Ok(ColumnRef {
                schema: None,
                span: first.span.merge(second.span),
                table: Some(first),
                column: second,
            });
        }
        self.advance();
        let third = self.parse_identifier_after_dot()?;
        Ok(ColumnRef {
            span: first.span.merge(third.span),
            schema: Some(first),
            table: Some(second),
            column: third,
        })
    }

    /// Arguments of a call whose name has been consumed.
    fn parse_function_call(&mut self, name: Ident) -> Result<Expr> {
        self.expect_token(&TokenKind::LeftParen)?;
        if self.eat(&TokenKind::Star) {
            let end = self.expect_token(&TokenKind::RightParen)?;
            return Ok(Expr::FunctionCall {
                span: name.span.merge(end),
                name,
                args: FunctionArgs::Star,
                distinct: false,
            });
        }
        let distinct = self.eat_kw(&TokenKind::KwDistinct);
        let args = if !distinct && self.check(&TokenKind::RightParen) {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };
        let end = self.expect_token(&TokenKind::RightParen)?;
        Ok(Expr::FunctionCall {
            span: name.span.merge(end),
            name,
            args: FunctionArgs::List(args),
            distinct,
        })
    }

    fn parse_cast(&mut self) -> Result<Expr> {
        let start = self.expect_kw(&TokenKind::KwCast)?;
        self.expect_token(&TokenKind::LeftParen)?;
        let expr = self.parse_expr()?;
        self.expect_kw(&TokenKind::KwAs)?;
        let type_name = self.parse_type_name()?;
        let end = self.expect_token(&TokenKind::RightParen)?;
        Ok(Expr::Cast {
            expr: Box::new(expr),
            type_name,
            span: start.merge(end),
        })
    }

    /// Type words (`SIGNED INTEGER`, `CHAR`, `DECIMAL`) plus an optional
    /// `(length[, scale])`.
    fn parse_type_name(&mut self) -> Result<TypeName> {
        let mut words: Vec<String> = Vec::new();
        loop {
            let word = match self.peek() {
                TokenKind::Id(word) => word.to_ascii_uppercase(),
                kind => match kind.keyword_text() {
                    Some(text) => text.to_owned(),
                    None => break,
                },
            };
            words.push(word);
            self.advance();
        }
        if words.is_empty() {
            return Err(self.err_expected("type name"));
        }

        let (length, scale) = if self.eat(&TokenKind::LeftParen) {
            let length = self.parse_type_size()?;
            let scale = if self.eat(&TokenKind::Comma) {
                Some(self.parse_type_size()?)
            } else {
                None
            };
            self.expect_token(&TokenKind::RightParen)?;
            (Some(length), scale)
        } else {
            (None, None)
        };
        Ok(TypeName {
            name: words.join(" "),
            length,
            scale,
        })
    }

    fn parse_type_size(&mut self) -> Result<u32> {
        if let TokenKind::Integer(n) = *self.peek() {
            if let Ok(size) = u32::try_from(n) {
                self.advance();
                return Ok(size);
            }
        }
        Err(self.err_expected("type length"))
    }

    /// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`
    fn parse_case(&mut self) -> Result<Expr> {
        let start = self.expect_kw(&TokenKind::KwCase)?;
        let operand = if self.check_kw(&TokenKind::KwWhen) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };

        let mut whens = Vec::new();
        while self.eat_kw(&TokenKind::KwWhen) {
            let condition = self.parse_expr()?;
            self.expect_kw(&TokenKind::KwThen)?;
            let result = self.parse_expr()?;
            whens.push((condition, result));
        }
        if whens.is_empty() {
            return Err(self.err_expected("WHEN"));
        }

        let else_expr = if self.eat_kw(&TokenKind::KwElse) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        let end = self.expect_kw(&TokenKind::KwEnd)?;
        Ok(Expr::Case {
            operand,
            whens,
            else_expr,
            span: start.merge(end),
        })
    }
}

#[cfg(test)]
mod tests {
    use shardsql_error::SqlError;

    use super::*;
    use crate::config::ParserConfig;

    fn parse(sql: &str) -> Expr {
        parse_with(sql, &ParserConfig::default())
    }

    fn parse_with(sql: &str, config: &ParserConfig) -> Expr {
        Parser::new(sql, config)
            .parse_expression()
            .unwrap_or_else(|e| panic!("parse {sql:?}: {e}"))
    }

    fn parse_err(sql: &str) -> SqlError {
        Parser::new(sql, &ParserConfig::default())
            .parse_expression()
            .expect_err("parse error")
    }

    /// Render with every compound operand parenthesized, which makes the
    /// tree shape visible.
    fn shape(sql: &str) -> String {
        parse(sql).to_string()
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(shape("1 + 2 * 3"), "1 + (2 * 3)");
        assert_eq!(shape("1 * 2 + 3"), "(1 * 2) + 3");
        assert_eq!(shape("a - b - c"), "(a - b) - c");
        assert_eq!(shape("a DIV b MOD c % d"), "((a DIV b) % c) % d");
        assert_eq!(shape("a << 1 + 2"), "a << (1 + 2)");
        assert_eq!(shape("a | b & c"), "a | (b & c)");
        assert_eq!(shape("a * b ^ c"), "a * (b ^ c)");
    }

    #[test]
    fn test_logical_precedence() {
        assert_eq!(shape("a OR b AND c"), "a OR (b AND c)");
        assert_eq!(shape("a XOR b OR c"), "(a XOR b) OR c");
        assert_eq!(shape("a AND b XOR c"), "(a AND b) XOR c");
        assert_eq!(shape("a = 1 AND b = 2"), "(a = 1) AND (b = 2)");
        assert_eq!(shape("a || b && c"), "a OR (b AND c)");
    }

    #[test]
    fn test_not_binds_below_comparison() {
        assert_eq!(shape("NOT a = b AND c"), "(NOT (a = b)) AND c");
        assert_eq!(shape("!a = b"), "(NOT a) = b");
        assert_eq!(shape("NOT NOT a"), "NOT (NOT a)");
    }

    #[test]
    fn test_unary_binds_tighter_than_xor() {
        assert_eq!(shape("-a * b"), "(-a) * b");
        assert_eq!(shape("-a ^ b"), "(-a) ^ b");
        assert_eq!(shape("- -1"), "-(-1)");
        assert_eq!(shape("~a + 1"), "(~a) + 1");
    }

    #[test]
    fn test_negative_literal_is_not_folded() {
        match parse("-1") {
            Expr::UnaryOp {
                op: UnaryOp::Negate,
                expr,
                span,
            } => {
                assert!(matches!(*expr, Expr::Literal(Literal::Integer(1), _)));
                assert_eq!((span.start, span.end), (0, 2));
            }
            other => unreachable!("expected negation, got {other:?}"),
        }
    }

    #[test]
    fn test_comparison_family_is_left_associative() {
        assert_eq!(shape("a = b = c"), "(a = b) = c");
        assert_eq!(shape("a = b IS NULL"), "(a = b) IS NULL");
        assert_eq!(shape("a < b <=> c"), "(a < b) <=> c");
        assert_eq!(shape("a != b"), "a <> b");
    }

    #[test]
    fn test_between_does_not_swallow_and() {
        assert_eq!(shape("a BETWEEN 1 AND 2 AND b"), "(a BETWEEN 1 AND 2) AND b");
        assert_eq!(shape("a NOT BETWEEN b + 1 AND c * 2"), "a NOT BETWEEN (b + 1) AND (c * 2)");
    }

    #[test]
    fn test_in_forms() {
        match parse("a NOT IN (1, 2, 3)") {
            Expr::In {
                set: InSet::List(items),
                not: true,
                ..
            } => assert_eq!(items.len(), 3),
            other => unreachable!("expected IN list, got {other:?}"),
        }
        assert!(matches!(
            parse("a IN (SELECT id FROM t)"),
            Expr::In {
                set: InSet::Subquery(_),
                not: false,
                ..
            }
        ));
        assert!(parse_err("a IN ()").is_syntax());
    }

    #[test]
    fn test_in_parenthesized_query_or_list() {
        match parse("a IN ((SELECT 1) UNION (SELECT 2))") {
            Expr::In {
                set: InSet::Subquery(query),
                ..
            } => assert_eq!(query.body.compounds.len(), 1),
            other => unreachable!("expected IN subquery, got {other:?}"),
        }
        assert_eq!(
            shape("a IN ((SELECT 1) UNION ALL (SELECT 2) ORDER BY 1 LIMIT 1)"),
            "a IN ((SELECT 1) UNION ALL (SELECT 2) ORDER BY 1 LIMIT 1)"
        );
        match parse("a IN ((1), (2))") {
            Expr::In {
                set: InSet::List(items),
                ..
            } => assert_eq!(items.len(), 2),
            other => unreachable!("expected IN list, got {other:?}"),
        }
        match parse("a IN ((SELECT 1), (SELECT 2) + 1)") {
            Expr::In {
                set: InSet::List(items),
                ..
            } => {
                assert!(matches!(items[0], Expr::Subquery(..)));
                assert!(matches!(items[1], Expr::BinaryOp { .. }));
            }
            other => unreachable!("expected IN list, got {other:?}"),
        }
    }

    #[test]
    fn test_like_regexp_sounds_like() {
        match parse("name NOT LIKE 'a%' ESCAPE '!'") {
            Expr::Like {
                op: LikeOp::Like,
                not: true,
                escape: Some(_),
                ..
            } => {}
            other => unreachable!("expected NOT LIKE, got {other:?}"),
        }
        assert!(matches!(
            parse("a RLIKE '^x'"),
            Expr::Like {
                op: LikeOp::Regexp,
                not: false,
                ..
            }
        ));
        assert!(matches!(
            parse("a NOT REGEXP 'x'"),
            Expr::Like {
                op: LikeOp::Regexp,
                not: true,
                ..
            }
        ));
        assert!(matches!(parse("a SOUNDS LIKE b"), Expr::SoundsLike { .. }));
    }

    #[test]
    fn test_is_forms() {
        assert!(matches!(
            parse("a IS NOT UNKNOWN"),
            Expr::Is {
                not: true,
                value: IsValue::Unknown,
                ..
            }
        ));
        assert!(parse_err("a IS 1").is_syntax());
    }

    #[test]
    fn test_quantified_comparison() {
        match parse("a > ALL (SELECT b FROM t)") {
            Expr::QuantifiedComparison {
                op: BinaryOp::Gt,
                quantifier: Quantifier::All,
                ..
            } => {}
            other => unreachable!("expected ALL comparison, got {other:?}"),
        }
        assert!(matches!(
            parse("a = SOME (SELECT b FROM t)"),
            Expr::QuantifiedComparison {
                quantifier: Quantifier::Any,
                ..
            }
        ));
        // A column called `any` is still a column.
        assert_eq!(shape("a = any"), "a = any");
    }

    #[test]
    fn test_collate_binds_tighter_than_unary() {
        assert_eq!(shape("-a COLLATE utf8mb4_bin"), "-a COLLATE utf8mb4_bin");
        match parse("-a COLLATE utf8mb4_bin") {
            Expr::UnaryOp { expr, .. } => assert!(matches!(*expr, Expr::Collate { .. })),
            other => unreachable!("expected negation, got {other:?}"),
        }
        match parse("name COLLATE 'latin1_bin' = 'x'") {
            Expr::BinaryOp { left, .. } => match *left {
                Expr::Collate { collation, .. } => {
                    assert_eq!(collation.value, "latin1_bin");
                    assert_eq!(collation.quote, Some('\''));
                }
                other => unreachable!("expected COLLATE, got {other:?}"),
            },
            other => unreachable!("expected comparison, got {other:?}"),
        }
        assert!(matches!(parse("a COLLATE binary"), Expr::Collate { .. }));
    }

    #[test]
    fn test_pipes_as_concat() {
        let config = ParserConfig::default().with_pipes_as_concat(true);
        assert_eq!(parse_with("a || b * c", &config).to_string(), "(a || b) * c");
        assert_eq!(parse_with("a + b || c", &config).to_string(), "a + (b || c)");
        assert_eq!(parse_with("a || b AND c", &config).to_string(), "(a || b) AND c");
        assert_eq!(shape("a || b"), "a OR b");
    }

    #[test]
    fn test_literals() {
        assert!(matches!(parse("12"), Expr::Literal(Literal::Integer(12), _)));
        assert!(matches!(parse("1.5e3"), Expr::Literal(Literal::Number(ref t), _) if t == "1.5e3"));
        assert!(matches!(parse("'a' 'b'"), Expr::Literal(Literal::String(ref s), _) if s == "ab"));
        assert!(matches!(parse("X'1f'"), Expr::Literal(Literal::Hex(ref d), _) if d == "1f"));
        assert!(matches!(parse("0b101"), Expr::Literal(Literal::Bit(ref d), _) if d == "101"));
        assert!(matches!(parse("NULL"), Expr::Literal(Literal::Null, _)));
        assert!(matches!(parse("true"), Expr::Literal(Literal::True, _)));
        match parse("DATE '2024-01-01'") {
            Expr::Literal(
                Literal::Temporal {
                    kind: TemporalKind::Date,
                    value,
                },
                span,
            ) => {
                assert_eq!(value, "2024-01-01");
                assert_eq!((span.start, span.end), (0, 17));
            }
            other => unreachable!("expected DATE literal, got {other:?}"),
        }
        assert!(matches!(
            parse("{ts '2024-01-01 00:00:00'}"),
            Expr::Literal(Literal::Odbc { ref kind, .. }, _) if kind == "ts"
        ));
    }

    #[test]
    fn test_introducers() {
        match parse("_utf8mb4'abc'") {
            Expr::Literal(Literal::Introduced { charset, value }, _) => {
                assert_eq!(charset, "utf8mb4");
                assert_eq!(*value, Literal::String("abc".to_owned()));
            }
            other => unreachable!("expected introducer, got {other:?}"),
        }
        assert!(matches!(
            parse("_binary 0xFF"),
            Expr::Literal(Literal::Introduced { .. }, _)
        ));
        // Not a charset: an ordinary column followed by an alias-like string
        // is rejected as a standalone expression.
        assert!(parse_err("_nosuch 'x'").is_syntax());
        assert!(matches!(parse("_utf8mb4"), Expr::Column(_)));
    }

    #[test]
    fn test_current_timestamp_forms() {
        assert!(matches!(
            parse("CURRENT_TIMESTAMP"),
            Expr::Literal(Literal::CurrentTimestamp, _)
        ));
        assert!(matches!(
            parse("current_timestamp()"),
            Expr::Literal(Literal::CurrentTimestamp, _)
        ));
        assert!(matches!(parse("CURRENT_TIMESTAMP(3)"), Expr::FunctionCall { .. }));
    }

    #[test]
    fn test_placeholders_numbered_in_order() {
        let expr = parse("a = ? AND b IN (?, ?)");
        assert_eq!(expr.to_string(), "(a = ?) AND (b IN (?, ?))");
        let Expr::BinaryOp { left, right, .. } = expr else {
            unreachable!("expected AND");
        };
        assert!(matches!(
            *left,
            Expr::BinaryOp { ref right, .. } if matches!(**right, Expr::Placeholder { index: 0, .. })
        ));
        match *right {
            Expr::In {
                set: InSet::List(items),
                ..
            } => {
                assert!(matches!(items[0], Expr::Placeholder { index: 1, .. }));
                assert!(matches!(items[1], Expr::Placeholder { index: 2, .. }));
            }
            other => unreachable!("expected IN, got {other:?}"),
        }
    }

    #[test]
    fn test_function_calls() {
        match parse("COUNT(DISTINCT a, b)") {
            Expr::FunctionCall {
                name,
                args: FunctionArgs::List(args),
                distinct: true,
                ..
            } => {
                assert_eq!(name.value, "COUNT");
                assert_eq!(args.len(), 2);
            }
            other => unreachable!("expected COUNT, got {other:?}"),
        }
        assert!(matches!(
            parse("count(*)"),
            Expr::FunctionCall {
                args: FunctionArgs::Star,
                ..
            }
        ));
        assert!(matches!(
            parse("NOW()"),
            Expr::FunctionCall { args: FunctionArgs::List(ref a), .. } if a.is_empty()
        ));
        match parse("left(name, 3)") {
            Expr::FunctionCall { name, .. } => assert_eq!(name.value, "left"),
            other => unreachable!("expected LEFT(), got {other:?}"),
        }
        assert!(matches!(parse("IF(a, 1, 2)"), Expr::FunctionCall { .. }));
        assert!(matches!(parse("VALUES(a)"), Expr::FunctionCall { .. }));
        assert!(matches!(parse("DEFAULT(a)"), Expr::FunctionCall { .. }));
    }

    #[test]
    fn test_column_refs() {
        match parse("db.t.`select`") {
            Expr::Column(col) => {
                assert_eq!(col.schema.map(|s| s.value), Some("db".to_owned()));
                assert_eq!(col.table.map(|t| t.value), Some("t".to_owned()));
                assert_eq!(col.column.value, "select");
                assert_eq!(col.column.quote, Some('`'));
                assert_eq!((col.span.start, col.span.end), (0, 13));
            }
            other => unreachable!("expected column, got {other:?}"),
        }
        match parse("t.order") {
            Expr::Column(col) => assert_eq!(col.column.value, "order"),
            other => unreachable!("expected column, got {other:?}"),
        }
    }

    #[test]
    fn test_case_and_cast() {
        match parse("CASE a WHEN 1 THEN 'x' WHEN 2 THEN 'y' ELSE 'z' END") {
            Expr::Case {
                operand: Some(_),
                whens,
                else_expr: Some(_),
                ..
            } => assert_eq!(whens.len(), 2),
            other => unreachable!("expected CASE, got {other:?}"),
        }
        assert!(parse_err("CASE END").is_syntax());

        match parse("CAST(a AS decimal(10, 2))") {
            Expr::Cast { type_name, .. } => {
                assert_eq!(type_name.name, "DECIMAL");
                assert_eq!(type_name.length, Some(10));
                assert_eq!(type_name.scale, Some(2));
            }
            other => unreachable!("expected CAST, got {other:?}"),
        }
        match parse("CAST(a AS unsigned integer)") {
            Expr::Cast { type_name, .. } => assert_eq!(type_name.name, "UNSIGNED INTEGER"),
            other => unreachable!("expected CAST, got {other:?}"),
        }
        match parse("CAST(a AS CHAR)") {
            Expr::Cast { type_name, .. } => assert_eq!(type_name.name, "CHAR"),
            other => unreachable!("expected CAST, got {other:?}"),
        }
    }

    #[test]
    fn test_parens_rows_and_subqueries() {
        assert!(matches!(parse("(a)"), Expr::Column(_)));
        assert!(matches!(parse("(a, b)"), Expr::Row(ref items, _) if items.len() == 2));
        assert!(matches!(parse("ROW(a)"), Expr::Row(ref items, _) if items.len() == 1));
        assert!(matches!(parse("(SELECT 1)"), Expr::Subquery(..)));
        assert!(matches!(parse("((SELECT 1) UNION (SELECT 2))"), Expr::Subquery(..)));
        assert_eq!(shape("((SELECT 1) + 1)"), "(SELECT 1) + 1");
        assert!(matches!(parse("EXISTS (SELECT 1)"), Expr::Exists { .. }));
    }

    #[test]
    fn test_binary_prefix() {
        assert_eq!(shape("BINARY a = b"), "(BINARY a) = b");
    }

    #[test]
    fn test_error_positions() {
        match parse_err("a +") {
            SqlError::Syntax(e) => {
                assert_eq!(e.expected, vec!["expression".to_owned()]);
                assert_eq!(e.found, "end of input");
                assert_eq!(e.position.offset, 3);
            }
            other => unreachable!("expected syntax error, got {other:?}"),
        }
        match parse_err("a b") {
            SqlError::Syntax(e) => assert_eq!(e.found, "identifier `b`"),
            other => unreachable!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let config = ParserConfig::default().with_max_depth(8);
        let deep = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        let err = Parser::new(&deep, &config)
            .parse_expression()
            .expect_err("too deep");
        assert!(matches!(err, SqlError::RecursionLimitExceeded { limit: 8, .. }));

        let shallow = format!("{}1{}", "(".repeat(3), ")".repeat(3));
        Parser::new(&shallow, &config)
            .parse_expression()
            .expect("within limit");
    }
}

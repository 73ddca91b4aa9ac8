//! MySQL DML abstract syntax tree.
//!
//! Every statement parsed by `shardsql-parser` produces a tree of these
//! nodes. The tree is strict: subqueries embed their own [`SelectStatement`]
//! and nothing points back up. Nodes that correspond to source text carry a
//! [`Span`], which is what lets a sharding rewriter splice a new table name
//! into the original SQL without re-rendering the whole statement (see
//! [`rewrite`]).
//!
//! Rendering any node with `Display` produces canonical SQL that parses back
//! to the same tree, spans aside.

mod display;
pub mod rewrite;
pub mod visit;

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// A byte range into the original SQL text, plus the line and column of its
/// first character.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Byte offset of the first character (inclusive).
    pub start: u32,
    /// Byte offset one past the last character (exclusive).
    pub end: u32,
    /// 1-based line of `start`.
    pub line: u32,
    /// 1-based column of `start`, counted in characters.
    pub column: u32,
}

impl Span {
    /// A zero-length span at position 0, used for synthesized nodes.
    pub const ZERO: Self = Self {
        start: 0,
        end: 0,
        line: 0,
        column: 0,
    };

    #[must_use]
    pub const fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Merge two spans into one that covers both. Line and column follow
    /// whichever span starts first.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let (first, end) = if self.start <= other.start {
            (self, if other.end > self.end { other.end } else { self.end })
        } else {
            (other, if self.end > other.end { self.end } else { other.end })
        };
        Self {
            start: first.start,
            end,
            line: first.line,
            column: first.column,
        }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The source text this span covers, if it lies on character boundaries
    /// inside `source`.
    #[must_use]
    pub fn slice(self, source: &str) -> Option<&str> {
        source.get(self.start as usize..self.end as usize)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// An identifier as written: its unquoted value, the quote character that
/// surrounded it (backtick, `"` under ANSI_QUOTES, or `'`/`"` for string
/// aliases), and where it was.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ident {
    pub value: String,
    pub quote: Option<char>,
    pub span: Span,
}

impl Ident {
    /// An unquoted identifier with no source location.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quote: None,
            span: Span::ZERO,
        }
    }

    /// A backtick-quoted identifier with no source location.
    #[must_use]
    pub fn backticked(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quote: Some('`'),
            span: Span::ZERO,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// A possibly schema-qualified table name like `sales.t_order`.
///
/// `span` covers exactly `schema.table` as written, never an alias,
/// partition list or index hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableName {
    pub schema: Option<Ident>,
    pub table: Ident,
    pub span: Span,
}

impl TableName {
    /// An unqualified table name with no source location.
    #[must_use]
    pub fn bare(table: &str) -> Self {
        Self {
            schema: None,
            table: Ident::new(table),
            span: Span::ZERO,
        }
    }

    /// A schema-qualified table name with no source location.
    #[must_use]
    pub fn qualified(schema: &str, table: &str) -> Self {
        Self {
            schema: Some(Ident::new(schema)),
            table: Ident::new(table),
            span: Span::ZERO,
        }
    }
}

/// A column reference: `col`, `t.col` or `db.t.col`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRef {
    pub schema: Option<Ident>,
    pub table: Option<Ident>,
    pub column: Ident,
    pub span: Span,
}

impl ColumnRef {
    #[must_use]
    pub fn bare(column: &str) -> Self {
        Self {
            schema: None,
            table: None,
            column: Ident::new(column),
            span: Span::ZERO,
        }
    }

    #[must_use]
    pub fn qualified(table: &str, column: &str) -> Self {
        Self {
            schema: None,
            table: Some(Ident::new(table)),
            column: Ident::new(column),
            span: Span::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A single parsed DML statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "statement", rename_all = "snake_case")]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl Statement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Select(s) => s.span,
            Self::Insert(s) => s.span,
            Self::Update(s) => s.span,
            Self::Delete(s) => s.span,
        }
    }

    /// The leading keyword of the statement.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(s) => match s.kind {
                InsertKind::Insert => "INSERT",
                InsertKind::Replace => "REPLACE",
            },
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
        }
    }
}

// ---------------------------------------------------------------------------
// SELECT
// ---------------------------------------------------------------------------

/// A full query: optional CTEs, a (possibly compound) body, and the trailing
/// clauses that apply to the whole body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectStatement {
    pub with: Option<WithClause>,
    pub body: SelectBody,
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<LimitClause>,
    pub locking: Option<LockingClause>,
    pub span: Span,
}

impl SelectStatement {
    /// The first plain `SELECT` core, descending through parenthesized
    /// query terms.
    #[must_use]
    pub fn first_core(&self) -> &SelectCore {
        match &self.body.first {
            QueryTerm::Select(core) => core,
            QueryTerm::Nested(inner) => inner.first_core(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithClause {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
    pub span: Span,
}

/// `name [(col, ...)] AS (query)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cte {
    pub name: Ident,
    pub columns: Vec<Ident>,
    pub query: Box<SelectStatement>,
    pub span: Span,
}

/// `term [UNION [ALL] term]...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectBody {
    pub first: QueryTerm,
    pub compounds: Vec<(CompoundOp, QueryTerm)>,
    /// From the first term through the last, parentheses included.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryTerm {
    Select(Box<SelectCore>),
    /// `( query )` used as a term of a compound select.
    Nested(Box<SelectStatement>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundOp {
    Union,
    UnionAll,
}

/// One `SELECT ... [FROM] [WHERE] [GROUP BY] [HAVING]` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectCore {
    pub modifiers: SelectModifiers,
    pub columns: Vec<SelectItem>,
    /// Empty when there is no FROM clause.
    pub from: Vec<TableReference>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<OrderingTerm>,
    pub with_rollup: bool,
    pub having: Option<Expr>,
    pub span: Span,
}

/// The select options MySQL accepts between `SELECT` and the select list.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct SelectModifiers {
    pub quantifier: Option<SetQuantifier>,
    pub high_priority: bool,
    pub straight_join: bool,
    pub small_result: bool,
    pub big_result: bool,
    pub buffer_result: bool,
    pub cache: Option<SqlCache>,
    pub calc_found_rows: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetQuantifier {
    All,
    Distinct,
    DistinctRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlCache {
    Cache,
    NoCache,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectItem {
    /// `*`
    Wildcard(Span),
    /// `t.*` or `db.t.*`
    QualifiedWildcard {
        schema: Option<Ident>,
        table: Ident,
        span: Span,
    },
    /// `expr [[AS] alias]`
    Expr {
        expr: Expr,
        alias: Option<Ident>,
        span: Span,
    },
}

/// An `ORDER BY` / `GROUP BY` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingTerm {
    pub expr: Expr,
    pub direction: Option<SortDirection>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// `LIMIT count [OFFSET offset]`; `LIMIT offset, count` is normalized into
/// the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitClause {
    pub limit: Expr,
    pub offset: Option<Expr>,
    pub span: Span,
}

/// `FOR UPDATE`, `FOR SHARE` or `LOCK IN SHARE MODE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockingClause {
    pub mode: LockMode,
    pub of: Vec<TableName>,
    pub wait: Option<LockWait>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    ForUpdate,
    ForShare,
    LockInShareMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockWait {
    NoWait,
    SkipLocked,
}

// ---------------------------------------------------------------------------
// Table references
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableReference {
    /// `[schema.]table [PARTITION (...)] [[AS] alias] [index hints]`
    Named(NamedTable),
    /// `(query) [AS] alias`
    Derived {
        subquery: Box<SelectStatement>,
        alias: Ident,
        span: Span,
    },
    /// `left <join> right [ON expr | USING (cols)]`
    Joined {
        left: Box<Self>,
        join_type: JoinType,
        right: Box<Self>,
        condition: Option<JoinCondition>,
        span: Span,
    },
    /// `( table_references )`
    Parenthesized { inner: Vec<Self>, span: Span },
}

impl TableReference {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Named(named) => named.span,
            Self::Derived { span, .. }
            | Self::Joined { span, .. }
            | Self::Parenthesized { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedTable {
    pub name: TableName,
    pub partitions: Vec<Ident>,
    pub alias: Option<Ident>,
    pub index_hints: Vec<IndexHint>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    /// `JOIN` / `INNER JOIN`
    Inner,
    /// `CROSS JOIN`
    Cross,
    /// `STRAIGHT_JOIN`
    Straight,
    /// `LEFT [OUTER] JOIN`
    Left,
    /// `RIGHT [OUTER] JOIN`
    Right,
    /// `NATURAL [INNER] JOIN`
    Natural,
    /// `NATURAL LEFT [OUTER] JOIN`
    NaturalLeft,
    /// `NATURAL RIGHT [OUTER] JOIN`
    NaturalRight,
}

impl JoinType {
    /// Whether the grammar requires an ON/USING condition after this join.
    #[must_use]
    pub const fn requires_condition(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Whether the grammar forbids a condition after this join.
    #[must_use]
    pub const fn forbids_condition(self) -> bool {
        matches!(self, Self::Natural | Self::NaturalLeft | Self::NaturalRight)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinCondition {
    On(Expr),
    Using(Vec<Ident>),
}

/// `USE|IGNORE|FORCE INDEX [FOR ...] (names)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexHint {
    pub action: IndexHintAction,
    pub scope: Option<IndexHintScope>,
    pub indexes: Vec<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexHintAction {
    Use,
    Ignore,
    Force,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexHintScope {
    Join,
    OrderBy,
    GroupBy,
}

// ---------------------------------------------------------------------------
// INSERT / REPLACE
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertStatement {
    pub kind: InsertKind,
    pub priority: Option<InsertPriority>,
    pub ignore: bool,
    pub table: TableName,
    pub partitions: Vec<Ident>,
    pub columns: Vec<Ident>,
    pub source: InsertSource,
    /// `ON DUPLICATE KEY UPDATE` assignments; always empty for REPLACE.
    pub on_duplicate: Vec<Assignment>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertKind {
    Insert,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPriority {
    LowPriority,
    Delayed,
    HighPriority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertSource {
    /// `VALUES (row), (row), ...`; rows may be empty.
    Values(Vec<Vec<Expr>>),
    Select(Box<SelectStatement>),
    /// `SET col = value, ...`
    Set(Vec<Assignment>),
}

/// `col = value` in SET, ON DUPLICATE KEY UPDATE or UPDATE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub column: ColumnRef,
    pub value: Expr,
    pub span: Span,
}

// ---------------------------------------------------------------------------
// UPDATE / DELETE
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateStatement {
    pub low_priority: bool,
    pub ignore: bool,
    pub tables: Vec<TableReference>,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<LimitClause>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteStatement {
    pub low_priority: bool,
    pub quick: bool,
    pub ignore: bool,
    /// Tables rows are deleted from in the multi-table forms; empty for the
    /// single-table form.
    pub targets: Vec<TableName>,
    pub from: DeleteFrom,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<LimitClause>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteFrom {
    /// `DELETE FROM t ...`
    Single(NamedTable),
    /// `DELETE t1, ... FROM refs` (`using == false`) or
    /// `DELETE FROM t1, ... USING refs` (`using == true`).
    Multi {
        tables: Vec<TableReference>,
        using: bool,
    },
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Integer(i64),
    /// Exact source text of a decimal, exponent or out-of-range integer
    /// literal.
    Number(String),
    String(String),
    /// `_charset'text'` or `_charset 0x...`
    Introduced {
        charset: String,
        value: Box<Self>,
    },
    /// Hex digits of `0x...` / `X'...'`.
    Hex(String),
    /// Binary digits of `0b...` / `B'...'`.
    Bit(String),
    Null,
    True,
    False,
    /// `DATE '...'`, `TIME '...'`, `TIMESTAMP '...'`
    Temporal {
        kind: TemporalKind,
        value: String,
    },
    /// ODBC escape `{d '...'}`
    Odbc {
        kind: String,
        value: String,
    },
    CurrentTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalKind {
    Date,
    Time,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    // Logical
    Or,
    Xor,
    And,
    // Comparison
    Eq,
    NullSafeEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Bitwise
    BitOr,
    BitAnd,
    ShiftLeft,
    ShiftRight,
    BitXor,
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    IntDivide,
    Modulo,
    /// `||` under PIPES_AS_CONCAT.
    Concat,
}

impl BinaryOp {
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NullSafeEq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Negate,
    Plus,
    BitNot,
    /// `NOT` and `!`.
    Not,
    /// `BINARY expr`
    Binary,
}

/// Right-hand side of `IS [NOT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IsValue {
    Null,
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    All,
    /// `ANY` or `SOME`.
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeOp {
    Like,
    /// `REGEXP` / `RLIKE`
    Regexp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InSet {
    List(Vec<Expr>),
    Subquery(Box<SelectStatement>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionArgs {
    /// `count(*)`
    Star,
    List(Vec<Expr>),
}

/// Target type of `CAST(expr AS type)`, e.g. `DECIMAL(10, 2)` or
/// `UNSIGNED INTEGER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeName {
    /// Upper-cased words of the type, space separated.
    pub name: String,
    pub length: Option<u32>,
    pub scale: Option<u32>,
}

/// An expression node. Every variant carries the span of its full source
/// extent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Literal(Literal, Span),
    Column(ColumnRef),
    /// `?`, numbered from 0 in source order.
    Placeholder {
        index: u32,
        span: Span,
    },
    /// `DEFAULT` in a value position.
    Default(Span),
    BinaryOp {
        left: Box<Self>,
        op: BinaryOp,
        right: Box<Self>,
        span: Span,
    },
    UnaryOp {
        op: UnaryOp,
        expr: Box<Self>,
        span: Span,
    },
    /// `expr IS [NOT] NULL|TRUE|FALSE|UNKNOWN`
    Is {
        expr: Box<Self>,
        not: bool,
        value: IsValue,
        span: Span,
    },
    /// `expr op ALL|ANY (subquery)`
    QuantifiedComparison {
        left: Box<Self>,
        op: BinaryOp,
        quantifier: Quantifier,
        subquery: Box<SelectStatement>,
        span: Span,
    },
    Between {
        expr: Box<Self>,
        low: Box<Self>,
        high: Box<Self>,
        not: bool,
        span: Span,
    },
    In {
        expr: Box<Self>,
        set: InSet,
        not: bool,
        span: Span,
    },
    Like {
        expr: Box<Self>,
        pattern: Box<Self>,
        escape: Option<Box<Self>>,
        op: LikeOp,
        not: bool,
        span: Span,
    },
    /// `expr SOUNDS LIKE expr`
    SoundsLike {
        expr: Box<Self>,
        pattern: Box<Self>,
        span: Span,
    },
    Case {
        operand: Option<Box<Self>>,
        whens: Vec<(Self, Self)>,
        else_expr: Option<Box<Self>>,
        span: Span,
    },
    Cast {
        expr: Box<Self>,
        type_name: TypeName,
        span: Span,
    },
    FunctionCall {
        name: Ident,
        args: FunctionArgs,
        distinct: bool,
        span: Span,
    },
    Subquery(Box<SelectStatement>, Span),
    Exists {
        subquery: Box<SelectStatement>,
        span: Span,
    },
    /// `ROW(a, b)` or `(a, b)`
    Row(Vec<Self>, Span),
    Collate {
        expr: Box<Self>,
        collation: Ident,
        span: Span,
    },
}

impl Expr {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Literal(_, span)
            | Self::Default(span)
            | Self::Subquery(_, span)
            | Self::Row(_, span) => *span,
            Self::Column(col) => col.span,
            Self::Placeholder { span, .. }
            | Self::BinaryOp { span, .. }
            | Self::UnaryOp { span, .. }
            | Self::Is { span, .. }
            | Self::QuantifiedComparison { span, .. }
            | Self::Between { span, .. }
            | Self::In { span, .. }
            | Self::Like { span, .. }
            | Self::SoundsLike { span, .. }
            | Self::Case { span, .. }
            | Self::Cast { span, .. }
            | Self::FunctionCall { span, .. }
            | Self::Exists { span, .. }
            | Self::Collate { span, .. } => *span,
        }
    }

    /// Build a binary node spanning both operands.
    #[must_use]
    pub fn binary(left: Self, op: BinaryOp, right: Self) -> Self {
        let span = left.span().merge(right.span());
        Self::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(start: u32, end: u32) -> Span {
        Span::new(start, end, 1, start + 1)
    }

    #[test]
    fn test_span_merge() {
        let a = sp(5, 10);
        let b = sp(8, 20);
        let merged = a.merge(b);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 20);
        assert_eq!(merged.column, 6);
        assert_eq!(merged.len(), 15);
    }

    #[test]
    fn test_span_merge_takes_position_of_earlier_span() {
        let later = Span::new(12, 14, 2, 3);
        let earlier = Span::new(0, 6, 1, 1);
        let merged = later.merge(earlier);
        assert_eq!((merged.start, merged.end), (0, 14));
        assert_eq!((merged.line, merged.column), (1, 1));
    }

    #[test]
    fn test_span_slice() {
        let src = "SELECT a FROM t_order";
        assert_eq!(sp(14, 21).slice(src), Some("t_order"));
        assert_eq!(sp(14, 99).slice(src), None);
        assert!(Span::ZERO.is_empty());
    }

    #[test]
    fn test_expr_binary_helper_merges_spans() {
        let a = Expr::Column(ColumnRef {
            span: sp(0, 1),
            ..ColumnRef::bare("a")
        });
        let one = Expr::Literal(Literal::Integer(1), sp(4, 5));
        let eq = Expr::binary(a, BinaryOp::Eq, one);
        assert_eq!(eq.span(), sp(0, 5));
        assert!(matches!(eq, Expr::BinaryOp { op: BinaryOp::Eq, .. }));
    }

    #[test]
    fn test_join_type_condition_rules() {
        assert!(JoinType::Left.requires_condition());
        assert!(!JoinType::Inner.requires_condition());
        assert!(JoinType::NaturalLeft.forbids_condition());
        assert!(!JoinType::Cross.forbids_condition());
    }

    #[test]
    fn test_statement_kind_name() {
        let stmt = Statement::Delete(DeleteStatement {
            low_priority: false,
            quick: false,
            ignore: false,
            targets: Vec::new(),
            from: DeleteFrom::Single(NamedTable {
                name: TableName::bare("t"),
                partitions: Vec::new(),
                alias: None,
                index_hints: Vec::new(),
                span: Span::ZERO,
            }),
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            span: sp(0, 15),
        });
        assert_eq!(stmt.kind_name(), "DELETE");
        assert_eq!(stmt.span(), sp(0, 15));
    }

    #[test]
    fn test_binary_op_is_comparison() {
        assert!(BinaryOp::NullSafeEq.is_comparison());
        assert!(BinaryOp::Ge.is_comparison());
        assert!(!BinaryOp::And.is_comparison());
        assert!(!BinaryOp::BitXor.is_comparison());
    }
}

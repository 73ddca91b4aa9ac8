//! Canonical SQL rendering via `fmt::Display`.
//!
//! The output is normalized (upper-case keywords, `LIMIT n OFFSET m`, `<>`
//! for both inequality spellings) and parenthesizes every compound operand,
//! so `parse(render(parse(sql)))` yields the same tree as `parse(sql)` under
//! the same parser configuration. String literals are escaped for MySQL's
//! default SQL mode.

#[allow(clippy::wildcard_imports)]
use crate::*;
use std::fmt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn paren_ident_list(f: &mut fmt::Formatter<'_>, idents: &[Ident]) -> fmt::Result {
    f.write_str("(")?;
    comma_list(f, idents)?;
    f.write_str(")")
}

/// Whether an unquoted identifier would lex back as the same identifier.
fn needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    let ident_char = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$' || !c.is_ascii();
    if first.is_ascii_digit() || !ident_char(first) {
        return true;
    }
    !chars.all(ident_char)
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str, quote: char) -> fmt::Result {
    let mut buf = [0u8; 4];
    let quote_str: &str = quote.encode_utf8(&mut buf);
    f.write_str(quote_str)?;
    for ch in value.chars() {
        if ch == quote {
            f.write_str(quote_str)?;
        }
        write!(f, "{ch}")?;
    }
    f.write_str(quote_str)
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for ch in value.chars() {
        match ch {
            '\'' => f.write_str("''")?,
            '\\' => f.write_str("\\\\")?,
            '\0' => f.write_str("\\0")?,
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("'")
}

/// Write an operand, wrapping it in parentheses unless it is atomic. This is
/// what keeps precedence intact through render and re-parse, and it keeps
/// `- -1` from turning into a `--` comment.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if matches!(
        expr,
        Expr::BinaryOp { .. }
            | Expr::UnaryOp { .. }
            | Expr::Is { .. }
            | Expr::QuantifiedComparison { .. }
            | Expr::Between { .. }
            | Expr::In { .. }
            | Expr::Like { .. }
            | Expr::SoundsLike { .. }
    ) {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_clauses(
    f: &mut fmt::Formatter<'_>,
    where_clause: Option<&Expr>,
    order_by: &[OrderingTerm],
    limit: Option<&LimitClause>,
) -> fmt::Result {
    if let Some(cond) = where_clause {
        write!(f, " WHERE {cond}")?;
    }
    if !order_by.is_empty() {
        f.write_str(" ORDER BY ")?;
        comma_list(f, order_by)?;
    }
    if let Some(limit) = limit {
        write!(f, " {limit}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quote {
            Some(q) => write_quoted(f, &self.value, q),
            None if needs_quoting(&self.value) => write_quoted(f, &self.value, '`'),
            None => f.write_str(&self.value),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        write!(f, "{}", self.table)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        if let Some(table) = &self.table {
            write!(f, "{table}.")?;
        }
        write!(f, "{}", self.column)
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(s) => write!(f, "{s}"),
            Self::Insert(s) => write!(f, "{s}"),
            Self::Update(s) => write!(f, "{s}"),
            Self::Delete(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }
        write!(f, "{}", self.body)?;
        write_clauses(f, None, &self.order_by, self.limit.as_ref())?;
        if let Some(locking) = &self.locking {
            write!(f, " {locking}")?;
        }
        Ok(())
    }
}

impl fmt::Display for WithClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WITH ")?;
        if self.recursive {
            f.write_str("RECURSIVE ")?;
        }
        comma_list(f, &self.ctes)
    }
}

impl fmt::Display for Cte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.columns.is_empty() {
            f.write_str(" ")?;
            paren_ident_list(f, &self.columns)?;
        }
        write!(f, " AS ({})", self.query)
    }
}

impl fmt::Display for SelectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for (op, term) in &self.compounds {
            write!(f, " {op} {term}")?;
        }
        Ok(())
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(core) => write!(f, "{core}"),
            Self::Nested(stmt) => write!(f, "({stmt})"),
        }
    }
}

impl fmt::Display for CompoundOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
        })
    }
}

impl fmt::Display for SelectCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT{} ", self.modifiers)?;
        comma_list(f, &self.columns)?;
        if !self.from.is_empty() {
            f.write_str(" FROM ")?;
            comma_list(f, &self.from)?;
        }
        if let Some(cond) = &self.where_clause {
            write!(f, " WHERE {cond}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            comma_list(f, &self.group_by)?;
            if self.with_rollup {
                f.write_str(" WITH ROLLUP")?;
            }
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        Ok(())
    }
}

/// Renders with a leading space per modifier so `SELECT{modifiers}` reads
/// naturally when none are set.
impl fmt::Display for SelectModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quantifier {
            Some(SetQuantifier::All) => f.write_str(" ALL")?,
            Some(SetQuantifier::Distinct) => f.write_str(" DISTINCT")?,
            Some(SetQuantifier::DistinctRow) => f.write_str(" DISTINCTROW")?,
            None => {}
        }
        if self.high_priority {
            f.write_str(" HIGH_PRIORITY")?;
        }
        if self.straight_join {
            f.write_str(" STRAIGHT_JOIN")?;
        }
        if self.small_result {
            f.write_str(" SQL_SMALL_RESULT")?;
        }
        if self.big_result {
            f.write_str(" SQL_BIG_RESULT")?;
        }
        if self.buffer_result {
            f.write_str(" SQL_BUFFER_RESULT")?;
        }
        match self.cache {
            Some(SqlCache::Cache) => f.write_str(" SQL_CACHE")?,
            Some(SqlCache::NoCache) => f.write_str(" SQL_NO_CACHE")?,
            None => {}
        }
        if self.calc_found_rows {
            f.write_str(" SQL_CALC_FOUND_ROWS")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard(_) => f.write_str("*"),
            Self::QualifiedWildcard { schema, table, .. } => {
                if let Some(schema) = schema {
                    write!(f, "{schema}.")?;
                }
                write!(f, "{table}.*")
            }
            Self::Expr { expr, alias, .. } => {
                write!(f, "{expr}")?;
                if let Some(alias) = alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for OrderingTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.direction {
            Some(SortDirection::Asc) => f.write_str(" ASC"),
            Some(SortDirection::Desc) => f.write_str(" DESC"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for LimitClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {}", self.limit)?;
        if let Some(offset) = &self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}

impl fmt::Display for LockingClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.mode {
            LockMode::ForUpdate => "FOR UPDATE",
            LockMode::ForShare => "FOR SHARE",
            LockMode::LockInShareMode => "LOCK IN SHARE MODE",
        })?;
        if !self.of.is_empty() {
            f.write_str(" OF ")?;
            comma_list(f, &self.of)?;
        }
        match self.wait {
            Some(LockWait::NoWait) => f.write_str(" NOWAIT"),
            Some(LockWait::SkipLocked) => f.write_str(" SKIP LOCKED"),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Table references
// ---------------------------------------------------------------------------

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => write!(f, "{named}"),
            Self::Derived {
                subquery, alias, ..
            } => write!(f, "({subquery}) AS {alias}"),
            Self::Joined {
                left,
                join_type,
                right,
                condition,
                ..
            } => {
                write!(f, "{left} {join_type} {right}")?;
                match condition {
                    Some(JoinCondition::On(expr)) => write!(f, " ON {expr}"),
                    Some(JoinCondition::Using(cols)) => {
                        f.write_str(" USING ")?;
                        paren_ident_list(f, cols)
                    }
                    None => Ok(()),
                }
            }
            Self::Parenthesized { inner, .. } => {
                f.write_str("(")?;
                comma_list(f, inner)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for NamedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.partitions.is_empty() {
            f.write_str(" PARTITION ")?;
            paren_ident_list(f, &self.partitions)?;
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        for hint in &self.index_hints {
            write!(f, " {hint}")?;
        }
        Ok(())
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inner => "INNER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Straight => "STRAIGHT_JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Natural => "NATURAL JOIN",
            Self::NaturalLeft => "NATURAL LEFT JOIN",
            Self::NaturalRight => "NATURAL RIGHT JOIN",
        })
    }
}

impl fmt::Display for IndexHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.action {
            IndexHintAction::Use => "USE INDEX",
            IndexHintAction::Ignore => "IGNORE INDEX",
            IndexHintAction::Force => "FORCE INDEX",
        })?;
        match self.scope {
            Some(IndexHintScope::Join) => f.write_str(" FOR JOIN")?,
            Some(IndexHintScope::OrderBy) => f.write_str(" FOR ORDER BY")?,
            Some(IndexHintScope::GroupBy) => f.write_str(" FOR GROUP BY")?,
            None => {}
        }
        f.write_str(" ")?;
        paren_ident_list(f, &self.indexes)
    }
}

// ---------------------------------------------------------------------------
// INSERT / UPDATE / DELETE
// ---------------------------------------------------------------------------

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.kind {
            InsertKind::Insert => "INSERT",
            InsertKind::Replace => "REPLACE",
        })?;
        match self.priority {
            Some(InsertPriority::LowPriority) => f.write_str(" LOW_PRIORITY")?,
            Some(InsertPriority::Delayed) => f.write_str(" DELAYED")?,
            Some(InsertPriority::HighPriority) => f.write_str(" HIGH_PRIORITY")?,
            None => {}
        }
        if self.ignore {
            f.write_str(" IGNORE")?;
        }
        write!(f, " INTO {}", self.table)?;
        if !self.partitions.is_empty() {
            f.write_str(" PARTITION ")?;
            paren_ident_list(f, &self.partitions)?;
        }
        if !self.columns.is_empty() {
            f.write_str(" ")?;
            paren_ident_list(f, &self.columns)?;
        }
        match &self.source {
            InsertSource::Values(rows) => {
                f.write_str(" VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("(")?;
                    comma_list(f, row)?;
                    f.write_str(")")?;
                }
            }
            InsertSource::Select(query) => write!(f, " {query}")?,
            InsertSource::Set(assignments) => {
                f.write_str(" SET ")?;
                comma_list(f, assignments)?;
            }
        }
        if !self.on_duplicate.is_empty() {
            f.write_str(" ON DUPLICATE KEY UPDATE ")?;
            comma_list(f, &self.on_duplicate)?;
        }
        Ok(())
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column, self.value)
    }
}

impl fmt::Display for UpdateStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UPDATE ")?;
        if self.low_priority {
            f.write_str("LOW_PRIORITY ")?;
        }
        if self.ignore {
            f.write_str("IGNORE ")?;
        }
        comma_list(f, &self.tables)?;
        f.write_str(" SET ")?;
        comma_list(f, &self.assignments)?;
        write_clauses(
            f,
            self.where_clause.as_ref(),
            &self.order_by,
            self.limit.as_ref(),
        )
    }
}

impl fmt::Display for DeleteStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DELETE")?;
        if self.low_priority {
            f.write_str(" LOW_PRIORITY")?;
        }
        if self.quick {
            f.write_str(" QUICK")?;
        }
        if self.ignore {
            f.write_str(" IGNORE")?;
        }
        match &self.from {
            DeleteFrom::Single(table) => write!(f, " FROM {table}")?,
            DeleteFrom::Multi {
                tables,
                using: false,
            } => {
                f.write_str(" ")?;
                comma_list(f, &self.targets)?;
                f.write_str(" FROM ")?;
                comma_list(f, tables)?;
            }
            DeleteFrom::Multi {
                tables,
                using: true,
            } => {
                f.write_str(" FROM ")?;
                comma_list(f, &self.targets)?;
                f.write_str(" USING ")?;
                comma_list(f, tables)?;
            }
        }
        write_clauses(
            f,
            self.where_clause.as_ref(),
            &self.order_by,
            self.limit.as_ref(),
        )
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Number(text) => f.write_str(text),
            Self::String(s) => write_string_literal(f, s),
            Self::Introduced { charset, value } => {
                if matches!(value.as_ref(), Self::String(_)) {
                    write!(f, "_{charset}{value}")
                } else {
                    write!(f, "_{charset} {value}")
                }
            }
            Self::Hex(digits) if digits.is_empty() => f.write_str("X''"),
            Self::Hex(digits) => write!(f, "0x{digits}"),
            Self::Bit(digits) if digits.is_empty() => f.write_str("B''"),
            Self::Bit(digits) => write!(f, "0b{digits}"),
            Self::Null => f.write_str("NULL"),
            Self::True => f.write_str("TRUE"),
            Self::False => f.write_str("FALSE"),
            Self::Temporal { kind, value } => {
                f.write_str(match kind {
                    TemporalKind::Date => "DATE ",
                    TemporalKind::Time => "TIME ",
                    TemporalKind::Timestamp => "TIMESTAMP ",
                })?;
                write_string_literal(f, value)
            }
            Self::Odbc { kind, value } => {
                write!(f, "{{{kind} ")?;
                write_string_literal(f, value)?;
                f.write_str("}")
            }
            Self::CurrentTimestamp => f.write_str("CURRENT_TIMESTAMP"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::And => "AND",
            Self::Eq => "=",
            Self::NullSafeEq => "<=>",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::BitOr => "|",
            Self::BitAnd => "&",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::BitXor => "^",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::IntDivide => "DIV",
            Self::Modulo => "%",
            Self::Concat => "||",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Negate => "-",
            Self::Plus => "+",
            Self::BitNot => "~",
            Self::Not => "NOT ",
            Self::Binary => "BINARY ",
        })
    }
}

impl fmt::Display for IsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Unknown => "UNKNOWN",
        })
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match (self.length, self.scale) {
            (Some(length), Some(scale)) => write!(f, "({length}, {scale})"),
            (Some(length), None) => write!(f, "({length})"),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Expr {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit, _) => write!(f, "{lit}"),
            Self::Column(col) => write!(f, "{col}"),
            Self::Placeholder { .. } => f.write_str("?"),
            Self::Default(_) => f.write_str("DEFAULT"),
            Self::BinaryOp {
                left, op, right, ..
            } => {
                write_operand(f, left)?;
                write!(f, " {op} ")?;
                write_operand(f, right)
            }
            Self::UnaryOp { op, expr, .. } => {
                write!(f, "{op}")?;
                write_operand(f, expr)
            }
            Self::Is {
                expr, not, value, ..
            } => {
                write_operand(f, expr)?;
                if *not {
                    write!(f, " IS NOT {value}")
                } else {
                    write!(f, " IS {value}")
                }
            }
            Self::QuantifiedComparison {
                left,
                op,
                quantifier,
                subquery,
                ..
            } => {
                write_operand(f, left)?;
                let quantifier = match quantifier {
                    Quantifier::All => "ALL",
                    Quantifier::Any => "ANY",
                };
                write!(f, " {op} {quantifier} ({subquery})")
            }
            Self::Between {
                expr,
                low,
                high,
                not,
                ..
            } => {
                write_operand(f, expr)?;
                if *not {
                    f.write_str(" NOT")?;
                }
                f.write_str(" BETWEEN ")?;
                write_operand(f, low)?;
                f.write_str(" AND ")?;
                write_operand(f, high)
            }
            Self::In { expr, set, not, .. } => {
                write_operand(f, expr)?;
                if *not {
                    f.write_str(" NOT")?;
                }
                f.write_str(" IN (")?;
                match set {
                    InSet::List(items) => comma_list(f, items)?,
                    InSet::Subquery(query) => write!(f, "{query}")?,
                }
                f.write_str(")")
            }
            Self::Like {
                expr,
                pattern,
                escape,
                op,
                not,
                ..
            } => {
                write_operand(f, expr)?;
                if *not {
                    f.write_str(" NOT")?;
                }
                f.write_str(match op {
                    LikeOp::Like => " LIKE ",
                    LikeOp::Regexp => " REGEXP ",
                })?;
                write_operand(f, pattern)?;
                if let Some(esc) = escape {
                    f.write_str(" ESCAPE ")?;
                    write_operand(f, esc)?;
                }
                Ok(())
            }
            Self::SoundsLike { expr, pattern, .. } => {
                write_operand(f, expr)?;
                f.write_str(" SOUNDS LIKE ")?;
                write_operand(f, pattern)
            }
            Self::Case {
                operand,
                whens,
                else_expr,
                ..
            } => {
                f.write_str("CASE")?;
                if let Some(op) = operand {
                    write!(f, " {op}")?;
                }
                for (cond, then) in whens {
                    write!(f, " WHEN {cond} THEN {then}")?;
                }
                if let Some(el) = else_expr {
                    write!(f, " ELSE {el}")?;
                }
                f.write_str(" END")
            }
            Self::Cast {
                expr, type_name, ..
            } => write!(f, "CAST({expr} AS {type_name})"),
            Self::FunctionCall {
                name,
                args,
                distinct,
                ..
            } => {
                write!(f, "{name}(")?;
                if *distinct {
                    f.write_str("DISTINCT ")?;
                }
                match args {
                    FunctionArgs::Star => f.write_str("*")?,
                    FunctionArgs::List(items) => comma_list(f, items)?,
                }
                f.write_str(")")
            }
            Self::Subquery(query, _) => write!(f, "({query})"),
            Self::Exists { subquery, .. } => write!(f, "EXISTS ({subquery})"),
            Self::Row(items, _) => {
                // A one-element `(x)` would re-parse as plain `x`.
                if items.len() == 1 {
                    f.write_str("ROW(")?;
                } else {
                    f.write_str("(")?;
                }
                comma_list(f, items)?;
                f.write_str(")")
            }
            Self::Collate {
                expr, collation, ..
            } => {
                write_operand(f, expr)?;
                write!(f, " COLLATE {collation}")
            }
        }
    }
}

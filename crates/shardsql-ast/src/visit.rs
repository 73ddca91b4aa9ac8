//! Depth-first AST traversal.
//!
//! [`Visitor`] borrows the tree immutably and hands out `&'ast` references,
//! so collectors can return borrows into the statement. [`VisitorMut`] walks
//! the same shape mutably and additionally reports every [`Span`].
//!
//! Each `visit_*` method defaults to the matching `walk_*` function; an
//! override that still wants the children visited calls `walk_*` itself.
//! Children are visited in the order they appear in canonical SQL.

use crate::{
    Assignment, ColumnRef, Cte, DeleteFrom, DeleteStatement, Expr, FunctionArgs, Ident, InSet,
    IndexHint, InsertSource, InsertStatement, JoinCondition, LimitClause, NamedTable,
    OrderingTerm, QueryTerm, SelectCore, SelectItem, SelectStatement, Span, Statement,
    TableName, TableReference, UpdateStatement,
};

// ---------------------------------------------------------------------------
// Immutable visitor
// ---------------------------------------------------------------------------

pub trait Visitor<'ast> {
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        walk_statement(self, stmt);
    }

    fn visit_select(&mut self, select: &'ast SelectStatement) {
        walk_select(self, select);
    }

    fn visit_select_item(&mut self, item: &'ast SelectItem) {
        walk_select_item(self, item);
    }

    fn visit_table_reference(&mut self, table: &'ast TableReference) {
        walk_table_reference(self, table);
    }

    /// Called for every name in a table position: FROM/JOIN entries, the
    /// INSERT target, DELETE targets and `FOR UPDATE OF` lists.
    fn visit_table_name(&mut self, name: &'ast TableName) {
        walk_table_name(self, name);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_column_ref(&mut self, col: &'ast ColumnRef) {
        walk_column_ref(self, col);
    }

    /// The `[schema.]table` prefix of a column reference or `t.*` wildcard.
    fn visit_qualifier(&mut self, schema: Option<&'ast Ident>, table: &'ast Ident) {
        if let Some(schema) = schema {
            self.visit_ident(schema);
        }
        self.visit_ident(table);
    }

    fn visit_ident(&mut self, _ident: &'ast Ident) {}
}

pub fn walk_statement<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, stmt: &'ast Statement) {
    match stmt {
        Statement::Select(select) => v.visit_select(select),
        Statement::Insert(insert) => walk_insert(v, insert),
        Statement::Update(update) => walk_update(v, update),
        Statement::Delete(delete) => walk_delete(v, delete),
    }
}

fn walk_insert<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, insert: &'ast InsertStatement) {
    v.visit_table_name(&insert.table);
    for ident in insert.partitions.iter().chain(&insert.columns) {
        v.visit_ident(ident);
    }
    match &insert.source {
        InsertSource::Values(rows) => {
            for expr in rows.iter().flatten() {
                v.visit_expr(expr);
            }
        }
        InsertSource::Select(select) => v.visit_select(select),
        InsertSource::Set(assignments) => walk_assignments(v, assignments),
    }
    walk_assignments(v, &insert.on_duplicate);
}

fn walk_update<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, update: &'ast UpdateStatement) {
    for table in &update.tables {
        v.visit_table_reference(table);
    }
    walk_assignments(v, &update.assignments);
    walk_tail(
        v,
        update.where_clause.as_ref(),
        &update.order_by,
        update.limit.as_ref(),
    );
}

fn walk_delete<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, delete: &'ast DeleteStatement) {
    for target in &delete.targets {
        v.visit_table_name(target);
    }
    match &delete.from {
        DeleteFrom::Single(named) => walk_named_table(v, named),
        DeleteFrom::Multi { tables, .. } => {
            for table in tables {
                v.visit_table_reference(table);
            }
        }
    }
    walk_tail(
        v,
        delete.where_clause.as_ref(),
        &delete.order_by,
        delete.limit.as_ref(),
    );
}

fn walk_assignments<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, assignments: &'ast [Assignment]) {
    for assignment in assignments {
        v.visit_column_ref(&assignment.column);
        v.visit_expr(&assignment.value);
    }
}

fn walk_tail<'ast, V: Visitor<'ast> + ?Sized>(
    v: &mut V,
    where_clause: Option<&'ast Expr>,
    order_by: &'ast [OrderingTerm],
    limit: Option<&'ast LimitClause>,
) {
    if let Some(cond) = where_clause {
        v.visit_expr(cond);
    }
    for term in order_by {
        v.visit_expr(&term.expr);
    }
    if let Some(limit) = limit {
        v.visit_expr(&limit.limit);
        if let Some(offset) = &limit.offset {
            v.visit_expr(offset);
        }
    }
}

pub fn walk_select<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, select: &'ast SelectStatement) {
    if let Some(with) = &select.with {
        for cte in &with.ctes {
            walk_cte(v, cte);
        }
    }
    walk_query_term(v, &select.body.first);
    for (_, term) in &select.body.compounds {
        walk_query_term(v, term);
    }
    walk_tail(v, None, &select.order_by, select.limit.as_ref());
    if let Some(locking) = &select.locking {
        for name in &locking.of {
            v.visit_table_name(name);
        }
    }
}

fn walk_cte<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, cte: &'ast Cte) {
    v.visit_ident(&cte.name);
    for col in &cte.columns {
        v.visit_ident(col);
    }
    v.visit_select(&cte.query);
}

fn walk_query_term<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, term: &'ast QueryTerm) {
    match term {
        QueryTerm::Select(core) => walk_select_core(v, core),
        QueryTerm::Nested(select) => v.visit_select(select),
    }
}

fn walk_select_core<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, core: &'ast SelectCore) {
    for item in &core.columns {
        v.visit_select_item(item);
    }
    for table in &core.from {
        v.visit_table_reference(table);
    }
    if let Some(cond) = &core.where_clause {
        v.visit_expr(cond);
    }
    for term in &core.group_by {
        v.visit_expr(&term.expr);
    }
    if let Some(having) = &core.having {
        v.visit_expr(having);
    }
}

pub fn walk_select_item<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, item: &'ast SelectItem) {
    match item {
        SelectItem::Wildcard(_) => {}
        SelectItem::QualifiedWildcard { schema, table, .. } => {
            v.visit_qualifier(schema.as_ref(), table);
        }
        SelectItem::Expr { expr, alias, .. } => {
            v.visit_expr(expr);
            if let Some(alias) = alias {
                v.visit_ident(alias);
            }
        }
    }
}

pub fn walk_table_reference<'ast, V: Visitor<'ast> + ?Sized>(
    v: &mut V,
    table: &'ast TableReference,
) {
    match table {
        TableReference::Named(named) => walk_named_table(v, named),
        TableReference::Derived {
            subquery, alias, ..
        } => {
            v.visit_select(subquery);
            v.visit_ident(alias);
        }
        TableReference::Joined {
            left,
            right,
            condition,
            ..
        } => {
            v.visit_table_reference(left);
            v.visit_table_reference(right);
            match condition {
                Some(JoinCondition::On(expr)) => v.visit_expr(expr),
                Some(JoinCondition::Using(cols)) => {
                    for col in cols {
                        v.visit_ident(col);
                    }
                }
                None => {}
            }
        }
        TableReference::Parenthesized { inner, .. } => {
            for table in inner {
                v.visit_table_reference(table);
            }
        }
    }
}

fn walk_named_table<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, named: &'ast NamedTable) {
    v.visit_table_name(&named.name);
    for partition in &named.partitions {
        v.visit_ident(partition);
    }
    if let Some(alias) = &named.alias {
        v.visit_ident(alias);
    }
    for hint in &named.index_hints {
        for index in &hint.indexes {
            v.visit_ident(index);
        }
    }
}

pub fn walk_table_name<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, name: &'ast TableName) {
    if let Some(schema) = &name.schema {
        v.visit_ident(schema);
    }
    v.visit_ident(&name.table);
}

pub fn walk_column_ref<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, col: &'ast ColumnRef) {
    if let Some(table) = &col.table {
        v.visit_qualifier(col.schema.as_ref(), table);
    }
    v.visit_ident(&col.column);
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(v: &mut V, expr: &'ast Expr) {
    match expr {
        Expr::Literal(..) | Expr::Placeholder { .. } | Expr::Default(_) => {}
        Expr::Column(col) => v.visit_column_ref(col),
        Expr::BinaryOp { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        Expr::UnaryOp { expr, .. } | Expr::Is { expr, .. } | Expr::Cast { expr, .. } => {
            v.visit_expr(expr);
        }
        Expr::QuantifiedComparison { left, subquery, .. } => {
            v.visit_expr(left);
            v.visit_select(subquery);
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            v.visit_expr(expr);
            v.visit_expr(low);
            v.visit_expr(high);
        }
        Expr::In { expr, set, .. } => {
            v.visit_expr(expr);
            match set {
                InSet::List(items) => {
                    for item in items {
                        v.visit_expr(item);
                    }
                }
                InSet::Subquery(select) => v.visit_select(select),
            }
        }
        Expr::Like {
            expr,
            pattern,
            escape,
            ..
        } => {
            v.visit_expr(expr);
            v.visit_expr(pattern);
            if let Some(escape) = escape {
                v.visit_expr(escape);
            }
        }
        Expr::SoundsLike { expr, pattern, .. } => {
            v.visit_expr(expr);
            v.visit_expr(pattern);
        }
        Expr::Case {
            operand,
            whens,
            else_expr,
            ..
        } => {
            if let Some(operand) = operand {
                v.visit_expr(operand);
            }
            for (cond, then) in whens {
                v.visit_expr(cond);
                v.visit_expr(then);
            }
            if let Some(else_expr) = else_expr {
                v.visit_expr(else_expr);
            }
        }
        Expr::FunctionCall { name, args, .. } => {
            v.visit_ident(name);
            if let FunctionArgs::List(items) = args {
                for item in items {
                    v.visit_expr(item);
                }
            }
        }
        Expr::Subquery(select, _) | Expr::Exists {
            subquery: select, ..
        } => v.visit_select(select),
        Expr::Row(items, _) => {
            for item in items {
                v.visit_expr(item);
            }
        }
        Expr::Collate {
            expr, collation, ..
        } => {
            v.visit_expr(expr);
            v.visit_ident(collation);
        }
    }
}

// ---------------------------------------------------------------------------
// Mutable visitor
// ---------------------------------------------------------------------------

/// Mutable counterpart of [`Visitor`]. Every span in the tree passes through
/// [`VisitorMut::visit_span`], including the spans of identifiers.
pub trait VisitorMut {
    fn visit_statement_mut(&mut self, stmt: &mut Statement) {
        walk_statement_mut(self, stmt);
    }

    fn visit_select_mut(&mut self, select: &mut SelectStatement) {
        walk_select_mut(self, select);
    }

    fn visit_table_reference_mut(&mut self, table: &mut TableReference) {
        walk_table_reference_mut(self, table);
    }

    fn visit_table_name_mut(&mut self, name: &mut TableName) {
        self.visit_span(&mut name.span);
        if let Some(schema) = &mut name.schema {
            self.visit_ident_mut(schema);
        }
        self.visit_ident_mut(&mut name.table);
    }

    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }

    fn visit_column_ref_mut(&mut self, col: &mut ColumnRef) {
        self.visit_span(&mut col.span);
        if let Some(schema) = &mut col.schema {
            self.visit_ident_mut(schema);
        }
        if let Some(table) = &mut col.table {
            self.visit_ident_mut(table);
        }
        self.visit_ident_mut(&mut col.column);
    }

    fn visit_ident_mut(&mut self, ident: &mut Ident) {
        self.visit_span(&mut ident.span);
    }

    fn visit_span(&mut self, _span: &mut Span) {}
}

fn walk_idents_mut<V: VisitorMut + ?Sized>(v: &mut V, idents: &mut [Ident]) {
    for ident in idents {
        v.visit_ident_mut(ident);
    }
}

pub fn walk_statement_mut<V: VisitorMut + ?Sized>(v: &mut V, stmt: &mut Statement) {
    match stmt {
        Statement::Select(select) => v.visit_select_mut(select),
        Statement::Insert(insert) => {
            v.visit_span(&mut insert.span);
            v.visit_table_name_mut(&mut insert.table);
            walk_idents_mut(v, &mut insert.partitions);
            walk_idents_mut(v, &mut insert.columns);
            match &mut insert.source {
                InsertSource::Values(rows) => {
                    for expr in rows.iter_mut().flatten() {
                        v.visit_expr_mut(expr);
                    }
                }
                InsertSource::Select(select) => v.visit_select_mut(select),
                InsertSource::Set(assignments) => walk_assignments_mut(v, assignments),
            }
            walk_assignments_mut(v, &mut insert.on_duplicate);
        }
        Statement::Update(update) => {
            v.visit_span(&mut update.span);
            for table in &mut update.tables {
                v.visit_table_reference_mut(table);
            }
            walk_assignments_mut(v, &mut update.assignments);
            walk_tail_mut(
                v,
                update.where_clause.as_mut(),
                &mut update.order_by,
                update.limit.as_mut(),
            );
        }
        Statement::Delete(delete) => {
            v.visit_span(&mut delete.span);
            for target in &mut delete.targets {
                v.visit_table_name_mut(target);
            }
            match &mut delete.from {
                DeleteFrom::Single(named) => walk_named_table_mut(v, named),
                DeleteFrom::Multi { tables, .. } => {
                    for table in tables {
                        v.visit_table_reference_mut(table);
                    }
                }
            }
            walk_tail_mut(
                v,
                delete.where_clause.as_mut(),
                &mut delete.order_by,
                delete.limit.as_mut(),
            );
        }
    }
}

fn walk_assignments_mut<V: VisitorMut + ?Sized>(v: &mut V, assignments: &mut [Assignment]) {
    for assignment in assignments {
        v.visit_span(&mut assignment.span);
        v.visit_column_ref_mut(&mut assignment.column);
        v.visit_expr_mut(&mut assignment.value);
    }
}

fn walk_ordering_mut<V: VisitorMut + ?Sized>(v: &mut V, terms: &mut [OrderingTerm]) {
    for term in terms {
        v.visit_span(&mut term.span);
        v.visit_expr_mut(&mut term.expr);
    }
}

fn walk_tail_mut<V: VisitorMut + ?Sized>(
    v: &mut V,
    where_clause: Option<&mut Expr>,
    order_by: &mut [OrderingTerm],
    limit: Option<&mut LimitClause>,
) {
    if let Some(cond) = where_clause {
        v.visit_expr_mut(cond);
    }
    walk_ordering_mut(v, order_by);
    if let Some(limit) = limit {
        v.visit_span(&mut limit.span);
        v.visit_expr_mut(&mut limit.limit);
        if let Some(offset) = &mut limit.offset {
            v.visit_expr_mut(offset);
        }
    }
}

pub fn walk_select_mut<V: VisitorMut + ?Sized>(v: &mut V, select: &mut SelectStatement) {
    v.visit_span(&mut select.span);
    if let Some(with) = &mut select.with {
        v.visit_span(&mut with.span);
        for cte in &mut with.ctes {
            v.visit_span(&mut cte.span);
            v.visit_ident_mut(&mut cte.name);
            walk_idents_mut(v, &mut cte.columns);
            v.visit_select_mut(&mut cte.query);
        }
    }
    v.visit_span(&mut select.body.span);
    walk_query_term_mut(v, &mut select.body.first);
    for (_, term) in &mut select.body.compounds {
        walk_query_term_mut(v, term);
    }
    walk_tail_mut(v, None, &mut select.order_by, select.limit.as_mut());
    if let Some(locking) = &mut select.locking {
        v.visit_span(&mut locking.span);
        for name in &mut locking.of {
            v.visit_table_name_mut(name);
        }
    }
}

fn walk_query_term_mut<V: VisitorMut + ?Sized>(v: &mut V, term: &mut QueryTerm) {
    match term {
        QueryTerm::Select(core) => walk_select_core_mut(v, core),
        QueryTerm::Nested(select) => v.visit_select_mut(select),
    }
}

fn walk_select_core_mut<V: VisitorMut + ?Sized>(v: &mut V, core: &mut SelectCore) {
    v.visit_span(&mut core.span);
    for item in &mut core.columns {
        match item {
            SelectItem::Wildcard(span) => v.visit_span(span),
            SelectItem::QualifiedWildcard {
                schema,
                table,
                span,
            } => {
                v.visit_span(span);
                if let Some(schema) = schema {
                    v.visit_ident_mut(schema);
                }
                v.visit_ident_mut(table);
            }
            SelectItem::Expr { expr, alias, span } => {
                v.visit_span(span);
                v.visit_expr_mut(expr);
                if let Some(alias) = alias {
                    v.visit_ident_mut(alias);
                }
            }
        }
    }
    for table in &mut core.from {
        v.visit_table_reference_mut(table);
    }
    if let Some(cond) = &mut core.where_clause {
        v.visit_expr_mut(cond);
    }
    walk_ordering_mut(v, &mut core.group_by);
    if let Some(having) = &mut core.having {
        v.visit_expr_mut(having);
    }
}

pub fn walk_table_reference_mut<V: VisitorMut + ?Sized>(v: &mut V, table: &mut TableReference) {
    match table {
        TableReference::Named(named) => walk_named_table_mut(v, named),
        TableReference::Derived {
            subquery,
            alias,
            span,
        } => {
            v.visit_span(span);
            v.visit_select_mut(subquery);
            v.visit_ident_mut(alias);
        }
        TableReference::Joined {
            left,
            right,
            condition,
            span,
            ..
        } => {
            v.visit_span(span);
            v.visit_table_reference_mut(left);
            v.visit_table_reference_mut(right);
            match condition {
                Some(JoinCondition::On(expr)) => v.visit_expr_mut(expr),
                Some(JoinCondition::Using(cols)) => walk_idents_mut(v, cols),
                None => {}
            }
        }
        TableReference::Parenthesized { inner, span } => {
            v.visit_span(span);
            for table in inner {
                v.visit_table_reference_mut(table);
            }
        }
    }
}

fn walk_named_table_mut<V: VisitorMut + ?Sized>(v: &mut V, named: &mut NamedTable) {
    v.visit_span(&mut named.span);
    v.visit_table_name_mut(&mut named.name);
    walk_idents_mut(v, &mut named.partitions);
    if let Some(alias) = &mut named.alias {
        v.visit_ident_mut(alias);
    }
    for hint in &mut named.index_hints {
        walk_index_hint_mut(v, hint);
    }
}

fn walk_index_hint_mut<V: VisitorMut + ?Sized>(v: &mut V, hint: &mut IndexHint) {
    v.visit_span(&mut hint.span);
    walk_idents_mut(v, &mut hint.indexes);
}

pub fn walk_expr_mut<V: VisitorMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match expr {
        Expr::Literal(_, span) | Expr::Default(span) | Expr::Placeholder { span, .. } => {
            v.visit_span(span);
        }
        Expr::Column(col) => v.visit_column_ref_mut(col),
        Expr::BinaryOp {
            left, right, span, ..
        } => {
            v.visit_span(span);
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        Expr::UnaryOp { expr, span, .. }
        | Expr::Is { expr, span, .. }
        | Expr::Cast { expr, span, .. } => {
            v.visit_span(span);
            v.visit_expr_mut(expr);
        }
        Expr::QuantifiedComparison {
            left,
            subquery,
            span,
            ..
        } => {
            v.visit_span(span);
            v.visit_expr_mut(left);
            v.visit_select_mut(subquery);
        }
        Expr::Between {
            expr,
            low,
            high,
            span,
            ..
        } => {
            v.visit_span(span);
            v.visit_expr_mut(expr);
            v.visit_expr_mut(low);
            v.visit_expr_mut(high);
        }
        Expr::In {
            expr, set, span, ..
        } => {
            v.visit_span(span);
            v.visit_expr_mut(expr);
            match set {
                InSet::List(items) => {
                    for item in items {
                        v.visit_expr_mut(item);
                    }
                }
                InSet::Subquery(select) => v.visit_select_mut(select),
            }
        }
        Expr::Like {
            expr,
            pattern,
            escape,
            span,
            ..
        } => {
            v.visit_span(span);
            v.visit_expr_mut(expr);
            v.visit_expr_mut(pattern);
            if let Some(escape) = escape {
                v.visit_expr_mut(escape);
            }
        }
        Expr::SoundsLike {
            expr,
            pattern,
            span,
        } => {
            v.visit_span(span);
            v.visit_expr_mut(expr);
            v.visit_expr_mut(pattern);
        }
        Expr::Case {
            operand,
            whens,
            else_expr,
            span,
        } => {
            v.visit_span(span);
            if let Some(operand) = operand {
                v.visit_expr_mut(operand);
            }
            for (cond, then) in whens {
                v.visit_expr_mut(cond);
                v.visit_expr_mut(then);
            }
            if let Some(else_expr) = else_expr {
                v.visit_expr_mut(else_expr);
            }
        }
        Expr::FunctionCall {
            name, args, span, ..
        } => {
            v.visit_span(span);
            v.visit_ident_mut(name);
            if let FunctionArgs::List(items) = args {
                for item in items {
                    v.visit_expr_mut(item);
                }
            }
        }
        Expr::Subquery(select, span)
        | Expr::Exists {
            subquery: select,
            span,
        } => {
            v.visit_span(span);
            v.visit_select_mut(select);
        }
        Expr::Row(items, span) => {
            v.visit_span(span);
            for item in items {
                v.visit_expr_mut(item);
            }
        }
        Expr::Collate {
            expr,
            collation,
            span,
        } => {
            v.visit_span(span);
            v.visit_expr_mut(expr);
            v.visit_ident_mut(collation);
        }
    }
}

// ---------------------------------------------------------------------------
// Span erasure
// ---------------------------------------------------------------------------

struct SpanEraser;

impl VisitorMut for SpanEraser {
    fn visit_span(&mut self, span: &mut Span) {
        *span = Span::ZERO;
    }
}

impl Statement {
    /// Reset every span in the tree to [`Span::ZERO`], so two trees parsed
    /// from differently formatted SQL can be compared structurally.
    pub fn erase_spans(&mut self) {
        SpanEraser.visit_statement_mut(self);
    }
}

impl SelectStatement {
    pub fn erase_spans(&mut self) {
        SpanEraser.visit_select_mut(self);
    }
}

impl Expr {
    pub fn erase_spans(&mut self) {
        SpanEraser.visit_expr_mut(self);
    }
}

//! Span-based source rewriting.
//!
//! A sharding router rewrites logical table names into physical ones
//! (`t_order` to `t_order_07`) without re-rendering the statement: it finds
//! the identifier spans in the AST and splices replacement text into the
//! original SQL. Everything outside the spliced ranges (comments, spacing,
//! keyword case) is left byte-for-byte intact.

use std::collections::HashSet;

use thiserror::Error;

use crate::visit::{Visitor, walk_table_reference};
use crate::{ColumnRef, Ident, Span, Statement, TableName, TableReference};

/// Replace the bytes covered by `span` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub span: Span,
    pub replacement: String,
}

impl Splice {
    #[must_use]
    pub fn new(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("splice {span} lies outside the {len}-byte source")]
    OutOfBounds { span: Span, len: usize },

    #[error("splice {span} does not fall on character boundaries")]
    NotCharBoundary { span: Span },

    #[error("splices {first} and {second} overlap")]
    Overlap { first: Span, second: Span },
}

/// Apply non-overlapping splices to `source`. The splices may be given in
/// any order.
pub fn apply_splices(source: &str, splices: &[Splice]) -> Result<String, SpliceError> {
    let mut ordered: Vec<&Splice> = splices.iter().collect();
    ordered.sort_by_key(|s| (s.span.start, s.span.end));

    let mut prev: Option<Span> = None;
    for splice in &ordered {
        let span = splice.span;
        let (start, end) = (span.start as usize, span.end as usize);
        if start > end || end > source.len() {
            return Err(SpliceError::OutOfBounds {
                span,
                len: source.len(),
            });
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(SpliceError::NotCharBoundary { span });
        }
        if let Some(first) = prev.filter(|p| p.end > span.start) {
            return Err(SpliceError::Overlap {
                first,
                second: span,
            });
        }
        prev = Some(span);
    }

    let extra: usize = ordered.iter().map(|s| s.replacement.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0usize;
    for splice in ordered {
        out.push_str(&source[cursor..splice.span.start as usize]);
        out.push_str(&splice.replacement);
        cursor = splice.span.end as usize;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Collectors
// ---------------------------------------------------------------------------

#[derive(Default)]
struct NameCollector<'ast> {
    tables: Vec<&'ast TableName>,
    columns: Vec<&'ast ColumnRef>,
    qualifiers: Vec<(Option<&'ast Ident>, &'ast Ident)>,
    aliases: Vec<&'ast Ident>,
}

impl<'ast> Visitor<'ast> for NameCollector<'ast> {
    fn visit_table_reference(&mut self, table: &'ast TableReference) {
        match table {
            TableReference::Named(named) => self.aliases.extend(named.alias.as_ref()),
            TableReference::Derived { alias, .. } => self.aliases.push(alias),
            TableReference::Joined { .. } | TableReference::Parenthesized { .. } => {}
        }
        walk_table_reference(self, table);
    }

    fn visit_table_name(&mut self, name: &'ast TableName) {
        self.tables.push(name);
    }

    fn visit_column_ref(&mut self, col: &'ast ColumnRef) {
        self.columns.push(col);
        crate::visit::walk_column_ref(self, col);
    }

    fn visit_qualifier(&mut self, schema: Option<&'ast Ident>, table: &'ast Ident) {
        self.qualifiers.push((schema, table));
    }
}

fn collect(stmt: &Statement) -> NameCollector<'_> {
    let mut collector = NameCollector::default();
    collector.visit_statement(stmt);
    collector
}

/// Every table name in a table position, in source order, including those
/// inside subqueries and CTE bodies.
#[must_use]
pub fn table_names(stmt: &Statement) -> Vec<&TableName> {
    collect(stmt).tables
}

/// Every column reference in the statement, in source order.
#[must_use]
pub fn column_refs(stmt: &Statement) -> Vec<&ColumnRef> {
    collect(stmt).columns
}

// ---------------------------------------------------------------------------
// Table renaming
// ---------------------------------------------------------------------------

/// Rewrite table names in `source`, which must be the text `stmt` was parsed
/// from.
///
/// `rename` is called once per table name; returning `Some(new)` replaces
/// the table identifier (the schema qualifier, if any, is kept). Column and
/// wildcard qualifiers naming a renamed table are rewritten too, unless the
/// qualifier is a table alias. The replacement keeps the original quote
/// style and falls back to backticks when the new name needs quoting.
pub fn rename_tables<F>(source: &str, stmt: &Statement, mut rename: F) -> Result<String, SpliceError>
where
    F: FnMut(&TableName) -> Option<String>,
{
    let names = collect(stmt);
    let aliases: HashSet<String> = names
        .aliases
        .iter()
        .map(|a| a.value.to_ascii_lowercase())
        .collect();

    let mut splices = Vec::new();
    let mut renamed: Vec<(&TableName, String)> = Vec::new();
    for &table in &names.tables {
        if let Some(new_name) = rename(table) {
            splices.push(Splice::new(
                table.table.span,
                requote(&table.table, &new_name),
            ));
            renamed.push((table, new_name));
        }
    }

    let mut seen = HashSet::new();
    for (schema, qualifier) in &names.qualifiers {
        if aliases.contains(&qualifier.value.to_ascii_lowercase()) {
            continue;
        }
        let target = renamed.iter().find(|(table, _)| {
            table.table.value == qualifier.value
                && schema.is_none_or(|s| table.schema.as_ref().is_some_and(|ts| ts.value == s.value))
        });
        if let Some((_, new_name)) = target {
            if seen.insert(qualifier.span.start) {
                splices.push(Splice::new(qualifier.span, requote(qualifier, new_name)));
            }
        }
    }

    apply_splices(source, &splices)
}

fn requote(original: &Ident, value: &str) -> String {
    Ident {
        value: value.to_owned(),
        quote: original.quote,
        span: original.span,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Expr, NamedTable, QueryTerm, SelectBody, SelectCore, SelectItem, SelectModifiers,
        SelectStatement,
    };

    fn sp(start: u32, end: u32) -> Span {
        Span::new(start, end, 1, start + 1)
    }

    fn ident(value: &str, start: u32) -> Ident {
        Ident::new(value).with_span(sp(start, start + value.len() as u32))
    }

    /// Hand-built tree for `SELECT t_order.id FROM t_order o2 WHERE o2.x`
    /// style statements, with spans pointing at the given offsets.
    fn select(items: Vec<SelectItem>, from: NamedTable, cond: Option<Expr>) -> Statement {
        Statement::Select(SelectStatement {
            with: None,
            body: SelectBody {
                first: QueryTerm::Select(Box::new(SelectCore {
                    modifiers: SelectModifiers::default(),
                    columns: items,
                    from: vec![TableReference::Named(from)],
                    where_clause: cond,
                    group_by: Vec::new(),
                    with_rollup: false,
                    having: None,
                    span: Span::ZERO,
                })),
                compounds: Vec::new(),
                span: Span::ZERO,
            },
            order_by: Vec::new(),
            limit: None,
            locking: None,
            span: Span::ZERO,
        })
    }

    fn column(table: Option<Ident>, column: Ident) -> Expr {
        let span = table
            .as_ref()
            .map_or(column.span, |t| t.span.merge(column.span));
        Expr::Column(ColumnRef {
            schema: None,
            table,
            column,
            span,
        })
    }

    #[test]
    fn test_apply_splices_any_order() {
        let src = "SELECT a FROM t WHERE b";
        let out = apply_splices(
            src,
            &[Splice::new(sp(22, 23), "bb"), Splice::new(sp(14, 15), "t_07")],
        )
        .expect("splice");
        assert_eq!(out, "SELECT a FROM t_07 WHERE bb");
    }

    #[test]
    fn test_apply_splices_rejects_overlap() {
        let err = apply_splices("abcdef", &[Splice::new(sp(0, 3), "x"), Splice::new(sp(2, 4), "y")])
            .unwrap_err();
        assert_eq!(
            err,
            SpliceError::Overlap {
                first: sp(0, 3),
                second: sp(2, 4)
            }
        );
    }

    #[test]
    fn test_apply_splices_rejects_out_of_bounds_and_split_chars() {
        let err = apply_splices("abc", &[Splice::new(sp(2, 9), "x")]).unwrap_err();
        assert!(matches!(err, SpliceError::OutOfBounds { len: 3, .. }));

        let err = apply_splices("é", &[Splice::new(sp(1, 2), "x")]).unwrap_err();
        assert!(matches!(err, SpliceError::NotCharBoundary { .. }));
    }

    #[test]
    fn test_adjacent_splices_are_not_overlapping() {
        let out = apply_splices("ab", &[Splice::new(sp(0, 1), "x"), Splice::new(sp(1, 2), "y")])
            .expect("splice");
        assert_eq!(out, "xy");
    }

    #[test]
    fn test_rename_tables_rewrites_name_and_qualifiers() {
        //         0         1         2         3
        //         0123456789012345678901234567890123456789
        let src = "SELECT t_order.id FROM t_order WHERE t_order.x";
        let items = vec![SelectItem::Expr {
            expr: column(Some(ident("t_order", 7)), ident("id", 15)),
            alias: None,
            span: sp(7, 17),
        }];
        let from = NamedTable {
            name: TableName {
                schema: None,
                table: ident("t_order", 23),
                span: sp(23, 30),
            },
            partitions: Vec::new(),
            alias: None,
            index_hints: Vec::new(),
            span: sp(23, 30),
        };
        let cond = column(Some(ident("t_order", 37)), ident("x", 45));
        let stmt = select(items, from, Some(cond));

        let out = rename_tables(src, &stmt, |t| (t.table.value == "t_order").then(|| "t_order_07".to_owned()))
            .expect("rename");
        assert_eq!(out, "SELECT t_order_07.id FROM t_order_07 WHERE t_order_07.x");
        assert_eq!(column_refs(&stmt).len(), 2);
        assert_eq!(table_names(&stmt).len(), 1);
    }

    #[test]
    fn test_rename_tables_skips_alias_qualifiers() {
        //         0         1         2
        //         0123456789012345678901234567
        let src = "SELECT o.id FROM t_order o";
        let items = vec![SelectItem::Expr {
            expr: column(Some(ident("o", 7)), ident("id", 9)),
            alias: None,
            span: sp(7, 11),
        }];
        let from = NamedTable {
            name: TableName {
                schema: None,
                table: ident("t_order", 17),
                span: sp(17, 24),
            },
            partitions: Vec::new(),
            alias: Some(ident("o", 25)),
            index_hints: Vec::new(),
            span: sp(17, 26),
        };
        let stmt = select(items, from, None);
        let out = rename_tables(src, &stmt, |_| Some("t_order_1".to_owned())).expect("rename");
        assert_eq!(out, "SELECT o.id FROM t_order_1 o");
    }

    #[test]
    fn test_requote_keeps_backticks() {
        let original = Ident::backticked("t_order");
        assert_eq!(requote(&original, "t_order_3"), "`t_order_3`");
        assert_eq!(requote(&Ident::new("t"), "t 3"), "`t 3`");
    }
}

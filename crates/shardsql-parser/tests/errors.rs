//! Error taxonomy: which failure surfaces, and where it points.

use std::thread;

use shardsql_error::{LexErrorKind, SqlError};
use shardsql_parser::{ParserConfig, parse_expr, parse_statement, parse_statement_with};

fn parse_err(sql: &str) -> SqlError {
    match parse_statement(sql) {
        Ok(parsed) => unreachable!("{sql:?} parsed as {}", parsed.statement),
        Err(err) => err,
    }
}

/// Run `f` on a thread with room for deep recursion in debug builds.
fn with_big_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    thread::Builder::new()
        .stack_size(32 * 1024 * 1024)
        .spawn(f)
        .expect("spawn")
        .join()
        .expect("join")
}

#[test]
fn test_missing_select_list_is_syntax_error() {
    match parse_err("SELECT FROM") {
        SqlError::Syntax(e) => {
            assert_eq!(e.found, "FROM");
            assert_eq!(e.position.offset, 7);
            assert_eq!((e.position.line, e.position.column), (1, 8));
        }
        other => unreachable!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn test_unterminated_string_is_lex_error() {
    match parse_err("SELECT 'abc") {
        SqlError::Lex(e) => {
            assert_eq!(e.kind, LexErrorKind::UnterminatedString { quote: '\'' });
            assert_eq!(e.position.offset, 7);
        }
        other => unreachable!("expected lexical error, got {other:?}"),
    }
}

#[test]
fn test_unexpected_character_reports_the_character() {
    match parse_err("SELECT a FROM t WHERE a = \\") {
        SqlError::Lex(e) => {
            assert_eq!(e.unexpected_char(), Some('\\'));
            assert_eq!(e.position.offset, 26);
        }
        other => unreachable!("expected lexical error, got {other:?}"),
    }
}

#[test]
fn test_deep_parentheses_hit_recursion_limit() {
    let err = with_big_stack(|| {
        let depth = 10_000;
        let sql = format!("SELECT {}1{}", "(".repeat(depth), ")".repeat(depth));
        parse_statement(&sql).map(|p| p.statement.to_string())
    });
    match err {
        Err(SqlError::RecursionLimitExceeded { limit, position }) => {
            assert_eq!(limit, 64);
            assert!(position.offset > 7);
        }
        other => unreachable!("expected recursion limit, got {other:?}"),
    }
}

#[test]
fn test_deep_expression_hits_recursion_limit() {
    let err = with_big_stack(|| parse_expr(&format!("{}x", "-".repeat(10_000))).map(|_| ()));
    assert!(matches!(err, Err(SqlError::RecursionLimitExceeded { .. })));

    let err = with_big_stack(|| parse_expr(&format!("{}1", "NOT ".repeat(10_000))).map(|_| ()));
    assert!(matches!(err, Err(SqlError::RecursionLimitExceeded { .. })));
}

#[test]
fn test_deep_subqueries_hit_recursion_limit() {
    let err = with_big_stack(|| {
        let depth = 500;
        let sql = format!(
            "SELECT * FROM t WHERE a IN {}(SELECT 1){}",
            "(SELECT a FROM t WHERE a IN ".repeat(depth),
            ")".repeat(depth)
        );
        parse_statement(&sql).map(|_| ())
    });
    assert!(matches!(err, Err(SqlError::RecursionLimitExceeded { .. })));
}

#[test]
fn test_depth_limit_is_configurable() {
    let sql = "SELECT ((((((1))))))";
    assert!(parse_statement(sql).is_ok());

    let tight = ParserConfig::default().with_max_depth(4);
    match parse_statement_with(sql, &tight) {
        Err(SqlError::RecursionLimitExceeded { limit, .. }) => assert_eq!(limit, 4),
        other => unreachable!("expected recursion limit, got {other:?}"),
    }
}

#[test]
fn test_trailing_tokens_are_rejected() {
    match parse_err("DELETE FROM t WHERE id = 5 5") {
        SqlError::Syntax(e) => {
            assert_eq!(e.position.offset, 27);
            assert!(e.expected.contains(&"end of input".to_owned()));
        }
        other => unreachable!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn test_error_position_tracks_lines() {
    let sql = "SELECT a,\n       b\nFROM t\nWHERE";
    match parse_err(sql) {
        SqlError::Syntax(e) => {
            assert_eq!(e.found, "end of input");
            assert_eq!(e.position.line, 4);
            assert_eq!(e.position.column, 6);
        }
        other => unreachable!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn test_render_snippet_points_at_offending_token() {
    let sql = "UPDATE t\nSET = 1";
    let err = parse_err(sql);
    let snippet = err.render_snippet(sql);
    let lines: Vec<&str> = snippet.lines().collect();
    assert!(lines[0].starts_with("syntax error at 2:5"), "{snippet}");
    assert_eq!(lines[2], "2 | SET = 1");
    assert_eq!(lines[3], "  |     ^");
}

#[test]
fn test_errors_serialize_for_callers() {
    let err = parse_err("SELECT 'abc");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["type"], "lex");

    let err = parse_err("INSERT t VALUES");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["type"], "syntax");
    assert!(json["expected"].is_array());
}

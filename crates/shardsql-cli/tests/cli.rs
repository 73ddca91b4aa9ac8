use std::ffi::OsString;
use std::io::Write as _;

use shardsql_cli::run_cli;

struct Outcome {
    code: i32,
    stdout: String,
    stderr: String,
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Outcome {
    let argv: Vec<OsString> = std::iter::once("shardsql")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    let mut input = stdin.as_bytes();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let code = run_cli(argv, &mut input, &mut stdout, &mut stderr);
    Outcome {
        code,
        stdout: String::from_utf8(stdout).expect("utf-8 stdout"),
        stderr: String::from_utf8(stderr).expect("utf-8 stderr"),
    }
}

fn run(args: &[&str]) -> Outcome {
    run_with_stdin(args, "")
}

#[test]
fn test_canonical_sql_output() {
    let out = run(&["select a,b from t where a=1 limit 2,3"]);
    assert_eq!(out.code, 0, "{}", out.stderr);
    insta::assert_snapshot!(out.stdout.trim_end(), @"SELECT a, b FROM t WHERE a = 1 LIMIT 3 OFFSET 2");
}

#[test]
fn test_reads_statement_from_stdin() {
    let out = run_with_stdin(&[], "DELETE FROM t WHERE id = 5;\n");
    assert_eq!(out.code, 0, "{}", out.stderr);
    assert_eq!(out.stdout.trim_end(), "DELETE FROM t WHERE id = 5");
}

#[test]
fn test_reads_statement_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "UPDATE t SET a = a + 1\nWHERE id IN (SELECT id FROM u)").expect("write");
    let path = file.path().to_string_lossy().into_owned();
    let out = run(&["--file", &path]);
    assert_eq!(out.code, 0, "{}", out.stderr);
    assert_eq!(
        out.stdout.trim_end(),
        "UPDATE t SET a = a + 1 WHERE id IN (SELECT id FROM u)"
    );
}

#[test]
fn test_tables_output_is_deduplicated() {
    let out = run(&[
        "--format",
        "tables",
        "DELETE t1 FROM shop.t1 JOIN t2 ON t1.id = t2.id WHERE t2.x IN (SELECT x FROM t3)",
    ]);
    assert_eq!(out.code, 0, "{}", out.stderr);
    insta::assert_snapshot!(out.stdout.trim_end(), @r"
    t1
    shop.t1
    t2
    t3
    ");
}

#[test]
fn test_tokens_output_lists_spans() {
    let out = run(&["-f", "tokens", "SELECT a\nFROM t"]);
    assert_eq!(out.code, 0, "{}", out.stderr);
    let lines: Vec<&str> = out.stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "1:1\t0..6\tSELECT");
    assert_eq!(lines[3], "2:6\t14..15\tt");
}

#[test]
fn test_json_output_carries_statement_and_tokens() {
    let out = run(&["--format", "json", "INSERT INTO t (a, b) VALUES (1, 2)"]);
    assert_eq!(out.code, 0, "{}", out.stderr);
    let value: serde_json::Value = serde_json::from_str(&out.stdout).expect("json");
    assert_eq!(value["statement"]["statement"], "insert", "{value}");
    assert_eq!(value["statement"]["table"]["table"]["value"], "t");
    assert_eq!(value["tokens"].as_array().map(Vec::len), Some(14));
}

#[test]
fn test_json_errors_go_to_stdout() {
    let out = run(&["--format", "json", "SELECT FROM"]);
    assert_eq!(out.code, 1);
    let value: serde_json::Value = serde_json::from_str(&out.stdout).expect("json");
    assert_eq!(value["error"]["type"], "syntax");
    assert_eq!(value["error"]["found"], "FROM");
}

#[test]
fn test_parse_error_prints_snippet() {
    let out = run(&["SELECT 'abc"]);
    assert_eq!(out.code, 1);
    assert!(out.stdout.is_empty());
    assert!(out.stderr.starts_with("lexical error at 1:8"), "{}", out.stderr);
    assert!(out.stderr.contains("1 | SELECT 'abc"));
}

#[test]
fn test_rename_rewrites_original_text() {
    let out = run(&[
        "--rename",
        "t_order=t_order_03",
        "--rename",
        "shop.t_user=t_user_01",
        "select o.id  from t_order o join shop.t_user on t_order.uid = t_user.id",
    ]);
    assert_eq!(out.code, 0, "{}", out.stderr);
    assert_eq!(
        out.stdout.trim_end(),
        "select o.id  from t_order_03 o join shop.t_user_01 on t_order_03.uid = t_user_01.id"
    );
}

#[test]
fn test_config_file_and_flag_override() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[parser]\nansi_quotes = true\nmax_depth = 3").expect("write");
    let path = file.path().to_string_lossy().into_owned();

    let out = run(&["--config", &path, r#"SELECT "col" FROM t"#]);
    assert_eq!(out.code, 0, "{}", out.stderr);
    assert_eq!(out.stdout.trim_end(), r#"SELECT "col" FROM t"#);

    let out = run(&["--config", &path, "SELECT ((((1))))"]);
    assert_eq!(out.code, 1);
    assert!(out.stderr.contains("too deeply nested"), "{}", out.stderr);

    let out = run(&["--config", &path, "--max-depth", "64", "SELECT ((((1))))"]);
    assert_eq!(out.code, 0, "{}", out.stderr);
}

#[test]
fn test_bad_config_is_usage_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[parser]\nmax_depth = \"deep\"").expect("write");
    let path = file.path().to_string_lossy().into_owned();
    let out = run(&["--config", &path, "SELECT 1"]);
    assert_eq!(out.code, 2);
    assert!(out.stderr.starts_with("error: invalid config"), "{}", out.stderr);
}

#[test]
fn test_usage_errors() {
    let out = run(&["--format", "xml", "SELECT 1"]);
    assert_eq!(out.code, 2);
    assert!(out.stderr.contains("unknown format"));

    let out = run(&["--file", "/definitely/not/here.sql"]);
    assert_eq!(out.code, 1);
    assert!(out.stderr.contains("cannot read"));
}

#[test]
fn test_help() {
    let out = run(&["--help"]);
    assert_eq!(out.code, 0);
    assert!(out.stdout.starts_with("shardsql - parse a MySQL DML statement"));
}

#[test]
fn test_stats_are_json_on_stderr() {
    let out = run(&["--stats", "SELECT 1"]);
    assert_eq!(out.code, 0);
    let value: serde_json::Value =
        serde_json::from_str(out.stderr.trim_end()).expect("stats json");
    assert!(value["parse"]["statements"].as_u64().is_some_and(|n| n >= 1));
    assert!(value["tokenize"]["calls"].is_u64());
}

//! `shardsql`: parse one MySQL DML statement and print it back as canonical
//! SQL, JSON, a debug tree, its table list or its token stream. With
//! `--rename` the original text is rewritten in place instead.
//!
//! Exit codes: 0 on success, 1 when the input fails to parse or cannot be
//! read, 2 on a usage error.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shardsql_ast::TableName;
use shardsql_ast::rewrite::{SpliceError, rename_tables, table_names};
use shardsql_error::SqlError;
use shardsql_parser::{
    ParseMetricsSnapshot, ParserConfig, TokenizeMetricsSnapshot, parse_metrics_snapshot,
    parse_statement_with, tokenize_metrics_snapshot,
};

/// How a parsed statement is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Sql,
    Json,
    Debug,
    Tables,
    Tokens,
}

impl OutputFormat {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg.to_ascii_lowercase().as_str() {
            "sql" => Some(Self::Sql),
            "json" => Some(Self::Json),
            "debug" => Some(Self::Debug),
            "tables" => Some(Self::Tables),
            "tokens" => Some(Self::Tokens),
            _ => None,
        }
    }
}

/// Contents of a `--config` file.
///
/// ```toml
/// [parser]
/// ansi_quotes = true
/// max_depth = 128
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub parser: ParserConfig,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
        tracing::debug!(
            target: "shardsql.cli",
            path = %path.display(),
            max_depth = config.parser.max_depth,
            "loaded config"
        );
        Ok(config)
    }
}

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub config_path: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub sql: Option<String>,
    pub ansi_quotes: bool,
    pub no_backslash_escapes: bool,
    pub pipes_as_concat: bool,
    pub max_depth: Option<u32>,
    /// `(from, to)` pairs; `from` is `table` or `schema.table`.
    pub renames: Vec<(String, String)>,
    pub stats: bool,
}

impl CliOptions {
    /// Parse arguments, not including the program name.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut opts = Self::default();
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            match arg {
                "--format" | "-f" => {
                    let value = take_value(args, &mut i, arg)?;
                    opts.format = OutputFormat::from_arg(value)
                        .ok_or_else(|| format!("unknown format `{value}`"))?;
                }
                "--config" => {
                    opts.config_path = Some(PathBuf::from(take_value(args, &mut i, arg)?));
                }
                "--file" => opts.file = Some(PathBuf::from(take_value(args, &mut i, arg)?)),
                "--max-depth" => {
                    let value = take_value(args, &mut i, arg)?;
                    let depth = value
                        .parse::<u32>()
                        .map_err(|_| format!("--max-depth expects a number, got `{value}`"))?;
                    opts.max_depth = Some(depth);
                }
                "--rename" => {
                    let value = take_value(args, &mut i, arg)?;
                    let (from, to) = value
                        .split_once('=')
                        .filter(|(from, to)| !from.is_empty() && !to.is_empty())
                        .ok_or_else(|| format!("--rename expects FROM=TO, got `{value}`"))?;
                    opts.renames.push((from.to_owned(), to.to_owned()));
                }
                "--ansi-quotes" => opts.ansi_quotes = true,
                "--no-backslash-escapes" => opts.no_backslash_escapes = true,
                "--pipes-as-concat" => opts.pipes_as_concat = true,
                "--pretty" => opts.pretty = true,
                "--stats" => opts.stats = true,
                other if other.starts_with('-') && other.len() > 1 => {
                    return Err(format!("unknown option `{other}`"));
                }
                sql => {
                    if opts.sql.is_some() {
                        return Err("expected a single SQL argument (quote the statement)".into());
                    }
                    opts.sql = Some(sql.to_owned());
                }
            }
            i += 1;
        }
        if opts.sql.is_some() && opts.file.is_some() {
            return Err("give the statement either inline or with --file, not both".into());
        }
        Ok(opts)
    }

    /// Config file settings with command-line switches layered on top.
    pub fn parser_config(&self) -> Result<ParserConfig, String> {
        let mut config = match &self.config_path {
            Some(path) => CliConfig::load(path)?.parser,
            None => ParserConfig::default(),
        };
        config.ansi_quotes |= self.ansi_quotes;
        config.no_backslash_escapes |= self.no_backslash_escapes;
        config.pipes_as_concat |= self.pipes_as_concat;
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        Ok(config)
    }
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn matches_rename(table: &TableName, from: &str) -> bool {
    match from.split_once('.') {
        Some((schema, name)) => {
            table.schema.as_ref().is_some_and(|s| s.value == schema) && table.table.value == name
        }
        None => table.table.value == from,
    }
}

#[derive(Serialize)]
struct Stats {
    parse: ParseMetricsSnapshot,
    tokenize: TokenizeMetricsSnapshot,
}

/// Run the CLI against the given streams and return the process exit code.
pub fn run_cli<I>(
    os_args: I,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = OsString>,
{
    let raw: Vec<String> = os_args
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let tail = if raw.len() > 1 { &raw[1..] } else { &[] };

    if tail.iter().any(|a| a == "-h" || a == "--help") {
        let _ = stdout.write_all(HELP.as_bytes());
        return 0;
    }

    let opts = match CliOptions::parse(tail) {
        Ok(opts) => opts,
        Err(msg) => {
            let _ = writeln!(stderr, "error: {msg}");
            return 2;
        }
    };
    let config = match opts.parser_config() {
        Ok(config) => config,
        Err(msg) => {
            let _ = writeln!(stderr, "error: {msg}");
            return 2;
        }
    };
    let sql = match read_input(&opts, stdin) {
        Ok(sql) => sql,
        Err(msg) => {
            let _ = writeln!(stderr, "error: {msg}");
            return 1;
        }
    };
    tracing::debug!(
        target: "shardsql.cli",
        format = ?opts.format,
        bytes = sql.len(),
        renames = opts.renames.len(),
        "processing statement"
    );

    let code = match render(&opts, &config, &sql) {
        Ok(text) => match writeln!(stdout, "{text}") {
            Ok(()) => 0,
            Err(e) => {
                let _ = writeln!(stderr, "error: cannot write output: {e}");
                1
            }
        },
        Err(failure) => {
            report_error(&opts, &failure, &sql, stdout, stderr);
            1
        }
    };

    if opts.stats {
        let stats = Stats {
            parse: parse_metrics_snapshot(),
            tokenize: tokenize_metrics_snapshot(),
        };
        if let Ok(json) = serde_json::to_string(&stats) {
            let _ = writeln!(stderr, "{json}");
        }
    }
    code
}

fn read_input(opts: &CliOptions, stdin: &mut dyn Read) -> Result<String, String> {
    if let Some(sql) = &opts.sql {
        return Ok(sql.clone());
    }
    if let Some(path) = &opts.file {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()));
    }
    let mut sql = String::new();
    stdin
        .read_to_string(&mut sql)
        .map_err(|e| format!("cannot read standard input: {e}"))?;
    Ok(sql)
}

/// Why a statement produced no output.
enum Failure {
    Parse(SqlError),
    Rewrite(SpliceError),
}

fn render(opts: &CliOptions, config: &ParserConfig, sql: &str) -> Result<String, Failure> {
    let parsed = parse_statement_with(sql, config).map_err(Failure::Parse)?;

    if !opts.renames.is_empty() {
        return rename_tables(sql, &parsed.statement, |table| {
            opts.renames
                .iter()
                .find(|(from, _)| matches_rename(table, from))
                .map(|(_, to)| to.clone())
        })
        .map_err(Failure::Rewrite);
    }

    Ok(match opts.format {
        OutputFormat::Sql => parsed.statement.to_string(),
        OutputFormat::Json => {
            let json = if opts.pretty {
                serde_json::to_string_pretty(&parsed)
            } else {
                serde_json::to_string(&parsed)
            };
            json.unwrap_or_default()
        }
        OutputFormat::Debug => format!("{:#?}", parsed.statement),
        OutputFormat::Tables => {
            let mut seen: Vec<String> = Vec::new();
            for table in table_names(&parsed.statement) {
                let name = table.to_string();
                if !seen.contains(&name) {
                    seen.push(name);
                }
            }
            seen.join("\n")
        }
        OutputFormat::Tokens => parsed
            .tokens
            .iter()
            .map(|span| {
                format!(
                    "{}:{}\t{}..{}\t{}",
                    span.line,
                    span.column,
                    span.start,
                    span.end,
                    span.slice(sql).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

fn report_error(
    opts: &CliOptions,
    failure: &Failure,
    sql: &str,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) {
    match failure {
        Failure::Parse(err) if opts.format == OutputFormat::Json => {
            match serde_json::to_string(&serde_json::json!({ "error": err })) {
                Ok(json) => {
                    let _ = writeln!(stdout, "{json}");
                }
                Err(_) => {
                    let _ = writeln!(stderr, "{err}");
                }
            }
        }
        Failure::Parse(err) => {
            let _ = writeln!(stderr, "{}", err.render_snippet(sql));
        }
        Failure::Rewrite(err) => {
            tracing::error!(target: "shardsql.cli", error = %err, "rewrite failed");
            let _ = writeln!(stderr, "error: rewrite failed: {err}");
        }
    }
}

const HELP: &str = "\
shardsql - parse a MySQL DML statement

USAGE:
    shardsql [OPTIONS] [SQL]

The statement is taken from SQL, from --file, or from standard input.

OPTIONS:
    -f, --format <FMT>        sql | json | debug | tables | tokens (default: sql)
        --pretty              Pretty-print JSON output
        --file <PATH>         Read the statement from a file
        --config <PATH>       TOML file with a [parser] section
        --ansi-quotes         Treat \"x\" as an identifier (ANSI_QUOTES)
        --no-backslash-escapes
                              Treat \\ as a literal character in strings
        --pipes-as-concat     Parse || as concatenation (PIPES_AS_CONCAT)
        --max-depth <N>       Nesting limit (default: 64)
        --rename <FROM=TO>    Rewrite a table name in the original text;
                              FROM is `table` or `schema.table`. Repeatable.
        --stats               Print parser counters to stderr as JSON
    -h, --help                Show this help message

ENVIRONMENT:
    RUST_LOG                  tracing filter, e.g. `shardsql=debug` (default: warn)

EXAMPLES:
    shardsql 'select a from t where id = 1'
    shardsql --format tables 'DELETE t1 FROM t1 JOIN t2 USING (id)'
    echo 'UPDATE t_order SET x = 1' | shardsql --rename t_order=t_order_03
";

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_parse_options() {
        let opts = CliOptions::parse(&args(&[
            "--format",
            "JSON",
            "--pretty",
            "--max-depth",
            "12",
            "--rename",
            "db.t=t_01",
            "SELECT 1",
        ]))
        .expect("parse");
        assert_eq!(opts.format, OutputFormat::Json);
        assert!(opts.pretty);
        assert_eq!(opts.max_depth, Some(12));
        assert_eq!(opts.renames, vec![("db.t".to_owned(), "t_01".to_owned())]);
        assert_eq!(opts.sql.as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn test_parse_options_rejects_bad_input() {
        assert!(CliOptions::parse(&args(&["--format", "yaml"])).is_err());
        assert!(CliOptions::parse(&args(&["--max-depth", "deep"])).is_err());
        assert!(CliOptions::parse(&args(&["--max-depth"])).is_err());
        assert!(CliOptions::parse(&args(&["--rename", "t"])).is_err());
        assert!(CliOptions::parse(&args(&["--bogus"])).is_err());
        assert!(CliOptions::parse(&args(&["SELECT 1", "SELECT 2"])).is_err());
        assert!(CliOptions::parse(&args(&["--file", "q.sql", "SELECT 1"])).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let opts = CliOptions::parse(&args(&["--ansi-quotes", "--max-depth", "5"])).expect("parse");
        let config = opts.parser_config().expect("config");
        assert!(config.ansi_quotes);
        assert!(!config.pipes_as_concat);
        assert_eq!(config.max_depth, 5);
    }

    #[test]
    fn test_rename_matching() {
        let bare = TableName::bare("t_order");
        let qualified = TableName::qualified("shop", "t_order");
        assert!(matches_rename(&bare, "t_order"));
        assert!(matches_rename(&qualified, "t_order"));
        assert!(matches_rename(&qualified, "shop.t_order"));
        assert!(!matches_rename(&bare, "shop.t_order"));
        assert!(!matches_rename(&qualified, "other.t_order"));
    }
}

// MySQL DML lexer and parser.
//
// Hand-written recursive descent for statements with Pratt precedence
// climbing for expressions. Produces an AST from `shardsql-ast`.

pub mod config;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod stream;
pub mod token;

use shardsql_ast::Expr;
use shardsql_error::Result;

pub use config::{DEFAULT_MAX_DEPTH, ParserConfig};
pub use lexer::{
    Lexer, MAX_SOURCE_LEN, TokenizeMetricsSnapshot, reset_tokenize_metrics, tokenize,
    tokenize_metrics_snapshot, tokenize_with,
};
pub use parser::{
    ParseMetricsSnapshot, ParsedStatement, Parser, parse_metrics_snapshot, reset_parse_metrics,
};
pub use token::{Token, TokenKind};

/// Parse one DML statement with the default configuration.
pub fn parse_statement(sql: &str) -> Result<ParsedStatement> {
    parse_statement_with(sql, &ParserConfig::default())
}

/// Parse one DML statement under the given SQL mode and limits.
pub fn parse_statement_with(sql: &str, config: &ParserConfig) -> Result<ParsedStatement> {
    Parser::new(sql, config).parse_statement()
}

/// Parse a standalone expression with the default configuration.
pub fn parse_expr(sql: &str) -> Result<Expr> {
    Parser::new(sql, &ParserConfig::default()).parse_expression()
}

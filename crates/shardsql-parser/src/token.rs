// MySQL DML token kinds.
//
// Every token carries a discriminant and a Span (byte range plus the line and
// column of its first character). Keywords are their own variants so the
// parser can match them directly.

use shardsql_ast::Span;

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token discriminant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // === Literals ===
    /// Integer literal that fits in an `i64`.
    Integer(i64),
    /// Decimal, exponent or out-of-range integer literal, as written.
    Number(String),
    /// String literal with escapes resolved; the char is the quote used.
    String(String, char),
    /// `0x1F` / `X'1F'`: the hex digits.
    Hex(String),
    /// `0b101` / `B'101'`: the binary digits.
    Bit(String),

    // === Identifiers ===
    /// Unquoted identifier that is not a keyword.
    Id(String),
    /// Backtick-quoted identifier, or double-quoted under ANSI_QUOTES.
    QuotedId(String, char),

    /// `?` parameter marker.
    Question,

    // === Operators ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Ampersand,
    AmpAmp, // `&&`
    Pipe,
    PipePipe, // `||`
    Tilde,
    Bang,
    ShiftLeft,
    ShiftRight,
    Eq,
    NullSafeEq, // `<=>`
    Ne,         // `!=`
    LtGt,       // `<>`
    Lt,
    Le,
    Gt,
    Ge,

    // === Punctuation ===
    Dot,
    Comma,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,

    // === Keywords ===
    KwAll,
    KwAnd,
    KwAny,
    KwAs,
    KwAsc,
    KwBetween,
    KwBinary,
    KwBy,
    KwCase,
    KwCast,
    KwChar,
    KwCharset,
    KwCollate,
    KwCross,
    KwCurrentTimestamp,
    KwDate,
    KwDefault,
    KwDelayed,
    KwDelete,
    KwDesc,
    KwDistinct,
    KwDistinctrow,
    KwDiv,
    KwDuplicate,
    KwElse,
    KwEnd,
    KwEscape,
    KwExists,
    KwFalse,
    KwFor,
    KwForce,
    KwFrom,
    KwGroup,
    KwHaving,
    KwHighPriority,
    KwIf,
    KwIgnore,
    KwIn,
    KwIndex,
    KwInner,
    KwInsert,
    KwInto,
    KwIs,
    KwJoin,
    KwKey,
    KwLeft,
    KwLike,
    KwLimit,
    KwLock,
    KwLocked,
    KwLowPriority,
    KwMod,
    KwMode,
    KwNatural,
    KwNot,
    KwNowait,
    KwNull,
    KwOf,
    KwOffset,
    KwOn,
    KwOr,
    KwOrder,
    KwOuter,
    KwPartition,
    KwQuick,
    KwRecursive,
    KwRegexp,
    KwReplace,
    KwRight,
    KwRlike,
    KwRollup,
    KwRow,
    KwSelect,
    KwSet,
    KwShare,
    KwSkip,
    KwSome,
    KwSounds,
    KwSqlBigResult,
    KwSqlBufferResult,
    KwSqlCache,
    KwSqlCalcFoundRows,
    KwSqlNoCache,
    KwSqlSmallResult,
    KwStraightJoin,
    KwThen,
    KwTime,
    KwTimestamp,
    KwTrue,
    KwUnion,
    KwUnknown,
    KwUpdate,
    KwUse,
    KwUsing,
    KwValue,
    KwValues,
    KwWhen,
    KwWhere,
    KwWith,
    KwXor,

    // === Special ===
    /// End of input.
    Eof,
}

/// Length of the longest keyword (`SQL_CALC_FOUND_ROWS`).
const MAX_KEYWORD_LEN: usize = 19;

impl TokenKind {
    /// Look up an identifier to see if it is a keyword, ignoring ASCII case.
    #[must_use]
    pub fn lookup_keyword(s: &str) -> Option<Self> {
        if s.len() > MAX_KEYWORD_LEN || !s.is_ascii() {
            return None;
        }
        let mut buf = [0u8; MAX_KEYWORD_LEN];
        let upper = &mut buf[..s.len()];
        upper.copy_from_slice(s.as_bytes());
        upper.make_ascii_uppercase();
        let kw = match &*upper {
            b"ALL" => Self::KwAll,
            b"AND" => Self::KwAnd,
            b"ANY" => Self::KwAny,
            b"AS" => Self::KwAs,
            b"ASC" => Self::KwAsc,
            b"BETWEEN" => Self::KwBetween,
            b"BINARY" => Self::KwBinary,
            b"BY" => Self::KwBy,
            b"CASE" => Self::KwCase,
            b"CAST" => Self::KwCast,
            b"CHAR" => Self::KwChar,
            b"CHARSET" => Self::KwCharset,
            b"COLLATE" => Self::KwCollate,
            b"CROSS" => Self::KwCross,
            b"CURRENT_TIMESTAMP" => Self::KwCurrentTimestamp,
            b"DATE" => Self::KwDate,
            b"DEFAULT" => Self::KwDefault,
            b"DELAYED" => Self::KwDelayed,
            b"DELETE" => Self::KwDelete,
            b"DESC" => Self::KwDesc,
            b"DISTINCT" => Self::KwDistinct,
            b"DISTINCTROW" => Self::KwDistinctrow,
            b"DIV" => Self::KwDiv,
            b"DUPLICATE" => Self::KwDuplicate,
            b"ELSE" => Self::KwElse,
            b"END" => Self::KwEnd,
            b"ESCAPE" => Self::KwEscape,
            b"EXISTS" => Self::KwExists,
            b"FALSE" => Self::KwFalse,
            b"FOR" => Self::KwFor,
            b"FORCE" => Self::KwForce,
            b"FROM" => Self::KwFrom,
            b"GROUP" => Self::KwGroup,
            b"HAVING" => Self::KwHaving,
            b"HIGH_PRIORITY" => Self::KwHighPriority,
            b"IF" => Self::KwIf,
            b"IGNORE" => Self::KwIgnore,
            b"IN" => Self::KwIn,
            b"INDEX" => Self::KwIndex,
            b"INNER" => Self::KwInner,
            b"INSERT" => Self::KwInsert,
            b"INTO" => Self::KwInto,
            b"IS" => Self::KwIs,
            b"JOIN" => Self::KwJoin,
            b"KEY" => Self::KwKey,
            b"LEFT" => Self::KwLeft,
            b"LIKE" => Self::KwLike,
            b"LIMIT" => Self::KwLimit,
            b"LOCK" => Self::KwLock,
            b"LOCKED" => Self::KwLocked,
            b"LOW_PRIORITY" => Self::KwLowPriority,
            b"MOD" => Self::KwMod,
            b"MODE" => Self::KwMode,
            b"NATURAL" => Self::KwNatural,
            b"NOT" => Self::KwNot,
            b"NOWAIT" => Self::KwNowait,
            b"NULL" => Self::KwNull,
            b"OF" => Self::KwOf,
            b"OFFSET" => Self::KwOffset,
            b"ON" => Self::KwOn,
            b"OR" => Self::KwOr,
            b"ORDER" => Self::KwOrder,
            b"OUTER" => Self::KwOuter,
            b"PARTITION" => Self::KwPartition,
            b"QUICK" => Self::KwQuick,
            b"RECURSIVE" => Self::KwRecursive,
            b"REGEXP" => Self::KwRegexp,
            b"REPLACE" => Self::KwReplace,
            b"RIGHT" => Self::KwRight,
            b"RLIKE" => Self::KwRlike,
            b"ROLLUP" => Self::KwRollup,
            b"ROW" => Self::KwRow,
            b"SELECT" => Self::KwSelect,
            b"SET" => Self::KwSet,
            b"SHARE" => Self::KwShare,
            b"SKIP" => Self::KwSkip,
            b"SOME" => Self::KwSome,
            b"SOUNDS" => Self::KwSounds,
            b"SQL_BIG_RESULT" => Self::KwSqlBigResult,
            b"SQL_BUFFER_RESULT" => Self::KwSqlBufferResult,
            b"SQL_CACHE" => Self::KwSqlCache,
            b"SQL_CALC_FOUND_ROWS" => Self::KwSqlCalcFoundRows,
            b"SQL_NO_CACHE" => Self::KwSqlNoCache,
            b"SQL_SMALL_RESULT" => Self::KwSqlSmallResult,
            b"STRAIGHT_JOIN" => Self::KwStraightJoin,
            b"THEN" => Self::KwThen,
            b"TIME" => Self::KwTime,
            b"TIMESTAMP" => Self::KwTimestamp,
            b"TRUE" => Self::KwTrue,
            b"UNION" => Self::KwUnion,
            b"UNKNOWN" => Self::KwUnknown,
            b"UPDATE" => Self::KwUpdate,
            b"USE" => Self::KwUse,
            b"USING" => Self::KwUsing,
            b"VALUE" => Self::KwValue,
            b"VALUES" => Self::KwValues,
            b"WHEN" => Self::KwWhen,
            b"WHERE" => Self::KwWhere,
            b"WITH" => Self::KwWith,
            b"XOR" => Self::KwXor,
            _ => return None,
        };
        Some(kw)
    }

    /// Canonical upper-case spelling of a keyword token.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub const fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Self::KwAll => "ALL",
            Self::KwAnd => "AND",
            Self::KwAny => "ANY",
            Self::KwAs => "AS",
            Self::KwAsc => "ASC",
            Self::KwBetween => "BETWEEN",
            Self::KwBinary => "BINARY",
            Self::KwBy => "BY",
            Self::KwCase => "CASE",
            Self::KwCast => "CAST",
            Self::KwChar => "CHAR",
            Self::KwCharset => "CHARSET",
            Self::KwCollate => "COLLATE",
            Self::KwCross => "CROSS",
            Self::KwCurrentTimestamp => "CURRENT_TIMESTAMP",
            Self::KwDate => "DATE",
            Self::KwDefault => "DEFAULT",
            Self::KwDelayed => "DELAYED",
            Self::KwDelete => "DELETE",
            Self::KwDesc => "DESC",
            Self::KwDistinct => "DISTINCT",
            Self::KwDistinctrow => "DISTINCTROW",
            Self::KwDiv => "DIV",
            Self::KwDuplicate => "DUPLICATE",
            Self::KwElse => "ELSE",
            Self::KwEnd => "END",
            Self::KwEscape => "ESCAPE",
            Self::KwExists => "EXISTS",
            Self::KwFalse => "FALSE",
            Self::KwFor => "FOR",
            Self::KwForce => "FORCE",
            Self::KwFrom => "FROM",
            Self::KwGroup => "GROUP",
            Self::KwHaving => "HAVING",
            Self::KwHighPriority => "HIGH_PRIORITY",
            Self::KwIf => "IF",
            Self::KwIgnore => "IGNORE",
            Self::KwIn => "IN",
            Self::KwIndex => "INDEX",
            Self::KwInner => "INNER",
            Self::KwInsert => "INSERT",
            Self::KwInto => "INTO",
            Self::KwIs => "IS",
            Self::KwJoin => "JOIN",
            Self::KwKey => "KEY",
            Self::KwLeft => "LEFT",
            Self::KwLike => "LIKE",
            Self::KwLimit => "LIMIT",
            Self::KwLock => "LOCK",
            Self::KwLocked => "LOCKED",
            Self::KwLowPriority => "LOW_PRIORITY",
            Self::KwMod => "MOD",
            Self::KwMode => "MODE",
            Self::KwNatural => "NATURAL",
            Self::KwNot => "NOT",
            Self::KwNowait => "NOWAIT",
            Self::KwNull => "NULL",
            Self::KwOf => "OF",
            Self::KwOffset => "OFFSET",
            Self::KwOn => "ON",
            Self::KwOr => "OR",
            Self::KwOrder => "ORDER",
            Self::KwOuter => "OUTER",
            Self::KwPartition => "PARTITION",
            Self::KwQuick => "QUICK",
            Self::KwRecursive => "RECURSIVE",
            Self::KwRegexp => "REGEXP",
            Self::KwReplace => "REPLACE",
            Self::KwRight => "RIGHT",
            Self::KwRlike => "RLIKE",
            Self::KwRollup => "ROLLUP",
            Self::KwRow => "ROW",
            Self::KwSelect => "SELECT",
            Self::KwSet => "SET",
            Self::KwShare => "SHARE",
            Self::KwSkip => "SKIP",
            Self::KwSome => "SOME",
            Self::KwSounds => "SOUNDS",
            Self::KwSqlBigResult => "SQL_BIG_RESULT",
            Self::KwSqlBufferResult => "SQL_BUFFER_RESULT",
            Self::KwSqlCache => "SQL_CACHE",
            Self::KwSqlCalcFoundRows => "SQL_CALC_FOUND_ROWS",
            Self::KwSqlNoCache => "SQL_NO_CACHE",
            Self::KwSqlSmallResult => "SQL_SMALL_RESULT",
            Self::KwStraightJoin => "STRAIGHT_JOIN",
            Self::KwThen => "THEN",
            Self::KwTime => "TIME",
            Self::KwTimestamp => "TIMESTAMP",
            Self::KwTrue => "TRUE",
            Self::KwUnion => "UNION",
            Self::KwUnknown => "UNKNOWN",
            Self::KwUpdate => "UPDATE",
            Self::KwUse => "USE",
            Self::KwUsing => "USING",
            Self::KwValue => "VALUE",
            Self::KwValues => "VALUES",
            Self::KwWhen => "WHEN",
            Self::KwWhere => "WHERE",
            Self::KwWith => "WITH",
            Self::KwXor => "XOR",
            _ => return None,
        };
        Some(text)
    }

    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        self.keyword_text().is_some()
    }

    /// Keywords MySQL lets through as plain identifiers.
    #[must_use]
    pub const fn is_nonreserved(&self) -> bool {
        matches!(
            self,
            Self::KwDate
                | Self::KwTime
                | Self::KwTimestamp
                | Self::KwValue
                | Self::KwAny
                | Self::KwSome
                | Self::KwUnknown
                | Self::KwRollup
                | Self::KwQuick
                | Self::KwMode
                | Self::KwShare
                | Self::KwNowait
                | Self::KwLocked
                | Self::KwSkip
                | Self::KwOffset
                | Self::KwSounds
                | Self::KwEscape
                | Self::KwDuplicate
                | Self::KwCharset
        )
    }

    /// Keywords that name a built-in function when directly followed by `(`.
    #[must_use]
    pub const fn is_function_keyword(&self) -> bool {
        matches!(
            self,
            Self::KwLeft
                | Self::KwRight
                | Self::KwReplace
                | Self::KwIf
                | Self::KwInsert
                | Self::KwMod
                | Self::KwChar
                | Self::KwDate
                | Self::KwTime
                | Self::KwTimestamp
                | Self::KwValues
                | Self::KwDefault
                | Self::KwCurrentTimestamp
        )
    }

    /// Whether the token can start a statement.
    #[must_use]
    pub const fn is_statement_start(&self) -> bool {
        matches!(
            self,
            Self::KwSelect
                | Self::KwWith
                | Self::KwInsert
                | Self::KwReplace
                | Self::KwUpdate
                | Self::KwDelete
                | Self::LeftParen
        )
    }

    /// Short human-readable description used in syntax errors.
    #[must_use]
    pub fn describe(&self) -> String {
        if let Some(kw) = self.keyword_text() {
            return kw.to_owned();
        }
        match self {
            Self::Integer(n) => format!("integer {n}"),
            Self::Number(text) => format!("number {text}"),
            Self::String(..) => "string literal".to_owned(),
            Self::Hex(_) => "hex literal".to_owned(),
            Self::Bit(_) => "bit literal".to_owned(),
            Self::Id(name) => format!("identifier `{name}`"),
            Self::QuotedId(name, q) => format!("identifier {q}{name}{q}"),
            Self::Eof => "end of input".to_owned(),
            other => format!("'{}'", other.punct_text()),
        }
    }

    fn punct_text(&self) -> &'static str {
        match self {
            Self::Question => "?",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::Ampersand => "&",
            Self::AmpAmp => "&&",
            Self::Pipe => "|",
            Self::PipePipe => "||",
            Self::Tilde => "~",
            Self::Bang => "!",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Eq => "=",
            Self::NullSafeEq => "<=>",
            Self::Ne => "!=",
            Self::LtGt => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            _ => "?",
        }
    }
}

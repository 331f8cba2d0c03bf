use std::fmt;

/// Operators and punctuation, longest first so the lexer can match greedily.
pub(crate) const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|",
    "^", "<", ">", "=", "!", "~", "(", ")", "[", "]", "{", "}", ",", ".", ":",
];

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identifiers and keywords alike; the parser decides by text.
    Ident(String),
    Int(String),
    Float(String),
    Imag(String),
    Char(String),
    /// Source text of a string literal, quotes included.
    Str(String),
    Op(&'static str),
    /// Explicit `;` or one inserted at a line break.
    Semicolon,
    Eof,
}

impl Token {
    /// Whether a newline directly after this token terminates the statement.
    pub fn ends_statement(&self) -> bool {
        match self {
            Token::Ident(word) => {
                !is_keyword(word)
                    || matches!(
                        word.as_str(),
                        "break" | "continue" | "fallthrough" | "return"
                    )
            }
            Token::Int(_) | Token::Float(_) | Token::Imag(_) | Token::Char(_) | Token::Str(_) => {
                true
            }
            Token::Op(op) => matches!(*op, ")" | "]" | "}" | "++" | "--"),
            Token::Semicolon | Token::Eof => false,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Token::Ident(s)
            | Token::Int(s)
            | Token::Float(s)
            | Token::Imag(s)
            | Token::Char(s)
            | Token::Str(s) => s,
            Token::Op(op) => op,
            Token::Semicolon => ";",
            Token::Eof => "EOF",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Semicolon => write!(f, "';'"),
            Token::Eof => write!(f, "end of file"),
            other => write!(f, "'{}'", other.text()),
        }
    }
}

/// A token together with the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

use super::error::{ParseError, ParseResult};
use super::token::{Spanned, Token, OPERATORS};

/// Go lexer producing the token stream consumed by [`super::Parser`].
///
/// Comments are dropped. Semicolons are inserted at line breaks following the
/// Go language rules, so the parser only ever sees `;`-terminated
/// declarations.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tokens: Vec<Spanned>,
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> ParseResult<Vec<Spanned>> {
        while let Some(c) = self.peek(0) {
            match c {
                '\n' => {
                    self.line_break();
                    self.pos += 1;
                    self.line += 1;
                }
                c if c.is_whitespace() => self.pos += 1,
                '/' if self.peek(1) == Some('/') => {
                    while matches!(self.peek(0), Some(c) if c != '\n') {
                        self.pos += 1;
                    }
                }
                '/' if self.peek(1) == Some('*') => self.block_comment()?,
                c if is_letter(c) => self.identifier(),
                c if c.is_ascii_digit() => self.number(),
                '.' if matches!(self.peek(1), Some(d) if d.is_ascii_digit()) => self.number(),
                '"' => self.interpreted_string()?,
                '`' => self.raw_string()?,
                '\'' => self.rune()?,
                _ => self.operator()?,
            }
        }
        self.line_break();
        self.push(Token::Eof, self.line);
        Ok(self.tokens)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn push(&mut self, token: Token, line: usize) {
        self.tokens.push(Spanned { token, line });
    }

    fn line_break(&mut self) {
        let insert = self
            .tokens
            .last()
            .map(|last| last.token.ends_statement())
            .unwrap_or(false);
        if insert {
            self.push(Token::Semicolon, self.line);
        }
    }

    fn block_comment(&mut self) -> ParseResult<()> {
        let start = self.line;
        self.pos += 2;
        let mut newlines = 0;
        loop {
            match self.peek(0) {
                None => return Err(ParseError::new(start, "comment not terminated")),
                Some('*') if self.peek(1) == Some('/') => {
                    self.pos += 2;
                    break;
                }
                Some('\n') => {
                    newlines += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
        // A comment spanning lines acts like a newline.
        if newlines > 0 {
            self.line_break();
            self.line += newlines;
        }
        Ok(())
    }

    fn identifier(&mut self) {
        let start = self.pos;
        while matches!(self.peek(0), Some(c) if is_letter(c) || c.is_ascii_digit() || c.is_numeric())
        {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        self.push(Token::Ident(word), self.line);
    }

    fn number(&mut self) {
        let start = self.pos;
        let hex = self.peek(0) == Some('0') && matches!(self.peek(1), Some('x' | 'X'));
        while let Some(c) = self.peek(0) {
            let exponent = if hex {
                matches!(c, 'p' | 'P')
            } else {
                matches!(c, 'e' | 'E')
            };
            if exponent && matches!(self.peek(1), Some('+' | '-')) {
                self.pos += 2;
            } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                // `...` never follows a number literal in a declaration.
                if c == '.' && self.peek(1) == Some('.') {
                    break;
                }
                self.pos += 1;
            } else {
                break;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let token = if text.ends_with('i') {
            Token::Imag(text)
        } else if !hex && (text.contains('.') || text.contains(['e', 'E'])) {
            Token::Float(text)
        } else if hex && text.contains(['p', 'P']) {
            Token::Float(text)
        } else {
            Token::Int(text)
        };
        self.push(token, self.line);
    }

    fn interpreted_string(&mut self) -> ParseResult<()> {
        let text = self.quoted('"')?;
        self.push(Token::Str(text), self.line);
        Ok(())
    }

    fn rune(&mut self) -> ParseResult<()> {
        let text = self.quoted('\'')?;
        self.push(Token::Char(text), self.line);
        Ok(())
    }

    fn quoted(&mut self, quote: char) -> ParseResult<String> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None | Some('\n') => {
                    return Err(ParseError::new(self.line, "literal not terminated"));
                }
                Some('\\') => self.pos += 2,
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn raw_string(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let start_line = self.line;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None => return Err(ParseError::new(start_line, "raw string not terminated")),
                Some('`') => {
                    self.pos += 1;
                    break;
                }
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        self.push(Token::Str(text), start_line);
        Ok(())
    }

    fn operator(&mut self) -> ParseResult<()> {
        if self.peek(0) == Some(';') {
            self.pos += 1;
            self.push(Token::Semicolon, self.line);
            return Ok(());
        }
        for op in OPERATORS {
            let len = op.chars().count();
            let matches = op
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek(i) == Some(c));
            if matches {
                self.pos += len;
                self.push(Token::Op(op), self.line);
                return Ok(());
            }
        }
        let c = self.peek(0).unwrap_or_default();
        Err(ParseError::new(
            self.line,
            format!("unexpected character {c:?}"),
        ))
    }
}

fn is_letter(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Decode the body of a Go string literal as produced by the lexer.
pub fn unquote(literal: &str) -> Option<String> {
    if let Some(raw) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return Some(raw.replace('\r', ""));
    }
    let body = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

use super::ast::{
    ChanDir, Field, File, ImportSpec, InterfaceElem, PackageRef, Signature, StructField, TypeExpr,
    TypeSpec, TypeTerm,
};
use super::error::{ParseError, ParseResult};
use super::lexer::{unquote, Lexer};
use super::token::{is_keyword, Spanned, Token};

/// Recursive-descent parser for the declaration level of Go source files.
///
/// Function, variable and constant declarations are skipped token-wise; only
/// the package clause, imports and type declarations are kept.
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

/// Parse a whole source file.
pub fn parse_file(src: &str) -> ParseResult<File> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse_file()
}

/// Parse a standalone type expression such as `*http.Request`.
pub fn parse_type_expr(src: &str) -> ParseResult<TypeExpr> {
    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = Parser::new(tokens);
    let ty = parser.parse_type()?;
    parser.skip_semicolons();
    if parser.current() != &Token::Eof {
        return Err(parser.unexpected("end of type expression"));
    }
    Ok(ty)
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_file(&mut self) -> ParseResult<File> {
        self.skip_semicolons();
        self.expect_keyword("package")?;
        let package = self.parse_identifier()?;
        self.expect_end_of_decl()?;

        let mut imports = Vec::new();
        while self.is_keyword("import") {
            self.parse_import_decl(&mut imports)?;
            self.expect_end_of_decl()?;
        }

        let mut types = Vec::new();
        loop {
            self.skip_semicolons();
            if self.current() == &Token::Eof {
                break;
            }
            if self.is_keyword("type") {
                self.parse_type_decl(&mut types)?;
                self.expect_end_of_decl()?;
            } else {
                self.skip_declaration();
            }
        }

        Ok(File {
            package,
            imports,
            types,
        })
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.line)
            .unwrap_or(1)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_op(&self, op: &str) -> bool {
        matches!(self.current(), Token::Op(current) if *current == op)
    }

    fn is_keyword(&self, word: &str) -> bool {
        matches!(self.current(), Token::Ident(current) if current == word)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            self.line(),
            format!("expected {expected}, found {}", self.current()),
        )
    }

    fn expect_op(&mut self, op: &str) -> ParseResult<()> {
        if self.is_op(op) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{op}'")))
        }
    }

    fn expect_keyword(&mut self, word: &str) -> ParseResult<()> {
        if self.is_keyword(word) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{word}'")))
        }
    }

    fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.current() {
            Token::Ident(word) if !is_keyword(word) => {
                let word = word.clone();
                self.advance();
                Ok(word)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn skip_semicolons(&mut self) {
        while self.current() == &Token::Semicolon {
            self.advance();
        }
    }

    /// Declarations end with `;`, or directly at `)`/`}` and end of file.
    fn expect_end_of_decl(&mut self) -> ParseResult<()> {
        match self.current() {
            Token::Semicolon => {
                self.advance();
                Ok(())
            }
            Token::Eof => Ok(()),
            Token::Op(")") | Token::Op("}") => Ok(()),
            _ => Err(self.unexpected("';'")),
        }
    }

    /// Skip a declaration we do not model, up to its terminating `;`.
    fn skip_declaration(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::Eof => return,
                Token::Op("(") | Token::Op("[") | Token::Op("{") => depth += 1,
                Token::Op(")") | Token::Op("]") | Token::Op("}") => {
                    depth = depth.saturating_sub(1)
                }
                Token::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_import_decl(&mut self, imports: &mut Vec<ImportSpec>) -> ParseResult<()> {
        self.expect_keyword("import")?;
        if self.is_op("(") {
            self.advance();
            loop {
                self.skip_semicolons();
                if self.is_op(")") {
                    self.advance();
                    return Ok(());
                }
                imports.push(self.parse_import_spec()?);
                self.expect_end_of_decl()?;
            }
        }
        imports.push(self.parse_import_spec()?);
        Ok(())
    }

    fn parse_import_spec(&mut self) -> ParseResult<ImportSpec> {
        let name = match self.current() {
            Token::Ident(word) => {
                let word = word.clone();
                self.advance();
                Some(word)
            }
            Token::Op(".") => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };
        match self.current() {
            Token::Str(literal) => {
                let path = unquote(literal)
                    .ok_or_else(|| ParseError::new(self.line(), "malformed import path"))?;
                self.advance();
                Ok(ImportSpec { name, path })
            }
            _ => Err(self.unexpected("import path")),
        }
    }

    fn parse_type_decl(&mut self, types: &mut Vec<TypeSpec>) -> ParseResult<()> {
        self.expect_keyword("type")?;
        if self.is_op("(") {
            self.advance();
            loop {
                self.skip_semicolons();
                if self.is_op(")") {
                    self.advance();
                    return Ok(());
                }
                types.push(self.parse_type_spec()?);
                self.expect_end_of_decl()?;
            }
        }
        types.push(self.parse_type_spec()?);
        Ok(())
    }

    fn parse_type_spec(&mut self) -> ParseResult<TypeSpec> {
        let line = self.line();
        let name = self.parse_identifier()?;
        let type_params = if self.starts_type_params() {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let alias = self.is_op("=");
        if alias {
            self.advance();
        }
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            name,
            type_params,
            alias,
            ty,
            line,
        })
    }

    /// `type A[T any] ...` versus the array type in `type A [N]int`.
    fn starts_type_params(&self) -> bool {
        if !self.is_op("[") {
            return false;
        }
        match (self.peek(1), self.peek(2)) {
            (Token::Ident(_), Token::Ident(_)) => true,
            (Token::Ident(_), Token::Op(op)) => matches!(*op, "," | "~" | "["),
            _ => false,
        }
    }

    fn parse_type_params(&mut self) -> ParseResult<Vec<String>> {
        self.expect_op("[")?;
        let mut names = Vec::new();
        while !self.is_op("]") {
            names.push(self.parse_identifier()?);
            if self.is_op(",") {
                self.advance();
                continue;
            }
            self.parse_type_terms()?;
            if self.is_op(",") {
                self.advance();
            }
        }
        self.expect_op("]")?;
        Ok(names)
    }

    fn parse_type_terms(&mut self) -> ParseResult<Vec<TypeTerm>> {
        let mut terms = Vec::new();
        loop {
            let tilde = self.is_op("~");
            if tilde {
                self.advance();
            }
            terms.push(TypeTerm {
                tilde,
                ty: self.parse_type()?,
            });
            if !self.is_op("|") {
                return Ok(terms);
            }
            self.advance();
        }
    }

    pub fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        match self.current().clone() {
            Token::Ident(word) => match word.as_str() {
                "func" => {
                    self.advance();
                    Ok(TypeExpr::Func(self.parse_signature()?))
                }
                "interface" => self.parse_interface(),
                "struct" => self.parse_struct(),
                "map" => {
                    self.advance();
                    self.expect_op("[")?;
                    let key = self.parse_type()?;
                    self.expect_op("]")?;
                    let value = self.parse_type()?;
                    Ok(TypeExpr::Map {
                        key: Box::new(key),
                        value: Box::new(value),
                    })
                }
                "chan" => {
                    self.advance();
                    let dir = if self.is_op("<-") {
                        self.advance();
                        ChanDir::Send
                    } else {
                        ChanDir::Both
                    };
                    let elem = self.parse_type()?;
                    Ok(TypeExpr::Chan {
                        dir,
                        elem: Box::new(elem),
                    })
                }
                _ if is_keyword(&word) => Err(self.unexpected("type")),
                _ => self.parse_named_type(),
            },
            Token::Op("*") => {
                self.advance();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            Token::Op("[") => {
                self.advance();
                if self.is_op("]") {
                    self.advance();
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let len = self.collect_until_bracket()?;
                let elem = self.parse_type()?;
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(elem),
                })
            }
            Token::Op("<-") => {
                self.advance();
                self.expect_keyword("chan")?;
                let elem = self.parse_type()?;
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(elem),
                })
            }
            Token::Op("(") => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect_op(")")?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            Token::Op("...") => {
                self.advance();
                Ok(TypeExpr::Variadic(Box::new(self.parse_type()?)))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    fn parse_named_type(&mut self) -> ParseResult<TypeExpr> {
        let first = self.parse_identifier()?;
        let (package, name) = if self.is_op(".") {
            self.advance();
            (Some(PackageRef::unbound(first)), self.parse_identifier()?)
        } else {
            (None, first)
        };
        let mut args = Vec::new();
        if self.is_op("[") && self.bracket_holds_type_args() {
            self.advance();
            while !self.is_op("]") {
                args.push(self.parse_type()?);
                if self.is_op(",") {
                    self.advance();
                } else if !self.is_op("]") {
                    return Err(self.unexpected("',' or ']'"));
                }
            }
            self.advance();
        }
        Ok(TypeExpr::Named {
            package,
            name,
            args,
        })
    }

    /// Whether the `[` at the cursor instantiates the preceding named type,
    /// as opposed to opening the slice or array type of the next parameter
    /// (`a []int`, `a [N]int`).
    fn bracket_holds_type_args(&self) -> bool {
        if matches!(self.peek(1), Token::Op("]") | Token::Int(_)) {
            return false;
        }
        let mut depth = 0usize;
        let mut offset = 0;
        loop {
            match self.peek(offset) {
                Token::Eof => return false,
                Token::Op("[") => depth += 1,
                Token::Op("]") => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            offset += 1;
        }
        match self.peek(offset + 1) {
            Token::Ident(word) => is_keyword(word) && !is_type_keyword(word),
            Token::Op(op) => !matches!(*op, "*" | "[" | "(" | "<-"),
            _ => true,
        }
    }

    /// Array length text up to the matching `]`, which is consumed.
    fn collect_until_bracket(&mut self) -> ParseResult<String> {
        let mut depth = 0usize;
        let mut text = String::new();
        loop {
            match self.current() {
                Token::Eof | Token::Semicolon => return Err(self.unexpected("']'")),
                Token::Op("]") if depth == 0 => {
                    self.advance();
                    return Ok(text);
                }
                token => {
                    match token {
                        Token::Op("[") | Token::Op("(") => depth += 1,
                        Token::Op("]") | Token::Op(")") => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    text.push_str(token.text());
                }
            }
            self.advance();
        }
    }

    fn parse_signature(&mut self) -> ParseResult<Signature> {
        let params = self.parse_parameters()?;
        let results = if self.is_op("(") {
            self.parse_parameters()?
        } else if self.starts_type() {
            vec![Field {
                names: Vec::new(),
                ty: self.parse_type()?,
            }]
        } else {
            Vec::new()
        };
        Ok(Signature { params, results })
    }

    fn starts_type(&self) -> bool {
        match self.current() {
            Token::Ident(word) => !is_keyword(word) || is_type_keyword(word),
            Token::Op(op) => matches!(*op, "*" | "[" | "<-"),
            _ => false,
        }
    }

    /// Parameter list. Entries are either all named (`a, b int, c string`)
    /// or all anonymous (`int, string`); Go decides by whether any entry
    /// carries both a name and a type.
    fn parse_parameters(&mut self) -> ParseResult<Vec<Field>> {
        self.expect_op("(")?;
        let mut entries: Vec<(TypeExpr, Option<TypeExpr>)> = Vec::new();
        while !self.is_op(")") {
            let first = self.parse_type()?;
            let second = if self.is_op(",") || self.is_op(")") {
                None
            } else {
                Some(self.parse_type()?)
            };
            entries.push((first, second));
            if self.is_op(",") {
                self.advance();
            } else if !self.is_op(")") {
                return Err(self.unexpected("',' or ')'"));
            }
        }
        self.advance();

        if entries.iter().all(|(_, second)| second.is_none()) {
            return Ok(entries
                .into_iter()
                .map(|(ty, _)| Field {
                    names: Vec::new(),
                    ty,
                })
                .collect());
        }

        let mut fields = Vec::new();
        let mut pending = Vec::new();
        for (first, second) in entries {
            let name = first.as_plain_ident().map(str::to_string).ok_or_else(|| {
                ParseError::new(self.line(), "mixed named and unnamed parameters")
            })?;
            pending.push(name);
            if let Some(ty) = second {
                fields.push(Field {
                    names: std::mem::take(&mut pending),
                    ty,
                });
            }
        }
        if !pending.is_empty() {
            return Err(ParseError::new(
                self.line(),
                "mixed named and unnamed parameters",
            ));
        }
        Ok(fields)
    }

    fn parse_interface(&mut self) -> ParseResult<TypeExpr> {
        self.expect_keyword("interface")?;
        self.expect_op("{")?;
        let mut elems = Vec::new();
        loop {
            self.skip_semicolons();
            if self.is_op("}") {
                self.advance();
                return Ok(TypeExpr::Interface(elems));
            }
            let is_method = matches!(self.current(), Token::Ident(word) if !is_keyword(word))
                && matches!(self.peek(1), Token::Op("("));
            if is_method {
                let name = self.parse_identifier()?;
                let signature = self.parse_signature()?;
                elems.push(InterfaceElem::Method { name, signature });
            } else {
                let mut terms = self.parse_type_terms()?;
                if terms.len() == 1 && !terms[0].tilde {
                    elems.push(InterfaceElem::Embedded(terms.remove(0).ty));
                } else {
                    elems.push(InterfaceElem::Union(terms));
                }
            }
            self.expect_end_of_decl()?;
        }
    }

    fn parse_struct(&mut self) -> ParseResult<TypeExpr> {
        self.expect_keyword("struct")?;
        self.expect_op("{")?;
        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.is_op("}") {
                self.advance();
                return Ok(TypeExpr::Struct(fields));
            }
            let embedded = self.is_op("*")
                || matches!(
                    self.peek(1),
                    Token::Op(".") | Token::Op("}") | Token::Semicolon | Token::Str(_)
                );
            let names = if embedded {
                Vec::new()
            } else {
                let mut names = vec![self.parse_identifier()?];
                while self.is_op(",") {
                    self.advance();
                    names.push(self.parse_identifier()?);
                }
                names
            };
            let ty = self.parse_type()?;
            let tag = match self.current() {
                Token::Str(literal) => {
                    let literal = literal.clone();
                    self.advance();
                    Some(literal)
                }
                _ => None,
            };
            fields.push(StructField { names, ty, tag });
            self.expect_end_of_decl()?;
        }
    }
}

fn is_type_keyword(word: &str) -> bool {
    matches!(word, "func" | "interface" | "struct" | "map" | "chan")
}

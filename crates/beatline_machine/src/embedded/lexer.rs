//! Tokenizer for embedded expressions.

/// A token with the 1-based column it starts at.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub column: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    LParen,
    RParen,
    Nil,
    True,
    False,
    Int(i64),
    Float(f64),
    String(String),
    /// An operator or other bare word.
    Symbol(String),
    /// `$name`
    Reactive(String),
    /// `$$name`
    Static(String),
    Error(String),
    Eof,
}

pub(crate) struct Lexer<'src> {
    source: &'src str,
    rest: &'src str,
    position: usize,
    column: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            column: 1,
        }
    }

    /// Tokenizes the whole source, ending with `Eof` or the first `Error`.
    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = matches!(token.kind, TokenKind::Eof | TokenKind::Error(_));
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let column = self.column;

        let Some(c) = self.peek_char() else {
            return Token {
                kind: TokenKind::Eof,
                column,
            };
        };
        let kind = match c {
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '"' => self.scan_string(),
            '$' => self.scan_variable(),
            c if c.is_ascii_digit() => self.scan_number(),
            '-' if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            c if is_symbol_char(c) => self.scan_symbol(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        };
        Token { kind, column }
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            self.column += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    return TokenKind::String(text);
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek_char() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(c) => return TokenKind::Error(format!("invalid escape sequence: \\{c}")),
                        None => return TokenKind::Error("unterminated string literal".into()),
                    };
                    self.advance();
                    text.push(escaped);
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None => return TokenKind::Error("unterminated string literal".into()),
            }
        }
    }

    fn scan_variable(&mut self) -> TokenKind {
        self.advance(); // '$'
        let is_static = self.peek_char() == Some('$');
        if is_static {
            self.advance();
        }
        let start = self.position;
        while self.peek_char().is_some_and(is_name_char) {
            self.advance();
        }
        let name = &self.source[start..self.position];
        match (name.is_empty(), is_static) {
            (true, _) => TokenKind::Error("expected variable name after '$'".into()),
            (false, true) => TokenKind::Static(name.to_string()),
            (false, false) => TokenKind::Reactive(name.to_string()),
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;
        let mut has_dot = false;
        if self.peek_char() == Some('-') {
            self.advance();
        }
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' && !has_dot && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
            {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[start..self.position];
        if has_dot {
            text.parse::<f64>().map_or_else(
                |e| TokenKind::Error(format!("invalid float: {e}")),
                TokenKind::Float,
            )
        } else {
            text.parse::<i64>().map_or_else(
                |e| TokenKind::Error(format!("invalid integer: {e}")),
                TokenKind::Int,
            )
        }
    }

    fn scan_symbol(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(is_symbol_char) {
            self.advance();
        }
        match &self.source[start..self.position] {
            "nil" => TokenKind::Nil,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            word => TokenKind::Symbol(word.to_string()),
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_symbol_char(c: char) -> bool {
    is_name_char(c)
        || matches!(
            c,
            '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' | '<' | '>' | '=' | '!' | '.'
        )
}

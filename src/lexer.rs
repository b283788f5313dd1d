use crate::error::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Single-character tokens
    BlockStart,
    BlockEnd,
    ListStart,
    ListEnd,
    Comma,
    Assign,

    // Literals
    Identifier,
    String,
    Heredoc,

    // Trivia, skipped by the parser
    Whitespace,
    Comment,

    // Special
    Error,
    Eof,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TokenType::BlockStart => "'{'",
            TokenType::BlockEnd => "'}'",
            TokenType::ListStart => "'['",
            TokenType::ListEnd => "']'",
            TokenType::Comma => "','",
            TokenType::Assign => "'='",
            TokenType::Identifier => "identifier",
            TokenType::String => "string",
            TokenType::Heredoc => "heredoc string",
            TokenType::Whitespace => "whitespace",
            TokenType::Comment => "comment",
            TokenType::Error => "error",
            TokenType::Eof => "end of input",
        };
        write!(f, "{}", name)
    }
}

/// A lexed token.
///
/// `text` holds the token's value: the unquoted contents for strings, the
/// captured body for heredocs and the message for errors. `span` always
/// covers the raw source bytes, so concatenating the spans of a token stream
/// reproduces the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub text: String,
    pub span: Span,
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, text: String, span: Span, line: usize) -> Self {
        Self {
            token_type,
            text,
            span,
            line,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self.token_type, TokenType::String | TokenType::Heredoc)
    }

    pub fn is_trivia(&self) -> bool {
        matches!(self.token_type, TokenType::Whitespace | TokenType::Comment)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.token_type {
            TokenType::Eof => write!(f, "end of input"),
            TokenType::Whitespace => write!(f, "whitespace"),
            TokenType::Error => write!(f, "error: {}", self.text),
            TokenType::String => write!(f, "string {:?}", self.text),
            TokenType::Heredoc => write!(f, "heredoc string"),
            TokenType::Identifier => write!(f, "identifier '{}'", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// Pull-based BCL tokenizer.
///
/// Tokens are produced lazily, one per call to `next`. The stream ends right
/// after the `Eof` token or the first `Error` token.
pub struct Lexer<'a> {
    source: &'a str,
    start: usize,
    current: usize,
    line: usize,
    start_line: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
            start_line: 1,
            finished: false,
        }
    }

    fn scan_token(&mut self) -> Token {
        self.start = self.current;
        self.start_line = self.line;

        let c = match self.advance() {
            Some(c) => c,
            None => return self.make_token(TokenType::Eof, String::new()),
        };

        match c {
            '{' => self.add_token(TokenType::BlockStart),
            '}' => self.add_token(TokenType::BlockEnd),
            '[' => self.add_token(TokenType::ListStart),
            ']' => self.add_token(TokenType::ListEnd),
            ',' => self.add_token(TokenType::Comma),
            '=' => self.add_token(TokenType::Assign),
            '#' => self.comment(),
            '"' => self.string(),
            '<' => self.heredoc(),
            c if is_space(c) => self.whitespace(),
            c if is_identifier_char(c) => self.identifier(),
            _ => self.error(format!("unexpected character '{}'", c)),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.source[self.current..].chars().next()?;
        self.current += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn whitespace(&mut self) -> Token {
        while self.peek().map_or(false, is_space) {
            self.advance();
        }
        self.add_token(TokenType::Whitespace)
    }

    fn comment(&mut self) -> Token {
        // Everything up to the end of line
        while self.peek().map_or(false, |c| !is_newline(c)) {
            self.advance();
        }
        self.add_token(TokenType::Comment)
    }

    fn identifier(&mut self) -> Token {
        while self.peek().map_or(false, is_identifier_char) {
            self.advance();
        }
        self.add_token(TokenType::Identifier)
    }

    fn string(&mut self) -> Token {
        loop {
            match self.peek() {
                None => return self.error("unterminated string".to_string()),
                Some(c) if is_newline(c) => {
                    return self.error("string does not allow new lines".to_string())
                }
                Some('"') => break,
                Some(_) => {
                    self.advance();
                }
            }
        }

        // Consume the closing "
        self.advance();

        let content = &self.source[self.start + 1..self.current - 1];
        self.make_token(TokenType::String, content.to_string())
    }

    /// `<<<DELIM`, a newline, then everything up to a line holding exactly `DELIM`.
    fn heredoc(&mut self) -> Token {
        for _ in 0..2 {
            if self.peek() != Some('<') {
                return self.error("expected '<<<' to start a heredoc string".to_string());
            }
            self.advance();
        }

        let delimiter_start = self.current;
        while self.peek().map_or(false, is_identifier_char) {
            self.advance();
        }
        let delimiter = &self.source[delimiter_start..self.current];
        if delimiter.is_empty() {
            return self.error("heredoc delimiter must be an identifier".to_string());
        }

        if self.peek() == Some('\r') {
            self.advance();
        }
        if self.peek() != Some('\n') {
            return self.error(format!(
                "expected new line after heredoc delimiter '{}'",
                delimiter
            ));
        }
        self.advance();

        let body_start = self.current;
        let mut line_start = body_start;
        loop {
            let line_end = self.source[line_start..]
                .find('\n')
                .map_or(self.source.len(), |offset| line_start + offset);
            let line = self.source[line_start..line_end].trim_end_matches('\r');

            if line == delimiter {
                // The newline right before the delimiter line belongs to the syntax
                let mut body = &self.source[body_start..line_start];
                body = body.strip_suffix('\n').unwrap_or(body);
                body = body.strip_suffix('\r').unwrap_or(body);
                let body = body.to_string();

                self.skip_to(line_end);
                return self.make_token(TokenType::Heredoc, body);
            }

            if line_end >= self.source.len() {
                self.skip_to(self.source.len());
                return self.error(format!(
                    "unterminated heredoc string, expected closing '{}'",
                    delimiter
                ));
            }
            line_start = line_end + 1;
        }
    }

    fn skip_to(&mut self, position: usize) {
        self.line += self.source[self.current..position].matches('\n').count();
        self.current = position;
    }

    fn error(&mut self, message: String) -> Token {
        self.make_token(TokenType::Error, message)
    }

    fn add_token(&mut self, token_type: TokenType) -> Token {
        let text = &self.source[self.start..self.current];
        self.make_token(token_type, text.to_string())
    }

    fn make_token(&mut self, token_type: TokenType, text: String) -> Token {
        Token::new(
            token_type,
            text,
            Span::new(self.start, self.current),
            self.start_line,
        )
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let token = self.scan_token();
        if matches!(token.token_type, TokenType::Eof | TokenType::Error) {
            self.finished = true;
        }
        Some(token)
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_newline(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

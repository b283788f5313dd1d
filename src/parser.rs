use crate::ast::{Block, Document, Expression, Identifier, List, StringLiteral, Value};
use crate::error::{BclError, Span};
use crate::lexer::{Lexer, Token, TokenType};

/// Parses a whole BCL document. No partial tree is returned on error.
pub fn parse(source: &str) -> Result<Document, BclError> {
    Parser::new(source).parse()
}

/// Recursive descent parser pulling tokens from the lexer with one token of
/// pushback. Whitespace and comments never reach the grammar rules.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    source_len: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            peeked: None,
            source_len: source.len(),
        }
    }

    pub fn parse(&mut self) -> Result<Document, BclError> {
        let mut blocks = Vec::new();

        loop {
            match self.peek()?.token_type {
                TokenType::Eof => break,
                TokenType::Identifier => blocks.push(self.block()?),
                _ => {
                    let token = self.advance()?;
                    return Err(self.unexpected(
                        &token,
                        "a block identifier",
                        "Only blocks are allowed at the top level, e.g. resource \"http_step\" \"login\" { ... }",
                    ));
                }
            }
        }

        Ok(Document { blocks })
    }

    fn block(&mut self) -> Result<Block, BclError> {
        let id_token = self.consume(TokenType::Identifier, "a block identifier")?;
        let driver = self.string_literal("the block driver string")?;
        let name = self.string_literal("the block name string")?;

        self.consume_with_help(
            TokenType::BlockStart,
            "'{' after the block name",
            "Blocks are written as: resource \"<driver>\" \"<name>\" { field = \"value\" }",
        )?;

        let mut expressions = Vec::new();
        loop {
            match self.peek()?.token_type {
                TokenType::BlockEnd => break,
                TokenType::Eof => {
                    let token = self.advance()?;
                    return Err(self.unexpected(
                        &token,
                        "'}' after block",
                        "Blocks must be closed with '}' after the opening '{'.",
                    ));
                }
                _ => expressions.push(self.expression()?),
            }
        }

        let end = self.consume(TokenType::BlockEnd, "'}' after block")?;

        Ok(Block {
            id: Identifier {
                name: id_token.text,
                span: id_token.span.clone(),
            },
            driver,
            name,
            expressions,
            span: Span::new(id_token.span.start, end.span.end),
        })
    }

    fn expression(&mut self) -> Result<Expression, BclError> {
        let field_token = self.consume(TokenType::Identifier, "a field name")?;
        self.consume_with_help(
            TokenType::Assign,
            &format!("'=' after field '{}'", field_token.text),
            "Fields are assigned with '=': field = \"value\" or field = [\"a\", \"b\"]",
        )?;

        let token = self.advance()?;
        let value = if token.is_string() {
            Value::String(StringLiteral {
                text: token.text,
                span: token.span,
            })
        } else if token.token_type == TokenType::ListStart {
            Value::List(self.list(token.span)?)
        } else {
            return Err(self.unexpected(
                &token,
                "a string or a list",
                "Field values are strings (\"value\", <<<EOF heredocs) or lists of strings.",
            ));
        };

        let span = Span::new(field_token.span.start, value.span().end);
        Ok(Expression {
            field: Identifier {
                name: field_token.text,
                span: field_token.span,
            },
            value,
            span,
        })
    }

    fn list(&mut self, start_span: Span) -> Result<List, BclError> {
        let mut items = Vec::new();

        loop {
            let token = self.advance()?;
            if token.token_type == TokenType::ListEnd {
                return Ok(List {
                    items,
                    span: Span::new(start_span.start, token.span.end),
                });
            }

            if !token.is_string() {
                let help = if token.token_type == TokenType::ListStart {
                    "Lists cannot be nested, list items must be strings."
                } else {
                    "Lists hold strings separated by commas: [\"a\", \"b\"]"
                };
                return Err(self.unexpected(&token, "a string or ']' in list", help));
            }
            items.push(StringLiteral {
                text: token.text,
                span: token.span,
            });

            // A trailing comma before ']' is allowed
            let separator = self.advance()?;
            match separator.token_type {
                TokenType::Comma => continue,
                TokenType::ListEnd => {
                    return Ok(List {
                        items,
                        span: Span::new(start_span.start, separator.span.end),
                    })
                }
                _ => {
                    return Err(self.unexpected(
                        &separator,
                        "',' or ']' after list item",
                        "List items must be separated by commas and the list closed with ']'.",
                    ))
                }
            }
        }
    }

    fn string_literal(&mut self, expected: &str) -> Result<StringLiteral, BclError> {
        let token = self.advance()?;
        if !token.is_string() {
            return Err(self.unexpected(
                &token,
                expected,
                "Block headers are written as: <identifier> \"<driver>\" \"<name>\"",
            ));
        }
        Ok(StringLiteral {
            text: token.text,
            span: token.span,
        })
    }

    fn consume(&mut self, token_type: TokenType, expected: &str) -> Result<Token, BclError> {
        let token = self.advance()?;
        if token.token_type == token_type {
            Ok(token)
        } else {
            Err(BclError::parse_error(
                token.span.clone(),
                token.line,
                format!("Expected {}, found {}", expected, token),
            ))
        }
    }

    fn consume_with_help(
        &mut self,
        token_type: TokenType,
        expected: &str,
        help: &str,
    ) -> Result<Token, BclError> {
        let token = self.advance()?;
        if token.token_type == token_type {
            Ok(token)
        } else {
            Err(self.unexpected(&token, expected, help))
        }
    }

    fn unexpected(&self, token: &Token, expected: &str, help: &str) -> BclError {
        BclError::parse_error_with_help(
            token.span.clone(),
            token.line,
            format!("Expected {}, found {}", expected, token),
            help.to_string(),
        )
    }

    fn peek(&mut self) -> Result<&Token, BclError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.next_significant()?,
        };
        Ok(self.peeked.insert(token))
    }

    fn advance(&mut self) -> Result<Token, BclError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.next_significant(),
        }
    }

    /// Next token that is neither whitespace nor a comment. Lexer errors
    /// become syntax errors here.
    fn next_significant(&mut self) -> Result<Token, BclError> {
        loop {
            let token = match self.lexer.next() {
                Some(token) => token,
                None => Token::new(
                    TokenType::Eof,
                    String::new(),
                    Span::new(self.source_len, self.source_len),
                    0,
                ),
            };

            match token.token_type {
                TokenType::Whitespace | TokenType::Comment => continue,
                TokenType::Error => {
                    return Err(BclError::lex_error(token.span, token.line, token.text))
                }
                _ => return Ok(token),
            }
        }
    }
}

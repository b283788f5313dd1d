use super::lexer::{TemplateLexer, TemplateToken};
use crate::error::EvalError;

/// A parsed piece of a template string.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(String),
    Reference(String),
}

/// Splits `text` into literal text and `${...}` references.
pub fn parse_template(text: &str) -> Result<Vec<Fragment>, EvalError> {
    let mut lexer = TemplateLexer::new(text);
    let mut fragments = Vec::new();

    loop {
        match next_token(&mut lexer) {
            TemplateToken::Text(value) => fragments.push(Fragment::Text(value)),
            TemplateToken::TemplateStart => fragments.push(reference(text, &mut lexer)?),
            TemplateToken::Eof => return Ok(fragments),
            TemplateToken::Error(message) => return Err(EvalError::interpolation(text, message)),
            token => {
                return Err(EvalError::interpolation(
                    text,
                    format!("unexpected token {:?}", token),
                ))
            }
        }
    }
}

fn reference(text: &str, lexer: &mut TemplateLexer) -> Result<Fragment, EvalError> {
    let value = match next_token(lexer) {
        TemplateToken::Reference(value) => value,
        TemplateToken::Error(message) => return Err(EvalError::interpolation(text, message)),
        token => {
            return Err(EvalError::interpolation(
                text,
                format!("expected reference inside '${{...}}', got {:?}", token),
            ))
        }
    };

    match next_token(lexer) {
        TemplateToken::TemplateEnd => Ok(Fragment::Reference(value)),
        token => Err(EvalError::interpolation(
            text,
            format!("expected '}}' after reference, got {:?}", token),
        )),
    }
}

fn next_token(lexer: &mut TemplateLexer) -> TemplateToken {
    lexer.next().unwrap_or(TemplateToken::Eof)
}

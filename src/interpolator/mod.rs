//! `${...}` placeholders inside string values.
//!
//! `${var.NAME}` reads the context's variable table, a missing variable
//! yields an empty string. `${<id>.<driver>.<name>.<attribute>}` reads an
//! attribute of a registered resource, a missing resource is an error.

pub mod lexer;
pub mod parser;

pub use lexer::{TemplateLexer, TemplateToken};
pub use parser::{parse_template, Fragment};

use crate::context::ExecutionContext;
use crate::error::EvalError;

/// Evaluates every placeholder in `text` against `ctx`.
///
/// Literal text needs no context, but any reference without one fails.
pub fn eval(text: &str, ctx: Option<&ExecutionContext>) -> Result<String, EvalError> {
    let fragments = parse_template(text)?;

    let mut output = String::with_capacity(text.len());
    for fragment in &fragments {
        match fragment {
            Fragment::Text(value) => output.push_str(value),
            Fragment::Reference(reference) => {
                let ctx = ctx.ok_or_else(|| {
                    EvalError::interpolation(
                        text,
                        format!("no execution context to resolve '{}'", reference.trim()),
                    )
                })?;
                output.push_str(&resolve(text, reference.trim(), ctx)?);
            }
        }
    }
    Ok(output)
}

fn resolve(text: &str, reference: &str, ctx: &ExecutionContext) -> Result<String, EvalError> {
    if let Some(name) = reference.strip_prefix("var.") {
        return Ok(ctx.variable(name).unwrap_or_default().to_string());
    }

    let (key, attribute) = match reference.rsplit_once('.') {
        Some((key, attribute)) if !key.is_empty() && !attribute.is_empty() => (key, attribute),
        _ => {
            return Err(EvalError::interpolation(
                text,
                format!("malformed reference {:?}", reference),
            ))
        }
    };

    let resource = ctx.resource_by_reference(key).ok_or_else(|| {
        EvalError::interpolation(text, format!("resource not found: {:?}", key))
    })?;

    Ok(resource.attribute(attribute).unwrap_or_default())
}

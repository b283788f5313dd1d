use super::{interpolate, require, string_field, Meta};
use crate::ast::Block;
use crate::context::ExecutionContext;
use crate::error::EvalError;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    #[default]
    UnixNano,
    Unix,
    Rfc3339,
}

impl TimeFormat {
    fn parse(value: &str, reference: &str) -> Result<Self, EvalError> {
        match value {
            "" | "unixnano" => Ok(TimeFormat::UnixNano),
            "unix" => Ok(TimeFormat::Unix),
            "rfc3339" => Ok(TimeFormat::Rfc3339),
            other => Err(EvalError::validation(
                reference,
                format!(
                    "invalid `format` value {:?}, allowed values are 'unixnano', 'unix' and 'rfc3339'",
                    other
                ),
            )),
        }
    }

    pub fn render(self, now: DateTime<Utc>) -> String {
        match self {
            TimeFormat::UnixNano => now
                .timestamp_nanos_opt()
                .map_or_else(|| now.timestamp().to_string(), |nanos| nanos.to_string()),
            TimeFormat::Unix => now.timestamp().to_string(),
            TimeFormat::Rfc3339 => now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// `resource "system_variable"`: stores a value produced by the runner
/// itself, such as the current time, before a request is sent.
#[derive(Debug)]
pub struct SystemVariable {
    pub(crate) meta: Meta,
    pub variable: String,
    pub format: TimeFormat,
}

impl SystemVariable {
    pub fn new(block: &Block) -> Result<Self, EvalError> {
        let reference = block.reference();
        let mut source = String::new();
        let mut variable = String::new();
        let mut format = String::new();

        for expression in &block.expressions {
            match expression.field_name() {
                "source" => source = string_field(expression, &reference)?,
                "variable" => variable = string_field(expression, &reference)?,
                "format" => format = string_field(expression, &reference)?,
                _ => {}
            }
        }

        require(&source, "source", &reference)?;
        require(&variable, "variable", &reference)?;
        if source != "time" {
            return Err(EvalError::validation(
                &reference,
                format!("invalid `source` value {:?}, allowed values are 'time'", source),
            ));
        }

        Ok(SystemVariable {
            meta: Meta::new(block),
            variable,
            format: TimeFormat::parse(&format, &reference)?,
        })
    }

    /// Only runs ahead of the request, later runs in the same step keep the
    /// first value.
    pub fn exec(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        if ctx.current_response().is_some() {
            return Ok(());
        }

        let variable = interpolate(&self.variable, ctx)?;
        let value = self.format.render(Utc::now());
        debug!("{}: {} = {:?}", self.meta.reference(), variable, value);
        ctx.set_variable(&variable, &value);
        Ok(())
    }
}

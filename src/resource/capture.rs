use super::{interpolate, require, string_field, Meta};
use crate::ast::Block;
use crate::context::ExecutionContext;
use crate::error::EvalError;
use crate::json_path;
use log::debug;
use serde_json::Value as Json;

/// How captured JSON numbers are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericType {
    Int,
    #[default]
    Float,
}

impl NumericType {
    /// Parses `numeric_type`, an empty value means the default.
    pub fn parse(value: &str, reference: &str) -> Result<Self, EvalError> {
        match value {
            "" | "float" => Ok(NumericType::Float),
            "int" => Ok(NumericType::Int),
            other => Err(EvalError::validation(
                reference,
                format!(
                    "invalid `numeric_type` value {:?}, allowed values are 'int' and 'float'",
                    other
                ),
            )),
        }
    }
}

/// Renders a scalar JSON value as a variable value.
pub fn json_to_variable(value: &Json, numeric_type: NumericType) -> Result<String, String> {
    match value {
        Json::Bool(flag) => Ok(flag.to_string()),
        Json::String(text) => Ok(text.clone()),
        Json::Number(number) => {
            let number = number
                .as_f64()
                .ok_or_else(|| "JSON number is out of range".to_string())?;
            Ok(match numeric_type {
                NumericType::Int => format!("{:.0}", number),
                NumericType::Float => format!("{:.6}", number),
            })
        }
        _ => Err("complex JSON fields are not supported".to_string()),
    }
}

/// Reads `path` out of a JSON `body`.
pub fn capture_json(body: &[u8], path: &str, numeric_type: NumericType) -> Result<String, String> {
    let json: Json =
        serde_json::from_slice(body).map_err(|e| format!("unable to decode JSON body: {}", e))?;
    let property = json_path::get_property(&json, path)?;
    json_to_variable(property, numeric_type)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableSource {
    JsonBody,
    Header,
}

/// `resource "http_variable"`: copies a header or JSON body field of the
/// current response into the variable table.
#[derive(Debug)]
pub struct HttpVariable {
    pub(crate) meta: Meta,
    pub source: VariableSource,
    pub property: String,
    pub variable: String,
    pub numeric_type: NumericType,
}

impl HttpVariable {
    pub fn new(block: &Block) -> Result<Self, EvalError> {
        let reference = block.reference();
        let mut source = String::new();
        let mut property = String::new();
        let mut variable = String::new();
        let mut numeric_type = String::new();

        for expression in &block.expressions {
            match expression.field_name() {
                "source" => source = string_field(expression, &reference)?,
                "property" => property = string_field(expression, &reference)?,
                "variable" => variable = string_field(expression, &reference)?,
                "numeric_type" => numeric_type = string_field(expression, &reference)?,
                _ => {}
            }
        }

        require(&source, "source", &reference)?;
        require(&variable, "variable", &reference)?;
        require(&property, "property", &reference)?;
        let numeric_type = NumericType::parse(&numeric_type, &reference)?;

        let source = match source.as_str() {
            "json_body" => VariableSource::JsonBody,
            "header" => VariableSource::Header,
            other => {
                return Err(EvalError::validation(
                    &reference,
                    format!(
                        "invalid `source` value {:?}, allowed values are 'json_body' and 'header'",
                        other
                    ),
                ))
            }
        };

        Ok(HttpVariable {
            meta: Meta::new(block),
            source,
            property,
            variable,
            numeric_type,
        })
    }

    /// Captures nothing until the step has a response.
    pub fn exec(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        let response = match ctx.current_response() {
            Some(response) => response,
            None => return Ok(()),
        };

        let variable = interpolate(&self.variable, ctx)?;
        let property = interpolate(&self.property, ctx)?;

        let value = match self.source {
            VariableSource::Header => match response.header(&property) {
                Some(value) => value.to_string(),
                None => return Ok(()),
            },
            VariableSource::JsonBody => {
                capture_json(&response.body, &property, self.numeric_type)
                    .map_err(|message| EvalError::capture(self.meta.reference(), message))?
            }
        };

        debug!("{}: {} = {:?}", self.meta.reference(), variable, value);
        ctx.set_variable(&variable, &value);
        Ok(())
    }
}

/// `resource "http_outlet_header"`: copies the response header named by
/// `source` into `variable`.
#[derive(Debug)]
pub struct OutletHeader {
    pub(crate) meta: Meta,
    pub source: String,
    pub variable: String,
}

impl OutletHeader {
    pub fn new(block: &Block) -> Result<Self, EvalError> {
        let reference = block.reference();
        let mut source = String::new();
        let mut variable = String::new();

        for expression in &block.expressions {
            match expression.field_name() {
                "source" => source = string_field(expression, &reference)?,
                "variable" => variable = string_field(expression, &reference)?,
                _ => {}
            }
        }

        require(&source, "source", &reference)?;
        require(&variable, "variable", &reference)?;

        Ok(OutletHeader {
            meta: Meta::new(block),
            source,
            variable,
        })
    }

    pub fn exec(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        let response = match ctx.current_response() {
            Some(response) => response,
            None => return Ok(()),
        };

        let name = interpolate(&self.source, ctx)?;
        let variable = interpolate(&self.variable, ctx)?;
        if let Some(value) = response.header(&name).map(str::to_string) {
            debug!("{}: {} = {:?}", self.meta.reference(), variable, value);
            ctx.set_variable(&variable, &value);
        }
        Ok(())
    }
}

/// `resource "http_outlet_json_field"`: copies the JSON body field at `path`
/// into `variable`.
#[derive(Debug)]
pub struct OutletJsonField {
    pub(crate) meta: Meta,
    pub path: String,
    pub variable: String,
    pub numeric_type: NumericType,
}

impl OutletJsonField {
    pub fn new(block: &Block) -> Result<Self, EvalError> {
        let reference = block.reference();
        let mut path = String::new();
        let mut variable = String::new();
        let mut numeric_type = String::new();

        for expression in &block.expressions {
            match expression.field_name() {
                "path" => path = string_field(expression, &reference)?,
                "variable" => variable = string_field(expression, &reference)?,
                "numeric_type" => numeric_type = string_field(expression, &reference)?,
                _ => {}
            }
        }

        require(&path, "path", &reference)?;
        require(&variable, "variable", &reference)?;

        Ok(OutletJsonField {
            meta: Meta::new(block),
            path,
            variable,
            numeric_type: NumericType::parse(&numeric_type, &reference)?,
        })
    }

    pub fn exec(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        let response = match ctx.current_response() {
            Some(response) => response,
            None => return Ok(()),
        };

        let path = interpolate(&self.path, ctx)?;
        let variable = interpolate(&self.variable, ctx)?;
        let value = capture_json(&response.body, &path, self.numeric_type)
            .map_err(|message| EvalError::capture(self.meta.reference(), message))?;

        debug!("{}: {} = {:?}", self.meta.reference(), variable, value);
        ctx.set_variable(&variable, &value);
        Ok(())
    }
}

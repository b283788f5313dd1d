use super::{interpolate, require, string_field, Meta};
use crate::ast::Block;
use crate::context::ExecutionContext;
use crate::error::EvalError;
use crate::http::HttpResponse;
use crate::json_path;
use serde_json::Value as Json;

/// Part of the response an assertion inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    StatusCode,
    Body,
    Header,
    JsonBody,
}

impl Source {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "status_code" => Some(Source::StatusCode),
            "body" => Some(Source::Body),
            "header" => Some(Source::Header),
            "json_body" => Some(Source::JsonBody),
            _ => None,
        }
    }

    pub fn requires_property(self) -> bool {
        matches!(self, Source::Header | Source::JsonBody)
    }

    /// Comparisons that make sense for this source.
    pub fn comparisons(self) -> &'static [Comparison] {
        use Comparison::*;
        match self {
            Source::StatusCode => &[
                Equals,
                DoesNotEqual,
                LessThan,
                LessThanOrEqual,
                GreaterThan,
                GreaterThanOrEqual,
            ],
            Source::Body | Source::Header => &[
                IsEmpty,
                IsNotEmpty,
                Equals,
                DoesNotEqual,
                Contains,
                DoesNotContain,
            ],
            Source::JsonBody => &[
                Equals,
                DoesNotEqual,
                LessThan,
                LessThanOrEqual,
                GreaterThan,
                GreaterThanOrEqual,
                Contains,
                DoesNotContain,
                IsEmpty,
                IsNotEmpty,
                HasKey,
                HasValue,
                EqualsNumber,
                IsNull,
                IsANumber,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    DoesNotEqual,
    Contains,
    DoesNotContain,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    IsEmpty,
    IsNotEmpty,
    HasKey,
    HasValue,
    EqualsNumber,
    IsNull,
    IsANumber,
}

impl Comparison {
    pub fn from_name(name: &str) -> Option<Self> {
        let comparison = match name {
            "equals" => Comparison::Equals,
            "does_not_equal" => Comparison::DoesNotEqual,
            "contains" => Comparison::Contains,
            "does_not_contain" => Comparison::DoesNotContain,
            "less_than" => Comparison::LessThan,
            "less_than_or_equal" => Comparison::LessThanOrEqual,
            "greater_than" => Comparison::GreaterThan,
            "greater_than_or_equal" => Comparison::GreaterThanOrEqual,
            "is_empty" => Comparison::IsEmpty,
            "is_not_empty" => Comparison::IsNotEmpty,
            "has_key" => Comparison::HasKey,
            "has_value" => Comparison::HasValue,
            "equals_number" => Comparison::EqualsNumber,
            "is_null" => Comparison::IsNull,
            "is_a_number" => Comparison::IsANumber,
            _ => return None,
        };
        Some(comparison)
    }

    pub fn name(self) -> &'static str {
        match self {
            Comparison::Equals => "equals",
            Comparison::DoesNotEqual => "does_not_equal",
            Comparison::Contains => "contains",
            Comparison::DoesNotContain => "does_not_contain",
            Comparison::LessThan => "less_than",
            Comparison::LessThanOrEqual => "less_than_or_equal",
            Comparison::GreaterThan => "greater_than",
            Comparison::GreaterThanOrEqual => "greater_than_or_equal",
            Comparison::IsEmpty => "is_empty",
            Comparison::IsNotEmpty => "is_not_empty",
            Comparison::HasKey => "has_key",
            Comparison::HasValue => "has_value",
            Comparison::EqualsNumber => "equals_number",
            Comparison::IsNull => "is_null",
            Comparison::IsANumber => "is_a_number",
        }
    }

    pub fn requires_target(self) -> bool {
        !matches!(
            self,
            Comparison::IsEmpty
                | Comparison::IsNotEmpty
                | Comparison::IsNull
                | Comparison::IsANumber
                | Comparison::HasKey
                | Comparison::HasValue
        )
    }
}

/// `resource "http_assertion"`: `source`, `property`, `comparison` and
/// `target` checked against the current response.
#[derive(Debug)]
pub struct HttpAssertion {
    pub(crate) meta: Meta,
    pub source: Source,
    pub property: String,
    pub comparison: Comparison,
    pub target: String,
}

impl HttpAssertion {
    pub fn new(block: &Block) -> Result<Self, EvalError> {
        let reference = block.reference();
        let mut source = String::new();
        let mut property = String::new();
        let mut comparison = String::new();
        let mut target = String::new();

        for expression in &block.expressions {
            match expression.field_name() {
                "source" => source = string_field(expression, &reference)?,
                "property" => property = string_field(expression, &reference)?,
                "comparison" => comparison = string_field(expression, &reference)?,
                "target" => target = string_field(expression, &reference)?,
                _ => {}
            }
        }

        let source = Source::from_name(&source).ok_or_else(|| {
            EvalError::validation(&reference, format!("invalid `source` value {:?}", source))
        })?;

        if source.requires_property() {
            require(&property, "property", &reference)?;
        }

        let comparison = Comparison::from_name(&comparison)
            .filter(|c| source.comparisons().contains(c))
            .ok_or_else(|| {
                EvalError::validation(
                    &reference,
                    format!("invalid `comparison` value {:?}", comparison),
                )
            })?;

        if comparison.requires_target() && target.is_empty() {
            return Err(EvalError::validation(
                &reference,
                format!("`target` is required for `{}`", comparison.name()),
            ));
        }

        Ok(HttpAssertion {
            meta: Meta::new(block),
            source,
            property,
            comparison,
            target,
        })
    }

    pub fn exec(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        let target = interpolate(&self.target, ctx)?;
        let property = interpolate(&self.property, ctx)?;
        let response = self.response(ctx)?;

        let outcome = match self.source {
            Source::StatusCode => assert_status_code(self.comparison, response.status, &target),
            Source::Body => {
                let body = String::from_utf8_lossy(&response.body);
                assert_text(self.comparison, &body, &target)
            }
            Source::Header => {
                let value = response.header(&property).unwrap_or_default();
                assert_text(self.comparison, value, &target)
            }
            Source::JsonBody => self.assert_json_body(&response.body, &property, &target),
        };

        outcome.map_err(|message| EvalError::assertion(self.meta.reference(), message))
    }

    fn response<'a>(&self, ctx: &'a ExecutionContext) -> Result<&'a HttpResponse, EvalError> {
        ctx.current_response().ok_or_else(|| {
            EvalError::assertion(self.meta.reference(), "there is no response to assert against")
        })
    }

    fn assert_json_body(&self, body: &[u8], path: &str, target: &str) -> Result<(), String> {
        let json: Json = serde_json::from_slice(body)
            .map_err(|e| format!("unable to decode JSON body: {}", e))?;
        let property = json_path::get_property(&json, path)?;
        assert_json(self.comparison, property, target)
    }
}

fn failed(comparison: Comparison, detail: impl std::fmt::Display) -> String {
    format!("{} comparison failed, {}", comparison.name(), detail)
}

fn assert_status_code(comparison: Comparison, status: u16, target: &str) -> Result<(), String> {
    let code = status.to_string();
    match comparison {
        Comparison::Equals if code != target => {
            Err(failed(comparison, format!("{} != {}", code, target)))
        }
        Comparison::DoesNotEqual if code == target => {
            Err(failed(comparison, format!("{} == {}", code, target)))
        }
        Comparison::Equals | Comparison::DoesNotEqual => Ok(()),
        Comparison::LessThan
        | Comparison::LessThanOrEqual
        | Comparison::GreaterThan
        | Comparison::GreaterThanOrEqual => {
            let bound: i64 = target
                .trim()
                .parse()
                .map_err(|_| failed(comparison, format!("{:?} is not a status code", target)))?;
            compare_numbers(comparison, f64::from(status), bound as f64)
        }
        _ => Err(format!("comparison {} is not supported for status codes", comparison.name())),
    }
}

fn compare_numbers(comparison: Comparison, value: f64, bound: f64) -> Result<(), String> {
    let (holds, operator) = match comparison {
        Comparison::LessThan => (value < bound, ">="),
        Comparison::LessThanOrEqual => (value <= bound, ">"),
        Comparison::GreaterThan => (value > bound, "<="),
        Comparison::GreaterThanOrEqual => (value >= bound, "<"),
        Comparison::EqualsNumber => (value == bound, "!="),
        _ => return Err(format!("comparison {} is not numeric", comparison.name())),
    };

    if holds {
        Ok(())
    } else {
        Err(failed(comparison, format!("{} {} {}", value, operator, bound)))
    }
}

/// Text comparison shared by the `body` and `header` sources. `contains`
/// and `does_not_contain` reject an empty target.
pub fn assert_text(comparison: Comparison, value: &str, target: &str) -> Result<(), String> {
    match comparison {
        Comparison::IsEmpty if !value.is_empty() => {
            Err(failed(comparison, format!("length {}", value.len())))
        }
        Comparison::IsNotEmpty if value.is_empty() => Err(failed(comparison, "value is empty")),
        Comparison::Equals if value != target => {
            Err(failed(comparison, format!("{:?} != {:?}", value, target)))
        }
        Comparison::DoesNotEqual if value == target => {
            Err(failed(comparison, format!("{:?} == {:?}", value, target)))
        }
        Comparison::Contains | Comparison::DoesNotContain if target.is_empty() => Err(format!(
            "{} comparison does not support an empty target",
            comparison.name()
        )),
        Comparison::Contains if !value.contains(target) => {
            Err(failed(comparison, format!("{:?} not in {:?}", target, value)))
        }
        Comparison::DoesNotContain if value.contains(target) => {
            Err(failed(comparison, format!("{:?} in {:?}", target, value)))
        }
        Comparison::IsEmpty
        | Comparison::IsNotEmpty
        | Comparison::Equals
        | Comparison::DoesNotEqual
        | Comparison::Contains
        | Comparison::DoesNotContain => Ok(()),
        _ => Err(format!("comparison {} is not supported for text", comparison.name())),
    }
}

fn assert_json(comparison: Comparison, property: &Json, target: &str) -> Result<(), String> {
    match comparison {
        Comparison::Equals | Comparison::DoesNotEqual => {
            let value = json_to_text(property)?;
            assert_text(comparison, &value, target)
        }
        Comparison::LessThan
        | Comparison::LessThanOrEqual
        | Comparison::GreaterThan
        | Comparison::GreaterThanOrEqual
        | Comparison::EqualsNumber => {
            let value = json_to_number(property).map_err(|e| failed(comparison, e))?;
            let bound: f64 = target
                .trim()
                .parse()
                .map_err(|_| failed(comparison, format!("{:?} is not a number", target)))?;
            compare_numbers(comparison, value, bound)
        }
        Comparison::Contains | Comparison::DoesNotContain => match property {
            Json::String(value) => assert_substring(comparison, value, target),
            _ => Err(failed(comparison, "JSON property is not a string")),
        },
        Comparison::IsEmpty => match property {
            Json::Null => Ok(()),
            Json::String(value) => assert_text(comparison, value, target),
            _ => Err(failed(comparison, "JSON property is not a string")),
        },
        Comparison::IsNotEmpty => match property {
            Json::Null => Err(failed(comparison, "property is null")),
            Json::String(value) => assert_text(comparison, value, target),
            _ => Err(failed(comparison, "JSON property is not a string")),
        },
        Comparison::HasKey => match property {
            Json::Object(map) if map.contains_key(target) => Ok(()),
            Json::Object(_) => {
                Err(failed(comparison, format!("JSON object has no {:?} key", target)))
            }
            _ => Err(failed(comparison, "property is not an object")),
        },
        Comparison::HasValue => match property {
            Json::Array(items) if items.iter().any(|item| item.as_str() == Some(target)) => Ok(()),
            Json::Array(_) => Err(failed(comparison, format!("{:?} is not in the list", target))),
            _ => Err(failed(comparison, "property is not a list")),
        },
        Comparison::IsNull => match property {
            Json::Null => Ok(()),
            other => Err(failed(comparison, format!("property is {}", other))),
        },
        Comparison::IsANumber => json_to_number(property)
            .map(|_| ())
            .map_err(|e| failed(comparison, e)),
    }
}

/// Scalar JSON value as text. Numbers use six decimals.
/// Plain substring test for JSON string properties. Every string contains
/// the empty string.
fn assert_substring(comparison: Comparison, value: &str, target: &str) -> Result<(), String> {
    let found = value.contains(target);
    match comparison {
        Comparison::Contains if !found => {
            Err(failed(comparison, format!("{:?} not in {:?}", target, value)))
        }
        Comparison::DoesNotContain if found => {
            Err(failed(comparison, format!("{:?} in {:?}", target, value)))
        }
        _ => Ok(()),
    }
}

fn json_to_text(property: &Json) -> Result<String, String> {
    match property {
        Json::Bool(value) => Ok(value.to_string()),
        Json::String(value) => Ok(value.clone()),
        Json::Number(_) => Ok(format!("{:.6}", json_to_number(property)?)),
        _ => Err("complex JSON fields are not supported".to_string()),
    }
}

fn json_to_number(property: &Json) -> Result<f64, String> {
    property
        .as_f64()
        .ok_or_else(|| "JSON property is not a number".to_string())
}

/// `resource "http_assertion_status_code"`: shorthand for an `equals`
/// check on the status code.
#[derive(Debug)]
pub struct StatusCodeAssertion {
    pub(crate) meta: Meta,
    pub equals: String,
}

impl StatusCodeAssertion {
    pub fn new(block: &Block) -> Result<Self, EvalError> {
        let reference = block.reference();
        let mut equals = String::new();
        for expression in &block.expressions {
            if expression.field_name() == "equals" {
                equals = string_field(expression, &reference)?;
            }
        }
        require(&equals, "equals", &reference)?;

        Ok(StatusCodeAssertion {
            meta: Meta::new(block),
            equals,
        })
    }

    pub fn exec(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        let reference = self.meta.reference();
        let equals = interpolate(&self.equals, ctx)?;
        let response = ctx.current_response().ok_or_else(|| {
            EvalError::assertion(reference, "there is no response to assert against")
        })?;

        assert_status_code(Comparison::Equals, response.status, &equals)
            .map_err(|message| EvalError::assertion(reference, message))
    }
}

/// `resource "http_assertion_body"`: shorthand for an `equals` check on the
/// raw body.
#[derive(Debug)]
pub struct BodyAssertion {
    pub(crate) meta: Meta,
    pub equals: String,
}

impl BodyAssertion {
    pub fn new(block: &Block) -> Result<Self, EvalError> {
        let reference = block.reference();
        let mut equals = String::new();
        for expression in &block.expressions {
            if expression.field_name() == "equals" {
                equals = string_field(expression, &reference)?;
            }
        }
        require(&equals, "equals", &reference)?;

        Ok(BodyAssertion {
            meta: Meta::new(block),
            equals,
        })
    }

    pub fn exec(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        let reference = self.meta.reference();
        let equals = interpolate(&self.equals, ctx)?;
        let response = ctx.current_response().ok_or_else(|| {
            EvalError::assertion(reference, "there is no response to assert against")
        })?;
        let body = String::from_utf8_lossy(&response.body);

        assert_text(Comparison::Equals, &body, &equals)
            .map_err(|message| EvalError::assertion(reference, message))
    }
}

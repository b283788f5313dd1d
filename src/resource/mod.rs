//! Runtime resources built from `resource` blocks.
//!
//! Every resource moves through Unlinked -> Linked -> Executed. Factories are
//! pure functions of the block, the context is only touched by `link` and
//! `exec`.

pub mod capture;
pub mod http_assertion;
pub mod http_step;
pub mod system_variable;

pub use capture::{HttpVariable, NumericType, OutletHeader, OutletJsonField};
pub use http_assertion::{
    assert_text, BodyAssertion, Comparison, HttpAssertion, Source, StatusCodeAssertion,
};
pub use http_step::HttpStep;
pub use http_test::HttpTest;
pub use system_variable::SystemVariable;

use crate::ast::{Block, Expression};
use crate::context::ExecutionContext;
use crate::error::EvalError;
use crate::interpolator;
use crate::proxy::Proxy;
use std::collections::HashMap;
use uuid::Uuid;

/// Constructor of one resource kind.
pub type Factory = fn(&Block) -> Result<Resource, EvalError>;

/// Driver name to factory, for every supported resource kind.
pub fn factory_table() -> HashMap<&'static str, Factory> {
    let mut table: HashMap<&'static str, Factory> = HashMap::new();
    table.insert("http_step", |block| Ok(Resource::HttpStep(HttpStep::new(block)?)));
    table.insert("http_test", |block| Ok(Resource::HttpTest(HttpTest::new(block)?)));
    table.insert("http_assertion", |block| {
        Ok(Resource::HttpAssertion(HttpAssertion::new(block)?))
    });
    table.insert("http_assertion_status_code", |block| {
        Ok(Resource::StatusCodeAssertion(StatusCodeAssertion::new(block)?))
    });
    table.insert("http_assertion_body", |block| {
        Ok(Resource::BodyAssertion(BodyAssertion::new(block)?))
    });
    table.insert("http_variable", |block| {
        Ok(Resource::HttpVariable(HttpVariable::new(block)?))
    });
    table.insert("system_variable", |block| {
        Ok(Resource::SystemVariable(SystemVariable::new(block)?))
    });
    table.insert("http_outlet_header", |block| {
        Ok(Resource::OutletHeader(OutletHeader::new(block)?))
    });
    table.insert("http_outlet_json_field", |block| {
        Ok(Resource::OutletJsonField(OutletJsonField::new(block)?))
    });
    table
}

/// Data shared by every resource kind: the defining block, its reference
/// key and the attribute map readable through `${...}`.
#[derive(Debug)]
pub struct Meta {
    block: Block,
    reference: String,
    attributes: HashMap<String, String>,
}

impl Meta {
    pub fn new(block: &Block) -> Self {
        let reference = block.reference();

        let mut attributes = HashMap::new();
        attributes.insert("id".to_string(), Uuid::new_v4().to_string());
        attributes.insert("ref".to_string(), format!("${{{}.ref}}", reference));
        attributes.insert("name".to_string(), block.name.text.clone());
        attributes.insert("driver".to_string(), block.driver.text.clone());

        Self {
            block: block.clone(),
            reference,
            attributes,
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug)]
pub enum Resource {
    HttpStep(HttpStep),
    HttpTest(HttpTest),
    HttpAssertion(HttpAssertion),
    StatusCodeAssertion(StatusCodeAssertion),
    BodyAssertion(BodyAssertion),
    HttpVariable(HttpVariable),
    SystemVariable(SystemVariable),
    OutletHeader(OutletHeader),
    OutletJsonField(OutletJsonField),
}

impl Resource {
    pub fn meta(&self) -> &Meta {
        match self {
            Resource::HttpStep(r) => &r.meta,
            Resource::HttpTest(r) => &r.meta,
            Resource::HttpAssertion(r) => &r.meta,
            Resource::StatusCodeAssertion(r) => &r.meta,
            Resource::BodyAssertion(r) => &r.meta,
            Resource::HttpVariable(r) => &r.meta,
            Resource::SystemVariable(r) => &r.meta,
            Resource::OutletHeader(r) => &r.meta,
            Resource::OutletJsonField(r) => &r.meta,
        }
    }

    pub fn reference(&self) -> &str {
        self.meta().reference()
    }

    pub fn id(&self) -> &str {
        self.meta().attribute("id").unwrap_or_default()
    }

    pub fn block(&self) -> &Block {
        self.meta().block()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.meta().attribute(name).map(str::to_string)
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Resource::HttpTest(_))
    }

    /// Resolves the resource's own proxies. Targets only need to be
    /// registered, not linked.
    pub fn link(&self, ctx: &ExecutionContext) -> Result<(), EvalError> {
        match self {
            Resource::HttpStep(r) => r.link(ctx),
            Resource::HttpTest(r) => r.link(ctx),
            _ => Ok(()),
        }
    }

    pub fn exec(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        match self {
            Resource::HttpStep(r) => r.exec(ctx),
            Resource::HttpTest(r) => r.exec(ctx),
            Resource::HttpAssertion(r) => r.exec(ctx),
            Resource::StatusCodeAssertion(r) => r.exec(ctx),
            Resource::BodyAssertion(r) => r.exec(ctx),
            Resource::HttpVariable(r) => r.exec(ctx),
            Resource::SystemVariable(r) => r.exec(ctx),
            Resource::OutletHeader(r) => r.exec(ctx),
            Resource::OutletJsonField(r) => r.exec(ctx),
        }
    }
}

fn interpolate(text: &str, ctx: &ExecutionContext) -> Result<String, EvalError> {
    interpolator::eval(text, Some(ctx))
}

fn string_field(expression: &Expression, reference: &str) -> Result<String, EvalError> {
    expression.value_as_string(reference).map(str::to_string)
}

fn proxy_list(expression: &Expression, reference: &str) -> Result<Vec<Proxy>, EvalError> {
    let list = expression.value_as_list(reference)?;
    Ok(list.items.iter().map(|item| Proxy::new(&item.text)).collect())
}

fn require(value: &str, field: &str, reference: &str) -> Result<(), EvalError> {
    if value.is_empty() {
        return Err(EvalError::validation(reference, format!("`{}` is required", field)));
    }
    Ok(())
}

fn link_all(proxies: &[Proxy], ctx: &ExecutionContext, owner: &str) -> Result<(), EvalError> {
    for proxy in proxies {
        proxy.resolve(ctx, owner)?;
    }
    Ok(())
}

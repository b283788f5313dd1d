use super::{interpolate, link_all, proxy_list, require, string_field, Meta};
use crate::ast::Block;
use crate::context::ExecutionContext;
use crate::error::EvalError;
use crate::http::HttpRequest;
use crate::proxy::Proxy;
use log::{debug, info};

/// `resource "http_step"`: one HTTP request with its assertions and captures.
#[derive(Debug)]
pub struct HttpStep {
    pub(crate) meta: Meta,
    pub method: String,
    pub url: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
    pub assertions: Vec<Proxy>,
    pub variables: Vec<Proxy>,
}

impl HttpStep {
    pub fn new(block: &Block) -> Result<Self, EvalError> {
        let reference = block.reference();
        let mut step = HttpStep {
            meta: Meta::new(block),
            method: String::new(),
            url: String::new(),
            body: String::new(),
            headers: Vec::new(),
            assertions: Vec::new(),
            variables: Vec::new(),
        };

        for expression in &block.expressions {
            match expression.field_name() {
                "method" => step.method = string_field(expression, &reference)?,
                "url" => step.url = string_field(expression, &reference)?,
                "body" => step.body = string_field(expression, &reference)?,
                "assertions" => step.assertions = proxy_list(expression, &reference)?,
                "variables" => step.variables = proxy_list(expression, &reference)?,
                "headers" => {
                    let list = expression.value_as_list(&reference)?;
                    if list.items.len() % 2 != 0 {
                        return Err(EvalError::validation(
                            &reference,
                            "`headers` must contain an even number of items",
                        ));
                    }
                    step.headers = list
                        .items
                        .chunks(2)
                        .map(|pair| (pair[0].text.clone(), pair[1].text.clone()))
                        .collect();
                }
                _ => {}
            }
        }

        require(&step.method, "method", &reference)?;
        require(&step.url, "url", &reference)?;
        Ok(step)
    }

    pub fn link(&self, ctx: &ExecutionContext) -> Result<(), EvalError> {
        let reference = self.meta.reference();
        link_all(&self.assertions, ctx, reference)?;
        link_all(&self.variables, ctx, reference)
    }

    pub fn exec(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        info!("executing {}", self.meta.reference());

        // Each step starts without a response, so captures run before the request
        ctx.clear_response();
        for proxy in &self.variables {
            proxy.target()?.exec(ctx)?;
        }

        let mut request = HttpRequest {
            method: interpolate(&self.method, ctx)?,
            url: interpolate(&self.url, ctx)?,
            headers: Vec::with_capacity(self.headers.len()),
            body: interpolate(&self.body, ctx)?,
        };
        for (name, value) in &self.headers {
            request.set_header(interpolate(name, ctx)?, interpolate(value, ctx)?);
        }

        let response = ctx.transport().send(&request)?;
        debug!(
            "{}: {} {} returned {}",
            self.meta.reference(),
            request.method,
            request.url,
            response.status
        );
        ctx.set_response(response);

        for proxy in &self.assertions {
            proxy.target()?.exec(ctx)?;
        }

        // Capture again now that the response is available
        for proxy in &self.variables {
            proxy.target()?.exec(ctx)?;
        }
        Ok(())
    }
}

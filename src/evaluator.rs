use crate::ast::{Block, Document};
use crate::config::{Globals, RunConfig};
use crate::context::ExecutionContext;
use crate::error::EvalError;
use crate::http::Transport;
use crate::linker;
use crate::resource::{self, Factory};
use log::{error, info};
use std::collections::HashMap;
use std::rc::Rc;

/// Prefix of the reference keys the runner executes.
pub const TEST_PREFIX: &str = "resource.http_test.";

/// Outcome of a run that got past loading and linking.
#[derive(Debug, Default)]
pub struct RunReport {
    pub executed: Vec<String>,
    pub failures: Vec<(String, EvalError)>,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.executed.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Turns a parsed document into linked resources and runs its tests.
pub struct Evaluator {
    factories: HashMap<&'static str, Factory>,
    transport: Rc<dyn Transport>,
    config: RunConfig,
}

impl Evaluator {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self::with_config(transport, RunConfig::default())
    }

    pub fn with_config(transport: Rc<dyn Transport>, config: RunConfig) -> Self {
        Self {
            factories: resource::factory_table(),
            transport,
            config,
        }
    }

    pub fn globals(&self, document: &Document) -> Result<Globals, EvalError> {
        Globals::from_document(document, |name| self.config.override_for(name))
    }

    /// Builds every resource of `document` into a fresh context seeded with
    /// the global variables, then links them.
    pub fn load(&self, document: &Document) -> Result<ExecutionContext, EvalError> {
        let globals = self.globals(document)?;
        self.load_seeded(document, &globals)
    }

    fn load_seeded(
        &self,
        document: &Document,
        globals: &Globals,
    ) -> Result<ExecutionContext, EvalError> {
        let mut ctx = ExecutionContext::new(Rc::clone(&self.transport));
        seed(&mut ctx, globals);

        for block in &document.blocks {
            match block.id.name.as_str() {
                "variable" => {}
                "resource" => {
                    let resource = self.build(block)?;
                    ctx.add_resource(resource)?;
                }
                other => {
                    return Err(EvalError::UnknownBlock {
                        id: other.to_string(),
                        reference: block.reference(),
                    })
                }
            }
        }

        linker::link(&ctx)?;
        Ok(ctx)
    }

    fn build(&self, block: &Block) -> Result<resource::Resource, EvalError> {
        let factory = self
            .factories
            .get(block.driver.text.as_str())
            .ok_or_else(|| EvalError::UnknownDriver {
                driver: block.driver.text.clone(),
                reference: block.reference(),
            })?;
        factory(block)
    }

    /// Runs the tests of `document` in declaration order.
    ///
    /// Loading and linking errors end the run. A failing test is recorded
    /// and the remaining tests still run. Without a filter each test gets its
    /// own context copy, a filtered run executes the single match on the
    /// loaded context.
    pub fn run(&self, document: &Document) -> Result<RunReport, EvalError> {
        let globals = self.globals(document)?;
        let mut ctx = self.load_seeded(document, &globals)?;
        let mut report = RunReport::default();

        if let Some(filter) = &self.config.filter {
            let test = ctx
                .resource_by_reference(filter)
                .filter(|resource| resource.is_test())
                .ok_or_else(|| EvalError::TestNotFound(filter.clone()))?;

            report.executed.push(filter.clone());
            if let Err(e) = test.exec(&mut ctx) {
                error!("{} failed: {}", filter, e);
                report.failures.push((filter.clone(), e));
            }
            return Ok(report);
        }

        let tests: Vec<_> = ctx
            .registry()
            .iter()
            .filter(|(reference, resource)| {
                reference.starts_with(TEST_PREFIX) && resource.is_test()
            })
            .map(|(reference, resource)| (reference.to_string(), Rc::clone(resource)))
            .collect();

        for (reference, test) in tests {
            let mut isolated = ctx.copy();
            seed(&mut isolated, &globals);

            report.executed.push(reference.clone());
            if let Err(e) = test.exec(&mut isolated) {
                error!("{} failed: {}", reference, e);
                report.failures.push((reference, e));
            }
        }

        info!("{} tests run, {} failed", report.total(), report.failed());
        Ok(report)
    }

    /// Like `run`, but any failed test makes the whole run an error.
    pub fn exec(&self, document: &Document) -> Result<(), EvalError> {
        let report = self.run(document)?;
        if report.is_success() {
            Ok(())
        } else {
            Err(EvalError::TestsFailed {
                failed: report.failed(),
                total: report.total(),
            })
        }
    }
}

fn seed(ctx: &mut ExecutionContext, globals: &Globals) {
    for (name, value) in globals.iter() {
        ctx.set_variable(name, value);
    }
}

/// Reference keys of every `http_test` resource block, in declaration order.
/// A key declared twice is listed once.
pub fn list_tests(document: &Document) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for reference in document.blocks.iter().map(Block::reference) {
        if reference.starts_with(TEST_PREFIX) && !keys.contains(&reference) {
            keys.push(reference);
        }
    }
    keys
}

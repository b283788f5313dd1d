use crate::ast::Document;
use crate::config::RunConfig;
use crate::evaluator::{list_tests, Evaluator};
use crate::http::Transport;
use crate::parser;
use log::error;
use std::rc::Rc;

/// Parses `source`, printing a diagnostic on failure.
pub fn parse(source: &str, filename: Option<&str>) -> Option<Document> {
    match parser::parse(source) {
        Ok(document) => Some(document),
        Err(e) => {
            e.report(source, filename);
            None
        }
    }
}

/// Prints the test keys of `source`. Returns the process exit code.
pub fn list(source: &str, filename: Option<&str>) -> i32 {
    let document = match parse(source, filename) {
        Some(document) => document,
        None => return 1,
    };

    for key in list_tests(&document) {
        println!("{}", key);
    }
    0
}

/// Runs the tests of `source`. Returns the process exit code.
pub fn run(
    source: &str,
    filename: Option<&str>,
    transport: Rc<dyn Transport>,
    config: RunConfig,
) -> i32 {
    let document = match parse(source, filename) {
        Some(document) => document,
        None => return 1,
    };

    match Evaluator::with_config(transport, config).exec(&document) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

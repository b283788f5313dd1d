// Shared helpers for the integration tests.

#![allow(dead_code)]

use bluebook::error::TransportError;
use bluebook::http::{HttpRequest, HttpResponse, Transport};
use bluebook::{parse, Document};
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory transport answering by exact URL and recording every request.
#[derive(Default)]
pub struct StubTransport {
    routes: Vec<(String, HttpResponse)>,
    pub requests: RefCell<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, response: HttpResponse) -> Self {
        self.routes.push((url.to_string(), response));
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.url.clone()).collect()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.routes
            .iter()
            .find(|(url, _)| *url == request.url)
            .map(|(_, response)| response.clone())
            .ok_or_else(|| TransportError::Request {
                url: request.url.clone(),
                message: "connection refused".to_string(),
            })
    }
}

/// A stub kept by the test alongside the trait object handed to the runner.
pub fn stub(transport: StubTransport) -> (Rc<StubTransport>, Rc<dyn Transport>) {
    let stub = Rc::new(transport);
    let shared: Rc<dyn Transport> = stub.clone();
    (stub, shared)
}

pub fn document(source: &str) -> Document {
    match parse(source) {
        Ok(document) => document,
        Err(e) => panic!("test document does not parse: {}", e),
    }
}

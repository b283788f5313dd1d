// Bluebook library
//
// BCL, a block configuration language, and the runner that turns BCL
// documents into HTTP API tests.

// Public modules
pub mod ast;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod http;
pub mod interpolator;
pub mod json_path;
pub mod lexer;
pub mod linker;
pub mod parser;
pub mod proxy;
pub mod resource;
pub mod runner;

// Re-export commonly used items
pub use ast::{Block, Document, Expression};
pub use config::{Globals, RunConfig};
pub use context::{ExecutionContext, Registry};
pub use error::{BclError, EvalError, Span, TransportError};
pub use evaluator::{list_tests, Evaluator, RunReport};
pub use http::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{parse, Parser};
pub use proxy::Proxy;
pub use resource::Resource;

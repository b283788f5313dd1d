use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    LexError,
    ParseError,
}

/// Syntax error raised while reading a BCL document.
#[derive(Debug, Clone)]
pub struct BclError {
    pub kind: ErrorKind,
    pub span: Span,
    pub line: usize,
    pub message: String,
    pub help: Option<String>,
}

impl BclError {
    pub fn new(kind: ErrorKind, span: Span, line: usize, message: String) -> Self {
        Self {
            kind,
            span,
            line,
            message,
            help: None,
        }
    }

    pub fn lex_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::LexError, span, line, message)
    }

    pub fn parse_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::ParseError, span, line, message)
    }

    pub fn parse_error_with_help(span: Span, line: usize, message: String, help: String) -> Self {
        Self {
            help: Some(help),
            ..Self::new(ErrorKind::ParseError, span, line, message)
        }
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<input>");

        let color = match self.kind {
            ErrorKind::LexError => Color::Red,
            ErrorKind::ParseError => Color::Yellow,
        };

        let kind_str = match self.kind {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::ParseError => "Parse Error",
        };

        // Spans at end of input point one past the last byte
        let end = self.span.end.min(source.len());
        let start = self.span.start.min(end);

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        // Reporting is best effort, fall back to plain text if stderr is gone
        if report_builder
            .finish()
            .eprint((filename, Source::from(source)))
            .is_err()
        {
            eprintln!("{}", self);
        }
    }
}

impl fmt::Display for BclError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for BclError {}

/// Failure of the HTTP collaborator.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Errors raised while building, linking and executing resources.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("{reference}: {message}")]
    Validation { reference: String, message: String },

    #[error("unknown resource driver {driver:?} in {reference}")]
    UnknownDriver { driver: String, reference: String },

    #[error("unknown block {id:?} in {reference}, expected \"resource\" or \"variable\"")]
    UnknownBlock { id: String, reference: String },

    #[error("{reference}: {message}")]
    Link { reference: String, message: String },

    #[error("reference {0:?} was used before linking")]
    NotLinked(String),

    #[error("interpolation of {text:?} failed: {message}")]
    Interpolation { text: String, message: String },

    #[error("{reference}: {message}")]
    Assertion { reference: String, message: String },

    #[error("{reference}: {message}")]
    Capture { reference: String, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("resources cannot be registered once the context has been copied")]
    RegistryShared,

    #[error("test {0:?} not found")]
    TestNotFound(String),

    #[error("{failed} of {total} tests failed")]
    TestsFailed { failed: usize, total: usize },
}

impl EvalError {
    pub fn validation(reference: &str, message: impl Into<String>) -> Self {
        EvalError::Validation {
            reference: reference.to_string(),
            message: message.into(),
        }
    }

    pub fn assertion(reference: &str, message: impl Into<String>) -> Self {
        EvalError::Assertion {
            reference: reference.to_string(),
            message: message.into(),
        }
    }

    pub fn capture(reference: &str, message: impl Into<String>) -> Self {
        EvalError::Capture {
            reference: reference.to_string(),
            message: message.into(),
        }
    }

    pub fn interpolation(text: &str, message: impl Into<String>) -> Self {
        EvalError::Interpolation {
            text: text.to_string(),
            message: message.into(),
        }
    }
}

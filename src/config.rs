use crate::ast::Document;
use crate::error::EvalError;
use std::fmt;

/// Prefix of environment variables overriding `variable` block defaults.
pub const DEFAULT_ENV_PREFIX: &str = "BVAR_";

/// Options of one run.
#[derive(Clone)]
pub struct RunConfig {
    /// Exact reference key of the only test to run.
    pub filter: Option<String>,
    pub env_prefix: String,
    /// Reads an override by its full variable name, e.g. `BVAR_host`.
    pub lookup: fn(&str) -> Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            filter: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            lookup: env_lookup,
        }
    }
}

impl RunConfig {
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_lookup(mut self, lookup: fn(&str) -> Option<String>) -> Self {
        self.lookup = lookup;
        self
    }

    /// The override for variable `name`, if one is set.
    pub fn override_for(&self, name: &str) -> Option<String> {
        (self.lookup)(&format!("{}{}", self.env_prefix, name))
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("filter", &self.filter)
            .field("env_prefix", &self.env_prefix)
            .finish_non_exhaustive()
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Global variables declared by `variable` blocks, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Globals {
    values: Vec<(String, String)>,
}

impl Globals {
    /// Collects `variable "<driver>" "<name>" { default = "..." }` blocks.
    /// `lookup` receives the variable name and may replace its default.
    pub fn from_document<F>(document: &Document, lookup: F) -> Result<Self, EvalError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut globals = Globals::default();

        for block in document.blocks.iter().filter(|block| block.id.name == "variable") {
            let reference = block.reference();
            let mut default = String::new();
            for expression in &block.expressions {
                if expression.field_name() == "default" {
                    default = expression.value_as_string(&reference)?.to_string();
                }
            }

            let name = &block.name.text;
            let value = lookup(name).unwrap_or(default);
            globals.set(name, value);
        }
        Ok(globals)
    }

    pub fn set(&mut self, name: &str, value: String) {
        match self.values.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

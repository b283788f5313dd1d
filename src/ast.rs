use crate::error::{EvalError, Span};
use std::fmt;

/// Syntax tree of a BCL document: the top level blocks in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// Variant tag shared by every node of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    StringLiteral,
    Identifier,
    List,
    Expression,
    Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub items: Vec<StringLiteral>,
    pub span: Span,
}

/// Right hand side of a field assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(StringLiteral),
    List(List),
}

/// `field = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub field: Identifier,
    pub value: Value,
    pub span: Span,
}

/// `<id> "<driver>" "<name>" { expression* }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: Identifier,
    pub driver: StringLiteral,
    pub name: StringLiteral,
    pub expressions: Vec<Expression>,
    pub span: Span,
}

impl StringLiteral {
    pub fn kind(&self) -> NodeKind {
        NodeKind::StringLiteral
    }
}

impl Identifier {
    pub fn kind(&self) -> NodeKind {
        NodeKind::Identifier
    }
}

impl List {
    pub fn kind(&self) -> NodeKind {
        NodeKind::List
    }

    pub fn texts(&self) -> Vec<String> {
        self.items.iter().map(|item| item.text.clone()).collect()
    }
}

impl Value {
    pub fn kind(&self) -> NodeKind {
        match self {
            Value::String(node) => node.kind(),
            Value::List(node) => node.kind(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Value::String(node) => &node.span,
            Value::List(node) => &node.span,
        }
    }
}

impl Expression {
    pub fn kind(&self) -> NodeKind {
        NodeKind::Expression
    }

    pub fn field_name(&self) -> &str {
        &self.field.name
    }

    /// Returns the string value, or a validation error naming `reference`.
    pub fn value_as_string(&self, reference: &str) -> Result<&str, EvalError> {
        match &self.value {
            Value::String(node) => Ok(&node.text),
            Value::List(_) => Err(EvalError::validation(
                reference,
                format!("`{}` must be a string, found a list", self.field.name),
            )),
        }
    }

    /// Returns the list value, or a validation error naming `reference`.
    pub fn value_as_list(&self, reference: &str) -> Result<&List, EvalError> {
        match &self.value {
            Value::List(node) => Ok(node),
            Value::String(_) => Err(EvalError::validation(
                reference,
                format!("`{}` must be a list, found a string", self.field.name),
            )),
        }
    }
}

impl Block {
    pub fn kind(&self) -> NodeKind {
        NodeKind::Block
    }

    /// Reference key `<id>.<driver>.<name>`, e.g. `resource.http_step.login`.
    pub fn reference(&self) -> String {
        format!("{}.{}.{}", self.id.name, self.driver.text, self.name.text)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(node) => write!(f, "{:?}", node.text),
            Value::List(node) => {
                write!(f, "[")?;
                for (i, item) in node.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item.text)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.field.name, self.value)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {:?} {:?} {{", self.id.name, self.driver.text, self.name.text)?;
        for expression in &self.expressions {
            write!(f, " {}", expression)?;
        }
        write!(f, " }}")
    }
}

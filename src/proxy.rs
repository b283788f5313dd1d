use crate::context::ExecutionContext;
use crate::error::EvalError;
use crate::interpolator;
use crate::resource::Resource;
use std::cell::OnceCell;
use std::rc::{Rc, Weak};

/// Strips the `${` and `.ref}` decoration from a resolved reference.
pub fn reference_key(value: &str) -> Option<&str> {
    value
        .strip_prefix("${")?
        .strip_suffix(".ref}")
        .filter(|key| !key.is_empty())
}

/// Deferred reference to another resource, written `${<key>.ref}`.
///
/// The handle is weak: the context's registry owns every resource.
#[derive(Debug)]
pub struct Proxy {
    raw: String,
    target: OnceCell<Weak<Resource>>,
}

impl Proxy {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            target: OnceCell::new(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_linked(&self) -> bool {
        self.target.get().is_some()
    }

    /// Resolves the reference against `ctx`. The raw text is interpolated
    /// first, so the key may come from a variable. `owner` names the
    /// resource holding this proxy in error messages.
    pub fn resolve(&self, ctx: &ExecutionContext, owner: &str) -> Result<(), EvalError> {
        let link_error = |message: String| EvalError::Link {
            reference: owner.to_string(),
            message,
        };

        let value = interpolator::eval(&self.raw, Some(ctx))
            .map_err(|e| link_error(format!("unresolved reference {:?}: {}", self.raw, e)))?;

        let key = reference_key(&value).ok_or_else(|| {
            link_error(format!(
                "invalid reference {:?}, expected \"${{<id>.<driver>.<name>.ref}}\"",
                self.raw
            ))
        })?;

        let resource = ctx
            .resource_by_reference(key)
            .ok_or_else(|| link_error(format!("reference not found: {}", key)))?;

        // Linking is done once, a second pass keeps the first target
        let _ = self.target.set(Rc::downgrade(&resource));
        Ok(())
    }

    /// The linked resource. Fails if `resolve` never succeeded.
    pub fn target(&self) -> Result<Rc<Resource>, EvalError> {
        self.target
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| EvalError::NotLinked(self.raw.clone()))
    }
}

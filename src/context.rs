use crate::error::EvalError;
use crate::http::{HttpResponse, Transport};
use crate::resource::Resource;
use log::{debug, warn};
use std::collections::HashMap;
use std::rc::Rc;

/// Resources indexed by reference key and by generated id.
///
/// Iteration follows registration order. Registering a key twice keeps the
/// later resource in the earlier position.
#[derive(Debug, Default)]
pub struct Registry {
    order: Vec<String>,
    by_reference: HashMap<String, Rc<Resource>>,
    by_id: HashMap<String, Rc<Resource>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `resource` under its reference key and id, returning the
    /// resource it replaced, if any.
    pub fn insert(&mut self, resource: Resource) -> Option<Rc<Resource>> {
        let reference = resource.reference().to_string();
        let resource = Rc::new(resource);

        self.by_id.insert(resource.id().to_string(), Rc::clone(&resource));
        let replaced = self.by_reference.insert(reference.clone(), resource);

        match &replaced {
            Some(old) => {
                self.by_id.remove(old.id());
            }
            None => self.order.push(reference),
        }
        replaced
    }

    pub fn get(&self, reference: &str) -> Option<&Rc<Resource>> {
        self.by_reference.get(reference)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Rc<Resource>> {
        self.by_id.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<Resource>)> {
        self.order.iter().filter_map(move |reference| {
            self.by_reference
                .get(reference)
                .map(|resource| (reference.as_str(), resource))
        })
    }

    pub fn len(&self) -> usize {
        self.by_reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_reference.is_empty()
    }
}

/// State threaded through resource execution.
///
/// `current_response` is `None` until a request completes in the current
/// step. Capture resources use that to tell pre-request from post-request
/// runs.
pub struct ExecutionContext {
    registry: Rc<Registry>,
    transport: Rc<dyn Transport>,
    current_response: Option<HttpResponse>,
    variables: HashMap<String, String>,
}

impl ExecutionContext {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            registry: Rc::new(Registry::new()),
            transport,
            current_response: None,
            variables: HashMap::new(),
        }
    }

    /// A context sharing this one's registry and transport, with no response
    /// and an empty variable table.
    pub fn copy(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
            transport: Rc::clone(&self.transport),
            current_response: None,
            variables: HashMap::new(),
        }
    }

    /// Registers a resource. Only possible while no copy shares the registry.
    pub fn add_resource(&mut self, resource: Resource) -> Result<(), EvalError> {
        let registry = Rc::get_mut(&mut self.registry).ok_or(EvalError::RegistryShared)?;

        let reference = resource.reference().to_string();
        debug!("registering {} ({})", reference, resource.id());
        if registry.insert(resource).is_some() {
            warn!("duplicate reference {}, the earlier definition is replaced", reference);
        }
        Ok(())
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    pub fn resource_by_reference(&self, reference: &str) -> Option<Rc<Resource>> {
        self.registry.get(reference).cloned()
    }

    pub fn resource_by_id(&self, id: &str) -> Option<Rc<Resource>> {
        self.registry.get_by_id(id).cloned()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn current_response(&self) -> Option<&HttpResponse> {
        self.current_response.as_ref()
    }

    pub fn set_response(&mut self, response: HttpResponse) {
        self.current_response = Some(response);
    }

    pub fn clear_response(&mut self) {
        self.current_response = None;
    }

    pub fn set_variable(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }
}

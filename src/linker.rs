use crate::context::ExecutionContext;
use crate::error::EvalError;
use log::debug;

/// Links every registered resource. Targets only have to be registered, so
/// the pass order does not matter. The first unresolved reference aborts it.
pub fn link(ctx: &ExecutionContext) -> Result<(), EvalError> {
    for (reference, resource) in ctx.registry().iter() {
        debug!("linking {}", reference);
        resource.link(ctx)?;
    }
    Ok(())
}

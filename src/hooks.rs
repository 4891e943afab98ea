//! Global (cross-field) validation hooks.
//!
//! A global validator is registered against a qualified schema-type name
//! and runs after every successful structural validation of a value bound
//! to that name. It sees the value's normalized raw tree and may veto the
//! mutation by returning an error, which joins the container rollback path.
//!
//! Multi-step migrations that are transiently inconsistent mid-sequence
//! run under a scoped pause: [`RegistryExt::pause_global_validation`]
//! returns a guard disabling the hook, and [`with_paused_validation`] runs
//! a closure under such a guard, revalidates once at scope exit, and rolls
//! the value back if the deferred validation fails.

use crate::container::TypedValue;
use crate::error::ValidationResult;
use crate::schema::registry::{RegistryExt, SchemaRegistry};
use crate::value::Value;
use log::trace;
use std::sync::Arc;

/// Cross-field validation callback for one schema type.
pub trait GlobalValidator: Send + Sync {
    /// Inspect the normalized raw tree of a freshly validated value.
    /// Returning an error vetoes the mutation that produced it.
    fn validate(&self, value: &Value) -> ValidationResult<()>;
}

impl<F> GlobalValidator for F
where
    F: Fn(&Value) -> ValidationResult<()> + Send + Sync,
{
    fn validate(&self, value: &Value) -> ValidationResult<()> {
        self(value)
    }
}

/// Guard holding global validation paused; validation resumes on drop.
/// Pauses nest.
#[must_use = "global validation resumes when the guard drops"]
pub struct ValidationPause {
    registry: Arc<SchemaRegistry>,
}

impl ValidationPause {
    pub(crate) fn new(registry: Arc<SchemaRegistry>) -> Self {
        trace!("global validation paused");
        Self { registry }
    }
}

impl Drop for ValidationPause {
    fn drop(&mut self) {
        self.registry.resume_global_validation();
        trace!("global validation resumed");
    }
}

/// Run a multi-step mutation with global validation paused, revalidating
/// once at scope exit.
///
/// If the closure fails, or the deferred revalidation at exit fails, the
/// value is restored to its entry state and the error is returned; the
/// whole scope behaves as one transactional mutation.
pub fn with_paused_validation<T>(
    value: &mut TypedValue,
    f: impl FnOnce(&mut TypedValue) -> ValidationResult<T>,
) -> ValidationResult<T> {
    let registry = value.binding().registry().clone();
    let snapshot = value.clone();
    let guard = registry.pause_global_validation();
    let result = f(value);
    drop(guard);
    match result {
        Ok(out) => match value.revalidate() {
            Ok(()) => Ok(out),
            Err(err) => {
                *value = snapshot;
                Err(err)
            }
        },
        Err(err) => {
            *value = snapshot;
            Err(err)
        }
    }
}

//! The schema binding carried by every typed value.
//!
//! A binding is a back-reference to the exact schema type that produced a
//! value, plus the registry handle needed to resolve named cross-references
//! and look up behavior/global validators at mutation time. Bindings travel
//! through copies, reads, and iteration results; they are never part of
//! value equality.

use crate::behavior::Behavior;
use crate::schema::registry::SchemaRegistry;
use crate::schema::types::ArcType;
use std::sync::Arc;

/// How a behavior handle got onto a binding.
#[derive(Debug, Clone, Default)]
enum BehaviorSlot {
    /// No behavior looked up or registered.
    #[default]
    None,
    /// Attached automatically from the registry by schema-type name.
    /// Refreshed on copy so late registrations take effect.
    Implicit(Arc<dyn Behavior>),
    /// Bound explicitly by the caller; preserved across re-validation.
    Explicit(Arc<dyn Behavior>),
}

/// Back-reference from a typed value to its schema type.
#[derive(Debug, Clone)]
pub struct Binding {
    schema: ArcType,
    registry: Arc<SchemaRegistry>,
    type_name: Option<String>,
    behavior: BehaviorSlot,
}

impl Binding {
    /// Binding for a value validated against an anonymous (unregistered)
    /// schema type.
    pub fn anonymous(schema: ArcType, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            schema,
            registry,
            type_name: None,
            behavior: BehaviorSlot::None,
        }
    }

    /// The schema type that produced the bound value.
    pub fn schema(&self) -> &ArcType {
        &self.schema
    }

    /// The registry used for cross-reference resolution and behavior lookup.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Qualified schema-type name, when the value is bound to a named type.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Bind this value to a qualified schema-type name and pick up any
    /// registered behavior for it. An explicitly bound behavior survives.
    pub(crate) fn bind_name(&mut self, name: &str) {
        self.type_name = Some(name.to_string());
        self.refresh_behavior();
    }

    /// Current behavior handle, if any.
    pub fn behavior(&self) -> Option<&Arc<dyn Behavior>> {
        match &self.behavior {
            BehaviorSlot::None => None,
            BehaviorSlot::Implicit(b) | BehaviorSlot::Explicit(b) => Some(b),
        }
    }

    /// Explicitly bind a behavior; it is preserved across re-validation and
    /// copies instead of being replaced by registry lookups.
    pub fn bind_behavior(&mut self, behavior: Arc<dyn Behavior>) {
        self.behavior = BehaviorSlot::Explicit(behavior);
    }

    /// Re-run the registry behavior lookup unless a behavior was explicitly
    /// bound. Called on validate and copy so registrations made after a
    /// value was created still attach.
    pub(crate) fn refresh_behavior(&mut self) {
        if matches!(self.behavior, BehaviorSlot::Explicit(_)) {
            return;
        }
        self.behavior = match self
            .type_name
            .as_deref()
            .and_then(|name| self.registry.behavior_for(name))
        {
            Some(b) => BehaviorSlot::Implicit(b),
            None => BehaviorSlot::None,
        };
    }
}

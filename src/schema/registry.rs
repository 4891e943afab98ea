//! Schema registry: named-type resolution across a search path of schema
//! locations.
//!
//! A location is anything implementing [`SchemaSource`]: it can name the
//! schemas it provides and load one on demand. Directory scanning and file
//! watching live outside the engine; the crate ships [`InMemorySource`]
//! for programmatically declared schema files and a JSON source in the
//! loader module. Schema files load lazily on first reference and are
//! cached until [`SchemaRegistry::reload`] or a search-path change.
//!
//! The registry is also the process-wide home of the behavior table, the
//! global validator table, and registered custom scalars.

use crate::behavior::Behavior;
use crate::container::TypedValue;
use crate::error::{DocshapeError, SchemaResult, UnknownSchemaError, ValidationError, ValidationResult};
use crate::hooks::{GlobalValidator, ValidationPause};
use crate::schema::class::{CustomScalar, ScalarTable};
use crate::schema::types::{ArcType, SchemaTypeExt, ValidationContext};
use crate::value::Value;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// A schema location: one entry of the registry's search path.
///
/// Implementations supply named schema files on demand. The engine never
/// touches the filesystem itself; a directory-scanning source belongs to
/// the embedding application.
pub trait SchemaSource: fmt::Debug + Send + Sync {
    /// Names of the schemas this location can supply.
    fn provides(&self) -> Vec<String>;

    /// Load a named schema file. The registry is passed so custom scalar
    /// names can resolve against process-wide registrations as well as the
    /// location's own companion tables.
    fn load(&self, schema: &str, registry: &SchemaRegistry)
    -> Result<SchemaFile, UnknownSchemaError>;
}

/// A loaded schema file: a named set of schema types.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    name: String,
    types: BTreeMap<String, ArcType>,
}

impl SchemaFile {
    pub fn builder(name: impl Into<String>) -> SchemaFileBuilder {
        SchemaFileBuilder {
            name: name.into(),
            types: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type names in order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn get(&self, type_name: &str) -> Option<&ArcType> {
        self.types.get(type_name)
    }
}

/// Builder declaring the named types of a schema file.
#[derive(Debug)]
pub struct SchemaFileBuilder {
    name: String,
    types: BTreeMap<String, ArcType>,
}

impl SchemaFileBuilder {
    /// Declare a named type.
    pub fn ty(mut self, name: impl Into<String>, ty: ArcType) -> Self {
        self.types.insert(name.into(), ty);
        self
    }

    pub fn build(self) -> SchemaFile {
        SchemaFile {
            name: self.name,
            types: self.types,
        }
    }
}

/// Schema location backed by programmatically declared schema files.
#[derive(Debug, Default)]
pub struct InMemorySource {
    files: BTreeMap<String, SchemaFile>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: SchemaFile) -> Self {
        self.files.insert(file.name().to_string(), file);
        self
    }

    pub fn add_file(&mut self, file: SchemaFile) {
        self.files.insert(file.name().to_string(), file);
    }
}

impl SchemaSource for InMemorySource {
    fn provides(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    fn load(
        &self,
        schema: &str,
        _registry: &SchemaRegistry,
    ) -> Result<SchemaFile, UnknownSchemaError> {
        self.files
            .get(schema)
            .cloned()
            .ok_or_else(|| UnknownSchemaError::SchemaNotFound {
                schema: schema.to_string(),
            })
    }
}

/// Registry resolving qualified `schema.TypeName` references across a
/// search path of schema locations.
pub struct SchemaRegistry {
    sources: Vec<Box<dyn SchemaSource>>,
    loaded: RwLock<HashMap<String, Arc<SchemaFile>>>,
    behaviors: RwLock<HashMap<String, Arc<dyn Behavior>>>,
    globals: RwLock<HashMap<String, Arc<dyn GlobalValidator>>>,
    scalars: RwLock<ScalarTable>,
    pause_depth: AtomicUsize,
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded: Vec<String> = self.read(&self.loaded).keys().cloned().collect();
        f.debug_struct("SchemaRegistry")
            .field("sources", &self.sources)
            .field("loaded", &loaded)
            .finish_non_exhaustive()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// An empty registry with no schema locations. Anonymous schema types
    /// validate fine against it; named references fail to resolve.
    pub fn new() -> Self {
        Self::from_sources(Vec::new())
    }

    /// A registry over an ordered search path of schema locations.
    pub fn from_sources(sources: Vec<Box<dyn SchemaSource>>) -> Self {
        Self {
            sources,
            loaded: RwLock::new(HashMap::new()),
            behaviors: RwLock::new(HashMap::new()),
            globals: RwLock::new(HashMap::new()),
            scalars: RwLock::new(ScalarTable::new()),
            pause_depth: AtomicUsize::new(0),
        }
    }

    /// Shared-handle construction, the form the validation entry points
    /// expect.
    pub fn shared(sources: Vec<Box<dyn SchemaSource>>) -> Arc<Self> {
        Arc::new(Self::from_sources(sources))
    }

    fn read<'a, T>(&self, lock: &'a RwLock<T>) -> std::sync::RwLockReadGuard<'a, T> {
        lock.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write<'a, T>(&self, lock: &'a RwLock<T>) -> std::sync::RwLockWriteGuard<'a, T> {
        lock.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve a schema file by name, loading and caching it on first use.
    pub fn schema_file(&self, name: &str) -> Result<Arc<SchemaFile>, UnknownSchemaError> {
        if let Some(file) = self.read(&self.loaded).get(name) {
            return Ok(file.clone());
        }
        for source in &self.sources {
            if source.provides().iter().any(|s| s == name) {
                let file = Arc::new(source.load(name, self)?);
                debug!("loaded schema '{name}'");
                self.write(&self.loaded)
                    .insert(name.to_string(), file.clone());
                return Ok(file);
            }
        }
        Err(UnknownSchemaError::SchemaNotFound {
            schema: name.to_string(),
        })
    }

    /// Resolve a qualified `schema.TypeName` reference.
    pub fn resolve_type(&self, qualified: &str) -> Result<ArcType, UnknownSchemaError> {
        let (schema, type_name) =
            qualified
                .rsplit_once('.')
                .ok_or_else(|| UnknownSchemaError::MalformedReference {
                    reference: qualified.to_string(),
                })?;
        let file = self.schema_file(schema)?;
        file.get(type_name)
            .cloned()
            .ok_or_else(|| UnknownSchemaError::TypeNotFound {
                schema: schema.to_string(),
                type_name: type_name.to_string(),
            })
    }

    /// Convenience alias for [`SchemaRegistry::resolve_type`].
    pub fn get_schema_type(&self, qualified: &str) -> Result<ArcType, UnknownSchemaError> {
        self.resolve_type(qualified)
    }

    /// Drop all cached schema files; they reload lazily on next use.
    pub fn reload(&self) {
        self.write(&self.loaded).clear();
        debug!("schema cache cleared");
    }

    /// Names of all schemas available across the search path.
    pub fn list_schemas(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.iter().flat_map(|s| s.provides()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Qualified names of every type in every available schema. Forces a
    /// load of each schema file.
    pub fn list_schema_types(&self) -> Result<Vec<String>, UnknownSchemaError> {
        let mut names = Vec::new();
        for schema in self.list_schemas() {
            let file = self.schema_file(&schema)?;
            for type_name in file.type_names() {
                names.push(format!("{schema}.{type_name}"));
            }
        }
        names.sort();
        Ok(names)
    }

    /// Register a behavior for a qualified schema-type name. Values
    /// produced for that name from now on carry the behavior.
    pub fn register_behavior(&self, type_name: impl Into<String>, behavior: Arc<dyn Behavior>) {
        self.write(&self.behaviors).insert(type_name.into(), behavior);
    }

    /// Behavior registered for a qualified schema-type name, if any.
    pub fn behavior_for(&self, type_name: &str) -> Option<Arc<dyn Behavior>> {
        self.read(&self.behaviors).get(type_name).cloned()
    }

    /// Register the global validator for a qualified schema-type name,
    /// replacing any previous one.
    pub fn register_global_validator(
        &self,
        type_name: impl Into<String>,
        validator: Arc<dyn GlobalValidator>,
    ) {
        self.write(&self.globals).insert(type_name.into(), validator);
    }

    /// Run the global validator registered for a schema-type name against
    /// a normalized raw tree. A no-op while paused or when none is
    /// registered.
    pub fn run_global_validator(&self, type_name: &str, value: &Value) -> ValidationResult<()> {
        if self.pause_depth.load(Ordering::Relaxed) > 0 {
            return Ok(());
        }
        let Some(validator) = self.read(&self.globals).get(type_name).cloned() else {
            return Ok(());
        };
        validator
            .validate(value)
            .map_err(|e| ValidationError::GlobalVeto {
                type_name: type_name.to_string(),
                message: e.to_string(),
            })
    }

    pub(crate) fn resume_global_validation(&self) {
        self.pause_depth.fetch_sub(1, Ordering::Relaxed);
    }

    /// Register a custom scalar process-wide, resolvable by `Class` specs
    /// in any schema file.
    pub fn register_scalar(&self, scalar: Arc<dyn CustomScalar>) {
        self.write(&self.scalars).register(scalar);
    }

    /// Look up a registered custom scalar by name.
    pub fn scalar_for(&self, name: &str) -> Option<Arc<dyn CustomScalar>> {
        self.read(&self.scalars).get(name)
    }
}

/// Validation entry points on the shared registry handle.
///
/// These live on `Arc<SchemaRegistry>` rather than the registry itself
/// because every value they produce keeps a handle to the registry for
/// cross-reference resolution and behavior lookup at mutation time.
pub trait RegistryExt {
    /// Validate a raw tree against a named schema type, producing a
    /// schema-bound value with behavior attached and the global hook run.
    fn validate(&self, raw: &Value, type_name: &str) -> SchemaResult<TypedValue>;

    /// Build the default value of a named schema type.
    fn make_default(&self, type_name: &str) -> SchemaResult<TypedValue>;

    /// Best-effort coercion before strict validation: unknown struct
    /// fields are dropped, and missing ones are filled from defaults when
    /// `fill` is set.
    fn conform(&self, raw: &Value, type_name: &str, fill: bool) -> SchemaResult<TypedValue>;

    /// Pause global validation until the returned guard drops. Pauses
    /// nest; containers skip the hook while any pause is live.
    fn pause_global_validation(&self) -> ValidationPause;
}

impl RegistryExt for Arc<SchemaRegistry> {
    fn validate(&self, raw: &Value, type_name: &str) -> SchemaResult<TypedValue> {
        let ty = self.resolve_type(type_name)?;
        let ctx = ValidationContext::new(self);
        let typed = ty.validate(raw, &ctx).map_err(DocshapeError::from)?;
        finish(self, typed, type_name)
    }

    fn make_default(&self, type_name: &str) -> SchemaResult<TypedValue> {
        let ty = self.resolve_type(type_name)?;
        let ctx = ValidationContext::new(self);
        let typed = ty.make_default(&ctx).map_err(DocshapeError::from)?;
        finish(self, typed, type_name)
    }

    fn conform(&self, raw: &Value, type_name: &str, fill: bool) -> SchemaResult<TypedValue> {
        let ty = self.resolve_type(type_name)?;
        let ctx = ValidationContext::new(self);
        let conformed = ty
            .conform_raw(raw, fill, &ctx)
            .map_err(DocshapeError::from)?;
        let typed = ty.validate(&conformed, &ctx).map_err(DocshapeError::from)?;
        finish(self, typed, type_name)
    }

    fn pause_global_validation(&self) -> ValidationPause {
        self.pause_depth.fetch_add(1, Ordering::Relaxed);
        ValidationPause::new(self.clone())
    }
}

fn finish(
    registry: &Arc<SchemaRegistry>,
    mut typed: TypedValue,
    type_name: &str,
) -> SchemaResult<TypedValue> {
    typed.bind_name(type_name);
    registry
        .run_global_validator(type_name, &typed.to_value())
        .map_err(DocshapeError::from)?;
    Ok(typed)
}

/// Process-wide shared registry, keyed by the configured search path and
/// rebuilt only when the path changes.
static SHARED_REGISTRY: Mutex<Option<(Vec<String>, Arc<SchemaRegistry>)>> = Mutex::new(None);

/// The lazily initialized process-wide registry for a search path.
///
/// When the supplied locations provide the same schema set as the current
/// shared registry, the existing instance is returned and `sources` is
/// dropped; a changed search path rebuilds the shared instance. Intended
/// for single-threaded startup/configuration phases.
pub fn shared_registry(sources: Vec<Box<dyn SchemaSource>>) -> Arc<SchemaRegistry> {
    let mut key: Vec<String> = sources.iter().flat_map(|s| s.provides()).collect();
    key.sort();
    let mut slot = SHARED_REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some((stored_key, registry)) = slot.as_ref() {
        if *stored_key == key {
            return registry.clone();
        }
        debug!("schema search path changed, rebuilding shared registry");
    }
    let registry = SchemaRegistry::shared(sources);
    *slot = Some((key, registry.clone()));
    registry
}

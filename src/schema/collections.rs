//! Collection schema types: Sequence, Tuple, Set.

use crate::container::{Binding, SeqValue, SetValue, TupleValue, TypedValue};
use crate::error::{ValidationError, ValidationResult};
use crate::schema::types::{ArcType, SchemaType, SchemaTypeExt, ValidationContext};
use crate::value::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Length constraint for sequences.
#[derive(Debug, Clone, Default)]
pub enum SizeConstraint {
    /// Any length.
    #[default]
    Any,
    /// Exactly this many elements.
    Exact(usize),
    /// Inclusive bounds; either side may be open.
    Bounded {
        min: Option<usize>,
        max: Option<usize>,
    },
}

impl SizeConstraint {
    fn check(&self, len: usize) -> ValidationResult<()> {
        let ok = match self {
            SizeConstraint::Any => true,
            SizeConstraint::Exact(n) => len == *n,
            SizeConstraint::Bounded { min, max } => {
                len >= min.unwrap_or(0) && len <= max.unwrap_or(usize::MAX)
            }
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::InvalidSize {
                actual: len,
                constraint: self.describe(),
            })
        }
    }

    fn describe(&self) -> String {
        match self {
            SizeConstraint::Any => "any".to_string(),
            SizeConstraint::Exact(n) => format!("size={n}"),
            SizeConstraint::Bounded { min, max } => format!(
                "min={}, max={}",
                min.map(|n| n.to_string()).unwrap_or_else(|| "0".into()),
                max.map(|n| n.to_string())
                    .unwrap_or_else(|| "unbounded".into()),
            ),
        }
    }

    fn min(&self) -> usize {
        match self {
            SizeConstraint::Any => 0,
            SizeConstraint::Exact(n) => *n,
            SizeConstraint::Bounded { min, .. } => min.unwrap_or(0),
        }
    }
}

/// Homogeneous ordered sequence type.
#[derive(Debug)]
pub struct SequenceType {
    element: ArcType,
    size: SizeConstraint,
    default: Option<Vec<Value>>,
}

impl SequenceType {
    pub fn new(element: ArcType) -> Self {
        Self {
            element,
            size: SizeConstraint::Any,
            default: None,
        }
    }

    pub fn with_exact_size(mut self, size: usize) -> Self {
        self.size = SizeConstraint::Exact(size);
        self
    }

    pub fn with_min_size(mut self, min: usize) -> Self {
        self.size = match self.size {
            SizeConstraint::Bounded { max, .. } => SizeConstraint::Bounded {
                min: Some(min),
                max,
            },
            _ => SizeConstraint::Bounded {
                min: Some(min),
                max: None,
            },
        };
        self
    }

    pub fn with_max_size(mut self, max: usize) -> Self {
        self.size = match self.size {
            SizeConstraint::Bounded { min, .. } => SizeConstraint::Bounded {
                min,
                max: Some(max),
            },
            _ => SizeConstraint::Bounded {
                min: None,
                max: Some(max),
            },
        };
        self
    }

    pub fn with_default(mut self, default: impl IntoIterator<Item = Value>) -> Self {
        self.default = Some(default.into_iter().collect());
        self
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }
}

impl SchemaType for SequenceType {
    fn kind(&self) -> &'static str {
        "Sequence"
    }

    fn describe(&self) -> String {
        match &self.size {
            SizeConstraint::Any => format!("Sequence[{}]", self.element.describe()),
            other => format!("Sequence[{}; {}]", self.element.describe(), other.describe()),
        }
    }

    fn validate_self(&self, raw: &Value, _ctx: &ValidationContext) -> ValidationResult<Value> {
        let items = raw
            .as_seq()
            .ok_or_else(|| ValidationError::invalid_type("sequence", raw.kind()))?;
        self.size.check(items.len())?;
        Ok(raw.clone())
    }

    fn build(
        &self,
        self_arc: &ArcType,
        raw: &Value,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        self.validate_self(raw, ctx)?;
        let items = raw.as_seq().unwrap_or_default();
        let child_ctx = ctx.descend()?;
        let mut typed = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            typed.push(
                self.element
                    .validate(item, &child_ctx)
                    .map_err(|e| e.for_index(index))?,
            );
        }
        let binding = Binding::anonymous(self_arc.clone(), ctx.registry().clone());
        Ok(TypedValue::Seq(SeqValue::from_parts(binding, typed)))
    }

    fn default_raw(&self, ctx: &ValidationContext) -> ValidationResult<Value> {
        if let Some(default) = &self.default {
            return Ok(Value::Seq(default.clone()));
        }
        let child_ctx = ctx.descend()?;
        let element_default = self.element.default_raw(&child_ctx)?;
        Ok(Value::Seq(vec![element_default; self.size.min()]))
    }

    fn conform_raw(
        &self,
        raw: &Value,
        fill: bool,
        ctx: &ValidationContext,
    ) -> ValidationResult<Value> {
        let Some(items) = raw.as_seq() else {
            return Ok(raw.clone());
        };
        let child_ctx = ctx.descend()?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(self.element.conform_raw(item, fill, &child_ctx)?);
        }
        Ok(Value::Seq(out))
    }

    fn child_type(&self, _key: Option<&str>, index: Option<usize>) -> Option<ArcType> {
        index.map(|_| self.element.clone())
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(SequenceType {
            element: self.element.clone_type(),
            size: self.size.clone(),
            default: self.default.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fixed-arity heterogeneous tuple type.
#[derive(Debug)]
pub struct TupleType {
    elements: Vec<ArcType>,
}

impl TupleType {
    pub fn new(elements: impl IntoIterator<Item = ArcType>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }
}

impl SchemaType for TupleType {
    fn kind(&self) -> &'static str {
        "Tuple"
    }

    fn describe(&self) -> String {
        format!(
            "Tuple[{}]",
            self.elements
                .iter()
                .map(|e| e.describe())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    fn validate_self(&self, raw: &Value, _ctx: &ValidationContext) -> ValidationResult<Value> {
        let items = raw
            .as_tuple()
            .ok_or_else(|| ValidationError::invalid_type("tuple", raw.kind()))?;
        if items.len() != self.elements.len() {
            return Err(ValidationError::InvalidSize {
                actual: items.len(),
                constraint: format!("arity={}", self.elements.len()),
            });
        }
        Ok(raw.clone())
    }

    fn build(
        &self,
        self_arc: &ArcType,
        raw: &Value,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        self.validate_self(raw, ctx)?;
        let items = raw.as_tuple().unwrap_or_default();
        let child_ctx = ctx.descend()?;
        let mut typed = Vec::with_capacity(items.len());
        for (index, (item, element_ty)) in items.iter().zip(&self.elements).enumerate() {
            typed.push(
                element_ty
                    .validate(item, &child_ctx)
                    .map_err(|e| e.for_index(index))?,
            );
        }
        let binding = Binding::anonymous(self_arc.clone(), ctx.registry().clone());
        Ok(TypedValue::Tuple(TupleValue::from_parts(binding, typed)))
    }

    fn default_raw(&self, ctx: &ValidationContext) -> ValidationResult<Value> {
        let child_ctx = ctx.descend()?;
        let mut items = Vec::with_capacity(self.elements.len());
        for element_ty in &self.elements {
            items.push(element_ty.default_raw(&child_ctx)?);
        }
        Ok(Value::Tuple(items))
    }

    fn conform_raw(
        &self,
        raw: &Value,
        fill: bool,
        ctx: &ValidationContext,
    ) -> ValidationResult<Value> {
        let Some(items) = raw.as_tuple() else {
            return Ok(raw.clone());
        };
        let child_ctx = ctx.descend()?;
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.elements.get(index) {
                Some(element_ty) => out.push(element_ty.conform_raw(item, fill, &child_ctx)?),
                // arity mismatches are left for strict validation to report
                None => out.push(item.clone()),
            }
        }
        Ok(Value::Tuple(out))
    }

    fn child_type(&self, _key: Option<&str>, index: Option<usize>) -> Option<ArcType> {
        index.and_then(|i| self.elements.get(i).cloned())
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(TupleType {
            elements: self.elements.iter().map(|e| e.clone_type()).collect(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Unordered set of unique elements.
#[derive(Debug)]
pub struct SetType {
    element: ArcType,
}

impl SetType {
    pub fn new(element: ArcType) -> Self {
        Self { element }
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }
}

impl SchemaType for SetType {
    fn kind(&self) -> &'static str {
        "Set"
    }

    fn describe(&self) -> String {
        format!("Set[{}]", self.element.describe())
    }

    fn validate_self(&self, raw: &Value, _ctx: &ValidationContext) -> ValidationResult<Value> {
        raw.as_set()
            .ok_or_else(|| ValidationError::invalid_type("set", raw.kind()))?;
        Ok(raw.clone())
    }

    fn build(
        &self,
        self_arc: &ArcType,
        raw: &Value,
        ctx: &ValidationContext,
    ) -> ValidationResult<TypedValue> {
        self.validate_self(raw, ctx)?;
        let child_ctx = ctx.descend()?;
        let mut typed = BTreeMap::new();
        if let Some(items) = raw.as_set() {
            // elements that normalize to the same value collapse to one entry
            for item in items {
                let element = self.element.validate(item, &child_ctx)?;
                typed.insert(element.to_value(), element);
            }
        }
        let binding = Binding::anonymous(self_arc.clone(), ctx.registry().clone());
        Ok(TypedValue::Set(SetValue::from_parts(binding, typed)))
    }

    fn default_raw(&self, _ctx: &ValidationContext) -> ValidationResult<Value> {
        Ok(Value::Set(Default::default()))
    }

    fn conform_raw(
        &self,
        raw: &Value,
        fill: bool,
        ctx: &ValidationContext,
    ) -> ValidationResult<Value> {
        let Some(items) = raw.as_set() else {
            return Ok(raw.clone());
        };
        let child_ctx = ctx.descend()?;
        let mut out = std::collections::BTreeSet::new();
        for item in items {
            out.insert(self.element.conform_raw(item, fill, &child_ctx)?);
        }
        Ok(Value::Set(out))
    }

    fn child_type(&self, _key: Option<&str>, index: Option<usize>) -> Option<ArcType> {
        index.map(|_| self.element.clone())
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(SetType {
            element: self.element.clone_type(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

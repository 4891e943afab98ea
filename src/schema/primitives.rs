//! Primitive scalar schema types: Boolean, Integer, Real, String.
//!
//! Each primitive defines its own coercion rules. Booleans coerce strings
//! through fixed literal sets; integers accept enum names as well as the
//! underlying value; lenient strings stringify scalar input. Everything
//! else is rejected with an [`InvalidType`] error.
//!
//! [`InvalidType`]: crate::error::ValidationError::InvalidType

use crate::error::{ValidationError, ValidationResult};
use crate::schema::types::{ArcType, SchemaType, ValidationContext};
use crate::value::Value;
use regex::Regex;
use std::any::Any;
use std::sync::Arc;

/// String literals accepted as `true` (case-insensitive).
const TRUE_LITERALS: [&str; 4] = ["1", "yes", "on", "true"];
/// String literals accepted as `false` (case-insensitive).
const FALSE_LITERALS: [&str; 4] = ["0", "no", "off", "false"];

/// Boolean schema type.
#[derive(Debug, Clone, Default)]
pub struct BooleanType {
    default: Option<bool>,
}

impl BooleanType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = Some(default);
        self
    }

    /// Shared arc handle, the form the rest of the engine consumes.
    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }
}

impl SchemaType for BooleanType {
    fn kind(&self) -> &'static str {
        "Boolean"
    }

    fn validate_self(&self, raw: &Value, _ctx: &ValidationContext) -> ValidationResult<Value> {
        match raw {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Str(s) => {
                let lowered = s.to_lowercase();
                if TRUE_LITERALS.contains(&lowered.as_str()) {
                    Ok(Value::Bool(true))
                } else if FALSE_LITERALS.contains(&lowered.as_str()) {
                    Ok(Value::Bool(false))
                } else {
                    Err(ValidationError::InvalidBooleanLiteral { value: s.clone() })
                }
            }
            other => Err(ValidationError::invalid_type("boolean", other.kind())),
        }
    }

    fn default_raw(&self, _ctx: &ValidationContext) -> ValidationResult<Value> {
        Ok(Value::Bool(self.default.unwrap_or(false)))
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Integer schema type with optional inclusive range and enumeration.
///
/// An enumeration is a list of `(name, value)` pairs; both the symbolic
/// name and the underlying value are accepted and normalize to the value.
/// Range constraints are skipped when an enumeration is present, since
/// membership is itself the constraint.
#[derive(Debug, Clone, Default)]
pub struct IntegerType {
    min: Option<i64>,
    max: Option<i64>,
    enumeration: Option<Vec<(String, i64)>>,
    default: Option<i64>,
}

impl IntegerType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_enum<N: Into<String>>(mut self, pairs: impl IntoIterator<Item = (N, i64)>) -> Self {
        self.enumeration = Some(pairs.into_iter().map(|(n, v)| (n.into(), v)).collect());
        self
    }

    pub fn with_default(mut self, default: i64) -> Self {
        self.default = Some(default);
        self
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }

    fn enum_names(&self) -> Vec<String> {
        self.enumeration
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect()
    }
}

impl SchemaType for IntegerType {
    fn kind(&self) -> &'static str {
        "Integer"
    }

    fn describe(&self) -> String {
        let mut constraints = Vec::new();
        if let Some(pairs) = &self.enumeration {
            constraints.push(format!(
                "enum={}",
                pairs
                    .iter()
                    .map(|(n, _)| n.as_str())
                    .collect::<Vec<_>>()
                    .join("|")
            ));
        } else {
            if let Some(min) = self.min {
                constraints.push(format!("min={min}"));
            }
            if let Some(max) = self.max {
                constraints.push(format!("max={max}"));
            }
        }
        if constraints.is_empty() {
            "Integer".to_string()
        } else {
            format!("Integer[{}]", constraints.join(", "))
        }
    }

    fn validate_self(&self, raw: &Value, _ctx: &ValidationContext) -> ValidationResult<Value> {
        if let Some(pairs) = &self.enumeration {
            let value = match raw {
                Value::Int(i) if pairs.iter().any(|(_, v)| v == i) => *i,
                Value::Int(i) => {
                    return Err(ValidationError::InvalidEnumValue {
                        value: i.to_string(),
                        allowed: self.enum_names(),
                    });
                }
                Value::Str(s) => match pairs.iter().find(|(n, _)| n == s) {
                    Some((_, v)) => *v,
                    None => {
                        return Err(ValidationError::InvalidEnumValue {
                            value: format!("'{s}'"),
                            allowed: self.enum_names(),
                        });
                    }
                },
                other => return Err(ValidationError::invalid_type("integer", other.kind())),
            };
            return Ok(Value::Int(value));
        }

        let value = match raw {
            Value::Int(i) => *i,
            other => return Err(ValidationError::invalid_type("integer", other.kind())),
        };
        let min = self.min.unwrap_or(i64::MIN);
        let max = self.max.unwrap_or(i64::MAX);
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(Value::Int(value))
    }

    fn string_to_value(&self, text: &str, ctx: &ValidationContext) -> ValidationResult<Value> {
        if let Ok(i) = text.parse::<i64>() {
            return self.validate_self(&Value::Int(i), ctx);
        }
        // enum names take the string path through validate_self
        self.validate_self(&Value::Str(text.to_string()), ctx)
    }

    fn default_raw(&self, _ctx: &ValidationContext) -> ValidationResult<Value> {
        if let Some(default) = self.default {
            return Ok(Value::Int(default));
        }
        if let Some(pairs) = &self.enumeration {
            let first = pairs.first().map(|(_, v)| *v).unwrap_or(0);
            return Ok(Value::Int(first));
        }
        // zero clamped into the permitted range
        let mut value = 0i64;
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        Ok(Value::Int(value))
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Real (floating point) schema type with optional inclusive range.
/// Integer raw values are accepted and widened.
#[derive(Debug, Clone, Default)]
pub struct RealType {
    min: Option<f64>,
    max: Option<f64>,
    default: Option<f64>,
}

impl RealType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }
}

impl SchemaType for RealType {
    fn kind(&self) -> &'static str {
        "Real"
    }

    fn describe(&self) -> String {
        match (self.min, self.max) {
            (None, None) => "Real".to_string(),
            (min, max) => format!(
                "Real[min={}, max={}]",
                min.map(|v| v.to_string()).unwrap_or_else(|| "-inf".into()),
                max.map(|v| v.to_string()).unwrap_or_else(|| "inf".into()),
            ),
        }
    }

    fn validate_self(&self, raw: &Value, _ctx: &ValidationContext) -> ValidationResult<Value> {
        let value = match raw {
            Value::Real(r) => *r,
            Value::Int(i) => *i as f64,
            other => return Err(ValidationError::invalid_type("real", other.kind())),
        };
        let min = self.min.unwrap_or(f64::NEG_INFINITY);
        let max = self.max.unwrap_or(f64::INFINITY);
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(Value::Real(value))
    }

    fn string_to_value(&self, text: &str, ctx: &ValidationContext) -> ValidationResult<Value> {
        match text.parse::<f64>() {
            Ok(r) => self.validate_self(&Value::Real(r), ctx),
            Err(_) => Err(ValidationError::invalid_type("real", "string")),
        }
    }

    fn default_raw(&self, _ctx: &ValidationContext) -> ValidationResult<Value> {
        if let Some(default) = self.default {
            return Ok(Value::Real(default));
        }
        let mut value = 0.0f64;
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        Ok(Value::Real(value))
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// String schema type with optional choice set and pattern.
///
/// In lenient mode (the default) scalar input is stringified before the
/// constraints run; `strict` restricts input to actual strings. The
/// pattern matches anywhere in the string; anchor it explicitly for a
/// full match.
#[derive(Debug, Clone, Default)]
pub struct StringType {
    choices: Option<Vec<String>>,
    pattern: Option<Regex>,
    strict: bool,
    default: Option<String>,
}

impl StringType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_choices<C: Into<String>>(mut self, choices: impl IntoIterator<Item = C>) -> Self {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Constrain values to match `pattern`. Fails if the pattern is not a
    /// valid regular expression.
    pub fn with_pattern(mut self, pattern: &str) -> ValidationResult<Self> {
        let compiled = Regex::new(pattern).map_err(|e| {
            ValidationError::custom(format!("Invalid string pattern '{pattern}': {e}"))
        })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn into_type(self) -> ArcType {
        Arc::new(self)
    }
}

impl SchemaType for StringType {
    fn kind(&self) -> &'static str {
        "String"
    }

    fn describe(&self) -> String {
        let mut constraints = Vec::new();
        if let Some(choices) = &self.choices {
            constraints.push(format!("choices={}", choices.join("|")));
        }
        if let Some(pattern) = &self.pattern {
            constraints.push(format!("pattern={}", pattern.as_str()));
        }
        if self.strict {
            constraints.push("strict".to_string());
        }
        if constraints.is_empty() {
            "String".to_string()
        } else {
            format!("String[{}]", constraints.join(", "))
        }
    }

    fn validate_self(&self, raw: &Value, _ctx: &ValidationContext) -> ValidationResult<Value> {
        let value = match raw {
            Value::Str(s) => s.clone(),
            Value::Bool(b) if !self.strict => b.to_string(),
            Value::Int(i) if !self.strict => i.to_string(),
            Value::Real(r) if !self.strict => r.to_string(),
            other => return Err(ValidationError::invalid_type("string", other.kind())),
        };
        if let Some(choices) = &self.choices {
            if !choices.contains(&value) {
                return Err(ValidationError::InvalidChoice {
                    value,
                    allowed: choices.clone(),
                });
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(&value) {
                return Err(ValidationError::PatternMismatch {
                    value,
                    pattern: pattern.as_str().to_string(),
                });
            }
        }
        Ok(Value::Str(value))
    }

    fn default_raw(&self, _ctx: &ValidationContext) -> ValidationResult<Value> {
        if let Some(default) = &self.default {
            return Ok(Value::Str(default.clone()));
        }
        if let Some(choices) = &self.choices {
            if let Some(first) = choices.first() {
                return Ok(Value::Str(first.clone()));
            }
        }
        Ok(Value::Str(String::new()))
    }

    fn clone_type(&self) -> ArcType {
        Arc::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

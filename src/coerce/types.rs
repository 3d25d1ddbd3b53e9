use crate::error::SchemaError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Sentinel returned when a value cannot be converted to its declared type.
///
/// Carries an optional message that replaces the default "is invalid" text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("invalid value")]
pub struct InvalidValue {
    pub message: Option<String>,
}

impl InvalidValue {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Scalar types with a canonical string parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Integer,
    Float,
    Numeric,
    Boolean,
    String,
    Symbol,
    Date,
    DateTime,
    Time,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Integer => "Integer",
            Primitive::Float => "Float",
            Primitive::Numeric => "Numeric",
            Primitive::Boolean => "Boolean",
            Primitive::String => "String",
            Primitive::Symbol => "Symbol",
            Primitive::Date => "Date",
            Primitive::DateTime => "DateTime",
            Primitive::Time => "Time",
        }
    }

    /// Whether `value` is already the runtime shape of this primitive.
    pub fn accepts_native(self, value: &Value) -> bool {
        match self {
            Primitive::Integer => value.is_i64() || value.is_u64(),
            Primitive::Float => value.is_f64(),
            Primitive::Numeric => value.is_number(),
            Primitive::Boolean => value.is_boolean(),
            Primitive::String | Primitive::Symbol => value.is_string(),
            Primitive::Date | Primitive::DateTime | Primitive::Time => false,
        }
    }
}

/// Capability interface for user-defined parameter types.
///
/// Implementors convert one raw request value into their own representation and
/// back into JSON for the coerced parameter set.
pub trait Parseable: Sized + 'static {
    fn parse(raw: &Value) -> Result<Self, InvalidValue>;

    fn into_value(self) -> Value;
}

type ParseFn = dyn Fn(&Value) -> Result<Value, InvalidValue> + Send + Sync;

/// A named custom type backed by a parse function.
///
/// The name is part of the coercer cache key, so two custom types must not share one.
#[derive(Clone)]
pub struct CustomType {
    name: Arc<str>,
    parse: Arc<ParseFn>,
}

impl CustomType {
    pub fn new<F>(name: impl Into<String>, parse: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, InvalidValue> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            parse: Arc::new(parse),
        }
    }

    /// Custom type for any [`Parseable`] implementation.
    pub fn of<T: Parseable>() -> Self {
        Self::new(std::any::type_name::<T>(), |raw| {
            T::parse(raw).map(Parseable::into_value)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn parse(&self, raw: &Value) -> Result<Value, InvalidValue> {
        (self.parse)(raw)
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomType").field(&self.name).finish()
    }
}

/// Declared target type of a parameter.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Hash,
    Array(Option<Box<TypeDescriptor>>),
    Set(Option<Box<TypeDescriptor>>),
    /// Opaque JSON blob: a JSON string decoded into an object or array.
    Json,
    /// `Array[JSON]`: a JSON object or list of objects, always yielding a list.
    JsonArray,
    /// Multipart upload descriptor.
    File,
    Custom(CustomType),
    /// `types: [A, B]` - the value is one of the listed types.
    Multiple(Vec<TypeDescriptor>),
    /// `type: [A, B]` - a list whose members are each one of the listed types.
    VariantCollection(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn integer() -> Self {
        TypeDescriptor::Primitive(Primitive::Integer)
    }

    pub fn float() -> Self {
        TypeDescriptor::Primitive(Primitive::Float)
    }

    pub fn boolean() -> Self {
        TypeDescriptor::Primitive(Primitive::Boolean)
    }

    pub fn string() -> Self {
        TypeDescriptor::Primitive(Primitive::String)
    }

    pub fn date() -> Self {
        TypeDescriptor::Primitive(Primitive::Date)
    }

    pub fn array() -> Self {
        TypeDescriptor::Array(None)
    }

    pub fn array_of(member: TypeDescriptor) -> Self {
        TypeDescriptor::Array(Some(Box::new(member)))
    }

    pub fn set_of(member: TypeDescriptor) -> Self {
        TypeDescriptor::Set(Some(Box::new(member)))
    }

    pub fn custom<T: Parseable>() -> Self {
        TypeDescriptor::Custom(CustomType::of::<T>())
    }

    /// Stable cache key; two descriptors with equal signatures coerce identically.
    pub fn signature(&self) -> String {
        match self {
            TypeDescriptor::Primitive(p) => p.name().to_string(),
            TypeDescriptor::Hash => "Hash".to_string(),
            TypeDescriptor::Array(None) => "Array".to_string(),
            TypeDescriptor::Array(Some(member)) => format!("Array[{}]", member.signature()),
            TypeDescriptor::Set(None) => "Set".to_string(),
            TypeDescriptor::Set(Some(member)) => format!("Set[{}]", member.signature()),
            TypeDescriptor::Json => "JSON".to_string(),
            TypeDescriptor::JsonArray => "Array[JSON]".to_string(),
            TypeDescriptor::File => "File".to_string(),
            TypeDescriptor::Custom(custom) => format!("Custom({})", custom.name()),
            TypeDescriptor::Multiple(members) => format!("Types({})", join_signatures(members)),
            TypeDescriptor::VariantCollection(members) => format!("[{}]", join_signatures(members)),
        }
    }

    /// Types that may open a nested parameter block.
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Array(None)
                | TypeDescriptor::Hash
                | TypeDescriptor::Json
                | TypeDescriptor::JsonArray
        )
    }

    /// Whether nested blocks under this type iterate list elements.
    pub fn is_list_group(&self) -> bool {
        matches!(self, TypeDescriptor::Array(_) | TypeDescriptor::JsonArray)
    }

    pub fn is_json(&self) -> bool {
        matches!(self, TypeDescriptor::Json | TypeDescriptor::JsonArray)
    }

    /// Whether `value` already has the runtime shape of this type.
    pub fn accepts_native(&self, value: &Value) -> bool {
        match self {
            TypeDescriptor::Primitive(p) => p.accepts_native(value),
            TypeDescriptor::Hash => value.is_object(),
            TypeDescriptor::Array(member) | TypeDescriptor::Set(member) => match value {
                Value::Array(items) => member
                    .as_ref()
                    .map_or(true, |m| items.iter().all(|i| m.accepts_native(i))),
                _ => false,
            },
            TypeDescriptor::Json => value.is_object() || value.is_array(),
            TypeDescriptor::JsonArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
            TypeDescriptor::File => value.get("tempfile").is_some(),
            TypeDescriptor::Custom(_) => false,
            TypeDescriptor::Multiple(members) => members.iter().any(|m| m.accepts_native(value)),
            TypeDescriptor::VariantCollection(members) => value
                .as_array()
                .is_some_and(|items| {
                    items
                        .iter()
                        .all(|i| members.iter().any(|m| m.accepts_native(i)))
                }),
        }
    }

    /// Scalar type used to check `values`/`except_values` entries.
    pub(crate) fn value_type(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::Array(Some(member)) | TypeDescriptor::Set(Some(member)) => {
                member.value_type()
            }
            TypeDescriptor::Primitive(_) => Some(self),
            _ => None,
        }
    }
}

fn join_signatures(members: &[TypeDescriptor]) -> String {
    members
        .iter()
        .map(TypeDescriptor::signature)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

impl From<Primitive> for TypeDescriptor {
    fn from(p: Primitive) -> Self {
        TypeDescriptor::Primitive(p)
    }
}

impl FromStr for TypeDescriptor {
    type Err = SchemaError;

    /// Parses type names as they appear in definition files:
    /// `Integer`, `Array[String]`, `Set[Integer]`, `JSON`, `Array[JSON]`, `[String, Integer]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "Array[JSON]" {
            return Ok(TypeDescriptor::JsonArray);
        }
        if let Some(inner) = s.strip_prefix("Array[").and_then(|r| r.strip_suffix(']')) {
            return Ok(TypeDescriptor::array_of(inner.parse()?));
        }
        if let Some(inner) = s.strip_prefix("Set[").and_then(|r| r.strip_suffix(']')) {
            return Ok(TypeDescriptor::set_of(inner.parse()?));
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let members = inner
                .split(',')
                .map(str::parse)
                .collect::<Result<Vec<TypeDescriptor>, _>>()?;
            return Ok(TypeDescriptor::VariantCollection(members));
        }
        let descriptor = match s {
            "Integer" => Primitive::Integer.into(),
            "Float" => Primitive::Float.into(),
            "Numeric" | "BigDecimal" => Primitive::Numeric.into(),
            "Boolean" => Primitive::Boolean.into(),
            "String" => Primitive::String.into(),
            "Symbol" => Primitive::Symbol.into(),
            "Date" => Primitive::Date.into(),
            "DateTime" => Primitive::DateTime.into(),
            "Time" => Primitive::Time.into(),
            "Hash" => TypeDescriptor::Hash,
            "Array" => TypeDescriptor::Array(None),
            "Set" => TypeDescriptor::Set(None),
            "JSON" => TypeDescriptor::Json,
            "File" => TypeDescriptor::File,
            other => return Err(SchemaError::UnknownType(other.to_string())),
        };
        Ok(descriptor)
    }
}

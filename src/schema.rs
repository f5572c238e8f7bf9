//! Record schemas: the statically-checked field descriptor table.
//!
//! A [`RecordSchema`] declares, for one record type, the DSN template and the
//! fields the engine may write to. Descriptors carry plain function pointers
//! as setters, so a schema is `Send + Sync` regardless of the record type and
//! can be cached process-wide.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::query::QueryMap;

/// Semantic type of a bound field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Assigned as-is.
    String,
    /// Base-10 signed integer.
    Int,
    /// Case-insensitive `true`/`false`.
    Bool,
    /// The raw query-parameter map.
    Map,
}

impl FieldKind {
    /// Get the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which binding path feeds a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Bound from a capture, a query entry, or a default.
    Value,
    /// Receives the matched scheme text.
    Scheme,
    /// Receives the entire query-parameter map.
    Params,
}

/// Typed write access into the record.
pub(crate) enum Setter<R> {
    Str(fn(&mut R, String)),
    Int(fn(&mut R, i64)),
    Bool(fn(&mut R, bool)),
    Map(fn(&mut R, QueryMap)),
}

impl<R> Setter<R> {
    fn kind(&self) -> FieldKind {
        match self {
            Self::Str(_) => FieldKind::String,
            Self::Int(_) => FieldKind::Int,
            Self::Bool(_) => FieldKind::Bool,
            Self::Map(_) => FieldKind::Map,
        }
    }
}

/// One bindable field of a record: name, kind, optional default, setter.
pub struct FieldDescriptor<R> {
    name: SmolStr,
    default: Option<SmolStr>,
    role: FieldRole,
    setter: Setter<R>,
}

impl<R> FieldDescriptor<R> {
    /// The field name, matched against capture and query keys.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's semantic type.
    pub fn kind(&self) -> FieldKind {
        self.setter.kind()
    }

    /// The declared default literal, if any.
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// The field's binding role.
    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub(crate) fn setter(&self) -> &Setter<R> {
        &self.setter
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("role", &self.role)
            .field("default", &self.default)
            .finish()
    }
}

/// Declarative schema for a record type: its template plus field descriptors.
///
/// Built once per record type (see [`DsnRecord`]) and cached; safe to share
/// read-only across concurrent parse calls.
pub struct RecordSchema<R> {
    template: String,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> RecordSchema<R> {
    /// Start declaring a schema for the given template.
    pub fn builder(template: impl Into<String>) -> RecordSchemaBuilder<R> {
        RecordSchemaBuilder {
            template: template.into(),
            fields: Vec::new(),
        }
    }

    /// The DSN template for this record type.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The declared field descriptors, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }
}

impl<R> fmt::Debug for RecordSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("template", &self.template)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Fluent builder for [`RecordSchema`].
pub struct RecordSchemaBuilder<R> {
    template: String,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R> RecordSchemaBuilder<R> {
    fn push(mut self, name: &str, default: Option<&str>, role: FieldRole, setter: Setter<R>) -> Self {
        self.fields.push(FieldDescriptor {
            name: SmolStr::new(name),
            default: default.map(SmolStr::new),
            role,
            setter,
        });
        self
    }

    /// Declare a string field.
    pub fn string(self, name: &str, set: fn(&mut R, String)) -> Self {
        self.push(name, None, FieldRole::Value, Setter::Str(set))
    }

    /// Declare a string field with a default literal.
    pub fn string_or(self, name: &str, default: &str, set: fn(&mut R, String)) -> Self {
        self.push(name, Some(default), FieldRole::Value, Setter::Str(set))
    }

    /// Declare an integer field.
    pub fn int(self, name: &str, set: fn(&mut R, i64)) -> Self {
        self.push(name, None, FieldRole::Value, Setter::Int(set))
    }

    /// Declare an integer field with a default literal.
    pub fn int_or(self, name: &str, default: &str, set: fn(&mut R, i64)) -> Self {
        self.push(name, Some(default), FieldRole::Value, Setter::Int(set))
    }

    /// Declare a boolean field.
    pub fn boolean(self, name: &str, set: fn(&mut R, bool)) -> Self {
        self.push(name, None, FieldRole::Value, Setter::Bool(set))
    }

    /// Declare a boolean field with a default literal.
    pub fn boolean_or(self, name: &str, default: &str, set: fn(&mut R, bool)) -> Self {
        self.push(name, Some(default), FieldRole::Value, Setter::Bool(set))
    }

    /// Declare the field that receives the matched scheme text.
    pub fn scheme(self, name: &str, set: fn(&mut R, String)) -> Self {
        self.push(name, None, FieldRole::Scheme, Setter::Str(set))
    }

    /// Declare the field that receives the whole query-parameter map.
    pub fn params(self, name: &str, set: fn(&mut R, QueryMap)) -> Self {
        self.push(name, None, FieldRole::Params, Setter::Map(set))
    }

    /// Finish the schema.
    pub fn build(self) -> RecordSchema<R> {
        RecordSchema {
            template: self.template,
            fields: self.fields,
        }
    }
}

/// A record type that declares a DSN template and field descriptors.
///
/// `dsn_schema` is invoked once per type; the result is compiled and cached
/// process-wide, so implementations should be pure.
pub trait DsnRecord: Sized + 'static {
    /// Build the schema for this record type.
    fn dsn_schema() -> RecordSchema<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sample {
        host: String,
        port: i64,
        debug: bool,
        params: QueryMap,
    }

    fn sample_schema() -> RecordSchema<Sample> {
        RecordSchema::builder("$Host:$Port")
            .string("Host", |r: &mut Sample, v| r.host = v)
            .int_or("Port", "5432", |r, v| r.port = v)
            .boolean("Debug", |r, v| r.debug = v)
            .params("Params", |r, v| r.params = v)
            .build()
    }

    #[test]
    fn test_builder_declaration_order() {
        let schema = sample_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Host", "Port", "Debug", "Params"]);
    }

    #[test]
    fn test_descriptor_kinds_and_roles() {
        let schema = sample_schema();
        let port = &schema.fields()[1];
        assert_eq!(port.kind(), FieldKind::Int);
        assert_eq!(port.role(), FieldRole::Value);
        assert_eq!(port.default(), Some("5432"));

        let params = &schema.fields()[3];
        assert_eq!(params.kind(), FieldKind::Map);
        assert_eq!(params.role(), FieldRole::Params);
        assert_eq!(params.default(), None);
    }

    #[test]
    fn test_setters_write_through() {
        let schema = sample_schema();
        let mut record = Sample::default();

        if let Setter::Str(set) = schema.fields()[0].setter() {
            set(&mut record, "example.com".to_string());
        }
        if let Setter::Bool(set) = schema.fields()[2].setter() {
            set(&mut record, true);
        }

        assert_eq!(record.host, "example.com");
        assert!(record.debug);
        assert_eq!(record.port, 0);
        assert!(record.params.is_empty());
    }

    #[test]
    fn test_field_kind_display() {
        assert_eq!(FieldKind::String.to_string(), "string");
        assert_eq!(FieldKind::Int.to_string(), "int");
        assert_eq!(FieldKind::Bool.to_string(), "bool");
        assert_eq!(FieldKind::Map.to_string(), "map");
    }
}

//! Binding captures and query parameters into typed record fields.

use crate::error::{DsnError, DsnResult};
use crate::pattern::{CaptureSet, Pattern};
use crate::query::QueryMap;
use crate::schema::{FieldDescriptor, FieldKind, FieldRole, RecordSchema, Setter};

/// Write captured and defaulted values into the record through its schema.
///
/// Resolution order for a value field: non-empty capture, then a query entry
/// with the same key, then the declared default. A field with none of these
/// keeps whatever value it already holds.
pub(crate) fn bind<R>(
    schema: &RecordSchema<R>,
    pattern: &Pattern,
    captures: &CaptureSet,
    query: &QueryMap,
    record: &mut R,
) -> DsnResult<()> {
    for field in schema.fields() {
        match field.role() {
            FieldRole::Params => assign_params(field, query, record)?,
            FieldRole::Scheme => {
                let scheme = captures
                    .scheme()
                    .or_else(|| pattern.scheme_hint())
                    .or_else(|| field.default());
                if let Some(scheme) = scheme {
                    assign(field, scheme, record)?;
                }
            }
            FieldRole::Value => {
                let raw = captures
                    .get(field.name())
                    .filter(|value| !value.is_empty())
                    .or_else(|| query.get(field.name()).map(String::as_str))
                    .filter(|value| !value.is_empty())
                    .or_else(|| field.default());
                if let Some(raw) = raw {
                    assign(field, raw, record)?;
                }
            }
        }
    }
    Ok(())
}

fn assign<R>(field: &FieldDescriptor<R>, raw: &str, record: &mut R) -> DsnResult<()> {
    match field.setter() {
        Setter::Str(set) => set(record, raw.to_string()),
        Setter::Int(set) => set(record, coerce_int(field, raw)?),
        Setter::Bool(set) => set(record, coerce_bool(field, raw)?),
        Setter::Map(_) => {
            return Err(DsnError::bind(
                field.name(),
                "map fields can only receive query parameters",
            ));
        }
    }
    Ok(())
}

fn assign_params<R>(
    field: &FieldDescriptor<R>,
    query: &QueryMap,
    record: &mut R,
) -> DsnResult<()> {
    match field.setter() {
        Setter::Map(set) => {
            set(record, query.clone());
            Ok(())
        }
        _ => Err(DsnError::bind(
            field.name(),
            format!("params field must be a map, not {}", field.kind()),
        )),
    }
}

fn coerce_int<R>(field: &FieldDescriptor<R>, raw: &str) -> DsnResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| DsnError::coercion(field.name(), raw, FieldKind::Int.as_str()))
}

fn coerce_bool<R>(field: &FieldDescriptor<R>, raw: &str) -> DsnResult<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(DsnError::coercion(field.name(), raw, FieldKind::Bool.as_str()))
    }
}

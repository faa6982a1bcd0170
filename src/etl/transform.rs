//! Transformer trait and the change-record decoder

use crate::error::RecordError;
use crate::model::ChangeRecord;
use serde_json::{Map, Value};

/// Transformer trait for transforming data items
///
/// Implementors define how to transform items:
/// - Validation of loosely typed payloads
/// - Format conversion
///
/// # Example
/// ```
/// use field_history_extractor::etl::Transformer;
///
/// struct Uppercase;
///
/// impl Transformer for Uppercase {
///     type Input = String;
///     type Output = String;
///     type Error = std::convert::Infallible;
///
///     fn transform(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
///         Ok(input.to_uppercase())
///     }
/// }
///
/// let out = Uppercase.transform_many(vec!["a".into(), "b".into()]).unwrap();
/// assert_eq!(out, vec!["A", "B"]);
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    type Error;

    /// Transform a single item
    fn transform(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;

    /// Transform multiple items, stopping at the first failure
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>, Self::Error> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}

/// Decodes raw query records into [`ChangeRecord`]s.
///
/// The parent reference is read from the column resolved for the entity
/// (`ParentId`, `AccountId`, ...).
pub struct RecordDecoder {
    parent_field: String,
}

impl RecordDecoder {
    pub fn new(parent_field: impl Into<String>) -> Self {
        Self {
            parent_field: parent_field.into(),
        }
    }

    pub fn parent_field(&self) -> &str {
        &self.parent_field
    }
}

impl Transformer for RecordDecoder {
    type Input = Value;
    type Output = ChangeRecord;
    type Error = RecordError;

    fn transform(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let record = input.as_object().ok_or(RecordError::NotAnObject)?;
        let attributes = required(record, "attributes")?
            .as_object()
            .ok_or_else(|| RecordError::InvalidAttribute {
                name: "attributes".to_string(),
                expected: "an object",
            })?;

        Ok(ChangeRecord {
            id: string(record, "Id")?,
            parent_reference: string(record, &self.parent_field)?,
            field: string(record, "Field")?,
            old_value: scalar(required(record, "OldValue")?),
            new_value: scalar(required(record, "NewValue")?),
            created_by_id: string(record, "CreatedById")?,
            created_date: string(record, "CreatedDate")?,
            is_deleted: required(record, "IsDeleted")?
                .as_bool()
                .ok_or_else(|| RecordError::InvalidAttribute {
                    name: "IsDeleted".to_string(),
                    expected: "a boolean",
                })?,
            record_url: string_as(attributes, "url", "attributes.url")?,
            record_type: string_as(attributes, "type", "attributes.type")?,
        })
    }
}

fn required<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value, RecordError> {
    required_as(object, key, key)
}

/// Like [`required`], reporting a missing value under `name`.
fn required_as<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    name: &str,
) -> Result<&'a Value, RecordError> {
    object
        .get(key)
        .ok_or_else(|| RecordError::MissingAttribute(name.to_string()))
}

fn string(object: &Map<String, Value>, key: &str) -> Result<String, RecordError> {
    string_as(object, key, key)
}

fn string_as(object: &Map<String, Value>, key: &str, name: &str) -> Result<String, RecordError> {
    required_as(object, key, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RecordError::InvalidAttribute {
            name: name.to_string(),
            expected: "a string",
        })
}

/// Old/new values may be any JSON type; `null` is an empty cell.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

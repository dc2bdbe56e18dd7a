pub mod stats;
pub mod transaction;
pub mod wallet;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::providers::traits::{Document, Fields};

/// Rebuild a model from a stored document. The document id is folded
/// into the field map so models deserialize their `id` like any other
/// field.
pub(crate) fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, serde_json::Error> {
    let mut fields = doc.fields;
    fields.insert("id".to_string(), Value::String(doc.id));
    serde_json::from_value(Value::Object(fields))
}

/// Serialize a model into the field map written to the store. The id is
/// stripped — it travels as the document key, not as a field.
pub(crate) fn to_fields<T: Serialize>(value: &T) -> Result<Fields, serde_json::Error> {
    let mut fields: Fields = serde_json::from_value(serde_json::to_value(value)?)?;
    fields.remove("id");
    Ok(fields)
}

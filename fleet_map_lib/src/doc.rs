//! JSON mapping for the hosted document store's typed-value wire format.
//!
//! Documents arrive as `{"name": "projects/.../documents/<collection>/<id>",
//! "fields": {"foo": {"stringValue": "..."}}}`; only the value kinds this
//! client actually stores are interpreted.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::session::Role;

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// Full resource name; the backend-assigned id is its last segment.
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

/// Envelope of a collection list response. The `documents` key is absent
/// entirely when the collection is empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserDoc {
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerDoc {
    pub id: String,
    pub name: String,
    pub data: String,
    pub color: String,
}

pub fn document_id(resource_name: &str) -> &str {
    match resource_name.rfind('/') {
        Some(slash) => &resource_name[slash + 1..],
        None => resource_name,
    }
}

fn string_field<'a>(fields: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key)?.get("stringValue")?.as_str()
}

fn required_field<'a>(
    document: &'a Document,
    key: &str,
) -> Result<&'a str, ApiError> {
    string_field(&document.fields, key).ok_or_else(|| {
        ApiError::Backend(format!(
            "document {} is missing the {key} field",
            document_id(&document.name)
        ))
    })
}

pub fn decode_user(document: &Document) -> Result<UserDoc, ApiError> {
    let password = required_field(document, "password")?.to_string();
    // A record without a role still logs in, with no extra privileges.
    let role = string_field(&document.fields, "role").unwrap_or_default();
    Ok(UserDoc {
        password,
        role: Role::from(role.to_string()),
    })
}

pub fn decode_layer(document: &Document) -> Result<LayerDoc, ApiError> {
    Ok(LayerDoc {
        id: document_id(&document.name).to_string(),
        name: required_field(document, "name")?.to_string(),
        data: required_field(document, "data")?.to_string(),
        color: required_field(document, "color")?.to_string(),
    })
}

/// Request body for creating a layer document.
pub fn encode_layer(name: &str, data: &str, color: &str, created_at: DateTime<Utc>) -> Value {
    json!({
        "fields": {
            "name": { "stringValue": name },
            "data": { "stringValue": data },
            "color": { "stringValue": color },
            "createdAt": { "timestampValue": created_at.to_rfc3339_opts(SecondsFormat::Millis, true) },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER_DOCUMENT: &str = r##"{
        "name": "projects/demo/databases/(default)/documents/geojson_layers/abc123",
        "fields": {
            "name": {"stringValue": "Roads"},
            "data": {"stringValue": "{\"type\": \"FeatureCollection\", \"features\": []}"},
            "color": {"stringValue": "#00ff00"},
            "createdAt": {"timestampValue": "2025-03-01T08:00:00.000Z"}
        },
        "createTime": "2025-03-01T08:00:00.120Z",
        "updateTime": "2025-03-01T08:00:00.120Z"
    }"##;

    #[test]
    fn layer_document_decodes() {
        let document: Document = serde_json::from_str(LAYER_DOCUMENT).unwrap();
        let layer = decode_layer(&document).unwrap();
        assert_eq!(layer.id, "abc123");
        assert_eq!(layer.name, "Roads");
        assert_eq!(layer.color, "#00ff00");
        assert!(layer.data.contains("FeatureCollection"));
    }

    #[test]
    fn missing_field_is_a_backend_error() {
        let document: Document = serde_json::from_str(
            r#"{"name": "projects/demo/databases/(default)/documents/geojson_layers/abc123",
                "fields": {"name": {"stringValue": "Roads"}}}"#,
        )
        .unwrap();
        assert!(matches!(decode_layer(&document), Err(ApiError::Backend(_))));
    }

    #[test]
    fn user_document_decodes_with_and_without_role() {
        let document: Document = serde_json::from_str(
            r#"{"name": "projects/demo/databases/(default)/documents/users/budi",
                "fields": {"password": {"stringValue": "rahasia"}, "role": {"stringValue": "sopir"}}}"#,
        )
        .unwrap();
        let user = decode_user(&document).unwrap();
        assert_eq!(user.password, "rahasia");
        assert_eq!(user.role, Role::Driver);

        let bare: Document = serde_json::from_str(
            r#"{"name": "projects/demo/databases/(default)/documents/users/anon",
                "fields": {"password": {"stringValue": "x"}}}"#,
        )
        .unwrap();
        assert_eq!(decode_user(&bare).unwrap().role, Role::Other(String::new()));
    }

    #[test]
    fn empty_list_envelope_decodes_to_no_documents() {
        let list: DocumentList = serde_json::from_str("{}").unwrap();
        assert!(list.documents.is_empty());
    }

    #[test]
    fn encode_layer_produces_typed_values() {
        let created_at = DateTime::parse_from_rfc3339("2025-03-01T08:00:00Z")
            .unwrap()
            .into();
        let body = encode_layer("Roads", "{}", "#00ff00", created_at);
        assert_eq!(body["fields"]["name"]["stringValue"], "Roads");
        assert_eq!(body["fields"]["color"]["stringValue"], "#00ff00");
        assert_eq!(
            body["fields"]["createdAt"]["timestampValue"],
            "2025-03-01T08:00:00.000Z"
        );
    }

    #[test]
    fn document_id_takes_the_last_segment() {
        assert_eq!(
            document_id("projects/demo/databases/(default)/documents/geojson_layers/abc123"),
            "abc123"
        );
        assert_eq!(document_id("abc123"), "abc123");
    }
}

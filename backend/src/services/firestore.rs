//! Firestore adapter
//!
//! Client records live in the `clients` collection, one document per client id.
//! Writes use `PATCH` with an `updateMask` listing exactly the supplied fields,
//! which gives merge semantics: fields not named in the mask are preserved.

use crate::services::http::{ensure_success, read_json, require};
use crate::services::{ClientRecords, ServiceError, TokenProvider};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const SERVICE: &str = "firestore";
const COLLECTION: &str = "clients";
const SEARCH_LIMIT: u32 = 50;
/// Highest code point in the BMP private use area, used as a prefix upper bound
const PREFIX_END: char = '\u{f8ff}';

/// A client document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Document id (the client id)
    pub id: String,
    /// Stored fields, decoded to plain JSON
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ClientRecord {
    /// Build a record, dropping any stored `id` field
    ///
    /// `fields` is flattened next to `id` on the wire, so a stored `id` key
    /// would otherwise be serialized twice.
    pub fn new(id: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self {
            id: id.into(),
            fields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl From<Document> for ClientRecord {
    fn from(doc: Document) -> Self {
        let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
        let fields = doc
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), from_firestore_value(v)))
            .collect();
        ClientRecord::new(id, fields)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    document: Option<Document>,
}

/// Encode a JSON value as a Firestore typed value
pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore transports int64 as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": to_firestore_fields(map) } }),
    }
}

fn to_firestore_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(v)))
        .collect()
}

/// Decode a Firestore typed value; unknown kinds become `null`
pub fn from_firestore_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(from_firestore_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), from_firestore_value(v)))
                        .collect()
                })
                .unwrap_or_default(),
        ),
        "geoPointValue" => inner.clone(),
        _ => Value::Null,
    }
}

/// Quote a field name for use in an update mask when it is not a simple identifier
pub fn field_path(key: &str) -> String {
    let simple = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        key.to_string()
    } else {
        format!("`{}`", key.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

/// Firestore REST client scoped to one project
#[derive(Debug)]
pub struct FirestoreClient {
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
    base_url: Url,
    project_id: String,
}

impl FirestoreClient {
    /// Create a client for `project_id`
    ///
    /// # Errors
    /// Returns `ServiceError::InvalidInput` if `base_url` is not a valid URL.
    pub fn new(
        http: reqwest::Client,
        tokens: Arc<TokenProvider>,
        base_url: &str,
        project_id: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid Firestore URL: {}", e)))?;
        Ok(Self {
            http,
            tokens,
            base_url,
            project_id: project_id.into(),
        })
    }

    fn documents_url(&self, tail: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidInput("Firestore URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v1", "projects", self.project_id.as_str(), "databases", "(default)"])
            .extend(tail);
        Ok(url)
    }

    fn document_url(&self, id: &str) -> Result<Url, ServiceError> {
        self.documents_url(&["documents", COLLECTION, id])
    }
}

#[async_trait]
impl ClientRecords for FirestoreClient {
    async fn upsert(
        &self,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<ClientRecord, ServiceError> {
        require(id, "client id")?;
        if fields.is_empty() {
            // An empty mask would replace the whole document
            return Err(ServiceError::InvalidInput(
                "at least one field is required".to_string(),
            ));
        }

        let mut url = self.document_url(id)?;
        {
            let mut query = url.query_pairs_mut();
            for key in fields.keys() {
                query.append_pair("updateMask.fieldPaths", &field_path(key));
            }
        }

        tracing::debug!(client_id = %id, field_count = fields.len(), "Upserting client record");

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .patch(url)
            .bearer_auth(token)
            .json(&json!({ "fields": to_firestore_fields(fields) }))
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        let doc: Document = read_json(SERVICE, response).await?;
        Ok(doc.into())
    }

    async fn get(&self, id: &str) -> Result<Option<ClientRecord>, ServiceError> {
        require(id, "client id")?;
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(self.document_url(id)?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        match read_json::<Document>(SERVICE, response).await {
            Ok(doc) => Ok(Some(doc.into())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        require(id, "client id")?;
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .delete(self.document_url(id)?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }

    async fn search(&self, prefix: &str) -> Result<Vec<ClientRecord>, ServiceError> {
        let mut query = json!({
            "from": [{ "collectionId": COLLECTION }],
            "limit": SEARCH_LIMIT,
        });

        let prefix = prefix.trim();
        if !prefix.is_empty() {
            let upper = format!("{}{}", prefix, PREFIX_END);
            query["where"] = json!({
                "compositeFilter": {
                    "op": "AND",
                    "filters": [
                        { "fieldFilter": {
                            "field": { "fieldPath": "name" },
                            "op": "GREATER_THAN_OR_EQUAL",
                            "value": { "stringValue": prefix },
                        }},
                        { "fieldFilter": {
                            "field": { "fieldPath": "name" },
                            "op": "LESS_THAN",
                            "value": { "stringValue": upper },
                        }},
                    ],
                }
            });
        }

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(self.documents_url(&["documents:runQuery"])?)
            .bearer_auth(token)
            .json(&json!({ "structuredQuery": query }))
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;

        let results: Vec<QueryResult> = read_json(SERVICE, response).await?;
        Ok(results
            .into_iter()
            .filter_map(|r| r.document)
            .map(ClientRecord::from)
            .collect())
    }
}

use serde::Deserialize;
use serde_json::Value;

/// Prefix of design documents, which never hold library data.
pub const DESIGN_PREFIX: &str = "_design/";

/// Body of `GET /{db}/_all_docs?include_docs=true`.
#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    /// One row per document, design documents included.
    pub rows: Vec<AllDocsRow>,
}

/// Row of an `_all_docs` listing.
#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    /// Document id.
    pub id: String,
    /// Full document body.
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Body returned by CouchDB after a successful PUT.
#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    /// Id written.
    pub id: String,
    /// New revision.
    pub rev: String,
}

/// Whether a raw CouchDB document is tagged with `collection`.
pub fn has_collection(doc: &Value, collection: &str) -> bool {
    doc.get("$collection").and_then(Value::as_str) == Some(collection)
}

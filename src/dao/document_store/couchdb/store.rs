use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{Value, from_value};
use tracing::debug;

use crate::dao::{
    document_store::{DocumentStore, check_revision, new_document_id},
    models::{Collection, Document},
    storage::{StorageError, StorageResult},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{AllDocsResponse, DESIGN_PREFIX, WriteResponse, has_collection},
};

/// Document store living in a CouchDB database, which other devices can replicate from.
#[derive(Clone)]
pub struct CouchDocumentStore {
    client: Client,
    database_url: Arc<Url>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchDocumentStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let database_url = Arc::new(database_url(&config.base_url, &config.database)?);
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            database_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    /// Request against one path segment below the database, percent-encoded.
    fn request(&self, method: Method, segment: &str) -> reqwest::RequestBuilder {
        let url = segment_url(&self.database_url, segment);
        self.authorize(self.client.request(method, url))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = Url::clone(&self.database_url);

        let response = self
            .authorize(self.client.get(url.clone()))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .authorize(self.client.put(url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_raw(&self, doc_id: &str) -> CouchResult<Option<Value>> {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<Value>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn get_document(&self, doc_id: String) -> StorageResult<Document> {
        if doc_id.is_empty() {
            return Err(StorageError::NotFound { id: doc_id });
        }
        let Some(raw) = self.get_raw(&doc_id).await? else {
            return Err(StorageError::NotFound { id: doc_id });
        };
        from_value(raw).map_err(|source| StorageError::Serialization { source })
    }

    async fn list_documents(&self, collection: Collection) -> StorageResult<Vec<Document>> {
        const ALL_DOCS: &str = "_all_docs";

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&[("include_docs", "true")])
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            }
            .into());
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        let mut documents = Vec::new();
        for row in payload.rows {
            if row.id.starts_with(DESIGN_PREFIX) {
                continue;
            }
            let Some(doc) = row.doc else {
                continue;
            };
            if !has_collection(&doc, collection.as_str()) {
                continue;
            }
            let parsed = from_value(doc).map_err(|source| CouchDaoError::DeserializeValue {
                path: row.id.clone(),
                source,
            })?;
            documents.push(parsed);
        }

        Ok(documents)
    }

    async fn put_document(&self, mut document: Document) -> StorageResult<Document> {
        let id = document
            .id()
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(new_document_id);
        document.meta_mut().id = Some(id.clone());

        if document.rev().is_some() {
            if let Some(existing) = self.get_raw(&id).await? {
                let incoming = document.collection();
                if !has_collection(&existing, incoming.as_str()) {
                    let stored = from_value::<Document>(existing)
                        .map_err(|source| StorageError::Serialization { source })?
                        .collection();
                    return Err(StorageError::CollectionMismatch {
                        id,
                        expected: stored,
                        actual: incoming,
                    });
                }
            }
        }

        let response = self
            .request(Method::PUT, &id)
            .json(&document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: id.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::CONFLICT => Err(StorageError::Conflict { id }),
            status if status.is_success() => {
                let written = response.json::<WriteResponse>().await.map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: id.clone(),
                        source,
                    }
                })?;
                debug!(id = %written.id, rev = %written.rev, "document written to CouchDB");
                document.meta_mut().rev = Some(written.rev);
                Ok(document)
            }
            other => Err(CouchDaoError::RequestStatus {
                path: id,
                status: other,
            }
            .into()),
        }
    }

    async fn delete_document(&self, document: Document) -> StorageResult<()> {
        let Some(id) = document.id().filter(|id| !id.is_empty()).map(str::to_owned) else {
            return Err(StorageError::not_found(""));
        };
        let stored = self.get_raw(&id).await?;
        let rev = removal_revision(&id, document.rev(), stored.as_ref())?;

        let response = self
            .request(Method::DELETE, &id)
            .query(&[("rev", rev.as_str())])
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: id.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StorageError::NotFound { id }),
            StatusCode::CONFLICT => Err(StorageError::Conflict { id }),
            status if status.is_success() => Ok(()),
            other => Err(CouchDaoError::RequestStatus {
                path: id,
                status: other,
            }
            .into()),
        }
    }
}

/// Parse the server URL and append the database name as one encoded segment.
fn database_url(base_url: &str, database: &str) -> CouchResult<Url> {
    let invalid = |reason: String| CouchDaoError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let mut url = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot carry a path".into()))?
        .pop_if_empty()
        .push(database);
    Ok(url)
}

fn segment_url(database_url: &Url, segment: &str) -> Url {
    let mut url = database_url.clone();
    // `database_url` already accepted a pushed segment.
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(segment);
    }
    url
}

/// Revision to send with a DELETE: the id must exist first, then the revision must match.
fn removal_revision(
    id: &str,
    supplied: Option<&str>,
    stored: Option<&Value>,
) -> StorageResult<String> {
    let Some(stored) = stored else {
        return Err(StorageError::not_found(id));
    };
    check_revision(id, supplied, stored.get("_rev").and_then(Value::as_str))?;
    supplied
        .map(str::to_owned)
        .ok_or_else(|| StorageError::conflict(id))
}

impl DocumentStore for CouchDocumentStore {
    fn get(&self, id: String) -> BoxFuture<'static, StorageResult<Document>> {
        let store = self.clone();
        Box::pin(async move { store.get_document(id).await })
    }

    fn list_by_collection(
        &self,
        collection: Collection,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
        let store = self.clone();
        Box::pin(async move { store.list_documents(collection).await })
    }

    fn upsert(&self, document: Document) -> BoxFuture<'static, StorageResult<Document>> {
        let store = self.clone();
        Box::pin(async move { store.put_document(document).await })
    }

    fn remove(&self, document: Document) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete_document(document).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url.to_string();
            let response = store
                .authorize(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }
}

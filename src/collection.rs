use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::embedding::EmbeddingFunction;
use crate::error::{ChromaError, Result};
use crate::filters::{Where, WhereDocument};
use crate::mapper::{map_get, transpose_query, transpose_single};
use crate::meta::{CollectionNames, Routes};
use crate::params::PathParams;
use crate::transport::Requester;
use crate::types::{
    Collection, CollectionEntry, Embedding, GetResponse, Include, IncludeField, Metadata,
    QueryEntry, QueryResponse,
};

/// Client bound to a single collection within a tenant/database scope.
#[derive(Clone)]
pub struct CollectionClient {
    requester: Requester,
    collection: Collection,
    tenant: String,
    database: String,
    embedding_function: Option<Arc<dyn EmbeddingFunction>>,
}

#[derive(Serialize)]
struct GetRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ids: Option<&'a [String]>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    where_meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    where_document: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<u32>,
    include: Vec<&'static str>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: &'a [Embedding],
    n_results: u32,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    where_meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    where_document: Option<Value>,
    include: Vec<&'static str>,
}

#[derive(Serialize)]
struct RecordsRequest<'a> {
    ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    embeddings: Option<&'a [Embedding]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadatas: Option<&'a [Metadata]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    documents: Option<&'a [String]>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ids: Option<&'a [String]>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    where_meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    where_document: Option<Value>,
}

#[derive(Serialize)]
struct ModifyRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    new_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_metadata: Option<&'a Metadata>,
}

impl CollectionClient {
    pub(crate) fn new(
        requester: Requester,
        collection: Collection,
        tenant: String,
        database: String,
    ) -> Self {
        Self {
            requester,
            collection,
            tenant,
            database,
            embedding_function: None,
        }
    }

    /// Attach an embedding function used by [`CollectionClient::query_texts`]
    /// and by writes that carry documents without embeddings.
    pub fn with_embedding_function<Ef: EmbeddingFunction + 'static>(mut self, ef: Ef) -> Self {
        self.embedding_function = Some(Arc::new(ef));
        self
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.collection.id
    }

    pub fn name(&self) -> &str {
        &self.collection.name
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.collection.metadata.as_ref()
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    // DQL
    pub async fn get(
        &self,
        ids: Option<&[String]>,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        limit: Option<u32>,
        offset: Option<u32>,
        include: Option<&[IncludeField]>,
    ) -> Result<Vec<CollectionEntry>> {
        let include = include.map(Include::from_fields).unwrap_or_else(Include::get_default);
        let request = GetRequest {
            ids,
            where_meta: where_meta.map(Where::to_value).transpose()?,
            where_document: where_doc.map(WhereDocument::to_value).transpose()?,
            limit,
            offset,
            include: include.to_get_wire()?,
        };
        let response: GetResponse = self
            .requester
            .post(Routes::COLLECTION_GET, &request, &self.params())
            .await?;
        map_get(response)
    }

    /// Fetch a single record by id, if present.
    pub async fn get_one(
        &self,
        id: &str,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        include: Option<&[IncludeField]>,
    ) -> Result<Option<CollectionEntry>> {
        let ids = [id.to_string()];
        let entries = self
            .get(Some(ids.as_slice()), where_meta, where_doc, None, None, include)
            .await?;
        Ok(entries.into_iter().next())
    }

    /// Nearest-neighbour query for a batch of embeddings; one ranked list per
    /// query embedding, in submission order.
    pub async fn query(
        &self,
        query_embeddings: &[Embedding],
        n_results: u32,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        include: Option<&[IncludeField]>,
    ) -> Result<Vec<Vec<QueryEntry>>> {
        let response = self
            .query_raw(query_embeddings, n_results, where_meta, where_doc, include)
            .await?;
        transpose_query(response)
    }

    /// Single-embedding form of [`CollectionClient::query`].
    pub async fn query_one(
        &self,
        query_embedding: &[f32],
        n_results: u32,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        include: Option<&[IncludeField]>,
    ) -> Result<Vec<QueryEntry>> {
        let batch = [query_embedding.to_vec()];
        let response = self
            .query_raw(&batch, n_results, where_meta, where_doc, include)
            .await?;
        transpose_single(response)
    }

    /// Embed `texts` with the attached embedding function, then query.
    pub async fn query_texts(
        &self,
        texts: &[String],
        n_results: u32,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        include: Option<&[IncludeField]>,
    ) -> Result<Vec<Vec<QueryEntry>>> {
        if texts.is_empty() {
            return Err(ChromaError::Validation("texts must not be empty".into()));
        }
        let ef = self.embedding_function.as_ref().ok_or_else(|| {
            ChromaError::Embedding(
                "query_texts requires an embedding function; attach one or query by embeddings"
                    .into(),
            )
        })?;
        let embeddings = embed_checked(ef.as_ref(), texts).await?;
        self.query(&embeddings, n_results, where_meta, where_doc, include)
            .await
    }

    pub async fn count(&self) -> Result<u32> {
        self.requester
            .get(Routes::COLLECTION_COUNT, &self.params())
            .await
    }

    /// First `limit` records with the default get include set.
    pub async fn peek(&self, limit: u32) -> Result<Vec<CollectionEntry>> {
        self.get(None, None, None, Some(limit), None, None).await
    }

    // DML
    pub async fn add(
        &self,
        ids: &[String],
        embeddings: Option<&[Embedding]>,
        metadatas: Option<&[Metadata]>,
        documents: Option<&[String]>,
    ) -> Result<()> {
        validate_records(ids, embeddings, metadatas, documents)?;
        let generated = match (embeddings, documents) {
            (Some(_), _) => None,
            (None, Some(docs)) => Some(self.embed_required(docs).await?),
            (None, None) => {
                return Err(ChromaError::Validation(
                    "either provide embeddings or provide documents with an embedding function"
                        .into(),
                ));
            }
        };
        self.write_records(
            Routes::COLLECTION_ADD,
            ids,
            generated.as_deref().or(embeddings),
            metadatas,
            documents,
        )
        .await
    }

    pub async fn update(
        &self,
        ids: &[String],
        embeddings: Option<&[Embedding]>,
        metadatas: Option<&[Metadata]>,
        documents: Option<&[String]>,
    ) -> Result<()> {
        self.write_partial(Routes::COLLECTION_UPDATE, ids, embeddings, metadatas, documents)
            .await
    }

    pub async fn upsert(
        &self,
        ids: &[String],
        embeddings: Option<&[Embedding]>,
        metadatas: Option<&[Metadata]>,
        documents: Option<&[String]>,
    ) -> Result<()> {
        self.write_partial(Routes::COLLECTION_UPSERT, ids, embeddings, metadatas, documents)
            .await
    }

    pub async fn delete(
        &self,
        ids: Option<&[String]>,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
    ) -> Result<()> {
        if ids.is_none() && where_meta.is_none() && where_doc.is_none() {
            return Err(ChromaError::Validation(
                "must provide at least one of ids/where_meta/where_doc".into(),
            ));
        }
        let request = DeleteRequest {
            ids,
            where_meta: where_meta.map(Where::to_value).transpose()?,
            where_document: where_doc.map(WhereDocument::to_value).transpose()?,
        };
        self.requester
            .post_unit(Routes::COLLECTION_DELETE, &request, &self.params())
            .await
    }

    /// Rename the collection and/or replace its metadata on the server.
    ///
    /// The local descriptor returned by [`CollectionClient::collection`] is
    /// not refreshed; fetch the collection again to observe the change.
    pub async fn modify(&self, name: Option<&str>, metadata: Option<&Metadata>) -> Result<()> {
        if let Some(name) = name {
            CollectionNames::validate(name)?;
        }
        let request = ModifyRequest {
            new_name: name,
            new_metadata: metadata,
        };
        self.requester
            .put(Routes::COLLECTION, &request, &self.params())
            .await
    }

    async fn query_raw(
        &self,
        query_embeddings: &[Embedding],
        n_results: u32,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        include: Option<&[IncludeField]>,
    ) -> Result<QueryResponse> {
        if query_embeddings.is_empty() {
            return Err(ChromaError::Validation(
                "query_embeddings cannot be empty".into(),
            ));
        }
        if n_results == 0 {
            return Err(ChromaError::Validation("n_results must be positive".into()));
        }
        // Every hit carries a distance, so it is always requested.
        let include = include
            .map(Include::from_fields)
            .unwrap_or_else(Include::query_default)
            .with(IncludeField::Distances);
        let request = QueryRequest {
            query_embeddings,
            n_results,
            where_meta: where_meta.map(Where::to_value).transpose()?,
            where_document: where_doc.map(WhereDocument::to_value).transpose()?,
            include: include.to_wire(),
        };
        self.requester
            .post(Routes::COLLECTION_QUERY, &request, &self.params())
            .await
    }

    async fn write_partial(
        &self,
        route: &str,
        ids: &[String],
        embeddings: Option<&[Embedding]>,
        metadatas: Option<&[Metadata]>,
        documents: Option<&[String]>,
    ) -> Result<()> {
        validate_records(ids, embeddings, metadatas, documents)?;
        if embeddings.is_none() && metadatas.is_none() && documents.is_none() {
            return Err(ChromaError::Validation(
                "nothing to write: provide embeddings/documents/metadatas".into(),
            ));
        }
        // Documents without embeddings are re-embedded when possible; otherwise
        // the server keeps the stored embedding.
        let generated = match (embeddings, documents, self.embedding_function.as_ref()) {
            (None, Some(docs), Some(ef)) => Some(embed_checked(ef.as_ref(), docs).await?),
            _ => None,
        };
        self.write_records(
            route,
            ids,
            generated.as_deref().or(embeddings),
            metadatas,
            documents,
        )
        .await
    }

    async fn write_records(
        &self,
        route: &str,
        ids: &[String],
        embeddings: Option<&[Embedding]>,
        metadatas: Option<&[Metadata]>,
        documents: Option<&[String]>,
    ) -> Result<()> {
        let request = RecordsRequest {
            ids,
            embeddings,
            metadatas,
            documents,
        };
        self.requester
            .post_unit(route, &request, &self.params())
            .await
    }

    async fn embed_required(&self, docs: &[String]) -> Result<Vec<Embedding>> {
        let ef = self.embedding_function.as_ref().ok_or_else(|| {
            ChromaError::Embedding(
                "documents provided but no embeddings and no embedding function; provide embeddings or attach an embedding function"
                    .into(),
            )
        })?;
        embed_checked(ef.as_ref(), docs).await
    }

    fn params(&self) -> PathParams {
        PathParams::new()
            .insert("{tenant}", self.tenant.as_str())
            .insert("{database}", self.database.as_str())
            .insert("{collection_id}", self.collection.id.as_str())
    }
}

async fn embed_checked(ef: &dyn EmbeddingFunction, docs: &[String]) -> Result<Vec<Embedding>> {
    debug!(count = docs.len(), "embedding documents");
    let embeddings = ef.embed_documents(docs).await?;
    if embeddings.len() != docs.len() {
        return Err(ChromaError::Embedding(format!(
            "embedding function returned {} embeddings for {} inputs",
            embeddings.len(),
            docs.len()
        )));
    }
    Ok(embeddings)
}

fn validate_records(
    ids: &[String],
    embeddings: Option<&[Embedding]>,
    metadatas: Option<&[Metadata]>,
    documents: Option<&[String]>,
) -> Result<()> {
    if ids.is_empty() {
        return Err(ChromaError::Validation("ids must not be empty".into()));
    }
    check_len("embeddings", embeddings.map(<[_]>::len), ids.len())?;
    check_len("metadatas", metadatas.map(<[_]>::len), ids.len())?;
    check_len("documents", documents.map(<[_]>::len), ids.len())?;
    Ok(())
}

fn check_len(name: &str, len: Option<usize>, expected: usize) -> Result<()> {
    match len {
        Some(n) if n != expected => Err(ChromaError::Validation(format!(
            "{name} length {n} does not match ids length {expected}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_records_length_mismatch() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let embeddings = vec![vec![0.1_f32, 0.2_f32]];
        let err = validate_records(&ids, Some(embeddings.as_slice()), None, None).unwrap_err();
        assert!(matches!(err, ChromaError::Validation(_)));
        let err = validate_records(&[], None, None, None).unwrap_err();
        assert!(matches!(err, ChromaError::Validation(_)));
    }

    #[test]
    fn test_get_request_shape() {
        let ids = vec!["a".to_string()];
        let request = GetRequest {
            ids: Some(ids.as_slice()),
            where_meta: Some(Where::eq("k", "v").unwrap().to_value().unwrap()),
            where_document: None,
            limit: Some(5),
            offset: None,
            include: Include::get_default().to_get_wire().unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "ids": ["a"],
                "where": {"k": {"$eq": "v"}},
                "limit": 5,
                "include": ["documents", "metadatas"]
            })
        );
    }

    #[test]
    fn test_records_request_omits_absent_fields() {
        let ids = vec!["a".to_string()];
        let docs = vec!["text".to_string()];
        let request = RecordsRequest {
            ids: &ids,
            embeddings: None,
            metadatas: None,
            documents: Some(docs.as_slice()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"ids": ["a"], "documents": ["text"]})
        );
    }
}

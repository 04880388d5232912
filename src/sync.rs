use std::sync::Arc;

use crate::client::{ChromaClient, ChromaClientBuilder};
use crate::collection::CollectionClient;
use crate::config::ClientConfig;
use crate::embedding::EmbeddingFunction;
use crate::error::{ChromaError, Result};
use crate::filters::{Where, WhereDocument};
use crate::types::{
    Collection, CollectionEntry, Database, Embedding, Heartbeat, IncludeField, Metadata,
    QueryEntry, Tenant,
};

/// Shared inner state for synchronous wrappers.
///
/// Holds a Tokio runtime and the underlying async `ChromaClient`.
struct Inner {
    rt: tokio::runtime::Runtime,
    client: ChromaClient,
}

impl Inner {
    fn new(client: ChromaClient) -> Result<Arc<Self>> {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| ChromaError::Other(anyhow::Error::new(e)))?;
        Ok(Arc::new(Self { rt, client }))
    }
}

/// Blocking/synchronous wrapper around [`ChromaClient`].
///
/// This type is only available when the `sync` feature is enabled. It runs all
/// operations on an internal Tokio runtime using `block_on`.
///
/// Note: do not call these blocking APIs from within an existing Tokio runtime,
/// as that panics. In async contexts, use the async [`ChromaClient`] APIs
/// directly instead.
#[derive(Clone)]
pub struct SyncChromaClient {
    inner: Arc<Inner>,
}

impl SyncChromaClient {
    /// Build a synchronous client from a [`ClientConfig`].
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            inner: Inner::new(ChromaClient::new(config)?)?,
        })
    }

    /// Build a synchronous client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Wrap an already-built async client.
    pub fn from_client(client: ChromaClient) -> Result<Self> {
        Ok(Self {
            inner: Inner::new(client)?,
        })
    }

    /// Start building a [`SyncChromaClient`] using a fluent builder API.
    pub fn builder() -> SyncChromaClientBuilder {
        SyncChromaClientBuilder::new()
    }

    pub fn heartbeat(&self) -> Result<Heartbeat> {
        self.inner.rt.block_on(self.inner.client.heartbeat())
    }

    pub fn version(&self) -> Result<String> {
        self.inner.rt.block_on(self.inner.client.version())
    }

    /// Reset the whole server. Only honored when the server allows resets.
    pub fn reset(&self) -> Result<bool> {
        self.inner.rt.block_on(self.inner.client.reset())
    }

    // Collection management

    pub fn list_collections(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<Vec<Collection>> {
        self.inner.rt.block_on(
            self.inner
                .client
                .list_collections(limit, offset, tenant, database),
        )
    }

    pub fn count_collections(&self, tenant: Option<&str>, database: Option<&str>) -> Result<u32> {
        self.inner
            .rt
            .block_on(self.inner.client.count_collections(tenant, database))
    }

    pub fn create_collection(
        &self,
        name: &str,
        metadata: Option<&Metadata>,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<SyncCollection> {
        let collection = self.inner.rt.block_on(
            self.inner
                .client
                .create_collection(name, metadata, tenant, database),
        )?;
        Ok(self.wrap(collection))
    }

    pub fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Option<&Metadata>,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<SyncCollection> {
        let collection = self.inner.rt.block_on(
            self.inner
                .client
                .get_or_create_collection(name, metadata, tenant, database),
        )?;
        Ok(self.wrap(collection))
    }

    pub fn get_collection(
        &self,
        name: &str,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<SyncCollection> {
        let collection = self
            .inner
            .rt
            .block_on(self.inner.client.get_collection(name, tenant, database))?;
        Ok(self.wrap(collection))
    }

    pub fn delete_collection(
        &self,
        name: &str,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.delete_collection(name, tenant, database))
    }

    // Admin helpers

    pub fn create_tenant(&self, name: &str) -> Result<()> {
        self.inner.rt.block_on(self.inner.client.create_tenant(name))
    }

    pub fn get_tenant(&self, name: &str) -> Result<Tenant> {
        self.inner.rt.block_on(self.inner.client.get_tenant(name))
    }

    pub fn create_database(&self, name: &str, tenant: Option<&str>) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.create_database(name, tenant))
    }

    pub fn get_database(&self, name: &str, tenant: Option<&str>) -> Result<Database> {
        self.inner
            .rt
            .block_on(self.inner.client.get_database(name, tenant))
    }

    pub fn delete_database(&self, name: &str, tenant: Option<&str>) -> Result<()> {
        self.inner
            .rt
            .block_on(self.inner.client.delete_database(name, tenant))
    }

    pub fn list_databases(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        tenant: Option<&str>,
    ) -> Result<Vec<Database>> {
        self.inner
            .rt
            .block_on(self.inner.client.list_databases(limit, offset, tenant))
    }

    fn wrap(&self, collection: CollectionClient) -> SyncCollection {
        SyncCollection {
            inner: Arc::clone(&self.inner),
            collection,
        }
    }
}

/// Builder for constructing a [`SyncChromaClient`].
pub struct SyncChromaClientBuilder {
    inner: ChromaClientBuilder,
}

impl SyncChromaClientBuilder {
    fn new() -> Self {
        Self {
            inner: ChromaClient::builder(),
        }
    }

    /// Populate the builder from `CHROMA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            inner: ChromaClientBuilder::from_env()?,
        })
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.inner = self.inner.uri(uri);
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.inner = self.inner.tenant(tenant);
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.inner = self.inner.database(database);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.token(token);
        self
    }

    /// Build a [`SyncChromaClient`] using the current builder configuration.
    pub fn build(self) -> Result<SyncChromaClient> {
        SyncChromaClient::from_client(self.inner.build()?)
    }
}

/// Blocking/synchronous wrapper around [`CollectionClient`].
#[derive(Clone)]
pub struct SyncCollection {
    inner: Arc<Inner>,
    collection: CollectionClient,
}

impl SyncCollection {
    pub fn with_embedding_function<Ef: EmbeddingFunction + 'static>(mut self, ef: Ef) -> Self {
        self.collection = self.collection.with_embedding_function(ef);
        self
    }

    pub fn id(&self) -> &str {
        self.collection.id()
    }

    pub fn name(&self) -> &str {
        self.collection.name()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.collection.metadata()
    }

    pub fn add(
        &self,
        ids: &[String],
        embeddings: Option<&[Embedding]>,
        metadatas: Option<&[Metadata]>,
        documents: Option<&[String]>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.collection.add(ids, embeddings, metadatas, documents))
    }

    pub fn update(
        &self,
        ids: &[String],
        embeddings: Option<&[Embedding]>,
        metadatas: Option<&[Metadata]>,
        documents: Option<&[String]>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.collection.update(ids, embeddings, metadatas, documents))
    }

    pub fn upsert(
        &self,
        ids: &[String],
        embeddings: Option<&[Embedding]>,
        metadatas: Option<&[Metadata]>,
        documents: Option<&[String]>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.collection.upsert(ids, embeddings, metadatas, documents))
    }

    pub fn delete(
        &self,
        ids: Option<&[String]>,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
    ) -> Result<()> {
        self.inner
            .rt
            .block_on(self.collection.delete(ids, where_meta, where_doc))
    }

    pub fn query(
        &self,
        query_embeddings: &[Embedding],
        n_results: u32,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        include: Option<&[IncludeField]>,
    ) -> Result<Vec<Vec<QueryEntry>>> {
        self.inner.rt.block_on(self.collection.query(
            query_embeddings,
            n_results,
            where_meta,
            where_doc,
            include,
        ))
    }

    pub fn query_one(
        &self,
        query_embedding: &[f32],
        n_results: u32,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        include: Option<&[IncludeField]>,
    ) -> Result<Vec<QueryEntry>> {
        self.inner.rt.block_on(self.collection.query_one(
            query_embedding,
            n_results,
            where_meta,
            where_doc,
            include,
        ))
    }

    pub fn query_texts(
        &self,
        texts: &[String],
        n_results: u32,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        include: Option<&[IncludeField]>,
    ) -> Result<Vec<Vec<QueryEntry>>> {
        self.inner.rt.block_on(self.collection.query_texts(
            texts,
            n_results,
            where_meta,
            where_doc,
            include,
        ))
    }

    pub fn get(
        &self,
        ids: Option<&[String]>,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        limit: Option<u32>,
        offset: Option<u32>,
        include: Option<&[IncludeField]>,
    ) -> Result<Vec<CollectionEntry>> {
        self.inner.rt.block_on(self.collection.get(
            ids,
            where_meta,
            where_doc,
            limit,
            offset,
            include,
        ))
    }

    pub fn get_one(
        &self,
        id: &str,
        where_meta: Option<&Where>,
        where_doc: Option<&WhereDocument>,
        include: Option<&[IncludeField]>,
    ) -> Result<Option<CollectionEntry>> {
        self.inner
            .rt
            .block_on(self.collection.get_one(id, where_meta, where_doc, include))
    }

    pub fn count(&self) -> Result<u32> {
        self.inner.rt.block_on(self.collection.count())
    }

    pub fn peek(&self, limit: u32) -> Result<Vec<CollectionEntry>> {
        self.inner.rt.block_on(self.collection.peek(limit))
    }

    pub fn modify(&self, name: Option<&str>, metadata: Option<&Metadata>) -> Result<()> {
        self.inner
            .rt
            .block_on(self.collection.modify(name, metadata))
    }
}

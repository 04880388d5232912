use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::collection::CollectionClient;
use crate::config::{ClientConfig, resolve_or_default};
use crate::error::Result;
use crate::meta::{CollectionNames, Routes};
use crate::params::PathParams;
use crate::transport::{HttpTransport, Requester, Transport};
use crate::types::{Collection, Database, Heartbeat, Metadata, Tenant};

/// Builder for configuring and constructing a [`ChromaClient`].
pub struct ChromaClientBuilder {
    config: ClientConfig,
    http: Option<reqwest::Client>,
    transport: Option<Arc<dyn Transport>>,
}

/// Database-level client: collection management plus server utilities.
///
/// Holds only immutable configuration and a shared transport, so it is cheap
/// to clone and safe to share across tasks.
#[derive(Clone)]
pub struct ChromaClient {
    requester: Requester,
    tenant: String,
    database: String,
}

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Metadata>,
    get_or_create: bool,
}

#[derive(Serialize)]
struct NameRequest<'a> {
    name: &'a str,
}

impl ChromaClient {
    /// Build a client over HTTP from a [`ClientConfig`].
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::with_transport(&config, Arc::new(transport)))
    }

    /// Build a client over a caller-provided transport.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        debug!(
            mode = transport.mode(),
            tenant = config.effective_tenant(),
            database = config.effective_database(),
            "chroma client ready"
        );
        Self {
            requester: Requester::new(transport),
            tenant: config.effective_tenant().to_string(),
            database: config.effective_database().to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Self::new(config)
    }

    pub fn builder() -> ChromaClientBuilder {
        ChromaClientBuilder::new()
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        self.requester.transport()
    }

    pub async fn heartbeat(&self) -> Result<Heartbeat> {
        self.requester.get(Routes::HEARTBEAT, &PathParams::new()).await
    }

    pub async fn version(&self) -> Result<String> {
        self.requester.get(Routes::VERSION, &PathParams::new()).await
    }

    /// Reset the whole server. Only honored when the server allows resets.
    pub async fn reset(&self) -> Result<bool> {
        self.requester
            .post(Routes::RESET, &serde_json::json!({}), &PathParams::new())
            .await
    }

    pub async fn list_collections(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<Vec<Collection>> {
        let params = self
            .scope(tenant, database)
            .query_opt("limit", limit)
            .query_opt("offset", offset);
        self.requester.get(Routes::COLLECTIONS, &params).await
    }

    pub async fn count_collections(&self, tenant: Option<&str>, database: Option<&str>) -> Result<u32> {
        let params = self.scope(tenant, database);
        self.requester.get(Routes::COLLECTIONS_COUNT, &params).await
    }

    pub async fn create_collection(
        &self,
        name: &str,
        metadata: Option<&Metadata>,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<CollectionClient> {
        self.create_collection_impl(name, metadata, false, tenant, database)
            .await
    }

    /// Convenience: get if exists, else create.
    pub async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Option<&Metadata>,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<CollectionClient> {
        self.create_collection_impl(name, metadata, true, tenant, database)
            .await
    }

    pub async fn get_collection(
        &self,
        name: &str,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<CollectionClient> {
        // The server resolves this route by collection name, not id.
        let params = self
            .scope(tenant, database)
            .insert("{collection_id}", name);
        let collection: Collection = self.requester.get(Routes::COLLECTION, &params).await?;
        Ok(self.collection_client(collection, tenant, database))
    }

    pub async fn delete_collection(
        &self,
        name: &str,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<()> {
        // Same name-in-id-slot behavior as `get_collection`.
        let params = self
            .scope(tenant, database)
            .insert("{collection_id}", name);
        self.requester.delete(Routes::COLLECTION, &params).await
    }

    /// Wrap an already-fetched collection descriptor in a [`CollectionClient`].
    pub fn collection(&self, collection: Collection) -> CollectionClient {
        let tenant = collection.tenant.clone();
        let database = collection.database.clone();
        self.collection_client(collection, tenant.as_deref(), database.as_deref())
    }

    pub async fn create_tenant(&self, name: &str) -> Result<()> {
        self.requester
            .post_unit(Routes::TENANTS, &NameRequest { name }, &PathParams::new())
            .await
    }

    pub async fn get_tenant(&self, name: &str) -> Result<Tenant> {
        let params = PathParams::new().insert("{tenant}", name);
        self.requester.get(Routes::TENANT, &params).await
    }

    pub async fn create_database(&self, name: &str, tenant: Option<&str>) -> Result<()> {
        let params = PathParams::new().insert("{tenant}", self.effective_tenant(tenant));
        self.requester
            .post_unit(Routes::DATABASES, &NameRequest { name }, &params)
            .await
    }

    pub async fn get_database(&self, name: &str, tenant: Option<&str>) -> Result<Database> {
        let params = PathParams::new()
            .insert("{tenant}", self.effective_tenant(tenant))
            .insert("{database}", name);
        self.requester.get(Routes::DATABASE, &params).await
    }

    pub async fn delete_database(&self, name: &str, tenant: Option<&str>) -> Result<()> {
        let params = PathParams::new()
            .insert("{tenant}", self.effective_tenant(tenant))
            .insert("{database}", name);
        self.requester.delete(Routes::DATABASE, &params).await
    }

    pub async fn list_databases(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        tenant: Option<&str>,
    ) -> Result<Vec<Database>> {
        let params = PathParams::new()
            .insert("{tenant}", self.effective_tenant(tenant))
            .query_opt("limit", limit)
            .query_opt("offset", offset);
        self.requester.get(Routes::DATABASES, &params).await
    }

    async fn create_collection_impl(
        &self,
        name: &str,
        metadata: Option<&Metadata>,
        get_or_create: bool,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> Result<CollectionClient> {
        CollectionNames::validate(name)?;
        let params = self.scope(tenant, database);
        let request = CreateCollectionRequest {
            name,
            metadata,
            get_or_create,
        };
        let collection: Collection = self
            .requester
            .post(Routes::COLLECTIONS, &request, &params)
            .await?;
        Ok(self.collection_client(collection, tenant, database))
    }

    fn collection_client(
        &self,
        collection: Collection,
        tenant: Option<&str>,
        database: Option<&str>,
    ) -> CollectionClient {
        CollectionClient::new(
            self.requester.clone(),
            collection,
            self.effective_tenant(tenant).to_string(),
            self.effective_database(database).to_string(),
        )
    }

    fn scope(&self, tenant: Option<&str>, database: Option<&str>) -> PathParams {
        PathParams::new()
            .insert("{tenant}", self.effective_tenant(tenant))
            .insert("{database}", self.effective_database(database))
    }

    fn effective_tenant<'a>(&'a self, tenant: Option<&'a str>) -> &'a str {
        resolve_or_default(tenant, &self.tenant)
    }

    fn effective_database<'a>(&'a self, database: Option<&'a str>) -> &'a str {
        resolve_or_default(database, &self.database)
    }
}

impl ChromaClientBuilder {
    fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            http: None,
            transport: None,
        }
    }

    /// Populate the builder from `CHROMA_*` environment variables using
    /// [`ClientConfig::from_env`]. Individual fields can still be overridden
    /// afterwards via the other builder methods.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            config: ClientConfig::from_env()?,
            http: None,
            transport: None,
        })
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.config.uri = uri.into();
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.config.tenant = Some(tenant.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = Some(database.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Reuse a preconfigured `reqwest::Client`. The auth token is not
    /// injected into a caller-provided client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Use a custom transport instead of HTTP. Takes precedence over
    /// [`ChromaClientBuilder::http_client`] and the uri/token settings.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build a [`ChromaClient`] using the current builder configuration.
    pub fn build(self) -> Result<ChromaClient> {
        let transport: Arc<dyn Transport> = match (self.transport, self.http) {
            (Some(transport), _) => transport,
            (None, Some(http)) => Arc::new(HttpTransport::with_client(http, &self.config.uri)?),
            (None, None) => Arc::new(HttpTransport::from_config(&self.config)?),
        };
        Ok(ChromaClient::with_transport(&self.config, transport))
    }
}

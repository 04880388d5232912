use std::sync::Arc;

use async_trait::async_trait;

use crate::client::ChromaClient;
use crate::error::Result;
use crate::types::{Database, Tenant};

/// Admin API for tenant and database management
#[async_trait]
pub trait AdminApi {
    async fn create_tenant(&self, name: &str) -> Result<()>;
    async fn get_tenant(&self, name: &str) -> Result<Tenant>;
    async fn create_database(&self, name: &str, tenant: Option<&str>) -> Result<()>;
    async fn get_database(&self, name: &str, tenant: Option<&str>) -> Result<Database>;
    async fn delete_database(&self, name: &str, tenant: Option<&str>) -> Result<()>;
    async fn list_databases(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        tenant: Option<&str>,
    ) -> Result<Vec<Database>>;
}

/// Thin proxy that delegates admin operations to an underlying ChromaClient.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<ChromaClient>,
}

impl AdminClient {
    pub fn new(inner: Arc<ChromaClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn create_tenant(&self, name: &str) -> Result<()> {
        self.inner.create_tenant(name).await
    }

    async fn get_tenant(&self, name: &str) -> Result<Tenant> {
        self.inner.get_tenant(name).await
    }

    async fn create_database(&self, name: &str, tenant: Option<&str>) -> Result<()> {
        self.inner.create_database(name, tenant).await
    }

    async fn get_database(&self, name: &str, tenant: Option<&str>) -> Result<Database> {
        self.inner.get_database(name, tenant).await
    }

    async fn delete_database(&self, name: &str, tenant: Option<&str>) -> Result<()> {
        self.inner.delete_database(name, tenant).await
    }

    async fn list_databases(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
        tenant: Option<&str>,
    ) -> Result<Vec<Database>> {
        self.inner.list_databases(limit, offset, tenant).await
    }
}

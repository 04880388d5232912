use async_trait::async_trait;

use crate::error::Result;
use crate::types::Embeddings;

/// Embedding generation abstraction to allow custom models.
///
/// Attached to a [`CollectionClient`](crate::CollectionClient) so documents
/// and query texts can be embedded client-side before they are sent.
#[async_trait]
pub trait EmbeddingFunction: Send + Sync {
    async fn embed_documents(&self, docs: &[String]) -> Result<Embeddings>;
}

#[async_trait]
impl EmbeddingFunction for Box<dyn EmbeddingFunction> {
    async fn embed_documents(&self, docs: &[String]) -> Result<Embeddings> {
        (**self).embed_documents(docs).await
    }
}


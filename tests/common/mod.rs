#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use chromadb_rs::{ChromaError, ClientConfig, EmbeddingFunction, Embeddings};

/// Load ClientConfig from environment when `CHROMA_INTEGRATION=1` is set.
/// Returns None and prints a SKIP message otherwise.
pub fn load_config_for_integration() -> Option<ClientConfig> {
    if std::env::var("CHROMA_INTEGRATION").ok().as_deref() != Some("1") {
        eprintln!("SKIP: set CHROMA_INTEGRATION=1 and CHROMA_* env vars to run integration tests");
        return None;
    }
    ClientConfig::from_env().ok()
}

/// Base uri for a client talking to a wiremock server.
pub fn mock_base(server_uri: &str) -> String {
    format!("{server_uri}/api/v2")
}

/// Millisecond timestamp string used to make database/collection names unique.
pub fn ts_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    ts.to_string()
}

/// Simple embedding function that returns a constant vector of the given dimension.
pub struct ConstantEmbedding {
    pub value: f32,
    pub dim: usize,
}

#[async_trait::async_trait]
impl EmbeddingFunction for ConstantEmbedding {
    async fn embed_documents(&self, docs: &[String]) -> Result<Embeddings, ChromaError> {
        Ok(docs.iter().map(|_| vec![self.value; self.dim]).collect())
    }
}

//! Chroma Rust SDK – typed client for the Chroma v2 REST API.

pub mod admin;
pub mod client;
pub mod collection;
pub mod config;
pub mod embedding;
pub mod error;
pub mod filters;
pub mod mapper;
pub mod meta;
pub mod params;
#[cfg(feature = "sync")]
pub mod sync;
pub mod transport;
pub mod types;

pub use crate::admin::{AdminApi, AdminClient};
pub use crate::client::{ChromaClient, ChromaClientBuilder};
pub use crate::collection::CollectionClient;
pub use crate::config::{ClientConfig, DEFAULT_DATABASE, DEFAULT_TENANT};
pub use crate::embedding::EmbeddingFunction;
pub use crate::error::{ChromaError, Result};
pub use crate::filters::{Where, WhereDocument, WhereOperator};
pub use crate::mapper::{map_get, transpose_query, transpose_single};
pub use crate::meta::{CollectionNames, Routes};
pub use crate::params::PathParams;
pub use crate::transport::{HttpTransport, Transport};
pub use crate::types::{
    Collection, CollectionEntry, Database, Document, Documents, Embedding, Embeddings,
    GetResponse, Heartbeat, Include, IncludeField, Metadata, QueryEntry, QueryResponse, Tenant,
};

#[cfg(feature = "sync")]
pub use crate::sync::{SyncChromaClient, SyncChromaClientBuilder, SyncCollection};

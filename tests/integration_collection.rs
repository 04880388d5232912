//! Integration tests for collection DML/DQL against a real Chroma server.
//! These tests are skipped unless `CHROMA_INTEGRATION=1` and CHROMA_* env vars are set.

use anyhow::Result;
use chromadb_rs::{ChromaClient, IncludeField, Metadata, Where, WhereDocument};
use serde_json::json;

mod common;
use common::{ConstantEmbedding, load_config_for_integration, ts_suffix};

fn meta(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn dml_and_query_roundtrip() -> Result<()> {
    let Some(config) = load_config_for_integration() else {
        return Ok(());
    };
    let client = ChromaClient::new(config)?;
    let name = format!("rs_dml_{}", ts_suffix());
    let coll = client.create_collection(&name, None, None, None).await?;

    let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let embeddings = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
    let metadatas = vec![
        meta(json!({"color": "red", "rank": 1})),
        meta(json!({"color": "blue", "rank": 2})),
        meta(json!({"color": "red", "rank": 3})),
    ];
    let documents = vec![
        "apple pie".to_string(),
        "blueberry tart".to_string(),
        "apple crumble".to_string(),
    ];
    coll.add(
        &ids,
        Some(embeddings.as_slice()),
        Some(metadatas.as_slice()),
        Some(documents.as_slice()),
    )
    .await?;
    assert_eq!(coll.count().await?, 3);

    let hits = coll
        .query_one(&[1.0, 0.0, 0.0], 2, None, None, None)
        .await?;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "a");
    assert!(hits[0].distance <= hits[1].distance);
    assert_eq!(hits[0].document.as_deref(), Some("apple pie"));

    let red = Where::eq("color", "red")?;
    let rows = coll
        .get(None, Some(&red), Some(&WhereDocument::contains("apple")), None, None, None)
        .await?;
    let mut found: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
    found.sort();
    assert_eq!(found, vec!["a", "c"]);

    coll.update(
        &["b".to_string()],
        None,
        Some([meta(json!({"color": "green", "rank": 2}))].as_slice()),
        None,
    )
    .await?;
    let b = coll
        .get_one("b", None, None, Some([IncludeField::Metadatas].as_slice()))
        .await?
        .expect("b exists");
    assert_eq!(b.metadata.and_then(|m| m.get("color").cloned()), Some(json!("green")));

    coll.delete(None, Some(&Where::gte("rank", 3)?), None).await?;
    assert_eq!(coll.count().await?, 2);

    client.delete_collection(&name, None, None).await?;
    Ok(())
}

#[tokio::test]
async fn query_texts_with_embedding_function() -> Result<()> {
    let Some(config) = load_config_for_integration() else {
        return Ok(());
    };
    let client = ChromaClient::new(config)?;
    let name = format!("rs_ef_{}", ts_suffix());
    let coll = client
        .create_collection(&name, None, None, None)
        .await?
        .with_embedding_function(ConstantEmbedding { value: 0.25, dim: 4 });

    let ids = vec!["x".to_string(), "y".to_string()];
    let docs = vec!["first".to_string(), "second".to_string()];
    coll.upsert(&ids, None, None, Some(docs.as_slice())).await?;

    let results = coll
        .query_texts(&["anything".to_string()], 2, None, None, None)
        .await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].len(), 2);

    let peeked = coll.peek(1).await?;
    assert_eq!(peeked.len(), 1);

    client.delete_collection(&name, None, None).await?;
    Ok(())
}

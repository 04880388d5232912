//! Reshapes the server's columnar responses into per-record entries.
//!
//! Every present column is length-checked against `ids` before any value is
//! moved out, so a ragged response fails with [`ChromaError::Protocol`]
//! instead of being truncated or padded.

use tracing::debug;

use crate::error::{ChromaError, Result};
use crate::types::{CollectionEntry, GetResponse, QueryEntry, QueryResponse};

/// Transpose a batched query response into one ranked list per query.
pub fn transpose_query(response: QueryResponse) -> Result<Vec<Vec<QueryEntry>>> {
    let QueryResponse {
        ids,
        distances,
        embeddings,
        metadatas,
        documents,
        uris,
    } = response;

    let row_lens: Vec<usize> = ids.iter().map(Vec::len).collect();
    // Distances are mandatory whenever any query produced hits.
    let distances = match distances {
        Some(distances) => distances,
        None if row_lens.iter().all(|n| *n == 0) => vec![Vec::new(); row_lens.len()],
        None => {
            return Err(ChromaError::Protocol(
                "query response has ids but no distances".into(),
            ));
        }
    };
    check_nested("distances", Some(distances.as_slice()), &row_lens)?;
    check_nested("embeddings", embeddings.as_deref(), &row_lens)?;
    check_nested("metadatas", metadatas.as_deref(), &row_lens)?;
    check_nested("documents", documents.as_deref(), &row_lens)?;
    check_nested("uris", uris.as_deref(), &row_lens)?;

    debug!(queries = row_lens.len(), "transposing query response");

    let mut distances = distances.into_iter();
    let mut embeddings = embeddings.map(Vec::into_iter);
    let mut metadatas = metadatas.map(Vec::into_iter);
    let mut documents = documents.map(Vec::into_iter);
    let mut uris = uris.map(Vec::into_iter);

    let mut out = Vec::with_capacity(ids.len());
    for row_ids in ids {
        let row_dists = distances.next().unwrap_or_default();
        let mut row_embs = next_row(&mut embeddings).map(Vec::into_iter);
        let mut row_metas = next_row(&mut metadatas).map(Vec::into_iter);
        let mut row_docs = next_row(&mut documents).map(Vec::into_iter);
        let mut row_uris = next_row(&mut uris).map(Vec::into_iter);

        let mut entries = Vec::with_capacity(row_ids.len());
        for (id, distance) in row_ids.into_iter().zip(row_dists) {
            entries.push(QueryEntry {
                id,
                distance,
                embedding: next_cell(&mut row_embs),
                metadata: next_cell(&mut row_metas).flatten(),
                document: next_cell(&mut row_docs).flatten(),
                uri: next_cell(&mut row_uris).flatten(),
            });
        }
        out.push(entries);
    }

    Ok(out)
}

/// Single-query convenience: the first ranked list, or empty when the server
/// returned no queries.
pub fn transpose_single(response: QueryResponse) -> Result<Vec<QueryEntry>> {
    Ok(transpose_query(response)?
        .into_iter()
        .next()
        .unwrap_or_default())
}

/// Map a flat get response index-for-index into entries.
pub fn map_get(response: GetResponse) -> Result<Vec<CollectionEntry>> {
    let GetResponse {
        ids,
        embeddings,
        metadatas,
        documents,
        uris,
    } = response;

    let n = ids.len();
    check_flat("embeddings", embeddings.as_deref(), n)?;
    check_flat("metadatas", metadatas.as_deref(), n)?;
    check_flat("documents", documents.as_deref(), n)?;
    check_flat("uris", uris.as_deref(), n)?;

    let mut embeddings = embeddings.map(Vec::into_iter);
    let mut metadatas = metadatas.map(Vec::into_iter);
    let mut documents = documents.map(Vec::into_iter);
    let mut uris = uris.map(Vec::into_iter);

    Ok(ids
        .into_iter()
        .map(|id| CollectionEntry {
            id,
            embedding: next_cell(&mut embeddings),
            metadata: next_cell(&mut metadatas).flatten(),
            document: next_cell(&mut documents).flatten(),
            uri: next_cell(&mut uris).flatten(),
        })
        .collect())
}

fn check_nested<T>(name: &str, column: Option<&[Vec<T>]>, row_lens: &[usize]) -> Result<()> {
    let Some(rows) = column else { return Ok(()) };
    if rows.len() != row_lens.len() {
        return Err(ChromaError::Protocol(format!(
            "{name} has {} query rows, ids has {}",
            rows.len(),
            row_lens.len()
        )));
    }
    for (i, (row, expected)) in rows.iter().zip(row_lens).enumerate() {
        if row.len() != *expected {
            return Err(ChromaError::Protocol(format!(
                "{name}[{i}] has {} results, ids[{i}] has {expected}",
                row.len()
            )));
        }
    }
    Ok(())
}

fn check_flat<T>(name: &str, column: Option<&[T]>, expected: usize) -> Result<()> {
    match column {
        Some(values) if values.len() != expected => Err(ChromaError::Protocol(format!(
            "{name} has {} entries, ids has {expected}",
            values.len()
        ))),
        _ => Ok(()),
    }
}

fn next_row<T>(column: &mut Option<std::vec::IntoIter<Vec<T>>>) -> Option<Vec<T>> {
    column.as_mut().and_then(Iterator::next)
}

fn next_cell<T, I: Iterator<Item = T>>(cells: &mut Option<I>) -> Option<T> {
    cells.as_mut().and_then(Iterator::next)
}

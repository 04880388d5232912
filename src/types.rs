use serde::{Deserialize, Serialize};

use crate::error::{ChromaError, Result};

pub type Document = String;
pub type Documents = Vec<Document>;
pub type Embedding = Vec<f32>;
pub type Embeddings = Vec<Embedding>;
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Tenant as returned by the admin endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub name: String,
}

/// Database metadata returned by admin APIs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub tenant: Option<String>,
}

/// Collection descriptor as returned by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub dimension: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    #[serde(rename = "nanosecond heartbeat")]
    pub nanosecond_heartbeat: u64,
}

/// Selects which fields to include in query/get responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IncludeField {
    Documents,
    Metadatas,
    Embeddings,
    Distances,
    Uris,
}

impl IncludeField {
    /// Canonical serialization order.
    pub const ALL: [IncludeField; 5] = [
        IncludeField::Documents,
        IncludeField::Metadatas,
        IncludeField::Embeddings,
        IncludeField::Distances,
        IncludeField::Uris,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncludeField::Documents => "documents",
            IncludeField::Metadatas => "metadatas",
            IncludeField::Embeddings => "embeddings",
            IncludeField::Distances => "distances",
            IncludeField::Uris => "uris",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            IncludeField::Documents => 1,
            IncludeField::Metadatas => 1 << 1,
            IncludeField::Embeddings => 1 << 2,
            IncludeField::Distances => 1 << 3,
            IncludeField::Uris => 1 << 4,
        }
    }
}

/// Set of [`IncludeField`]s, serialized in canonical order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Include(u8);

impl Include {
    pub fn empty() -> Self {
        Include(0)
    }

    /// Default for get-style calls: metadatas + documents.
    pub fn get_default() -> Self {
        Self::from_fields(&[IncludeField::Metadatas, IncludeField::Documents])
    }

    /// Default for query-style calls: metadatas + documents + distances.
    pub fn query_default() -> Self {
        Self::from_fields(&[
            IncludeField::Metadatas,
            IncludeField::Documents,
            IncludeField::Distances,
        ])
    }

    pub fn from_fields(fields: &[IncludeField]) -> Self {
        fields.iter().fold(Self::empty(), |acc, f| acc.with(*f))
    }

    pub fn with(self, field: IncludeField) -> Self {
        Include(self.0 | field.bit())
    }

    pub fn contains(&self, field: IncludeField) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn fields(&self) -> impl Iterator<Item = IncludeField> + '_ {
        IncludeField::ALL
            .into_iter()
            .filter(move |f| self.contains(*f))
    }

    /// Wire representation for the `include` request field.
    pub fn to_wire(&self) -> Vec<&'static str> {
        self.fields().map(|f| f.as_str()).collect()
    }

    /// Wire representation for get-style calls, which have no distances.
    pub fn to_get_wire(&self) -> Result<Vec<&'static str>> {
        if self.contains(IncludeField::Distances) {
            return Err(ChromaError::Validation(
                "distances cannot be included in get requests".into(),
            ));
        }
        Ok(self.to_wire())
    }
}

impl From<&[IncludeField]> for Include {
    fn from(fields: &[IncludeField]) -> Self {
        Include::from_fields(fields)
    }
}

impl<const N: usize> From<[IncludeField; N]> for Include {
    fn from(fields: [IncludeField; N]) -> Self {
        Include::from_fields(&fields)
    }
}

/// One stored record, as returned by get/peek.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    pub embedding: Option<Embedding>,
    pub metadata: Option<Metadata>,
    pub document: Option<Document>,
    pub uri: Option<String>,
}

/// One ranked query hit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryEntry {
    pub id: String,
    pub distance: f32,
    pub embedding: Option<Embedding>,
    pub metadata: Option<Metadata>,
    pub document: Option<Document>,
    pub uri: Option<String>,
}

/// Columnar get response: one slot per record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GetResponse {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub embeddings: Option<Vec<Embedding>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Option<Metadata>>>,
    #[serde(default)]
    pub documents: Option<Vec<Option<Document>>>,
    #[serde(default)]
    pub uris: Option<Vec<Option<String>>>,
}

/// Columnar batched query response: outer index is the query, inner the rank.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub distances: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    pub embeddings: Option<Vec<Vec<Embedding>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<Document>>>>,
    #[serde(default)]
    pub uris: Option<Vec<Vec<Option<String>>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_wire_order_is_canonical() {
        let a = Include::from_fields(&[IncludeField::Uris, IncludeField::Documents]);
        let b = Include::from_fields(&[IncludeField::Documents, IncludeField::Uris]);
        assert_eq!(a.to_wire(), vec!["documents", "uris"]);
        assert_eq!(a.to_wire(), b.to_wire());
    }

    #[test]
    fn test_include_every_combination_lists_each_field_once() {
        for mask in 0u8..32 {
            let fields: Vec<IncludeField> = IncludeField::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, f)| f)
                .collect();
            let mut doubled = fields.clone();
            doubled.extend(fields.iter().rev().copied());

            let wire = Include::from_fields(&doubled).to_wire();
            assert_eq!(wire.len(), fields.len());
            for f in &fields {
                assert_eq!(wire.iter().filter(|w| **w == f.as_str()).count(), 1);
            }
            assert_eq!(wire, Include::from_fields(&doubled).to_wire());
        }
    }

    #[test]
    fn test_include_defaults() {
        assert_eq!(Include::get_default().to_wire(), vec!["documents", "metadatas"]);
        assert_eq!(
            Include::query_default().to_wire(),
            vec!["documents", "metadatas", "distances"]
        );
    }

    #[test]
    fn test_get_include_rejects_distances() {
        let inc = Include::from([IncludeField::Distances, IncludeField::Documents]);
        let err = inc.to_get_wire().unwrap_err();
        assert!(matches!(err, ChromaError::Validation(_)));
    }

    #[test]
    fn test_query_response_tolerates_missing_optional_arrays() {
        let resp: QueryResponse =
            serde_json::from_str(r#"{"ids": [["a"]], "distances": [[0.5]], "metadatas": null}"#)
                .unwrap();
        assert!(resp.metadatas.is_none());
        assert!(resp.documents.is_none());
        assert_eq!(resp.ids, vec![vec!["a".to_string()]]);
    }
}

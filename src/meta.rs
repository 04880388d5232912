//! REST path templates and collection naming rules.
use crate::error::{ChromaError, Result};

/// Path templates relative to the `/api/v2/` base.
pub struct Routes;

impl Routes {
    pub const HEARTBEAT: &'static str = "heartbeat";
    pub const VERSION: &'static str = "version";
    pub const RESET: &'static str = "reset";

    pub const TENANTS: &'static str = "tenants";
    pub const TENANT: &'static str = "tenants/{tenant}";
    pub const DATABASES: &'static str = "tenants/{tenant}/databases";
    pub const DATABASE: &'static str = "tenants/{tenant}/databases/{database}";

    pub const COLLECTIONS: &'static str = "tenants/{tenant}/databases/{database}/collections";
    pub const COLLECTIONS_COUNT: &'static str =
        "tenants/{tenant}/databases/{database}/collections_count";
    pub const COLLECTION: &'static str =
        "tenants/{tenant}/databases/{database}/collections/{collection_id}";

    pub const COLLECTION_GET: &'static str =
        "tenants/{tenant}/databases/{database}/collections/{collection_id}/get";
    pub const COLLECTION_QUERY: &'static str =
        "tenants/{tenant}/databases/{database}/collections/{collection_id}/query";
    pub const COLLECTION_ADD: &'static str =
        "tenants/{tenant}/databases/{database}/collections/{collection_id}/add";
    pub const COLLECTION_UPDATE: &'static str =
        "tenants/{tenant}/databases/{database}/collections/{collection_id}/update";
    pub const COLLECTION_UPSERT: &'static str =
        "tenants/{tenant}/databases/{database}/collections/{collection_id}/upsert";
    pub const COLLECTION_DELETE: &'static str =
        "tenants/{tenant}/databases/{database}/collections/{collection_id}/delete";
    pub const COLLECTION_COUNT: &'static str =
        "tenants/{tenant}/databases/{database}/collections/{collection_id}/count";
}

pub struct CollectionNames;

impl CollectionNames {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 512;

    /// Validate a collection name against the server's naming rules.
    ///
    /// Current rules:
    /// - length between `MIN_LEN` and `MAX_LEN`
    /// - only ASCII letters, digits, `.`, `_` or `-`
    /// - starts and ends with a letter or digit
    /// - no consecutive periods
    pub fn validate(name: &str) -> Result<()> {
        if name.len() < Self::MIN_LEN || name.len() > Self::MAX_LEN {
            return Err(ChromaError::Validation(format!(
                "collection name must be {}-{} characters, got {}",
                Self::MIN_LEN,
                Self::MAX_LEN,
                name.len()
            )));
        }

        if !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
        {
            return Err(ChromaError::Validation(
                "collection name must match [a-zA-Z0-9._-]".into(),
            ));
        }

        let bytes = name.as_bytes();
        let edge_ok = |b: u8| b.is_ascii_alphanumeric();
        if !edge_ok(bytes[0]) || !edge_ok(bytes[bytes.len() - 1]) {
            return Err(ChromaError::Validation(
                "collection name must start and end with a letter or digit".into(),
            ));
        }

        if name.contains("..") {
            return Err(ChromaError::Validation(
                "collection name must not contain consecutive periods".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CollectionNames;
    use crate::error::ChromaError;

    #[test]
    fn test_valid_collection_name_passes() {
        assert!(CollectionNames::validate("coll_123").is_ok());
        assert!(CollectionNames::validate("my-docs.v2").is_ok());
    }

    #[test]
    fn test_short_collection_name_fails() {
        let err = CollectionNames::validate("ab").unwrap_err();
        assert!(matches!(err, ChromaError::Validation(_)));
    }

    #[test]
    fn test_invalid_chars_collection_name_fails() {
        let err = CollectionNames::validate("bad name").unwrap_err();
        assert!(matches!(err, ChromaError::Validation(_)));
    }

    #[test]
    fn test_edge_and_period_rules() {
        assert!(CollectionNames::validate("_abc").is_err());
        assert!(CollectionNames::validate("abc-").is_err());
        assert!(CollectionNames::validate("a..b").is_err());
    }

    #[test]
    fn test_too_long_collection_name_fails() {
        let long_name = "a".repeat(CollectionNames::MAX_LEN + 1);
        let err = CollectionNames::validate(&long_name).unwrap_err();
        assert!(matches!(err, ChromaError::Validation(_)));
    }
}

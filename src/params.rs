use crate::error::{ChromaError, Result};

/// Ordered placeholder insertions applied to a REST path template.
///
/// Placeholders may be given with or without braces (`"tenant"` and
/// `"{tenant}"` are the same key). Substitution is a single left-to-right
/// pass over the template: inserted values are never re-scanned.
#[derive(Clone, Debug, Default)]
pub struct PathParams {
    values: Vec<(String, String)>,
    query: Vec<(String, String)>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value for a placeholder. A later insert for the same key wins.
    pub fn insert(mut self, placeholder: impl AsRef<str>, value: impl Into<String>) -> Self {
        let key = normalize_key(placeholder.as_ref());
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.values.push((key, value)),
        }
        self
    }

    /// Append a query-string pair, rendered URL-encoded after the path.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Same as [`PathParams::query`] but skips `None`.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Resolve `template` into a concrete path.
    ///
    /// Fails with [`ChromaError::Config`] when a `{...}` token has no value or
    /// when a provided value is empty.
    pub fn apply(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len() + 32);
        let mut unresolved: Vec<&str> = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            push_literal(&mut out, &rest[..open], &mut unresolved);
            let tail = &rest[open..];
            let Some(close) = tail.find('}') else {
                unresolved.push(tail);
                rest = "";
                break;
            };
            let token = &tail[..=close];
            match self.lookup(token) {
                Some("") => {
                    return Err(ChromaError::Config(format!(
                        "empty value for path placeholder {token} in {template:?}"
                    )));
                }
                Some(value) => out.push_str(value),
                None => unresolved.push(token),
            }
            rest = &tail[close + 1..];
        }
        push_literal(&mut out, rest, &mut unresolved);

        if !unresolved.is_empty() {
            return Err(ChromaError::Config(format!(
                "unresolved path placeholders {} in {template:?}",
                unresolved.join(", ")
            )));
        }

        if !self.query.is_empty() {
            let qs = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            out.push('?');
            out.push_str(&qs);
        }

        Ok(out)
    }

    fn lookup(&self, token: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == token)
            .map(|(_, v)| v.as_str())
    }
}

// A closing brace outside a placeholder token is a malformed template.
fn push_literal<'a>(out: &mut String, literal: &'a str, unresolved: &mut Vec<&'a str>) {
    if literal.contains('}') {
        unresolved.push(literal);
    }
    out.push_str(literal);
}

fn normalize_key(placeholder: &str) -> String {
    if placeholder.starts_with('{') && placeholder.ends_with('}') {
        placeholder.to_string()
    } else {
        format!("{{{placeholder}}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION_GET: &str =
        "tenants/{tenant}/databases/{database}/collections/{collection_id}/get";

    #[test]
    fn test_resolves_all_placeholders() {
        let path = PathParams::new()
            .insert("{tenant}", "t1")
            .insert("{database}", "db1")
            .insert("{collection_id}", "c-123")
            .apply(COLLECTION_GET)
            .unwrap();
        assert_eq!(path, "tenants/t1/databases/db1/collections/c-123/get");
        assert!(!path.contains('{') && !path.contains('}'));
    }

    #[test]
    fn test_bare_and_braced_keys_are_equivalent() {
        let path = PathParams::new()
            .insert("tenant", "a")
            .insert("{tenant}", "b")
            .apply("tenants/{tenant}")
            .unwrap();
        assert_eq!(path, "tenants/b");
    }

    #[test]
    fn test_last_write_wins() {
        let path = PathParams::new()
            .insert("{tenant}", "first")
            .insert("{tenant}", "second")
            .apply("tenants/{tenant}/x/{tenant}")
            .unwrap();
        assert_eq!(path, "tenants/second/x/second");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let path = PathParams::new()
            .insert("{tenant}", "{database}")
            .insert("{database}", "db")
            .apply("tenants/{tenant}/databases/{database}")
            .unwrap();
        assert_eq!(path, "tenants/{database}/databases/db");
    }

    #[test]
    fn test_unresolved_placeholder_is_config_error() {
        let err = PathParams::new()
            .insert("{tenant}", "t")
            .apply("tenants/{tenant}/databases/{database}")
            .unwrap_err();
        assert!(matches!(err, ChromaError::Config(msg) if msg.contains("{database}")));
    }

    #[test]
    fn test_empty_value_is_config_error() {
        let err = PathParams::new()
            .insert("{tenant}", "")
            .apply("tenants/{tenant}")
            .unwrap_err();
        assert!(matches!(err, ChromaError::Config(_)));
    }

    #[test]
    fn test_unbalanced_brace_is_config_error() {
        let err = PathParams::new().apply("tenants/{tenant").unwrap_err();
        assert!(matches!(err, ChromaError::Config(_)));
    }

    #[test]
    fn test_renders_encoded_query_string() {
        let path = PathParams::new()
            .insert("{tenant}", "t")
            .query("limit", 10)
            .query_opt::<u32>("offset", None)
            .query("name", "a b")
            .apply("tenants/{tenant}/databases")
            .unwrap();
        assert_eq!(path, "tenants/t/databases?limit=10&name=a%20b");
    }

    mod props {
        use super::*;
        use crate::meta::Routes;
        use proptest::prelude::*;

        const TEMPLATES: [&str; 17] = [
            Routes::HEARTBEAT,
            Routes::VERSION,
            Routes::RESET,
            Routes::TENANTS,
            Routes::TENANT,
            Routes::DATABASES,
            Routes::DATABASE,
            Routes::COLLECTIONS,
            Routes::COLLECTIONS_COUNT,
            Routes::COLLECTION,
            Routes::COLLECTION_GET,
            Routes::COLLECTION_QUERY,
            Routes::COLLECTION_ADD,
            Routes::COLLECTION_UPDATE,
            Routes::COLLECTION_UPSERT,
            Routes::COLLECTION_DELETE,
            Routes::COLLECTION_COUNT,
        ];

        proptest! {
            #[test]
            fn test_every_route_resolves_without_braces(
                tenant in "[A-Za-z0-9_.-]{1,24}",
                database in "[A-Za-z0-9_.-]{1,24}",
                collection in "[A-Za-z0-9_.-]{1,36}",
            ) {
                let params = PathParams::new()
                    .insert("{tenant}", tenant.as_str())
                    .insert("{database}", database.as_str())
                    .insert("{collection_id}", collection.as_str());
                for template in TEMPLATES {
                    let path = params.apply(template).unwrap();
                    prop_assert!(!path.contains('{') && !path.contains('}'), "{template} -> {path}");
                    if template.contains("{tenant}") {
                        let expected = format!("tenants/{tenant}");
                        prop_assert!(path.starts_with(&expected));
                    }
                    if template.contains("{collection_id}") {
                        let expected = format!("/collections/{collection}");
                        prop_assert!(path.contains(&expected));
                    }
                }
            }

            #[test]
            fn test_braced_values_are_inserted_verbatim(
                value in "\\{[a-z_]{1,12}\\}",
                database in "[a-z]{1,12}",
            ) {
                let path = PathParams::new()
                    .insert("{tenant}", value.as_str())
                    .insert("{database}", database.as_str())
                    .apply(Routes::DATABASE)
                    .unwrap();
                prop_assert_eq!(path, format!("tenants/{value}/databases/{database}"));
            }

            #[test]
            fn test_missing_placeholder_never_resolves(
                tenant in "[A-Za-z0-9]{1,12}",
                idx in 0usize..17,
            ) {
                let template = TEMPLATES[idx];
                let result = PathParams::new().insert("{tenant}", tenant.as_str()).apply(template);
                let needs_more = template.contains("{database}");
                prop_assert_eq!(result.is_err(), needs_more);
            }
        }
    }
}

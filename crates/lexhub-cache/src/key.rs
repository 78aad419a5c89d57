//! Cache keys.
//!
//! A key is the endpoint name plus its canonicalized arguments. Two
//! requests with the same endpoint and the same arguments in any order
//! produce the same key and therefore share one cache entry and one
//! in-flight execution.

/// Identifies one cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Endpoint name, e.g. `"notifications.list"`.
    pub endpoint: String,
    /// Canonical argument string (sorted `k=v` pairs joined by `&`).
    pub args: String,
}

impl QueryKey {
    /// Key for an endpoint with arguments. Pairs are sorted so argument
    /// order never splits the cache.
    pub fn new(endpoint: impl Into<String>, pairs: &[(String, String)]) -> Self {
        let mut sorted: Vec<&(String, String)> = pairs.iter().collect();
        sorted.sort();
        let args = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        Self {
            endpoint: endpoint.into(),
            args,
        }
    }

    /// Key for an argument-less endpoint.
    pub fn bare(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            args: String::new(),
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.endpoint)
        } else {
            write!(f, "{}?{}", self.endpoint, self.args)
        }
    }
}

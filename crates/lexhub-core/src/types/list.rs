//! List query parameters for paginated endpoints.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
const DEFAULT_PAGE_LIMIT: u64 = 20;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// Return the order as the query-string value the backend expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Parameters for paginated, sortable, searchable list endpoints.
///
/// Every list endpoint takes the same shape: page, limit, optional sort
/// column and order, optional free-text search, plus endpoint-specific
/// filter pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
    /// Column to sort by.
    pub sort_by: Option<String>,
    /// Sort direction.
    pub sort_order: Option<SortOrder>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Endpoint-specific filter parameters.
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    /// Create a query for the given page with the default limit.
    pub fn page(page: u64) -> Self {
        Self {
            page: page.max(1),
            ..Self::default()
        }
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Set the sort column and order.
    pub fn sort(mut self, by: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(by.into());
        self.sort_order = Some(order);
        self
    }

    /// Set the free-text search term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Add an endpoint-specific filter pair. Empty values are dropped, so
    /// building from optional form inputs never emits blank parameters.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.filters.push((key.into(), value));
        }
        self
    }

    /// Render the query-string pairs in the order the backend expects.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy".to_string(), sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            pairs.push(("sortOrder".to_string(), order.as_str().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            sort_by: None,
            sort_order: None,
            search: None,
            filters: Vec::new(),
        }
    }
}

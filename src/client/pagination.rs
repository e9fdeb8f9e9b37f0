//! Listing parameters for the files API
//!
//! Provides the structured query, sort order and page-token based pagination
//! parameters sent with every `files.list` request.

use serde::{Deserialize, Serialize};

/// Maximum page size supported by the files API.
/// Using this as default minimizes API calls.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Sort order for listings. Files are always ordered by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order (oldest shot first)
    Asc,
    /// Descending order (newest shot first)
    #[default]
    Desc,
}

impl SortOrder {
    /// The `orderBy` value for this order.
    pub fn order_by(self) -> &'static str {
        match self {
            SortOrder::Asc => "name",
            SortOrder::Desc => "name desc",
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortOrder::Asc
    }
}

/// Server-side file query: substring match on the name and parent membership.
///
/// # Example
/// ```ignore
/// let q = FileQuery::new().name_contains("shot").parent("folder-1").parent("folder-2");
/// assert_eq!(q.render(), "name contains 'shot' and ('folder-1' in parents or 'folder-2' in parents)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub name_contains: Option<String>,
    pub parent_ids: Vec<String>,
}

impl FileQuery {
    /// An empty query matching every file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the file name to contain `fragment`.
    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name_contains = Some(fragment.into());
        self
    }

    /// Add a parent folder. Multiple parents are OR'ed.
    pub fn parent(mut self, id: impl Into<String>) -> Self {
        self.parent_ids.push(id.into());
        self
    }

    /// Add several parent folders.
    pub fn parents<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name_contains.is_none() && self.parent_ids.is_empty()
    }

    /// Render to the files API query language.
    pub fn render(&self) -> String {
        let mut clauses = Vec::new();

        if let Some(ref fragment) = self.name_contains {
            clauses.push(format!("name contains '{}'", escape(fragment)));
        }

        if !self.parent_ids.is_empty() {
            let parents: Vec<String> = self
                .parent_ids
                .iter()
                .map(|id| format!("'{}' in parents", escape(id)))
                .collect();
            clauses.push(format!("({})", parents.join(" or ")));
        }

        clauses.join(" and ")
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Parameters for one `files.list` request.
///
/// Use the builder pattern to configure listing options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilesParams {
    pub query: FileQuery,
    pub order: Option<SortOrder>,
    pub page_size: Option<usize>,
    pub page_token: Option<String>,
}

impl ListFilesParams {
    /// Create new listing params with defaults.
    pub fn new(query: FileQuery) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    /// Set the sort order.
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the page size (items per page).
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Set or clear the page token.
    pub fn page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }

    /// Page size actually sent, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Convert to query string parameters.
    ///
    /// Uses files API parameter names:
    /// - `q`: rendered [`FileQuery`], omitted when empty
    /// - `orderBy`: `name` or `name desc`
    /// - `pageSize`: defaults to MAX_PAGE_SIZE to minimize API calls
    /// - `pageToken`: opaque cursor from the previous page
    /// - `fields`: restricts the response to what the listing needs
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        if !self.query.is_empty() {
            params.push(("q", self.query.render()));
        }

        if let Some(order) = self.order {
            params.push(("orderBy", order.order_by().to_string()));
        }

        params.push(("pageSize", self.effective_page_size().to_string()));

        if let Some(ref token) = self.page_token {
            params.push(("pageToken", token.clone()));
        }

        params.push(("fields", "nextPageToken,files(id,name,parents)".to_string()));

        params
    }
}

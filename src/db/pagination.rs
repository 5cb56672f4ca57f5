//! Offset pagination for events and bookmarks
//!
//! A page that comes back full (`len == per_page`) gets a `next` link; a short
//! page does not. The rule cannot tell a full final page from one followed by
//! more data, so a client may follow one `next` link to an empty page.

use serde::{Deserialize, Serialize};

use crate::types::RecordError;

pub const DEFAULT_PER_PAGE: u32 = 100;
pub const MAX_PER_PAGE: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub sort_by_newest: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: DEFAULT_PER_PAGE,
            sort_by_newest: false,
        }
    }
}

/// Raw query parameters, parsed leniently and validated afterwards
#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    page: Option<String>,
    per_page: Option<String>,
    sort_by_newest: Option<String>,
}

impl Pagination {
    /// Build a pagination, clamping `per_page` into `[1, MAX_PER_PAGE]`
    pub fn new(page: u32, per_page: u32, sort_by_newest: bool) -> Self {
        Self {
            page,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            sort_by_newest,
        }
    }

    /// Parse `page`, `per_page` and `sort_by_newest` from a query string
    pub fn from_query(query: Option<&str>) -> Result<Self, RecordError> {
        let raw: PageQuery = match query {
            Some(q) => serde_urlencoded::from_str(q)
                .map_err(|e| RecordError::Validation(format!("invalid query string: {e}")))?,
            None => PageQuery::default(),
        };

        let page = match raw.page.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(v) => v
                .parse::<u32>()
                .map_err(|_| RecordError::Validation(format!("invalid page: {v}")))?,
        };

        let per_page = match raw.per_page.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_PER_PAGE,
            Some(v) => {
                let n = v
                    .parse::<i64>()
                    .map_err(|_| RecordError::Validation(format!("invalid per_page: {v}")))?;
                n.clamp(1, MAX_PER_PAGE as i64) as u32
            }
        };

        let sort_by_newest = match raw.sort_by_newest.as_deref().map(str::trim) {
            None | Some("") => false,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(v) => {
                return Err(RecordError::Validation(format!(
                    "invalid sort_by_newest: {v}"
                )))
            }
        };

        Ok(Self::new(page, per_page, sort_by_newest))
    }

    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        self.page as u64 * self.per_page as u64
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            ..*self
        }
    }

    /// Full page means "maybe more"
    pub fn has_more(&self, returned: usize) -> bool {
        returned == self.per_page as usize
    }

    pub fn to_query(&self) -> String {
        format!(
            "page={}&per_page={}&sort_by_newest={}",
            self.page, self.per_page, self.sort_by_newest
        )
    }
}

/// A page of results with the link to the following page, if any
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// Wrap a result set; `filters` are carried into the `next` link
    pub fn new(
        data: Vec<T>,
        pagination: &Pagination,
        base_path: &str,
        filters: &[(&str, String)],
    ) -> Self {
        let next = if pagination.has_more(data.len()) {
            let mut query = String::new();
            for (key, value) in filters {
                query.push_str(key);
                query.push('=');
                query.push_str(&urlencoding::encode(value));
                query.push('&');
            }
            query.push_str(&pagination.next().to_query());
            Some(format!("{base_path}?{query}"))
        } else {
            None
        };

        Self { data, next }
    }
}

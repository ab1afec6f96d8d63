use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Caller-supplied window. Missing or non-positive values fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub page: Option<i64>,
    default_limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl PageRequest {
    pub fn new(limit: Option<i64>, page: Option<i64>) -> Self {
        Self {
            limit,
            page,
            default_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Overrides the limit used when the caller gives none. Non-positive values are ignored.
    pub fn with_default_limit(mut self, default_limit: i64) -> Self {
        if default_limit > 0 {
            self.default_limit = default_limit;
        }
        self
    }

    pub fn resolve(&self) -> Pagination {
        let limit = match self.limit {
            Some(limit) if limit > 0 => limit,
            _ => self.default_limit,
        };
        let page = match self.page {
            Some(page) if page > 0 => page,
            _ => 1,
        };

        Pagination {
            limit,
            page,
            total_rows: 0,
            total_pages: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub limit: i64,
    pub page: i64,
    pub total_rows: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn with_total(mut self, total_rows: i64) -> Self {
        let total_rows = total_rows.max(0);
        self.total_rows = total_rows;
        self.total_pages = if total_rows == 0 {
            0
        } else {
            (total_rows - 1) / self.limit + 1
        };
        self
    }
}

/// One window of rows plus the metadata describing it.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

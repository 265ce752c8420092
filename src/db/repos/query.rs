//! Page-based query parameters shared by all repositories.
//!
//! Filters are structured `(field, operator, value)` clauses joined with AND.
//! Each repository defines its own field enum so only columns that exist on
//! that table can be filtered or ordered on.

use uuid::Uuid;

use super::SortOrder;

/// Default number of rows per page when none is requested.
const DEFAULT_PER_PAGE: u32 = 50;

/// A column that can appear in a filter or an `ORDER BY` clause.
pub trait QueryField: Copy + std::fmt::Debug + Send + Sync {
    /// Fully qualified SQL column expression for this field.
    fn column(&self) -> &'static str;
}

/// Comparison operator for a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
}

impl FilterOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "<>",
        }
    }
}

/// A typed value bound into a filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Uuid(Uuid),
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Uuid(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause<F> {
    pub field: F,
    pub op: FilterOp,
    pub value: FilterValue,
}

/// Conjunction of filter clauses. An empty filter matches every row.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter<F> {
    clauses: Vec<FilterClause<F>>,
}

impl<F> Default for QueryFilter<F> {
    fn default() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }
}

impl<F: QueryField> QueryFilter<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality clause.
    pub fn eq(self, field: F, value: impl Into<FilterValue>) -> Self {
        self.and(field, FilterOp::Eq, value)
    }

    /// Add an inequality clause.
    pub fn ne(self, field: F, value: impl Into<FilterValue>) -> Self {
        self.and(field, FilterOp::Ne, value)
    }

    pub fn and(mut self, field: F, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        self.clauses.push(FilterClause {
            field,
            op,
            value: value.into(),
        });
        self
    }

    pub fn clauses(&self) -> &[FilterClause<F>] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Page size for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerPage {
    /// Return every matching row in a single page.
    Unbounded,
    /// Return at most this many rows per page.
    Limit(u32),
}

impl Default for PerPage {
    fn default() -> Self {
        PerPage::Limit(DEFAULT_PER_PAGE)
    }
}

impl PerPage {
    /// SQL `LIMIT` value; `-1` means no limit in SQLite.
    pub fn as_sql_limit(&self) -> i64 {
        match self {
            PerPage::Unbounded => -1,
            PerPage::Limit(n) => i64::from(*n),
        }
    }
}

/// Page-based listing parameters.
#[derive(Debug, Clone)]
pub struct PaginationQuery<F> {
    /// 1-based page number. Ignored for unbounded queries.
    pub page: u32,
    pub per_page: PerPage,
    pub filter: QueryFilter<F>,
    pub order_by: Option<F>,
    pub order_direction: SortOrder,
}

impl<F> Default for PaginationQuery<F> {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: PerPage::default(),
            filter: QueryFilter::default(),
            order_by: None,
            order_direction: SortOrder::default(),
        }
    }
}

impl<F: QueryField> PaginationQuery<F> {
    /// A single page containing every row.
    pub fn unbounded() -> Self {
        Self {
            per_page: PerPage::Unbounded,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: QueryFilter<F>) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, field: F, direction: SortOrder) -> Self {
        self.order_by = Some(field);
        self.order_direction = direction;
        self
    }

    /// Row offset of the requested page.
    pub fn offset(&self) -> i64 {
        match self.per_page {
            PerPage::Unbounded => 0,
            PerPage::Limit(n) => i64::from(self.page.max(1) - 1) * i64::from(n),
        }
    }
}

/// One page of query results plus totals for the whole filtered set.
#[derive(Debug, Clone)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: PerPage,
    /// Number of rows matching the filter across all pages.
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: PerPage, total: i64) -> Self {
        let total_pages = match per_page {
            PerPage::Unbounded => 1,
            PerPage::Limit(0) => 0,
            PerPage::Limit(n) => (total + i64::from(n) - 1) / i64::from(n),
        };
        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

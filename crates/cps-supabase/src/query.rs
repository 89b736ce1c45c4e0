//! Row-query description for the REST table endpoint.
//!
//! A [`Query`] is a plain value: the HTTP client turns it into query-string
//! pairs and headers, and in-memory test sources interpret it directly. The
//! filter grammar follows the PostgREST dialect:
//!
//! ```text
//! select=id,name&name=ilike.%ssd%&category=not.is.null&order=name.asc&offset=0&limit=1000
//! ```

/// A single row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`.
    Eq { column: String, value: String },
    /// Case-insensitive `LIKE`; `%` in `pattern` is the wildcard.
    ILike { column: String, pattern: String },
    /// `column IS NOT NULL`.
    NotNull { column: String },
}

impl Filter {
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::ILike { column, .. } | Filter::NotNull { column } => {
                column
            }
        }
    }

    fn to_pair(&self) -> (String, String) {
        match self {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{value}")),
            Filter::ILike { column, pattern } => (column.clone(), format!("ilike.{pattern}")),
            Filter::NotNull { column } => (column.clone(), "not.is.null".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A `SELECT` against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    select: String,
    filters: Vec<Filter>,
    order: Vec<Order>,
    offset: Option<usize>,
    limit: Option<usize>,
    count_exact: bool,
}

impl Query {
    /// Starts a query selecting every column of `table`.
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            offset: None,
            limit: None,
            count_exact: false,
        }
    }

    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = columns.into();
        self
    }

    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Case-insensitive substring match: `term` is escaped and wrapped in
    /// wildcards on both sides.
    #[must_use]
    pub fn ilike_contains(mut self, column: impl Into<String>, term: &str) -> Self {
        self.filters.push(Filter::ILike {
            column: column.into(),
            pattern: format!("%{}%", escape_like(term)),
        });
        self
    }

    #[must_use]
    pub fn not_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push(Filter::NotNull {
            column: column.into(),
        });
        self
    }

    #[must_use]
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Restricts the result to rows `from..=to` (0-based, inclusive).
    #[must_use]
    pub fn range(mut self, from: usize, to: usize) -> Self {
        self.offset = Some(from);
        self.limit = Some(to.saturating_sub(from) + 1);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Ask the backend for the exact number of matching rows.
    #[must_use]
    pub fn count_exact(mut self) -> Self {
        self.count_exact = true;
        self
    }

    /// Same filters and ordering, different column list.
    #[must_use]
    pub fn with_select(&self, columns: impl Into<String>) -> Self {
        let mut q = self.clone();
        q.select = columns.into();
        q
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn columns(&self) -> &str {
        &self.select
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[must_use]
    pub fn ordering(&self) -> &[Order] {
        &self.order
    }

    #[must_use]
    pub fn offset_value(&self) -> Option<usize> {
        self.offset
    }

    #[must_use]
    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    #[must_use]
    pub fn wants_count(&self) -> bool {
        self.count_exact
    }

    /// Query-string pairs in the order they are sent.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.select.clone())];
        pairs.extend(self.filters.iter().map(Filter::to_pair));
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| {
                    format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" })
                })
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Escapes `LIKE` metacharacters so user input only ever matches literally.
/// PostgREST reads `*` as an alias for `%`, so it is escaped too.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '*' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

//! In-memory [`ProductSource`] interpreting [`Query`] the way the backend does.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use cps_supabase::{Filter, Query, SelectPage, SupabaseError};
use serde_json::{Map, Value};

use crate::raw::scalar_text;
use crate::source::ProductSource;

#[derive(Default)]
pub(crate) struct FakeSource {
    tables: HashMap<String, Vec<Value>>,
    failing: HashSet<String>,
    /// Table -> number of successful queries before every further one fails.
    failing_after: HashMap<String, usize>,
    explicit_select_rejected: HashSet<String>,
    rpcs: HashMap<String, Value>,
    queries: Mutex<Vec<Query>>,
}

pub(crate) fn backend_error(status: u16, code: Option<&str>) -> SupabaseError {
    SupabaseError::Api {
        status,
        code: code.map(str::to_string),
        message: "fake backend error".to_string(),
        context: "fake".to_string(),
    }
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_table(mut self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(table.to_string(), rows);
        self
    }

    pub(crate) fn failing_table(mut self, table: &str) -> Self {
        self.failing.insert(table.to_string());
        self
    }

    pub(crate) fn failing_after(mut self, table: &str, successes: usize) -> Self {
        self.failing_after.insert(table.to_string(), successes);
        self
    }

    /// Queries with an explicit column list fail on `table`, as when a
    /// listed column does not exist.
    pub(crate) fn rejecting_explicit_select(mut self, table: &str) -> Self {
        self.explicit_select_rejected.insert(table.to_string());
        self
    }

    pub(crate) fn with_rpc(mut self, function: &str, result: Value) -> Self {
        self.rpcs.insert(function.to_string(), result);
        self
    }

    pub(crate) fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    pub(crate) fn query_count(&self, table: &str) -> usize {
        self.queries()
            .iter()
            .filter(|q| q.table_name() == table)
            .count()
    }

    fn run(&self, query: &Query) -> Result<SelectPage, SupabaseError> {
        let table = query.table_name();
        let previous = {
            let mut log = self.queries.lock().unwrap();
            let previous = log.iter().filter(|q| q.table_name() == table).count();
            log.push(query.clone());
            previous
        };

        if self.failing.contains(table) {
            return Err(backend_error(503, None));
        }
        if self
            .failing_after
            .get(table)
            .is_some_and(|successes| previous >= *successes)
        {
            return Err(backend_error(500, None));
        }
        if self.explicit_select_rejected.contains(table) && query.columns() != "*" {
            return Err(backend_error(400, Some("42703")));
        }

        let mut rows: Vec<Value> = self
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters().iter().all(|f| matches_filter(f, row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for order in query.ordering().iter().rev() {
            rows.sort_by(|a, b| {
                let ord = compare_cells(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        let total = rows.len() as u64;
        let offset = query.offset_value().unwrap_or(0);
        let rows: Vec<Value> = rows
            .into_iter()
            .skip(offset)
            .take(query.limit_value().unwrap_or(usize::MAX))
            .map(|row| project(&row, query.columns()))
            .collect();

        Ok(SelectPage {
            rows,
            total: query.wants_count().then_some(total),
        })
    }
}

impl ProductSource for FakeSource {
    async fn fetch_page(&self, query: &Query) -> Result<SelectPage, SupabaseError> {
        self.run(query)
    }

    async fn call_rpc(&self, function: &str, _args: &Value) -> Result<Value, SupabaseError> {
        self.rpcs
            .get(function)
            .cloned()
            .ok_or_else(|| backend_error(404, Some("PGRST202")))
    }
}

fn matches_filter(filter: &Filter, row: &Value) -> bool {
    let cell = row.get(filter.column());
    match filter {
        Filter::Eq { value, .. } => cell.and_then(scalar_text).is_some_and(|c| c == *value),
        Filter::ILike { pattern, .. } => cell
            .and_then(scalar_text)
            .is_some_and(|c| like_matches(pattern, &c)),
        Filter::NotNull { .. } => cell.is_some_and(|c| !c.is_null()),
    }
}

/// Case-insensitive `LIKE` with `%` wildcards and `\` escapes.
fn like_matches(pattern: &str, text: &str) -> bool {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '%' => parts.push(std::mem::take(&mut current).to_lowercase()),
            _ => current.push(c),
        }
    }
    parts.push(current.to_lowercase());

    let text = text.to_lowercase();
    if parts.len() == 1 {
        return text == parts[0];
    }
    let (first, rest) = parts.split_first().expect("at least two parts");
    let (last, middle) = rest.split_last().expect("at least one part");
    if !text.starts_with(first.as_str()) {
        return false;
    }
    let mut pos = first.len();
    for piece in middle {
        match text[pos..].find(piece.as_str()) {
            Some(idx) => pos += idx + piece.len(),
            None => return false,
        }
    }
    text[pos..].ends_with(last.as_str())
}

/// Backend ordering: numbers by value, text lexically, nulls last.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => scalar_text(a).cmp(&scalar_text(b)),
        },
    }
}

fn project(row: &Value, columns: &str) -> Value {
    if columns.trim() == "*" {
        return row.clone();
    }
    let Value::Object(map) = row else {
        return row.clone();
    };
    let projected: Map<String, Value> = columns
        .split(',')
        .map(str::trim)
        .filter_map(|c| map.get(c).map(|v| (c.to_string(), v.clone())))
        .collect();
    Value::Object(projected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_matching() {
        assert!(like_matches("%ssd%", "Samsung SSD 1TB"));
        assert!(!like_matches("%hdd%", "Samsung SSD 1TB"));
        assert!(like_matches(r"%100\%%", "100% pamuk"));
        assert!(like_matches("abc", "ABC"));
    }
}

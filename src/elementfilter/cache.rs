//! Process-wide cache of compiled filters.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::ast::ElementFilter;
use super::error::ParseError;
use super::parser::parse_filter;

/// Memoizes query text to its compiled filter.
///
/// A compiled filter is a pure function of its query string and never goes
/// stale, so entries are inserted once and kept for the cache's lifetime.
/// Safe for concurrent lookup and insert; parse failures are returned to the
/// caller and not cached.
#[derive(Debug, Default)]
pub struct FilterCache {
    compiled: RwLock<HashMap<String, Arc<ElementFilter>>>,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the compiled filter for a query, parsing it on first use.
    pub fn get(&self, query: &str) -> Result<Arc<ElementFilter>, ParseError> {
        if let Some(found) = self.read().get(query) {
            return Ok(Arc::clone(found));
        }

        // Parse outside the write lock; on a race the first insert wins so
        // identical query strings stay interchangeable.
        let compiled = Arc::new(parse_filter(query)?);
        let mut map = self.write();
        Ok(Arc::clone(
            map.entry(query.to_string()).or_insert(compiled),
        ))
    }

    /// Number of distinct query strings compiled so far.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<ElementFilter>>> {
        self.compiled.read().expect("filter cache lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<ElementFilter>>> {
        self.compiled.write().expect("filter cache lock poisoned")
    }
}

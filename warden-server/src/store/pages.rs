//! Access page table
//!
//! An access page is a stored URL path pattern marking a protected resource
//! boundary: a literal path, a `/*` single-segment pattern, or a `/**`
//! recursive pattern.

use crate::core::{WardenError, WardenResult};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A protected path pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPage {
    pub id: u64,
    pub path: String,
}

struct PageTable {
    rows: HashMap<u64, AccessPage>,
    next_id: u64,
}

/// Store for access page rows, unique on the pattern string
#[derive(Clone)]
pub struct PageStore {
    inner: Arc<RwLock<PageTable>>,
}

impl PageStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(PageTable {
                rows: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Insert a new page pattern. Fails with `Conflict` if it already exists.
    pub fn create(&self, path: &str) -> WardenResult<AccessPage> {
        debug!("Creating access page: {}", path);

        let mut table = self.inner.write();
        if table.rows.values().any(|p| p.path == path) {
            return Err(WardenError::Conflict(format!("access page {}", path)));
        }

        let id = table.next_id;
        table.next_id += 1;

        let page = AccessPage {
            id,
            path: path.to_string(),
        };
        table.rows.insert(id, page.clone());
        Ok(page)
    }

    pub fn get(&self, id: u64) -> WardenResult<Option<AccessPage>> {
        Ok(self.inner.read().rows.get(&id).cloned())
    }

    pub fn find_by_path(&self, path: &str) -> WardenResult<Option<AccessPage>> {
        Ok(self
            .inner
            .read()
            .rows
            .values()
            .find(|p| p.path == path)
            .cloned())
    }

    pub fn list(&self) -> WardenResult<Vec<AccessPage>> {
        let mut pages: Vec<AccessPage> = self.inner.read().rows.values().cloned().collect();
        pages.sort_by_key(|p| p.id);
        Ok(pages)
    }

    pub fn delete(&self, id: u64) -> WardenResult<bool> {
        debug!("Deleting access page with id: {}", id);
        Ok(self.inner.write().rows.remove(&id).is_some())
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}

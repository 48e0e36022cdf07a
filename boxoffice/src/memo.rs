use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::types::DailySalesTable;

/// Normalized tables kept for the life of the process, keyed by title.
///
/// With no capacity the cache grows without bound. With a capacity, inserting
/// a new title past the limit evicts the oldest inserted title. A capacity of
/// zero keeps nothing, so every request is served from disk or the network.
#[derive(Debug, Default)]
pub struct TableCache {
    tables: HashMap<String, Arc<DailySalesTable>>,
    order: VecDeque<String>,
    capacity: Option<usize>,
}

impl TableCache {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            tables: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn get(&self, title: &str) -> Option<Arc<DailySalesTable>> {
        self.tables.get(title).cloned()
    }

    /// Store `table` under `title`, replacing any earlier entry
    pub fn insert(&mut self, title: &str, table: Arc<DailySalesTable>) {
        if self.capacity == Some(0) {
            return;
        }
        if self.tables.insert(title.to_string(), table).is_some() {
            return;
        }
        self.order.push_back(title.to_string());

        if let Some(capacity) = self.capacity {
            while self.order.len() > capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.tables.remove(&oldest);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

//! Map-backed store for tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::store::{ReportStore, Table};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<BTreeMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one table.
    pub fn table(&self, name: &str) -> Option<Table> {
        self.tables.borrow().get(name).cloned()
    }
}

impl ReportStore for MemoryStore {
    fn load(&self, table: &str) -> Result<Option<Table>> {
        Ok(self.table(table))
    }

    fn save(&self, table: &str, contents: &Table) -> Result<()> {
        self.tables.borrow_mut().insert(table.to_string(), contents.clone());
        Ok(())
    }
}

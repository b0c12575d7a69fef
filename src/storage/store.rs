use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::debug;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Object;
use crate::storage::key::InternalKey;

/// Per-table settings fixed at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOptions {
    pub primary_key: String,
    pub datacenter: Option<String>,
    pub cache_size: u64,
}

/// Documents of one table indexed by primary key.
///
/// Every stored document carries its primary key field, and that field's
/// value maps back to the document's internal key.
#[derive(Debug, Clone)]
pub struct Table {
    pub options: TableOptions,
    documents: BTreeMap<InternalKey, Object>,
}

impl Table {
    pub fn new(options: TableOptions) -> Self {
        Table {
            options,
            documents: BTreeMap::new(),
        }
    }

    pub fn primary_key(&self) -> &str {
        &self.options.primary_key
    }

    pub fn get(&self, key: &InternalKey) -> Option<&Object> {
        self.documents.get(key)
    }

    pub fn get_mut(&mut self, key: &InternalKey) -> Option<&mut Object> {
        self.documents.get_mut(key)
    }

    pub fn contains(&self, key: &InternalKey) -> bool {
        self.documents.contains_key(key)
    }

    /// Store a document under a key that is not yet taken.
    pub fn insert(&mut self, key: InternalKey, doc: Object) -> Result<()> {
        if self.documents.contains_key(&key) {
            return Err(Error::new(
                ErrorKind::Duplicate,
                format!("Internal key {} already present", key),
            ));
        }
        self.documents.insert(key, doc);
        Ok(())
    }

    pub fn remove(&mut self, key: &InternalKey) -> Option<Object> {
        self.documents.remove(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Object> {
        self.documents.values()
    }
}

/// In-memory catalog: database name → table name → table.
/// Constructed empty, never persisted.
#[derive(Debug, Default)]
pub struct Store {
    databases: BTreeMap<String, BTreeMap<String, Table>>,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    pub fn create_database(&mut self, name: &str) -> Result<()> {
        if self.databases.contains_key(name) {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("Database `{}` already exists.", name),
            ));
        }
        self.databases.insert(name.to_string(), BTreeMap::new());
        debug!(db = name, "database created");
        Ok(())
    }

    pub fn drop_database(&mut self, name: &str) -> Result<()> {
        match self.databases.remove(name) {
            Some(tables) => {
                debug!(db = name, tables = tables.len(), "database dropped");
                Ok(())
            }
            None => Err(database_missing(name)),
        }
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    pub fn database_count(&self) -> usize {
        self.databases.len()
    }

    pub fn database_names(&self) -> Vec<String> {
        self.databases.keys().cloned().collect()
    }

    pub fn table_names(&self, db: &str) -> Result<Vec<String>> {
        let tables = self.databases.get(db).ok_or_else(|| database_missing(db))?;
        Ok(tables.keys().cloned().collect())
    }

    pub fn create_table(&mut self, db: &str, table: &str, options: TableOptions) -> Result<()> {
        let tables = self.databases.get_mut(db).ok_or_else(|| database_missing(db))?;
        if tables.contains_key(table) {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("Table `{}.{}` already exists.", db, table),
            ));
        }
        debug!(db, table, primary_key = %options.primary_key, "table created");
        tables.insert(table.to_string(), Table::new(options));
        Ok(())
    }

    pub fn drop_table(&mut self, db: &str, table: &str) -> Result<Table> {
        let tables = self.databases.get_mut(db).ok_or_else(|| database_missing(db))?;
        let dropped = tables.remove(table).ok_or_else(|| table_missing(db, table))?;
        debug!(db, table, documents = dropped.len(), "table dropped");
        Ok(dropped)
    }

    pub fn table(&self, db: &str, table: &str) -> Result<&Table> {
        let tables = self.databases.get(db).ok_or_else(|| database_missing(db))?;
        tables.get(table).ok_or_else(|| table_missing(db, table))
    }

    pub fn table_mut(&mut self, db: &str, table: &str) -> Result<&mut Table> {
        let tables = self.databases.get_mut(db).ok_or_else(|| database_missing(db))?;
        tables.get_mut(table).ok_or_else(|| table_missing(db, table))
    }

    pub fn table_count(&self) -> usize {
        self.databases.values().map(|tables| tables.len()).sum()
    }

    pub fn document_count(&self) -> usize {
        self.databases
            .values()
            .flat_map(|tables| tables.values())
            .map(Table::len)
            .sum()
    }
}

fn database_missing(db: &str) -> Error {
    Error::new(ErrorKind::NotFound, format!("Database `{}` does not exist.", db))
}

fn table_missing(db: &str, table: &str) -> Error {
    Error::new(
        ErrorKind::NotFound,
        format!("Table `{}.{}` does not exist.", db, table),
    )
}

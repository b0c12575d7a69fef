use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use crate::core::config::Config;
use crate::core::stats::DatabaseStats;
use crate::query::ast::{Query, QueryKind};
use crate::query::executor::QueryExecutor;
use crate::query::response::Response;
use crate::storage::store::Store;

/// Shared handle to one in-memory store.
///
/// All access goes through a single `RwLock`: reads share it, writes and
/// DDL hold it exclusively for the whole query, so every query observes
/// and leaves a consistent store. Cloning the handle shares the store.
#[derive(Clone)]
pub struct Database {
    store: Arc<RwLock<Store>>,
    executor: Arc<QueryExecutor>,
    queries_executed: Arc<AtomicU64>,
    queries_failed: Arc<AtomicU64>,
    started_at: DateTime<Utc>,
}

impl Database {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_executor(QueryExecutor::new(config))
    }

    pub fn with_executor(executor: QueryExecutor) -> Self {
        Database {
            store: Arc::new(RwLock::new(Store::new())),
            executor: Arc::new(executor),
            queries_executed: Arc::new(AtomicU64::new(0)),
            queries_failed: Arc::new(AtomicU64::new(0)),
            started_at: Utc::now(),
        }
    }

    pub fn config(&self) -> &Config {
        self.executor.config()
    }

    /// Run one query to completion and return its response
    pub fn execute(&self, query: &Query) -> Response {
        let response = match &query.kind {
            QueryKind::Read(_) => {
                let store = self.store.read();
                self.executor.execute_read(&store, query)
            }
            QueryKind::Write(_) | QueryKind::Meta(_) => {
                let mut store = self.store.write();
                self.executor.execute(&mut store, query)
            }
        };

        self.queries_executed.fetch_add(1, Ordering::Relaxed);
        if !response.is_success() {
            self.queries_failed.fetch_add(1, Ordering::Relaxed);
        }
        response
    }

    pub fn stats(&self) -> DatabaseStats {
        let store = self.store.read();
        let now = Utc::now();
        DatabaseStats {
            started_at: self.started_at,
            uptime_secs: (now - self.started_at).num_seconds(),
            database_count: store.database_count(),
            table_count: store.table_count(),
            document_count: store.document_count(),
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Database statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStats {
    // General info
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,

    // Catalog
    pub database_count: usize,
    pub table_count: usize,
    pub document_count: usize,

    // Query metrics
    pub queries_executed: u64,
    pub queries_failed: u64,
}

impl DatabaseStats {
    pub fn error_rate(&self) -> f64 {
        if self.queries_executed == 0 {
            0.0
        } else {
            self.queries_failed as f64 / self.queries_executed as f64
        }
    }
}

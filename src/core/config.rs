#[derive(Debug, Clone)]
pub struct Config {
    // Table defaults applied by CREATE_TABLE when the query leaves them unset
    pub default_primary_key: String,
    pub default_cache_size: u64,

    /// Deeper term trees are rejected as malformed
    pub max_term_depth: usize,

    /// Report misses on point update/delete instead of always succeeding
    pub strict_point_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_primary_key: "id".to_string(),
            default_cache_size: 1024 * 1024 * 1024, // 1GiB
            max_term_depth: 256,
            strict_point_writes: false,
        }
    }
}

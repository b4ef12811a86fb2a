//! Cache statistics and sweep reports

use serde::{Deserialize, Serialize};

/// Snapshot of the cache directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of completed cache files
    pub entry_count: usize,

    /// Total bytes used by completed cache files
    pub total_bytes: u64,

    /// Configured budget in bytes
    pub max_bytes: u64,

    /// Timestamp when stats were calculated
    pub calculated_at: i64,
}

impl CacheStats {
    /// Cache usage as a percentage of the budget.
    pub fn usage_percentage(&self) -> f64 {
        if self.max_bytes == 0 {
            return 0.0;
        }

        (self.total_bytes as f64 / self.max_bytes as f64) * 100.0
    }

    /// Returns true if the cache is near capacity (>90%).
    pub fn is_near_capacity(&self) -> bool {
        self.usage_percentage() > 90.0
    }

    /// Bytes that a sweep would have to free.
    pub fn space_needed(&self) -> u64 {
        self.total_bytes.saturating_sub(self.max_bytes)
    }

    /// Returns average bytes per entry.
    pub fn average_entry_size(&self) -> u64 {
        if self.entry_count == 0 {
            0
        } else {
            self.total_bytes / self.entry_count as u64
        }
    }
}

/// Outcome of one eviction sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionReport {
    /// Files deleted by the sweep
    pub files_removed: usize,

    /// Bytes freed by the deleted files
    pub bytes_freed: u64,

    /// Total cache size after the sweep
    pub bytes_remaining: u64,
}

impl EvictionReport {
    pub fn is_noop(&self) -> bool {
        self.files_removed == 0
    }
}

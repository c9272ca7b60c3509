// Derived snapshot sections and the /processed_data payload shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub block_number: u64,
    /// Raw block timestamp as reported by the node.
    pub block_time: i64,
    pub block_time_diff: i64,
    pub avg_block_time: f64,
    pub transaction_count: u64,
    pub transaction_rate: f64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub gas_usage_percent: f64,
    pub block_fill_ratio: f64,
    pub gas_efficiency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub peer_count: u64,
    pub pending_transactions: u64,
    pub total_difficulty: u128,
    pub chain_id: u64,
    pub orphaned_blocks: u64,
    /// Running total since process start, never rounded or reset.
    pub cumulative_gas_used: u128,
    pub network_health: u32,
}

/// Host-OS gauges passed through from `oslogs`, plus derived ratios.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub total_ram: f64,
    pub ram_available: f64,
    pub ram_used: f64,
    pub ram_usage_percent: f64,
    pub cpu_user_secs: f64,
    pub cpu_system_secs: f64,
    pub total_cpu_secs: f64,
    pub network_received: f64,
    pub network_transmitted: f64,
    pub system_load_avg_1_min: f64,
    pub system_load_avg_5_min: f64,
    pub system_load_avg_15_min: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alerts {
    pub slow_block: bool,
    pub high_gas_usage: bool,
    pub node_drop: bool,
    pub orphan_block: bool,
    pub tx_rate_low: bool,
    pub pending_txn_high: bool,
}

/// Averages over the history window as it stood before the current snapshot
/// was appended (all zero on the first call).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalComparison {
    pub avg_block_time: f64,
    pub avg_txn_rate: f64,
    pub avg_gas_usage: f64,
    pub avg_peer_count: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub network_health_score: u32,
    pub alerts: Alerts,
    pub historical_comparison: HistoricalComparison,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSnapshot {
    /// Derivation wall-clock time (unix seconds), not the block timestamp.
    pub timestamp: i64,
    pub performance: PerformanceMetrics,
    pub network: NetworkMetrics,
    /// Present only when the upstream supplied an `oslogs` object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemMetrics>,
    pub dashboard: DashboardMetrics,
}

/// What `/processed_data` returns: the latest snapshot's own fields plus the
/// full history window, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedPayload {
    #[serde(flatten)]
    pub latest: EnrichedSnapshot,
    pub history: Vec<EnrichedSnapshot>,
}

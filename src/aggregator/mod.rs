// Metric derivation and rolling history. One instance owns all mutable
// aggregation state; callers serialize access (the serving layer holds it
// behind a mutex shared by the HTTP handler and the poll worker).

mod window;

pub use window::RollingWindow;

use crate::config::AggregationConfig;
use crate::models::{
    Alerts, DashboardMetrics, EnrichedSnapshot, HistoricalComparison, NetworkMetrics,
    PerformanceMetrics, ProcessedPayload, RawSnapshot, SystemMetrics,
};

/// Block-time delta (seconds) above which a block counts as slow, for both
/// the health deduction and the slowBlock alert.
const SLOW_BLOCK_SECS: i64 = 16;
const LOW_PEER_COUNT: u64 = 3;
const HIGH_GAS_USAGE_PERCENT: f64 = 80.0;
const HIGH_PENDING_TXNS: u64 = 50;
const LOW_TX_RATE: f64 = 0.1;

/// The aggregator received no raw document; no state was touched.
#[derive(Debug, thiserror::Error)]
#[error("No data received")]
pub struct NoData;

pub struct Aggregator {
    max_block_size: u64,
    previous_block_timestamp: Option<i64>,
    cumulative_gas_used: u128,
    block_times: RollingWindow<i64>,
    history: RollingWindow<EnrichedSnapshot>,
}

impl Aggregator {
    pub fn new(config: &AggregationConfig) -> Self {
        Self {
            max_block_size: config.max_block_size,
            previous_block_timestamp: None,
            cumulative_gas_used: 0,
            block_times: RollingWindow::new(config.block_time_window),
            history: RollingWindow::new(config.history_capacity),
        }
    }

    /// Derives the enriched snapshot from one raw document, appends it to the
    /// rolling history, and returns it together with the full window.
    /// `None` input returns `NoData` without mutating any state.
    pub fn process(&mut self, raw: Option<RawSnapshot>) -> Result<ProcessedPayload, NoData> {
        let raw = raw.ok_or(NoData)?;
        let block = raw.latest_block_data.unwrap_or_default();
        let net = raw.network_data.unwrap_or_default();

        let gas_usage_percent = if block.gas_limit > 0 {
            block.gas_used as f64 / block.gas_limit as f64 * 100.0
        } else {
            0.0
        };
        self.cumulative_gas_used += block.gas_used as u128;
        let block_fill_ratio = if self.max_block_size > 0 {
            block.block_size as f64 / self.max_block_size as f64 * 100.0
        } else {
            0.0
        };

        // First block ever seen establishes the baseline; the delta is only
        // computed (and windowed) from the second block on.
        let block_time_diff = match self.previous_block_timestamp {
            Some(prev) => {
                let diff = block.timestamp - prev;
                self.block_times.push(diff);
                diff
            }
            None => 0,
        };
        self.previous_block_timestamp = Some(block.timestamp);

        let avg_block_time = if self.block_times.is_empty() {
            0.0
        } else {
            self.block_times.iter().copied().sum::<i64>() as f64 / self.block_times.len() as f64
        };

        let tx_rate = if block_time_diff > 0 {
            block.transactions_count as f64 / block_time_diff as f64
        } else {
            0.0
        };
        let gas_efficiency = if block.gas_used > 0 {
            block.transactions_count as f64 / block.gas_used as f64
        } else {
            0.0
        };

        let mut network_health: i32 = 100;
        if net.peer_count < LOW_PEER_COUNT {
            network_health -= 30;
        }
        if block_time_diff > SLOW_BLOCK_SECS {
            network_health -= 20;
        }
        if gas_usage_percent > HIGH_GAS_USAGE_PERCENT {
            network_health -= 15;
        }
        if block.orphaned_blocks > 0 {
            network_health -= 25;
        }
        if net.pending_transactions > HIGH_PENDING_TXNS {
            network_health -= 10;
        }
        let network_health = network_health.clamp(0, 100) as u32;

        let alerts = Alerts {
            slow_block: block_time_diff > SLOW_BLOCK_SECS,
            high_gas_usage: gas_usage_percent > HIGH_GAS_USAGE_PERCENT,
            node_drop: net.peer_count < LOW_PEER_COUNT,
            orphan_block: block.orphaned_blocks > 0,
            tx_rate_low: tx_rate < LOW_TX_RATE && block.transactions_count > 0,
            pending_txn_high: net.pending_transactions > HIGH_PENDING_TXNS,
        };

        let historical_comparison = self.historical_comparison(avg_block_time);

        let system = raw.oslogs.map(|os| {
            let ram_usage_percent = if os.total_ram > 0.0 {
                os.ram_used / os.total_ram * 100.0
            } else {
                0.0
            };
            SystemMetrics {
                total_ram: os.total_ram,
                ram_available: os.ram_available,
                ram_used: os.ram_used,
                ram_usage_percent: round2(ram_usage_percent),
                cpu_user_secs: os.cpu_user_secs,
                cpu_system_secs: os.cpu_system_secs,
                total_cpu_secs: round2(os.cpu_user_secs + os.cpu_system_secs),
                network_received: os.network_received,
                network_transmitted: os.network_transmitted,
                system_load_avg_1_min: os.system_load_avg_1_min,
                system_load_avg_5_min: os.system_load_avg_5_min,
                system_load_avg_15_min: os.system_load_avg_15_min,
            }
        });

        let snapshot = EnrichedSnapshot {
            timestamp: unix_time_secs(),
            performance: PerformanceMetrics {
                block_number: block.block_number,
                block_time: block.timestamp,
                block_time_diff,
                avg_block_time: round2(avg_block_time),
                transaction_count: block.transactions_count,
                transaction_rate: round3(tx_rate),
                gas_limit: block.gas_limit,
                gas_used: block.gas_used,
                gas_usage_percent: round2(gas_usage_percent),
                block_fill_ratio: round2(block_fill_ratio),
                gas_efficiency: round6(gas_efficiency),
            },
            network: NetworkMetrics {
                peer_count: net.peer_count,
                pending_transactions: net.pending_transactions,
                total_difficulty: block.total_difficulty,
                chain_id: net.chain_id,
                orphaned_blocks: block.orphaned_blocks,
                cumulative_gas_used: self.cumulative_gas_used,
                network_health,
            },
            system,
            dashboard: DashboardMetrics {
                network_health_score: network_health,
                alerts,
                historical_comparison,
            },
        };

        self.history.push(snapshot.clone());

        Ok(ProcessedPayload {
            latest: snapshot,
            history: self.history.to_vec(),
        })
    }

    /// Averages over the history as it stood before the current snapshot.
    fn historical_comparison(&self, avg_block_time: f64) -> HistoricalComparison {
        if self.history.is_empty() {
            return HistoricalComparison {
                avg_block_time: round2(avg_block_time),
                avg_txn_rate: 0.0,
                avg_gas_usage: 0.0,
                avg_peer_count: 0.0,
            };
        }
        let n = self.history.len() as f64;
        let mut txn_rate = 0.0;
        let mut gas_usage = 0.0;
        let mut peer_count = 0.0;
        for h in self.history.iter() {
            txn_rate += h.performance.transaction_rate;
            gas_usage += h.performance.gas_usage_percent;
            peer_count += h.network.peer_count as f64;
        }
        HistoricalComparison {
            avg_block_time: round2(avg_block_time),
            avg_txn_rate: round3(txn_rate / n),
            avg_gas_usage: round2(gas_usage / n),
            avg_peer_count: round2(peer_count / n),
        }
    }

    pub fn block_time_window_len(&self) -> usize {
        self.block_times.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn cumulative_gas_used(&self) -> u128 {
        self.cumulative_gas_used
    }

    pub fn previous_block_timestamp(&self) -> Option<i64> {
        self.previous_block_timestamp
    }
}

fn unix_time_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}

fn round2(v: f64) -> f64 {
    round_dp(v, 2)
}

fn round3(v: f64) -> f64 {
    round_dp(v, 3)
}

fn round6(v: f64) -> f64 {
    round_dp(v, 6)
}

/// Round half to even at `dp` decimal places. Presentation only; running
/// totals accumulate unrounded.
fn round_dp(v: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (v * factor).round_ties_even() / factor
}

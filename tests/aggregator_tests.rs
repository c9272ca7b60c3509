// Aggregator tests: derived metrics, health score, rolling windows, no-data path

use chainpulse::aggregator::Aggregator;
use chainpulse::config::AggregationConfig;
use chainpulse::models::{LatestBlockData, NetworkData, OsLogs, RawSnapshot};

fn block(timestamp: i64) -> RawSnapshot {
    RawSnapshot {
        latest_block_data: Some(LatestBlockData {
            block_number: 1,
            gas_used: 1000,
            gas_limit: 2000,
            timestamp,
            transactions_count: 5,
            ..Default::default()
        }),
        network_data: Some(NetworkData {
            peer_count: 5,
            ..Default::default()
        }),
        oslogs: None,
    }
}

#[test]
fn first_call_has_no_block_time_and_full_health() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    let out = agg.process(Some(block(100))).unwrap();

    let p = &out.latest.performance;
    assert_eq!(p.block_time_diff, 0);
    assert_eq!(p.avg_block_time, 0.0);
    assert_eq!(p.gas_usage_percent, 50.0);
    assert_eq!(p.transaction_rate, 0.0);
    assert_eq!(out.latest.network.network_health, 100);
    assert_eq!(out.history.len(), 1);
    assert_eq!(agg.block_time_window_len(), 0);
    assert_eq!(agg.previous_block_timestamp(), Some(100));
}

#[test]
fn second_call_computes_diff_and_slow_block_penalty() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    agg.process(Some(block(100))).unwrap();
    let out = agg.process(Some(block(120))).unwrap();

    let p = &out.latest.performance;
    assert_eq!(p.block_time_diff, 20);
    assert_eq!(p.avg_block_time, 20.0);
    assert_eq!(p.transaction_rate, 0.25);
    assert_eq!(agg.block_time_window_len(), 1);
    assert_eq!(out.latest.network.network_health, 80);
    assert!(out.latest.dashboard.alerts.slow_block);
    assert!(!out.latest.dashboard.alerts.tx_rate_low);
    assert_eq!(out.history.len(), 2);
}

#[test]
fn process_none_returns_no_data_without_mutation() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    agg.process(Some(block(100))).unwrap();
    let gas_before = agg.cumulative_gas_used();

    let err = agg.process(None).unwrap_err();
    assert_eq!(err.to_string(), "No data received");
    assert_eq!(agg.cumulative_gas_used(), gas_before);
    assert_eq!(agg.history_len(), 1);
    assert_eq!(agg.block_time_window_len(), 0);
    assert_eq!(agg.previous_block_timestamp(), Some(100));

    // The next real call still diffs against the pre-failure timestamp.
    let out = agg.process(Some(block(110))).unwrap();
    assert_eq!(out.latest.performance.block_time_diff, 10);
}

#[test]
fn process_none_on_fresh_state_leaves_it_untouched() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    assert!(agg.process(None).is_err());
    assert_eq!(agg.previous_block_timestamp(), None);

    let out = agg.process(Some(block(100))).unwrap();
    assert_eq!(out.latest.performance.block_time_diff, 0);
    assert_eq!(out.history.len(), 1);
}

#[test]
fn block_time_window_is_fifo_capped_at_ten() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    let mut ts = 0i64;
    agg.process(Some(block(ts))).unwrap();

    // Deltas 1..=14; the window keeps the last 10 (5..=14).
    let mut last = None;
    for i in 1..=14i64 {
        ts += i;
        last = Some(agg.process(Some(block(ts))).unwrap());
        assert_eq!(agg.block_time_window_len(), (i as usize).min(10));
    }
    let out = last.unwrap();
    assert_eq!(agg.block_time_window_len(), 10);
    assert_eq!(out.latest.performance.avg_block_time, 9.5);
}

#[test]
fn history_evicts_oldest_first_at_capacity() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    let mut last = None;
    for i in 1..=105u64 {
        let raw = RawSnapshot {
            latest_block_data: Some(LatestBlockData {
                block_number: i,
                timestamp: i as i64 * 10,
                ..Default::default()
            }),
            ..Default::default()
        };
        last = Some(agg.process(Some(raw)).unwrap());
    }
    let out = last.unwrap();
    assert_eq!(out.history.len(), 100);
    assert_eq!(out.history[0].performance.block_number, 6);
    assert_eq!(out.history[99].performance.block_number, 105);
    for pair in out.history.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[test]
fn cumulative_gas_is_the_exact_sum() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    let gases = [1000u64, 2500, 0, 7, 999_999];
    let mut expected = 0u128;
    for (i, gas) in gases.iter().enumerate() {
        let raw = RawSnapshot {
            latest_block_data: Some(LatestBlockData {
                gas_used: *gas,
                timestamp: 100 + i as i64,
                ..Default::default()
            }),
            ..Default::default()
        };
        let out = agg.process(Some(raw)).unwrap();
        expected += *gas as u128;
        assert_eq!(out.latest.network.cumulative_gas_used, expected);
    }
    assert_eq!(agg.cumulative_gas_used(), expected);
}

#[test]
fn health_deductions_are_additive_and_clamp_at_zero() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    agg.process(Some(block(100))).unwrap();

    // Every deduction at once: 100 - 30 - 20 - 15 - 25 - 10.
    let raw = RawSnapshot {
        latest_block_data: Some(LatestBlockData {
            gas_used: 900,
            gas_limit: 1000,
            timestamp: 120,
            orphaned_blocks: 1,
            ..Default::default()
        }),
        network_data: Some(NetworkData {
            peer_count: 0,
            pending_transactions: 100,
            chain_id: 0,
        }),
        oslogs: None,
    };
    let out = agg.process(Some(raw)).unwrap();
    assert_eq!(out.latest.network.network_health, 0);
    assert_eq!(out.latest.dashboard.network_health_score, 0);
    let alerts = &out.latest.dashboard.alerts;
    assert!(alerts.slow_block);
    assert!(alerts.high_gas_usage);
    assert!(alerts.node_drop);
    assert!(alerts.orphan_block);
    assert!(alerts.pending_txn_high);
}

#[test]
fn single_deduction_applies_alone() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    let raw = RawSnapshot {
        latest_block_data: Some(LatestBlockData {
            gas_used: 1000,
            gas_limit: 2000,
            timestamp: 100,
            ..Default::default()
        }),
        network_data: Some(NetworkData {
            peer_count: 2,
            ..Default::default()
        }),
        oslogs: None,
    };
    let out = agg.process(Some(raw)).unwrap();
    assert_eq!(out.latest.network.network_health, 70);
}

#[test]
fn zero_denominators_yield_zero_ratios() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    agg.process(Some(block(100))).unwrap();

    // Backwards timestamp: a negative delta is recorded but produces no rate.
    let raw = RawSnapshot {
        latest_block_data: Some(LatestBlockData {
            gas_used: 0,
            gas_limit: 0,
            timestamp: 90,
            transactions_count: 5,
            ..Default::default()
        }),
        network_data: Some(NetworkData {
            peer_count: 5,
            ..Default::default()
        }),
        oslogs: None,
    };
    let out = agg.process(Some(raw)).unwrap();
    let p = &out.latest.performance;
    assert_eq!(p.block_time_diff, -10);
    assert_eq!(p.gas_usage_percent, 0.0);
    assert_eq!(p.gas_efficiency, 0.0);
    assert_eq!(p.transaction_rate, 0.0);
    assert_eq!(agg.block_time_window_len(), 1);
}

#[test]
fn missing_sub_objects_resolve_to_defaults() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    let out = agg.process(Some(RawSnapshot::default())).unwrap();
    let p = &out.latest.performance;
    assert_eq!(p.gas_limit, 1);
    assert_eq!(p.gas_used, 0);
    assert_eq!(p.gas_usage_percent, 0.0);
    // peerCount defaults to 0, which alone costs 30 health.
    assert_eq!(out.latest.network.network_health, 70);
    assert_eq!(out.history.len(), 1);
}

#[test]
fn system_section_only_when_oslogs_present() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    let out = agg.process(Some(block(100))).unwrap();
    assert!(out.latest.system.is_none());

    let mut raw = block(120);
    raw.oslogs = Some(OsLogs::default());
    let out = agg.process(Some(raw)).unwrap();
    let sys = out.latest.system.expect("oslogs supplied");
    assert_eq!(sys.ram_usage_percent, 0.0);
    assert_eq!(sys.total_cpu_secs, 0.0);
}

#[test]
fn system_ratios_follow_oslogs_values() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    let mut raw = block(100);
    raw.oslogs = Some(OsLogs {
        total_ram: 16000.0,
        ram_available: 12000.0,
        ram_used: 4000.0,
        cpu_user_secs: 1.5,
        cpu_system_secs: 2.25,
        ..Default::default()
    });
    let out = agg.process(Some(raw)).unwrap();
    let sys = out.latest.system.unwrap();
    assert_eq!(sys.ram_usage_percent, 25.0);
    assert_eq!(sys.total_cpu_secs, 3.75);
    assert_eq!(sys.ram_available, 12000.0);
}

#[test]
fn tx_rate_low_alert_requires_transactions() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    agg.process(Some(block(100))).unwrap();

    // One transaction over a 60s block: rate 0.017 < 0.1.
    let mut raw = block(160);
    raw.latest_block_data.as_mut().unwrap().transactions_count = 1;
    let out = agg.process(Some(raw)).unwrap();
    assert!(out.latest.dashboard.alerts.tx_rate_low);

    // No transactions at all never trips the alert.
    let mut raw = block(220);
    raw.latest_block_data.as_mut().unwrap().transactions_count = 0;
    let out = agg.process(Some(raw)).unwrap();
    assert!(!out.latest.dashboard.alerts.tx_rate_low);
}

#[test]
fn historical_comparison_excludes_current_snapshot() {
    let mut agg = Aggregator::new(&AggregationConfig::default());

    let out = agg.process(Some(block(100))).unwrap();
    let hc = &out.latest.dashboard.historical_comparison;
    assert_eq!(hc.avg_txn_rate, 0.0);
    assert_eq!(hc.avg_gas_usage, 0.0);
    assert_eq!(hc.avg_peer_count, 0.0);

    // Second call averages only the first snapshot.
    let out = agg.process(Some(block(110))).unwrap();
    let hc = &out.latest.dashboard.historical_comparison;
    assert_eq!(hc.avg_txn_rate, 0.0);
    assert_eq!(hc.avg_gas_usage, 50.0);
    assert_eq!(hc.avg_peer_count, 5.0);

    // Third call averages the first two (rates 0.0 and 0.5).
    let out = agg.process(Some(block(120))).unwrap();
    let hc = &out.latest.dashboard.historical_comparison;
    assert_eq!(hc.avg_txn_rate, 0.25);
    assert_eq!(hc.avg_gas_usage, 50.0);
    assert_eq!(hc.avg_peer_count, 5.0);
}

#[test]
fn presentation_rounding_per_metric_kind() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    agg.process(Some(block(100))).unwrap();

    // 3000 / 2_400_000 * 100 = 0.125% (tie rounds to even), 7 tx over 3s,
    // 7 / 3000 gas efficiency.
    let raw = RawSnapshot {
        latest_block_data: Some(LatestBlockData {
            gas_used: 3000,
            gas_limit: 2_400_000,
            timestamp: 103,
            transactions_count: 7,
            ..Default::default()
        }),
        network_data: Some(NetworkData {
            peer_count: 5,
            ..Default::default()
        }),
        oslogs: None,
    };
    let out = agg.process(Some(raw)).unwrap();
    let p = &out.latest.performance;
    assert_eq!(p.gas_usage_percent, 0.12);
    assert_eq!(p.transaction_rate, 2.333);
    assert_eq!(p.gas_efficiency, 0.002333);
}

#[test]
fn avg_block_time_is_mean_of_window() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    agg.process(Some(block(100))).unwrap();
    agg.process(Some(block(101))).unwrap();
    let out = agg.process(Some(block(103))).unwrap();
    assert_eq!(out.latest.performance.avg_block_time, 1.5);
}

#[test]
fn block_fill_ratio_uses_configured_max_block_size() {
    let mut agg = Aggregator::new(&AggregationConfig::default());
    let raw = RawSnapshot {
        latest_block_data: Some(LatestBlockData {
            block_size: 15_000_000,
            timestamp: 100,
            ..Default::default()
        }),
        ..Default::default()
    };
    let out = agg.process(Some(raw)).unwrap();
    assert_eq!(out.latest.performance.block_fill_ratio, 50.0);
}

// Upstream chain-data document. Every field is optional on the wire and
// resolves to a declared default; absent sub-objects are valid.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(default)]
    pub latest_block_data: Option<LatestBlockData>,
    #[serde(default)]
    pub network_data: Option<NetworkData>,
    #[serde(default)]
    pub oslogs: Option<OsLogs>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockData {
    #[serde(default)]
    pub block_number: u64,
    #[serde(default)]
    pub gas_used: u64,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub transactions_count: u64,
    /// The upstream serializes this as a decimal string to avoid JS number
    /// overflow; numeric values are accepted too.
    #[serde(default, deserialize_with = "difficulty_from_number_or_string")]
    pub total_difficulty: u128,
    #[serde(default)]
    pub block_size: u64,
    #[serde(default)]
    pub orphaned_blocks: u64,
}

impl Default for LatestBlockData {
    fn default() -> Self {
        Self {
            block_number: 0,
            gas_used: 0,
            gas_limit: default_gas_limit(),
            timestamp: 0,
            transactions_count: 0,
            total_difficulty: 0,
            block_size: 0,
            orphaned_blocks: 0,
        }
    }
}

fn default_gas_limit() -> u64 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkData {
    #[serde(default)]
    pub peer_count: u64,
    #[serde(default)]
    pub pending_transactions: u64,
    #[serde(default)]
    pub chain_id: u64,
}

/// Host-OS metrics forwarded by the node exporter, all gauges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsLogs {
    #[serde(default)]
    pub total_ram: f64,
    #[serde(default)]
    pub ram_available: f64,
    #[serde(default)]
    pub ram_used: f64,
    #[serde(default)]
    pub cpu_user_secs: f64,
    #[serde(default)]
    pub cpu_system_secs: f64,
    #[serde(default)]
    pub network_received: f64,
    #[serde(default)]
    pub network_transmitted: f64,
    #[serde(default)]
    pub system_load_avg_1_min: f64,
    #[serde(default)]
    pub system_load_avg_5_min: f64,
    #[serde(default)]
    pub system_load_avg_15_min: f64,
}

fn difficulty_from_number_or_string<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    struct DifficultyVisitor;

    impl serde::de::Visitor<'_> for DifficultyVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "an unsigned integer or a decimal string")
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(v as u128)
        }

        fn visit_u128<E: serde::de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(E::custom)
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<u128, E> {
            if v.is_finite() && v >= 0.0 {
                Ok(v as u128)
            } else {
                Err(E::custom("difficulty out of range"))
            }
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<u128, E> {
            v.trim().parse().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(DifficultyVisitor)
}

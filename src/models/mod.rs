// Wire models: raw upstream document and derived snapshot

mod enriched;
mod raw;

pub use enriched::{
    Alerts, DashboardMetrics, EnrichedSnapshot, HistoricalComparison, NetworkMetrics,
    PerformanceMetrics, ProcessedPayload, SystemMetrics,
};
pub use raw::{LatestBlockData, NetworkData, OsLogs, RawSnapshot};

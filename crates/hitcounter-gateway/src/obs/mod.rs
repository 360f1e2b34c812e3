//! Lightweight in-process metrics.
//!
//! Counters, gauges and histograms are stored as atomics in `DashMap`s and
//! rendered in Prometheus text format by the `/_ops/metrics` handler. Counting
//! failures surface here and in logs, never to callers.

pub mod metrics;

pub use metrics::ProxyMetrics;

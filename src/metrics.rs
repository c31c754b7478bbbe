//! Performance metrics collection for FLUXBOARD
//!
//! This module provides functionality for collecting and exposing performance metrics
//! in Prometheus format.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the metrics collection system
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    // Create a Prometheus exporter
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    Ok(())
}

/// Record a drop request and whether it was accepted
pub fn record_drop(accepted: bool) {
    if accepted {
        counter!("fluxboard.drop.accepted").increment(1);
    } else {
        counter!("fluxboard.drop.rejected").increment(1);
    }
}

/// Record a recompilation of the Flux text
pub fn record_compile(program_bytes: usize) {
    counter!("fluxboard.compile.runs").increment(1);
    histogram!("fluxboard.compile.program_bytes").record(program_bytes as f64);
}

/// Record a catalog fetch by entry level (buckets, measurements, fields)
pub fn record_catalog_fetch(level: &str) {
    let metric_name = format!("fluxboard.catalog.fetch.{}", level);
    counter!(metric_name).increment(1);
}

/// Record a query execution
pub fn record_query(duration_ms: f64) {
    histogram!("fluxboard.query.duration_ms").record(duration_ms);
}

//! FLUXBOARD - a drag-and-drop Flux query builder core
//!
//! This crate provides the state machine behind a visual InfluxDB query
//! builder: a hierarchical catalog of buckets, measurements, and fields,
//! an ordered selection list with drop validation and subtree moves, a
//! deterministic Flux pipeline compiler, and an execution coordinator.

pub mod catalog;
pub mod selection;
pub mod query;
pub mod metrics;

//! Query module for FLUXBOARD
//! Handles Flux compilation, execution, and tabular result parsing.

pub mod compiler;
pub mod executor;
pub mod result;

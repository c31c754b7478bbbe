//! Selection module for FLUXBOARD
//! Ordered item lists, drop validation, list mutation, and the single
//! state owner that ties them together.

pub mod item;
pub mod list;
pub mod validator;
pub mod mutator;
pub mod board;

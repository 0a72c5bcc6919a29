//! FlowPilot Library
//!
//! Copilot core for visual workflow editors: context aggregation, data flow
//! tracing, security gating of suggested changes and step-by-step guidance.

pub mod adapter;
pub mod analysis;
pub mod app;
pub mod cache;
pub mod catalog;
pub mod context;
pub mod errors;
pub mod guide;
pub mod logs;
pub mod models;
pub mod security;
pub mod tracer;
pub mod utils;

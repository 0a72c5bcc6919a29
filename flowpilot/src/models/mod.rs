//! Plain data model shared by every component

pub mod change;
pub mod context;
pub mod diagnostics;
pub mod flow;
pub mod intent;
pub mod pattern;
pub mod security;
pub mod workflow;

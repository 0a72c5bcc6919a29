//! Runtime options for the copilot components

use crate::{context, guide, tracer};

/// Options for every component, usually derived from [`super::settings::Settings`]
#[derive(Debug, Clone, Default)]
pub struct CopilotOptions {
    /// Data-flow tracer and its cache
    pub tracer: tracer::Options,

    /// Context aggregator history
    pub aggregator: context::Options,

    /// Guide debounce and poll timing
    pub guide: guide::Options,
}

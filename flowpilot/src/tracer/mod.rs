//! Data-flow tracing: how data reaches a target node

pub mod paths;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::adapter::EditorDriver;
use crate::analysis::schema::{extract_types, infer_schema};
use crate::analysis::transform::{classify_transformation, estimate_data_changes};
use crate::cache::flow::FlowCache;
use crate::errors::CopilotError;
use crate::models::flow::{DataFlow, OutputInfo, PathInfo, TransformInfo, TypeChainEntry};
use crate::models::workflow::{NodeRef, WorkflowStructure};
use crate::utils::now_iso;

use self::paths::{shortest_path, trace_paths, validate_flow};

/// Tracer options
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum number of cached flows
    pub cache_capacity: usize,

    /// How long a cached flow stays valid
    pub cache_ttl: Duration,

    /// Maximum number of paths discovered per trace
    pub max_paths: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cache_capacity: 50,
            cache_ttl: Duration::from_secs(60),
            max_paths: 256,
        }
    }
}

/// Explains how data propagates into a node, caching results per node id
pub struct DataFlowTracer<D: EditorDriver> {
    driver: Arc<D>,
    cache: FlowCache,
    max_paths: usize,
}

impl<D: EditorDriver> DataFlowTracer<D> {
    pub fn new(driver: Arc<D>, options: &Options) -> Self {
        Self {
            driver,
            cache: FlowCache::new(options.cache_capacity, options.cache_ttl),
            max_paths: options.max_paths,
        }
    }

    /// Trace the flow into `node_id`.
    ///
    /// Repeated calls within the cache window return the same `Arc`. On
    /// failure a minimal flow flagged with `error` is returned and not cached.
    pub async fn trace_data_flow(&self, node_id: &str) -> Arc<DataFlow> {
        if let Some(flow) = self.cache.get(node_id) {
            debug!("Data flow for '{}' served from cache", node_id);
            return flow;
        }

        match self.compute(node_id).await {
            Ok(flow) => {
                let flow = Arc::new(flow);
                self.cache.insert(node_id, flow.clone());
                flow
            }
            Err(e) => {
                warn!("Failed to trace data flow for '{}': {}", node_id, e);
                Arc::new(DataFlow::minimal(node_id, e.to_string()))
            }
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_nodes(&self) -> Vec<String> {
        self.cache.keys()
    }

    async fn compute(&self, node_id: &str) -> Result<DataFlow, CopilotError> {
        let structure = self.driver.workflow_structure().await?;

        let path = trace_paths(&structure, node_id, self.max_paths);
        let previous_outputs = self.collect_previous_outputs(&structure, node_id).await;
        let transformations = shortest_path(&path)
            .map(|p| transformations_along(&structure, p))
            .unwrap_or_default();
        let type_chain = build_type_chain(&previous_outputs);
        let validation = validate_flow(structure.node(node_id), &previous_outputs);

        debug!(
            "Traced '{}': {} path(s), {} input(s), valid={}",
            node_id,
            path.len(),
            previous_outputs.len(),
            validation.valid
        );

        Ok(DataFlow {
            target_node_id: node_id.to_string(),
            timestamp: now_iso(),
            path,
            previous_outputs,
            transformations,
            type_chain,
            validation,
            error: false,
            message: None,
        })
    }

    /// Last outputs of the direct predecessors of `node_id`
    async fn collect_previous_outputs(&self, structure: &WorkflowStructure, node_id: &str) -> Vec<OutputInfo> {
        let mut outputs = Vec::new();
        for pred_id in structure.predecessors(node_id) {
            let node = structure.node(pred_id);
            let mut info = OutputInfo {
                node_id: pred_id.to_string(),
                node_name: node.map(|n| n.name.clone()).unwrap_or_else(|| pred_id.to_string()),
                node_type: node.map(|n| n.node_type.clone()).unwrap_or_default(),
                output: None,
                schema: None,
                timestamp: None,
                error: None,
            };

            match self.driver.node_last_output(pred_id).await {
                Ok(last) => {
                    info.schema = last.data.as_ref().and_then(infer_schema);
                    info.output = last.data;
                    info.timestamp = last.timestamp;
                    info.error = last.error;
                }
                Err(e) => {
                    debug!("No output for '{}': {}", pred_id, e);
                    info.error = Some(e.to_string());
                }
            }
            outputs.push(info);
        }
        outputs
    }
}

fn node_or_placeholder(structure: &WorkflowStructure, id: &str) -> NodeRef {
    structure
        .node(id)
        .cloned()
        .unwrap_or_else(|| NodeRef::new(id, "", ""))
}

/// Transformation per consecutive pair of `path`
pub fn transformations_along(structure: &WorkflowStructure, path: &PathInfo) -> Vec<TransformInfo> {
    path.nodes
        .windows(2)
        .map(|pair| {
            let (from, to) = (structure.node(&pair[0]), structure.node(&pair[1]));
            TransformInfo {
                from: node_or_placeholder(structure, &pair[0]),
                to: node_or_placeholder(structure, &pair[1]),
                transformation_type: classify_transformation(from, to),
                data_changes: estimate_data_changes(to),
            }
        })
        .collect()
}

/// Schemas of the predecessors that produced a sampled output
pub fn build_type_chain(outputs: &[OutputInfo]) -> Vec<TypeChainEntry> {
    outputs
        .iter()
        .filter_map(|o| {
            let schema = o.schema.clone()?;
            Some(TypeChainEntry {
                node_id: o.node_id.clone(),
                node_name: o.node_name.clone(),
                types: extract_types(&schema),
                schema,
            })
        })
        .collect()
}

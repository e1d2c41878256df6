//! Construction options for [`MutableGraph`](crate::MutableGraph).

/// Options for [`MutableGraph::with_config`](crate::MutableGraph::with_config).
///
/// # Example
///
/// ```
/// # use graph_components::{GraphConfig, MutableGraph};
/// let config = GraphConfig::default()
///     .with_node_capacity(128)
///     .with_component_management(true);
/// let graph = MutableGraph::with_config(config);
/// assert!(graph.component_management_enabled());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphConfig {
    /// Nodes to reserve room for.
    pub node_capacity: usize,
    /// Edges to reserve room for.
    pub edge_capacity: usize,
    /// Whether to track connected components from the start.
    pub component_management: bool,
}

impl GraphConfig {
    #[must_use]
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_edge_capacity(mut self, capacity: usize) -> Self {
        self.edge_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_component_management(mut self, enabled: bool) -> Self {
        self.component_management = enabled;
        self
    }
}

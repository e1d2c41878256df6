//! Owned, immutable copies of a graph and its components.
use std::collections::BTreeMap;

use crate::components::{ComponentManager, ComponentView, GraphComponent};
use crate::graph::traits::ReadGraph;
use crate::graph::{Edge, GraphStore, Node};
use crate::memory::slab;
use crate::{ComponentId, EdgeId, NodeId};

/// A copy of a committed graph that can be moved to and shared between threads.
///
/// Obtained from [`MutableGraph::snapshot`](crate::MutableGraph::snapshot).
/// Later changes to the graph are not reflected.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    store: GraphStore,
    node_components: Vec<ComponentId>,
    edge_components: Vec<ComponentId>,
    components: BTreeMap<ComponentId, GraphComponent>,
}

impl GraphSnapshot {
    pub(crate) fn new(store: &GraphStore, manager: Option<&ComponentManager>) -> Self {
        let store = store.clone();
        let mut node_components = Vec::new();
        let mut edge_components = Vec::new();
        let mut components = BTreeMap::new();

        if let Some(manager) = manager {
            node_components = vec![ComponentId::NULL; store.node_id_bound()];
            for node in store.node_ids() {
                node_components[node.index()] = manager.component_id_of_node(node);
            }
            edge_components = vec![ComponentId::NULL; store.edge_id_bound()];
            for edge in store.edge_ids() {
                edge_components[edge.index()] = manager.component_id_of_edge(edge);
            }
            components = manager.components_map().clone();
        }

        Self {
            store,
            node_components,
            edge_components,
            components,
        }
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.keys().copied()
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    pub fn component_by_id(&self, id: ComponentId) -> Option<ComponentView<'_>> {
        let component = self.components.get(&id)?;
        Some(ComponentView::new(&self.store, id, component))
    }

    pub fn component_id_of_node(&self, node: NodeId) -> ComponentId {
        node.non_null()
            .and_then(|node| self.node_components.get(node.index()).copied())
            .unwrap_or(ComponentId::NULL)
    }

    pub fn component_id_of_edge(&self, edge: EdgeId) -> ComponentId {
        edge.non_null()
            .and_then(|edge| self.edge_components.get(edge.index()).copied())
            .unwrap_or(ComponentId::NULL)
    }
}

impl ReadGraph for GraphSnapshot {
    type NodeIds<'a> = slab::Keys<'a, NodeId>;
    type EdgeIds<'a> = slab::Keys<'a, EdgeId>;

    fn node_ids(&self) -> Self::NodeIds<'_> {
        self.store.node_ids()
    }

    fn edge_ids(&self) -> Self::EdgeIds<'_> {
        self.store.edge_ids()
    }

    fn node_count(&self) -> usize {
        self.store.node_count()
    }

    fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    fn node_by_id(&self, node: NodeId) -> Option<&Node> {
        self.store.node_by_id(node)
    }

    fn edge_by_id(&self, edge: EdgeId) -> Option<&Edge> {
        self.store.edge_by_id(edge)
    }
}

//! Read-only views of a single component.
use std::iter::Copied;
use std::slice;

use crate::graph::traits::ReadGraph;
use crate::graph::{Edge, GraphStore, Node};
use crate::{ComponentId, EdgeId, NodeId};

/// Membership of one component, as of the last update.
///
/// Both id lists are kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphComponent {
    node_ids: Vec<NodeId>,
    edge_ids: Vec<EdgeId>,
}

impl GraphComponent {
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edge_ids
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_ids.len()
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.node_ids.binary_search(&node).is_ok()
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edge_ids.binary_search(&edge).is_ok()
    }

    pub(crate) fn push_node(&mut self, node: NodeId) {
        debug_assert!(self.node_ids.last().map_or(true, |last| *last < node));
        self.node_ids.push(node);
    }

    pub(crate) fn push_edge(&mut self, edge: EdgeId) {
        debug_assert!(self.edge_ids.last().map_or(true, |last| *last < edge));
        self.edge_ids.push(edge);
    }
}

/// A component seen as a graph of its own.
///
/// Lookups of elements outside the component return `None`.
#[derive(Debug, Clone, Copy)]
pub struct ComponentView<'a> {
    graph: &'a GraphStore,
    id: ComponentId,
    component: &'a GraphComponent,
}

impl<'a> ComponentView<'a> {
    pub(crate) fn new(graph: &'a GraphStore, id: ComponentId, component: &'a GraphComponent) -> Self {
        Self {
            graph,
            id,
            component,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn component(&self) -> &'a GraphComponent {
        self.component
    }
}

impl<'a> ReadGraph for ComponentView<'a> {
    type NodeIds<'b> = Copied<slice::Iter<'b, NodeId>> where Self: 'b;
    type EdgeIds<'b> = Copied<slice::Iter<'b, EdgeId>> where Self: 'b;

    fn node_ids(&self) -> Self::NodeIds<'_> {
        self.component.node_ids.iter().copied()
    }

    fn edge_ids(&self) -> Self::EdgeIds<'_> {
        self.component.edge_ids.iter().copied()
    }

    #[inline]
    fn node_count(&self) -> usize {
        self.component.node_count()
    }

    #[inline]
    fn edge_count(&self) -> usize {
        self.component.edge_count()
    }

    fn node_by_id(&self, node: NodeId) -> Option<&Node> {
        if self.component.contains_node(node) {
            self.graph.node_by_id(node)
        } else {
            None
        }
    }

    fn edge_by_id(&self, edge: EdgeId) -> Option<&Edge> {
        if self.component.contains_edge(edge) {
            self.graph.edge_by_id(edge)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use crate::{MutableGraph, ReadGraph};

    #[test]
    fn view_is_restricted_to_component() {
        let mut graph = MutableGraph::new();
        graph.enable_component_management();
        let n = graph.add_nodes(4);
        let e = graph.add_edges([(n[0], n[1]), (n[2], n[3]), (n[3], n[3])]);

        let id = graph.component_id_of_node(n[2]);
        let view = graph.component_by_id(id).unwrap();

        assert_eq!(view.id(), id);
        assert!(view.node_ids().eq([n[2], n[3]]));
        assert!(view.edge_ids().eq([e[1], e[2]]));
        assert_eq!(view.node_count(), 2);
        assert_eq!(view.edge_count(), 2);
        assert!(view.contains_node(n[3]));
        assert!(!view.contains_node(n[0]));
        assert!(view.edge_by_id(e[0]).is_none());
        assert_eq!(view.edge_by_id(e[2]).map(|edge| edge.is_loop()), Some(true));
        assert_eq!(view.edge_ids_for_nodes([n[3]]), BTreeSet::from([e[1], e[2]]));
        assert!(view.edge_ids_for_nodes([n[0]]).is_empty());
    }

    #[test]
    fn view_of_unknown_component_is_none() {
        let mut graph = MutableGraph::new();
        graph.enable_component_management();
        let node = graph.add_node();
        let id = graph.component_id_of_node(node);
        graph.remove_node(node);

        assert!(graph.component_by_id(id).is_none());
    }
}

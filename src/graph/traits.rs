use std::collections::BTreeSet;

use crate::graph::{Edge, Node};
use crate::{EdgeId, NodeId};

/// Read access shared by graphs and the views derived from them.
pub trait ReadGraph {
    /// Iterator over the ids of all nodes in the graph.
    type NodeIds<'a>: Iterator<Item = NodeId>
    where
        Self: 'a;

    /// Iterator over the ids of all edges in the graph.
    type EdgeIds<'a>: Iterator<Item = EdgeId>
    where
        Self: 'a;

    /// Iterator over the node ids of the graph, in ascending order.
    ///
    /// # Example
    ///
    /// ```
    /// # use graph_components::{MutableGraph, ReadGraph};
    /// let mut graph = MutableGraph::new();
    ///
    /// let n0 = graph.add_node();
    /// let n1 = graph.add_node();
    /// let n2 = graph.add_node();
    ///
    /// graph.remove_node(n1);
    ///
    /// assert!(graph.node_ids().eq([n0, n2]));
    /// ```
    fn node_ids(&self) -> Self::NodeIds<'_>;

    /// Iterator over the edge ids of the graph, in ascending order.
    fn edge_ids(&self) -> Self::EdgeIds<'_>;

    /// Returns the number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Returns the number of edges in the graph.
    fn edge_count(&self) -> usize;

    fn node_by_id(&self, node: NodeId) -> Option<&Node>;

    fn edge_by_id(&self, edge: EdgeId) -> Option<&Edge>;

    /// Check whether the graph has a node with a given id.
    #[inline]
    fn contains_node(&self, node: NodeId) -> bool {
        self.node_by_id(node).is_some()
    }

    /// Check whether the graph has an edge with a given id.
    #[inline]
    fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edge_by_id(edge).is_some()
    }

    /// Whether the graph has neither nodes nor edges.
    #[inline]
    fn is_empty(&self) -> bool {
        self.node_count() == 0 && self.edge_count() == 0
    }

    /// Ids of the edges incident to any of `nodes`. Nodes not in the graph are skipped.
    ///
    /// # Example
    ///
    /// ```
    /// # use graph_components::{MutableGraph, ReadGraph};
    /// let mut graph = MutableGraph::new();
    /// let n = graph.add_nodes(3);
    /// let e = graph.add_edges([(n[0], n[1]), (n[1], n[2])]);
    ///
    /// assert!(graph.edge_ids_for_nodes([n[0], n[2]]).into_iter().eq(e));
    /// ```
    fn edge_ids_for_nodes(&self, nodes: impl IntoIterator<Item = NodeId>) -> BTreeSet<EdgeId> {
        nodes
            .into_iter()
            .filter_map(|node| self.node_by_id(node))
            .flat_map(|node| node.edge_ids())
            .collect()
    }

    /// Ids of the edges targeting any of `nodes`.
    fn in_edge_ids_for_nodes(&self, nodes: impl IntoIterator<Item = NodeId>) -> BTreeSet<EdgeId> {
        nodes
            .into_iter()
            .filter_map(|node| self.node_by_id(node))
            .flat_map(|node| node.in_edge_ids())
            .collect()
    }

    /// Ids of the edges leaving any of `nodes`.
    fn out_edge_ids_for_nodes(&self, nodes: impl IntoIterator<Item = NodeId>) -> BTreeSet<EdgeId> {
        nodes
            .into_iter()
            .filter_map(|node| self.node_by_id(node))
            .flat_map(|node| node.out_edge_ids())
            .collect()
    }

    /// The edges incident to any of `nodes`, in ascending id order.
    fn edges_for_nodes(&self, nodes: impl IntoIterator<Item = NodeId>) -> Vec<Edge> {
        self.edge_ids_for_nodes(nodes)
            .into_iter()
            .filter_map(|edge| self.edge_by_id(edge).copied())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use crate::{MutableGraph, NodeId, ReadGraph};

    #[test]
    fn edge_ids_for_node_sets() {
        let mut graph = MutableGraph::new();
        let n = graph.add_nodes(4);
        let e = graph.add_edges([(n[0], n[1]), (n[1], n[2]), (n[2], n[2]), (n[3], n[0])]);

        assert_eq!(
            graph.edge_ids_for_nodes([n[1], n[2]]),
            BTreeSet::from([e[0], e[1], e[2]])
        );
        assert_eq!(
            graph.in_edge_ids_for_nodes([n[1], n[2]]),
            BTreeSet::from([e[0], e[1], e[2]])
        );
        assert_eq!(
            graph.out_edge_ids_for_nodes([n[1], n[2]]),
            BTreeSet::from([e[1], e[2]])
        );
        assert_eq!(graph.out_edge_ids_for_nodes([n[0]]), BTreeSet::from([e[0]]));
        assert_eq!(graph.in_edge_ids_for_nodes([n[0]]), BTreeSet::from([e[3]]));
    }

    #[test]
    fn edges_for_nodes_skips_unknown_nodes() {
        let mut graph = MutableGraph::new();
        let n = graph.add_nodes(3);
        let e = graph.add_edges([(n[0], n[1]), (n[2], n[1])]);

        let edges = graph.edges_for_nodes([n[2], NodeId::new(9), NodeId::NULL]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id(), e[1]);
        assert_eq!(edges[0].source_id(), n[2]);
        assert!(graph.edges_for_nodes(Vec::new()).is_empty());
    }
}

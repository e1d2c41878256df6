//! Structural graph storage and the mutable graph.
//!
//! [`GraphStore`] owns the node and edge records. [`MutableGraph`] wraps it with
//! transactions, change notification and optional component management.
use std::collections::btree_set::{self, BTreeSet};
use std::fmt::{self, Debug};
use std::iter::Copied;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::array::{ArrayRegistry, EdgeArray, NodeArray};
use crate::components::view::ComponentView;
use crate::components::ComponentManager;
use crate::config::GraphConfig;
use crate::memory::{slab, Slab};
use crate::snapshot::GraphSnapshot;
use crate::{ComponentId, EdgeId, NodeId};

pub mod events;
pub mod traits;
pub mod transaction;

use events::{GraphEvent, ListenerId, Listeners};
use traits::ReadGraph;
use transaction::Transaction;

/// A node and the edges incident to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    in_edges: BTreeSet<EdgeId>,
    out_edges: BTreeSet<EdgeId>,
}

impl Node {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            in_edges: BTreeSet::new(),
            out_edges: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Edges targeting this node.
    pub fn in_edge_ids(&self) -> Copied<btree_set::Iter<'_, EdgeId>> {
        self.in_edges.iter().copied()
    }

    /// Edges leaving this node.
    pub fn out_edge_ids(&self) -> Copied<btree_set::Iter<'_, EdgeId>> {
        self.out_edges.iter().copied()
    }

    /// All incident edges in ascending order. A loop is listed once.
    pub fn edge_ids(&self) -> Copied<btree_set::Union<'_, EdgeId>> {
        self.in_edges.union(&self.out_edges).copied()
    }

    pub fn in_degree(&self) -> usize {
        self.in_edges.len()
    }

    pub fn out_degree(&self) -> usize {
        self.out_edges.len()
    }

    /// Number of edge endpoints at this node; a loop counts twice.
    pub fn degree(&self) -> usize {
        self.in_degree() + self.out_degree()
    }
}

/// A directed edge between two nodes, possibly the same one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
}

impl Edge {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source_id(&self) -> NodeId {
        self.source
    }

    pub fn target_id(&self) -> NodeId {
        self.target
    }

    /// The endpoint across from `node`, or the null id if `node` is not an endpoint.
    pub fn opposite_id(&self, node: NodeId) -> NodeId {
        if node == self.source {
            self.target
        } else if node == self.target {
            self.source
        } else {
            NodeId::NULL
        }
    }

    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Error returned by the checked graph mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("unknown edge {0:?}")]
    UnknownEdge(EdgeId),
    #[error("node id {0:?} is already in use")]
    NodeIdInUse(NodeId),
    #[error("edge id {0:?} is already in use")]
    EdgeIdInUse(EdgeId),
    #[error("null id used as an element id")]
    NullId,
}

/// Contract violations are caller bugs and are not recoverable.
#[track_caller]
fn fatal(error: GraphError) -> ! {
    panic!("{error}")
}

/// Node and edge records with recycled ids.
///
/// Ids removed since the last [`GraphStore::release_vacated`] are not reused,
/// so that a component pass never sees a fresh element under a stale id.
pub struct GraphStore {
    nodes: Slab<NodeId, Node>,
    edges: Slab<EdgeId, Edge>,
    node_registry: Arc<ArrayRegistry>,
    edge_registry: Arc<ArrayRegistry>,
}

impl Debug for GraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStore")
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .finish()
    }
}

impl Clone for GraphStore {
    /// Clones the records. The clone owns fresh array registries.
    fn clone(&self) -> Self {
        let clone = Self {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            node_registry: ArrayRegistry::new(),
            edge_registry: ArrayRegistry::new(),
        };
        clone.node_registry.grow(clone.nodes.bound());
        clone.edge_registry.grow(clone.edges.bound());
        clone
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(nodes),
            edges: Slab::with_capacity(edges),
            node_registry: ArrayRegistry::new(),
            edge_registry: ArrayRegistry::new(),
        }
    }

    /// Registry that node arrays of this graph register with.
    pub fn node_registry(&self) -> &Arc<ArrayRegistry> {
        &self.node_registry
    }

    /// Registry that edge arrays of this graph register with.
    pub fn edge_registry(&self) -> &Arc<ArrayRegistry> {
        &self.edge_registry
    }

    /// The id the next [`MutableGraph::add_node`] will return.
    pub fn next_node_id(&self) -> NodeId {
        self.nodes.next_key()
    }

    /// The id the next [`MutableGraph::add_edge`] will return.
    pub fn next_edge_id(&self) -> EdgeId {
        self.edges.next_key()
    }

    /// High-water mark of node ids.
    pub fn node_id_bound(&self) -> usize {
        self.nodes.bound()
    }

    /// High-water mark of edge ids.
    pub fn edge_id_bound(&self) -> usize {
        self.edges.bound()
    }

    /// Nodes connected to `node` by an edge, once per edge.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(node)
            .into_iter()
            .flat_map(|n| n.edge_ids().map(move |e| (n.id, e)))
            .map(move |(n, e)| self.edges[e].opposite_id(n))
    }

    /// Edges connecting `a` and `b` in either direction.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Vec<EdgeId> {
        match self.nodes.get(a) {
            Some(node) => node
                .edge_ids()
                .filter(|e| self.edges[*e].opposite_id(a) == b)
                .collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node]
    }

    pub(crate) fn edge(&self, edge: EdgeId) -> &Edge {
        &self.edges[edge]
    }

    pub(crate) fn check_new_node(&self, id: NodeId) -> Result<(), GraphError> {
        if id.is_null() {
            Err(GraphError::NullId)
        } else if self.nodes.contains(id) {
            Err(GraphError::NodeIdInUse(id))
        } else {
            Ok(())
        }
    }

    pub(crate) fn check_new_edge(
        &self,
        id: Option<EdgeId>,
        source: NodeId,
        target: NodeId,
    ) -> Result<(), GraphError> {
        if let Some(id) = id {
            if id.is_null() {
                return Err(GraphError::NullId);
            } else if self.edges.contains(id) {
                return Err(GraphError::EdgeIdInUse(id));
            }
        }

        for node in [source, target] {
            if node.is_null() {
                return Err(GraphError::NullId);
            } else if !self.nodes.contains(node) {
                return Err(GraphError::UnknownNode(node));
            }
        }

        Ok(())
    }

    pub(crate) fn insert_node(&mut self, id: Option<NodeId>) -> Result<NodeId, GraphError> {
        let id = match id {
            Some(id) => {
                self.check_new_node(id)?;
                if self.nodes.insert_at(id, Node::new(id)).is_err() {
                    return Err(GraphError::NodeIdInUse(id));
                }
                id
            }
            None => {
                let id = self.nodes.next_key();
                let inserted = self.nodes.insert(Node::new(id));
                debug_assert_eq!(id, inserted);
                id
            }
        };

        self.node_registry.grow(self.nodes.bound());
        Ok(id)
    }

    pub(crate) fn insert_edge(
        &mut self,
        id: Option<EdgeId>,
        source: NodeId,
        target: NodeId,
    ) -> Result<EdgeId, GraphError> {
        self.check_new_edge(id, source, target)?;

        let id = id.unwrap_or_else(|| self.edges.next_key());
        let edge = Edge { id, source, target };
        if self.edges.insert_at(id, edge).is_err() {
            return Err(GraphError::EdgeIdInUse(id));
        }

        self.nodes[source].out_edges.insert(id);
        self.nodes[target].in_edges.insert(id);
        self.edge_registry.grow(self.edges.bound());
        Ok(id)
    }

    pub(crate) fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(id)?;
        self.nodes[edge.source].out_edges.remove(&id);
        self.nodes[edge.target].in_edges.remove(&id);
        Some(edge)
    }

    /// Removes a node that has no incident edges left.
    pub(crate) fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        debug_assert!(self.nodes.get(id).map_or(true, |n| n.degree() == 0));
        self.nodes.remove(id)
    }

    pub(crate) fn release_vacated(&mut self) {
        self.nodes.release_vacated();
        self.edges.release_vacated();
    }

    pub(crate) fn reserve(&mut self, nodes: usize, edges: usize) {
        self.nodes.reserve(nodes);
        self.edges.reserve(edges);
    }
}

impl ReadGraph for GraphStore {
    type NodeIds<'a> = slab::Keys<'a, NodeId>;
    type EdgeIds<'a> = slab::Keys<'a, EdgeId>;

    fn node_ids(&self) -> Self::NodeIds<'_> {
        self.nodes.keys()
    }

    fn edge_ids(&self) -> Self::EdgeIds<'_> {
        self.edges.keys()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn node_by_id(&self, node: NodeId) -> Option<&Node> {
        if node.is_null() {
            return None;
        }
        self.nodes.get(node)
    }

    fn edge_by_id(&self, edge: EdgeId) -> Option<&Edge> {
        if edge.is_null() {
            return None;
        }
        self.edges.get(edge)
    }
}

/// A graph that is mutated inside transactions and notifies listeners.
///
/// Every mutation outside an explicit transaction is a transaction of its own.
/// At the end of the outermost transaction the components are recomputed once
/// and the resulting events are dispatched, followed by
/// [`GraphEvent::GraphChanged`].
///
/// # Example
///
/// ```
/// # use graph_components::{MutableGraph, ReadGraph};
/// let mut graph = MutableGraph::new();
/// graph.enable_component_management();
///
/// let (a, b, c) = graph.perform_transaction(|graph| {
///     let a = graph.add_node();
///     let b = graph.add_node();
///     let c = graph.add_node();
///     graph.add_edge(a, b);
///     (a, b, c)
/// });
///
/// assert_eq!(graph.num_components(), 2);
/// assert_eq!(graph.component_id_of_node(a), graph.component_id_of_node(b));
/// assert_ne!(graph.component_id_of_node(a), graph.component_id_of_node(c));
/// ```
pub struct MutableGraph {
    store: GraphStore,
    components: Option<ComponentManager>,
    listeners: Listeners,
    depth: usize,
    changed: bool,
}

impl Debug for MutableGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableGraph")
            .field("store", &self.store)
            .field("components", &self.components)
            .field("depth", &self.depth)
            .finish()
    }
}

impl Default for MutableGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MutableGraph {
    /// Creates an empty graph without component management.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        let mut graph = Self {
            store: GraphStore::with_capacity(config.node_capacity, config.edge_capacity),
            components: None,
            listeners: Listeners::default(),
            depth: 0,
            changed: false,
        };

        if config.component_management {
            graph.enable_component_management();
        }

        graph
    }

    /// Starts tracking connected components. Existing nodes are assigned
    /// components immediately, without notification.
    pub fn enable_component_management(&mut self) {
        if self.components.is_none() {
            self.components = Some(ComponentManager::new(&self.store));
        }
    }

    pub fn component_management_enabled(&self) -> bool {
        self.components.is_some()
    }

    /// The underlying structural storage.
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn components(&self) -> Option<&ComponentManager> {
        self.components.as_ref()
    }

    // ---------------
    // Transactions

    /// Enters a transaction. The outermost entry emits [`GraphEvent::GraphWillChange`].
    pub fn begin_transaction(&mut self) {
        if self.depth == 0 {
            self.listeners.dispatch(&GraphEvent::GraphWillChange);
        }
        self.depth += 1;
    }

    /// Leaves a transaction. Leaving the outermost one updates the components
    /// and emits the resulting events followed by [`GraphEvent::GraphChanged`].
    ///
    /// # Panics
    ///
    /// Panics if no transaction is open.
    pub fn end_transaction(&mut self) {
        assert!(self.depth > 0, "end_transaction called outside a transaction");
        self.depth -= 1;
        if self.depth > 0 {
            return;
        }

        let changed = std::mem::take(&mut self.changed);
        let changes = match &mut self.components {
            Some(components) if changed => components.update(&self.store),
            _ => Default::default(),
        };
        self.store.release_vacated();

        debug!(
            changed,
            nodes = self.store.node_count(),
            edges = self.store.edge_count(),
            components = self.num_components(),
            "graph transaction committed"
        );

        for event in changes.into_events() {
            self.listeners.dispatch(&event);
        }
        self.listeners
            .dispatch(&GraphEvent::GraphChanged { changed });
    }

    /// Opens a transaction that ends when the returned guard is dropped.
    pub fn transaction(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }

    /// Runs `f` inside a transaction. The transaction ends on every exit path,
    /// including unwinding.
    pub fn perform_transaction<R>(&mut self, f: impl FnOnce(&mut MutableGraph) -> R) -> R {
        let mut transaction = self.transaction();
        f(&mut transaction)
    }

    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    // ---------------
    // Listeners

    /// Registers a listener that receives every event in emission order.
    pub fn subscribe(&mut self, listener: impl FnMut(&GraphEvent) + Send + 'static) -> ListenerId {
        self.listeners.subscribe(Box::new(listener))
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ---------------
    // Mutation

    /// Adds a node under the oldest recycled id, or a fresh one.
    pub fn add_node(&mut self) -> NodeId {
        self.begin_transaction();
        let id = match self.store.insert_node(None) {
            Ok(id) => id,
            Err(error) => fatal(error),
        };
        self.node_added(id);
        self.end_transaction();
        id
    }

    /// Adds a node under an explicit id, as when replaying recorded history.
    ///
    /// # Errors
    ///
    /// Fails if the id is null or in use.
    pub fn try_add_node_with_id(&mut self, id: NodeId) -> Result<NodeId, GraphError> {
        self.store.check_new_node(id)?;
        self.begin_transaction();
        let result = self.store.insert_node(Some(id));
        if let Ok(id) = result {
            self.node_added(id);
        }
        self.end_transaction();
        result
    }

    /// Adds a node under an explicit id.
    ///
    /// # Panics
    ///
    /// Panics if the id is null or in use.
    #[track_caller]
    pub fn add_node_with_id(&mut self, id: NodeId) -> NodeId {
        match self.try_add_node_with_id(id) {
            Ok(id) => id,
            Err(error) => fatal(error),
        }
    }

    /// Adds `count` nodes in a single transaction.
    pub fn add_nodes(&mut self, count: usize) -> Vec<NodeId> {
        self.perform_transaction(|graph| (0..count).map(|_| graph.add_node()).collect())
    }

    /// Adds an edge between two live nodes.
    ///
    /// # Errors
    ///
    /// Fails if an endpoint is null or not in the graph.
    pub fn try_add_edge(&mut self, source: NodeId, target: NodeId) -> Result<EdgeId, GraphError> {
        self.insert_edge(None, source, target)
    }

    /// Adds an edge between two live nodes.
    ///
    /// # Panics
    ///
    /// Panics if an endpoint is null or not in the graph.
    #[track_caller]
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> EdgeId {
        match self.try_add_edge(source, target) {
            Ok(id) => id,
            Err(error) => fatal(error),
        }
    }

    /// Adds an edge under an explicit id.
    ///
    /// # Errors
    ///
    /// Fails if the id is in use or an endpoint is not in the graph.
    pub fn try_add_edge_with_id(
        &mut self,
        id: EdgeId,
        source: NodeId,
        target: NodeId,
    ) -> Result<EdgeId, GraphError> {
        self.insert_edge(Some(id), source, target)
    }

    /// Adds an edge under an explicit id.
    ///
    /// # Panics
    ///
    /// Panics if the id is in use or an endpoint is not in the graph.
    #[track_caller]
    pub fn add_edge_with_id(&mut self, id: EdgeId, source: NodeId, target: NodeId) -> EdgeId {
        match self.try_add_edge_with_id(id, source, target) {
            Ok(id) => id,
            Err(error) => fatal(error),
        }
    }

    /// Adds edges in a single transaction.
    #[track_caller]
    pub fn add_edges(&mut self, edges: impl IntoIterator<Item = (NodeId, NodeId)>) -> Vec<EdgeId> {
        self.perform_transaction(|graph| {
            edges
                .into_iter()
                .map(|(source, target)| graph.add_edge(source, target))
                .collect()
        })
    }

    /// Removes a node together with its incident edges.
    ///
    /// # Errors
    ///
    /// Fails if the node is not in the graph.
    pub fn try_remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let Some(node) = self.store.node_by_id(id) else {
            return Err(GraphError::UnknownNode(id));
        };
        let edges: Vec<_> = node.edge_ids().collect();

        self.begin_transaction();
        for edge in edges {
            self.detach_edge(edge);
        }
        self.listeners.dispatch(&GraphEvent::NodeWillBeRemoved(id));
        self.store.remove_node(id);
        self.changed = true;
        self.end_transaction();
        Ok(())
    }

    /// Removes a node together with its incident edges.
    ///
    /// # Panics
    ///
    /// Panics if the node is not in the graph.
    #[track_caller]
    pub fn remove_node(&mut self, id: NodeId) {
        if let Err(error) = self.try_remove_node(id) {
            fatal(error)
        }
    }

    /// Removes nodes in a single transaction.
    #[track_caller]
    pub fn remove_nodes(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        self.perform_transaction(|graph| nodes.into_iter().for_each(|n| graph.remove_node(n)));
    }

    /// Removes an edge.
    ///
    /// # Errors
    ///
    /// Fails if the edge is not in the graph.
    pub fn try_remove_edge(&mut self, id: EdgeId) -> Result<(), GraphError> {
        if !self.store.contains_edge(id) {
            return Err(GraphError::UnknownEdge(id));
        }

        self.begin_transaction();
        self.detach_edge(id);
        self.end_transaction();
        Ok(())
    }

    /// Removes an edge.
    ///
    /// # Panics
    ///
    /// Panics if the edge is not in the graph.
    #[track_caller]
    pub fn remove_edge(&mut self, id: EdgeId) {
        if let Err(error) = self.try_remove_edge(id) {
            fatal(error)
        }
    }

    /// Removes edges in a single transaction.
    #[track_caller]
    pub fn remove_edges(&mut self, edges: impl IntoIterator<Item = EdgeId>) {
        self.perform_transaction(|graph| edges.into_iter().for_each(|e| graph.remove_edge(e)));
    }

    /// Removes every node and edge in a single transaction.
    pub fn clear(&mut self) {
        let nodes: Vec<_> = self.store.node_ids().collect();
        self.remove_nodes(nodes);
    }

    /// Reserves storage for the elements of `other`.
    pub fn reserve(&mut self, other: &impl ReadGraph) {
        self.store.reserve(other.node_count(), other.edge_count());
    }

    /// Replaces the structure of this graph with that of `other`, keeping its ids.
    pub fn clone_from(&mut self, other: &impl ReadGraph) {
        self.reserve(other);
        self.perform_transaction(|graph| {
            graph.clear();
            for node in other.node_ids() {
                graph.add_node_with_id(node);
            }
            for id in other.edge_ids() {
                if let Some(edge) = other.edge_by_id(id) {
                    graph.add_edge_with_id(id, edge.source_id(), edge.target_id());
                }
            }
        });
    }

    fn insert_edge(
        &mut self,
        id: Option<EdgeId>,
        source: NodeId,
        target: NodeId,
    ) -> Result<EdgeId, GraphError> {
        self.store.check_new_edge(id, source, target)?;
        self.begin_transaction();
        let result = self.store.insert_edge(id, source, target);
        if let Ok(id) = result {
            self.changed = true;
            self.listeners.dispatch(&GraphEvent::EdgeAdded(id));
        }
        self.end_transaction();
        result
    }

    fn node_added(&mut self, id: NodeId) {
        self.changed = true;
        self.listeners.dispatch(&GraphEvent::NodeAdded(id));
    }

    fn detach_edge(&mut self, id: EdgeId) {
        self.listeners.dispatch(&GraphEvent::EdgeWillBeRemoved(id));
        self.store.remove_edge(id);
        self.changed = true;
    }

    // ---------------
    // Queries

    /// The id the next [`MutableGraph::add_node`] will return.
    pub fn next_node_id(&self) -> NodeId {
        self.store.next_node_id()
    }

    /// The id the next [`MutableGraph::add_edge`] will return.
    pub fn next_edge_id(&self) -> EdgeId {
        self.store.next_edge_id()
    }

    /// Nodes connected to `node` by an edge, once per edge.
    pub fn neighbours(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.store.neighbours(node)
    }

    /// Edges connecting `a` and `b` in either direction.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Vec<EdgeId> {
        self.store.edges_between(a, b)
    }

    /// Creates a node array filled with `T::default()` that follows this graph's node ids.
    pub fn node_array<T: Default + Clone>(&self) -> NodeArray<T> {
        NodeArray::new(self.store.node_registry())
    }

    /// Creates a node array filled with `default`.
    pub fn node_array_with<T: Clone>(&self, default: T) -> NodeArray<T> {
        NodeArray::with_default(self.store.node_registry(), default)
    }

    /// Creates an edge array filled with `T::default()` that follows this graph's edge ids.
    pub fn edge_array<T: Default + Clone>(&self) -> EdgeArray<T> {
        EdgeArray::new(self.store.edge_registry())
    }

    /// Creates an edge array filled with `default`.
    pub fn edge_array_with<T: Clone>(&self, default: T) -> EdgeArray<T> {
        EdgeArray::with_default(self.store.edge_registry(), default)
    }

    /// Ids of the live components in ascending order. Empty without component management.
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.components
            .as_ref()
            .map(|c| c.component_ids().collect())
            .unwrap_or_default()
    }

    pub fn num_components(&self) -> usize {
        self.components.as_ref().map_or(0, |c| c.num_components())
    }

    /// Read-only view of one component.
    pub fn component_by_id(&self, id: ComponentId) -> Option<ComponentView<'_>> {
        let component = self.components.as_ref()?.component(id)?;
        Some(ComponentView::new(&self.store, id, component))
    }

    /// Component of a node as of the last committed transaction, or the null id.
    pub fn component_id_of_node(&self, node: NodeId) -> ComponentId {
        self.components
            .as_ref()
            .map_or(ComponentId::NULL, |c| c.component_id_of_node(node))
    }

    /// Component of an edge as of the last committed transaction, or the null id.
    pub fn component_id_of_edge(&self, edge: EdgeId) -> ComponentId {
        self.components
            .as_ref()
            .map_or(ComponentId::NULL, |c| c.component_id_of_edge(edge))
    }

    /// The component with the most nodes; the lowest id wins ties.
    pub fn component_id_of_largest_component(&self) -> ComponentId {
        self.components
            .as_ref()
            .map_or(ComponentId::NULL, |c| c.largest_component_id())
    }

    /// Takes an owned copy of the committed graph for use on another thread.
    ///
    /// # Panics
    ///
    /// Panics inside a transaction.
    pub fn snapshot(&self) -> GraphSnapshot {
        assert!(
            !self.in_transaction(),
            "snapshot taken inside a transaction"
        );
        GraphSnapshot::new(&self.store, self.components.as_ref())
    }
}

impl ReadGraph for MutableGraph {
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

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorded(graph: &mut MutableGraph) -> Arc<Mutex<Vec<GraphEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        graph.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn edge_sets_track_endpoints() {
        let mut graph = MutableGraph::new();
        let a = graph.add_node();
        let b = graph.add_node();
        let e = graph.add_edge(a, b);

        let node_a = graph.node_by_id(a).unwrap();
        assert!(node_a.out_edge_ids().eq([e]));
        assert_eq!(node_a.in_edge_ids().count(), 0);
        assert!(graph.node_by_id(b).unwrap().in_edge_ids().eq([e]));
        assert_eq!(graph.edge_by_id(e).unwrap().opposite_id(b), a);
        assert!(graph.edge_by_id(e).unwrap().opposite_id(NodeId::new(9)).is_null());
        assert!(graph.neighbours(a).eq([b]));
        assert_eq!(graph.edges_between(b, a), [e]);
    }

    #[test]
    fn self_loop_is_in_and_out_edge() {
        let mut graph = MutableGraph::new();
        let a = graph.add_node();
        let e = graph.add_edge(a, a);

        let node = graph.node_by_id(a).unwrap();
        assert!(node.in_edge_ids().eq([e]));
        assert!(node.out_edge_ids().eq([e]));
        assert!(node.edge_ids().eq([e]));
        assert_eq!(node.degree(), 2);
        assert!(graph.edge_by_id(e).unwrap().is_loop());

        graph.remove_edge(e);
        assert_eq!(graph.node_by_id(a).unwrap().degree(), 0);
    }

    #[test]
    fn remove_node_cascades_to_edges() {
        let mut graph = MutableGraph::new();
        let [a, b, c] = [graph.add_node(), graph.add_node(), graph.add_node()];
        let ab = graph.add_edge(a, b);
        let bc = graph.add_edge(b, c);
        let ca = graph.add_edge(c, a);

        let events = recorded(&mut graph);
        graph.remove_node(b);

        assert!(!graph.contains_node(b));
        assert!(!graph.contains_edge(ab));
        assert!(!graph.contains_edge(bc));
        assert!(graph.contains_edge(ca));
        assert_eq!(graph.node_by_id(a).unwrap().degree(), 1);

        assert_eq!(
            *events.lock().unwrap(),
            [
                GraphEvent::GraphWillChange,
                GraphEvent::EdgeWillBeRemoved(ab),
                GraphEvent::EdgeWillBeRemoved(bc),
                GraphEvent::NodeWillBeRemoved(b),
                GraphEvent::GraphChanged { changed: true },
            ]
        );
    }

    #[test]
    fn node_ids_are_recycled_in_removal_order() {
        let mut graph = MutableGraph::new();
        let nodes = graph.add_nodes(4);
        let e = graph.add_edge(nodes[0], nodes[1]);

        graph.remove_node(nodes[2]);
        graph.remove_edge(e);
        graph.remove_node(nodes[0]);

        assert_eq!(graph.add_node(), nodes[2]);
        assert_eq!(graph.add_node(), nodes[0]);
        assert_eq!(graph.add_node(), NodeId::new(4));
        assert_eq!(graph.next_edge_id(), e);
    }

    #[test]
    fn ids_vacated_inside_a_transaction_are_not_reused_by_it() {
        let mut graph = MutableGraph::new();
        let a = graph.add_node();

        let b = graph.perform_transaction(|graph| {
            graph.remove_node(a);
            graph.add_node()
        });

        assert_ne!(a, b);
        assert_eq!(graph.add_node(), a);
    }

    #[test]
    fn explicit_ids() {
        let mut graph = MutableGraph::new();
        let n5 = graph.add_node_with_id(NodeId::new(5));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.next_node_id(), NodeId::new(0));

        assert_eq!(
            graph.try_add_node_with_id(n5),
            Err(GraphError::NodeIdInUse(n5))
        );
        assert_eq!(
            graph.try_add_node_with_id(NodeId::NULL),
            Err(GraphError::NullId)
        );

        let e = graph.add_edge_with_id(EdgeId::new(2), n5, n5);
        assert_eq!(
            graph.try_add_edge_with_id(e, n5, n5),
            Err(GraphError::EdgeIdInUse(e))
        );
        assert_eq!(graph.next_edge_id(), EdgeId::new(0));
        assert!(!graph.in_transaction());
    }

    #[test]
    fn edge_to_missing_node_is_rejected() {
        let mut graph = MutableGraph::new();
        let a = graph.add_node();
        let missing = NodeId::new(3);

        assert_eq!(
            graph.try_add_edge(a, missing),
            Err(GraphError::UnknownNode(missing))
        );
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.in_transaction());
    }

    #[test]
    #[should_panic(expected = "unknown node NodeId(1)")]
    fn edge_to_missing_node_is_fatal() {
        let mut graph = MutableGraph::new();
        let a = graph.add_node();
        graph.add_edge(a, NodeId::new(1));
    }

    #[test]
    #[should_panic(expected = "unknown edge EdgeId(0)")]
    fn removing_missing_edge_is_fatal() {
        let mut graph = MutableGraph::new();
        graph.remove_edge(EdgeId::new(0));
    }

    #[test]
    fn arrays_follow_capacity() {
        let mut graph = MutableGraph::new();
        let weights = graph.edge_array_with(1.0_f32);
        let positions = graph.node_array::<(f32, f32)>();
        assert_eq!(graph.store().node_registry().array_count(), 1);

        let nodes = graph.add_nodes(3);
        graph.add_edge(nodes[0], nodes[2]);
        assert_eq!(positions.len(), 3);
        assert_eq!(weights.len(), 1);
        assert_eq!(weights[EdgeId::new(0)], 1.0);

        drop(positions);
        assert_eq!(graph.store().node_registry().array_count(), 0);
    }

    #[test]
    fn clone_from_preserves_ids() {
        let mut source = MutableGraph::new();
        let nodes = source.add_nodes(4);
        source.remove_node(nodes[1]);
        let e = source.add_edge(nodes[3], nodes[0]);

        let mut copy = MutableGraph::new();
        copy.add_nodes(2);
        copy.clone_from(&source);

        assert!(copy.node_ids().eq(source.node_ids()));
        assert!(copy.edge_ids().eq([e]));
        assert_eq!(copy.edge_by_id(e), source.edge_by_id(e));
    }

    #[test]
    fn clear_empties_graph() {
        let mut graph = MutableGraph::new();
        let nodes = graph.add_nodes(3);
        graph.add_edges([(nodes[0], nodes[1]), (nodes[1], nodes[2])]);

        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.add_node(), nodes[0]);
    }
}

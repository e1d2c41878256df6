//! Incremental connected-component tracking.
//!
//! After each committed transaction the [`ComponentManager`] reassigns every
//! node and edge to a component, reusing the previous assignment wherever it
//! still holds, and classifies the difference into merges, splits, additions
//! and removals.
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::array::{ArrayRegistry, ComponentArray, EdgeArray, NodeArray};
use crate::graph::events::{ComponentMergeSet, ComponentSplitSet, GraphEvent};
use crate::graph::traits::ReadGraph;
use crate::graph::GraphStore;
use crate::{ComponentId, EdgeId, NodeId};

pub mod view;

pub use view::{ComponentView, GraphComponent};

/// The difference between two component assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentChanges {
    /// Merges, in discovery order.
    pub merges: Vec<ComponentMergeSet>,
    /// Destroyed components: merge losers first, then vanished components.
    pub removed: Vec<ComponentId>,
    /// Splits, ordered by the id of the component that split.
    pub splits: Vec<ComponentSplitSet>,
    /// Components that did not exist before, in discovery order.
    pub added: Vec<ComponentId>,
}

impl ComponentChanges {
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
            && self.removed.is_empty()
            && self.splits.is_empty()
            && self.added.is_empty()
    }

    /// The changes as events in notification order.
    pub fn into_events(self) -> Vec<GraphEvent> {
        let merged_away: BTreeSet<_> = self.merges.iter().flat_map(|m| m.removes()).collect();
        let split_off: BTreeSet<_> = self
            .splits
            .iter()
            .flat_map(|s| s.splitters().iter().copied().filter(move |id| *id != s.old_id()))
            .collect();

        let mut events = Vec::with_capacity(
            self.merges.len() + self.removed.len() + self.splits.len() + self.added.len(),
        );
        events.extend(self.merges.into_iter().map(GraphEvent::ComponentsWillMerge));
        events.extend(
            self.removed
                .into_iter()
                .map(|id| GraphEvent::ComponentWillBeRemoved {
                    id,
                    has_merged: merged_away.contains(&id),
                }),
        );
        events.extend(self.splits.into_iter().map(GraphEvent::ComponentSplit));
        events.extend(self.added.into_iter().map(|id| GraphEvent::ComponentAdded {
            id,
            has_split: split_off.contains(&id),
        }));
        events
    }
}

/// Tracks the connected components of a graph.
#[derive(Debug)]
pub struct ComponentManager {
    nodes_component_id: NodeArray<ComponentId>,
    edges_component_id: EdgeArray<ComponentId>,
    component_ids: BTreeSet<ComponentId>,
    components: BTreeMap<ComponentId, GraphComponent>,
    vacated: VecDeque<ComponentId>,
    next_component_id: usize,
    registry: Arc<ArrayRegistry>,
    passes: usize,
}

impl ComponentManager {
    /// Creates a manager and assigns the existing elements of `graph` to components.
    pub fn new(graph: &GraphStore) -> Self {
        let mut manager = Self {
            nodes_component_id: NodeArray::new(graph.node_registry()),
            edges_component_id: EdgeArray::new(graph.edge_registry()),
            component_ids: BTreeSet::new(),
            components: BTreeMap::new(),
            vacated: VecDeque::new(),
            next_component_id: 0,
            registry: ArrayRegistry::new(),
            passes: 0,
        };
        manager.update(graph);
        manager
    }

    /// Recomputes the components of `graph` and returns the difference to the
    /// previous assignment.
    ///
    /// Every live node is first visited in id order; a node whose previous
    /// component has not been claimed yet claims it and floods its connected
    /// nodes with it. If the flood reaches nodes of other unclaimed previous
    /// components, those merge into the claimed one. Any other node with a
    /// previous component floods with a fresh id. Whenever a flood takes nodes
    /// from a component claimed earlier in the pass, that component is recorded
    /// as split into the flooding one. A second visit seeds fresh components
    /// for nodes that had no previous component. Previous components that were
    /// not claimed are removed.
    ///
    /// Split-off ids are reported before brand-new ones in
    /// [`ComponentChanges::added`].
    pub fn update(&mut self, graph: &GraphStore) -> ComponentChanges {
        let old_nodes = &self.nodes_component_id;
        let mut new_nodes: NodeArray<ComponentId> = NodeArray::new(graph.node_registry());
        let mut new_edges: EdgeArray<ComponentId> = EdgeArray::new(graph.edge_registry());

        let mut changes = ComponentChanges::default();
        let mut live = BTreeSet::new();
        let mut retained = BTreeSet::new();
        let mut merged_away = BTreeSet::new();
        let mut splits: BTreeMap<ComponentId, BTreeSet<ComponentId>> = BTreeMap::new();

        // Only ids released by earlier passes are reused, so a fresh id never
        // aliases a component of the previous assignment.
        let vacated = &mut self.vacated;
        let next_component_id = &mut self.next_component_id;
        let mut fresh_ids = Vec::new();

        for node in graph.node_ids() {
            let old = old_nodes[node];
            if !new_nodes[node].is_null() || old.is_null() {
                continue;
            }

            if retained.contains(&old) || merged_away.contains(&old) {
                let id = generate_id(vacated, next_component_id);
                let affected = flood(graph, node, id, old_nodes, &mut new_nodes, &mut new_edges);
                record_takeovers(&mut splits, &retained, &affected, id);
                fresh_ids.push(id);
                live.insert(id);
            } else {
                retained.insert(old);
                live.insert(old);

                let affected = flood(graph, node, old, old_nodes, &mut new_nodes, &mut new_edges);
                record_takeovers(&mut splits, &retained, &affected, old);

                let merged: BTreeSet<_> = affected
                    .into_iter()
                    .filter(|id| *id == old || !(retained.contains(id) || merged_away.contains(id)))
                    .collect();

                if merged.len() > 1 {
                    for loser in merged.iter().copied().filter(|id| *id != old) {
                        merged_away.insert(loser);
                        changes.removed.push(loser);
                    }
                    changes.merges.push(ComponentMergeSet::new(merged, old));
                }
            }
        }

        for node in graph.node_ids() {
            if new_nodes[node].is_null() {
                let id = generate_id(vacated, next_component_id);
                flood(graph, node, id, old_nodes, &mut new_nodes, &mut new_edges);
                fresh_ids.push(id);
                live.insert(id);
            }
        }

        let vanished = self
            .component_ids
            .iter()
            .copied()
            .filter(|id| !live.contains(id) && !merged_away.contains(id));
        changes.removed.extend(vanished);

        changes.splits = splits
            .into_iter()
            .map(|(old, splitters)| ComponentSplitSet::new(old, splitters))
            .collect();

        let fresh: BTreeSet<_> = fresh_ids.iter().copied().collect();
        let mut split_off = BTreeSet::new();
        for split in &changes.splits {
            for id in split.splitters().iter().copied() {
                if fresh.contains(&id) && split_off.insert(id) {
                    changes.added.push(id);
                }
            }
        }
        changes
            .added
            .extend(fresh_ids.into_iter().filter(|id| !split_off.contains(id)));

        vacated.extend(changes.removed.iter().copied());
        self.registry.grow(*next_component_id);

        self.nodes_component_id = new_nodes;
        self.edges_component_id = new_edges;
        self.component_ids = live;
        self.rebuild_components(graph);
        self.passes += 1;

        #[cfg(debug_assertions)]
        self.check_assignment(graph);

        debug!(
            components = self.component_ids.len(),
            merges = changes.merges.len(),
            splits = changes.splits.len(),
            added = changes.added.len(),
            removed = changes.removed.len(),
            "components updated"
        );

        changes
    }

    /// Ids of the live components in ascending order.
    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.component_ids.iter().copied()
    }

    pub fn num_components(&self) -> usize {
        self.component_ids.len()
    }

    pub fn contains_component(&self, id: ComponentId) -> bool {
        self.component_ids.contains(&id)
    }

    /// Membership of a live component.
    pub fn component(&self, id: ComponentId) -> Option<&GraphComponent> {
        self.components.get(&id)
    }

    /// Component of a node as of the last update, or the null id.
    pub fn component_id_of_node(&self, node: NodeId) -> ComponentId {
        if node.is_null() {
            return ComponentId::NULL;
        }
        self.live_or_null(self.nodes_component_id[node])
    }

    /// Component of an edge as of the last update, or the null id.
    pub fn component_id_of_edge(&self, edge: EdgeId) -> ComponentId {
        if edge.is_null() {
            return ComponentId::NULL;
        }
        self.live_or_null(self.edges_component_id[edge])
    }

    /// The component with the most nodes; the lowest id wins ties.
    pub fn largest_component_id(&self) -> ComponentId {
        let mut largest = ComponentId::NULL;
        let mut max_nodes = 0;

        for (id, component) in &self.components {
            if component.node_count() > max_nodes {
                max_nodes = component.node_count();
                largest = *id;
            }
        }

        largest
    }

    /// Creates a component array filled with `T::default()` that follows the component ids.
    pub fn component_array<T: Default + Clone>(&self) -> ComponentArray<T> {
        ComponentArray::new(&self.registry)
    }

    /// Creates a component array filled with `default`.
    pub fn component_array_with<T: Clone>(&self, default: T) -> ComponentArray<T> {
        ComponentArray::with_default(&self.registry, default)
    }

    /// Number of updates run so far, including the initial one.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub(crate) fn components_map(&self) -> &BTreeMap<ComponentId, GraphComponent> {
        &self.components
    }

    fn live_or_null(&self, id: ComponentId) -> ComponentId {
        if self.component_ids.contains(&id) {
            id
        } else {
            ComponentId::NULL
        }
    }

    fn rebuild_components(&mut self, graph: &GraphStore) {
        let mut components: BTreeMap<_, _> = self
            .component_ids
            .iter()
            .map(|id| (*id, GraphComponent::default()))
            .collect();

        for node in graph.node_ids() {
            if let Some(component) = components.get_mut(&self.nodes_component_id[node]) {
                component.push_node(node);
            }
        }

        for edge in graph.edge_ids() {
            if let Some(component) = components.get_mut(&self.edges_component_id[edge]) {
                component.push_edge(edge);
            }
        }

        self.components = components;
    }

    #[cfg(debug_assertions)]
    fn check_assignment(&self, graph: &GraphStore) {
        for node in graph.node_ids() {
            debug_assert!(
                self.component_ids.contains(&self.nodes_component_id[node]),
                "node {node:?} has no live component"
            );
        }

        for id in graph.edge_ids() {
            let edge = graph.edge(id);
            let component = self.edges_component_id[id];
            debug_assert!(
                component == self.nodes_component_id[edge.source_id()]
                    && component == self.nodes_component_id[edge.target_id()],
                "edge {id:?} disagrees with its endpoints"
            );
        }
    }
}

/// Draws the oldest released component id, or the next unused one.
///
/// # Panics
///
/// Panics when the unused ids are exhausted, as [`ComponentId::new`] does.
fn generate_id(vacated: &mut VecDeque<ComponentId>, next: &mut usize) -> ComponentId {
    vacated.pop_front().unwrap_or_else(|| {
        *next += 1;
        ComponentId::new(*next - 1)
    })
}

/// Records that the component `id` took over nodes of components claimed
/// earlier in the pass.
fn record_takeovers(
    splits: &mut BTreeMap<ComponentId, BTreeSet<ComponentId>>,
    retained: &BTreeSet<ComponentId>,
    affected: &BTreeSet<ComponentId>,
    id: ComponentId,
) {
    for previous in affected.iter().copied() {
        if previous != id && retained.contains(&previous) {
            splits
                .entry(previous)
                .or_insert_with(|| BTreeSet::from([previous]))
                .insert(id);
        }
    }
}

/// Breadth-first assignment of `id` to every node and edge reachable from `root`
/// that has no assignment yet.
///
/// Returns the distinct previous components of the visited nodes.
fn flood(
    graph: &GraphStore,
    root: NodeId,
    id: ComponentId,
    old_nodes: &NodeArray<ComponentId>,
    nodes: &mut NodeArray<ComponentId>,
    edges: &mut EdgeArray<ComponentId>,
) -> BTreeSet<ComponentId> {
    let mut affected = BTreeSet::new();
    let mut queue = VecDeque::from([root]);
    nodes[root] = id;

    while let Some(node) = queue.pop_front() {
        let previous = old_nodes[node];
        if !previous.is_null() {
            affected.insert(previous);
        }

        for edge in graph.node(node).edge_ids() {
            edges[edge] = id;

            let opposite = graph.edge(edge).opposite_id(node);
            if nodes[opposite].is_null() {
                nodes[opposite] = id;
                queue.push_back(opposite);
            }
        }
    }

    affected
}

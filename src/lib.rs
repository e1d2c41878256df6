//! Mutable graphs with incremental connected-component tracking.
//!
//! A [`MutableGraph`] stores nodes and edges under recyclable [`ElementId`]s.
//! Mutations are grouped into transactions; when the outermost transaction
//! commits, the [`ComponentManager`] updates the component assignment once and
//! listeners receive the merges, splits, additions and removals it found.
//!
//! ```
//! use graph_components::{GraphEvent, MutableGraph};
//! use std::sync::{Arc, Mutex};
//!
//! let mut graph = MutableGraph::new();
//! graph.enable_component_management();
//!
//! let [a, b] = [graph.add_node(), graph.add_node()];
//! assert_eq!(graph.num_components(), 2);
//!
//! let merges = Arc::new(Mutex::new(0));
//! let counter = merges.clone();
//! graph.subscribe(move |event| {
//!     if let GraphEvent::ComponentsWillMerge(_) = event {
//!         *counter.lock().unwrap() += 1;
//!     }
//! });
//!
//! graph.add_edge(a, b);
//! assert_eq!(graph.num_components(), 1);
//! assert_eq!(*merges.lock().unwrap(), 1);
//! ```

pub mod array;
pub mod components;
pub mod config;
pub mod graph;
pub mod id;
pub mod memory;
pub mod snapshot;

pub use array::{ArrayRegistry, ComponentArray, EdgeArray, GraphArray, NodeArray};
pub use components::{ComponentChanges, ComponentManager, ComponentView, GraphComponent};
pub use config::GraphConfig;
pub use graph::events::{ComponentMergeSet, ComponentSplitSet, GraphEvent, ListenerId};
pub use graph::traits::ReadGraph;
pub use graph::transaction::Transaction;
pub use graph::{Edge, GraphError, GraphStore, MutableGraph, Node};
pub use id::{ComponentId, EdgeId, ElementId, NodeId};
pub use snapshot::GraphSnapshot;

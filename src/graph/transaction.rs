use std::ops::{Deref, DerefMut};

use crate::MutableGraph;

/// Scope guard for a graph transaction.
///
/// Created by [`MutableGraph::transaction`]. Mutations made through the guard
/// belong to the transaction, which ends when the guard is dropped.
///
/// # Example
///
/// ```
/// # use graph_components::{MutableGraph, GraphEvent};
/// # use std::sync::{Arc, Mutex};
/// let mut graph = MutableGraph::new();
/// let changes = Arc::new(Mutex::new(0));
/// let counter = changes.clone();
/// graph.subscribe(move |event| {
///     if let GraphEvent::GraphChanged { .. } = event {
///         *counter.lock().unwrap() += 1;
///     }
/// });
///
/// {
///     let mut transaction = graph.transaction();
///     let a = transaction.add_node();
///     let b = transaction.add_node();
///     transaction.add_edge(a, b);
/// }
///
/// assert_eq!(*changes.lock().unwrap(), 1);
/// ```
#[must_use = "the transaction ends as soon as the guard is dropped"]
pub struct Transaction<'g> {
    graph: &'g mut MutableGraph,
}

impl<'g> Transaction<'g> {
    pub(crate) fn new(graph: &'g mut MutableGraph) -> Self {
        graph.begin_transaction();
        Self { graph }
    }
}

impl Deref for Transaction<'_> {
    type Target = MutableGraph;

    fn deref(&self) -> &Self::Target {
        self.graph
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.graph
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.graph.end_transaction();
    }
}

#[cfg(test)]
mod test {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use crate::{MutableGraph, ReadGraph};

    #[test]
    fn nested_transactions_commit_once() {
        let mut graph = MutableGraph::new();
        {
            let mut outer = graph.transaction();
            outer.add_node();
            {
                let mut inner = outer.transaction();
                inner.add_node();
            }
            assert!(outer.in_transaction());
        }
        assert!(!graph.in_transaction());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn transaction_ends_on_unwind() {
        let mut graph = MutableGraph::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            graph.perform_transaction(|graph| {
                graph.add_node();
                panic!("aborted");
            })
        }));

        assert!(result.is_err());
        assert!(!graph.in_transaction());
        assert_eq!(graph.node_count(), 1);
    }
}

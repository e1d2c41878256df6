//! Dense side arrays keyed by element ids.
//!
//! A [`GraphArray`] attaches auxiliary data to the nodes, edges or components
//! of a graph. It registers with its owner through an [`ArrayRegistry`] so that
//! its length follows the owner's id capacity. The registration is weak: the
//! owner never holds the array, and an array may outlive its owner.
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use crate::id::{ComponentKind, EdgeKind, ElementId, NodeKind};
use crate::memory::EntityIndex;

/// Per-node array.
pub type NodeArray<T> = GraphArray<ElementId<NodeKind>, T>;

/// Per-edge array.
pub type EdgeArray<T> = GraphArray<ElementId<EdgeKind>, T>;

/// Per-component array.
pub type ComponentArray<T> = GraphArray<ElementId<ComponentKind>, T>;

/// Capacity shared by an id owner with the arrays keyed by its ids.
#[derive(Debug, Default)]
pub struct ArrayRegistry {
    capacity: AtomicUsize,
    arrays: AtomicUsize,
}

impl ArrayRegistry {
    pub fn new() -> Arc<Self> {
        Arc::default()
    }

    /// Current id capacity of the owner.
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Acquire)
    }

    /// Number of live arrays registered with the owner.
    pub fn array_count(&self) -> usize {
        self.arrays.load(Ordering::Acquire)
    }

    /// Grows the capacity seen by every registered array. Never shrinks.
    pub(crate) fn grow(&self, capacity: usize) {
        self.capacity.fetch_max(capacity, Ordering::AcqRel);
    }
}

/// Array of `T` indexed by an element id.
///
/// Reads of ids that were never written return the array's default value.
///
/// # Example
///
/// ```
/// # use graph_components::MutableGraph;
/// let mut graph = MutableGraph::new();
/// let mut labels = graph.node_array::<&str>();
/// assert_eq!(labels.len(), 0);
///
/// let a = graph.add_node();
/// let b = graph.add_node();
/// assert_eq!(labels.len(), 2);
///
/// labels[a] = "a";
/// assert_eq!(labels[a], "a");
/// assert_eq!(labels[b], "");
/// ```
pub struct GraphArray<K, T> {
    values: Vec<T>,
    default: T,
    registry: Weak<ArrayRegistry>,
    phantom: PhantomData<fn(K)>,
}

impl<K: EntityIndex, T: Clone> GraphArray<K, T> {
    /// Creates an array registered with `registry`, filled with `T::default()`.
    pub fn new(registry: &Arc<ArrayRegistry>) -> Self
    where
        T: Default,
    {
        Self::with_default(registry, T::default())
    }

    /// Creates an array registered with `registry`, filled with `default`.
    pub fn with_default(registry: &Arc<ArrayRegistry>, default: T) -> Self {
        registry.arrays.fetch_add(1, Ordering::AcqRel);
        Self {
            values: Vec::new(),
            default,
            registry: Arc::downgrade(registry),
            phantom: PhantomData,
        }
    }

    /// Number of addressable slots. Follows the owner's capacity while the owner is alive.
    pub fn len(&self) -> usize {
        match self.registry.upgrade() {
            Some(registry) => registry.capacity().max(self.values.len()),
            None => self.values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: K) -> &T {
        self.values.get(key.index()).unwrap_or(&self.default)
    }

    pub fn set(&mut self, key: K, value: T) {
        self[key] = value;
    }

    /// Sets every slot to `value`.
    pub fn fill(&mut self, value: T) {
        let len = self.len();
        self.values.clear();
        self.values.resize(len, value);
    }

    /// Sets every slot back to the default value.
    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// Iterates over all addressable slots.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        (0..self.len()).map(move |index| {
            let key = K::new(index);
            (key, self.get(key))
        })
    }
}

impl<K: EntityIndex, T> Index<K> for GraphArray<K, T> {
    type Output = T;

    fn index(&self, key: K) -> &Self::Output {
        self.values.get(key.index()).unwrap_or(&self.default)
    }
}

impl<K: EntityIndex, T: Clone> IndexMut<K> for GraphArray<K, T> {
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        let index = key.index();

        if index >= self.values.len() {
            let len = self.len().max(index + 1);
            self.values.resize(len, self.default.clone());
        }

        &mut self.values[index]
    }
}

impl<K, T: Clone> Clone for GraphArray<K, T> {
    fn clone(&self) -> Self {
        if let Some(registry) = self.registry.upgrade() {
            registry.arrays.fetch_add(1, Ordering::AcqRel);
        }

        Self {
            values: self.values.clone(),
            default: self.default.clone(),
            registry: self.registry.clone(),
            phantom: PhantomData,
        }
    }
}

impl<K, T> Drop for GraphArray<K, T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.arrays.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl<K, T: Debug> Debug for GraphArray<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphArray")
            .field("values", &self.values)
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::NodeId;

    #[test]
    fn follows_registry_capacity() {
        let registry = ArrayRegistry::new();
        let array = NodeArray::<u32>::new(&registry);
        assert!(array.is_empty());

        registry.grow(5);
        assert_eq!(array.len(), 5);
        assert_eq!(array[NodeId::new(4)], 0);

        registry.grow(2);
        assert_eq!(array.len(), 5);
    }

    #[test]
    fn registration_tracks_lifetime() {
        let registry = ArrayRegistry::new();
        assert_eq!(registry.array_count(), 0);

        let a = NodeArray::<u8>::new(&registry);
        let b = a.clone();
        assert_eq!(registry.array_count(), 2);

        drop(a);
        assert_eq!(registry.array_count(), 1);
        drop(b);
        assert_eq!(registry.array_count(), 0);
    }

    #[test]
    fn outlives_registry() {
        let registry = ArrayRegistry::new();
        let mut array = NodeArray::with_default(&registry, 'x');
        registry.grow(3);
        array[NodeId::new(1)] = 'y';
        drop(registry);

        assert_eq!(array.len(), 3);
        assert!(array.iter().map(|(_, c)| *c).eq(['x', 'y', 'x']));
    }

    #[test]
    fn fill_and_reset() {
        let registry = ArrayRegistry::new();
        registry.grow(3);
        let mut array = NodeArray::<i64>::new(&registry);

        array.fill(7);
        assert!(array.iter().all(|(_, v)| *v == 7));

        array.reset();
        assert_eq!(array[NodeId::new(2)], 0);
        assert_eq!(array.len(), 3);
    }
}

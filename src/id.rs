//! Strongly typed element handles.
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::memory::EntityIndex;

/// Marker for the kind of graph element an [`ElementId`] refers to.
pub trait ElementKind: 'static {
    /// Name used when formatting ids of this kind.
    const NAME: &'static str;
}

/// Marker for node ids.
#[derive(Debug)]
pub enum NodeKind {}

/// Marker for edge ids.
#[derive(Debug)]
pub enum EdgeKind {}

/// Marker for component ids.
#[derive(Debug)]
pub enum ComponentKind {}

impl ElementKind for NodeKind {
    const NAME: &'static str = "NodeId";
}

impl ElementKind for EdgeKind {
    const NAME: &'static str = "EdgeId";
}

impl ElementKind for ComponentKind {
    const NAME: &'static str = "ComponentId";
}

/// Identifier of a node.
pub type NodeId = ElementId<NodeKind>;

/// Identifier of an edge.
pub type EdgeId = ElementId<EdgeKind>;

/// Identifier of a connected component.
pub type ComponentId = ElementId<ComponentKind>;

/// Integer handle of a graph element, tagged with the element's kind.
///
/// An id is either null or the index of a slot that is live or was live before.
/// Ids of different kinds do not convert into each other.
///
/// # Example
///
/// ```
/// # use graph_components::{NodeId, EdgeId};
/// let node = NodeId::new(3);
/// assert_eq!(node.index(), 3);
/// assert!(!node.is_null());
/// assert!(NodeId::NULL.is_null());
/// assert_eq!(EdgeId::default(), EdgeId::NULL);
/// assert!(NodeId::new(2) < node);
/// ```
pub struct ElementId<K> {
    value: i32,
    kind: PhantomData<fn() -> K>,
}

impl<K> ElementId<K> {
    /// Raw value of the null id.
    pub const NULL_VALUE: i32 = -1;

    /// The null id.
    pub const NULL: Self = Self {
        value: Self::NULL_VALUE,
        kind: PhantomData,
    };

    /// Creates an id from a slot position.
    ///
    /// # Panics
    ///
    /// Panics if the position does not fit into an `i32`.
    #[inline]
    pub fn new(index: usize) -> Self {
        match Self::try_new(index) {
            Some(id) => id,
            None => panic!("element index {index} is out of range"),
        }
    }

    /// Creates an id from a slot position, or `None` if it does not fit.
    #[inline]
    pub fn try_new(index: usize) -> Option<Self> {
        let value = i32::try_from(index).ok()?;
        Some(Self {
            value,
            kind: PhantomData,
        })
    }

    /// Whether this is the null id.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.value == Self::NULL_VALUE
    }

    /// The slot position of the id.
    ///
    /// # Panics
    ///
    /// Panics on the null id.
    #[inline]
    pub fn index(self) -> usize {
        assert!(!self.is_null(), "null id has no index");
        self.value as usize
    }

    /// The raw integer value, `-1` for the null id.
    #[inline]
    pub const fn value(self) -> i32 {
        self.value
    }

    /// Converts to `None` if null.
    #[inline]
    pub fn non_null(self) -> Option<Self> {
        (!self.is_null()).then_some(self)
    }
}

impl<K> Clone for ElementId<K> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for ElementId<K> {}

impl<K> Default for ElementId<K> {
    #[inline]
    fn default() -> Self {
        Self::NULL
    }
}

impl<K> PartialEq for ElementId<K> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K> Eq for ElementId<K> {}

impl<K> PartialOrd for ElementId<K> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for ElementId<K> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<K> Hash for ElementId<K> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<K: ElementKind> Debug for ElementId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "{}(null)", K::NAME)
        } else {
            write!(f, "{}({})", K::NAME, self.value)
        }
    }
}

impl<K> Display for ElementId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<K: ElementKind> EntityIndex for ElementId<K> {
    #[inline(always)]
    fn try_new(index: usize) -> Option<Self> {
        ElementId::try_new(index)
    }

    #[inline(always)]
    fn index(self) -> usize {
        ElementId::index(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn null_is_default_and_orders_first() {
        assert_eq!(NodeId::default(), NodeId::NULL);
        assert!(NodeId::NULL < NodeId::new(0));
        assert_eq!(NodeId::NULL.value(), -1);
        assert_eq!(NodeId::NULL.non_null(), None);
        assert_eq!(NodeId::new(4).non_null(), Some(NodeId::new(4)));
    }

    #[test]
    fn formatting() {
        assert_eq!(format!("{:?}", EdgeId::new(7)), "EdgeId(7)");
        assert_eq!(format!("{:?}", ComponentId::NULL), "ComponentId(null)");
        assert_eq!(NodeId::new(12).to_string(), "12");
    }

    #[test]
    fn hashable() {
        let ids: HashSet<_> = [NodeId::new(1), NodeId::new(1), NodeId::new(2)]
            .into_iter()
            .collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn out_of_range() {
        assert!(NodeId::try_new(i32::MAX as usize).is_some());
        assert!(NodeId::try_new(i32::MAX as usize + 1).is_none());
    }

    #[test]
    #[should_panic(expected = "null id has no index")]
    fn null_index_panics() {
        NodeId::NULL.index();
    }
}

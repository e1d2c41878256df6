//! Index-keyed storage for graph elements.
//!
//! Inspired by the memory management in Cranelift IR.
pub mod slab;

pub use slab::Slab;

/// A typed index that can be converted to and from a `usize` slot position.
pub trait EntityIndex: Copy + Eq + Ord {
    /// Creates an index from a slot position.
    ///
    /// # Panics
    ///
    /// Panics when the position does not fit the backing integer.
    fn new(index: usize) -> Self {
        match Self::try_new(index) {
            Some(index) => index,
            None => panic!("index {index} exceeds the index type"),
        }
    }

    fn try_new(index: usize) -> Option<Self>;

    /// The slot position of the index.
    fn index(self) -> usize;
}

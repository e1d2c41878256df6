use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use bitvec::vec::BitVec;

use crate::memory::EntityIndex;

/// A slab arena with stable, recycled keys.
///
/// Removed keys are not reused immediately. They are held as *vacated* until
/// [`Slab::release_vacated`] is called, after which they are handed out again
/// in the order they were removed.
#[derive(Debug, Clone)]
pub struct Slab<K, V> {
    data: Vec<Option<V>>,
    in_use: BitVec,
    free: VecDeque<K>,
    vacated: Vec<K>,
    len: usize,
    phantom: PhantomData<K>,
}

impl<K, V> Slab<K, V>
where
    K: EntityIndex,
{
    /// Creates an empty [`Slab<K, V>`].
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            in_use: BitVec::with_capacity(capacity),
            free: VecDeque::new(),
            vacated: Vec::new(),
            len: 0,
            phantom: PhantomData,
        }
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether there is no stored value.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the high-water mark; every key at or above it has never been used.
    pub fn bound(&self) -> usize {
        self.data.len()
    }

    pub fn contains(&self, key: K) -> bool {
        self.in_use
            .get(key.index())
            .map(|bit| *bit)
            .unwrap_or(false)
    }

    /// The key the next call to [`Slab::insert`] will return.
    pub fn next_key(&self) -> K {
        match self.free.front() {
            Some(key) => *key,
            None => K::new(self.data.len()),
        }
    }

    /// Inserts a value under the oldest released key, or a fresh one.
    pub fn insert(&mut self, value: V) -> K {
        let key = match self.free.pop_front() {
            Some(key) => key,
            None => {
                let key = K::new(self.data.len());
                self.grow_to(key.index() + 1);
                key
            }
        };

        self.occupy(key, value);
        key
    }

    /// Inserts a value under an explicit key.
    ///
    /// Keys skipped over when the key lies beyond the high-water mark become
    /// free, in ascending order. Returns the value back if the key is in use.
    pub fn insert_at(&mut self, key: K, value: V) -> Result<(), V> {
        if self.contains(key) {
            return Err(value);
        }

        let index = key.index();
        if index >= self.data.len() {
            let skipped = self.data.len()..index;
            self.free.extend(skipped.map(K::new));
            self.grow_to(index + 1);
        } else if let Some(position) = self.free.iter().position(|k| *k == key) {
            self.free.remove(position);
        } else if let Some(position) = self.vacated.iter().position(|k| *k == key) {
            self.vacated.remove(position);
        }

        self.occupy(key, value);
        Ok(())
    }

    /// Removes a value. Its key stays vacated until [`Slab::release_vacated`].
    pub fn remove(&mut self, key: K) -> Option<V> {
        if !self.contains(key) {
            return None;
        }

        let index = key.index();
        self.in_use.set(index, false);
        self.len -= 1;
        self.vacated.push(key);
        self.data[index].take()
    }

    /// Makes vacated keys available for reuse, oldest first.
    pub fn release_vacated(&mut self) {
        self.free.extend(self.vacated.drain(..));
    }

    /// Keys removed since the last [`Slab::release_vacated`].
    pub fn vacated(&self) -> &[K] {
        &self.vacated
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.data.get(key.index())?.as_ref()
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.data.get_mut(key.index())?.as_mut()
    }

    /// Reserves room for `additional` values beyond the free keys.
    pub fn reserve(&mut self, additional: usize) {
        let extra = additional.saturating_sub(self.free.len());
        self.data.reserve(extra);
        self.in_use.reserve(extra);
    }

    /// Iterates over the live keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K> {
        Keys {
            ones: self.in_use.iter_ones(),
            len: self.len,
            phantom: PhantomData,
        }
    }

    fn grow_to(&mut self, len: usize) {
        self.data.resize_with(len, || None);
        self.in_use.resize(len, false);
    }

    fn occupy(&mut self, key: K, value: V) {
        let index = key.index();
        self.data[index] = Some(value);
        self.in_use.set(index, true);
        self.len += 1;
    }
}

impl<K, V> Index<K> for Slab<K, V>
where
    K: EntityIndex,
{
    type Output = V;

    fn index(&self, key: K) -> &Self::Output {
        match self.get(key) {
            Some(value) => value,
            None => panic!("invalid key"),
        }
    }
}

impl<K, V> IndexMut<K> for Slab<K, V>
where
    K: EntityIndex,
{
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        match self.get_mut(key) {
            Some(value) => value,
            None => panic!("invalid key"),
        }
    }
}

impl<K, V> Default for Slab<K, V>
where
    K: EntityIndex,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator created by [`Slab::keys`].
pub struct Keys<'a, K> {
    ones: bitvec::slice::IterOnes<'a, usize, bitvec::order::Lsb0>,
    len: usize,
    phantom: PhantomData<K>,
}

impl<'a, K> Iterator for Keys<'a, K>
where
    K: EntityIndex,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.ones.next()?;
        self.len -= 1;
        Some(K::new(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K> ExactSizeIterator for Keys<'a, K> where K: EntityIndex {}
impl<'a, K> FusedIterator for Keys<'a, K> where K: EntityIndex {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::NodeId;

    #[test]
    fn keys_are_released_in_removal_order() {
        let mut slab = Slab::<NodeId, char>::new();
        let a = slab.insert('a');
        let b = slab.insert('b');
        let c = slab.insert('c');

        slab.remove(c);
        slab.remove(a);

        // Not reusable until released.
        assert_eq!(slab.insert('d'), NodeId::new(3));

        slab.release_vacated();
        assert_eq!(slab.next_key(), c);
        assert_eq!(slab.insert('e'), c);
        assert_eq!(slab.insert('f'), a);
        assert_eq!(slab.insert('g'), NodeId::new(4));
        assert!(slab.contains(b));
        assert_eq!(slab.len(), 5);
    }

    #[test]
    fn insert_at_beyond_bound_frees_gap() {
        let mut slab = Slab::<NodeId, ()>::new();
        slab.insert_at(NodeId::new(3), ()).unwrap();

        assert_eq!(slab.bound(), 4);
        assert!(slab.keys().eq([NodeId::new(3)]));
        assert_eq!(slab.insert(()), NodeId::new(0));
        assert_eq!(slab.insert(()), NodeId::new(1));
        assert_eq!(slab.insert(()), NodeId::new(2));
        assert_eq!(slab.insert(()), NodeId::new(4));
    }

    #[test]
    fn insert_at_reclaims_free_and_vacated_keys() {
        let mut slab = Slab::<NodeId, u8>::new();
        let a = slab.insert(0);
        let b = slab.insert(1);
        slab.remove(a);
        slab.release_vacated();
        slab.remove(b);

        slab.insert_at(a, 2).unwrap();
        slab.insert_at(b, 3).unwrap();
        assert!(slab.vacated().is_empty());
        assert_eq!(slab.insert_at(a, 4), Err(4));
        assert_eq!(slab.insert(5), NodeId::new(2));
        assert_eq!(slab[b], 3);
    }

    #[test]
    fn iteration_skips_holes() {
        let mut slab = Slab::<NodeId, usize>::new();
        let keys: Vec<_> = (0..5).map(|i| slab.insert(i)).collect();
        slab.remove(keys[1]);
        slab.remove(keys[3]);

        assert!(slab.keys().eq([keys[0], keys[2], keys[4]]));
        assert_eq!(slab.keys().len(), 3);
        let values: Vec<_> = slab.keys().map(|k| slab[k]).collect();
        assert_eq!(values, [0, 2, 4]);
        assert_eq!(slab.remove(keys[1]), None);
    }
}

//! An ordered map based on a sentinel-threaded binary search tree.

use compare::{Compare, Natural};
use std::cmp::Ordering;
use std::cmp::Ordering::*;
use std::fmt::{self, Debug};
use std::hash::{self, Hash};
use std::iter;
use std::ops::{self, Bound};
use std::ops::Bound::*;
use std::ptr;
use super::Error;
use super::node::{self, HIGH, Item, LOW, Place, Tree, Walk};

pub use super::node::Handle;

/// An ordered map based on a binary search tree.
///
/// The tree is threaded with two boundary sentinels: one hangs below the minimum entry and
/// marks the position before the first entry ([`rend`](#method.rend)), the other hangs below
/// the maximum entry and marks the position past the last entry ([`end`](#method.end)). Both
/// ends of the map are therefore reachable in constant time.
///
/// The tree is not rebalanced. Lookups, insertions and removals take time proportional to the
/// depth of the tree, which is logarithmic for keys inserted in random order and linear for keys
/// inserted in sorted order.
///
/// The behavior of this map is undefined if a key's ordering relative to any other key changes
/// while the key is in the map. This is normally only possible through `Cell`, `RefCell`, or
/// unsafe code.
#[derive(Clone)]
pub struct Map<K, V, C = Natural<K>> where C: Compare<K> {
    tree: Tree<K, V>,
    cmp: C,
}

impl<K, V> Map<K, V> where K: Ord {
    /// Creates an empty map ordered according to the natural order of its keys.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), Some((&3, &"c")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn new() -> Self { Map::with_cmp(compare::natural()) }

    /// Creates an empty map with room for `capacity` entries, ordered according to the natural
    /// order of its keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Map::with_capacity_and_cmp(capacity, compare::natural())
    }
}

impl<K, V, C> Map<K, V, C> where C: Compare<K> {
    /// Creates an empty map ordered according to the given comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    ///
    /// let mut map = ordtree::Map::with_cmp(natural().rev());
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&3, &"c")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn with_cmp(cmp: C) -> Self { Map::with_capacity_and_cmp(0, cmp) }

    /// Creates an empty map with room for `capacity` entries, ordered according to the given
    /// comparator.
    pub fn with_capacity_and_cmp(capacity: usize, cmp: C) -> Self {
        Map { tree: Tree::with_capacity(capacity), cmp: cmp }
    }

    /// Creates a map from the given entries, ordered according to the given comparator.
    ///
    /// Entries are inserted in order; an entry whose key is already present is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::natural;
    ///
    /// let map = ordtree::Map::from_iter_with_cmp(vec![(2, "b"), (1, "a"), (2, "z")], natural());
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&2), Some(&"b"));
    /// ```
    pub fn from_iter_with_cmp<I>(it: I, cmp: C) -> Self where I: IntoIterator<Item = (K, V)> {
        let mut map = Map::with_cmp(cmp);
        map.extend(it);
        map
    }

    /// Checks if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// assert!(map.is_empty());
    ///
    /// map.insert(2, "b");
    /// assert!(!map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool { self.tree.root().is_none() }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// assert_eq!(map.len(), 0);
    ///
    /// map.insert(2, "b");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize { self.tree.len() }

    /// Returns the theoretical maximum number of entries the map could hold.
    ///
    /// This is derived from the size of a node and the address space; it is not a limit that
    /// the map enforces.
    pub fn max_size(&self) -> usize { self.tree.max_size() }

    /// Returns the number of entries the map can hold without reallocating its node pool.
    pub fn capacity(&self) -> usize { self.tree.capacity() }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) { self.tree.reserve(additional) }

    /// Reserves room for at least `additional` more entries, reporting allocation failure
    /// instead of aborting.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map: ordtree::Map<u32, u32> = ordtree::Map::new();
    /// map.try_reserve(16).unwrap();
    /// assert!(map.capacity() >= 16);
    /// assert!(map.try_reserve(usize::MAX).is_err());
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.tree.try_reserve(additional)
    }

    /// Returns a reference to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use compare::{Compare, natural};
    ///
    /// let map: ordtree::Map<i32, &str> = ordtree::Map::new();
    /// assert!(map.cmp().compares_lt(&1, &2));
    ///
    /// let map: ordtree::Map<i32, &str, _> = ordtree::Map::with_cmp(natural().rev());
    /// assert!(map.cmp().compares_gt(&1, &2));
    /// ```
    pub fn cmp(&self) -> &C { &self.cmp }

    /// Removes all entries from the map.
    ///
    /// Handles to removed entries become stale; handles to the boundaries stay valid.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.len(), 3);
    /// assert_eq!(map.iter().next(), Some((&1, &"a")));
    ///
    /// map.clear();
    ///
    /// assert_eq!(map.len(), 0);
    /// assert_eq!(map.iter().next(), None);
    /// assert!(map.begin() == map.end());
    /// ```
    pub fn clear(&mut self) { self.tree.clear() }

    /// Inserts an entry into the map if its key is not already present.
    ///
    /// Returns a handle to the entry with the given key and whether a new entry was inserted.
    /// If the key was already present the map is left untouched and the given value is
    /// dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// let (first, inserted) = map.insert(1, "a");
    /// assert!(inserted);
    ///
    /// let (second, inserted) = map.insert(1, "b");
    /// assert!(!inserted);
    /// assert_eq!(first, second);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> (Handle, bool) {
        match self.tree.search(&self.cmp, &key) {
            Ok(index) => (self.tree.handle(index), false),
            Err(place) => {
                let index = self.tree.attach(place, key, value);
                (self.tree.handle(index), true)
            }
        }
    }

    /// Returns a mutable reference to the value associated with the given key, inserting the
    /// default value first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map: ordtree::Map<&str, i32> = ordtree::Map::new();
    ///
    /// *map.get_or_insert_default("a") += 1;
    /// *map.get_or_insert_default("a") += 1;
    /// *map.get_or_insert_default("b") += 1;
    ///
    /// assert_eq!(map[&"a"], 2);
    /// assert_eq!(map[&"b"], 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V where V: Default {
        self.entry(key).or_default()
    }

    /// Removes and returns the entry whose key is equal to the given key, returning
    /// `None` if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.len(), 3);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.remove(&1), Some((1, "a")));
    ///
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&1), None);
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<(K, V)> where C: Compare<Q, K> {
        match self.tree.search(&self.cmp, key) {
            Ok(index) => Some(self.tree.remove(index)),
            Err(_) => None,
        }
    }

    /// Removes the entry whose key is equal to the given key, returning the number of entries
    /// removed.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// map.insert(1, "a");
    ///
    /// assert_eq!(map.erase(&1), 1);
    /// assert_eq!(map.erase(&1), 0);
    /// ```
    pub fn erase<Q: ?Sized>(&mut self, key: &Q) -> usize where C: Compare<Q, K> {
        if self.remove(key).is_some() { 1 } else { 0 }
    }

    /// Removes the entry the handle refers to and returns its key and value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Boundary`] if the handle refers to [`end`](#method.end) or
    /// [`rend`](#method.rend), and [`Error::Stale`] if its entry was already removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::Error;
    ///
    /// let mut map = ordtree::Map::new();
    /// let (handle, _) = map.insert(1, "a");
    ///
    /// assert_eq!(map.erase_at(handle), Ok((1, "a")));
    /// assert_eq!(map.erase_at(handle), Err(Error::Stale));
    /// assert_eq!(map.erase_at(map.end().handle()), Err(Error::Boundary));
    /// ```
    pub fn erase_at(&mut self, handle: Handle) -> Result<(K, V), Error> {
        let index = self.tree.locate_entry(handle)?;
        Ok(self.tree.remove(index))
    }

    /// Removes the entries from `first` up to, but not including, `last`, returning the number
    /// of entries removed.
    ///
    /// `last` may be a handle to [`end`](#method.end), in which case every entry from `first`
    /// on is removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Boundary`] if either handle refers to [`rend`](#method.rend),
    /// [`Error::Stale`] if either refers to a removed entry, and [`Error::InvertedRange`] if
    /// `first` is ordered after `last`. The map is unchanged when an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map: ordtree::Map<_, _> = (1..6).map(|i| (i, i * 10)).collect();
    ///
    /// let first = map.find(&2).handle();
    /// let last = map.find(&4).handle();
    ///
    /// assert_eq!(map.erase_range(first, last), Ok(2));
    /// assert_eq!(map.iter().map(|e| *e.0).collect::<Vec<_>>(), [1, 4, 5]);
    /// ```
    pub fn erase_range(&mut self, first: Handle, last: Handle) -> Result<usize, Error> {
        let mut index = self.tree.locate(first)?;
        let last = self.tree.locate(last)?;

        if index == LOW || last == LOW { return Err(Error::Boundary); }
        if !self.tree.precedes(&self.cmp, index, last) { return Err(Error::InvertedRange); }

        let mut count = 0;

        while index != last {
            let next = self.tree.next(index);
            self.tree.remove(index);
            index = next;
            count += 1;
        }

        tracing::debug!(count, len = self.tree.len(), "erased range");
        Ok(count)
    }

    /// Returns the map's entry corresponding to the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut counts = ordtree::Map::new();
    ///
    /// for s in vec!["a", "b", "a", "c", "a", "b"] {
    ///     *counts.entry(s).or_insert(0) += 1;
    /// }
    ///
    /// assert_eq!(counts[&"a"], 3);
    /// assert_eq!(counts[&"b"], 2);
    /// assert_eq!(counts[&"c"], 1);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<K, V> {
        match self.tree.search(&self.cmp, &key) {
            Ok(index) => Entry::Occupied(OccupiedEntry { tree: &mut self.tree, index: index }),
            Err(place) =>
                Entry::Vacant(VacantEntry { tree: &mut self.tree, place: place, key: key }),
        }
    }

    /// Checks if the map contains the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// assert!(!map.contains_key(&1));
    /// map.insert(1, "a");
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool where C: Compare<Q, K> {
        self.tree.search(&self.cmp, key).is_ok()
    }

    /// Returns a reference to the value associated with the given key, or `None` if the
    /// map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// assert_eq!(map.get(&1), None);
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// ```
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V> where C: Compare<Q, K> {
        match self.tree.search(&self.cmp, key) {
            Ok(index) => Some(self.tree.pool.entry(index).1),
            Err(_) => None,
        }
    }

    /// Returns a mutable reference to the value associated with the given key, or `None`
    /// if the map does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// assert_eq!(map.get(&1), None);
    /// map.insert(1, "a");
    ///
    /// {
    ///     let value = map.get_mut(&1).unwrap();
    ///     assert_eq!(*value, "a");
    ///     *value = "b";
    /// }
    ///
    /// assert_eq!(map.get(&1), Some(&"b"));
    /// ```
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V> where C: Compare<Q, K> {
        match self.tree.search(&self.cmp, key) {
            Ok(index) => Some(self.tree.pool.entry_mut(index).1),
            Err(_) => None,
        }
    }

    /// Returns a cursor at the entry with the given key, or at [`end`](#method.end) if the map
    /// does not contain the key.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// map.insert(1, "a");
    ///
    /// assert_eq!(map.find(&1).entry(), Some((&1, &"a")));
    /// assert!(map.find(&2) == map.end());
    /// ```
    pub fn find<Q: ?Sized>(&self, key: &Q) -> Cursor<K, V> where C: Compare<Q, K> {
        Cursor { tree: &self.tree, index: self.tree.search(&self.cmp, key).unwrap_or(HIGH) }
    }

    /// Returns a reference to the map's minimum key and a reference to its associated
    /// value, or `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// assert_eq!(map.first(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.first(), Some((&1, &"a")));
    /// ```
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|index| self.tree.pool.entry(index))
    }

    /// Returns a reference to the map's minimum key and a mutable reference to its
    /// associated value, or `None` if the map is empty.
    pub fn first_mut(&mut self) -> Option<(&K, &mut V)> {
        let index = self.tree.first()?;
        Some(self.tree.pool.entry_mut(index))
    }

    /// Returns a reference to the map's maximum key and a reference to its associated
    /// value, or `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// assert_eq!(map.last(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.last(), Some((&3, &"c")));
    /// ```
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|index| self.tree.pool.entry(index))
    }

    /// Returns a reference to the map's maximum key and a mutable reference to its
    /// associated value, or `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// {
    ///     let last = map.last_mut().unwrap();
    ///     assert_eq!(last, (&3, &mut "c"));
    ///     *last.1 = "cc";
    /// }
    ///
    /// assert_eq!(map.last(), Some((&3, &"cc")));
    /// ```
    pub fn last_mut(&mut self) -> Option<(&K, &mut V)> {
        let index = self.tree.last()?;
        Some(self.tree.pool.entry_mut(index))
    }

    /// Removes the map's minimum key and returns it and its associated value, or `None` if the
    /// map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// assert_eq!(map.pop_first(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.pop_first(), Some((1, "a")));
    /// assert_eq!(map.first(), Some((&2, &"b")));
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let index = self.tree.first()?;
        Some(self.tree.remove(index))
    }

    /// Removes the map's maximum key and returns it and its associated value, or `None` if the
    /// map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    /// assert_eq!(map.pop_last(), None);
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.pop_last(), Some((3, "c")));
    /// assert_eq!(map.last(), Some((&2, &"b")));
    /// ```
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let index = self.tree.last()?;
        Some(self.tree.remove(index))
    }

    /// Returns a cursor at the first entry whose key is not less than the given key, or at
    /// [`end`](#method.end) if there is no such entry.
    ///
    /// The given key need not itself be present in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.lower_bound(&0).key(), Some(&1));
    /// assert_eq!(map.lower_bound(&1).key(), Some(&1));
    /// assert_eq!(map.lower_bound(&2).key(), Some(&3));
    /// assert!(map.lower_bound(&4).is_end());
    /// ```
    pub fn lower_bound<Q: ?Sized>(&self, key: &Q) -> Cursor<K, V> where C: Compare<Q, K> {
        Cursor { tree: &self.tree, index: self.tree.lower_bound(&self.cmp, key) }
    }

    /// Returns a cursor at the first entry whose key is greater than the given key, or at
    /// [`end`](#method.end) if there is no such entry.
    ///
    /// The given key need not itself be present in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// assert_eq!(map.upper_bound(&0).key(), Some(&1));
    /// assert_eq!(map.upper_bound(&1).key(), Some(&3));
    /// assert_eq!(map.upper_bound(&2).key(), Some(&3));
    /// assert!(map.upper_bound(&3).is_end());
    /// ```
    pub fn upper_bound<Q: ?Sized>(&self, key: &Q) -> Cursor<K, V> where C: Compare<Q, K> {
        Cursor { tree: &self.tree, index: self.tree.upper_bound(&self.cmp, key) }
    }

    /// Returns the cursors `(lower_bound(key), upper_bound(key))`.
    ///
    /// Since keys are unique, at most one entry lies between the two cursors.
    pub fn equal_range<Q: ?Sized>(&self, key: &Q) -> (Cursor<K, V>, Cursor<K, V>)
        where C: Compare<Q, K> {

        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Returns a cursor at the map's minimum entry, or at [`end`](#method.end) if the map is
    /// empty.
    pub fn begin(&self) -> Cursor<K, V> { Cursor { tree: &self.tree, index: self.tree.begin() } }

    /// Returns a cursor at the position past the map's maximum entry.
    ///
    /// The position is fixed for the life of the map: moving forward from it stays there, and
    /// moving backward from it reaches the maximum entry.
    pub fn end(&self) -> Cursor<K, V> { Cursor { tree: &self.tree, index: HIGH } }

    /// Returns a cursor at the map's maximum entry, or at [`rend`](#method.rend) if the map is
    /// empty.
    pub fn rbegin(&self) -> Cursor<K, V> {
        Cursor { tree: &self.tree, index: self.tree.rbegin() }
    }

    /// Returns a cursor at the position before the map's minimum entry.
    ///
    /// The position is fixed for the life of the map: moving backward from it stays there, and
    /// moving forward from it reaches the minimum entry.
    pub fn rend(&self) -> Cursor<K, V> { Cursor { tree: &self.tree, index: LOW } }

    /// Returns a cursor at the position the handle refers to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stale`] if the handle's entry was removed.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// let (handle, _) = map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut cursor = map.cursor(handle).unwrap();
    /// cursor.move_next();
    /// assert_eq!(cursor.entry(), Some((&3, &"c")));
    /// ```
    pub fn cursor(&self, handle: Handle) -> Result<Cursor<K, V>, Error> {
        Ok(Cursor { tree: &self.tree, index: self.tree.locate(handle)? })
    }

    /// Returns a mutable cursor at the position the handle refers to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stale`] if the handle's entry was removed.
    pub fn cursor_mut(&mut self, handle: Handle) -> Result<CursorMut<K, V>, Error> {
        let index = self.tree.locate(handle)?;
        Ok(CursorMut { tree: &mut self.tree, index: index })
    }

    /// Returns a mutable cursor at the map's minimum entry, or at [`end`](#method.end) if the
    /// map is empty.
    pub fn begin_mut(&mut self) -> CursorMut<K, V> {
        let index = self.tree.begin();
        CursorMut { tree: &mut self.tree, index: index }
    }

    /// Returns a mutable cursor at the map's maximum entry, or at [`rend`](#method.rend) if the
    /// map is empty.
    pub fn rbegin_mut(&mut self) -> CursorMut<K, V> {
        let index = self.tree.rbegin();
        CursorMut { tree: &mut self.tree, index: index }
    }

    /// Exchanges the contents of two maps, including their comparators.
    ///
    /// Handles issued by either map keep referring to the same entries, which now belong to
    /// the other map.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut a = ordtree::Map::new();
    /// let mut b = ordtree::Map::new();
    ///
    /// let (handle, _) = a.insert(1, "a");
    /// b.insert(2, "b");
    ///
    /// a.swap(&mut b);
    ///
    /// assert_eq!(a.first(), Some((&2, &"b")));
    /// assert_eq!(b.cursor(handle).unwrap().entry(), Some((&1, &"a")));
    /// ```
    pub fn swap(&mut self, other: &mut Self) { ::std::mem::swap(self, other) }

    /// Returns an iterator over the map's entries with immutable references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// map.insert(3, "c");
    ///
    /// let mut it = map.iter();
    /// assert_eq!(it.next(), Some((&1, &"a")));
    /// assert_eq!(it.next_back(), Some((&3, &"c")));
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<K, V> { Iter(self.tree.iter()) }

    /// Returns an iterator over the map's entries with mutable references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert("b", 2);
    /// map.insert("a", 1);
    /// map.insert("c", 3);
    ///
    /// let mut i = 1;
    ///
    /// for (_, value) in map.iter_mut() {
    ///     assert_eq!(i, *value);
    ///     *value *= 2;
    ///     i += 1;
    /// }
    ///
    /// assert_eq!(map[&"a"], 2);
    /// assert_eq!(map[&"b"], 4);
    /// assert_eq!(map[&"c"], 6);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<K, V> { IterMut(self.tree.iter_mut()) }

    fn walk_range<Min: ?Sized, Max: ?Sized>(&self, min: Bound<&Min>, max: Bound<&Max>) -> Walk
        where C: Compare<Min, K> + Compare<Max, K> {

        let head = match min {
            Unbounded => self.tree.begin(),
            Included(key) => self.tree.lower_bound(&self.cmp, key),
            Excluded(key) => self.tree.upper_bound(&self.cmp, key),
        };

        let tail = match max {
            Unbounded => HIGH,
            Included(key) => self.tree.upper_bound(&self.cmp, key),
            Excluded(key) => self.tree.lower_bound(&self.cmp, key),
        };

        if self.tree.precedes(&self.cmp, head, tail) {
            Walk::new(head, tail)
        } else {
            Walk::new(tail, tail)
        }
    }

    /// Returns an iterator over the map's entries whose keys lie in the given range with immutable
    /// references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator. A
    /// range whose lower bound lies above its upper bound is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::Bound::{Included, Excluded, Unbounded};
    ///
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert("b", 2);
    /// map.insert("a", 1);
    /// map.insert("c", 3);
    ///
    /// assert_eq!(map.range(Unbounded, Unbounded).collect::<Vec<_>>(),
    ///     [(&"a", &1), (&"b", &2), (&"c", &3)]);
    /// assert_eq!(map.range(Excluded(&"a"), Included(&"f")).collect::<Vec<_>>(),
    ///     [(&"b", &2), (&"c", &3)]);
    /// assert_eq!(map.range(Included(&"a"), Excluded(&"b")).collect::<Vec<_>>(),
    ///     [(&"a", &1)]);
    /// assert_eq!(map.range(Included(&"c"), Included(&"a")).next(), None);
    /// ```
    pub fn range<Min: ?Sized, Max: ?Sized>(&self, min: Bound<&Min>, max: Bound<&Max>)
        -> Range<K, V> where C: Compare<Min, K> + Compare<Max, K> {

        let walk = self.walk_range(min, max);
        Range(node::Iter::new(&self.tree.pool, walk, self.tree.len()))
    }

    /// Returns an iterator over the map's entries whose keys lie in the given range with mutable
    /// references to the values.
    ///
    /// The iterator yields the entries in ascending order according to the map's comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::Bound;
    ///
    /// let mut map = ordtree::Map::new();
    ///
    /// map.insert("b", 2);
    /// map.insert("a", 1);
    /// map.insert("c", 3);
    ///
    /// for (_, value) in map.range_mut(Bound::Unbounded, Bound::Excluded(&"c")) {
    ///     *value *= 2;
    /// }
    ///
    /// assert_eq!(map[&"a"], 2);
    /// assert_eq!(map[&"b"], 4);
    /// assert_eq!(map[&"c"], 3);
    /// ```
    pub fn range_mut<Min: ?Sized, Max: ?Sized>(&mut self, min: Bound<&Min>, max: Bound<&Max>)
        -> RangeMut<K, V> where C: Compare<Min, K> + Compare<Max, K> {

        let walk = self.walk_range(min, max);
        let len = self.tree.len();
        RangeMut(node::IterMut::new(&mut self.tree.pool, walk, len))
    }
}

impl<K, V, C> Debug for Map<K, V, C> where K: Debug, V: Debug, C: Compare<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> Default for Map<K, V, C> where C: Compare<K> + Default {
    fn default() -> Self { Map::with_cmp(Default::default()) }
}

impl<K, V, C> Extend<(K, V)> for Map<K, V, C> where C: Compare<K> {
    fn extend<I: IntoIterator<Item=(K, V)>>(&mut self, it: I) {
        for (k, v) in it { self.insert(k, v); }
    }
}

impl<K, V, C> iter::FromIterator<(K, V)> for Map<K, V, C> where C: Compare<K> + Default {
    fn from_iter<I: IntoIterator<Item=(K, V)>>(it: I) -> Self {
        Map::from_iter_with_cmp(it, Default::default())
    }
}

impl<K, V, C> Hash for Map<K, V, C> where K: Hash, V: Hash, C: Compare<K> {
    fn hash<H: hash::Hasher>(&self, h: &mut H) {
        for e in self.iter() { e.hash(h); }
    }
}

impl<'a, K, V, C, Q: ?Sized> ops::Index<&'a Q> for Map<K, V, C>
    where C: Compare<K> + Compare<Q, K> {

    type Output = V;
    fn index(&self, key: &Q) -> &V { self.get(key).expect("key not found") }
}

impl<'a, K, V, C> IntoIterator for &'a Map<K, V, C> where C: Compare<K> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Iter<'a, K, V> { self.iter() }
}

impl<'a, K, V, C> IntoIterator for &'a mut Map<K, V, C> where C: Compare<K> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> IterMut<'a, K, V> { self.iter_mut() }
}

impl<K, V, C> IntoIterator for Map<K, V, C> where C: Compare<K> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> IntoIter<K, V> { IntoIter(self.tree.into_iter()) }
}

impl<K, V, C> PartialEq for Map<K, V, C> where V: PartialEq, C: Compare<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(l, r)| {
            self.cmp.compares_eq(l.0, r.0) && l.1 == r.1
        })
    }
}

impl<K, V, C> Eq for Map<K, V, C> where V: Eq, C: Compare<K> {}

impl<K, V, C> PartialOrd for Map<K, V, C> where V: PartialOrd, C: Compare<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let mut l = self.iter();
        let mut r = other.iter();

        loop {
            match (l.next(), r.next()) {
                (None, None) => return Some(Equal),
                (None, Some(_)) => return Some(Less),
                (Some(_), None) => return Some(Greater),
                (Some(l), Some(r)) => match self.cmp.compare(l.0, r.0) {
                    Equal => match l.1.partial_cmp(r.1) {
                        Some(Equal) => {}
                        non_eq => return non_eq,
                    },
                    non_eq => return Some(non_eq),
                },
            }
        }
    }
}

impl<K, V, C> Ord for Map<K, V, C> where V: Ord, C: Compare<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut l = self.iter();
        let mut r = other.iter();

        loop {
            match (l.next(), r.next()) {
                (None, None) => return Equal,
                (None, Some(_)) => return Less,
                (Some(_), None) => return Greater,
                (Some(l), Some(r)) => match self.cmp.compare(l.0, r.0) {
                    Equal => match l.1.cmp(r.1) {
                        Equal => {}
                        non_eq => return non_eq,
                    },
                    non_eq => return non_eq,
                },
            }
        }
    }
}

/// A bidirectional position in a map.
///
/// A cursor either rests on an entry or on one of the map's two boundaries: the position past
/// the maximum entry ([`Map::end`](struct.Map.html#method.end)) or the position before the
/// minimum entry ([`Map::rend`](struct.Map.html#method.rend)). Cursors compare equal when they
/// rest on the same position of the same map.
///
/// # Examples
///
/// ```
/// let mut map = ordtree::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
///
/// let mut cursor = map.rbegin();
/// assert_eq!(cursor.key(), Some(&2));
/// cursor.move_prev();
/// assert_eq!(cursor.key(), Some(&1));
/// cursor.move_prev();
/// assert!(cursor == map.rend());
/// cursor.move_prev();
/// assert!(cursor.is_rend());
/// cursor.move_next();
/// assert_eq!(cursor.key(), Some(&1));
/// ```
pub struct Cursor<'a, K: 'a, V: 'a> {
    tree: &'a Tree<K, V>,
    index: usize,
}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self { *self }
}

impl<'a, K, V> Copy for Cursor<'a, K, V> {}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Returns the key and value at the cursor, or `None` at a boundary.
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;

        match tree.pool.items[self.index] {
            Item::Entry(ref key, ref value) => Some((key, value)),
            _ => None,
        }
    }

    /// Returns the key at the cursor, or `None` at a boundary.
    pub fn key(&self) -> Option<&'a K> { self.entry().map(|e| e.0) }

    /// Returns the value at the cursor, or `None` at a boundary.
    pub fn value(&self) -> Option<&'a V> { self.entry().map(|e| e.1) }

    /// Checks if the cursor rests past the maximum entry.
    pub fn is_end(&self) -> bool { self.index == HIGH }

    /// Checks if the cursor rests before the minimum entry.
    pub fn is_rend(&self) -> bool { self.index == LOW }

    /// Moves the cursor to the next entry in ascending order.
    pub fn move_next(&mut self) { self.index = self.tree.next(self.index); }

    /// Moves the cursor to the previous entry in ascending order.
    pub fn move_prev(&mut self) { self.index = self.tree.prev(self.index); }

    /// Returns a handle to the cursor's position that outlives the borrow of the map.
    pub fn handle(&self) -> Handle { self.tree.handle(self.index) }
}

impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K, V> Debug for Cursor<'a, K, V> where K: Debug, V: Debug {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.index {
            LOW => f.write_str("Cursor(rend)"),
            HIGH => f.write_str("Cursor(end)"),
            _ => f.debug_tuple("Cursor").field(&self.entry()).finish(),
        }
    }
}

/// A bidirectional position in a map that can mutate values and remove entries.
///
/// Acquire through [`Map::cursor_mut`](struct.Map.html#method.cursor_mut),
/// [`Map::begin_mut`](struct.Map.html#method.begin_mut) or
/// [`Map::rbegin_mut`](struct.Map.html#method.rbegin_mut).
///
/// # Examples
///
/// ```
/// let mut map: ordtree::Map<_, _> = (1..7).map(|i| (i, i)).collect();
///
/// let mut cursor = map.begin_mut();
///
/// while !cursor.is_end() {
///     if cursor.key().map_or(false, |k| k % 2 == 0) {
///         cursor.remove_current();
///     } else {
///         *cursor.value_mut().unwrap() *= 10;
///         cursor.move_next();
///     }
/// }
///
/// assert_eq!(map.iter().collect::<Vec<_>>(), [(&1, &10), (&3, &30), (&5, &50)]);
/// ```
pub struct CursorMut<'a, K: 'a, V: 'a> {
    tree: &'a mut Tree<K, V>,
    index: usize,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    /// Returns the key at the cursor, or `None` at a boundary.
    pub fn key(&self) -> Option<&K> { self.as_cursor().key() }

    /// Returns the key and value at the cursor, or `None` at a boundary.
    pub fn entry(&self) -> Option<(&K, &V)> { self.as_cursor().entry() }

    /// Returns the key and a mutable reference to the value at the cursor, or `None` at a
    /// boundary.
    pub fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self.tree.pool.items[self.index] {
            Item::Entry(ref key, ref mut value) => Some((key, value)),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value at the cursor, or `None` at a boundary.
    pub fn value_mut(&mut self) -> Option<&mut V> { self.entry_mut().map(|e| e.1) }

    /// Checks if the cursor rests past the maximum entry.
    pub fn is_end(&self) -> bool { self.index == HIGH }

    /// Checks if the cursor rests before the minimum entry.
    pub fn is_rend(&self) -> bool { self.index == LOW }

    /// Moves the cursor to the next entry in ascending order.
    pub fn move_next(&mut self) { self.index = self.tree.next(self.index); }

    /// Moves the cursor to the previous entry in ascending order.
    pub fn move_prev(&mut self) { self.index = self.tree.prev(self.index); }

    /// Returns a handle to the cursor's position that outlives the borrow of the map.
    pub fn handle(&self) -> Handle { self.tree.handle(self.index) }

    /// Returns a read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<K, V> { Cursor { tree: &*self.tree, index: self.index } }

    /// Removes the entry at the cursor and moves the cursor to the next entry.
    ///
    /// Returns `None` and leaves the map untouched if the cursor rests on a boundary.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        match self.index {
            LOW | HIGH => None,
            index => {
                self.index = self.tree.next(index);
                Some(self.tree.remove(index))
            }
        }
    }
}

/// An iterator that consumes the map.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through the `IntoIterator` trait:
///
/// ```
/// let mut map = ordtree::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
#[derive(Clone)]
pub struct IntoIter<K, V>(node::IntoIter<K, V>);

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<(K, V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> { self.0.next_back() }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

/// An iterator over the map's entries with immutable references to the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::iter`](struct.Map.html#method.iter) or the `IntoIterator` trait:
///
/// ```
/// let mut map = ordtree::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in &map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
pub struct Iter<'a, K: 'a, V: 'a>(node::Iter<'a, K, V>);

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Iter<'a, K, V> { Iter(self.0.clone()) }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<(&'a K, &'a V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> { self.0.next_back() }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

/// An iterator over the map's entries with mutable references to the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// # Examples
///
/// Acquire through [`Map::iter_mut`](struct.Map.html#method.iter_mut) or the
/// `IntoIterator` trait:
///
/// ```
/// let mut map = ordtree::Map::new();
///
/// map.insert(2, "b");
/// map.insert(1, "a");
/// map.insert(3, "c");
///
/// for (key, value) in &mut map {
///     println!("{:?}: {:?}", key, value);
/// }
/// ```
pub struct IterMut<'a, K: 'a, V: 'a>(node::IterMut<'a, K, V>);

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    fn next(&mut self) -> Option<(&'a K, &'a mut V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> { self.0.next_back() }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

/// An iterator over the map's entries whose keys lie in a given range with immutable references to
/// the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// Acquire through [`Map::range`](struct.Map.html#method.range).
pub struct Range<'a, K: 'a, V: 'a>(node::Iter<'a, K, V>);

impl<'a, K, V> Clone for Range<'a, K, V> {
    fn clone(&self) -> Range<'a, K, V> { Range(self.0.clone()) }
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<(&'a K, &'a V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.range_size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Range<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> { self.0.next_back() }
}

/// An iterator over the map's entries whose keys lie in a given range with mutable references to
/// the values.
///
/// The iterator yields the entries in ascending order according to the map's comparator.
///
/// Acquire through [`Map::range_mut`](struct.Map.html#method.range_mut).
pub struct RangeMut<'a, K: 'a, V: 'a>(node::IterMut<'a, K, V>);

impl<'a, K, V> Iterator for RangeMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    fn next(&mut self) -> Option<(&'a K, &'a mut V)> { self.0.next() }
    fn size_hint(&self) -> (usize, Option<usize>) { self.0.range_size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for RangeMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> { self.0.next_back() }
}

/// An entry in the map.
///
/// See [`Map::entry`](struct.Map.html#method.entry) for an example.
pub enum Entry<'a, K: 'a, V: 'a> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Returns the entry's key.
    pub fn key(&self) -> &K {
        match *self {
            Entry::Occupied(ref e) => e.key(),
            Entry::Vacant(ref e) => e.key(),
        }
    }

    /// Returns the entry's value, inserting the given default if the entry is vacant.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(default),
        }
    }

    /// Returns the entry's value, inserting the given function's result if the entry is vacant.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V where F: FnOnce() -> V {
        match self {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(default()),
        }
    }

    /// Returns the entry's value, inserting the default value if the entry is vacant.
    pub fn or_default(self) -> &'a mut V where V: Default {
        self.or_insert_with(V::default)
    }
}

/// An occupied entry.
///
/// See [`Map::entry`](struct.Map.html#method.entry) for an example.
pub struct OccupiedEntry<'a, K: 'a, V: 'a> {
    tree: &'a mut Tree<K, V>,
    index: usize,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Returns a reference to the entry's key.
    pub fn key(&self) -> &K { self.tree.pool.key(self.index) }

    /// Returns a reference to the entry's value.
    pub fn get(&self) -> &V { self.tree.pool.entry(self.index).1 }

    /// Returns a mutable reference to the entry's value.
    pub fn get_mut(&mut self) -> &mut V { self.tree.pool.entry_mut(self.index).1 }

    /// Returns a mutable reference to the entry's value with the same lifetime as the map.
    pub fn into_mut(self) -> &'a mut V { self.tree.pool.entry_mut(self.index).1 }

    /// Replaces the entry's value with the given value, returning the old one.
    pub fn insert(&mut self, value: V) -> V { ::std::mem::replace(self.get_mut(), value) }

    /// Returns a handle to the entry.
    pub fn handle(&self) -> Handle { self.tree.handle(self.index) }

    /// Removes the entry from the map and returns its key and value.
    pub fn remove(self) -> (K, V) { self.tree.remove(self.index) }
}

/// A vacant entry.
///
/// See [`Map::entry`](struct.Map.html#method.entry) for an example.
pub struct VacantEntry<'a, K: 'a, V: 'a> {
    tree: &'a mut Tree<K, V>,
    place: Place,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Returns a reference to the key that would be inserted.
    pub fn key(&self) -> &K { &self.key }

    /// Returns the key that would have been inserted.
    pub fn into_key(self) -> K { self.key }

    /// Inserts the entry into the map with its key and the given value, returning a mutable
    /// reference to the value with the same lifetime as the map.
    pub fn insert(self, value: V) -> &'a mut V {
        let tree = self.tree;
        let index = tree.attach(self.place, self.key, value);
        tree.pool.entry_mut(index).1
    }
}

mod iter;

#[cfg(test)]
mod test;

use compare::Compare;
use std::cmp::Ordering::*;
use std::collections::TryReserveError;
use std::mem;
use super::Error;

pub use self::iter::{IntoIter, Iter, IterMut, Walk};

/// Slot of the sentinel threaded below the minimum entry.
pub const LOW: usize = 0;
/// Slot of the sentinel threaded below the maximum entry.
pub const HIGH: usize = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Links {
    pub parent: Option<usize>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

#[derive(Clone)]
pub enum Item<K, V> {
    Low,
    High,
    Entry(K, V),
    Vacant(Option<usize>),
}

impl<K, V> Item<K, V> {
    pub fn is_entry(&self) -> bool {
        match *self { Item::Entry(..) => true, _ => false }
    }

    pub fn entry(&self) -> (&K, &V) {
        match *self {
            Item::Entry(ref key, ref value) => (key, value),
            _ => panic!("slot holds no entry"),
        }
    }

    pub fn entry_mut(&mut self) -> (&K, &mut V) {
        match *self {
            Item::Entry(ref key, ref mut value) => (key, value),
            _ => panic!("slot holds no entry"),
        }
    }

    fn take(&mut self, next_free: Option<usize>) -> (K, V) {
        match mem::replace(self, Item::Vacant(next_free)) {
            Item::Entry(key, value) => (key, value),
            _ => panic!("slot holds no entry"),
        }
    }
}

/// A position in a map that outlives borrows of it.
///
/// A handle stays valid until the entry it refers to is removed; handles to the map's boundaries
/// (see [`Map::end`](struct.Map.html#method.end)) are valid for the map's whole life. Using a
/// handle with a map other than the one that issued it (or the one it was swapped into) is a
/// logic error that is not always detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index: usize,
    gen: u32,
}

/// The node arena. Links, entries and generations live in parallel vectors so that traversal
/// only ever touches `links`.
#[derive(Clone)]
pub struct Pool<K, V> {
    pub links: Vec<Links>,
    pub items: Vec<Item<K, V>>,
    gens: Vec<u32>,
    free: Option<usize>,
}

impl<K, V> Pool<K, V> {
    fn with_capacity(capacity: usize) -> Self {
        let mut links = Vec::with_capacity(capacity + 2);
        let mut items = Vec::with_capacity(capacity + 2);
        links.extend([Links::default(), Links::default()]);
        items.extend([Item::Low, Item::High]);
        Pool { links: links, items: items, gens: vec![0, 0], free: None }
    }

    fn alloc(&mut self, key: K, value: V) -> usize {
        let item = Item::Entry(key, value);

        match self.free {
            Some(index) => {
                self.free = match mem::replace(&mut self.items[index], item) {
                    Item::Vacant(next) => next,
                    _ => unreachable!("free list points at an occupied slot"),
                };
                index
            }
            None => {
                if self.items.len() == self.items.capacity() {
                    tracing::trace!(capacity = self.items.capacity(), "growing node pool");
                }

                self.links.push(Links::default());
                self.items.push(item);
                self.gens.push(0);
                self.items.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) -> (K, V) {
        self.links[index] = Links::default();
        self.gens[index] = self.gens[index].wrapping_add(1);
        let key_value = self.items[index].take(self.free);
        self.free = Some(index);
        key_value
    }

    pub fn key(&self, index: usize) -> &K { self.items[index].entry().0 }

    pub fn entry(&self, index: usize) -> (&K, &V) { self.items[index].entry() }

    pub fn entry_mut(&mut self, index: usize) -> (&K, &mut V) { self.items[index].entry_mut() }

    fn capacity(&self) -> usize { self.items.capacity() - 2 }

    fn reserve(&mut self, additional: usize) {
        self.links.reserve(additional);
        self.items.reserve(additional);
        self.gens.reserve(additional);
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.links.try_reserve(additional)?;
        self.items.try_reserve(additional)?;
        self.gens.try_reserve(additional)
    }

    fn unlink_sentinels(&mut self) {
        self.links[LOW] = Links::default();
        self.links[HIGH] = Links::default();
    }
}

/// A direction of travel through the tree.
pub trait Dir: Sized {
    type Opposite: Dir<Opposite = Self>;

    /// The sentinel reached by walking off the tree in this direction.
    const SENTINEL: usize;

    fn forward(links: &Links) -> Option<usize>;
    fn forward_mut(links: &mut Links) -> &mut Option<usize>;
}

pub enum Left {}

impl Dir for Left {
    type Opposite = Right;

    const SENTINEL: usize = LOW;

    fn forward(links: &Links) -> Option<usize> { links.left }
    fn forward_mut(links: &mut Links) -> &mut Option<usize> { &mut links.left }
}

pub enum Right {}

impl Dir for Right {
    type Opposite = Left;

    const SENTINEL: usize = HIGH;

    fn forward(links: &Links) -> Option<usize> { links.right }
    fn forward_mut(links: &mut Links) -> &mut Option<usize> { &mut links.right }
}

/// Follows `D` links from `index` as far as they go.
pub fn extremum<D: Dir>(links: &[Links], mut index: usize) -> usize {
    while let Some(child) = D::forward(&links[index]) { index = child; }
    index
}

/// Moves one position in `D`'s direction of the in-order sequence.
///
/// `D::SENTINEL` is absorbing. Stepping off the opposite sentinel lands on the nearest entry, or
/// on `D::SENTINEL` if the tree is empty.
pub fn step<D: Dir>(links: &[Links], index: usize) -> usize {
    if index == D::SENTINEL { return index; }

    if index == <D::Opposite as Dir>::SENTINEL {
        return links[index].parent.unwrap_or(D::SENTINEL);
    }

    if let Some(child) = D::forward(&links[index]) {
        return extremum::<D::Opposite>(links, child);
    }

    let mut index = index;

    while let Some(parent) = links[index].parent {
        if <D::Opposite as Dir>::forward(&links[parent]) == Some(index) { return parent; }
        index = parent;
    }

    D::SENTINEL
}

/// Where a key absent from the tree would be attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Place {
    Root,
    Left(usize),
    Right(usize),
}

/// The tree engine: a node pool, the root, and the entry count.
#[derive(Clone)]
pub struct Tree<K, V> {
    pub pool: Pool<K, V>,
    root: Option<usize>,
    len: usize,
}

impl<K, V> Tree<K, V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Tree { pool: Pool::with_capacity(capacity), root: None, len: 0 }
    }

    pub fn len(&self) -> usize { self.len }

    pub fn root(&self) -> Option<usize> { self.root }

    pub fn capacity(&self) -> usize { self.pool.capacity() }

    pub fn reserve(&mut self, additional: usize) { self.pool.reserve(additional) }

    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        Ok(self.pool.try_reserve(additional)?)
    }

    pub fn max_size(&self) -> usize {
        let per_node = mem::size_of::<Links>() + mem::size_of::<Item<K, V>>() +
            mem::size_of::<u32>();
        (isize::MAX as usize / per_node).saturating_sub(2)
    }

    /// The minimum entry, found through the low sentinel.
    pub fn first(&self) -> Option<usize> { self.pool.links[LOW].parent }

    /// The maximum entry, found through the high sentinel.
    pub fn last(&self) -> Option<usize> { self.pool.links[HIGH].parent }

    pub fn begin(&self) -> usize { self.first().unwrap_or(HIGH) }

    pub fn rbegin(&self) -> usize { self.last().unwrap_or(LOW) }

    pub fn next(&self, index: usize) -> usize { step::<Right>(&self.pool.links, index) }

    pub fn prev(&self, index: usize) -> usize { step::<Left>(&self.pool.links, index) }

    pub fn handle(&self, index: usize) -> Handle {
        Handle { index: index, gen: self.pool.gens[index] }
    }

    /// Resolves a handle to a live slot, which may be a sentinel.
    pub fn locate(&self, handle: Handle) -> Result<usize, Error> {
        match self.pool.gens.get(handle.index) {
            Some(&gen) if gen == handle.gen => match self.pool.items[handle.index] {
                Item::Vacant(_) => Err(Error::Stale),
                _ => Ok(handle.index),
            },
            _ => Err(Error::Stale),
        }
    }

    /// Resolves a handle to a live entry.
    pub fn locate_entry(&self, handle: Handle) -> Result<usize, Error> {
        match self.locate(handle)? {
            LOW | HIGH => Err(Error::Boundary),
            index => Ok(index),
        }
    }

    /// Checks whether position `a` comes no later than position `b` in the in-order sequence.
    ///
    /// Neither position may be the low sentinel.
    pub fn precedes<C>(&self, cmp: &C, a: usize, b: usize) -> bool where C: Compare<K> {
        match (a, b) {
            (_, HIGH) => true,
            (HIGH, _) => false,
            _ => cmp.compares_le(self.pool.key(a), self.pool.key(b)),
        }
    }

    pub fn search<C, Q: ?Sized>(&self, cmp: &C, key: &Q) -> Result<usize, Place>
        where C: Compare<Q, K> {

        let mut index = match self.root {
            None => return Err(Place::Root),
            Some(root) => root,
        };

        loop {
            let links = &self.pool.links[index];

            match cmp.compare(key, self.pool.key(index)) {
                Equal => return Ok(index),
                Less => match links.left {
                    Some(left) if left != LOW => index = left,
                    _ => return Err(Place::Left(index)),
                },
                Greater => match links.right {
                    Some(right) if right != HIGH => index = right,
                    _ => return Err(Place::Right(index)),
                },
            }
        }
    }

    /// Returns the first entry whose key is not less than `key`, or `HIGH`.
    pub fn lower_bound<C, Q: ?Sized>(&self, cmp: &C, key: &Q) -> usize
        where C: Compare<Q, K> {

        self.bound(|node_key| cmp.compares_le(key, node_key))
    }

    /// Returns the first entry whose key is greater than `key`, or `HIGH`.
    pub fn upper_bound<C, Q: ?Sized>(&self, cmp: &C, key: &Q) -> usize
        where C: Compare<Q, K> {

        self.bound(|node_key| cmp.compares_lt(key, node_key))
    }

    // `go_left` must be monotone over the in-order sequence.
    fn bound<F>(&self, go_left: F) -> usize where F: Fn(&K) -> bool {
        let mut bound = HIGH;
        let mut link = self.root;

        while let Some(index) = link {
            if !self.pool.items[index].is_entry() { break; }
            let links = &self.pool.links[index];

            link = if go_left(self.pool.key(index)) {
                bound = index;
                links.left
            } else {
                links.right
            };
        }

        bound
    }

    /// Allocates a node for the entry and links it at `place`.
    pub fn attach(&mut self, place: Place, key: K, value: V) -> usize {
        let index = self.pool.alloc(key, value);

        match place {
            Place::Root => {
                self.root = Some(index);
                self.set_child::<Left>(index, Some(LOW));
                self.set_child::<Right>(index, Some(HIGH));
                tracing::trace!(index, "attached root");
            }
            Place::Left(parent) => self.attach_below::<Left>(parent, index),
            Place::Right(parent) => self.attach_below::<Right>(parent, index),
        }

        self.len += 1;
        index
    }

    fn attach_below<D: Dir>(&mut self, parent: usize, index: usize) {
        let displaced = D::forward(&self.pool.links[parent]);
        self.set_child::<D>(parent, Some(index));

        if displaced == Some(D::SENTINEL) {
            self.set_child::<D>(index, Some(D::SENTINEL));
            tracing::trace!(index, parent, sentinel = D::SENTINEL, "attached new extremum");
        } else {
            tracing::trace!(index, parent, "attached leaf");
        }
    }

    fn set_child<D: Dir>(&mut self, parent: usize, child: Option<usize>) {
        *D::forward_mut(&mut self.pool.links[parent]) = child;
        if let Some(child) = child { self.pool.links[child].parent = Some(parent); }
    }

    fn replace_child(&mut self, parent: Option<usize>, old: usize, new: Option<usize>) {
        match parent {
            None => {
                self.root = new;
                if let Some(new) = new { self.pool.links[new].parent = None; }
            }
            Some(parent) =>
                if self.pool.links[parent].left == Some(old) {
                    self.set_child::<Left>(parent, new);
                } else {
                    self.set_child::<Right>(parent, new);
                },
        }
    }

    /// Unlinks the entry at `target`, frees its slot and returns its key and value.
    pub fn remove(&mut self, target: usize) -> (K, V) {
        let Links { parent, left, right } = self.pool.links[target];

        let replacement = match (left, right) {
            (None, None) => {
                tracing::trace!(target, "removing leaf");
                None
            }
            (Some(child), None) | (None, Some(child)) => {
                tracing::trace!(target, child, "removing node with one child");
                Some(child)
            }
            (Some(LOW), Some(HIGH)) => {
                tracing::trace!(target, "removing sole entry");
                self.pool.unlink_sentinels();
                None
            }
            (Some(left), Some(HIGH)) => {
                let max = extremum::<Right>(&self.pool.links, left);
                self.set_child::<Right>(max, Some(HIGH));
                tracing::trace!(target, max, "removing maximum, rethreaded high sentinel");
                Some(left)
            }
            (Some(left), Some(right)) => {
                let succ = extremum::<Left>(&self.pool.links, right);

                if succ != right {
                    let succ_parent = self.pool.links[succ].parent;
                    let succ_right = self.pool.links[succ].right;
                    if let Some(succ_parent) = succ_parent {
                        self.set_child::<Left>(succ_parent, succ_right);
                    }
                    self.set_child::<Right>(succ, Some(right));
                }

                self.set_child::<Left>(succ, Some(left));
                tracing::trace!(target, succ, "removing node with two children");
                Some(succ)
            }
        };

        self.replace_child(parent, target, replacement);
        self.len -= 1;
        self.pool.release(target)
    }

    pub fn clear(&mut self) {
        let mut stack: Vec<usize> = self.root.take().into_iter().collect();

        while let Some(index) = stack.pop() {
            let links = self.pool.links[index];

            for child in links.left.into_iter().chain(links.right) {
                if self.pool.items[child].is_entry() { stack.push(child); }
            }

            self.pool.release(index);
        }

        self.pool.unlink_sentinels();
        tracing::trace!(len = self.len, "cleared");
        self.len = 0;
    }

    pub fn walk(&self) -> Walk { Walk::new(self.begin(), HIGH) }

    pub fn iter(&self) -> Iter<K, V> { Iter::new(&self.pool, self.walk(), self.len) }

    pub fn iter_mut(&mut self) -> IterMut<K, V> {
        let walk = self.walk();
        let len = self.len;
        IterMut::new(&mut self.pool, walk, len)
    }

    pub fn into_iter(self) -> IntoIter<K, V> {
        let walk = self.walk();
        IntoIter::new(self.pool, walk, self.len)
    }
}

use std::marker::PhantomData;
use super::{Item, Left, Links, Pool, Right, step};

/// A half-open in-order interval `[head, tail)` of tree positions.
#[derive(Clone, Copy, Debug)]
pub struct Walk {
    head: usize,
    tail: usize,
}

impl Walk {
    /// `head` must not come after `tail` in the in-order sequence.
    pub fn new(head: usize, tail: usize) -> Walk { Walk { head: head, tail: tail } }

    pub fn next(&mut self, links: &[Links]) -> Option<usize> {
        if self.head == self.tail { return None; }
        let index = self.head;
        self.head = step::<Right>(links, index);
        Some(index)
    }

    pub fn next_back(&mut self, links: &[Links]) -> Option<usize> {
        if self.head == self.tail { return None; }
        self.tail = step::<Left>(links, self.tail);
        Some(self.tail)
    }
}

pub struct Iter<'a, K: 'a, V: 'a> {
    links: &'a [Links],
    items: &'a [Item<K, V>],
    walk: Walk,
    size: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter { links: self.links, items: self.items, walk: self.walk, size: self.size }
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    /// `size` is the exact number of entries in `walk`, or an upper bound for ranges.
    pub fn new(pool: &'a Pool<K, V>, walk: Walk, size: usize) -> Self {
        Iter { links: &pool.links, items: &pool.items, walk: walk, size: size }
    }

    pub fn range_size_hint(&self) -> (usize, Option<usize>) { (0, Some(self.size)) }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let index = self.walk.next(self.links)?;
        self.size = self.size.saturating_sub(1);
        Some(self.items[index].entry())
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.size, Some(self.size)) }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        let index = self.walk.next_back(self.links)?;
        self.size = self.size.saturating_sub(1);
        Some(self.items[index].entry())
    }
}

pub struct IterMut<'a, K: 'a, V: 'a> {
    links: &'a [Links],
    items: *mut Item<K, V>,
    walk: Walk,
    size: usize,
    _mut: PhantomData<&'a mut Item<K, V>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub fn new(pool: &'a mut Pool<K, V>, walk: Walk, size: usize) -> Self {
        let Pool { ref links, ref mut items, .. } = *pool;
        IterMut { links: links, items: items.as_mut_ptr(), walk: walk, size: size, _mut: PhantomData }
    }

    pub fn range_size_hint(&self) -> (usize, Option<usize>) { (0, Some(self.size)) }

    fn entry(&mut self, index: usize) -> (&'a K, &'a mut V) {
        // A walk yields each slot at most once, so the returned borrows never alias. Traversal
        // reads only `links`, which lives in a separate allocation.
        let item = unsafe { &mut *self.items.add(index) };
        item.entry_mut()
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<(&'a K, &'a mut V)> {
        let index = self.walk.next(self.links)?;
        self.size = self.size.saturating_sub(1);
        Some(self.entry(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.size, Some(self.size)) }
}

impl<'a, K, V> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a mut V)> {
        let index = self.walk.next_back(self.links)?;
        self.size = self.size.saturating_sub(1);
        Some(self.entry(index))
    }
}

unsafe impl<'a, K, V> Send for IterMut<'a, K, V> where K: Sync, V: Send {}
unsafe impl<'a, K, V> Sync for IterMut<'a, K, V> where K: Sync, V: Sync {}

#[derive(Clone)]
pub struct IntoIter<K, V> {
    pool: Pool<K, V>,
    walk: Walk,
    size: usize,
}

impl<K, V> IntoIter<K, V> {
    pub fn new(pool: Pool<K, V>, walk: Walk, size: usize) -> Self {
        IntoIter { pool: pool, walk: walk, size: size }
    }

    // Taking an entry leaves its links in place, so the walk can still step past it.
    fn take(&mut self, index: usize) -> (K, V) {
        self.size -= 1;
        self.pool.items[index].take(None)
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let index = self.walk.next(&self.pool.links)?;
        Some(self.take(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.size, Some(self.size)) }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        let index = self.walk.next_back(&self.pool.links)?;
        Some(self.take(index))
    }
}

use compare::natural;
use quickcheck::{Arbitrary, Gen, TestResult, quickcheck};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt::Debug;
use super::{HIGH, Links, LOW, Tree};
use crate::Error;

/// An operation on a `Tree`.
#[derive(Clone, Debug)]
enum Op<K> where K: Clone + Ord {
    /// Insert a key into the tree if it is absent.
    Insert(K),
    /// Remove the entry at position `n % tree.len()` from the tree.
    Remove(usize),
}

impl<K> Arbitrary for Op<K> where K: Arbitrary + Ord {
    fn arbitrary(gen: &mut Gen) -> Op<K> {
        if bool::arbitrary(gen) {
            Op::Insert(Arbitrary::arbitrary(gen))
        } else {
            Op::Remove(Arbitrary::arbitrary(gen))
        }
    }
}

impl<K> Op<K> where K: Clone + Ord {
    /// Perform the operation on the given tree.
    fn exec(self, tree: &mut Tree<K, ()>) {
        match self {
            Op::Insert(key) => insert(tree, key),
            Op::Remove(n) => if tree.len() > 0 {
                let target = positions(tree)[n % tree.len()];
                tree.remove(target);
            },
        }
    }
}

fn insert<K: Ord>(tree: &mut Tree<K, ()>, key: K) {
    if let Err(place) = tree.search(&natural::<K>(), &key) { tree.attach(place, key, ()); }
}

fn remove<K: Ord>(tree: &mut Tree<K, ()>, key: &K) -> bool {
    match tree.search(&natural::<K>(), key) {
        Ok(index) => { tree.remove(index); true }
        Err(_) => false,
    }
}

/// The entry slots in ascending order, found by stepping through the threaded sequence.
fn positions<K, V>(tree: &Tree<K, V>) -> Vec<usize> {
    let mut walk = tree.walk();
    let mut out = vec![];
    while let Some(index) = walk.next(&tree.pool.links) { out.push(index); }
    out
}

fn keys<K: Clone, V>(tree: &Tree<K, V>) -> Vec<K> {
    tree.iter().map(|e| e.0.clone()).collect()
}

fn in_order<K, V>(tree: &Tree<K, V>, index: usize, out: &mut Vec<usize>) {
    let links = tree.pool.links[index];

    for &child in links.left.iter().chain(links.right.iter()) {
        assert_eq!(tree.pool.links[child].parent, Some(index),
                   "child {} of {} has a stale parent link", child, index);
    }

    if let Some(left) = links.left { in_order(tree, left, out); }
    out.push(index);
    if let Some(right) = links.right { in_order(tree, right, out); }
}

fn assert_threaded_tree<K, V>(tree: &Tree<K, V>) where K: Ord + Debug {
    let links = &tree.pool.links;
    assert_eq!((links[LOW].left, links[LOW].right), (None, None));
    assert_eq!((links[HIGH].left, links[HIGH].right), (None, None));

    let root = match tree.root() {
        None => {
            assert_eq!(tree.len(), 0);
            assert_eq!(links[LOW], Links::default());
            assert_eq!(links[HIGH], Links::default());
            assert_eq!(tree.begin(), HIGH);
            assert_eq!(tree.rbegin(), LOW);
            return;
        }
        Some(root) => root,
    };

    assert_eq!(links[root].parent, None);

    let mut order = vec![];
    in_order(tree, root, &mut order);

    assert_eq!(order.first(), Some(&LOW));
    assert_eq!(order.last(), Some(&HIGH));

    let entries = &order[1..order.len() - 1];
    assert_eq!(entries.len(), tree.len());
    assert!(entries.iter().all(|&index| tree.pool.items[index].is_entry()));
    assert!(entries.windows(2).all(|w| tree.pool.key(w[0]) < tree.pool.key(w[1])),
            "keys out of order: {:?}", entries.iter().map(|&i| tree.pool.key(i)).collect::<Vec<_>>());

    assert_eq!(links[LOW].parent, entries.first().cloned());
    assert_eq!(links[HIGH].parent, entries.last().cloned());
    assert_eq!(positions(tree), entries);

    let mut back = vec![];
    let mut index = tree.rbegin();
    while index != LOW { back.push(index); index = tree.prev(index); }
    back.reverse();
    assert_eq!(back, entries);
}

#[test]
fn test_threaded() {
    fn check(ops: Vec<Op<u32>>) -> TestResult {
        let mut tree = Tree::with_capacity(0);
        for op in ops { op.exec(&mut tree); }
        assert_threaded_tree(&tree);
        TestResult::passed()
    }

    quickcheck(check as fn(_) -> _);
}

#[test]
fn test_threaded_after_each_op() {
    fn check(ops: Vec<Op<u8>>) -> TestResult {
        let mut tree = Tree::with_capacity(0);

        for op in ops {
            op.exec(&mut tree);
            assert_threaded_tree(&tree);
        }

        TestResult::passed()
    }

    quickcheck(check as fn(_) -> _);
}

#[test]
fn test_remove_shuffled() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..32 {
        let mut keys: Vec<u32> = (0..64).collect();
        keys.shuffle(&mut rng);

        let mut tree = Tree::with_capacity(keys.len());
        for &key in &keys { insert(&mut tree, key); }
        assert_threaded_tree(&tree);

        keys.shuffle(&mut rng);

        for (i, key) in keys.iter().enumerate() {
            assert!(remove(&mut tree, key));
            assert_eq!(tree.len(), keys.len() - i - 1);
            assert_threaded_tree(&tree);
        }
    }
}

#[test]
fn test_remove_cases() {
    //          50
    //      30      70
    //    20  40  60  80
    //       35 45  65
    let shape = [50, 30, 70, 20, 40, 60, 80, 35, 45, 65];

    // Leaf, minimum, maximum, one child, successor is the right child, successor lies deeper.
    for key in [35, 20, 80, 60, 40, 30, 50] {
        let mut tree = Tree::with_capacity(0);
        for &k in &shape { insert(&mut tree, k); }

        let mut expected: Vec<_> = shape.iter().cloned().filter(|&k| k != key).collect();
        expected.sort();

        assert!(remove(&mut tree, &key));
        assert_threaded_tree(&tree);
        assert_eq!(keys(&tree), expected);
    }
}

#[test]
fn test_remove_maximum_with_left_subtree() {
    let mut tree = Tree::with_capacity(0);
    for key in [10, 30, 20, 25] { insert(&mut tree, key); }

    assert!(remove(&mut tree, &30));
    assert_threaded_tree(&tree);
    assert_eq!(tree.pool.key(tree.rbegin()), &25);
}

#[test]
fn test_remove_sole_entry() {
    let mut tree = Tree::with_capacity(0);
    insert(&mut tree, 1);

    assert!(remove(&mut tree, &1));
    assert_threaded_tree(&tree);
    assert_eq!(tree.begin(), HIGH);
}

#[test]
fn test_sorted_inserts_degenerate() {
    let mut tree = Tree::with_capacity(0);
    for key in 0..100u32 { insert(&mut tree, key); }
    assert_threaded_tree(&tree);

    let mut depth = 0;
    let mut link = tree.root();
    while let Some(index) = link {
        if !tree.pool.items[index].is_entry() { break; }
        depth += 1;
        link = tree.pool.links[index].right;
    }
    assert_eq!(depth, 100);

    for key in (0..100u32).rev() {
        assert!(remove(&mut tree, &key));
        assert_threaded_tree(&tree);
    }
}

#[test]
fn test_bounds() {
    let mut tree = Tree::with_capacity(0);
    for key in [10, 20, 30] { insert(&mut tree, key); }
    let cmp = natural::<i32>();

    assert_eq!(tree.pool.key(tree.lower_bound(&cmp, &20)), &20);
    assert_eq!(tree.pool.key(tree.upper_bound(&cmp, &20)), &30);
    assert_eq!(tree.pool.key(tree.lower_bound(&cmp, &5)), &10);
    assert_eq!(tree.lower_bound(&cmp, &31), HIGH);
    assert_eq!(tree.upper_bound(&cmp, &30), HIGH);
}

#[test]
fn test_step_absorbs_at_sentinels() {
    let mut tree = Tree::with_capacity(0);
    assert_eq!(tree.next(HIGH), HIGH);
    assert_eq!(tree.prev(LOW), LOW);
    assert_eq!(tree.next(LOW), HIGH);
    assert_eq!(tree.prev(HIGH), LOW);

    for key in [2, 1, 3] { insert(&mut tree, key); }

    assert_eq!(tree.next(HIGH), HIGH);
    assert_eq!(tree.prev(LOW), LOW);
    assert_eq!(tree.pool.key(tree.next(LOW)), &1);
    assert_eq!(tree.pool.key(tree.prev(HIGH)), &3);
}

#[test]
fn test_handles_detect_reuse() {
    let mut tree = Tree::with_capacity(0);
    insert(&mut tree, 1);
    let index = positions(&tree)[0];
    let handle = tree.handle(index);

    assert_eq!(tree.locate_entry(handle), Ok(index));
    assert!(remove(&mut tree, &1));
    assert_eq!(tree.locate(handle), Err(Error::Stale));

    insert(&mut tree, 2);
    assert_eq!(positions(&tree), [index]);
    assert_eq!(tree.locate(handle), Err(Error::Stale));

    assert_eq!(tree.locate_entry(tree.handle(LOW)), Err(Error::Boundary));
    assert_eq!(tree.locate_entry(tree.handle(HIGH)), Err(Error::Boundary));
}

#[test]
fn test_clear() {
    let mut tree = Tree::with_capacity(0);
    for key in 0..10 { insert(&mut tree, key); }
    let handles: Vec<_> = positions(&tree).into_iter().map(|i| tree.handle(i)).collect();

    tree.clear();
    assert_threaded_tree(&tree);
    assert!(handles.iter().all(|&h| tree.locate(h) == Err(Error::Stale)));
    assert_eq!(tree.locate(tree.handle(HIGH)), Ok(HIGH));

    for key in 0..10 { insert(&mut tree, key); }
    assert_threaded_tree(&tree);
}

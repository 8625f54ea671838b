use std::iter::FusedIterator;

use crate::rbt::{Rbt, Ref, Side};

/// Iterator type, in-order walk over keys, from both ends.
///
/// Walk follows parent back-links, there is no auxiliary stack.
pub struct Iter<'a, K> {
    tree: &'a Rbt<K>,
    front: Ref,
    back: Ref,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(crate) fn new(tree: &'a Rbt<K>) -> Iter<'a, K> {
        let root = tree.to_root();
        Iter {
            tree,
            front: tree.extreme(root, Side::Left),
            back: tree.extreme(root, Side::Right),
            remaining: tree.len(),
        }
    }
}

impl<'a, K> Clone for Iter<'a, K> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.tree.as_arena().get(self.front)?;
        self.front = self.tree.successor(self.front);
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K> DoubleEndedIterator for Iter<'a, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.tree.as_arena().get(self.back)?;
        self.back = self.tree.predecessor(self.back);
        self.remaining -= 1;
        Some(&node.key)
    }
}

impl<'a, K> ExactSizeIterator for Iter<'a, K> {}

impl<'a, K> FusedIterator for Iter<'a, K> {}

#[cfg(test)]
#[path = "iter_test.rs"]
mod iter_test;

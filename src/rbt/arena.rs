use std::{
    fmt,
    mem,
    ops::{Index, IndexMut},
};

use crate::rbt::{Color, Node, Side};

/// Handle to a node slot in the [Arena]. Slot zero is reserved for the
/// sentinel, refer to [NIL].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ref(usize);

/// Sentinel handle, stands for every absent child and for the parent of
/// the root. Sentinel is always black and never written to.
pub const NIL: Ref = Ref(0);

impl Ref {
    #[inline]
    pub fn is_nil(self) -> bool {
        self == NIL
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            0 => write!(f, "NIL"),
            n => write!(f, "#{}", n),
        }
    }
}

enum Slot<K> {
    Sentinel,
    Vacant(Ref), // next free slot, NIL terminates the list.
    Occupied(Node<K>),
}

/// Contiguous storage for tree nodes. Parent and child links are handles
/// into this storage, vacated slots are recycled through a free list.
pub struct Arena<K> {
    slots: Vec<Slot<K>>,
    free: Ref,
    n_free: usize,
}

impl<K> Default for Arena<K> {
    fn default() -> Arena<K> {
        Arena::new()
    }
}

impl<K> Arena<K> {
    pub fn new() -> Arena<K> {
        Arena {
            slots: vec![Slot::Sentinel],
            free: NIL,
            n_free: 0,
        }
    }

    /// Move `node` into the arena, return its handle.
    pub fn alloc(&mut self, node: Node<K>) -> Ref {
        match self.free {
            NIL => {
                self.slots.push(Slot::Occupied(node));
                Ref(self.slots.len() - 1)
            }
            r => {
                let slot = mem::replace(&mut self.slots[r.0], Slot::Occupied(node));
                self.free = match slot {
                    Slot::Vacant(next) => next,
                    _ => panic!("alloc(): free list at occupied {:?}", r),
                };
                self.n_free -= 1;
                r
            }
        }
    }

    /// Move the node at `r` out of the arena, slot is recycled.
    pub fn free(&mut self, r: Ref) -> Node<K> {
        if r.is_nil() {
            panic!("free(): sentinel can't be freed, call the programmer")
        }
        match mem::replace(&mut self.slots[r.0], Slot::Vacant(self.free)) {
            Slot::Occupied(node) => {
                self.free = r;
                self.n_free += 1;
                node
            }
            _ => panic!("free(): slot {:?} is not occupied", r),
        }
    }

    /// Drop all nodes, arena falls back to sentinel only.
    pub fn clear(&mut self) {
        self.slots.truncate(1);
        self.free = NIL;
        self.n_free = 0;
    }

    /// Return the node at `r`, None for sentinel and vacant slots.
    pub fn get(&self, r: Ref) -> Option<&Node<K>> {
        match self.slots.get(r.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Swap keys between two occupied slots.
    pub fn swap_keys(&mut self, a: Ref, b: Ref) {
        if a == b {
            return;
        }
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.slots.split_at_mut(hi);
        match (&mut head[lo], &mut tail[0]) {
            (Slot::Occupied(x), Slot::Occupied(y)) => mem::swap(&mut x.key, &mut y.key),
            _ => panic!("swap_keys(): {:?} {:?} not occupied", a, b),
        }
    }

    #[inline]
    pub fn color(&self, r: Ref) -> Color {
        self.get(r).map_or(Color::Black, |node| node.color)
    }

    #[inline]
    pub fn is_red(&self, r: Ref) -> bool {
        self.color(r) == Color::Red
    }

    #[inline]
    pub fn parent(&self, r: Ref) -> Ref {
        self.get(r).map_or(NIL, |node| node.parent)
    }

    #[inline]
    pub fn child(&self, r: Ref, side: Side) -> Ref {
        self.get(r).map_or(NIL, |node| node.child(side))
    }

    /// Return which side of its parent `r` hangs from. `r` must not be
    /// the root.
    #[inline]
    pub fn side_of(&self, r: Ref) -> Side {
        if self.child(self.parent(r), Side::Left) == r {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Number of slots holding a node.
    pub fn len(&self) -> usize {
        self.slots.len() - 1 - self.n_free
    }

    /// Number of vacant slots waiting on the free list.
    pub fn to_free(&self) -> usize {
        self.n_free
    }

    /// Number of slots, occupied and vacant, excluding the sentinel.
    pub fn to_capacity(&self) -> usize {
        self.slots.len() - 1
    }
}

impl<K> Index<Ref> for Arena<K> {
    type Output = Node<K>;

    fn index(&self, r: Ref) -> &Node<K> {
        match &self.slots[r.0] {
            Slot::Occupied(node) => node,
            Slot::Sentinel => panic!("sentinel has no node, call the programmer"),
            Slot::Vacant(_) => panic!("slot {:?} is vacant", r),
        }
    }
}

impl<K> IndexMut<Ref> for Arena<K> {
    fn index_mut(&mut self, r: Ref) -> &mut Node<K> {
        match &mut self.slots[r.0] {
            Slot::Occupied(node) => node,
            Slot::Sentinel => panic!("sentinel is read-only, call the programmer"),
            Slot::Vacant(_) => panic!("slot {:?} is vacant", r),
        }
    }
}

#[cfg(test)]
#[path = "arena_test.rs"]
mod arena_test;

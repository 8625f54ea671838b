use std::{fmt, ptr};

use crate::rbt::{Arena, Ref, NIL};

/// Node color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Child position, mirror cases in the fixup procedures are handled by
/// flipping the side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    #[inline]
    pub fn flip(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// Node corresponds to a single key in Rbt instance.
pub struct Node<K> {
    pub key: K,
    pub color: Color,
    pub parent: Ref,        // back-link, never owns
    pub children: [Ref; 2], // store: left, right
}

impl<K> Node<K> {
    /// New nodes are red leaves.
    pub fn new(key: K, parent: Ref) -> Node<K> {
        Node {
            key,
            color: Color::Red,
            parent,
            children: [NIL, NIL],
        }
    }

    #[inline]
    pub fn child(&self, side: Side) -> Ref {
        self.children[side as usize]
    }

    #[inline]
    pub fn set_child(&mut self, side: Side, child: Ref) {
        self.children[side as usize] = child
    }

    #[inline]
    pub fn set_red(&mut self) {
        self.color = Color::Red
    }

    #[inline]
    pub fn set_black(&mut self) {
        self.color = Color::Black
    }

    #[inline]
    pub fn is_black(&self) -> bool {
        self.color == Color::Black
    }
}

/// Read-only handle to a node, returned by [Rbt::search].
///
/// [Rbt::search]: crate::rbt::Rbt::search
pub struct NodeRef<'a, K> {
    arena: &'a Arena<K>,
    at: Ref,
}

impl<'a, K> Clone for NodeRef<'a, K> {
    fn clone(&self) -> Self {
        NodeRef {
            arena: self.arena,
            at: self.at,
        }
    }
}

impl<'a, K> Copy for NodeRef<'a, K> {}

impl<'a, K> PartialEq for NodeRef<'a, K> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.arena, other.arena) && self.at == other.at
    }
}

impl<'a, K> NodeRef<'a, K> {
    pub(crate) fn new(arena: &'a Arena<K>, at: Ref) -> Option<NodeRef<'a, K>> {
        arena.get(at).map(|_| NodeRef { arena, at })
    }

    pub fn key(&self) -> &'a K {
        &self.arena[self.at].key
    }

    pub fn color(&self) -> Color {
        self.arena[self.at].color
    }

    pub fn is_red(&self) -> bool {
        self.color() == Color::Red
    }

    pub fn is_black(&self) -> bool {
        self.color() == Color::Black
    }

    pub fn left(&self) -> Option<NodeRef<'a, K>> {
        NodeRef::new(self.arena, self.arena.child(self.at, Side::Left))
    }

    pub fn right(&self) -> Option<NodeRef<'a, K>> {
        NodeRef::new(self.arena, self.arena.child(self.at, Side::Right))
    }

    /// Return parent node, None for root.
    pub fn parent(&self) -> Option<NodeRef<'a, K>> {
        NodeRef::new(self.arena, self.arena.parent(self.at))
    }

    /// Return the arena handle for this node. Handles are valid until the
    /// next mutation of the tree.
    pub fn to_ref(&self) -> Ref {
        self.at
    }
}

impl<'a, K> fmt::Debug for NodeRef<'a, K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}({:?},{:?})", self.at, self.key(), self.color())
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;

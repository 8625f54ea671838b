// Module ``rbt`` implement an in-memory ordered key-store as a classic
// [red-black tree][rbt].
//
// Nodes live in an [Arena] and link to each other by handles, the
// sentinel [NIL] stands for every absent child and for the root's
// parent. Sentinel is never written to, context that the textbook
// algorithm parks in the sentinel's parent field during delete is passed
// explicitly to the fixup loop.
//
// Rbt does not lock, mutations need `&mut self`. Applications sharing a
// tree across threads shall serialize writers outside this type.
//
// **Duplicate keys**: enabled by default, equal keys descend into the
// right subtree. Refer to [Config::allow_duplicates].
//
// [rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

use log::{debug, error, trace, warn};

use std::{borrow::Borrow, cmp::Ordering, fmt, iter::FromIterator};

use crate::{
    err_at,
    rbt::{
        Arena, Color, DeleteCase, Depth, InsertCase, Iter, Node, NodeRef, Ref, Side, Stats,
        NIL,
    },
    Config, Result,
};

/// Height limit enforced by validate, `2 * log2(n + 1)` can't exceed
/// this for any `n` addressable by `usize`.
pub const MAX_TREE_DEPTH: usize = 128;

/// Red-black tree, owns every node transitively through its arena.
pub struct Rbt<K> {
    config: Config,

    arena: Arena<K>,
    root: Ref,
    n_count: usize,
}

impl<K> Default for Rbt<K> {
    fn default() -> Rbt<K> {
        Rbt::from_config(Config::default())
    }
}

impl<K> Rbt<K> {
    /// Create an empty tree with default configuration.
    pub fn new(name: &str) -> Rbt<K> {
        Rbt::from_config(Config::new(name))
    }

    pub fn from_config(config: Config) -> Rbt<K> {
        debug!(
            target: "rbstore",
            "{} new tree allow_duplicates:{}", config.name, config.allow_duplicates
        );
        Rbt {
            config,

            arena: Arena::new(),
            root: NIL,
            n_count: 0,
        }
    }

    /// Drop all keys.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = NIL;
        self.n_count = 0;
    }
}

impl<K> Rbt<K> {
    /// Return name of this tree instance.
    #[inline]
    pub fn to_name(&self) -> String {
        self.config.name.clone()
    }

    #[inline]
    pub fn to_config(&self) -> Config {
        self.config.clone()
    }

    /// Return number of keys in this tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Same as [Rbt::len].
    #[inline]
    pub fn size(&self) -> usize {
        self.n_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return the root node, None if tree is empty.
    pub fn root(&self) -> Option<NodeRef<K>> {
        NodeRef::new(&self.arena, self.root)
    }

    /// Count of nodes on the longest path from root to a leaf, zero for
    /// an empty tree. Computed by a full walk.
    pub fn height(&self) -> usize {
        let mut stack = vec![(self.root, 0_usize)];
        let mut height = 0;
        while let Some((r, depth)) = stack.pop() {
            match self.arena.get(r) {
                Some(node) => {
                    stack.push((node.child(Side::Left), depth + 1));
                    stack.push((node.child(Side::Right), depth + 1));
                }
                None => height = usize::max(height, depth),
            }
        }
        height
    }

    /// Return the smallest key.
    pub fn min(&self) -> Option<&K> {
        let r = self.extreme(self.root, Side::Left);
        self.arena.get(r).map(|node| &node.key)
    }

    /// Return the largest key.
    pub fn max(&self) -> Option<&K> {
        let r = self.extreme(self.root, Side::Right);
        self.arena.get(r).map(|node| &node.key)
    }

    /// Iterate over keys in ascending order. Each call starts afresh.
    pub fn iter(&self) -> Iter<K> {
        Iter::new(self)
    }

    /// Same as [Rbt::iter].
    pub fn in_order(&self) -> Iter<K> {
        self.iter()
    }

    /// Return statistics. Black height and leaf depths are available
    /// only from [Rbt::validate].
    pub fn to_stats(&self) -> Stats {
        let mut stats = Stats::new(&self.config.name);
        stats.node_size = std::mem::size_of::<Node<K>>();
        stats.n_count = self.n_count;
        stats.n_free = self.arena.to_free();
        stats.height = self.height();
        stats
    }
}

impl<K> Rbt<K>
where
    K: Ord,
{
    /// Return the node holding `key`, None if missing. With duplicates,
    /// the first equal node met while descending from root is returned.
    pub fn search<Q>(&self, key: &Q) -> Option<NodeRef<K>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        NodeRef::new(&self.arena, self.find(key))
    }

    /// Same as [Rbt::search], but fail with [Error::KeyNotFound].
    ///
    /// [Error::KeyNotFound]: crate::Error::KeyNotFound
    pub fn get<Q>(&self, key: &Q) -> Result<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.arena.get(self.find(key)) {
            Some(node) => Ok(&node.key),
            None => err_at!(KeyNotFound, msg: "{} get missing key", self.config.name),
        }
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find(key).is_nil()
    }

    /// Insert `key` into the tree. Fails with [Error::InvalidKey] if `key`
    /// is already present and duplicates are disallowed, tree is left
    /// untouched in that case.
    ///
    /// [Error::InvalidKey]: crate::Error::InvalidKey
    pub fn insert(&mut self, key: K) -> Result<()> {
        let (mut parent, mut side) = (NIL, Side::Left);
        let mut cur = self.root;
        while let Some(node) = self.arena.get(cur) {
            side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Equal if !self.config.allow_duplicates => {
                    let name = &self.config.name;
                    return err_at!(InvalidKey, msg: "{} duplicate key", name);
                }
                Ordering::Equal | Ordering::Greater => Side::Right,
            };
            parent = cur;
            cur = node.child(side);
        }

        let z = self.arena.alloc(Node::new(key, parent));
        self.replace_child(parent, side, z);
        self.n_count += 1;

        self.insert_fixup(z);
        Ok(())
    }

    /// Remove `key` from the tree and return the removed key. Fails with
    /// [Error::KeyNotFound] if `key` is missing, tree is left untouched
    /// in that case.
    ///
    /// [Error::KeyNotFound]: crate::Error::KeyNotFound
    pub fn delete<Q>(&mut self, key: &Q) -> Result<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let z = match self.find(key) {
            NIL => {
                let name = &self.config.name;
                return err_at!(KeyNotFound, msg: "{} delete missing key", name);
            }
            z => z,
        };

        // y is the node spliced out, it has at most one real child.
        let y = match self.arena[z].children {
            [NIL, _] | [_, NIL] => z,
            [_, right] => self.extreme(right, Side::Left),
        };
        let x = match self.arena[y].children {
            [NIL, right] => right,
            [left, _] => left,
        };
        let (x_parent, x_side) = (self.arena[y].parent, self.arena.side_of(y));
        let y_color = self.arena[y].color;

        self.transplant(y, x);
        self.arena.swap_keys(z, y);
        let node = self.arena.free(y);
        self.n_count -= 1;

        if y_color == Color::Black {
            self.delete_fixup(x, x_parent, x_side);
        }
        Ok(node.key)
    }

    fn find<Q>(&self, key: &Q) -> Ref
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.root;
        while let Some(node) = self.arena.get(cur) {
            cur = match node.key.borrow().cmp(key) {
                Ordering::Greater => node.child(Side::Left),
                Ordering::Less => node.child(Side::Right),
                Ordering::Equal => return cur,
            };
        }
        NIL
    }
}

impl<K> Rbt<K> {
    fn insert_fixup(&mut self, mut z: Ref) {
        loop {
            let p = self.arena.parent(z);
            // a red parent is never the root, grandparent is real.
            let g = self.arena.parent(p);
            let (z_side, p_side) = (self.arena.side_of(z), self.arena.side_of(p));
            let uncle = self.arena.child(g, p_side.flip());

            let case = InsertCase::classify(
                self.arena.color(p),
                self.arena.color(uncle),
                z_side,
                p_side,
            );
            trace!(target: "rbstore", "insert-fixup {:?} at {:?}", case, z);

            match case {
                InsertCase::Done => break,
                InsertCase::RedUncle => {
                    self.arena[p].set_black();
                    self.arena[uncle].set_black();
                    self.arena[g].set_red();
                    z = g;
                }
                InsertCase::Inner => {
                    self.rotate(p, p_side);
                    z = p;
                }
                InsertCase::Outer => {
                    self.arena[p].set_black();
                    self.arena[g].set_red();
                    self.rotate(g, p_side.flip());
                    break;
                }
            }
        }

        let root = self.root;
        if let Some(node) = self.arena.get(root) {
            if !node.is_black() {
                self.arena[root].set_black()
            }
        }
    }

    // `x` may be NIL, its position is given by `parent` and `side`.
    fn delete_fixup(&mut self, mut x: Ref, mut parent: Ref, mut side: Side) {
        loop {
            let w = self.arena.child(parent, side.flip());
            let case = DeleteCase::classify(
                self.arena.color(x),
                x == self.root,
                self.arena.color(w),
                self.arena.color(self.arena.child(w, side)),
                self.arena.color(self.arena.child(w, side.flip())),
            );
            trace!(target: "rbstore", "delete-fixup {:?} at {:?}", case, x);

            match case {
                DeleteCase::Done => break,
                DeleteCase::RedSibling => {
                    self.arena[w].set_black();
                    self.arena[parent].set_red();
                    self.rotate(parent, side);
                }
                DeleteCase::BlackNephews => {
                    self.arena[w].set_red();
                    x = parent;
                    parent = self.arena.parent(x);
                    side = self.arena.side_of(x);
                }
                DeleteCase::RedNearNephew => {
                    let near = self.arena.child(w, side);
                    self.arena[near].set_black();
                    self.arena[w].set_red();
                    self.rotate(w, side.flip());
                }
                DeleteCase::RedFarNephew => {
                    let far = self.arena.child(w, side.flip());
                    let color = self.arena[parent].color;
                    self.arena[w].color = color;
                    self.arena[parent].set_black();
                    self.arena[far].set_black();
                    self.rotate(parent, side);
                    x = self.root;
                    break;
                }
            }
        }

        if !x.is_nil() {
            self.arena[x].set_black()
        }
    }

    //              (i)                        (i)
    //               |                          |
    //               x        rotate(x, Left)   y
    //              / \       ------------->   / \
    //             a   y                      x   c
    //                / \     <-------------  / \
    //               b   c   rotate(y, Right) a  b
    //
    // Colors are left untouched.
    fn rotate(&mut self, x: Ref, side: Side) {
        let y = self.arena.child(x, side.flip());
        if y.is_nil() {
            panic!("rotate(): {:?} promote sentinel ? call the programmer", side)
        }

        let inner = self.arena[y].child(side);
        self.arena[x].set_child(side.flip(), inner);
        if !inner.is_nil() {
            self.arena[inner].parent = x;
        }

        let xp = self.arena[x].parent;
        self.arena[y].parent = xp;
        let x_side = self.arena.side_of(x);
        self.replace_child(xp, x_side, y);

        self.arena[y].set_child(side, x);
        self.arena[x].parent = y;
    }

    // Replace the subtree rooted at `u` with the subtree rooted at `v`.
    fn transplant(&mut self, u: Ref, v: Ref) {
        let (up, u_side) = (self.arena[u].parent, self.arena.side_of(u));
        self.replace_child(up, u_side, v);
        if !v.is_nil() {
            self.arena[v].parent = up;
        }
    }

    fn replace_child(&mut self, parent: Ref, side: Side, child: Ref) {
        match parent {
            NIL => self.root = child,
            parent => self.arena[parent].set_child(side, child),
        }
    }

    pub(crate) fn extreme(&self, mut r: Ref, side: Side) -> Ref {
        loop {
            match self.arena.child(r, side) {
                NIL => break r,
                next => r = next,
            }
        }
    }

    pub(crate) fn successor(&self, r: Ref) -> Ref {
        self.step(r, Side::Right)
    }

    pub(crate) fn predecessor(&self, r: Ref) -> Ref {
        self.step(r, Side::Left)
    }

    // next in-order node towards `side`, using parent back-links.
    fn step(&self, mut r: Ref, side: Side) -> Ref {
        let sub = self.arena.child(r, side);
        if !sub.is_nil() {
            return self.extreme(sub, side.flip());
        }
        let mut p = self.arena.parent(r);
        while !p.is_nil() && self.arena.child(p, side) == r {
            r = p;
            p = self.arena.parent(p);
        }
        p
    }

    pub(crate) fn as_arena(&self) -> &Arena<K> {
        &self.arena
    }

    pub(crate) fn to_root(&self) -> Ref {
        self.root
    }
}

impl<K> Rbt<K>
where
    K: Ord + fmt::Debug,
{
    /// Validate the tree against red-black rules, sort order, parent
    /// back-links, node count and the `2 * log2(n + 1)` height bound.
    /// Return statistics, including black height and leaf depths.
    pub fn validate(&self) -> Result<Stats> {
        match self.check() {
            Ok(stats) => Ok(stats),
            Err(err) => {
                error!(target: "rbstore", "{} validate {}", self.config.name, err);
                Err(err)
            }
        }
    }

    fn check(&self) -> Result<Stats> {
        let name = &self.config.name;

        if self.arena.is_red(self.root) {
            return err_at!(Fatal, msg: "{} root node must be black", name);
        }
        if !self.arena.parent(self.root).is_nil() {
            return err_at!(Fatal, msg: "{} root node has a parent", name);
        }

        let mut depths = Depth::default();
        let (blacks, n_count) = self.check_tree(self.root, NIL, false, 0, &mut depths)?;
        if n_count != self.n_count {
            return err_at!(Fatal, msg: "{} n_count {} != {}", name, n_count, self.n_count);
        }
        if n_count != self.arena.len() {
            let n = self.arena.len();
            return err_at!(Fatal, msg: "{} n_count {} != arena {}", name, n_count, n);
        }

        let mut iter = self.iter();
        if let Some(mut prev) = iter.next() {
            for key in iter {
                match prev.cmp(key) {
                    Ordering::Greater => {
                        return err_at!(Fatal, msg: "{} sort {:?} > {:?}", name, prev, key)
                    }
                    Ordering::Equal if !self.config.allow_duplicates => {
                        return err_at!(Fatal, msg: "{} duplicate {:?}", name, key)
                    }
                    _ => (),
                }
                prev = key;
            }
        }

        let height = if n_count == 0 { 0 } else { depths.to_max() };
        let limit = 2.0 * ((n_count + 1) as f64).log2();
        if (height as f64) > limit {
            return err_at!(Fatal, msg: "{} height {} exceeds {}", name, height, limit);
        }

        let mut stats = self.to_stats();
        stats.blacks = Some(blacks);
        stats.depths = Some(depths);
        Ok(stats)
    }

    // return (black nodes from `r` down to sentinel, nodes in subtree).
    fn check_tree(
        &self,
        r: Ref,
        parent: Ref,
        fromred: bool,
        depth: usize,
        depths: &mut Depth,
    ) -> Result<(usize, usize)> {
        let name = &self.config.name;

        if depth > MAX_TREE_DEPTH {
            return err_at!(Fatal, msg: "{} tree exceeds max_depth {}", name, depth);
        }

        let node = match self.arena.get(r) {
            Some(node) => node,
            None => {
                depths.sample(depth);
                return Ok((0, 0));
            }
        };

        let red = !node.is_black();
        if fromred && red {
            return err_at!(Fatal, msg: "{} consecutive reds at {:?}", name, node.key);
        }
        if node.parent != parent {
            let (p, key) = (node.parent, &node.key);
            return err_at!(Fatal, msg: "{} parent {:?} != {:?} at {:?}", name, p, parent, key);
        }

        let (left, right) = (node.child(Side::Left), node.child(Side::Right));
        let (lb, lc) = self.check_tree(left, r, red, depth + 1, depths)?;
        let (rb, rc) = self.check_tree(right, r, red, depth + 1, depths)?;
        if lb != rb {
            let key = &node.key;
            return err_at!(Fatal, msg: "{} unbalanced blacks l:{} r:{} at {:?}", name, lb, rb, key);
        }

        Ok((lb + usize::from(!red), lc + rc + 1))
    }
}

impl<K> fmt::Debug for Rbt<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:", self.config.name)?;
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K> IntoIterator for &'a Rbt<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<K> Extend<K> for Rbt<K>
where
    K: Ord,
{
    /// Keys rejected by the duplicate policy are skipped.
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = K>,
    {
        for key in iter {
            if let Err(err) = self.insert(key) {
                warn!(target: "rbstore", "{} extend skipped {}", self.config.name, err);
            }
        }
    }
}

impl<K> FromIterator<K> for Rbt<K>
where
    K: Ord,
{
    fn from_iter<I>(iter: I) -> Rbt<K>
    where
        I: IntoIterator<Item = K>,
    {
        let mut tree = Rbt::default();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;

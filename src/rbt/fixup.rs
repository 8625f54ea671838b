//! Case analysis for the insert and delete fixup loops.
//!
//! Classification is kept apart from tree mutation, each step of the
//! fixup loop picks a case from the colors around the current node and
//! then applies the matching recolor/rotate actions.

use crate::rbt::{Color, Side};

/// Insert fixup cases, evaluated at the newly linked red node `z`.
///
/// ```text
///            (g)                 (g)
///           /   \               /   \
///         (p)    u            (p)    u
///         /                     \
///       (z)  outer               (z)  inner
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertCase {
    /// Parent is black, invariants hold.
    Done,
    /// Uncle is red. Recolor parent and uncle black, grandparent red,
    /// continue from grandparent.
    RedUncle,
    /// Uncle is black, `z` is an inner grandchild. Rotate parent away from
    /// `z`, which turns this into [InsertCase::Outer].
    Inner,
    /// Uncle is black, `z` is an outer grandchild. Recolor parent black,
    /// grandparent red and rotate grandparent away from `z`'s side.
    Outer,
}

impl InsertCase {
    /// `z_side` is the side `z` hangs from its parent, `p_side` is the
    /// side parent hangs from grandparent.
    pub fn classify(parent: Color, uncle: Color, z_side: Side, p_side: Side) -> InsertCase {
        match (parent, uncle) {
            (Color::Black, _) => InsertCase::Done,
            (Color::Red, Color::Red) => InsertCase::RedUncle,
            (Color::Red, Color::Black) if z_side != p_side => InsertCase::Inner,
            (Color::Red, Color::Black) => InsertCase::Outer,
        }
    }
}

/// Delete fixup cases, evaluated at node `x` carrying an extra black,
/// with sibling `w`. Near nephew is `w`'s child on `x`'s side, far nephew
/// is on the other side.
///
/// ```text
///              p
///            /   \
///           x     w
///               /   \
///             near  far
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteCase {
    /// `x` is red or root, color it black and stop.
    Done,
    /// Sibling is red. Recolor sibling black, parent red, rotate parent
    /// toward `x` and recompute sibling.
    RedSibling,
    /// Both nephews are black. Recolor sibling red, move `x` up.
    BlackNephews,
    /// Far nephew black, near nephew red. Recolor near nephew black,
    /// sibling red, rotate sibling away from `x`.
    RedNearNephew,
    /// Far nephew red. Sibling takes parent's color, parent and far nephew
    /// turn black, rotate parent toward `x`. Loop terminates.
    RedFarNephew,
}

impl DeleteCase {
    pub fn classify(
        x: Color,
        is_root: bool,
        sibling: Color,
        near: Color,
        far: Color,
    ) -> DeleteCase {
        if is_root || x == Color::Red {
            return DeleteCase::Done;
        }
        match (sibling, near, far) {
            (Color::Red, _, _) => DeleteCase::RedSibling,
            (Color::Black, Color::Black, Color::Black) => DeleteCase::BlackNephews,
            (Color::Black, Color::Red, Color::Black) => DeleteCase::RedNearNephew,
            (Color::Black, _, Color::Red) => DeleteCase::RedFarNephew,
        }
    }
}

#[cfg(test)]
#[path = "fixup_test.rs"]
mod fixup_test;

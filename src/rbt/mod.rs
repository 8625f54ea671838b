//! Module implement red-black tree, an in-memory ordered key-store.

mod arena;
mod depth;
mod fixup;
mod index;
mod iter;
mod node;
mod stats;

pub use arena::{Ref, NIL};
pub use depth::Depth;
pub use fixup::{DeleteCase, InsertCase};
pub use index::{Rbt, MAX_TREE_DEPTH};
pub use iter::Iter;
pub use node::{Color, NodeRef, Side};
pub use stats::Stats;

use arena::Arena;
use node::Node;

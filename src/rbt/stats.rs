use std::{fmt, result};

#[allow(unused_imports)]
use crate::rbt::Rbt;
use crate::rbt::Depth;

/// Statistic type, for [Rbt] type.
#[derive(Clone, Debug)]
pub struct Stats {
    pub name: String,
    pub node_size: usize,
    pub n_count: usize,
    /// vacant arena slots waiting for reuse.
    pub n_free: usize,
    pub height: usize,
    /// black nodes on every root-to-leaf path.
    pub blacks: Option<usize>,
    pub depths: Option<Depth>,
}

impl Stats {
    pub(crate) fn new(name: &str) -> Stats {
        Stats {
            name: name.to_string(),
            node_size: Default::default(),
            n_count: Default::default(),
            n_free: Default::default(),
            height: Default::default(),
            blacks: None,
            depths: None,
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        let none = "none".to_string();
        let b = self.blacks.as_ref().map_or(none.clone(), |x| x.to_string());
        let d = self.depths.as_ref().map_or(none, |x| x.to_string());
        writeln!(f, "rbt.name = {}", self.name)?;
        writeln!(
            f,
            "rbt = {{ n_count={}, n_free={}, node_size={}, height={}, blacks={} }}",
            self.n_count, self.n_free, self.node_size, self.height, b,
        )?;
        writeln!(f, "rbt.depths = {}", d)
    }
}

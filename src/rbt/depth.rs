use std::{fmt, result};

/// Histogram of leaf depths in a red-black tree. A leaf is a sentinel
/// position, its depth is the count of real nodes on the path from root.
///
/// Spread between minimum and maximum shows how far the tree is from
/// perfect balance, red-black rules bound it to a factor of two.
#[derive(Clone, Default)]
pub struct Depth {
    samples: usize,
    total: usize,
    depths: Vec<u64>,
}

impl Depth {
    /// Record depth of a single root-to-leaf branch.
    pub fn sample(&mut self, depth: usize) {
        if self.depths.len() <= depth {
            self.depths.resize(depth + 1, 0);
        }
        self.depths[depth] += 1;
        self.samples += 1;
        self.total += depth;
    }

    /// Fold samples from `other` into this histogram.
    pub fn merge(&mut self, other: &Depth) {
        if self.depths.len() < other.depths.len() {
            self.depths.resize(other.depths.len(), 0);
        }
        for (acc, n) in self.depths.iter_mut().zip(other.depths.iter()) {
            *acc += n
        }
        self.samples += other.samples;
        self.total += other.total;
    }

    pub fn to_samples(&self) -> usize {
        self.samples
    }

    /// Return minimum leaf depth, zero when nothing is sampled.
    pub fn to_min(&self) -> usize {
        self.depths.iter().position(|n| *n > 0).unwrap_or(0)
    }

    /// Return maximum leaf depth, same as tree height.
    pub fn to_max(&self) -> usize {
        self.depths.iter().rposition(|n| *n > 0).unwrap_or(0)
    }

    /// Return the average leaf depth, zero when nothing is sampled.
    pub fn to_mean(&self) -> usize {
        self.total.checked_div(self.samples).unwrap_or(0)
    }

    /// Return (percentile, depth) pairs above the 90th percentile, one
    /// entry for each depth that crosses a new percentile.
    pub fn to_percentiles(&self) -> Vec<(u8, usize)> {
        let mut acc = 0_u64;
        let mut prev = 90_u8;
        let mut percentiles = vec![];
        for (depth, n) in self.depths.iter().enumerate() {
            if *n == 0 {
                continue;
            }
            acc += n;
            let perc = ((acc * 100) / (self.samples as u64)) as u8;
            if perc > prev {
                percentiles.push((perc, depth));
                prev = perc;
            }
        }
        percentiles
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        let percs: Vec<String> = self
            .to_percentiles()
            .into_iter()
            .map(|(perc, depth)| format!("{}={}", perc, depth))
            .collect();

        write!(
            f,
            "{{ samples={}, min={}, mean={}, max={}, percentiles={{ {} }} }}",
            self.samples,
            self.to_min(),
            self.to_mean(),
            self.to_max(),
            percs.join(", ")
        )
    }
}

impl fmt::Debug for Depth {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
#[path = "depth_test.rs"]
mod depth_test;

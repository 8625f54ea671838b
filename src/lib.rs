//! Package rbstore implement an in-memory ordered key-store using
//! [red-black tree][rbt]. Search, insert and delete run in O(log n),
//! tree height never exceeds `2 * log2(n + 1)`.
//!
//! ```
//! use rbstore::{Config, Rbt};
//!
//! let mut config = Config::new("primes");
//! config.set_allow_duplicates(false);
//!
//! let mut index: Rbt<u32> = Rbt::from_config(config);
//! for key in [7, 2, 11, 3, 5].iter() {
//!     index.insert(*key).unwrap();
//! }
//! assert!(index.insert(3).is_err());
//!
//! assert_eq!(index.delete(&7).unwrap(), 7);
//! assert!(index.delete(&7).is_err());
//!
//! let keys: Vec<u32> = index.iter().cloned().collect();
//! assert_eq!(keys, vec![2, 3, 5, 11]);
//! index.validate().unwrap();
//! ```
//!
//! Rbt does no locking of its own, mutations need exclusive access.
//! Applications can wrap them in a lock to share across threads.
//!
//! [rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

mod error;
pub mod config;
pub mod rbt;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::rbt::Rbt;

//! Module implement configuration for [Rbt] instances.
//!
//! [Rbt]: crate::rbt::Rbt

use arbitrary::Arbitrary;
use log::debug;
use serde::{Deserialize, Serialize};

use std::{fs, path};

use crate::{err_at, Result};

/// Default name for trees created without explicit configuration.
pub const DEFAULT_NAME: &str = "rbt";
/// Default value for duplicate policy, multiset semantics.
pub const ALLOW_DUPLICATES: bool = true;

/// Configuration for red-black tree instances.
///
/// Configuration can be composed with [Config::new] and the `set_*`
/// methods, or parsed from toml text, for example:
///
/// ```toml
/// name = "users"
/// allow_duplicates = false
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Arbitrary)]
pub struct Config {
    /// name of the tree.
    pub name: String,
    /// Allow the same key to be inserted more than once. Equal keys
    /// descend into the right subtree. When false, inserting an existing
    /// key fails with [Error::InvalidKey].
    ///
    /// Default: [ALLOW_DUPLICATES]
    ///
    /// [Error::InvalidKey]: crate::Error::InvalidKey
    #[serde(default = "default_allow_duplicates")]
    pub allow_duplicates: bool,
}

fn default_allow_duplicates() -> bool {
    ALLOW_DUPLICATES
}

impl Default for Config {
    fn default() -> Config {
        Config::new(DEFAULT_NAME)
    }
}

impl Config {
    /// Create a new configuration value, use the `set_*` methods to add more
    /// configuration.
    pub fn new(name: &str) -> Config {
        Config {
            name: name.to_string(),
            allow_duplicates: ALLOW_DUPLICATES,
        }
    }

    /// Configure the duplicate-key policy.
    pub fn set_allow_duplicates(&mut self, allow: bool) -> &mut Self {
        self.allow_duplicates = allow;
        self
    }

    /// Parse configuration from toml text.
    pub fn from_toml(text: &str) -> Result<Config> {
        let config: Config = err_at!(InvalidInput, toml::from_str(text))?;
        if config.name.is_empty() {
            return err_at!(InvalidInput, msg: "config name must not be empty");
        }
        Ok(config)
    }

    /// Load configuration from a toml file at `loc`.
    pub fn load_toml<P>(loc: P) -> Result<Config>
    where
        P: AsRef<path::Path>,
    {
        let loc = loc.as_ref();
        let text = err_at!(IOError, fs::read_to_string(loc), "{:?}", loc)?;
        let config = Config::from_toml(&text)?;
        debug!(target: "rbstore", "loaded config {:?} from {:?}", config, loc);
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

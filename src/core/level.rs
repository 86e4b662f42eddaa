//! Log levels and the level registry
//!
//! A [`Level`] is an ordered integer. Its display name is looked up in a
//! [`LevelRegistry`], which can be extended at runtime with custom levels.
//! Every logger carries a registry; unless told otherwise it shares the
//! process-wide default returned by [`LevelRegistry::global`].

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Name returned for a level value nobody registered
pub const UNKNOWN_LEVEL_NAME: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(i32);

impl Level {
    pub const DEBUG: Level = Level(0);
    pub const INFO: Level = Level(1);
    pub const WARN: Level = Level(2);
    pub const ERROR: Level = Level(3);

    #[must_use]
    pub const fn new(value: i32) -> Self {
        Level(value)
    }

    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Name of this level in the process-wide registry
    #[must_use]
    pub fn name(self) -> String {
        LevelRegistry::global().name(self)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match *self {
            Level::DEBUG => Blue,
            Level::INFO => Green,
            Level::WARN => Yellow,
            Level::ERROR => Red,
            other if other > Level::ERROR => BrightRed,
            _ => BrightBlack,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Level(value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Never fails: unknown names resolve to [`Level::INFO`].
impl FromStr for Level {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(LevelRegistry::global().parse(s))
    }
}

#[derive(Debug)]
struct LevelTables {
    names: HashMap<Level, String>,
    values: HashMap<String, Level>,
}

impl LevelTables {
    fn bind(&mut self, name: &str, level: Level) {
        let key = name.to_uppercase();

        // Keep the two tables inverse to each other.
        if let Some(previous) = self.values.insert(key.clone(), level) {
            if previous != level {
                self.names.remove(&previous);
            }
        }
        if let Some(previous) = self.names.insert(level, name.to_string()) {
            let previous_key = previous.to_uppercase();
            if previous_key != key {
                self.values.remove(&previous_key);
            }
        }
    }
}

/// Bidirectional level name table guarded by a single lock
///
/// # Example
///
/// ```
/// use rust_log_dispatch::{Level, LevelRegistry};
///
/// let registry = LevelRegistry::new();
/// registry.register("NOTICE", Level::new(10));
///
/// assert_eq!(registry.parse("notice"), Level::new(10));
/// assert_eq!(registry.name(Level::new(10)), "NOTICE");
/// assert_eq!(registry.parse("no-such-level"), Level::INFO);
/// ```
#[derive(Debug)]
pub struct LevelRegistry {
    tables: RwLock<LevelTables>,
}

static GLOBAL_REGISTRY: Lazy<Arc<LevelRegistry>> = Lazy::new(|| Arc::new(LevelRegistry::new()));

impl LevelRegistry {
    /// Create a registry holding only the built-in levels
    #[must_use]
    pub fn new() -> Self {
        let mut tables = LevelTables {
            names: HashMap::new(),
            values: HashMap::new(),
        };
        tables.bind("DEBUG", Level::DEBUG);
        tables.bind("INFO", Level::INFO);
        tables.bind("WARN", Level::WARN);
        tables.bind("ERROR", Level::ERROR);

        Self {
            tables: RwLock::new(tables),
        }
    }

    /// The process-wide default registry
    pub fn global() -> &'static Arc<LevelRegistry> {
        &GLOBAL_REGISTRY
    }

    /// Bind `name` to `level`, replacing any earlier binding of either
    ///
    /// The tables stay one-to-one, so moving an existing name to a new value
    /// leaves the old value unnamed. After `register("ERROR", Level::new(50))`
    /// events at [`Level::ERROR`] are named `UNKNOWN` until another name is
    /// bound to it:
    ///
    /// ```
    /// use rust_log_dispatch::{Level, LevelRegistry};
    ///
    /// let registry = LevelRegistry::new();
    /// registry.register("ERROR", Level::new(50));
    ///
    /// assert_eq!(registry.parse("error"), Level::new(50));
    /// assert_eq!(registry.name(Level::ERROR), "UNKNOWN");
    ///
    /// registry.register("SEVERE", Level::ERROR);
    /// assert_eq!(registry.name(Level::ERROR), "SEVERE");
    /// ```
    pub fn register(&self, name: &str, level: Level) {
        self.tables.write().bind(name, level);
    }

    /// Registered name of `level`, or `"UNKNOWN"`
    #[must_use]
    pub fn name(&self, level: Level) -> String {
        self.tables
            .read()
            .names
            .get(&level)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LEVEL_NAME.to_string())
    }

    /// Case-insensitive lookup; unknown names resolve to [`Level::INFO`]
    #[must_use]
    pub fn parse(&self, name: &str) -> Level {
        self.lookup(name).unwrap_or_default()
    }

    /// Case-insensitive lookup without the INFO default
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Level> {
        self.tables.read().values.get(&name.to_uppercase()).copied()
    }

    /// All registered levels, lowest first
    #[must_use]
    pub fn levels(&self) -> Vec<(Level, String)> {
        let tables = self.tables.read();
        let mut levels: Vec<_> = tables
            .names
            .iter()
            .map(|(level, name)| (*level, name.clone()))
            .collect();
        levels.sort_by_key(|(level, _)| *level);
        levels
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register a level in the process-wide registry
pub fn register_level(name: &str, level: Level) {
    LevelRegistry::global().register(name, level);
}

/// Parse a level name with the process-wide registry
#[must_use]
pub fn parse_level(name: &str) -> Level {
    LevelRegistry::global().parse(name)
}

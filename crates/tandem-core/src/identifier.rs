//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type. Every DSL identifier, edge id and
//! source-map entity id is an interned [`Id`], so graph lookups hash a symbol
//! rather than a string.

use std::{
    cmp::Ordering,
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Efficient identifier type using string interning
///
/// Equality and hashing work on the interned symbol. Ordering is lexical on
/// the underlying text, so sorting ids gives the same result regardless of
/// the order in which they were interned.
///
/// # Examples
///
/// ```
/// use tandem_core::identifier::Id;
///
/// let server = Id::new("Server");
/// let edge = Id::edge(server, Id::new("Database"), 3);
/// assert_eq!(edge, "edge_Server_Database_3");
///
/// let added = Id::numbered("node", 1);
/// assert_eq!(added, "node_1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        let symbol = interner().get_or_intern(name);
        Self(symbol)
    }

    /// Creates the content-derived id of an edge declared on `line`.
    pub fn edge(source: Id, target: Id, line: usize) -> Self {
        Self::new(&format!("edge_{source}_{target}_{line}"))
    }

    /// Creates a `{prefix}_{index}` identifier.
    ///
    /// Directive entries in the source map (`direction_4`, `style_0`) and
    /// diagram-created nodes (`node_1`, `group_2`) use this form.
    pub fn numbered(prefix: &str, index: usize) -> Self {
        Self::new(&format!("{prefix}_{index}"))
    }

    /// Runs `f` with the text behind this identifier.
    pub fn with_str<R>(self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.with_str(str::to_owned);
        write!(f, "{value}")
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        let interner = interner();
        let lhs = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        let rhs = interner
            .resolve(other.0)
            .expect("Symbol should exist in interner");
        lhs.cmp(rhs)
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// # Examples
    ///
    /// ```
    /// use tandem_core::identifier::Id;
    ///
    /// let id: Id = "Gateway".into();
    /// assert_eq!(id, "Gateway");
    /// ```
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|value| value == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("Server");
        let id2 = Id::new("Server");
        let id3 = Id::new("Client");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "Server");
    }

    #[test]
    fn test_edge() {
        let edge = Id::edge(Id::new("Client"), Id::new("Server"), 0);
        assert_eq!(edge, "edge_Client_Server_0");

        let same_pair_other_line = Id::edge(Id::new("Client"), Id::new("Server"), 7);
        assert_ne!(edge, same_pair_other_line);
    }

    #[test]
    fn test_numbered() {
        assert_eq!(Id::numbered("direction", 4), "direction_4");
        assert_eq!(Id::numbered("node", 1), Id::numbered("node", 1));
        assert_ne!(Id::numbered("node", 1), Id::numbered("group", 1));
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("display_test");
        assert_eq!(format!("{id}"), "display_test");
    }

    #[test]
    fn test_ordering_is_lexical() {
        // Intern in reverse order so symbol order disagrees with text order.
        let zeta = Id::new("zz_ordering_zeta");
        let alpha = Id::new("zz_ordering_alpha");

        assert!(alpha < zeta);
        assert_eq!(alpha.cmp(&alpha), Ordering::Equal);

        let mut ids = vec![zeta, alpha];
        ids.sort();
        assert_eq!(ids, vec![alpha, zeta]);
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let id1 = Id::new("key1");
        let id2 = Id::new("key1");
        let id3 = Id::new("key2");

        let mut map = HashMap::new();
        map.insert(id1, "value1");
        map.insert(id3, "value2");

        assert_eq!(map.get(&id2), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("Load Balancer");

        assert!(id == "Load Balancer");
        assert!(id != "Load");

        let empty = Id::new("");
        assert!(empty == "");
        assert!(empty != "non-empty");
    }

    #[test]
    fn test_from_str() {
        let id: Id = "parsed".parse().unwrap();
        assert_eq!(id, "parsed");
    }
}

//! Fast hash map and hash set type aliases.
//!
//! Type aliases for [`FxHashMap`] and [`FxHashSet`] from the `rustc-hash`
//! crate. The Fx hash algorithm is roughly 2x faster than the standard
//! library's default hasher for the string keys this codebase uses
//! everywhere (file names, extensions, project roots).
//!
//! Denial-of-service resistance is not required here - all keys come from
//! the local filesystem, never from untrusted input.
//!
//! # Examples
//!
//! ```
//! use rm_core::FxHashMap;
//!
//! let mut children: FxHashMap<String, u64> = FxHashMap::default();
//! children.insert("main.py".to_owned(), 10);
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// The hasher used by [`FxHashMap`] and [`FxHashSet`].
pub type FxBuildHasher = rustc_hash::FxBuildHasher;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_map_operations() {
        let mut map: FxHashMap<&str, u64> = FxHashMap::default();
        map.insert(".py", 3);
        map.insert(".rs", 7);
        assert_eq!(map.get(".py"), Some(&3));
        assert_eq!(map.get(".toml"), None);
    }

    #[test]
    fn test_fx_hash_set_operations() {
        let mut set: FxHashSet<&str> = FxHashSet::default();
        set.insert("repomap.md");
        assert!(set.contains("repomap.md"));
        assert!(!set.contains(".ignore"));
    }
}

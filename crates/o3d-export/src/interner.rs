//! Insertion-ordered interning.

use std::hash::Hash;

use indexmap::IndexSet;

/// Maps an ordered set of keys to their indexes.
///
/// The first call with a novel key assigns the next sequential index
/// (starting at 0); later calls with an equal key return the same
/// index. Iteration yields keys in insertion order. This is the
/// backbone of both vertex and material-slot deduplication.
///
/// There is no removal operation. Mutating an inserted key's identity
/// through interior mutability is unsupported and invalidates the
/// structure's consistency; no attempt is made to guard against it.
#[derive(Debug, Clone, Default)]
pub struct Interner<K> {
    set: IndexSet<K>,
}

impl<K: Hash + Eq> Interner<K> {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self {
            set: IndexSet::new(),
        }
    }

    /// Return the index for `key`, interning it if unseen.
    pub fn index_of(&mut self, key: K) -> u32 {
        self.set.insert_full(key).0 as u32
    }

    /// Number of distinct keys interned so far.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Whether no key has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Iterate over keys in insertion order; a key's position is its
    /// index.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.set.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sequential_indices() {
        let mut interner = Interner::new();
        assert_eq!(interner.index_of("a"), 0);
        assert_eq!(interner.index_of("b"), 1);
        assert_eq!(interner.index_of("c"), 2);
        assert_eq!(interner.len(), 3);
    }

    #[test]
    fn test_idempotent_lookup() {
        let mut interner = Interner::new();
        assert_eq!(interner.index_of("a"), 0);
        assert_eq!(interner.index_of("b"), 1);
        assert_eq!(interner.index_of("a"), 0);
        assert_eq!(interner.index_of("b"), 1);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_insertion_order_iteration() {
        let mut interner = Interner::new();
        for key in ["z", "m", "a", "m", "z"] {
            interner.index_of(key);
        }
        let keys: Vec<_> = interner.iter().copied().collect();
        assert_eq!(keys, vec!["z", "m", "a"]);
    }

    #[test]
    fn test_composite_keys() {
        let mut interner = Interner::new();
        let a = interner.index_of((String::from("mat"), 0u32));
        let b = interner.index_of((String::from("mat"), 1u32));
        let c = interner.index_of((String::from("mat"), 0u32));
        assert_eq!(a, c);
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn prop_indices_stable_and_contiguous(keys in prop::collection::vec("[a-d]{1,2}", 0..64)) {
            let mut interner = Interner::new();
            let mut first_seen: Vec<String> = Vec::new();
            for key in &keys {
                let index = interner.index_of(key.clone());
                if !first_seen.contains(key) {
                    // a novel key gets the next sequential index
                    prop_assert_eq!(index as usize, first_seen.len());
                    first_seen.push(key.clone());
                } else {
                    // a seen key returns its original index
                    let expected = first_seen.iter().position(|k| k == key);
                    prop_assert_eq!(Some(index as usize), expected);
                }
            }
            prop_assert_eq!(interner.len(), first_seen.len());
            let interned: Vec<String> = interner.iter().cloned().collect();
            prop_assert_eq!(interned, first_seen);
        }
    }
}

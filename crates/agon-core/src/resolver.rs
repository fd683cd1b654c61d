//! # Hash Resolver
//!
//! Resolves a user-supplied hash prefix to the unique full key within
//! a collection, or reports "not found" / "ambiguous".
//!
//! Resolution is a full linear scan over the collection's key set on
//! every call — an explicit O(n) cost accepted for small local
//! archives. No persistent prefix index is maintained; see DESIGN.md
//! for the open decision on introducing one.

use crate::primitives::{HASH_HEX_LEN, MAX_AMBIGUOUS_MATCHES, MIN_PREFIX_LEN};
use crate::store::{Collection, ObjectStore};
use crate::types::{AgonError, ContentHash};

/// Outcome of a prefix resolution.
///
/// `NotFound` and `Ambiguous` are expected, recoverable outcomes the
/// caller acts on — not faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one key matched.
    Unique(ContentHash),
    /// No key matched.
    NotFound,
    /// More than one key matched; carries up to
    /// `MAX_AMBIGUOUS_MATCHES` colliding keys for diagnostic display.
    Ambiguous(Vec<ContentHash>),
}

/// Validate a user-supplied prefix before scanning.
///
/// Prefixes shorter than `MIN_PREFIX_LEN` have insufficient collision
/// resistance to be useful and are rejected as a validation fault, as
/// are non-hex characters and over-length input.
pub fn validate_prefix(prefix: &str) -> Result<(), AgonError> {
    if prefix.len() < MIN_PREFIX_LEN {
        return Err(AgonError::Validation(format!(
            "prefix `{}` is {} chars; at least {} required",
            prefix,
            prefix.len(),
            MIN_PREFIX_LEN
        )));
    }
    if prefix.len() > HASH_HEX_LEN {
        return Err(AgonError::Validation(format!(
            "prefix is longer than a full {}-char hash",
            HASH_HEX_LEN
        )));
    }
    if !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AgonError::Validation(format!(
            "prefix `{}` contains non-hex characters",
            prefix
        )));
    }
    Ok(())
}

/// Resolve `prefix` within `collection`.
///
/// Scans every key and filters on the (case-normalized) prefix:
/// - zero matches -> `NotFound`
/// - exactly one  -> `Unique`
/// - more         -> `Ambiguous` with the first few colliding keys
pub fn resolve<S: ObjectStore>(
    store: &S,
    collection: Collection,
    prefix: &str,
) -> Result<Resolution, AgonError> {
    validate_prefix(prefix)?;
    let needle = prefix.to_ascii_lowercase();

    let mut matches: Vec<ContentHash> = store
        .list_keys(collection)?
        .into_iter()
        .filter(|key| key.as_str().starts_with(&needle))
        .collect();

    // Deterministic diagnostic order regardless of backend enumeration.
    matches.sort();

    Ok(match matches.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Unique(matches.swap_remove(0)),
        _ => {
            matches.truncate(MAX_AMBIGUOUS_MATCHES);
            Resolution::Ambiguous(matches)
        }
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn fabricated(prefix: &str) -> ContentHash {
        let mut hex = prefix.to_string();
        while hex.len() < HASH_HEX_LEN {
            hex.push('0');
        }
        ContentHash::from_hex(hex).expect("valid hex")
    }

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        for key in [
            fabricated("abc1111"),
            fabricated("abc2222"),
            fabricated("xyz9999"),
        ] {
            store
                .put(Collection::Arguments, &key, b"payload")
                .expect("put");
        }
        store
    }

    #[test]
    fn unique_prefix_resolves() {
        let store = seeded_store();
        let result = resolve(&store, Collection::Arguments, "xyz9999").expect("resolve");
        assert_eq!(result, Resolution::Unique(fabricated("xyz9999")));
    }

    #[test]
    fn ambiguous_prefix_lists_candidates() {
        let mut store = MemoryStore::new();
        // Keys identical through the 7-char prefix, diverging after.
        let first = ContentHash::from_hex(format!("abc1111{}", "1".repeat(57))).expect("hex");
        let second = ContentHash::from_hex(format!("abc1111{}", "2".repeat(57))).expect("hex");
        for key in [&first, &second] {
            store
                .put(Collection::Arguments, key, b"payload")
                .expect("put");
        }

        let result = resolve(&store, Collection::Arguments, "abc1111").expect("resolve");
        match result {
            Resolution::Ambiguous(matches) => {
                assert_eq!(matches, vec![first, second]);
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn ambiguous_matches_are_capped() {
        let mut store = MemoryStore::new();
        for i in 0..10u32 {
            let key =
                ContentHash::from_hex(format!("aaaaaaa{:057x}", i)).expect("hex");
            store
                .put(Collection::Arguments, &key, b"payload")
                .expect("put");
        }

        let result = resolve(&store, Collection::Arguments, "aaaaaaa").expect("resolve");
        match result {
            Resolution::Ambiguous(matches) => {
                assert_eq!(matches.len(), MAX_AMBIGUOUS_MATCHES);
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn no_match_is_not_found() {
        let store = seeded_store();
        let result = resolve(&store, Collection::Arguments, "qqq0000").expect("resolve");
        assert_eq!(result, Resolution::NotFound);
    }

    #[test]
    fn short_prefix_rejected() {
        let store = seeded_store();
        let result = resolve(&store, Collection::Arguments, "abc12");
        assert!(matches!(result, Err(AgonError::Validation(_))));
    }

    #[test]
    fn non_hex_prefix_rejected() {
        let store = seeded_store();
        let result = resolve(&store, Collection::Arguments, "zzzzzzz");
        assert!(matches!(result, Err(AgonError::Validation(_))));
    }

    #[test]
    fn overlong_prefix_rejected() {
        let store = seeded_store();
        let prefix = "a".repeat(HASH_HEX_LEN + 1);
        let result = resolve(&store, Collection::Arguments, &prefix);
        assert!(matches!(result, Err(AgonError::Validation(_))));
    }

    #[test]
    fn uppercase_prefix_normalized() {
        let store = seeded_store();
        let result = resolve(&store, Collection::Arguments, "XYZ9999").expect("resolve");
        assert_eq!(result, Resolution::Unique(fabricated("xyz9999")));
    }

    #[test]
    fn full_key_always_unique() {
        let store = seeded_store();
        let full = fabricated("abc1111");
        let result = resolve(&store, Collection::Arguments, full.as_str()).expect("resolve");
        assert_eq!(result, Resolution::Unique(full));
    }
}

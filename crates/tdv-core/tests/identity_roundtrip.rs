//! # Canonical URI Round-Trip Properties
//!
//! Checks that identity → URI is injective and invertible for every
//! identity the path conventions can express: canonical URIs parse back to
//! the identity that built them, and schema file paths parse back to the
//! identity whose file name they carry.

use std::collections::HashSet;
use std::path::PathBuf;

use proptest::prelude::*;
use tdv_core::{NamespaceUris, SchemaIdentity, Version};

fn namespace() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("omh".to_string()),
        Just("granola".to_string()),
        Just("ieee".to_string()),
    ]
}

/// Schema names: lowercase words joined by hyphens, optionally ending in a
/// digit-bearing word (e.g. `step-count`, `body-mass-index`, `heart-rate-2x`).
fn schema_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9]{0,7}", 1..5).prop_map(|words| words.join("-"))
}

fn identity() -> impl Strategy<Value = SchemaIdentity> {
    (namespace(), schema_name(), 0u32..100, 0u32..100).prop_map(|(ns, name, major, minor)| {
        SchemaIdentity::new(ns, name, Version::new(major, minor)).unwrap()
    })
}

proptest! {
    #[test]
    fn canonical_uri_parses_back_to_identity(id in identity()) {
        let table = NamespaceUris::default();
        let uri = table.canonical_uri(&id).unwrap();
        prop_assert_eq!(table.parse_uri(&uri).unwrap(), id);
    }

    #[test]
    fn schema_path_parses_back_to_identity(id in identity()) {
        let path = PathBuf::from("/schemas")
            .join(id.namespace())
            .join(id.file_name());
        prop_assert_eq!(SchemaIdentity::from_schema_path(&path).unwrap(), id);
    }

    #[test]
    fn wildcard_uri_is_never_a_canonical_uri(id in identity()) {
        let table = NamespaceUris::default();
        let wildcard = table.wildcard_uri(&id).unwrap();
        prop_assert!(table.parse_uri(&wildcard).is_err());
    }

    #[test]
    fn distinct_identities_have_distinct_uris(ids in prop::collection::vec(identity(), 1..40)) {
        let table = NamespaceUris::default();
        let unique: HashSet<&SchemaIdentity> = ids.iter().collect();
        let uris: HashSet<String> = unique
            .iter()
            .map(|id| table.canonical_uri(id).unwrap())
            .collect();
        prop_assert_eq!(uris.len(), unique.len());
    }
}

#[test]
fn custom_base_table_round_trips() {
    let table = NamespaceUris::from_pairs([
        ("omh", "https://www.openmhealth.org/schema/omh"),
        ("granola", "https://www.openmhealth.org/schema/granola"),
    ])
    .unwrap();
    let id = SchemaIdentity::new("granola", "acceleration", Version::new(1, 0)).unwrap();
    let uri = table.canonical_uri(&id).unwrap();
    assert_eq!(
        uri,
        "https://www.openmhealth.org/schema/granola/acceleration-1.0.json"
    );
    assert_eq!(table.parse_uri(&uri).unwrap(), id);
}

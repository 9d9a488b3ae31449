// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Content digest manifest over bundle entries.
//!
//! The manifest maps every bundled entry name to the SHA-1 digest of its
//! exact bytes. Its JSON serialization is what gets signed, so the bytes
//! must be reproducible for identical input: entries are held in a
//! [BTreeMap] and serialized compactly, giving a fixed key order and no
//! run-to-run variance.

use {
    crate::error::PassIssuerError,
    sha1::{Digest, Sha1},
    std::collections::BTreeMap,
};

/// Compute the lowercase hex SHA-1 digest of content.
///
/// SHA-1 is mandated by the consuming wallet application's bundle format.
pub fn content_digest(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Mapping of bundle entry name to content digest.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DigestManifest {
    entries: BTreeMap<String, String>,
}

impl DigestManifest {
    /// Record an entry by digesting its final content.
    ///
    /// Content must not be mutated after this point or the signature will
    /// not cover what ships in the bundle.
    pub fn insert(&mut self, name: impl ToString, data: &[u8]) {
        self.entries.insert(name.to_string(), content_digest(data));
    }

    /// Look up the recorded digest for an entry.
    pub fn digest(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the JSON bytes that get signed and bundled.
    pub fn to_json(&self) -> Result<Vec<u8>, PassIssuerError> {
        Ok(serde_json::to_vec(&self.entries)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex_sha1() {
        assert_eq!(
            content_digest(b"hello world"),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn manifest_covers_every_entry() {
        let mut manifest = DigestManifest::default();
        manifest.insert("pass.json", b"{}");
        manifest.insert("icon.png", b"\x89PNG");

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.digest("pass.json"), Some(content_digest(b"{}").as_str()));
        assert_eq!(
            manifest.digest("icon.png"),
            Some(content_digest(b"\x89PNG").as_str())
        );
        assert_eq!(manifest.digest("signature"), None);
    }

    #[test]
    fn serialization_is_stable_and_ordered() {
        let mut a = DigestManifest::default();
        a.insert("logo.png", b"logo");
        a.insert("icon.png", b"icon");
        a.insert("pass.json", b"{}");

        let mut b = DigestManifest::default();
        b.insert("pass.json", b"{}");
        b.insert("icon.png", b"icon");
        b.insert("logo.png", b"logo");

        // Same resource set, byte-identical serialization regardless of
        // insertion order.
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());

        let json: serde_json::Value = serde_json::from_slice(&a.to_json().unwrap()).unwrap();
        let keys = json
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["icon.png", "logo.png", "pass.json"]);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bundle packaging.
//!
//! Writes the pass definition, manifest, signature and images as flat
//! entries of a single zip archive. Entry names are the exact names bound
//! by the manifest; nothing is nested.

use {
    crate::error::PassIssuerError,
    std::{collections::BTreeMap, io::Write},
};

pub const PASS_ENTRY: &str = "pass.json";
pub const MANIFEST_ENTRY: &str = "manifest.json";
pub const SIGNATURE_ENTRY: &str = "signature";

/// Media type consumers expect for the bundle.
pub const MEDIA_TYPE: &str = "application/vnd.apple.pkpass";

/// A finished, signed pass bundle.
#[derive(Debug)]
pub struct IssuedPass {
    /// The pass serial number (the vehicle VIN).
    pub serial_number: String,

    /// Complete bundle bytes.
    pub data: Vec<u8>,
}

impl IssuedPass {
    pub fn media_type(&self) -> &'static str {
        MEDIA_TYPE
    }

    /// Suggested download filename.
    pub fn filename(&self) -> String {
        format!("{}.pkpass", self.serial_number)
    }
}

fn ensure_flat(name: &str) -> Result<(), PassIssuerError> {
    if name.contains('/') || name.contains('\\') {
        return Err(PassIssuerError::NestedEntryName(name.to_string()));
    }

    Ok(())
}

/// Assemble the final archive.
///
/// Entry order is fixed: `pass.json`, `manifest.json`, `signature`, then
/// the image resources in name order (matching manifest key order).
pub fn write_bundle(
    definition_data: &[u8],
    manifest_data: &[u8],
    signature: &[u8],
    resources: &BTreeMap<String, Vec<u8>>,
) -> Result<Vec<u8>, PassIssuerError> {
    let mut zf = zip::ZipWriter::new(std::io::Cursor::new(vec![]));
    let options = zip::write::FileOptions::default();

    for (name, data) in [
        (PASS_ENTRY, definition_data),
        (MANIFEST_ENTRY, manifest_data),
        (SIGNATURE_ENTRY, signature),
    ] {
        zf.start_file(name, options)?;
        zf.write_all(data)?;
    }

    for (name, data) in resources {
        ensure_flat(name)?;
        zf.start_file(name.as_str(), options)?;
        zf.write_all(data)?;
    }

    let writer = zf.finish()?;

    Ok(writer.into_inner())
}

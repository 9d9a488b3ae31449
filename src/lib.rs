// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signed Apple Wallet pass issuance.
//!
//! This crate produces `.pkpass` bundles describing vehicles: a JSON pass
//! definition, a SHA-1 content digest manifest covering every bundled file,
//! a detached RFC 5652 / PKCS#7 signature over that manifest produced with
//! a PKCS#12 signing identity, and the pass images, packaged as a single
//! flat zip archive that wallet applications accept as validly signed.
//!
//! The pipeline is exposed both as a library and as the `passissuer` HTTP
//! service binary:
//!
//! * `credentials` resolves a (certificate, private key) pair from a
//!   base64 PKCS#12 container, disambiguating containers that bundle
//!   intermediate CA certificates next to the signing leaf.
//! * `manifest` digests every finalized bundle resource.
//! * `signing` signs the manifest bytes with fixed signed attributes
//!   (content-type, message-digest, signing-time) and SHA-1 digesting, as
//!   the consuming wallet format mandates.
//! * `pass` assembles the pass definition from caller fields via a
//!   declarative layout table.
//! * `bundle` packages everything into the flat archive.
//! * `issuer` runs the whole pipeline for one request.
//!
//! Requests are independent units of work: no shared mutable state exists
//! between concurrent invocations, and any stage failure aborts the request
//! without emitting a partial bundle.

mod assets;
pub use assets::*;
mod bundle;
pub use bundle::*;
pub mod config;
mod credentials;
pub use credentials::*;
mod error;
pub use error::*;
mod issuer;
pub use issuer::*;
mod manifest;
pub use manifest::*;
mod pass;
pub use pass::*;
pub mod server;
mod signing;
pub use signing::*;

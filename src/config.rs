// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process configuration.
//!
//! All environment access happens here, once, at startup. The resulting
//! [IssuerConfig] is passed explicitly to the components that need it;
//! nothing else in the crate reads ambient process state.

use {crate::error::PassIssuerError, std::path::PathBuf};

/// Organization display name embedded in every pass.
pub const ORGANIZATION_NAME: &str = "Example Motors";

/// Apple pass type identifier this service issues passes for.
pub const PASS_TYPE_IDENTIFIER: &str = "pass.com.example.vehicle";

/// Apple developer team identifier owning the pass type.
pub const TEAM_IDENTIFIER: &str = "Y5K8WQ3J7F";

/// Subject common name identifying the pass signing certificate.
///
/// Production signing containers commonly bundle an intermediate CA
/// certificate next to the signing leaf. This value disambiguates which
/// certificate is the signer.
pub const SIGNER_COMMON_NAME: &str = "Pass Type ID: pass.com.example.vehicle";

/// Configuration resolved once at process start.
#[derive(Clone, Debug)]
pub struct IssuerConfig {
    /// Base64-encoded PKCS#12 container holding the signing identity.
    pub p12_base64: String,

    /// Password for the PKCS#12 container. May be empty.
    pub p12_password: String,

    /// Optional URL of a logo image fetched per request in place of the
    /// static `logo.png` asset.
    pub logo_url: Option<String>,

    /// Directory holding the static pass images.
    pub assets_dir: PathBuf,

    /// Socket address the HTTP server binds to.
    pub bind: String,
}

impl IssuerConfig {
    /// Resolve configuration from process environment variables.
    pub fn from_env() -> Result<Self, PassIssuerError> {
        let p12_base64 = std::env::var("PASSKIT_P12_BASE64")
            .map_err(|_| PassIssuerError::MissingEnvironment("PASSKIT_P12_BASE64"))?;

        Ok(Self {
            p12_base64,
            p12_password: std::env::var("PASSKIT_P12_PASSWORD").unwrap_or_default(),
            logo_url: std::env::var("PASSKIT_LOGO_URL").ok().filter(|v| !v.is_empty()),
            assets_dir: std::env::var("PASSKIT_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets")),
            bind: std::env::var("PASSKIT_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
        })
    }
}

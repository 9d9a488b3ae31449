// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    cryptographic_message_syntax::CmsError, thiserror::Error,
    x509_certificate::X509CertificateError,
};

/// Unified error type for pass issuance.
#[derive(Debug, Error)]
pub enum PassIssuerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required environment variable: {0}")]
    MissingEnvironment(&'static str),

    #[error("base64 decode of signing container failed: {0}")]
    ContainerBase64(#[from] base64::DecodeError),

    #[error("error parsing signing container: {0}")]
    ContainerParse(String),

    #[error("incorrect password for signing container")]
    ContainerBadPassword,

    #[error("no certificate found in signing container")]
    NoSigningCertificate,

    #[error("no private key found in signing container")]
    NoSigningKey,

    #[error("no certificate in signing container matches an enclosed private key")]
    NoMatchingKeyPair,

    #[error("X.509 certificate handler error: {0}")]
    X509(#[from] X509CertificateError),

    #[error("CMS error: {0}")]
    Cms(#[from] CmsError),

    #[error("error encoding signature: {0}")]
    SignatureEncode(String),

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("missing required identity field: {0}")]
    MissingIdentityField(&'static str),

    #[error("unable to read asset {name}: {source}")]
    AssetRead {
        name: String,
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("fetching remote asset {name} returned HTTP {status}")]
    AssetFetch { name: String, status: u16 },

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("bundle entry name is not flat: {0}")]
    NestedEntryName(String),
}

impl PassIssuerError {
    /// Stable error taxonomy label surfaced alongside the message.
    ///
    /// Diagnostic text never includes certificate or key material, so both
    /// the kind and the rendered message are safe to return to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingEnvironment(_) => "config",
            Self::ContainerBase64(_)
            | Self::ContainerParse(_)
            | Self::ContainerBadPassword
            | Self::NoSigningCertificate
            | Self::NoSigningKey
            | Self::NoMatchingKeyPair => "credential",
            Self::X509(_) | Self::Cms(_) | Self::SignatureEncode(_) => "signing",
            Self::Io(_) | Self::AssetRead { .. } | Self::Reqwest(_) | Self::AssetFetch { .. } => {
                "asset"
            }
            Self::Zip(_) | Self::NestedEntryName(_) => "packaging",
            Self::SerdeJson(_) => "packaging",
            Self::MissingIdentityField(_) => "input",
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The pass issuance pipeline.
//!
//! Each invocation is an independent unit of work over its inputs: the
//! signing credential is re-resolved from the configured container, the
//! resource set is finalized (including any remote logo fetch) before the
//! manifest is computed, and every stage failure aborts the request with no
//! partial bundle.

use {
    crate::{
        assets::{fetch_remote_logo, StaticAssets, LOGO},
        bundle::{write_bundle, IssuedPass, PASS_ENTRY},
        config::{IssuerConfig, SIGNER_COMMON_NAME},
        credentials::resolve_signing_credential,
        error::PassIssuerError,
        manifest::DigestManifest,
        pass::{PassDefinition, PassFields},
        signing::sign_manifest,
    },
    log::info,
};

/// Issue a signed pass bundle for the given vehicle fields.
pub async fn issue_pass(
    config: &IssuerConfig,
    assets: &StaticAssets,
    client: &reqwest::Client,
    fields: &PassFields,
) -> Result<IssuedPass, PassIssuerError> {
    // Reject before any credential or signing work happens.
    let serial_number = fields
        .serial_number()
        .ok_or(PassIssuerError::MissingIdentityField("vin"))?
        .to_string();

    let definition_data = PassDefinition::build(fields, &serial_number).to_json()?;

    let mut resources = assets.to_resources();

    // The manifest needs final bytes, so a remote logo is acquired before
    // any digest is computed. A caller-supplied URL wins over the
    // configured one.
    let logo_url = fields.logo_url.as_deref().or(config.logo_url.as_deref());
    if let Some(url) = logo_url {
        resources.insert(LOGO.to_string(), fetch_remote_logo(client, url).await?);
    }

    let mut manifest = DigestManifest::default();
    manifest.insert(PASS_ENTRY, &definition_data);
    for (name, data) in &resources {
        manifest.insert(name, data);
    }
    let manifest_data = manifest.to_json()?;

    let credential = resolve_signing_credential(
        &config.p12_base64,
        &config.p12_password,
        SIGNER_COMMON_NAME,
    )?;
    let signature = sign_manifest(&manifest_data, &credential)?;

    let data = write_bundle(&definition_data, &manifest_data, &signature, &resources)?;

    info!(
        "issued pass {} ({} entries, {} bytes)",
        serial_number,
        manifest.len() + 2,
        data.len()
    );

    Ok(IssuedPass {
        serial_number,
        data,
    })
}

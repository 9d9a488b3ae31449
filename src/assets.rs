// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pass image acquisition.
//!
//! Static images are read once at process start from the configured assets
//! directory. A logo may additionally be fetched over HTTP per request,
//! replacing the static `logo.png` under the same bundle entry name so the
//! manifest and archive stay in agreement.

use {
    crate::error::PassIssuerError,
    log::{info, warn},
    std::{collections::BTreeMap, path::Path},
};

pub const ICON: &str = "icon.png";
pub const ICON_2X: &str = "icon@2x.png";
pub const LOGO: &str = "logo.png";
pub const STRIP: &str = "strip.png";

/// Every image the bundle ships, by entry name.
pub const STATIC_ASSET_NAMES: &[&str] = &[ICON, ICON_2X, LOGO, STRIP];

/// Static pass images loaded at startup.
///
/// Immutable after load; shared across concurrent requests.
#[derive(Clone, Debug, Default)]
pub struct StaticAssets {
    entries: BTreeMap<String, Vec<u8>>,
}

impl StaticAssets {
    /// Read all static images from a directory.
    ///
    /// Every name in [STATIC_ASSET_NAMES] must be present and readable;
    /// a bundle missing a manifest-covered image is invalid to consumers,
    /// so absence is a startup failure rather than a per-request one.
    pub fn load(dir: &Path) -> Result<Self, PassIssuerError> {
        let mut entries = BTreeMap::new();

        for name in STATIC_ASSET_NAMES {
            let path = dir.join(name);
            let data = std::fs::read(&path).map_err(|source| PassIssuerError::AssetRead {
                name: name.to_string(),
                source,
            })?;

            if data.is_empty() {
                warn!("static asset {} is empty", path.display());
            }

            entries.insert(name.to_string(), data);
        }

        info!("loaded {} static pass images from {}", entries.len(), dir.display());

        Ok(Self { entries })
    }

    /// Clone the loaded images into a per-request resource set.
    pub fn to_resources(&self) -> BTreeMap<String, Vec<u8>> {
        self.entries.clone()
    }
}

/// Fetch a logo override from a remote URL.
///
/// Any transport failure or non-2xx response aborts the request; a pass is
/// never issued with a partially acquired resource set.
pub async fn fetch_remote_logo(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<u8>, PassIssuerError> {
    info!("fetching logo from {}", url);

    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PassIssuerError::AssetFetch {
            name: LOGO.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod test {
    use super::*;

    fn write_assets(dir: &Path) {
        for name in STATIC_ASSET_NAMES {
            std::fs::write(dir.join(name), name.as_bytes()).unwrap();
        }
    }

    #[test]
    fn loads_every_static_image() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());

        let assets = StaticAssets::load(dir.path()).unwrap();
        let resources = assets.to_resources();

        assert_eq!(resources.len(), STATIC_ASSET_NAMES.len());
        assert_eq!(resources.get(ICON).unwrap(), ICON.as_bytes());
        assert_eq!(resources.get(STRIP).unwrap(), STRIP.as_bytes());
    }

    #[test]
    fn missing_image_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        std::fs::remove_file(dir.path().join(ICON_2X)).unwrap();

        let err = StaticAssets::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            PassIssuerError::AssetRead { ref name, .. } if name == ICON_2X
        ));
    }
}

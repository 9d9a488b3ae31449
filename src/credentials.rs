// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Signing credential extraction from PKCS#12 containers.
//!
//! PKCS#12 data is commonly encountered in `.p12` files, such as those
//! created when exporting a pass signing identity from Apple's `Keychain
//! Access` application. A container holds one or more certificates and
//! private keys; production exports frequently bundle the WWDR intermediate
//! CA certificate next to the signing leaf, so resolving "the" signing pair
//! requires an explicit selection policy rather than taking the first
//! certificate encountered.

use {
    crate::error::PassIssuerError,
    log::warn,
    x509_certificate::{CapturedX509Certificate, InMemorySigningKeyPair, Sign},
    zeroize::Zeroizing,
};

/// Bag type OID for an unshrouded PKCS#8 key (1.2.840.113549.1.12.10.1.1).
const OID_KEY_BAG: &[u64] = &[1, 2, 840, 113_549, 1, 12, 10, 1, 1];

/// A resolved signing identity: one certificate and its private key.
#[derive(Debug)]
pub struct SigningCredential {
    /// The pass signing certificate.
    pub certificate: CapturedX509Certificate,

    /// Private key matching the certificate's public key.
    pub private_key: InMemorySigningKeyPair,
}

/// Decode a base64 PKCS#12 container and resolve its signing credential.
///
/// The password may be the empty string if none was set when the container
/// was exported.
pub fn resolve_signing_credential(
    p12_base64: &str,
    password: &str,
    signer_common_name: &str,
) -> Result<SigningCredential, PassIssuerError> {
    // Exported base64 is often line wrapped; the decoder is not.
    let normalized = p12_base64
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    let data = Zeroizing::new(base64::decode(normalized)?);

    parse_signing_container(&data, password, signer_common_name)
}

/// Parse PKCS#12 data into a signing credential.
///
/// All certificate bags and key bags (both unshrouded and
/// password-shrouded) across the container's content sections are
/// enumerated, then a single credential is chosen by `select_credential`.
pub fn parse_signing_container(
    data: &[u8],
    password: &str,
    signer_common_name: &str,
) -> Result<SigningCredential, PassIssuerError> {
    let pfx = p12::PFX::parse(data).map_err(|e| {
        PassIssuerError::ContainerParse(format!("data does not appear to be PKCS#12: {:?}", e))
    })?;

    if !pfx.verify_mac(password) {
        return Err(PassIssuerError::ContainerBadPassword);
    }

    // The outer authenticated safe is regular data content with inner
    // ContentInfo sections holding the keys and certificates.
    let data = match pfx.auth_safe {
        p12::ContentInfo::Data(data) => data,
        _ => {
            return Err(PassIssuerError::ContainerParse(
                "unexpected outer PKCS#12 content info".to_string(),
            ));
        }
    };

    let content_infos = yasna::parse_der(&data, |reader| {
        reader.collect_sequence_of(p12::ContentInfo::parse)
    })
    .map_err(|e| {
        PassIssuerError::ContainerParse(format!("failed parsing inner ContentInfo: {:?}", e))
    })?;

    let bmp_password = bmp_string(password);

    let mut certificates = vec![];
    let mut keys = vec![];

    for content in content_infos {
        let bags_data = match content {
            p12::ContentInfo::Data(inner) => inner,
            p12::ContentInfo::EncryptedData(encrypted) => {
                encrypted.data(&bmp_password).ok_or_else(|| {
                    PassIssuerError::ContainerParse(
                        "failed decrypting inner EncryptedData; is the password correct?"
                            .to_string(),
                    )
                })?
            }
            p12::ContentInfo::OtherContext(_) => {
                return Err(PassIssuerError::ContainerParse(
                    "unexpected content section in PKCS#12 data".to_string(),
                ));
            }
        };

        let bags = yasna::parse_ber(&bags_data, |reader| {
            reader.collect_sequence_of(p12::SafeBag::parse)
        })
        .map_err(|e| {
            PassIssuerError::ContainerParse(format!("failed parsing SafeBag: {:?}", e))
        })?;

        for bag in bags {
            match bag.bag {
                p12::SafeBagKind::CertBag(cert_bag) => match cert_bag {
                    p12::CertBag::X509(cert_data) => {
                        certificates.push(CapturedX509Certificate::from_der(cert_data)?);
                    }
                    p12::CertBag::SDSI(_) => {
                        return Err(PassIssuerError::ContainerParse(
                            "unexpected SDSI certificate data".to_string(),
                        ));
                    }
                },
                p12::SafeBagKind::Pkcs8ShroudedKeyBag(key_bag) => {
                    let decrypted = Zeroizing::new(key_bag.decrypt(&bmp_password).ok_or_else(
                        || {
                            PassIssuerError::ContainerParse(
                                "error decrypting PKCS#8 shrouded key bag; is the password correct?"
                                    .to_string(),
                            )
                        },
                    )?);

                    keys.push(InMemorySigningKeyPair::from_pkcs8_der(&decrypted[..])?);
                }
                p12::SafeBagKind::OtherBagKind(other) => {
                    if other.bag_id == yasna::models::ObjectIdentifier::from_slice(OID_KEY_BAG) {
                        keys.push(InMemorySigningKeyPair::from_pkcs8_der(&other.bag_value)?);
                    } else {
                        warn!("ignoring unrecognized safe bag in signing container");
                    }
                }
            }
        }
    }

    select_credential(certificates, keys, signer_common_name)
}

/// Choose the signing pair from the enumerated certificates and keys.
///
/// Certificates are paired with keys by public key equality. With multiple
/// paired certificates, one whose subject common name matches
/// `signer_common_name` wins; otherwise the first paired certificate in
/// enumeration order is used.
fn select_credential(
    mut certificates: Vec<CapturedX509Certificate>,
    mut keys: Vec<InMemorySigningKeyPair>,
    signer_common_name: &str,
) -> Result<SigningCredential, PassIssuerError> {
    if certificates.is_empty() {
        return Err(PassIssuerError::NoSigningCertificate);
    }
    if keys.is_empty() {
        return Err(PassIssuerError::NoSigningKey);
    }

    let paired = certificates
        .iter()
        .enumerate()
        .filter_map(|(cert_index, cert)| {
            keys.iter()
                .position(|key| key.public_key_data() == cert.public_key_data())
                .map(|key_index| (cert_index, key_index))
        })
        .collect::<Vec<_>>();

    if paired.is_empty() {
        return Err(PassIssuerError::NoMatchingKeyPair);
    }

    let (cert_index, key_index) = paired
        .iter()
        .find(|(cert_index, _)| {
            certificates[*cert_index]
                .subject_common_name()
                .map_or(false, |cn| cn == signer_common_name)
        })
        .copied()
        .unwrap_or(paired[0]);

    Ok(SigningCredential {
        certificate: certificates.swap_remove(cert_index),
        private_key: keys.swap_remove(key_index),
    })
}

/// Encode a password in the UCS-2 big-endian form PKCS#12 key derivation uses.
fn bmp_string(s: &str) -> Vec<u8> {
    let utf16: Vec<u16> = s.encode_utf16().collect();

    let mut bytes = Vec::with_capacity(utf16.len() * 2 + 2);
    for c in utf16 {
        bytes.push((c / 256) as u8);
        bytes.push((c % 256) as u8);
    }
    bytes.push(0x00);
    bytes.push(0x00);

    bytes
}

#[cfg(test)]
mod test {
    use super::*;

    const SIGNER_P12: &[u8] = include_bytes!("testdata/pass-signer.p12");
    const SIGNER_CHAIN_P12: &[u8] = include_bytes!("testdata/pass-signer-chain.p12");
    const SIGNER_KEY_PKCS8: &[u8] = include_bytes!("testdata/pass-signer-key.pk8");
    const SIGNER_CERT_PEM: &[u8] = include_bytes!("testdata/pass-signer-cert.pem");
    const CA_CERT_PEM: &[u8] = include_bytes!("testdata/intermediate-ca-cert.pem");

    const PASSWORD: &str = "password123";
    const COMMON_NAME: &str = "Pass Type ID: pass.com.example.vehicle";

    #[test]
    fn single_identity_container() {
        let credential = parse_signing_container(SIGNER_P12, PASSWORD, COMMON_NAME).unwrap();

        assert_eq!(
            credential.certificate.subject_common_name().as_deref(),
            Some(COMMON_NAME)
        );
        assert_eq!(
            credential.private_key.public_key_data(),
            credential.certificate.public_key_data()
        );
    }

    #[test]
    fn bad_password_rejected() {
        let err = parse_signing_container(SIGNER_P12, "not-the-password", COMMON_NAME).unwrap_err();
        assert!(matches!(err, PassIssuerError::ContainerBadPassword));
    }

    #[test]
    fn chain_container_selects_keyed_leaf() {
        // The container bundles an intermediate CA certificate next to the
        // leaf. The resolved certificate must be the one with a key.
        let credential = parse_signing_container(SIGNER_CHAIN_P12, PASSWORD, COMMON_NAME).unwrap();

        assert_eq!(
            credential.certificate.subject_common_name().as_deref(),
            Some(COMMON_NAME)
        );
        assert_eq!(
            credential.private_key.public_key_data(),
            credential.certificate.public_key_data()
        );
    }

    #[test]
    fn chain_container_without_cn_hint_still_pairs_by_key() {
        let credential =
            parse_signing_container(SIGNER_CHAIN_P12, PASSWORD, "Some Other Identity").unwrap();

        assert_eq!(
            credential.private_key.public_key_data(),
            credential.certificate.public_key_data()
        );
    }

    #[test]
    fn empty_inputs_are_distinct_errors() {
        let err = select_credential(vec![], vec![], COMMON_NAME).unwrap_err();
        assert!(matches!(err, PassIssuerError::NoSigningCertificate));

        let cert = CapturedX509Certificate::from_pem(CA_CERT_PEM).unwrap();
        let err = select_credential(vec![cert], vec![], COMMON_NAME).unwrap_err();
        assert!(matches!(err, PassIssuerError::NoSigningKey));
    }

    #[test]
    fn pairing_is_by_public_key_not_position() {
        // CA first in enumeration order; the leaf still wins because it is
        // the certificate the key matches.
        let ca = CapturedX509Certificate::from_pem(CA_CERT_PEM).unwrap();
        let leaf = CapturedX509Certificate::from_pem(SIGNER_CERT_PEM).unwrap();
        let key = InMemorySigningKeyPair::from_pkcs8_der(SIGNER_KEY_PKCS8).unwrap();

        let credential = select_credential(vec![ca, leaf], vec![key], "ignored").unwrap();
        assert_eq!(
            credential.certificate.subject_common_name().as_deref(),
            Some(COMMON_NAME)
        );
    }

    #[test]
    fn key_without_matching_certificate_is_an_error() {
        // The intermediate CA certificate does not correspond to the leaf
        // signing key.
        let cert = CapturedX509Certificate::from_pem(CA_CERT_PEM).unwrap();
        let key = InMemorySigningKeyPair::from_pkcs8_der(SIGNER_KEY_PKCS8).unwrap();

        let err = select_credential(vec![cert], vec![key], COMMON_NAME).unwrap_err();
        assert!(matches!(err, PassIssuerError::NoMatchingKeyPair));
    }

    #[test]
    fn bmp_strings_are_ucs2_with_terminator() {
        assert_eq!(bmp_string(""), vec![0x00, 0x00]);
        assert_eq!(
            bmp_string("hi"),
            vec![0x00, b'h', 0x00, b'i', 0x00, 0x00]
        );
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detached CMS signature over the digest manifest.
//!
//! Produces an RFC 5652 `SignedData` structure with a single signer and the
//! manifest content omitted (detached). The signed attributes are exactly
//! `content-type` (id-data), `message-digest` (SHA-1 of the manifest bytes)
//! and `signing-time`. SHA-1 is fixed by the consuming wallet application's
//! format; it is not a tunable.
//!
//! The attributes are pushed in an order that coincides with DER SET OF
//! ordering (the attribute OIDs differ only in their final byte), so the
//! serialized signed attributes are valid DER as emitted.

use {
    crate::{credentials::SigningCredential, error::PassIssuerError},
    bcder::{
        encode::{PrimitiveContent, Values},
        Captured, Mode, Oid,
    },
    bytes::Bytes,
    cryptographic_message_syntax::asn1::rfc5652::{
        CertificateChoices, CertificateSet, CmsVersion,
        DigestAlgorithmIdentifier, DigestAlgorithmIdentifiers, EncapsulatedContentInfo,
        IssuerAndSerialNumber, SignatureAlgorithmIdentifier, SignatureValue, SignedAttributes,
        SignedData, SignerIdentifier, SignerInfo, SignerInfos, OID_CONTENT_TYPE, OID_ID_DATA,
        OID_MESSAGE_DIGEST, OID_SIGNING_TIME,
    },
    sha1::{Digest, Sha1},
    x509_certificate::{
        asn1time::UtcTime,
        rfc5652::{Attribute, AttributeValue},
        Sign,
    },
};

/// SHA-1 digest algorithm identifier (1.3.14.3.2.26).
const OID_SHA1: &[u8] = &[0x2b, 0x0e, 0x03, 0x02, 0x1a];

fn sha1_algorithm_identifier() -> DigestAlgorithmIdentifier {
    DigestAlgorithmIdentifier {
        algorithm: Oid(Bytes::copy_from_slice(OID_SHA1)),
        parameters: None,
    }
}

/// Produce a DER-encoded detached `SignedData` over manifest bytes.
///
/// The signer's certificate is embedded so verifiers do not need an
/// external certificate store. Because `signing-time` is included, two
/// signatures over identical manifest bytes differ while both verifying.
pub fn sign_manifest(
    manifest_data: &[u8],
    credential: &SigningCredential,
) -> Result<Vec<u8>, PassIssuerError> {
    let mut signed_attributes = SignedAttributes::default();

    signed_attributes.push(Attribute {
        typ: Oid(Bytes::copy_from_slice(OID_CONTENT_TYPE.as_ref())),
        values: vec![AttributeValue::new(Captured::from_values(
            Mode::Der,
            Oid(Bytes::copy_from_slice(OID_ID_DATA.as_ref())).encode_ref(),
        ))],
    });

    let manifest_digest = Sha1::digest(manifest_data);
    signed_attributes.push(Attribute {
        typ: Oid(Bytes::copy_from_slice(OID_MESSAGE_DIGEST.as_ref())),
        values: vec![AttributeValue::new(Captured::from_values(
            Mode::Der,
            manifest_digest.as_slice().encode(),
        ))],
    });

    signed_attributes.push(Attribute {
        typ: Oid(Bytes::copy_from_slice(OID_SIGNING_TIME.as_ref())),
        values: vec![AttributeValue::new(Captured::from_values(
            Mode::Der,
            UtcTime::now().encode(),
        ))],
    });

    let mut signer_info = SignerInfo {
        version: CmsVersion::V1,
        sid: SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
            issuer: credential.certificate.issuer_name().clone(),
            serial_number: credential.certificate.serial_number_asn1().clone(),
        }),
        digest_algorithm: sha1_algorithm_identifier(),
        signed_attributes: Some(signed_attributes),
        signature_algorithm: SignatureAlgorithmIdentifier {
            algorithm: credential.private_key.signature_algorithm()?.into(),
            parameters: None,
        },
        signature: SignatureValue::new(Bytes::new()),
        unsigned_attributes: None,
        signed_attributes_data: None,
    };

    // Detached signing: the signature covers only the EXPLICIT SET OF DER
    // of the signed attributes, which transitively bind the manifest via
    // the message-digest attribute.
    let signed_content = signer_info
        .signed_attributes_digested_content()
        .map_err(|e| PassIssuerError::SignatureEncode(e.to_string()))?
        .ok_or_else(|| {
            PassIssuerError::SignatureEncode("signed attributes are absent".to_string())
        })?;

    let (signature, _) = credential.private_key.sign(&signed_content)?;
    signer_info.signature = SignatureValue::new(Bytes::from(signature));

    let mut digest_algorithms = DigestAlgorithmIdentifiers::default();
    digest_algorithms.push(sha1_algorithm_identifier());

    let mut certificates = CertificateSet::default();
    certificates.push(CertificateChoices::Certificate(Box::new(
        credential.certificate.clone().into(),
    )));

    let mut signer_infos = SignerInfos::default();
    signer_infos.push(signer_info);

    let signed_data = SignedData {
        version: CmsVersion::V1,
        digest_algorithms,
        content_info: EncapsulatedContentInfo {
            content_type: Oid(Bytes::copy_from_slice(OID_ID_DATA.as_ref())),
            content: None,
        },
        certificates: Some(certificates),
        crls: None,
        signer_infos,
    };

    let mut der = Vec::new();
    signed_data
        .encode_ref()
        .write_encoded(Mode::Der, &mut der)
        .map_err(|e| PassIssuerError::SignatureEncode(e.to_string()))?;

    Ok(der)
}

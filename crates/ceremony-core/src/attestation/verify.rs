//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Cryptographic verification of a decoded attestation envelope: chain
//! construction against the pinned root, certificate validity windows and
//! signatures, and the final COSE_Sign1 signature itself.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ceremony_types::attestation::{AttestationDocument, AttestationEnvelope, COSE_ALG_ES384};
use der::{Decode, Encode};
use p384::ecdsa::{Signature, VerifyingKey};
use signature::Verifier;
use x509_cert::Certificate;

use super::cbor::{decode_protected_header_alg, encode_sig_structure};
use crate::error::AttestationError;

/// Runs the full five-step verification procedure against a pinned root
/// certificate and a reference clock.
pub fn verify(
    envelope: &AttestationEnvelope,
    document: &AttestationDocument,
    pinned_root_der: &[u8],
    now: SystemTime,
) -> Result<(), AttestationError> {
    let alg = decode_protected_header_alg(&envelope.protected_header)?;
    if alg != COSE_ALG_ES384 {
        return Err(AttestationError::UnsupportedAlgorithm(alg));
    }

    let chain = build_chain(document)?;
    let root_der = chain
        .last()
        .expect("build_chain never returns an empty chain")
        .to_der()
        .map_err(|e| AttestationError::InvalidField(format!("re-encoding root: {e}")))?;
    if root_der != pinned_root_der {
        return Err(AttestationError::ChainDoesNotTerminateAtRoot);
    }

    let now_unix = now.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);

    for (position, pair) in chain.windows(2).enumerate() {
        let child = &pair[0];
        let issuer = &pair[1];

        if cert_name_der(child, Name::Issuer)? != cert_name_der(issuer, Name::Subject)? {
            return Err(AttestationError::IssuerMismatch(position));
        }
        check_validity(child, now_unix, position)?;
        verify_cert_signature(child, issuer, position)?;
    }

    let root_position = chain.len() - 1;
    check_validity(&chain[root_position], now_unix, root_position)?;

    verify_cose_signature(
        &envelope.protected_header,
        &envelope.payload,
        &envelope.signature,
        leaf_public_key_bytes(&chain[0])?,
    )
}

/// Builds `[leaf, intermediates in reversed order]` so each element is
/// immediately followed by its issuer. `cabundle` is
/// stored root-first, so reversing it lands the root last.
fn build_chain(document: &AttestationDocument) -> Result<Vec<Certificate>, AttestationError> {
    let leaf = Certificate::from_der(&document.certificate)
        .map_err(|e| AttestationError::InvalidField(format!("leaf certificate: {e}")))?;
    let mut chain = Vec::with_capacity(1 + document.cabundle.len());
    chain.push(leaf);
    for der_bytes in document.cabundle.iter().rev() {
        let cert = Certificate::from_der(der_bytes)
            .map_err(|e| AttestationError::InvalidField(format!("intermediate certificate: {e}")))?;
        chain.push(cert);
    }
    Ok(chain)
}

enum Name {
    Issuer,
    Subject,
}

fn cert_name_der(cert: &Certificate, which: Name) -> Result<Vec<u8>, AttestationError> {
    let name = match which {
        Name::Issuer => &cert.tbs_certificate.issuer,
        Name::Subject => &cert.tbs_certificate.subject,
    };
    name.to_der()
        .map_err(|e| AttestationError::InvalidField(format!("re-encoding name: {e}")))
}

fn check_validity(cert: &Certificate, now: Duration, position: usize) -> Result<(), AttestationError> {
    let not_before = cert.tbs_certificate.validity.not_before.to_unix_duration();
    let not_after = cert.tbs_certificate.validity.not_after.to_unix_duration();
    if now < not_before || now > not_after {
        return Err(AttestationError::ValidityWindow(position));
    }
    Ok(())
}

fn leaf_public_key_bytes(cert: &Certificate) -> Result<&[u8], AttestationError> {
    cert.tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .as_bytes()
        .ok_or_else(|| AttestationError::InvalidField("public key bit string is not byte-aligned".into()))
}

fn verify_cert_signature(
    child: &Certificate,
    issuer: &Certificate,
    position: usize,
) -> Result<(), AttestationError> {
    let tbs_bytes = child
        .tbs_certificate
        .to_der()
        .map_err(|e| AttestationError::InvalidField(format!("re-encoding tbs certificate: {e}")))?;
    let signature_bytes = child
        .signature
        .as_bytes()
        .ok_or_else(|| AttestationError::CertSignatureInvalid(position))?;
    let signature =
        Signature::from_der(signature_bytes).map_err(|_| AttestationError::CertSignatureInvalid(position))?;
    let issuer_key = VerifyingKey::from_sec1_bytes(leaf_public_key_bytes(issuer)?)
        .map_err(|_| AttestationError::CertSignatureInvalid(position))?;
    issuer_key
        .verify(&tbs_bytes, &signature)
        .map_err(|_| AttestationError::CertSignatureInvalid(position))
}

/// Reconstructs the COSE `Sig_structure`, converts the raw `r‖s` signature
/// to ASN.1 DER, and verifies under the leaf's P-384 public key
///. Split out from [`verify`] so the crypto-sensitive
/// core is directly testable without a full certificate chain fixture.
pub(crate) fn verify_cose_signature(
    protected_header: &[u8],
    payload: &[u8],
    raw_signature: &[u8],
    leaf_public_key_sec1: &[u8],
) -> Result<(), AttestationError> {
    let sig_structure = encode_sig_structure(protected_header, payload);
    let signature = raw_rs_to_der_signature(raw_signature)?;
    let verifying_key = VerifyingKey::from_sec1_bytes(leaf_public_key_sec1)
        .map_err(|_| AttestationError::SignatureInvalid)?;
    verifying_key
        .verify(&sig_structure, &signature)
        .map_err(|_| AttestationError::SignatureInvalid)
}

/// Converts a raw `r || s` P-384 signature (48 bytes each) into a DER
/// `Signature`: strip leading zero bytes from each integer, then re-prepend
/// a single zero byte if the remaining high bit is set.
fn raw_rs_to_der_signature(raw: &[u8]) -> Result<Signature, AttestationError> {
    if raw.len() != 96 {
        return Err(AttestationError::InvalidField(format!(
            "expected a 96-byte r||s signature, got {}",
            raw.len()
        )));
    }
    let (r, s) = raw.split_at(48);
    let der_bytes = encode_der_sequence_of_two_integers(r, s);
    Signature::from_der(&der_bytes).map_err(|_| AttestationError::SignatureInvalid)
}

fn encode_der_integer(bytes: &[u8]) -> Vec<u8> {
    let mut trimmed = bytes;
    while trimmed.len() > 1 && trimmed[0] == 0 && trimmed[1] & 0x80 == 0 {
        trimmed = &trimmed[1..];
    }
    let mut content = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.first().map(|b| b & 0x80 != 0).unwrap_or(true) {
        content.push(0);
    }
    content.extend_from_slice(trimmed);

    let mut out = vec![0x02u8];
    append_der_length(&mut out, content.len());
    out.extend_from_slice(&content);
    out
}

fn append_der_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let len_bytes = len.to_be_bytes();
    let significant: Vec<u8> = len_bytes.iter().copied().skip_while(|&b| b == 0).collect();
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(&significant);
}

fn encode_der_sequence_of_two_integers(r: &[u8], s: &[u8]) -> Vec<u8> {
    let r_der = encode_der_integer(r);
    let s_der = encode_der_integer(s);
    let mut content = Vec::with_capacity(r_der.len() + s_der.len());
    content.extend_from_slice(&r_der);
    content.extend_from_slice(&s_der);

    let mut out = vec![0x30u8];
    append_der_length(&mut out, content.len());
    out.extend_from_slice(&content);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use p384::ecdsa::SigningKey;
    use rand_core::OsRng;
    use signature::Signer;

    fn raw_signature_for(signing_key: &SigningKey, message: &[u8]) -> [u8; 96] {
        let sig: Signature = signing_key.sign(message);
        let fixed = sig.to_bytes();
        let mut out = [0u8; 96];
        out.copy_from_slice(&fixed);
        out
    }

    #[test]
    fn verifies_a_well_formed_cose_signature() {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);
        let sec1 = verifying_key.to_encoded_point(false);

        let protected = b"protected-header";
        let payload = b"attestation-payload";
        let sig_structure = encode_sig_structure(protected, payload);
        let raw = raw_signature_for(&signing_key, &sig_structure);

        verify_cose_signature(protected, payload, &raw, sec1.as_bytes()).unwrap();
    }

    #[test]
    fn rejects_a_bit_flipped_signature() {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);
        let sec1 = verifying_key.to_encoded_point(false);

        let protected = b"protected-header";
        let payload = b"attestation-payload";
        let sig_structure = encode_sig_structure(protected, payload);
        let mut raw = raw_signature_for(&signing_key, &sig_structure);
        raw[0] ^= 0x01;

        assert!(verify_cose_signature(protected, payload, &raw, sec1.as_bytes()).is_err());
    }

    #[test]
    fn rejects_a_bit_flipped_payload() {
        let signing_key = SigningKey::random(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);
        let sec1 = verifying_key.to_encoded_point(false);

        let protected = b"protected-header";
        let payload = b"attestation-payload";
        let sig_structure = encode_sig_structure(protected, payload);
        let raw = raw_signature_for(&signing_key, &sig_structure);

        assert!(verify_cose_signature(protected, b"tampered-payload", &raw, sec1.as_bytes()).is_err());
    }

    #[test]
    fn rejects_wrong_signature_length() {
        let err = raw_rs_to_der_signature(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, AttestationError::InvalidField(_)));
    }

    #[test]
    fn der_integer_encoding_prepends_zero_for_high_bit() {
        let mut value = [0x80u8; 48];
        value[0] = 0x80;
        let der = encode_der_integer(&value);
        assert_eq!(der[0], 0x02);
        // Content length is 49: the original 48 bytes plus one padding zero.
        assert_eq!(der[1], 49);
        assert_eq!(der[2], 0x00);
    }

    #[test]
    fn der_integer_encoding_strips_leading_zeros() {
        let mut value = [0u8; 48];
        value[47] = 0x01;
        let der = encode_der_integer(&value);
        assert_eq!(der[0], 0x02);
        assert_eq!(der[1], 1);
        assert_eq!(der[2], 0x01);
    }

    #[test]
    fn der_sequence_round_trips_through_p384_signature() {
        let signing_key = SigningKey::random(&mut OsRng);
        let sig: Signature = signing_key.sign(b"hello");
        let fixed = sig.to_bytes();
        let (r, s) = fixed.split_at(48);
        let der_bytes = encode_der_sequence_of_two_integers(r, s);
        let parsed = Signature::from_der(&der_bytes).unwrap();
        assert_eq!(parsed.to_bytes().as_slice(), fixed.as_slice());
    }
}

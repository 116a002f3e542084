//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Structural CBOR/COSE decoding for the attestation envelope and payload.
//! The PCR map's integer-or-text key ambiguity is the reason this is
//! hand-decoded from `ciborium::Value` rather than derived.

use std::collections::BTreeMap;

use ceremony_types::attestation::{
    AttestationDocument, AttestationEnvelope, EXPECTED_DIGEST, MAX_CERTIFICATE_LEN, MAX_NONCE_LEN,
    MAX_PUBLIC_KEY_LEN, MAX_USER_DATA_LEN, PCR_INDEX_BOUND, VALID_PCR_LENGTHS,
};
use ciborium::Value;

use crate::error::AttestationError;

const COSE_SIGN1_TAG: u64 = 18;

/// Decodes the outer COSE_Sign1 four-tuple, unwrapping CBOR tag 18 if present.
/// The unprotected header (second element) is parsed but discarded.
pub fn decode_envelope(bytes: &[u8]) -> Result<AttestationEnvelope, AttestationError> {
    let value: Value = ciborium::de::from_reader(bytes)
        .map_err(|e| AttestationError::MalformedCbor(e.to_string()))?;
    let items = match unwrap_tag18(value) {
        Value::Array(items) if items.len() == 4 => items,
        _ => {
            return Err(AttestationError::MalformedCbor(
                "expected a 4-element COSE_Sign1 array".into(),
            ))
        }
    };

    let mut iter = items.into_iter();
    let protected_header = expect_bytes(iter.next().unwrap())?;
    let _unprotected = iter.next().unwrap();
    let payload = expect_bytes(iter.next().unwrap())?;
    let signature = expect_bytes(iter.next().unwrap())?;

    Ok(AttestationEnvelope {
        protected_header,
        payload,
        signature,
    })
}

fn unwrap_tag18(value: Value) -> Value {
    match value {
        Value::Tag(tag, inner) if tag == COSE_SIGN1_TAG => *inner,
        other => other,
    }
}

/// Decodes the protected header map and returns its `alg` (key 1) value.
pub fn decode_protected_header_alg(bytes: &[u8]) -> Result<i64, AttestationError> {
    let value: Value = ciborium::de::from_reader(bytes)
        .map_err(|e| AttestationError::MalformedCbor(e.to_string()))?;
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(AttestationError::MalformedCbor("protected header is not a map".into())),
    };

    for (k, v) in map {
        if matches!(&k, Value::Integer(i) if i128::from(*i) == 1) {
            return expect_i64(v);
        }
    }
    Err(AttestationError::InvalidField("alg".into()))
}

/// Decodes the payload map into an [`AttestationDocument`], enforcing the
/// mandatory-field and size-cap rules.
pub fn decode_payload(bytes: &[u8]) -> Result<AttestationDocument, AttestationError> {
    let value: Value = ciborium::de::from_reader(bytes)
        .map_err(|e| AttestationError::MalformedCbor(e.to_string()))?;
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(AttestationError::MalformedCbor("payload is not a map".into())),
    };

    let mut module_id = None;
    let mut timestamp_ms = None;
    let mut digest = None;
    let mut pcrs_raw = None;
    let mut certificate = None;
    let mut cabundle = None;
    let mut public_key = None;
    let mut user_data = None;
    let mut nonce = None;

    for (k, v) in map {
        let key = match k {
            Value::Text(s) => s,
            _ => continue,
        };
        match key.as_str() {
            "module_id" => module_id = Some(expect_text(v)?),
            "timestamp" => timestamp_ms = Some(expect_u64(v)?),
            "digest" => digest = Some(expect_text(v)?),
            "pcrs" => pcrs_raw = Some(v),
            "certificate" => certificate = Some(expect_bytes(v)?),
            "cabundle" => cabundle = Some(expect_bytes_array(v)?),
            "public_key" => public_key = expect_optional_bytes(v)?,
            "user_data" => user_data = expect_optional_bytes(v)?,
            "nonce" => nonce = expect_optional_bytes(v)?,
            _ => {}
        }
    }

    let module_id = module_id.ok_or_else(|| AttestationError::InvalidField("module_id".into()))?;
    let timestamp_ms =
        timestamp_ms.ok_or_else(|| AttestationError::InvalidField("timestamp".into()))?;
    let digest = digest.ok_or_else(|| AttestationError::InvalidField("digest".into()))?;
    if digest != EXPECTED_DIGEST {
        return Err(AttestationError::InvalidField(format!(
            "digest must be {EXPECTED_DIGEST}, got {digest}"
        )));
    }
    let pcrs = decode_pcrs(pcrs_raw.ok_or_else(|| AttestationError::InvalidField("pcrs".into()))?)?;
    let certificate =
        certificate.ok_or_else(|| AttestationError::InvalidField("certificate".into()))?;
    let cabundle = cabundle.ok_or_else(|| AttestationError::InvalidField("cabundle".into()))?;

    if certificate.is_empty() || certificate.len() > MAX_CERTIFICATE_LEN {
        return Err(AttestationError::InvalidField(
            "certificate length out of bounds".into(),
        ));
    }
    if cabundle.is_empty() {
        return Err(AttestationError::InvalidField("cabundle must not be empty".into()));
    }
    for entry in &cabundle {
        if entry.is_empty() || entry.len() > MAX_CERTIFICATE_LEN {
            return Err(AttestationError::InvalidField(
                "cabundle entry length out of bounds".into(),
            ));
        }
    }
    if let Some(pk) = &public_key {
        if pk.len() > MAX_PUBLIC_KEY_LEN {
            return Err(AttestationError::InvalidField("public_key exceeds max length".into()));
        }
    }
    if let Some(ud) = &user_data {
        if ud.len() > MAX_USER_DATA_LEN {
            return Err(AttestationError::InvalidField("user_data exceeds max length".into()));
        }
    }
    if let Some(n) = &nonce {
        if n.len() > MAX_NONCE_LEN {
            return Err(AttestationError::InvalidField("nonce exceeds max length".into()));
        }
    }

    Ok(AttestationDocument {
        module_id,
        timestamp_ms,
        digest,
        pcrs,
        certificate,
        cabundle,
        public_key,
        user_data,
        nonce,
    })
}

/// Normalizes either an integer-keyed or text-keyed PCR map into
/// `BTreeMap<u8, Vec<u8>>`, rejecting indices and lengths outside the
/// documented bounds.
fn decode_pcrs(value: Value) -> Result<BTreeMap<u8, Vec<u8>>, AttestationError> {
    let map = match value {
        Value::Map(m) => m,
        _ => return Err(AttestationError::InvalidField("pcrs is not a map".into())),
    };

    let mut out = BTreeMap::new();
    for (k, v) in map {
        let index: u64 = match k {
            Value::Integer(i) => u64::try_from(i128::from(i))
                .map_err(|_| AttestationError::InvalidField("pcr index out of range".into()))?,
            Value::Text(s) => s
                .parse::<u64>()
                .map_err(|_| AttestationError::InvalidField("pcr index not numeric".into()))?,
            _ => return Err(AttestationError::InvalidField("unsupported pcr key type".into())),
        };
        if index >= u64::from(PCR_INDEX_BOUND) {
            return Err(AttestationError::InvalidField(format!("pcr index {index} out of bounds")));
        }
        let bytes = expect_bytes(v)?;
        if !VALID_PCR_LENGTHS.contains(&bytes.len()) {
            return Err(AttestationError::InvalidField(format!(
                "pcr {index} has invalid length {}",
                bytes.len()
            )));
        }
        out.insert(index as u8, bytes);
    }
    if out.is_empty() {
        return Err(AttestationError::InvalidField("pcrs must not be empty".into()));
    }
    Ok(out)
}

/// Builds the COSE `Sig_structure` bytes: the CBOR array
/// `["Signature1", protected_header, h'', payload]`.
pub fn encode_sig_structure(protected_header: &[u8], payload: &[u8]) -> Vec<u8> {
    let value = Value::Array(vec![
        Value::Text("Signature1".to_string()),
        Value::Bytes(protected_header.to_vec()),
        Value::Bytes(Vec::new()),
        Value::Bytes(payload.to_vec()),
    ]);
    let mut out = Vec::new();
    ciborium::ser::into_writer(&value, &mut out).expect("encoding a Value cannot fail");
    out
}

fn expect_bytes(value: Value) -> Result<Vec<u8>, AttestationError> {
    match value {
        Value::Bytes(b) => Ok(b),
        _ => Err(AttestationError::MalformedCbor("expected a byte string".into())),
    }
}

fn expect_bytes_array(value: Value) -> Result<Vec<Vec<u8>>, AttestationError> {
    match value {
        Value::Array(items) => items.into_iter().map(expect_bytes).collect(),
        _ => Err(AttestationError::MalformedCbor("expected an array of byte strings".into())),
    }
}

fn expect_optional_bytes(value: Value) -> Result<Option<Vec<u8>>, AttestationError> {
    match value {
        Value::Null => Ok(None),
        Value::Bytes(b) if b.is_empty() => Ok(None),
        Value::Bytes(b) => Ok(Some(b)),
        _ => Err(AttestationError::MalformedCbor("expected a byte string or null".into())),
    }
}

fn expect_text(value: Value) -> Result<String, AttestationError> {
    match value {
        Value::Text(s) => Ok(s),
        _ => Err(AttestationError::MalformedCbor("expected a text string".into())),
    }
}

fn expect_u64(value: Value) -> Result<u64, AttestationError> {
    match value {
        Value::Integer(i) => u64::try_from(i128::from(i))
            .map_err(|_| AttestationError::InvalidField("expected a non-negative integer".into())),
        _ => Err(AttestationError::MalformedCbor("expected an integer".into())),
    }
}

fn expect_i64(value: Value) -> Result<i64, AttestationError> {
    match value {
        Value::Integer(i) => i64::try_from(i128::from(i))
            .map_err(|_| AttestationError::InvalidField("alg out of range".into())),
        _ => Err(AttestationError::MalformedCbor("expected an integer".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_envelope_bytes(protected: &[u8], payload: &[u8], sig: &[u8]) -> Vec<u8> {
        let value = Value::Array(vec![
            Value::Bytes(protected.to_vec()),
            Value::Map(vec![]),
            Value::Bytes(payload.to_vec()),
            Value::Bytes(sig.to_vec()),
        ]);
        let mut out = Vec::new();
        ciborium::ser::into_writer(&value, &mut out).unwrap();
        out
    }

    #[test]
    fn decodes_envelope_round_trip() {
        let raw = sample_envelope_bytes(b"ph", b"pl", b"sig-bytes");
        let envelope = decode_envelope(&raw).unwrap();
        assert_eq!(envelope.protected_header, b"ph");
        assert_eq!(envelope.payload, b"pl");
        assert_eq!(envelope.signature, b"sig-bytes");
    }

    #[test]
    fn decodes_envelope_wrapped_in_tag_18() {
        let inner = sample_envelope_bytes(b"ph", b"pl", b"sig");
        let inner_value: Value = ciborium::de::from_reader(inner.as_slice()).unwrap();
        let tagged = Value::Tag(18, Box::new(inner_value));
        let mut raw = Vec::new();
        ciborium::ser::into_writer(&tagged, &mut raw).unwrap();

        let envelope = decode_envelope(&raw).unwrap();
        assert_eq!(envelope.payload, b"pl");
    }

    #[test]
    fn rejects_wrong_length_array() {
        let value = Value::Array(vec![Value::Bytes(vec![])]);
        let mut raw = Vec::new();
        ciborium::ser::into_writer(&value, &mut raw).unwrap();
        assert!(decode_envelope(&raw).is_err());
    }

    #[test]
    fn decodes_alg_from_protected_header() {
        let header = Value::Map(vec![(Value::Integer(1.into()), Value::Integer((-35).into()))]);
        let mut raw = Vec::new();
        ciborium::ser::into_writer(&header, &mut raw).unwrap();
        assert_eq!(decode_protected_header_alg(&raw).unwrap(), -35);
    }

    fn sample_payload(pcrs: Value) -> Vec<u8> {
        let value = Value::Map(vec![
            (Value::Text("module_id".into()), Value::Text("mod-1".into())),
            (Value::Text("timestamp".into()), Value::Integer(1_700_000_000_000u64.into())),
            (Value::Text("digest".into()), Value::Text("SHA384".into())),
            (Value::Text("pcrs".into()), pcrs),
            (Value::Text("certificate".into()), Value::Bytes(vec![1, 2, 3])),
            (
                Value::Text("cabundle".into()),
                Value::Array(vec![Value::Bytes(vec![4, 5]), Value::Bytes(vec![6, 7])]),
            ),
        ]);
        let mut out = Vec::new();
        ciborium::ser::into_writer(&value, &mut out).unwrap();
        out
    }

    #[test]
    fn decodes_payload_with_integer_keyed_pcrs() {
        let pcrs = Value::Map(vec![(Value::Integer(0.into()), Value::Bytes(vec![0u8; 32]))]);
        let raw = sample_payload(pcrs);
        let doc = decode_payload(&raw).unwrap();
        assert_eq!(doc.module_id, "mod-1");
        assert_eq!(doc.pcrs.get(&0).unwrap().len(), 32);
        assert_eq!(doc.cabundle.len(), 2);
    }

    #[test]
    fn decodes_payload_with_text_keyed_pcrs() {
        let pcrs = Value::Map(vec![(Value::Text("0".into()), Value::Bytes(vec![0u8; 48]))]);
        let raw = sample_payload(pcrs);
        let doc = decode_payload(&raw).unwrap();
        assert_eq!(doc.pcrs.get(&0).unwrap().len(), 48);
    }

    #[test]
    fn rejects_pcr_with_invalid_length() {
        let pcrs = Value::Map(vec![(Value::Integer(0.into()), Value::Bytes(vec![0u8; 10]))]);
        let raw = sample_payload(pcrs);
        assert!(decode_payload(&raw).is_err());
    }

    #[test]
    fn rejects_pcr_index_out_of_bounds() {
        let pcrs = Value::Map(vec![(Value::Integer(32.into()), Value::Bytes(vec![0u8; 32]))]);
        let raw = sample_payload(pcrs);
        assert!(decode_payload(&raw).is_err());
    }

    #[test]
    fn rejects_empty_pcrs() {
        let pcrs = Value::Map(vec![]);
        let raw = sample_payload(pcrs);
        assert!(decode_payload(&raw).is_err());
    }

    #[test]
    fn rejects_digest_other_than_sha384() {
        let value = Value::Map(vec![
            (Value::Text("module_id".into()), Value::Text("mod-1".into())),
            (Value::Text("timestamp".into()), Value::Integer(1u64.into())),
            (Value::Text("digest".into()), Value::Text("SHA256".into())),
            (
                Value::Text("pcrs".into()),
                Value::Map(vec![(Value::Integer(0.into()), Value::Bytes(vec![0u8; 32]))]),
            ),
            (Value::Text("certificate".into()), Value::Bytes(vec![1])),
            (
                Value::Text("cabundle".into()),
                Value::Array(vec![Value::Bytes(vec![9])]),
            ),
        ]);
        let mut raw = Vec::new();
        ciborium::ser::into_writer(&value, &mut raw).unwrap();
        assert!(decode_payload(&raw).is_err());
    }

    #[test]
    fn rejects_empty_certificate() {
        let value = Value::Map(vec![
            (Value::Text("module_id".into()), Value::Text("mod-1".into())),
            (Value::Text("timestamp".into()), Value::Integer(1u64.into())),
            (Value::Text("digest".into()), Value::Text("SHA384".into())),
            (
                Value::Text("pcrs".into()),
                Value::Map(vec![(Value::Integer(0.into()), Value::Bytes(vec![0u8; 32]))]),
            ),
            (Value::Text("certificate".into()), Value::Bytes(vec![])),
            (
                Value::Text("cabundle".into()),
                Value::Array(vec![Value::Bytes(vec![9])]),
            ),
        ]);
        let mut raw = Vec::new();
        ciborium::ser::into_writer(&value, &mut raw).unwrap();
        assert!(decode_payload(&raw).is_err());
    }

    #[test]
    fn rejects_empty_cabundle() {
        let value = Value::Map(vec![
            (Value::Text("module_id".into()), Value::Text("mod-1".into())),
            (Value::Text("timestamp".into()), Value::Integer(1u64.into())),
            (Value::Text("digest".into()), Value::Text("SHA384".into())),
            (
                Value::Text("pcrs".into()),
                Value::Map(vec![(Value::Integer(0.into()), Value::Bytes(vec![0u8; 32]))]),
            ),
            (Value::Text("certificate".into()), Value::Bytes(vec![1])),
            (Value::Text("cabundle".into()), Value::Array(vec![])),
        ]);
        let mut raw = Vec::new();
        ciborium::ser::into_writer(&value, &mut raw).unwrap();
        assert!(decode_payload(&raw).is_err());
    }

    #[test]
    fn rejects_cabundle_entry_that_is_empty() {
        let value = Value::Map(vec![
            (Value::Text("module_id".into()), Value::Text("mod-1".into())),
            (Value::Text("timestamp".into()), Value::Integer(1u64.into())),
            (Value::Text("digest".into()), Value::Text("SHA384".into())),
            (
                Value::Text("pcrs".into()),
                Value::Map(vec![(Value::Integer(0.into()), Value::Bytes(vec![0u8; 32]))]),
            ),
            (Value::Text("certificate".into()), Value::Bytes(vec![1])),
            (
                Value::Text("cabundle".into()),
                Value::Array(vec![Value::Bytes(vec![9]), Value::Bytes(vec![])]),
            ),
        ]);
        let mut raw = Vec::new();
        ciborium::ser::into_writer(&value, &mut raw).unwrap();
        assert!(decode_payload(&raw).is_err());
    }

    #[test]
    fn empty_optional_bytes_decode_to_none() {
        let value = Value::Map(vec![
            (Value::Text("module_id".into()), Value::Text("mod-1".into())),
            (Value::Text("timestamp".into()), Value::Integer(1u64.into())),
            (Value::Text("digest".into()), Value::Text("SHA384".into())),
            (
                Value::Text("pcrs".into()),
                Value::Map(vec![(Value::Integer(0.into()), Value::Bytes(vec![0u8; 32]))]),
            ),
            (Value::Text("certificate".into()), Value::Bytes(vec![1])),
            (
                Value::Text("cabundle".into()),
                Value::Array(vec![Value::Bytes(vec![9])]),
            ),
            (Value::Text("nonce".into()), Value::Bytes(vec![])),
        ]);
        let mut raw = Vec::new();
        ciborium::ser::into_writer(&value, &mut raw).unwrap();
        let doc = decode_payload(&raw).unwrap();
        assert!(doc.nonce.is_none());
    }
}

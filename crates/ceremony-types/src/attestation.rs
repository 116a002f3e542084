//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Parsed attestation document and its COSE_Sign1 envelope.

use std::collections::BTreeMap;

/// Algorithm code point for ECDSA with SHA-384, as used in COSE protected headers.
pub const COSE_ALG_ES384: i64 = -35;

/// Digest name the attestation document must carry.
pub const EXPECTED_DIGEST: &str = "SHA384";

/// Upper bound (inclusive, exclusive range [0,32)) on a PCR index.
pub const PCR_INDEX_BOUND: u8 = 32;

/// Allowed PCR byte-string lengths.
pub const VALID_PCR_LENGTHS: [usize; 3] = [32, 48, 64];

pub const MAX_CERTIFICATE_LEN: usize = 1024;
pub const MAX_NONCE_LEN: usize = 64;
pub const MAX_USER_DATA_LEN: usize = 512;
pub const MAX_PUBLIC_KEY_LEN: usize = 1024;

/// The pinned TEE vendor root certificate (DER), compiled in rather than
/// fetched at runtime.
///
/// This placeholder is a zero-filled buffer of a plausible DER certificate
/// length, not a parseable certificate — see `DESIGN.md`. An operator must
/// replace it with the real AWS Nitro root certificate DER before this
/// binary verifies attestations against a live enclave.
pub const PINNED_ROOT_CERT_DER: &[u8] = &[0u8; 533];

/// The parsed payload of a TEE attestation document.
///
/// Produced by the Attestation Issuer and immutable once emitted. Structural
/// validity (field shapes, size caps) is enforced at construction time by
/// `ceremony-core::attestation::cbor`; this type itself carries no
/// constructor invariants beyond what the derive gives it, since the
/// dynamic (integer- or text-keyed) CBOR encoding of `pcrs` can only be
/// normalized by the decoder that has the raw CBOR in hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationDocument {
    pub module_id: String,
    pub timestamp_ms: u64,
    pub digest: String,
    pub pcrs: BTreeMap<u8, Vec<u8>>,
    pub certificate: Vec<u8>,
    /// Root-first ordered chain of intermediate DER certificates.
    pub cabundle: Vec<Vec<u8>>,
    pub public_key: Option<Vec<u8>>,
    pub user_data: Option<Vec<u8>>,
    pub nonce: Option<Vec<u8>>,
}

/// A COSE_Sign1 four-tuple, optionally CBOR-tag-18 wrapped on the wire.
///
/// The unprotected header map is intentionally not retained: it plays no
/// role in verification and is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationEnvelope {
    pub protected_header: Vec<u8>,
    pub payload: Vec<u8>,
    /// Raw `r || s` signature bytes over P-384.
    pub signature: Vec<u8>,
}

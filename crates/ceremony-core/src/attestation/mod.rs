//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! TEE attestation codec, verifier, and issuer client.

pub mod cbor;
pub mod issuer_client;
pub mod verify;

pub use issuer_client::IssuerClient;

use std::time::SystemTime;

use ceremony_types::attestation::AttestationDocument;

use crate::error::AttestationError;

/// Decodes raw CBOR bytes into a document and cryptographically verifies it
/// against `pinned_root_der`, in one call.
pub fn parse_and_verify(
    raw: &[u8],
    pinned_root_der: &[u8],
    now: SystemTime,
) -> Result<AttestationDocument, AttestationError> {
    let envelope = cbor::decode_envelope(raw)?;
    let document = cbor::decode_payload(&envelope.payload)?;
    verify::verify(&envelope, &document, pinned_root_der, now)?;
    Ok(document)
}

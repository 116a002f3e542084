//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Ceremony artifact names and the manifest entry type.

/// One line of the ceremony manifest: an artifact's path and its SHA-256 hex
/// digest, in the fixed order the manifest was built in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub path: String,
    pub sha256_hex: String,
}

/// The fixed, compile-time order of artifacts committed to by the manifest.
///
/// This is every artifact produced up to and including the export step,
/// excluding the manifest text itself (which commits to these) and the
/// final attestation (which commits to the manifest). Reordering this list
/// is a breaking change to every
/// ceremony's `finalAttestationNonce`.
pub const ARTIFACT_ORDER: &[&str] = &[
    "circuit.circom",
    "powersOfTau.ptau",
    "circuit_0000.zkey",
    "circuit.r1cs",
    "circuit.wasm",
    "time_attestation.cbor",
    "drand-beacon.json",
    "circuit_final.zkey",
    "verifier.sol",
    "verifier_bytecode.hex",
    "verifier_runtime.keccak256",
];

/// Filename the rendered manifest text is written under.
pub const MANIFEST_FILE_NAME: &str = "manifest.txt";

/// Filename the final attestation document is written under.
pub const FINAL_ATTESTATION_FILE_NAME: &str = "final_attestation.cbor";

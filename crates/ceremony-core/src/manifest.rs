//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Artifact commitment: hash-of-hashes manifest construction.
//!
//! The manifest text is hand-built with an explicit, locked field order —
//! no general-purpose serializer is trusted with it, since byte-for-byte
//! reproducibility is the contract (every external verifier recomputes
//! `hashOfHashes` and `finalAttestationNonce` from this exact text).

use std::fs;
use std::path::Path;

use ceremony_types::manifest::{ManifestEntry, ARTIFACT_ORDER};
use sha2::{Digest, Sha256};

use crate::error::ManifestError;

/// The built manifest: its entries in fixed order, the rendered text, and
/// the two derived commitments — the hash-of-hashes and the final
/// attestation nonce.
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    pub text: String,
    pub concatenated: String,
    pub final_attestation_nonce_hex: String,
}

/// Hashes every artifact in `ARTIFACT_ORDER` (found under `working_dir`) and
/// builds the manifest text and derived nonce.
pub fn build(working_dir: &Path) -> Result<Manifest, ManifestError> {
    let mut entries = Vec::with_capacity(ARTIFACT_ORDER.len());
    for &path in ARTIFACT_ORDER {
        let bytes = fs::read(working_dir.join(path))
            .map_err(|_| ManifestError::MissingArtifact(path.to_string()))?;
        entries.push(ManifestEntry {
            path: path.to_string(),
            sha256_hex: hex::encode(Sha256::digest(&bytes)),
        });
    }
    Ok(build_from_entries(entries))
}

/// Builds the manifest from already-hashed entries, in the order given.
/// Split out from [`build`] so artifact hashing and manifest assembly are
/// independently testable.
pub fn build_from_entries(entries: Vec<ManifestEntry>) -> Manifest {
    let concatenated: String = entries.iter().map(|e| e.sha256_hex.as_str()).collect();
    let final_attestation_nonce_hex = hex::encode(Sha256::digest(concatenated.as_bytes()));
    let text = render(&entries, &concatenated, &final_attestation_nonce_hex);
    Manifest {
        entries,
        text,
        concatenated,
        final_attestation_nonce_hex,
    }
}

/// One line per file (`path: hex-digest`), a blank line, then
/// `concatenated:` and `finalAttestationNonce:`. No trailing
/// newline after the final line — adding one changes the hash.
fn render(entries: &[ManifestEntry], concatenated: &str, nonce_hex: &str) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.path);
        out.push_str(": ");
        out.push_str(&entry.sha256_hex);
        out.push('\n');
    }
    out.push('\n');
    out.push_str("concatenated: ");
    out.push_str(concatenated);
    out.push('\n');
    out.push_str("finalAttestationNonce: ");
    out.push_str(nonce_hex);
    out
}

/// SHA-256 of the rendered manifest text, i.e. `hashOfHashes` — the final
/// attestation's `user_data`.
pub fn hash_of_hashes(manifest: &Manifest) -> String {
    hex::encode(Sha256::digest(manifest.text.as_bytes()))
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Subprocess client for the attestation issuer: positional
//! `[nonce_hex] [user_data_hex]` arguments, raw CBOR on stdout.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::AttestationError;

/// Invokes the platform's attestation issuer binary. Treated as opaque —
/// this client only knows its CLI contract, not its internals.
pub struct IssuerClient {
    binary_path: PathBuf,
}

impl IssuerClient {
    pub fn new(binary_path: impl AsRef<Path>) -> Self {
        Self {
            binary_path: binary_path.as_ref().to_path_buf(),
        }
    }

    /// Requests an attestation document. An absent argument is encoded as
    /// an empty string rather than omitted, matching the issuer's CLI
    /// contract.
    pub fn request(
        &self,
        nonce_hex: Option<&str>,
        user_data_hex: Option<&str>,
    ) -> Result<Vec<u8>, AttestationError> {
        let output = Command::new(&self.binary_path)
            .arg(nonce_hex.unwrap_or(""))
            .arg(user_data_hex.unwrap_or(""))
            .output()
            .map_err(|e| AttestationError::IssuerProcess(format!("failed to launch issuer: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(AttestationError::IssuerProcess(stderr));
        }
        Ok(output.stdout)
    }
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! The Solidity compiler is opaque: deterministic settings (metadata hashing disabled), creation
//! bytecode and runtime keccak-256 extracted.

use std::path::Path;
use std::process::Command;

use sha3::{Digest, Keccak256};

use crate::error::Groth16Error;

pub struct SolcOutput {
    /// Hex-encoded creation (deployment) bytecode.
    pub creation_bytecode_hex: String,
    /// Hex-encoded keccak-256 of the runtime bytecode.
    pub runtime_keccak256_hex: String,
}

pub trait SolcDriver: Send + Sync {
    fn compile(&self, source: &Path) -> Result<SolcOutput, Groth16Error>;
}

pub struct SubprocessSolcDriver {
    binary_path: String,
}

impl SubprocessSolcDriver {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

impl SolcDriver for SubprocessSolcDriver {
    fn compile(&self, source: &Path) -> Result<SolcOutput, Groth16Error> {
        let output = Command::new(&self.binary_path)
            .arg("--bin")
            .arg("--bin-runtime")
            .arg("--metadata-hash")
            .arg("none")
            .arg(source)
            .output()
            .map_err(|e| Groth16Error::Spawn {
                tool: self.binary_path.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(Groth16Error::ProcessFailed {
                tool: self.binary_path.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let (creation_hex, runtime_hex) = parse_solc_bin_output(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| Groth16Error::ProcessFailed {
                tool: self.binary_path.clone(),
                status: 0,
                stderr: "could not locate Binary/Binary of the runtime part sections".into(),
            })?;

        let runtime_bytes = hex::decode(&runtime_hex).map_err(|_| Groth16Error::ProcessFailed {
            tool: self.binary_path.clone(),
            status: 0,
            stderr: "runtime bytecode was not valid hex".into(),
        })?;

        Ok(SolcOutput {
            creation_bytecode_hex: creation_hex,
            runtime_keccak256_hex: hex::encode(Keccak256::digest(runtime_bytes)),
        })
    }
}

/// Parses `solc --bin --bin-runtime` text output, which lists
/// `Binary:` followed by the creation code, then
/// `Binary of the runtime part:` followed by the runtime code.
fn parse_solc_bin_output(stdout: &str) -> Option<(String, String)> {
    let mut lines = stdout.lines();
    let mut creation = None;
    let mut runtime = None;
    while let Some(line) = lines.next() {
        if line.trim() == "Binary:" {
            creation = lines.next().map(|l| l.trim().to_string());
        } else if line.trim() == "Binary of the runtime part:" {
            runtime = lines.next().map(|l| l.trim().to_string());
        }
    }
    Some((creation?, runtime?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_solc_text_output() {
        let stdout = "======= Verifier.sol:Verifier =======\n\
                       Binary:\n\
                       60806040\n\
                       Binary of the runtime part:\n\
                       6080604052\n";
        let (creation, runtime) = parse_solc_bin_output(stdout).unwrap();
        assert_eq!(creation, "60806040");
        assert_eq!(runtime, "6080604052");
    }

    #[test]
    fn missing_sections_yield_none() {
        assert!(parse_solc_bin_output("nothing here").is_none());
    }
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! The Circom compiler is opaque: it turns a `.circom` source
//! into `r1cs`/`wasm` outputs.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Groth16Error;

/// Paths to the two artifacts `COMPILE` retains, plus
/// the constraint count `PTAU_CHECK` needs to select
/// the required powers-of-tau power.
pub struct CompiledCircuit {
    pub r1cs_path: PathBuf,
    pub wasm_path: PathBuf,
    pub constraint_count: u64,
}

pub trait CircomDriver: Send + Sync {
    fn compile(&self, circuit_source: &Path, out_dir: &Path) -> Result<CompiledCircuit, Groth16Error>;
}

pub struct SubprocessCircomDriver {
    binary_path: String,
}

impl SubprocessCircomDriver {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }
}

impl CircomDriver for SubprocessCircomDriver {
    fn compile(&self, circuit_source: &Path, out_dir: &Path) -> Result<CompiledCircuit, Groth16Error> {
        let output = Command::new(&self.binary_path)
            .arg(circuit_source)
            .arg("--r1cs")
            .arg("--wasm")
            .arg("-o")
            .arg(out_dir)
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

        let stem = circuit_source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "circuit".to_string());
        let r1cs_path = out_dir.join(format!("{stem}.r1cs"));
        let constraint_count = read_r1cs_constraint_count(&r1cs_path)?;

        Ok(CompiledCircuit {
            wasm_path: out_dir.join(format!("{stem}.wasm")),
            constraint_count,
            r1cs_path,
        })
    }
}

/// Reads `nConstraints` out of an r1cs binary file's header section.
///
/// Layout (iden3 r1cs format v1): 4-byte magic `"r1cs"`, u32 version,
/// u32 section count, then repeated `(u32 type, u64 size, data)` sections.
/// The header section (type 1) holds, after `fieldSize` and the prime: u32
/// nWires, u32 nPubOut, u32 nPubIn, u32 nPrvIn, u64 nLabels, u32 nConstraints.
fn read_r1cs_constraint_count(r1cs_path: &Path) -> Result<u64, Groth16Error> {
    let mut file = File::open(r1cs_path).map_err(|e| Groth16Error::ProcessFailed {
        tool: "circom".into(),
        status: 0,
        stderr: format!("could not open r1cs file: {e}"),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| Groth16Error::ProcessFailed {
        tool: "circom".into(),
        status: 0,
        stderr: format!("could not read r1cs file: {e}"),
    })?;

    let malformed = || Groth16Error::ProcessFailed {
        tool: "circom".into(),
        status: 0,
        stderr: "malformed r1cs header".into(),
    };

    if bytes.len() < 12 || &bytes[0..4] != b"r1cs" {
        return Err(malformed());
    }
    let n_sections = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let mut offset = 12usize;
    for _ in 0..n_sections {
        if bytes.len() < offset + 12 {
            return Err(malformed());
        }
        let section_type = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
        let section_size = u64::from_le_bytes(bytes[offset + 4..offset + 12].try_into().unwrap());
        let section_start = offset + 12;
        if section_type == 1 {
            if bytes.len() < section_start + 4 {
                return Err(malformed());
            }
            let field_size = u32::from_le_bytes(bytes[section_start..section_start + 4].try_into().unwrap()) as usize;
            let n_constraints_offset = section_start + 4 + field_size + 4 + 4 + 4 + 4 + 8;
            if bytes.len() < n_constraints_offset + 4 {
                return Err(malformed());
            }
            let n_constraints =
                u32::from_le_bytes(bytes[n_constraints_offset..n_constraints_offset + 4].try_into().unwrap());
            return Ok(n_constraints as u64);
        }
        offset = section_start + section_size as usize;
    }
    Err(malformed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_r1cs(path: &Path, n_constraints: u32) {
        let mut header_section = Vec::new();
        header_section.extend_from_slice(&4u32.to_le_bytes()); // fieldSize
        header_section.extend_from_slice(&[0u8; 4]); // prime (4 bytes, matches fieldSize)
        header_section.extend_from_slice(&0u32.to_le_bytes()); // nWires
        header_section.extend_from_slice(&0u32.to_le_bytes()); // nPubOut
        header_section.extend_from_slice(&0u32.to_le_bytes()); // nPubIn
        header_section.extend_from_slice(&0u32.to_le_bytes()); // nPrvIn
        header_section.extend_from_slice(&0u64.to_le_bytes()); // nLabels
        header_section.extend_from_slice(&n_constraints.to_le_bytes());

        let mut file = Vec::new();
        file.extend_from_slice(b"r1cs");
        file.extend_from_slice(&1u32.to_le_bytes()); // version
        file.extend_from_slice(&1u32.to_le_bytes()); // n_sections
        file.extend_from_slice(&1u32.to_le_bytes()); // section type = header
        file.extend_from_slice(&(header_section.len() as u64).to_le_bytes());
        file.extend_from_slice(&header_section);

        let mut f = File::create(path).unwrap();
        f.write_all(&file).unwrap();
    }

    #[test]
    fn reads_constraint_count_from_header_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("circuit.r1cs");
        write_test_r1cs(&path, 1_000);
        assert_eq!(read_r1cs_constraint_count(&path).unwrap(), 1_000);
    }

    #[test]
    fn rejects_file_without_r1cs_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.r1cs");
        std::fs::write(&path, b"not an r1cs file at all").unwrap();
        assert!(read_r1cs_constraint_count(&path).is_err());
    }
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! The Groth16 library is opaque: this trait names exactly the
//! five operations the ceremony calls and nothing else, so tests can swap in
//! a fake without shelling out to a real `snarkjs`-compatible binary.

use std::path::Path;
use std::process::Command;

use crate::error::Groth16Error;

/// The five operations the ceremony drives against the Groth16 library.
pub trait Groth16Driver: Send + Sync {
    /// Builds an initial (unsafe) zkey from `r1cs` and `ptau`.
    fn new_zkey(&self, r1cs: &Path, ptau: &Path, out_zkey: &Path) -> Result<(), Groth16Error>;

    /// Verifies a zkey against its `r1cs` and `ptau`. Returns `Ok(true)` iff
    /// the library's own verification primitive reports success.
    fn verify_key(&self, zkey: &Path, r1cs: &Path, ptau: &Path) -> Result<bool, Groth16Error>;

    /// Contributes `randomness_hex` to `zkey_in` under `name`, producing
    /// `zkey_out`.
    fn contribute(
        &self,
        zkey_in: &Path,
        zkey_out: &Path,
        randomness_hex: &str,
        name: &str,
    ) -> Result<(), Groth16Error>;

    /// Applies the beacon's randomness to `zkey_in`, `iterations` times,
    /// under `name`, producing `zkey_out`.
    fn apply_beacon(
        &self,
        zkey_in: &Path,
        zkey_out: &Path,
        beacon_randomness_hex: &str,
        iterations: u32,
        name: &str,
    ) -> Result<(), Groth16Error>;

    /// Exports a Solidity verifier contract for `zkey` to `out_solidity`.
    fn export_solidity_verifier(&self, zkey: &Path, out_solidity: &Path) -> Result<(), Groth16Error>;
}

/// Invokes a `snarkjs`-compatible CLI tool as a subprocess for every
/// operation.
pub struct SubprocessGroth16Driver {
    binary_path: String,
}

impl SubprocessGroth16Driver {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    fn run(&self, args: &[&std::ffi::OsStr]) -> Result<(), Groth16Error> {
        let output = Command::new(&self.binary_path)
            .args(args)
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
        Ok(())
    }
}

impl Groth16Driver for SubprocessGroth16Driver {
    fn new_zkey(&self, r1cs: &Path, ptau: &Path, out_zkey: &Path) -> Result<(), Groth16Error> {
        self.run(&[
            "zkey".as_ref(),
            "new".as_ref(),
            r1cs.as_os_str(),
            ptau.as_os_str(),
            out_zkey.as_os_str(),
        ])
    }

    fn verify_key(&self, zkey: &Path, r1cs: &Path, ptau: &Path) -> Result<bool, Groth16Error> {
        let output = Command::new(&self.binary_path)
            .args([
                "zkey".as_ref(),
                "verify".as_ref(),
                r1cs.as_os_str(),
                ptau.as_os_str(),
                zkey.as_os_str(),
            ])
            .output()
            .map_err(|e| Groth16Error::Spawn {
                tool: self.binary_path.clone(),
                source: e,
            })?;
        Ok(output.status.success())
    }

    fn contribute(
        &self,
        zkey_in: &Path,
        zkey_out: &Path,
        randomness_hex: &str,
        name: &str,
    ) -> Result<(), Groth16Error> {
        self.run(&[
            "zkey".as_ref(),
            "contribute".as_ref(),
            zkey_in.as_os_str(),
            zkey_out.as_os_str(),
            "-e".as_ref(),
            randomness_hex.as_ref(),
            "-n".as_ref(),
            name.as_ref(),
        ])
    }

    fn apply_beacon(
        &self,
        zkey_in: &Path,
        zkey_out: &Path,
        beacon_randomness_hex: &str,
        iterations: u32,
        name: &str,
    ) -> Result<(), Groth16Error> {
        self.run(&[
            "zkey".as_ref(),
            "beacon".as_ref(),
            zkey_in.as_os_str(),
            zkey_out.as_os_str(),
            beacon_randomness_hex.as_ref(),
            iterations.to_string().as_ref(),
            "-n".as_ref(),
            name.as_ref(),
        ])
    }

    fn export_solidity_verifier(&self, zkey: &Path, out_solidity: &Path) -> Result<(), Groth16Error> {
        self.run(&[
            "zkey".as_ref(),
            "export".as_ref(),
            "solidityverifier".as_ref(),
            zkey.as_os_str(),
            out_solidity.as_os_str(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A fake driver recording calls, for state-machine tests that must not
    /// depend on a real Groth16 toolchain being installed.
    #[derive(Default)]
    pub struct FakeGroth16Driver {
        pub calls: Mutex<Vec<String>>,
    }

    impl Groth16Driver for FakeGroth16Driver {
        fn new_zkey(&self, _r1cs: &Path, _ptau: &Path, _out_zkey: &Path) -> Result<(), Groth16Error> {
            self.calls.lock().unwrap().push("new_zkey".into());
            Ok(())
        }

        fn verify_key(&self, _zkey: &Path, _r1cs: &Path, _ptau: &Path) -> Result<bool, Groth16Error> {
            self.calls.lock().unwrap().push("verify_key".into());
            Ok(true)
        }

        fn contribute(
            &self,
            _zkey_in: &Path,
            _zkey_out: &Path,
            _randomness_hex: &str,
            _name: &str,
        ) -> Result<(), Groth16Error> {
            self.calls.lock().unwrap().push("contribute".into());
            Ok(())
        }

        fn apply_beacon(
            &self,
            _zkey_in: &Path,
            _zkey_out: &Path,
            _beacon_randomness_hex: &str,
            _iterations: u32,
            _name: &str,
        ) -> Result<(), Groth16Error> {
            self.calls.lock().unwrap().push("apply_beacon".into());
            Ok(())
        }

        fn export_solidity_verifier(&self, _zkey: &Path, _out_solidity: &Path) -> Result<(), Groth16Error> {
            self.calls.lock().unwrap().push("export_solidity_verifier".into());
            Ok(())
        }
    }

    #[test]
    fn fake_driver_records_call_order() {
        let driver = FakeGroth16Driver::default();
        driver
            .new_zkey(Path::new("a.r1cs"), Path::new("a.ptau"), Path::new("a.zkey"))
            .unwrap();
        driver.verify_key(Path::new("a.zkey"), Path::new("a.r1cs"), Path::new("a.ptau")).unwrap();
        assert_eq!(*driver.calls.lock().unwrap(), vec!["new_zkey", "verify_key"]);
    }
}

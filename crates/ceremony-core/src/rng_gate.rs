//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Hardware RNG Gate: before any secret is generated, the
//! platform-reported current RNG source must match the attested identifier.

use std::fs;
use std::path::PathBuf;

use ceremony_types::rng::EXPECTED_HWRNG_SOURCE;

use crate::error::CeremonyError;

/// Where the current hardware RNG source's name is read from, and where its
/// bytes are drawn from for `CONTRIBUTE`.
pub trait RngSource {
    fn current_source_name(&self) -> Result<String, CeremonyError>;

    /// Draws `len` bytes of secret entropy from the attested RNG.
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>, CeremonyError>;
}

/// Reads the Linux sysfs path a Nitro-style guest exposes as its HWRNG
/// source name, and draws entropy from the corresponding device node.
pub struct PlatformRngSource {
    sysfs_path: PathBuf,
    device_path: PathBuf,
}

impl Default for PlatformRngSource {
    fn default() -> Self {
        Self {
            sysfs_path: PathBuf::from("/sys/class/misc/hw_random/rng_current"),
            device_path: PathBuf::from("/dev/hwrng"),
        }
    }
}

impl PlatformRngSource {
    pub fn at(sysfs_path: impl Into<PathBuf>, device_path: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_path: sysfs_path.into(),
            device_path: device_path.into(),
        }
    }
}

impl RngSource for PlatformRngSource {
    fn current_source_name(&self) -> Result<String, CeremonyError> {
        let raw = fs::read_to_string(&self.sysfs_path)?;
        Ok(raw.trim().to_string())
    }

    fn random_bytes(&self, len: usize) -> Result<Vec<u8>, CeremonyError> {
        use std::io::Read;
        let mut file = fs::File::open(&self.device_path)?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Asserts the platform's current RNG source matches the expected TEE RNG
/// name. Mismatch is fatal.
pub fn check(source: &dyn RngSource) -> Result<(), CeremonyError> {
    let reported = source.current_source_name()?;
    if reported != EXPECTED_HWRNG_SOURCE {
        return Err(CeremonyError::RngGate(reported));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockRngSource(&'static str);

    impl RngSource for MockRngSource {
        fn current_source_name(&self) -> Result<String, CeremonyError> {
            Ok(self.0.to_string())
        }

        fn random_bytes(&self, len: usize) -> Result<Vec<u8>, CeremonyError> {
            Ok(vec![0x42; len])
        }
    }

    #[test]
    fn accepts_the_expected_source() {
        let mock = MockRngSource(EXPECTED_HWRNG_SOURCE);
        assert!(check(&mock).is_ok());
    }

    #[test]
    fn rejects_any_other_source() {
        let mock = MockRngSource("rdrand");
        assert!(matches!(check(&mock), Err(CeremonyError::RngGate(_))));
    }
}

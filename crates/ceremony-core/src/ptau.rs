//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! PTAU selection and digest verification against the frozen catalog.

use blake2::{Blake2b512, Digest};
use ceremony_types::ptau::{entry_for_power, select_power, PtauDescriptor};

use crate::error::PtauError;

/// Picks the catalog entry for `constraint_count`, or fails pre-flight if
/// no entry covers it.
pub fn select(constraint_count: u64) -> Result<&'static PtauDescriptor, PtauError> {
    let power = select_power(constraint_count).ok_or(PtauError::TooManyConstraints(constraint_count))?;
    entry_for_power(power).ok_or(PtauError::NoCatalogEntry(power))
}

/// Verifies `file_bytes` against the pinned BLAKE2b-512 digest for `power`.
pub fn verify_digest(power: u8, file_bytes: &[u8]) -> Result<(), PtauError> {
    let descriptor = entry_for_power(power).ok_or(PtauError::NoCatalogEntry(power))?;
    let got = hex::encode(Blake2b512::digest(file_bytes));
    if got != descriptor.blake2b512_hex {
        return Err(PtauError::DigestMismatch {
            power,
            expected: descriptor.blake2b512_hex.to_string(),
            got,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_matching_catalog_entry_for_spec_scenarios() {
        assert_eq!(select(1_000).unwrap().power, 10);
        assert_eq!(select(65_537).unwrap().power, 17);
    }

    #[test]
    fn rejects_more_constraints_than_the_catalog_covers() {
        assert!(matches!(
            select((1u64 << 28) + 1),
            Err(PtauError::TooManyConstraints(_))
        ));
    }

    #[test]
    fn digest_check_round_trips_against_a_synthetic_blob() {
        let descriptor = entry_for_power(8).unwrap();
        let blob = b"not the real powers-of-tau file";
        // A synthetic blob will not match the pinned digest; assert the
        // mismatch is reported precisely, not silently accepted.
        let err = verify_digest(8, blob).unwrap_err();
        assert!(matches!(
            err,
            PtauError::DigestMismatch { power, .. } if power == descriptor.power
        ));
    }

    #[test]
    fn rejects_unknown_power() {
        assert!(matches!(verify_digest(99, b"x"), Err(PtauError::NoCatalogEntry(99))));
    }
}

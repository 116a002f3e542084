//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Wire shape of the framed local-transport file header.
//!
//! ```text
//! byte 0..8:            size, little-endian u64
//! byte 8..10:           name_len, little-endian u16
//! byte 10..10+name_len: UTF-8 filename
//! byte 10+name_len..:   body (size bytes)
//! ```

/// Total size of the fixed-width header prefix (`size` + `name_len`).
pub const HEADER_LEN: usize = 10;

/// Exclusive upper bound on a file body's byte length.
pub const MAX_BODY_SIZE: u64 = 1_000_000_000_000;

/// Inclusive upper bound on a filename's UTF-8 byte length.
pub const MAX_NAME_LEN: u16 = 4096;

/// Returns true iff `(size, name_len)` satisfy the header sanity predicate:
/// `0 < size < 10^12` and `0 < name_len <= 4096`.
pub fn header_is_sane(size: u64, name_len: u16) -> bool {
    size > 0 && size < MAX_BODY_SIZE && name_len > 0 && name_len <= MAX_NAME_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values() {
        assert!(header_is_sane(1, 1));
        assert!(header_is_sane(MAX_BODY_SIZE - 1, MAX_NAME_LEN));
        assert!(!header_is_sane(0, 1));
        assert!(!header_is_sane(MAX_BODY_SIZE, 1));
        assert!(!header_is_sane(1, 0));
        assert!(!header_is_sane(1, MAX_NAME_LEN + 1));
    }
}

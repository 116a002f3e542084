//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Pinned identifier for the Hardware RNG Gate.

/// Expected "current hardware RNG source" identifier on the reference TEE
/// platform (AWS Nitro Enclaves). Any other reported identifier is fatal.
pub const EXPECTED_HWRNG_SOURCE: &str = "nsm-hwrng";

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Public-randomness beacon client and verifier.

pub mod chain;
pub mod client;
pub mod verify;

pub use chain::{round_at, round_time};
pub use client::{fetch_round, parse_beacon_json};
pub use verify::verify as verify_beacon;

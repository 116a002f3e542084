//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! HTTP fetch of a beacon round. A suspension point, so this uses
//! `reqwest`'s blocking client rather than pulling the async runtime into a
//! leaf component that has no other reason to be async.

use std::time::Duration;

use serde::Deserialize;

use crate::error::BeaconError;
use ceremony_types::beacon::Beacon;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct BeaconResponse {
    round: u64,
    signature: String,
    randomness: String,
    #[serde(default)]
    previous_signature: Option<String>,
}

impl From<BeaconResponse> for Beacon {
    fn from(r: BeaconResponse) -> Self {
        Beacon {
            round: r.round,
            signature_hex: r.signature,
            randomness_hex: r.randomness,
            previous_signature_hex: r.previous_signature,
        }
    }
}

/// Parses a beacon JSON document as received byte-for-byte from the oracle
/// or the peer. The canonical representation is the bytes received, not a
/// re-derived string.
pub fn parse_beacon_json(bytes: &[u8]) -> Result<Beacon, BeaconError> {
    let parsed: BeaconResponse =
        serde_json::from_slice(bytes).map_err(|e| BeaconError::MalformedJson(e.to_string()))?;
    Ok(parsed.into())
}

/// Fetches the beacon for `round` from `base_url` (e.g.
/// `https://api.drand.sh/<chain-hash>`). Failures are reported loud, never
/// retried.
///
/// Returns both the exact response body as published by the oracle and the
/// parsed [`Beacon`] — callers must persist and forward the former, not a
/// re-serialization of the latter, since the canonical representation is
/// the bytes the oracle actually sent.
pub fn fetch_round(base_url: &str, round: u64) -> Result<(Vec<u8>, Beacon), BeaconError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(|e| BeaconError::Fetch(e.to_string()))?;

    let url = format!("{}/public/{round}", base_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .send()
        .map_err(|e| BeaconError::Fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(BeaconError::Fetch(format!(
            "unexpected status {}",
            response.status()
        )));
    }

    let body = response
        .bytes()
        .map_err(|e| BeaconError::Fetch(e.to_string()))?
        .to_vec();
    let parsed = parse_beacon_json(&body)?;

    if parsed.round != round {
        return Err(BeaconError::WrongRound {
            expected: round,
            found: parsed.round,
        });
    }

    Ok((body, parsed))
}

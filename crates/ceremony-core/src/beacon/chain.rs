//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Round-time arithmetic for the pinned beacon chain.

use ceremony_types::beacon::ChainInfo;

/// `round_at(t_ms) = max(1, floor((t_ms/1000 - genesis_time) / period) + 1)`.
pub fn round_at(timestamp_ms: u64, chain: &ChainInfo) -> u64 {
    let seconds = (timestamp_ms / 1000) as i64;
    let elapsed = seconds - chain.genesis_time as i64;
    let computed = elapsed.div_euclid(chain.period as i64) + 1;
    computed.max(1) as u64
}

/// `round_time(r) = genesis_time + (r-1) * period`, in seconds.
pub fn round_time(round: u64, chain: &ChainInfo) -> u64 {
    let elapsed = (round as i64 - 1) * chain.period as i64;
    (chain.genesis_time as i64 + elapsed).max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CHAIN: ChainInfo = ChainInfo {
        public_key_hex: "",
        period: 30,
        genesis_time: 1_595_431_050,
        hash_hex: "",
        group_hash_hex: "",
        scheme_id: ceremony_types::beacon::BeaconSchemeId::Rfc9380G1,
    };

    #[test]
    fn matches_spec_scenario_3() {
        let round = round_at(1_700_000_090_000, &TEST_CHAIN);
        assert_eq!(round, 3_485_635);
        assert_eq!(round_time(round, &TEST_CHAIN), 1_700_000_070);
    }

    #[test]
    fn round_never_goes_below_one() {
        let before_genesis = round_at(0, &TEST_CHAIN);
        assert_eq!(before_genesis, 1);
    }

    #[test]
    fn round_at_genesis_is_one() {
        assert_eq!(round_at(TEST_CHAIN.genesis_time * 1000, &TEST_CHAIN), 1);
    }

    #[test]
    fn round_time_is_left_inverse_of_round_at_on_boundaries() {
        let t = round_time(10, &TEST_CHAIN) * 1000;
        assert_eq!(round_at(t, &TEST_CHAIN), 10);
    }
}

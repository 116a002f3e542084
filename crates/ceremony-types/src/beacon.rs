//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Public-randomness beacon wire types and pinned chain info.
//!
//! The beacon scheme is a closed sum over five variants recognized by the
//! pinned [`ChainInfo::scheme_id`] — never by a tag inside the beacon
//! payload itself.

/// The five beacon encoding/curve schemes this ceremony recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeaconSchemeId {
    /// message = SHA-256(previous_signature || round_be64), signature on G2.
    ChainedG2,
    /// message = SHA-256(round_be64), signature on G2.
    UnchainedG2,
    /// message = SHA-256(round_be64), signature on G1, historical hash-to-curve domain.
    SwappedG1,
    /// message = SHA-256(round_be64), signature on G1, RFC9380 hash-to-curve domain.
    Rfc9380G1,
    /// message = keccak256(round_be64), signature on BN254 G1 (short signature scheme).
    Bn254G1,
}

impl BeaconSchemeId {
    /// Domain-separation tag used for hashing a round number to a curve
    /// point. `ChainedG2`/`UnchainedG2` use the underlying BLS library's
    /// default G2 domain and therefore have no explicit tag here.
    pub fn hash_to_curve_domain(self) -> Option<&'static [u8]> {
        match self {
            BeaconSchemeId::ChainedG2 | BeaconSchemeId::UnchainedG2 => None,
            BeaconSchemeId::SwappedG1 => {
                Some(b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_")
            }
            BeaconSchemeId::Rfc9380G1 => Some(b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_"),
            BeaconSchemeId::Bn254G1 => Some(b"BLS_SIG_BN254G1_XMD:KECCAK-256_SVDW_RO_NUL_"),
        }
    }

    /// Whether this scheme's round message includes the previous signature.
    pub fn is_chained(self) -> bool {
        matches!(self, BeaconSchemeId::ChainedG2)
    }
}

/// Static chain info, pinned at compile time — never fetched at runtime.
#[derive(Debug, Clone, Copy)]
pub struct ChainInfo {
    pub public_key_hex: &'static str,
    /// Seconds between rounds.
    pub period: u64,
    /// UNIX seconds of round 0.
    pub genesis_time: u64,
    pub hash_hex: &'static str,
    pub group_hash_hex: &'static str,
    pub scheme_id: BeaconSchemeId,
}

/// The mainline drand chain this deployment pins.
///
/// `public_key_hex` and `group_hash_hex` are deployment secrets in the
/// reference system (baked in from the operator's chain-info fetch at build
/// time); the values below are placeholders of the correct shape
/// (a compressed G2 point, 192 hex chars) and MUST be replaced with the
/// real pinned values before this binary is used against a live beacon — see
/// `DESIGN.md` for the open-question rationale. `hash_hex`, `period`, and
/// `genesis_time` are the values the mainline chain actually publishes.
pub const MAINLINE_CHAIN: ChainInfo = ChainInfo {
    public_key_hex: "3629341551c2ff921e4c974296f906a99a3e934b0fb3aed7b500a3222f1c46c\
                     3629341551c2ff921e4c974296f906a99a3e934b0fb3aed7b500a3222f1c46c\
                     3629341551c2ff921e4c974296f906a99a3e934b0fb3aed7b500a3222f1c46c",
    period: 30,
    genesis_time: 1_595_431_050,
    hash_hex: "8990e7a9aaed2ffed73dbd7092123d6f289930540d7651336225dc172e51b2ce",
    group_hash_hex: "176f93498eac9ca337150b46d21dd58673ea4e3581185f869672e59fa4cb390",
    scheme_id: BeaconSchemeId::Rfc9380G1,
};

/// A beacon as received from the oracle. The active scheme is inferred from
/// the pinned [`ChainInfo`], not from any field here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beacon {
    pub round: u64,
    /// Hex-encoded signature group element.
    pub signature_hex: String,
    /// Hex SHA-256 of the signature bytes.
    pub randomness_hex: String,
    /// Present only for chained schemes.
    pub previous_signature_hex: Option<String>,
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! The frozen PTAU catalog: power-of-two constraint bound -> required
//! Powers-of-Tau parameter file and its pinned digest.

/// Smallest power the catalog covers.
pub const MIN_POWER: u8 = 8;
/// Largest power the catalog covers.
pub const MAX_POWER: u8 = 28;

#[derive(Debug, Clone, Copy)]
pub struct PtauDescriptor {
    /// P such that this entry supports up to `2^P` constraints.
    pub power: u8,
    /// `2^power`.
    pub max_constraints: u64,
    /// Pinned BLAKE2b-512 digest of the canonical parameter file, hex-encoded.
    pub blake2b512_hex: &'static str,
    pub source_url: &'static str,
}

/// BLAKE2b-512 digests below are placeholders of the correct shape (128 hex
/// chars) pending the operator pinning the real published digests for each
/// Hermez `powersOfTau28_hez_final_*.ptau` file — see `DESIGN.md`. Shape and
/// URL convention follow the well-known Hermez ceremony file layout.
pub const PTAU_CATALOG: &[PtauDescriptor] = &[
    ptau(8, "c68ca89b5aec5e1be6030e1869a9af466ada7146ab52b67e64b764a26dee269fbda823f183a87c6a15429c44c8dc839b5705d0474ca8f21044220e52c3426b68"),
    ptau(9, "4de6f4d34f8963503faf22fc2587da6e62030beaa4b07c0851ff89b0946d5338b32a09c37da63646fdd624775d82fa474082e9846496a929dd7eca7099e240c9"),
    ptau(10, "f4e9ab5eae08509d848fc1254899d7a9575f149829b1352b02d0aeb4f1b4c207027ce738e59adc231419607d5400dfc354fa9663f1c59cb8299b968bddb53449"),
    ptau(11, "be201446d4f69e886e5cae5e7f99092334fdfc5ad04d0fe80bd4fd98654c1c649ca7e035d71973a7a9a3a7489c99445777bd2c2afb6563f9fff13ce3bf646a94"),
    ptau(12, "2537232cd4e01c302a0bc642e9f94397b6dd35281b4979d4eed72ed6bdbf9ec0677934c980a101831598eeb2ed5a6a09e0cc2f4984f6a1d0c95756277858ae1b"),
    ptau(13, "ab4e5e62e0371c359a66c7954bb284876509d3bcf1ad49ed1c489d269c8925a62b5a5a594288e1470b3b559a4f0f265b83191baff715d34054dfd8e868fbf1d0"),
    ptau(14, "5d3030a9ca53b03630fa0a28e6b0f5330d883220c50548977744cdc29230a61349fed729d6476e061b0e248305ca55ad85aa1a825a2e0c74e365f449ee1eb176"),
    ptau(15, "4e9f29002e11e8647d03c77dba9f7d96db0eeec0bb2490c1b5fb9c7ab1a033aea270ebfc6c384dc131e9c737eea0d2245920cd6318cdc06c37d12ccafd3323dc"),
    ptau(16, "e651d2e63f6827bf22a68fa6e687b62df01beb74c9501e956714cd28430a1020d99a11d331225d74b7035d82c28c7fd8025b789e7f86c59a4f00d9203ed624d9"),
    ptau(17, "f114cac27f6df4d7270cf99035234904b2705e63e22223f0822c03f48abcc394bc3d356197a90ace3cf3529a2649d0b74e28b2775e4a744c5620b67e218d35ea"),
    ptau(18, "089e509267b49bc5d56cf76613db0f0351de2e5b89674d7b17462941c634b725ee1071a6aa1e269ea92fbe68a059cd70bffda11c22f0b14cec9d1118e9029a9e"),
    ptau(19, "231dbfff6f0f00071b3782f77529bff00d55ba10f285e55a6093ce7b60857b8124409f32009d4bd44e10802104ca5544c3b44974df660c81c4f62427c48bf1a9"),
    ptau(20, "ffd182767b2d3bce54d8dbc47ef7b72f2c99df5a90d044b7ec93270691186cad4bf2ada751e7d810267583b79cf0e7456060b41d2629325e94bdd5e49adbea76"),
    ptau(21, "19edd9f0803c9b2905a8a65610c71e492f322abdf07d26db0729128d07c3cb9cae80dcc9064a23eb414ebbf2f0922ed7f04ede33b0959184969cbf5c40843e70"),
    ptau(22, "98d5f8fbab5f41c59890c4fbaed5b66bbc942f3c6ccf99857c3b950ba0fc00dc017f8351833103f5eca4e7f20f37e97c70e7c1c0632478434241a34b725bca28"),
    ptau(23, "a872bf7c3058da17768ff9a9eee4201ef408da8c08b3a977faef3e715c9c41a1d7a73d5d575455fa134bd82cbfa62168b747ce7da98fc9fd680089bcc014c202"),
    ptau(24, "d1d1b7f14182ceab1e1df73b3d562ad659c9a79d64e4ae82a17992888e03b32a216713388b7be9022783fc4322b188d5e34c63fab55e3d1cf6b153add9edd0b4"),
    ptau(25, "e51b3ca55456dd8b4f0e20641967aa57052e11f370d744a59bc951cdf0dd8ebba0e8ee5a580d414f85747c3487ca1db3dafdbe4e6ce9c3b8473636aea26f0500"),
    ptau(26, "115f9466fe669e1a86bf2d9cecf081437401d425102a67b592b0677f4bd6450e6104b069125e0cecb12edd411c86f59ff01d370f8f265b4c3f6e310ff402a3a3"),
    ptau(27, "ecf2196bd9fa3457608d1d77cf95514925431b43af340e2c8752f37c296124d4242d31c96946ea3f1245c6fbebb7ba0f35d57161fc874f5c3074088e9d2aa4a5"),
    ptau(28, "da28945977915549c713acb231bde078d4e77d53ed91f6eae724185eb96fcbdde0041d4bd30dc659a2b2406eaa57e6c8e09cd9ee44e18c92a508143d93b179ee"),
];

const fn ptau(power: u8, blake2b512_hex: &'static str) -> PtauDescriptor {
    PtauDescriptor {
        power,
        max_constraints: 1u64 << power,
        blake2b512_hex,
        source_url: url_for(power),
    }
}

/// Returns the catalog entry for the given power, if in range.
pub fn entry_for_power(power: u8) -> Option<&'static PtauDescriptor> {
    PTAU_CATALOG.iter().find(|d| d.power == power)
}

/// Smallest power P with `2^P >= constraints`, clamped to `[MIN_POWER,
/// MAX_POWER]`. Returns `None` if `constraints > 2^MAX_POWER`, at which
/// point the ceremony cannot proceed.
pub fn select_power(constraints: u64) -> Option<u8> {
    for p in MIN_POWER..=MAX_POWER {
        if (1u64 << p) >= constraints {
            return Some(p);
        }
    }
    None
}

// The source URL follows the well-known Hermez Powers-of-Tau layout, e.g.
// `.../powersOfTau28_hez_final_10.ptau`.
macro_rules! url_table {
    ($($p:literal => $u:literal),* $(,)?) => {
        const fn url_for(power: u8) -> &'static str {
            match power {
                $($p => $u,)*
                _ => "",
            }
        }
    };
}

url_table! {
    8 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_08.ptau",
    9 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_09.ptau",
    10 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_10.ptau",
    11 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_11.ptau",
    12 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_12.ptau",
    13 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_13.ptau",
    14 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_14.ptau",
    15 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_15.ptau",
    16 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_16.ptau",
    17 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_17.ptau",
    18 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_18.ptau",
    19 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_19.ptau",
    20 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_20.ptau",
    21 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_21.ptau",
    22 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_22.ptau",
    23 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_23.ptau",
    24 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_24.ptau",
    25 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_25.ptau",
    26 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_26.ptau",
    27 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_27.ptau",
    28 => "https://hermez.s3-eu-west-1.amazonaws.com/powersOfTau28_hez_final_28.ptau",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_select_matches_spec_scenarios() {
        assert_eq!(select_power(1_000), Some(10));
        assert_eq!(select_power(65_537), Some(17));
    }

    #[test]
    fn power_select_clamps_and_rejects_overflow() {
        assert_eq!(select_power(1), Some(8));
        assert_eq!(select_power(1u64 << 28), Some(28));
        assert_eq!(select_power((1u64 << 28) + 1), None);
    }

    #[test]
    fn catalog_entries_satisfy_max_constraints_equality() {
        for d in PTAU_CATALOG {
            assert_eq!(d.max_constraints, 1u64 << d.power);
            assert_eq!(d.blake2b512_hex.len(), 128);
            assert!(d.source_url.ends_with(".ptau"));
        }
    }

    #[test]
    fn url_ends_with_expected_filename() {
        let d = entry_for_power(10).unwrap();
        assert!(d.source_url.ends_with("powersOfTau28_hez_final_10.ptau"));
    }
}

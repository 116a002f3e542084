//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Scheme-dispatched beacon signature verification. The
//! active scheme is read from the pinned [`ChainInfo`], never from the
//! beacon payload itself.

use ark_bn254::{Bn254, Fr, G1Affine as BnG1Affine, G2Affine as BnG2Affine};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_serialize::CanonicalDeserialize;
use blstrs::{G1Affine, G1Projective, G2Affine, G2Projective};
use ceremony_types::beacon::{Beacon, BeaconSchemeId, ChainInfo};
use group::{Curve, Group};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::error::BeaconError;

/// Historical/"library default" BLS12-381 G2 ciphersuite tag, reused for the
/// chained/unchained schemes' hash-to-curve step.
const G2_DEFAULT_DOMAIN: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

/// Verifies a beacon's randomness binding and signature under the scheme
/// pinned by `chain`.
pub fn verify(beacon: &Beacon, chain: &ChainInfo) -> Result<(), BeaconError> {
    verify_randomness(beacon)?;
    match chain.scheme_id {
        BeaconSchemeId::ChainedG2 | BeaconSchemeId::UnchainedG2 => verify_bls_g2(beacon, chain),
        BeaconSchemeId::SwappedG1 | BeaconSchemeId::Rfc9380G1 => verify_bls_g1(beacon, chain),
        BeaconSchemeId::Bn254G1 => verify_bn254(beacon, chain),
    }
}

fn verify_randomness(beacon: &Beacon) -> Result<(), BeaconError> {
    let signature =
        hex::decode(&beacon.signature_hex).map_err(|e| BeaconError::InvalidEncoding(e.to_string()))?;
    let expected = hex::encode(Sha256::digest(&signature));
    if expected != beacon.randomness_hex.to_lowercase() {
        return Err(BeaconError::RandomnessMismatch);
    }
    Ok(())
}

fn round_message(beacon: &Beacon, chain: &ChainInfo) -> Result<Vec<u8>, BeaconError> {
    let round_be = beacon.round.to_be_bytes();
    if chain.scheme_id.is_chained() {
        let prev_hex = beacon
            .previous_signature_hex
            .as_ref()
            .ok_or(BeaconError::MissingPreviousSignature)?;
        let mut message =
            hex::decode(prev_hex).map_err(|e| BeaconError::InvalidEncoding(e.to_string()))?;
        message.extend_from_slice(&round_be);
        Ok(message)
    } else {
        Ok(round_be.to_vec())
    }
}

fn decode_g1(hex_str: &str) -> Result<G1Affine, BeaconError> {
    let bytes = hex::decode(hex_str).map_err(|e| BeaconError::InvalidEncoding(e.to_string()))?;
    let array: [u8; 48] = bytes
        .try_into()
        .map_err(|_| BeaconError::InvalidEncoding("expected a 48-byte compressed G1 point".into()))?;
    Option::from(G1Affine::from_compressed(&array))
        .ok_or_else(|| BeaconError::InvalidEncoding("invalid compressed G1 point".into()))
}

fn decode_g2(hex_str: &str) -> Result<G2Affine, BeaconError> {
    let bytes = hex::decode(hex_str).map_err(|e| BeaconError::InvalidEncoding(e.to_string()))?;
    let array: [u8; 96] = bytes
        .try_into()
        .map_err(|_| BeaconError::InvalidEncoding("expected a 96-byte compressed G2 point".into()))?;
    Option::from(G2Affine::from_compressed(&array))
        .ok_or_else(|| BeaconError::InvalidEncoding("invalid compressed G2 point".into()))
}

/// `chained`/`unchained`: signature on G2, public key on G1.
/// `e(Hm, -P) * e(S, G) == 1` rearranges to `e(P, Hm) == e(G, S)`.
fn verify_bls_g2(beacon: &Beacon, chain: &ChainInfo) -> Result<(), BeaconError> {
    let message = round_message(beacon, chain)?;
    let signature = decode_g2(&beacon.signature_hex)?;
    let public_key = decode_g1(chain.public_key_hex)?;

    let hm = G2Projective::hash_to_curve(&message, G2_DEFAULT_DOMAIN, &[]).to_affine();
    let g1_generator = G1Projective::generator().to_affine();

    let lhs = blstrs::pairing(&public_key, &hm);
    let rhs = blstrs::pairing(&g1_generator, &signature);
    if lhs != rhs {
        return Err(BeaconError::SignatureInvalid);
    }
    Ok(())
}

/// `swapped-G1`/`RFC9380-G1`: signature on G1, public key on G2.
/// `e(Hm, -P) * e(S, G) == 1` rearranges to `e(Hm, P) == e(S, G)`.
fn verify_bls_g1(beacon: &Beacon, chain: &ChainInfo) -> Result<(), BeaconError> {
    let message = round_message(beacon, chain)?;
    let domain = chain
        .scheme_id
        .hash_to_curve_domain()
        .ok_or_else(|| BeaconError::InvalidEncoding("scheme has no hash-to-curve domain".into()))?;
    let signature = decode_g1(&beacon.signature_hex)?;
    let public_key = decode_g2(chain.public_key_hex)?;

    let hm = G1Projective::hash_to_curve(&message, domain, &[]).to_affine();
    let g2_generator = G2Projective::generator().to_affine();

    let lhs = blstrs::pairing(&hm, &public_key);
    let rhs = blstrs::pairing(&signature, &g2_generator);
    if lhs != rhs {
        return Err(BeaconError::SignatureInvalid);
    }
    Ok(())
}

fn decode_bn254_g1(hex_str: &str) -> Result<BnG1Affine, BeaconError> {
    let bytes = hex::decode(hex_str).map_err(|e| BeaconError::InvalidEncoding(e.to_string()))?;
    BnG1Affine::deserialize_compressed(bytes.as_slice())
        .map_err(|e| BeaconError::InvalidEncoding(e.to_string()))
}

fn decode_bn254_g2(hex_str: &str) -> Result<BnG2Affine, BeaconError> {
    let bytes = hex::decode(hex_str).map_err(|e| BeaconError::InvalidEncoding(e.to_string()))?;
    BnG2Affine::deserialize_compressed(bytes.as_slice())
        .map_err(|e| BeaconError::InvalidEncoding(e.to_string()))
}

/// Maps a keccak256 digest onto BN254 G1 by reducing it into the scalar
/// field and scaling the generator.
///
/// TODO: this is a reduce-and-scale encoding, not the RFC 9380 SVDW map the
/// `BLS_SIG_BN254G1_XMD:KECCAK-256_SVDW_RO_NUL_` domain tag calls for; `ark-ec`
/// does not ship an SVDW implementation, so a conformant map needs one
/// hand-rolled against RFC 9380 §6.6.2.
fn hash_to_bn254_g1(message: &[u8]) -> BnG1Affine {
    let digest = Keccak256::digest(message);
    let scalar = Fr::from_be_bytes_mod_order(&digest);
    (BnG1Affine::generator().into_group() * scalar).into_affine()
}

/// `BN254-on-G1`: signature on G1, public key on G2, same pairing shape as
/// `verify_bls_g1` but over BN254.
fn verify_bn254(beacon: &Beacon, chain: &ChainInfo) -> Result<(), BeaconError> {
    let message = round_message(beacon, chain)?;
    let hm = hash_to_bn254_g1(&message);
    let signature = decode_bn254_g1(&beacon.signature_hex)?;
    let public_key = decode_bn254_g2(chain.public_key_hex)?;

    let lhs = Bn254::pairing(hm, public_key);
    let rhs = Bn254::pairing(signature, BnG2Affine::generator());
    if lhs != rhs {
        return Err(BeaconError::SignatureInvalid);
    }
    Ok(())
}

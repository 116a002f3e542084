//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Unified error hierarchy for the ceremony protocol engine.

use thiserror::Error;

/// Top-level error type returned by every phase of either state machine.
///
/// Propagation policy is fail-fast: any variant here is terminal for the
/// ceremony. There is no retry-and-continue path.
#[derive(Error, Debug)]
pub enum CeremonyError {
    #[error("attestation error")]
    Attestation(#[from] AttestationError),

    #[error("beacon error")]
    Beacon(#[from] BeaconError),

    #[error("transport error")]
    Transport(#[from] TransportError),

    #[error("PTAU catalog error")]
    Ptau(#[from] PtauError),

    #[error("groth16 driver error")]
    Groth16(#[from] Groth16Error),

    #[error("hardware RNG gate failed: {0}")]
    RngGate(String),

    #[error("manifest error")]
    Manifest(#[from] ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from attestation parsing and verification.
#[derive(Error, Debug)]
pub enum AttestationError {
    #[error("malformed CBOR: {0}")]
    MalformedCbor(String),

    #[error("missing or malformed field: {0}")]
    InvalidField(String),

    #[error("unsupported COSE algorithm identifier: {0}")]
    UnsupportedAlgorithm(i64),

    #[error("certificate chain does not terminate at the pinned root")]
    ChainDoesNotTerminateAtRoot,

    #[error("certificate issuer/subject mismatch at chain position {0}")]
    IssuerMismatch(usize),

    #[error("certificate expired or not yet valid at chain position {0}")]
    ValidityWindow(usize),

    #[error("certificate signature invalid at chain position {0}")]
    CertSignatureInvalid(usize),

    #[error("COSE signature verification failed")]
    SignatureInvalid,

    #[error("attested nonce did not match the requested nonce")]
    NonceMismatch,

    #[error("attested user_data did not match the expected value")]
    UserDataMismatch,

    #[error("issuer process failed: {0}")]
    IssuerProcess(String),
}

/// Errors from beacon fetch and verification.
#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("malformed beacon JSON: {0}")]
    MalformedJson(String),

    #[error("beacon round {found} did not match expected round {expected}")]
    WrongRound { expected: u64, found: u64 },

    #[error("SHA-256(signature) did not match randomness")]
    RandomnessMismatch,

    #[error("BLS signature verification failed")]
    SignatureInvalid,

    #[error("chained scheme requires previous_signature")]
    MissingPreviousSignature,

    #[error("invalid group element encoding: {0}")]
    InvalidEncoding(String),

    #[error("HTTP fetch failed: {0}")]
    Fetch(String),

    #[error("beacon not yet available after computed wait")]
    NotYetAvailable,
}

/// Errors from the framed local transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("peer disconnected mid-frame")]
    Disconnected,

    #[error("header failed sanity check: size={size}, name_len={name_len}")]
    InvalidHeader { size: u64, name_len: u16 },

    #[error("filename was not valid UTF-8")]
    InvalidName,

    #[error("expected {expected} files, received {received}")]
    FileCountMismatch { expected: usize, received: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from PTAU selection and verification.
#[derive(Error, Debug)]
pub enum PtauError {
    #[error("circuit has {0} constraints, exceeding the maximum of 2^28")]
    TooManyConstraints(u64),

    #[error("no catalog entry for power {0}")]
    NoCatalogEntry(u8),

    #[error("BLAKE2b-512 digest mismatch for power {power}: expected {expected}, got {got}")]
    DigestMismatch {
        power: u8,
        expected: String,
        got: String,
    },

    #[error("failed to fetch PTAU file: {0}")]
    Fetch(String),
}

/// Errors from invoking the opaque Groth16 library / circuit compiler /
/// Solidity compiler subprocesses.
#[derive(Error, Debug)]
pub enum Groth16Error {
    #[error("subprocess '{tool}' exited with status {status}: {stderr}")]
    ProcessFailed {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("key verification returned failure for {0}")]
    VerificationFailed(String),

    #[error("failed to launch subprocess '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from manifest construction.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("missing artifact file: {0}")]
    MissingArtifact(String),
}

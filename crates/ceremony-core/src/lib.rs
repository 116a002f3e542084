//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! # Ceremony Core
//!
//! Protocol engine for a two-party Groth16 trusted-setup ceremony between a
//! TEE enclave and an untrusted host, bound by TEE attestation and a public
//! randomness beacon.
//!
//! ## Architecture
//!
//! - [`attestation`] - COSE_Sign1/CBOR decode and certificate-chain verification
//! - [`beacon`] - drand-style round arithmetic, fetch, and scheme-dispatched verification
//! - [`transport`] - framed local file transfer between enclave and host
//! - [`drivers`] - opaque subprocess boundaries into Groth16/Circom/solc tooling
//! - [`manifest`] - artifact hash-of-hashes commitment
//! - [`ptau`] - frozen powers-of-tau catalog selection and digest verification
//! - [`rng_gate`] - hardware RNG source assertion
//! - [`secret`] - zeroizing wrapper for ephemeral key material
//! - [`state`] - the enclave-side and host-side ceremony state machines
//! - [`config`] - CLI argument structs for both binaries
//! - [`error`] - unified error hierarchy

pub mod attestation;
pub mod beacon;
pub mod config;
pub mod drivers;
pub mod error;
pub mod manifest;
pub mod ptau;
pub mod rng_gate;
pub mod secret;
pub mod state;
pub mod transport;

pub use error::CeremonyError;
pub use secret::Secret;

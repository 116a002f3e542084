//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! # Ceremony Types
//!
//! Shared wire types for the two-party TEE/host Groth16 ceremony protocol.
//!
//! This crate holds only data — no I/O, no cryptographic verification logic.
//! [`ceremony-core`](../ceremony_core/index.html) owns the state machines,
//! codecs, and verifiers that operate on these types.

pub mod attestation;
pub mod beacon;
pub mod frame;
pub mod manifest;
pub mod ptau;
pub mod rng;

pub use attestation::{AttestationDocument, PINNED_ROOT_CERT_DER};
pub use beacon::{Beacon, BeaconSchemeId, ChainInfo};
pub use manifest::{ManifestEntry, ARTIFACT_ORDER};
pub use ptau::PtauDescriptor;

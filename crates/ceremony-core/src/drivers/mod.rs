//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Opaque subprocess boundaries into the Groth16 library, the Circom
//! compiler, and the Solidity compiler.

pub mod circom;
pub mod groth16;
pub mod solc;

pub use circom::{CircomDriver, CompiledCircuit, SubprocessCircomDriver};
pub use groth16::{Groth16Driver, SubprocessGroth16Driver};
pub use solc::{SolcDriver, SolcOutput, SubprocessSolcDriver};

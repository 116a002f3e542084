//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! CLI configuration for both binaries, with env-var fallbacks.

use std::path::PathBuf;

use clap::Parser;

/// Arguments for the enclave-side binary.
#[derive(Debug, Parser)]
#[command(name = "ceremony-enclave", about = "Runs the TEE side of a Groth16 trusted-setup ceremony")]
pub struct EnclaveArgs {
    /// Address to listen on for the host's framed connections.
    #[arg(long, env = "CEREMONY_LISTEN_ADDR", default_value = "0.0.0.0:7000")]
    pub listen_addr: String,

    /// Address of the host's listener, used to ship the time-attestation
    /// and the final artifact batch back.
    #[arg(long, env = "CEREMONY_HOST_ADDR", default_value = "127.0.0.1:7001")]
    pub host_addr: String,

    /// Working directory for received/produced artifacts.
    #[arg(long, env = "CEREMONY_WORKDIR", default_value = "./ceremony-workdir")]
    pub working_dir: PathBuf,

    /// Path to the attestation issuer binary.
    #[arg(long, env = "CEREMONY_ISSUER_BIN", default_value = "/usr/bin/attestation-issuer")]
    pub issuer_binary: PathBuf,

    /// Path to the Groth16 CLI tool (snarkjs-compatible).
    #[arg(long, env = "CEREMONY_GROTH16_BIN", default_value = "snarkjs")]
    pub groth16_binary: String,

    /// Path to the Circom compiler binary.
    #[arg(long, env = "CEREMONY_CIRCOM_BIN", default_value = "circom")]
    pub circom_binary: String,

    /// Path to the Solidity compiler binary.
    #[arg(long, env = "CEREMONY_SOLC_BIN", default_value = "solc")]
    pub solc_binary: String,

    /// Overrides the pinned TEE root certificate (DER), for testing only.
    #[arg(long, env = "CEREMONY_ROOT_CERT_OVERRIDE")]
    pub root_cert_override: Option<PathBuf>,

    /// Log verbosity filter, e.g. `info`, `debug`, `ceremony_core=trace`.
    #[arg(long, env = "CEREMONY_LOG", default_value = "info")]
    pub log_filter: String,
}

/// Arguments for the host-side binary.
#[derive(Debug, Parser)]
#[command(name = "ceremony-host", about = "Runs the untrusted-host side of a Groth16 trusted-setup ceremony")]
pub struct HostArgs {
    /// Address of the enclave's listening socket.
    #[arg(long, env = "CEREMONY_ENCLAVE_ADDR", default_value = "127.0.0.1:7000")]
    pub enclave_addr: String,

    /// Address to listen on for the enclave's framed connections (the
    /// time-attestation and the final artifact batch).
    #[arg(long, env = "CEREMONY_LISTEN_ADDR", default_value = "0.0.0.0:7001")]
    pub listen_addr: String,

    /// Working directory for received/produced artifacts.
    #[arg(long, env = "CEREMONY_WORKDIR", default_value = "./ceremony-workdir")]
    pub working_dir: PathBuf,

    /// Path to the circuit source file.
    #[arg(long, env = "CEREMONY_CIRCUIT")]
    pub circuit_path: PathBuf,

    /// Base URL of the beacon oracle (e.g. `https://api.drand.sh/<chain-hash>`).
    #[arg(long, env = "CEREMONY_BEACON_URL", default_value = "https://api.drand.sh")]
    pub beacon_base_url: String,

    /// Path to the Groth16 CLI tool (snarkjs-compatible).
    #[arg(long, env = "CEREMONY_GROTH16_BIN", default_value = "snarkjs")]
    pub groth16_binary: String,

    /// Path to the Circom compiler binary.
    #[arg(long, env = "CEREMONY_CIRCOM_BIN", default_value = "circom")]
    pub circom_binary: String,

    /// Log verbosity filter.
    #[arg(long, env = "CEREMONY_LOG", default_value = "info")]
    pub log_filter: String,
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

use std::fs;

use anyhow::{Context, Result};
use ceremony_core::attestation::IssuerClient;
use ceremony_core::config::EnclaveArgs;
use ceremony_core::drivers::{SubprocessCircomDriver, SubprocessGroth16Driver, SubprocessSolcDriver};
use ceremony_core::rng_gate::PlatformRngSource;
use ceremony_core::state::EnclaveCeremony;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = EnclaveArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log_filter))
        .init();

    fs::create_dir_all(&args.working_dir).context("creating working directory")?;

    let pinned_root_der = match &args.root_cert_override {
        Some(path) => fs::read(path).with_context(|| format!("reading root cert override {path:?}"))?,
        None => ceremony_types::PINNED_ROOT_CERT_DER.to_vec(),
    };

    let ceremony = EnclaveCeremony {
        working_dir: args.working_dir,
        listen_addr: args.listen_addr,
        host_addr: args.host_addr,
        rng_source: Box::new(PlatformRngSource::default()),
        circom: Box::new(SubprocessCircomDriver::new(args.circom_binary)),
        groth16: Box::new(SubprocessGroth16Driver::new(args.groth16_binary)),
        solc: Box::new(SubprocessSolcDriver::new(args.solc_binary)),
        issuer: IssuerClient::new(args.issuer_binary),
        pinned_root_der,
    };

    ceremony.run().await.context("enclave ceremony failed")?;
    Ok(())
}

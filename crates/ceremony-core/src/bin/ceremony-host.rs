//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

use std::fs;

use anyhow::{Context, Result};
use ceremony_core::config::HostArgs;
use ceremony_core::drivers::{SubprocessCircomDriver, SubprocessGroth16Driver};
use ceremony_core::state::HostCeremony;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = HostArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log_filter))
        .init();

    fs::create_dir_all(&args.working_dir).context("creating working directory")?;

    let ceremony = HostCeremony {
        working_dir: args.working_dir,
        enclave_addr: args.enclave_addr,
        listen_addr: args.listen_addr,
        circuit_source: args.circuit_path,
        beacon_base_url: args.beacon_base_url,
        circom: Box::new(SubprocessCircomDriver::new(args.circom_binary)),
        groth16: Box::new(SubprocessGroth16Driver::new(args.groth16_binary)),
    };

    ceremony.run().await.context("host ceremony failed")?;
    Ok(())
}

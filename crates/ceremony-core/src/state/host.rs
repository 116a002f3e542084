//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Host-side ceremony state machine: eight steps. The
//! host is not security-critical — every check it performs here is a
//! pre-flight convenience the enclave re-verifies authoritatively.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ceremony_types::beacon::MAINLINE_CHAIN;
use ceremony_types::manifest::ARTIFACT_ORDER;
use tokio::net::{TcpListener, TcpStream};
use tracing::info;

use crate::attestation::cbor;
use crate::beacon;
use crate::drivers::{CircomDriver, Groth16Driver};
use crate::error::CeremonyError;
use crate::ptau;
use crate::transport;

/// A grace window added to the attestation timestamp before deriving the
/// beacon round, and a settling delay added after the round becomes public.
const ROUND_LOOKAHEAD_MS: u64 = 90_000;
const ROUND_SETTLE_SECS: u64 = 10;

/// Everything the host side needs to drive its half of a ceremony.
pub struct HostCeremony {
    pub working_dir: PathBuf,
    pub enclave_addr: String,
    pub listen_addr: String,
    pub circuit_source: PathBuf,
    pub beacon_base_url: String,
    pub circom: Box<dyn CircomDriver>,
    pub groth16: Box<dyn Groth16Driver>,
}

impl HostCeremony {
    /// Runs steps 1 through 8. Starting the enclave subprocess itself
    /// (step 3) is treated as an external orchestration concern; the enclave is assumed to already
    /// be listening at `enclave_addr` when this is called.
    pub async fn run(&self) -> Result<(), CeremonyError> {
        fs::create_dir_all(&self.working_dir)?;

        let prepared = self.compile_and_select_ptau()?;
        info!(power = prepared.power, "circuit compiled, PTAU selected");

        let initial_zkey_path = self.working_dir.join(ARTIFACT_ORDER[2]);
        self.groth16
            .new_zkey(&prepared.r1cs_path, &prepared.ptau_path, &initial_zkey_path)?;
        info!("local new_zkey done (enclave re-verifies)");

        self.send_initial_batch(&prepared.ptau_path, &initial_zkey_path).await?;
        info!("sent circuit, PTAU, and initial zkey to enclave");

        let timestamp_ms = self.await_time_attestation().await?;
        info!(timestamp_ms, "received time-attestation");

        let round = beacon::round_at(timestamp_ms + ROUND_LOOKAHEAD_MS, &MAINLINE_CHAIN);
        self.sleep_until_round_available(round).await;

        let beacon_bytes = self.fetch_and_send_beacon(round).await?;
        info!(round, bytes = beacon_bytes.len(), "sent beacon to enclave");

        self.receive_final_artifacts().await?;
        info!("received final artifact batch; ceremony complete");

        Ok(())
    }

    fn compile_and_select_ptau(&self) -> Result<PreparedCircuit, CeremonyError> {
        let circuit_path = self.working_dir.join(ARTIFACT_ORDER[0]);
        fs::copy(&self.circuit_source, &circuit_path)?;

        let compiled = self.circom.compile(&circuit_path, &self.working_dir)?;
        let descriptor = ptau::select(compiled.constraint_count)?;

        let ptau_bytes = fetch_ptau_bytes(descriptor.source_url)?;
        ptau::verify_digest(descriptor.power, &ptau_bytes)?;

        let ptau_path = self.working_dir.join(ARTIFACT_ORDER[1]);
        fs::write(&ptau_path, &ptau_bytes)?;

        Ok(PreparedCircuit {
            r1cs_path: compiled.r1cs_path,
            ptau_path,
            power: descriptor.power,
        })
    }

    async fn send_initial_batch(&self, ptau_path: &std::path::Path, initial_zkey_path: &std::path::Path) -> Result<(), CeremonyError> {
        let circuit_bytes = fs::read(self.working_dir.join(ARTIFACT_ORDER[0]))?;
        let ptau_bytes = fs::read(ptau_path)?;
        let initial_zkey_bytes = fs::read(initial_zkey_path)?;

        let stream = TcpStream::connect(&self.enclave_addr).await?;
        transport::send_files(
            stream,
            &[
                (ARTIFACT_ORDER[0], circuit_bytes.as_slice()),
                (ARTIFACT_ORDER[1], ptau_bytes.as_slice()),
                (ARTIFACT_ORDER[2], initial_zkey_bytes.as_slice()),
            ],
        )
        .await?;
        Ok(())
    }

    async fn await_time_attestation(&self) -> Result<u64, CeremonyError> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        let (stream, _) = listener.accept().await?;
        let files = transport::receive_files(stream, 1).await?;

        let raw = &files[0].body;
        fs::write(self.working_dir.join(ARTIFACT_ORDER[5]), raw)?;

        let envelope = cbor::decode_envelope(raw)?;
        let document = cbor::decode_payload(&envelope.payload)?;
        Ok(document.timestamp_ms)
    }

    async fn sleep_until_round_available(&self, round: u64) {
        let available_at = beacon::round_time(round, &MAINLINE_CHAIN) + ROUND_SETTLE_SECS;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is after 1970")
            .as_secs();
        if available_at > now {
            tokio::time::sleep(Duration::from_secs(available_at - now)).await;
        }
    }

    async fn fetch_and_send_beacon(&self, round: u64) -> Result<Vec<u8>, CeremonyError> {
        let (beacon_bytes, fetched) = beacon::fetch_round(&self.beacon_base_url, round)?;
        beacon::verify_beacon(&fetched, &MAINLINE_CHAIN)?;

        fs::write(self.working_dir.join(ARTIFACT_ORDER[6]), &beacon_bytes)?;

        let stream = TcpStream::connect(&self.enclave_addr).await?;
        transport::send_files(stream, &[(ARTIFACT_ORDER[6], beacon_bytes.as_slice())]).await?;
        Ok(beacon_bytes)
    }

    async fn receive_final_artifacts(&self) -> Result<(), CeremonyError> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        let (stream, _) = listener.accept().await?;
        let files = transport::receive_files(stream, 9).await?;
        for file in &files {
            fs::write(self.working_dir.join(&file.name), &file.body)?;
        }
        Ok(())
    }
}

struct PreparedCircuit {
    r1cs_path: PathBuf,
    ptau_path: PathBuf,
    power: u8,
}

/// Fetches the PTAU file by URL. A suspension point; uses the blocking
/// client for the same reason `beacon::client` does.
fn fetch_ptau_bytes(url: &str) -> Result<Vec<u8>, CeremonyError> {
    let response = reqwest::blocking::get(url).map_err(|e| crate::error::PtauError::Fetch(e.to_string()))?;
    if !response.status().is_success() {
        return Err(CeremonyError::Ptau(crate::error::PtauError::Fetch(format!(
            "unexpected status {} fetching {url}",
            response.status()
        ))));
    }
    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| CeremonyError::Ptau(crate::error::PtauError::Fetch(e.to_string())))
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Enclave-side ceremony state machine: 17 sequential
//! phases, no back-edges, any failure terminal.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ceremony_types::beacon::MAINLINE_CHAIN;
use ceremony_types::manifest::{ARTIFACT_ORDER, FINAL_ATTESTATION_FILE_NAME, MANIFEST_FILE_NAME};
use sha2::{Digest, Sha256};
use tokio::net::{TcpListener, TcpStream};
use tracing::info;

use crate::attestation::{self, IssuerClient};
use crate::beacon;
use crate::drivers::{CircomDriver, Groth16Driver, SolcDriver};
use crate::error::{AttestationError, CeremonyError, Groth16Error};
use crate::manifest;
use crate::ptau;
use crate::rng_gate::{self, RngSource};
use crate::secret::Secret;
use crate::transport;

/// Everything the enclave side needs to drive a ceremony to completion.
///
/// The four subprocess drivers are trait objects so tests can supply fakes
/// without a real `snarkjs`/`circom`/`solc` toolchain installed.
pub struct EnclaveCeremony {
    pub working_dir: PathBuf,
    pub listen_addr: String,
    pub host_addr: String,
    pub rng_source: Box<dyn RngSource + Send + Sync>,
    pub circom: Box<dyn CircomDriver>,
    pub groth16: Box<dyn Groth16Driver>,
    pub solc: Box<dyn SolcDriver>,
    pub issuer: IssuerClient,
    pub pinned_root_der: Vec<u8>,
}

const INTERMEDIATE_ZKEY_NAME: &str = "circuit_0001.zkey";
const CONTRIBUTION_LABEL: &str = "ceremony";
const BEACON_ITERATIONS: u32 = 10;

impl EnclaveCeremony {
    /// Runs phases 1 (`RNG_CHECK`) through 17 (`SHIP_ARTIFACTS`) in order.
    pub async fn run(&self) -> Result<(), CeremonyError> {
        rng_gate::check(self.rng_source.as_ref())?;
        info!("RNG_CHECK passed");

        let inputs = self.await_inputs().await?;
        info!("AWAIT_INPUTS received 3 files");

        let compiled = self
            .circom
            .compile(&inputs.circuit_path, &self.working_dir)?;
        info!(constraints = compiled.constraint_count, "COMPILE done");

        let ptau_bytes = fs::read(&inputs.ptau_path)?;
        let descriptor = ptau::select(compiled.constraint_count)?;
        ptau::verify_digest(descriptor.power, &ptau_bytes)?;
        info!(power = descriptor.power, "PTAU_CHECK passed");

        self.verify_zkey(&inputs.initial_zkey_path, &compiled.r1cs_path, &inputs.ptau_path, "initial")?;
        info!("VERIFY_INITIAL passed");

        let intermediate_zkey_path = self.working_dir.join(INTERMEDIATE_ZKEY_NAME);
        self.contribute(&inputs.initial_zkey_path, &intermediate_zkey_path)?;
        info!("CONTRIBUTE done");

        self.verify_zkey(&intermediate_zkey_path, &compiled.r1cs_path, &inputs.ptau_path, "intermediate")?;
        info!("VERIFY_INTERMEDIATE passed");

        let (raw_time_attestation, timestamp_ms) = self.time_attestation(&intermediate_zkey_path)?;
        info!(timestamp_ms, "TIME_ATTESTATION done");

        self.ship_attestation(&raw_time_attestation).await?;
        info!("SHIP_ATTESTATION sent");

        let expected_round = beacon::round_at(timestamp_ms + 90_000, &MAINLINE_CHAIN);
        let beacon_bytes = self.await_beacon().await?;
        info!(round = expected_round, "AWAIT_BEACON received");

        let beacon = self.verify_beacon(&beacon_bytes, expected_round)?;
        info!("VERIFY_BEACON passed");

        let final_zkey_path = self.working_dir.join(ARTIFACT_ORDER[7]);
        self.groth16
            .apply_beacon(
                &intermediate_zkey_path,
                &final_zkey_path,
                &beacon.randomness_hex,
                BEACON_ITERATIONS,
                CONTRIBUTION_LABEL,
            )?;
        info!("APPLY_BEACON done");

        self.verify_zkey(&final_zkey_path, &compiled.r1cs_path, &inputs.ptau_path, "final")?;
        info!("VERIFY_FINAL passed");

        self.export_verifier(&final_zkey_path)?;
        info!("EXPORT_VERIFIER done");

        let hash_of_hashes = self.commit()?;
        info!("COMMIT done");

        self.final_attestation(&hash_of_hashes)?;
        info!("FINAL_ATTESTATION done");

        self.ship_artifacts().await?;
        info!("SHIP_ARTIFACTS sent");

        Ok(())
    }

    async fn await_inputs(&self) -> Result<ReceivedInputs, CeremonyError> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        let (stream, _) = listener.accept().await?;
        let files = transport::receive_files(stream, 3).await?;

        let circuit_path = self.working_dir.join(ARTIFACT_ORDER[0]);
        let ptau_path = self.working_dir.join(ARTIFACT_ORDER[1]);
        let initial_zkey_path = self.working_dir.join(ARTIFACT_ORDER[2]);
        fs::write(&circuit_path, &files[0].body)?;
        fs::write(&ptau_path, &files[1].body)?;
        fs::write(&initial_zkey_path, &files[2].body)?;

        Ok(ReceivedInputs {
            circuit_path,
            ptau_path,
            initial_zkey_path,
        })
    }

    fn verify_zkey(
        &self,
        zkey: &Path,
        r1cs: &Path,
        ptau: &Path,
        label: &str,
    ) -> Result<(), CeremonyError> {
        let ok = self.groth16.verify_key(zkey, r1cs, ptau)?;
        if !ok {
            return Err(CeremonyError::Groth16(Groth16Error::VerificationFailed(label.to_string())));
        }
        Ok(())
    }

    fn contribute(&self, zkey_in: &Path, zkey_out: &Path) -> Result<(), CeremonyError> {
        let mut raw = Secret::new(self.rng_source.random_bytes(32)?);
        let mut hex_randomness = Secret::new(hex::encode(raw.expose_secret()));
        let result = self
            .groth16
            .contribute(zkey_in, zkey_out, hex_randomness.expose_secret(), CONTRIBUTION_LABEL);
        raw.zeroize_now();
        hex_randomness.zeroize_now();
        Ok(result?)
    }

    fn time_attestation(&self, intermediate_zkey: &Path) -> Result<(Vec<u8>, u64), CeremonyError> {
        let intermediate_bytes = fs::read(intermediate_zkey)?;
        let nonce_hex = hex::encode(Sha256::digest(&intermediate_bytes));

        let raw = self.issuer.request(Some(&nonce_hex), None)?;
        let document = attestation::parse_and_verify(&raw, &self.pinned_root_der, SystemTime::now())?;

        let expected_nonce = hex::decode(&nonce_hex).expect("hex::encode output is always valid hex");
        if document.nonce.as_deref() != Some(expected_nonce.as_slice()) {
            return Err(CeremonyError::Attestation(AttestationError::NonceMismatch));
        }

        let path = self.working_dir.join(ARTIFACT_ORDER[5]);
        fs::write(&path, &raw)?;
        Ok((raw, document.timestamp_ms))
    }

    async fn ship_attestation(&self, raw_time_attestation: &[u8]) -> Result<(), CeremonyError> {
        let stream = TcpStream::connect(&self.host_addr).await?;
        transport::send_files(stream, &[(ARTIFACT_ORDER[5], raw_time_attestation)]).await?;
        Ok(())
    }

    async fn await_beacon(&self) -> Result<Vec<u8>, CeremonyError> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        let (stream, _) = listener.accept().await?;
        let files = transport::receive_files(stream, 1).await?;
        let path = self.working_dir.join(ARTIFACT_ORDER[6]);
        fs::write(&path, &files[0].body)?;
        Ok(files[0].body.clone())
    }

    fn verify_beacon(
        &self,
        beacon_bytes: &[u8],
        expected_round: u64,
    ) -> Result<ceremony_types::beacon::Beacon, CeremonyError> {
        let parsed = beacon::parse_beacon_json(beacon_bytes)?;
        if parsed.round != expected_round {
            return Err(CeremonyError::Beacon(crate::error::BeaconError::WrongRound {
                expected: expected_round,
                found: parsed.round,
            }));
        }
        beacon::verify_beacon(&parsed, &MAINLINE_CHAIN)?;
        Ok(parsed)
    }

    fn export_verifier(&self, final_zkey: &Path) -> Result<(), CeremonyError> {
        let verifier_sol = self.working_dir.join(ARTIFACT_ORDER[8]);
        self.groth16
            .export_solidity_verifier(final_zkey, &verifier_sol)?;

        let solc_output = self.solc.compile(&verifier_sol)?;
        fs::write(self.working_dir.join(ARTIFACT_ORDER[9]), &solc_output.creation_bytecode_hex)?;
        fs::write(self.working_dir.join(ARTIFACT_ORDER[10]), &solc_output.runtime_keccak256_hex)?;
        Ok(())
    }

    fn commit(&self) -> Result<String, CeremonyError> {
        let built = manifest::build(&self.working_dir)?;
        fs::write(self.working_dir.join(MANIFEST_FILE_NAME), &built.text)?;
        Ok(manifest::hash_of_hashes(&built))
    }

    fn final_attestation(&self, hash_of_hashes: &str) -> Result<(), CeremonyError> {
        let built = manifest::build(&self.working_dir)?;
        let nonce_hex = &built.final_attestation_nonce_hex;

        let raw = self.issuer.request(Some(nonce_hex), Some(hash_of_hashes))?;
        let document = attestation::parse_and_verify(&raw, &self.pinned_root_der, SystemTime::now())?;

        let expected_nonce = hex::decode(nonce_hex).expect("hex::encode output is always valid hex");
        if document.nonce.as_deref() != Some(expected_nonce.as_slice()) {
            return Err(CeremonyError::Attestation(AttestationError::NonceMismatch));
        }
        let expected_user_data = hex::decode(hash_of_hashes).expect("hex::encode output is always valid hex");
        if document.user_data.as_deref() != Some(expected_user_data.as_slice()) {
            return Err(CeremonyError::Attestation(AttestationError::UserDataMismatch));
        }

        fs::write(self.working_dir.join(FINAL_ATTESTATION_FILE_NAME), &raw)?;
        Ok(())
    }

    async fn ship_artifacts(&self) -> Result<(), CeremonyError> {
        let names = [
            ARTIFACT_ORDER[3],
            ARTIFACT_ORDER[4],
            ARTIFACT_ORDER[6],
            ARTIFACT_ORDER[7],
            ARTIFACT_ORDER[8],
            ARTIFACT_ORDER[9],
            ARTIFACT_ORDER[10],
            MANIFEST_FILE_NAME,
            FINAL_ATTESTATION_FILE_NAME,
        ];
        let mut buffers = Vec::with_capacity(names.len());
        for name in names {
            buffers.push(fs::read(self.working_dir.join(name))?);
        }
        let batch: Vec<(&str, &[u8])> = names.iter().zip(buffers.iter()).map(|(n, b)| (*n, b.as_slice())).collect();

        let stream = TcpStream::connect(&self.host_addr).await?;
        transport::send_files(stream, &batch).await?;
        Ok(())
    }
}

struct ReceivedInputs {
    circuit_path: PathBuf,
    ptau_path: PathBuf,
    initial_zkey_path: PathBuf,
}

//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Socket-based integration test for the framed local transport's
//! round-trip property.

use ceremony_core::transport::{receive_files, send_files};
use sha2::{Digest, Sha256};
use tokio::net::{TcpListener, TcpStream};

#[tokio::test]
async fn round_trips_a_batch_of_files_over_a_real_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let batch: Vec<(&str, &[u8])> = vec![
        ("circuit.circom", b"pragma circom 2.0.0;"),
        ("powersOfTau.ptau", &[0xAB; 4096]),
        ("circuit_0000.zkey", b"not a real zkey"),
    ];

    let sender = tokio::spawn(async move {
        let stream = TcpStream::connect(addr).await.unwrap();
        send_files(stream, &batch).await.unwrap();
    });

    let (server_stream, _) = listener.accept().await.unwrap();
    let received = receive_files(server_stream, 3).await.unwrap();
    sender.await.unwrap();

    assert_eq!(received.len(), 3);
    assert_eq!(received[0].name, "circuit.circom");
    assert_eq!(received[0].body, b"pragma circom 2.0.0;");
    assert_eq!(received[1].body.len(), 4096);
    assert_eq!(received[2].name, "circuit_0000.zkey");

    for file in &received {
        assert_eq!(file.sha256_hex, hex::encode(Sha256::digest(&file.body)));
    }
}

#[tokio::test]
async fn disconnect_mid_batch_is_reported_as_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let sender = tokio::spawn(async move {
        let stream = TcpStream::connect(addr).await.unwrap();
        send_files(stream, &[("a", b"only one file" as &[u8])]).await.unwrap();
    });

    let (server_stream, _) = listener.accept().await.unwrap();
    let result = receive_files(server_stream, 2).await;
    sender.await.unwrap();

    assert!(result.is_err());
}

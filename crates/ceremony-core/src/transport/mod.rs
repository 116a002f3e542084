//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Framed local transport for the enclave/host channel.
//!
//! A connection-per-batch, multi-file, single-direction-at-a-time protocol.
//! Deliberately not `tokio_util::codec::LengthDelimitedCodec` (the more usual
//! choice, see `trustedge-core::transport::tcp`) because the wire header here
//! has an exact 10-byte little-endian shape, a name field, and a one-byte
//! resync tolerance the stock codec cannot express.

use crate::error::TransportError;
use ceremony_types::frame::{header_is_sane, HEADER_LEN, MAX_NAME_LEN};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A single received file: its basename, body bytes, and incrementally
/// computed SHA-256 digest.
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub name: String,
    pub body: Vec<u8>,
    pub sha256_hex: String,
}

/// Sends a fixed, ordered batch of (name, body) pairs over `stream`, then
/// half-closes and waits for the peer to close.
pub async fn send_files<W>(mut stream: W, files: &[(&str, &[u8])]) -> Result<(), TransportError>
where
    W: AsyncWrite + AsyncRead + Unpin,
{
    for (name, body) in files {
        send_one(&mut stream, name, body).await?;
    }
    stream.shutdown().await?;
    // Wait for the peer to close its side; a nonzero read means the peer
    // sent unexpected trailing bytes, which we simply drain and ignore —
    // the protocol has no post-batch handshake.
    let mut sink = [0u8; 64];
    loop {
        match stream.read(&mut sink).await {
            Ok(0) => break,
            Ok(_) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

async fn send_one<W>(stream: &mut W, name: &str, body: &[u8]) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let name_bytes = name.as_bytes();
    let size = body.len() as u64;
    let name_len = name_bytes.len() as u16;
    if !header_is_sane(size, name_len) {
        return Err(TransportError::InvalidHeader { size, name_len });
    }

    let mut header = [0u8; HEADER_LEN];
    header[0..8].copy_from_slice(&size.to_le_bytes());
    header[8..10].copy_from_slice(&name_len.to_le_bytes());

    // `write_all` already loops internally until every byte of each buffer
    // is consumed, the guarantee the underlying send primitive must provide.
    stream.write_all(&header).await?;
    stream.write_all(name_bytes).await?;
    stream.write_all(body).await?;
    Ok(())
}

/// Accepts exactly `expected` files from `stream` in order. Any fewer (due
/// to early peer disconnect) is a [`TransportError::FileCountMismatch`].
pub async fn receive_files<R>(
    mut stream: R,
    expected: usize,
) -> Result<Vec<ReceivedFile>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut out = Vec::with_capacity(expected);
    for _ in 0..expected {
        out.push(receive_one(&mut stream).await?);
    }
    if out.len() != expected {
        return Err(TransportError::FileCountMismatch {
            expected,
            received: out.len(),
        });
    }
    Ok(out)
}

/// Parser states for a single file: `HEADER -> NAME -> BODY -> done`.
async fn receive_one<R>(stream: &mut R) -> Result<ReceivedFile, TransportError>
where
    R: AsyncRead + Unpin,
{
    let (size, name_len) = read_header_with_resync(stream).await?;

    let mut name_buf = vec![0u8; name_len as usize];
    read_exact_or_disconnect(stream, &mut name_buf).await?;
    let raw_name = String::from_utf8(name_buf).map_err(|_| TransportError::InvalidName)?;
    let name = basename(&raw_name);

    let mut hasher = Sha256::new();
    let mut body = Vec::with_capacity(size as usize);
    let mut remaining = size;
    let mut chunk = [0u8; 64 * 1024];
    while remaining > 0 {
        let take = remaining.min(chunk.len() as u64) as usize;
        read_exact_or_disconnect(stream, &mut chunk[..take]).await?;
        hasher.update(&chunk[..take]);
        body.extend_from_slice(&chunk[..take]);
        remaining -= take as u64;
    }
    let sha256_hex = hex::encode(hasher.finalize());

    Ok(ReceivedFile {
        name,
        body,
        sha256_hex,
    })
}

/// Reads a 10-byte header candidate; if it fails the sanity predicate,
/// slides the window forward one byte and retries.
async fn read_header_with_resync<R>(stream: &mut R) -> Result<(u64, u16), TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut window = [0u8; HEADER_LEN];
    read_exact_or_disconnect(stream, &mut window).await?;

    loop {
        let size = u64::from_le_bytes(window[0..8].try_into().unwrap());
        let name_len = u16::from_le_bytes(window[8..10].try_into().unwrap());
        if header_is_sane(size, name_len) {
            return Ok((size, name_len));
        }
        window.copy_within(1.., 0);
        let mut next_byte = [0u8; 1];
        read_exact_or_disconnect(stream, &mut next_byte).await?;
        window[HEADER_LEN - 1] = next_byte[0];
    }
}

async fn read_exact_or_disconnect<R>(stream: &mut R, buf: &mut [u8]) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
{
    match stream.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(TransportError::Disconnected)
        }
        Err(e) => Err(e.into()),
    }
}

/// Applies basename semantics: keeps only the final path component, so a
/// sender-supplied path separator cannot escape the receiver's working
/// directory.
fn basename(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or(name).to_string()
}

#[allow(dead_code)]
const _ASSERT_MAX_NAME_LEN_TYPE: u16 = MAX_NAME_LEN;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn round_trips_name_and_body() {
        let mut buf = Vec::new();
        send_one(&mut buf, "hi.x", b"hello").await.unwrap();

        assert_eq!(
            &buf[..10],
            &[0x05, 0, 0, 0, 0, 0, 0, 0, 0x04, 0x00],
            "frame header must be little-endian size then little-endian name_len"
        );

        let mut cursor = Cursor::new(buf);
        let received = receive_one(&mut cursor).await.unwrap();
        assert_eq!(received.name, "hi.x");
        assert_eq!(received.body, b"hello");
        assert_eq!(
            received.sha256_hex,
            hex::encode(Sha256::digest(b"hello"))
        );
    }

    #[tokio::test]
    async fn basename_strips_path_components() {
        let mut buf = Vec::new();
        send_one(&mut buf, "a/b/c.txt", b"x").await.unwrap();
        let mut cursor = Cursor::new(buf);
        let received = receive_one(&mut cursor).await.unwrap();
        assert_eq!(received.name, "c.txt");
    }

    #[tokio::test]
    async fn resyncs_past_one_spurious_prefix_byte() {
        let mut good = Vec::new();
        send_one(&mut good, "a", b"z").await.unwrap();
        let mut with_prefix = vec![0xFFu8];
        with_prefix.extend_from_slice(&good);

        let mut cursor = Cursor::new(with_prefix);
        let received = receive_one(&mut cursor).await.unwrap();
        assert_eq!(received.name, "a");
        assert_eq!(received.body, b"z");
    }

    #[tokio::test]
    async fn rejects_oversized_name() {
        let name: String = "a".repeat(MAX_NAME_LEN as usize + 1);
        let mut buf = Vec::new();
        let err = send_one(&mut buf, &name, b"x").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidHeader { .. }));
    }

    #[tokio::test]
    async fn receive_files_counts_exactly() {
        let mut buf = Vec::new();
        send_one(&mut buf, "a", b"1").await.unwrap();
        send_one(&mut buf, "b", b"22").await.unwrap();
        let mut cursor = Cursor::new(buf);
        let files = receive_files(&mut cursor, 2).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a");
        assert_eq!(files[1].body, b"22");
    }

    #[tokio::test]
    async fn short_batch_is_disconnected_error() {
        let mut buf = Vec::new();
        send_one(&mut buf, "a", b"1").await.unwrap();
        let mut cursor = Cursor::new(buf);
        let err = receive_files(&mut cursor, 2).await.unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }
}

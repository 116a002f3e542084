//
// Copyright (c) 2025 TRUSTEDGE LABS LLC
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: trustedge — Privacy and trust at the edge.
//

//! Secret wrapper type for sensitive values.
//!
//! Provides [`Secret<T>`] — a wrapper that:
//! - Redacts the inner value in `Debug` output (always prints `[REDACTED]`)
//! - Zeroizes memory on drop via [`ZeroizeOnDrop`]
//! - Requires explicit access through [`Secret::expose_secret`]
//! - Does NOT implement `Display`, `Deref`, `Serialize`, or `Deserialize`

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A wrapper around a sensitive value `T` that zeroizes memory on drop and
/// always redacts the inner value in `Debug` output.
///
/// # Usage
///
/// ```rust
/// use ceremony_core::Secret;
///
/// let api_key = Secret::new("my-secret-api-key".to_string());
///
/// // Debug output is always redacted
/// assert!(format!("{:?}", api_key).contains("[REDACTED]"));
///
/// // Access inner value explicitly
/// assert_eq!(api_key.expose_secret(), "my-secret-api-key");
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    /// Wrap a sensitive value.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Access the inner secret value.
    ///
    /// The caller is responsible for not leaking the returned reference
    /// (e.g., do not log it, store it in non-zeroizing types, etc.).
    pub fn expose_secret(&self) -> &T {
        &self.0
    }

    /// Overwrite the inner value with zeros immediately, without waiting for
    /// `Drop`. Used on every exit path out of `CONTRIBUTE` so
    /// the raw random bytes and derived hex string never outlive their one
    /// use as the `contribute` randomness parameter.
    pub fn zeroize_now(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl<T: Clone + Zeroize> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Zeroize + PartialEq> PartialEq for Secret<T> {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

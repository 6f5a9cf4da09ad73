// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sender key handling.
//!
//! The sender key is loaded once at startup, either from a hex string or
//! from a PEM file (SEC1 or PKCS#8), and then lives only inside
//! [`SenderKey`]. Its `Debug` output shows the public address only, and no
//! error message produced here echoes key material.

use std::fmt;
use std::str::FromStr;

use alloy::{network::EthereumWallet, primitives::Address, signers::local::PrivateKeySigner};
use k256::SecretKey;

/// Errors raised while loading a private key.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// The process's signing credential.
#[derive(Clone)]
pub struct SenderKey {
    signer: PrivateKeySigner,
}

impl SenderKey {
    /// Parse a hex-encoded private key (64 characters, `0x` prefix optional).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, KeyError> {
        let trimmed = private_key_hex.trim();
        let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        if hex.len() != 64 {
            return Err(KeyError::InvalidPrivateKey(
                "expected 32 bytes (64 hex characters)".to_string(),
            ));
        }

        let key_bytes = alloy::hex::decode(hex)
            .map_err(|_| KeyError::InvalidPrivateKey("not valid hex".to_string()))?;

        Self::from_bytes(&key_bytes)
    }

    /// Parse a PEM-encoded secp256k1 private key.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, KeyError> {
        let pem_str = std::str::from_utf8(pem_bytes)
            .map_err(|_| KeyError::InvalidPrivateKey("PEM is not valid UTF-8".to_string()))?;

        let pem = pem::parse(pem_str)
            .map_err(|e| KeyError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

        let secret_key = SecretKey::from_sec1_der(pem.contents())
            .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
            .map_err(|_| {
                KeyError::InvalidPrivateKey("not a SEC1 or PKCS#8 secp256k1 key".to_string())
            })?;

        Self::from_bytes(&secret_key.to_bytes())
    }

    fn from_bytes(key_bytes: &[u8]) -> Result<Self, KeyError> {
        let signer = PrivateKeySigner::from_slice(key_bytes).map_err(|_| {
            KeyError::InvalidPrivateKey("not a valid secp256k1 scalar".to_string())
        })?;
        Ok(Self { signer })
    }

    /// Public address derived from the key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wallet used to sign transaction requests.
    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl FromStr for SenderKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for SenderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenderKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Parse PKCS#8 DER to extract the secret key.
fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

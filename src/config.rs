// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and
//! validated before anything else runs. Any error here is fatal.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_URL` | JSON-RPC endpoint of the EVM node | Required |
//! | `CONTRACT_ADDRESS` | SpaceBucks contract address | Required (server) |
//! | `SIGNER_PRIVATE_KEY` | Sender key, hex with or without `0x` | One of key/file required |
//! | `SIGNER_KEY_FILE` | Sender key as a PEM file (SEC1 or PKCS#8) | One of key/file required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8000` |
//! | `DATA_DIR` | Directory of the history database | `./data` |
//! | `MIN_TRANSFER_AMOUNT` | Smallest transfer accepted, display units | one smallest unit |
//! | `CONFIRMATION_TIMEOUT_SECS` | How long to wait for a receipt | `60` |
//! | `RECEIPT_POLL_INTERVAL_MS` | Receipt poll interval | `500` |
//! | `HISTORY_CHUNK_SIZE` | Blocks per `eth_getLogs` request | `2000` |
//! | `HISTORY_POLL_SECS` | Background history sync interval, `0` disables | `5` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::{Address, U256};

use crate::blockchain::{parse_address, parse_amount, ConfirmationPolicy, KeyError, SenderKey};
use crate::indexer::{DEFAULT_CHUNK_SIZE, DEFAULT_POLL_INTERVAL};

pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CONTRACT_ADDRESS_ENV: &str = "CONTRACT_ADDRESS";
/// Never logged; the value lives only inside [`SenderKey`] once parsed.
pub const SIGNER_PRIVATE_KEY_ENV: &str = "SIGNER_PRIVATE_KEY";
pub const SIGNER_KEY_FILE_ENV: &str = "SIGNER_KEY_FILE";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const MIN_TRANSFER_AMOUNT_ENV: &str = "MIN_TRANSFER_AMOUNT";
pub const CONFIRMATION_TIMEOUT_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";
pub const RECEIPT_POLL_INTERVAL_ENV: &str = "RECEIPT_POLL_INTERVAL_MS";
pub const HISTORY_CHUNK_SIZE_ENV: &str = "HISTORY_CHUNK_SIZE";
pub const HISTORY_POLL_SECS_ENV: &str = "HISTORY_POLL_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATA_DIR: &str = "./data";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Failed to read {var}: {source}")]
    Io {
        var: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Key(#[from] KeyError),
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(v) if v.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(v) if v.eq_ignore_ascii_case("pretty") => Ok(Self::Pretty),
            Some(other) => Err(invalid(LOG_FORMAT_ENV, format!("unknown format {other:?}"))),
        }
    }
}

/// What every binary needs to talk to the node as the sender.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: url::Url,
    pub signer: SenderKey,
}

impl ChainConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let rpc_url = required(&lookup, RPC_URL_ENV)?;
        let rpc_url = url::Url::parse(&rpc_url).map_err(|e| invalid(RPC_URL_ENV, e))?;

        let signer = match (
            non_empty(&lookup, SIGNER_PRIVATE_KEY_ENV),
            non_empty(&lookup, SIGNER_KEY_FILE_ENV),
        ) {
            (Some(hex), None) => SenderKey::from_hex(&hex)?,
            (None, Some(path)) => {
                let pem = std::fs::read(&path).map_err(|source| ConfigError::Io {
                    var: SIGNER_KEY_FILE_ENV,
                    source,
                })?;
                SenderKey::from_pem(&pem)?
            }
            (Some(_), Some(_)) => {
                return Err(invalid(
                    SIGNER_PRIVATE_KEY_ENV,
                    format!("set only one of {SIGNER_PRIVATE_KEY_ENV} and {SIGNER_KEY_FILE_ENV}"),
                ))
            }
            (None, None) => return Err(ConfigError::Missing(SIGNER_PRIVATE_KEY_ENV)),
        };

        Ok(Self { rpc_url, signer })
    }
}

/// Certificate and key files for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Full server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub contract_address: Address,
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    /// Display units; converted once the token's decimals are known.
    pub min_transfer_amount: Option<String>,
    pub confirmation: ConfirmationPolicy,
    pub history_chunk_size: u64,
    /// `None` disables the background sync.
    pub history_poll_interval: Option<Duration>,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let chain = ChainConfig::from_lookup(&lookup)?;

        let contract_address = required(&lookup, CONTRACT_ADDRESS_ENV)?;
        let contract_address =
            parse_address(contract_address.trim()).map_err(|e| invalid(CONTRACT_ADDRESS_ENV, e))?;

        let host = non_empty(&lookup, HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parsed(&lookup, PORT_ENV)?.unwrap_or(DEFAULT_PORT);
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| invalid(HOST_ENV, e))?;

        let data_dir = non_empty(&lookup, DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let defaults = ConfirmationPolicy::default();
        let confirmation = ConfirmationPolicy {
            timeout: parsed(&lookup, CONFIRMATION_TIMEOUT_ENV)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            poll_interval: parsed(&lookup, RECEIPT_POLL_INTERVAL_ENV)?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        };
        if confirmation.poll_interval.is_zero() {
            return Err(invalid(RECEIPT_POLL_INTERVAL_ENV, "must be greater than 0"));
        }

        let history_chunk_size = parsed(&lookup, HISTORY_CHUNK_SIZE_ENV)?.unwrap_or(DEFAULT_CHUNK_SIZE);
        if history_chunk_size == 0 {
            return Err(invalid(HISTORY_CHUNK_SIZE_ENV, "must be greater than 0"));
        }

        let history_poll_interval = match parsed::<u64>(&lookup, HISTORY_POLL_SECS_ENV)? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(DEFAULT_POLL_INTERVAL),
        };

        let tls = match (
            non_empty(&lookup, TLS_CERT_PATH_ENV),
            non_empty(&lookup, TLS_KEY_PATH_ENV),
        ) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            chain,
            contract_address,
            bind_addr,
            data_dir,
            min_transfer_amount: non_empty(&lookup, MIN_TRANSFER_AMOUNT_ENV),
            confirmation,
            history_chunk_size,
            history_poll_interval,
            tls,
        })
    }

    /// Minimum transfer in smallest units for a token with `decimals`.
    pub fn min_transfer_units(&self, decimals: u8) -> Result<U256, ConfigError> {
        match &self.min_transfer_amount {
            Some(amount) => {
                parse_amount(amount, decimals).map_err(|e| invalid(MIN_TRANSFER_AMOUNT_ENV, e))
            }
            None => Ok(U256::from(1u64)),
        }
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var).filter(|v| !v.trim().is_empty())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    non_empty(lookup, var).ok_or(ConfigError::Missing(var))
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    non_empty(lookup, var)
        .map(|v| v.trim().parse::<T>().map_err(|e| invalid(var, e)))
        .transpose()
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names and the settings structs built from them.
//! The environment is read once at startup; everything below this module
//! receives explicit settings values.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ENGINE_NODEBALANCER_ACCESS_ID` | Access id appended to node balancer endpoints | Required |
//! | `MOONSTREAM_MUMBAI_WEB3_PROVIDER_URI` | Mumbai node balancer base URI | Required |
//! | `MOONSTREAM_POLYGON_WEB3_PROVIDER_URI` | Polygon node balancer base URI | Required |
//! | `TERMINUS_CONTRACT_POLYGON_ADDRESS` | Terminus contract on Polygon | Required for polygon |
//! | `TERMINUS_CONTRACT_MUMBAI_ADDRESS` | Terminus contract on Mumbai | Required for mumbai |
//! | `TERMINUS_CONTRACT_CALDERA_ADDRESS` | Terminus contract on Caldera | Required for caldera |
//! | `ROBOT_NETWORK` | Network the robot mints on | Required |
//! | `ROBOT_POOL_ID` | Terminus pool to mint from | Required |
//! | `ROBOT_MINT_VALUE` | Units minted per claimant | `1` |
//! | `ROBOT_CLAIMANTS_FILE` | JSON file with `[{"address": "0x…"}]` | Required |
//! | `ROBOT_BATCH_SIZE` | Claimants per mint transaction | `100` |
//! | `ROBOT_POLL_INTERVAL_SECS` | Seconds between sweeps | `60` |
//! | `ROBOT_MINT_TIMEOUT_SECS` | Seconds to wait for a submitted mint before retrying it | `1800` |
//! | `ROBOT_SIGNER_PRIVATE_KEY` | Hex private key of the minting account | Required |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::NetworkName;
use crate::error::TerminusError;

/// Access id shared by all node balancer endpoints.
pub const NODEBALANCER_ACCESS_ID_ENV: &str = "ENGINE_NODEBALANCER_ACCESS_ID";

/// Base URI of the Mumbai node balancer.
pub const MUMBAI_WEB3_PROVIDER_URI_ENV: &str = "MOONSTREAM_MUMBAI_WEB3_PROVIDER_URI";

/// Base URI of the Polygon node balancer.
pub const POLYGON_WEB3_PROVIDER_URI_ENV: &str = "MOONSTREAM_POLYGON_WEB3_PROVIDER_URI";

pub const TERMINUS_POLYGON_ADDRESS_ENV: &str = "TERMINUS_CONTRACT_POLYGON_ADDRESS";
pub const TERMINUS_MUMBAI_ADDRESS_ENV: &str = "TERMINUS_CONTRACT_MUMBAI_ADDRESS";
pub const TERMINUS_CALDERA_ADDRESS_ENV: &str = "TERMINUS_CONTRACT_CALDERA_ADDRESS";

pub const ROBOT_NETWORK_ENV: &str = "ROBOT_NETWORK";
pub const ROBOT_POOL_ID_ENV: &str = "ROBOT_POOL_ID";
pub const ROBOT_MINT_VALUE_ENV: &str = "ROBOT_MINT_VALUE";
pub const ROBOT_CLAIMANTS_FILE_ENV: &str = "ROBOT_CLAIMANTS_FILE";
pub const ROBOT_BATCH_SIZE_ENV: &str = "ROBOT_BATCH_SIZE";
pub const ROBOT_POLL_INTERVAL_ENV: &str = "ROBOT_POLL_INTERVAL_SECS";
pub const ROBOT_MINT_TIMEOUT_ENV: &str = "ROBOT_MINT_TIMEOUT_SECS";
pub const ROBOT_SIGNER_KEY_ENV: &str = "ROBOT_SIGNER_PRIVATE_KEY";

/// Logging format selector (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

const DEFAULT_MINT_VALUE: u64 = 1;
const DEFAULT_BATCH_SIZE: usize = 100;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_MINT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Inputs for [`NetworkRegistry`](crate::blockchain::NetworkRegistry).
///
/// Values are kept as read; the registry decides what counts as missing.
#[derive(Debug, Clone, Default)]
pub struct NetworkSettings {
    pub access_id: Option<String>,
    pub mumbai_provider_uri: Option<String>,
    pub polygon_provider_uri: Option<String>,
}

impl NetworkSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            access_id: lookup(NODEBALANCER_ACCESS_ID_ENV),
            mumbai_provider_uri: lookup(MUMBAI_WEB3_PROVIDER_URI_ENV),
            polygon_provider_uri: lookup(POLYGON_WEB3_PROVIDER_URI_ENV),
        }
    }
}

/// Settings of the drop robot binary.
#[derive(Clone)]
pub struct RobotSettings {
    pub network: NetworkName,
    pub pool_id: u64,
    pub mint_value: u64,
    pub claimants_file: PathBuf,
    pub batch_size: usize,
    pub poll_interval: Duration,
    /// How long a submitted mint may stay unmined before it is retried.
    pub mint_timeout: Duration,
    pub signer_private_key: String,
}

impl RobotSettings {
    pub fn from_env() -> Result<Self, TerminusError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TerminusError> {
        let network = required(&lookup, ROBOT_NETWORK_ENV)?.parse::<NetworkName>()?;
        let pool_id = parse_required(&lookup, ROBOT_POOL_ID_ENV)?;
        let mint_value = parse_or(&lookup, ROBOT_MINT_VALUE_ENV, DEFAULT_MINT_VALUE)?;
        let claimants_file = PathBuf::from(required(&lookup, ROBOT_CLAIMANTS_FILE_ENV)?);
        let batch_size = parse_or(&lookup, ROBOT_BATCH_SIZE_ENV, DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(TerminusError::Configuration {
                setting: ROBOT_BATCH_SIZE_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }
        let poll_interval = parse_or(
            &lookup,
            ROBOT_POLL_INTERVAL_ENV,
            DEFAULT_POLL_INTERVAL.as_secs(),
        )
        .map(Duration::from_secs)?;
        let mint_timeout = parse_or(
            &lookup,
            ROBOT_MINT_TIMEOUT_ENV,
            DEFAULT_MINT_TIMEOUT.as_secs(),
        )
        .map(Duration::from_secs)?;
        let signer_private_key = required(&lookup, ROBOT_SIGNER_KEY_ENV)?;

        Ok(Self {
            network,
            pool_id,
            mint_value,
            claimants_file,
            batch_size,
            poll_interval,
            mint_timeout,
            signer_private_key,
        })
    }
}

impl fmt::Debug for RobotSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RobotSettings")
            .field("network", &self.network)
            .field("pool_id", &self.pool_id)
            .field("mint_value", &self.mint_value)
            .field("claimants_file", &self.claimants_file)
            .field("batch_size", &self.batch_size)
            .field("poll_interval", &self.poll_interval)
            .field("mint_timeout", &self.mint_timeout)
            .field("signer_private_key", &"<redacted>")
            .finish()
    }
}

/// Trimmed value, with blank values treated as absent.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, TerminusError> {
    let value = lookup(key);
    non_empty(value.as_deref())
        .map(str::to_string)
        .ok_or_else(|| TerminusError::missing(key))
}

fn parse_required<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<T, TerminusError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = required(lookup, key)?;
    raw.parse::<T>().map_err(|e| TerminusError::Configuration {
        setting: key,
        reason: format!("could not parse {raw:?}: {e}"),
    })
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, TerminusError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match non_empty(lookup(key).as_deref()) {
        Some(_) => parse_required(lookup, key),
        None => Ok(default),
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use std::fmt;
use std::str::FromStr;

use alloy::{
    eips::BlockId,
    network::{Ethereum, EthereumWallet, NetworkWallet},
    primitives::{Address, TxHash},
    signers::local::PrivateKeySigner,
};
use serde::{Deserialize, Serialize};

use crate::error::TerminusError;

/// Networks the Terminus contract is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkName {
    Polygon,
    Mumbai,
    Caldera,
}

impl NetworkName {
    /// Every supported network, in registry order.
    pub const ALL: [NetworkName; 3] = [
        NetworkName::Polygon,
        NetworkName::Mumbai,
        NetworkName::Caldera,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkName::Polygon => "polygon",
            NetworkName::Mumbai => "mumbai",
            NetworkName::Caldera => "caldera",
        }
    }
}

impl fmt::Display for NetworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkName {
    type Err = TerminusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "polygon" => Ok(NetworkName::Polygon),
            "mumbai" => Ok(NetworkName::Mumbai),
            "caldera" => Ok(NetworkName::Caldera),
            other => Err(TerminusError::UnsupportedNetwork(other.to_string())),
        }
    }
}

/// A named RPC endpoint and the chain it serves.
#[derive(Clone, PartialEq, Eq)]
pub struct Network {
    pub name: NetworkName,
    /// Full RPC endpoint, including any access query string.
    pub endpoint: String,
    pub chain_id: u64,
}

// The endpoint embeds the node balancer access id.
impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("name", &self.name)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

/// A recipient targeted by a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claimant {
    /// 40 hex characters, with or without `0x`.
    pub address: String,
}

impl Claimant {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Decode the claimant address.
    pub fn parse_address(&self) -> Result<Address, TerminusError> {
        Address::from_str(&self.address).map_err(|e| TerminusError::InvalidAddress {
            address: self.address.clone(),
            reason: e.to_string(),
        })
    }
}

/// Options for read-only contract calls.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Account the call is made from.
    pub from: Option<Address>,
    /// Block to evaluate the call at; latest when unset.
    pub block: Option<BlockId>,
}

/// Signing capability and overrides for a state-changing call.
///
/// Holds the caller's wallet; the contract client only forwards it to the
/// provider that signs the transaction.
#[derive(Clone)]
pub struct TransactOptions {
    pub wallet: EthereumWallet,
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
    pub nonce: Option<u64>,
}

impl TransactOptions {
    pub fn new(wallet: EthereumWallet) -> Self {
        Self {
            wallet,
            gas_price: None,
            gas_limit: None,
            nonce: None,
        }
    }

    /// Build options from a hex-encoded private key (64 characters,
    /// optional `0x` prefix).
    pub fn from_private_key_hex(private_key_hex: &str) -> Result<Self, TerminusError> {
        let invalid = |reason: String| TerminusError::Configuration {
            setting: crate::config::ROBOT_SIGNER_KEY_ENV,
            reason,
        };

        let trimmed = private_key_hex.trim();
        let key_bytes = alloy::hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
            .map_err(|e| invalid(format!("invalid private key hex: {e}")))?;
        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| invalid(format!("invalid private key: {e}")))?;

        Ok(Self::new(EthereumWallet::from(signer)))
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// Address of the account that signs.
    pub fn signer_address(&self) -> Address {
        <EthereumWallet as NetworkWallet<Ethereum>>::default_signer_address(&self.wallet)
    }
}

impl fmt::Debug for TransactOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactOptions")
            .field("signer", &self.signer_address())
            .field("gas_price", &self.gas_price)
            .field("gas_limit", &self.gas_limit)
            .field("nonce", &self.nonce)
            .finish()
    }
}

/// A transaction accepted by the node; not necessarily confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub network: NetworkName,
    pub tx_hash: TxHash,
}

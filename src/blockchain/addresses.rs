// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Terminus contract address per network.

use std::str::FromStr;

use alloy::primitives::Address;

use super::types::NetworkName;
use crate::config::{
    non_empty, TERMINUS_CALDERA_ADDRESS_ENV, TERMINUS_MUMBAI_ADDRESS_ENV,
    TERMINUS_POLYGON_ADDRESS_ENV,
};
use crate::error::TerminusError;

/// Configured Terminus deployments, one per supported network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractAddresses {
    pub polygon: String,
    pub mumbai: String,
    pub caldera: String,
}

impl ContractAddresses {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            polygon: lookup(TERMINUS_POLYGON_ADDRESS_ENV).unwrap_or_default(),
            mumbai: lookup(TERMINUS_MUMBAI_ADDRESS_ENV).unwrap_or_default(),
            caldera: lookup(TERMINUS_CALDERA_ADDRESS_ENV).unwrap_or_default(),
        }
    }

    /// Configured string and its setting name for `network`.
    fn entry(&self, network: NetworkName) -> (&str, &'static str) {
        match network {
            NetworkName::Polygon => (self.polygon.as_str(), TERMINUS_POLYGON_ADDRESS_ENV),
            NetworkName::Mumbai => (self.mumbai.as_str(), TERMINUS_MUMBAI_ADDRESS_ENV),
            NetworkName::Caldera => (self.caldera.as_str(), TERMINUS_CALDERA_ADDRESS_ENV),
        }
    }

    /// Resolve the Terminus address deployed on `network`.
    pub fn resolve(&self, network: NetworkName) -> Result<Address, TerminusError> {
        let (raw, setting) = self.entry(network);
        let raw = non_empty(Some(raw)).ok_or_else(|| TerminusError::Configuration {
            setting,
            reason: format!("Terminus {network} contract address should be specified"),
        })?;

        Address::from_str(raw).map_err(|e| TerminusError::Configuration {
            setting,
            reason: format!("invalid Terminus {network} contract address {raw:?}: {e}"),
        })
    }

    /// Resolve by string name; unknown names fail with `UnsupportedNetwork`.
    pub fn resolve_by_name(&self, network: &str) -> Result<Address, TerminusError> {
        self.resolve(network.parse()?)
    }
}

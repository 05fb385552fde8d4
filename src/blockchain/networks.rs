// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registry of the networks the robots can reach.
//!
//! Polygon and Mumbai are routed through the node balancer, which needs the
//! access id in the query string. Caldera is a static public endpoint.

use std::collections::BTreeMap;

use super::types::{Network, NetworkName};
use crate::config::{
    non_empty, NetworkSettings, MUMBAI_WEB3_PROVIDER_URI_ENV, NODEBALANCER_ACCESS_ID_ENV,
    POLYGON_WEB3_PROVIDER_URI_ENV,
};
use crate::error::TerminusError;

pub const POLYGON_CHAIN_ID: u64 = 137;
pub const MUMBAI_CHAIN_ID: u64 = 80001;
pub const CALDERA_CHAIN_ID: u64 = 322;

/// Public Caldera RPC endpoint.
pub const CALDERA_ENDPOINT: &str = "https://wyrm.constellationchain.xyz/http";

/// Build a node balancer endpoint from its base URI and access id.
pub fn nodebalancer_endpoint(base_uri: &str, access_id: &str) -> String {
    format!("{base_uri}?access_id={access_id}&data_source=blockchain")
}

/// Named network definitions, keyed by [`NetworkName`].
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: BTreeMap<NetworkName, Network>,
}

impl NetworkRegistry {
    /// An empty registry; call [`initialize_networks`](Self::initialize_networks)
    /// before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and initialize a registry in one step.
    pub fn from_settings(settings: &NetworkSettings) -> Result<Self, TerminusError> {
        let mut registry = Self::new();
        registry.initialize_networks(settings)?;
        Ok(registry)
    }

    /// Populate every supported network from `settings`.
    ///
    /// All required values are checked before the registry is touched, so a
    /// failure leaves it as it was. Re-running overwrites the same keys.
    pub fn initialize_networks(&mut self, settings: &NetworkSettings) -> Result<(), TerminusError> {
        let access_id = non_empty(settings.access_id.as_deref())
            .ok_or_else(|| TerminusError::missing(NODEBALANCER_ACCESS_ID_ENV))?;
        let mumbai_uri = non_empty(settings.mumbai_provider_uri.as_deref())
            .ok_or_else(|| TerminusError::missing(MUMBAI_WEB3_PROVIDER_URI_ENV))?;
        let polygon_uri = non_empty(settings.polygon_provider_uri.as_deref())
            .ok_or_else(|| TerminusError::missing(POLYGON_WEB3_PROVIDER_URI_ENV))?;

        self.insert(Network {
            name: NetworkName::Mumbai,
            endpoint: nodebalancer_endpoint(mumbai_uri, access_id),
            chain_id: MUMBAI_CHAIN_ID,
        });
        self.insert(Network {
            name: NetworkName::Polygon,
            endpoint: nodebalancer_endpoint(polygon_uri, access_id),
            chain_id: POLYGON_CHAIN_ID,
        });
        self.insert(Network {
            name: NetworkName::Caldera,
            endpoint: CALDERA_ENDPOINT.to_string(),
            chain_id: CALDERA_CHAIN_ID,
        });

        tracing::debug!(networks = self.networks.len(), "Networks initialized");
        Ok(())
    }

    fn insert(&mut self, network: Network) {
        self.networks.insert(network.name, network);
    }

    pub fn get(&self, name: NetworkName) -> Option<&Network> {
        self.networks.get(&name)
    }

    /// Like [`get`](Self::get), but a network missing from an uninitialized
    /// registry is a configuration problem.
    pub fn require(&self, name: NetworkName) -> Result<&Network, TerminusError> {
        self.get(name).ok_or_else(|| TerminusError::Configuration {
            setting: "networks",
            reason: format!("{name} is not initialized"),
        })
    }

    /// Look up a network by its string name.
    ///
    /// Unknown names fail with `UnsupportedNetwork`.
    pub fn network(&self, name: &str) -> Result<&Network, TerminusError> {
        self.require(name.parse()?)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

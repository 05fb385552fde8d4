// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error type shared by the network registry, the address resolver and the
//! chain/contract clients.

/// Errors returned by the Terminus client core.
///
/// Every variant carries enough context (network, address, underlying cause)
/// for the caller to decide between fixing configuration, fixing the request
/// or retrying later. Nothing is retried inside the core.
#[derive(Debug, thiserror::Error)]
pub enum TerminusError {
    /// A required setting is missing, empty or malformed.
    #[error("Configuration error: {setting} {reason}")]
    Configuration {
        setting: &'static str,
        reason: String,
    },

    /// The requested network is not one of the supported networks.
    #[error("Not supported blockchain by Terminus contract found: {0}")]
    UnsupportedNetwork(String),

    /// Transport failure while dialing the network endpoint.
    #[error("Failed to connect to {network}: {reason}")]
    Connection { network: String, reason: String },

    /// The endpoint answered with a chain id other than the configured one.
    #[error("Endpoint for {network} reports chain id {actual}, expected {expected}")]
    ChainMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },

    /// A call reached the network but failed or was rejected.
    #[error("Remote call {operation} failed: {reason}")]
    RemoteQuery {
        operation: &'static str,
        reason: String,
    },

    /// A claimant address is not a well-formed account identifier.
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// A batch operation was called without claimants.
    #[error("{operation} requires at least one claimant")]
    EmptyBatch { operation: &'static str },

    /// The caller cancelled the operation or its deadline passed.
    #[error("{operation} was cancelled or exceeded its deadline")]
    Cancelled { operation: &'static str },
}

impl TerminusError {
    pub(crate) fn missing(setting: &'static str) -> Self {
        TerminusError::Configuration {
            setting,
            reason: "should be specified".to_string(),
        }
    }

    pub(crate) fn remote(operation: &'static str, reason: impl ToString) -> Self {
        TerminusError::RemoteQuery {
            operation,
            reason: reason.to_string(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            TerminusError::Configuration { .. } => "configuration_error",
            TerminusError::UnsupportedNetwork(_) => "unsupported_network",
            TerminusError::Connection { .. } => "connection_error",
            TerminusError::ChainMismatch { .. } => "chain_mismatch",
            TerminusError::RemoteQuery { .. } => "remote_query_error",
            TerminusError::InvalidAddress { .. } => "invalid_address",
            TerminusError::EmptyBatch { .. } => "empty_batch",
            TerminusError::Cancelled { .. } => "cancelled",
        }
    }

    /// Whether an outer layer may retry the same request unchanged.
    ///
    /// Setup and request errors need a fix first; transport and remote
    /// failures may be transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            TerminusError::Connection { .. }
            | TerminusError::RemoteQuery { .. }
            | TerminusError::Cancelled { .. } => true,
            TerminusError::Configuration { .. }
            | TerminusError::UnsupportedNetwork(_)
            | TerminusError::ChainMismatch { .. }
            | TerminusError::InvalidAddress { .. }
            | TerminusError::EmptyBatch { .. } => false,
        }
    }
}

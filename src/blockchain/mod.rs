// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the Terminus robots.
//!
//! This module provides functionality for:
//! - Building the registry of supported networks
//! - Resolving the Terminus contract address per network
//! - Dialing a network and tracking its suggested gas price
//! - Batched Terminus mints and balance queries

pub mod addresses;
pub mod client;
pub mod context;
pub mod networks;
pub mod terminus;
pub mod types;

pub use addresses::ContractAddresses;
pub use client::{ChainClient, ChainRpc, HttpProvider};
pub use context::CallContext;
pub use networks::{nodebalancer_endpoint, NetworkRegistry};
pub use terminus::{ContractClient, TerminusApi, TerminusBinding};
pub use types::*;

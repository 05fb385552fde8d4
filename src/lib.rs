// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Terminus Robots - Multi-network Terminus Contract Client
//!
//! Connects to the supported EVM networks and performs batched operations on
//! a deployed Terminus pool contract.
//!
//! ## Modules
//!
//! - `blockchain` - Network registry, chain client and Terminus bindings
//! - `config` - Environment settings
//! - `error` - Error taxonomy shared by every operation
//! - `logging` - Tracing subscriber setup
//! - `robot` - Background drop loop built on the contract client

pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod robot;

#[cfg(test)]
pub(crate) mod testing;

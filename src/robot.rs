// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Drop Robot
//!
//! Background loop that mints a Terminus pool token to every claimant that
//! does not hold one yet.
//!
//! ## Strategy
//!
//! Every `poll_interval` the robot:
//! 1. Reloads the claimant list from its JSON file, dropping malformed and
//!    duplicate addresses.
//! 2. Checks its earlier mints for receipts and skips claimants whose mint
//!    is still unmined.
//! 3. Reads pool capacity and supply to find how many tokens are left.
//! 4. Splits the list into chunks of `batch_size`.
//! 5. For each chunk, queries `balanceOfBatch` and keeps claimants with a
//!    zero balance, up to the remaining capacity.
//! 6. Refreshes the gas price and submits one `poolMintBatch` for them.
//!
//! A mint without a receipt after `mint_timeout` is forgotten and its
//! recipients become eligible again.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`; an in-flight remote call is
//! abandoned as soon as the token fires.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::{
    CallContext, CallOptions, ChainRpc, Claimant, ContractClient, HttpProvider, TerminusApi,
    TerminusBinding, TransactOptions,
};
use crate::config::RobotSettings;
use crate::error::TerminusError;

/// What the robot mints and how often.
#[derive(Debug, Clone)]
pub struct DropSettings {
    pub pool_id: U256,
    pub mint_value: U256,
    pub claimants_file: PathBuf,
    pub batch_size: usize,
    pub poll_interval: Duration,
    pub mint_timeout: Duration,
}

impl From<&RobotSettings> for DropSettings {
    fn from(settings: &RobotSettings) -> Self {
        Self {
            pool_id: U256::from(settings.pool_id),
            mint_value: U256::from(settings.mint_value),
            claimants_file: settings.claimants_file.clone(),
            batch_size: settings.batch_size,
            poll_interval: settings.poll_interval,
            mint_timeout: settings.mint_timeout,
        }
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Unique, well-formed claimants considered.
    pub claimants: usize,
    /// Entries dropped because the address did not parse.
    pub invalid: usize,
    /// Claimants skipped because an earlier mint to them is not mined yet.
    pub awaiting_confirmation: usize,
    /// Claimants that already held the token.
    pub already_holding: usize,
    /// Claimants left out because the pool has no capacity for them.
    pub over_capacity: usize,
    /// Claimants included in a submitted mint.
    pub minted: usize,
    pub transactions: Vec<TxHash>,
}

/// A submitted mint without a receipt yet.
#[derive(Debug, Clone)]
struct InFlightMint {
    recipients: Vec<Address>,
    submitted_at: Instant,
}

/// Mints pool tokens to claimants that do not hold one.
pub struct DropRobot<R = HttpProvider, C = TerminusBinding> {
    client: ContractClient<R, C>,
    auth: TransactOptions,
    settings: DropSettings,
    in_flight: HashMap<TxHash, InFlightMint>,
}

impl<R: ChainRpc, C: TerminusApi> DropRobot<R, C> {
    pub fn new(client: ContractClient<R, C>, auth: TransactOptions, settings: DropSettings) -> Self {
        Self {
            client,
            auth,
            settings,
            in_flight: HashMap::new(),
        }
    }

    pub fn client(&self) -> &ContractClient<R, C> {
        &self.client
    }

    /// Run sweeps until the cancellation token is triggered.
    ///
    /// A failed sweep is logged and retried on the next interval.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!(
            network = %self.client.chain().network().name,
            contract = %self.client.address(),
            pool_id = %self.settings.pool_id,
            interval_secs = self.settings.poll_interval.as_secs(),
            "Drop robot starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Drop robot shutting down");
                return;
            }

            let ctx = CallContext::with_token(shutdown.child_token());
            match self.sweep(&ctx).await {
                Ok(report) => info!(
                    claimants = report.claimants,
                    invalid = report.invalid,
                    awaiting_confirmation = report.awaiting_confirmation,
                    already_holding = report.already_holding,
                    over_capacity = report.over_capacity,
                    minted = report.minted,
                    transactions = report.transactions.len(),
                    "Drop robot: sweep finished"
                ),
                Err(e) => warn!(error = %e, "Drop robot: sweep failed, will retry"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.settings.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Drop robot shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one sweep over the claimant file.
    ///
    /// A failure after some mints were submitted returns
    /// [`RobotError::Interrupted`] carrying the partial report.
    pub async fn sweep(&mut self, ctx: &CallContext) -> Result<SweepReport, RobotError> {
        let (claimants, invalid) = unique_claimants(load_claimants(&self.settings.claimants_file)?);
        let mut report = SweepReport {
            claimants: claimants.len(),
            invalid,
            ..SweepReport::default()
        };
        if claimants.is_empty() {
            return Ok(report);
        }

        match self.mint_missing(ctx, claimants, &mut report).await {
            Ok(()) => Ok(report),
            Err(source) if report.transactions.is_empty() => Err(source.into()),
            Err(source) => {
                warn!(
                    minted = report.minted,
                    transactions = ?report.transactions,
                    error = %source,
                    "Drop robot: sweep interrupted after submitting mints"
                );
                Err(RobotError::Interrupted { report, source })
            }
        }
    }

    async fn mint_missing(
        &mut self,
        ctx: &CallContext,
        claimants: Vec<(Address, Claimant)>,
        report: &mut SweepReport,
    ) -> Result<(), TerminusError> {
        self.settle_in_flight(ctx).await?;

        let awaiting: HashSet<Address> = self
            .in_flight
            .values()
            .flat_map(|mint| mint.recipients.iter().copied())
            .collect();
        let (addresses, claimants): (Vec<Address>, Vec<Claimant>) = claimants
            .into_iter()
            .filter(|(address, _)| !awaiting.contains(address))
            .unzip();
        report.awaiting_confirmation = report.claimants - claimants.len();
        if claimants.is_empty() {
            return Ok(());
        }

        let pool_id = self.settings.pool_id;
        let mint_value = self.settings.mint_value;
        let capacity = self.client.fetch_pool_capacity(ctx, pool_id).await?;
        let supply = self.client.fetch_pool_supply(ctx, pool_id).await?;
        let reserved = U256::from(awaiting.len()).saturating_mul(mint_value);
        let mut remaining = capacity.saturating_sub(supply).saturating_sub(reserved);
        info!(
            pool_id = %pool_id,
            capacity = %capacity,
            supply = %supply,
            remaining = %remaining,
            claimants = claimants.len(),
            "Drop robot: sweeping claimants"
        );

        let call_opts = CallOptions {
            from: Some(self.auth.signer_address()),
            block: None,
        };
        let batch_size = self.settings.batch_size.max(1);

        for (chunk_addresses, chunk) in addresses
            .chunks(batch_size)
            .zip(claimants.chunks(batch_size))
        {
            let balances = self
                .client
                .balance_of_batch(ctx, &call_opts, chunk, pool_id)
                .await?;

            let (mut recipients, mut pending): (Vec<Address>, Vec<Claimant>) = chunk_addresses
                .iter()
                .zip(chunk)
                .zip(&balances)
                .filter(|(_, balance)| balance.is_zero())
                .map(|((address, claimant), _)| (*address, claimant.clone()))
                .unzip();
            report.already_holding += chunk.len() - pending.len();

            let fit = claimants_within(remaining, mint_value, pending.len());
            if fit < pending.len() {
                report.over_capacity += pending.len() - fit;
                recipients.truncate(fit);
                pending.truncate(fit);
            }
            if pending.is_empty() {
                continue;
            }

            self.client.chain_mut().fetch_suggested_gas_price(ctx).await?;
            let auth = match self.client.chain().gas_price() {
                Some(gas_price) => self.auth.clone().with_gas_price(gas_price),
                None => self.auth.clone(),
            };

            let submitted = self
                .client
                .pool_mint_batch(ctx, &auth, pool_id, &pending, mint_value)
                .await?;

            remaining =
                remaining.saturating_sub(U256::from(pending.len()).saturating_mul(mint_value));
            report.minted += pending.len();
            report.transactions.push(submitted.tx_hash);
            self.in_flight.insert(
                submitted.tx_hash,
                InFlightMint {
                    recipients,
                    submitted_at: Instant::now(),
                },
            );
        }

        if report.over_capacity > 0 {
            warn!(
                pool_id = %pool_id,
                over_capacity = report.over_capacity,
                "Drop robot: pool capacity exhausted, claimants left without a token"
            );
        }
        Ok(())
    }

    /// Forget mints that have a receipt or have waited past `mint_timeout`.
    async fn settle_in_flight(&mut self, ctx: &CallContext) -> Result<(), TerminusError> {
        let hashes: Vec<TxHash> = self.in_flight.keys().copied().collect();
        for tx_hash in hashes {
            if self.client.chain().is_mined(ctx, tx_hash).await? {
                if let Some(mint) = self.in_flight.remove(&tx_hash) {
                    debug!(
                        tx_hash = %tx_hash,
                        recipients = mint.recipients.len(),
                        "Drop robot: mint mined"
                    );
                }
                continue;
            }

            let expired = self
                .in_flight
                .get(&tx_hash)
                .is_some_and(|mint| mint.submitted_at.elapsed() >= self.settings.mint_timeout);
            if expired {
                self.in_flight.remove(&tx_hash);
                warn!(
                    tx_hash = %tx_hash,
                    "Drop robot: mint has no receipt after timeout, recipients will be retried"
                );
            }
        }
        Ok(())
    }
}

/// How many of `wanted` claimants fit in `remaining` units at `mint_value`
/// units each.
fn claimants_within(remaining: U256, mint_value: U256, wanted: usize) -> usize {
    if mint_value.is_zero() || U256::from(wanted).saturating_mul(mint_value) <= remaining {
        return wanted;
    }
    // Quotient is below `wanted` here, so it fits in the low limb.
    (remaining / mint_value).as_limbs()[0] as usize
}

/// Read claimants from a JSON array of `{"address": "0x…"}` objects.
pub fn load_claimants(path: &Path) -> Result<Vec<Claimant>, RobotError> {
    let failed = |reason: String| RobotError::Claimants {
        path: path.display().to_string(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| failed(e.to_string()))
}

/// Drop malformed and repeated addresses, keeping first occurrences.
/// Returns the kept claimants with their decoded address, and the number of
/// malformed entries.
fn unique_claimants(claimants: Vec<Claimant>) -> (Vec<(Address, Claimant)>, usize) {
    let mut seen = HashSet::new();
    let mut invalid = 0;
    let mut kept = Vec::with_capacity(claimants.len());

    for claimant in claimants {
        match claimant.parse_address() {
            Ok(address) => {
                if seen.insert(address) {
                    kept.push((address, claimant));
                }
            }
            Err(e) => {
                warn!(error = %e, "Drop robot: skipping malformed claimant");
                invalid += 1;
            }
        }
    }
    (kept, invalid)
}

#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    #[error("Failed to read claimants from {path}: {reason}")]
    Claimants { path: String, reason: String },

    #[error(transparent)]
    Terminus(#[from] TerminusError),

    /// The sweep failed after submitting at least one mint.
    #[error(
        "Sweep interrupted after {} mint transactions: {source}",
        .report.transactions.len()
    )]
    Interrupted {
        report: SweepReport,
        source: TerminusError,
    },
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Terminus contract interactions.
//!
//! [`ContractClient`] owns a [`ChainClient`] and a contract binding for the
//! same network, and turns a list of claimants into a single batched call.

use std::future::Future;

use alloy::{
    primitives::{Address, TxHash, U256},
    providers::ProviderBuilder,
    sol,
};

use super::addresses::ContractAddresses;
use super::client::{ChainClient, ChainRpc, HttpProvider};
use super::context::CallContext;
use super::types::{CallOptions, Claimant, SubmittedTransaction, TransactOptions};
use crate::error::TerminusError;

// Subset of the Terminus interface used by the robots
sol! {
    #[sol(rpc)]
    interface ITerminus {
        function terminusPoolCapacity(uint256 poolID) external view returns (uint256);
        function terminusPoolSupply(uint256 poolID) external view returns (uint256);
        function poolMintBatch(uint256 id, address[] toAddresses, uint256[] amounts) external;
        function balanceOfBatch(address[] accounts, uint256[] ids) external view returns (uint256[]);
    }
}

/// Contract methods the client calls.
///
/// Errors are the binding's message; the client wraps them with context.
pub trait TerminusApi: Send + Sync {
    /// Address the binding talks to.
    fn address(&self) -> Address;

    fn pool_capacity(&self, pool_id: U256) -> impl Future<Output = Result<U256, String>> + Send;

    fn pool_supply(&self, pool_id: U256) -> impl Future<Output = Result<U256, String>> + Send;

    fn pool_mint_batch(
        &self,
        auth: &TransactOptions,
        pool_id: U256,
        to_addresses: Vec<Address>,
        amounts: Vec<U256>,
    ) -> impl Future<Output = Result<TxHash, String>> + Send;

    fn balance_of_batch(
        &self,
        opts: &CallOptions,
        accounts: Vec<Address>,
        ids: Vec<U256>,
    ) -> impl Future<Output = Result<Vec<U256>, String>> + Send;
}

/// alloy binding of a deployed Terminus contract.
pub struct TerminusBinding {
    instance: ITerminus::ITerminusInstance<HttpProvider>,
    endpoint: url::Url,
}

impl TerminusBinding {
    /// Bind `address` over `provider`; `endpoint` must be the provider's own
    /// RPC URL, it is used to open signing connections for writes.
    pub fn new(address: Address, provider: HttpProvider, endpoint: url::Url) -> Self {
        Self {
            instance: ITerminus::new(address, provider),
            endpoint,
        }
    }
}

impl TerminusApi for TerminusBinding {
    fn address(&self) -> Address {
        *self.instance.address()
    }

    fn pool_capacity(&self, pool_id: U256) -> impl Future<Output = Result<U256, String>> + Send {
        async move {
            self.instance
                .terminusPoolCapacity(pool_id)
                .call()
                .await
                .map_err(|e| e.to_string())
        }
    }

    fn pool_supply(&self, pool_id: U256) -> impl Future<Output = Result<U256, String>> + Send {
        async move {
            self.instance
                .terminusPoolSupply(pool_id)
                .call()
                .await
                .map_err(|e| e.to_string())
        }
    }

    fn pool_mint_batch(
        &self,
        auth: &TransactOptions,
        pool_id: U256,
        to_addresses: Vec<Address>,
        amounts: Vec<U256>,
    ) -> impl Future<Output = Result<TxHash, String>> + Send {
        let auth = auth.clone();
        async move {
            let from = auth.signer_address();
            let provider = ProviderBuilder::new()
                .wallet(auth.wallet)
                .connect_http(self.endpoint.clone());
            let contract = ITerminus::new(*self.instance.address(), provider);

            let mut call = contract
                .poolMintBatch(pool_id, to_addresses, amounts)
                .from(from);
            if let Some(gas_price) = auth.gas_price {
                call = call.gas_price(gas_price);
            }
            if let Some(gas_limit) = auth.gas_limit {
                call = call.gas(gas_limit);
            }
            if let Some(nonce) = auth.nonce {
                call = call.nonce(nonce);
            }

            let pending = call.send().await.map_err(|e| e.to_string())?;
            Ok(*pending.tx_hash())
        }
    }

    fn balance_of_batch(
        &self,
        opts: &CallOptions,
        accounts: Vec<Address>,
        ids: Vec<U256>,
    ) -> impl Future<Output = Result<Vec<U256>, String>> + Send {
        let opts = opts.clone();
        async move {
            let mut call = self.instance.balanceOfBatch(accounts, ids);
            if let Some(from) = opts.from {
                call = call.from(from);
            }
            if let Some(block) = opts.block {
                call = call.block(block);
            }
            call.call().await.map_err(|e| e.to_string())
        }
    }
}

/// Decode every claimant before anything is sent.
fn decode_claimants(
    operation: &'static str,
    claimants: &[Claimant],
) -> Result<Vec<Address>, TerminusError> {
    if claimants.is_empty() {
        return Err(TerminusError::EmptyBatch { operation });
    }
    claimants.iter().map(Claimant::parse_address).collect()
}

/// Terminus client bound to one network.
pub struct ContractClient<R = HttpProvider, C = TerminusBinding> {
    chain: ChainClient<R>,
    contract: C,
}

impl ContractClient {
    /// Bind the Terminus contract at `address` over the chain client's own
    /// connection.
    pub fn bind(chain: ChainClient, address: Address) -> Result<Self, TerminusError> {
        let endpoint: url::Url = chain.network().endpoint.parse().map_err(|e: url::ParseError| {
            TerminusError::Connection {
                network: chain.network().name.to_string(),
                reason: format!("invalid RPC URL: {e}"),
            }
        })?;
        let contract = TerminusBinding::new(address, chain.provider().clone(), endpoint);
        Ok(Self::with_contract(chain, contract))
    }

    /// Resolve the Terminus address for the chain client's network and bind it.
    pub fn connect(chain: ChainClient, addresses: &ContractAddresses) -> Result<Self, TerminusError> {
        let address = addresses.resolve(chain.network().name)?;
        Self::bind(chain, address)
    }
}

impl<R: ChainRpc, C: TerminusApi> ContractClient<R, C> {
    /// Pair a chain client with a binding. The binding must target the same
    /// network as `chain`.
    pub fn with_contract(chain: ChainClient<R>, contract: C) -> Self {
        tracing::debug!(
            network = %chain.network().name,
            contract = %contract.address(),
            "Bound Terminus contract"
        );
        Self { chain, contract }
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub fn chain(&self) -> &ChainClient<R> {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut ChainClient<R> {
        &mut self.chain
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    /// Read the capacity of `pool_id`.
    pub async fn fetch_pool_capacity(
        &self,
        ctx: &CallContext,
        pool_id: U256,
    ) -> Result<U256, TerminusError> {
        ctx.run("terminusPoolCapacity", || async {
            self.contract
                .pool_capacity(pool_id)
                .await
                .map_err(|e| TerminusError::remote("terminusPoolCapacity", e))
        })
        .await
    }

    /// Read how many tokens of `pool_id` have been minted so far.
    pub async fn fetch_pool_supply(
        &self,
        ctx: &CallContext,
        pool_id: U256,
    ) -> Result<U256, TerminusError> {
        ctx.run("terminusPoolSupply", || async {
            self.contract
                .pool_supply(pool_id)
                .await
                .map_err(|e| TerminusError::remote("terminusPoolSupply", e))
        })
        .await
    }

    /// Mint `value` units of `pool_id` to every claimant in one transaction.
    ///
    /// All addresses are decoded first; one malformed address aborts the
    /// whole batch before anything is sent. Returns once the node accepts
    /// the transaction, without waiting for confirmation.
    pub async fn pool_mint_batch(
        &self,
        ctx: &CallContext,
        auth: &TransactOptions,
        pool_id: U256,
        claimants: &[Claimant],
        value: U256,
    ) -> Result<SubmittedTransaction, TerminusError> {
        let to_addresses = decode_claimants("poolMintBatch", claimants)?;
        let amounts = vec![value; to_addresses.len()];
        let count = to_addresses.len();

        let tx_hash = ctx
            .run("poolMintBatch", move || async move {
                self.contract
                    .pool_mint_batch(auth, pool_id, to_addresses, amounts)
                    .await
                    .map_err(|e| TerminusError::remote("poolMintBatch", e))
            })
            .await?;

        tracing::info!(
            network = %self.chain.network().name,
            pool_id = %pool_id,
            claimants = count,
            tx_hash = %tx_hash,
            "Submitted poolMintBatch"
        );

        Ok(SubmittedTransaction {
            network: self.chain.network().name,
            tx_hash,
        })
    }

    /// Balance of `token_id` for every claimant; `result[i]` belongs to
    /// `claimants[i]`.
    pub async fn balance_of_batch(
        &self,
        ctx: &CallContext,
        opts: &CallOptions,
        claimants: &[Claimant],
        token_id: U256,
    ) -> Result<Vec<U256>, TerminusError> {
        let accounts = decode_claimants("balanceOfBatch", claimants)?;
        let ids = vec![token_id; accounts.len()];
        let expected = accounts.len();

        let balances = ctx
            .run("balanceOfBatch", move || async move {
                self.contract
                    .balance_of_batch(opts, accounts, ids)
                    .await
                    .map_err(|e| TerminusError::remote("balanceOfBatch", e))
            })
            .await?;

        if balances.len() != expected {
            return Err(TerminusError::remote(
                "balanceOfBatch",
                format!("expected {expected} balances, got {}", balances.len()),
            ));
        }
        Ok(balances)
    }
}

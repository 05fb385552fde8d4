// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory stand-ins for the node RPC and the Terminus binding.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};

use crate::blockchain::{CallOptions, ChainRpc, TerminusApi, TransactOptions};

const TEST_PRIVATE_KEY: [u8; 32] = [0x11; 32];

/// Signing options backed by a fixed test key.
pub fn test_auth() -> TransactOptions {
    let signer = alloy::signers::local::PrivateKeySigner::from_slice(&TEST_PRIVATE_KEY)
        .expect("valid test key");
    TransactOptions::new(alloy::network::EthereumWallet::from(signer))
}

async fn delay(duration: Option<Duration>) {
    if let Some(duration) = duration {
        tokio::time::sleep(duration).await;
    }
}

/// Node stub with a fixed chain id and a settable gas price.
pub struct StubRpc {
    chain_id: u64,
    gas_price: Mutex<u128>,
    failure: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    gas_price_calls: AtomicUsize,
    mined: Mutex<HashSet<TxHash>>,
}

impl StubRpc {
    pub fn new(chain_id: u64, gas_price: u128) -> Self {
        Self {
            chain_id,
            gas_price: Mutex::new(gas_price),
            failure: Mutex::new(None),
            delay: Mutex::new(None),
            gas_price_calls: AtomicUsize::new(0),
            mined: Mutex::new(HashSet::new()),
        }
    }

    /// Give `tx_hash` a receipt.
    pub fn mine(&self, tx_hash: TxHash) {
        self.mined.lock().unwrap().insert(tx_hash);
    }

    pub fn set_gas_price(&self, gas_price: u128) {
        *self.gas_price.lock().unwrap() = gas_price;
    }

    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn set_delay(&self, duration: Duration) {
        *self.delay.lock().unwrap() = Some(duration);
    }

    pub fn gas_price_calls(&self) -> usize {
        self.gas_price_calls.load(Ordering::SeqCst)
    }

    fn outcome<T>(&self, value: T) -> Result<T, String> {
        match self.failure.lock().unwrap().clone() {
            Some(reason) => Err(reason),
            None => Ok(value),
        }
    }
}

impl ChainRpc for StubRpc {
    fn chain_id(&self) -> impl Future<Output = Result<u64, String>> + Send {
        async move { self.outcome(self.chain_id) }
    }

    fn suggest_gas_price(&self) -> impl Future<Output = Result<u128, String>> + Send {
        async move {
            self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
            let pause = *self.delay.lock().unwrap();
            delay(pause).await;
            let gas_price = *self.gas_price.lock().unwrap();
            self.outcome(gas_price)
        }
    }

    fn transaction_mined(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<bool, String>> + Send {
        async move {
            let mined = self.mined.lock().unwrap().contains(&tx_hash);
            self.outcome(mined)
        }
    }
}

/// Arguments of one recorded `poolMintBatch` call.
#[derive(Debug, Clone)]
pub struct MintCall {
    pub signer: Address,
    pub gas_price: Option<u128>,
    pub pool_id: U256,
    pub to_addresses: Vec<Address>,
    pub amounts: Vec<U256>,
}

/// Terminus stub keeping balances per (account, id).
///
/// Mints credit the recipients and the pool supply, so a later query sees
/// them, unless mints are held back with [`StubTerminus::hold_mints`].
pub struct StubTerminus {
    address: Address,
    capacity: Mutex<U256>,
    balances: Mutex<HashMap<(Address, U256), U256>>,
    supply: Mutex<HashMap<U256, U256>>,
    hold_mints: Mutex<bool>,
    held: Mutex<Vec<(Address, U256, U256)>>,
    mint_failures_after: Mutex<Option<usize>>,
    mint_calls: Mutex<Vec<MintCall>>,
    balance_calls: Mutex<Vec<(Vec<Address>, Vec<U256>)>>,
    failure: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    truncate_balances: Mutex<bool>,
    tx_counter: AtomicUsize,
}

impl Default for StubTerminus {
    fn default() -> Self {
        Self::new()
    }
}

impl StubTerminus {
    pub fn new() -> Self {
        Self {
            address: Address::repeat_byte(0xaa),
            capacity: Mutex::new(U256::ZERO),
            balances: Mutex::new(HashMap::new()),
            supply: Mutex::new(HashMap::new()),
            hold_mints: Mutex::new(false),
            held: Mutex::new(Vec::new()),
            mint_failures_after: Mutex::new(None),
            mint_calls: Mutex::new(Vec::new()),
            balance_calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            delay: Mutex::new(None),
            truncate_balances: Mutex::new(false),
            tx_counter: AtomicUsize::new(0),
        }
    }

    pub fn set_capacity(&self, capacity: U256) {
        *self.capacity.lock().unwrap() = capacity;
    }

    pub fn set_balance(&self, account: Address, id: U256, balance: U256) {
        self.balances.lock().unwrap().insert((account, id), balance);
    }

    pub fn set_supply(&self, id: U256, supply: U256) {
        self.supply.lock().unwrap().insert(id, supply);
    }

    /// Accept mints without crediting anything, like a transaction still
    /// waiting in the mempool.
    pub fn hold_mints(&self, hold: bool) {
        *self.hold_mints.lock().unwrap() = hold;
    }

    /// Apply every held mint.
    pub fn release_held(&self) {
        let held: Vec<_> = self.held.lock().unwrap().drain(..).collect();
        for (account, id, amount) in held {
            self.credit(account, id, amount);
        }
    }

    /// Reject every mint after the first `accepted` ones.
    pub fn fail_mints_after(&self, accepted: usize) {
        *self.mint_failures_after.lock().unwrap() = Some(accepted);
    }

    fn credit(&self, account: Address, id: U256, amount: U256) {
        *self
            .balances
            .lock()
            .unwrap()
            .entry((account, id))
            .or_insert(U256::ZERO) += amount;
        *self.supply.lock().unwrap().entry(id).or_insert(U256::ZERO) += amount;
    }

    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn set_delay(&self, duration: Duration) {
        *self.delay.lock().unwrap() = Some(duration);
    }

    /// Answer balance queries with one entry fewer than requested.
    pub fn truncate_balances(&self, truncate: bool) {
        *self.truncate_balances.lock().unwrap() = truncate;
    }

    pub fn mint_calls(&self) -> Vec<MintCall> {
        self.mint_calls.lock().unwrap().clone()
    }

    pub fn balance_calls(&self) -> Vec<(Vec<Address>, Vec<U256>)> {
        self.balance_calls.lock().unwrap().clone()
    }

    fn failure(&self) -> Option<String> {
        self.failure.lock().unwrap().clone()
    }

    fn pause(&self) -> Option<Duration> {
        *self.delay.lock().unwrap()
    }

    fn mint_rejected(&self) -> bool {
        match *self.mint_failures_after.lock().unwrap() {
            Some(accepted) => self.mint_calls.lock().unwrap().len() >= accepted,
            None => false,
        }
    }
}

impl TerminusApi for StubTerminus {
    fn address(&self) -> Address {
        self.address
    }

    fn pool_capacity(&self, _pool_id: U256) -> impl Future<Output = Result<U256, String>> + Send {
        async move {
            delay(self.pause()).await;
            match self.failure() {
                Some(reason) => Err(reason),
                None => Ok(*self.capacity.lock().unwrap()),
            }
        }
    }

    fn pool_supply(&self, pool_id: U256) -> impl Future<Output = Result<U256, String>> + Send {
        async move {
            delay(self.pause()).await;
            match self.failure() {
                Some(reason) => Err(reason),
                None => Ok(self
                    .supply
                    .lock()
                    .unwrap()
                    .get(&pool_id)
                    .copied()
                    .unwrap_or_default()),
            }
        }
    }

    fn pool_mint_batch(
        &self,
        auth: &TransactOptions,
        pool_id: U256,
        to_addresses: Vec<Address>,
        amounts: Vec<U256>,
    ) -> impl Future<Output = Result<TxHash, String>> + Send {
        let signer = auth.signer_address();
        let gas_price = auth.gas_price;
        async move {
            delay(self.pause()).await;
            if let Some(reason) = self.failure() {
                return Err(reason);
            }
            if self.mint_rejected() {
                return Err("replacement transaction underpriced".to_string());
            }

            let hold = *self.hold_mints.lock().unwrap();
            for (account, amount) in to_addresses.iter().zip(&amounts) {
                if hold {
                    self.held.lock().unwrap().push((*account, pool_id, *amount));
                } else {
                    self.credit(*account, pool_id, *amount);
                }
            }
            self.mint_calls.lock().unwrap().push(MintCall {
                signer,
                gas_price,
                pool_id,
                to_addresses,
                amounts,
            });

            let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
            Ok(TxHash::with_last_byte((n + 1) as u8))
        }
    }

    fn balance_of_batch(
        &self,
        _opts: &CallOptions,
        accounts: Vec<Address>,
        ids: Vec<U256>,
    ) -> impl Future<Output = Result<Vec<U256>, String>> + Send {
        async move {
            delay(self.pause()).await;
            if let Some(reason) = self.failure() {
                return Err(reason);
            }

            self.balance_calls
                .lock()
                .unwrap()
                .push((accounts.clone(), ids.clone()));

            let balances = self.balances.lock().unwrap();
            let mut result: Vec<U256> = accounts
                .iter()
                .zip(&ids)
                .map(|(account, id)| balances.get(&(*account, *id)).copied().unwrap_or_default())
                .collect();
            if *self.truncate_balances.lock().unwrap() {
                result.pop();
            }
            Ok(result)
        }
    }
}

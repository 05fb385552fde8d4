// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain client: a connection to one network and its observed gas price.

use std::future::Future;

use alloy::{
    network::Ethereum,
    primitives::TxHash,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

use super::context::CallContext;
use super::types::Network;
use crate::error::TerminusError;

/// HTTP provider type used for every network (with all fillers).
pub type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Node RPC methods the chain client relies on.
///
/// Errors are the transport's message; the client wraps them with context.
pub trait ChainRpc: Send + Sync {
    /// `eth_chainId`
    fn chain_id(&self) -> impl Future<Output = Result<u64, String>> + Send;

    /// `eth_gasPrice`
    fn suggest_gas_price(&self) -> impl Future<Output = Result<u128, String>> + Send;

    /// `eth_getTransactionReceipt`; true once the transaction has a receipt.
    fn transaction_mined(&self, tx_hash: TxHash)
        -> impl Future<Output = Result<bool, String>> + Send;
}

impl ChainRpc for HttpProvider {
    fn chain_id(&self) -> impl Future<Output = Result<u64, String>> + Send {
        async move { self.get_chain_id().await.map_err(|e| e.to_string()) }
    }

    fn suggest_gas_price(&self) -> impl Future<Output = Result<u128, String>> + Send {
        async move { self.get_gas_price().await.map_err(|e| e.to_string()) }
    }

    fn transaction_mined(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<bool, String>> + Send {
        async move {
            self.get_transaction_receipt(tx_hash)
                .await
                .map(|receipt| receipt.is_some())
                .map_err(|e| e.to_string())
        }
    }
}

/// Connection to a single network.
///
/// A failed dial is terminal; dial again for a fresh client.
pub struct ChainClient<R = HttpProvider> {
    network: Network,
    rpc: R,
    gas_price: Option<u128>,
}

impl ChainClient<HttpProvider> {
    /// Dial the network's endpoint and check it serves the expected chain.
    pub async fn dial(network: Network, ctx: &CallContext) -> Result<Self, TerminusError> {
        let url: url::Url = network.endpoint.parse().map_err(|e: url::ParseError| {
            TerminusError::Connection {
                network: network.name.to_string(),
                reason: format!("invalid RPC URL: {e}"),
            }
        })?;

        let provider = ProviderBuilder::new().connect_http(url);
        let client = Self::with_rpc(network, provider);
        client.verify_chain_id(ctx).await?;

        tracing::info!(
            network = %client.network.name,
            chain_id = client.network.chain_id,
            "Connected to network"
        );
        Ok(client)
    }

    pub(crate) fn provider(&self) -> &HttpProvider {
        &self.rpc
    }
}

impl<R: ChainRpc> ChainClient<R> {
    /// Wrap an already-connected RPC handle.
    pub fn with_rpc(network: Network, rpc: R) -> Self {
        Self {
            network,
            rpc,
            gas_price: None,
        }
    }

    /// Confirm the endpoint serves the configured chain.
    pub async fn verify_chain_id(&self, ctx: &CallContext) -> Result<(), TerminusError> {
        let network = self.network.name.to_string();
        let actual = ctx
            .run("eth_chainId", || async {
                self.rpc
                    .chain_id()
                    .await
                    .map_err(|reason| TerminusError::Connection {
                        network: network.clone(),
                        reason,
                    })
            })
            .await?;

        if actual != self.network.chain_id {
            return Err(TerminusError::ChainMismatch {
                network,
                expected: self.network.chain_id,
                actual,
            });
        }
        Ok(())
    }

    /// Refresh the suggested gas price.
    ///
    /// On failure or cancellation the previous value is kept.
    pub async fn fetch_suggested_gas_price(&mut self, ctx: &CallContext) -> Result<(), TerminusError> {
        let rpc = &self.rpc;
        let gas_price = ctx
            .run("eth_gasPrice", || async {
                rpc.suggest_gas_price()
                    .await
                    .map_err(|e| TerminusError::remote("eth_gasPrice", e))
            })
            .await?;

        tracing::debug!(network = %self.network.name, gas_price, "Fetched suggested gas price");
        self.gas_price = Some(gas_price);
        Ok(())
    }

    /// Whether `tx_hash` has been included in a block. A reverted
    /// transaction counts as mined.
    pub async fn is_mined(&self, ctx: &CallContext, tx_hash: TxHash) -> Result<bool, TerminusError> {
        ctx.run("eth_getTransactionReceipt", || async {
            self.rpc
                .transaction_mined(tx_hash)
                .await
                .map_err(|e| TerminusError::remote("eth_getTransactionReceipt", e))
        })
        .await
    }

    /// Last fetched gas price, if any.
    pub fn gas_price(&self) -> Option<u128> {
        self.gas_price
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::blockchain::types::NetworkName;
    use crate::testing::StubRpc;

    fn mumbai() -> Network {
        Network {
            name: NetworkName::Mumbai,
            endpoint: "https://mumbai.example?access_id=abc&data_source=blockchain".to_string(),
            chain_id: 80001,
        }
    }

    #[tokio::test]
    async fn dial_rejects_malformed_uri() {
        let mut network = mumbai();
        network.endpoint = "not a url".to_string();
        let err = ChainClient::dial(network, &CallContext::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TerminusError::Connection { network, .. } if network == "mumbai"));
    }

    #[tokio::test]
    async fn verify_accepts_matching_chain() {
        let client = ChainClient::with_rpc(mumbai(), StubRpc::new(80001, 1));
        client.verify_chain_id(&CallContext::new()).await.unwrap();
    }

    #[tokio::test]
    async fn verify_rejects_other_chain() {
        let client = ChainClient::with_rpc(mumbai(), StubRpc::new(137, 1));
        let err = client.verify_chain_id(&CallContext::new()).await.unwrap_err();
        assert!(matches!(
            err,
            TerminusError::ChainMismatch { expected: 80001, actual: 137, .. }
        ));
    }

    #[tokio::test]
    async fn verify_maps_transport_failure_to_connection_error() {
        let rpc = StubRpc::new(80001, 1);
        rpc.fail_with("connection refused");
        let client = ChainClient::with_rpc(mumbai(), rpc);
        let err = client.verify_chain_id(&CallContext::new()).await.unwrap_err();
        assert!(matches!(err, TerminusError::Connection { reason, .. } if reason == "connection refused"));
    }

    #[tokio::test]
    async fn mined_follows_receipt_availability() {
        let client = ChainClient::with_rpc(mumbai(), StubRpc::new(80001, 1));
        let tx_hash = TxHash::with_last_byte(9);

        assert!(!client.is_mined(&CallContext::new(), tx_hash).await.unwrap());
        client.rpc().mine(tx_hash);
        assert!(client.is_mined(&CallContext::new(), tx_hash).await.unwrap());
    }

    #[tokio::test]
    async fn receipt_failure_is_remote_query_error() {
        let rpc = StubRpc::new(80001, 1);
        rpc.fail_with("timeout");
        let client = ChainClient::with_rpc(mumbai(), rpc);
        let err = client
            .is_mined(&CallContext::new(), TxHash::with_last_byte(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TerminusError::RemoteQuery { operation: "eth_getTransactionReceipt", .. }
        ));
    }

    #[tokio::test]
    async fn gas_price_starts_unknown_and_is_overwritten() {
        let mut client = ChainClient::with_rpc(mumbai(), StubRpc::new(80001, 30));
        assert_eq!(client.gas_price(), None);

        client.fetch_suggested_gas_price(&CallContext::new()).await.unwrap();
        assert_eq!(client.gas_price(), Some(30));

        client.rpc().set_gas_price(45);
        client.fetch_suggested_gas_price(&CallContext::new()).await.unwrap();
        assert_eq!(client.gas_price(), Some(45));
    }

    #[tokio::test]
    async fn failed_gas_fetch_keeps_prior_value() {
        let mut client = ChainClient::with_rpc(mumbai(), StubRpc::new(80001, 30));
        client.fetch_suggested_gas_price(&CallContext::new()).await.unwrap();

        client.rpc().fail_with("upstream 502");
        let err = client
            .fetch_suggested_gas_price(&CallContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TerminusError::RemoteQuery { operation: "eth_gasPrice", .. }));
        assert_eq!(client.gas_price(), Some(30));
    }

    #[tokio::test]
    async fn cancelled_gas_fetch_issues_no_call() {
        let mut client = ChainClient::with_rpc(mumbai(), StubRpc::new(80001, 30));
        let ctx = CallContext::new();
        ctx.cancel();

        let err = client.fetch_suggested_gas_price(&ctx).await.unwrap_err();

        assert!(matches!(err, TerminusError::Cancelled { .. }));
        assert_eq!(client.rpc().gas_price_calls(), 0);
        assert_eq!(client.gas_price(), None);
    }

    #[tokio::test]
    async fn gas_fetch_past_deadline_keeps_prior_value() {
        let mut client = ChainClient::with_rpc(mumbai(), StubRpc::new(80001, 30));
        client.fetch_suggested_gas_price(&CallContext::new()).await.unwrap();

        client.rpc().set_delay(Duration::from_secs(30));
        client.rpc().set_gas_price(99);
        let ctx = CallContext::new().with_timeout(Duration::from_millis(20));
        let err = client.fetch_suggested_gas_price(&ctx).await.unwrap_err();

        assert!(matches!(err, TerminusError::Cancelled { .. }));
        assert_eq!(client.gas_price(), Some(30));
    }
}

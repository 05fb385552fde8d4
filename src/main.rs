// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use terminus_robots::blockchain::{
    CallContext, ChainClient, ContractAddresses, ContractClient, NetworkRegistry, TransactOptions,
};
use terminus_robots::config::{NetworkSettings, RobotSettings};
use terminus_robots::logging::init_tracing;
use terminus_robots::robot::{DropRobot, DropSettings, RobotError};

const DIAL_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    if let Err(e) = run(shutdown).await {
        tracing::error!(error = %e, "Drop robot failed to start");
        std::process::exit(1);
    }
}

async fn run(shutdown: CancellationToken) -> Result<(), RobotError> {
    let settings = RobotSettings::from_env()?;
    let registry = NetworkRegistry::from_settings(&NetworkSettings::from_env())?;
    let network = registry.require(settings.network)?.clone();

    let dial_ctx = CallContext::with_token(shutdown.child_token()).with_timeout(DIAL_TIMEOUT);
    let chain = ChainClient::dial(network, &dial_ctx).await?;
    let client = ContractClient::connect(chain, &ContractAddresses::from_env())?;
    let auth = TransactOptions::from_private_key_hex(&settings.signer_private_key)?;

    tracing::info!(
        network = %settings.network,
        signer = %auth.signer_address(),
        claimants_file = %settings.claimants_file.display(),
        batch_size = settings.batch_size,
        "Drop robot configured"
    );

    let mut robot = DropRobot::new(client, auth, DropSettings::from(&settings));
    robot.run(shutdown).await;
    Ok(())
}

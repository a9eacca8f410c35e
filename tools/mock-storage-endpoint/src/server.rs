// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::io;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use storage_simulator::{SimulatorEngine, TableLoadError};

use crate::listener::run_listener;
use crate::options::ServerOptions;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed binding to address '{address}' specified in 'bind-address'")]
    Binding {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("configuration loading error: {0}")]
    Options(Box<figment::Error>),
    #[error(transparent)]
    TransitionTable(#[from] TableLoadError),
    #[error("error while running mock storage endpoint: {0}")]
    Running(#[source] io::Error),
    #[error("mock storage endpoint task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("cannot address the mock storage endpoint: {0}")]
    ClientAddress(#[from] http::uri::InvalidUri),
}

// Because thiserror doesn't support auto-boxing or auto implements From with boxing.
impl From<figment::Error> for ServerError {
    fn from(value: figment::Error) -> Self {
        Self::Options(Box::new(value))
    }
}

/// HTTP endpoint serving a [`SimulatorEngine`].
pub struct MockStorageServer;

impl MockStorageServer {
    /// Binds the configured address and starts serving in the background.
    pub async fn start(
        engine: SimulatorEngine,
        options: &ServerOptions,
    ) -> Result<RunningServer, ServerError> {
        let address = options.bind_address;
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Binding { address, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Binding { address, source })?;

        let shutdown = CancellationToken::new();
        let (running_tx, running_rx) = oneshot::channel();

        let handle = tokio::spawn(run_listener(
            listener,
            engine.clone(),
            shutdown.clone(),
            move || {
                // the caller might have given up waiting already
                let _ = running_tx.send(());
            },
        ));

        if running_rx.await.is_err() {
            // the listener task ended before binding, surface its failure
            return match handle.await? {
                Ok(()) => Err(ServerError::Running(io::ErrorKind::UnexpectedEof.into())),
                Err(err) => Err(ServerError::Running(err)),
            };
        }

        info!(
            server.address = %local_addr.ip(),
            server.port = %local_addr.port(),
            "Mock storage endpoint listening"
        );

        Ok(RunningServer {
            local_addr,
            engine,
            shutdown,
            handle: Some(handle),
        })
    }

    /// Loads the transition table named by `options` and starts serving it.
    pub async fn start_from_options(options: &ServerOptions) -> Result<RunningServer, ServerError> {
        let table = options.load_transition_table()?;
        Self::start(SimulatorEngine::new(table), options).await
    }
}

/// Handle on a started [`MockStorageServer`]. Dropping it closes the server.
#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    engine: SimulatorEngine,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<Result<(), io::Error>>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn engine(&self) -> &SimulatorEngine {
        &self.engine
    }

    /// Stops accepting connections and drops the open ones. Calling it again has no effect.
    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            debug!(server.port = %self.local_addr.port(), "Closing mock storage endpoint");
            self.shutdown.cancel();
        }
    }

    /// Closes the server and waits for the listener to terminate.
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        self.close();
        match self.handle.take() {
            Some(handle) => handle.await?.map_err(ServerError::Running),
            None => Ok(()),
        }
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::{Ipv4Addr, TcpListener as StdTcpListener};

    use storage_simulator::fixtures::storage_api_table;
    use storage_simulator_test_util::{assert, let_assert};
    use test_log::test;

    use crate::options::ServerOptionsBuilder;

    #[test(tokio::test)]
    async fn binds_free_port() {
        let engine = SimulatorEngine::new(storage_api_table());
        let server = MockStorageServer::start(engine, &ServerOptions::default())
            .await
            .unwrap();

        assert!(server.local_addr().port() != 0);
        server.close();
        server.close();
        server.shutdown().await.unwrap();
    }

    #[test(tokio::test)]
    async fn reports_occupied_address() {
        let occupied = StdTcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let options = ServerOptionsBuilder::default()
            .bind_address(occupied.local_addr().unwrap())
            .build()
            .unwrap();

        let result =
            MockStorageServer::start(SimulatorEngine::new(storage_api_table()), &options).await;

        let_assert!(Err(ServerError::Binding { address, .. }) = result);
        assert!(address == occupied.local_addr().unwrap());
    }

    #[test(tokio::test)]
    async fn starts_from_options_with_builtin_table() {
        let server = MockStorageServer::start_from_options(&ServerOptions::default())
            .await
            .unwrap();

        assert!(server.engine().table().len() == 83);
        assert!(server.engine().call_log().is_empty());
    }
}

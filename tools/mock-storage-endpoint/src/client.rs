// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! HTTP client wired to a running mock storage endpoint.
//!
//! Code under test usually builds URLs from a configured server name. The
//! [`RedirectConnector`] ignores that name and always dials the simulator, so the URLs can stay
//! untouched.

use std::net::SocketAddr;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::uri::InvalidUri;
use http::{Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tower_service::Service;
use tracing::trace;

use storage_simulator::SimulatorEngine;

use crate::options::ServerOptions;
use crate::server::{MockStorageServer, RunningServer, ServerError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Hyper(#[from] hyper_util::client::legacy::Error),
    #[error(transparent)]
    Http(#[from] http::Error),
    #[error("cannot read response body: {0}")]
    Body(#[from] hyper::Error),
}

/// Connector dialing a fixed address, whatever host the request URI names.
#[derive(Clone, Debug)]
pub struct RedirectConnector<C = HttpConnector> {
    destination: Uri,
    connector: C,
}

impl RedirectConnector {
    pub fn new(address: SocketAddr) -> Result<Self, InvalidUri> {
        let mut connector = HttpConnector::new();
        connector.set_nodelay(true);
        Self::with_connector(address, connector)
    }
}

impl<C> RedirectConnector<C> {
    pub fn with_connector(address: SocketAddr, connector: C) -> Result<Self, InvalidUri> {
        Ok(Self {
            destination: format!("http://{address}").parse()?,
            connector,
        })
    }

    pub fn destination(&self) -> &Uri {
        &self.destination
    }
}

impl<C> Service<Uri> for RedirectConnector<C>
where
    C: Service<Uri>,
{
    type Response = C::Response;
    type Error = C::Error;
    type Future = C::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.connector.poll_ready(cx)
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        trace!(requested = %uri, destination = %self.destination, "Redirecting connection");
        self.connector.call(self.destination.clone())
    }
}

/// HTTP client whose connections all end up at one simulator.
#[derive(Clone, Debug)]
pub struct TestingHttpClient {
    client: Client<RedirectConnector, Full<Bytes>>,
}

impl TestingHttpClient {
    pub fn new(address: SocketAddr) -> Result<Self, InvalidUri> {
        let connector = RedirectConnector::new(address)?;
        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build(connector),
        })
    }

    /// The underlying hyper client, for callers that want to drive requests themselves.
    pub fn inner(&self) -> &Client<RedirectConnector, Full<Bytes>> {
        &self.client
    }

    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: impl Into<Bytes>,
    ) -> Result<(StatusCode, Bytes), ClientError> {
        let request = Request::builder()
            .method(method)
            .uri(url)
            .body(Full::new(body.into()))?;

        let response = self.client.request(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        Ok((status, body))
    }

    pub async fn get(&self, url: &str) -> Result<(StatusCode, Bytes), ClientError> {
        self.request(Method::GET, url, Bytes::new()).await
    }

    pub async fn post(
        &self,
        url: &str,
        body: impl Into<Bytes>,
    ) -> Result<(StatusCode, Bytes), ClientError> {
        self.request(Method::POST, url, body).await
    }

    pub async fn put(
        &self,
        url: &str,
        body: impl Into<Bytes>,
    ) -> Result<(StatusCode, Bytes), ClientError> {
        self.request(Method::PUT, url, body).await
    }
}

/// Starts a mock storage endpoint for `engine` on a free loopback port and returns a client bound
/// to it. Dropping or closing the [`RunningServer`] stops the endpoint.
pub async fn testing_http_client(
    engine: SimulatorEngine,
) -> Result<(TestingHttpClient, RunningServer), ServerError> {
    let server = MockStorageServer::start(engine, &ServerOptions::default()).await?;
    let client = TestingHttpClient::new(server.local_addr())?;
    Ok((client, server))
}

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

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use tokio_util::net::Listener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use storage_simulator::SimulatorEngine;

use crate::handler::serve;

/// Accepts connections on `listener` and serves every request from `engine`, until `shutdown` is
/// cancelled. Open connections are dropped on shutdown as well.
///
/// Both HTTP/1.1 and HTTP/2 (prior knowledge) are spoken.
pub async fn run_listener<L>(
    mut listener: L,
    engine: SimulatorEngine,
    shutdown: CancellationToken,
    on_bind: impl FnOnce(),
) -> Result<(), io::Error>
where
    L: Listener + Unpin,
    L::Io: Unpin + Send + 'static,
{
    on_bind();

    loop {
        tokio::select! {
            incoming = listener.accept() => {
                let (io, _) = incoming?;
                let io = TokioIo::new(io);
                let engine = engine.clone();
                let shutdown = shutdown.clone();
                tokio::task::spawn(async move {
                    let mut builder = auto::Builder::new(TokioExecutor::new());
                    builder.http1().timer(TokioTimer::new());
                    builder.http2().timer(TokioTimer::new());
                    let connection = builder.serve_connection(
                        io,
                        service_fn(move |req| serve(engine.clone(), req)),
                    );

                    tokio::select! {
                        res = connection => {
                            if let Err(err) = res {
                                error!("Error serving connection: {:?}", err);
                            }
                        }
                        _ = shutdown.cancelled() => {
                            debug!("Dropping connection on shutdown");
                        }
                    }
                });
            }
            _ = shutdown.cancelled() => {
                return Ok(());
            }
        }
    }
}

// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::{Request, Response};
use tracing::debug;

use storage_simulator::SimulatorEngine;

/// Answers a single request from the engine's transition table.
///
/// The whole body is read before matching, since it is part of the request key. Failing to read
/// it aborts the request with the transport error.
pub async fn serve<B>(
    engine: SimulatorEngine,
    req: Request<B>,
) -> Result<Response<Full<Bytes>>, B::Error>
where
    B: Body,
{
    let (req_head, req_body) = req.into_parts();
    let body = req_body.collect().await?.to_bytes();

    let target = req_head
        .uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or_else(|| req_head.uri.path());
    debug!(
        http.request.method = %req_head.method,
        url.target = target,
        http.request.body.size = body.len(),
        "Serving storage request"
    );

    let scripted = engine.handle(&req_head.method, target, body);

    let mut response = Response::new(Full::new(scripted.body));
    *response.status_mut() = scripted.status;
    Ok(response)
}

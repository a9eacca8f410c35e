// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! HTTP endpoint in front of a [`storage_simulator::SimulatorEngine`], plus a client that reaches
//! it regardless of the host a URL names.

pub mod client;
pub mod handler;
pub mod listener;
pub mod options;
pub mod server;

pub use client::{ClientError, RedirectConnector, TestingHttpClient, testing_http_client};
pub use options::{ServerOptions, ServerOptionsBuilder};
pub use server::{MockStorageServer, RunningServer, ServerError};

// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use storage_simulator::fixtures::storage_api_table;
use storage_simulator::{TableLoadError, TransitionTable};

use crate::server::ServerError;

/// # Mock storage endpoint options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(default)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerOptions {
    /// # Bind address
    ///
    /// Address the endpoint listens on. Port `0` picks a free port.
    pub bind_address: SocketAddr,

    /// # Transition table
    ///
    /// Path of a TOML transition table. If unset, the built-in storage API table is used.
    pub transition_table: Option<PathBuf>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            transition_table: None,
        }
    }
}

impl ServerOptions {
    /// Loads the options from the defaults, the optional TOML file and `STORAGE_SIM_` prefixed
    /// environment variables, in this order.
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file_exact(path));
        }
        figment = figment.merge(
            Env::prefixed("STORAGE_SIM_")
                .split("__")
                .map(|k| k.as_str().replace('_', "-").into()),
        );

        Ok(figment.extract()?)
    }

    pub fn load_transition_table(&self) -> Result<TransitionTable, TableLoadError> {
        match &self.transition_table {
            Some(path) => TransitionTable::from_path(path),
            None => Ok(storage_api_table()),
        }
    }
}

// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Built-in transition table mimicking the sciencemesh storage API of a file-sync server.

use crate::table::TransitionTable;

/// TOML source of [`storage_api_table`].
pub const STORAGE_API_TABLE: &str = include_str!("../fixtures/storage_api.toml");

pub fn storage_api_table() -> TransitionTable {
    TransitionTable::from_toml_str(STORAGE_API_TABLE)
        .expect("embedded storage API table is valid")
}

// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Deterministic simulator of a remote storage-service HTTP API.
//!
//! A [`SimulatorEngine`] replays a [`TransitionTable`]: each request is matched first on its
//! method, target and body, then on those plus the current simulator state. The matched entry
//! decides the response and the state the simulator moves to. Requests that match nothing are
//! answered with a diagnostic body echoing their key.

mod call_log;
mod engine;
pub mod fixtures;
mod key;
mod state;
mod table;

pub use call_log::CallLog;
pub use engine::{MatchKind, ScriptedResponse, SimulatorEngine, SimulatorEngineBuilder};
pub use key::{RequestKey, StateQualifiedKey};
pub use state::StateName;
pub use table::{
    Resolution, ScriptedOutcome, TableLoadError, TransitionEntry, TransitionTable,
    TransitionTableBuilder,
};

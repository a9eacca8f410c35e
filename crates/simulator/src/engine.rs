// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::call_log::CallLog;
use crate::key::RequestKey;
use crate::state::StateName;
use crate::table::{Resolution, ScriptedOutcome, TransitionTable};

const MISS_PREFIX: &str = "response not defined!";

/// Which lookup phase produced a [`ScriptedResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Direct,
    StateQualified,
    /// No entry matched and the diagnostic response was synthesized.
    Miss,
}

/// Status and body handed back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub matched_by: MatchKind,
}

impl ScriptedResponse {
    fn scripted(outcome: &ScriptedOutcome, matched_by: MatchKind) -> Self {
        Self {
            status: outcome.status(),
            body: outcome.body().clone(),
            matched_by,
        }
    }

    fn miss(key: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::OK,
            body: Bytes::from(format!("{MISS_PREFIX} {key}")),
            matched_by: MatchKind::Miss,
        }
    }

    /// Whether this response was synthesized because no table entry matched.
    pub fn is_miss(&self) -> bool {
        self.matched_by == MatchKind::Miss
    }
}

/// Replays a [`TransitionTable`] against incoming requests.
///
/// The engine owns the current simulator state. Clones share the table, the state and the call
/// log, so a test can install one clone behind a server and keep another for inspection. The state
/// update and the call log append of a request happen under one lock.
#[derive(Debug, Clone)]
pub struct SimulatorEngine {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    table: TransitionTable,
    call_log: CallLog,
    state: Mutex<StateName>,
}

impl SimulatorEngine {
    pub fn new(table: TransitionTable) -> Self {
        Self::builder(table).build()
    }

    pub fn builder(table: TransitionTable) -> SimulatorEngineBuilder {
        SimulatorEngineBuilder {
            table,
            call_log: None,
            initial_state: StateName::EMPTY,
        }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.inner.table
    }

    pub fn call_log(&self) -> &CallLog {
        &self.inner.call_log
    }

    pub fn state(&self) -> StateName {
        self.inner.state.lock().clone()
    }

    pub fn handle(
        &self,
        method: &Method,
        target: &str,
        body: impl Into<Bytes>,
    ) -> ScriptedResponse {
        let key = RequestKey::new(method.clone(), target, body);
        debug!(
            method = %key.method(),
            target = key.target(),
            body.len = key.body().len(),
            "Request key components"
        );

        let mut state = self.inner.state.lock();
        self.inner.call_log.record(&key);

        let (response, next_state) = match self.inner.table.resolve(&key, &state) {
            Resolution::Direct(outcome) => {
                debug!(%key, "Matched transition");
                (
                    ScriptedResponse::scripted(outcome, MatchKind::Direct),
                    outcome.next_state(),
                )
            }
            Resolution::StateQualified(outcome) => {
                debug!(%key, state = %*state, "Matched state-qualified transition");
                (
                    ScriptedResponse::scripted(outcome, MatchKind::StateQualified),
                    outcome.next_state(),
                )
            }
            Resolution::Miss(qualified) => {
                warn!(key = %qualified, "No transition defined for request");
                (ScriptedResponse::miss(&qualified), StateName::EMPTY)
            }
        };

        if next_state == StateName::ERROR {
            warn!(%key, "Transition entered the error state");
        }
        debug!(from = %*state, to = %next_state, "State transition");
        *state = next_state;

        response
    }
}

pub struct SimulatorEngineBuilder {
    table: TransitionTable,
    call_log: Option<CallLog>,
    initial_state: StateName,
}

impl SimulatorEngineBuilder {
    /// Record primary keys into a log owned by the caller.
    pub fn call_log(mut self, call_log: CallLog) -> Self {
        self.call_log = Some(call_log);
        self
    }

    pub fn initial_state(mut self, state: impl Into<StateName>) -> Self {
        self.initial_state = state.into();
        self
    }

    pub fn build(self) -> SimulatorEngine {
        SimulatorEngine {
            inner: Arc::new(Inner {
                table: self.table,
                call_log: self.call_log.unwrap_or_default(),
                state: Mutex::new(self.initial_state),
            }),
        }
    }
}

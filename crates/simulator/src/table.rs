// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use figment::Figment;
use figment::providers::{Format, Toml};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::key::{RequestKey, StateQualifiedKey};
use crate::state::StateName;

#[derive(Debug, thiserror::Error)]
pub enum TableLoadError {
    #[error("transition table loading error: {0}")]
    Figment(Box<figment::Error>),
    #[error("invalid status code {status} for '{method} {target}'")]
    InvalidStatus {
        method: String,
        target: String,
        status: u16,
    },
    #[error("invalid method '{0}'")]
    InvalidMethod(String),
}

// Because thiserror doesn't support auto-boxing or auto implements From with boxing.
impl From<figment::Error> for TableLoadError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

/// Canned answer to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedOutcome {
    status: StatusCode,
    body: Bytes,
    next_state: Option<StateName>,
}

impl ScriptedOutcome {
    pub fn new(
        status: StatusCode,
        body: impl Into<Bytes>,
        next_state: impl Into<StateName>,
    ) -> Self {
        Self {
            status,
            body: body.into(),
            next_state: Some(next_state.into()),
        }
    }

    /// Outcome that forgets to declare its successor. Serving it moves the simulator to
    /// [`StateName::ERROR`].
    pub fn without_next_state(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            next_state: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn declared_next_state(&self) -> Option<&StateName> {
        self.next_state.as_ref()
    }

    /// State entered after serving this outcome. Missing or empty successors resolve to
    /// [`StateName::ERROR`].
    pub fn next_state(&self) -> StateName {
        match &self.next_state {
            Some(state) if !state.is_unset() => state.clone(),
            _ => StateName::ERROR,
        }
    }
}

/// Serialized form of a single transition, as found in table documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransitionEntry {
    #[serde(default = "TransitionEntry::default_method")]
    pub method: String,
    /// Path and query string, exactly as the client sends it.
    pub target: String,
    #[serde(default)]
    pub body: String,
    /// Only match while the simulator is in this state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateName>,
    pub status: u16,
    #[serde(default)]
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<StateName>,
}

impl TransitionEntry {
    fn default_method() -> String {
        Method::POST.to_string()
    }

    fn into_parts(
        self,
    ) -> Result<(RequestKey, Option<StateName>, ScriptedOutcome), TableLoadError> {
        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|_| TableLoadError::InvalidMethod(self.method.clone()))?;
        let status =
            StatusCode::from_u16(self.status).map_err(|_| TableLoadError::InvalidStatus {
                method: self.method.clone(),
                target: self.target.clone(),
                status: self.status,
            })?;

        Ok((
            RequestKey::new(method, self.target, self.body),
            self.state,
            ScriptedOutcome {
                status,
                body: Bytes::from(self.response),
                next_state: self.next_state,
            },
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
struct TableDocument {
    #[serde(default, rename = "transition")]
    transitions: Vec<TransitionEntry>,
}

/// Result of matching a request against a [`TransitionTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Matched a state-independent entry.
    Direct(&'a ScriptedOutcome),
    /// Matched an entry qualified by the current state.
    StateQualified(&'a ScriptedOutcome),
    /// Neither lookup matched. Carries the last key that was tried.
    Miss(StateQualifiedKey),
}

/// Immutable mapping from request keys to scripted outcomes.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    direct: HashMap<RequestKey, ScriptedOutcome>,
    state_qualified: HashMap<StateQualifiedKey, ScriptedOutcome>,
}

impl TransitionTable {
    pub fn builder() -> TransitionTableBuilder {
        TransitionTableBuilder::default()
    }

    pub fn from_entries(
        entries: impl IntoIterator<Item = TransitionEntry>,
    ) -> Result<Self, TableLoadError> {
        let mut builder = Self::builder();
        for entry in entries {
            let (key, state, outcome) = entry.into_parts()?;
            builder = match state {
                Some(state) => builder.state_qualified(key, state, outcome),
                None => builder.direct(key, outcome),
            };
        }
        Ok(builder.build())
    }

    pub fn from_toml_str(document: &str) -> Result<Self, TableLoadError> {
        Self::from_figment(Figment::from(Toml::string(document)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableLoadError> {
        debug!("Loading transition table from {}", path.as_ref().display());
        Self::from_figment(Figment::from(Toml::file_exact(path.as_ref())))
    }

    fn from_figment(figment: Figment) -> Result<Self, TableLoadError> {
        let document: TableDocument = figment.extract()?;
        Self::from_entries(document.transitions)
    }

    pub fn len(&self) -> usize {
        self.direct.len() + self.state_qualified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.state_qualified.is_empty()
    }

    pub fn direct_len(&self) -> usize {
        self.direct.len()
    }

    pub fn state_qualified_len(&self) -> usize {
        self.state_qualified.len()
    }

    pub fn get(&self, key: &RequestKey) -> Option<&ScriptedOutcome> {
        self.direct.get(key)
    }

    pub fn get_state_qualified(&self, key: &StateQualifiedKey) -> Option<&ScriptedOutcome> {
        self.state_qualified.get(key)
    }

    /// Two-phase lookup. The state-independent entry wins, the state-qualified one is only
    /// consulted when the first lookup misses.
    pub fn resolve(&self, key: &RequestKey, current: &StateName) -> Resolution<'_> {
        if let Some(outcome) = self.get(key) {
            return Resolution::Direct(outcome);
        }

        let qualified = key.clone().with_state(current.clone());
        match self.get_state_qualified(&qualified) {
            Some(outcome) => Resolution::StateQualified(outcome),
            None => Resolution::Miss(qualified),
        }
    }
}

#[derive(Debug, Default)]
pub struct TransitionTableBuilder {
    table: TransitionTable,
}

impl TransitionTableBuilder {
    /// Adds an entry matching on the request alone. Redefining a key replaces the earlier entry.
    pub fn direct(mut self, key: RequestKey, outcome: ScriptedOutcome) -> Self {
        if self.table.direct.contains_key(&key) {
            warn!(%key, "Duplicate transition, the last definition wins");
        }
        self.table.direct.insert(key, outcome);
        self
    }

    /// Adds an entry matching on the request while the simulator is in `state`. Redefining a key
    /// replaces the earlier entry.
    pub fn state_qualified(
        mut self,
        key: RequestKey,
        state: impl Into<StateName>,
        outcome: ScriptedOutcome,
    ) -> Self {
        let key = key.with_state(state.into());
        if self.table.state_qualified.contains_key(&key) {
            warn!(%key, "Duplicate transition, the last definition wins");
        }
        self.table.state_qualified.insert(key, outcome);
        self
    }

    pub fn build(self) -> TransitionTable {
        self.table
    }
}

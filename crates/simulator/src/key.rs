// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Keys identifying a request for matching purposes.
//!
//! No normalization happens here: the request target is kept exactly as received (path and query
//! string, percent-encoding included) and the body is compared byte for byte. Table entries must
//! therefore match the client's serialization exactly.

use std::fmt;

use bytes::Bytes;
use http::Method;

use crate::state::StateName;

/// Method, request target and body of a request.
///
/// Its textual form joins the three components with a single space, so a request without body
/// renders with a trailing space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: Method,
    target: String,
    body: Bytes,
}

impl RequestKey {
    pub fn new(method: Method, target: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            target: target.into(),
            body: body.into(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn with_state(self, state: StateName) -> StateQualifiedKey {
        StateQualifiedKey {
            request: self,
            state,
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.method,
            self.target,
            String::from_utf8_lossy(&self.body)
        )
    }
}

/// A [`RequestKey`] qualified by the state the simulator is in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateQualifiedKey {
    request: RequestKey,
    state: StateName,
}

impl StateQualifiedKey {
    pub fn request(&self) -> &RequestKey {
        &self.request
    }

    pub fn state(&self) -> &StateName {
        &self.state
    }
}

impl fmt::Display for StateQualifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.request, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage_simulator_test_util::assert_eq;

    const CREATE_DIR: &str = "/apps/sciencemesh/~einstein/api/storage/CreateDir";

    #[test]
    fn renders_components_in_order() {
        let key = RequestKey::new(Method::POST, CREATE_DIR, r#"{"path":"/subdir"}"#);
        assert_eq!(
            key.to_string(),
            r#"POST /apps/sciencemesh/~einstein/api/storage/CreateDir {"path":"/subdir"}"#
        );
        assert_eq!(
            key.with_state(StateName::EMPTY).to_string(),
            r#"POST /apps/sciencemesh/~einstein/api/storage/CreateDir {"path":"/subdir"} EMPTY"#
        );
    }

    #[test]
    fn empty_body_leaves_separators_in_place() {
        let key = RequestKey::new(
            Method::POST,
            "/apps/sciencemesh/~einstein/api/storage/ListRecycle",
            Bytes::new(),
        );
        assert_eq!(
            key.to_string(),
            "POST /apps/sciencemesh/~einstein/api/storage/ListRecycle "
        );
        assert_eq!(
            key.with_state(StateName::RECYCLE).to_string(),
            "POST /apps/sciencemesh/~einstein/api/storage/ListRecycle  RECYCLE"
        );
    }

    #[test]
    fn every_component_participates_in_equality() {
        let key = RequestKey::new(Method::POST, CREATE_DIR, "{}");

        assert_eq!(key, RequestKey::new(Method::POST, CREATE_DIR, "{}"));
        assert_ne!(key, RequestKey::new(Method::PUT, CREATE_DIR, "{}"));
        assert_ne!(key, RequestKey::new(Method::POST, "/CreateDir", "{}"));
        assert_ne!(key, RequestKey::new(Method::POST, CREATE_DIR, "{ }"));
        assert_ne!(
            key,
            RequestKey::new(Method::POST, format!("{CREATE_DIR}?force=true"), "{}")
        );
    }

    #[test]
    fn state_distinguishes_qualified_keys() {
        let key = RequestKey::new(Method::POST, CREATE_DIR, "{}");
        assert_ne!(
            key.clone().with_state(StateName::HOME),
            key.with_state(StateName::NEWDIR)
        );
    }
}

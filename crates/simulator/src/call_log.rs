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

use parking_lot::Mutex;

use crate::key::RequestKey;

/// Append-only record of the primary keys of all requests an engine served, in arrival order.
///
/// Keys are kept as [`RequestKey`] values so binary bodies survive byte for byte; their text form
/// is available through `Display`.
///
/// Cloning yields another handle on the same log, which lets a test hand a log to the engine and
/// keep inspecting it afterwards.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<RequestKey>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, key: &RequestKey) {
        self.0.lock().push(key.clone());
    }

    /// Snapshot of the recorded keys.
    pub fn entries(&self) -> Vec<RequestKey> {
        self.0.lock().clone()
    }

    /// Text form of every recorded key.
    pub fn rendered(&self) -> Vec<String> {
        self.0.lock().iter().map(ToString::to_string).collect()
    }

    pub fn last(&self) -> Option<RequestKey> {
        self.0.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use http::Method;

    #[test]
    fn clones_share_entries() {
        let log = CallLog::new();
        let handle = log.clone();

        log.record(&RequestKey::new(Method::GET, "/a", ""));
        log.record(&RequestKey::new(Method::PUT, "/b", "shiny!"));

        assert_eq!(handle.len(), 2);
        assert_eq!(handle.rendered(), vec!["GET /a ", "PUT /b shiny!"]);
        assert_eq!(
            handle.last(),
            Some(RequestKey::new(Method::PUT, "/b", "shiny!"))
        );
    }

    #[test]
    fn binary_bodies_stay_distinct() {
        let log = CallLog::new();

        log.record(&RequestKey::new(Method::PUT, "/u", Bytes::from_static(&[0xff])));
        log.record(&RequestKey::new(Method::PUT, "/u", Bytes::from_static(&[0xfe])));

        let entries = log.entries();
        assert_ne!(entries[0], entries[1]);
        assert_eq!(entries[0].body(), &Bytes::from_static(&[0xff]));
        assert_eq!(entries[1].body(), &Bytes::from_static(&[0xfe]));
    }
}

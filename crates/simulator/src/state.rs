// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::borrow::{Borrow, Cow};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a simulator state.
///
/// Tables are free to introduce their own states, the constants below are the ones used by the
/// built-in storage API table. [`StateName::EMPTY`] and [`StateName::ERROR`] have a meaning for
/// the engine itself: the former is the initial state and the target of the miss path, the latter
/// is entered whenever a served outcome does not name a successor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateName(Cow<'static, str>);

impl StateName {
    pub const EMPTY: StateName = StateName::from_static("EMPTY");
    pub const ERROR: StateName = StateName::from_static("ERROR");
    pub const HOME: StateName = StateName::from_static("HOME");
    pub const SUBDIR: StateName = StateName::from_static("SUBDIR");
    pub const NEWDIR: StateName = StateName::from_static("NEWDIR");
    pub const SUBDIR_NEWDIR: StateName = StateName::from_static("SUBDIR-NEWDIR");
    pub const FILE_RESTORED: StateName = StateName::from_static("FILE-RESTORED");
    pub const GRANT_ADDED: StateName = StateName::from_static("GRANT-ADDED");
    pub const GRANT_UPDATED: StateName = StateName::from_static("GRANT-UPDATED");
    pub const RECYCLE: StateName = StateName::from_static("RECYCLE");
    pub const REFERENCE: StateName = StateName::from_static("REFERENCE");
    pub const METADATA: StateName = StateName::from_static("METADATA");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An unset successor is spelled as the empty name in tables.
    pub fn is_unset(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StateName {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for StateName {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for StateName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_and_static_names_compare_equal() {
        assert_eq!(StateName::new("SUBDIR-NEWDIR"), StateName::SUBDIR_NEWDIR);
        assert_eq!(StateName::default(), StateName::EMPTY);
        assert!(StateName::new("").is_unset());
        assert!(!StateName::ERROR.is_unset());
    }

    #[test]
    fn deserializes_from_plain_string() {
        let name: StateName = serde_json::from_str(r#""FILE-RESTORED""#).unwrap();
        assert_eq!(name, StateName::FILE_RESTORED);
        assert_eq!(name.to_string(), "FILE-RESTORED");
    }
}

// Copyright (c) 2023 - 2026 Restate Software, Inc., Restate GmbH.
// All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! This module contains a collection of matchers

pub use googletest::matchers::*;

pub use body::utf8_body;

mod body {
    use std::fmt::Debug;
    use std::marker::PhantomData;

    use googletest::matcher::{Matcher, MatcherResult};

    struct Utf8BodyMatcher<InnerMatcher, B>(InnerMatcher, PhantomData<B>);

    impl<B: AsRef<[u8]> + Debug, InnerMatcher: Matcher<ActualT = String>> Matcher
        for Utf8BodyMatcher<InnerMatcher, B>
    {
        type ActualT = B;

        fn matches(&self, actual: &Self::ActualT) -> MatcherResult {
            match std::str::from_utf8(actual.as_ref()) {
                Ok(body) => self.0.matches(&body.to_owned()),
                Err(_) => MatcherResult::NoMatch,
            }
        }

        fn describe(&self, matcher_result: MatcherResult) -> String {
            match matcher_result {
                MatcherResult::Match => {
                    format!(
                        "is a UTF-8 body which {}",
                        self.0.describe(MatcherResult::Match)
                    )
                }
                MatcherResult::NoMatch => {
                    format!(
                        "is not a UTF-8 body which {}",
                        self.0.describe(MatcherResult::Match)
                    )
                }
            }
        }
    }

    /// Decodes a response body as UTF-8 and matches the resulting text.
    pub fn utf8_body<B: AsRef<[u8]> + Debug>(
        inner: impl Matcher<ActualT = String>,
    ) -> impl Matcher<ActualT = B> {
        Utf8BodyMatcher(inner, Default::default())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use bytes::Bytes;
        use googletest::matchers::{contains_substring, eq, not};
        use googletest::{assert_that, verify_that};

        #[test]
        fn text_body() {
            assert_that!(
                Bytes::from_static(b"response not defined! GET / "),
                utf8_body(contains_substring("not defined"))
            );
            assert_that!(b"[]".to_vec(), utf8_body(eq("[]".to_owned())));
        }

        #[test]
        fn binary_body_does_not_match() {
            assert_that!(
                Bytes::from_static(&[0xff, 0xfe]),
                not(utf8_body(eq(String::new())))
            );
            assert!(verify_that!(vec![0xc3u8], utf8_body(eq(String::new()))).is_err());
        }
    }
}

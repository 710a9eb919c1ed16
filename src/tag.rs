// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.


//! Matching of hook tag expressions against a scenario's tags.
//!
//! Tags are compared without their leading `@`, so `@db` and `db` are the same
//! tag on both sides.

use gherkin::tagexpr::TagOperation;
use sealed::sealed;

use crate::error::TagExpressionError;

/// Extension of a parsed [`TagOperation`] matching it against a set of tags.
#[sealed]
pub trait Ext {
    /// Checks whether the given `tags` (already without a leading `@`)
    /// satisfy this [`TagOperation`].
    #[must_use]
    fn matches(&self, tags: &[&str]) -> bool;
}

#[sealed]
impl Ext for TagOperation {
    fn matches(&self, tags: &[&str]) -> bool {
        match self {
            Self::And(l, r) => l.matches(tags) && r.matches(tags),
            Self::Or(l, r) => l.matches(tags) || r.matches(tags),
            Self::Not(op) => !op.matches(tags),
            Self::Tag(t) => tags.contains(&without_at(t)),
        }
    }
}

/// Parses the given tag `expression`.
///
/// # Errors
///
/// If the `expression` isn't a valid tag expression.
pub fn parse(expression: &str) -> Result<TagOperation, TagExpressionError> {
    expression.parse::<TagOperation>().map_err(|e| TagExpressionError {
        expression: expression.to_owned(),
        reason: e.to_string(),
    })
}

/// Parses the given tag `expression` and matches it against the `tags`.
///
/// # Errors
///
/// If the `expression` isn't a valid tag expression.
pub fn matches<I, S>(expression: &str, tags: I) -> Result<bool, TagExpressionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let op = parse(expression)?;
    let tags = tags.into_iter().collect::<Vec<_>>();
    let tags = tags.iter().map(|t| without_at(t.as_ref())).collect::<Vec<_>>();
    Ok(op.matches(&tags))
}

fn without_at(tag: &str) -> &str {
    tag.strip_prefix('@').unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::{matches, parse, Ext as _};

    #[test]
    fn single_tag_with_or_without_at() {
        assert_eq!(matches("@fast", ["fast"]), Ok(true));
        assert_eq!(matches("@fast", ["@fast", "@db"]), Ok(true));
        assert_eq!(matches("fast", ["@fast"]), Ok(true));
        assert_eq!(matches("@fast", ["slow"]), Ok(false));
    }

    #[test]
    fn boolean_operators() {
        let op = parse("@db and not @slow").unwrap();

        assert!(op.matches(&["db"]));
        assert!(!op.matches(&["db", "slow"]));
        assert!(!op.matches(&[]));

        let op = parse("(@a or @b) and not @c").unwrap();

        assert!(op.matches(&["b"]));
        assert!(!op.matches(&["b", "c"]));
        assert!(!op.matches(&["d"]));
    }

    #[test]
    fn invalid_expression() {
        let err = matches("@a and", ["a"]).unwrap_err();

        assert_eq!(err.expression, "@a and");
        assert!(!err.reason.is_empty());
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lifecycle [`Event`]s observed by [`Listener`]s.
//!
//! [`Listener`]: crate::Listener

use std::{error::Error as StdError, iter, str::FromStr};

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;
use linked_hash_map::LinkedHashMap;

/// Name of a lifecycle [`Event`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum EventName {
    /// Raw source of a feature file has been read.
    #[display("source")]
    Source,

    /// Something has been attached to a source.
    #[display("attachment")]
    Attachment,

    /// Feature file has been parsed.
    #[display("gherkin-document")]
    GherkinDocument,

    /// Scenario has been compiled into a pickle.
    #[display("pickle")]
    Pickle,

    /// Pickle has been accepted by the filters.
    #[display("pickle-accepted")]
    PickleAccepted,

    /// Pickle has been rejected by the filters.
    #[display("pickle-rejected")]
    PickleRejected,

    /// Test run has started.
    #[display("test-run-started")]
    TestRunStarted,

    /// Test case has been matched against step definitions and hooks.
    #[display("test-case-prepared")]
    TestCasePrepared,

    /// Test case has started.
    #[display("test-case-started")]
    TestCaseStarted,

    /// Test step has started.
    #[display("test-step-started")]
    TestStepStarted,

    /// Something has been attached to a test step.
    #[display("test-step-attachment")]
    TestStepAttachment,

    /// Test step has finished.
    #[display("test-step-finished")]
    TestStepFinished,

    /// Test case has finished.
    #[display("test-case-finished")]
    TestCaseFinished,

    /// Test run has finished.
    #[display("test-run-finished")]
    TestRunFinished,
}

impl EventName {
    /// All the [`EventName`]s in their emission order.
    pub const ALL: [Self; 14] = [
        Self::Source,
        Self::Attachment,
        Self::GherkinDocument,
        Self::Pickle,
        Self::PickleAccepted,
        Self::PickleRejected,
        Self::TestRunStarted,
        Self::TestCasePrepared,
        Self::TestCaseStarted,
        Self::TestStepStarted,
        Self::TestStepAttachment,
        Self::TestStepFinished,
        Self::TestCaseFinished,
        Self::TestRunFinished,
    ];

    /// Returns the wire name of this [`EventName`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Attachment => "attachment",
            Self::GherkinDocument => "gherkin-document",
            Self::Pickle => "pickle",
            Self::PickleAccepted => "pickle-accepted",
            Self::PickleRejected => "pickle-rejected",
            Self::TestRunStarted => "test-run-started",
            Self::TestCasePrepared => "test-case-prepared",
            Self::TestCaseStarted => "test-case-started",
            Self::TestStepStarted => "test-step-started",
            Self::TestStepAttachment => "test-step-attachment",
            Self::TestStepFinished => "test-step-finished",
            Self::TestCaseFinished => "test-case-finished",
            Self::TestRunFinished => "test-run-finished",
        }
    }
}

/// Error of parsing an unknown [`EventName`].
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("Unknown event name: `{_0}`")]
pub struct UnknownEventName(#[error(not(source))] pub String);

impl FromStr for EventName {
    type Err = UnknownEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| UnknownEventName(s.to_owned()))
    }
}

/// Captured error, rendered as its stack when formatted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorTrace {
    /// Rendered stack of the error.
    stack: String,
}

impl ErrorTrace {
    /// Creates a new [`ErrorTrace`] out of an already rendered `stack`.
    #[must_use]
    pub fn new(stack: impl Into<String>) -> Self {
        Self { stack: stack.into() }
    }

    /// Renders the given error along with its whole [`StdError::source()`]
    /// chain.
    #[must_use]
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        Self::new(
            iter::successors(Some(err), |&e| e.source())
                .join("\n    caused by: "),
        )
    }

    /// Returns the rendered stack.
    #[must_use]
    pub fn stack(&self) -> &str {
        &self.stack
    }
}

/// Payload value of an [`Event`].
///
/// Unlike [`serde_json::Value`], [`Value::Object`] keeps insertion order and
/// [`Value::Error`] is recognized by formatters.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `null`.
    Null,

    /// Boolean.
    Bool(bool),

    /// Number.
    Number(serde_json::Number),

    /// String.
    String(String),

    /// Array.
    Array(Vec<Value>),

    /// Object, in insertion order.
    Object(LinkedHashMap<String, Value>),

    /// Captured error.
    Error(ErrorTrace),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Number(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Number(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        serde_json::Number::from_f64(v).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ErrorTrace> for Value {
    fn from(v: ErrorTrace) -> Self {
        Self::Error(v)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(v: Vec<V>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<LinkedHashMap<String, Value>> for Value {
    fn from(v: LinkedHashMap<String, Value>) -> Self {
        Self::Object(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match v {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => Self::Number(n),
            Json::String(s) => Self::String(s),
            Json::Array(a) => a.into(),
            Json::Object(o) => {
                Self::Object(o.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Lifecycle event along with its payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Name of this [`Event`].
    pub name: EventName,

    /// Payload of this [`Event`], in insertion order.
    pub data: LinkedHashMap<String, Value>,
}

impl Event {
    /// Creates a new [`Event`] with an empty payload.
    #[must_use]
    pub fn new(name: EventName) -> Self {
        Self { name, data: LinkedHashMap::new() }
    }

    /// Appends the given `key` to the payload of this [`Event`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        _ = self.data.insert(key.into(), value.into());
        self
    }

    /// Returns the payload value under the given `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

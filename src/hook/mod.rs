// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Feature-level and scenario-level hook definitions.

use std::{fmt, sync::Arc, time::Duration};

use futures::future::LocalBoxFuture;

use crate::{
    args::{Argument, RawArgs},
    definition::DefinitionId,
    error::TagExpressionError,
    location::Location,
    tag,
};

/// Signature of a scenario hook [`Fn`].
pub type ScenarioHookCode<W> = dyn for<'a> Fn(
    &'a mut W,
    &'a gherkin::Scenario,
) -> LocalBoxFuture<'a, ()>;

/// Signature of a feature-level hook [`Fn`].
pub type FeaturesHookCode = dyn Fn() -> LocalBoxFuture<'static, ()>;

/// Shared [`Fn`] run before or after each [`gherkin::Scenario`].
///
/// Clones share the same underlying [`Fn`], so their identity may be checked
/// with [`ScenarioHookFn::ptr_eq()`].
pub struct ScenarioHookFn<W>(Arc<ScenarioHookCode<W>>);

impl<W> ScenarioHookFn<W> {
    /// Wraps the given [`Fn`] into a [`ScenarioHookFn`].
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(
                &'a mut W,
                &'a gherkin::Scenario,
            ) -> LocalBoxFuture<'a, ()>
            + 'static,
    {
        Self(Arc::new(f))
    }

    /// Runs this [`ScenarioHookFn`] on the given `world`.
    pub fn call<'a>(
        &self,
        world: &'a mut W,
        scenario: &'a gherkin::Scenario,
    ) -> LocalBoxFuture<'a, ()> {
        (self.0)(world, scenario)
    }

    /// Indicates whether both [`ScenarioHookFn`]s share the same underlying
    /// [`Fn`].
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// Implemented manually to omit redundant `W: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<W> Clone for ScenarioHookFn<W> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<W> fmt::Debug for ScenarioHookFn<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScenarioHookFn({:p})", Arc::as_ptr(&self.0))
    }
}

/// Shared [`Fn`] run once before or after all the features.
#[derive(Clone)]
pub struct FeaturesHookFn(Arc<FeaturesHookCode>);

impl FeaturesHookFn {
    /// Wraps the given [`Fn`] into a [`FeaturesHookFn`].
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> LocalBoxFuture<'static, ()> + 'static,
    {
        Self(Arc::new(f))
    }

    /// Runs this [`FeaturesHookFn`].
    pub fn call(&self) -> LocalBoxFuture<'static, ()> {
        (self.0)()
    }

    /// Indicates whether both [`FeaturesHookFn`]s share the same underlying
    /// [`Fn`].
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FeaturesHookFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeaturesHookFn({:p})", Arc::as_ptr(&self.0))
    }
}

/// Options of a [`HookDefinition`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HookOptions {
    /// Tag expression restricting the scenarios the hook applies to.
    ///
    /// [`None`] means the hook applies to all of them.
    pub tags: Option<String>,

    /// Timeout overriding the default one of a [`SupportCodeLibrary`].
    ///
    /// [`SupportCodeLibrary`]: crate::SupportCodeLibrary
    pub timeout: Option<Duration>,
}

impl HookOptions {
    /// Creates [`HookOptions`] with the given `tags` expression.
    #[must_use]
    pub fn tagged(tags: impl Into<String>) -> Self {
        Self { tags: Some(tags.into()), timeout: None }
    }

    /// Sets the `timeout` of these [`HookOptions`].
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Drops the empty tag expression, as it restricts nothing.
    pub(crate) fn normalized(mut self) -> Self {
        if self.tags.as_deref().is_some_and(|t| t.trim().is_empty()) {
            self.tags = None;
        }
        self
    }
}

/// Positional arguments of a hook registration call.
pub type HookArgs<C> = RawArgs<HookOptions, C>;

impl<C> From<(&str, C)> for HookArgs<C> {
    fn from((tags, code): (&str, C)) -> Self {
        Self(vec![Argument::Tags(tags.to_owned()), Argument::Code(code)])
    }
}

impl<C> From<(String, C)> for HookArgs<C> {
    fn from((tags, code): (String, C)) -> Self {
        Self(vec![Argument::Tags(tags), Argument::Code(code)])
    }
}

impl<C> From<(HookOptions, C)> for HookArgs<C> {
    fn from((options, code): (HookOptions, C)) -> Self {
        Self(vec![Argument::Options(options), Argument::Code(code)])
    }
}

impl<C> From<(&str, HookOptions, C)> for HookArgs<C> {
    fn from((tags, options, code): (&str, HookOptions, C)) -> Self {
        Self(vec![
            Argument::Tags(tags.to_owned()),
            Argument::Options(options),
            Argument::Code(code),
        ])
    }
}

/// Registered hook.
///
/// `C` is either a [`ScenarioHookFn`] or a [`FeaturesHookFn`].
#[derive(Clone, Debug)]
pub struct HookDefinition<C> {
    /// Unique identifier of this [`HookDefinition`].
    pub id: DefinitionId,

    /// Code to run.
    pub code: C,

    /// [`HookOptions`] given on registration.
    pub options: HookOptions,

    /// [`Location`] of the registration call.
    pub location: Option<Location>,
}

impl<C> HookDefinition<C> {
    /// Returns the tag expression of this [`HookDefinition`], if any.
    #[must_use]
    pub fn tags(&self) -> Option<&str> {
        self.options.tags.as_deref()
    }

    /// Returns the timeout of this [`HookDefinition`], falling back to the
    /// given `default` one.
    #[must_use]
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.options.timeout.unwrap_or(default)
    }

    /// Indicates whether this [`HookDefinition`] applies to a scenario with
    /// the given `tags`.
    ///
    /// [`HookDefinition`]s without a tag expression apply to everything.
    ///
    /// # Errors
    ///
    /// If the tag expression of this [`HookDefinition`] fails to parse.
    pub fn applies_to<I, S>(&self, tags: I) -> Result<bool, TagExpressionError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
    {
        self.tags().map_or(Ok(true), |expr| tag::matches(expr, tags))
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [Given], [When] and [Then] step definitions.
//!
//! [Given]: https://cucumber.io/docs/gherkin/reference#given
//! [Then]: https://cucumber.io/docs/gherkin/reference#then
//! [When]: https://cucumber.io/docs/gherkin/reference#when

pub mod regex;

use std::{fmt, sync::Arc, time::Duration};

use derive_more::with_trait::{Debug, Display};
use futures::future::LocalBoxFuture;
use gherkin::StepType;

use crate::{
    args::RawArgs,
    definition::{Category, DefinitionId},
    error::InvalidReason,
    location::Location,
};

pub use self::regex::PatternRegex;

/// Signature of a step [`Fn`].
pub type StepCode<W> =
    dyn for<'a> Fn(&'a mut W, Context) -> LocalBoxFuture<'a, ()>;

/// Shared step [`Fn`] registered via [`given`], [`when`] or [`then`].
///
/// Clones share the same underlying [`Fn`], so their identity may be checked
/// with [`StepFn::ptr_eq()`].
///
/// [`given`]: crate::SupportCodeLibraryBuilder::given
/// [`then`]: crate::SupportCodeLibraryBuilder::then
/// [`when`]: crate::SupportCodeLibraryBuilder::when
pub struct StepFn<W>(Arc<StepCode<W>>);

impl<W> StepFn<W> {
    /// Wraps the given [`Fn`] into a [`StepFn`].
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut W, Context) -> LocalBoxFuture<'a, ()> + 'static,
    {
        Self(Arc::new(f))
    }

    /// Runs this [`StepFn`] on the given `world`.
    pub fn call<'a>(
        &self,
        world: &'a mut W,
        ctx: Context,
    ) -> LocalBoxFuture<'a, ()> {
        (self.0)(world, ctx)
    }

    /// Indicates whether both [`StepFn`]s share the same underlying [`Fn`].
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// Implemented manually to omit redundant `W: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<W> Clone for StepFn<W> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<W> fmt::Debug for StepFn<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StepFn({:p})", Arc::as_ptr(&self.0))
    }
}

/// Context of a [`StepFn`] execution, filled by the runtime on matching.
#[derive(Clone, Debug)]
pub struct Context {
    /// [`gherkin::Step`] matched to a [`StepFn`].
    pub step: gherkin::Step,

    /// Captured values of the matched [`Pattern`], the whole match first.
    pub matches: Vec<String>,
}

/// Pattern a step text is matched against.
///
/// Expressions are stored verbatim: compiling them is up to the runtime,
/// with the help of the [`ParameterTypeRegistry`].
///
/// [`ParameterTypeRegistry`]: crate::ParameterTypeRegistry
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
pub enum Pattern {
    /// [Cucumber Expression][0] string.
    ///
    /// [0]: https://github.com/cucumber/cucumber-expressions
    #[display("{_0}")]
    Expression(String),

    /// Regular expression.
    #[display("{_0}")]
    Regex(PatternRegex),
}

impl Pattern {
    /// Returns the source of this [`Pattern`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Expression(s) => s,
            Self::Regex(re) => re.source(),
        }
    }

    /// Indicates whether this [`Pattern`] is a regular expression.
    #[must_use]
    pub const fn is_regex(&self) -> bool {
        matches!(self, Self::Regex(_))
    }

    /// Checks this [`Pattern`] being usable for matching.
    pub(crate) fn validate(&self) -> Result<(), InvalidReason> {
        if self.as_str().is_empty() {
            return Err(InvalidReason::EmptyPattern);
        }
        Ok(())
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::Expression(s.to_owned())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Self::Expression(s)
    }
}

impl From<::regex::Regex> for Pattern {
    fn from(re: ::regex::Regex) -> Self {
        Self::Regex(re.into())
    }
}

/// Options of a [`StepDefinition`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StepOptions {
    /// Timeout overriding the default one of a [`SupportCodeLibrary`].
    ///
    /// [`SupportCodeLibrary`]: crate::SupportCodeLibrary
    pub timeout: Option<Duration>,
}

impl StepOptions {
    /// Creates [`StepOptions`] with the given `timeout`.
    #[must_use]
    pub const fn timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout) }
    }
}

/// Positional arguments following the pattern of a step registration call.
pub type StepArgs<W> = RawArgs<StepOptions, StepFn<W>>;

impl<W> From<(StepOptions, StepFn<W>)> for StepArgs<W> {
    fn from((options, code): (StepOptions, StepFn<W>)) -> Self {
        use crate::args::Argument;

        Self(vec![Argument::Options(options), Argument::Code(code)])
    }
}

/// Registered [Given], [When] or [Then] step.
///
/// [Given]: https://cucumber.io/docs/gherkin/reference#given
/// [Then]: https://cucumber.io/docs/gherkin/reference#then
/// [When]: https://cucumber.io/docs/gherkin/reference#when
#[derive(Debug)]
pub struct StepDefinition<W> {
    /// Unique identifier of this [`StepDefinition`].
    pub id: DefinitionId,

    /// Keyword this [`StepDefinition`] was registered with.
    pub keyword: StepType,

    /// [`Pattern`] to match step text against.
    pub pattern: Pattern,

    /// Code to run.
    pub code: StepFn<W>,

    /// [`StepOptions`] given on registration.
    pub options: StepOptions,

    /// [`Location`] of the registration call.
    pub location: Option<Location>,
}

// Implemented manually to omit redundant `W: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<W> Clone for StepDefinition<W> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            keyword: self.keyword,
            pattern: self.pattern.clone(),
            code: self.code.clone(),
            options: self.options,
            location: self.location,
        }
    }
}

impl<W> StepDefinition<W> {
    /// Returns the [`Category`] of this [`StepDefinition`].
    #[must_use]
    pub const fn category(&self) -> Category {
        category_of(self.keyword)
    }

    /// Returns the timeout of this [`StepDefinition`], falling back to the
    /// given `default` one.
    #[must_use]
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.options.timeout.unwrap_or(default)
    }
}

/// Returns the [`Category`] of a step registered with the `keyword`.
pub(crate) const fn category_of(keyword: StepType) -> Category {
    match keyword {
        StepType::Given => Category::Given,
        StepType::When => Category::When,
        StepType::Then => Category::Then,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::{executor::block_on, FutureExt as _};
    use gherkin::StepType;

    use super::{Context, Pattern, StepFn};

    fn context(value: &str) -> Context {
        Context {
            step: gherkin::Step {
                keyword: "Given ".into(),
                ty: StepType::Given,
                value: value.into(),
                docstring: None,
                table: None,
                span: gherkin::Span { start: 0, end: 0 },
                position: gherkin::LineCol { line: 1, col: 1 },
            },
            matches: vec![value.into()],
        }
    }

    #[test]
    fn step_fn_runs_on_world() {
        let step = StepFn::new(|w: &mut Vec<String>, ctx: Context| {
            async move { w.push(ctx.step.value) }.boxed_local()
        });
        let mut world = Vec::new();

        block_on(step.call(&mut world, context("I eat 5 cucumbers")));

        assert_eq!(world, ["I eat 5 cucumbers"]);
    }

    #[test]
    fn clones_share_identity() {
        let step = StepFn::<()>::new(|_, _| async {}.boxed_local());
        let other = StepFn::<()>::new(|_, _| async {}.boxed_local());

        assert!(step.ptr_eq(&step.clone()));
        assert!(!step.ptr_eq(&other));
    }

    #[test]
    fn pattern_from_str_is_expression() {
        let p = Pattern::from("I have {int} cucumbers");

        assert!(!p.is_regex());
        assert_eq!(p.as_str(), "I have {int} cucumbers");
    }

    #[test]
    fn pattern_from_regex() {
        let p = Pattern::from(regex::Regex::new(r"^I have (\d+)$").unwrap());

        assert!(p.is_regex());
        assert_eq!(p.to_string(), r"^I have (\d+)$");
    }

    #[test]
    fn empty_pattern_is_invalid() {
        assert!(Pattern::from("").validate().is_err());
        assert!(Pattern::from("x").validate().is_ok());
    }

    #[test]
    fn step_options_timeout() {
        let opts = super::StepOptions::timeout(Duration::from_secs(1));

        assert_eq!(opts.timeout, Some(Duration::from_secs(1)));
        assert_eq!(super::StepOptions::default().timeout, None);
    }
}

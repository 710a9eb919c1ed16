// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`SupportCodeLibraryBuilder`] collecting definitions into a
//! [`SupportCodeLibrary`].

mod config;

use std::{
    any::Any,
    borrow::Cow,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    time::Duration,
};

use derive_more::with_trait::Debug;
use gherkin::StepType;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    args::Normalized,
    definition::{Category, DefinitionId, IdGenerator},
    error::{
        InvalidDefinitionError, InvalidReason, RegistrationFailure,
        UserRegistrationError,
    },
    hook::{FeaturesHookFn, HookArgs, HookDefinition, ScenarioHookFn},
    library::SupportCodeLibrary,
    location::Location,
    parameter::{ParameterType, ParameterTypeRegistry},
    step::{self, Pattern, StepArgs, StepDefinition},
    world::{World, WorldConstructor},
    Error, Listener, Result, DEFAULT_TIMEOUT,
};

#[doc(inline)]
pub use self::config::{BuildConfig, SupportCode, SupportCodeFn};

/// Mutable registry exposed to registration functions.
///
/// Created fresh by every [`SupportCodeLibraryBuilder::build()`] call and
/// consumed into a [`SupportCodeLibrary`] once all the registration functions
/// succeed.
#[derive(Debug)]
pub struct SupportCodeLibraryBuilder<W> {
    /// Working directory of the project.
    cwd: PathBuf,

    /// Generator of [`DefinitionId`]s shared by all the categories.
    ids: IdGenerator,

    /// [`StepDefinition`]s in registration order.
    step_definitions: Vec<StepDefinition<W>>,

    /// `Before` hooks in registration order.
    before_features: Vec<HookDefinition<FeaturesHookFn>>,

    /// `After` hooks in registration order.
    after_features: Vec<HookDefinition<FeaturesHookFn>>,

    /// `BeforeEach` hooks in registration order.
    before_scenario: Vec<HookDefinition<ScenarioHookFn<W>>>,

    /// `AfterEach` hooks in registration order.
    after_scenario: Vec<HookDefinition<ScenarioHookFn<W>>>,

    /// Built-in and user-defined [`ParameterType`]s.
    parameter_types: ParameterTypeRegistry,

    /// Custom [`WorldConstructor`], if set.
    world: Option<WorldConstructor<W>>,

    /// Custom default timeout, if set.
    default_timeout: Option<Duration>,

    /// Registered [`Listener`]s.
    listeners: Vec<Box<dyn Listener>>,

    /// First [`Error`] returned by a DSL method, if any.
    ///
    /// Fails the build even if the registration function drops the error.
    failure: Option<Error>,
}

impl<W: World> SupportCodeLibraryBuilder<W> {
    /// Runs all the registration functions of the given [`BuildConfig`] in
    /// order against a fresh [`SupportCodeLibraryBuilder`], and finalizes it
    /// into a [`SupportCodeLibrary`].
    ///
    /// After hooks are reversed, so the ones registered first run last.
    ///
    /// # Errors
    ///
    /// If any registration function fails, aborting the whole build:
    /// - an [`Error`] returned by this builder is propagated as is, even if
    ///   the registration function ignored it and returned [`Ok`];
    /// - any other error or a panic is wrapped into an
    ///   [`Error::UserRegistration`].
    pub fn build(config: BuildConfig<W>) -> Result<SupportCodeLibrary<W>> {
        let BuildConfig { cwd, fns } = config;
        let mut builder = Self::new(cwd);

        for (index, SupportCodeFn { name, code }) in fns.into_iter().enumerate()
        {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                code(&mut builder)
            }));
            if let Some(e) = builder.failure.take() {
                return Err(e);
            }
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => match e.downcast::<Error>() {
                    Ok(e) => return Err(*e),
                    Err(e) => RegistrationFailure::Error(e.into()),
                },
                Err(payload) => {
                    RegistrationFailure::Panic(coerce_panic(&*payload).into())
                }
            };
            return Err(UserRegistrationError { index, name, failure }.into());
        }

        Ok(builder.finalize())
    }

    /// Freezes this [`SupportCodeLibraryBuilder`] into a
    /// [`SupportCodeLibrary`].
    fn finalize(self) -> SupportCodeLibrary<W> {
        let Self {
            cwd,
            ids: _,
            step_definitions,
            before_features,
            mut after_features,
            before_scenario,
            mut after_scenario,
            parameter_types,
            world,
            default_timeout,
            listeners,
            failure: _,
        } = self;

        after_features.reverse();
        after_scenario.reverse();
        let default_timeout = default_timeout.unwrap_or(DEFAULT_TIMEOUT);

        info!(
            steps = step_definitions.len(),
            before_features = before_features.len(),
            after_features = after_features.len(),
            before_scenario = before_scenario.len(),
            after_scenario = after_scenario.len(),
            parameter_types = parameter_types.len(),
            listeners = listeners.len(),
            default_timeout = %humantime::format_duration(default_timeout),
            "support code library finalized",
        );

        SupportCodeLibrary {
            step_definitions,
            before_features_hook_definitions: before_features,
            after_features_hook_definitions: after_features,
            before_scenario_hook_definitions: before_scenario,
            after_scenario_hook_definitions: after_scenario,
            parameter_type_registry: parameter_types,
            world: world.unwrap_or_default(),
            default_timeout,
            listeners,
            cwd,
        }
    }
}

impl<W> SupportCodeLibraryBuilder<W> {
    /// Creates an empty [`SupportCodeLibraryBuilder`].
    fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ids: IdGenerator::default(),
            step_definitions: Vec::new(),
            before_features: Vec::new(),
            after_features: Vec::new(),
            before_scenario: Vec::new(),
            after_scenario: Vec::new(),
            parameter_types: ParameterTypeRegistry::new(),
            world: None,
            default_timeout: None,
            listeners: Vec::new(),
            failure: None,
        }
    }

    /// Returns the working directory of the project being built.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Returns the [`ParameterType`]s defined so far, built-in ones
    /// included.
    #[must_use]
    pub const fn parameter_types(&self) -> &ParameterTypeRegistry {
        &self.parameter_types
    }

    /// Registers a [Given] step.
    ///
    /// `args` is either a [`StepFn`] or a `(StepOptions, StepFn)` tuple.
    ///
    /// # Errors
    ///
    /// With an [`Error::InvalidDefinition`] if the `pattern` is empty or the
    /// `args` have no [`StepFn`] in the last position.
    ///
    /// [`StepFn`]: crate::StepFn
    /// [Given]: https://cucumber.io/docs/gherkin/reference#given
    #[track_caller]
    pub fn given(
        &mut self,
        pattern: impl Into<Pattern>,
        args: impl Into<StepArgs<W>>,
    ) -> Result<DefinitionId> {
        let res = self.define_step(
            StepType::Given,
            pattern.into(),
            args.into(),
            Location::caller(),
        );
        self.record(res)
    }

    /// Registers a [When] step.
    ///
    /// # Errors
    ///
    /// See [`SupportCodeLibraryBuilder::given()`].
    ///
    /// [When]: https://cucumber.io/docs/gherkin/reference#when
    #[track_caller]
    pub fn when(
        &mut self,
        pattern: impl Into<Pattern>,
        args: impl Into<StepArgs<W>>,
    ) -> Result<DefinitionId> {
        let res = self.define_step(
            StepType::When,
            pattern.into(),
            args.into(),
            Location::caller(),
        );
        self.record(res)
    }

    /// Registers a [Then] step.
    ///
    /// # Errors
    ///
    /// See [`SupportCodeLibraryBuilder::given()`].
    ///
    /// [Then]: https://cucumber.io/docs/gherkin/reference#then
    #[track_caller]
    pub fn then(
        &mut self,
        pattern: impl Into<Pattern>,
        args: impl Into<StepArgs<W>>,
    ) -> Result<DefinitionId> {
        let res = self.define_step(
            StepType::Then,
            pattern.into(),
            args.into(),
            Location::caller(),
        );
        self.record(res)
    }

    /// Registers a [Given] step matched by the `regex`.
    ///
    /// # Errors
    ///
    /// With an [`Error::InvalidDefinition`] if the `regex` fails to compile,
    /// or on the same grounds as [`SupportCodeLibraryBuilder::given()`].
    ///
    /// [Given]: https://cucumber.io/docs/gherkin/reference#given
    #[track_caller]
    pub fn given_regex(
        &mut self,
        regex: &str,
        args: impl Into<StepArgs<W>>,
    ) -> Result<DefinitionId> {
        let res = self.define_regex_step(
            StepType::Given,
            regex,
            args.into(),
            Location::caller(),
        );
        self.record(res)
    }

    /// Registers a [When] step matched by the `regex`.
    ///
    /// # Errors
    ///
    /// See [`SupportCodeLibraryBuilder::given_regex()`].
    ///
    /// [When]: https://cucumber.io/docs/gherkin/reference#when
    #[track_caller]
    pub fn when_regex(
        &mut self,
        regex: &str,
        args: impl Into<StepArgs<W>>,
    ) -> Result<DefinitionId> {
        let res = self.define_regex_step(
            StepType::When,
            regex,
            args.into(),
            Location::caller(),
        );
        self.record(res)
    }

    /// Registers a [Then] step matched by the `regex`.
    ///
    /// # Errors
    ///
    /// See [`SupportCodeLibraryBuilder::given_regex()`].
    ///
    /// [Then]: https://cucumber.io/docs/gherkin/reference#then
    #[track_caller]
    pub fn then_regex(
        &mut self,
        regex: &str,
        args: impl Into<StepArgs<W>>,
    ) -> Result<DefinitionId> {
        let res = self.define_regex_step(
            StepType::Then,
            regex,
            args.into(),
            Location::caller(),
        );
        self.record(res)
    }

    /// Registers a hook run once before all the features.
    ///
    /// `args` is a [`FeaturesHookFn`], optionally preceded by a tag
    /// expression, [`HookOptions`] or both.
    ///
    /// # Errors
    ///
    /// With an [`Error::InvalidDefinition`] if the `args` have an unsupported
    /// shape.
    ///
    /// [`HookOptions`]: crate::HookOptions
    #[track_caller]
    pub fn before(
        &mut self,
        args: impl Into<HookArgs<FeaturesHookFn>>,
    ) -> Result<DefinitionId> {
        let res = self.define_hook(
            Category::BeforeFeatures,
            args.into(),
            Location::caller(),
        );
        let def = self.record(res)?;
        let id = def.id;
        self.before_features.push(def);
        Ok(id)
    }

    /// Registers a hook run once after all the features.
    ///
    /// Hooks registered later run earlier.
    ///
    /// # Errors
    ///
    /// See [`SupportCodeLibraryBuilder::before()`].
    #[track_caller]
    pub fn after(
        &mut self,
        args: impl Into<HookArgs<FeaturesHookFn>>,
    ) -> Result<DefinitionId> {
        let res = self.define_hook(
            Category::AfterFeatures,
            args.into(),
            Location::caller(),
        );
        let def = self.record(res)?;
        let id = def.id;
        self.after_features.push(def);
        Ok(id)
    }

    /// Registers a hook run before each scenario.
    ///
    /// `args` is a [`ScenarioHookFn`], optionally preceded by a tag
    /// expression, [`HookOptions`] or both. A separate tag expression
    /// overrides [`HookOptions::tags`].
    ///
    /// # Errors
    ///
    /// See [`SupportCodeLibraryBuilder::before()`].
    ///
    /// [`HookOptions`]: crate::HookOptions
    /// [`HookOptions::tags`]: crate::HookOptions::tags
    #[track_caller]
    pub fn before_each(
        &mut self,
        args: impl Into<HookArgs<ScenarioHookFn<W>>>,
    ) -> Result<DefinitionId> {
        let res = self.define_hook(
            Category::BeforeScenario,
            args.into(),
            Location::caller(),
        );
        let def = self.record(res)?;
        let id = def.id;
        self.before_scenario.push(def);
        Ok(id)
    }

    /// Registers a hook run after each scenario.
    ///
    /// Hooks registered later run earlier.
    ///
    /// # Errors
    ///
    /// See [`SupportCodeLibraryBuilder::before()`].
    #[track_caller]
    pub fn after_each(
        &mut self,
        args: impl Into<HookArgs<ScenarioHookFn<W>>>,
    ) -> Result<DefinitionId> {
        let res = self.define_hook(
            Category::AfterScenario,
            args.into(),
            Location::caller(),
        );
        let def = self.record(res)?;
        let id = def.id;
        self.after_scenario.push(def);
        Ok(id)
    }

    /// Sets the timeout of definitions not specifying their own one.
    pub fn set_default_timeout(&mut self, timeout: Duration) {
        if let Some(prev) = self.default_timeout.replace(timeout) {
            warn!(
                previous = %humantime::format_duration(prev),
                current = %humantime::format_duration(timeout),
                "default timeout overwritten",
            );
        }
    }

    /// Replaces the [`WorldConstructor`]. The last one set wins.
    pub fn set_world_constructor(&mut self, constructor: WorldConstructor<W>) {
        if self.world.replace(constructor).is_some() {
            warn!("world constructor overwritten");
        }
    }

    /// Adds a custom [`ParameterType`].
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateParameterType`] if its name is already taken.
    /// - [`Error::InvalidDefinition`] if it has an illegal name, no or
    ///   malformed regexps, or prefers a regexp another [`ParameterType`]
    ///   already prefers.
    #[track_caller]
    pub fn define_parameter_type(&mut self, ty: ParameterType) -> Result<()> {
        let location = Location::caller();
        let name = ty.name().to_owned();
        let res =
            self.parameter_types.define_parameter_type(ty, Some(location));
        self.record(res)?;
        debug!(
            %name,
            category = %Category::ParameterType,
            %location,
            "parameter type defined",
        );
        Ok(())
    }

    /// Registers a [`Listener`] of run events.
    pub fn register_listener(&mut self, listener: impl Listener + 'static) {
        debug!(?listener, "listener registered");
        self.listeners.push(Box::new(listener));
    }

    /// Remembers the first failed DSL call, so the build fails even if its
    /// result is discarded.
    fn record<T>(&mut self, res: Result<T>) -> Result<T> {
        if let Err(e) = &res {
            _ = self.failure.get_or_insert_with(|| e.clone());
        }
        res
    }

    /// Compiles the `regex` and registers a step matched by it.
    fn define_regex_step(
        &mut self,
        keyword: StepType,
        regex: &str,
        args: StepArgs<W>,
        location: Location,
    ) -> Result<DefinitionId> {
        let re = Regex::new(regex).map_err(|e| {
            InvalidDefinitionError::new(
                step::category_of(keyword),
                Some(location),
                InvalidReason::MalformedRegex {
                    pattern: regex.to_owned(),
                    reason: e.to_string(),
                },
            )
        })?;
        self.define_step(keyword, re.into(), args, location)
    }

    fn define_step(
        &mut self,
        keyword: StepType,
        pattern: Pattern,
        args: StepArgs<W>,
        location: Location,
    ) -> Result<DefinitionId> {
        let category = step::category_of(keyword);
        pattern.validate().map_err(|reason| {
            InvalidDefinitionError::new(category, Some(location), reason)
        })?;
        let Normalized { options, code, .. } =
            args.normalize(category, Some(location))?;

        let id = self.ids.next_id();
        debug!(%id, %category, %pattern, %location, "step defined");

        self.step_definitions.push(StepDefinition {
            id,
            keyword,
            pattern,
            code,
            options,
            location: Some(location),
        });
        Ok(id)
    }

    /// Normalizes hook `args` into a [`HookDefinition`].
    ///
    /// A separate tag expression overrides the one of the options.
    fn define_hook<C>(
        &mut self,
        category: Category,
        args: HookArgs<C>,
        location: Location,
    ) -> Result<HookDefinition<C>> {
        let Normalized { tags, mut options, code } =
            args.normalize(category, Some(location))?;
        if tags.is_some() {
            options.tags = tags;
        }
        let options = options.normalized();

        let id = self.ids.next_id();
        debug!(
            %id,
            %category,
            tags = ?options.tags,
            %location,
            "hook defined",
        );

        Ok(HookDefinition { id, code, options, location: Some(location) })
    }
}

/// Coerces the given panic payload into a message.
fn coerce_panic(payload: &(dyn Any + Send)) -> Cow<'static, str> {
    payload
        .downcast_ref::<String>()
        .map(|s| s.clone().into())
        .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_owned().into()))
        .unwrap_or_else(|| "(Could not resolve panic payload)".into())
}

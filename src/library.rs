// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Finalized [`SupportCodeLibrary`].

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use derive_more::with_trait::Debug;

use crate::{
    hook::{FeaturesHookFn, HookDefinition, ScenarioHookFn},
    parameter::ParameterTypeRegistry,
    step::StepDefinition,
    world::WorldConstructor,
    Listener,
};

/// Immutable collection of everything registered by support code, ready to
/// be consumed by a runtime.
///
/// Produced by [`SupportCodeLibraryBuilder::build()`].
///
/// [`SupportCodeLibraryBuilder::build()`]: crate::SupportCodeLibraryBuilder::build
#[derive(Debug)]
pub struct SupportCodeLibrary<W> {
    pub(crate) step_definitions: Vec<StepDefinition<W>>,
    pub(crate) before_features_hook_definitions:
        Vec<HookDefinition<FeaturesHookFn>>,
    pub(crate) after_features_hook_definitions:
        Vec<HookDefinition<FeaturesHookFn>>,
    pub(crate) before_scenario_hook_definitions:
        Vec<HookDefinition<ScenarioHookFn<W>>>,
    pub(crate) after_scenario_hook_definitions:
        Vec<HookDefinition<ScenarioHookFn<W>>>,
    pub(crate) parameter_type_registry: ParameterTypeRegistry,
    pub(crate) world: WorldConstructor<W>,
    pub(crate) default_timeout: Duration,
    pub(crate) listeners: Vec<Box<dyn Listener>>,
    pub(crate) cwd: PathBuf,
}

/// Owned contents of a [`SupportCodeLibrary`].
#[derive(Debug)]
pub struct Parts<W> {
    /// [`SupportCodeLibrary::step_definitions()`].
    pub step_definitions: Vec<StepDefinition<W>>,

    /// [`SupportCodeLibrary::before_features_hook_definitions()`].
    pub before_features_hook_definitions: Vec<HookDefinition<FeaturesHookFn>>,

    /// [`SupportCodeLibrary::after_features_hook_definitions()`].
    pub after_features_hook_definitions: Vec<HookDefinition<FeaturesHookFn>>,

    /// [`SupportCodeLibrary::before_scenario_hook_definitions()`].
    pub before_scenario_hook_definitions:
        Vec<HookDefinition<ScenarioHookFn<W>>>,

    /// [`SupportCodeLibrary::after_scenario_hook_definitions()`].
    pub after_scenario_hook_definitions: Vec<HookDefinition<ScenarioHookFn<W>>>,

    /// [`SupportCodeLibrary::parameter_type_registry()`].
    pub parameter_type_registry: ParameterTypeRegistry,

    /// [`SupportCodeLibrary::world()`].
    pub world: WorldConstructor<W>,

    /// [`SupportCodeLibrary::default_timeout()`].
    pub default_timeout: Duration,

    /// [`SupportCodeLibrary::listeners()`].
    pub listeners: Vec<Box<dyn Listener>>,

    /// [`SupportCodeLibrary::cwd()`].
    pub cwd: PathBuf,
}

impl<W> SupportCodeLibrary<W> {
    /// [`StepDefinition`]s in registration order.
    #[must_use]
    pub fn step_definitions(&self) -> &[StepDefinition<W>] {
        &self.step_definitions
    }

    /// Hooks run once before all the features, in registration order.
    #[must_use]
    pub fn before_features_hook_definitions(
        &self,
    ) -> &[HookDefinition<FeaturesHookFn>] {
        &self.before_features_hook_definitions
    }

    /// Hooks run once after all the features, in reverse registration order.
    #[must_use]
    pub fn after_features_hook_definitions(
        &self,
    ) -> &[HookDefinition<FeaturesHookFn>] {
        &self.after_features_hook_definitions
    }

    /// Hooks run before each scenario, in registration order.
    #[must_use]
    pub fn before_scenario_hook_definitions(
        &self,
    ) -> &[HookDefinition<ScenarioHookFn<W>>] {
        &self.before_scenario_hook_definitions
    }

    /// Hooks run after each scenario, in reverse registration order.
    #[must_use]
    pub fn after_scenario_hook_definitions(
        &self,
    ) -> &[HookDefinition<ScenarioHookFn<W>>] {
        &self.after_scenario_hook_definitions
    }

    /// Built-in and user-defined parameter types.
    #[must_use]
    pub const fn parameter_type_registry(&self) -> &ParameterTypeRegistry {
        &self.parameter_type_registry
    }

    /// Constructor of a [`World`] for every scenario.
    ///
    /// [`World`]: crate::World
    #[must_use]
    pub const fn world(&self) -> &WorldConstructor<W> {
        &self.world
    }

    /// Timeout of definitions not specifying their own one.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Registered [`Listener`]s, in registration order.
    #[must_use]
    pub fn listeners(&self) -> &[Box<dyn Listener>] {
        &self.listeners
    }

    /// Working directory of the project.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Hands over the contents of this [`SupportCodeLibrary`].
    #[must_use]
    pub fn into_parts(self) -> Parts<W> {
        let Self {
            step_definitions,
            before_features_hook_definitions,
            after_features_hook_definitions,
            before_scenario_hook_definitions,
            after_scenario_hook_definitions,
            parameter_type_registry,
            world,
            default_timeout,
            listeners,
            cwd,
        } = self;
        Parts {
            step_definitions,
            before_features_hook_definitions,
            after_features_hook_definitions,
            before_scenario_hook_definitions,
            after_scenario_hook_definitions,
            parameter_type_registry,
            world,
            default_timeout,
            listeners,
            cwd,
        }
    }
}

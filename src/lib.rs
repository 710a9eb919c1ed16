// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Support code library builder for [Cucumber].
//!
//! Collects user-supplied registration functions into a single immutable
//! [`SupportCodeLibrary`]: [`StepDefinition`]s, feature-level and
//! scenario-level [`HookDefinition`]s, a [`ParameterTypeRegistry`], a
//! [`WorldConstructor`], the default timeout and registered [`Listener`]s.
//!
//! ```rust
//! # use cucumber_support::{BuildConfig, DefaultWorld, ScenarioHookFn, StepFn,
//! #     SupportCodeLibraryBuilder};
//! # use futures::FutureExt as _;
//! let library = SupportCodeLibraryBuilder::build(
//!     BuildConfig::<DefaultWorld>::new("path/to/project").with_fn(|dsl| {
//!         dsl.given("I have {int} cucumbers", StepFn::new(|_, _| {
//!             async {}.boxed_local()
//!         }))?;
//!         dsl.before_each(("@db", ScenarioHookFn::new(|_, _| {
//!             async {}.boxed_local()
//!         })))?;
//!         Ok(())
//!     }),
//! )
//! .unwrap();
//!
//! assert_eq!(library.step_definitions().len(), 1);
//! assert_eq!(library.before_scenario_hook_definitions().len(), 1);
//! ```
//!
//! [Cucumber]: https://cucumber.io

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::expect_used,
    clippy::pedantic,
    clippy::unwrap_used,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms
)]

pub mod args;
pub mod builder;
pub mod cli;
pub mod definition;
pub mod error;
pub mod event;
pub mod hook;
pub mod library;
pub mod listener;
pub mod location;
pub mod parameter;
pub mod step;
pub mod tag;
pub mod world;
pub mod writer;

#[doc(inline)]
pub use self::{
    builder::{BuildConfig, SupportCodeFn, SupportCodeLibraryBuilder},
    definition::{Category, DefinitionId},
    error::{
        DuplicateParameterTypeError, Error, InvalidDefinitionError, Result,
        UserRegistrationError,
    },
    event::{Event, EventName},
    hook::{FeaturesHookFn, HookDefinition, HookOptions, ScenarioHookFn},
    library::SupportCodeLibrary,
    listener::Listener,
    location::Location,
    parameter::{ParameterType, ParameterTypeRegistry},
    step::{Pattern, StepDefinition, StepFn, StepOptions},
    world::{DefaultWorld, World, WorldConstructor, WorldContext},
    writer::EventProtocol,
};

/// Default timeout of [`StepDefinition`]s and [`HookDefinition`]s not
/// specifying their own one.
pub const DEFAULT_TIMEOUT: std::time::Duration =
    std::time::Duration::from_millis(5000);

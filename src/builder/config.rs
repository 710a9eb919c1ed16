// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`BuildConfig`] of a [`SupportCodeLibraryBuilder::build()`] call.

use std::path::PathBuf;

use derive_more::with_trait::Debug;

use crate::{error::BoxError, SupportCodeLibraryBuilder};

/// Signature of a registration function.
pub type SupportCode<W> =
    dyn FnOnce(&mut SupportCodeLibraryBuilder<W>) -> Result<(), BoxError>;

/// User-supplied registration function, optionally named for diagnostics.
#[derive(Debug)]
pub struct SupportCodeFn<W> {
    /// Name to report on failure.
    pub(crate) name: Option<String>,

    /// Function to run against the [`SupportCodeLibraryBuilder`].
    #[debug(ignore)]
    pub(crate) code: Box<SupportCode<W>>,
}

impl<W> SupportCodeFn<W> {
    /// Wraps the given function into an unnamed [`SupportCodeFn`].
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut SupportCodeLibraryBuilder<W>) -> Result<(), BoxError>
            + 'static,
    {
        Self { name: None, code: Box::new(f) }
    }

    /// Wraps the given function into a [`SupportCodeFn`] with the `name`.
    #[must_use]
    pub fn named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(&mut SupportCodeLibraryBuilder<W>) -> Result<(), BoxError>
            + 'static,
    {
        Self { name: Some(name.into()), code: Box::new(f) }
    }

    /// Returns the name of this [`SupportCodeFn`], if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Input of a [`SupportCodeLibraryBuilder::build()`] call.
#[derive(Debug)]
pub struct BuildConfig<W> {
    /// Working directory of the project, stored as is.
    pub cwd: PathBuf,

    /// Registration functions, run in order.
    pub fns: Vec<SupportCodeFn<W>>,
}

impl<W> BuildConfig<W> {
    /// Creates a new [`BuildConfig`] without any registration functions.
    #[must_use]
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into(), fns: Vec::new() }
    }

    /// Appends the given [`SupportCodeFn`].
    #[must_use]
    pub fn with(mut self, f: SupportCodeFn<W>) -> Self {
        self.fns.push(f);
        self
    }

    /// Appends an unnamed registration function.
    #[must_use]
    pub fn with_fn<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut SupportCodeLibraryBuilder<W>) -> Result<(), BoxError>
            + 'static,
    {
        self.with(SupportCodeFn::new(f))
    }

    /// Appends a registration function with the `name`.
    #[must_use]
    pub fn with_named_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(&mut SupportCodeLibraryBuilder<W>) -> Result<(), BoxError>
            + 'static,
    {
        self.with(SupportCodeFn::named(name, f))
    }
}

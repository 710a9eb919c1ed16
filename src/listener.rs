// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Listener`]s of [`Event`]s emitted during a run.

use std::{fmt::Debug, io};

use crate::Event;

/// Passive consumer of lifecycle [`Event`]s.
///
/// Registered via [`SupportCodeLibraryBuilder::register_listener()`] and
/// handed over to the runtime as a part of the [`SupportCodeLibrary`].
///
/// [`SupportCodeLibrary`]: crate::SupportCodeLibrary
/// [`SupportCodeLibraryBuilder::register_listener()`]:
///     crate::SupportCodeLibraryBuilder::register_listener
pub trait Listener: Debug {
    /// Handles the given [`Event`].
    ///
    /// # Errors
    ///
    /// If the [`Event`] cannot be written to the underlying output.
    fn on_event(&self, event: &Event) -> io::Result<()>;
}

impl<L: Listener + ?Sized> Listener for Box<L> {
    fn on_event(&self, event: &Event) -> io::Result<()> {
        (**self).on_event(event)
    }
}

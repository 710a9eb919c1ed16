// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`World`] trait and its replaceable [`WorldConstructor`].

use std::{fmt, sync::Arc};

use derive_more::with_trait::Debug;

/// Callback attaching data to the currently running scenario.
pub type Attach = Arc<dyn Fn(Attachment)>;

/// Data attached to a scenario via an [`Attach`] callback.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attachment {
    /// Attached bytes.
    pub data: Vec<u8>,

    /// [Media type][0] of the [`Attachment::data`].
    ///
    /// [0]: https://www.iana.org/assignments/media-types
    pub media_type: String,
}

/// Context a [`World`] is constructed with, per scenario.
#[derive(Clone, Debug)]
pub struct WorldContext {
    /// Callback attaching data to the current scenario.
    #[debug(ignore)]
    pub attach: Attach,

    /// User-supplied world parameters.
    pub parameters: serde_json::Value,
}

impl WorldContext {
    /// Creates a new [`WorldContext`].
    #[must_use]
    pub fn new(attach: Attach, parameters: serde_json::Value) -> Self {
        Self { attach, parameters }
    }

    /// Creates a new [`WorldContext`] with an [`Attach`] callback discarding
    /// everything.
    #[must_use]
    pub fn detached(parameters: serde_json::Value) -> Self {
        Self::new(Arc::new(|_| {}), parameters)
    }
}

/// Represents a shared user-defined state of a [Cucumber] run.
/// It lives on per-[scenario][0] basis.
///
/// [0]: https://cucumber.io/docs/gherkin/reference#descriptions
/// [Cucumber]: https://cucumber.io
pub trait World: Sized + 'static {
    /// Creates a new [`World`] instance out of the given [`WorldContext`].
    fn new(context: WorldContext) -> Self;
}

/// [`World`] used when no custom one is provided, exposing the
/// [`WorldContext`] as is.
#[derive(Clone, Debug)]
pub struct DefaultWorld {
    /// Callback attaching data to the current scenario.
    #[debug(ignore)]
    pub attach: Attach,

    /// User-supplied world parameters.
    pub parameters: serde_json::Value,
}

impl DefaultWorld {
    /// Attaches the given `data` of the `media_type` to the current scenario.
    pub fn attach(&self, data: impl Into<Vec<u8>>, media_type: impl Into<String>) {
        (self.attach)(Attachment {
            data: data.into(),
            media_type: media_type.into(),
        });
    }
}

impl World for DefaultWorld {
    fn new(WorldContext { attach, parameters }: WorldContext) -> Self {
        Self { attach, parameters }
    }
}

/// Factory of [`World`] instances.
///
/// Defaults to [`World::new()`].
pub struct WorldConstructor<W>(Arc<dyn Fn(WorldContext) -> W>);

impl<W> WorldConstructor<W> {
    /// Wraps the given [`Fn`] into a [`WorldConstructor`].
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(WorldContext) -> W + 'static,
    {
        Self(Arc::new(f))
    }

    /// Constructs a new [`World`] instance.
    pub fn construct(&self, context: WorldContext) -> W {
        (self.0)(context)
    }

    /// Indicates whether both [`WorldConstructor`]s share the same underlying
    /// [`Fn`].
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<W: World> Default for WorldConstructor<W> {
    fn default() -> Self {
        Self::new(W::new)
    }
}

// Implemented manually to omit redundant `W: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<W> Clone for WorldConstructor<W> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<W> fmt::Debug for WorldConstructor<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorldConstructor({:p})", Arc::as_ptr(&self.0))
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [Event protocol][1] [`Listener`] implementation, outputting every
//! [`Event`] as a single line of JSON.
//!
//! [1]: https://github.com/cucumber/cucumber/tree/main/messages

use std::{
    cell::RefCell,
    io,
    path::{Path, MAIN_SEPARATOR},
};

use derive_more::with_trait::Debug;
use serde::{ser::SerializeMap as _, ser::SerializeSeq as _, Serialize, Serializer};

use crate::{
    event::{EventName, Value},
    Event, Listener,
};

/// Key of the [`EventName`] in every output line.
const TYPE_KEY: &str = "type";

/// [Event protocol][1] [`Listener`] outputting to an [`io::Write`]
/// implementor.
///
/// Every [`Value::Error`] in an [`Event`] payload is output as its stack with
/// all the occurrences of the current working directory stripped.
///
/// [1]: https://github.com/cucumber/cucumber/tree/main/messages
#[derive(Debug)]
pub struct EventProtocol<Out: io::Write> {
    /// [`io::Write`] implementor to output lines into.
    #[debug(ignore)]
    output: RefCell<Out>,

    /// Prefix to strip from error stacks.
    ///
    /// Empty if nothing should be stripped.
    cwd_prefix: String,

    /// [`EventName`]s this [`EventProtocol`] outputs.
    subscribed: Vec<EventName>,
}

impl<Out: io::Write> EventProtocol<Out> {
    /// Creates a new [`EventProtocol`] [`Listener`] subscribed to all the
    /// [`EventName`]s.
    #[must_use]
    pub fn new(output: Out, cwd: impl AsRef<Path>) -> Self {
        let cwd = cwd.as_ref().to_string_lossy();
        let cwd_prefix = if cwd.is_empty() {
            String::new()
        } else {
            format!("{cwd}{MAIN_SEPARATOR}")
        };
        Self {
            output: RefCell::new(output),
            cwd_prefix,
            subscribed: EventName::ALL.to_vec(),
        }
    }

    /// Restricts this [`EventProtocol`] to the given [`EventName`]s only.
    #[must_use]
    pub fn subscribed_to(
        mut self,
        names: impl IntoIterator<Item = EventName>,
    ) -> Self {
        self.subscribed = names.into_iter().collect();
        self
    }

    /// Indicates whether the given [`EventName`] is output.
    #[must_use]
    pub fn is_subscribed(&self, name: EventName) -> bool {
        self.subscribed.contains(&name)
    }

    /// Unwraps the underlying [`io::Write`] implementor.
    #[must_use]
    pub fn into_inner(self) -> Out {
        self.output.into_inner()
    }

    /// Strips the current working directory from the given `stack`.
    fn format_stack(&self, stack: &str) -> String {
        if self.cwd_prefix.is_empty() {
            stack.to_owned()
        } else {
            stack.replace(&self.cwd_prefix, "")
        }
    }
}

impl<Out: io::Write> Listener for EventProtocol<Out> {
    fn on_event(&self, event: &Event) -> io::Result<()> {
        if !self.is_subscribed(event.name) {
            return Ok(());
        }

        let mut out = self.output.try_borrow_mut().map_err(io::Error::other)?;
        serde_json::to_writer(&mut *out, &Line { event, fmt: self })?;
        out.write_all(b"\n")
    }
}

/// Single output line of an [`Event`].
///
/// The [`TYPE_KEY`] goes first. A payload entry with the same key overrides
/// its value, but not its position.
struct Line<'e, 'f, Out: io::Write> {
    event: &'e Event,
    fmt: &'f EventProtocol<Out>,
}

impl<Out: io::Write> Serialize for Line<'_, '_, Out> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let data = &self.event.data;
        let mut map = s.serialize_map(Some(
            data.len() + usize::from(!data.contains_key(TYPE_KEY)),
        ))?;
        match data.get(TYPE_KEY) {
            Some(v) => map.serialize_entry(TYPE_KEY, &self.wrap(v))?,
            None => map.serialize_entry(TYPE_KEY, self.event.name.as_str())?,
        }
        for (k, v) in data.iter().filter(|(k, _)| *k != TYPE_KEY) {
            map.serialize_entry(k, &self.wrap(v))?;
        }
        map.end()
    }
}

impl<'f, Out: io::Write> Line<'_, 'f, Out> {
    fn wrap<'v>(&self, value: &'v Value) -> Formatted<'v, 'f, Out> {
        Formatted { value, fmt: self.fmt }
    }
}

/// [`Value`] serialized in the [`EventProtocol`] format.
struct Formatted<'v, 'f, Out: io::Write> {
    value: &'v Value,
    fmt: &'f EventProtocol<Out>,
}

impl<Out: io::Write> Serialize for Formatted<'_, '_, Out> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let wrap = |value| Formatted { value, fmt: self.fmt };

        match self.value {
            Value::Null => s.serialize_unit(),
            Value::Bool(b) => s.serialize_bool(*b),
            Value::Number(n) => n.serialize(s),
            Value::String(v) => s.serialize_str(v),
            Value::Error(e) => s.serialize_str(&self.fmt.format_stack(e.stack())),
            Value::Array(items) => {
                let mut seq = s.serialize_seq(Some(items.len()))?;
                for v in items {
                    seq.serialize_element(&wrap(v))?;
                }
                seq.end()
            }
            Value::Object(entries) => {
                let mut map = s.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, &wrap(v))?;
                }
                map.end()
            }
        }
    }
}

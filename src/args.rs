// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Argument-shape dispatch of overloaded registration calls.
//!
//! Registration calls accept a few positional shapes, with the code always
//! being the last argument:
//! - `(code)`;
//! - `(tags, code)`;
//! - `(options, code)`;
//! - `(tags, options, code)`.
//!
//! [`RawArgs`] holds the positional arguments as given, and
//! [`RawArgs::normalize()`] turns them into a fixed [`Normalized`] record.

use itertools::Itertools as _;

use crate::{
    definition::Category,
    error::{InvalidDefinitionError, InvalidReason},
    location::Location,
};

/// Single positional argument of a registration call.
#[derive(Clone, Debug)]
pub enum Argument<O, C> {
    /// Tag expression string.
    Tags(String),

    /// Options object.
    Options(O),

    /// Code to run.
    Code(C),
}

impl<O, C> Argument<O, C> {
    /// Returns a short name of this [`Argument`]'s shape.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Tags(_) => "tags",
            Self::Options(_) => "options",
            Self::Code(_) => "code",
        }
    }
}

/// Positional arguments of a registration call, not normalized yet.
#[derive(Clone, Debug)]
pub struct RawArgs<O, C>(pub Vec<Argument<O, C>>);

/// [`RawArgs`] normalized into a fixed shape.
#[derive(Clone, Debug)]
pub struct Normalized<O, C> {
    /// Tag expression given as a separate positional argument, if any.
    pub tags: Option<String>,

    /// Options given, or the [`Default`] ones.
    pub options: O,

    /// Code to run.
    pub code: C,
}

impl<O: Default, C> RawArgs<O, C> {
    /// Normalizes these [`RawArgs`] of a `category` registration call.
    ///
    /// A standalone tags argument is accepted only for hook
    /// [`Category`]s.
    ///
    /// # Errors
    ///
    /// With an [`InvalidDefinitionError`] if the last argument is not
    /// [`Argument::Code`], or the preceding ones don't form a supported
    /// shape.
    pub fn normalize(
        self,
        category: Category,
        location: Option<Location>,
    ) -> Result<Normalized<O, C>, InvalidDefinitionError> {
        let invalid = |reason| {
            InvalidDefinitionError::new(category, location, reason)
        };

        let mut args = self.0;
        let code = match args.pop() {
            Some(Argument::Code(code)) => code,
            Some(_) | None => return Err(invalid(InvalidReason::MissingCode)),
        };

        let unexpected =
            format!("({})", args.iter().map(Argument::kind).join(", "));

        let mut rest = args.into_iter();
        let (tags, options) = match (rest.next(), rest.next(), rest.next()) {
            (None, None, None) => (None, O::default()),
            (Some(Argument::Tags(tags)), None, None) => {
                (Some(tags), O::default())
            }
            (Some(Argument::Options(opts)), None, None) => (None, opts),
            (Some(Argument::Tags(tags)), Some(Argument::Options(opts)), None) => {
                (Some(tags), opts)
            }
            _ => {
                return Err(invalid(InvalidReason::UnexpectedArguments(
                    format!("{unexpected} before code"),
                )));
            }
        };

        if tags.is_some() && !category.is_hook() {
            return Err(invalid(InvalidReason::UnexpectedArguments(format!(
                "{unexpected} before code, but only hooks accept tags",
            ))));
        }

        Ok(Normalized { tags, options, code })
    }
}

impl<O, C> From<Vec<Argument<O, C>>> for RawArgs<O, C> {
    fn from(args: Vec<Argument<O, C>>) -> Self {
        Self(args)
    }
}

impl<O, C> From<C> for RawArgs<O, C> {
    fn from(code: C) -> Self {
        Self(vec![Argument::Code(code)])
    }
}

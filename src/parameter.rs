// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`ParameterType`]s usable inside [Cucumber Expression][0] step patterns.
//!
//! [0]: https://github.com/cucumber/cucumber-expressions

use std::{any::Any, sync::Arc};

use derive_more::with_trait::Debug;
use lazy_regex::regex_is_match;
use linked_hash_map::LinkedHashMap;
use regex::Regex;
use smart_default::SmartDefault;

use crate::{
    definition::Category,
    error::{
        BoxError, DuplicateParameterTypeError, Error, InvalidDefinitionError,
        InvalidReason,
    },
    location::Location,
};

/// Transformation of captured groups into a typed value.
pub type Transformer =
    Arc<dyn Fn(&[&str]) -> Result<Box<dyn Any>, BoxError>>;

/// Named, reusable pattern with an optional [`Transformer`] of its matches.
#[derive(Clone, Debug, SmartDefault)]
pub struct ParameterType {
    /// Name referring to this [`ParameterType`] inside expressions.
    name: String,

    /// Regular expressions matching this [`ParameterType`].
    regexps: Vec<String>,

    /// [`Transformer`] of the captured groups.
    ///
    /// [`None`] means the first captured group is returned as a [`String`].
    #[debug(ignore)]
    transformer: Option<Transformer>,

    /// Whether this [`ParameterType`] is suggested in snippets.
    #[default(true)]
    use_for_snippets: bool,

    /// Whether this [`ParameterType`] wins over others with the same regexp
    /// when matching a regular expression.
    prefer_for_regexp_match: bool,
}

impl ParameterType {
    /// Creates a new [`ParameterType`] without a [`Transformer`].
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, regexps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            regexps: regexps.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the [`Transformer`] of this [`ParameterType`].
    #[must_use]
    pub fn transformer<F, T>(mut self, f: F) -> Self
    where
        F: Fn(&[&str]) -> Result<T, BoxError> + 'static,
        T: Any,
    {
        self.transformer = Some(Arc::new(move |groups: &[&str]| {
            f(groups).map(|v| Box::new(v) as Box<dyn Any>)
        }));
        self
    }

    /// Sets whether this [`ParameterType`] is suggested in snippets.
    #[must_use]
    pub const fn use_for_snippets(mut self, yes: bool) -> Self {
        self.use_for_snippets = yes;
        self
    }

    /// Sets whether this [`ParameterType`] wins over others with the same
    /// regexp.
    #[must_use]
    pub const fn prefer_for_regexp_match(mut self, yes: bool) -> Self {
        self.prefer_for_regexp_match = yes;
        self
    }

    /// Returns the name of this [`ParameterType`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the regular expressions of this [`ParameterType`].
    #[must_use]
    pub fn regexps(&self) -> &[String] {
        &self.regexps
    }

    /// Indicates whether this [`ParameterType`] is suggested in snippets.
    #[must_use]
    pub const fn is_used_for_snippets(&self) -> bool {
        self.use_for_snippets
    }

    /// Indicates whether this [`ParameterType`] wins over others with the
    /// same regexp.
    #[must_use]
    pub const fn is_preferred_for_regexp_match(&self) -> bool {
        self.prefer_for_regexp_match
    }

    /// Transforms the captured `groups` into a value.
    ///
    /// # Errors
    ///
    /// If the [`Transformer`] of this [`ParameterType`] fails.
    pub fn transform(&self, groups: &[&str]) -> Result<Box<dyn Any>, BoxError> {
        match &self.transformer {
            Some(f) => f(groups),
            None => Ok(Box::new(
                groups.first().copied().unwrap_or_default().to_owned(),
            )),
        }
    }

    /// Indicates whether this [`ParameterType`] has the given `regexp`.
    fn has_regexp(&self, regexp: &str) -> bool {
        self.regexps.iter().any(|r| r == regexp)
    }

    /// Checks this [`ParameterType`] being well-formed.
    fn validate(&self) -> Result<(), InvalidReason> {
        if regex_is_match!(r"[{}()\\/]", &self.name) {
            return Err(InvalidReason::IllegalParameterTypeName(
                self.name.clone(),
            ));
        }
        if self.regexps.is_empty() {
            return Err(InvalidReason::NoParameterTypeRegexps(self.name.clone()));
        }
        for re in &self.regexps {
            if let Err(e) = Regex::new(re) {
                return Err(InvalidReason::MalformedRegex {
                    pattern: re.clone(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Registry of [`ParameterType`]s, seeded with the built-in ones.
#[derive(Clone, Debug)]
pub struct ParameterTypeRegistry {
    /// Registered [`ParameterType`]s by name, in registration order.
    types: LinkedHashMap<String, ParameterType>,
}

impl Default for ParameterTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterTypeRegistry {
    /// Creates a new [`ParameterTypeRegistry`] with the built-in
    /// [`ParameterType`]s: `int`, `float`, `word`, `string` and the anonymous
    /// one.
    #[must_use]
    pub fn new() -> Self {
        let mut types = LinkedHashMap::new();
        for ty in builtins() {
            _ = types.insert(ty.name.clone(), ty);
        }
        Self { types }
    }

    /// Adds the given [`ParameterType`] to this [`ParameterTypeRegistry`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDefinition`] if the [`ParameterType`] has an illegal
    ///   name, no or malformed regexps, or prefers a regexp another
    ///   [`ParameterType`] already prefers.
    /// - [`Error::DuplicateParameterType`] if its name is already taken.
    pub fn define_parameter_type(
        &mut self,
        ty: ParameterType,
        location: Option<Location>,
    ) -> Result<(), Error> {
        let invalid = |reason| {
            InvalidDefinitionError::new(Category::ParameterType, location, reason)
        };

        ty.validate().map_err(invalid)?;

        if self.types.contains_key(&ty.name) {
            return Err(DuplicateParameterTypeError {
                name: ty.name,
                location,
            }
            .into());
        }

        if ty.prefer_for_regexp_match {
            for re in &ty.regexps {
                if let Some(existing) = self
                    .types
                    .values()
                    .find(|t| t.prefer_for_regexp_match && t.has_regexp(re))
                {
                    return Err(invalid(
                        InvalidReason::AmbiguousPreferentialParameterType {
                            regexp: re.clone(),
                            existing: existing.name.clone(),
                            name: ty.name.clone(),
                        },
                    )
                    .into());
                }
            }
        }

        _ = self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    /// Returns the [`ParameterType`] with the given `name`, if any.
    #[must_use]
    pub fn lookup_by_name(&self, name: &str) -> Option<&ParameterType> {
        self.types.get(name)
    }

    /// Iterates over all the [`ParameterType`]s having the given `regexp`, in
    /// registration order.
    pub fn by_regexp<'s>(
        &'s self,
        regexp: &'s str,
    ) -> impl Iterator<Item = &'s ParameterType> + 's {
        self.types.values().filter(move |t| t.has_regexp(regexp))
    }

    /// Returns the [`ParameterType`] to use for the given `regexp`: the
    /// preferential one, or the only one.
    ///
    /// [`None`] if there are none, or several without a preferential one.
    #[must_use]
    pub fn lookup_by_regexp(&self, regexp: &str) -> Option<&ParameterType> {
        let candidates = self
            .types
            .values()
            .filter(|t| t.has_regexp(regexp))
            .collect::<Vec<_>>();
        if let Some(preferred) =
            candidates.iter().find(|t| t.prefer_for_regexp_match)
        {
            return Some(*preferred);
        }
        match candidates.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Iterates over all the [`ParameterType`]s in registration order,
    /// built-in ones first.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterType> {
        self.types.values()
    }

    /// Returns the number of registered [`ParameterType`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Indicates whether there are no [`ParameterType`]s registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Built-in [`ParameterType`]s every [`ParameterTypeRegistry`] starts with.
fn builtins() -> [ParameterType; 5] {
    [
        ParameterType::new("int", [r"-?\d+", r"\d+"])
            .transformer(|g| Ok(first(g).parse::<i64>()?)),
        ParameterType::new("float", [r"-?\d*\.\d+"])
            .transformer(|g| Ok(first(g).parse::<f64>()?)),
        ParameterType::new("word", [r"[^\s]+"])
            .use_for_snippets(false)
            .transformer(|g| Ok(first(g).to_owned())),
        ParameterType::new(
            "string",
            [r#""([^"\\]*(\\.[^"\\]*)*)""#, r"'([^'\\]*(\\.[^'\\]*)*)'"],
        )
        .transformer(|g| Ok(unquote(first(g)))),
        ParameterType::new("", [".*"])
            .use_for_snippets(false)
            .transformer(|g| Ok(first(g).to_owned())),
    ]
}

/// Returns the first captured group, or an empty string.
fn first<'g>(groups: &[&'g str]) -> &'g str {
    groups.first().copied().unwrap_or_default()
}

/// Strips the surrounding quotes of a `string` parameter and unescapes them.
fn unquote(s: &str) -> String {
    let quote = match s.chars().next() {
        Some(q @ ('"' | '\'')) if s.len() >= 2 && s.ends_with(q) => q,
        _ => return s.to_owned(),
    };
    let inner = &s[1..s.len() - 1];
    inner.replace(&format!("\\{quote}"), &quote.to_string())
}

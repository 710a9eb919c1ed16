// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types of building a [`SupportCodeLibrary`].
//!
//! Any of them aborts the whole build: no partially built
//! [`SupportCodeLibrary`] is ever returned.
//!
//! [`SupportCodeLibrary`]: crate::SupportCodeLibrary

use std::{error::Error as StdError, fmt, sync::Arc};

use derive_more::with_trait::{Display, Error as DeriveError, From};

use crate::{definition::Category, location::Location};

/// Boxed error returned by user registration functions.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error of building a [`SupportCodeLibrary`].
///
/// [`SupportCodeLibrary`]: crate::SupportCodeLibrary
#[derive(Clone, Debug, Display, DeriveError, From)]
pub enum Error {
    /// Malformed registration call.
    #[display("{_0}")]
    InvalidDefinition(InvalidDefinitionError),

    /// Name collision inside a [`ParameterTypeRegistry`].
    ///
    /// [`ParameterTypeRegistry`]: crate::ParameterTypeRegistry
    #[display("{_0}")]
    DuplicateParameterType(DuplicateParameterTypeError),

    /// Registration function failed.
    #[display("{_0}")]
    UserRegistration(UserRegistrationError),

    /// Tag expression of a hook failed to parse on evaluation.
    #[display("{_0}")]
    TagExpression(TagExpressionError),
}

impl Error {
    /// Indicates whether this is an [`InvalidDefinitionError`].
    #[must_use]
    pub const fn is_invalid_definition(&self) -> bool {
        matches!(self, Self::InvalidDefinition(_))
    }

    /// Indicates whether this is a [`DuplicateParameterTypeError`].
    #[must_use]
    pub const fn is_duplicate_parameter_type(&self) -> bool {
        matches!(self, Self::DuplicateParameterType(_))
    }

    /// Indicates whether this is a [`UserRegistrationError`].
    #[must_use]
    pub const fn is_user_registration(&self) -> bool {
        matches!(self, Self::UserRegistration(_))
    }
}

/// Reason of an [`InvalidDefinitionError`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum InvalidReason {
    /// Last positional argument isn't a callable.
    #[display("the last argument must be the code to run")]
    MissingCode,

    /// Positional arguments preceding the code have an unsupported shape.
    #[display(
        "expected `(code)`, `(tags, code)`, `(options, code)` or \
         `(tags, options, code)` arguments, got {_0}"
    )]
    UnexpectedArguments(String),

    /// Step pattern is empty.
    #[display("pattern must not be empty")]
    EmptyPattern,

    /// Regular expression failed to compile.
    #[display("malformed regular expression `{pattern}`: {reason}")]
    MalformedRegex {
        /// Source of the regular expression.
        pattern: String,

        /// Compilation error description.
        reason: String,
    },

    /// Parameter type name contains reserved characters.
    #[display("parameter type name `{_0}` must not contain any of `{{}}()\\/`")]
    IllegalParameterTypeName(String),

    /// Parameter type has no regular expressions.
    #[display("parameter type `{_0}` must have at least one regular expression")]
    NoParameterTypeRegexps(String),

    /// Another preferential parameter type already uses the regexp.
    #[display(
        "parameter types `{existing}` and `{name}` both prefer regexp \
         `{regexp}`, there can only be one preferential parameter type per \
         regexp"
    )]
    AmbiguousPreferentialParameterType {
        /// Regular expression both parameter types use.
        regexp: String,

        /// Name of the already registered preferential parameter type.
        existing: String,

        /// Name of the rejected parameter type.
        name: String,
    },
}

/// Malformed registration call: missing code, malformed pattern or invalid
/// parameter type.
#[derive(Clone, Debug, DeriveError, Eq, PartialEq)]
pub struct InvalidDefinitionError {
    /// [`Category`] of the offending registration call.
    #[error(not(source))]
    pub category: Category,

    /// [`Location`] of the offending registration call, if known.
    #[error(not(source))]
    pub location: Option<Location>,

    /// What's wrong with the registration call.
    #[error(not(source))]
    pub reason: InvalidReason,
}

impl InvalidDefinitionError {
    /// Creates a new [`InvalidDefinitionError`].
    #[must_use]
    pub const fn new(
        category: Category,
        location: Option<Location>,
        reason: InvalidReason,
    ) -> Self {
        Self { category, location, reason }
    }
}

impl fmt::Display for InvalidDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid `{}` definition", self.category)?;
        if let Some(loc) = &self.location {
            write!(f, " at {loc}")?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// Name collision inside a [`ParameterTypeRegistry`].
///
/// [`ParameterTypeRegistry`]: crate::ParameterTypeRegistry
#[derive(Clone, Debug, Display, DeriveError, Eq, PartialEq)]
#[display("There is already a parameter type with name `{name}`")]
pub struct DuplicateParameterTypeError {
    /// Colliding name.
    #[error(not(source))]
    pub name: String,

    /// [`Location`] of the rejected registration call, if known.
    #[error(not(source))]
    pub location: Option<Location>,
}

/// Failure of a user registration function.
#[derive(Clone, Debug, Display)]
pub enum RegistrationFailure {
    /// Registration function returned an error.
    #[display("{_0}")]
    Error(Arc<dyn StdError + Send + Sync + 'static>),

    /// Registration function panicked with the message.
    #[display("panicked: {_0}")]
    Panic(String),
}

/// Registration function failed by returning an error or panicking.
#[derive(Clone, Debug)]
pub struct UserRegistrationError {
    /// Index of the failed function in [`BuildConfig::fns`].
    ///
    /// [`BuildConfig::fns`]: crate::BuildConfig::fns
    pub index: usize,

    /// Name of the failed function, if it was given one.
    pub name: Option<String>,

    /// What went wrong.
    pub failure: RegistrationFailure,
}

impl UserRegistrationError {
    /// Returns the panic message, if the registration function panicked.
    #[must_use]
    pub fn panic_message(&self) -> Option<&str> {
        match &self.failure {
            RegistrationFailure::Panic(msg) => Some(msg),
            RegistrationFailure::Error(_) => None,
        }
    }
}

impl fmt::Display for UserRegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Support code function #{}", self.index)?;
        if let Some(name) = &self.name {
            write!(f, " `{name}`")?;
        }
        write!(f, " failed: {}", self.failure)
    }
}

impl StdError for UserRegistrationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.failure {
            RegistrationFailure::Error(e) => Some(&**e),
            RegistrationFailure::Panic(_) => None,
        }
    }
}

/// Tag expression of a hook failed to parse.
#[derive(Clone, Debug, Display, DeriveError, Eq, PartialEq)]
#[display("Invalid tag expression `{expression}`: {reason}")]
pub struct TagExpressionError {
    /// Tag expression as registered.
    #[error(not(source))]
    pub expression: String,

    /// Parsing error description.
    #[error(not(source))]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::{
        BoxError, DuplicateParameterTypeError, Error, InvalidDefinitionError,
        InvalidReason, RegistrationFailure, UserRegistrationError,
    };
    use crate::{definition::Category, location::Location};

    #[test]
    fn invalid_definition_names_category_and_location() {
        let err = InvalidDefinitionError::new(
            Category::BeforeScenario,
            Some(Location::new("support/hooks.rs", 7, 5)),
            InvalidReason::MissingCode,
        );

        assert_eq!(
            err.to_string(),
            "Invalid `BeforeEach` definition at support/hooks.rs:7:5: \
             the last argument must be the code to run",
        );
    }

    #[test]
    fn invalid_definition_without_location() {
        let err = InvalidDefinitionError::new(
            Category::Given,
            None,
            InvalidReason::EmptyPattern,
        );

        assert_eq!(
            err.to_string(),
            "Invalid `Given` definition: pattern must not be empty",
        );
    }

    #[test]
    fn duplicate_parameter_type_display() {
        let err: Error = DuplicateParameterTypeError {
            name: "color".into(),
            location: None,
        }
        .into();

        assert!(err.is_duplicate_parameter_type());
        assert_eq!(
            err.to_string(),
            "There is already a parameter type with name `color`",
        );
    }

    #[test]
    fn user_registration_keeps_source() {
        let source: BoxError = "database unreachable".into();
        let err = UserRegistrationError {
            index: 2,
            name: Some("db_steps".into()),
            failure: RegistrationFailure::Error(source.into()),
        };

        assert_eq!(
            err.to_string(),
            "Support code function #2 `db_steps` failed: database unreachable",
        );
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("database unreachable"),
        );
        assert!(err.panic_message().is_none());
    }

    #[test]
    fn user_registration_panic_has_no_source() {
        let err = UserRegistrationError {
            index: 0,
            name: None,
            failure: RegistrationFailure::Panic("boom".into()),
        };

        assert_eq!(err.to_string(), "Support code function #0 failed: panicked: boom");
        assert!(err.source().is_none());
        assert_eq!(err.panic_message(), Some("boom"));
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.


//! [`Regex`] of a step definition [`Pattern`].
//!
//! [`Pattern`]: super::Pattern

use std::hash::{Hash, Hasher};

use derive_more::with_trait::{Debug, Deref, Display};
use regex::Regex;

/// Compiled [`Regex`] compared and hashed by its source, so two definitions
/// with the same pattern are equal.
#[derive(Clone, Debug, Deref, Display)]
#[display("{}", regex.as_str())]
pub struct PatternRegex {
    /// Compiled [`Regex`].
    #[deref]
    regex: Regex,
}

impl PatternRegex {
    /// Returns the compiled [`Regex`].
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the source this [`PatternRegex`] was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }
}

impl From<Regex> for PatternRegex {
    fn from(regex: Regex) -> Self {
        Self { regex }
    }
}

impl PartialEq for PatternRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

impl Eq for PatternRegex {}

impl Hash for PatternRegex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source().hash(state);
    }
}

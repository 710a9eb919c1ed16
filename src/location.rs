// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source [`Location`] of a registration call.

use std::{panic, path::Path};

use derive_more::with_trait::{Debug, Display};

/// Location of a registration call inside user support code, captured via
/// `#[track_caller]`.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{path}:{line}:{column}")]
pub struct Location {
    /// Path to the file where the registration call is located.
    pub path: &'static str,

    /// Line of the file where the registration call is located.
    pub line: u32,

    /// Column of the file where the registration call is located.
    pub column: u32,
}

impl Location {
    /// Creates a new [`Location`] with the given path, line, and column.
    #[must_use]
    pub const fn new(path: &'static str, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }

    /// Returns the [`Location`] of the outermost `#[track_caller]` frame
    /// calling this function.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        panic::Location::caller().into()
    }

    /// Returns the path of this [`Location`] relative to the given `cwd`, or
    /// the whole path if it lies outside of the `cwd`.
    ///
    /// Only whole path components are stripped.
    #[must_use]
    pub fn path_relative_to(&self, cwd: impl AsRef<Path>) -> &'static Path {
        let path = Path::new(self.path);
        path.strip_prefix(cwd).unwrap_or(path)
    }
}

impl From<&'static panic::Location<'static>> for Location {
    fn from(loc: &'static panic::Location<'static>) -> Self {
        Self::new(loc.file(), loc.line(), loc.column())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::Location;

    #[test]
    fn displays_as_path_line_column() {
        let loc = Location::new("src/steps.rs", 42, 10);

        assert_eq!(loc.to_string(), "src/steps.rs:42:10");
    }

    #[test]
    fn captures_caller() {
        let loc = Location::caller();

        assert!(loc.path.ends_with("location.rs"), "got {loc}");
        assert!(loc.line > 0);
    }

    #[test]
    fn orders_by_path_then_line_then_column() {
        let a = Location::new("a.rs", 1, 1);

        assert!(a < Location::new("b.rs", 1, 1));
        assert!(a < Location::new("a.rs", 2, 1));
        assert!(a < Location::new("a.rs", 1, 2));
    }

    #[test]
    fn strips_cwd_prefix() {
        let loc = Location::new("/home/me/project/features/steps.rs", 3, 1);

        assert_eq!(
            loc.path_relative_to("/home/me/project"),
            Path::new("features/steps.rs"),
        );
        assert_eq!(
            loc.path_relative_to("/home/me/project/"),
            Path::new("features/steps.rs"),
        );
        assert_eq!(
            loc.path_relative_to("/elsewhere"),
            Path::new("/home/me/project/features/steps.rs"),
        );
    }

    #[test]
    fn keeps_path_when_cwd_ends_mid_component() {
        let loc = Location::new("/home/me/project/features/steps.rs", 3, 1);

        assert_eq!(
            loc.path_relative_to("/home/me/proj"),
            Path::new("/home/me/project/features/steps.rs"),
        );
    }
}

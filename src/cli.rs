// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI options of a host runner building a [`SupportCodeLibrary`].
//!
//! [`Opts`] may be used standalone, or flattened into a runner's own CLI via
//! `#[command(flatten)]`.
//!
//! [`SupportCodeLibrary`]: crate::SupportCodeLibrary

use std::{env, io, path::PathBuf};

use crate::{
    world::{Attach, WorldContext},
    BuildConfig,
};

pub use clap::{Args, Parser};

/// CLI options configuring the [`World`]s and the project location.
///
/// [`World`]: crate::World
#[derive(clap::Parser, Clone, Debug)]
#[command(
    name = "cucumber",
    about = "Build the support code library of a Cucumber project"
)]
pub struct Opts {
    /// JSON object passed to the world constructor as world parameters.
    #[arg(
        long,
        value_name = "json",
        default_value = "{}",
        value_parser = parse_world_parameters,
        global = true
    )]
    pub world_parameters: serde_json::Value,

    /// Working directory of the project.
    ///
    /// Defaults to the current directory.
    #[arg(long, value_name = "path", global = true)]
    pub cwd: Option<PathBuf>,
}

impl Opts {
    /// Shortcut for [`clap::Parser::parse()`], which doesn't require the trait
    /// being imported.
    #[must_use]
    pub fn parsed() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Builds the [`WorldContext`] to construct [`World`]s with.
    ///
    /// [`World`]: crate::World
    #[must_use]
    pub fn world_context(&self, attach: Attach) -> WorldContext {
        WorldContext::new(attach, self.world_parameters.clone())
    }

    /// Creates an empty [`BuildConfig`] for the project working directory.
    ///
    /// # Errors
    ///
    /// If no `--cwd` is given and the current directory cannot be resolved.
    pub fn build_config<W>(&self) -> io::Result<BuildConfig<W>> {
        let cwd = match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => env::current_dir()?,
        };
        Ok(BuildConfig::new(cwd))
    }
}

/// Parses `--world-parameters` as a JSON object.
fn parse_world_parameters(s: &str) -> Result<serde_json::Value, String> {
    match serde_json::from_str(s) {
        Ok(v @ serde_json::Value::Object(_)) => Ok(v),
        Ok(_) => Err("world parameters must be a JSON object".into()),
        Err(e) => Err(format!("world parameters are not valid JSON: {e}")),
    }
}

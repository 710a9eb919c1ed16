// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Identity and categorization of registered definitions.

use derive_more::with_trait::{Display, From};

/// Unique identifier of a registered definition.
///
/// Identifiers are handed out by a single [`IdGenerator`] per build, so they
/// are unique across all [`Category`]s of the same build.
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
pub struct DefinitionId(u64);

impl DefinitionId {
    /// Returns the raw numeric value of this [`DefinitionId`].
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Sequential generator of [`DefinitionId`]s.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    /// Value of the next [`DefinitionId`] to hand out.
    next: u64,
}

impl IdGenerator {
    /// Returns a fresh [`DefinitionId`], never returned before by this
    /// [`IdGenerator`].
    pub fn next_id(&mut self) -> DefinitionId {
        let id = DefinitionId(self.next);
        self.next += 1;
        id
    }
}

/// Kind of registration call producing a definition.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Category {
    /// [Given] step definition.
    ///
    /// [Given]: https://cucumber.io/docs/gherkin/reference#given
    #[display("Given")]
    Given,

    /// [When] step definition.
    ///
    /// [When]: https://cucumber.io/docs/gherkin/reference#when
    #[display("When")]
    When,

    /// [Then] step definition.
    ///
    /// [Then]: https://cucumber.io/docs/gherkin/reference#then
    #[display("Then")]
    Then,

    /// Hook running once before all features.
    #[display("Before")]
    BeforeFeatures,

    /// Hook running once after all features.
    #[display("After")]
    AfterFeatures,

    /// Hook running before each scenario.
    #[display("BeforeEach")]
    BeforeScenario,

    /// Hook running after each scenario.
    #[display("AfterEach")]
    AfterScenario,

    /// Parameter type definition.
    #[display("defineParameterType")]
    ParameterType,
}

impl Category {
    /// Indicates whether this [`Category`] is a step definition one.
    #[must_use]
    pub const fn is_step(self) -> bool {
        matches!(self, Self::Given | Self::When | Self::Then)
    }

    /// Indicates whether this [`Category`] is a hook definition one.
    #[must_use]
    pub const fn is_hook(self) -> bool {
        matches!(
            self,
            Self::BeforeFeatures
                | Self::AfterFeatures
                | Self::BeforeScenario
                | Self::AfterScenario,
        )
    }
}

// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use crate::county::StateCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopePredicate {
    Unrestricted,
    RestrictedToStates(BTreeSet<StateCode>),
}

impl ScopePredicate {
    #[must_use]
    pub fn allows_state(&self, state: &StateCode) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::RestrictedToStates(states) => states.contains(state),
        }
    }

    #[must_use]
    pub fn allows_missing_state(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }
}

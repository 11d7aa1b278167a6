// SPDX-License-Identifier: Apache-2.0

//! Scope Resolver and Access Filter: maps a login-time region selection to a
//! [`ScopePredicate`] and applies that predicate to organization, person, and
//! meeting records. Every path fails closed: an unknown selection denies,
//! a missing state excludes, a dangling owner hides the dependent record.

#![forbid(unsafe_code)]

mod filter;
mod scope_map;

use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "relief-atlas-scope";

pub use filter::{
    meeting_visible, organization_visible, person_visible, visible_meetings,
    visible_organizations, visible_people,
};
pub use scope_map::{resolve_scope, ScopeGrant, ScopeMap, ScopeMapConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScopeError {
    UnknownSelection(String),
    InvalidGrant(String),
    Config(String),
}

impl Display for ScopeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSelection(token) => {
                write!(f, "unrecognized scope selection `{token}`; access denied")
            }
            Self::InvalidGrant(msg) => write!(f, "invalid scope grant: {msg}"),
            Self::Config(msg) => write!(f, "scope config error: {msg}"),
        }
    }
}

impl std::error::Error for ScopeError {}
